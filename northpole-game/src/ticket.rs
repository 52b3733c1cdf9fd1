//! Live ticket instances drawn from the catalog.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{CatalogEntry, Difficulty};
use crate::constants::JUST_NOW;

/// Unique identity of a ticket on the desk: `<catalog id>-<serial>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Compose an id from the catalog entry id and a distinguishing serial.
    #[must_use]
    pub fn compose(catalog_id: &str, serial: u64) -> Self {
        Self(format!("{catalog_id}-{serial}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Resolved,
    Escalated,
}

/// A support request currently owned by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    /// Back-reference to the catalog entry this ticket was instantiated from.
    pub catalog_id: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub difficulty: Difficulty,
    pub timestamp: String,
    #[serde(default)]
    pub status: TicketStatus,
}

impl Ticket {
    /// Instantiate an open ticket from a catalog entry.
    #[must_use]
    pub fn from_entry(entry: &CatalogEntry, serial: u64) -> Self {
        Self {
            id: TicketId::compose(&entry.id, serial),
            catalog_id: entry.id.clone(),
            sender: entry.sender.clone(),
            subject: entry.subject.clone(),
            body: entry.body.clone(),
            difficulty: entry.difficulty,
            timestamp: JUST_NOW.to_string(),
            status: TicketStatus::Open,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}
