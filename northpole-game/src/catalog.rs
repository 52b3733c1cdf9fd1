//! Static ticket catalog the desk draws its support requests from.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// How hard a request is to resolve, shown as a badge next to the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

/// Template for a support request, including the keywords a good answer mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub success_message: String,
}

/// Errors raised when catalog data violates its invariants.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog must contain at least one entry")]
    Empty,
    #[error("catalog entry id '{0}' is declared more than once")]
    DuplicateId(String),
    #[error("catalog entry has a blank id")]
    BlankId,
    #[error("catalog entry '{id}' has a blank keyword")]
    BlankKeyword { id: String },
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct CatalogFile {
    entries: Vec<CatalogEntry>,
}

/// Non-empty, id-unique collection of catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from pre-parsed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, an id is blank or repeated, or a
    /// keyword is blank.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::BlankId);
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
            if entry.keywords.iter().any(|kw| kw.trim().is_empty()) {
                return Err(CatalogError::BlankKeyword {
                    id: entry.id.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Load a catalog from its JSON representation (`{"entries": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the entries are invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.entries)
    }

    /// The catalog compiled into the crate.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::from_json(include_str!("../assets/data/catalog.json"))
                .expect("valid builtin catalog")
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// First entry registered under `sender`.
    #[must_use]
    pub fn find_by_sender(&self, sender: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.sender == sender)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            sender: format!("{id}@north.pole"),
            subject: "Subject".to_string(),
            body: "Body".to_string(),
            difficulty: Difficulty::Easy,
            keywords: vec!["dns".to_string()],
            success_message: "Fixed".to_string(),
        }
    }

    #[test]
    fn builtin_catalog_loads_every_entry() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 7);
        let rudolph = catalog.get("1").unwrap();
        assert_eq!(rudolph.sender, "Rudolph@rednose.mail");
        assert_eq!(rudolph.difficulty, Difficulty::Easy);
        assert!(rudolph.keywords.iter().any(|kw| kw == "off and on"));
        assert_eq!(
            catalog.find_by_sender("Frosty@snow-solutions.net").map(|e| e.id.as_str()),
            Some("4")
        );
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));
        assert!(matches!(
            Catalog::new(vec![entry("a"), entry("a")]),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
        let mut blank = entry("b");
        blank.keywords.push("  ".to_string());
        assert!(matches!(
            Catalog::new(vec![blank]),
            Err(CatalogError::BlankKeyword { .. })
        ));
    }

    #[test]
    fn from_json_reports_parse_failures() {
        let err = Catalog::from_json("{\"entries\": [{\"id\": 1}]}").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(matches!(
            Catalog::from_json("{\"entries\": []}"),
            Err(CatalogError::Empty)
        ));
    }
}
