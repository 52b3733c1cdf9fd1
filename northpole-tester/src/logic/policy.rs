use std::fmt;

use northpole_game::{CANNED_RESPONSES, Catalog, Ticket};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Generic reply that is long enough to count as effort without naming a fix.
const RAMBLE: &str =
    "Thank you for contacting the North Pole helpdesk, an elf will be with you shortly.";
const CHARM: &str = "Leave some cookies by the chimney.";
const CLUELESS: &str = "???";

/// Reply chosen by a [`Responder`] for one ticket.
#[derive(Debug, Clone)]
pub struct ResponseDecision {
    pub text: String,
    pub rationale: Option<String>,
}

impl ResponseDecision {
    #[must_use]
    pub fn new(text: impl Into<String>, rationale: Option<String>) -> Self {
        Self {
            text: text.into(),
            rationale,
        }
    }
}

/// Scripted support engineer used for automated shifts.
pub trait Responder {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Index of the ticket to work next. Defaults to the oldest one.
    fn pick_ticket(&mut self, tickets: &[Ticket]) -> usize {
        let _ = tickets;
        0
    }

    /// Compose a reply for `ticket`.
    fn respond(&mut self, catalog: &Catalog, ticket: &Ticket) -> ResponseDecision;
}

/// Built-in responder strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponderStrategy {
    Expert,
    Rambler,
    Charmer,
    Clueless,
    Canned,
}

impl ResponderStrategy {
    pub const ALL: [Self; 5] = [
        Self::Expert,
        Self::Rambler,
        Self::Charmer,
        Self::Clueless,
        Self::Canned,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expert => "Expert",
            Self::Rambler => "Rambler",
            Self::Charmer => "Charmer",
            Self::Clueless => "Clueless",
            Self::Canned => "Canned",
        }
    }

    #[must_use]
    pub fn create_responder(self, seed: u64) -> Box<dyn Responder + Send> {
        match self {
            Self::Expert => Box::new(ExpertResponder::new(seed)),
            Self::Rambler => Box::new(FixedResponder::new("Rambler", RAMBLE)),
            Self::Charmer => Box::new(FixedResponder::new("Charmer", CHARM)),
            Self::Clueless => Box::new(FixedResponder::new("Clueless", CLUELESS)),
            Self::Canned => Box::new(CannedResponder::new(seed)),
        }
    }
}

impl fmt::Display for ResponderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct FixedResponder {
    name: &'static str,
    text: &'static str,
}

impl FixedResponder {
    const fn new(name: &'static str, text: &'static str) -> Self {
        Self { name, text }
    }
}

impl Responder for FixedResponder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn respond(&mut self, _catalog: &Catalog, _ticket: &Ticket) -> ResponseDecision {
        ResponseDecision::new(self.text, None)
    }
}

struct ExpertResponder {
    rng: ChaCha20Rng,
}

impl ExpertResponder {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Responder for ExpertResponder {
    fn name(&self) -> &'static str {
        "Expert"
    }

    fn respond(&mut self, catalog: &Catalog, ticket: &Ticket) -> ResponseDecision {
        let keywords = catalog
            .get(&ticket.catalog_id)
            .or_else(|| catalog.find_by_sender(&ticket.sender))
            .map(|entry| entry.keywords.as_slice())
            .unwrap_or_default();
        let picked: Vec<&String> = keywords.choose_multiple(&mut self.rng, 2).collect();
        match picked.as_slice() {
            [first, second] => ResponseDecision::new(
                format!("I checked the {first} and then sorted out the {second}."),
                Some(format!("keywords {first}, {second}")),
            ),
            _ => ResponseDecision::new(RAMBLE, Some("no keywords to cite".to_string())),
        }
    }
}

struct CannedResponder {
    rng: ChaCha20Rng,
}

impl CannedResponder {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Responder for CannedResponder {
    fn name(&self) -> &'static str {
        "Canned"
    }

    fn pick_ticket(&mut self, tickets: &[Ticket]) -> usize {
        if tickets.is_empty() {
            0
        } else {
            self.rng.gen_range(0..tickets.len())
        }
    }

    fn respond(&mut self, _catalog: &Catalog, _ticket: &Ticket) -> ResponseDecision {
        let count = self.rng.gen_range(1..=2);
        let phrases: Vec<&str> = (0..count)
            .filter_map(|_| CANNED_RESPONSES.choose(&mut self.rng).copied())
            .collect();
        ResponseDecision::new(phrases.join(" "), Some(format!("{count} canned")))
    }
}
