//! NorthPole Desk Engine
//!
//! Platform-agnostic core for the NorthPole Mail support-desk toy: a seeded
//! ticket generator, the keyword response grader, and the session state
//! machine that rotates tickets and tracks score, satisfaction and stress.
//! Rendering is left to the host; it reads [`DeskSnapshot`]s.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod desk;
pub mod evaluator;
pub mod generator;
pub mod journal;
pub mod rng;
pub mod seed;
pub mod stats;
pub mod ticket;

use anyhow::Context;
use std::sync::Arc;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry, CatalogError, Difficulty};
pub use config::{DeskConfig, DeskConfigError};
pub use constants::CANNED_RESPONSES;
pub use desk::{
    DeskEvent, DeskPhase, DeskSession, DeskSnapshot, IgnoreReason, InputOutcome,
};
pub use evaluator::{EvaluationResult, EvaluationTier, evaluate_response};
pub use generator::TicketGenerator;
pub use journal::{EventJournal, JournalEntry};
pub use rng::{CountingRng, DeskRng};
pub use seed::{decode_shift_code, encode_shift_code, generate_code_from_entropy};
pub use stats::DeskStats;
pub use ticket::{Ticket, TicketId, TicketStatus};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ticket catalog from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or is invalid.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;

    /// Load the desk tuning
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<DeskConfig, Self::Error>;
}

/// Loader backed by the data compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinData;

impl DataLoader for BuiltinData {
    type Error = std::convert::Infallible;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Ok(Catalog::builtin().clone())
    }

    fn load_config(&self) -> Result<DeskConfig, Self::Error> {
        Ok(DeskConfig::builtin().clone())
    }
}

/// Main engine for opening desk sessions from loaded data
#[derive(Debug, Clone)]
pub struct DeskEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> DeskEngine<L>
where
    L: DataLoader,
{
    /// Create a new engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Open a session for `seed`, loading catalog and configuration afresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be loaded or the configuration is invalid.
    pub fn open_session(&self, seed: u64) -> anyhow::Result<DeskSession> {
        let catalog = self
            .data_loader
            .load_catalog()
            .context("loading ticket catalog")?;
        let config = self
            .data_loader
            .load_config()
            .context("loading desk configuration")?;
        let session = DeskSession::new(Arc::new(catalog), config, seed)
            .context("desk configuration rejected")?;
        Ok(session)
    }

    /// Open a session from a shared shift code such as `NP-TINSEL42`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not recognised or the session cannot be opened.
    pub fn open_shift(&self, code: &str) -> anyhow::Result<DeskSession> {
        let seed = decode_shift_code(code)
            .with_context(|| format!("unrecognised shift code: {code}"))?;
        self.open_session(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("fixture unavailable")]
    struct Unavailable;

    struct FixtureLoader {
        config_json: &'static str,
    }

    impl DataLoader for FixtureLoader {
        type Error = Unavailable;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Ok(Catalog::builtin().clone())
        }

        fn load_config(&self) -> Result<DeskConfig, Self::Error> {
            serde_json::from_str(self.config_json).map_err(|_| Unavailable)
        }
    }

    #[test]
    fn engine_opens_sessions_from_builtin_data() {
        let engine = DeskEngine::new(BuiltinData);
        let session = engine.open_session(0xABCD).unwrap();
        assert_eq!(session.seed(), 0xABCD);
        assert_eq!(session.tickets().len(), 2);
    }

    #[test]
    fn shift_codes_replay_the_same_desk() {
        let engine = DeskEngine::new(BuiltinData);
        let a = engine.open_shift("NP-COCOA12").unwrap();
        let b = engine.open_shift("np-cocoa12").unwrap();
        assert_eq!(a.tickets(), b.tickets());
        assert!(engine.open_shift("NP-NOPE12").is_err());
    }

    #[test]
    fn engine_surfaces_loader_and_validation_errors() {
        let broken = DeskEngine::new(FixtureLoader {
            config_json: "not json",
        });
        let err = broken.open_session(1).unwrap_err();
        assert!(format!("{err:#}").contains("loading desk configuration"));

        let invalid = DeskEngine::new(FixtureLoader {
            config_json: r#"{"refill_below": 0}"#,
        });
        let err = invalid.open_session(1).unwrap_err();
        assert!(format!("{err:#}").contains("refill_below"));
    }
}
