use serde::{Deserialize, Serialize};

use super::{DeskPhase, DeskSession};
use crate::evaluator::EvaluationResult;
use crate::seed::encode_shift_code;
use crate::stats::DeskStats;
use crate::ticket::Ticket;

/// Everything a presentation layer needs to draw the desk, detached from the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskSnapshot {
    pub seed: u64,
    pub shift_code: String,
    pub clock_ms: u64,
    pub phase: DeskPhase,
    pub stats: DeskStats,
    pub tickets: Vec<Ticket>,
    pub selected: Option<Ticket>,
    pub feedback: Option<EvaluationResult>,
    pub draft: String,
    pub evaluating: bool,
    pub game_over: bool,
    pub log: Vec<String>,
}

impl DeskSnapshot {
    #[must_use]
    pub fn capture(session: &DeskSession) -> Self {
        Self {
            seed: session.seed(),
            shift_code: encode_shift_code(session.seed()),
            clock_ms: u64::try_from(session.clock().as_millis()).unwrap_or(u64::MAX),
            phase: session.phase(),
            stats: *session.stats(),
            tickets: session.tickets().to_vec(),
            selected: session.selected_ticket().cloned(),
            feedback: session.feedback().cloned(),
            draft: session.draft().to_string(),
            evaluating: session.is_evaluating(),
            game_over: session.is_game_over(),
            log: session.journal().lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn snapshot_tracks_selection_and_serializes() {
        let mut session = DeskSession::with_defaults(2024);
        let id = session.tickets()[1].id.clone();
        session.select_ticket(&id);
        session.set_draft("Checking the firmware now");
        session.advance(Duration::from_millis(250));

        let snap = session.snapshot();
        assert_eq!(snap.selected.as_ref().map(|t| &t.id), Some(&id));
        assert_eq!(snap.phase, DeskPhase::Reviewing(id));
        assert_eq!(snap.clock_ms, 250);
        assert_eq!(snap.tickets.len(), 2);
        assert!(snap.shift_code.starts_with("NP-"));

        let json = serde_json::to_string(&snap).unwrap();
        let restored: DeskSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snap);
    }
}
