//! Desk session primitives shared by the state machine and its hosts.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

use crate::evaluator::EvaluationResult;
use crate::stats::DeskStats;
use crate::ticket::{Ticket, TicketId};

#[cfg(feature = "async")]
pub mod realtime;
pub mod session;
pub mod snapshot;
pub use session::DeskSession;
pub use snapshot::DeskSnapshot;

/// Tickets currently on the desk; sized for the usual rotation.
pub type ActiveTickets = SmallVec<[Ticket; 4]>;

/// Where the desk currently stands, derived from selection and in-flight work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "ticket", rename_all = "snake_case")]
pub enum DeskPhase {
    /// No ticket selected.
    Idle,
    /// A ticket is open in the editor, awaiting a response.
    Reviewing(TicketId),
    /// A response is in flight for this ticket.
    Evaluating(TicketId),
    /// Stress hit the limit; only a reset leaves this phase.
    GameOver,
}

impl DeskPhase {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// Why an input was dropped without changing the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    SessionOver,
    Busy,
    EmptyResponse,
    NoSelection,
    UnknownTicket,
    UnknownCannedResponse,
}

/// Result of feeding a UI input to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOutcome {
    Accepted,
    Ignored(IgnoreReason),
}

impl InputOutcome {
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Transition emitted while the session clock advances or inputs are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeskEvent {
    Transmitting {
        ticket_id: TicketId,
        sender: String,
    },
    Graded {
        ticket_id: TicketId,
        result: EvaluationResult,
    },
    Cleared {
        ticket_id: TicketId,
    },
    TicketArrived {
        ticket: Ticket,
    },
    Burnout {
        stats: DeskStats,
    },
}

/// Scripted step waiting on the session clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingTimer {
    pub due: Duration,
    pub step: TimerStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerStep {
    /// Grade the in-flight response.
    Grade,
    /// Retire the graded ticket and refill the desk.
    Clear,
}

/// Response travelling through the transmit / grade / clear pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub ticket_id: TicketId,
    pub response: String,
}
