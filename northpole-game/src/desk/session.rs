use chrono::NaiveTime;
use std::sync::Arc;
use std::time::Duration;

use super::{
    ActiveTickets, DeskEvent, DeskPhase, DeskSnapshot, IgnoreReason, InFlight, InputOutcome,
    PendingTimer, TimerStep,
};
use crate::catalog::Catalog;
use crate::config::{DeskConfig, DeskConfigError};
use crate::constants::{CANNED_RESPONSES, GAME_OVER_NOTICE, LOG_BOOT, LOG_WELCOME};
use crate::evaluator::{EvaluationResult, evaluate_response};
use crate::generator::TicketGenerator;
use crate::journal::EventJournal;
use crate::stats::DeskStats;
use crate::ticket::{Ticket, TicketId, TicketStatus};

/// Single-player desk session: owns the meters, the active tickets and the
/// scripted transmit/grade/clear pipeline.
///
/// Time only moves when the host calls [`DeskSession::advance`]; every timer
/// that falls due is fired in order and the resulting transitions returned.
/// Transitions raised by inputs are queued and handed out by the next advance.
#[derive(Debug, Clone)]
pub struct DeskSession {
    catalog: Arc<Catalog>,
    config: DeskConfig,
    seed: u64,
    generator: TicketGenerator,
    stats: DeskStats,
    tickets: ActiveTickets,
    selected: Option<TicketId>,
    draft: String,
    feedback: Option<EvaluationResult>,
    in_flight: Option<InFlight>,
    pending: Option<PendingTimer>,
    queued: Vec<DeskEvent>,
    clock: Duration,
    journal: EventJournal,
    game_over: bool,
}

impl DeskSession {
    /// Open a fresh shift.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` violates its invariants.
    pub fn new(
        catalog: Arc<Catalog>,
        config: DeskConfig,
        seed: u64,
    ) -> Result<Self, DeskConfigError> {
        config.validate()?;
        Ok(Self::open(catalog, config, seed))
    }

    /// Fresh shift on the builtin catalog and configuration.
    #[must_use]
    pub fn with_defaults(seed: u64) -> Self {
        Self::open(
            Arc::new(Catalog::builtin().clone()),
            DeskConfig::builtin().clone(),
            seed,
        )
    }

    fn open(catalog: Arc<Catalog>, config: DeskConfig, seed: u64) -> Self {
        let mut journal = EventJournal::with_capacity(config.log_capacity);
        journal.push(config.shift_start, LOG_BOOT);
        journal.push(config.shift_start, LOG_WELCOME);

        let mut session = Self {
            stats: DeskStats::starting(config.starting_satisfaction, config.starting_stress),
            generator: TicketGenerator::seeded(seed),
            catalog,
            config,
            seed,
            tickets: ActiveTickets::new(),
            selected: None,
            draft: String::new(),
            feedback: None,
            in_flight: None,
            pending: None,
            queued: Vec::new(),
            clock: Duration::ZERO,
            journal,
            game_over: false,
        };
        for _ in 0..session.config.initial_tickets {
            let ticket = session.draw_ticket();
            session.tickets.push(ticket);
        }
        log::info!(
            "desk opened with seed {seed} and {} tickets",
            session.tickets.len()
        );
        session
    }

    /// Throw away every piece of state and start over with `seed`.
    pub fn reset(&mut self, seed: u64) {
        log::info!("desk reset (seed {} -> {seed})", self.seed);
        *self = Self::open(Arc::clone(&self.catalog), self.config.clone(), seed);
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn stats(&self) -> &DeskStats {
        &self.stats
    }

    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    #[must_use]
    pub fn ticket(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| &ticket.id == id)
    }

    #[must_use]
    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.selected.as_ref().and_then(|id| self.ticket(id))
    }

    #[must_use]
    pub const fn feedback(&self) -> Option<&EvaluationResult> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub const fn journal(&self) -> &EventJournal {
        &self.journal
    }

    #[must_use]
    pub const fn config(&self) -> &DeskConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Elapsed session time.
    #[must_use]
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    #[must_use]
    pub const fn is_evaluating(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn phase(&self) -> DeskPhase {
        if self.game_over {
            return DeskPhase::GameOver;
        }
        if let Some(in_flight) = &self.in_flight {
            return DeskPhase::Evaluating(in_flight.ticket_id.clone());
        }
        match &self.selected {
            Some(id) => DeskPhase::Reviewing(id.clone()),
            None => DeskPhase::Idle,
        }
    }

    /// Time until the next scripted step, if one is pending.
    #[must_use]
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|timer| timer.due.saturating_sub(self.clock))
    }

    /// Open `id` in the editor, discarding any draft and feedback.
    pub fn select_ticket(&mut self, id: &TicketId) -> InputOutcome {
        if self.game_over {
            return InputOutcome::Ignored(IgnoreReason::SessionOver);
        }
        if self.ticket(id).is_none() {
            return InputOutcome::Ignored(IgnoreReason::UnknownTicket);
        }
        self.selected = Some(id.clone());
        self.draft.clear();
        self.feedback = None;
        InputOutcome::Accepted
    }

    /// Replace the response draft.
    pub fn set_draft(&mut self, text: impl Into<String>) -> InputOutcome {
        if self.game_over {
            return InputOutcome::Ignored(IgnoreReason::SessionOver);
        }
        self.draft = text.into();
        InputOutcome::Accepted
    }

    /// Append a quick phrase to the draft, space separated.
    pub fn append_canned(&mut self, phrase: &str) -> InputOutcome {
        if self.game_over {
            return InputOutcome::Ignored(IgnoreReason::SessionOver);
        }
        if !self.draft.is_empty() {
            self.draft.push(' ');
        }
        self.draft.push_str(phrase);
        InputOutcome::Accepted
    }

    /// Append the canned response at `index` of [`CANNED_RESPONSES`].
    pub fn append_canned_response(&mut self, index: usize) -> InputOutcome {
        match CANNED_RESPONSES.get(index) {
            Some(phrase) => self.append_canned(phrase),
            None => InputOutcome::Ignored(IgnoreReason::UnknownCannedResponse),
        }
    }

    /// Submit the current draft for the selected ticket.
    pub fn submit_draft(&mut self) -> InputOutcome {
        let draft = self.draft.clone();
        self.submit_response(&draft)
    }

    /// Send `response` for the selected ticket.
    ///
    /// Ignored when the text is empty, nothing is selected, a response is
    /// already in flight, or the shift is over. Once accepted, a
    /// [`DeskEvent::Transmitting`] is queued for the next [`Self::advance`].
    pub fn submit_response(&mut self, response: &str) -> InputOutcome {
        if self.game_over {
            return InputOutcome::Ignored(IgnoreReason::SessionOver);
        }
        if self.in_flight.is_some() {
            return InputOutcome::Ignored(IgnoreReason::Busy);
        }
        if response.is_empty() {
            return InputOutcome::Ignored(IgnoreReason::EmptyResponse);
        }
        let Some(ticket) = self.selected_ticket() else {
            return InputOutcome::Ignored(IgnoreReason::NoSelection);
        };
        let ticket_id = ticket.id.clone();
        let sender = ticket.sender.clone();

        self.draft = response.to_string();
        self.in_flight = Some(InFlight {
            ticket_id: ticket_id.clone(),
            response: response.to_string(),
        });
        self.schedule(self.clock, self.config.transmit_delay(), TimerStep::Grade);
        self.note(format!("Transmitting response to {sender}..."));
        log::debug!("response for {ticket_id} in flight");
        self.queued.push(DeskEvent::Transmitting { ticket_id, sender });
        InputOutcome::Accepted
    }

    /// Move the session clock forward and fire every timer that falls due.
    ///
    /// Queued input events come first, followed by timer transitions in the
    /// order they fired.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<DeskEvent> {
        let target = self.clock.saturating_add(elapsed);
        let mut events = std::mem::take(&mut self.queued);
        while let Some(timer) = self.pending.take_if(|timer| timer.due <= target) {
            self.clock = timer.due;
            match timer.step {
                TimerStep::Grade => self.grade(timer.due, &mut events),
                TimerStep::Clear => self.clear(&mut events),
            }
        }
        self.clock = target;
        events
    }

    /// Fire pending timers until the pipeline is idle.
    pub fn run_until_idle(&mut self) -> Vec<DeskEvent> {
        let mut events = std::mem::take(&mut self.queued);
        while let Some(wait) = self.next_timer_in() {
            events.extend(self.advance(wait));
        }
        events
    }

    /// Read-only view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> DeskSnapshot {
        DeskSnapshot::capture(self)
    }

    fn grade(&mut self, now: Duration, events: &mut Vec<DeskEvent>) {
        let Some(in_flight) = self.in_flight.as_ref() else {
            return;
        };
        let ticket_id = in_flight.ticket_id.clone();
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == ticket_id) else {
            log::warn!("in-flight ticket {ticket_id} vanished before grading");
            self.in_flight = None;
            return;
        };
        let result = evaluate_response(&self.catalog, ticket, &in_flight.response);
        ticket.status = TicketStatus::Resolved;

        self.stats
            .apply_evaluation(&result, self.config.score_per_rating_point);
        self.note(format!("User Rating: {}/5. {}", result.rating, result.comment));
        log::debug!(
            "graded {ticket_id}: rating {} ({:?}), stress now {}",
            result.rating,
            result.tier,
            self.stats.stress
        );
        self.feedback = Some(result.clone());
        events.push(DeskEvent::Graded { ticket_id, result });

        if self.stats.is_burned_out(self.config.stress_limit) {
            self.game_over = true;
            self.in_flight = None;
            self.pending = None;
            self.note(GAME_OVER_NOTICE);
            log::info!(
                "desk burned out after {} tickets (score {})",
                self.stats.tickets_resolved,
                self.stats.score
            );
            events.push(DeskEvent::Burnout { stats: self.stats });
            return;
        }
        self.schedule(now, self.config.resolve_delay(), TimerStep::Clear);
    }

    fn clear(&mut self, events: &mut Vec<DeskEvent>) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        self.tickets.retain(|ticket| ticket.id != in_flight.ticket_id);
        self.selected = None;
        self.feedback = None;
        events.push(DeskEvent::Cleared {
            ticket_id: in_flight.ticket_id,
        });

        if self.tickets.len() < self.config.refill_below {
            let ticket = self.draw_ticket();
            self.note(format!("Incoming alert: {}", ticket.subject));
            self.tickets.push(ticket.clone());
            events.push(DeskEvent::TicketArrived { ticket });
        }
    }

    fn draw_ticket(&mut self) -> Ticket {
        let exclude: Vec<&str> = self
            .tickets
            .iter()
            .map(|ticket| ticket.catalog_id.as_str())
            .collect();
        self.generator.generate(&self.catalog, &exclude)
    }

    fn schedule(&mut self, from: Duration, delay: Duration, step: TimerStep) {
        self.pending = Some(PendingTimer {
            due: from.saturating_add(delay),
            step,
        });
    }

    fn note(&mut self, message: impl Into<String>) {
        let at = self.wall_time();
        self.journal.push(at, message);
    }

    /// Wall-clock reading of the session clock, used for journal stamps.
    #[must_use]
    pub fn wall_time(&self) -> NaiveTime {
        let offset =
            chrono::Duration::from_std(self.clock).unwrap_or_else(|_| chrono::Duration::zero());
        self.config.shift_start.overflowing_add_signed(offset).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, Difficulty};

    fn dns_entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            sender: format!("{id}@north.pole"),
            subject: format!("Outage {id}"),
            body: "Nothing resolves.".to_string(),
            difficulty: Difficulty::Easy,
            keywords: vec!["dns".to_string(), "reboot".to_string()],
            success_message: "Back online.".to_string(),
        }
    }

    fn small_session(seed: u64) -> DeskSession {
        let catalog = Catalog::new(vec![dns_entry("a"), dns_entry("b"), dns_entry("c")]).unwrap();
        DeskSession::new(Arc::new(catalog), DeskConfig::default(), seed).unwrap()
    }

    fn first_ticket(session: &DeskSession) -> TicketId {
        session.tickets()[0].id.clone()
    }

    #[test]
    fn opens_with_two_distinct_tickets_and_welcome_log() {
        let session = DeskSession::with_defaults(1337);
        assert_eq!(session.tickets().len(), 2);
        assert_ne!(
            session.tickets()[0].catalog_id,
            session.tickets()[1].catalog_id
        );
        assert_eq!(session.stats().satisfaction, 85);
        assert_eq!(session.stats().stress, 20);
        assert_eq!(
            session.journal().lines(),
            vec![
                "[09:00:00] System initialized...".to_string(),
                "[09:00:00] Welcome, Senior Support Engineer Claus.".to_string(),
            ]
        );
        assert_eq!(session.phase(), DeskPhase::Idle);
    }

    #[test]
    fn select_clears_draft_and_feedback() {
        let mut session = small_session(5);
        let id = first_ticket(&session);
        session.set_draft("half written");
        assert!(session.select_ticket(&id).is_accepted());
        assert_eq!(session.draft(), "");
        assert_eq!(session.phase(), DeskPhase::Reviewing(id));
        assert_eq!(
            session.select_ticket(&TicketId::from("zzz-1")),
            InputOutcome::Ignored(IgnoreReason::UnknownTicket)
        );
    }

    #[test]
    fn canned_phrases_append_with_single_space() {
        let mut session = small_session(5);
        assert!(session.append_canned_response(4).is_accepted());
        assert!(session.append_canned("Reboot it.").is_accepted());
        assert_eq!(session.draft(), "It works on my sleigh. Reboot it.");
        assert_eq!(
            session.append_canned_response(99),
            InputOutcome::Ignored(IgnoreReason::UnknownCannedResponse)
        );
    }

    #[test]
    fn invalid_submissions_are_ignored() {
        let mut session = small_session(9);
        assert_eq!(
            session.submit_response("dns"),
            InputOutcome::Ignored(IgnoreReason::NoSelection)
        );
        let id = first_ticket(&session);
        session.select_ticket(&id);
        assert_eq!(
            session.submit_response(""),
            InputOutcome::Ignored(IgnoreReason::EmptyResponse)
        );
        assert!(session.submit_response("dns reboot").is_accepted());
        assert_eq!(
            session.submit_response("again"),
            InputOutcome::Ignored(IgnoreReason::Busy)
        );
        assert_eq!(session.phase(), DeskPhase::Evaluating(id));
    }

    #[test]
    fn pipeline_grades_then_clears_and_refills() {
        let mut session = small_session(21);
        let id = first_ticket(&session);
        let sender = session.ticket(&id).unwrap().sender.clone();
        session.select_ticket(&id);
        session.submit_response("I flushed the DNS and did a reboot");
        assert_eq!(session.next_timer_in(), Some(Duration::from_millis(800)));

        let transmitted = session.advance(Duration::from_millis(799));
        assert!(matches!(
            transmitted.as_slice(),
            [DeskEvent::Transmitting { ticket_id, sender: to }] if *ticket_id == id && *to == sender
        ));
        assert_eq!(session.stats().tickets_resolved, 0);
        let graded = session.advance(Duration::from_millis(1));
        assert!(matches!(
            graded.as_slice(),
            [DeskEvent::Graded { result, .. }] if result.rating == 5
        ));
        assert_eq!(session.stats().score, 50);
        assert_eq!(session.stats().tickets_resolved, 1);
        assert_eq!(session.stats().stress, 15);
        assert_eq!(session.stats().satisfaction, 100);
        assert_eq!(session.feedback().map(|f| f.rating), Some(5));
        assert_eq!(session.ticket(&id).unwrap().status, TicketStatus::Resolved);
        assert!(session.is_evaluating());

        let cleared = session.advance(Duration::from_secs(3));
        assert!(matches!(cleared[0], DeskEvent::Cleared { .. }));
        assert!(matches!(cleared[1], DeskEvent::TicketArrived { .. }));
        assert!(session.ticket(&id).is_none());
        assert_eq!(session.tickets().len(), 2);
        assert!(!session.is_evaluating());
        assert!(session.feedback().is_none());
        assert_eq!(session.phase(), DeskPhase::Idle);

        let lines = session.journal().lines();
        assert_eq!(
            lines[2],
            format!("[09:00:00] Transmitting response to {sender}...")
        );
        assert!(lines[3].starts_with("[09:00:00] User Rating: 5/5. Excellent troubleshooting!"));
        assert!(lines[4].starts_with("[09:00:03] Incoming alert: Outage "));
    }

    #[test]
    fn large_advance_fires_both_steps_in_order() {
        let mut session = small_session(4);
        let id = first_ticket(&session);
        session.select_ticket(&id);
        session.submit_response("???");
        let events = session.advance(Duration::from_secs(60));
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], DeskEvent::Transmitting { .. }));
        assert!(matches!(events[1], DeskEvent::Graded { .. }));
        assert!(matches!(events[2], DeskEvent::Cleared { .. }));
        assert!(matches!(events[3], DeskEvent::TicketArrived { .. }));
        assert_eq!(session.clock(), Duration::from_secs(60));
        assert_eq!(session.next_timer_in(), None);
        assert_eq!(session.stats().stress, 30);
        assert_eq!(session.stats().satisfaction, 75);
    }

    #[test]
    fn repeated_confusion_ends_the_shift_for_good() {
        let mut session = small_session(77);
        let mut burned_out = false;
        for _ in 0..8 {
            let id = first_ticket(&session);
            session.select_ticket(&id);
            session.submit_response("???");
            let events = session.run_until_idle();
            if events
                .iter()
                .any(|event| matches!(event, DeskEvent::Burnout { .. }))
            {
                burned_out = true;
                break;
            }
        }
        assert!(burned_out);
        assert_eq!(session.stats().stress, 100);
        assert_eq!(session.stats().tickets_resolved, 8);
        assert!(session.is_game_over());
        assert_eq!(session.phase(), DeskPhase::GameOver);
        assert!(session.phase().is_terminal());
        assert_eq!(session.next_timer_in(), None);
        assert_eq!(
            session.journal().latest().map(|e| e.message.as_str()),
            Some(GAME_OVER_NOTICE)
        );

        let id = first_ticket(&session);
        assert_eq!(
            session.select_ticket(&id),
            InputOutcome::Ignored(IgnoreReason::SessionOver)
        );
        assert_eq!(
            session.submit_response("dns reboot"),
            InputOutcome::Ignored(IgnoreReason::SessionOver)
        );
        assert!(session.advance(Duration::from_secs(10)).is_empty());

        session.reset(78);
        assert!(!session.is_game_over());
        assert_eq!(session.stats().stress, 20);
        assert_eq!(session.stats().tickets_resolved, 0);
        assert_eq!(session.seed(), 78);
    }

    #[test]
    fn selecting_another_ticket_mid_flight_keeps_the_pipeline_on_the_first() {
        let mut session = small_session(31);
        let first = session.tickets()[0].id.clone();
        let second = session.tickets()[1].id.clone();
        session.select_ticket(&first);
        assert!(session.submit_response("dns reboot").is_accepted());

        assert!(session.select_ticket(&second).is_accepted());
        assert_eq!(session.selected_ticket().map(|t| &t.id), Some(&second));
        assert_eq!(session.phase(), DeskPhase::Evaluating(first.clone()));
        assert!(!session.phase().is_terminal());

        let events = session.run_until_idle();
        let graded: Vec<&TicketId> = events
            .iter()
            .filter_map(|event| match event {
                DeskEvent::Graded { ticket_id, .. } => Some(ticket_id),
                _ => None,
            })
            .collect();
        assert_eq!(graded, vec![&first]);
        assert_eq!(
            session.ticket(&second).map(|t| t.status),
            Some(TicketStatus::Open)
        );
        assert!(session.ticket(&first).is_none());
        assert!(session.selected_ticket().is_none());
        assert_eq!(session.phase(), DeskPhase::Idle);
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = DeskConfig {
            log_capacity: 0,
            ..DeskConfig::default()
        };
        let catalog = Arc::new(Catalog::builtin().clone());
        assert!(DeskSession::new(catalog, cfg, 1).is_err());
    }

    #[test]
    fn same_seed_same_desk() {
        let a = DeskSession::with_defaults(0xFEED);
        let b = DeskSession::with_defaults(0xFEED);
        assert_eq!(a.tickets(), b.tickets());
    }
}
