use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use northpole_game::{
    BuiltinData, DeskEngine, DeskEvent, DeskSession, DeskSnapshot, EvaluationTier, TicketId,
    encode_shift_code,
};

use crate::logic::policy::{Responder, ResponderStrategy};

/// Tickets handled per shift when a plan does not say otherwise.
pub const DEFAULT_SHIFT_TICKETS: u32 = 40;

/// Declarative plan for running one scripted shift.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: ResponderStrategy,
    pub max_tickets: Option<u32>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: ResponderStrategy) -> Self {
        Self {
            strategy,
            max_tickets: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_tickets(mut self, max_tickets: u32) -> Self {
        self.max_tickets = Some(max_tickets);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    #[must_use]
    pub fn ticket_budget(&self) -> u32 {
        self.max_tickets.unwrap_or(DEFAULT_SHIFT_TICKETS)
    }
}

/// Assertion hook run after a shift completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One submitted response and what the desk made of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub ticket_id: TicketId,
    pub catalog_id: String,
    pub response: String,
    pub rationale: Option<String>,
    pub rating: u8,
    pub tier: EvaluationTier,
    pub score: u32,
    pub satisfaction: i32,
    pub stress: i32,
    /// Tickets on the desk once the response was cleared (or the shift ended).
    pub desk_size: usize,
    /// Whether every ticket on the desk came from a different catalog entry.
    pub desk_distinct: bool,
    pub burned_out: bool,
}

/// Aggregated shift metrics used by playability analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayabilityMetrics {
    pub tickets_resolved: u32,
    pub final_score: u32,
    pub final_satisfaction: i32,
    pub final_stress: i32,
    pub peak_stress: i32,
    /// Count of ratings 1 through 5, indexed from zero.
    pub rating_counts: [u32; 5],
    pub unique_entries_seen: usize,
    pub burned_out: bool,
}

impl PlayabilityMetrics {
    pub fn record_turn(&mut self, turn: &TurnRecord) {
        if let Some(slot) = usize::from(turn.rating)
            .checked_sub(1)
            .and_then(|idx| self.rating_counts.get_mut(idx))
        {
            *slot = slot.saturating_add(1);
        }
        self.peak_stress = self.peak_stress.max(turn.stress);
    }

    pub fn finalize(&mut self, session: &DeskSession, seen: &HashSet<String>) {
        let stats = session.stats();
        self.tickets_resolved = stats.tickets_resolved;
        self.final_score = stats.score;
        self.final_satisfaction = stats.satisfaction;
        self.final_stress = stats.stress;
        self.peak_stress = self.peak_stress.max(stats.stress);
        self.unique_entries_seen = seen.len();
        self.burned_out = session.is_game_over();
    }

    #[must_use]
    pub fn mean_rating(&self) -> f64 {
        let total: u32 = self.rating_counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u32 = self
            .rating_counts
            .iter()
            .zip(1u32..)
            .map(|(count, rating)| count * rating)
            .sum();
        f64::from(weighted) / f64::from(total)
    }
}

/// Complete record of a scripted shift.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub shift_code: String,
    pub strategy: ResponderStrategy,
    pub ticket_budget: u32,
    pub opening: DeskSnapshot,
    pub turns: Vec<TurnRecord>,
    pub metrics: PlayabilityMetrics,
    pub final_snapshot: DeskSnapshot,
    pub game_over: bool,
}

/// Headless deterministic runner for desk sessions.
#[derive(Debug, Clone)]
pub struct GameTester {
    verbose: bool,
    engine: DeskEngine<BuiltinData>,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            engine: DeskEngine::new(BuiltinData),
        }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play one shift under `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the desk cannot be opened or rejects a scripted input.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut session = self
            .engine
            .open_session(seed)
            .with_context(|| format!("opening desk for seed {seed}"))?;
        let opening = session.snapshot();
        let budget = plan.ticket_budget();
        let mut responder = plan.strategy.create_responder(seed);
        let mut metrics = PlayabilityMetrics::default();
        let mut turns = Vec::new();
        let mut seen: HashSet<String> = session
            .tickets()
            .iter()
            .map(|ticket| ticket.catalog_id.clone())
            .collect();

        if self.verbose {
            log_opening(seed, plan, &opening);
        }

        while session.stats().tickets_resolved < budget && !session.is_game_over() {
            let turn = play_turn(&mut session, responder.as_mut())?;
            seen.extend(
                session
                    .tickets()
                    .iter()
                    .map(|ticket| ticket.catalog_id.clone()),
            );
            metrics.record_turn(&turn);
            if self.verbose {
                log_turn(&turn);
            }
            turns.push(turn);
        }

        metrics.finalize(&session, &seen);
        Ok(SimulationSummary {
            seed,
            shift_code: encode_shift_code(seed),
            strategy: plan.strategy,
            ticket_budget: budget,
            opening,
            turns,
            metrics,
            final_snapshot: session.snapshot(),
            game_over: session.is_game_over(),
        })
    }
}

fn play_turn(
    session: &mut DeskSession,
    responder: &mut (dyn Responder + Send),
) -> Result<TurnRecord> {
    let index = responder
        .pick_ticket(session.tickets())
        .min(session.tickets().len().saturating_sub(1));
    let ticket = session
        .tickets()
        .get(index)
        .cloned()
        .context("desk has no tickets to work")?;
    let decision = responder.respond(session.catalog(), &ticket);

    let selected = session.select_ticket(&ticket.id);
    anyhow::ensure!(
        selected.is_accepted(),
        "selecting {} was ignored: {selected:?}",
        ticket.id
    );
    let submitted = session.submit_response(&decision.text);
    anyhow::ensure!(
        submitted.is_accepted(),
        "{} reply to {} was ignored: {submitted:?}",
        responder.name(),
        ticket.id
    );

    let events = session.run_until_idle();
    let result = events
        .iter()
        .find_map(|event| match event {
            DeskEvent::Graded { result, .. } => Some(result.clone()),
            _ => None,
        })
        .with_context(|| format!("{} was never graded", ticket.id))?;

    let stats = session.stats();
    let distinct: HashSet<&str> = session
        .tickets()
        .iter()
        .map(|t| t.catalog_id.as_str())
        .collect();
    Ok(TurnRecord {
        ticket_id: ticket.id,
        catalog_id: ticket.catalog_id,
        response: decision.text,
        rationale: decision.rationale,
        rating: result.rating,
        tier: result.tier,
        score: stats.score,
        satisfaction: stats.satisfaction,
        stress: stats.stress,
        desk_size: session.tickets().len(),
        desk_distinct: distinct.len() == session.tickets().len(),
        burned_out: session.is_game_over(),
    })
}

fn log_opening(seed: u64, plan: &SimulationPlan, opening: &DeskSnapshot) {
    println!(
        "  ▶ seed {seed} ({}) responder {} budget {} | tickets {} | satisfaction {} stress {}",
        opening.shift_code,
        plan.strategy,
        plan.ticket_budget(),
        opening.tickets.len(),
        opening.stats.satisfaction,
        opening.stats.stress
    );
}

fn log_turn(turn: &TurnRecord) {
    println!(
        "    {} -> {}/5 ({:?}) score {} sat {} stress {} desk {}",
        turn.ticket_id,
        turn.rating,
        turn.tier,
        turn.score,
        turn.satisfaction,
        turn.stress,
        turn.desk_size
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expert_shift_runs_to_budget() {
        let tester = GameTester::new(false);
        let plan = SimulationPlan::new(ResponderStrategy::Expert).with_max_tickets(12);
        let summary = tester.run_plan(&plan, 1337).unwrap();
        assert_eq!(summary.turns.len(), 12);
        assert_eq!(summary.metrics.tickets_resolved, 12);
        assert_eq!(summary.metrics.rating_counts, [0, 0, 0, 0, 12]);
        assert_eq!(summary.metrics.final_score, 600);
        assert!((summary.metrics.mean_rating() - 5.0).abs() < f64::EPSILON);
        assert!(!summary.game_over);
        assert!(summary.turns.iter().all(|turn| turn.desk_size == 2));
    }

    #[test]
    fn clueless_shift_burns_out() {
        let tester = GameTester::new(false);
        let plan = SimulationPlan::new(ResponderStrategy::Clueless);
        let summary = tester.run_plan(&plan, 7).unwrap();
        assert!(summary.game_over);
        assert_eq!(summary.turns.len(), 8);
        assert_eq!(summary.metrics.final_stress, 100);
        assert_eq!(summary.metrics.peak_stress, 100);
        assert!(summary.turns.last().is_some_and(|turn| turn.burned_out));
    }

    #[test]
    fn zero_budget_only_opens_the_desk() {
        let tester = GameTester::new(false);
        let plan = SimulationPlan::new(ResponderStrategy::Canned).with_max_tickets(0);
        let summary = tester.run_plan(&plan, 2).unwrap();
        assert!(summary.turns.is_empty());
        assert_eq!(summary.opening, summary.final_snapshot);
        assert_eq!(summary.metrics.unique_entries_seen, 2);
    }
}
