use anyhow::{Result, anyhow};
use northpole_game::constants::GAME_OVER_NOTICE;
use std::collections::HashSet;

use super::{TestScenario, meters_bounded_expectation};
use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::logic::policy::ResponderStrategy;

pub const DETERMINISM_NAME: &str = "Deterministic Shift Replay";
pub const METER_BOUNDS_NAME: &str = "Meter Bounds Under Mixed Replies";
pub const ROTATION_NAME: &str = "Ticket Rotation and Refill";
pub const BURNOUT_NAME: &str = "Burnout Ends the Shift";

pub fn determinism_scenario() -> TestScenario {
    TestScenario::simulation(
        DETERMINISM_NAME,
        SimulationPlan::new(ResponderStrategy::Canned)
            .with_max_tickets(20)
            .with_expectation(replay_expectation),
    )
}

pub fn meter_bounds_scenario() -> TestScenario {
    TestScenario::simulation(
        METER_BOUNDS_NAME,
        SimulationPlan::new(ResponderStrategy::Canned)
            .with_max_tickets(60)
            .with_expectation(meters_bounded_expectation)
            .with_expectation(score_ledger_expectation),
    )
}

pub fn rotation_scenario() -> TestScenario {
    TestScenario::simulation(
        ROTATION_NAME,
        SimulationPlan::new(ResponderStrategy::Rambler)
            .with_max_tickets(30)
            .with_expectation(rotation_expectation),
    )
}

pub fn burnout_scenario() -> TestScenario {
    TestScenario::simulation(
        BURNOUT_NAME,
        SimulationPlan::new(ResponderStrategy::Clueless).with_expectation(burnout_expectation),
    )
}

fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let replay_plan =
        SimulationPlan::new(summary.strategy).with_max_tickets(summary.ticket_budget);
    let replay = GameTester::new(false).run_plan(&replay_plan, summary.seed)?;

    anyhow::ensure!(
        replay.opening == summary.opening,
        "Seed {} opened a different desk on replay",
        summary.seed
    );
    if let Some((idx, (first, second))) = summary
        .turns
        .iter()
        .zip(&replay.turns)
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        return Err(anyhow!(
            "Turn {} diverged on replay: {} rated {} vs {} rated {}",
            idx + 1,
            first.ticket_id,
            first.rating,
            second.ticket_id,
            second.rating
        ));
    }
    anyhow::ensure!(
        replay.turns.len() == summary.turns.len(),
        "Replay resolved {} tickets, first run {}",
        replay.turns.len(),
        summary.turns.len()
    );
    anyhow::ensure!(
        replay.final_snapshot == summary.final_snapshot,
        "Final desk differs on replay"
    );
    Ok(())
}

fn score_ledger_expectation(summary: &SimulationSummary) -> Result<()> {
    let expected: u32 = summary
        .turns
        .iter()
        .map(|turn| u32::from(turn.rating) * 10)
        .sum();
    anyhow::ensure!(
        summary.final_snapshot.stats.score == expected,
        "Score {} does not match ratings total {}",
        summary.final_snapshot.stats.score,
        expected
    );
    anyhow::ensure!(
        usize::try_from(summary.metrics.tickets_resolved).ok() == Some(summary.turns.len()),
        "Resolved counter {} disagrees with {} replies",
        summary.metrics.tickets_resolved,
        summary.turns.len()
    );
    Ok(())
}

fn rotation_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(!summary.game_over, "Rambler should never burn out");
    anyhow::ensure!(
        summary.turns.len() == 30,
        "Expected 30 replies, got {}",
        summary.turns.len()
    );

    let mut seen = HashSet::new();
    for turn in &summary.turns {
        anyhow::ensure!(
            turn.desk_size == 2,
            "Desk held {} tickets after clearing {}",
            turn.desk_size,
            turn.ticket_id
        );
        anyhow::ensure!(
            turn.desk_distinct,
            "Desk showed a duplicate entry after clearing {}",
            turn.ticket_id
        );
        anyhow::ensure!(
            seen.insert(turn.ticket_id.clone()),
            "Ticket {} was answered twice",
            turn.ticket_id
        );
    }
    Ok(())
}

fn burnout_expectation(summary: &SimulationSummary) -> Result<()> {
    let desk = &summary.final_snapshot;
    anyhow::ensure!(summary.game_over, "Clueless replies should burn out");
    anyhow::ensure!(
        summary.turns.len() == 8,
        "Burnout should take 8 replies from stress 20, took {}",
        summary.turns.len()
    );
    anyhow::ensure!(
        desk.stats.stress == 100,
        "Stress should stop at 100, got {}",
        desk.stats.stress
    );
    anyhow::ensure!(
        desk.log
            .last()
            .is_some_and(|line| line.ends_with(GAME_OVER_NOTICE)),
        "Terminal should end with the game over notice"
    );
    anyhow::ensure!(
        desk.phase.is_terminal(),
        "Desk should sit in its terminal phase, found {:?}",
        desk.phase
    );
    anyhow::ensure!(!desk.evaluating, "Nothing should stay in flight");
    Ok(())
}
