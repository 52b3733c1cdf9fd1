use anyhow::Result;
use northpole_game::DeskPhase;

use super::TestScenario;
use crate::logic::game_tester::{SimulationPlan, SimulationSummary};
use crate::logic::policy::ResponderStrategy;

pub const SMOKE_NAME: &str = "Smoke Test";

fn plan() -> SimulationPlan {
    SimulationPlan::new(ResponderStrategy::Expert)
        .with_max_tickets(0)
        .with_expectation(smoke_expectation)
}

pub fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(SMOKE_NAME, plan())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let desk = &summary.final_snapshot;

    anyhow::ensure!(
        desk.tickets.len() == 2,
        "Desk should open with 2 tickets, got {}",
        desk.tickets.len()
    );
    anyhow::ensure!(
        desk.tickets[0].catalog_id != desk.tickets[1].catalog_id,
        "Opening tickets should come from different entries"
    );
    anyhow::ensure!(
        desk.stats.satisfaction == 85,
        "Satisfaction should open at 85, got {}",
        desk.stats.satisfaction
    );
    anyhow::ensure!(
        desk.stats.stress == 20,
        "Stress should open at 20, got {}",
        desk.stats.stress
    );
    anyhow::ensure!(
        desk.stats.score == 0,
        "Score should open at 0, got {}",
        desk.stats.score
    );
    anyhow::ensure!(
        desk.log.len() == 2,
        "Terminal should show the boot lines, got {} lines",
        desk.log.len()
    );
    anyhow::ensure!(
        desk.phase == DeskPhase::Idle,
        "Desk should be idle, got {:?}",
        desk.phase
    );
    anyhow::ensure!(!desk.game_over, "Fresh desk should not be over");

    Ok(())
}
