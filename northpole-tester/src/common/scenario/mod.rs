use anyhow::Result;

use crate::logic::game_tester::{SimulationPlan, SimulationSummary};
use crate::logic::policy::ResponderStrategy;

pub mod catalog;
pub mod smoke;

/// A named plan the logic tester runs across seeds.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Meters stay within 0..=100 after every response.
pub(crate) fn meters_bounded_expectation(summary: &SimulationSummary) -> Result<()> {
    for turn in &summary.turns {
        anyhow::ensure!(
            (0..=100).contains(&turn.satisfaction),
            "satisfaction {} out of range after {}",
            turn.satisfaction,
            turn.ticket_id
        );
        anyhow::ensure!(
            (0..=100).contains(&turn.stress),
            "stress {} out of range after {}",
            turn.stress,
            turn.ticket_id
        );
    }
    Ok(())
}

/// Plan for a full shift with the default ticket budget.
#[must_use]
pub fn full_shift_plan(strategy: ResponderStrategy) -> SimulationPlan {
    SimulationPlan::new(strategy).with_expectation(meters_bounded_expectation)
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke::smoke_scenario()),
        "determinism" | "replay" => Some(catalog::determinism_scenario()),
        "meter-bounds" | "meters" => Some(catalog::meter_bounds_scenario()),
        "rotation" | "refill" => Some(catalog::rotation_scenario()),
        "burnout" | "game-over" => Some(catalog::burnout_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", smoke::SMOKE_NAME),
        ("determinism", catalog::DETERMINISM_NAME),
        ("meter-bounds", catalog::METER_BOUNDS_NAME),
        ("rotation", catalog::ROTATION_NAME),
        ("burnout", catalog::BURNOUT_NAME),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::game_tester::GameTester;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, name) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, name);
        }
        assert!(get_scenario("SMOKE").is_some());
        assert!(get_scenario("game-over").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn full_shift_plan_uses_default_budget() {
        let plan = full_shift_plan(ResponderStrategy::Charmer);
        assert_eq!(plan.max_tickets, None);
        assert_eq!(plan.expectations.len(), 1);
        let summary = GameTester::new(false).run_plan(&plan, 99).unwrap();
        for expectation in &plan.expectations {
            expectation.evaluate(&summary).unwrap();
        }
    }

    #[test]
    fn bounds_expectation_rejects_runaway_stress() {
        let plan = SimulationPlan::new(ResponderStrategy::Expert).with_max_tickets(1);
        let mut summary = GameTester::new(false).run_plan(&plan, 3).unwrap();
        summary.turns[0].stress = 101;
        let err = meters_bounded_expectation(&summary).unwrap_err();
        assert!(err.to_string().contains("stress 101"));
    }
}
