use anyhow::{Context, Result};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::common::scenario::full_shift_plan;
use crate::logic::game_tester::{GameTester, PlayabilityMetrics, SimulationPlan};
use crate::logic::policy::ResponderStrategy;
use crate::logic::seeds::SeedInfo;

#[derive(Debug, Clone)]
pub struct PlayabilityRecord {
    pub scenario_name: String,
    pub strategy: ResponderStrategy,
    pub seed_code: String,
    pub seed_value: u64,
    pub metrics: PlayabilityMetrics,
}

#[derive(Debug, Clone)]
pub struct PlayabilityAggregate {
    pub scenario_name: String,
    pub strategy: ResponderStrategy,
    pub iterations: usize,
    pub mean_tickets: f64,
    pub std_tickets: f64,
    pub mean_score: f64,
    pub std_score: f64,
    pub mean_final_stress: f64,
    pub mean_final_satisfaction: f64,
    pub game_over_pct: f64,
    pub mean_rating: f64,
    /// Share of responses rated 1 through 5, indexed from zero.
    pub rating_distribution: [f64; 5],
    pub min_unique_entries: usize,
}

/// Playability expectations that must hold across a whole sweep.
#[derive(Debug, Error, PartialEq)]
pub enum TargetViolation {
    #[error("{strategy} responder burned out in {pct:.1}% of shifts; it should never burn out")]
    UnexpectedBurnout { strategy: ResponderStrategy, pct: f64 },
    #[error("{strategy} responder survived {pct:.1}% of shifts; it should always burn out")]
    UnexpectedSurvival { strategy: ResponderStrategy, pct: f64 },
    #[error("{strategy} responder averaged {mean:.2} stars, expected {expected:.2}")]
    RatingDrift {
        strategy: ResponderStrategy,
        mean: f64,
        expected: f64,
    },
}

pub fn run_playability_analysis(
    tester: &GameTester,
    seeds: &[SeedInfo],
    iterations: usize,
) -> Result<Vec<PlayabilityRecord>> {
    run_playability_analysis_with(tester, seeds, iterations, full_shift_plan)
}

fn run_playability_analysis_with<F>(
    tester: &GameTester,
    seeds: &[SeedInfo],
    iterations: usize,
    mut plan_builder: F,
) -> Result<Vec<PlayabilityRecord>>
where
    F: FnMut(ResponderStrategy) -> SimulationPlan,
{
    let iterations = iterations.max(1);
    let mut records =
        Vec::with_capacity(seeds.len() * ResponderStrategy::ALL.len() * iterations);

    for strategy in ResponderStrategy::ALL {
        for seed in seeds {
            for iteration in 0..iterations {
                let iteration_offset = u64::try_from(iteration).unwrap_or(0);
                let iteration_seed = seed.seed.wrapping_add(iteration_offset);
                let plan = plan_builder(strategy);
                let summary = tester.run_plan(&plan, iteration_seed)?;
                let context = format!(
                    "Playability expectation failed for responder {strategy}, seed {} (iteration {})",
                    seed.seed,
                    iteration + 1
                );
                for expectation in &plan.expectations {
                    expectation
                        .evaluate(&summary)
                        .with_context(|| context.clone())?;
                }

                records.push(PlayabilityRecord {
                    scenario_name: format!("Full Shift - {strategy}"),
                    strategy,
                    seed_code: summary.shift_code.clone(),
                    seed_value: iteration_seed,
                    metrics: summary.metrics,
                });
            }
        }
    }

    Ok(records)
}

pub fn aggregate_playability(records: &[PlayabilityRecord]) -> Vec<PlayabilityAggregate> {
    let mut aggregates: BTreeMap<ResponderStrategy, AggregateBuilder> = BTreeMap::new();

    for record in records {
        aggregates
            .entry(record.strategy)
            .or_insert_with(|| AggregateBuilder::new(record))
            .ingest(&record.metrics);
    }

    aggregates
        .into_values()
        .map(AggregateBuilder::finish)
        .collect()
}

/// Check sweep-wide targets: experts and ramblers never burn out, the
/// clueless responder always does, and fixed responders keep a fixed rating.
///
/// # Errors
///
/// Returns the first [`TargetViolation`] found.
pub fn validate_playability_targets(aggregates: &[PlayabilityAggregate]) -> Result<()> {
    for aggregate in aggregates {
        check_aggregate(aggregate)?;
    }
    Ok(())
}

fn check_aggregate(aggregate: &PlayabilityAggregate) -> Result<(), TargetViolation> {
    let strategy = aggregate.strategy;
    let pct = aggregate.game_over_pct * 100.0;
    match strategy {
        ResponderStrategy::Expert | ResponderStrategy::Rambler if aggregate.game_over_pct > 0.0 => {
            return Err(TargetViolation::UnexpectedBurnout { strategy, pct });
        }
        ResponderStrategy::Clueless if aggregate.game_over_pct < 1.0 => {
            return Err(TargetViolation::UnexpectedSurvival { strategy, pct });
        }
        _ => {}
    }
    let expected = match strategy {
        ResponderStrategy::Expert => Some(5.0),
        ResponderStrategy::Rambler => Some(4.0),
        ResponderStrategy::Charmer => Some(3.0),
        ResponderStrategy::Clueless => Some(1.0),
        ResponderStrategy::Canned => None,
    };
    if let Some(expected) = expected
        && aggregate.iterations > 0
        && (aggregate.mean_rating - expected).abs() > 1e-9
    {
        return Err(TargetViolation::RatingDrift {
            strategy,
            mean: aggregate.mean_rating,
            expected,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / f64::from(self.count);
        self.m2 += delta * (value - self.mean);
    }

    const fn mean(&self) -> f64 {
        self.mean
    }

    fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / f64::from(self.count - 1)).sqrt()
        }
    }
}

#[derive(Debug, Clone)]
struct AggregateBuilder {
    scenario_name: String,
    strategy: ResponderStrategy,
    stats_tickets: RunningStats,
    stats_score: RunningStats,
    stats_stress: RunningStats,
    stats_satisfaction: RunningStats,
    iterations: u32,
    game_overs: u32,
    rating_counts: [u32; 5],
    min_unique_entries: usize,
}

impl AggregateBuilder {
    fn new(record: &PlayabilityRecord) -> Self {
        Self {
            scenario_name: record.scenario_name.clone(),
            strategy: record.strategy,
            stats_tickets: RunningStats::default(),
            stats_score: RunningStats::default(),
            stats_stress: RunningStats::default(),
            stats_satisfaction: RunningStats::default(),
            iterations: 0,
            game_overs: 0,
            rating_counts: [0; 5],
            min_unique_entries: usize::MAX,
        }
    }

    fn ingest(&mut self, metrics: &PlayabilityMetrics) {
        self.iterations += 1;
        self.stats_tickets.add(f64::from(metrics.tickets_resolved));
        self.stats_score.add(f64::from(metrics.final_score));
        self.stats_stress.add(f64::from(metrics.final_stress));
        self.stats_satisfaction
            .add(f64::from(metrics.final_satisfaction));
        if metrics.burned_out {
            self.game_overs += 1;
        }
        for (total, count) in self.rating_counts.iter_mut().zip(metrics.rating_counts) {
            *total = total.saturating_add(count);
        }
        self.min_unique_entries = self.min_unique_entries.min(metrics.unique_entries_seen);
    }

    fn finish(self) -> PlayabilityAggregate {
        let denom = f64::from(self.iterations.max(1));
        let responses: u32 = self.rating_counts.iter().sum();
        let response_denom = f64::from(responses.max(1));
        let weighted: u32 = self
            .rating_counts
            .iter()
            .zip(1u32..)
            .map(|(count, rating)| count * rating)
            .sum();
        PlayabilityAggregate {
            scenario_name: self.scenario_name,
            strategy: self.strategy,
            iterations: usize::try_from(self.iterations).unwrap_or(usize::MAX),
            mean_tickets: self.stats_tickets.mean(),
            std_tickets: self.stats_tickets.std_dev(),
            mean_score: self.stats_score.mean(),
            std_score: self.stats_score.std_dev(),
            mean_final_stress: self.stats_stress.mean(),
            mean_final_satisfaction: self.stats_satisfaction.mean(),
            game_over_pct: f64::from(self.game_overs) / denom,
            mean_rating: f64::from(weighted) / response_denom,
            rating_distribution: self
                .rating_counts
                .map(|count| f64::from(count) / response_denom),
            min_unique_entries: if self.iterations == 0 {
                0
            } else {
                self.min_unique_entries
            },
        }
    }
}
