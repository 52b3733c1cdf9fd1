//! Session meters: score, resolved count, satisfaction and stress.
use serde::{Deserialize, Serialize};

use crate::constants::{METER_MAX, METER_MIN};
use crate::evaluator::EvaluationResult;

/// Clamp a meter reading into `0..=100`.
#[must_use]
pub const fn clamp_meter(value: i32) -> i32 {
    if value < METER_MIN {
        METER_MIN
    } else if value > METER_MAX {
        METER_MAX
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskStats {
    pub score: u32,
    pub tickets_resolved: u32,
    pub satisfaction: i32,
    pub stress: i32,
}

impl Default for DeskStats {
    fn default() -> Self {
        Self::starting(85, 20)
    }
}

impl DeskStats {
    /// Fresh meters with the given starting readings (clamped).
    #[must_use]
    pub const fn starting(satisfaction: i32, stress: i32) -> Self {
        Self {
            score: 0,
            tickets_resolved: 0,
            satisfaction: clamp_meter(satisfaction),
            stress: clamp_meter(stress),
        }
    }

    /// Fold a graded response into the meters.
    ///
    /// Score grows by `rating * points_per_rating`; both meters stay in range.
    pub fn apply_evaluation(&mut self, result: &EvaluationResult, points_per_rating: u32) {
        let gained = u32::from(result.rating).saturating_mul(points_per_rating);
        self.score = self.score.saturating_add(gained);
        self.tickets_resolved = self.tickets_resolved.saturating_add(1);
        self.satisfaction = clamp_meter(self.satisfaction.saturating_add(result.satisfaction_impact));
        self.stress = clamp_meter(self.stress.saturating_add(result.stress_impact));
    }

    /// Whether stress has reached `limit`.
    #[must_use]
    pub const fn is_burned_out(&self, limit: i32) -> bool {
        self.stress >= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationTier;

    fn result(rating: u8, stress: i32, satisfaction: i32) -> EvaluationResult {
        EvaluationResult {
            rating,
            comment: String::new(),
            stress_impact: stress,
            satisfaction_impact: satisfaction,
            tier: EvaluationTier::Effort,
            keyword_matches: 0,
        }
    }

    #[test]
    fn clamp_meter_bounds_values() {
        assert_eq!(clamp_meter(-3), 0);
        assert_eq!(clamp_meter(42), 42);
        assert_eq!(clamp_meter(250), 100);
    }

    #[test]
    fn meters_stay_in_range_under_extreme_deltas() {
        let mut stats = DeskStats::default();
        for delta in [i32::MAX, -7, -i32::MAX, 55, 300, -300] {
            stats.apply_evaluation(&result(5, delta, -delta), 10);
            assert!((0..=100).contains(&stats.stress));
            assert!((0..=100).contains(&stats.satisfaction));
        }
        assert_eq!(stats.tickets_resolved, 6);
        assert_eq!(stats.score, 300);
    }

    #[test]
    fn burnout_triggers_at_limit() {
        let mut stats = DeskStats::starting(85, 95);
        assert!(!stats.is_burned_out(100));
        stats.apply_evaluation(&result(1, 10, -10), 10);
        assert_eq!(stats.stress, 100);
        assert!(stats.is_burned_out(100));
    }
}
