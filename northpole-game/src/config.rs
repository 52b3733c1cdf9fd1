//! Desk tuning: scripted delays, rotation threshold, starting meters.
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::constants::METER_MAX;

/// Errors raised when desk configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum DeskConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("initial tickets ({initial}) must not exceed the refill threshold ({refill_below})")]
    InitialExceedsRefill { initial: usize, refill_below: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Simulated latency between submitting and grading.
    #[serde(default = "DeskConfig::default_transmit_delay_ms")]
    pub transmit_delay_ms: u64,
    /// Time the graded ticket lingers before it is cleared.
    #[serde(default = "DeskConfig::default_resolve_delay_ms")]
    pub resolve_delay_ms: u64,
    /// A replacement is fetched while fewer than this many tickets remain.
    #[serde(default = "DeskConfig::default_refill_below")]
    pub refill_below: usize,
    #[serde(default = "DeskConfig::default_initial_tickets")]
    pub initial_tickets: usize,
    #[serde(default = "DeskConfig::default_log_capacity")]
    pub log_capacity: usize,
    #[serde(default = "DeskConfig::default_starting_satisfaction")]
    pub starting_satisfaction: i32,
    #[serde(default = "DeskConfig::default_starting_stress")]
    pub starting_stress: i32,
    #[serde(default = "DeskConfig::default_score_per_rating_point")]
    pub score_per_rating_point: u32,
    /// Stress reading that ends the shift.
    #[serde(default = "DeskConfig::default_stress_limit")]
    pub stress_limit: i32,
    /// Wall-clock time the session clock starts at; used for journal stamps.
    #[serde(default = "DeskConfig::default_shift_start")]
    pub shift_start: NaiveTime,
}

impl DeskConfig {
    #[must_use]
    pub const fn default_transmit_delay_ms() -> u64 {
        800
    }

    #[must_use]
    pub const fn default_resolve_delay_ms() -> u64 {
        3_000
    }

    #[must_use]
    pub const fn default_refill_below() -> usize {
        4
    }

    #[must_use]
    pub const fn default_initial_tickets() -> usize {
        2
    }

    #[must_use]
    pub const fn default_log_capacity() -> usize {
        16
    }

    #[must_use]
    pub const fn default_starting_satisfaction() -> i32 {
        85
    }

    #[must_use]
    pub const fn default_starting_stress() -> i32 {
        20
    }

    #[must_use]
    pub const fn default_score_per_rating_point() -> u32 {
        10
    }

    #[must_use]
    pub const fn default_stress_limit() -> i32 {
        METER_MAX
    }

    #[must_use]
    pub fn default_shift_start() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
    }

    /// Configuration compiled into the crate.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static CONFIG: OnceLock<DeskConfig> = OnceLock::new();
        CONFIG.get_or_init(|| {
            Self::from_json(include_str!("../assets/data/desk.json")).expect("valid desk config")
        })
    }

    /// Parse and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), DeskConfigError> {
        check_range(
            "starting_satisfaction",
            i64::from(self.starting_satisfaction),
            0,
            i64::from(METER_MAX),
        )?;
        check_range(
            "stress_limit",
            i64::from(self.stress_limit),
            1,
            i64::from(METER_MAX),
        )?;
        check_range(
            "starting_stress",
            i64::from(self.starting_stress),
            0,
            i64::from(self.stress_limit) - 1,
        )?;
        check_range("refill_below", count_as_i64(self.refill_below), 1, 64)?;
        check_range("log_capacity", count_as_i64(self.log_capacity), 1, 1_024)?;
        if self.initial_tickets > self.refill_below {
            return Err(DeskConfigError::InitialExceedsRefill {
                initial: self.initial_tickets,
                refill_below: self.refill_below,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn transmit_delay(&self) -> Duration {
        Duration::from_millis(self.transmit_delay_ms)
    }

    #[must_use]
    pub const fn resolve_delay(&self) -> Duration {
        Duration::from_millis(self.resolve_delay_ms)
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            transmit_delay_ms: Self::default_transmit_delay_ms(),
            resolve_delay_ms: Self::default_resolve_delay_ms(),
            refill_below: Self::default_refill_below(),
            initial_tickets: Self::default_initial_tickets(),
            log_capacity: Self::default_log_capacity(),
            starting_satisfaction: Self::default_starting_satisfaction(),
            starting_stress: Self::default_starting_stress(),
            score_per_rating_point: Self::default_score_per_rating_point(),
            stress_limit: Self::default_stress_limit(),
            shift_start: Self::default_shift_start(),
        }
    }
}

fn count_as_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

const fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), DeskConfigError> {
    if value < min || value > max {
        return Err(DeskConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
