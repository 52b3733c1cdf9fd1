//! Keyword heuristics that grade a free-text response to a ticket.
//!
//! Grading is a pure function of the catalog, the ticket and the response:
//! the same inputs always produce the same [`EvaluationResult`].
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry};
use crate::constants::{
    CHARM_COMMENT, CHARM_PHRASES, CONFUSED_COMMENT, EFFORT_COMMENT, EFFORT_LENGTH_THRESHOLD,
    EXPERT_MATCHES, FALLBACK_COMMENT, PRAISE_PREFIX,
};
use crate::ticket::Ticket;

/// Which scoring rule produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationTier {
    /// Two or more keywords hit.
    Expert,
    /// One keyword, or a long enough answer.
    Effort,
    /// No technical content, but the festive charm landed.
    Charm,
    /// Nothing useful.
    Confused,
    /// The ticket's catalog entry could not be found.
    Fallback,
}

impl EvaluationTier {
    #[must_use]
    pub const fn rating(self) -> u8 {
        match self {
            Self::Expert => 5,
            Self::Effort => 4,
            Self::Charm | Self::Fallback => 3,
            Self::Confused => 1,
        }
    }

    #[must_use]
    pub const fn stress_impact(self) -> i32 {
        match self {
            Self::Expert => -5,
            Self::Effort => 0,
            Self::Charm | Self::Fallback => 2,
            Self::Confused => 10,
        }
    }

    #[must_use]
    pub const fn satisfaction_impact(self) -> i32 {
        match self {
            Self::Expert => 20,
            Self::Effort => 10,
            Self::Charm | Self::Fallback => 5,
            Self::Confused => -10,
        }
    }
}

/// Outcome of grading one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// User rating on a 1-5 scale.
    pub rating: u8,
    pub comment: String,
    pub stress_impact: i32,
    pub satisfaction_impact: i32,
    pub tier: EvaluationTier,
    /// Number of catalog keywords found in the response.
    pub keyword_matches: usize,
}

impl EvaluationResult {
    fn from_tier(tier: EvaluationTier, comment: String, keyword_matches: usize) -> Self {
        Self {
            rating: tier.rating(),
            comment,
            stress_impact: tier.stress_impact(),
            satisfaction_impact: tier.satisfaction_impact(),
            tier,
            keyword_matches,
        }
    }
}

/// Resolve the catalog entry a ticket was generated from.
///
/// The explicit back-reference wins; the sender is only consulted when the
/// referenced id is unknown to this catalog.
#[must_use]
pub fn resolve_entry<'c>(catalog: &'c Catalog, ticket: &Ticket) -> Option<&'c CatalogEntry> {
    catalog
        .get(&ticket.catalog_id)
        .or_else(|| catalog.find_by_sender(&ticket.sender))
}

/// Count how many of `keywords` occur in `response`, ignoring case.
#[must_use]
pub fn count_keyword_matches(keywords: &[String], response: &str) -> usize {
    let lower = response.to_lowercase();
    keywords
        .iter()
        .filter(|kw| lower.contains(kw.to_lowercase().as_str()))
        .count()
}

/// Grade `response` to `ticket`.
#[must_use]
pub fn evaluate_response(catalog: &Catalog, ticket: &Ticket, response: &str) -> EvaluationResult {
    let Some(entry) = resolve_entry(catalog, ticket) else {
        log::warn!(
            "no catalog entry for ticket {} from {}; using fallback grade",
            ticket.id,
            ticket.sender
        );
        return EvaluationResult::from_tier(
            EvaluationTier::Fallback,
            FALLBACK_COMMENT.to_string(),
            0,
        );
    };

    let lower = response.to_lowercase();
    let matches = count_keyword_matches(&entry.keywords, &lower);

    if matches >= EXPERT_MATCHES {
        let comment = format!("{PRAISE_PREFIX} {}", entry.success_message);
        return EvaluationResult::from_tier(EvaluationTier::Expert, comment, matches);
    }
    if matches == 1 || lower.encode_utf16().count() > EFFORT_LENGTH_THRESHOLD {
        return EvaluationResult::from_tier(
            EvaluationTier::Effort,
            EFFORT_COMMENT.to_string(),
            matches,
        );
    }
    if CHARM_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return EvaluationResult::from_tier(
            EvaluationTier::Charm,
            CHARM_COMMENT.to_string(),
            matches,
        );
    }
    EvaluationResult::from_tier(
        EvaluationTier::Confused,
        CONFUSED_COMMENT.to_string(),
        matches,
    )
}
