//! Error types and utilities for the nav-route toolkit
//!
//! Provides the shared error enum and fuzzy matching used to suggest the
//! intended scorer plugin when a configuration names an unknown one.

use strsim::{jaro_winkler, normalized_levenshtein};
use thiserror::Error;

/// Minimum similarity for a fuzzy suggestion (0.0 to 1.0).
///
/// Plugin type names are long CamelCase words ("DistanceScorer"), so typos are
/// mostly dropped or swapped letters. 0.65 catches "DistanceScorr" and
/// "CostMapScorer" while rejecting unrelated names such as "FakeScorer".
const MIN_SUGGESTION_SCORE: f64 = 0.65;

/// Find the best fuzzy match for `input` among `candidates`
///
/// Combines Jaro-Winkler (70%) and normalized Levenshtein (30%) on the
/// lowercased strings. A shared-suffix bonus is applied when both strings end
/// in "scorer", since every plugin type does and the distinguishing part is the
/// prefix.
fn find_best_fuzzy_match(input: &str, candidates: &[&str]) -> Option<String> {
    let input_lower = input.to_lowercase();
    let mut best_match = None;
    let mut best_score = 0.0f64;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();

        let jw_score = jaro_winkler(&input_lower, &candidate_lower);
        let lev_score = normalized_levenshtein(&input_lower, &candidate_lower);
        let mut score = (jw_score * 0.7) + (lev_score * 0.3);

        // Blend in the prefix similarity when both carry the suffix
        if let (Some(a), Some(b)) = (
            input_lower.strip_suffix("scorer"),
            candidate_lower.strip_suffix("scorer"),
        ) {
            if !a.is_empty() && !b.is_empty() {
                score = (score + jaro_winkler(a, b)) / 2.0;
            }
        }

        if score >= MIN_SUGGESTION_SCORE && score > best_score {
            best_score = score;
            best_match = Some((*candidate).to_string());
        }
    }

    best_match
}

/// Suggest the intended name for a possibly misspelled `input`
///
/// Returns `None` when `input` already names a candidate exactly. A
/// case-insensitive exact match suggests the correctly cased candidate.
pub fn suggest_correction(input: &str, candidates: &[&str]) -> Option<String> {
    if candidates.contains(&input) {
        return None;
    }

    if let Some(candidate) = candidates.iter().find(|c| c.eq_ignore_ascii_case(input)) {
        return Some((*candidate).to_string());
    }

    find_best_fuzzy_match(input, candidates)
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

/// Main error type for nav-route operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configured scorer plugin type does not exist
    #[error("unknown edge scorer plugin '{name}'{}", did_you_mean(.suggestion))]
    UnknownScorer {
        name: String,
        suggestion: Option<String>,
    },

    /// Invalid configuration or parameters
    #[error("invalid configuration for '{scope}': {reason}")]
    InvalidConfig { scope: String, reason: String },

    /// Graph structure violates an invariant (duplicate ids, dangling edges)
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Route edges do not chain from the start node
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// Occupancy grid dimensions or resolution are unusable
    #[error("invalid occupancy grid: {0}")]
    InvalidGrid(String),

    /// Node id not present in the graph
    #[error("unknown node id {0}")]
    UnknownNode(u32),

    /// Edge id not present in the graph
    #[error("unknown edge id {0}")]
    UnknownEdge(u32),

    /// Search exhausted all valid edges without reaching the goal
    #[error("no valid route from node {start} to node {goal}")]
    NoRoute { start: u32, goal: u32 },

    /// Input file could not be decoded
    #[error("failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfig`]
    pub fn config(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            scope: scope.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience result type for nav-route operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGINS: &[&str] = &[
        "DistanceScorer",
        "PenaltyScorer",
        "TimeScorer",
        "SemanticScorer",
        "CostmapScorer",
        "AdjustEdgesScorer",
    ];

    #[test]
    fn test_suggest_correction_typos() {
        assert_eq!(
            suggest_correction("DistanceScorr", PLUGINS),
            Some("DistanceScorer".to_string())
        );
        assert_eq!(
            suggest_correction("CostMapScorer", PLUGINS),
            Some("CostmapScorer".to_string())
        );
        assert_eq!(
            suggest_correction("AdjustEdgeScorer", PLUGINS),
            Some("AdjustEdgesScorer".to_string())
        );
    }

    #[test]
    fn test_suggest_correction_exact_match() {
        assert_eq!(suggest_correction("TimeScorer", PLUGINS), None);
    }

    #[test]
    fn test_suggest_correction_rejects_unrelated() {
        assert_eq!(suggest_correction("FakePluginPath", PLUGINS), None);
    }

    #[test]
    fn test_unknown_scorer_display() {
        let err = Error::UnknownScorer {
            name: "TimeScorr".to_string(),
            suggestion: Some("TimeScorer".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "unknown edge scorer plugin 'TimeScorr' (did you mean 'TimeScorer'?)"
        );

        let err = Error::UnknownScorer {
            name: "Nope".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown edge scorer plugin 'Nope'");
    }
}
