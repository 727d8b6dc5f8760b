//! Language-agnostic default formulas and shared heuristics.
//!
//! Concrete analyzers fall back to these through the default methods of
//! [`LanguageAnalyzer`](super::LanguageAnalyzer) and reuse the suggestion
//! helpers for the checks every language shares.

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{CodeMetrics, EstimatedImpact, Priority, RefactoringSuggestion, SuggestionType};

use super::lines::{scan, CommentSyntax};
use super::structure::CodeStructure;

/// Cap applied to technical debt.
pub const MAX_TECHNICAL_DEBT: f64 = 100.0;

/// Functions longer than this many lines get an extract suggestion.
pub const LONG_FUNCTION_LINES: usize = 50;

lazy_static! {
    /// Control-flow keywords counted by the base complexity formula.
    static ref CONTROL_FLOW: Regex =
        Regex::new(r"\b(if|elif|for|foreach|while|switch|case|catch|except)\b").unwrap();
}

/// Base complexity: 1 plus one per code line containing a control-flow keyword.
///
/// `try` is not a branch point; its `catch`/`except` arm is.
pub fn complexity(code: &str, syntax: CommentSyntax) -> u32 {
    let branches = scan(code, syntax)
        .iter()
        .filter(|l| l.is_code() && CONTROL_FLOW.is_match(&l.code))
        .count();
    1 + branches as u32
}

/// Base maintainability: mean of a complexity factor, a size factor and the
/// raw comment percentage.
pub fn maintainability(metrics: &CodeMetrics) -> f64 {
    let complexity_factor = (100.0 - 5.0 * (metrics.complexity.max(1) - 1) as f64).max(0.0);
    let size_factor = (100.0 - metrics.lines_of_code as f64 / 10.0).max(0.0);
    let comment_factor = metrics.comment_percentage.clamp(0.0, 100.0);
    clamp_percent((complexity_factor + size_factor + comment_factor) / 3.0)
}

/// Base technical debt: additive penalties for high complexity, low
/// maintainability and sparse comments.
pub fn technical_debt(metrics: &CodeMetrics) -> f64 {
    let mut debt = 0.0;
    if metrics.complexity > 10 {
        debt += 2.0 * (metrics.complexity - 10) as f64;
    }
    if metrics.maintainability < 50.0 {
        debt += 0.5 * (50.0 - metrics.maintainability);
    }
    if metrics.comment_percentage < 20.0 {
        debt += 0.25 * (20.0 - metrics.comment_percentage);
    }
    round2(debt.clamp(0.0, MAX_TECHNICAL_DEBT))
}

/// Clamp into [0, 100] and round to two decimals. NaN maps to 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    round2(value.clamp(0.0, 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a fractional complexity score, never below 1.
pub fn finish_complexity(score: f64) -> u32 {
    if score.is_nan() || score < 1.0 {
        return 1;
    }
    score.round() as u32
}

/// One extract suggestion per function longer than [`LONG_FUNCTION_LINES`].
pub fn long_function_suggestions(structure: &CodeStructure) -> Vec<RefactoringSuggestion> {
    structure
        .functions
        .iter()
        .filter(|f| f.length() > LONG_FUNCTION_LINES)
        .map(|f| {
            let priority = if f.length() > LONG_FUNCTION_LINES * 2 {
                Priority::High
            } else {
                Priority::Medium
            };
            RefactoringSuggestion::new(
                SuggestionType::Extract,
                priority,
                f.line,
                format!(
                    "Function '{}' spans {} lines; extract cohesive steps into helper functions",
                    f.name,
                    f.length()
                ),
                EstimatedImpact::complexity((f.complexity as f64 * 0.3).round())
                    .and_maintainability(10.0),
            )
        })
        .collect()
}

/// Suggest documentation when comments fall below `min_percentage`.
///
/// Tiny sources (under 20 lines of code) are left alone.
pub fn documentation_suggestion(
    metrics: &CodeMetrics,
    min_percentage: f64,
) -> Option<RefactoringSuggestion> {
    if metrics.lines_of_code < 20 || metrics.comment_percentage >= min_percentage {
        return None;
    }
    Some(RefactoringSuggestion::new(
        SuggestionType::Document,
        Priority::Low,
        1,
        format!(
            "Only {:.1}% of lines are comments; document public functions and non-obvious logic",
            metrics.comment_percentage
        ),
        EstimatedImpact::maintainability(5.0),
    ))
}

/// Suggest restructuring when overall complexity exceeds `limit`.
pub fn complexity_suggestion(metrics: &CodeMetrics, limit: u32) -> Option<RefactoringSuggestion> {
    if metrics.complexity <= limit {
        return None;
    }
    let excess = (metrics.complexity - limit) as f64;
    let priority = if metrics.complexity > limit * 2 {
        Priority::High
    } else {
        Priority::Medium
    };
    Some(RefactoringSuggestion::new(
        SuggestionType::Restructure,
        priority,
        1,
        format!(
            "Overall complexity is {}; replace nested conditionals with early returns or lookup tables",
            metrics.complexity
        ),
        EstimatedImpact::complexity((excess * 0.5).round()).and_maintainability(8.0),
    ))
}
