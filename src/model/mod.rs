//! Shared vocabulary for analysis results and caller options.
//!
//! Every other module reads and writes these types. They serialize with
//! camelCase field names so a result or an options payload survives a JSON
//! round-trip through the embedding protocol layer unchanged.

mod options;
mod types;

pub use options::{
    AnalysisOptions, ComplexityBuckets, PercentBuckets, ResolvedOptions, ThresholdError,
    ThresholdValue, Thresholds,
};
pub use types::{
    AnalysisIssue, AnalysisResult, CodeMetrics, EstimatedImpact, IssueFix, IssueType, Priority,
    RefactoringSuggestion, Severity, SuggestionType,
};
