//! Core trait for language analysis.

use crate::model::{AnalysisIssue, CodeMetrics, RefactoringSuggestion, Thresholds};

use super::base;
use super::lines::CommentSyntax;
use super::structure::CodeStructure;

/// Language-specific analyzer trait.
///
/// Each language implements this trait to supply the heuristics that the
/// fixed orchestration in [`analyze_source`](super::analyze_source) runs in
/// order: complexity, maintainability, structure extraction, rule checks and
/// suggestions.
///
/// # Thread Safety
///
/// Analyzers are shared across threads and between concurrent calls, so
/// they must not keep per-call state. Source text always arrives as an
/// argument.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python", "go").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Comment delimiters used for line classification.
    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::C_STYLE
    }

    /// Rule ids enabled when the caller does not list rules explicitly.
    fn default_rules(&self) -> &'static [&'static str];

    /// Short description of a rule id this analyzer understands.
    fn rule_description(&self, _rule: &str) -> Option<&'static str> {
        None
    }

    /// Threshold defaults for this language.
    fn default_thresholds(&self) -> Thresholds {
        Thresholds::default()
    }

    /// Heuristic cyclomatic complexity of `code`, at least 1.
    fn calculate_complexity(&self, code: &str) -> u32 {
        base::complexity(code, self.comment_syntax())
    }

    /// Maintainability index in [0, 100].
    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        base::maintainability(metrics)
    }

    /// Technical debt in [0, 100]. Consumes complexity and maintainability.
    fn calculate_technical_debt(&self, metrics: &CodeMetrics) -> f64 {
        base::technical_debt(metrics)
    }

    /// Extract functions, classes, imports and exports in one pass.
    fn analyze_code_structure(&self, code: &str) -> CodeStructure;

    /// Run the requested rules. Unknown rule ids are ignored.
    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue>;

    /// Propose refactorings from pattern counts.
    fn generate_language_specific_suggestions(
        &self,
        code: &str,
        metrics: &CodeMetrics,
    ) -> Vec<RefactoringSuggestion>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
