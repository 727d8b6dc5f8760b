//! Core types for analysis results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of issue raised by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Error,
    Warning,
    Info,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Error => "error",
            IssueType::Warning => "warning",
            IssueType::Info => "info",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity levels for issues.
///
/// This is the only severity scale in the crate. Whether an issue is an
/// error, a warning or informational is carried by [`IssueType`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Suggested fix attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFix {
    pub description: String,
    pub replacement: String,
}

/// A single issue raised against a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (1-indexed), when the rule can pinpoint one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<IssueFix>,
}

impl AnalysisIssue {
    pub fn new(
        rule: &str,
        issue_type: IssueType,
        severity: Severity,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            severity,
            message: message.into(),
            line,
            column: None,
            rule: rule.to_string(),
            fix: None,
        }
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_fix(mut self, description: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.fix = Some(IssueFix {
            description: description.into(),
            replacement: replacement.into(),
        });
        self
    }
}

/// Kind of refactoring being proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Extract,
    Inline,
    Rename,
    Restructure,
    Optimize,
    Modernize,
    Document,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::Extract => "extract",
            SuggestionType::Inline => "inline",
            SuggestionType::Rename => "rename",
            SuggestionType::Restructure => "restructure",
            SuggestionType::Optimize => "optimize",
            SuggestionType::Modernize => "modernize",
            SuggestionType::Document => "document",
        }
    }
}

impl std::fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Projected effect of applying a suggestion.
///
/// These numbers are heuristic estimates attached by the rule that produced
/// the suggestion. They are not measured by re-analysing refactored code and
/// should only be used to rank suggestions against each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedImpact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_reduction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainability_improvement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_improvement: Option<String>,
}

impl EstimatedImpact {
    pub fn complexity(reduction: f64) -> Self {
        Self {
            complexity_reduction: Some(reduction),
            ..Default::default()
        }
    }

    pub fn maintainability(improvement: f64) -> Self {
        Self {
            maintainability_improvement: Some(improvement),
            ..Default::default()
        }
    }

    pub fn performance(description: &str) -> Self {
        Self {
            performance_improvement: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn and_maintainability(mut self, improvement: f64) -> Self {
        self.maintainability_improvement = Some(improvement);
        self
    }
}

/// A proposed refactoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringSuggestion {
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub priority: Priority,
    pub description: String,
    pub line: usize,
    pub estimated_impact: EstimatedImpact,
}

impl RefactoringSuggestion {
    pub fn new(
        suggestion_type: SuggestionType,
        priority: Priority,
        line: usize,
        description: impl Into<String>,
        estimated_impact: EstimatedImpact,
    ) -> Self {
        Self {
            suggestion_type,
            priority,
            description: description.into(),
            line,
            estimated_impact,
        }
    }
}

/// Quantitative metrics for one source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    /// Heuristic cyclomatic complexity, never below 1.
    pub complexity: u32,
    /// Maintainability index in [0, 100].
    pub maintainability: f64,
    /// Non-blank, non-comment lines.
    pub lines_of_code: usize,
    pub comment_lines: usize,
    /// Comment lines as a share of all non-blank lines, in [0, 100].
    pub comment_percentage: f64,
    pub function_count: usize,
    pub average_function_length: f64,
    /// Imported module names, deduplicated in first-seen order.
    pub dependencies: Vec<String>,
    /// Remediation penalty in [0, 100].
    pub technical_debt: f64,
}

impl Default for CodeMetrics {
    fn default() -> Self {
        Self {
            complexity: 1,
            maintainability: 100.0,
            lines_of_code: 0,
            comment_lines: 0,
            comment_percentage: 0.0,
            function_count: 0,
            average_function_length: 0.0,
            dependencies: Vec::new(),
            technical_debt: 0.0,
        }
    }
}

/// The output of analysing one source text with one set of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub file_path: String,
    pub language: String,
    pub issues: Vec<AnalysisIssue>,
    pub metrics: CodeMetrics,
    pub suggestions: Vec<RefactoringSuggestion>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Highest severity among the issues, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    /// Number of issues of the given type.
    pub fn count_by_type(&self, issue_type: IssueType) -> usize {
        self.issues
            .iter()
            .filter(|i| i.issue_type == issue_type)
            .count()
    }

    /// Issues raised by a given rule.
    pub fn issues_for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a AnalysisIssue> {
        self.issues.iter().filter(move |i| i.rule == rule)
    }
}
