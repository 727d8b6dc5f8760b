//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the serialized result list, for programmatic consumption

use std::collections::BTreeMap;
use std::io::{self, Write};

use colored::*;
use serde::{Deserialize, Serialize};

use crate::model::{AnalysisIssue, AnalysisResult, Severity};

/// Grade floors on the maintainability index.
pub mod grades {
    pub const A_MIN: f64 = 85.0;
    pub const B_MIN: f64 = 70.0;
    pub const C_MIN: f64 = 55.0;
    pub const D_MIN: f64 = 40.0;
}

/// Letter grade for a maintainability index in [0, 100].
pub fn grade_for(maintainability: f64) -> &'static str {
    match maintainability {
        m if m >= grades::A_MIN => "A",
        m if m >= grades::B_MIN => "B",
        m if m >= grades::C_MIN => "C",
        m if m >= grades::D_MIN => "D",
        _ => "F",
    }
}

/// Aggregate over a batch of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub files: usize,
    pub issues: usize,
    pub suggestions: usize,
    /// Issue counts keyed by severity name.
    pub by_severity: BTreeMap<String, usize>,
    /// Mean maintainability, weighted by lines of code.
    pub maintainability: f64,
    pub technical_debt: f64,
    pub grade: String,
}

impl Summary {
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        let mut by_severity = BTreeMap::new();
        for issue in results.iter().flat_map(|r| &r.issues) {
            *by_severity.entry(issue.severity.to_string()).or_insert(0) += 1;
        }

        // Every file weighs at least one line so empty files still count.
        let (weighted, weight) = results.iter().fold((0.0, 0.0), |(sum, total), r| {
            let w = r.metrics.lines_of_code.max(1) as f64;
            (sum + r.metrics.maintainability * w, total + w)
        });
        let maintainability = if weight > 0.0 { weighted / weight } else { 100.0 };
        let technical_debt = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.metrics.technical_debt).sum::<f64>() / results.len() as f64
        };

        Self {
            files: results.len(),
            issues: results.iter().map(|r| r.issues.len()).sum(),
            suggestions: results.iter().map(|r| r.suggestions.len()).sum(),
            by_severity,
            maintainability,
            technical_debt,
            grade: grade_for(maintainability).to_string(),
        }
    }

    /// Number of issues at or above `severity`.
    pub fn count_at_or_above(&self, severity: Severity) -> usize {
        self.by_severity
            .iter()
            .filter(|(name, _)| name.parse::<Severity>().is_ok_and(|s| s >= severity))
            .map(|(_, count)| count)
            .sum()
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Write results as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: &mut W, results: &[AnalysisResult]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty<W: Write>(
    out: &mut W,
    results: &[AnalysisResult],
    show_suggestions: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "codelens".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;

    for result in results {
        write_file(out, result, show_suggestions)?;
    }

    write_summary(out, &Summary::from_results(results))?;
    writeln!(out)
}

fn write_file<W: Write>(out: &mut W, result: &AnalysisResult, show_suggestions: bool) -> io::Result<()> {
    let m = &result.metrics;
    writeln!(
        out,
        "  {}  {}",
        result.file_path.blue().bold(),
        format!("[{}]", result.language).dimmed()
    )?;
    writeln!(
        out,
        "    {}",
        format!(
            "loc {}  functions {}  complexity {}  maintainability {:.1}  debt {:.1}  comments {:.1}%",
            m.lines_of_code,
            m.function_count,
            m.complexity,
            m.maintainability,
            m.technical_debt,
            m.comment_percentage
        )
        .dimmed()
    )?;

    if !m.dependencies.is_empty() {
        writeln!(out, "    {} {}", "imports:".dimmed(), m.dependencies.join(", "))?;
    }

    if result.issues.is_empty() {
        writeln!(out, "    {}", "no issues".green())?;
    }
    for issue in &result.issues {
        write_issue(out, issue)?;
    }

    if show_suggestions && !result.suggestions.is_empty() {
        writeln!(out, "    {} ({}):", "Suggestions".bold(), result.suggestions.len())?;
        for s in &result.suggestions {
            writeln!(
                out,
                "      {:<8} {:<12} {}  {}",
                format!("[{}]", s.priority),
                s.suggestion_type.as_str().cyan(),
                format!("line {}", s.line).dimmed(),
                s.description
            )?;
        }
    }

    writeln!(out)
}

fn write_issue<W: Write>(out: &mut W, issue: &AnalysisIssue) -> io::Result<()> {
    let location = match issue.column {
        Some(col) => format!("{}:{}", issue.line, col),
        None => issue.line.to_string(),
    };
    writeln!(
        out,
        "    {} {:<22} {:<8} {}",
        severity_tag(issue.severity),
        issue.rule.dimmed(),
        location.dimmed(),
        issue.message
    )?;
    if let Some(fix) = &issue.fix {
        writeln!(
            out,
            "             {} {} ({})",
            "fix:".dimmed(),
            fix.description,
            fix.replacement.green()
        )?;
    }
    Ok(())
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRIT".red().bold(),
        Severity::High => "HIGH".red(),
        Severity::Medium => "MED ".yellow(),
        Severity::Low => "LOW ".blue(),
    }
}

fn colored_grade(grade: &str) -> ColoredString {
    match grade {
        "A" => grade.green().bold(),
        "B" => grade.green(),
        "C" => grade.yellow(),
        "D" => grade.yellow().bold(),
        _ => grade.red(),
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    let plural = if summary.files != 1 { "s" } else { "" };
    write!(
        out,
        "  {} {} file{}  {} issues",
        "Summary:".bold(),
        summary.files,
        plural,
        summary.issues
    )?;

    let breakdown: Vec<String> = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ]
    .iter()
    .filter_map(|s| {
        summary
            .by_severity
            .get(s.as_str())
            .map(|count| format!("{} {}", count, s))
    })
    .collect();
    if !breakdown.is_empty() {
        write!(out, " ({})", breakdown.join(", "))?;
    }

    writeln!(
        out,
        "  {} suggestions  Maintainability: {:.1}  Grade: {}",
        summary.suggestions,
        summary.maintainability,
        colored_grade(&summary.grade)
    )
}
