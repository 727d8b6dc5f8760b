//! Language-specific analyzer implementations.

mod go;
mod java;
mod javascript;
mod php;
mod python;

pub use go::GoAnalyzer;
pub use java::JavaAnalyzer;
pub use javascript::{JavaScriptAnalyzer, TypeScriptAnalyzer};
pub use php::PhpAnalyzer;
pub use python::PythonAnalyzer;

use regex::Regex;

use crate::analysis::engine::structural_rules;
use crate::analysis::lines::SourceLine;
use crate::model::{AnalysisIssue, IssueType, Severity};

/// Rules evaluated by the orchestrator, not by a rule pack.
pub(crate) fn is_structural(rule: &str) -> bool {
    matches!(
        rule,
        structural_rules::HIGH_COMPLEXITY
            | structural_rules::LARGE_CLASS
            | structural_rules::LOW_MAINTAINABILITY
    )
}

/// 1-indexed character column of a byte offset in a line's code text.
pub(crate) fn column_of(line: &SourceLine<'_>, byte_offset: usize) -> usize {
    line.code
        .get(..byte_offset)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(0)
        + 1
}

/// One issue per regex match in code text (strings masked, comments removed).
pub(crate) fn scan_pattern<F>(lines: &[SourceLine<'_>], re: &Regex, mut make: F) -> Vec<AnalysisIssue>
where
    F: FnMut(&SourceLine<'_>, &regex::Match<'_>) -> Option<AnalysisIssue>,
{
    let mut issues = Vec::new();
    for line in lines.iter().filter(|l| l.is_code()) {
        for m in re.find_iter(&line.code) {
            if let Some(issue) = make(line, &m) {
                issues.push(issue.at_column(column_of(line, m.start())));
            }
        }
    }
    issues
}

/// Lines longer than `max` characters.
pub(crate) fn line_length_issues(lines: &[SourceLine<'_>], max: usize, rule: &str) -> Vec<AnalysisIssue> {
    lines
        .iter()
        .filter(|l| !l.is_blank)
        .filter_map(|l| {
            let len = l.raw.chars().count();
            (len > max).then(|| {
                AnalysisIssue::new(
                    rule,
                    IssueType::Info,
                    Severity::Low,
                    l.number,
                    format!("Line is {} characters long, exceeding {}", len, max),
                )
                .at_column(max + 1)
            })
        })
        .collect()
}

/// Number of code-text matches and the line of the first one.
pub(crate) fn count_matches(lines: &[SourceLine<'_>], re: &Regex) -> (usize, usize) {
    let mut count = 0;
    let mut first = 0;
    for line in lines.iter().filter(|l| l.is_code()) {
        let n = re.find_iter(&line.code).count();
        if n > 0 && first == 0 {
            first = line.number;
        }
        count += n;
    }
    (count, first)
}

/// `camelCase` or `PascalCase` to `snake_case`.
///
/// A run of capitals is one word: `HTTPServer` becomes `http_server`.
pub(crate) fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let starts_word = match prev {
                None | Some('_') => false,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                Some(_) => true,
            };
            if starts_word {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) && !name.contains('_')
}

pub(crate) fn is_camel_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) && !name.contains('_')
}
