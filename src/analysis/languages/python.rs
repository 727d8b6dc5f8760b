//! Python language analyzer.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use tracing::debug;

use crate::analysis::base::{self, clamp_percent, finish_complexity};
use crate::analysis::lines::{scan, CommentSyntax, SourceLine};
use crate::analysis::structure::{
    block_text, count_parameters, indent_block_end, ClassInfo, CodeStructure, FunctionInfo,
};
use crate::analysis::LanguageAnalyzer;
use crate::model::{
    AnalysisIssue, CodeMetrics, ComplexityBuckets, EstimatedImpact, IssueType, PercentBuckets,
    Priority, RefactoringSuggestion, Severity, SuggestionType, ThresholdValue, Thresholds,
};

use super::{
    count_matches, is_pascal_case, is_structural, line_length_issues, scan_pattern, to_snake_case,
};

/// Black's default line length.
const MAX_LINE_LENGTH: usize = 88;

const DEFAULT_RULES: &[&str] = &[
    "high-complexity",
    "large-class",
    "low-maintainability",
    "line-length",
    "naming-convention",
    "bare-except",
    "mutable-default-arg",
    "wildcard-import",
    "eval-usage",
    "compare-to-none",
    "print-statement",
];

static RULES: phf::Map<&'static str, &'static str> = phf_map! {
    "line-length" => "Lines longer than 88 characters",
    "naming-convention" => "Functions in snake_case, classes in PascalCase",
    "bare-except" => "`except:` without an exception type",
    "mutable-default-arg" => "Mutable default argument values",
    "wildcard-import" => "`from module import *`",
    "eval-usage" => "Calls to eval() or exec()",
    "compare-to-none" => "Equality comparison with None",
    "print-statement" => "print() calls left in code",
};

lazy_static! {
    static ref BRANCH: Regex = Regex::new(r"\b(if|elif|for|while|except|case)\b").unwrap();
    static ref BOOL_OP: Regex = Regex::new(r"\b(and|or)\b").unwrap();
    static ref LAMBDA_OR_AWAIT: Regex = Regex::new(r"\b(lambda|await)\b").unwrap();

    static ref DEF: Regex =
        Regex::new(r"^\s*(async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap();
    static ref CLASS: Regex = Regex::new(r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref IMPORT: Regex = Regex::new(r"^\s*import\s+(.+)$").unwrap();
    static ref FROM_IMPORT: Regex =
        Regex::new(r"^\s*from\s+(\.*[A-Za-z_][A-Za-z0-9_.]*|\.+)\s+import\b").unwrap();

    static ref BARE_EXCEPT: Regex = Regex::new(r"^\s*except\s*:").unwrap();
    static ref MUTABLE_DEFAULT: Regex =
        Regex::new(r"=\s*(\[\s*\]|\{\s*\}|list\(\)|dict\(\)|set\(\))").unwrap();
    static ref WILDCARD_IMPORT: Regex = Regex::new(r"^\s*from\s+\S+\s+import\s+\*").unwrap();
    static ref EVAL: Regex = Regex::new(r"(^|[^.\w])(eval|exec)\s*\(").unwrap();
    static ref NONE_CMP: Regex = Regex::new(r"(==|!=)\s*None\b").unwrap();
    static ref PRINT: Regex = Regex::new(r"(^|[^.\w])print\s*\(").unwrap();

    static ref FOR_LOOP: Regex = Regex::new(r"^\s*for\s+.+\s+in\s+.+:\s*$").unwrap();
    static ref APPEND: Regex = Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_.]*\.append\(").unwrap();
    static ref STRING_CONCAT: Regex =
        Regex::new(r#"[A-Za-z_][A-Za-z0-9_]*\s*\+=\s*(f?["']|str\()"#).unwrap();
    static ref OLD_FORMAT: Regex = Regex::new(r#"(["']\s*%\s*[\w(]|\.format\()"#).unwrap();
}

/// Minimum loops of the accumulate-then-append shape before suggesting comprehensions.
const MIN_APPEND_LOOPS: usize = 2;
/// Minimum string `+=` occurrences before suggesting `str.join`.
const MIN_STRING_CONCATS: usize = 3;
/// Minimum `%`/`.format` uses before suggesting f-strings.
const MIN_OLD_FORMATS: usize = 2;

pub struct PythonAnalyzer;

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn naming_issues(&self, lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
        let mut issues = Vec::new();
        for line in lines.iter().filter(|l| l.is_code()) {
            if let Some(caps) = DEF.captures(&line.code) {
                let name = &caps[2];
                if !name.starts_with("__") && name.chars().any(|c| c.is_ascii_uppercase()) {
                    issues.push(
                        AnalysisIssue::new(
                            "naming-convention",
                            IssueType::Info,
                            Severity::Low,
                            line.number,
                            format!("Function name '{}' should be snake_case", name),
                        )
                        .with_fix("Rename to snake_case", to_snake_case(name)),
                    );
                }
            } else if let Some(caps) = CLASS.captures(&line.code) {
                let name = &caps[1];
                if !is_pascal_case(name.trim_start_matches('_')) {
                    issues.push(AnalysisIssue::new(
                        "naming-convention",
                        IssueType::Info,
                        Severity::Low,
                        line.number,
                        format!("Class name '{}' should be PascalCase", name),
                    ));
                }
            }
        }
        issues
    }

    /// Loops whose body is a single `xs.append(...)` line.
    fn append_loops(&self, lines: &[SourceLine<'_>]) -> Vec<usize> {
        let mut found = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if !line.is_code() || !FOR_LOOP.is_match(&line.code) {
                continue;
            }
            let end = indent_block_end(lines, idx);
            let body: Vec<_> = lines[idx + 1..=end.max(idx)]
                .iter()
                .filter(|l| l.is_code())
                .collect();
            if body.len() == 1 && APPEND.is_match(&body[0].code) {
                found.push(line.number);
            }
        }
        found
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py", "pyw", "pyi"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::PYTHON
    }

    fn default_rules(&self) -> &'static [&'static str] {
        DEFAULT_RULES
    }

    fn rule_description(&self, rule: &str) -> Option<&'static str> {
        RULES.get(rule).copied()
    }

    fn default_thresholds(&self) -> Thresholds {
        Thresholds {
            complexity: Some(ThresholdValue::Buckets(ComplexityBuckets {
                low: 5.0,
                medium: 10.0,
                high: 15.0,
                critical: 25.0,
            })),
            maintainability: Some(ThresholdValue::Buckets(PercentBuckets {
                low: 20.0,
                medium: 40.0,
                high: 70.0,
            })),
            coverage: None,
        }
    }

    fn calculate_complexity(&self, code: &str) -> u32 {
        let mut score = 1.0;
        for line in scan(code, CommentSyntax::PYTHON).iter().filter(|l| l.is_code()) {
            score += BRANCH.find_iter(&line.code).count() as f64;
            score += BOOL_OP.find_iter(&line.code).count() as f64 * 0.5;
            score += LAMBDA_OR_AWAIT.find_iter(&line.code).count() as f64 * 0.5;
        }
        finish_complexity(score)
    }

    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        let mut mi = 100.0;
        mi -= ((metrics.complexity.max(1) - 1) as f64 * 1.5).min(40.0);
        mi -= ((metrics.average_function_length - 20.0).max(0.0) * 0.5).min(20.0);
        if metrics.comment_percentage >= 15.0 {
            mi += (metrics.comment_percentage * 0.2).min(10.0);
        } else {
            mi -= (15.0 - metrics.comment_percentage) * 0.5;
        }
        mi -= (metrics.dependencies.len() as f64 * 0.5).min(10.0);
        clamp_percent(mi)
    }

    fn analyze_code_structure(&self, code: &str) -> CodeStructure {
        let lines = scan(code, CommentSyntax::PYTHON);
        let mut structure = CodeStructure::default();

        for (idx, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let text = &line.code;

            if let Some(caps) = DEF.captures(text) {
                let name = caps[2].to_string();
                let end = indent_block_end(&lines, idx);
                let signature = block_text(&lines, idx, (idx + 5).min(end));
                if line.indent() == 0 && !name.starts_with('_') {
                    structure.exports.push(name.clone());
                }
                structure.functions.push(FunctionInfo {
                    parameters: count_parameters(&signature, &["self", "cls"]),
                    complexity: self.calculate_complexity(&block_text(&lines, idx, end)),
                    is_async: caps.get(1).is_some(),
                    line: line.number,
                    end_line: lines[end].number,
                    name,
                });
            } else if let Some(caps) = CLASS.captures(text) {
                let name = caps[1].to_string();
                let end = indent_block_end(&lines, idx);
                if line.indent() == 0 && !name.starts_with('_') {
                    structure.exports.push(name.clone());
                }
                structure.classes.push(ClassInfo {
                    name,
                    line: line.number,
                    end_line: lines[end].number,
                    method_count: 0,
                });
            } else if let Some(caps) = FROM_IMPORT.captures(text) {
                structure.imports.push(caps[1].to_string());
            } else if let Some(caps) = IMPORT.captures(text) {
                for part in caps[1].split(',') {
                    let module = part.split_whitespace().next().unwrap_or("");
                    if !module.is_empty() {
                        structure.imports.push(module.to_string());
                    }
                }
            }
        }

        structure.assign_methods();
        structure
    }

    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
        let lines = scan(code, CommentSyntax::PYTHON);
        let mut issues = Vec::new();

        for rule in rules {
            match rule.as_str() {
                "line-length" => issues.extend(line_length_issues(&lines, MAX_LINE_LENGTH, rule)),
                "naming-convention" => issues.extend(self.naming_issues(&lines)),
                "bare-except" => issues.extend(scan_pattern(&lines, &BARE_EXCEPT, |l, _| {
                    Some(
                        AnalysisIssue::new(
                            "bare-except",
                            IssueType::Warning,
                            Severity::Medium,
                            l.number,
                            "Bare except clause catches SystemExit and KeyboardInterrupt",
                        )
                        .with_fix("Catch a specific exception type", "except Exception:"),
                    )
                })),
                "mutable-default-arg" => {
                    for line in lines.iter().filter(|l| l.is_code() && DEF.is_match(&l.code)) {
                        if MUTABLE_DEFAULT.is_match(&line.code) {
                            issues.push(
                                AnalysisIssue::new(
                                    "mutable-default-arg",
                                    IssueType::Warning,
                                    Severity::High,
                                    line.number,
                                    "Mutable default argument is shared between calls",
                                )
                                .with_fix("Default to None and create the value in the body", "=None"),
                            );
                        }
                    }
                }
                "wildcard-import" => issues.extend(scan_pattern(&lines, &WILDCARD_IMPORT, |l, _| {
                    Some(AnalysisIssue::new(
                        "wildcard-import",
                        IssueType::Warning,
                        Severity::Medium,
                        l.number,
                        "Wildcard import pollutes the module namespace",
                    ))
                })),
                "eval-usage" => issues.extend(scan_pattern(&lines, &EVAL, |l, _| {
                    Some(AnalysisIssue::new(
                        "eval-usage",
                        IssueType::Error,
                        Severity::High,
                        l.number,
                        "eval()/exec() can execute arbitrary code",
                    ))
                })),
                "compare-to-none" => issues.extend(scan_pattern(&lines, &NONE_CMP, |l, m| {
                    let replacement = if m.as_str().starts_with("!=") {
                        "is not None"
                    } else {
                        "is None"
                    };
                    Some(
                        AnalysisIssue::new(
                            "compare-to-none",
                            IssueType::Info,
                            Severity::Low,
                            l.number,
                            "Comparison to None should use identity",
                        )
                        .with_fix("Use an identity check", replacement),
                    )
                })),
                "print-statement" => issues.extend(scan_pattern(&lines, &PRINT, |l, _| {
                    Some(AnalysisIssue::new(
                        "print-statement",
                        IssueType::Info,
                        Severity::Low,
                        l.number,
                        "print() call; prefer the logging module",
                    ))
                })),
                r if is_structural(r) => {}
                other => debug!(rule = other, language = "python", "unknown rule id ignored"),
            }
        }

        issues
    }

    fn generate_language_specific_suggestions(
        &self,
        code: &str,
        metrics: &CodeMetrics,
    ) -> Vec<RefactoringSuggestion> {
        let lines = scan(code, CommentSyntax::PYTHON);
        let mut suggestions = Vec::new();

        let loops = self.append_loops(&lines);
        if loops.len() >= MIN_APPEND_LOOPS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::Low,
                loops[0],
                format!(
                    "{} loops only append to a list; use list comprehensions",
                    loops.len()
                ),
                EstimatedImpact::complexity(loops.len() as f64).and_maintainability(3.0),
            ));
        }

        let (concats, first) = count_matches(&lines, &STRING_CONCAT);
        if concats >= MIN_STRING_CONCATS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Optimize,
                Priority::Medium,
                first,
                format!(
                    "{} string concatenations with +=; collect parts and use ''.join()",
                    concats
                ),
                EstimatedImpact::performance("avoids quadratic string copying"),
            ));
        }

        let (formats, first) = count_matches(&lines, &OLD_FORMAT);
        if formats >= MIN_OLD_FORMATS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::Low,
                first,
                format!("{} uses of %-formatting or str.format(); use f-strings", formats),
                EstimatedImpact::maintainability(2.0),
            ));
        }

        suggestions.extend(base::long_function_suggestions(&self.analyze_code_structure(code)));
        suggestions.extend(base::documentation_suggestion(metrics, 10.0));
        suggestions.extend(base::complexity_suggestion(metrics, 15));
        suggestions
    }
}
