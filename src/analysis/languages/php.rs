//! PHP language analyzer.
//!
//! Most PHP rules are security checks: string-built SQL, unescaped output
//! and dynamic code execution.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use tracing::debug;

use crate::analysis::base::{self, clamp_percent, finish_complexity};
use crate::analysis::lines::{scan, CommentSyntax, SourceLine};
use crate::analysis::structure::{
    block_text, brace_block_end, count_parameters, ClassInfo, CodeStructure, FunctionInfo,
};
use crate::analysis::LanguageAnalyzer;
use crate::model::{
    AnalysisIssue, CodeMetrics, ComplexityBuckets, EstimatedImpact, IssueType, Priority,
    RefactoringSuggestion, Severity, SuggestionType, ThresholdValue, Thresholds,
};

use super::{count_matches, is_structural, scan_pattern};

const DEFAULT_RULES: &[&str] = &[
    "high-complexity",
    "large-class",
    "low-maintainability",
    "sql-injection",
    "xss-echo",
    "eval-usage",
    "deprecated-mysql",
    "error-suppression",
    "short-open-tag",
    "debug-output",
];

static RULES: phf::Map<&'static str, &'static str> = phf_map! {
    "sql-injection" => "SQL built from request variables or concatenation",
    "xss-echo" => "Request variables echoed without escaping",
    "eval-usage" => "eval(), create_function() and similar",
    "deprecated-mysql" => "Removed mysql_* functions",
    "error-suppression" => "The @ error suppression operator",
    "short-open-tag" => "`<?` instead of `<?php`",
    "debug-output" => "var_dump(), print_r() and die() left in code",
};

lazy_static! {
    static ref BRANCH: Regex =
        Regex::new(r"\b(if|elseif|for|foreach|while|case|catch|match)\b").unwrap();
    static ref LOGICAL: Regex = Regex::new(r"&&|\|\||\band\b|\bor\b").unwrap();
    static ref TERNARY: Regex = Regex::new(r"\?\s*[^?>\s:]|\?\?").unwrap();

    static ref FUNCTION: Regex = Regex::new(
        r"^\s*((?:(?:public|private|protected|static|final|abstract)\s+)*)function\s+&?([A-Za-z_]\w*)\s*\("
    ).unwrap();
    static ref CLASS: Regex = Regex::new(
        r"^\s*(?:(?:abstract|final|readonly)\s+)*(class|interface|trait|enum)\s+([A-Za-z_]\w*)"
    ).unwrap();
    static ref USE: Regex = Regex::new(r"^\s*use\s+([\\\w]+)(?:\s+as\s+\w+)?\s*;").unwrap();
    static ref INCLUDE: Regex =
        Regex::new(r#"\b(?:require|include)(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#).unwrap();

    static ref SQL_KEYWORD: Regex =
        Regex::new(r#"(?i)["'][^"']*\b(select|insert\s+into|update|delete\s+from)\b"#).unwrap();
    static ref REQUEST_VAR: Regex = Regex::new(r"\$_(GET|POST|REQUEST|COOKIE)\b").unwrap();
    static ref ECHO_REQUEST: Regex =
        Regex::new(r"\b(echo|print)\b[^;]*\$_(GET|POST|REQUEST|COOKIE)\b").unwrap();
    static ref ESCAPED: Regex = Regex::new(r"\b(htmlspecialchars|htmlentities|strip_tags|intval)\s*\(").unwrap();
    static ref EVAL: Regex =
        Regex::new(r"(?:^|[^>\w$])(eval|create_function|assert)\s*\(").unwrap();
    static ref MYSQL: Regex = Regex::new(r"\bmysql_\w+\s*\(").unwrap();
    static ref SUPPRESS: Regex = Regex::new(r"(?:^|[\s=(,!.])@\$?[A-Za-z_]").unwrap();
    static ref SHORT_TAG: Regex = Regex::new(r"<\?(?:[^p=x]|$)").unwrap();
    static ref DEBUG_OUTPUT: Regex =
        Regex::new(r"\b(var_dump|print_r|var_export|die|dd)\s*\(").unwrap();

    static ref OLD_ARRAY: Regex = Regex::new(r"\barray\s*\(").unwrap();
    static ref CONCAT_VAR: Regex = Regex::new(r#""\s*\.\s*\$\w+\s*\.\s*""#).unwrap();
}

const MIN_OLD_ARRAYS: usize = 3;
const MIN_MYSQL_CALLS: usize = 1;
const MIN_CONCATS: usize = 2;

pub struct PhpAnalyzer;

impl PhpAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn sql_injection_issues(&self, lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
        // Literals are masked in code text; keywords must be read from the raw line.
        lines
            .iter()
            .filter(|l| l.is_code() && SQL_KEYWORD.is_match(l.raw))
            .filter(|l| {
                REQUEST_VAR.is_match(&l.code)
                    || l.code.contains("\" .")
                    || l.code.contains("\".")
                    || l.raw.contains("{$")
                    || interpolates_variable(l.raw)
            })
            .map(|l| {
                AnalysisIssue::new(
                    "sql-injection",
                    IssueType::Error,
                    Severity::Critical,
                    l.number,
                    "SQL query built from variables; use prepared statements",
                )
                .with_fix("Bind parameters with PDO", "$stmt = $pdo->prepare($sql); $stmt->execute($params);")
            })
            .collect()
    }
}

/// Whether a double-quoted literal in `raw` contains a `$variable`.
fn interpolates_variable(raw: &str) -> bool {
    let mut in_double = false;
    let mut escaped = false;
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_double => escaped = true,
            '"' => in_double = !in_double,
            '$' if in_double => {
                if chars.peek().is_some_and(|c| c.is_alphabetic() || *c == '_') {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

impl Default for PhpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PhpAnalyzer {
    fn language_id(&self) -> &'static str {
        "php"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["php", "phtml"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::PHP
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
            ..Default::default()
        }
    }

    fn calculate_complexity(&self, code: &str) -> u32 {
        let mut score = 1.0;
        for line in scan(code, CommentSyntax::PHP).iter().filter(|l| l.is_code()) {
            score += BRANCH.find_iter(&line.code).count() as f64;
            score += LOGICAL.find_iter(&line.code).count() as f64 * 0.5;
            score += TERNARY.find_iter(&line.code).count() as f64 * 0.5;
        }
        finish_complexity(score)
    }

    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        let mut mi = 100.0;
        mi -= ((metrics.complexity.max(1) - 1) as f64 * 1.5).min(45.0);
        mi -= ((metrics.average_function_length - 25.0).max(0.0) * 0.5).min(20.0);
        mi -= (metrics.lines_of_code as f64 / 40.0).min(15.0);
        if metrics.comment_percentage < 10.0 {
            mi -= (10.0 - metrics.comment_percentage) * 0.5;
        }
        clamp_percent(mi)
    }

    fn analyze_code_structure(&self, code: &str) -> CodeStructure {
        let lines = scan(code, CommentSyntax::PHP);
        let mut structure = CodeStructure::default();

        for (idx, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }

            if let Some(caps) = CLASS.captures(&line.code) {
                let name = caps[2].to_string();
                structure.exports.push(name.clone());
                structure.classes.push(ClassInfo {
                    name,
                    line: line.number,
                    end_line: lines[brace_block_end(&lines, idx)].number,
                    method_count: 0,
                });
            } else if let Some(caps) = FUNCTION.captures(&line.code) {
                let name = caps[2].to_string();
                let end = brace_block_end(&lines, idx);
                let signature = block_text(&lines, idx, (idx + 3).min(end));
                if line.indent() == 0 || caps[1].contains("public") {
                    structure.exports.push(name.clone());
                }
                structure.functions.push(FunctionInfo {
                    parameters: count_parameters(&signature, &[]),
                    complexity: self.calculate_complexity(&block_text(&lines, idx, end)),
                    is_async: false,
                    line: line.number,
                    end_line: lines[end].number,
                    name,
                });
            } else if let Some(caps) = USE.captures(&line.code) {
                // Inside a class body `use` imports a trait; still a dependency.
                structure.imports.push(caps[1].to_string());
            } else if let Some(caps) = INCLUDE.captures(line.raw) {
                structure.imports.push(caps[1].to_string());
            }
        }

        structure.assign_methods();
        structure
    }

    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
        let lines = scan(code, CommentSyntax::PHP);
        let mut issues = Vec::new();

        for rule in rules {
            match rule.as_str() {
                "sql-injection" => issues.extend(self.sql_injection_issues(&lines)),
                "xss-echo" => issues.extend(scan_pattern(&lines, &ECHO_REQUEST, |l, _| {
                    if ESCAPED.is_match(&l.code) {
                        return None;
                    }
                    Some(
                        AnalysisIssue::new(
                            "xss-echo",
                            IssueType::Error,
                            Severity::High,
                            l.number,
                            "Request data echoed without escaping",
                        )
                        .with_fix("Escape output", "htmlspecialchars($value, ENT_QUOTES, 'UTF-8')"),
                    )
                })),
                "eval-usage" => issues.extend(scan_pattern(&lines, &EVAL, |l, m| {
                    let func = m.as_str().trim_start_matches(|c: char| !c.is_alphabetic());
                    Some(AnalysisIssue::new(
                        "eval-usage",
                        IssueType::Error,
                        Severity::Critical,
                        l.number,
                        format!("{} executes code built at runtime", func.trim_end_matches(['(', ' '])),
                    ))
                })),
                "deprecated-mysql" => issues.extend(scan_pattern(&lines, &MYSQL, |l, m| {
                    Some(
                        AnalysisIssue::new(
                            "deprecated-mysql",
                            IssueType::Error,
                            Severity::High,
                            l.number,
                            format!(
                                "{} was removed in PHP 7",
                                m.as_str().trim_end_matches(['(', ' '])
                            ),
                        )
                        .with_fix("Use PDO or mysqli", "mysqli_"),
                    )
                })),
                "error-suppression" => issues.extend(scan_pattern(&lines, &SUPPRESS, |l, _| {
                    Some(AnalysisIssue::new(
                        "error-suppression",
                        IssueType::Warning,
                        Severity::Medium,
                        l.number,
                        "Error suppression with @ hides failures",
                    ))
                })),
                "short-open-tag" => {
                    for line in lines.iter().filter(|l| !l.is_blank) {
                        if let Some(m) = SHORT_TAG.find(line.raw) {
                            issues.push(
                                AnalysisIssue::new(
                                    "short-open-tag",
                                    IssueType::Warning,
                                    Severity::Low,
                                    line.number,
                                    "Short open tag depends on short_open_tag",
                                )
                                .at_column(line.raw[..m.start()].chars().count() + 1)
                                .with_fix("Use the full open tag", "<?php"),
                            );
                        }
                    }
                }
                "debug-output" => issues.extend(scan_pattern(&lines, &DEBUG_OUTPUT, |l, m| {
                    Some(AnalysisIssue::new(
                        "debug-output",
                        IssueType::Warning,
                        Severity::Low,
                        l.number,
                        format!(
                            "Debug output {} left in code",
                            m.as_str().trim_end_matches(['(', ' '])
                        ),
                    ))
                })),
                r if is_structural(r) => {}
                other => debug!(rule = other, language = "php", "unknown rule id ignored"),
            }
        }

        issues
    }

    fn generate_language_specific_suggestions(
        &self,
        code: &str,
        metrics: &CodeMetrics,
    ) -> Vec<RefactoringSuggestion> {
        let lines = scan(code, CommentSyntax::PHP);
        let mut suggestions = Vec::new();

        let (arrays, first) = count_matches(&lines, &OLD_ARRAY);
        if arrays >= MIN_OLD_ARRAYS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::Low,
                first,
                format!("{} array() constructors; use the short [] syntax", arrays),
                EstimatedImpact::maintainability(1.0),
            ));
        }

        let (mysql, first) = count_matches(&lines, &MYSQL);
        if mysql >= MIN_MYSQL_CALLS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::High,
                first,
                format!("{} mysql_* calls; migrate data access to PDO", mysql),
                EstimatedImpact::maintainability(10.0),
            ));
        }

        let concats = lines
            .iter()
            .filter(|l| l.is_code() && CONCAT_VAR.is_match(l.raw))
            .map(|l| l.number)
            .collect::<Vec<_>>();
        if concats.len() >= MIN_CONCATS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::Low,
                concats[0],
                format!(
                    "{} strings concatenated around variables; use \"{{$var}}\" interpolation",
                    concats.len()
                ),
                EstimatedImpact::maintainability(2.0),
            ));
        }

        suggestions.extend(base::long_function_suggestions(&self.analyze_code_structure(code)));
        suggestions.extend(base::documentation_suggestion(metrics, 10.0));
        suggestions.extend(base::complexity_suggestion(metrics, 15));
        suggestions
    }
}
