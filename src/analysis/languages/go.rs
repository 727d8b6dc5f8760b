//! Go language analyzer.

use std::collections::HashMap;

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
    "ignored-error",
    "panic-usage",
    "debug-print",
    "exported-doc",
    "naming-convention",
];

static RULES: phf::Map<&'static str, &'static str> = phf_map! {
    "ignored-error" => "Errors discarded with the blank identifier",
    "panic-usage" => "panic() outside of main and init",
    "debug-print" => "fmt.Print* and println debugging",
    "exported-doc" => "Exported identifiers without a doc comment",
    "naming-convention" => "MixedCaps names instead of underscores",
};

lazy_static! {
    static ref BRANCH: Regex = Regex::new(r"\b(if|for|case|select)\b").unwrap();
    static ref LOGICAL: Regex = Regex::new(r"&&|\|\|").unwrap();

    static ref FUNC: Regex = Regex::new(
        r"^func\s+(?:\(\s*\w*\s*\*?([A-Za-z_]\w*)(?:\[[^\]]*\])?\s*\)\s*)?([A-Za-z_]\w*)\s*[(\[]"
    ).unwrap();
    static ref TYPE: Regex =
        Regex::new(r"^type\s+([A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(struct|interface)\b").unwrap();
    static ref TYPE_ANY: Regex = Regex::new(r"^type\s+([A-Za-z_]\w*)").unwrap();
    static ref VAR_DECL: Regex = Regex::new(r"^\s*(?:var|const)\s+([A-Za-z_]\w*)").unwrap();
    static ref SHORT_DECL: Regex = Regex::new(r"^\s*([A-Za-z_]\w*)\s*:=").unwrap();
    static ref IMPORT_SINGLE: Regex =
        Regex::new(r#"^import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
    static ref IMPORT_SPEC: Regex = Regex::new(r#"^\s*(?:[\w.]+\s+)?"([^"]+)""#).unwrap();

    static ref IGNORED_ERROR: Regex =
        Regex::new(r"(?:^\s*|,\s*)_\s*:?=\s*[\w.]+(?:\[[^\]]*\])?\(").unwrap();
    static ref PANIC: Regex = Regex::new(r"\bpanic\s*\(").unwrap();
    static ref DEBUG_PRINT: Regex = Regex::new(r"\bfmt\.Print(?:ln|f)?\s*\(|\bprintln\s*\(").unwrap();

    static ref STRING_APPEND: Regex = Regex::new(r#"\w+\s*\+=\s*(?:"|`|\w+\s*\+\s*")"#).unwrap();
    static ref ERR_CHECK: Regex = Regex::new(r"\bif\s+err\s*!=\s*nil\b").unwrap();
}

const MIN_STRING_APPENDS: usize = 3;
const MIN_ERR_CHECKS: usize = 5;

pub struct GoAnalyzer;

/// A top-level declaration with its name.
struct Decl<'a> {
    index: usize,
    name: &'a str,
    kind: &'static str,
}

impl GoAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn declarations<'a>(&self, lines: &'a [SourceLine<'_>]) -> Vec<Decl<'a>> {
        let mut decls = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            if let Some(caps) = FUNC.captures(&line.code) {
                let kind = if caps.get(1).is_some() { "method" } else { "function" };
                if let Some(m) = caps.get(2) {
                    decls.push(Decl {
                        index,
                        name: &line.code[m.range()],
                        kind,
                    });
                }
            } else if let Some(m) = TYPE_ANY.captures(&line.code).and_then(|c| c.get(1)) {
                decls.push(Decl {
                    index,
                    name: &line.code[m.range()],
                    kind: "type",
                });
            }
        }
        decls
    }

    fn exported_doc_issues(&self, lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
        let mut issues = Vec::new();
        for decl in self.declarations(lines) {
            if !decl.name.starts_with(|c: char| c.is_ascii_uppercase()) {
                continue;
            }
            let documented = lines[..decl.index]
                .iter()
                .rev()
                .find(|l| !l.is_blank)
                .is_some_and(|l| l.is_comment);
            if !documented {
                issues.push(
                    AnalysisIssue::new(
                        "exported-doc",
                        IssueType::Info,
                        Severity::Low,
                        lines[decl.index].number,
                        format!("Exported {} {} should have a doc comment", decl.kind, decl.name),
                    )
                    .with_fix("Add a doc comment", format!("// {} ...", decl.name)),
                );
            }
        }
        issues
    }

    fn naming_issues(&self, lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
        let mut issues = Vec::new();
        for line in lines.iter().filter(|l| l.is_code()) {
            let name = FUNC
                .captures(&line.code)
                .and_then(|c| c.get(2))
                .or_else(|| TYPE_ANY.captures(&line.code).and_then(|c| c.get(1)))
                .or_else(|| VAR_DECL.captures(&line.code).and_then(|c| c.get(1)))
                .or_else(|| SHORT_DECL.captures(&line.code).and_then(|c| c.get(1)))
                .map(|m| m.as_str());

            let Some(name) = name else { continue };
            if name == "_" || !name.contains('_') || is_test_function(name) {
                continue;
            }
            issues.push(
                AnalysisIssue::new(
                    "naming-convention",
                    IssueType::Info,
                    Severity::Low,
                    line.number,
                    format!("Name '{}' should use MixedCaps, not underscores", name),
                )
                .with_fix("Rename to MixedCaps", to_mixed_caps(name)),
            );
        }
        issues
    }
}

impl Default for GoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// `go test` entry points may use underscores.
fn is_test_function(name: &str) -> bool {
    ["Test", "Benchmark", "Example", "Fuzz"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// `snake_case` to `mixedCaps`, keeping the case of the first letter.
fn to_mixed_caps(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

impl LanguageAnalyzer for GoAnalyzer {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
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
                critical: 20.0,
            })),
            ..Default::default()
        }
    }

    fn calculate_complexity(&self, code: &str) -> u32 {
        let mut score = 1.0;
        for line in scan(code, CommentSyntax::C_STYLE).iter().filter(|l| l.is_code()) {
            score += BRANCH.find_iter(&line.code).count() as f64;
            score += LOGICAL.find_iter(&line.code).count() as f64 * 0.5;
        }
        finish_complexity(score)
    }

    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        let mut mi = 100.0;
        mi -= ((metrics.complexity.max(1) - 1) as f64 * 1.2).min(40.0);
        mi -= ((metrics.average_function_length - 30.0).max(0.0) * 0.4).min(20.0);
        mi -= (metrics.lines_of_code as f64 / 60.0).min(15.0);
        if metrics.comment_percentage < 10.0 {
            mi -= (10.0 - metrics.comment_percentage) * 0.4;
        }
        clamp_percent(mi)
    }

    fn analyze_code_structure(&self, code: &str) -> CodeStructure {
        let lines = scan(code, CommentSyntax::C_STYLE);
        let mut structure = CodeStructure::default();
        let mut receivers: HashMap<String, usize> = HashMap::new();
        let mut in_import_block = false;

        for (idx, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let text = &line.code;

            // Import paths are string literals; read them from the raw line.
            if in_import_block {
                if text.trim_start().starts_with(')') {
                    in_import_block = false;
                } else if let Some(caps) = IMPORT_SPEC.captures(line.raw) {
                    structure.imports.push(caps[1].to_string());
                }
                continue;
            }
            if text.starts_with("import") {
                if text.trim_end().ends_with('(') {
                    in_import_block = true;
                } else if let Some(caps) = IMPORT_SINGLE.captures(line.raw) {
                    structure.imports.push(caps[1].to_string());
                }
                continue;
            }

            if let Some(caps) = FUNC.captures(text) {
                let name = caps[2].to_string();
                let end = brace_block_end(&lines, idx);
                if let Some(receiver) = caps.get(1) {
                    *receivers.entry(receiver.as_str().to_string()).or_default() += 1;
                }
                let is_exported = name.starts_with(|c: char| c.is_ascii_uppercase());
                if is_exported && caps.get(1).is_none() {
                    structure.exports.push(name.clone());
                }
                // Parameters follow the receiver list, if any.
                let signature = &text[caps.get(2).map_or(0, |m| m.start())..];
                structure.functions.push(FunctionInfo {
                    parameters: count_parameters(signature, &[]),
                    complexity: self.calculate_complexity(&block_text(&lines, idx, end)),
                    is_async: false,
                    line: line.number,
                    end_line: lines[end].number,
                    name,
                });
            } else if let Some(caps) = TYPE.captures(text) {
                let name = caps[1].to_string();
                if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    structure.exports.push(name.clone());
                }
                structure.classes.push(ClassInfo {
                    name,
                    line: line.number,
                    end_line: lines[brace_block_end(&lines, idx)].number,
                    method_count: 0,
                });
            }
        }

        // Go methods live outside the type body; count them by receiver.
        for class in &mut structure.classes {
            class.method_count = receivers.get(&class.name).copied().unwrap_or(0);
        }
        structure
    }

    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
        let lines = scan(code, CommentSyntax::C_STYLE);
        let mut issues = Vec::new();

        for rule in rules {
            match rule.as_str() {
                "ignored-error" => issues.extend(scan_pattern(&lines, &IGNORED_ERROR, |l, _| {
                    Some(
                        AnalysisIssue::new(
                            "ignored-error",
                            IssueType::Warning,
                            Severity::High,
                            l.number,
                            "Error result discarded with _",
                        )
                        .with_fix("Handle the error", "if err != nil { return err }"),
                    )
                })),
                "panic-usage" => {
                    let decls = self.declarations(&lines);
                    issues.extend(scan_pattern(&lines, &PANIC, |l, _| {
                        // Panicking during program setup is conventional.
                        let enclosing = decls
                            .iter()
                            .filter(|d| lines[d.index].number <= l.number)
                            .last()
                            .map(|d| d.name);
                        if matches!(enclosing, Some("main") | Some("init")) {
                            return None;
                        }
                        Some(AnalysisIssue::new(
                            "panic-usage",
                            IssueType::Warning,
                            Severity::Medium,
                            l.number,
                            "panic in library code; return an error instead",
                        ))
                    }));
                }
                "debug-print" => issues.extend(scan_pattern(&lines, &DEBUG_PRINT, |l, _| {
                    Some(AnalysisIssue::new(
                        "debug-print",
                        IssueType::Info,
                        Severity::Low,
                        l.number,
                        "Debug print; use the log package",
                    ))
                })),
                "exported-doc" => issues.extend(self.exported_doc_issues(&lines)),
                "naming-convention" => issues.extend(self.naming_issues(&lines)),
                r if is_structural(r) => {}
                other => debug!(rule = other, language = "go", "unknown rule id ignored"),
            }
        }

        issues
    }

    fn generate_language_specific_suggestions(
        &self,
        code: &str,
        metrics: &CodeMetrics,
    ) -> Vec<RefactoringSuggestion> {
        let lines = scan(code, CommentSyntax::C_STYLE);
        let mut suggestions = Vec::new();

        let (appends, first) = count_matches(&lines, &STRING_APPEND);
        if appends >= MIN_STRING_APPENDS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Optimize,
                Priority::Medium,
                first,
                format!("{} string concatenations with +=; use strings.Builder", appends),
                EstimatedImpact::performance("avoids reallocating the string on every append"),
            ));
        }

        let (checks, first) = count_matches(&lines, &ERR_CHECK);
        if checks >= MIN_ERR_CHECKS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Extract,
                Priority::Low,
                first,
                format!(
                    "{} `if err != nil` checks; wrap repeated handling in a helper",
                    checks
                ),
                EstimatedImpact::complexity((checks / 2) as f64).and_maintainability(4.0),
            ));
        }

        suggestions.extend(base::long_function_suggestions(&self.analyze_code_structure(code)));
        suggestions.extend(base::documentation_suggestion(metrics, 10.0));
        suggestions.extend(base::complexity_suggestion(metrics, 15));
        suggestions
    }
}
