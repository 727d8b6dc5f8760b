//! Java language analyzer.

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
    AnalysisIssue, CodeMetrics, EstimatedImpact, IssueType, Priority, RefactoringSuggestion,
    Severity, SuggestionType, ThresholdValue, Thresholds,
};

use super::{
    count_matches, is_camel_case, is_pascal_case, is_structural, line_length_issues, scan_pattern,
};

const MAX_LINE_LENGTH: usize = 120;

const DEFAULT_RULES: &[&str] = &[
    "high-complexity",
    "large-class",
    "low-maintainability",
    "naming-convention",
    "empty-catch",
    "string-equality",
    "generic-exception",
    "print-stack-trace",
    "system-out",
    "line-length",
];

static RULES: phf::Map<&'static str, &'static str> = phf_map! {
    "naming-convention" => "Types in PascalCase, methods in camelCase",
    "empty-catch" => "catch blocks with an empty body",
    "string-equality" => "String comparison with == or !=",
    "generic-exception" => "Catching or throwing Exception/Throwable",
    "print-stack-trace" => "printStackTrace() calls",
    "system-out" => "System.out/System.err printing",
    "line-length" => "Lines longer than 120 characters",
};

lazy_static! {
    static ref BRANCH: Regex = Regex::new(r"\b(if|for|while|case|catch)\b").unwrap();
    static ref LOGICAL: Regex = Regex::new(r"&&|\|\|").unwrap();
    static ref TERNARY: Regex = Regex::new(r"\?\s*[^>\s]").unwrap();

    static ref TYPE_DECL: Regex = Regex::new(
        r"^\s*((?:(?:public|private|protected|abstract|final|static|sealed|non-sealed|strictfp)\s+)*)(class|interface|enum|record)\s+([A-Za-z_]\w*)"
    ).unwrap();
    static ref METHOD: Regex = Regex::new(
        r"^\s*((?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)*)(?:<[^>]+>\s*)?([\w.]+(?:<[^()]*>)?(?:\[\])*\s+)?([A-Za-z_]\w*)\s*\("
    ).unwrap();
    static ref IMPORT: Regex =
        Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+?)(?:\.\*)?\s*;").unwrap();

    static ref EMPTY_CATCH_INLINE: Regex = Regex::new(r"\bcatch\s*\([^)]*\)\s*\{\s*\}").unwrap();
    static ref CATCH_OPEN: Regex = Regex::new(r"\bcatch\s*\([^)]*\)\s*\{\s*$").unwrap();
    static ref STRING_EQ: Regex = Regex::new(r#"(?:==|!=)\s*"|"\s*(?:==|!=)"#).unwrap();
    static ref GENERIC_CATCH: Regex = Regex::new(
        r"\bcatch\s*\(\s*(?:final\s+)?(Exception|Throwable|RuntimeException)\s+\w+\s*\)"
    ).unwrap();
    static ref GENERIC_THROWS: Regex =
        Regex::new(r"\bthrows\s+(?:[\w.]+\s*,\s*)*(Exception|Throwable)\b").unwrap();
    static ref PRINT_STACK_TRACE: Regex = Regex::new(r"\.printStackTrace\s*\(\s*\)").unwrap();
    static ref SYSTEM_OUT: Regex = Regex::new(r"\bSystem\.(out|err)\.print(ln|f)?\s*\(").unwrap();

    static ref STRING_APPEND: Regex = Regex::new(r#"\b\w+\s*\+=\s*(?:"|\w+\s*\+\s*")"#).unwrap();
    static ref INDEX_LOOP: Regex = Regex::new(
        r"\bfor\s*\(\s*int\s+\w+\s*=\s*0\s*;\s*\w+\s*<\s*[\w.]+\.(?:size\(\)|length)"
    ).unwrap();
    static ref ANONYMOUS_CLASS: Regex =
        Regex::new(r"\bnew\s+[A-Z]\w*(?:<[^>]*>)?\s*\(\s*\)\s*\{").unwrap();
}

/// Tokens that can precede `(` without starting a method declaration.
const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "else", "throw", "case", "try",
    "do", "synchronized", "super", "this",
];

const MIN_STRING_APPENDS: usize = 3;
const MIN_INDEX_LOOPS: usize = 2;
const MIN_ANONYMOUS_CLASSES: usize = 2;

pub struct JavaAnalyzer;

/// A method declaration found on one line.
struct MethodHead {
    name: String,
    is_public: bool,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn method_head(&self, line: &SourceLine<'_>) -> Option<MethodHead> {
        let text = &line.code;
        let caps = METHOD.captures(text)?;
        let modifiers = caps.get(1).map_or("", |m| m.as_str());
        let return_type = caps.get(2).map(|m| m.as_str().trim());
        let name = &caps[3];

        if modifiers.is_empty() && return_type.is_none() {
            return None;
        }
        if KEYWORDS.contains(&name) || return_type.is_some_and(|t| KEYWORDS.contains(&t)) {
            return None;
        }
        // Local declarations initialised from a call.
        let head = &text[..caps.get(0).map_or(0, |m| m.end())];
        if head.contains('=') {
            return None;
        }
        Some(MethodHead {
            name: name.to_string(),
            is_public: modifiers.contains("public"),
        })
    }

    fn naming_issues(&self, lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
        let mut issues = Vec::new();
        let mut types = Vec::new();

        for line in lines.iter().filter(|l| l.is_code()) {
            if let Some(caps) = TYPE_DECL.captures(&line.code) {
                let name = &caps[3];
                types.push(name.to_string());
                if !is_pascal_case(name) {
                    issues.push(AnalysisIssue::new(
                        "naming-convention",
                        IssueType::Info,
                        Severity::Low,
                        line.number,
                        format!("Type name '{}' should be PascalCase", name),
                    ));
                }
            } else if let Some(head) = self.method_head(line) {
                // Constructors share the type's name.
                if types.contains(&head.name) || is_camel_case(&head.name) {
                    continue;
                }
                issues.push(
                    AnalysisIssue::new(
                        "naming-convention",
                        IssueType::Info,
                        Severity::Low,
                        line.number,
                        format!("Method name '{}' should be camelCase", head.name),
                    )
                    .with_fix("Rename to camelCase", to_camel_case(&head.name)),
                );
            }
        }
        issues
    }

    fn empty_catch_issues(&self, lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
        let empty = |number| {
            AnalysisIssue::new(
                "empty-catch",
                IssueType::Warning,
                Severity::Medium,
                number,
                "Empty catch block swallows the exception",
            )
        };

        let mut issues = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            if EMPTY_CATCH_INLINE.is_match(&line.code) {
                issues.push(empty(line.number));
            } else if CATCH_OPEN.is_match(&line.code) {
                // A comment in the body counts as handling.
                let next = lines[idx + 1..].iter().find(|l| !l.is_blank);
                if next.is_some_and(|l| l.is_code() && l.code.trim_start().starts_with('}')) {
                    issues.push(empty(line.number));
                }
            }
        }
        issues
    }
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// `snake_case` or `PascalCase` to `camelCase`.
fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, ch) in name.chars().enumerate() {
        if ch == '_' {
            upper_next = i > 0;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn default_rules(&self) -> &'static [&'static str] {
        DEFAULT_RULES
    }

    fn rule_description(&self, rule: &str) -> Option<&'static str> {
        RULES.get(rule).copied()
    }

    fn default_thresholds(&self) -> Thresholds {
        Thresholds {
            complexity: Some(ThresholdValue::Scalar(15.0)),
            ..Default::default()
        }
    }

    fn calculate_complexity(&self, code: &str) -> u32 {
        let mut score = 1.0;
        for line in scan(code, CommentSyntax::C_STYLE).iter().filter(|l| l.is_code()) {
            score += BRANCH.find_iter(&line.code).count() as f64;
            score += LOGICAL.find_iter(&line.code).count() as f64 * 0.5;
            if !line.code.contains('<') {
                score += TERNARY.find_iter(&line.code).count() as f64 * 0.5;
            }
        }
        finish_complexity(score)
    }

    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        let mut mi = 100.0;
        mi -= ((metrics.complexity.max(1) - 1) as f64).min(40.0);
        mi -= ((metrics.average_function_length - 30.0).max(0.0) * 0.4).min(20.0);
        mi -= (metrics.lines_of_code as f64 / 60.0).min(15.0);
        if metrics.comment_percentage < 15.0 {
            mi -= (15.0 - metrics.comment_percentage) * 0.4;
        }
        clamp_percent(mi)
    }

    fn analyze_code_structure(&self, code: &str) -> CodeStructure {
        let lines = scan(code, CommentSyntax::C_STYLE);
        let mut structure = CodeStructure::default();

        for (idx, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }

            if let Some(caps) = IMPORT.captures(&line.code) {
                structure.imports.push(caps[1].to_string());
            } else if let Some(caps) = TYPE_DECL.captures(&line.code) {
                let name = caps[3].to_string();
                if caps[1].contains("public") {
                    structure.exports.push(name.clone());
                }
                structure.classes.push(ClassInfo {
                    name,
                    line: line.number,
                    end_line: lines[brace_block_end(&lines, idx)].number,
                    method_count: 0,
                });
            } else if let Some(head) = self.method_head(line) {
                let end = brace_block_end(&lines, idx);
                let signature = block_text(&lines, idx, (idx + 3).min(end));
                if head.is_public {
                    structure.exports.push(head.name.clone());
                }
                structure.functions.push(FunctionInfo {
                    parameters: count_parameters(&signature, &[]),
                    complexity: self.calculate_complexity(&block_text(&lines, idx, end)),
                    is_async: false,
                    line: line.number,
                    end_line: lines[end].number,
                    name: head.name,
                });
            }
        }

        structure.assign_methods();
        structure
    }

    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
        let lines = scan(code, CommentSyntax::C_STYLE);
        let mut issues = Vec::new();

        for rule in rules {
            match rule.as_str() {
                "naming-convention" => issues.extend(self.naming_issues(&lines)),
                "empty-catch" => issues.extend(self.empty_catch_issues(&lines)),
                "string-equality" => issues.extend(scan_pattern(&lines, &STRING_EQ, |l, _| {
                    Some(
                        AnalysisIssue::new(
                            "string-equality",
                            IssueType::Error,
                            Severity::High,
                            l.number,
                            "Strings compared by reference; use equals()",
                        )
                        .with_fix("Compare with equals()", "\"literal\".equals(value)"),
                    )
                })),
                "generic-exception" => {
                    issues.extend(scan_pattern(&lines, &GENERIC_CATCH, |l, _| {
                        Some(AnalysisIssue::new(
                            "generic-exception",
                            IssueType::Warning,
                            Severity::Medium,
                            l.number,
                            "Catching a generic exception hides unexpected failures",
                        ))
                    }));
                    issues.extend(scan_pattern(&lines, &GENERIC_THROWS, |l, _| {
                        Some(AnalysisIssue::new(
                            "generic-exception",
                            IssueType::Warning,
                            Severity::Low,
                            l.number,
                            "Declare specific checked exceptions instead of Exception",
                        ))
                    }));
                }
                "print-stack-trace" => {
                    issues.extend(scan_pattern(&lines, &PRINT_STACK_TRACE, |l, _| {
                        Some(AnalysisIssue::new(
                            "print-stack-trace",
                            IssueType::Warning,
                            Severity::Low,
                            l.number,
                            "printStackTrace() bypasses logging",
                        ))
                    }))
                }
                "system-out" => issues.extend(scan_pattern(&lines, &SYSTEM_OUT, |l, m| {
                    Some(AnalysisIssue::new(
                        "system-out",
                        IssueType::Info,
                        Severity::Low,
                        l.number,
                        format!("{} call; use a logger", m.as_str().trim_end_matches(['(', ' '])),
                    ))
                })),
                "line-length" => issues.extend(line_length_issues(&lines, MAX_LINE_LENGTH, rule)),
                r if is_structural(r) => {}
                other => debug!(rule = other, language = "java", "unknown rule id ignored"),
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
                format!("{} string concatenations with +=; use StringBuilder", appends),
                EstimatedImpact::performance("avoids intermediate String allocations"),
            ));
        }

        let (loops, first) = count_matches(&lines, &INDEX_LOOP);
        if loops >= MIN_INDEX_LOOPS {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::Low,
                first,
                format!("{} index-based loops; use enhanced for loops or streams", loops),
                EstimatedImpact::maintainability(3.0),
            ));
        }

        let (anonymous, first) = count_matches(&lines, &ANONYMOUS_CLASS);
        if anonymous >= MIN_ANONYMOUS_CLASSES {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Modernize,
                Priority::Low,
                first,
                format!(
                    "{} anonymous classes; replace functional interfaces with lambdas",
                    anonymous
                ),
                EstimatedImpact::maintainability(4.0),
            ));
        }

        suggestions.extend(base::long_function_suggestions(&self.analyze_code_structure(code)));
        suggestions.extend(base::documentation_suggestion(metrics, 15.0));
        suggestions.extend(base::complexity_suggestion(metrics, 15));
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    const SERVICE: &str = r#"
package com.example;

import java.util.List;
import java.util.*;
import static org.junit.Assert.assertEquals;

public class UserService {
    private final List<String> names;

    public UserService(List<String> names) {
        this.names = names;
    }

    public String find(String name, int limit) {
        for (String n : names) {
            if (n.equals(name)) {
                return n;
            }
        }
        return null;
    }

    private void Reset_State() {
        names.clear();
    }
}

interface Repository {
    void save(String value);
}
"#;

    #[test]
    fn test_structure() {
        let s = JavaAnalyzer.analyze_code_structure(SERVICE);
        assert_eq!(
            s.imports,
            vec!["java.util.List", "java.util", "org.junit.Assert.assertEquals"]
        );

        let names: Vec<_> = s.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["UserService", "Repository"]);
        assert_eq!(s.classes[0].method_count, 3);

        let methods: Vec<_> = s.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(methods, vec!["UserService", "find", "Reset_State", "save"]);

        let find = &s.functions[1];
        assert_eq!(find.parameters, 2);
        assert_eq!(find.line, 15);
        assert_eq!(find.end_line, 22);
        assert_eq!(find.complexity, 3);

        assert_eq!(s.exports, vec!["UserService", "UserService", "find"]);
    }

    #[test]
    fn test_naming() {
        let issues =
            JavaAnalyzer.check_language_specific_rules(SERVICE, &rules(&["naming-convention"]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 24);
        assert_eq!(issues[0].fix.as_ref().unwrap().replacement, "resetState");
    }

    #[test]
    fn test_rules() {
        let code = r#"
class Job {
    void run() throws Exception {
        try {
            work();
        } catch (Exception e) {
        }
        try {
            work();
        } catch (IOException e) { }
        try {
            work();
        } catch (IllegalStateException e) {
            // expected when closed
        }
        if (status == "done") {
            System.out.println("done");
        }
        try {
            work();
        } catch (RuntimeException e) {
            e.printStackTrace();
        }
    }
}
"#;
        let issues = JavaAnalyzer.check_language_specific_rules(
            code,
            &rules(&[
                "empty-catch",
                "string-equality",
                "generic-exception",
                "print-stack-trace",
                "system-out",
            ]),
        );
        let count = |rule: &str| issues.iter().filter(|i| i.rule == rule).count();
        assert_eq!(count("empty-catch"), 2);
        assert_eq!(count("string-equality"), 1);
        assert_eq!(count("generic-exception"), 3);
        assert_eq!(count("print-stack-trace"), 1);
        assert_eq!(count("system-out"), 1);
    }

    #[test]
    fn test_suggestions() {
        let code = r#"
String out = "";
out += "a";
out += "b";
out += name + "c";
for (int i = 0; i < items.size(); i++) {}
for (int j = 0; j < arr.length; j++) {}
Runnable r = new Runnable() {
    public void run() {}
};
Comparator<String> c = new Comparator<String>() {
    public int compare(String a, String b) { return 0; }
};
"#;
        let suggestions =
            JavaAnalyzer.generate_language_specific_suggestions(code, &CodeMetrics::default());
        let descriptions: Vec<_> = suggestions.iter().map(|s| s.description.as_str()).collect();
        assert!(descriptions.iter().any(|d| d.contains("StringBuilder")));
        assert!(descriptions.iter().any(|d| d.contains("enhanced for")));
        assert!(descriptions.iter().any(|d| d.contains("lambdas")));
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("Reset_State"), "resetState");
        assert_eq!(to_camel_case("load_all"), "loadAll");
        assert_eq!(to_camel_case("Run"), "run");
    }
}
