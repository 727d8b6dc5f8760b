//! JavaScript and TypeScript language analyzers.
//!
//! Both dialects share structure extraction, complexity weighting and the
//! JavaScript rule pack. TypeScript adds type-safety rules on top.

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

use super::{column_of, count_matches, is_structural, line_length_issues, scan_pattern};

const MAX_LINE_LENGTH: usize = 120;

const JS_RULES: &[&str] = &[
    "high-complexity",
    "large-class",
    "low-maintainability",
    "no-var",
    "eqeqeq",
    "no-console",
    "no-eval",
    "no-debugger",
    "max-line-length",
];

const TS_RULES: &[&str] = &[
    "high-complexity",
    "large-class",
    "low-maintainability",
    "no-var",
    "eqeqeq",
    "no-console",
    "no-eval",
    "no-debugger",
    "max-line-length",
    "no-explicit-any",
    "no-non-null-assertion",
];

static RULES: phf::Map<&'static str, &'static str> = phf_map! {
    "no-var" => "`var` declarations",
    "eqeqeq" => "Loose equality `==` and `!=`",
    "no-console" => "console.* calls",
    "no-eval" => "eval() and the Function constructor",
    "no-debugger" => "`debugger` statements",
    "max-line-length" => "Lines longer than 120 characters",
    "no-explicit-any" => "Explicit `any` types",
    "no-non-null-assertion" => "Non-null assertions with postfix `!`",
};

lazy_static! {
    static ref BRANCH: Regex = Regex::new(r"\b(if|for|while|case|catch)\b").unwrap();
    static ref LOGICAL: Regex = Regex::new(r"&&|\|\|").unwrap();
    static ref TERNARY: Regex = Regex::new(r"[^?]\?\s").unwrap();

    static ref FUNCTION_DECL: Regex =
        Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*[(<]").unwrap();
    static ref ARROW: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=>"
    ).unwrap();
    static ref METHOD: Regex = Regex::new(
        r"^\s*(?:(?:public|private|protected|static|readonly|override|abstract|get|set)\s+)*(async\s+)?\*?([A-Za-z_$#][\w$]*)\s*(?:<[^>]*>)?\s*\([^;]*$"
    ).unwrap();
    static ref CLASS: Regex =
        Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap();

    static ref IMPORT_FROM: Regex = Regex::new(r#"\bfrom\s+['"]([^'"]+)['"]"#).unwrap();
    static ref IMPORT_BARE: Regex = Regex::new(r#"^\s*import\s+['"]([^'"]+)['"]"#).unwrap();
    static ref REQUIRE: Regex = Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();

    static ref EXPORT_DECL: Regex = Regex::new(
        r"^\s*export\s+(default\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\*?|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)"
    ).unwrap();
    static ref EXPORT_DEFAULT: Regex = Regex::new(r"^\s*export\s+default\b").unwrap();
    static ref EXPORT_LIST: Regex = Regex::new(r"^\s*export\s*\{([^}]*)\}").unwrap();

    static ref VAR: Regex = Regex::new(r"\bvar\s+").unwrap();
    static ref LOOSE_EQ: Regex = Regex::new(r"(?:^|[^=!<>])(==|!=)(?:[^=]|$)").unwrap();
    static ref CONSOLE: Regex =
        Regex::new(r"\bconsole\.(log|debug|info|warn|error|trace)\s*\(").unwrap();
    static ref EVAL: Regex = Regex::new(r"(?:^|[^.\w$])eval\s*\(|\bnew\s+Function\s*\(").unwrap();
    static ref DEBUGGER: Regex = Regex::new(r"\bdebugger\b").unwrap();
    static ref ANY: Regex = Regex::new(r"(?::\s*|\bas\s+|<)any\b").unwrap();
    static ref NON_NULL: Regex = Regex::new(r"[\w)\]]!(?:[.\[),;]|\s*$)").unwrap();

    static ref THEN: Regex = Regex::new(r"\.then\s*\(").unwrap();
    static ref CONCAT: Regex =
        Regex::new(r#"["']\s*\+\s*[\w$(]|[\w$)]\s*\+\s*["']"#).unwrap();
    static ref INDEX_LOOP: Regex =
        Regex::new(r"\bfor\s*\(\s*(?:let|var)\s+\w+\s*=\s*0\s*;\s*\w+\s*<\s*[\w$.]+\.length").unwrap();
}

/// Keywords that look like `name(...) {` inside a class body.
const NOT_METHODS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "super", "new", "typeof",
    "await",
];

const MIN_THEN_CHAINS: usize = 2;
const MIN_CONCATS: usize = 3;
const MIN_VARS: usize = 3;
const MIN_INDEX_LOOPS: usize = 2;
const MIN_ANY: usize = 3;

fn thresholds() -> Thresholds {
    Thresholds {
        complexity: Some(ThresholdValue::Buckets(ComplexityBuckets {
            low: 5.0,
            medium: 10.0,
            high: 20.0,
            critical: 30.0,
        })),
        maintainability: Some(ThresholdValue::Scalar(40.0)),
        coverage: None,
    }
}

fn complexity(code: &str) -> u32 {
    let mut score = 1.0;
    for line in scan(code, CommentSyntax::C_STYLE)
        .iter()
        .filter(|l| l.is_code())
    {
        score += BRANCH.find_iter(&line.code).count() as f64;
        score += LOGICAL.find_iter(&line.code).count() as f64 * 0.5;
        score += TERNARY.find_iter(&line.code).count() as f64 * 0.5;
    }
    finish_complexity(score)
}

fn maintainability(metrics: &CodeMetrics) -> f64 {
    let mut mi = 100.0;
    mi -= ((metrics.complexity.max(1) - 1) as f64 * 1.2).min(40.0);
    mi -= ((metrics.average_function_length - 25.0).max(0.0) * 0.4).min(20.0);
    mi -= (metrics.lines_of_code as f64 / 50.0).min(15.0);
    if metrics.comment_percentage < 10.0 {
        mi -= (10.0 - metrics.comment_percentage) * 0.5;
    }
    clamp_percent(mi)
}

/// Index of the line closing an arrow function body, or the arrow line
/// itself for expression bodies.
fn arrow_end(lines: &[SourceLine<'_>], start: usize) -> usize {
    let head = lines[start].code.trim_end();
    if head.ends_with('{') || head.ends_with("=> {") {
        brace_block_end(lines, start)
    } else {
        start
    }
}

/// Brace depth at the start of each line.
fn line_depths(lines: &[SourceLine<'_>]) -> Vec<i32> {
    let mut depth = 0;
    lines
        .iter()
        .map(|line| {
            let at_start = depth;
            for ch in line.code.chars() {
                match ch {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            at_start
        })
        .collect()
}

fn structure(code: &str) -> CodeStructure {
    let lines = scan(code, CommentSyntax::C_STYLE);
    let depths = line_depths(&lines);
    let mut structure = CodeStructure::default();
    // Depth of each class body, parallel to `structure.classes`.
    let mut body_depths = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = CLASS.captures(&line.code) {
            structure.classes.push(ClassInfo {
                name: caps[1].to_string(),
                line: line.number,
                end_line: lines[brace_block_end(&lines, idx)].number,
                method_count: 0,
            });
            body_depths.push(depths[idx] + 1);
        }
    }

    // Methods sit directly in the innermost enclosing class body; deeper
    // `name(...) {` lines are calls taking callbacks.
    let in_class_body = |idx: usize| {
        let number = lines[idx].number;
        structure
            .classes
            .iter()
            .zip(&body_depths)
            .filter(|(c, _)| number > c.line && number <= c.end_line)
            .min_by_key(|(c, _)| c.end_line - c.line)
            .is_some_and(|(_, &body)| depths[idx] == body)
    };

    let mut functions = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if !line.is_code() {
            continue;
        }
        let text = &line.code;

        let found = if let Some(caps) = FUNCTION_DECL.captures(text) {
            Some((caps[2].to_string(), caps.get(1).is_some(), brace_block_end(&lines, idx)))
        } else if let Some(caps) = ARROW.captures(text) {
            Some((caps[1].to_string(), caps.get(2).is_some(), arrow_end(&lines, idx)))
        } else if in_class_body(idx) && text.trim_end().ends_with('{') {
            METHOD
                .captures(text)
                .filter(|caps| !NOT_METHODS.contains(&&caps[2]))
                .map(|caps| (caps[2].to_string(), caps.get(1).is_some(), brace_block_end(&lines, idx)))
        } else {
            None
        };

        if let Some((name, is_async, end)) = found {
            let body = block_text(&lines, idx, end);
            functions.push(FunctionInfo {
                parameters: count_parameters(&line.code, &["this"]),
                complexity: complexity(&body),
                is_async,
                line: line.number,
                end_line: lines[end].number,
                name,
            });
        }

        // Module specifiers live inside string literals, so read the raw line.
        for re in [&*IMPORT_FROM, &*IMPORT_BARE, &*REQUIRE] {
            if let Some(caps) = re.captures(line.raw) {
                if text.contains("import") || text.contains("require") || text.contains("from") {
                    structure.imports.push(caps[1].to_string());
                    break;
                }
            }
        }

        if let Some(caps) = EXPORT_DECL.captures(text) {
            structure.exports.push(caps[2].to_string());
        } else if let Some(caps) = EXPORT_LIST.captures(text) {
            for item in caps[1].split(',') {
                let exported = item.split(" as ").last().unwrap_or("").trim();
                if !exported.is_empty() {
                    structure.exports.push(exported.to_string());
                }
            }
        } else if EXPORT_DEFAULT.is_match(text) {
            structure.exports.push("default".to_string());
        }
    }

    structure.functions = functions;
    structure.assign_methods();
    structure
}

fn loose_equality_issues(lines: &[SourceLine<'_>]) -> Vec<AnalysisIssue> {
    let mut issues = Vec::new();
    for line in lines.iter().filter(|l| l.is_code()) {
        for caps in LOOSE_EQ.captures_iter(&line.code) {
            let op = &caps[1];
            let strict = if op == "==" { "===" } else { "!==" };
            let start = caps.get(1).map_or(0, |m| m.start());
            issues.push(
                AnalysisIssue::new(
                    "eqeqeq",
                    IssueType::Warning,
                    Severity::Medium,
                    line.number,
                    format!("Use '{}' instead of '{}'", strict, op),
                )
                .at_column(column_of(line, start))
                .with_fix("Use strict equality", strict),
            );
        }
    }
    issues
}

fn check_rules(code: &str, rules: &[String], typescript: bool) -> Vec<AnalysisIssue> {
    let lines = scan(code, CommentSyntax::C_STYLE);
    let language = if typescript { "typescript" } else { "javascript" };
    let mut issues = Vec::new();

    for rule in rules {
        match rule.as_str() {
            "no-var" => issues.extend(scan_pattern(&lines, &VAR, |l, _| {
                Some(
                    AnalysisIssue::new(
                        "no-var",
                        IssueType::Warning,
                        Severity::Medium,
                        l.number,
                        "Unexpected var; use let or const",
                    )
                    .with_fix("Use block-scoped declarations", "let "),
                )
            })),
            "eqeqeq" => issues.extend(loose_equality_issues(&lines)),
            "no-console" => issues.extend(scan_pattern(&lines, &CONSOLE, |l, m| {
                Some(AnalysisIssue::new(
                    "no-console",
                    IssueType::Info,
                    Severity::Low,
                    l.number,
                    format!("Unexpected {}", m.as_str().trim_end_matches(['(', ' '])),
                ))
            })),
            "no-eval" => issues.extend(scan_pattern(&lines, &EVAL, |l, _| {
                Some(AnalysisIssue::new(
                    "no-eval",
                    IssueType::Error,
                    Severity::High,
                    l.number,
                    "eval() and new Function() execute arbitrary code",
                ))
            })),
            "no-debugger" => issues.extend(scan_pattern(&lines, &DEBUGGER, |l, _| {
                Some(
                    AnalysisIssue::new(
                        "no-debugger",
                        IssueType::Error,
                        Severity::Medium,
                        l.number,
                        "Unexpected debugger statement",
                    )
                    .with_fix("Remove the statement", ""),
                )
            })),
            "max-line-length" => issues.extend(line_length_issues(&lines, MAX_LINE_LENGTH, rule)),
            "no-explicit-any" if typescript => issues.extend(scan_pattern(&lines, &ANY, |l, _| {
                Some(
                    AnalysisIssue::new(
                        "no-explicit-any",
                        IssueType::Warning,
                        Severity::Medium,
                        l.number,
                        "Unexpected any; specify a type",
                    )
                    .with_fix("Use unknown and narrow it", "unknown"),
                )
            })),
            "no-non-null-assertion" if typescript => {
                issues.extend(scan_pattern(&lines, &NON_NULL, |l, _| {
                    Some(AnalysisIssue::new(
                        "no-non-null-assertion",
                        IssueType::Warning,
                        Severity::Low,
                        l.number,
                        "Non-null assertion hides a possible null or undefined",
                    ))
                }))
            }
            r if is_structural(r) => {}
            other => debug!(rule = other, language, "unknown rule id ignored"),
        }
    }

    // Column of the `!` rather than the preceding identifier.
    for issue in issues.iter_mut().filter(|i| i.rule == "no-non-null-assertion") {
        issue.column = issue.column.map(|c| c + 1);
    }

    issues
}

fn suggestions(code: &str, metrics: &CodeMetrics, typescript: bool) -> Vec<RefactoringSuggestion> {
    let lines = scan(code, CommentSyntax::C_STYLE);
    let mut suggestions = Vec::new();

    let (thens, first) = count_matches(&lines, &THEN);
    if thens >= MIN_THEN_CHAINS {
        suggestions.push(RefactoringSuggestion::new(
            SuggestionType::Modernize,
            Priority::Medium,
            first,
            format!("{} .then() calls; rewrite promise chains with async/await", thens),
            EstimatedImpact::complexity(1.0).and_maintainability(5.0),
        ));
    }

    let (concats, first) = count_matches(&lines, &CONCAT);
    if concats >= MIN_CONCATS {
        suggestions.push(RefactoringSuggestion::new(
            SuggestionType::Modernize,
            Priority::Low,
            first,
            format!("{} string concatenations; use template literals", concats),
            EstimatedImpact::maintainability(2.0),
        ));
    }

    let (vars, first) = count_matches(&lines, &VAR);
    if vars >= MIN_VARS {
        suggestions.push(RefactoringSuggestion::new(
            SuggestionType::Modernize,
            Priority::Medium,
            first,
            format!("{} var declarations; replace with let or const", vars),
            EstimatedImpact::maintainability(3.0),
        ));
    }

    let (loops, first) = count_matches(&lines, &INDEX_LOOP);
    if loops >= MIN_INDEX_LOOPS {
        suggestions.push(RefactoringSuggestion::new(
            SuggestionType::Modernize,
            Priority::Low,
            first,
            format!(
                "{} index-based loops over arrays; use for...of or map/filter/reduce",
                loops
            ),
            EstimatedImpact::complexity(loops as f64 * 0.5).and_maintainability(3.0),
        ));
    }

    if typescript {
        let (anys, first) = count_matches(&lines, &ANY);
        if anys >= MIN_ANY {
            suggestions.push(RefactoringSuggestion::new(
                SuggestionType::Restructure,
                Priority::Medium,
                first,
                format!("{} explicit any types; introduce interfaces or generics", anys),
                EstimatedImpact::maintainability(6.0),
            ));
        }
    }

    suggestions.extend(base::long_function_suggestions(&structure(code)));
    suggestions.extend(base::documentation_suggestion(metrics, 10.0));
    suggestions.extend(base::complexity_suggestion(metrics, 20));
    suggestions
}

pub struct JavaScriptAnalyzer;

impl JavaScriptAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn default_rules(&self) -> &'static [&'static str] {
        JS_RULES
    }

    fn rule_description(&self, rule: &str) -> Option<&'static str> {
        match rule {
            "no-explicit-any" | "no-non-null-assertion" => None,
            _ => RULES.get(rule).copied(),
        }
    }

    fn default_thresholds(&self) -> Thresholds {
        thresholds()
    }

    fn calculate_complexity(&self, code: &str) -> u32 {
        complexity(code)
    }

    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        maintainability(metrics)
    }

    fn analyze_code_structure(&self, code: &str) -> CodeStructure {
        structure(code)
    }

    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
        check_rules(code, rules, false)
    }

    fn generate_language_specific_suggestions(
        &self,
        code: &str,
        metrics: &CodeMetrics,
    ) -> Vec<RefactoringSuggestion> {
        suggestions(code, metrics, false)
    }
}

pub struct TypeScriptAnalyzer;

impl TypeScriptAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for TypeScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "typescript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn default_rules(&self) -> &'static [&'static str] {
        TS_RULES
    }

    fn rule_description(&self, rule: &str) -> Option<&'static str> {
        RULES.get(rule).copied()
    }

    fn default_thresholds(&self) -> Thresholds {
        thresholds()
    }

    fn calculate_complexity(&self, code: &str) -> u32 {
        complexity(code)
    }

    fn calculate_maintainability(&self, metrics: &CodeMetrics) -> f64 {
        maintainability(metrics)
    }

    fn analyze_code_structure(&self, code: &str) -> CodeStructure {
        structure(code)
    }

    fn check_language_specific_rules(&self, code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
        check_rules(code, rules, true)
    }

    fn generate_language_specific_suggestions(
        &self,
        code: &str,
        metrics: &CodeMetrics,
    ) -> Vec<RefactoringSuggestion> {
        suggestions(code, metrics, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_complexity() {
        let code = r#"
function process(items) {
    if (items.length === 0) {
        return;
    }
    for (const item of items) {
        handle(item);
    }
    try {
        commit();
    } catch (e) {
        rollback();
    }
}
"#;
        assert_eq!(JavaScriptAnalyzer.calculate_complexity(code), 4);

        // if + && + ternary: 1 + 1 + 0.5 + 0.5
        let code = "if (a && b) { x = c ? 1 : 2; }\nconst y = obj?.field ?? 0;\n";
        assert_eq!(JavaScriptAnalyzer.calculate_complexity(code), 3);
    }

    #[test]
    fn test_structure() {
        let code = r#"
import React from 'react';
import './styles.css';
const fs = require("fs");

export class Widget {
    constructor(props) {
        this.props = props;
    }

    async render(target, options) {
        if (options) {
            return target;
        }
    }
}

export function helper(a, b) {
    return a + b;
}

const double = (x) => x * 2;
export const load = async (url) => {
    const res = await fetch(url);
    return res.json();
};

export { double as twice };
"#;
        let s = JavaScriptAnalyzer.analyze_code_structure(code);
        assert_eq!(s.imports, vec!["react", "./styles.css", "fs"]);
        assert_eq!(s.classes.len(), 1);
        assert_eq!(s.classes[0].name, "Widget");
        assert_eq!(s.classes[0].method_count, 2);

        let names: Vec<_> = s.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["constructor", "render", "helper", "double", "load"]);

        let render = &s.functions[1];
        assert!(render.is_async);
        assert_eq!(render.parameters, 2);
        assert_eq!(render.end_line, 15);

        let load = &s.functions[4];
        assert!(load.is_async);
        assert_eq!(load.end_line, 26);

        assert_eq!(s.exports, vec!["Widget", "helper", "load", "twice"]);
    }

    #[test]
    fn test_rules() {
        let code = r#"
var count = 0;
if (count == 0 || name != "x") {
    console.log("zero");
}
if (count === 1 && name !== "y") {}
eval("1 + 1");
parser.eval(code);
debugger;
"#;
        let issues = JavaScriptAnalyzer.check_language_specific_rules(
            code,
            &rules(&["no-var", "eqeqeq", "no-console", "no-eval", "no-debugger", "no-explicit-any"]),
        );
        let count = |rule: &str| issues.iter().filter(|i| i.rule == rule).count();
        assert_eq!(count("no-var"), 1);
        assert_eq!(count("eqeqeq"), 2);
        assert_eq!(count("no-console"), 1);
        assert_eq!(count("no-eval"), 1);
        assert_eq!(count("no-debugger"), 1);
        // TypeScript-only rule is ignored for JavaScript.
        assert_eq!(count("no-explicit-any"), 0);

        let eq = issues.iter().find(|i| i.rule == "eqeqeq").unwrap();
        assert_eq!(eq.line, 3);
        assert_eq!(eq.column, Some(11));
        assert_eq!(eq.fix.as_ref().unwrap().replacement, "===");
    }

    #[test]
    fn test_typescript_rules() {
        let code = r#"
function parse(input: any): string {
    const el = document.getElementById("root")!;
    const value = (input as any).value;
    return el!.textContent + value;
}
if (a !== b && !done) {}
"#;
        let issues = TypeScriptAnalyzer.check_language_specific_rules(
            code,
            &rules(&["no-explicit-any", "no-non-null-assertion"]),
        );
        let count = |rule: &str| issues.iter().filter(|i| i.rule == rule).count();
        assert_eq!(count("no-explicit-any"), 2);
        assert_eq!(count("no-non-null-assertion"), 2);
    }

    #[test]
    fn test_suggestions() {
        let code = r#"
var a = 1;
var b = 2;
var c = 3;
fetch(url).then(r => r.json()).then(data => show(data));
const msg = "Hello " + name + "!" + "?" + suffix;
for (let i = 0; i < items.length; i++) {}
for (let j = 0; j < rows.length; j++) {}
"#;
        let suggestions =
            JavaScriptAnalyzer.generate_language_specific_suggestions(code, &CodeMetrics::default());
        let descriptions: Vec<_> = suggestions.iter().map(|s| s.description.as_str()).collect();
        assert!(descriptions.iter().any(|d| d.contains("async/await")));
        assert!(descriptions.iter().any(|d| d.contains("template literals")));
        assert!(descriptions.iter().any(|d| d.contains("let or const")));
        assert!(descriptions.iter().any(|d| d.contains("for...of")));
    }

    #[test]
    fn test_rule_descriptions_by_dialect() {
        assert!(JavaScriptAnalyzer.rule_description("no-var").is_some());
        assert!(JavaScriptAnalyzer.rule_description("no-explicit-any").is_none());
        assert!(TypeScriptAnalyzer.rule_description("no-explicit-any").is_some());
    }

    #[test]
    fn test_callbacks_inside_methods_are_not_methods() {
        let mut code = String::from("class Timer {\n    start() {\n");
        for i in 0..11 {
            code.push_str(&format!("        setTimeout(() => {{\n            tick({});\n        }}, 10);\n", i));
        }
        code.push_str("    }\n\n    stop() {\n        describe(\"x\", () => {\n        });\n    }\n}\n");

        let s = JavaScriptAnalyzer.analyze_code_structure(&code);
        let names: Vec<_> = s.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["start", "stop"]);
        assert_eq!(s.classes[0].method_count, 2);
    }
}
