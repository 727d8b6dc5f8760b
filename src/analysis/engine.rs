//! Orchestration: source text in, [`AnalysisResult`] out.
//!
//! [`analyze_source`] is the fixed algorithm every language goes through:
//!
//! ```text
//! options ──▶ resolve (explicit > language > base) ──▶ validate
//!                                                         │
//! code ──▶ parse_basic_metrics ──▶ structure issues ──┐   │
//!                │                 rule issues ───────┼──▶ threshold filter ──▶ result
//!                └──────────────▶ suggestions ────────┘
//! ```
//!
//! [`Engine`] wraps it for callers that start from paths: it owns the
//! registry, the source reader and engine-level default options.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::model::{
    AnalysisIssue, AnalysisOptions, AnalysisResult, CodeMetrics, IssueType, ResolvedOptions,
    Severity, Thresholds,
};
use crate::registry::LanguageRegistry;

use super::base::{clamp_percent, round2, MAX_TECHNICAL_DEBT};
use super::lines::{scan, LineStats};
use super::source::SourceReader;
use super::structure::CodeStructure;
use super::LanguageAnalyzer;

/// Rule ids raised by the orchestrator itself rather than a rule pack.
pub mod structural_rules {
    /// A function whose complexity exceeds the complexity threshold.
    pub const HIGH_COMPLEXITY: &str = "high-complexity";
    /// A class with more than [`MAX_CLASS_METHODS`](super::MAX_CLASS_METHODS) methods.
    pub const LARGE_CLASS: &str = "large-class";
    /// A file whose maintainability is below the maintainability threshold.
    pub const LOW_MAINTAINABILITY: &str = "low-maintainability";

    /// Short description of a structural rule id.
    pub fn description(rule: &str) -> Option<&'static str> {
        match rule {
            HIGH_COMPLEXITY => Some("Functions above the complexity threshold"),
            LARGE_CLASS => Some("Classes with too many methods"),
            LOW_MAINTAINABILITY => Some("Files below the maintainability threshold"),
            _ => None,
        }
    }
}

/// Classes with more methods than this are flagged.
pub const MAX_CLASS_METHODS: usize = 10;

/// An analyzer together with the defaults its language is registered with.
#[derive(Clone)]
pub struct LanguageBinding {
    pub name: String,
    pub analyzer: Arc<dyn LanguageAnalyzer>,
    pub default_rules: Vec<String>,
    pub default_thresholds: Thresholds,
}

impl LanguageBinding {
    /// Bind an analyzer with the defaults it declares itself.
    pub fn for_analyzer(analyzer: Arc<dyn LanguageAnalyzer>) -> Self {
        Self {
            name: analyzer.language_id().to_string(),
            default_rules: analyzer
                .default_rules()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            default_thresholds: analyzer.default_thresholds(),
            analyzer,
        }
    }

    pub fn analyze(&self, code: &str, file_path: &str, options: &AnalysisOptions) -> Result<AnalysisResult> {
        analyze_source(self, code, file_path, options)
    }
}

impl std::fmt::Debug for LanguageBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageBinding")
            .field("name", &self.name)
            .field("analyzer", &self.analyzer.language_id())
            .field("default_rules", &self.default_rules)
            .finish()
    }
}

/// Run the full analysis of one source text.
///
/// Threshold errors are raised before any metric is computed.
pub fn analyze_source(
    binding: &LanguageBinding,
    code: &str,
    file_path: &str,
    options: &AnalysisOptions,
) -> Result<AnalysisResult> {
    let resolved =
        ResolvedOptions::resolve(options, &binding.default_rules, &binding.default_thresholds)?;
    let analyzer = binding.analyzer.as_ref();

    debug!(
        file = file_path,
        language = %binding.name,
        rules = resolved.rules.len(),
        "analyzing source"
    );

    let (metrics, structure) = parse_basic_metrics(analyzer, code, resolved.skip_dependencies);

    let mut issues = structure_issues(&structure, &metrics, &resolved);
    issues.extend(analyzer.check_language_specific_rules(code, &resolved.rules));
    let mut issues = filter_issues(issues, &metrics, &resolved);
    issues.sort_by(|a, b| (a.line, &a.rule).cmp(&(b.line, &b.rule)));

    let suggestions = if resolved.include_suggestions {
        let mut suggestions = analyzer.generate_language_specific_suggestions(code, &metrics);
        suggestions.sort_by_key(|s| s.line);
        suggestions
    } else {
        Vec::new()
    };

    Ok(AnalysisResult {
        file_path: file_path.to_string(),
        language: binding.name.clone(),
        issues,
        metrics,
        suggestions,
        timestamp: Utc::now(),
    })
}

/// Line counts, structure, complexity, maintainability and technical debt,
/// computed in that order.
///
/// Values returned by the analyzer are forced into their documented ranges.
pub fn parse_basic_metrics(
    analyzer: &dyn LanguageAnalyzer,
    code: &str,
    skip_dependencies: bool,
) -> (CodeMetrics, CodeStructure) {
    let lines = scan(code, analyzer.comment_syntax());
    let stats = LineStats::from_lines(&lines);
    let structure = analyzer.analyze_code_structure(code);

    let mut metrics = CodeMetrics {
        complexity: analyzer.calculate_complexity(code).max(1),
        maintainability: 0.0,
        lines_of_code: stats.code_lines,
        comment_lines: stats.comment_lines,
        comment_percentage: clamp_percent(stats.comment_percentage()),
        function_count: structure.functions.len(),
        average_function_length: round2(structure.average_function_length()),
        dependencies: if skip_dependencies {
            Vec::new()
        } else {
            structure.unique_imports()
        },
        technical_debt: 0.0,
    };
    metrics.maintainability = clamp_percent(analyzer.calculate_maintainability(&metrics));

    let debt = analyzer.calculate_technical_debt(&metrics);
    metrics.technical_debt = if debt.is_nan() {
        0.0
    } else {
        round2(debt.clamp(0.0, MAX_TECHNICAL_DEBT))
    };

    (metrics, structure)
}

/// Issues derived from structure and metrics rather than line rules.
fn structure_issues(
    structure: &CodeStructure,
    metrics: &CodeMetrics,
    resolved: &ResolvedOptions,
) -> Vec<AnalysisIssue> {
    let mut issues = Vec::new();

    if resolved.is_rule_enabled(structural_rules::HIGH_COMPLEXITY) {
        let limit = resolved.complexity.limit();
        for func in &structure.functions {
            let value = func.complexity as f64;
            if value <= limit {
                continue;
            }
            let severity = match resolved.complexity.critical() {
                Some(critical) if value > critical => Severity::High,
                _ => Severity::Medium,
            };
            issues.push(AnalysisIssue::new(
                structural_rules::HIGH_COMPLEXITY,
                IssueType::Warning,
                severity,
                func.line,
                format!(
                    "Function '{}' has complexity {}, exceeding threshold {}",
                    func.name, func.complexity, limit
                ),
            ));
        }
    }

    if resolved.is_rule_enabled(structural_rules::LARGE_CLASS) {
        for class in &structure.classes {
            if class.method_count > MAX_CLASS_METHODS {
                issues.push(AnalysisIssue::new(
                    structural_rules::LARGE_CLASS,
                    IssueType::Warning,
                    Severity::Medium,
                    class.line,
                    format!(
                        "Class '{}' has {} methods, exceeding maximum of {}",
                        class.name, class.method_count, MAX_CLASS_METHODS
                    ),
                ));
            }
        }
    }

    if resolved.is_rule_enabled(structural_rules::LOW_MAINTAINABILITY) && metrics.lines_of_code > 0 {
        let limit = resolved.maintainability.limit();
        if metrics.maintainability < limit {
            let severity = match resolved.maintainability.floor() {
                Some(floor) if metrics.maintainability < floor => Severity::High,
                _ => Severity::Medium,
            };
            issues.push(AnalysisIssue::new(
                structural_rules::LOW_MAINTAINABILITY,
                IssueType::Info,
                severity,
                1,
                format!(
                    "Maintainability index {:.2} is below threshold {}",
                    metrics.maintainability, limit
                ),
            ));
        }
    }

    issues
}

/// Keep issues whose rule is active and, for high-complexity issues, whose
/// file-level complexity also exceeds the threshold.
fn filter_issues(
    issues: Vec<AnalysisIssue>,
    metrics: &CodeMetrics,
    resolved: &ResolvedOptions,
) -> Vec<AnalysisIssue> {
    let file_exceeds = metrics.complexity as f64 > resolved.complexity.limit();
    issues
        .into_iter()
        .filter(|issue| resolved.is_rule_enabled(&issue.rule))
        .filter(|issue| issue.rule != structural_rules::HIGH_COMPLEXITY || file_exceeds)
        .collect()
}

/// Path-oriented front door: owns the registry, the source reader and
/// engine-level default options.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<LanguageRegistry>,
    reader: Arc<dyn SourceReader>,
    defaults: AnalysisOptions,
}

impl Engine {
    /// Create an engine over a registry and a source reader.
    pub fn new(registry: Arc<LanguageRegistry>, reader: Arc<dyn SourceReader>) -> Self {
        Self {
            registry,
            reader,
            defaults: AnalysisOptions::default(),
        }
    }

    /// Set options applied under every caller's options.
    pub fn with_defaults(mut self, defaults: AnalysisOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &Arc<LanguageRegistry> {
        &self.registry
    }

    pub fn defaults(&self) -> &AnalysisOptions {
        &self.defaults
    }

    /// Analyze one file, resolving its language from the extension.
    pub fn analyze_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let options = options.merged_over(&self.defaults);
        self.registry
            .analyze_path(self.reader.as_ref(), path.as_ref(), &options)
    }

    /// Analyze one file as `language`, ignoring its extension. The text is
    /// read through the engine's reader, as for [`analyze_file`](Self::analyze_file).
    pub fn analyze_file_as<P: AsRef<Path>>(
        &self,
        path: P,
        language: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let code = self
            .reader
            .read_source(path)
            .map_err(|source| AnalysisError::Io {
                path: display.clone(),
                source,
            })?;
        self.analyze_code(&code, language, Some(&display), options)
    }

    /// Analyze many files in parallel. Failed files are logged and omitted;
    /// the rest keep input order.
    pub fn analyze_files<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> Vec<AnalysisResult> {
        let options = options.merged_over(&self.defaults);
        self.registry
            .analyze_multiple_files(self.reader.as_ref(), paths, &options)
    }

    /// Async form of [`analyze_files`](Self::analyze_files) for async embedders.
    ///
    /// Each file runs on tokio's blocking pool; results keep input order.
    pub async fn analyze_files_async(
        &self,
        paths: Vec<PathBuf>,
        options: AnalysisOptions,
    ) -> Vec<AnalysisResult> {
        let options = Arc::new(options);
        let tasks = paths.into_iter().map(|path| {
            let engine = self.clone();
            let options = Arc::clone(&options);
            tokio::task::spawn_blocking(move || {
                let result = engine.analyze_file(&path, &options);
                (path, result)
            })
        });

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok((_, Ok(result))) => Some(result),
                Ok((path, Err(e))) => {
                    warn!(file = %path.display(), error = %e, "skipping file");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "analysis task failed");
                    None
                }
            })
            .collect()
    }

    /// Analyze source text directly; nothing is read through the reader.
    pub fn analyze_code(
        &self,
        code: &str,
        language: &str,
        path: Option<&str>,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let options = options.merged_over(&self.defaults);
        self.registry.analyze_code(code, language, path, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::structure::{ClassInfo, FunctionInfo};
    use crate::analysis::{CommentSyntax, MemorySourceReader};
    use crate::model::{
        ComplexityBuckets, EstimatedImpact, Priority, RefactoringSuggestion, SuggestionType,
        ThresholdValue,
    };

    /// Analyzer whose outputs are fixed so the orchestration can be tested
    /// without any real language heuristics.
    struct MockAnalyzer {
        file_complexity: u32,
        function_complexity: u32,
        methods: usize,
    }

    impl LanguageAnalyzer for MockAnalyzer {
        fn language_id(&self) -> &'static str {
            "mock"
        }

        fn file_extensions(&self) -> &'static [&'static str] {
            &["mock"]
        }

        fn comment_syntax(&self) -> CommentSyntax {
            CommentSyntax::PYTHON
        }

        fn default_rules(&self) -> &'static [&'static str] {
            &["high-complexity", "large-class", "mock-rule"]
        }

        fn calculate_complexity(&self, _code: &str) -> u32 {
            self.file_complexity
        }

        fn calculate_maintainability(&self, _metrics: &CodeMetrics) -> f64 {
            250.0
        }

        fn calculate_technical_debt(&self, _metrics: &CodeMetrics) -> f64 {
            -4.0
        }

        fn analyze_code_structure(&self, _code: &str) -> CodeStructure {
            CodeStructure {
                functions: vec![FunctionInfo {
                    name: "work".into(),
                    line: 2,
                    end_line: 5,
                    parameters: 1,
                    complexity: self.function_complexity,
                    is_async: false,
                }],
                classes: vec![ClassInfo {
                    name: "Big".into(),
                    line: 1,
                    end_line: 40,
                    method_count: self.methods,
                }],
                imports: vec!["os".into(), "sys".into(), "os".into()],
                exports: vec![],
            }
        }

        fn check_language_specific_rules(&self, _code: &str, rules: &[String]) -> Vec<AnalysisIssue> {
            // Emits every rule it knows regardless of the request, so the
            // orchestrator's own filter is what is being tested.
            let _ = rules;
            vec![
                AnalysisIssue::new("mock-rule", IssueType::Info, Severity::Low, 3, "mock"),
                AnalysisIssue::new("other-rule", IssueType::Info, Severity::Low, 1, "other"),
            ]
        }

        fn generate_language_specific_suggestions(
            &self,
            _code: &str,
            _metrics: &CodeMetrics,
        ) -> Vec<RefactoringSuggestion> {
            vec![RefactoringSuggestion::new(
                SuggestionType::Inline,
                Priority::Low,
                2,
                "inline it",
                EstimatedImpact::default(),
            )]
        }
    }

    fn binding(file_complexity: u32, function_complexity: u32, methods: usize) -> LanguageBinding {
        LanguageBinding::for_analyzer(Arc::new(MockAnalyzer {
            file_complexity,
            function_complexity,
            methods,
        }))
    }

    #[test]
    fn test_metrics_are_clamped_and_deduplicated() {
        let b = binding(0, 1, 0);
        let result = b.analyze("x = 1\n# note\n", "a.mock", &AnalysisOptions::new()).unwrap();
        assert_eq!(result.metrics.complexity, 1);
        assert_eq!(result.metrics.maintainability, 100.0);
        assert_eq!(result.metrics.technical_debt, 0.0);
        assert_eq!(result.metrics.lines_of_code, 1);
        assert_eq!(result.metrics.comment_lines, 1);
        assert_eq!(result.metrics.comment_percentage, 50.0);
        assert_eq!(result.metrics.dependencies, vec!["os", "sys"]);
        assert_eq!(result.language, "mock");
    }

    #[test]
    fn test_skip_dependencies() {
        let b = binding(1, 1, 0);
        let opts = AnalysisOptions::new().with_skip_dependencies(true);
        let result = b.analyze("x = 1\n", "a.mock", &opts).unwrap();
        assert!(result.metrics.dependencies.is_empty());
    }

    #[test]
    fn test_unrequested_rules_are_dropped() {
        let b = binding(1, 1, 0);
        let result = b.analyze("x\n", "a.mock", &AnalysisOptions::new()).unwrap();
        let rules: Vec<_> = result.issues.iter().map(|i| i.rule.as_str()).collect();
        assert_eq!(rules, vec!["mock-rule"]);
    }

    #[test]
    fn test_high_complexity_needs_both_gates() {
        let opts = AnalysisOptions::new().with_thresholds(Thresholds::complexity(10.0));

        // Function and file both exceed.
        let result = binding(20, 15, 0).analyze("x\n", "a.mock", &opts).unwrap();
        assert_eq!(result.issues_for_rule("high-complexity").count(), 1);

        // Function exceeds, file does not.
        let result = binding(5, 15, 0).analyze("x\n", "a.mock", &opts).unwrap();
        assert_eq!(result.issues_for_rule("high-complexity").count(), 0);

        // File exceeds, no function does.
        let result = binding(20, 5, 0).analyze("x\n", "a.mock", &opts).unwrap();
        assert_eq!(result.issues_for_rule("high-complexity").count(), 0);
    }

    #[test]
    fn test_breakdown_escalates_severity() {
        let opts = AnalysisOptions::new().with_thresholds(Thresholds {
            complexity: Some(ThresholdValue::Buckets(ComplexityBuckets {
                low: 2.0,
                medium: 5.0,
                high: 8.0,
                critical: 12.0,
            })),
            ..Default::default()
        });
        let result = binding(30, 20, 0).analyze("x\n", "a.mock", &opts).unwrap();
        let issue = result.issues_for_rule("high-complexity").next().unwrap();
        assert_eq!(issue.severity, Severity::High);

        let result = binding(30, 10, 0).analyze("x\n", "a.mock", &opts).unwrap();
        let issue = result.issues_for_rule("high-complexity").next().unwrap();
        assert_eq!(issue.severity, Severity::Medium);
    }

    #[test]
    fn test_large_class() {
        let result = binding(1, 1, 11)
            .analyze("x\n", "a.mock", &AnalysisOptions::new())
            .unwrap();
        assert_eq!(result.issues_for_rule("large-class").count(), 1);

        let result = binding(1, 1, 10)
            .analyze("x\n", "a.mock", &AnalysisOptions::new())
            .unwrap();
        assert_eq!(result.issues_for_rule("large-class").count(), 0);
    }

    #[test]
    fn test_suggestions_toggle() {
        let b = binding(1, 1, 0);
        let with = b.analyze("x\n", "a.mock", &AnalysisOptions::new()).unwrap();
        assert_eq!(with.suggestions.len(), 1);
        let without = b
            .analyze("x\n", "a.mock", &AnalysisOptions::new().with_suggestions(false))
            .unwrap();
        assert!(without.suggestions.is_empty());
    }

    #[test]
    fn test_invalid_threshold_fails_fast() {
        let b = binding(1, 1, 0);
        let opts = AnalysisOptions::new().with_thresholds(Thresholds::complexity(0.0));
        let err = b.analyze("x\n", "a.mock", &opts).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidThreshold(_)));
    }

    #[test]
    fn test_engine_defaults_sit_under_caller_options() {
        let registry = Arc::new(LanguageRegistry::with_builtins());
        let reader = MemorySourceReader::new().with_file("a.py", "import os\nprint(1)\n");
        let engine = Engine::new(registry, Arc::new(reader))
            .with_defaults(AnalysisOptions::new().with_rules(["print-statement"]).with_suggestions(false));

        let result = engine.analyze_file("a.py", &AnalysisOptions::new()).unwrap();
        assert!(result.issues.iter().all(|i| i.rule == "print-statement"));
        assert_eq!(result.issues.len(), 1);
        assert!(result.suggestions.is_empty());

        let result = engine
            .analyze_file("a.py", &AnalysisOptions::new().with_rules(["wildcard-import"]))
            .unwrap();
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn test_async_batch_keeps_order_and_isolates_failures() {
        let registry = Arc::new(LanguageRegistry::with_builtins());
        let reader = MemorySourceReader::new()
            .with_file("a.py", "def a():\n    return 1\n")
            .with_file("c.go", "package main\n\nfunc c() {}\n");
        let engine = Engine::new(registry, Arc::new(reader));

        let paths = vec![
            PathBuf::from("a.py"),
            PathBuf::from("b.unknown"),
            PathBuf::from("missing.py"),
            PathBuf::from("c.go"),
        ];
        let results = engine.analyze_files_async(paths, AnalysisOptions::new()).await;
        let files: Vec<_> = results.iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(files, vec!["a.py", "c.go"]);
    }

    #[test]
    fn test_analyze_file_as_reads_through_reader() {
        let registry = Arc::new(LanguageRegistry::with_builtins());
        let reader = MemorySourceReader::new().with_file("script.txt", "var a = 1;\n");
        let engine = Engine::new(registry, Arc::new(reader));

        let result = engine
            .analyze_file_as("script.txt", "javascript", &AnalysisOptions::new())
            .unwrap();
        assert_eq!(result.language, "javascript");
        assert_eq!(result.file_path, "script.txt");
        assert_eq!(result.issues_for_rule("no-var").count(), 1);

        let err = engine
            .analyze_file_as("missing.txt", "javascript", &AnalysisOptions::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
