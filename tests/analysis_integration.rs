//! End-to-end analysis of the fixtures in `testdata/`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use codelens::analysis::{Engine, FsSourceReader, MemorySourceReader};
use codelens::model::{AnalysisOptions, AnalysisResult, Severity, Thresholds};
use codelens::{AnalysisError, LanguageRegistry};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn engine() -> Engine {
    Engine::new(
        Arc::new(LanguageRegistry::with_builtins()),
        Arc::new(FsSourceReader),
    )
}

fn analyze_fixture(name: &str) -> AnalysisResult {
    engine()
        .analyze_file(testdata_path().join(name), &AnalysisOptions::new())
        .expect("fixture should analyze")
}

fn rules(result: &AnalysisResult) -> HashSet<&str> {
    result.issues.iter().map(|i| i.rule.as_str()).collect()
}

fn assert_in_range(result: &AnalysisResult) {
    let m = &result.metrics;
    assert!(m.complexity >= 1, "{}: complexity {}", result.file_path, m.complexity);
    assert!((0.0..=100.0).contains(&m.maintainability));
    assert!((0.0..=100.0).contains(&m.technical_debt));
    assert!((0.0..=100.0).contains(&m.comment_percentage));
}

#[test]
fn test_python_fixture() {
    let result = analyze_fixture("sample.py");
    assert_eq!(result.language, "python");
    assert_in_range(&result);
    assert_eq!(result.metrics.dependencies, vec!["os", "collections"]);
    assert_eq!(result.metrics.function_count, 4);
    assert_eq!(result.metrics.comment_lines, 1);

    let found = rules(&result);
    for rule in [
        "mutable-default-arg",
        "naming-convention",
        "eval-usage",
        "bare-except",
        "compare-to-none",
        "print-statement",
    ] {
        assert!(found.contains(rule), "missing {} in {:?}", rule, found);
    }

    let naming = result.issues_for_rule("naming-convention").next().unwrap();
    assert_eq!(naming.line, 18);
    assert_eq!(naming.fix.as_ref().unwrap().replacement, "load_config");
}

#[test]
fn test_javascript_fixture() {
    let result = analyze_fixture("sample.js");
    assert_eq!(result.language, "javascript");
    assert_in_range(&result);
    assert_eq!(result.metrics.dependencies, vec!["fs", "path"]);

    let found = rules(&result);
    for rule in ["no-var", "eqeqeq", "no-console", "no-debugger"] {
        assert!(found.contains(rule), "missing {} in {:?}", rule, found);
    }
    assert!(!found.contains("no-explicit-any"));
}

#[test]
fn test_typescript_fixture() {
    let result = analyze_fixture("sample.ts");
    assert_eq!(result.language, "typescript");
    assert_in_range(&result);
    assert_eq!(result.metrics.dependencies, vec!["express"]);

    let found = rules(&result);
    assert!(found.contains("no-explicit-any"), "{:?}", found);
    assert!(found.contains("no-non-null-assertion"), "{:?}", found);
}

#[test]
fn test_java_fixture() {
    let result = analyze_fixture("sample.java");
    assert_eq!(result.language, "java");
    assert_in_range(&result);
    assert_eq!(result.metrics.dependencies, vec!["java.util.List"]);

    let found = rules(&result);
    for rule in [
        "string-equality",
        "generic-exception",
        "print-stack-trace",
        "system-out",
    ] {
        assert!(found.contains(rule), "missing {} in {:?}", rule, found);
    }
}

#[test]
fn test_php_fixture() {
    let result = analyze_fixture("sample.php");
    assert_eq!(result.language, "php");
    assert_in_range(&result);

    let found = rules(&result);
    for rule in ["sql-injection", "deprecated-mysql", "xss-echo", "debug-output"] {
        assert!(found.contains(rule), "missing {} in {:?}", rule, found);
    }
    assert_eq!(result.max_severity(), Some(Severity::Critical));
}

#[test]
fn test_go_fixture() {
    let result = analyze_fixture("sample.go");
    assert_eq!(result.language, "go");
    assert_in_range(&result);
    assert_eq!(result.metrics.dependencies, vec!["fmt", "os"]);

    let lines_for = |rule: &str| -> Vec<usize> {
        result.issues_for_rule(rule).map(|i| i.line).collect()
    };
    assert_eq!(lines_for("ignored-error"), vec![13]);
    assert_eq!(lines_for("debug-print"), vec![14]);
    assert_eq!(lines_for("exported-doc"), vec![8, 12]);
    // panic inside main is allowed.
    assert!(lines_for("panic-usage").is_empty());
}

#[test]
fn test_if_for_catch_scores_four() {
    let registry = LanguageRegistry::with_builtins();
    let cases = [
        (
            "python",
            "def f(xs):\n    for x in xs:\n        try:\n            if x:\n                g(x)\n        except ValueError:\n            pass\n",
        ),
        (
            "javascript",
            "function f(xs) {\n  for (const x of xs) {\n    try {\n      if (x) { g(x); }\n    } catch (e) {}\n  }\n}\n",
        ),
        (
            "typescript",
            "function f(xs: number[]) {\n  for (const x of xs) {\n    try {\n      if (x) { g(x); }\n    } catch (e) {}\n  }\n}\n",
        ),
        (
            "java",
            "class A {\n  void f(int[] xs) {\n    for (int x : xs) {\n      try {\n        if (x > 0) { g(x); }\n      } catch (RuntimeException e) { }\n    }\n  }\n}\n",
        ),
    ];
    for (language, code) in cases {
        let result = registry
            .analyze_code(code, language, None, &AnalysisOptions::new())
            .unwrap();
        assert_eq!(result.metrics.complexity, 4, "{}", language);
    }
}

#[test]
fn test_empty_source_every_language() {
    let registry = LanguageRegistry::with_builtins();
    for language in registry.languages() {
        let result = registry
            .analyze_code("", &language, None, &AnalysisOptions::new())
            .unwrap();
        assert_eq!(result.metrics.lines_of_code, 0, "{}", language);
        assert_eq!(result.metrics.complexity, 1, "{}", language);
        assert_eq!(result.metrics.function_count, 0, "{}", language);
        assert!(result.metrics.dependencies.is_empty(), "{}", language);
        assert_eq!(result.file_path, format!("<inline>.{}", language));
    }
}

#[test]
fn test_explicit_rules_replace_defaults() {
    let engine = engine();
    let path = testdata_path().join("sample.py");
    let options = AnalysisOptions::new().with_rules(["print-statement"]);
    let result = engine.analyze_file(&path, &options).unwrap();
    assert!(!result.issues.is_empty());
    assert!(result.issues.iter().all(|i| i.rule == "print-statement"));

    let none = engine
        .analyze_file(&path, &AnalysisOptions::new().with_rules(Vec::<String>::new()))
        .unwrap();
    assert!(none.issues.is_empty());
}

#[test]
fn test_lower_threshold_yields_superset() {
    let registry = LanguageRegistry::with_builtins();
    let mut code = String::from("def busy(a, b, c):\n");
    for i in 0..12 {
        code.push_str(&format!("    if a > {} and b:\n        c += 1\n", i));
    }

    let keys = |threshold: f64| -> HashSet<(String, usize)> {
        let options = AnalysisOptions::new().with_thresholds(Thresholds::complexity(threshold));
        registry
            .analyze_code(&code, "python", None, &options)
            .unwrap()
            .issues
            .into_iter()
            .map(|i| (i.rule, i.line))
            .collect()
    };

    let strict = keys(3.0);
    let loose = keys(50.0);
    assert!(strict.is_superset(&loose));
    assert!(strict.contains(&("high-complexity".to_string(), 1)));
    assert!(!loose.contains(&("high-complexity".to_string(), 1)));
}

#[test]
fn test_suggestions_and_dependencies_toggles() {
    let engine = engine();
    let path = testdata_path().join("sample.go");
    let options = AnalysisOptions::new()
        .with_suggestions(false)
        .with_skip_dependencies(true);
    let result = engine.analyze_file(&path, &options).unwrap();
    assert!(result.suggestions.is_empty());
    assert!(result.metrics.dependencies.is_empty());
}

#[test]
fn test_invalid_threshold_fails_fast() {
    let err = engine()
        .analyze_file(
            testdata_path().join("sample.py"),
            &AnalysisOptions::new().with_thresholds(Thresholds::complexity(0.0)),
        )
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidThreshold(_)));
}

#[test]
fn test_batch_skips_failures_and_keeps_order() {
    let reader = MemorySourceReader::new()
        .with_file("a.py", "import os\nprint(1)\n")
        .with_file("b.txt", "plain text")
        .with_file("c.go", "package main\n");
    let engine = Engine::new(Arc::new(LanguageRegistry::with_builtins()), Arc::new(reader));

    let results = engine.analyze_files(
        &["a.py", "b.txt", "missing.java", "c.go"],
        &AnalysisOptions::new(),
    );
    let paths: Vec<_> = results.iter().map(|r| r.file_path.as_str()).collect();
    assert_eq!(paths, vec!["a.py", "c.go"]);
}

#[test]
fn test_engine_defaults_sit_under_caller_options() {
    let engine = engine().with_defaults(AnalysisOptions::new().with_rules(["eval-usage"]));
    let path = testdata_path().join("sample.py");

    let result = engine.analyze_file(&path, &AnalysisOptions::new()).unwrap();
    assert!(result.issues.iter().all(|i| i.rule == "eval-usage"));

    let result = engine
        .analyze_file(&path, &AnalysisOptions::new().with_rules(["bare-except"]))
        .unwrap();
    assert!(result.issues.iter().all(|i| i.rule == "bare-except"));
    assert!(!result.issues.is_empty());
}

#[test]
fn test_result_json_round_trip() {
    let result = analyze_fixture("sample.php");
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"filePath\""));
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[tokio::test]
async fn test_async_batch_over_fixtures() {
    let dir = testdata_path();
    let paths = vec![
        dir.join("sample.ts"),
        dir.join("does-not-exist.py"),
        dir.join("sample.java"),
    ];
    let results = engine()
        .analyze_files_async(paths, AnalysisOptions::new())
        .await;
    let languages: Vec<_> = results.iter().map(|r| r.language.as_str()).collect();
    assert_eq!(languages, vec!["typescript", "java"]);
}

#[test]
fn test_nested_helpers_do_not_make_a_large_class() {
    let mut code = String::from("class Small:\n");
    for i in 0..6 {
        code.push_str(&format!(
            "    def method_{i}(self):\n        def helper():\n            return {i}\n        return helper()\n\n"
        ));
    }
    let result = LanguageRegistry::with_builtins()
        .analyze_code(&code, "python", None, &AnalysisOptions::new())
        .unwrap();
    assert_eq!(result.issues_for_rule("large-class").count(), 0);
}

#[test]
fn test_callbacks_do_not_make_a_large_class() {
    let mut code = String::from("class Timer {\n  start() {\n");
    for i in 0..11 {
        code.push_str(&format!("    setTimeout(() => {{\n      tick({});\n    }}, 10);\n", i));
    }
    code.push_str("  }\n}\n");
    let result = LanguageRegistry::with_builtins()
        .analyze_code(&code, "javascript", None, &AnalysisOptions::new())
        .unwrap();
    assert_eq!(result.metrics.function_count, 1);
    assert_eq!(result.issues_for_rule("large-class").count(), 0);
}

#[test]
fn test_repeated_rule_ids_report_once() {
    let options = AnalysisOptions::new().with_rules(["no-var", "no-var"]);
    let result = LanguageRegistry::with_builtins()
        .analyze_code("var a = 1;\n", "javascript", None, &options)
        .unwrap();
    assert_eq!(result.issues.len(), 1);
}
