//! Language registry.
//!
//! Maps languages to their analyzers and default options, and file
//! extensions to languages. The registry is an ordinary value: build one
//! with [`LanguageRegistry::with_builtins`], share it through an `Arc`, and
//! extend it at runtime. [`global`] offers a process-wide instance for
//! callers that want one.

mod builtins;

pub use builtins::builtin_configs;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::analysis::{LanguageAnalyzer, LanguageBinding, SourceReader};
use crate::error::{AnalysisError, Result};
use crate::model::{AnalysisOptions, AnalysisResult, Thresholds};

/// Constructs an analyzer on first use.
pub type AnalyzerFactory = fn() -> Arc<dyn LanguageAnalyzer>;

/// Registration record for one language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Lowercase language name.
    pub name: String,
    /// Lowercase extensions, without the dot.
    pub extensions: Vec<String>,
    pub analyzer_factory: Option<AnalyzerFactory>,
    pub default_rules: Vec<String>,
    pub default_thresholds: Thresholds,
}

impl LanguageConfig {
    /// A language with no extensions, analyzer or defaults yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Vec::new(),
            analyzer_factory: None,
            default_rules: Vec::new(),
            default_thresholds: Thresholds::default(),
        }
    }

    /// Build a config from the metadata an analyzer declares.
    pub fn from_factory(factory: AnalyzerFactory) -> Self {
        let analyzer = factory();
        Self {
            name: analyzer.language_id().to_string(),
            extensions: analyzer
                .file_extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
            analyzer_factory: Some(factory),
            default_rules: analyzer
                .default_rules()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            default_thresholds: analyzer.default_thresholds(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_factory(mut self, factory: AnalyzerFactory) -> Self {
        self.analyzer_factory = Some(factory);
        self
    }

    pub fn with_default_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.default_thresholds = thresholds;
        self
    }
}

#[derive(Default)]
struct Inner {
    languages: HashMap<String, LanguageConfig>,
    /// Extension to language name.
    extensions: HashMap<String, String>,
    /// Constructed or injected analyzers, by language name.
    analyzers: HashMap<String, Arc<dyn LanguageAnalyzer>>,
}

/// Thread-safe language registry.
#[derive(Default)]
pub struct LanguageRegistry {
    inner: RwLock<Inner>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in language.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for config in builtin_configs() {
            registry.register(config);
        }
        registry
    }

    /// Add or replace a language.
    ///
    /// The last registration for an extension wins. Replacing a language
    /// releases the extensions it no longer lists and drops its cached
    /// analyzer.
    pub fn register(&self, config: LanguageConfig) {
        let mut config = config;
        config.name = config.name.to_lowercase();
        config.extensions = config
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
        let mut seen = HashSet::new();
        config.extensions.retain(|e| seen.insert(e.clone()));

        let mut inner = self.inner.write();
        let name = config.name.clone();

        if inner.languages.remove(&name).is_some() {
            inner.extensions.retain(|_, language| *language != name);
            inner.analyzers.remove(&name);
        }

        for ext in &config.extensions {
            if let Some(previous) = inner.extensions.insert(ext.clone(), name.clone()) {
                if previous != name {
                    debug!(extension = %ext, from = %previous, to = %name, "extension reassigned");
                    if let Some(other) = inner.languages.get_mut(&previous) {
                        other.extensions.retain(|e| e != ext);
                    }
                }
            }
        }

        debug!(language = %name, extensions = ?config.extensions, "registered language");
        inner.languages.insert(name, config);
    }

    /// Map one more extension to an already registered language.
    ///
    /// Fails on an empty extension and on an unknown language.
    pub fn register_extension(&self, extension: &str, language: &str) -> Result<()> {
        let ext = normalize_extension(extension);
        if ext.is_empty() {
            return Err(AnalysisError::InvalidExtension(extension.to_string()));
        }
        let language = language.to_lowercase();
        let mut inner = self.inner.write();

        if !inner.languages.contains_key(&language) {
            return Err(AnalysisError::UnsupportedLanguage(language));
        }

        if let Some(previous) = inner.extensions.insert(ext.clone(), language.clone()) {
            if previous != language {
                if let Some(other) = inner.languages.get_mut(&previous) {
                    other.extensions.retain(|e| *e != ext);
                }
            }
        }
        if let Some(config) = inner.languages.get_mut(&language) {
            if !config.extensions.contains(&ext) {
                config.extensions.push(ext);
            }
        }
        Ok(())
    }

    /// Language registered for the path's extension, compared lowercase.
    pub fn detect_language<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        self.inner.read().extensions.get(&ext).cloned()
    }

    /// The analyzer for a language, constructing and caching it from the
    /// factory on first use.
    pub fn resolve_analyzer(&self, language: &str) -> Option<Arc<dyn LanguageAnalyzer>> {
        let language = language.to_lowercase();
        let factory = {
            let inner = self.inner.read();
            if let Some(analyzer) = inner.analyzers.get(&language) {
                return Some(Arc::clone(analyzer));
            }
            inner.languages.get(&language)?.analyzer_factory?
        };

        let analyzer = factory();
        let mut inner = self.inner.write();
        // Another thread may have won the race; keep the first instance.
        let cached = inner
            .analyzers
            .entry(language)
            .or_insert_with(|| analyzer);
        Some(Arc::clone(cached))
    }

    /// Substitute the analyzer instance used for a registered language.
    pub fn set_analyzer(&self, language: &str, analyzer: Arc<dyn LanguageAnalyzer>) -> Result<()> {
        let language = language.to_lowercase();
        let mut inner = self.inner.write();
        if !inner.languages.contains_key(&language) {
            return Err(AnalysisError::UnsupportedLanguage(language));
        }
        inner.analyzers.insert(language, analyzer);
        Ok(())
    }

    /// Analyzer plus registered defaults for a language.
    pub fn resolve(&self, language: &str) -> Result<LanguageBinding> {
        let name = language.to_lowercase();
        let config = self
            .language_config(&name)
            .ok_or_else(|| AnalysisError::UnsupportedLanguage(name.clone()))?;
        let analyzer = self
            .resolve_analyzer(&name)
            .ok_or_else(|| AnalysisError::NoAnalyzerAvailable(name.clone()))?;

        Ok(LanguageBinding {
            name,
            analyzer,
            default_rules: config.default_rules,
            default_thresholds: config.default_thresholds,
        })
    }

    /// Analyze source text held in memory.
    ///
    /// `path` only labels the result; nothing is read.
    pub fn analyze_code(
        &self,
        code: &str,
        language: &str,
        path: Option<&str>,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let binding = self.resolve(language)?;
        let label = path.map_or_else(|| format!("<inline>.{}", binding.name), str::to_string);
        binding.analyze(code, &label, options)
    }

    /// Analyze one file read through `reader`.
    pub fn analyze_path(
        &self,
        reader: &dyn SourceReader,
        path: &Path,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let display = path.display().to_string();
        let language = self
            .detect_language(path)
            .ok_or_else(|| AnalysisError::UnsupportedFileType {
                path: display.clone(),
            })?;
        let binding = self.resolve(&language)?;
        let code = reader.read_source(path).map_err(|source| AnalysisError::Io {
            path: display.clone(),
            source,
        })?;
        binding.analyze(&code, &display, options)
    }

    /// Analyze files in parallel.
    ///
    /// Files that fail are logged and left out; the others keep input order.
    pub fn analyze_multiple_files<P: AsRef<Path> + Sync>(
        &self,
        reader: &dyn SourceReader,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> Vec<AnalysisResult> {
        paths
            .par_iter()
            .filter_map(|path| {
                let path = path.as_ref();
                match self.analyze_path(reader, path, options) {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "skipping file");
                        None
                    }
                }
            })
            .collect()
    }

    /// Registered language names, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.read().languages.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn language_config(&self, name: &str) -> Option<LanguageConfig> {
        self.inner.read().languages.get(&name.to_lowercase()).cloned()
    }

    /// `(extension, language)` pairs, sorted by extension.
    pub fn extensions(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self
            .inner
            .read()
            .extensions
            .iter()
            .map(|(e, l)| (e.clone(), l.clone()))
            .collect();
        pairs.sort();
        pairs
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

static GLOBAL: OnceCell<Arc<LanguageRegistry>> = OnceCell::new();

/// Build the process-wide registry with the built-in languages.
///
/// Idempotent: later calls return the instance built by the first one.
pub fn init_global() -> Arc<LanguageRegistry> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(LanguageRegistry::with_builtins())))
}

/// The process-wide registry, built on first use.
pub fn global() -> Arc<LanguageRegistry> {
    init_global()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{MemorySourceReader, PythonAnalyzer};

    #[test]
    fn test_detect_language() {
        let registry = LanguageRegistry::with_builtins();
        assert_eq!(registry.detect_language("src/app.py").as_deref(), Some("python"));
        assert_eq!(registry.detect_language("MAIN.GO").as_deref(), Some("go"));
        assert_eq!(registry.detect_language("view.tsx").as_deref(), Some("typescript"));
        assert_eq!(registry.detect_language("notes.xyz"), None);
        assert_eq!(registry.detect_language("Makefile"), None);
    }

    #[test]
    fn test_register_extension_leaves_others_alone() {
        let registry = LanguageRegistry::with_builtins();
        registry.register_extension(".PYX", "python").unwrap();
        assert_eq!(registry.detect_language("fast.pyx").as_deref(), Some("python"));
        assert_eq!(registry.detect_language("app.js").as_deref(), Some("javascript"));
        assert!(registry
            .language_config("python")
            .unwrap()
            .extensions
            .contains(&"pyx".to_string()));

        let err = registry.register_extension("rb", "ruby").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_register_extension_rejects_empty() {
        let registry = LanguageRegistry::with_builtins();
        for ext in ["", ".", "  "] {
            let err = registry.register_extension(ext, "python").unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidExtension(_)));
        }
        assert_eq!(registry.detect_language("file."), None);
    }

    #[test]
    fn test_register_drops_repeated_extensions() {
        let registry = LanguageRegistry::new();
        registry.register(LanguageConfig::new("python").with_extensions(["py", "pyw", "PY", ".py"]));
        assert_eq!(
            registry.language_config("python").unwrap().extensions,
            vec!["py".to_string(), "pyw".to_string()]
        );
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = LanguageRegistry::with_builtins();
        registry.register(
            LanguageConfig::new("Cython")
                .with_extensions(["pyx", "py"])
                .with_factory(|| -> Arc<dyn LanguageAnalyzer> { Arc::new(PythonAnalyzer::new()) }),
        );
        assert_eq!(registry.detect_language("a.py").as_deref(), Some("cython"));
        assert_eq!(registry.detect_language("a.pyw").as_deref(), Some("python"));
        assert!(!registry
            .language_config("python")
            .unwrap()
            .extensions
            .contains(&"py".to_string()));
    }

    #[test]
    fn test_reregistration_releases_stale_extensions() {
        let registry = LanguageRegistry::new();
        registry.register(LanguageConfig::new("lang").with_extensions(["a", "b"]));
        registry.register(LanguageConfig::new("lang").with_extensions(["b"]));
        assert_eq!(registry.detect_language("x.a"), None);
        assert_eq!(registry.detect_language("x.b").as_deref(), Some("lang"));
    }

    #[test]
    fn test_resolve_analyzer_caches_instance() {
        let registry = LanguageRegistry::with_builtins();
        let first = registry.resolve_analyzer("python").unwrap();
        let second = registry.resolve_analyzer("PYTHON").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.resolve_analyzer("cobol").is_none());
    }

    #[test]
    fn test_unbound_language() {
        let registry = LanguageRegistry::new();
        registry.register(LanguageConfig::new("text").with_extensions(["txt"]));

        let err = registry
            .analyze_code("hello", "text", None, &AnalysisOptions::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoAnalyzerAvailable(_)));

        let err = registry
            .analyze_code("hello", "klingon", None, &AnalysisOptions::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_set_analyzer_substitutes_instance() {
        let registry = LanguageRegistry::new();
        registry.register(LanguageConfig::new("text").with_extensions(["txt"]));
        registry
            .set_analyzer("text", Arc::new(PythonAnalyzer::new()))
            .unwrap();

        let options = AnalysisOptions::new().with_rules(["print-statement"]);
        let result = registry
            .analyze_code("print(1)\n", "text", Some("notes.txt"), &options)
            .unwrap();
        assert_eq!(result.language, "text");
        assert_eq!(result.file_path, "notes.txt");
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_analyze_path_errors_name_the_path() {
        let registry = LanguageRegistry::with_builtins();
        let reader = MemorySourceReader::new();

        let err = registry
            .analyze_path(&reader, Path::new("notes.xyz"), &AnalysisOptions::new())
            .unwrap_err();
        assert!(err.to_string().contains("notes.xyz"));

        let err = registry
            .analyze_path(&reader, Path::new("gone.py"), &AnalysisOptions::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
        assert!(err.to_string().contains("gone.py"));
    }

    #[test]
    fn test_batch_keeps_order() {
        let registry = LanguageRegistry::with_builtins();
        let reader = MemorySourceReader::new()
            .with_file("a.py", "x = 1\n")
            .with_file("c.js", "let x = 1;\n");
        let results = registry.analyze_multiple_files(
            &reader,
            &["a.py", "b.unknown", "c.js"],
            &AnalysisOptions::new(),
        );
        let files: Vec<_> = results.iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(files, vec!["a.py", "c.js"]);
    }

    #[test]
    fn test_global_is_idempotent() {
        let a = init_global();
        let b = init_global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &global()));
        assert!(a.languages().contains(&"php".to_string()));
    }
}
