//! Codelens - multi-language heuristic static analysis.
//!
//! Codelens turns source text into metrics (complexity, maintainability,
//! technical debt), rule violations and refactoring suggestions. Every
//! language shares one orchestration algorithm and plugs in its own
//! heuristics through [`LanguageAnalyzer`].
//!
//! # Architecture
//!
//! - `model`: Result and option types shared by every module
//! - `analysis`: The orchestration algorithm, shared helpers and the
//!   built-in language analyzers
//! - `registry`: Language and extension registration, analyzer caching
//! - `config`: `codelens.yaml` loading and per-language overrides
//! - `report`: Output formatting (pretty, JSON)
//! - `cli`: The `codelens` command line
//!
//! # Example
//!
//! ```no_run
//! use codelens::{AnalysisOptions, LanguageRegistry};
//!
//! let registry = LanguageRegistry::with_builtins();
//! let result = registry
//!     .analyze_code("def f():\n    return 1\n", "python", None, &AnalysisOptions::new())
//!     .unwrap();
//! println!("maintainability {:.1}", result.metrics.maintainability);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod report;

pub use analysis::{
    analyze_source, Engine, FsSourceReader, LanguageAnalyzer, LanguageBinding,
    MemorySourceReader, SourceReader,
};
pub use config::ConfigFile;
pub use error::{AnalysisError, Result};
pub use model::{
    AnalysisIssue, AnalysisOptions, AnalysisResult, CodeMetrics, IssueType, Priority,
    RefactoringSuggestion, Severity, SuggestionType, Thresholds,
};
pub use registry::{LanguageConfig, LanguageRegistry};
