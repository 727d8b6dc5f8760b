//! Heuristic code analysis.
//!
//! This module turns source text into metrics, issues and suggestions with
//! fast, single-pass, line-oriented heuristics. There is no parser: every
//! language analyzer classifies lines, masks string contents and matches
//! patterns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ Source text     │────▶│ LanguageAnalyzer │────▶│ analyze_source │
//! │ (SourceReader)  │     │ (python, go, ...)│     │ (orchestration)│
//! └─────────────────┘     └──────────────────┘     └────────────────┘
//!                                                          │
//!                                                          ▼
//!                                                  ┌────────────────┐
//!                                                  │ AnalysisResult │
//!                                                  └────────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/` (e.g., `ruby.rs`)
//! 2. Implement `LanguageAnalyzer`
//! 3. Add it to `builtin_configs()` in `src/registry/builtins.rs`
//!
//! See `languages/python.rs` for a reference implementation.

pub mod base;
mod engine;
mod languages;
pub mod lines;
mod source;
pub mod structure;
mod traits;

pub use engine::{
    analyze_source, parse_basic_metrics, structural_rules, Engine, LanguageBinding,
    MAX_CLASS_METHODS,
};
pub use languages::{
    GoAnalyzer, JavaAnalyzer, JavaScriptAnalyzer, PhpAnalyzer, PythonAnalyzer, TypeScriptAnalyzer,
};
pub use lines::CommentSyntax;
pub use source::{FsSourceReader, MemorySourceReader, SourceReader};
pub use structure::{ClassInfo, CodeStructure, FunctionInfo};
pub use traits::LanguageAnalyzer;
