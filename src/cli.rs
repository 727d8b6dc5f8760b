//! Command-line interface for codelens.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use globset::GlobSet;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::{structural_rules, Engine, FsSourceReader};
use crate::config::ConfigFile;
use crate::model::{AnalysisOptions, AnalysisResult, Severity, Thresholds};
use crate::registry::LanguageRegistry;
use crate::report::{self, Summary};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "vendor",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    "venv",
];

/// Multi-language static analysis - metrics, rule checks and refactoring
/// suggestions.
///
/// Codelens scores source files for complexity, maintainability and
/// technical debt, flags rule violations per language and proposes
/// refactorings, all with fast line-oriented heuristics.
#[derive(Parser)]
#[command(name = "codelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze files or directories
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// List supported languages, extensions and rules
    Languages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Files or directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to config file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Analyze every file as this language instead of detecting it
    #[arg(short, long)]
    pub language: Option<String>,

    /// Comma-separated rule ids, replacing the language defaults
    #[arg(short, long, value_delimiter = ',')]
    pub rules: Option<Vec<String>>,

    /// Complexity threshold for every language
    #[arg(long)]
    pub complexity_threshold: Option<f64>,

    /// Do not generate refactoring suggestions
    #[arg(long)]
    pub no_suggestions: bool,

    /// Do not extract import dependencies
    #[arg(long)]
    pub skip_dependencies: bool,

    /// Exit with 1 if any issue is at or above this severity
    #[arg(long)]
    pub fail_on: Option<Severity>,
}

impl AnalyzeArgs {
    /// Options set on the command line. Unset flags stay unset so the
    /// config file and language defaults show through.
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            rules: self.rules.clone(),
            thresholds: self.complexity_threshold.map(Thresholds::complexity),
            include_suggestions: self.no_suggestions.then_some(false),
            skip_dependencies: self.skip_dependencies.then_some(true),
        }
    }
}

/// Collect analyzable files under `root`.
///
/// Hidden and vendored directories are skipped, as are paths matching the
/// exclusion globs. With `language` set only files of that language are kept.
pub fn collect_files(
    root: &Path,
    registry: &LanguageRegistry,
    exclusions: &GlobSet,
    language: Option<&str>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclusions.is_match(relative) {
            debug!(file = %path.display(), "excluded by config");
            continue;
        }
        let detected = registry.detect_language(path);
        let keep = match (language, detected.as_deref()) {
            (_, None) => false,
            (Some(wanted), Some(found)) => wanted.eq_ignore_ascii_case(found),
            (None, Some(_)) => true,
        };
        if keep {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn spinner(enabled: bool, files: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(format!("analyzing {} files", files));
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Analyze with a forced language: every file goes through the same analyzer.
fn analyze_as(
    engine: &Engine,
    files: &[PathBuf],
    language: &str,
    options: &AnalysisOptions,
) -> Vec<AnalysisResult> {
    files
        .par_iter()
        .filter_map(|path| match engine.analyze_file_as(path, language, options) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping file");
                None
            }
        })
        .collect()
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;
    let config = match ConfigFile::load(args.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let registry = Arc::new(LanguageRegistry::with_builtins());
    if let Err(e) = config.apply_to(&registry) {
        eprintln!("Error: {:#}", e);
        return Ok(EXIT_ERROR);
    }

    let language = args.language.as_deref().map(str::to_lowercase);
    if let Some(lang) = &language {
        if registry.language_config(lang).is_none() {
            eprintln!("Error: unsupported language {:?}", lang);
            eprintln!("Run 'codelens languages' to see supported languages");
            return Ok(EXIT_ERROR);
        }
    }

    let options = args.options();
    if let Err(e) = options.validate() {
        eprintln!("Error: {}", e);
        return Ok(EXIT_ERROR);
    }

    let exclusions = config.exclusions()?;
    let mut files = Vec::new();
    for path in &args.paths {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: cannot access path {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        };
        if metadata.is_dir() {
            files.extend(collect_files(path, &registry, &exclusions, language.as_deref())?);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let engine = Engine::new(Arc::clone(&registry), Arc::new(FsSourceReader))
        .with_defaults(config.options.clone());

    let progress = spinner(args.format == OutputFormat::Pretty, files.len());
    let results = match &language {
        Some(lang) => analyze_as(&engine, &files, lang, &options),
        None => engine.analyze_files(&files, &options),
    };
    progress.finish_and_clear();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => report::write_json(&mut out, &results)?,
        OutputFormat::Pretty => {
            let show_suggestions = options
                .merged_over(&config.options)
                .should_include_suggestions();
            report::write_pretty(&mut out, &results, show_suggestions)?;
        }
    }

    let failed = results.len() < files.len();
    let summary = Summary::from_results(&results);
    let gated = args
        .fail_on
        .is_some_and(|severity| summary.count_at_or_above(severity) > 0);

    if gated {
        Ok(EXIT_FAILED)
    } else if failed {
        Ok(EXIT_ERROR)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the languages command.
pub fn run_languages() -> anyhow::Result<i32> {
    let registry = LanguageRegistry::with_builtins();

    println!("Supported languages:");
    println!();

    for name in registry.languages() {
        let Some(config) = registry.language_config(&name) else {
            continue;
        };
        let extensions: Vec<String> = config.extensions.iter().map(|e| format!(".{}", e)).collect();
        println!("  {:<12} {}", name, extensions.join(" "));

        let analyzer = registry.resolve_analyzer(&name);
        for rule in &config.default_rules {
            let description = structural_rules::description(rule)
                .or_else(|| analyzer.as_ref().and_then(|a| a.rule_description(rule)))
                .unwrap_or("");
            println!("    {:<24} {}", rule, description);
        }
        println!();
    }

    println!("Usage:");
    println!("  codelens analyze <PATH>... --rules <a,b> --format json");

    Ok(EXIT_SUCCESS)
}
