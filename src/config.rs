//! Configuration file schema and loading.
//!
//! A config file sets analysis options for every run, overrides per-language
//! defaults and excludes paths from directory walks. YAML is the default
//! format; a `.json` extension switches to JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{AnalysisOptions, Thresholds};
use crate::registry::LanguageRegistry;

/// File names looked up in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "codelens.yaml",
    "codelens.yml",
    ".codelens.yaml",
    ".codelens.yml",
    "codelens.json",
];

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: String,
    /// Options applied under whatever the command line sets.
    #[serde(default)]
    pub options: AnalysisOptions,
    /// Per-language overrides, keyed by language name.
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageOverride>,
    /// Glob patterns for paths to skip (e.g., "**/generated/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

/// Changes to one language's registered defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LanguageOverride {
    /// Replaces the language's default rule set.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    /// Merged over the language's default thresholds, per metric.
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
    /// Extra extensions mapped to the language.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ConfigFile {
    /// Parse a config file, choosing the format from its extension.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?
        };
        Ok(config)
    }

    /// First config file found in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load the explicit config if given, else a discovered one, else
    /// defaults. The result is validated.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(dir),
        };
        let config = match path {
            Some(path) => {
                debug!(config = %path.display(), "loading configuration");
                Self::parse_file(&path)?
            }
            None => Self::default(),
        };
        validate(&config)?;
        Ok(config)
    }

    /// Apply the per-language overrides to a registry.
    pub fn apply_to(&self, registry: &LanguageRegistry) -> anyhow::Result<()> {
        for (name, overrides) in &self.languages {
            let Some(mut config) = registry.language_config(name) else {
                bail!("config overrides unknown language {:?}", name);
            };
            if let Some(rules) = &overrides.rules {
                config.default_rules = rules.clone();
            }
            if let Some(thresholds) = &overrides.thresholds {
                config.default_thresholds = thresholds.merged_over(&config.default_thresholds);
            }
            config.extensions.extend(overrides.extensions.iter().cloned());
            registry.register(config);
        }
        Ok(())
    }

    /// Compiled matcher for `excluded_paths`.
    pub fn exclusions(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid excluded_paths pattern {:?}", pattern))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// Validate a config for correctness before any analysis runs.
pub fn validate(config: &ConfigFile) -> anyhow::Result<()> {
    config
        .options
        .validate()
        .context("invalid options.thresholds")?;

    for (name, overrides) in &config.languages {
        if name.trim().is_empty() {
            bail!("language override with an empty name");
        }
        if let Some(thresholds) = &overrides.thresholds {
            thresholds
                .validate()
                .with_context(|| format!("invalid thresholds for language {:?}", name))?;
        }
        if let Some(ext) = overrides.extensions.iter().find(|e| e.trim().is_empty()) {
            bail!("empty extension {:?} for language {:?}", ext, name);
        }
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PercentBuckets, ThresholdValue};

    const YAML: &str = r#"
version: "1"
options:
  includeSuggestions: false
  thresholds:
    complexity: 12
languages:
  python:
    rules: [print-statement, eval-usage]
    thresholds:
      maintainability: { low: 10, medium: 30, high: 60 }
    extensions: [pyx]
excluded_paths:
  - "**/generated/**"
"#;

    #[test]
    fn test_parse_yaml() {
        let config: ConfigFile = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(config.options.include_suggestions, Some(false));
        assert_eq!(
            config.options.thresholds.as_ref().unwrap().complexity,
            Some(ThresholdValue::Scalar(12.0))
        );
        let python = &config.languages["python"];
        assert_eq!(python.rules.as_ref().unwrap().len(), 2);
        assert_eq!(python.extensions, vec!["pyx"]);
        validate(&config).unwrap();
    }

    #[test]
    fn test_apply_overrides() {
        let config: ConfigFile = serde_yaml::from_str(YAML).unwrap();
        let registry = LanguageRegistry::with_builtins();
        config.apply_to(&registry).unwrap();

        assert_eq!(registry.detect_language("a.pyx").as_deref(), Some("python"));
        let python = registry.language_config("python").unwrap();
        assert_eq!(python.default_rules, vec!["print-statement", "eval-usage"]);
        // Complexity from the analyzer survives; maintainability is replaced.
        assert!(python.default_thresholds.complexity.is_some());
        assert_eq!(
            python.default_thresholds.maintainability,
            Some(ThresholdValue::Buckets(PercentBuckets {
                low: 10.0,
                medium: 30.0,
                high: 60.0,
            }))
        );
    }

    #[test]
    fn test_unknown_language_override() {
        let config: ConfigFile = serde_yaml::from_str("languages:\n  cobol:\n    rules: []\n").unwrap();
        let err = config
            .apply_to(&LanguageRegistry::with_builtins())
            .unwrap_err();
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config: ConfigFile =
            serde_yaml::from_str("options:\n  thresholds:\n    coverage: 150\n").unwrap();
        assert!(validate(&config).is_err());

        let config = ConfigFile {
            excluded_paths: vec!["[unclosed".to_string()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_load_discovers_and_parses_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load(None, dir.path()).unwrap();
        assert!(config.excluded_paths.is_empty());

        let path = dir.path().join("codelens.json");
        fs::write(&path, r#"{"excluded_paths": ["vendor/**"], "options": {"skipDependencies": true}}"#)
            .unwrap();
        let config = ConfigFile::load(None, dir.path()).unwrap();
        assert_eq!(config.excluded_paths, vec!["vendor/**"]);
        assert_eq!(config.options.skip_dependencies, Some(true));

        let matcher = config.exclusions().unwrap();
        assert!(matcher.is_match("vendor/lib/a.py"));
        assert!(!matcher.is_match("src/a.py"));
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let err = ConfigFile::load(Some(Path::new("/nonexistent/codelens.yaml")), Path::new("."))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/codelens.yaml"));
    }
}
