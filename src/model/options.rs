//! Caller-supplied analysis options and threshold resolution.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base complexity threshold when neither the caller nor the language sets one.
pub const DEFAULT_COMPLEXITY_THRESHOLD: f64 = 10.0;

/// Base maintainability threshold when neither the caller nor the language sets one.
pub const DEFAULT_MAINTAINABILITY_THRESHOLD: f64 = 40.0;

/// Base coverage threshold when neither the caller nor the language sets one.
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 80.0;

/// A threshold given either as a single number or as a per-bucket breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue<B> {
    Scalar(f64),
    Buckets(B),
}

/// Four-bucket complexity breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityBuckets {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

/// Three-bucket breakdown for percentage metrics (maintainability, coverage).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentBuckets {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl ThresholdValue<ComplexityBuckets> {
    /// The number a function or file must exceed to be flagged.
    pub fn limit(&self) -> f64 {
        match self {
            ThresholdValue::Scalar(v) => *v,
            ThresholdValue::Buckets(b) => b.high,
        }
    }

    /// The escalation point for severity, only known with a breakdown.
    pub fn critical(&self) -> Option<f64> {
        match self {
            ThresholdValue::Scalar(_) => None,
            ThresholdValue::Buckets(b) => Some(b.critical),
        }
    }

    fn values(&self) -> Vec<f64> {
        match self {
            ThresholdValue::Scalar(v) => vec![*v],
            ThresholdValue::Buckets(b) => vec![b.low, b.medium, b.high, b.critical],
        }
    }
}

impl ThresholdValue<PercentBuckets> {
    /// The number a metric must stay at or above.
    pub fn limit(&self) -> f64 {
        match self {
            ThresholdValue::Scalar(v) => *v,
            ThresholdValue::Buckets(b) => b.medium,
        }
    }

    /// The escalation point for severity, only known with a breakdown.
    pub fn floor(&self) -> Option<f64> {
        match self {
            ThresholdValue::Scalar(_) => None,
            ThresholdValue::Buckets(b) => Some(b.low),
        }
    }

    fn values(&self) -> Vec<f64> {
        match self {
            ThresholdValue::Scalar(v) => vec![*v],
            ThresholdValue::Buckets(b) => vec![b.low, b.medium, b.high],
        }
    }
}

/// Per-metric thresholds. Unset metrics fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ThresholdValue<ComplexityBuckets>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainability: Option<ThresholdValue<PercentBuckets>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<ThresholdValue<PercentBuckets>>,
}

impl Thresholds {
    /// Complexity-only thresholds with a single scalar.
    pub fn complexity(limit: f64) -> Self {
        Self {
            complexity: Some(ThresholdValue::Scalar(limit)),
            ..Default::default()
        }
    }

    /// Overlay `self` on `base`: each metric set here wins.
    pub fn merged_over(&self, base: &Thresholds) -> Thresholds {
        Thresholds {
            complexity: self.complexity.or(base.complexity),
            maintainability: self.maintainability.or(base.maintainability),
            coverage: self.coverage.or(base.coverage),
        }
    }

    /// Check every configured value against its valid range.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if let Some(c) = &self.complexity {
            if let Some(bad) = c.values().into_iter().find(|v| !(*v >= 1.0)) {
                return Err(ThresholdError::Complexity(bad));
            }
        }
        if let Some(m) = &self.maintainability {
            if let Some(bad) = m.values().into_iter().find(|v| !in_percent_range(*v)) {
                return Err(ThresholdError::Maintainability(bad));
            }
        }
        if let Some(c) = &self.coverage {
            if let Some(bad) = c.values().into_iter().find(|v| !in_percent_range(*v)) {
                return Err(ThresholdError::Coverage(bad));
            }
        }
        Ok(())
    }
}

fn in_percent_range(v: f64) -> bool {
    (0.0..=100.0).contains(&v)
}

/// An out-of-range threshold, one variant per field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("complexity threshold must be at least 1 (got {0})")]
    Complexity(f64),
    #[error("maintainability threshold must be between 0 and 100 (got {0})")]
    Maintainability(f64),
    #[error("coverage threshold must be between 0 and 100 (got {0})")]
    Coverage(f64),
}

/// Options for a single analysis call.
///
/// Every field is optional so options can be layered: explicit caller values
/// win over engine defaults, which win over language defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Rule-id allow-list. Replaces the language defaults when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_suggestions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_dependencies: Option<bool>,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = Some(rules.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_suggestions(mut self, include: bool) -> Self {
        self.include_suggestions = Some(include);
        self
    }

    pub fn with_skip_dependencies(mut self, skip: bool) -> Self {
        self.skip_dependencies = Some(skip);
        self
    }

    /// Returns whether suggestions are generated (defaults to true).
    pub fn should_include_suggestions(&self) -> bool {
        self.include_suggestions.unwrap_or(true)
    }

    /// Returns whether dependency extraction is skipped (defaults to false).
    pub fn should_skip_dependencies(&self) -> bool {
        self.skip_dependencies.unwrap_or(false)
    }

    /// Overlay `self` on `base`, field by field.
    pub fn merged_over(&self, base: &AnalysisOptions) -> AnalysisOptions {
        let thresholds = match (&self.thresholds, &base.thresholds) {
            (Some(ours), Some(theirs)) => Some(ours.merged_over(theirs)),
            (Some(ours), None) => Some(ours.clone()),
            (None, theirs) => theirs.clone(),
        };
        AnalysisOptions {
            rules: self.rules.clone().or_else(|| base.rules.clone()),
            thresholds,
            include_suggestions: self.include_suggestions.or(base.include_suggestions),
            skip_dependencies: self.skip_dependencies.or(base.skip_dependencies),
        }
    }

    /// Fail fast on out-of-range thresholds.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        match &self.thresholds {
            Some(t) => t.validate(),
            None => Ok(()),
        }
    }
}

/// Options with every layer applied, ready for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub rules: Vec<String>,
    pub complexity: ThresholdValue<ComplexityBuckets>,
    pub maintainability: ThresholdValue<PercentBuckets>,
    pub coverage: ThresholdValue<PercentBuckets>,
    pub include_suggestions: bool,
    pub skip_dependencies: bool,
}

impl ResolvedOptions {
    /// Resolve caller options against language defaults and base defaults.
    ///
    /// Explicit `rules` replace `default_rules` entirely and repeated ids
    /// collapse to their first occurrence; thresholds merge per metric. The effective thresholds are validated before returning.
    pub fn resolve(
        options: &AnalysisOptions,
        default_rules: &[String],
        default_thresholds: &Thresholds,
    ) -> Result<Self, ThresholdError> {
        options.validate()?;

        let thresholds = options
            .thresholds
            .as_ref()
            .map(|t| t.merged_over(default_thresholds))
            .unwrap_or_else(|| default_thresholds.clone());
        thresholds.validate()?;

        let requested = options.rules.as_deref().unwrap_or(default_rules);
        let mut seen = HashSet::new();
        let rules = requested
            .iter()
            .filter(|r| seen.insert(r.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            rules,
            complexity: thresholds
                .complexity
                .unwrap_or(ThresholdValue::Scalar(DEFAULT_COMPLEXITY_THRESHOLD)),
            maintainability: thresholds
                .maintainability
                .unwrap_or(ThresholdValue::Scalar(DEFAULT_MAINTAINABILITY_THRESHOLD)),
            coverage: thresholds
                .coverage
                .unwrap_or(ThresholdValue::Scalar(DEFAULT_COVERAGE_THRESHOLD)),
            include_suggestions: options.should_include_suggestions(),
            skip_dependencies: options.should_skip_dependencies(),
        })
    }

    /// Whether a rule id is active for this run.
    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = AnalysisOptions::default();
        assert!(opts.should_include_suggestions());
        assert!(!opts.should_skip_dependencies());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_scalar_and_breakdown_parse() {
        let json = r#"{
            "rules": ["no-var"],
            "thresholds": {
                "complexity": {"low": 3, "medium": 6, "high": 10, "critical": 20},
                "maintainability": 55,
                "coverage": {"low": 40, "medium": 60, "high": 80}
            },
            "includeSuggestions": false
        }"#;
        let opts: AnalysisOptions = serde_json::from_str(json).unwrap();
        let t = opts.thresholds.as_ref().unwrap();
        assert_eq!(t.complexity.unwrap().limit(), 10.0);
        assert_eq!(t.complexity.unwrap().critical(), Some(20.0));
        assert_eq!(t.maintainability.unwrap().limit(), 55.0);
        assert_eq!(t.coverage.unwrap().limit(), 60.0);
        assert!(!opts.should_include_suggestions());
    }

    #[test]
    fn test_options_round_trip_preserves_shape() {
        let json = r#"{"rules":["eqeqeq"],"thresholds":{"complexity":12.0},"skipDependencies":true}"#;
        let opts: AnalysisOptions = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&opts).unwrap(), json);
    }

    #[test]
    fn test_validation_messages_name_field() {
        let err = AnalysisOptions::new()
            .with_thresholds(Thresholds::complexity(0.5))
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("complexity threshold"));

        let err = AnalysisOptions::new()
            .with_thresholds(Thresholds {
                maintainability: Some(ThresholdValue::Scalar(120.0)),
                ..Default::default()
            })
            .validate()
            .unwrap_err();
        assert_eq!(err, ThresholdError::Maintainability(120.0));
        assert!(err.to_string().contains("between 0 and 100"));

        let err = AnalysisOptions::new()
            .with_thresholds(Thresholds {
                coverage: Some(ThresholdValue::Buckets(PercentBuckets {
                    low: -1.0,
                    medium: 50.0,
                    high: 90.0,
                })),
                ..Default::default()
            })
            .validate()
            .unwrap_err();
        assert_eq!(err, ThresholdError::Coverage(-1.0));
    }

    #[test]
    fn test_merge_layers() {
        let language = AnalysisOptions::new()
            .with_rules(["a", "b"])
            .with_thresholds(Thresholds {
                complexity: Some(ThresholdValue::Scalar(15.0)),
                maintainability: Some(ThresholdValue::Scalar(30.0)),
                coverage: None,
            });
        let caller = AnalysisOptions::new().with_thresholds(Thresholds::complexity(5.0));

        let merged = caller.merged_over(&language);
        assert_eq!(merged.rules, Some(vec!["a".to_string(), "b".to_string()]));
        let t = merged.thresholds.unwrap();
        assert_eq!(t.complexity, Some(ThresholdValue::Scalar(5.0)));
        assert_eq!(t.maintainability, Some(ThresholdValue::Scalar(30.0)));
    }

    #[test]
    fn test_resolve_explicit_rules_replace_defaults() {
        let defaults = vec!["x".to_string(), "y".to_string()];
        let opts = AnalysisOptions::new().with_rules(["z"]);
        let resolved = ResolvedOptions::resolve(&opts, &defaults, &Thresholds::default()).unwrap();
        assert_eq!(resolved.rules, vec!["z".to_string()]);
        assert!(!resolved.is_rule_enabled("x"));

        let resolved =
            ResolvedOptions::resolve(&AnalysisOptions::new(), &defaults, &Thresholds::default())
                .unwrap();
        assert_eq!(resolved.rules, defaults);
        assert_eq!(resolved.complexity.limit(), DEFAULT_COMPLEXITY_THRESHOLD);
    }

    #[test]
    fn test_resolve_collapses_repeated_rules() {
        let opts = AnalysisOptions::new().with_rules(["no-var", "eqeqeq", "no-var"]);
        let resolved = ResolvedOptions::resolve(&opts, &[], &Thresholds::default()).unwrap();
        assert_eq!(resolved.rules, vec!["no-var".to_string(), "eqeqeq".to_string()]);
    }
}
