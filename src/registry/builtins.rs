//! Built-in language registrations.

use std::sync::Arc;

use crate::analysis::{
    GoAnalyzer, JavaAnalyzer, JavaScriptAnalyzer, LanguageAnalyzer, PhpAnalyzer, PythonAnalyzer,
    TypeScriptAnalyzer,
};

use super::{AnalyzerFactory, LanguageConfig};

fn python() -> Arc<dyn LanguageAnalyzer> {
    Arc::new(PythonAnalyzer::new())
}

fn javascript() -> Arc<dyn LanguageAnalyzer> {
    Arc::new(JavaScriptAnalyzer::new())
}

fn typescript() -> Arc<dyn LanguageAnalyzer> {
    Arc::new(TypeScriptAnalyzer::new())
}

fn java() -> Arc<dyn LanguageAnalyzer> {
    Arc::new(JavaAnalyzer::new())
}

fn php() -> Arc<dyn LanguageAnalyzer> {
    Arc::new(PhpAnalyzer::new())
}

fn go() -> Arc<dyn LanguageAnalyzer> {
    Arc::new(GoAnalyzer::new())
}

const FACTORIES: &[AnalyzerFactory] = &[python, javascript, typescript, java, php, go];

/// One config per built-in language, with the extensions, rules and
/// thresholds its analyzer declares.
pub fn builtin_configs() -> Vec<LanguageConfig> {
    FACTORIES
        .iter()
        .map(|&factory| LanguageConfig::from_factory(factory))
        .collect()
}
