//! Errors surfaced by single-file analysis operations.

use thiserror::Error;

use crate::model::ThresholdError;

/// Errors that can occur while analysing a file or a source text.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("unsupported file type: {path} (no language registered for its extension)")]
    UnsupportedFileType { path: String },
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("invalid file extension: {0:?}")]
    InvalidExtension(String),
    #[error("no analyzer available for language: {0}")]
    NoAnalyzerAvailable(String),
    #[error("invalid threshold: {0}")]
    InvalidThreshold(#[from] ThresholdError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = AnalysisError::UnsupportedFileType {
            path: "notes.xyz".to_string(),
        };
        assert!(err.to_string().contains("notes.xyz"));

        let err: AnalysisError = ThresholdError::Coverage(150.0).into();
        assert!(err.to_string().contains("coverage threshold"));
    }
}
