use thiserror::Error;

/// Domain extractor error types.
///
/// Extraction itself never fails; these only come out of configuration
/// (suffix list parsing and option loading).
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Suffix list error at line {line}: {message}")]
    SuffixList { line: usize, message: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
