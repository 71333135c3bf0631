//! Error types for Seva Intake.

use std::path::PathBuf;

/// Top-level error type for the intake service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category-catalog errors (load-time validation).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Catalog is missing the fallback category \"{0}\"")]
    MissingFallback(&'static str),

    #[error("Category \"{0}\" has an empty question list")]
    EmptyQuestions(String),

    #[error("Duplicate category \"{0}\" (after case normalization)")]
    DuplicateCategory(String),
}

/// Follow-up wizard errors.
///
/// All three are local precondition violations, never transient — there is
/// nothing to retry. `UnknownCategory` is a routine outcome the caller handles
/// by recording only the primary fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("No follow-up questions for category \"{category}\"")]
    UnknownCategory { category: String },

    #[error("All {total} follow-up questions are already answered")]
    AlreadyComplete { total: usize },

    #[error("Expected {expected} answers, got {got}")]
    AnswerCountMismatch { expected: usize, got: usize },
}

/// Classifier errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Inference request to {model} failed: {reason}")]
    RequestFailed { model: String, reason: String },

    #[error("Inference API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Could not find an intent classification in the model response")]
    UnparseableResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Geocoding errors.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    #[error("Geocoding API returned status {0}")]
    ApiStatus(u16),

    #[error("Malformed geocoding response: {0}")]
    MalformedResponse(String),
}

/// Persistence errors (CSV append, image saving).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to append report to {path}: {message}")]
    Append { path: PathBuf, message: String },

    #[error("Invalid image file name: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the intake service.
pub type Result<T> = std::result::Result<T, Error>;
