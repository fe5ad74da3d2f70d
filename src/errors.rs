//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the decision search library, providing
//! structured error types and conversion utilities for all components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from various system components
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Configuration, Corpus, Search, Session, Storage
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Automatic error conversion and chaining
//! - Error categories for structured logging

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the decision search library
#[derive(Debug, Error)]
pub enum SearchError {
    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Malformed decision records in the corpus
    #[error("Invalid decision record in {file}: {details}")]
    InvalidDecisionFormat { file: String, details: String },

    /// Unknown decision identifier
    #[error("Decision not found: {decision_id}")]
    DecisionNotFound { decision_id: String },

    /// Rejected search queries
    #[error("Invalid search query: {query} - {reason}")]
    InvalidSearchQuery { query: String, reason: String },

    /// Query session used out of order
    #[error("Invalid session transition: {details}")]
    InvalidSessionTransition { details: String },

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::Config { .. } | SearchError::Toml(_) => "configuration",
            SearchError::InvalidDecisionFormat { .. }
            | SearchError::DecisionNotFound { .. }
            | SearchError::Json(_) => "corpus",
            SearchError::InvalidSearchQuery { .. } => "search",
            SearchError::InvalidSessionTransition { .. } => "session",
            SearchError::Database(_) | SearchError::Serialization(_) => "storage",
            SearchError::Io(_)
            | SearchError::Internal { .. }
            | SearchError::ValidationFailed { .. } => "generic",
        }
    }
}
