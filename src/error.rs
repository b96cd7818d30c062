//! Error types for ferro-effect
//!
//! Every fallible operation in the crate returns [`FerroError`]. Errors carry
//! a stable [`ErrorCode`] so callers can branch on the category without
//! matching message text.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input errors (E1xxx)
    /// Variant description could not be turned into a variant
    MalformedVariant = 1001,
    /// Effect name is not one of the known effect kinds
    UnknownEffect = 1002,

    // Reference errors (E2xxx)
    /// Sequence could not be read from the genome
    SequenceAccess = 2001,
    /// Transcript model is structurally invalid
    InvalidTranscript = 2002,

    // Validation errors (E3xxx)
    /// Invalid coordinate range
    InvalidRange = 3001,

    // Configuration errors (E8xxx)
    /// Configuration file could not be parsed
    ConfigError = 8001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MalformedVariant => "malformed variant description",
            ErrorCode::UnknownEffect => "unknown effect name",
            ErrorCode::SequenceAccess => "reference sequence not accessible",
            ErrorCode::InvalidTranscript => "invalid transcript model",
            ErrorCode::InvalidRange => "invalid coordinate range",
            ErrorCode::ConfigError => "invalid configuration",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-effect operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerroError {
    /// The supplied fields do not describe a variant
    #[error("Malformed variant: {msg}")]
    MalformedVariant { msg: String },

    /// An effect name did not parse
    #[error("Unknown effect: {name}")]
    UnknownEffect { name: String },

    /// The genome could not provide the requested bases
    #[error("Cannot read {chrom}:{start}-{end}: {msg}")]
    SequenceAccess {
        chrom: String,
        start: u64,
        end: u64,
        msg: String,
    },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: {msg}")]
    InvalidCoordinates { msg: String },

    /// A transcript model violates its structural invariants
    #[error("Invalid transcript {id}: {msg}")]
    InvalidTranscript { id: String, msg: String },

    /// Configuration could not be loaded
    #[error("Config error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl FerroError {
    /// Shorthand for a [`FerroError::MalformedVariant`]
    pub fn malformed(msg: impl Into<String>) -> Self {
        FerroError::MalformedVariant { msg: msg.into() }
    }

    /// Shorthand for a [`FerroError::SequenceAccess`]
    pub fn sequence_access(chrom: &str, start: u64, end: u64, msg: impl Into<String>) -> Self {
        FerroError::SequenceAccess {
            chrom: chrom.to_string(),
            start,
            end,
            msg: msg.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            FerroError::MalformedVariant { .. } => ErrorCode::MalformedVariant,
            FerroError::UnknownEffect { .. } => ErrorCode::UnknownEffect,
            FerroError::SequenceAccess { .. } => ErrorCode::SequenceAccess,
            FerroError::InvalidCoordinates { .. } => ErrorCode::InvalidRange,
            FerroError::InvalidTranscript { .. } => ErrorCode::InvalidTranscript,
            FerroError::Config { .. } => ErrorCode::ConfigError,
            FerroError::Io { .. } => ErrorCode::IoError,
            FerroError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Message prefixed with the error code, e.g. `[E1001] Malformed variant: ...`
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for FerroError {
    fn from(err: std::io::Error) -> Self {
        FerroError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FerroError {
    fn from(err: serde_json::Error) -> Self {
        FerroError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FerroError {
    fn from(err: toml::de::Error) -> Self {
        FerroError::Config {
            msg: err.to_string(),
        }
    }
}
