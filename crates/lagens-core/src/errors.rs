//! Structured error types shared across the lagged ensemble crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`LagError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, issuance times, variable names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the operator resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for archive scanning and ensemble assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum LagError {
    /// The archive holds no usable run directories.
    #[error("archive error: {0}")]
    Archive(ErrorInfo),
    /// A run required by a lag window does not exist.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// Member datasets cannot be aligned or are structurally invalid.
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// Filesystem failures while reading members or persisting artifacts.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Encoding and decoding failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl LagError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            LagError::Archive(info)
            | LagError::NotFound(info)
            | LagError::Schema(info)
            | LagError::Io(info)
            | LagError::Serde(info)
            | LagError::Config(info) => info,
        }
    }

    /// Whether the pipeline may record this error and move on to the next target time.
    ///
    /// Archive and configuration errors invalidate every target time, so they abort.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LagError::Archive(_) | LagError::Config(_))
    }

    /// Adds a context entry to the payload, keeping the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            LagError::Archive(info) => LagError::Archive(info.with_context(key, value)),
            LagError::NotFound(info) => LagError::NotFound(info.with_context(key, value)),
            LagError::Schema(info) => LagError::Schema(info.with_context(key, value)),
            LagError::Io(info) => LagError::Io(info.with_context(key, value)),
            LagError::Serde(info) => LagError::Serde(info.with_context(key, value)),
            LagError::Config(info) => LagError::Config(info.with_context(key, value)),
        }
    }

    /// Stable error code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
