// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pdfseal.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ConverterKind;

/// Top-level error type for all pdfseal operations.
#[derive(Debug, Error)]
pub enum SealError {
    // -- Environment errors (abort the batch) --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read mapping file {path}: {detail}")]
    MappingFile { path: PathBuf, detail: String },

    #[error("source directory {0} does not exist")]
    SourceMissing(PathBuf),

    #[error("password log {path}: {detail}")]
    PasswordLog { path: PathBuf, detail: String },

    // -- Password errors --
    #[error("password length {0} is too short (minimum 4)")]
    InvalidPasswordLength(usize),

    // -- Conversion errors --
    #[error("{converter} failed: {detail}")]
    ConverterFailed {
        converter: ConverterKind,
        detail: String,
    },

    #[error("{converter} did not finish within {secs}s and was killed")]
    ConverterTimeout { converter: ConverterKind, secs: u64 },

    #[error("conversion reported success but {0} was not produced")]
    ConverterOutputMissing(PathBuf),

    #[error("all converters failed (primary: {primary}; secondary: {secondary})")]
    AllConvertersFailed { primary: String, secondary: String },

    // -- PDF errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("{0} is already encrypted with a different password")]
    ForeignEncryption(PathBuf),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("verification of sealed output failed: {0}")]
    Verification(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SealError {
    /// Whether this error means no file in the batch can be processed.
    ///
    /// Everything else is contained to the file that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::MappingFile { .. }
                | Self::SourceMissing(_)
                | Self::PasswordLog { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_errors_are_fatal() {
        assert!(SealError::SourceMissing(PathBuf::from("/nope")).is_fatal());
        assert!(SealError::Config("bad".into()).is_fatal());
        assert!(
            SealError::PasswordLog {
                path: PathBuf::from("passwords.txt"),
                detail: "read-only".into(),
            }
            .is_fatal()
        );
    }

    #[test]
    fn per_file_errors_are_contained() {
        let timeout = SealError::ConverterTimeout {
            converter: ConverterKind::LibreOffice,
            secs: 30,
        };
        assert!(!timeout.is_fatal());
        assert!(!SealError::ForeignEncryption(PathBuf::from("a.pdf")).is_fatal());
        assert!(!SealError::PdfError("broken xref".into()).is_fatal());
    }

    #[test]
    fn converter_failure_message_names_tool() {
        let err = SealError::ConverterFailed {
            converter: ConverterKind::Pandoc,
            detail: "exit status 43".into(),
        };
        assert_eq!(err.to_string(), "pandoc failed: exit status 43");
    }
}
