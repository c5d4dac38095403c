// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for a pdfseal batch run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The external tool that produced a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterKind {
    /// Pandoc with a LaTeX PDF engine (first choice).
    Pandoc,
    /// LibreOffice in headless mode (fallback).
    #[serde(rename = "libreoffice")]
    LibreOffice,
}

impl ConverterKind {
    /// Short lowercase name used in log fields and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pandoc => "pandoc",
            Self::LibreOffice => "libreoffice",
        }
    }
}

impl std::fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where in the per-file pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Neither converter produced a PDF.
    Conversion,
    /// Decrypt / rebuild / encrypt of the produced PDF failed.
    Protection,
    /// The sealed file did not reopen with its password.
    Verification,
}

/// Terminal state of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Converted, encrypted and recorded in the password log.
    Converted {
        converter: ConverterKind,
        pages: usize,
        /// SHA-256 hex digest of the sealed output.
        sha256: String,
    },
    /// Skipped; nothing was written to the password log.
    Failed {
        stage: FailureStage,
        reason: String,
        /// Plain-language next step for the user.
        suggestion: String,
    },
}

/// Outcome for a single source document. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub output_name: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileReport {
    pub fn is_converted(&self) -> bool {
        matches!(self.status, FileStatus::Converted { .. })
    }
}

/// A source document and the output name it resolves to (dry run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub output_name: String,
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Reports in processing order.
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    /// Start a new, empty summary stamped with the current time.
    pub fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of files converted and logged.
    pub fn converted(&self) -> usize {
        self.files.iter().filter(|r| r.is_converted()).count()
    }

    /// Number of files skipped after a failure.
    pub fn failed(&self) -> usize {
        self.files.len() - self.converted()
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converted(name: &str) -> FileReport {
        FileReport {
            source: PathBuf::from(format!("src/{name}.docx")),
            output_name: format!("{name}.pdf"),
            status: FileStatus::Converted {
                converter: ConverterKind::Pandoc,
                pages: 2,
                sha256: "ab".repeat(32),
            },
        }
    }

    fn failed(name: &str) -> FileReport {
        FileReport {
            source: PathBuf::from(format!("src/{name}.docx")),
            output_name: format!("{name}.pdf"),
            status: FileStatus::Failed {
                stage: FailureStage::Conversion,
                reason: "both converters failed".into(),
                suggestion: "Open the document in a word processor and re-save it.".into(),
            },
        }
    }

    #[test]
    fn summary_counts() {
        let mut summary = BatchSummary::begin();
        summary.push(converted("a"));
        summary.push(failed("b"));
        summary.push(converted("c"));
        summary.finish();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.converted(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn report_serialises_with_status_tag() {
        let json = serde_json::to_value(failed("b")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "conversion");
        assert_eq!(json["output_name"], "b.pdf");
    }

    #[test]
    fn converter_display() {
        assert_eq!(ConverterKind::Pandoc.to_string(), "pandoc");
        assert_eq!(ConverterKind::LibreOffice.to_string(), "libreoffice");
    }
}
