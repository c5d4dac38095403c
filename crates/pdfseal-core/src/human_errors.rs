// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language explanations for errors shown at the end of a batch run.
//
// The people running a conversion batch are usually preparing exam papers,
// not debugging LaTeX. Every error maps to one sentence saying what went
// wrong and one saying what to try.

use crate::error::SealError;
use crate::types::ConverterKind;

/// Who has to act to fix the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Paths or settings are wrong; nothing in the batch can run.
    Setup,
    /// A converter is missing, misconfigured or hung.
    Tooling,
    /// This particular document cannot be processed as-is.
    Document,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (one line).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `SealError` into a `HumanError`.
pub fn humanize_error(err: &SealError) -> HumanError {
    match err {
        SealError::Config(detail) => HumanError {
            message: "The configuration is not valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            severity: Severity::Setup,
        },

        SealError::MappingFile { path, .. } => HumanError {
            message: "The name mapping file could not be read.".into(),
            suggestion: format!(
                "Check that {} exists and contains lines like `Midterm Exam,UTS`.",
                path.display()
            ),
            severity: Severity::Setup,
        },

        SealError::SourceMissing(path) => HumanError {
            message: "The folder with the documents does not exist.".into(),
            suggestion: format!("Check the source path: {}", path.display()),
            severity: Severity::Setup,
        },

        SealError::PasswordLog { path, .. } => HumanError {
            message: "The password list could not be written.".into(),
            suggestion: format!(
                "Make sure {} is in a folder you can write to and is not open in another program.",
                path.display()
            ),
            severity: Severity::Setup,
        },

        SealError::InvalidPasswordLength(len) => HumanError {
            message: "The password length setting is too small.".into(),
            suggestion: format!("Use a length of at least 4 (currently {len}). 24 is recommended."),
            severity: Severity::Setup,
        },

        SealError::ConverterFailed { converter, detail } => {
            humanize_converter(*converter, detail)
        }

        SealError::ConverterTimeout { converter, secs } => HumanError {
            message: format!(
                "{} took longer than {secs} seconds and was stopped.",
                tool_label(*converter)
            ),
            suggestion: "Very large documents may need a longer timeout. Otherwise, open the \
                         document and re-save it, then try again."
                .into(),
            severity: Severity::Tooling,
        },

        SealError::ConverterOutputMissing(path) => HumanError {
            message: "LibreOffice finished but did not create the PDF.".into(),
            suggestion: format!(
                "Close any running LibreOffice windows and try again. (Expected {})",
                path.display()
            ),
            severity: Severity::Tooling,
        },

        SealError::AllConvertersFailed { .. } => HumanError {
            message: "Neither Pandoc nor LibreOffice could convert this document.".into(),
            suggestion: "Open the document in Word, save a fresh copy, and try again.".into(),
            severity: Severity::Document,
        },

        SealError::PdfError(_) | SealError::Verification(_) => HumanError {
            message: "The converted PDF could not be processed.".into(),
            suggestion: "The converter produced a damaged file. Try converting this document again."
                .into(),
            severity: Severity::Document,
        },

        SealError::ForeignEncryption(_) => HumanError {
            message: "The converted PDF was already locked with another password.".into(),
            suggestion: "Remove the protection from the source document and run the batch again."
                .into(),
            severity: Severity::Document,
        },

        SealError::Encryption(detail) => HumanError {
            message: "The PDF could not be locked with a password.".into(),
            suggestion: format!("Try again; if it keeps failing, report this error: {detail}"),
            severity: Severity::Document,
        },

        SealError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "A file or folder could not be accessed.".into(),
                suggestion: "Check the folder permissions for the source and output folders."
                    .into(),
                severity: Severity::Setup,
            },
            _ => HumanError {
                message: "A file could not be read or written.".into(),
                suggestion: format!("Check free disk space and try again. ({io_err})"),
                severity: Severity::Setup,
            },
        },

        SealError::Serialization(detail) => HumanError {
            message: "The run summary could not be written.".into(),
            suggestion: format!("This is a bug; please report it. ({detail})"),
            severity: Severity::Setup,
        },
    }
}

fn tool_label(converter: ConverterKind) -> &'static str {
    match converter {
        ConverterKind::Pandoc => "Pandoc",
        ConverterKind::LibreOffice => "LibreOffice",
    }
}

fn humanize_converter(converter: ConverterKind, detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();
    let tool = tool_label(converter);

    if lower.contains("no such file") || lower.contains("not found") {
        HumanError {
            message: format!("{tool} is not installed or not on the PATH."),
            suggestion: format!("Install {tool}, or set its full path in the configuration file."),
            severity: Severity::Tooling,
        }
    } else if converter == ConverterKind::Pandoc && lower.contains("xelatex") {
        HumanError {
            message: "Pandoc could not find the LaTeX engine.".into(),
            suggestion: "Install a TeX distribution that provides xelatex (for example TeX Live)."
                .into(),
            severity: Severity::Tooling,
        }
    } else if lower.contains("font") {
        HumanError {
            message: format!("{tool} could not find the document font."),
            suggestion: "Install the configured font (DejaVu Serif by default) or change \
                         `main_font`."
                .into(),
            severity: Severity::Tooling,
        }
    } else {
        HumanError {
            message: format!("{tool} could not convert the document."),
            suggestion: format!("The fallback converter will be tried. (Detail: {detail})"),
            severity: Severity::Document,
        }
    }
}
