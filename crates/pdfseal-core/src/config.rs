// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch configuration. Persisted as JSON; every field has a default so a
// partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SealError};

/// Output name used when a filename matches nothing in the mapping table.
pub const DEFAULT_OUTPUT_NAME: &str = "ALL Soal.pdf";

/// Shortest password that can hold one character of every class.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealConfig {
    /// Directory tree scanned recursively for source documents.
    pub source_dir: PathBuf,
    /// Flat directory receiving the sealed PDFs (created if missing).
    pub output_dir: PathBuf,
    /// Password log, truncated at the start of every run.
    pub password_log: PathBuf,
    /// `phrase,abbreviation` mapping file.
    pub mapping_file: PathBuf,
    /// Source extension without the dot. Matched case-sensitively.
    pub document_extension: String,
    /// Filenames starting with this prefix are office lock files and skipped.
    pub lock_file_prefix: String,
    /// Output name when nothing in the mapping table matches.
    pub default_output_name: String,
    /// Length of each generated password.
    pub password_length: usize,
    /// Upper bound on a single converter invocation.
    pub converter_timeout_secs: u64,
    /// Reopen each sealed file with its password and check the page count.
    pub verify_output: bool,
    pub pandoc: PandocSettings,
    pub libreoffice: LibreOfficeSettings,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source"),
            output_dir: PathBuf::from("output"),
            password_log: PathBuf::from("passwords.txt"),
            mapping_file: PathBuf::from("mappings.txt"),
            document_extension: "docx".into(),
            lock_file_prefix: "~$".into(),
            default_output_name: DEFAULT_OUTPUT_NAME.into(),
            password_length: 24,
            converter_timeout_secs: 300,
            verify_output: true,
            pandoc: PandocSettings::default(),
            libreoffice: LibreOfficeSettings::default(),
        }
    }
}

impl SealConfig {
    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            SealError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            SealError::Config(format!("cannot parse {}: {}", path.display(), err))
        })?;
        Ok(config)
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject settings that would make every file fail.
    pub fn validate(&self) -> Result<()> {
        if self.password_length < MIN_PASSWORD_LENGTH {
            return Err(SealError::Config(format!(
                "password_length must be at least {MIN_PASSWORD_LENGTH}, got {}",
                self.password_length
            )));
        }
        if self.converter_timeout_secs == 0 {
            return Err(SealError::Config(
                "converter_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.document_extension.is_empty() {
            return Err(SealError::Config("document_extension is empty".into()));
        }
        if !self.default_output_name.ends_with(".pdf") {
            return Err(SealError::Config(format!(
                "default_output_name must end in .pdf, got {:?}",
                self.default_output_name
            )));
        }
        if self.default_output_name.contains(['/', '\\']) {
            return Err(SealError::Config(format!(
                "default_output_name must be a plain file name, got {:?}",
                self.default_output_name
            )));
        }
        Ok(())
    }

    pub fn converter_timeout(&self) -> Duration {
        Duration::from_secs(self.converter_timeout_secs)
    }

    /// Suffix a source filename must end with, e.g. `.docx`.
    pub fn document_suffix(&self) -> String {
        format!(".{}", self.document_extension)
    }
}

/// Fixed styling passed to pandoc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PandocSettings {
    pub program: PathBuf,
    pub pdf_engine: String,
    pub main_font: String,
    pub link_color: String,
    pub url_color: String,
    pub citeproc: bool,
    /// Value passed to `--from`.
    pub input_format: String,
}

impl Default for PandocSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            pdf_engine: "xelatex".into(),
            main_font: "DejaVu Serif".into(),
            link_color: "black".into(),
            url_color: "black".into(),
            citeproc: true,
            input_format: "docx".into(),
        }
    }
}

/// Headless LibreOffice fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibreOfficeSettings {
    pub program: PathBuf,
    /// Value passed to `--convert-to`.
    pub export_filter: String,
}

impl Default for LibreOfficeSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("soffice"),
            export_filter: "pdf:writer_pdf_Export".into(),
        }
    }
}
