// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fallback converter: headless LibreOffice.
//
// `soffice --convert-to` cannot choose the output filename; it always writes
// `<outdir>/<source stem>.pdf`, and it can exit 0 without writing anything
// (e.g. when another instance holds the profile lock). Each run therefore
// gets a fresh staging directory next to the target as `--outdir`; only a
// file that appears there is renamed to the target.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use pdfseal_core::config::LibreOfficeSettings;
use pdfseal_core::error::{Result, SealError};
use pdfseal_core::types::ConverterKind;
use tracing::{info, instrument, warn};

use super::Converter;
use super::process::run_converter;

/// Converts documents to PDF with `soffice --headless`.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    settings: LibreOfficeSettings,
    timeout: Duration,
}

impl LibreOfficeConverter {
    pub fn new(settings: LibreOfficeSettings, timeout: Duration) -> Self {
        Self { settings, timeout }
    }

    /// `soffice --headless --convert-to <filter> --outdir <dir> <src>`
    pub fn command(&self, source: &Path, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.settings.program);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg(&self.settings.export_filter)
            .arg("--outdir")
            .arg(output_dir)
            .arg(source);
        command
    }
}

/// Where soffice writes its output for `source` in `output_dir`.
pub fn default_output_path(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = source.file_stem().ok_or_else(|| SealError::ConverterFailed {
        converter: ConverterKind::LibreOffice,
        detail: format!("{} has no file name", source.display()),
    })?;
    let mut name = stem.to_os_string();
    name.push(".pdf");
    Ok(output_dir.join(name))
}

fn output_dir_of(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl Converter for LibreOfficeConverter {
    fn kind(&self) -> ConverterKind {
        ConverterKind::LibreOffice
    }

    #[instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    fn convert(&self, source: &Path, target: &Path) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix(".soffice-")
            .tempdir_in(output_dir_of(target))?;
        let produced = default_output_path(source, staging.path())?;

        run_converter(self.command(source, staging.path()), self.timeout, self.kind())?;

        if !produced.is_file() {
            warn!(expected = %produced.display(), "libreoffice output not found");
            return Err(SealError::ConverterOutputMissing(produced));
        }

        std::fs::rename(&produced, target)?;

        info!("converted with libreoffice");
        Ok(())
    }
}
