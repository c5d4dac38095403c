// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Primary converter: pandoc with a LaTeX PDF engine and fixed styling.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use pdfseal_core::config::PandocSettings;
use pdfseal_core::error::Result;
use pdfseal_core::types::ConverterKind;
use tracing::{debug, info, instrument};

use super::Converter;
use super::process::run_converter;

/// Converts DOCX to PDF by invoking `pandoc`.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    settings: PandocSettings,
    timeout: Duration,
}

impl PandocConverter {
    pub fn new(settings: PandocSettings, timeout: Duration) -> Self {
        Self { settings, timeout }
    }

    /// Build the pandoc invocation:
    ///
    /// `pandoc <src> --pdf-engine=xelatex -V mainfont=... -V colorlinks=true
    ///  -V urlcolor=... -V linkcolor=... --citeproc --from=docx -o <target>`
    pub fn command(&self, source: &Path, target: &Path) -> Command {
        let s = &self.settings;
        let mut command = Command::new(&s.program);
        command
            .arg(source)
            .arg(format!("--pdf-engine={}", s.pdf_engine))
            .arg("-V")
            .arg(format!("mainfont={}", s.main_font))
            .arg("-V")
            .arg("colorlinks=true")
            .arg("-V")
            .arg(format!("urlcolor={}", s.url_color))
            .arg("-V")
            .arg(format!("linkcolor={}", s.link_color));
        if s.citeproc {
            command.arg("--citeproc");
        }
        command
            .arg(format!("--from={}", s.input_format))
            .arg("-o")
            .arg(target);
        command
    }
}

impl Converter for PandocConverter {
    fn kind(&self) -> ConverterKind {
        ConverterKind::Pandoc
    }

    #[instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    fn convert(&self, source: &Path, target: &Path) -> Result<()> {
        let output = run_converter(self.command(source, target), self.timeout, self.kind())?;
        debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "pandoc output");
        info!("converted with pandoc");
        Ok(())
    }
}
