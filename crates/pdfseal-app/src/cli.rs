// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments. Flags override values from the config file.

use std::path::PathBuf;

use clap::Parser;
use pdfseal_core::SealConfig;
use pdfseal_core::error::Result;

/// Convert a tree of DOCX files into password-protected PDFs.
#[derive(Parser, Debug)]
#[command(name = "pdfseal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory scanned recursively for documents
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Directory receiving the protected PDFs
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Password log file (truncated on every run)
    #[arg(long)]
    pub password_log: Option<PathBuf>,

    /// `phrase,abbreviation` mapping file
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Seconds a single converter invocation may take
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Skip reopening each protected PDF with its password
    #[arg(long)]
    pub no_verify: bool,

    /// List documents and their output names without converting
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON run summary (no passwords) to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Config file (or defaults) with flag overrides applied, validated.
    pub fn resolve_config(&self) -> Result<SealConfig> {
        let mut config = match &self.config {
            Some(path) => SealConfig::load(path)?,
            None => SealConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut SealConfig) {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(log) = &self.password_log {
            config.password_log = log.clone();
        }
        if let Some(mapping) = &self.mapping {
            config.mapping_file = mapping.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.converter_timeout_secs = secs;
        }
        if self.no_verify {
            config.verify_output = false;
        }
    }
}
