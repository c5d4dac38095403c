// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver: sequential per-file pipeline.
//
// resolve name → fresh password → convert → rebuild + encrypt → verify →
// fingerprint → password log. Per-file errors become `Failed` reports and the
// batch moves on; environment errors (source, output dir, log) abort it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pdfseal_core::SealConfig;
use pdfseal_core::error::{Result, SealError};
use pdfseal_core::human_errors::humanize_error;
use pdfseal_core::types::{
    BatchSummary, ConverterKind, FailureStage, FileReport, FileStatus, PlannedFile,
};
use pdfseal_document::{ConversionChain, FilenameResolver, MappingTable, PdfProtector};
use pdfseal_security::{PasswordGenerator, PasswordLog, hash_file};
use tracing::{debug, error, info, instrument, warn};

use crate::discovery::{SourceFilter, discover_sources};

/// What a successfully sealed file produced.
struct Sealed {
    converter: ConverterKind,
    pages: usize,
    sha256: String,
}

/// Runs one batch over the configured source tree.
pub struct BatchDriver {
    config: SealConfig,
    resolver: FilenameResolver,
    chain: ConversionChain,
    passwords: PasswordGenerator,
    filter: SourceFilter,
}

impl BatchDriver {
    /// Validate `config`, load the mapping file and set up pandoc →
    /// LibreOffice conversion.
    pub fn new(config: SealConfig) -> Result<Self> {
        config.validate()?;
        let table = MappingTable::load(&config.mapping_file)?;
        let chain = ConversionChain::from_config(&config);
        Self::with_chain(config, table, chain)
    }

    /// Build a driver from an already-loaded table and a custom chain.
    pub fn with_chain(
        config: SealConfig,
        table: MappingTable,
        chain: ConversionChain,
    ) -> Result<Self> {
        let passwords = PasswordGenerator::new(config.password_length)?;
        let resolver = FilenameResolver::with_default(table, config.default_output_name.clone());
        let filter = SourceFilter::from_config(&config);

        Ok(Self {
            config,
            resolver,
            chain,
            passwords,
            filter,
        })
    }

    pub fn config(&self) -> &SealConfig {
        &self.config
    }

    /// Candidate sources and their output names. Writes nothing.
    pub fn plan(&self) -> Result<Vec<PlannedFile>> {
        let sources = discover_sources(&self.config.source_dir, &self.filter)?;
        Ok(sources
            .into_iter()
            .map(|source| {
                let output_name = self.resolve(&source);
                PlannedFile { source, output_name }
            })
            .collect())
    }

    /// Process every source document.
    ///
    /// Returns `Err` only for environment failures; individual documents
    /// that cannot be processed are reported in the summary.
    #[instrument(
        skip_all,
        fields(
            source = %self.config.source_dir.display(),
            output = %self.config.output_dir.display(),
        )
    )]
    pub fn run(&self) -> Result<BatchSummary> {
        let mut summary = BatchSummary::begin();

        let sources = discover_sources(&self.config.source_dir, &self.filter)?;
        std::fs::create_dir_all(&self.config.output_dir).map_err(|err| {
            SealError::Config(format!(
                "cannot create output directory {}: {}",
                self.config.output_dir.display(),
                err
            ))
        })?;
        let mut log = PasswordLog::create(&self.config.password_log)?;

        info!(documents = sources.len(), "batch started");

        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        for source in sources {
            let output_name = self.resolve(&source);
            if let Some(previous) = claimed.get(&output_name) {
                warn!(
                    output = %output_name,
                    earlier = %previous.display(),
                    later = %source.display(),
                    "two sources resolve to the same output, the later one overwrites it"
                );
            }
            claimed.insert(output_name.clone(), source.clone());

            let report = self.process(&source, output_name, &mut log)?;
            summary.push(report);
        }

        summary.finish();
        info!(
            converted = summary.converted(),
            failed = summary.failed(),
            log_entries = log.entries(),
            "batch finished"
        );
        Ok(summary)
    }

    fn resolve(&self, source: &Path) -> String {
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        self.resolver.resolve(&file_name)
    }

    /// Run one document through the pipeline. `Err` means the batch must
    /// stop (the password log could not be written).
    #[instrument(skip(self, log), fields(source = %source.display()))]
    fn process(
        &self,
        source: &Path,
        output_name: String,
        log: &mut PasswordLog,
    ) -> Result<FileReport> {
        let target = self.config.output_dir.join(&output_name);
        let password = self.passwords.generate();

        let status = match self.seal(source, &target, &password) {
            Ok(sealed) => {
                if let Err(err) = log.record(&output_name, &password) {
                    error!(%err, "password log write failed, aborting batch");
                    discard(&target);
                    return Err(err);
                }
                info!(
                    output = %output_name,
                    converter = %sealed.converter,
                    pages = sealed.pages,
                    "document sealed"
                );
                debug!(output = %output_name, %password, "password recorded");
                FileStatus::Converted {
                    converter: sealed.converter,
                    pages: sealed.pages,
                    sha256: sealed.sha256,
                }
            }
            Err((stage, err)) => {
                let human = humanize_error(&err);
                warn!(
                    output = %output_name,
                    ?stage,
                    error = %err,
                    hint = %human.suggestion,
                    "skipping document"
                );
                if matches!(stage, FailureStage::Protection | FailureStage::Verification) {
                    discard(&target);
                }
                FileStatus::Failed {
                    stage,
                    reason: err.to_string(),
                    suggestion: human.suggestion,
                }
            }
        };

        Ok(FileReport {
            source: source.to_path_buf(),
            output_name,
            status,
        })
    }

    fn seal(
        &self,
        source: &Path,
        target: &Path,
        password: &str,
    ) -> std::result::Result<Sealed, (FailureStage, SealError)> {
        let converter = self
            .chain
            .convert(source, target)
            .map_err(|err| (FailureStage::Conversion, err))?;

        let pages = PdfProtector::protect_in_place(target, password, self.config.verify_output)
            .map_err(|err| {
                let stage = if matches!(err, SealError::Verification(_)) {
                    FailureStage::Verification
                } else {
                    FailureStage::Protection
                };
                (stage, err)
            })?;

        let sha256 = hash_file(target).map_err(|err| (FailureStage::Verification, err))?;

        Ok(Sealed {
            converter,
            pages,
            sha256,
        })
    }
}

/// Remove an output that must not be left behind (unprotected or unlogged).
fn discard(target: &Path) {
    match std::fs::remove_file(target) {
        Ok(()) => debug!(path = %target.display(), "discarded output"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %target.display(), %err, "could not remove output"),
    }
}
