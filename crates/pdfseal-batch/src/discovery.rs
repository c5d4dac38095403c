// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source discovery: recursive, name-sorted walk of the source tree.
//
// Symlinked directories are not followed. Unreadable subdirectories are
// logged and skipped; only a missing or unreadable root is fatal.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use pdfseal_core::SealConfig;
use pdfseal_core::error::{Result, SealError};
use tracing::{debug, instrument, warn};

/// Decides which file names are source documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    /// Required suffix including the dot, e.g. `.docx`. Case-sensitive.
    suffix: String,
    /// Office lock-file prefix, e.g. `~$`.
    lock_prefix: String,
}

impl SourceFilter {
    pub fn new(extension: &str, lock_prefix: impl Into<String>) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
            lock_prefix: lock_prefix.into(),
        }
    }

    pub fn from_config(config: &SealConfig) -> Self {
        Self::new(&config.document_extension, config.lock_file_prefix.clone())
    }

    /// Compares raw name bytes, so names that are not valid UTF-8 still
    /// qualify.
    pub fn accepts(&self, file_name: impl AsRef<OsStr>) -> bool {
        let name = file_name.as_ref().as_encoded_bytes();
        if !name.ends_with(self.suffix.as_bytes()) {
            return false;
        }
        self.lock_prefix.is_empty() || !name.starts_with(self.lock_prefix.as_bytes())
    }
}

/// All source documents under `root`, depth-first with entries sorted by
/// name at every level.
#[instrument(skip(filter), fields(root = %root.display()))]
pub fn discover_sources(root: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SealError::SourceMissing(root.to_path_buf()));
    }

    let entries = sorted_entries(root).map_err(|err| {
        warn!(%err, "cannot read source directory");
        SealError::SourceMissing(root.to_path_buf())
    })?;

    let mut found = Vec::new();
    walk(entries, filter, &mut found);
    debug!(count = found.len(), "source documents discovered");
    Ok(found)
}

fn walk(entries: Vec<fs::DirEntry>, filter: &SourceFilter, found: &mut Vec<PathBuf>) {
    for entry in entries {
        let path = entry.path();
        let is_real_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_real_dir {
            match sorted_entries(&path) {
                Ok(children) => walk(children, filter, found),
                Err(err) => warn!(dir = %path.display(), %err, "skipping unreadable directory"),
            }
            continue;
        }

        if filter.accepts(entry.file_name()) && path.is_file() {
            found.push(path);
        }
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}
