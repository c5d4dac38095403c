// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mapping table: `phrase,abbreviation` pairs loaded from a flat text file.
//
//   Midterm Exam,UTS
//   Final Exam,UAS
//
// One pair per line, no header, no quoting. Lines that do not split into
// exactly two non-empty fields are skipped, as are abbreviations that are not
// a plain file name (path separators, `.` or `..`). Iteration order is file
// order; a
// phrase that appears twice keeps its first position and takes the later
// abbreviation.

use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use pdfseal_core::error::{Result, SealError};
use regex::{Regex, RegexBuilder};
use tracing::{debug, info, instrument, warn};

/// One `phrase → abbreviation` pair with its compiled whole-word pattern.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    /// Lower-cased, trimmed phrase.
    phrase: String,
    /// Trimmed abbreviation, case preserved (it becomes the output basename).
    abbreviation: String,
    pattern: Regex,
}

impl MappingEntry {
    /// Build an entry, compiling `phrase` into a case-insensitive whole-word
    /// pattern. Returns `None` when either side is empty after trimming or
    /// the abbreviation could not serve as a file name inside the output
    /// directory.
    pub fn new(phrase: &str, abbreviation: &str) -> Option<Self> {
        let phrase = phrase.trim().to_lowercase();
        let abbreviation = abbreviation.trim();
        if phrase.is_empty() || abbreviation.is_empty() {
            return None;
        }
        if !is_plain_file_name(abbreviation) {
            warn!(abbreviation, "abbreviation is not a plain file name, ignoring it");
            return None;
        }

        let pattern = whole_word_pattern(&phrase)?;
        Some(Self {
            phrase,
            abbreviation: abbreviation.to_string(),
            pattern,
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    /// Whether the phrase occurs as a whole word anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered phrase → abbreviation table.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: IndexMap<String, MappingEntry>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mapping file from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| SealError::MappingFile {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })?;

        let table = Self::parse(&text);
        info!(entries = table.len(), "mapping table loaded");
        Ok(table)
    }

    /// Parse mapping text, silently skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();

        for (index, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.trim().split(',').collect();
            let entry = match fields.as_slice() {
                [phrase, abbreviation] => MappingEntry::new(phrase, abbreviation),
                _ => None,
            };

            match entry {
                Some(entry) => table.insert(entry),
                None => debug!(line = index + 1, "skipping malformed mapping line"),
            }
        }

        table
    }

    /// Add an entry. A phrase already present keeps its position and takes
    /// the new abbreviation.
    pub fn insert(&mut self, entry: MappingEntry) {
        if let Some(previous) = self.entries.insert(entry.phrase.clone(), entry) {
            warn!(
                phrase = %previous.phrase,
                "duplicate phrase in mapping; later abbreviation wins"
            );
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    /// Distinct abbreviations in first-seen order.
    pub fn abbreviations(&self) -> IndexSet<&str> {
        self.entries.values().map(|e| e.abbreviation.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `name` stays inside the directory it is joined to.
fn is_plain_file_name(name: &str) -> bool {
    !matches!(name, "." | "..") && !name.contains(['/', '\\', '\0'])
}

/// Compile `text` as an escaped literal bounded by word boundaries on both
/// sides, matching case-insensitively.
pub(crate) fn whole_word_pattern(text: &str) -> Option<Regex> {
    let source = format!(r"\b{}\b", regex::escape(text));
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            warn!(%err, text, "cannot compile mapping pattern");
            None
        }
    }
}
