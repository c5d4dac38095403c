// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output filename resolution.
//
// Priority, evaluated against the lower-cased source filename:
//   1. first phrase pattern (mapping file order) that matches as a whole word
//   2. longest abbreviation that appears as a whole word (ties: file order)
//   3. the configured default name
//
// Separators are not normalised: `Midterm_Exam.docx` does not contain the
// phrase "midterm exam" because `_` is a word character.

use pdfseal_core::config::DEFAULT_OUTPUT_NAME;
use regex::Regex;
use tracing::trace;

use super::mapping::{MappingTable, whole_word_pattern};

/// Resolves source filenames to output PDF names. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct FilenameResolver {
    table: MappingTable,
    /// Abbreviations longest-first with their whole-word patterns.
    key_terms: Vec<(String, Regex)>,
    default_name: String,
}

impl FilenameResolver {
    /// Build a resolver with the standard default name.
    pub fn new(table: MappingTable) -> Self {
        Self::with_default(table, DEFAULT_OUTPUT_NAME)
    }

    pub fn with_default(table: MappingTable, default_name: impl Into<String>) -> Self {
        let mut abbreviations: Vec<&str> = table.abbreviations().into_iter().collect();
        // Stable, so equal lengths keep mapping file order.
        abbreviations.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let key_terms = abbreviations
            .into_iter()
            .filter_map(|key| {
                whole_word_pattern(&key.to_lowercase()).map(|pattern| (key.to_string(), pattern))
            })
            .collect();

        Self {
            table,
            key_terms,
            default_name: default_name.into(),
        }
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Resolve the output filename (with `.pdf`) for a source filename.
    pub fn resolve(&self, file_name: &str) -> String {
        let lowered = file_name.to_lowercase();

        if let Some(entry) = self.table.entries().find(|entry| entry.matches(&lowered)) {
            trace!(file_name, phrase = entry.phrase(), "phrase match");
            return format!("{}.pdf", entry.abbreviation());
        }

        if let Some((key, _)) = self
            .key_terms
            .iter()
            .find(|(_, pattern)| pattern.is_match(&lowered))
        {
            trace!(file_name, key = %key, "key term match");
            return format!("{key}.pdf");
        }

        trace!(file_name, "no mapping matched, using default name");
        self.default_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(mapping: &str) -> FilenameResolver {
        FilenameResolver::new(MappingTable::parse(mapping))
    }

    #[test]
    fn phrase_match_resolves() {
        let r = resolver("Midterm Exam,UTS\nFinal Exam,UAS\n");
        assert_eq!(r.resolve("Final Exam Chemistry.docx"), "UAS.pdf");
        assert_eq!(r.resolve("MIDTERM EXAM - Physics.docx"), "UTS.pdf");
    }

    #[test]
    fn first_matching_phrase_in_file_order_wins() {
        let r = resolver("Exam,EX\nFinal Exam,UAS\n");
        assert_eq!(r.resolve("Final Exam.docx"), "EX.pdf");
    }

    #[test]
    fn phrase_beats_key_term() {
        // "UAS" appears as a key term, but "midterm exam" is a full phrase.
        let r = resolver("Final Exam,UAS\nMidterm Exam,UTS\n");
        assert_eq!(r.resolve("UAS backup - Midterm Exam.docx"), "UTS.pdf");
    }

    #[test]
    fn key_term_fallback() {
        let r = resolver("Midterm Exam,UTS\n");
        assert_eq!(r.resolve("uts_physics.docx"), "ALL Soal.pdf");
        assert_eq!(r.resolve("UTS physics.docx"), "UTS.pdf");
    }

    #[test]
    fn longest_key_term_wins() {
        let r = resolver("Quiz One,Q\nQuiz Long,QL\nSomething,QLX\n");
        assert_eq!(r.resolve("q ql qlx.docx"), "QLX.pdf");
        assert_eq!(r.resolve("q ql.docx"), "QL.pdf");
        assert_eq!(r.resolve("q.docx"), "Q.pdf");
    }

    #[test]
    fn equal_length_key_terms_keep_file_order() {
        let r = resolver("Alpha,AAA\nBeta,BBB\n");
        assert_eq!(r.resolve("bbb aaa.docx"), "AAA.pdf");
    }

    #[test]
    fn unmatched_uses_default() {
        let r = resolver("Midterm Exam,UTS\n");
        assert_eq!(r.resolve("Syllabus.docx"), "ALL Soal.pdf");
        assert_eq!(resolver("").resolve("anything.docx"), "ALL Soal.pdf");
    }

    #[test]
    fn custom_default_name() {
        let r = FilenameResolver::with_default(MappingTable::new(), "Misc.pdf");
        assert_eq!(r.resolve("x.docx"), "Misc.pdf");
    }

    #[test]
    fn underscores_are_not_normalised() {
        // `_` is a word character, so neither the phrase nor the key term
        // matches; this resolves to the default, not UTS.pdf.
        let r = resolver("Midterm Exam,UTS\n");
        assert_eq!(r.resolve("Midterm_Exam_Biology.docx"), "ALL Soal.pdf");
    }

    #[test]
    fn phrase_inside_larger_word_does_not_match() {
        let r = resolver("bio,BIO\n");
        assert_eq!(r.resolve("Biology Midterm.docx"), "ALL Soal.pdf");
        assert_eq!(r.resolve("Bio Midterm.docx"), "BIO.pdf");
    }

    #[test]
    fn resolution_is_deterministic() {
        let r = resolver("Midterm Exam,UTS\nFinal Exam,UAS\nQuiz,KUIS\n");
        let names = ["Final Exam.docx", "quiz 3.docx", "notes.docx", "UAS.docx"];
        let first: Vec<String> = names.iter().map(|n| r.resolve(n)).collect();
        for _ in 0..10 {
            let again: Vec<String> = names.iter().map(|n| r.resolve(n)).collect();
            assert_eq!(again, first);
        }
    }
}
