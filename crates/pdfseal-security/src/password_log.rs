// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Password log: flat text record of every sealed output and its password.
//
// Format, one line per successfully processed document, in processing order:
//
//   UTS.pdf = "q7#Kd...."
//
// The file is truncated when the log is created, so it only ever describes
// the current batch.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use pdfseal_core::error::{Result, SealError};
use tracing::{debug, instrument};

/// Append-only writer for the password log of one batch run.
pub struct PasswordLog {
    file: File,
    path: PathBuf,
    entries: usize,
}

impl PasswordLog {
    /// Create (or truncate) the log at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| log_err(&path, &e))?;

        debug!("password log created");
        Ok(Self {
            file,
            path,
            entries: 0,
        })
    }

    /// Append one `<output-name> = "<password>"` line and flush it to disk.
    pub fn record(&mut self, output_name: &str, password: &str) -> Result<()> {
        writeln!(self.file, "{}", format_entry(output_name, password))
            .and_then(|()| self.file.flush())
            .map_err(|e| log_err(&self.path, &e))?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render a single log line (without the trailing newline).
pub fn format_entry(output_name: &str, password: &str) -> String {
    format!("{output_name} = \"{password}\"")
}

/// Parse a log line back into `(output_name, password)`.
///
/// Splits on the last ` = "` so output names containing ` = ` still parse.
pub fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('"')?;
    let (name, password) = line.rsplit_once(" = \"")?;
    Some((name, password))
}

fn log_err(path: &Path, err: &std::io::Error) -> SealError {
    SealError::PasswordLog {
        path: path.to_path_buf(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_written_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt");

        let mut log = PasswordLog::create(&path).unwrap();
        log.record("UTS.pdf", "Ab1!xyz").unwrap();
        log.record("ALL Soal.pdf", "Zz9~qqq").unwrap();
        assert_eq!(log.entries(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "UTS.pdf = \"Ab1!xyz\"\nALL Soal.pdf = \"Zz9~qqq\"\n");
    }

    #[test]
    fn create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt");
        std::fs::write(&path, "stale.pdf = \"old\"\n").unwrap();

        let log = PasswordLog::create(&path).unwrap();
        assert_eq!(log.entries(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn unwritable_location_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("passwords.txt");
        let err = PasswordLog::create(&path).err().expect("must fail");
        assert!(err.is_fatal());
    }

    #[test]
    fn parse_round_trips_format() {
        let line = format_entry("ALL Soal.pdf", "a=\"b'c");
        assert_eq!(parse_entry(&line), Some(("ALL Soal.pdf", "a=\"b'c")));
        assert_eq!(parse_entry("garbage"), None);
    }
}
