// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-of-run reporting: JSON summary file and console text.
// Neither output ever contains a password.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use pdfseal_core::error::Result;
use pdfseal_core::types::{BatchSummary, FileStatus};
use tracing::{info, instrument};

/// Write `summary` as pretty-printed JSON.
#[instrument(skip(summary), fields(path = %path.display()))]
pub fn write_summary(summary: &BatchSummary, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(files = summary.total(), "run summary written");
    Ok(())
}

/// Human-readable summary: one line per failed document with its
/// suggestion, then the totals.
pub fn format_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();

    for report in &summary.files {
        if let FileStatus::Failed { stage, reason, suggestion } = &report.status {
            let _ = writeln!(
                out,
                "FAILED {} ({:?}): {}",
                report.source.display(),
                stage,
                reason
            );
            let _ = writeln!(out, "       {}", suggestion);
        }
    }

    let _ = write!(
        out,
        "{} of {} documents converted",
        summary.converted(),
        summary.total()
    );
    if summary.failed() > 0 {
        let _ = write!(out, ", {} failed", summary.failed());
    }
    out
}
