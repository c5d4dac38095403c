// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfseal: batch DOCX → password-protected PDF converter.
//
// Entry point. Initialises logging, resolves the configuration and runs (or
// plans) one batch. Exit status: 0 all converted, 2 some documents failed,
// 1 the batch could not run.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use pdfseal_batch::{BatchDriver, format_summary, write_summary};
use pdfseal_core::error::{Result, SealError};
use pdfseal_core::human_errors::humanize_error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;

const EXIT_FATAL: u8 = 1;
const EXIT_PARTIAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&cli.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            report_fatal(&err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = cli.resolve_config()?;
    info!(
        source = %config.source_dir.display(),
        output = %config.output_dir.display(),
        dry_run = cli.dry_run,
        "pdfseal starting"
    );

    let driver = BatchDriver::new(config)?;

    if cli.dry_run {
        let plan = driver.plan()?;
        for planned in &plan {
            println!("{} -> {}", planned.source.display(), planned.output_name);
        }
        println!("{} documents would be converted", plan.len());
        return Ok(ExitCode::SUCCESS);
    }

    let summary = driver.run()?;
    println!("{}", format_summary(&summary));
    if summary.converted() > 0 {
        println!(
            "Passwords written to {}",
            driver.config().password_log.display()
        );
    }

    if let Some(path) = &cli.summary_json {
        write_summary(&summary, path)?;
    }

    if summary.failed() == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

fn report_fatal(err: &SealError) {
    let human = humanize_error(err);
    error!(error = %err, "batch aborted");
    eprintln!("error: {}", human.message);
    eprintln!("  {}", human.suggestion);
    eprintln!("  ({})", err);
}
