// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded external process execution for the converters.
//
// The calling thread owns the `Child` and polls `try_wait()` until the
// deadline; stdout and stderr are drained by two helper threads into
// size-capped buffers so a chatty tool cannot block on a full pipe.
//
// On unix the converter runs as the leader of its own process group. On
// timeout the whole group is killed, so a grandchild (soffice.bin) cannot
// outlive its launcher and keep the profile lock. Helper threads are still
// never joined unboundedly: output collection waits at most `OUTPUT_GRACE`.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use pdfseal_core::error::{Result, SealError};
use pdfseal_core::types::ConverterKind;
use tracing::{debug, instrument, warn};

/// Interval between `try_wait()` polls.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for pipe readers after the child has exited.
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// Maximum bytes kept per stream; the rest is drained and discarded.
const MAX_CAPTURE_BYTES: u64 = 256 * 1024;

/// Bytes of stderr quoted in error messages.
const STDERR_TAIL_BYTES: usize = 2000;

/// Captured result of a finished process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// Last part of stderr as trimmed text.
    pub fn stderr_tail(&self) -> String {
        tail_text(&self.stderr, STDERR_TAIL_BYTES)
    }
}

/// Run `command` to completion or until `timeout` elapses.
///
/// Errors: the program could not be started (`ConverterFailed`) or did not
/// exit in time (`ConverterTimeout`, child killed). A non-zero exit status is
/// NOT an error here; see [`run_converter`].
#[instrument(skip_all, fields(%converter, program = ?command.get_program()))]
pub fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
    converter: ConverterKind,
) -> Result<ProcessOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command.spawn().map_err(|err| SealError::ConverterFailed {
        converter,
        detail: format!("cannot start {program}: {err}"),
    })?;

    let stdout_rx = child.stdout.take().map(spawn_reader);
    let stderr_rx = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(err) => {
                terminate(&mut child);
                return Err(SealError::ConverterFailed {
                    converter,
                    detail: format!("cannot wait for {program}: {err}"),
                });
            }
        }

        if Instant::now() >= deadline {
            warn!(timeout_secs = timeout.as_secs(), "converter timed out, killing");
            terminate(&mut child);
            return Err(SealError::ConverterTimeout {
                converter,
                secs: timeout.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(stdout_rx);
    let stderr = collect(stderr_rx);
    debug!(
        %status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "converter exited"
    );

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
    })
}

/// Run a converter and require a successful exit status.
pub fn run_converter(
    command: Command,
    timeout: Duration,
    converter: ConverterKind,
) -> Result<ProcessOutput> {
    let output = run_with_timeout(command, timeout, converter)?;
    if output.status.success() {
        return Ok(output);
    }

    let stderr = output.stderr_tail();
    let detail = if stderr.is_empty() {
        output.status.to_string()
    } else {
        format!("{}: {}", output.status, stderr)
    };
    Err(SealError::ConverterFailed { converter, detail })
}

/// Kill the child's process group (or just the child off unix) and reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        #[allow(clippy::cast_possible_wrap)]
        let group = Pid::from_raw(child.id() as i32);
        if let Err(err) = killpg(group, Signal::SIGKILL) {
            debug!(%err, "killpg failed, killing the child only");
            let _ = child.kill();
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.kill();
    }
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let mut limited = pipe.take(MAX_CAPTURE_BYTES);
        let _ = limited.read_to_end(&mut buffer);
        let mut rest = limited.into_inner();
        let _ = std::io::copy(&mut rest, &mut std::io::sink());
        let _ = tx.send(buffer);
    });
    rx
}

fn collect(rx: Option<Receiver<Vec<u8>>>) -> Vec<u8> {
    rx.and_then(|rx| rx.recv_timeout(OUTPUT_GRACE).ok())
        .unwrap_or_default()
}

fn tail_text(bytes: &[u8], max: usize) -> String {
    let start = bytes.len().saturating_sub(max);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}
