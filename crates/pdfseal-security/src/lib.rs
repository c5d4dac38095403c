// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! pdfseal-security: secrets and records for a sealing batch.
//!
//! Generates the per-document passwords, writes the flat password log, and
//! fingerprints sealed outputs so a run summary can identify exactly which
//! bytes each logged password protects.

pub mod integrity;
pub mod password;
pub mod password_log;

pub use integrity::{hash_bytes, hash_file};
pub use password::PasswordGenerator;
pub use password_log::PasswordLog;
