// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: rebuilding, encrypting and verifying converter output.

pub mod protect;

pub use protect::{PdfProtector, seal_document, verify_sealed, write_atomically};
