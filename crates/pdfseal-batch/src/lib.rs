// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfseal-batch: walks the source tree and drives every document through
// name resolution, conversion, encryption and the password log.

pub mod discovery;
pub mod driver;
pub mod report;

pub use discovery::{SourceFilter, discover_sources};
pub use driver::BatchDriver;
pub use report::{format_summary, write_summary};
