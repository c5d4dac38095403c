// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Naming module: phrase mapping table and output filename resolution.

pub mod mapping;
pub mod resolver;

pub use mapping::{MappingEntry, MappingTable};
pub use resolver::FilenameResolver;
