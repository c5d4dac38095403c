// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfseal-document: Document handling for the pdfseal batch converter.
//
// Provides the phrase-to-abbreviation name mapping, the two-tier DOCX → PDF
// conversion chain (pandoc, then headless LibreOffice), and the PDF
// post-processor that rebuilds and password-protects converter output.

pub mod convert;
pub mod naming;
pub mod pdf;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export the primary structs so callers can use `pdfseal_document::PdfProtector` etc.
pub use convert::{ConversionChain, Converter, LibreOfficeConverter, PandocConverter};
pub use naming::{FilenameResolver, MappingEntry, MappingTable};
pub use pdf::PdfProtector;
