// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX → PDF conversion with a single fallback.
//
// Chain: pandoc (styled LaTeX output) → headless LibreOffice. The fallback
// runs for any primary failure, including a timeout. There is no retry
// beyond that one fallback attempt.

pub mod libreoffice;
pub mod pandoc;
pub mod process;

use std::path::Path;

use pdfseal_core::SealConfig;
use pdfseal_core::error::{Result, SealError};
use pdfseal_core::types::ConverterKind;
use tracing::{error, info, instrument, warn};

pub use libreoffice::LibreOfficeConverter;
pub use pandoc::PandocConverter;

/// An external document-to-PDF converter.
pub trait Converter {
    fn kind(&self) -> ConverterKind;

    /// Convert `source` into a PDF at exactly `target`.
    fn convert(&self, source: &Path, target: &Path) -> Result<()>;
}

/// Primary converter with one fallback.
pub struct ConversionChain {
    primary: Box<dyn Converter>,
    secondary: Box<dyn Converter>,
}

impl ConversionChain {
    pub fn new(primary: Box<dyn Converter>, secondary: Box<dyn Converter>) -> Self {
        Self { primary, secondary }
    }

    /// Pandoc first, LibreOffice second, both with the configured timeout.
    pub fn from_config(config: &SealConfig) -> Self {
        let timeout = config.converter_timeout();
        Self::new(
            Box::new(PandocConverter::new(config.pandoc.clone(), timeout)),
            Box::new(LibreOfficeConverter::new(config.libreoffice.clone(), timeout)),
        )
    }

    /// Convert `source` to `target`, returning which converter succeeded.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub fn convert(&self, source: &Path, target: &Path) -> Result<ConverterKind> {
        let primary_err = match self.primary.convert(source, target) {
            Ok(()) => return Ok(self.primary.kind()),
            Err(err) => err,
        };

        warn!(
            converter = %self.primary.kind(),
            error = %primary_err,
            fallback = %self.secondary.kind(),
            "primary conversion failed, trying fallback"
        );

        match self.secondary.convert(source, target) {
            Ok(()) => {
                info!(converter = %self.secondary.kind(), "fallback conversion succeeded");
                Ok(self.secondary.kind())
            }
            Err(secondary_err) => {
                error!(
                    converter = %self.secondary.kind(),
                    error = %secondary_err,
                    "fallback conversion also failed"
                );
                Err(SealError::AllConvertersFailed {
                    primary: primary_err.to_string(),
                    secondary: secondary_err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Converter double that records calls and succeeds or fails on demand.
    struct Scripted {
        kind: ConverterKind,
        succeed: bool,
        calls: Rc<Cell<u32>>,
    }

    impl Converter for Scripted {
        fn kind(&self) -> ConverterKind {
            self.kind
        }

        fn convert(&self, _source: &Path, _target: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.succeed {
                Ok(())
            } else {
                Err(SealError::ConverterFailed {
                    converter: self.kind,
                    detail: "exit status 1".into(),
                })
            }
        }
    }

    fn chain(
        primary_ok: bool,
        secondary_ok: bool,
    ) -> (ConversionChain, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let primary_calls = Rc::new(Cell::new(0));
        let secondary_calls = Rc::new(Cell::new(0));
        let chain = ConversionChain::new(
            Box::new(Scripted {
                kind: ConverterKind::Pandoc,
                succeed: primary_ok,
                calls: primary_calls.clone(),
            }),
            Box::new(Scripted {
                kind: ConverterKind::LibreOffice,
                succeed: secondary_ok,
                calls: secondary_calls.clone(),
            }),
        );
        (chain, primary_calls, secondary_calls)
    }

    #[test]
    fn primary_success_skips_fallback() {
        let (chain, primary, secondary) = chain(true, true);
        let kind = chain.convert(Path::new("a.docx"), Path::new("a.pdf")).unwrap();
        assert_eq!(kind, ConverterKind::Pandoc);
        assert_eq!((primary.get(), secondary.get()), (1, 0));
    }

    #[test]
    fn primary_failure_uses_fallback_once() {
        let (chain, primary, secondary) = chain(false, true);
        let kind = chain.convert(Path::new("a.docx"), Path::new("a.pdf")).unwrap();
        assert_eq!(kind, ConverterKind::LibreOffice);
        assert_eq!((primary.get(), secondary.get()), (1, 1));
    }

    #[test]
    fn both_failing_reports_both_reasons() {
        let (chain, primary, secondary) = chain(false, false);
        let err = chain
            .convert(Path::new("a.docx"), Path::new("a.pdf"))
            .unwrap_err();
        match err {
            SealError::AllConvertersFailed {
                primary: first,
                secondary: second,
            } => {
                assert!(first.starts_with("pandoc failed"));
                assert!(second.starts_with("libreoffice failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!((primary.get(), secondary.get()), (1, 1));
    }
}
