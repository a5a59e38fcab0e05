//! PPTX (Office Open XML) backend for presentation translation.
//!
//! A .pptx file is a ZIP archive of XML parts. Slides are loaded as XML,
//! exposed to the core pipeline as editable text trees, and written back
//! into a copy of the original package.

pub mod document;
pub mod parser;
pub mod writer;

#[cfg(test)]
mod fixtures;

pub use document::{PptxDocument, PptxSlide};
pub use parser::parse_slide_xml;
pub use writer::render_slide_xml;

use deck_core::{translate_slides, Error, Result, TextTranslator, TranslationReport, TranslationService};
use std::path::Path;

/// Translate the presentation at `input` and save the result to `output`.
///
/// Loading and saving failures are fatal. Failures of individual slides are
/// not: those slides keep their original text and are listed in the report.
pub fn translate_file<S: TranslationService>(
    input: &Path,
    output: &Path,
    translator: &TextTranslator<S>,
    max_workers: usize,
) -> Result<TranslationReport> {
    if max_workers == 0 {
        return Err(Error::InvalidWorkerCount(max_workers));
    }

    let mut document = PptxDocument::open(input)?;
    log::info!(
        "Loaded {} ({} slides)",
        input.display(),
        document.slides().len()
    );

    let report = translate_slides(document.slides_mut(), translator, max_workers)?;

    document.save(output)?;
    log::info!("Saved {}", output.display());

    Ok(report)
}
