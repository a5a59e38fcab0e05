//! Concurrent per-slide translation.
//!
//! Each slide is an independent task on a bounded worker pool. Tasks never
//! share mutable state, so no locking is needed between them. A task that
//! fails (error or panic) is recorded and its slide keeps its source
//! content; siblings carry on. The caller gets back an ordered report once
//! every task has settled.

use crate::error::{Error, Result};
use crate::translate::translate_slide;
use crate::translator::{TextTranslator, TranslationService};
use crate::types::Slide;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Default number of concurrent slide workers.
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// A slide held by a document backend, editable as a [`Slide`] tree.
pub trait SlideSource: Send {
    /// 1-based position of the slide in the presentation.
    fn number(&self) -> usize;

    /// Materialize the slide's text tree.
    fn read(&self) -> Result<Slide>;

    /// Write run texts back. Fails if `slide` does not match the source's
    /// shape, paragraph, and run structure.
    fn write(&mut self, slide: &Slide) -> Result<()>;
}

/// A slide whose task did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideFailure {
    /// 1-based slide number.
    pub number: usize,
    /// Description of what went wrong.
    pub message: String,
}

/// Summary of a translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReport {
    /// Number of slides in the document.
    pub slide_count: usize,
    /// Slides whose task completed.
    pub translated_slides: usize,
    /// Runs processed across all completed slides.
    pub runs: usize,
    /// Calls made to the translation service.
    pub service_calls: usize,
    /// Calls that failed and kept the original text.
    pub fallbacks: usize,
    /// Failed slides, in slide order.
    pub failures: Vec<SlideFailure>,
}

impl TranslationReport {
    /// Whether every slide was processed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Translate every slide on a pool of `max_workers` threads.
///
/// Blocks until all slide tasks have finished. Only an invalid worker count
/// or a pool that cannot start is an error; slide failures end up in the
/// returned report.
pub fn translate_slides<P, S>(
    slides: &mut [P],
    translator: &TextTranslator<S>,
    max_workers: usize,
) -> Result<TranslationReport>
where
    P: SlideSource,
    S: TranslationService,
{
    if max_workers == 0 {
        return Err(Error::InvalidWorkerCount(max_workers));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .thread_name(|i| format!("slide-worker-{}", i))
        .build()
        .map_err(|e| Error::WorkerPool(e.to_string()))?;

    log::debug!(
        "Translating {} slides to '{}' with {} workers",
        slides.len(),
        translator.target_language(),
        max_workers
    );

    let calls_before = translator.calls();
    let fallbacks_before = translator.fallbacks();

    let outcomes: Vec<(usize, Result<usize>)> = pool.install(|| {
        slides
            .par_iter_mut()
            .map(|slide| (slide.number(), run_slide_task(slide, translator)))
            .collect()
    });

    let mut report = TranslationReport {
        slide_count: outcomes.len(),
        ..Default::default()
    };

    for (number, outcome) in outcomes {
        match outcome {
            Ok(runs) => {
                report.translated_slides += 1;
                report.runs += runs;
            }
            Err(e) => {
                log::error!("Error processing slide {}: {}", number, e);
                report.failures.push(SlideFailure {
                    number,
                    message: e.to_string(),
                });
            }
        }
    }

    report.service_calls = translator.calls() - calls_before;
    report.fallbacks = translator.fallbacks() - fallbacks_before;

    Ok(report)
}

/// Run one slide task, turning a panic into an error for that slide.
fn run_slide_task<P, S>(slide: &mut P, translator: &TextTranslator<S>) -> Result<usize>
where
    P: SlideSource,
    S: TranslationService,
{
    let number = slide.number();
    match panic::catch_unwind(AssertUnwindSafe(|| translate_source(slide, translator))) {
        Ok(result) => result,
        Err(payload) => Err(Error::TaskPanicked(format!(
            "slide {}: {}",
            number,
            panic_message(payload.as_ref())
        ))),
    }
}

fn translate_source<P, S>(slide: &mut P, translator: &TextTranslator<S>) -> Result<usize>
where
    P: SlideSource,
    S: TranslationService,
{
    let mut tree = slide.read()?;
    let runs = translate_slide(&mut tree, translator);
    slide.write(&tree)?;
    log::debug!("Slide {}: {} runs translated", slide.number(), runs);
    Ok(runs)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
