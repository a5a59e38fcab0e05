//! Core domain types, run spacing repair, and the concurrent slide
//! translation pipeline for presentation translation.

pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod translate;
pub mod translator;
pub mod types;

pub use error::{Error, Result};
pub use normalize::{normalize_paragraph, normalize_run};
pub use pipeline::{translate_slides, SlideFailure, SlideSource, TranslationReport, DEFAULT_MAX_WORKERS};
pub use translate::{translate_shape, translate_slide};
pub use translator::{ServiceError, TextTranslator, TranslationService};
pub use types::{Paragraph, PresentationFormat, Run, Shape, Slide, TextFrame};
