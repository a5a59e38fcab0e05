//! The translation-service seam and the degrade-to-identity wrapper around it.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors a translation service can report for a single text.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The request could not be sent or no response arrived.
    #[error("Translation request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status.
    #[error("Translation service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error body or reason from the service
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("Failed to parse translation response: {0}")]
    ParseError(String),
}

/// A remote (or stub) service that translates one text at a time.
///
/// Implementations are shared by reference across worker threads, so they
/// must be safe for concurrent use.
pub trait TranslationService: Send + Sync + Debug {
    /// Translate `text` into `target_language`.
    fn translate(&self, text: &str, target_language: &str) -> Result<String, ServiceError>;
}

impl<T: TranslationService + ?Sized> TranslationService for &T {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, ServiceError> {
        (**self).translate(text, target_language)
    }
}

/// Translates run texts into a fixed target language.
///
/// Service failures never reach the caller: the failure is logged and the
/// original text is returned unchanged. There are no retries.
#[derive(Debug)]
pub struct TextTranslator<S> {
    service: S,
    target_language: String,
    calls: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl<S: TranslationService> TextTranslator<S> {
    /// Create a translator for one run of the pipeline.
    pub fn new(service: S, target_language: impl Into<String>) -> Self {
        Self {
            service,
            target_language: target_language.into(),
            calls: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate `text`, falling back to `text` itself on any service error.
    ///
    /// Blank text is returned as-is without contacting the service.
    pub fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.service.translate(text, &self.target_language) {
            Ok(translated) => translated,
            Err(e) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                log::warn!("Translation error (keeping original text {:?}): {}", text, e);
                text.to_string()
            }
        }
    }

    /// Number of service calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of calls that failed and fell back to the original text.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }
}
