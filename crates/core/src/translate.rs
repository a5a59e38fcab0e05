//! Shape- and slide-level translation of run texts.

use crate::normalize::normalize_paragraph;
use crate::translator::{TextTranslator, TranslationService};
use crate::types::{Paragraph, Shape, Slide};

/// Translate every run of a shape's text frame in place.
///
/// Shapes without a text frame are left alone. Paragraph and run counts
/// never change; only run texts are replaced. Returns the number of runs
/// processed.
pub fn translate_shape<S: TranslationService>(shape: &mut Shape, translator: &TextTranslator<S>) -> usize {
    let Some(frame) = shape.text_frame.as_mut() else {
        return 0;
    };

    frame
        .paragraphs
        .iter_mut()
        .map(|paragraph| translate_paragraph(paragraph, translator))
        .sum()
}

/// Translate every shape on a slide, in shape order.
pub fn translate_slide<S: TranslationService>(slide: &mut Slide, translator: &TextTranslator<S>) -> usize {
    slide
        .shapes
        .iter_mut()
        .map(|shape| translate_shape(shape, translator))
        .sum()
}

fn translate_paragraph<S: TranslationService>(
    paragraph: &mut Paragraph,
    translator: &TextTranslator<S>,
) -> usize {
    let originals: Vec<&str> = paragraph.texts();
    let translated: Vec<String> = originals.iter().map(|t| translator.translate(t)).collect();
    let normalized = normalize_paragraph(&originals, translated);

    for (run, text) in paragraph.runs.iter_mut().zip(normalized) {
        run.text = text;
    }

    paragraph.runs.len()
}
