//! Rewriting run texts inside slide XML.
//!
//! The source XML is streamed through event by event. Only the content of
//! `a:t` elements that belong to runs is replaced; declarations, attributes,
//! formatting, fields, and whitespace are written back as read.

use crate::parser::{next_event, Element, TextCursor};
use deck_core::{Error, Result};
use quick_xml::events::{BytesText, Event};
use quick_xml::{NsReader, Writer};

/// Replace run texts in `xml`, in document order, with `texts`.
///
/// `texts` must hold exactly one entry per run as found by
/// [`parse_slide_xml`](crate::parser::parse_slide_xml).
pub fn render_slide_xml(xml: &str, texts: &[&str]) -> Result<String> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + xml.len() / 4));

    let mut cursor = TextCursor::default();
    let mut runs_seen = 0usize;
    let mut pending: Option<&str> = None;

    loop {
        let (element, event) = next_event(&mut reader)?;

        match &event {
            Event::Start(_) => {
                let element = cursor.enter(element);
                if element == Some(Element::Run) {
                    pending = Some(*texts.get(runs_seen).ok_or_else(|| too_few(texts.len()))?);
                    runs_seen += 1;
                }
                write(&mut writer, &event)?;
                if element == Some(Element::Text) {
                    if let Some(text) = pending.take().filter(|t| !t.is_empty()) {
                        write(&mut writer, &Event::Text(BytesText::new(text)))?;
                    }
                }
            }
            Event::Empty(e) => {
                let replacement = match cursor.empty(element) {
                    Some(Element::Text) => pending.take().filter(|t| !t.is_empty()),
                    _ => None,
                };
                match replacement {
                    // `<a:t/>` has to be expanded to hold the new text.
                    Some(text) => {
                        write(&mut writer, &Event::Start(e.clone()))?;
                        write(&mut writer, &Event::Text(BytesText::new(text)))?;
                        write(&mut writer, &Event::End(e.to_end()))?;
                    }
                    None => write(&mut writer, &event)?,
                }
            }
            Event::Text(_) | Event::CData(_) if cursor.in_text() => {}
            Event::End(_) => {
                cursor.leave(element);
                write(&mut writer, &event)?;
            }
            Event::Eof => break,
            _ => write(&mut writer, &event)?,
        }
    }

    if runs_seen != texts.len() {
        return Err(Error::SlideStructure(format!(
            "slide has {} runs but {} texts were supplied",
            runs_seen,
            texts.len()
        )));
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::XmlError(format!("Rewritten slide is not UTF-8: {}", e)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: &Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write slide XML: {}", e)))
}

fn too_few(supplied: usize) -> Error {
    Error::SlideStructure(format!("slide has more runs than the {} texts supplied", supplied))
}
