//! Slide XML parsing into the editable text tree.

use deck_core::{Error, Paragraph, Result, Run, Shape, Slide, TextFrame};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

const PRESENTATIONML_NS: &[u8] = b"http://schemas.openxmlformats.org/presentationml/2006/main";
const DRAWINGML_NS: &[u8] = b"http://schemas.openxmlformats.org/drawingml/2006/main";
const STRICT_PRESENTATIONML_NS: &[u8] = b"http://purl.oclc.org/ooxml/presentationml/main";
const STRICT_DRAWINGML_NS: &[u8] = b"http://purl.oclc.org/ooxml/drawingml/main";

/// Text-bearing elements of a slide, as tracked by [`TextCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Element {
    /// `p:sp`
    Shape,
    /// `p:txBody`
    Body,
    /// `a:p`
    Paragraph,
    /// `a:r`
    Run,
    /// `a:t` inside a run
    Text,
}

/// Map a resolved element name to the slide element it names, if any.
///
/// Only PresentationML shapes and text bodies and DrawingML paragraphs,
/// runs, and texts qualify. Same-named elements in other namespaces, such
/// as Office Math `m:r`/`m:t`, are not text runs.
fn element_of(ns: &ResolveResult<'_>, local: &[u8]) -> Option<Element> {
    let ResolveResult::Bound(Namespace(ns)) = ns else {
        return None;
    };

    match (*ns, local) {
        (PRESENTATIONML_NS | STRICT_PRESENTATIONML_NS, b"sp") => Some(Element::Shape),
        (PRESENTATIONML_NS | STRICT_PRESENTATIONML_NS, b"txBody") => Some(Element::Body),
        (DRAWINGML_NS | STRICT_DRAWINGML_NS, b"p") => Some(Element::Paragraph),
        (DRAWINGML_NS | STRICT_DRAWINGML_NS, b"r") => Some(Element::Run),
        (DRAWINGML_NS | STRICT_DRAWINGML_NS, b"t") => Some(Element::Text),
        _ => None,
    }
}

/// Read the next event, along with the slide element its tag names.
pub(crate) fn next_event<'i>(reader: &mut NsReader<&'i [u8]>) -> Result<(Option<Element>, Event<'i>)> {
    match reader.read_resolved_event() {
        Ok((ns, event)) => {
            let element = match &event {
                Event::Start(e) | Event::Empty(e) => element_of(&ns, e.local_name().as_ref()),
                Event::End(e) => element_of(&ns, e.local_name().as_ref()),
                _ => None,
            };
            Ok((element, event))
        }
        Err(e) => Err(Error::XmlError(format!(
            "Error at position {}: {}",
            reader.buffer_position(),
            e
        ))),
    }
}

/// Tracks where the reader is in the shape → body → paragraph → run → text
/// nesting. Parsing and rewriting share it, so both agree on what counts
/// as a run.
#[derive(Debug, Default)]
pub(crate) struct TextCursor {
    shape: bool,
    body: bool,
    paragraph: bool,
    run: bool,
    text: bool,
}

impl TextCursor {
    /// Whether `element` can open at the current position.
    fn accepts(&self, element: Element) -> bool {
        match element {
            Element::Shape => !self.shape,
            Element::Body => self.shape && !self.body,
            Element::Paragraph => self.body && !self.paragraph,
            Element::Run => self.paragraph && !self.run,
            Element::Text => self.run && !self.text,
        }
    }

    /// Handle a start tag.
    pub(crate) fn enter(&mut self, element: Option<Element>) -> Option<Element> {
        let element = element.filter(|&e| self.accepts(e))?;
        match element {
            Element::Shape => self.shape = true,
            Element::Body => self.body = true,
            Element::Paragraph => self.paragraph = true,
            Element::Run => self.run = true,
            Element::Text => self.text = true,
        }
        Some(element)
    }

    /// Handle a self-closing tag. Empty runs carry no text and are ignored.
    pub(crate) fn empty(&self, element: Option<Element>) -> Option<Element> {
        match element.filter(|&e| self.accepts(e))? {
            Element::Run => None,
            element => Some(element),
        }
    }

    /// Handle an end tag.
    pub(crate) fn leave(&mut self, element: Option<Element>) -> Option<Element> {
        let (flag, element) = match element? {
            Element::Text if self.text => (&mut self.text, Element::Text),
            Element::Run if self.run && !self.text => (&mut self.run, Element::Run),
            Element::Paragraph if self.paragraph && !self.run => (&mut self.paragraph, Element::Paragraph),
            Element::Body if self.body && !self.paragraph => (&mut self.body, Element::Body),
            Element::Shape if self.shape && !self.body => (&mut self.shape, Element::Shape),
            _ => return None,
        };
        *flag = false;
        Some(element)
    }

    /// Whether the reader is inside a run's `a:t`.
    pub(crate) fn in_text(&self) -> bool {
        self.text
    }
}

/// Parse a slide part into its shapes, paragraphs, and runs.
///
/// Shapes inside group shapes are included in document order. Fields and
/// line breaks are not runs.
pub fn parse_slide_xml(xml: &str) -> Result<Slide> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(false);

    let mut cursor = TextCursor::default();
    let mut slide = Slide::new();

    loop {
        let (element, event) = next_event(&mut reader)?;
        match event {
            Event::Start(_) => {
                match cursor.enter(element) {
                    Some(Element::Shape) => slide.shapes.push(Shape::without_text()),
                    Some(Element::Body) => {
                        if let Some(shape) = slide.shapes.last_mut() {
                            shape.text_frame = Some(TextFrame::default());
                        }
                    }
                    Some(Element::Paragraph) => {
                        if let Some(frame) = last_frame(&mut slide) {
                            frame.paragraphs.push(Paragraph::default());
                        }
                    }
                    Some(Element::Run) => {
                        if let Some(paragraph) = last_paragraph(&mut slide) {
                            paragraph.runs.push(Run::default());
                        }
                    }
                    Some(Element::Text) | None => {}
                }
            }
            Event::Empty(_) => {
                match cursor.empty(element) {
                    Some(Element::Shape) => slide.shapes.push(Shape::without_text()),
                    Some(Element::Body) => {
                        if let Some(shape) = slide.shapes.last_mut() {
                            shape.text_frame = Some(TextFrame::default());
                        }
                    }
                    Some(Element::Paragraph) => {
                        if let Some(frame) = last_frame(&mut slide) {
                            frame.paragraphs.push(Paragraph::default());
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) if cursor.in_text() => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad run text: {}", e)))?;
                if let Some(run) = last_run(&mut slide) {
                    run.text.push_str(&text);
                }
            }
            Event::CData(ref e) if cursor.in_text() => {
                if let Some(run) = last_run(&mut slide) {
                    run.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                cursor.leave(element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(slide)
}

fn last_frame(slide: &mut Slide) -> Option<&mut TextFrame> {
    slide.shapes.last_mut()?.text_frame.as_mut()
}

fn last_paragraph(slide: &mut Slide) -> Option<&mut Paragraph> {
    last_frame(slide)?.paragraphs.last_mut()
}

fn last_run(slide: &mut Slide) -> Option<&mut Run> {
    last_paragraph(slide)?.runs.last_mut()
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
