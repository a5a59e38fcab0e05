//! Domain types for the editable text tree of a presentation slide.
//!
//! Only what translation needs is modelled: shapes, their optional text
//! frame, paragraphs, and runs. Formatting stays in the backend's source
//! document and is never represented here.

use serde::{Deserialize, Serialize};

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary).
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
            return Some(Self::Ppt);
        }

        None
    }
}

/// A single slide: its shapes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create an empty slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of runs across every shape on the slide.
    pub fn run_count(&self) -> usize {
        self.shapes.iter().map(Shape::run_count).sum()
    }

    /// Whether `other` has the same shapes, text frames, paragraphs, and
    /// run counts, ignoring run texts.
    pub fn same_structure(&self, other: &Slide) -> bool {
        self.shapes.len() == other.shapes.len()
            && self
                .shapes
                .iter()
                .zip(&other.shapes)
                .all(|(a, b)| match (&a.text_frame, &b.text_frame) {
                    (Some(fa), Some(fb)) => {
                        fa.paragraphs.len() == fb.paragraphs.len()
                            && fa
                                .paragraphs
                                .iter()
                                .zip(&fb.paragraphs)
                                .all(|(pa, pb)| pa.runs.len() == pb.runs.len())
                    }
                    (None, None) => true,
                    _ => false,
                })
    }

    /// Iterate over every run text in document order.
    pub fn run_texts(&self) -> impl Iterator<Item = &str> {
        self.shapes
            .iter()
            .filter_map(|s| s.text_frame.as_ref())
            .flat_map(|f| f.paragraphs.iter())
            .flat_map(|p| p.runs.iter())
            .map(|r| r.text.as_str())
    }
}

/// A shape on a slide. Not every shape can hold text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub text_frame: Option<TextFrame>,
}

impl Shape {
    /// A shape without a text frame (picture, connector, ...).
    pub fn without_text() -> Self {
        Self { text_frame: None }
    }

    /// A shape holding the given paragraphs.
    pub fn with_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            text_frame: Some(TextFrame { paragraphs }),
        }
    }

    /// Whether this shape has a text frame at all.
    pub fn has_text_frame(&self) -> bool {
        self.text_frame.is_some()
    }

    pub fn run_count(&self) -> usize {
        self.text_frame
            .as_ref()
            .map(|f| f.paragraphs.iter().map(|p| p.runs.len()).sum())
            .unwrap_or(0)
    }
}

/// The text body of a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

/// A paragraph. Run order determines how texts concatenate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Build a paragraph from run texts.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runs: texts.into_iter().map(Run::new).collect(),
        }
    }

    /// Run texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A span of uniformly formatted text; the unit of translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_magic() {
        assert_eq!(
            PresentationFormat::from_magic(b"PK\x03\x04rest"),
            Some(PresentationFormat::Pptx)
        );
        assert_eq!(
            PresentationFormat::from_magic(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Some(PresentationFormat::Ppt)
        );
        assert_eq!(PresentationFormat::from_magic(b"PK"), None);
        assert_eq!(PresentationFormat::from_magic(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            PresentationFormat::from_extension("PPTX"),
            Some(PresentationFormat::Pptx)
        );
        assert_eq!(
            PresentationFormat::from_extension("ppt"),
            Some(PresentationFormat::Ppt)
        );
        assert_eq!(PresentationFormat::from_extension("key"), None);
    }

    #[test]
    fn test_run_count_skips_shapes_without_text() {
        let slide = Slide {
            shapes: vec![
                Shape::with_paragraphs(vec![
                    Paragraph::from_texts(["a", "b"]),
                    Paragraph::from_texts(["c"]),
                ]),
                Shape::without_text(),
                Shape::with_paragraphs(vec![Paragraph::default()]),
            ],
        };

        assert_eq!(slide.run_count(), 3);
        assert_eq!(slide.run_texts().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_same_structure_ignores_text() {
        let slide = Slide {
            shapes: vec![
                Shape::with_paragraphs(vec![Paragraph::from_texts(["a", "b"])]),
                Shape::without_text(),
            ],
        };

        let mut retexted = slide.clone();
        retexted.shapes[0].text_frame.as_mut().unwrap().paragraphs[0].runs[1].text = "z".into();
        assert!(slide.same_structure(&retexted));

        let mut fewer_runs = slide.clone();
        fewer_runs.shapes[0].text_frame.as_mut().unwrap().paragraphs[0].runs.pop();
        assert!(!slide.same_structure(&fewer_runs));

        let mut gained_frame = slide.clone();
        gained_frame.shapes[1] = Shape::with_paragraphs(Vec::new());
        assert!(!slide.same_structure(&gained_frame));

        assert!(!slide.same_structure(&Slide::new()));
    }
}
