//! PPTX package loading and saving.

use crate::parser::{local_name, parse_slide_xml};
use crate::writer::render_slide_xml;
use deck_core::{Error, PresentationFormat, Result, Slide, SlideSource};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// A loaded PPTX package with its slides held as editable XML parts.
///
/// The original package bytes are kept; saving copies every untouched entry
/// as-is and only re-encodes slide parts whose text changed.
#[derive(Debug)]
pub struct PptxDocument {
    package: Vec<u8>,
    slides: Vec<PptxSlide>,
}

impl PptxDocument {
    /// Open a PPTX file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;

        let format = PresentationFormat::from_magic(&bytes).or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(PresentationFormat::from_extension)
        });

        match format {
            Some(PresentationFormat::Pptx) => Self::from_bytes(bytes),
            Some(PresentationFormat::Ppt) => Err(Error::UnsupportedFormat(format!(
                "{} is a legacy PPT file; save it as .pptx first",
                path.display()
            ))),
            None => Err(Error::UnsupportedFormat(format!(
                "{} is not a PPTX package",
                path.display()
            ))),
        }
    }

    /// Load a PPTX package from memory.
    pub fn from_bytes(package: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_paths = get_slide_order(&mut archive)?;
        let mut slides = Vec::with_capacity(slide_paths.len());
        for (idx, path) in slide_paths.into_iter().enumerate() {
            let xml = read_file_from_archive(&mut archive, &path)?;
            slides.push(PptxSlide {
                number: idx + 1,
                path,
                xml,
                modified: false,
            });
        }

        log::debug!("Loaded PPTX package with {} slides", slides.len());

        drop(archive);
        Ok(Self { package, slides })
    }

    pub fn slides(&self) -> &[PptxSlide] {
        &self.slides
    }

    /// Slides as independent units of work for the pipeline.
    pub fn slides_mut(&mut self) -> &mut [PptxSlide] {
        &mut self.slides
    }

    /// Write the package, replacing modified slide parts.
    ///
    /// Entry order, compression, and timestamps follow the source package,
    /// so the same edits always produce the same bytes.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut archive = ZipArchive::new(Cursor::new(self.package.as_slice()))
            .map_err(|e| Error::ZipError(format!("Failed to reopen ZIP: {}", e)))?;

        let modified: HashMap<&str, &PptxSlide> = self
            .slides
            .iter()
            .filter(|s| s.modified)
            .map(|s| (s.path.as_str(), s))
            .collect();

        let mut zip = ZipWriter::new(writer);
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(zip_error)?;
            let edited = modified.get(entry.name()).copied();
            match edited {
                Some(slide) => {
                    let name = entry.name().to_string();
                    let mut options = FileOptions::default()
                        .compression_method(entry.compression())
                        .last_modified_time(entry.last_modified());
                    if let Some(mode) = entry.unix_mode() {
                        options = options.unix_permissions(mode);
                    }
                    drop(entry);

                    zip.start_file(name, options).map_err(zip_error)?;
                    zip.write_all(slide.xml.as_bytes())?;
                }
                None => zip.raw_copy_file(entry).map_err(zip_error)?,
            }
        }

        let mut writer = zip.finish().map_err(zip_error)?;
        writer.flush()?;
        Ok(())
    }

    /// Save the package to `path`.
    ///
    /// The package is written to a temporary file next to `path` and then
    /// renamed over it, so a failed save never leaves a truncated file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        self.write_to(BufWriter::new(temp.as_file_mut()))?;
        temp.persist(path).map_err(|e| Error::IoError(e.error))?;

        log::debug!("Saved PPTX package to {}", path.display());
        Ok(())
    }
}

/// One slide part of a PPTX package.
#[derive(Debug, Clone)]
pub struct PptxSlide {
    number: usize,
    path: String,
    xml: String,
    modified: bool,
}

impl PptxSlide {
    /// Part name inside the package, e.g. `ppt/slides/slide1.xml`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Whether the slide's text has been rewritten.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

impl SlideSource for PptxSlide {
    fn number(&self) -> usize {
        self.number
    }

    fn read(&self) -> Result<Slide> {
        parse_slide_xml(&self.xml)
    }

    fn write(&mut self, slide: &Slide) -> Result<()> {
        let source = parse_slide_xml(&self.xml)?;
        if !source.same_structure(slide) {
            return Err(Error::SlideStructure(format!(
                "{}: edited slide does not match source shapes, paragraphs, and runs",
                self.path
            )));
        }

        let texts: Vec<&str> = slide.run_texts().collect();
        self.xml = render_slide_xml(&self.xml, &texts)?;
        self.modified = true;
        Ok(())
    }
}

/// Get the ordered list of slide part paths.
///
/// Order comes from `p:sldIdLst` in the presentation part, resolved through
/// its relationships. Packages without that list fall back to the numbers
/// in relationship ids and targets.
fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
    let relationships = parse_slide_relationships(&rels_content)?;

    let listed = match read_file_from_archive(archive, PRESENTATION_PATH) {
        Ok(content) => parse_slide_id_list(&content)?,
        Err(e) => {
            log::warn!("No presentation part, ordering slides by name: {}", e);
            Vec::new()
        }
    };

    if !listed.is_empty() {
        let targets: HashMap<&str, &str> = relationships
            .iter()
            .map(|rel| (rel.id.as_str(), rel.path.as_str()))
            .collect();

        return listed
            .iter()
            .map(|id| {
                targets.get(id.as_str()).map(|p| p.to_string()).ok_or_else(|| {
                    Error::PptxParseError(format!("Slide relationship '{}' not found", id))
                })
            })
            .collect();
    }

    let mut slides: Vec<(String, Option<usize>)> = relationships
        .into_iter()
        .map(|rel| {
            let order_num = extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.path));
            (rel.path, order_num)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// A slide relationship from the presentation part.
#[derive(Debug)]
struct SlideRelationship {
    id: String,
    path: String,
}

/// Collect slide relationships (not layouts or masters) with package paths.
fn parse_slide_relationships(content: &str) -> Result<Vec<SlideRelationship>> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut slides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    slides.push(SlideRelationship { id, path });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of `p:sldId` entries, in presentation order.
fn parse_slide_id_list(content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // `id` is the numeric slide id; the relationship is the prefixed `r:id`.
                let rel = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref().ends_with(b":id"))
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                if let Some(rel) = rel {
                    ids.push(rel);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation part: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::ZipError(e.to_string())
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{build_pptx, slide_xml};

    fn entries(package: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_slides_follow_presentation_order() {
        let package = build_pptx(&[
            slide_xml(&[&[&["first"]]]),
            slide_xml(&[&[&["second"]]]),
            slide_xml(&[&[&["third"]]]),
        ]);

        let document = PptxDocument::from_bytes(package).unwrap();

        let paths: Vec<&str> = document.slides().iter().map(|s| s.path()).collect();
        assert_eq!(
            paths,
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide3.xml"]
        );
        let numbers: Vec<usize> = document.slides().iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_fallback_order_without_slide_id_list() {
        let rels = r#"<Relationships xmlns="r">
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="/ppt/slides/slide1.xml"/>
</Relationships>"#;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(PRESENTATION_RELS_PATH, FileOptions::default()).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        let package = zip.finish().unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(package.as_slice())).unwrap();
        let order = get_slide_order(&mut archive).unwrap();

        assert_eq!(order, vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml"]);
    }

    #[test]
    fn test_not_a_zip_is_rejected() {
        let err = PptxDocument::from_bytes(b"definitely not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_missing_slide_part_is_fatal() {
        let mut package = build_pptx(&[slide_xml(&[&[&["only"]]])]);
        // Corrupt the part name so the relationship target no longer resolves.
        let needle = b"ppt/slides/slide1.xml";
        while let Some(pos) = package.windows(needle.len()).position(|w| w == needle) {
            package[pos + 4] = b'S';
        }

        assert!(PptxDocument::from_bytes(package).is_err());
    }

    #[test]
    fn test_unmodified_document_copies_every_entry() {
        let package = build_pptx(&[slide_xml(&[&[&["same"]]])]);
        let document = PptxDocument::from_bytes(package.clone()).unwrap();

        let mut out = Cursor::new(Vec::new());
        document.write_to(&mut out).unwrap();

        assert_eq!(entries(&out.into_inner()), entries(&package));
    }

    #[test]
    fn test_write_replaces_only_edited_slide() {
        let package = build_pptx(&[slide_xml(&[&[&["keep"]]]), slide_xml(&[&[&["change"]]])]);
        let mut document = PptxDocument::from_bytes(package.clone()).unwrap();

        let slide = &mut document.slides_mut()[1];
        let mut tree = slide.read().unwrap();
        tree.shapes[0].text_frame.as_mut().unwrap().paragraphs[0].runs[0].text = "changed".to_string();
        slide.write(&tree).unwrap();

        let mut out = Cursor::new(Vec::new());
        document.write_to(&mut out).unwrap();

        let before = entries(&package);
        let after = entries(&out.into_inner());
        assert_eq!(before.len(), after.len());
        for ((name_a, data_a), (name_b, data_b)) in before.iter().zip(after.iter()) {
            assert_eq!(name_a, name_b);
            if name_a == "ppt/slides/slide2.xml" {
                let text = String::from_utf8(data_b.clone()).unwrap();
                assert!(text.contains("<a:t>changed</a:t>"));
            } else {
                assert_eq!(data_a, data_b, "entry {} changed", name_a);
            }
        }
    }

    #[test]
    fn test_write_rejects_structure_change() {
        let package = build_pptx(&[slide_xml(&[&[&["a", "b"]]])]);
        let mut document = PptxDocument::from_bytes(package).unwrap();

        let slide = &mut document.slides_mut()[0];
        let mut tree = slide.read().unwrap();
        tree.shapes[0].text_frame.as_mut().unwrap().paragraphs[0].runs.pop();

        assert!(matches!(slide.write(&tree), Err(Error::SlideStructure(_))));
        assert!(!slide.is_modified());
        assert!(slide.xml().contains("<a:t>b</a:t>"));
    }

    #[test]
    fn test_open_rejects_legacy_ppt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.ppt");
        std::fs::write(&path, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0]).unwrap();

        let err = PptxDocument::open(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PptxDocument::open(&dir.path().join("missing.pptx")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        let document = PptxDocument::from_bytes(build_pptx(&[slide_xml(&[&[&["saved"]]])])).unwrap();

        document.save(&path).unwrap();
        let reopened = PptxDocument::open(&path).unwrap();

        assert_eq!(reopened.slides().len(), 1);
        assert_eq!(
            reopened.slides()[0].read().unwrap().run_texts().collect::<Vec<_>>(),
            vec!["saved"]
        );
    }
}
