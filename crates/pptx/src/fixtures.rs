//! In-memory PPTX packages for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// A text box whose paragraph mixes a DrawingML run with an Office Math
/// equation. The equation's `m:r`/`m:t` look like runs by local name only.
pub(crate) const EQUATION_SLIDE: &str = r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a14="http://schemas.microsoft.com/office/drawing/2010/main" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>Area</a:t></a:r><a14:m><m:oMathPara><m:oMath><m:r><a:rPr lang="en-US" i="1"/><m:t>x</m:t></m:r><m:r><m:t>=</m:t></m:r><m:r><m:t>πr²</m:t></m:r></m:oMath></m:oMathPara></a14:m></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

/// Build slide XML with one text box per shape. Run texts are inserted
/// verbatim, so callers escape markup themselves.
pub(crate) fn slide_xml(shapes: &[&[&[&str]]]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    xml.push_str(&format!("<p:sld {}><p:cSld><p:spTree>", NS));
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#);
    for (i, paragraphs) in shapes.iter().enumerate() {
        xml.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>"#,
            i + 2,
            i + 1
        ));
        for runs in paragraphs.iter() {
            xml.push_str("<a:p>");
            for text in runs.iter() {
                xml.push_str(&format!(
                    r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#,
                    text
                ));
            }
            xml.push_str("</a:p>");
        }
        xml.push_str("</p:txBody></p:sp>");
    }
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

/// Build a PPTX package from slide XML documents.
///
/// Relationship ids run in reverse slide order so that only
/// `sldIdLst` gives the right order.
pub(crate) fn build_pptx(slides: &[String]) -> Vec<u8> {
    let count = slides.len();
    let rel_id = |number: usize| format!("rId{}", count - number + 2);

    let mut presentation = format!("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst><p:sldIdLst>", NS);
    for number in 1..=count {
        presentation.push_str(&format!(
            r#"<p:sldId id="{}" r:id="{}"/>"#,
            255 + number,
            rel_id(number)
        ));
    }
    presentation.push_str(r#"</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#);

    let mut rels = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">");
    rels.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#);
    for number in 1..=count {
        rels.push_str(&format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            rel_id(number),
            number
        ));
    }
    rels.push_str("</Relationships>");

    let mut parts: Vec<(String, Vec<u8>, CompressionMethod)> = vec![
        (
            "[Content_Types].xml".to_string(),
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_vec(),
            CompressionMethod::Deflated,
        ),
        ("ppt/presentation.xml".to_string(), presentation.into_bytes(), CompressionMethod::Deflated),
        ("ppt/_rels/presentation.xml.rels".to_string(), rels.into_bytes(), CompressionMethod::Deflated),
    ];
    for (i, slide) in slides.iter().enumerate() {
        parts.push((
            format!("ppt/slides/slide{}.xml", i + 1),
            slide.clone().into_bytes(),
            CompressionMethod::Deflated,
        ));
    }
    parts.push((
        "ppt/media/image1.png".to_string(),
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4],
        CompressionMethod::Stored,
    ));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data, method) in parts {
        zip.start_file(name, FileOptions::default().compression_method(method))
            .unwrap();
        zip.write_all(&data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
