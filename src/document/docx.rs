//! WordprocessingML (`.docx`) writer.
//!
//! A `.docx` file is a zip package of XML parts. The flipbook only needs a
//! handful of them:
//!
//! ```text
//! [Content_Types].xml            part → MIME type map
//! _rels/.rels                    package → word/document.xml
//! word/document.xml              one paragraph, one run, N inline drawings
//! word/_rels/document.xml.rels   rIdN → media/cardN.png
//! word/media/cardN.png           the encoded cards
//! ```
//!
//! Every card is an inline picture in the same run, so the word processor
//! flows them side by side and wraps at the sheet margins.

use super::{DocumentSink, FlipbookDocument, PageElement};
use crate::error::FlipbookError;
use crate::output::write_atomic;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per centimetre (drawing extents).
const EMU_PER_CM: f64 = 360_000.0;

/// Twentieths of a point per centimetre (page size and margins).
const TWIPS_PER_CM: f64 = 1440.0 / 2.54;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

fn emu(cm: f64) -> i64 {
    (cm * EMU_PER_CM).round() as i64
}

fn twips(cm: f64) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

fn media_name(element: &PageElement) -> String {
    format!("card{}.png", element.number)
}

fn relationship_id(element: &PageElement) -> String {
    format!("rIdCard{}", element.number)
}

/// Inline `<w:drawing>` for one card.
fn drawing_xml(element: &PageElement) -> String {
    let cx = emu(element.display_width_cm());
    let cy = emu(element.display_height_cm);
    let n = element.number;
    let rid = relationship_id(element);
    format!(
        r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{n}" name="Card {n}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="{n}" name="card{n}.png"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#
    )
}

/// `word/document.xml`: a single paragraph whose single run holds every card.
pub fn document_xml(doc: &FlipbookDocument) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body><w:p><w:r>"#,
    );
    for element in doc.elements() {
        xml.push_str(&drawing_xml(element));
    }
    xml.push_str("</w:r></w:p>");

    let (w, h) = doc.paper.dimensions_cm();
    let m = twips(doc.sheet_margin_cm);
    xml.push_str(&format!(
        r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
        twips(w),
        twips(h)
    ));
    xml.push_str("</w:body></w:document>");
    xml
}

/// `word/_rels/document.xml.rels`: one image relationship per card.
pub fn document_rels_xml(doc: &FlipbookDocument) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for element in doc.elements() {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{IMAGE_REL_TYPE}" Target="media/{}"/>"#,
            relationship_id(element),
            media_name(element)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Package the document as `.docx` bytes.
pub fn to_bytes(doc: &FlipbookDocument) -> Result<Vec<u8>, zip::result::ZipError> {
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // PNG data is already compressed.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file("[Content_Types].xml", deflated)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", deflated)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;

    zip.start_file("word/document.xml", deflated)?;
    zip.write_all(document_xml(doc).as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", deflated)?;
    zip.write_all(document_rels_xml(doc).as_bytes())?;

    for element in doc.elements() {
        zip.start_file(format!("word/media/{}", media_name(element)), stored)?;
        zip.write_all(&element.png)?;
    }

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    debug!(
        "Packaged {} cards into {} bytes of docx",
        doc.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Saves documents as `.docx` files, atomically.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxSink;

impl DocumentSink for DocxSink {
    fn save(&self, document: &FlipbookDocument, path: &Path) -> Result<u64, FlipbookError> {
        let bytes = to_bytes(document).map_err(|e| FlipbookError::DocumentWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let written = write_atomic(path, &bytes)?;
        info!("Flipbook saved to '{}'", path.display());
        Ok(written)
    }
}
