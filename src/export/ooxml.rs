//! Office Open XML packaging shared by the DOCX and PPTX exporters.
//!
//! A package is a ZIP archive of XML parts plus `[Content_Types].xml` and
//! relationship parts. Parts are buffered and written in insertion order
//! with a fixed timestamp so that identical input yields identical bytes.

use std::borrow::Cow;
use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::Result;
use crate::model::ContentTree;

pub(super) const XML_DECL: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(super) const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(super) mod rel {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
}

pub(super) mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const WORD_DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WORD_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    pub const WORD_NUMBERING: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
}

/// Escape text for XML content and attribute values.
pub(super) fn escape_xml(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

struct Part {
    name: String,
    data: Vec<u8>,
}

/// Buffered OOXML package.
pub(super) struct Package {
    parts: Vec<Part>,
    overrides: Vec<(String, &'static str)>,
    compression_level: u32,
}

impl Package {
    pub(super) fn new(compression_level: Option<u32>) -> Self {
        Self {
            parts: Vec::new(),
            overrides: Vec::new(),
            compression_level: compression_level.unwrap_or(6),
        }
    }

    /// Add a part. `content_type` registers an override in `[Content_Types].xml`;
    /// `.rels` and `.xml` parts are covered by defaults and may pass `None`.
    pub(super) fn add_part(
        &mut self,
        name: impl Into<String>,
        content_type: Option<&'static str>,
        data: impl Into<Vec<u8>>,
    ) {
        let name = name.into();
        if let Some(ct) = content_type {
            self.overrides.push((format!("/{name}"), ct));
        }
        self.parts.push(Part {
            name,
            data: data.into(),
        });
    }

    /// Add `docProps/core.xml` and `docProps/app.xml`.
    pub(super) fn add_properties(&mut self, tree: &ContentTree, app_extra: &str) {
        self.add_part(
            "docProps/core.xml",
            Some(content_type::CORE_PROPERTIES),
            core_properties(tree),
        );
        self.add_part(
            "docProps/app.xml",
            Some(content_type::EXTENDED_PROPERTIES),
            app_properties(app_extra),
        );
    }

    /// Number of parts added so far, excluding `[Content_Types].xml`.
    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.parts.len()
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECL);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(&format!(
            r#"<Default Extension="rels" ContentType="{}"/>"#,
            content_type::RELATIONSHIPS
        ));
        xml.push_str(&format!(
            r#"<Default Extension="xml" ContentType="{}"/>"#,
            content_type::XML
        ));
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                ct
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    /// Write the archive: content types first, then parts in insertion order.
    pub(super) fn write<W: Write + Seek>(self, writer: &mut W) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level as i64))
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(writer);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(self.content_types_xml().as_bytes())?;

        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// Relationship part builder.
#[derive(Debug, Default)]
pub(super) struct Relationships {
    entries: Vec<(String, &'static str, String)>,
}

impl Relationships {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add a relationship and return its id (`rId1`, `rId2`, ...).
    pub(super) fn add(&mut self, rel_type: &'static str, target: impl Into<String>) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push((id.clone(), rel_type, target.into()));
        id
    }

    pub(super) fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECL);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, rel_type, target) in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{id}" Type="{rel_type}" Target="{}"/>"#,
                escape_xml(target)
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Package-level relationships pointing at the main part and properties.
pub(super) fn root_relationships(main_part: &str) -> String {
    let mut rels = Relationships::new();
    rels.add(rel::OFFICE_DOCUMENT, main_part);
    rels.add(rel::CORE_PROPERTIES, "docProps/core.xml");
    rels.add(rel::EXTENDED_PROPERTIES, "docProps/app.xml");
    rels.to_xml()
}

fn core_properties(tree: &ContentTree) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(concat!(
        r#"<cp:coreProperties"#,
        r#" xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties""#,
        r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
        r#" xmlns:dcterms="http://purl.org/dc/terms/""#,
        r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    ));
    xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&tree.title)));
    if !tree.author.is_empty() {
        xml.push_str(&format!(
            "<dc:creator>{}</dc:creator>",
            escape_xml(&tree.author)
        ));
    }
    if !tree.language.is_empty() {
        xml.push_str(&format!(
            "<dc:language>{}</dc:language>",
            escape_xml(&tree.language)
        ));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_properties(extra: &str) -> String {
    format!(
        "{XML_DECL}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\
         <Application>{} {}</Application>{extra}</Properties>",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("전체메뉴 > 메뉴검색"), "전체메뉴 &gt; 메뉴검색");
    }

    #[test]
    fn test_relationship_ids_are_sequential() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(rel::STYLES, "styles.xml"), "rId1");
        assert_eq!(rels.add(rel::NUMBERING, "numbering.xml"), "rId2");
        let xml = rels.to_xml();
        assert!(xml.contains(r#"Id="rId2""#));
        assert!(xml.contains(r#"Target="numbering.xml""#));
    }

    #[test]
    fn test_content_types_list_overrides() {
        let mut package = Package::new(None);
        package.add_part("word/document.xml", Some(content_type::WORD_DOCUMENT), "<x/>");
        package.add_part("_rels/.rels", None, "<r/>");
        let xml = package.content_types_xml();
        assert!(xml.contains(r#"PartName="/word/document.xml""#));
        assert!(!xml.contains(r#"PartName="/_rels/.rels""#));
        assert_eq!(package.len(), 2);
    }

    #[test]
    fn test_package_round_trips_through_zip() {
        let mut package = Package::new(Some(1));
        package.add_part("a.xml", None, "<a/>");
        let mut out = Cursor::new(Vec::new());
        package.write(&mut out).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(out.into_inner())).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "[Content_Types].xml");
        let mut body = String::new();
        archive
            .by_name("a.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<a/>");
    }

    #[test]
    fn test_package_output_is_deterministic() {
        let build = || {
            let mut package = Package::new(None);
            package.add_part("a.xml", None, "<a/>");
            let mut out = Cursor::new(Vec::new());
            package.write(&mut out).unwrap();
            out.into_inner()
        };
        assert_eq!(build(), build());
    }
}
