// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! DOCX packaging
//!
//! Writes a minimal WordprocessingML package: content types, package
//! relationships, the document body, and a styles part defining the three
//! heading styles the paragraph mapping uses.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{BaxterError, Result};
use crate::export::{DocParagraph, ParagraphKind};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style>
</w:styles>"#;

/// Pack paragraphs into DOCX bytes.
pub fn write_docx(paragraphs: &[DocParagraph]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/styles.xml", STYLES_XML.to_string()),
        ("word/document.xml", document_xml(paragraphs)),
    ];

    for (name, content) in parts {
        writer
            .start_file(name, options)
            .map_err(|e| BaxterError::Export(format!("Failed to add {name}: {e}")))?;
        writer.write_all(content.as_bytes())?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| BaxterError::Export(format!("Failed to finish package: {e}")))?;
    Ok(cursor.into_inner())
}

/// Render the document body part.
fn document_xml(paragraphs: &[DocParagraph]) -> String {
    let mut body = String::new();
    for paragraph in paragraphs {
        body.push_str(&paragraph_xml(paragraph));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    )
}

fn paragraph_xml(paragraph: &DocParagraph) -> String {
    let text = escape_xml(&paragraph.text);
    let run = format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#);

    match style_id(paragraph.kind) {
        Some(style) => format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{run}</w:p>"#
        ),
        None => format!(r#"<w:p>{run}</w:p>"#),
    }
}

fn style_id(kind: ParagraphKind) -> Option<&'static str> {
    match kind {
        ParagraphKind::Title => Some("Title"),
        ParagraphKind::Heading1 => Some("Heading1"),
        ParagraphKind::Heading2 => Some("Heading2"),
        ParagraphKind::Body => None,
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
