// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{Cursor, Read};

use baxter::export::{export_docx, export_filename, paragraphs, ParagraphKind};

fn document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_export_round_trip_heading_levels() {
    // The documented round trip: title, first-level heading, plain body
    let parsed = paragraphs("# Title\n## Section\nBody text");

    assert_eq!(parsed.len(), 3);
    assert_eq!(
        (parsed[0].kind, parsed[0].text.as_str()),
        (ParagraphKind::Title, "Title")
    );
    assert_eq!(
        (parsed[1].kind, parsed[1].text.as_str()),
        (ParagraphKind::Heading1, "Section")
    );
    assert_eq!(
        (parsed[2].kind, parsed[2].text.as_str()),
        (ParagraphKind::Body, "Body text")
    );

    let document = document_xml(&export_docx("# Title\n## Section\nBody text").unwrap());
    let title_at = document.find(r#"<w:pStyle w:val="Title"/>"#).unwrap();
    let section_at = document.find(r#"<w:pStyle w:val="Heading1"/>"#).unwrap();
    let body_at = document.find(">Body text</w:t>").unwrap();
    assert!(title_at < section_at && section_at < body_at);
}

#[test]
fn test_export_docx_is_valid_zip_package() {
    let bytes = export_docx("# Doc\nline").unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert!(archive.by_name("[Content_Types].xml").is_ok());
    assert!(archive.by_name("word/document.xml").is_ok());
    assert!(archive.by_name("word/styles.xml").is_ok());
}

#[test]
fn test_export_one_paragraph_per_line() {
    let document = document_xml(&export_docx("one\ntwo\n\nfour").unwrap());
    assert_eq!(document.matches("<w:p>").count(), 4);
}

#[test]
fn test_export_markdown_tables_stay_plain_paragraphs() {
    // PRD success-metric tables are plain lines at the paragraph level
    let content = "| Type | Metric |\n|------|--------|";
    let parsed = paragraphs(content);
    assert!(parsed.iter().all(|p| p.kind == ParagraphKind::Body));
}

#[test]
fn test_export_filename_derivation() {
    assert_eq!(export_filename("AI_BA_PRD"), "AI_BA_PRD.docx");
    assert_eq!(export_filename(""), "PRD.docx");
}

#[test]
fn test_export_special_characters_escaped() {
    let document = document_xml(&export_docx("Risk: latency < 100ms & uptime > 99%").unwrap());
    assert!(document.contains("latency &lt; 100ms &amp; uptime &gt; 99%"));
}
