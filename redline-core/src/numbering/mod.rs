//! Plain-text extraction from DOCX archives with list numbers restored.
//!
//! Auto-numbered paragraphs store no number in their text; Word computes
//! "1.", "2.1" or "(a)" at display time from `word/numbering.xml`. Text pulled
//! straight from `word/document.xml` loses those prefixes, and every
//! renumbering then shows up as unrelated edits. This module replays the
//! counters so the extracted text carries the numbers a reader would see.

pub mod counters;
pub mod definitions;
pub mod format;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{RedlineError, Result};
pub use counters::{ListCounters, MAX_LEVELS};
pub use definitions::{LevelDefinition, NumberingDefinitions};
pub use format::NumberFormat;

/// Main content part of a WordprocessingML package.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Optional numbering definitions part.
pub const NUMBERING_PART: &str = "word/numbering.xml";

/// Extract the text of a DOCX file, one paragraph per block, with numbering.
///
/// Paragraphs are separated by a blank line. A missing or unreadable
/// numbering part degrades to unnumbered text.
pub fn extract_with_numbering(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document = read_part(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
        RedlineError::MissingContentPart {
            part: DOCUMENT_PART.to_string(),
        }
    })?;

    let numbering = match read_part(&mut archive, NUMBERING_PART) {
        Ok(Some(xml)) => NumberingDefinitions::parse(&xml).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable numbering definitions: {}", e);
            NumberingDefinitions::default()
        }),
        Ok(None) => NumberingDefinitions::default(),
        Err(e) => {
            tracing::warn!("ignoring unreadable numbering part: {}", e);
            NumberingDefinitions::default()
        }
    };

    render_document(&document, &numbering)
}

/// Render the paragraphs of a `word/document.xml` body as plain text.
pub fn render_document(document_xml: &str, numbering: &NumberingDefinitions) -> Result<String> {
    let paragraphs = read_paragraphs(document_xml)?;
    let mut counters = ListCounters::new();

    let blocks: Vec<String> = paragraphs
        .into_iter()
        .map(|paragraph| {
            let prefix = paragraph
                .list
                .map(|(num_id, level)| list_prefix(numbering, &mut counters, num_id, level))
                .unwrap_or_default();
            join_prefix(&prefix, &paragraph.text)
        })
        .filter(|block| !block.trim().is_empty())
        .collect();

    tracing::debug!(
        paragraphs = blocks.len(),
        lists = counters.len(),
        "extracted document text"
    );
    Ok(blocks.join("\n\n"))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(String::from_utf8(bytes)?))
}

/// Advance the list counters and render the prefix for one paragraph.
fn list_prefix(
    numbering: &NumberingDefinitions,
    counters: &mut ListCounters,
    num_id: u32,
    level: usize,
) -> String {
    let Some(levels) = numbering.list(num_id) else {
        tracing::debug!(num_id, "paragraph references an undefined list");
        return String::new();
    };
    let values = counters.advance(num_id, level);

    let Some(definition) = levels[level].as_ref() else {
        return String::new();
    };
    match definition.format {
        NumberFormat::None => String::new(),
        NumberFormat::Bullet => definition.pattern.clone(),
        _ => format::render_pattern(&definition.pattern, |k| match levels[k].as_ref() {
            Some(def) => (def.value(values[k]), def.format),
            None => (values[k], NumberFormat::Decimal),
        }),
    }
}

fn join_prefix(prefix: &str, text: &str) -> String {
    if prefix.is_empty() {
        text.to_string()
    } else if text.is_empty() || prefix.ends_with(char::is_whitespace) {
        format!("{}{}", prefix, text)
    } else {
        format!("{} {}", prefix, text)
    }
}

/// One `w:p` with its collected text and list reference.
#[derive(Debug, Default, PartialEq, Eq)]
struct Paragraph {
    text: String,
    /// `(numId, ilvl)` when the paragraph is a list item
    list: Option<(u32, usize)>,
}

#[derive(Default)]
struct OpenParagraph {
    text: String,
    num_id: Option<u32>,
    level: Option<usize>,
    /// `w:ilvl` was present but out of range or unparsable
    bad_level: bool,
}

impl OpenParagraph {
    fn finish(self) -> Paragraph {
        // A bad level renders unnumbered and leaves the counters alone.
        let list = match self.num_id {
            Some(0) | None => None,
            Some(_) if self.bad_level => None,
            Some(num_id) => Some((num_id, self.level.unwrap_or(0))),
        };
        Paragraph {
            text: self.text.split_whitespace().collect::<Vec<_>>().join(" "),
            list,
        }
    }
}

/// Collect paragraphs in document order. Paragraphs nested in text boxes are
/// emitted when they close, ahead of the paragraph that contains them.
fn read_paragraphs(xml: &str) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut stack: Vec<OpenParagraph> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut in_text = 0usize;
    let mut in_num_pr = 0usize;
    // Superseded properties of tracked formatting changes
    let mut in_ppr_change = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"p" => stack.push(OpenParagraph::default()),
                b"t" => in_text += 1,
                b"numPr" => in_num_pr += 1,
                b"pPrChange" => in_ppr_change += 1,
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(OpenParagraph::default().finish()),
                b"numId" | b"ilvl" if in_num_pr > 0 && in_ppr_change == 0 => {
                    if let Some(paragraph) = stack.last_mut() {
                        read_num_pr_child(e, paragraph);
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = stack.pop() {
                        paragraphs.push(paragraph.finish());
                    }
                }
                b"t" => in_text = in_text.saturating_sub(1),
                b"numPr" => in_num_pr = in_num_pr.saturating_sub(1),
                b"pPrChange" => in_ppr_change = in_ppr_change.saturating_sub(1),
                _ => {}
            },
            Event::Text(ref e) if in_text > 0 => {
                if let Some(paragraph) = stack.last_mut() {
                    paragraph.text.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn read_num_pr_child(e: &BytesStart, paragraph: &mut OpenParagraph) {
    let Some(val) = attr_value(e, b"val") else {
        return;
    };
    match e.local_name().as_ref() {
        b"numId" => paragraph.num_id = val.parse().ok(),
        b"ilvl" => {
            paragraph.level = parse_level(&val);
            paragraph.bad_level = paragraph.level.is_none();
        }
        _ => {}
    }
}

/// Value of the attribute whose local name is `name`, ignoring its prefix.
pub(crate) fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// A level index in `0..MAX_LEVELS`.
pub(crate) fn parse_level(val: &str) -> Option<usize> {
    val.parse::<usize>().ok().filter(|level| *level < MAX_LEVELS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const NUMBERING: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
    <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1.%2"/></w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:lvl w:ilvl="0"><w:numFmt w:val="lowerRoman"/><w:lvlText w:val="(%1)"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

    fn para(num: Option<(u32, u32)>, text: &str) -> String {
        let num_pr = match num {
            Some((id, level)) => format!(
                r#"<w:pPr><w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr></w:pPr>"#,
                level, id
            ),
            None => String::new(),
        };
        format!(r#"<w:p>{}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, num_pr, text)
    }

    fn document(paragraphs: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            paragraphs.concat()
        )
    }

    fn docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_numbering_is_deterministic() {
        let xml = document(&[
            para(Some((1, 0)), "Definitions"),
            para(Some((1, 0)), "Payment"),
            para(Some((1, 1)), "Invoices are due monthly."),
            para(Some((1, 0)), "Term"),
        ]);
        let bytes = docx(&[(DOCUMENT_PART, &xml), (NUMBERING_PART, NUMBERING)]);

        let first = extract_with_numbering(&bytes).unwrap();
        assert_eq!(
            first,
            "1. Definitions\n\n2. Payment\n\n2.1 Invoices are due monthly.\n\n3. Term"
        );
        assert_eq!(extract_with_numbering(&bytes).unwrap(), first);
    }

    #[test]
    fn test_lists_count_independently() {
        let xml = document(&[
            para(Some((1, 0)), "One"),
            para(Some((2, 0)), "first"),
            para(Some((2, 0)), "second"),
            para(Some((1, 0)), "Two"),
        ]);
        let numbering = NumberingDefinitions::parse(NUMBERING).unwrap();
        let text = render_document(&xml, &numbering).unwrap();
        assert_eq!(text, "1. One\n\n(i) first\n\n(ii) second\n\n2. Two");
    }

    #[test]
    fn test_missing_numbering_part_degrades() {
        let xml = document(&[para(Some((1, 0)), "Definitions"), para(None, "Body text.")]);
        let bytes = docx(&[(DOCUMENT_PART, &xml)]);
        assert_eq!(
            extract_with_numbering(&bytes).unwrap(),
            "Definitions\n\nBody text."
        );
    }

    #[test]
    fn test_unknown_list_and_num_id_zero() {
        let xml = document(&[
            para(Some((7, 0)), "Unknown list"),
            para(Some((0, 0)), "Numbering removed"),
        ]);
        let numbering = NumberingDefinitions::parse(NUMBERING).unwrap();
        let text = render_document(&xml, &numbering).unwrap();
        assert_eq!(text, "Unknown list\n\nNumbering removed");
    }

    #[test]
    fn test_invalid_level_is_unnumbered_and_uncounted() {
        let xml = document(&[
            para(Some((1, 0)), "A"),
            para(Some((1, 9)), "B"),
            para(Some((1, 0)), "C"),
        ]);
        let numbering = NumberingDefinitions::parse(NUMBERING).unwrap();
        let text = render_document(&xml, &numbering).unwrap();
        assert_eq!(text, "1. A\n\nB\n\n2. C");
    }

    #[test]
    fn test_unparsable_level_is_unnumbered() {
        let xml = document(&[
            para(Some((1, 0)), "A"),
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="x"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>B</w:t></w:r></w:p>"#.to_string(),
            r#"<w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>C</w:t></w:r></w:p>"#.to_string(),
        ]);
        let numbering = NumberingDefinitions::parse(NUMBERING).unwrap();
        let text = render_document(&xml, &numbering).unwrap();
        // A missing ilvl still means level 0.
        assert_eq!(text, "1. A\n\nB\n\n2. C");
    }

    #[test]
    fn test_huge_start_stays_small() {
        let numbering_xml = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:start w:val="4000000000"/><w:numFmt w:val="upperRoman"/><w:lvlText w:val="%1."/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#;
        let xml = document(&[
            para(Some((1, 0)), "A"),
            para(Some((1, 0)), "B"),
            para(Some((1, 0)), "C"),
        ]);
        let bytes = docx(&[(DOCUMENT_PART, &xml), (NUMBERING_PART, numbering_xml)]);

        let text = extract_with_numbering(&bytes).unwrap();
        assert_eq!(text, "32767. A\n\n32768. B\n\n32769. C");
    }

    #[test]
    fn test_missing_document_part() {
        let bytes = docx(&[(NUMBERING_PART, NUMBERING)]);
        assert!(matches!(
            extract_with_numbering(&bytes),
            Err(RedlineError::MissingContentPart { .. })
        ));
    }

    #[test]
    fn test_not_an_archive() {
        assert!(matches!(
            extract_with_numbering(b"plain text, not a zip"),
            Err(RedlineError::Archive(_))
        ));
    }

    #[test]
    fn test_runs_joined_and_whitespace_collapsed() {
        let xml = document(&[
            r#"<w:p><w:r><w:t>The   Supplier</w:t></w:r><w:r><w:t xml:space="preserve"> shall &amp; will</w:t></w:r></w:p>"#.to_string(),
            "<w:p/>".to_string(),
            r#"<w:p><w:r><w:t>   </w:t></w:r></w:p>"#.to_string(),
        ]);
        let text = render_document(&xml, &NumberingDefinitions::default()).unwrap();
        assert_eq!(text, "The Supplier shall & will");
    }

    #[test]
    fn test_nested_text_box_paragraph() {
        let xml = document(&[
            r#"<w:p><w:r><w:t>Outer</w:t></w:r><w:r><w:txbxContent><w:p><w:r><w:t>Inner</w:t></w:r></w:p></w:txbxContent></w:r><w:r><w:t> tail</w:t></w:r></w:p>"#.to_string(),
        ]);
        let text = render_document(&xml, &NumberingDefinitions::default()).unwrap();
        assert_eq!(text, "Inner\n\nOuter tail");
    }

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("1.", "Term"), "1. Term");
        assert_eq!(join_prefix("1.\t", "Term"), "1.\tTerm");
        assert_eq!(join_prefix("1.", ""), "1.");
        assert_eq!(join_prefix("", "Term"), "Term");
    }
}
