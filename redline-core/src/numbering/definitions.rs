//! Parsing of `word/numbering.xml`.
//!
//! Abstract lists (`w:abstractNum`) hold the level rules; concrete lists
//! (`w:num`) point at one abstract list and may override level starts.
//! Paragraphs reference concrete lists, so the result is keyed by `w:numId`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use super::counters::MAX_LEVELS;
use super::format::NumberFormat;
use super::{attr_value, parse_level};
use crate::error::Result;

/// Largest start value WordprocessingML allows.
pub const MAX_START: u32 = 32767;

/// Parse a `w:start` / `w:startOverride` value, clamped to `0..=MAX_START`.
fn parse_start(val: &str) -> Option<u32> {
    val.trim()
        .parse::<u64>()
        .ok()
        .map(|start| start.min(u64::from(MAX_START)) as u32)
}

/// Rendering rule for one list level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    pub format: NumberFormat,
    /// `w:lvlText`, e.g. `%1.` or `%1.%2`
    pub pattern: String,
    /// `w:start`, 1 unless stated
    pub start: u32,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self {
            format: NumberFormat::Decimal,
            pattern: String::new(),
            start: 1,
        }
    }
}

impl LevelDefinition {
    /// Displayed value after `counter` paragraphs at this level.
    pub fn value(&self, counter: u32) -> u32 {
        self.start.saturating_add(counter).saturating_sub(1)
    }
}

/// Level table of one concrete list.
pub type ListLevels = [Option<LevelDefinition>; MAX_LEVELS];

/// Level tables for every concrete list in a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberingDefinitions {
    lists: HashMap<u32, ListLevels>,
}

#[derive(Default)]
struct ConcreteList {
    abstract_id: Option<String>,
    start_overrides: Vec<(usize, u32)>,
}

#[derive(Default)]
struct Parser {
    abstracts: HashMap<String, ListLevels>,
    concrete: Vec<(u32, ConcreteList)>,
    current_abstract: Option<(String, ListLevels)>,
    current_level: Option<(usize, LevelDefinition)>,
    current_num: Option<(u32, ConcreteList)>,
    override_level: Option<usize>,
}

impl Parser {
    fn open(&mut self, e: &BytesStart) {
        match e.local_name().as_ref() {
            b"abstractNum" => {
                if let Some(id) = attr_value(e, b"abstractNumId") {
                    self.current_abstract = Some((id, Default::default()));
                }
            }
            b"lvl" if self.current_abstract.is_some() => {
                if let Some(level) = attr_value(e, b"ilvl").and_then(|v| parse_level(&v)) {
                    self.current_level = Some((level, LevelDefinition::default()));
                }
            }
            b"numFmt" => {
                if let (Some((_, level)), Some(val)) = (&mut self.current_level, attr_value(e, b"val")) {
                    level.format = NumberFormat::from_ooxml(&val);
                }
            }
            b"lvlText" => {
                if let (Some((_, level)), Some(val)) = (&mut self.current_level, attr_value(e, b"val")) {
                    level.pattern = val;
                }
            }
            b"start" => {
                let start = attr_value(e, b"val").and_then(|v| parse_start(&v));
                if let (Some((_, level)), Some(start)) = (&mut self.current_level, start) {
                    level.start = start;
                }
            }
            b"num" => {
                if let Some(id) = attr_value(e, b"numId").and_then(|v| v.parse().ok()) {
                    self.current_num = Some((id, ConcreteList::default()));
                }
            }
            b"abstractNumId" => {
                if let (Some((_, list)), Some(val)) = (&mut self.current_num, attr_value(e, b"val")) {
                    list.abstract_id = Some(val);
                }
            }
            b"lvlOverride" if self.current_num.is_some() => {
                self.override_level = attr_value(e, b"ilvl").and_then(|v| parse_level(&v));
            }
            b"startOverride" => {
                let start = attr_value(e, b"val").and_then(|v| parse_start(&v));
                if let (Some((_, list)), Some(level), Some(start)) =
                    (&mut self.current_num, self.override_level, start)
                {
                    list.start_overrides.push((level, start));
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, local_name: &[u8]) {
        match local_name {
            b"lvl" => {
                if let (Some((_, levels)), Some((index, level))) =
                    (&mut self.current_abstract, self.current_level.take())
                {
                    levels[index] = Some(level);
                }
            }
            b"abstractNum" => {
                if let Some((id, levels)) = self.current_abstract.take() {
                    self.abstracts.insert(id, levels);
                }
            }
            b"lvlOverride" => self.override_level = None,
            b"num" => {
                if let Some(entry) = self.current_num.take() {
                    self.concrete.push(entry);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> NumberingDefinitions {
        let mut lists = HashMap::new();
        for (num_id, list) in self.concrete {
            let Some(mut levels) = list
                .abstract_id
                .as_ref()
                .and_then(|id| self.abstracts.get(id))
                .cloned()
            else {
                tracing::debug!(num_id, "list references an undefined abstract list");
                continue;
            };
            for (index, start) in list.start_overrides {
                if let Some(level) = levels[index].as_mut() {
                    level.start = start;
                }
            }
            lists.insert(num_id, levels);
        }
        NumberingDefinitions { lists }
    }
}

impl NumberingDefinitions {
    /// Parse the contents of `word/numbering.xml`.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        let mut parser = Parser::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => parser.open(e),
                Event::Empty(ref e) => {
                    parser.open(e);
                    parser.close(e.local_name().as_ref());
                }
                Event::End(ref e) => parser.close(e.local_name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let definitions = parser.finish();
        tracing::debug!(lists = definitions.lists.len(), "parsed numbering definitions");
        Ok(definitions)
    }

    /// Level table of concrete list `num_id`, if defined.
    pub fn list(&self, num_id: u32) -> Option<&ListLevels> {
        self.lists.get(&num_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
    <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="(%2)"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="2">
    <w:abstractNumId w:val="0"/>
    <w:lvlOverride w:ilvl="0"><w:startOverride w:val="5"/></w:lvlOverride>
  </w:num>
  <w:num w:numId="3"><w:abstractNumId w:val="42"/></w:num>
</w:numbering>"#;

    #[test]
    fn test_parse_levels() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        let list = defs.list(1).unwrap();
        let top = list[0].as_ref().unwrap();
        assert_eq!(top.format, NumberFormat::Decimal);
        assert_eq!(top.pattern, "%1.");
        assert_eq!(top.start, 1);
        let second = list[1].as_ref().unwrap();
        assert_eq!(second.format, NumberFormat::LowerLetter);
        assert_eq!(second.pattern, "(%2)");
        assert!(list[2].is_none());
    }

    #[test]
    fn test_start_override() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        assert_eq!(defs.list(2).unwrap()[0].as_ref().unwrap().start, 5);
        assert_eq!(defs.list(1).unwrap()[0].as_ref().unwrap().start, 1);
    }

    #[test]
    fn test_dangling_abstract_reference() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        assert!(defs.list(3).is_none());
        assert!(defs.list(99).is_none());
    }

    #[test]
    fn test_level_value() {
        let level = LevelDefinition {
            start: 3,
            ..LevelDefinition::default()
        };
        assert_eq!(level.value(1), 3);
        assert_eq!(level.value(0), 2);
        assert_eq!(LevelDefinition::default().value(0), 0);
    }

    #[test]
    fn test_start_values_are_clamped() {
        let xml = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:start w:val="4000000000"/><w:lvlText w:val="%1."/></w:lvl>
    <w:lvl w:ilvl="1"><w:start w:val="-3"/><w:lvlText w:val="%2."/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1">
    <w:abstractNumId w:val="0"/>
    <w:lvlOverride w:ilvl="1"><w:startOverride w:val="99999999999"/></w:lvlOverride>
  </w:num>
  <w:num w:numId="2"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#;
        let defs = NumberingDefinitions::parse(xml).unwrap();
        let overridden = defs.list(1).unwrap();
        assert_eq!(overridden[0].as_ref().unwrap().start, MAX_START);
        assert_eq!(overridden[1].as_ref().unwrap().start, MAX_START);
        // Negative starts are ignored.
        assert_eq!(defs.list(2).unwrap()[1].as_ref().unwrap().start, 1);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(NumberingDefinitions::parse("<w:numbering><w:num></w:numbering>").is_err());
    }
}
