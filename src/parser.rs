//! Parser for preset definitions
//!
//! The definitions file is a small, indentation-structured subset of YAML:
//!
//! ```text
//! components:
//!   card:
//!     box: "padding:4"
//!     face: "bg:base-50"
//!   highlighted-card:
//!     extends: card
//!     face: "bg:brand-a"
//! ```
//!
//! Only two nesting levels below the section marker are understood. Level one
//! starts a preset, level two adds one `key: value` property to it. Anything
//! else (deeper nesting, lists, multi-line values, lines before the marker)
//! is skipped without error.

use crate::config::ParserConfig;
use crate::preset::{storage_key, Preset, PresetMap, Span, PARENT_KEY};

/// Result of a parse, including what a lint pass needs to know
#[derive(Debug, Clone, Default)]
pub struct ParsedDefinitions {
    pub presets: PresetMap,
    /// Headers of presets that replaced an earlier preset with the same name
    pub duplicates: Vec<(String, Span)>,
    /// Lines inside the section that contributed nothing
    pub ignored: Vec<Span>,
}

/// Nesting level of a line inside the section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Preset,
    Property,
}

impl Depth {
    /// Classify an indentation width; only exact multiples one or two units
    /// deep are recognized.
    fn classify(indent: usize, unit: usize) -> Option<Self> {
        if unit == 0 || indent % unit != 0 {
            return None;
        }
        match indent / unit {
            1 => Some(Depth::Preset),
            2 => Some(Depth::Property),
            _ => None,
        }
    }
}

/// Parse definitions with the default configuration
pub fn parse(raw: &str) -> PresetMap {
    parse_with_config(raw, &ParserConfig::default())
}

/// Parse definitions with a custom section name or indentation unit
pub fn parse_with_config(raw: &str, config: &ParserConfig) -> PresetMap {
    parse_report(raw, config).presets
}

/// Parse definitions, keeping track of duplicates and ignored lines
pub fn parse_report(raw: &str, config: &ParserConfig) -> ParsedDefinitions {
    let marker = format!("{}:", config.section);
    let mut out = ParsedDefinitions::default();
    let mut in_section = false;
    let mut current: Option<String> = None;
    let mut offset = 0;

    for line in raw.split('\n') {
        let start = offset;
        offset += line.len() + 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed == marker {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let content_start = start + indent;
        let line_span = content_start..content_start + trimmed.len();

        let handled = match Depth::classify(indent, config.indent_unit) {
            Some(Depth::Preset) => start_preset(trimmed, content_start, &mut out, &mut current),
            Some(Depth::Property) => match current.as_deref() {
                Some(name) => add_property(line, start, name, &mut out),
                None => false,
            },
            None => false,
        };

        if !handled {
            out.ignored.push(line_span);
        }
    }

    out
}

fn start_preset(
    trimmed: &str,
    content_start: usize,
    out: &mut ParsedDefinitions,
    current: &mut Option<String>,
) -> bool {
    let Some((name, _)) = trimmed.split_once(':') else {
        return false;
    };
    let name = name.trim();
    if name.is_empty() {
        return false;
    }

    let span = content_start..content_start + name.len();

    if out.presets.contains_key(name) {
        out.duplicates.push((name.to_string(), span.clone()));
    }
    let mut preset = Preset::new(name);
    preset.span = Some(span);
    out.presets.insert(name.to_string(), preset);
    *current = Some(name.to_string());
    true
}

fn add_property(line: &str, line_start: usize, preset: &str, out: &mut ParsedDefinitions) -> bool {
    let Some(colon) = line.find(':') else {
        return false;
    };
    let key = line[..colon].trim();
    if key.is_empty() {
        return false;
    }

    let raw_value = &line[colon + 1..];
    let value = strip_quotes(raw_value.trim());
    let Some(target) = out.presets.get_mut(preset) else {
        return false;
    };

    if key == PARENT_KEY {
        if value.is_empty() {
            target.parent = None;
            target.parent_span = None;
        } else {
            let value_start = line_start + colon + 1 + raw_value.find(value).unwrap_or(0);
            target.parent = Some(value.to_string());
            target.parent_span = Some(value_start..value_start + value.len());
        }
    } else {
        target
            .attributes
            .insert(storage_key(key).to_string(), value.to_string());
    }
    true
}

/// Remove one pair of matching surrounding quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
