//! Lint checks for preset definitions.
//!
//! The runtime path is silent about defects in the definitions: unknown
//! parents are dropped, malformed lines skipped, duplicates replaced. This
//! module surfaces those same defects for authors, pointing at the offending
//! lines where the structured-text source is available.

use std::collections::HashSet;
use std::fmt;

use crate::error::{format_diagnostic, ResolveError, Severity};
use crate::parser::ParsedDefinitions;
use crate::preset::{Namespace, Span, ELEMENT_KEY};
use crate::registry::PresetRegistry;
use crate::resolver;

/// A lint finding about the definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub category: LintCategory,
    pub preset: Option<String>,
    pub message: String,
    pub span: Option<Span>,
}

/// Category of lint finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    UnknownParent,
    Cycle,
    Duplicate,
    UnknownKey,
    EmptyValue,
    IgnoredLine,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::UnknownParent => write!(f, "unknown-parent"),
            LintCategory::Cycle => write!(f, "cycle"),
            LintCategory::Duplicate => write!(f, "duplicate"),
            LintCategory::UnknownKey => write!(f, "unknown-key"),
            LintCategory::EmptyValue => write!(f, "empty-value"),
            LintCategory::IgnoredLine => write!(f, "ignored-line"),
        }
    }
}

impl LintCategory {
    pub fn severity(self) -> Severity {
        match self {
            LintCategory::Cycle => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl LintWarning {
    fn new(
        category: LintCategory,
        preset: Option<&str>,
        message: String,
        span: Option<Span>,
    ) -> Self {
        Self {
            category,
            preset: preset.map(str::to_string),
            message,
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category.severity() == Severity::Error
    }

    /// Format the finding, with a source snippet when a span is known
    pub fn format(&self, source: Option<&str>, filename: &str) -> String {
        match (&self.span, source) {
            (Some(span), Some(source)) => format_diagnostic(
                self.category.severity(),
                &self.message,
                span,
                &self.category.to_string(),
                source,
                filename,
            ),
            _ => {
                let level = match self.category.severity() {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                format!("{}[{}]: {}", level, self.category, self.message)
            }
        }
    }
}

/// Check a registry for defects
pub fn check(registry: &PresetRegistry) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_parents(registry, &mut warnings);
    check_cycles(registry, &mut warnings);
    check_keys(registry, &mut warnings);
    warnings
}

/// Check parsed structured-text definitions, including line-level findings
pub fn check_parsed(parsed: &ParsedDefinitions) -> Vec<LintWarning> {
    let registry = PresetRegistry::from_presets(parsed.presets.clone());
    let mut warnings = check(&registry);

    for (name, span) in &parsed.duplicates {
        warnings.push(LintWarning::new(
            LintCategory::Duplicate,
            Some(name.as_str()),
            format!("preset '{}' is defined again; the earlier definition is discarded", name),
            Some(span.clone()),
        ));
    }
    for span in &parsed.ignored {
        warnings.push(LintWarning::new(
            LintCategory::IgnoredLine,
            None,
            "line is not a preset or a property and is ignored".to_string(),
            Some(span.clone()),
        ));
    }

    warnings.sort_by_key(|w| w.span.as_ref().map(|s| s.start));
    warnings
}

fn check_parents(registry: &PresetRegistry, warnings: &mut Vec<LintWarning>) {
    for preset in registry.iter() {
        let Some(parent) = preset.parent.as_deref() else {
            continue;
        };
        if !registry.contains(parent) {
            warnings.push(LintWarning::new(
                LintCategory::UnknownParent,
                Some(preset.name.as_str()),
                format!("preset '{}' extends unknown preset '{}'", preset.name, parent),
                preset.parent_span.clone(),
            ));
        }
    }
}

/// Report each cycle once, at the first preset of the cycle in name order
fn check_cycles(registry: &PresetRegistry, warnings: &mut Vec<LintWarning>) {
    let mut reported: HashSet<String> = HashSet::new();

    for (name, result) in resolver::resolve_all(registry) {
        let Err(ResolveError::CyclicInheritance { chain }) = result else {
            continue;
        };
        let Some(repeated) = chain.last() else {
            continue;
        };
        let start = chain.iter().position(|n| n == repeated).unwrap_or(0);
        let members = &chain[start..chain.len() - 1];
        if members.iter().any(|m| reported.contains(m)) || !members.contains(&name) {
            continue;
        }
        reported.extend(members.iter().cloned());

        let span = registry.get(&name).and_then(|p| p.parent_span.clone());
        warnings.push(LintWarning::new(
            LintCategory::Cycle,
            Some(name.as_str()),
            format!("cyclic inheritance: {}", chain[start..].join(" -> ")),
            span,
        ));
    }
}

fn check_keys(registry: &PresetRegistry, warnings: &mut Vec<LintWarning>) {
    for preset in registry.iter() {
        for (key, value) in &preset.attributes {
            if key == ELEMENT_KEY {
                continue;
            }
            match Namespace::from_key(key) {
                None => warnings.push(LintWarning::new(
                    LintCategory::UnknownKey,
                    Some(preset.name.as_str()),
                    format!(
                        "preset '{}' sets '{}', which is never applied to elements",
                        preset.name, key
                    ),
                    preset.span.clone(),
                )),
                Some(namespace) if value.is_empty() => warnings.push(LintWarning::new(
                    LintCategory::EmptyValue,
                    Some(preset.name.as_str()),
                    format!("preset '{}' sets an empty '{}'", preset.name, namespace),
                    preset.span.clone(),
                )),
                Some(_) => {}
            }
        }
    }
}
