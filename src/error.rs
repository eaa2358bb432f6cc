//! Error types for preset resolution and application

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::dom::DomError;
use crate::preset::Span;

/// Errors that can occur while resolving a preset's inheritance chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A preset (indirectly) extends itself
    #[error("cyclic inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },
}

/// Errors that can occur while applying a preset to an element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

/// Severity of a source-level diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Format a diagnostic with source context using ariadne
///
/// Falls back to a single plain line when the report cannot be rendered.
pub fn format_diagnostic(
    severity: Severity,
    message: &str,
    span: &Span,
    label: &str,
    source: &str,
    filename: &str,
) -> String {
    let (kind, color) = match severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    };

    let mut buf = Vec::new();
    let written = Report::build(kind, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span.clone()))
                .with_message(label)
                .with_color(color),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written.ok().and_then(|_| String::from_utf8(buf).ok()) {
        Some(report) => report,
        None => format!("{}: {}", filename, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_error_message_lists_chain() {
        let err = ResolveError::CyclicInheritance {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic inheritance: a -> b -> a");
    }

    #[test]
    fn test_format_diagnostic_mentions_message() {
        let source = "components:\n  card:\n    extends: ghost\n";
        let start = source.find("ghost").unwrap_or(0);
        let report = format_diagnostic(
            Severity::Warning,
            "unknown parent",
            &(start..start + 5),
            "not defined",
            source,
            "components.yaml",
        );
        assert!(report.contains("unknown parent"));
        assert!(report.contains("components.yaml"));
    }
}
