//! Source-annotated diagnostics for harness documents

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A harness document that is not valid YAML, or does not have the expected shape
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(wirekit::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let offset = err
            .location()
            .map(|loc| offset_of(source, loc.line(), loc.column()))
            .unwrap_or(0);
        let message = err.to_string();

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from((offset, usize::from(offset < source.len()))),
            help: suggest(&message),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Byte offset of a 1-based line and column, clamped to the source
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let line_start = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum::<usize>();
    let line_text = source[line_start..].lines().next().unwrap_or("");
    let column_offset = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());
    line_start + column_offset
}

fn suggest(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs".to_string());
    }
    if msg.contains("duplicate") {
        return Some("Each designator can only be declared once".to_string());
    }
    if msg.contains("expected a tuple of size 2") || msg.contains("invalid length") {
        return Some("Endpoints are written as [designator, pin], e.g. [X1, 3]".to_string());
    }
    if msg.contains("missing field `via`") {
        return Some("Every connection needs a `via: [cable, wire]` entry".to_string());
    }
    if msg.contains("did not match any variant") {
        return Some(
            "Check the value's shape: pins and wires are numbers, names or lists of them".to_string(),
        );
    }
    if msg.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of() {
        let source = "a: 1\nbb: 2\nccc: 3";
        assert_eq!(offset_of(source, 1, 1), 0);
        assert_eq!(offset_of(source, 2, 1), 5);
        assert_eq!(offset_of(source, 3, 3), 13);
        assert_eq!(offset_of(source, 9, 9), source.len());
    }

    #[test]
    fn test_error_keeps_message_and_location() {
        let source = "connectors:\n  X1: [1, 2\n";
        let err = serde_yml::from_str::<serde_yml::Value>(source).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, source, "bad.yaml");
        assert!(!diag.message().is_empty());
    }

    #[test]
    fn test_suggestions() {
        assert!(suggest("invalid length 1, expected a tuple of size 2").is_some());
        assert!(suggest("found character that cannot start any token (tab)").is_some());
        assert!(suggest("something else").is_none());
    }
}
