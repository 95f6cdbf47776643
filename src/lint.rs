//! Linter for schema sources: numbering rules and naming style.
//!
//! ## Rules
//!
//! - **Field numbers**: in `1..=536870911`, outside the implementation
//!   reserved range (19000-19999), unique within a message, and not listed
//!   in a `reserved` statement.
//! - **Unique names**: field names within a message, message names within a
//!   file.
//! - **Naming style**: fields in `lower_snake_case`, messages in
//!   `UpperCamelCase` (warnings).
//!
//! Run the linter via the `lint_schema` binary:
//! `cargo run --bin lint_schema -- proto/sum.proto`
//! or pipe: `lint_schema < file.proto`. Exit code 1 if any error-level
//! findings.

use crate::descriptor::{SchemaFile, IMPL_RESERVED, MAX_FIELD_NUMBER};
use std::collections::HashMap;

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    /// Field number used twice in one message.
    DuplicateFieldNumber,
    /// Field name used twice in one message.
    DuplicateFieldName,
    /// Field number zero, too large, or in the implementation-reserved range.
    FieldNumberRange,
    /// Field number listed in a `reserved` statement of its message.
    ReservedFieldNumber,
    /// Message name used twice in one file.
    DuplicateMessageName,
    /// Field names should be lower_snake_case.
    FieldNameStyle,
    /// Message names should be UpperCamelCase.
    MessageNameStyle,
}

/// A single lint message with location.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub line: usize,
    pub column: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// Run all lint rules on a parsed schema. Returns messages in line order.
pub fn lint(schema: &SchemaFile) -> Vec<LintMessage> {
    let mut out = Vec::new();

    let mut message_names: HashMap<&str, usize> = HashMap::new();
    for m in &schema.messages {
        if let Some(first_line) = message_names.get(m.name.as_str()) {
            out.push(LintMessage {
                line: m.line,
                column: m.column,
                rule: LintRule::DuplicateMessageName,
                severity: Severity::Error,
                message: format!(
                    "message name {} already used on line {}",
                    m.name, first_line
                ),
            });
        } else {
            message_names.insert(&m.name, m.line);
        }

        if !is_camel_case(&m.name) {
            out.push(LintMessage {
                line: m.line,
                column: m.column,
                rule: LintRule::MessageNameStyle,
                severity: Severity::Warning,
                message: format!("message name {} should be UpperCamelCase", m.name),
            });
        }

        let mut numbers: HashMap<u64, &str> = HashMap::new();
        let mut names: HashMap<&str, u64> = HashMap::new();
        for f in &m.fields {
            if f.number == 0 || f.number > MAX_FIELD_NUMBER as u64 {
                out.push(LintMessage {
                    line: f.line,
                    column: f.column,
                    rule: LintRule::FieldNumberRange,
                    severity: Severity::Error,
                    message: format!("field number {} out of range", f.number),
                });
            } else if f.number >= IMPL_RESERVED.0 as u64 && f.number <= IMPL_RESERVED.1 as u64 {
                out.push(LintMessage {
                    line: f.line,
                    column: f.column,
                    rule: LintRule::FieldNumberRange,
                    severity: Severity::Error,
                    message: format!(
                        "field number {} is in the implementation-reserved range {}-{}",
                        f.number, IMPL_RESERVED.0, IMPL_RESERVED.1
                    ),
                });
            }

            if m.reserved.iter().any(|&(lo, hi)| f.number >= lo && f.number <= hi) {
                out.push(LintMessage {
                    line: f.line,
                    column: f.column,
                    rule: LintRule::ReservedFieldNumber,
                    severity: Severity::Error,
                    message: format!("field number {} is reserved in {}", f.number, m.name),
                });
            }

            if let Some(other) = numbers.get(&f.number) {
                out.push(LintMessage {
                    line: f.line,
                    column: f.column,
                    rule: LintRule::DuplicateFieldNumber,
                    severity: Severity::Error,
                    message: format!(
                        "field number {} already used by {}",
                        f.number, other
                    ),
                });
            } else {
                numbers.insert(f.number, &f.name);
            }

            if names.insert(&f.name, f.number).is_some() {
                out.push(LintMessage {
                    line: f.line,
                    column: f.column,
                    rule: LintRule::DuplicateFieldName,
                    severity: Severity::Error,
                    message: format!("field name {} already used in {}", f.name, m.name),
                });
            }

            if !is_snake_case(&f.name) {
                out.push(LintMessage {
                    line: f.line,
                    column: f.column,
                    rule: LintRule::FieldNameStyle,
                    severity: Severity::Warning,
                    message: format!("field name {} should be lower_snake_case", f.name),
                });
            }
        }
    }

    out.sort_by_key(|m| (m.line, m.column));
    out
}

fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

fn is_camel_case(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase()) && !name.contains('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn lint_clean_schema_passes() {
        let schema = parse("message Ok {\n\tbool done = 1;\n}\n").expect("parse");
        let msgs = lint(&schema);
        assert!(msgs.is_empty(), "clean schema should lint clean: {:?}", msgs);
    }

    #[test]
    fn lint_duplicate_field_number() {
        let schema =
            parse("message M {\n\tbool a = 1;\n\tbool b = 1;\n}\n").expect("parse");
        let msgs = lint(&schema);
        let dup: Vec<_> = msgs
            .iter()
            .filter(|m| m.rule == LintRule::DuplicateFieldNumber)
            .collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].line, 3);
    }

    #[test]
    fn lint_reserved_field_number() {
        let schema =
            parse("message M {\n\treserved 2 to 4;\n\tbool a = 3;\n}\n").expect("parse");
        let msgs = lint(&schema);
        assert!(msgs.iter().any(|m| m.rule == LintRule::ReservedFieldNumber));
    }

    #[test]
    fn lint_naming_style() {
        let schema =
            parse("message bad_name {\n\tbool BadField = 1;\n}\n").expect("parse");
        let msgs = lint(&schema);
        assert!(msgs.iter().any(|m| m.rule == LintRule::MessageNameStyle));
        assert!(msgs.iter().any(|m| m.rule == LintRule::FieldNameStyle));
        assert!(msgs.iter().all(|m| m.severity == Severity::Warning));
    }
}
