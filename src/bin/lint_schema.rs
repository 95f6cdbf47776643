//! Lint schema sources: field numbering rules and naming style.
//!
//! Usage:
//!   lint_schema [OPTIONS] [FILE.proto ...]
//!   lint_schema < file.proto
//!
//! Options:
//!   --human, -H  Human-readable output
//!
//! If no files are given, reads from stdin. Exit code 1 if any error-level
//! findings (a file that fails to parse counts as an error).

use std::io::{self, Read};
use std::path::Path;
use sumwire::lint::{lint, LintMessage, LintRule, Severity};
use sumwire::parse;

fn rule_id(rule: LintRule) -> &'static str {
    match rule {
        LintRule::DuplicateFieldNumber => "duplicate-field-number",
        LintRule::DuplicateFieldName => "duplicate-field-name",
        LintRule::FieldNumberRange => "field-number-range",
        LintRule::ReservedFieldNumber => "reserved-field-number",
        LintRule::DuplicateMessageName => "duplicate-message-name",
        LintRule::FieldNameStyle => "field-name-style",
        LintRule::MessageNameStyle => "message-name-style",
    }
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

fn print_message(path: &str, m: &LintMessage, style: OutputStyle) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match style {
        OutputStyle::Compact => {
            println!(
                "{}:{}:{}: {}: {} [{}]",
                path,
                m.line,
                m.column,
                severity_str,
                m.message,
                rule_id(m.rule)
            );
        }
        OutputStyle::Human => {
            println!("  {} {}:{}: {}", path, m.line, m.column, m.message);
            println!("    rule: {}", rule_id(m.rule));
        }
    }
}

fn lint_source(
    path: &str,
    src: &str,
    style: OutputStyle,
    total_errors: &mut usize,
    total_warnings: &mut usize,
) -> bool {
    let schema = match parse(src) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            *total_errors += 1;
            return true;
        }
    };
    let messages = lint(&schema);
    for m in &messages {
        match m.severity {
            Severity::Error => *total_errors += 1,
            Severity::Warning => *total_warnings += 1,
        }
        print_message(path, m, style);
    }
    messages.iter().any(|m| m.severity == Severity::Error)
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let style = if let Some(pos) = args.iter().position(|a| a == "--human" || a == "-H") {
        args.remove(pos);
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };

    let mut has_error = false;
    let mut total_warnings = 0usize;
    let mut total_errors = 0usize;

    if args.is_empty() {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        has_error = lint_source("<stdin>", &src, style, &mut total_errors, &mut total_warnings);
    } else {
        for path in &args {
            let path = Path::new(path);
            let src = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e);
                    has_error = true;
                    continue;
                }
            };
            let display_path = path.display().to_string();
            if lint_source(
                &display_path,
                &src,
                style,
                &mut total_errors,
                &mut total_warnings,
            ) {
                has_error = true;
            }
        }
    }

    if total_errors > 0 || total_warnings > 0 {
        eprintln!(
            "lint: {} error(s), {} warning(s)",
            total_errors, total_warnings
        );
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
