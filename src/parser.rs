//! Parse proto schema source into declarations using PEST.

use crate::descriptor::{FieldDecl, MessageDecl, SchemaFile};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "schema.pest"]
struct SchemaParser;

/// Parse proto3-subset source into a schema file.
pub fn parse(source: &str) -> Result<SchemaFile, String> {
    let pairs = SchemaParser::parse(Rule::schema, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let pair = pairs.into_iter().next().ok_or("Empty parse")?;
    build_schema(pair)
}

fn build_schema(pair: pest::iterators::Pair<Rule>) -> Result<SchemaFile, String> {
    let mut package = None;
    let mut imports = Vec::new();
    let mut messages = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::syntax_decl => {
                let lit = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::string_lit)
                    .ok_or("syntax declaration: missing literal")?;
                let syntax = unquote(lit.as_str());
                if syntax != "proto3" {
                    return Err(format!("Unsupported syntax: {}", syntax));
                }
            }
            Rule::package_decl => {
                let name = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::dotted_ident)
                    .ok_or("package declaration: missing name")?;
                package = Some(name.as_str().to_string());
            }
            Rule::import_decl => {
                let lit = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::string_lit)
                    .ok_or("import declaration: missing path")?;
                imports.push(unquote(lit.as_str()));
            }
            Rule::message_decl => messages.push(build_message(inner)?),
            _ => {}
        }
    }

    Ok(SchemaFile {
        package,
        imports,
        messages,
    })
}

fn build_message(pair: pest::iterators::Pair<Rule>) -> Result<MessageDecl, String> {
    let (line, column) = pair.line_col();
    let mut name = String::new();
    let mut fields = Vec::new();
    let mut reserved = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::field_decl => fields.push(build_field(inner)?),
            Rule::reserved_decl => reserved.extend(build_reserved(inner)?),
            _ => {}
        }
    }
    if name.is_empty() {
        return Err("message declaration: missing name".to_string());
    }
    Ok(MessageDecl {
        name,
        fields,
        reserved,
        line,
        column,
    })
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<FieldDecl, String> {
    let (line, column) = pair.line_col();
    let mut repeated = false;
    let mut type_name = String::new();
    let mut name = String::new();
    let mut number = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            // `optional` marks explicit presence in proto3; it decodes and
            // encodes the same as a plain singular field here.
            Rule::label => repeated = inner.as_str() == "repeated",
            Rule::type_name => type_name = inner.as_str().to_string(),
            Rule::ident => name = inner.as_str().to_string(),
            Rule::number => {
                let n: u64 = inner
                    .as_str()
                    .parse()
                    .map_err(|_| format!("field number too large: {}", inner.as_str()))?;
                number = Some(n);
            }
            _ => {}
        }
    }

    let number = number.ok_or_else(|| format!("field {}: missing number", name))?;
    if type_name.is_empty() || name.is_empty() {
        return Err("field declaration: missing type or name".to_string());
    }
    Ok(FieldDecl {
        name,
        number,
        type_name,
        repeated,
        line,
        column,
    })
}

fn build_reserved(pair: pest::iterators::Pair<Rule>) -> Result<Vec<(u64, u64)>, String> {
    let mut ranges = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::reserved_range {
            continue;
        }
        let mut nums = inner.into_inner();
        let lo: u64 = nums
            .next()
            .ok_or("reserved range: missing number")?
            .as_str()
            .parse()
            .map_err(|_| "reserved range: number too large")?;
        let hi = match nums.next() {
            Some(p) => p
                .as_str()
                .parse()
                .map_err(|_| "reserved range: number too large")?,
            None => lo,
        };
        if hi < lo {
            return Err(format!("reserved range {} to {}: empty", lo, hi));
        }
        ranges.push((lo, hi));
    }
    Ok(ranges)
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').to_string()
}
