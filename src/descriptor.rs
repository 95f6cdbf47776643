//! Schema model: parsed declarations and resolved message descriptors.
//!
//! A [`SchemaFile`] is the raw output of [`parse`](crate::parser::parse).
//! [`DescriptorPool::resolve`] validates it (field numbering rules, duplicate
//! names) and produces the descriptors the codec works from. Message-type
//! references that resolve to nothing in the pool stay **external**: the
//! codec carries their payloads as opaque bytes instead of decoding them.

use crate::wire::WireType;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Highest valid field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Field numbers reserved for implementation use by the wire format.
pub const IMPL_RESERVED: (u32, u32) = (19_000, 19_999);

/// Parsed schema file: package, imports (recorded, never loaded), messages.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub messages: Vec<MessageDecl>,
}

#[derive(Debug, Clone)]
pub struct MessageDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    /// Inclusive number ranges retired with `reserved`.
    pub reserved: Vec<(u64, u64)>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub number: u64,
    pub type_name: String,
    pub repeated: bool,
    pub line: usize,
    pub column: usize,
}

/// Scalar kind or message-type reference of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Uint32,
    Uint64,
    Int32,
    Int64,
    Float,
    Double,
    String,
    Bytes,
    /// Reference to a message type by name. Resolved to a pool entry when the
    /// schema defines it; otherwise the type is external and payloads stay
    /// opaque.
    Message(String),
}

impl FieldKind {
    fn from_type_name(name: &str) -> FieldKind {
        match name {
            "bool" => FieldKind::Bool,
            "uint32" => FieldKind::Uint32,
            "uint64" => FieldKind::Uint64,
            "int32" => FieldKind::Int32,
            "int64" => FieldKind::Int64,
            "float" => FieldKind::Float,
            "double" => FieldKind::Double,
            "string" => FieldKind::String,
            "bytes" => FieldKind::Bytes,
            other => FieldKind::Message(other.trim_start_matches('.').to_string()),
        }
    }

    /// Wire type used for a single value of this kind.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Bool
            | FieldKind::Uint32
            | FieldKind::Uint64
            | FieldKind::Int32
            | FieldKind::Int64 => WireType::Varint,
            FieldKind::Float => WireType::Fixed32,
            FieldKind::Double => WireType::Fixed64,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// Whether repeated values of this kind may use the packed encoding.
    pub fn packable(&self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Uint32 => write!(f, "uint32"),
            FieldKind::Uint64 => write!(f, "uint64"),
            FieldKind::Int32 => write!(f, "int32"),
            FieldKind::Int64 => write!(f, "int64"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Double => write!(f, "double"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Bytes => write!(f, "bytes"),
            FieldKind::Message(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
    pub repeated: bool,
}

/// Resolved message type: fields ordered by number, with name/number lookup.
#[derive(Debug, PartialEq)]
pub struct MessageDescriptor {
    full_name: String,
    fields: Vec<FieldDescriptor>,
    by_number: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl MessageDescriptor {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Fields in ascending field-number order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&i| &self.fields[i])
    }
}

/// Message descriptors by full name, built from a parsed schema.
#[derive(Debug, Clone, Default)]
pub struct DescriptorPool {
    package: Option<String>,
    messages: HashMap<String, Arc<MessageDescriptor>>,
}

impl DescriptorPool {
    /// Validate a parsed schema and build its descriptors.
    ///
    /// Rejected: duplicate message names, duplicate field numbers or names
    /// within a message, numbers outside `1..=MAX_FIELD_NUMBER`, numbers in
    /// the implementation-reserved range, and use of `reserved` numbers.
    pub fn resolve(schema: SchemaFile) -> Result<DescriptorPool, String> {
        let mut declared: Vec<String> = Vec::new();
        for m in &schema.messages {
            let full = full_name(schema.package.as_deref(), &m.name);
            if declared.contains(&full) {
                return Err(format!("Duplicate message name: {}", full));
            }
            declared.push(full);
        }

        let mut messages = HashMap::new();
        for m in &schema.messages {
            let full = full_name(schema.package.as_deref(), &m.name);
            let mut fields = Vec::new();
            let mut by_number = HashMap::new();
            let mut by_name = HashMap::new();
            for f in &m.fields {
                check_number(&full, f, &m.reserved)?;
                let kind = match FieldKind::from_type_name(&f.type_name) {
                    FieldKind::Message(target) => {
                        match resolve_ref(&target, schema.package.as_deref(), &declared) {
                            Some(resolved) => FieldKind::Message(resolved),
                            None => FieldKind::Message(target),
                        }
                    }
                    k => k,
                };
                let number = f.number as u32;
                let idx = fields.len();
                if by_number.insert(number, idx).is_some() {
                    return Err(format!(
                        "{}: duplicate field number {} ({})",
                        full, number, f.name
                    ));
                }
                if by_name.insert(f.name.clone(), idx).is_some() {
                    return Err(format!("{}: duplicate field name {}", full, f.name));
                }
                fields.push(FieldDescriptor {
                    name: f.name.clone(),
                    number,
                    kind,
                    repeated: f.repeated,
                });
            }
            fields.sort_by_key(|f| f.number);
            // re-index after the sort
            let by_number = fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.number, i))
                .collect();
            let by_name = fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect();
            messages.insert(
                full.clone(),
                Arc::new(MessageDescriptor {
                    full_name: full,
                    fields,
                    by_number,
                    by_name,
                }),
            );
        }

        Ok(DescriptorPool {
            package: schema.package,
            messages,
        })
    }

    /// Look up a message by full name, or by short name within the pool's
    /// package.
    pub fn get(&self, name: &str) -> Option<Arc<MessageDescriptor>> {
        if let Some(d) = self.messages.get(name) {
            return Some(d.clone());
        }
        if !name.contains('.') {
            if let Some(pkg) = &self.package {
                return self.messages.get(&format!("{}.{}", pkg, name)).cloned();
            }
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(|k| k.as_str())
    }
}

fn full_name(package: Option<&str>, name: &str) -> String {
    match package {
        Some(pkg) => format!("{}.{}", pkg, name),
        None => name.to_string(),
    }
}

fn check_number(message: &str, f: &FieldDecl, reserved: &[(u64, u64)]) -> Result<(), String> {
    if f.number == 0 || f.number > MAX_FIELD_NUMBER as u64 {
        return Err(format!(
            "{}.{}: field number {} out of range",
            message, f.name, f.number
        ));
    }
    if f.number >= IMPL_RESERVED.0 as u64 && f.number <= IMPL_RESERVED.1 as u64 {
        return Err(format!(
            "{}.{}: field number {} is in the implementation-reserved range",
            message, f.name, f.number
        ));
    }
    for &(lo, hi) in reserved {
        if f.number >= lo && f.number <= hi {
            return Err(format!(
                "{}.{}: field number {} is reserved",
                message, f.name, f.number
            ));
        }
    }
    Ok(())
}

fn resolve_ref(target: &str, package: Option<&str>, declared: &[String]) -> Option<String> {
    if declared.iter().any(|d| d == target) {
        return Some(target.to_string());
    }
    if let Some(pkg) = package {
        let qualified = format!("{}.{}", pkg, target);
        if declared.iter().any(|d| d == &qualified) {
            return Some(qualified);
        }
    }
    None
}

/// Descriptors for the embedded sum schema, parsed once at first use.
pub fn sum_descriptors() -> &'static DescriptorPool {
    static POOL: OnceLock<DescriptorPool> = OnceLock::new();
    POOL.get_or_init(|| {
        let schema = crate::parser::parse(include_str!("../proto/sum.proto"))
            .expect("embedded sum.proto parses");
        DescriptorPool::resolve(schema).expect("embedded sum.proto resolves")
    })
}
