//! Runtime values for encoding/decoding, with validated field assignment.

use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single field value (scalar, payload, or nested message).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U32(u32),
    U64(u64),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Encoded payload of an externally defined message, carried verbatim.
    Opaque(Vec<u8>),
    Message(MessageValue),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U32(x) => Some(*x as u64),
            Value::U64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(x) => Some(*x as i64),
            Value::I64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&[u8]> {
        match self {
            Value::Opaque(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Opaque(_) => "opaque payload",
            Value::Message(_) => "message",
        }
    }
}

/// Assignment-time validation failure. The target field keeps its prior
/// value whenever one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("field {field}: value is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidEncoding { field: String, valid_up_to: usize },
    #[error("field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("{message} has no field named {field}")]
    UnknownField { message: String, field: String },
    #[error("field {field} is repeated, assign it with push")]
    NotSingular { field: String },
    #[error("field {field} is not repeated")]
    NotRepeated { field: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Single(Value),
    Repeated(Vec<Value>),
}

/// A decoded or under-construction message: a descriptor plus the populated
/// fields, keyed by field number. Absent fields read as their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageValue {
    desc: Arc<MessageDescriptor>,
    pub(crate) fields: BTreeMap<u32, FieldValue>,
}

impl MessageValue {
    /// Fresh message with every field at its default (absent).
    pub fn new(desc: Arc<MessageDescriptor>) -> MessageValue {
        MessageValue {
            desc,
            fields: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.desc
    }

    /// True when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Assign a singular field, validating the value against the descriptor.
    /// Returns the message for chained configuration.
    pub fn set(&mut self, field: &str, value: Value) -> Result<&mut Self, FieldError> {
        let desc = self.desc.clone();
        let f = field_of(&desc, field)?;
        if f.repeated {
            return Err(FieldError::NotSingular {
                field: field.to_string(),
            });
        }
        let value = checked(f, value)?;
        self.fields.insert(f.number, FieldValue::Single(value));
        Ok(self)
    }

    /// Append to a repeated field, validating the element.
    pub fn push(&mut self, field: &str, value: Value) -> Result<&mut Self, FieldError> {
        let desc = self.desc.clone();
        let f = field_of(&desc, field)?;
        if !f.repeated {
            return Err(FieldError::NotRepeated {
                field: field.to_string(),
            });
        }
        let value = checked(f, value)?;
        match self.fields.entry(f.number).or_insert_with(|| FieldValue::Repeated(Vec::new())) {
            FieldValue::Repeated(items) => items.push(value),
            FieldValue::Single(_) => {}
        }
        Ok(self)
    }

    /// Return a populated singular field to the absent state.
    pub fn clear_field(&mut self, field: &str) -> Result<&mut Self, FieldError> {
        let desc = self.desc.clone();
        let f = field_of(&desc, field)?;
        self.fields.remove(&f.number);
        Ok(self)
    }

    /// Current value of a singular field, or `None` when absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let f = self.desc.field(field)?;
        match self.fields.get(&f.number) {
            Some(FieldValue::Single(v)) => Some(v),
            _ => None,
        }
    }

    /// Elements of a repeated field; empty slice when none were added.
    pub fn get_repeated(&self, field: &str) -> Option<&[Value]> {
        let f = self.desc.field(field)?;
        if !f.repeated {
            return None;
        }
        match self.fields.get(&f.number) {
            Some(FieldValue::Repeated(items)) => Some(items),
            _ => Some(&[]),
        }
    }

    // Decoder paths: kinds are already enforced against the descriptor.
    pub(crate) fn set_decoded(&mut self, number: u32, value: Value) {
        self.fields.insert(number, FieldValue::Single(value));
    }

    pub(crate) fn push_decoded(&mut self, number: u32, value: Value) {
        match self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Repeated(Vec::new()))
        {
            FieldValue::Repeated(items) => items.push(value),
            FieldValue::Single(_) => {}
        }
    }
}

fn field_of<'a>(
    desc: &'a MessageDescriptor,
    field: &str,
) -> Result<&'a FieldDescriptor, FieldError> {
    desc.field(field).ok_or_else(|| FieldError::UnknownField {
        message: desc.full_name().to_string(),
        field: field.to_string(),
    })
}

/// Validate (and where needed coerce) a value against a field descriptor.
fn checked(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    match (&field.kind, value) {
        (FieldKind::Bool, v @ Value::Bool(_)) => Ok(v),
        (FieldKind::Uint32, v @ Value::U32(_)) => Ok(v),
        (FieldKind::Uint64, v @ Value::U64(_)) => Ok(v),
        (FieldKind::Int32, v @ Value::I32(_)) => Ok(v),
        (FieldKind::Int64, v @ Value::I64(_)) => Ok(v),
        (FieldKind::Float, v @ Value::F32(_)) => Ok(v),
        (FieldKind::Double, v @ Value::F64(_)) => Ok(v),
        (FieldKind::String, v @ Value::Str(_)) => Ok(v),
        (FieldKind::String, Value::Bytes(b)) => match String::from_utf8(b) {
            Ok(s) => Ok(Value::Str(s)),
            Err(e) => Err(FieldError::InvalidEncoding {
                field: field.name.clone(),
                valid_up_to: e.utf8_error().valid_up_to(),
            }),
        },
        (FieldKind::Bytes, v @ Value::Bytes(_)) => Ok(v),
        // Opaque payloads stand in for externally defined messages.
        (FieldKind::Message(_), v @ Value::Opaque(_)) => Ok(v),
        (FieldKind::Message(target), Value::Message(m)) => {
            if message_type_matches(target, m.descriptor().full_name()) {
                Ok(Value::Message(m))
            } else {
                Err(FieldError::TypeMismatch {
                    field: field.name.clone(),
                    expected: target.clone(),
                    actual: m.descriptor().full_name().to_string(),
                })
            }
        }
        (kind, v) => Err(FieldError::TypeMismatch {
            field: field.name.clone(),
            expected: kind.to_string(),
            actual: v.kind_name().to_string(),
        }),
    }
}

fn message_type_matches(target: &str, full_name: &str) -> bool {
    target == full_name || full_name.ends_with(&format!(".{}", target))
}
