//! Schema-driven encode/decode of messages on the wire format.
//!
//! Decoding walks the encoded keys and interprets each field through its
//! descriptor; unknown field numbers are skipped for forward compatibility.
//! Encoding is canonical: fields in ascending number order, default values
//! omitted, repeated primitives packed. Encode cannot fail because every
//! value reaching it was validated at assignment time.

use crate::descriptor::{
    sum_descriptors, DescriptorPool, FieldDescriptor, FieldKind, MessageDescriptor,
};
use crate::value::{FieldValue, MessageValue, Value};
use crate::wire::{self, WireType};
use std::sync::Arc;

/// Maximum nesting of message-typed fields accepted by decode.
pub const MAX_DEPTH: usize = 64;

/// Malformed input found while decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("truncated varint")]
    TruncatedVarint,
    #[error("varint wider than 64 bits")]
    VarintOverflow,
    #[error("truncated field: {needed} more byte(s) needed")]
    Truncated { needed: usize },
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),
    #[error("field number 0 is not valid")]
    ZeroFieldNumber,
    #[error("field number {0} out of range")]
    FieldNumberRange(u64),
    #[error("length prefix {length} exceeds the {remaining} remaining byte(s)")]
    LengthOverrun { length: u64, remaining: usize },
    #[error("field {field}: expected wire type {expected:?}, found {found:?}")]
    WireTypeMismatch {
        field: String,
        expected: WireType,
        found: WireType,
    },
    #[error("field {field}: invalid UTF-8 on the wire")]
    InvalidUtf8 { field: String },
    #[error("unknown message type: {0}")]
    UnknownMessage(String),
    #[error("message nesting exceeds depth {0}")]
    DepthLimit(usize),
}

/// Encoder/decoder over a descriptor pool.
#[derive(Debug, Clone)]
pub struct Codec {
    pool: DescriptorPool,
}

impl Codec {
    pub fn new(pool: DescriptorPool) -> Codec {
        Codec { pool }
    }

    /// Codec over the embedded sum schema.
    pub fn for_sum() -> Codec {
        Codec::new(sum_descriptors().clone())
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Decode one message by name. A malformed buffer never yields a
    /// partially decoded value.
    pub fn decode_message(&self, name: &str, bytes: &[u8]) -> Result<MessageValue, CodecError> {
        let desc = self
            .pool
            .get(name)
            .ok_or_else(|| CodecError::UnknownMessage(name.to_string()))?;
        self.decode_fields(desc, bytes, 0)
    }

    fn decode_fields(
        &self,
        desc: Arc<MessageDescriptor>,
        bytes: &[u8],
        depth: usize,
    ) -> Result<MessageValue, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::DepthLimit(MAX_DEPTH));
        }
        let mut out = MessageValue::new(desc.clone());
        let mut pos = 0;
        while pos < bytes.len() {
            let (number, wire_type) = wire::decode_key(bytes, &mut pos)?;
            match desc.field_by_number(number) {
                Some(f) => self.decode_field_into(&mut out, f, wire_type, bytes, &mut pos, depth)?,
                None => wire::skip_field(bytes, &mut pos, wire_type)?,
            }
        }
        Ok(out)
    }

    fn decode_field_into(
        &self,
        out: &mut MessageValue,
        f: &FieldDescriptor,
        wire_type: WireType,
        bytes: &[u8],
        pos: &mut usize,
        depth: usize,
    ) -> Result<(), CodecError> {
        if f.repeated {
            // Primitive fields accept the packed encoding next to the
            // one-key-per-element form.
            if wire_type == WireType::LengthDelimited && f.kind.packable() {
                let payload = wire::decode_len_prefixed(bytes, pos)?;
                let mut p = 0;
                while p < payload.len() {
                    let v = self.decode_value(f, f.kind.wire_type(), payload, &mut p, depth)?;
                    out.push_decoded(f.number, v);
                }
                return Ok(());
            }
            let v = self.decode_value(f, wire_type, bytes, pos, depth)?;
            out.push_decoded(f.number, v);
        } else {
            // last occurrence wins
            let v = self.decode_value(f, wire_type, bytes, pos, depth)?;
            out.set_decoded(f.number, v);
        }
        Ok(())
    }

    fn decode_value(
        &self,
        f: &FieldDescriptor,
        wire_type: WireType,
        bytes: &[u8],
        pos: &mut usize,
        depth: usize,
    ) -> Result<Value, CodecError> {
        let expected = f.kind.wire_type();
        if wire_type != expected {
            return Err(CodecError::WireTypeMismatch {
                field: f.name.clone(),
                expected,
                found: wire_type,
            });
        }
        match &f.kind {
            FieldKind::Bool => Ok(Value::Bool(wire::decode_varint(bytes, pos)? != 0)),
            FieldKind::Uint32 => Ok(Value::U32(wire::decode_varint(bytes, pos)? as u32)),
            FieldKind::Uint64 => Ok(Value::U64(wire::decode_varint(bytes, pos)?)),
            FieldKind::Int32 => Ok(Value::I32(wire::decode_varint(bytes, pos)? as i32)),
            FieldKind::Int64 => Ok(Value::I64(wire::decode_varint(bytes, pos)? as i64)),
            FieldKind::Float => Ok(Value::F32(f32::from_bits(wire::decode_fixed32(bytes, pos)?))),
            FieldKind::Double => Ok(Value::F64(f64::from_bits(wire::decode_fixed64(bytes, pos)?))),
            FieldKind::String => {
                let payload = wire::decode_len_prefixed(bytes, pos)?;
                match std::str::from_utf8(payload) {
                    Ok(s) => Ok(Value::Str(s.to_string())),
                    Err(_) => Err(CodecError::InvalidUtf8 {
                        field: f.name.clone(),
                    }),
                }
            }
            FieldKind::Bytes => {
                let payload = wire::decode_len_prefixed(bytes, pos)?;
                Ok(Value::Bytes(payload.to_vec()))
            }
            FieldKind::Message(target) => {
                let payload = wire::decode_len_prefixed(bytes, pos)?;
                match self.pool.get(target) {
                    Some(nested) => {
                        Ok(Value::Message(self.decode_fields(nested, payload, depth + 1)?))
                    }
                    None => {
                        // Externally defined type: keep the payload verbatim,
                        // but require well-formed framing.
                        wire::validate(payload)?;
                        Ok(Value::Opaque(payload.to_vec()))
                    }
                }
            }
        }
    }

    /// Encode a message to its canonical byte sequence.
    pub fn encode_message(&self, msg: &MessageValue) -> Vec<u8> {
        let mut out = Vec::new();
        encode_fields(msg, &mut out);
        out
    }
}

fn encode_fields(msg: &MessageValue, out: &mut Vec<u8>) {
    for (&number, fv) in &msg.fields {
        match fv {
            FieldValue::Single(v) => {
                if !is_default(v) {
                    encode_value(number, v, out);
                }
            }
            FieldValue::Repeated(items) => encode_repeated(number, items, out),
        }
    }
}

fn encode_repeated(number: u32, items: &[Value], out: &mut Vec<u8>) {
    if items.is_empty() {
        return;
    }
    if packed_encoding(&items[0]) {
        let mut payload = Vec::new();
        for v in items {
            encode_scalar(v, &mut payload);
        }
        wire::encode_key(number, WireType::LengthDelimited, out);
        wire::encode_varint(payload.len() as u64, out);
        out.extend_from_slice(&payload);
    } else {
        for v in items {
            encode_value(number, v, out);
        }
    }
}

/// Default (zero) values are omitted from the encoding. Message payloads are
/// never omitted: presence of an empty message is meaningful.
fn is_default(v: &Value) -> bool {
    match v {
        Value::Bool(x) => !*x,
        Value::U32(x) => *x == 0,
        Value::U64(x) => *x == 0,
        Value::I32(x) => *x == 0,
        Value::I64(x) => *x == 0,
        Value::F32(x) => x.to_bits() == 0,
        Value::F64(x) => x.to_bits() == 0,
        Value::Str(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::Opaque(_) | Value::Message(_) => false,
    }
}

fn packed_encoding(v: &Value) -> bool {
    !matches!(
        v,
        Value::Str(_) | Value::Bytes(_) | Value::Opaque(_) | Value::Message(_)
    )
}

/// Key plus value for one field occurrence.
fn encode_value(number: u32, v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Bool(_) | Value::U32(_) | Value::U64(_) | Value::I32(_) | Value::I64(_) => {
            wire::encode_key(number, WireType::Varint, out);
            encode_scalar(v, out);
        }
        Value::F32(_) => {
            wire::encode_key(number, WireType::Fixed32, out);
            encode_scalar(v, out);
        }
        Value::F64(_) => {
            wire::encode_key(number, WireType::Fixed64, out);
            encode_scalar(v, out);
        }
        Value::Str(s) => {
            wire::encode_key(number, WireType::LengthDelimited, out);
            wire::encode_varint(s.len() as u64, out);
            out.extend_from_slice(s.as_bytes());
        }
        Value::Bytes(b) | Value::Opaque(b) => {
            wire::encode_key(number, WireType::LengthDelimited, out);
            wire::encode_varint(b.len() as u64, out);
            out.extend_from_slice(b);
        }
        Value::Message(m) => {
            let mut body = Vec::new();
            encode_fields(m, &mut body);
            wire::encode_key(number, WireType::LengthDelimited, out);
            wire::encode_varint(body.len() as u64, out);
            out.extend_from_slice(&body);
        }
    }
}

/// Bare scalar value, no key. Negative integers sign-extend to 64 bits.
fn encode_scalar(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Bool(x) => wire::encode_varint(*x as u64, out),
        Value::U32(x) => wire::encode_varint(*x as u64, out),
        Value::U64(x) => wire::encode_varint(*x, out),
        Value::I32(x) => wire::encode_varint(*x as i64 as u64, out),
        Value::I64(x) => wire::encode_varint(*x as u64, out),
        Value::F32(x) => wire::encode_fixed32(x.to_bits(), out),
        Value::F64(x) => wire::encode_fixed64(x.to_bits(), out),
        Value::Str(_) | Value::Bytes(_) | Value::Opaque(_) | Value::Message(_) => {}
    }
}
