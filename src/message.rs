//! Typed messages: [`CallResponse`] and the externally defined [`Data`]
//! payload it may carry.
//!
//! `CallResponse` is a plain value holder over the `sum.CallResponse` schema
//! entry (fields `success = 1`, `msg = 2`, `data = 3`). Field numbers are
//! wire identifiers and must never be reassigned. Encoding and decoding go
//! through the schema-driven [codec](crate::codec), not per-field code.

use crate::codec::{Codec, CodecError};
use crate::descriptor::{sum_descriptors, MessageDescriptor};
use crate::value::{FieldError, MessageValue, Value};
use crate::wire;
use std::sync::{Arc, OnceLock};

fn sum_codec() -> &'static Codec {
    static CODEC: OnceLock<Codec> = OnceLock::new();
    CODEC.get_or_init(Codec::for_sum)
}

fn call_response_desc() -> Arc<MessageDescriptor> {
    sum_descriptors()
        .get("sum.CallResponse")
        .expect("sum.CallResponse in embedded schema")
}

/// Encoded payload of the externally defined `sum.Data` message.
///
/// The schema that defines `Data` lives with the payload producer, so the
/// bytes are held verbatim and round-trip exactly. Construction checks only
/// the wire framing (keys and length prefixes), never field contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Data {
    bytes: Vec<u8>,
}

impl Data {
    /// Wrap an encoded payload, rejecting structurally malformed bytes.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Data, CodecError> {
        wire::validate(&bytes)?;
        Ok(Data { bytes })
    }

    pub fn as_encoded(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_encoded(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Response to an oracle call: a success flag, a status or error message,
/// and an optional result payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallResponse {
    success: bool,
    msg: String,
    data: Option<Data>,
}

impl CallResponse {
    /// All fields at their defaults: `success == false`, `msg == ""`,
    /// `data` absent.
    pub fn new() -> CallResponse {
        CallResponse::default()
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn set_success(&mut self, success: bool) -> &mut Self {
        self.success = success;
        self
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub fn set_msg(&mut self, msg: impl Into<String>) -> &mut Self {
        self.msg = msg.into();
        self
    }

    /// Assign `msg` from raw bytes. Non-UTF-8 input is rejected with
    /// [`FieldError::InvalidEncoding`] and the prior value stays in place.
    pub fn set_msg_bytes(&mut self, bytes: Vec<u8>) -> Result<&mut Self, FieldError> {
        match String::from_utf8(bytes) {
            Ok(s) => {
                self.msg = s;
                Ok(self)
            }
            Err(e) => Err(FieldError::InvalidEncoding {
                field: "msg".to_string(),
                valid_up_to: e.utf8_error().valid_up_to(),
            }),
        }
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Replace (never merge) the payload; `None` returns the field to the
    /// absent state.
    pub fn set_data(&mut self, data: Option<Data>) -> &mut Self {
        self.data = data;
        self
    }

    pub fn take_data(&mut self) -> Option<Data> {
        self.data.take()
    }

    /// Canonical wire bytes. Always succeeds: invalid states are rejected at
    /// assignment time, so every instance is encodable.
    pub fn encode(&self) -> Vec<u8> {
        sum_codec().encode_message(&self.to_value())
    }

    /// Decode from wire bytes; a malformed buffer never yields a partially
    /// populated response.
    pub fn decode(bytes: &[u8]) -> Result<CallResponse, CodecError> {
        let value = sum_codec().decode_message("sum.CallResponse", bytes)?;
        Ok(CallResponse::from_value(&value))
    }

    /// View as a dynamic message (for dumps or generic handling).
    pub fn to_value(&self) -> MessageValue {
        let mut value = MessageValue::new(call_response_desc());
        if self.success {
            value.set_decoded(1, Value::Bool(true));
        }
        if !self.msg.is_empty() {
            value.set_decoded(2, Value::Str(self.msg.clone()));
        }
        if let Some(data) = &self.data {
            value.set_decoded(3, Value::Opaque(data.bytes.clone()));
        }
        value
    }

    /// Read the typed fields out of a dynamic message. Fields that are
    /// absent, or that belong to some other message shape, read as defaults.
    pub fn from_value(value: &MessageValue) -> CallResponse {
        let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
        let msg = value
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = value
            .get("data")
            .and_then(Value::as_opaque)
            .map(|b| Data { bytes: b.to_vec() });
        CallResponse { success, msg, data }
    }
}
