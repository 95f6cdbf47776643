//! Delimited frame handling: streams holding one or more length-prefixed
//! messages.
//!
//! Each message body is preceded by its byte length as a varint. The prefix
//! gives the extent of every body up front, so a body that fails to decode
//! is removed (reported with its byte range and reason) while decoding
//! continues at the next prefix. A malformed prefix itself is a hard error:
//! without it the stream cannot be resynchronized.

use crate::codec::{Codec, CodecError};
use crate::value::MessageValue;
use crate::wire;

/// Result of decoding a frame: decoded messages and removed (undecodable)
/// bodies.
#[derive(Debug)]
pub struct FrameDecodeResult {
    pub messages: Vec<DecodedMessage>,
    pub removed: Vec<RemovedMessage>,
}

#[derive(Debug)]
pub struct DecodedMessage {
    pub value: MessageValue,
    /// Byte range of the message body within the frame (prefix excluded).
    pub byte_range: (usize, usize),
}

#[derive(Debug)]
pub struct RemovedMessage {
    pub byte_range: (usize, usize),
    pub reason: String,
}

/// Append one length-prefixed message to `out`.
pub fn encode_delimited(codec: &Codec, msg: &MessageValue, out: &mut Vec<u8>) {
    let body = codec.encode_message(msg);
    wire::encode_varint(body.len() as u64, out);
    out.extend_from_slice(&body);
}

/// Encode a whole frame of length-prefixed messages.
pub fn encode_frame(codec: &Codec, messages: &[MessageValue]) -> Vec<u8> {
    let mut out = Vec::new();
    for msg in messages {
        encode_delimited(codec, msg, &mut out);
    }
    out
}

/// Decode a frame of length-prefixed `message_name` messages.
pub fn decode_frame(
    codec: &Codec,
    message_name: &str,
    bytes: &[u8],
) -> Result<FrameDecodeResult, CodecError> {
    let mut messages = Vec::new();
    let mut removed = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let body = wire::decode_len_prefixed(bytes, &mut pos)?;
        let byte_range = (pos - body.len(), pos);
        match codec.decode_message(message_name, body) {
            Ok(value) => messages.push(DecodedMessage { value, byte_range }),
            Err(e) => removed.push(RemovedMessage {
                byte_range,
                reason: e.to_string(),
            }),
        }
    }

    Ok(FrameDecodeResult { messages, removed })
}
