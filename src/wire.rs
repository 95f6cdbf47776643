//! Low-level wire format: varints, field keys, fixed-width scalars, skipping.
//!
//! This module provides **structure-only** access to encoded bytes: reads
//! advance a byte position without building decoded values beyond the scalar
//! at hand. [`WireWalker`] iterates the fields of one encoded message
//! zero-copy, which is enough for structural [`validate`], for dumping
//! payloads whose schema is unknown, and for measuring extent. Full decode
//! into values lives in the [codec](crate::codec).

use crate::codec::CodecError;
use crate::descriptor::MAX_FIELD_NUMBER;
use byteorder::{ByteOrder, LittleEndian};

/// Longest encoding of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Wire type of an encoded field, from the low three bits of its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    pub fn from_id(id: u8) -> Result<WireType, CodecError> {
        match id {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(CodecError::InvalidWireType(other)),
        }
    }

    pub fn id(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32 => 5,
        }
    }
}

/// Decode a base-128 varint at `pos`, advancing it past the last byte.
pub fn decode_varint(buf: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let b = *buf.get(*pos + i).ok_or(CodecError::TruncatedVarint)?;
        // The tenth byte may only carry the final bit of a 64-bit value.
        if i == MAX_VARINT_LEN - 1 && b > 1 {
            return Err(CodecError::VarintOverflow);
        }
        value |= ((b & 0x7f) as u64) << (7 * i);
        if b & 0x80 == 0 {
            *pos += i + 1;
            return Ok(value);
        }
    }
    Err(CodecError::VarintOverflow)
}

pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let b = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(b);
            return;
        }
        out.push(b | 0x80);
    }
}

/// Decode a field key into (field number, wire type).
pub fn decode_key(buf: &[u8], pos: &mut usize) -> Result<(u32, WireType), CodecError> {
    let key = decode_varint(buf, pos)?;
    let wire_type = WireType::from_id((key & 0x7) as u8)?;
    let number = key >> 3;
    if number == 0 {
        return Err(CodecError::ZeroFieldNumber);
    }
    if number > MAX_FIELD_NUMBER as u64 {
        return Err(CodecError::FieldNumberRange(number));
    }
    Ok((number as u32, wire_type))
}

pub fn encode_key(number: u32, wire_type: WireType, out: &mut Vec<u8>) {
    encode_varint(((number as u64) << 3) | wire_type.id() as u64, out);
}

pub fn decode_fixed32(buf: &[u8], pos: &mut usize) -> Result<u32, CodecError> {
    let remaining = buf.len().saturating_sub(*pos);
    if remaining < 4 {
        return Err(CodecError::Truncated { needed: 4 - remaining });
    }
    let v = LittleEndian::read_u32(&buf[*pos..*pos + 4]);
    *pos += 4;
    Ok(v)
}

pub fn decode_fixed64(buf: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    let remaining = buf.len().saturating_sub(*pos);
    if remaining < 8 {
        return Err(CodecError::Truncated { needed: 8 - remaining });
    }
    let v = LittleEndian::read_u64(&buf[*pos..*pos + 8]);
    *pos += 8;
    Ok(v)
}

pub fn encode_fixed32(value: u32, out: &mut Vec<u8>) {
    let mut b = [0u8; 4];
    LittleEndian::write_u32(&mut b, value);
    out.extend_from_slice(&b);
}

pub fn encode_fixed64(value: u64, out: &mut Vec<u8>) {
    let mut b = [0u8; 8];
    LittleEndian::write_u64(&mut b, value);
    out.extend_from_slice(&b);
}

/// Decode a length prefix and return the payload slice it covers.
pub fn decode_len_prefixed<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8], CodecError> {
    let length = decode_varint(buf, pos)?;
    let remaining = buf.len() - *pos;
    if length > remaining as u64 {
        return Err(CodecError::LengthOverrun { length, remaining });
    }
    let start = *pos;
    *pos += length as usize;
    Ok(&buf[start..*pos])
}

/// Skip one field value of the given wire type.
pub fn skip_field(buf: &[u8], pos: &mut usize, wire_type: WireType) -> Result<(), CodecError> {
    match wire_type {
        WireType::Varint => {
            decode_varint(buf, pos)?;
        }
        WireType::Fixed64 => {
            decode_fixed64(buf, pos)?;
        }
        WireType::Fixed32 => {
            decode_fixed32(buf, pos)?;
        }
        WireType::LengthDelimited => {
            decode_len_prefixed(buf, pos)?;
        }
    }
    Ok(())
}

/// One field as it appears on the wire, without schema interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawField<'a> {
    pub number: u32,
    pub wire_type: WireType,
    pub value: RawValue<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(&'a [u8]),
}

/// Zero-copy iteration over the fields of one encoded message.
pub struct WireWalker<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WireWalker { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Next field, or `None` at end of buffer.
    pub fn next_field(&mut self) -> Result<Option<RawField<'a>>, CodecError> {
        if self.pos == self.data.len() {
            return Ok(None);
        }
        let (number, wire_type) = decode_key(self.data, &mut self.pos)?;
        let value = match wire_type {
            WireType::Varint => RawValue::Varint(decode_varint(self.data, &mut self.pos)?),
            WireType::Fixed32 => RawValue::Fixed32(decode_fixed32(self.data, &mut self.pos)?),
            WireType::Fixed64 => RawValue::Fixed64(decode_fixed64(self.data, &mut self.pos)?),
            WireType::LengthDelimited => {
                RawValue::Bytes(decode_len_prefixed(self.data, &mut self.pos)?)
            }
        };
        Ok(Some(RawField {
            number,
            wire_type,
            value,
        }))
    }
}

/// Structural check of one encoded message: every key and length prefix is
/// well formed. Field contents are not interpreted.
pub fn validate(data: &[u8]) -> Result<(), CodecError> {
    let mut walker = WireWalker::new(data);
    while walker.next_field()?.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_round_trip() {
        for v in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            let mut out = Vec::new();
            encode_varint(v, &mut out);
            let mut pos = 0;
            assert_eq!(decode_varint(&out, &mut pos).expect("decode"), v);
            assert_eq!(pos, out.len());
        }
    }

    #[test]
    fn varint_truncated() {
        let mut pos = 0;
        assert!(matches!(
            decode_varint(&[0x80], &mut pos),
            Err(CodecError::TruncatedVarint)
        ));
    }

    #[test]
    fn varint_overflow() {
        // eleven continuation bytes
        let buf = [0xff; 11];
        let mut pos = 0;
        assert!(matches!(
            decode_varint(&buf, &mut pos),
            Err(CodecError::VarintOverflow)
        ));
        // ten bytes, but the last one carries more than the final bit
        let buf = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        let mut pos = 0;
        assert!(matches!(
            decode_varint(&buf, &mut pos),
            Err(CodecError::VarintOverflow)
        ));
    }

    #[test]
    fn key_rejects_zero_field_number() {
        let mut pos = 0;
        assert!(matches!(
            decode_key(&[0x00], &mut pos),
            Err(CodecError::ZeroFieldNumber)
        ));
    }

    #[test]
    fn walker_sees_all_fields() {
        let mut buf = Vec::new();
        encode_key(1, WireType::Varint, &mut buf);
        encode_varint(1, &mut buf);
        encode_key(2, WireType::LengthDelimited, &mut buf);
        encode_varint(2, &mut buf);
        buf.extend_from_slice(b"ok");

        let mut walker = WireWalker::new(&buf);
        let first = walker.next_field().expect("walk").expect("field");
        assert_eq!(first.number, 1);
        assert_eq!(first.value, RawValue::Varint(1));
        let second = walker.next_field().expect("walk").expect("field");
        assert_eq!(second.number, 2);
        assert_eq!(second.value, RawValue::Bytes(b"ok"));
        assert!(walker.next_field().expect("walk").is_none());
    }

    #[test]
    fn validate_rejects_overrun() {
        // field 2, length-delimited, claims 5 bytes but carries 2
        let buf = [0x12, 0x05, b'o', b'k'];
        assert!(matches!(
            validate(&buf),
            Err(CodecError::LengthOverrun { .. })
        ));
    }
}
