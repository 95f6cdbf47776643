//! Format decoded messages and raw wire bytes for display.

use crate::value::{MessageValue, Value};
use crate::wire::{RawValue, WireWalker};

fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// Multi-line dump of a decoded message.
pub fn message_to_dump(msg: &MessageValue, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let mut lines = vec![format!("{}{} {{", pad, msg.descriptor().full_name())];
    for f in msg.descriptor().fields() {
        if f.repeated {
            let items = msg.get_repeated(&f.name).unwrap_or(&[]);
            if items.is_empty() {
                continue;
            }
            lines.push(format!("{}  {}: [", pad, f.name));
            for (i, item) in items.iter().enumerate() {
                let sub = value_to_dump(item, indent + 2);
                lines.push(format!("{}    [{}] {}", pad, i, sub.trim_start()));
            }
            lines.push(format!("{}  ]", pad));
        } else if let Some(v) = msg.get(&f.name) {
            let sub = value_to_dump(v, indent + 1);
            lines.push(format!("{}  {}: {}", pad, f.name, sub.trim_start()));
        }
    }
    lines.push(format!("{}}}", pad));
    lines.join("\n")
}

/// Dump of a single value (one line for scalars, multi-line for nested).
pub fn value_to_dump(v: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match v {
        Value::Bool(x) => format!("{}{}", pad, x),
        Value::U32(x) => format!("{}{}", pad, x),
        Value::U64(x) => format!("{}{}", pad, x),
        Value::I32(x) => format!("{}{}", pad, x),
        Value::I64(x) => format!("{}{}", pad, x),
        Value::F32(x) => format!("{}{}", pad, x),
        Value::F64(x) => format!("{}{}", pad, x),
        Value::Str(s) => format!("{}{:?}", pad, s),
        Value::Bytes(b) => format!("{}hex({})", pad, hex_string(b)),
        Value::Opaque(b) => {
            if b.is_empty() {
                return format!("{}opaque(0 bytes)", pad);
            }
            let mut lines = vec![format!("{}opaque({} bytes) {{", pad, b.len())];
            lines.push(dump_wire(b, indent + 1));
            lines.push(format!("{}}}", pad));
            lines.join("\n")
        }
        Value::Message(m) => message_to_dump(m, indent),
    }
}

/// Field-by-field dump of encoded bytes without a schema: field numbers,
/// wire types, raw values. Stops at the first malformed key or length.
pub fn dump_wire(bytes: &[u8], indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let mut lines = Vec::new();
    let mut walker = WireWalker::new(bytes);
    loop {
        match walker.next_field() {
            Ok(Some(f)) => {
                let rendered = match f.value {
                    RawValue::Varint(v) => format!("varint {}", v),
                    RawValue::Fixed32(v) => format!("fixed32 {}", v),
                    RawValue::Fixed64(v) => format!("fixed64 {}", v),
                    RawValue::Bytes(b) => format!("bytes {}", hex_string(b)),
                };
                lines.push(format!("{}{}: {}", pad, f.number, rendered));
            }
            Ok(None) => break,
            Err(e) => {
                lines.push(format!("{}!malformed at byte {}: {}", pad, walker.position(), e));
                break;
            }
        }
    }
    lines.join("\n")
}
