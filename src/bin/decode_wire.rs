//! Decode a file of wire-format messages and dump them as text.
//!
//! Usage:
//!   decode_wire [OPTIONS] WIRE_FILE [SCHEMA.proto]
//!
//! The file is treated as a delimited frame (varint length prefix per
//! message). Without a schema argument the embedded sum schema is used.
//!
//! Options:
//!   --message=NAME  message type to decode (default sum.CallResponse)
//!   --single, -s    the file holds one raw message body, no length prefix
//!   --raw, -r       schema-less structural dump (field numbers, wire types)

use std::path::PathBuf;
use sumwire::dump::{dump_wire, message_to_dump};
use sumwire::{decode_frame, parse, Codec, DescriptorPool};

fn hex_block(bytes: &[u8]) -> String {
    const COLS: usize = 16;
    bytes
        .chunks(COLS)
        .enumerate()
        .map(|(i, chunk)| {
            let line = chunk
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            format!("  offset {:3}: {}", i * COLS, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> anyhow::Result<()> {
    let mut raw_args: Vec<String> = std::env::args().skip(1).collect();
    let single = if let Some(pos) = raw_args.iter().position(|a| a == "--single" || a == "-s") {
        raw_args.remove(pos);
        true
    } else {
        false
    };
    let raw = if let Some(pos) = raw_args.iter().position(|a| a == "--raw" || a == "-r") {
        raw_args.remove(pos);
        true
    } else {
        false
    };
    let message_name: String = raw_args
        .iter()
        .position(|a| a.starts_with("--message="))
        .map(|pos| {
            let arg = raw_args.remove(pos);
            arg["--message=".len()..].to_string()
        })
        .unwrap_or_else(|| "sum.CallResponse".to_string());

    let mut args = raw_args.into_iter();
    let wire_path: PathBuf = match args.next() {
        Some(p) => PathBuf::from(p),
        None => anyhow::bail!("usage: decode_wire [OPTIONS] WIRE_FILE [SCHEMA.proto]"),
    };
    let schema_path: Option<PathBuf> = args.next().map(PathBuf::from);

    let bytes = std::fs::read(&wire_path)?;

    if raw {
        println!("{}", dump_wire(&bytes, 0));
        return Ok(());
    }

    let codec = match &schema_path {
        Some(p) => {
            let src = std::fs::read_to_string(p)?;
            let schema = parse(&src).map_err(|e| anyhow::anyhow!(e))?;
            Codec::new(DescriptorPool::resolve(schema).map_err(|e| anyhow::anyhow!(e))?)
        }
        None => Codec::for_sum(),
    };

    let mut decoded = 0u64;
    let mut removed = 0u64;

    if single {
        match codec.decode_message(&message_name, &bytes) {
            Ok(value) => {
                decoded += 1;
                println!("{}", message_to_dump(&value, 0));
            }
            Err(e) => {
                removed += 1;
                println!("decode error: {}", e);
                println!("{}", hex_block(&bytes));
            }
        }
    } else {
        let result = decode_frame(&codec, &message_name, &bytes)
            .map_err(|e| anyhow::anyhow!("frame error: {}", e))?;
        for (i, msg) in result.messages.iter().enumerate() {
            let (a, b) = msg.byte_range;
            println!("=== message {}  bytes [{}-{}] ===", i, a, b);
            println!("{}", message_to_dump(&msg.value, 0));
        }
        for rm in &result.removed {
            let (a, b) = rm.byte_range;
            println!("=== bytes [{}-{}]  REMOVED: {} ===", a, b, rm.reason);
            println!("{}", hex_block(&bytes[a..b]));
        }
        decoded = result.messages.len() as u64;
        removed = result.removed.len() as u64;
    }

    eprintln!("file:    {}", wire_path.display());
    eprintln!(
        "schema:  {}",
        schema_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<embedded sum.proto>".to_string())
    );
    eprintln!("message: {}", message_name);
    eprintln!("decoded: {}", decoded);
    eprintln!("removed: {}", removed);

    if removed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
