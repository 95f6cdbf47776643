//! # sumwire — Sum Protocol Message Types and Wire Codec
//!
//! Message layer for the sum protocol: a proto3-subset schema parser, a
//! descriptor pool, a schema-driven wire codec (varint keys, little-endian
//! fixed 32/64, length-delimited payloads), validated dynamic messages, the
//! typed [`CallResponse`], and delimited frame handling (multiple messages
//! per buffer, removal of undecodable bodies).
//!
//! ## Schema subset
//!
//! - `syntax = "proto3"`, `package`, `import` (recorded, never loaded)
//! - `message` with scalar fields (`double`, `float`, `int32`, `int64`,
//!   `uint32`, `uint64`, `bool`, `string`, `bytes`), message-type
//!   references, `repeated`/`optional` labels, and `reserved` statements
//! - Message references that resolve to nothing stay **external**: their
//!   payloads are carried as opaque bytes and re-encoded verbatim
//!
//! ## Example schema
//!
//! ```text
//! syntax = "proto3";
//!
//! package sum;
//!
//! message CallResponse {
//!     bool success = 1;
//!     string msg = 2;
//!     Data data = 3;
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use sumwire::CallResponse;
//!
//! let mut resp = CallResponse::new();
//! resp.set_success(true).set_msg("ok");
//! let bytes = resp.encode();
//! assert_eq!(CallResponse::decode(&bytes).unwrap(), resp);
//! ```
//!
//! See `tests/integration.rs` for schema-driven (dynamic) usage and frames.

pub mod codec;
pub mod descriptor;
pub mod dump;
pub mod frame;
pub mod lint;
pub mod message;
pub mod parser;
pub mod value;
pub mod wire;

pub use codec::{Codec, CodecError};
pub use descriptor::{
    sum_descriptors, DescriptorPool, FieldDescriptor, FieldKind, MessageDescriptor, SchemaFile,
};
pub use frame::{decode_frame, encode_frame, FrameDecodeResult};
pub use message::{CallResponse, Data};
pub use parser::parse;
pub use value::{FieldError, MessageValue, Value};
pub use wire::{WireType, WireWalker};
