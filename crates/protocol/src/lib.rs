//! # MCTL Protocol Library
//!
//! Wire-level building blocks shared by every protocol generation of the managed
//! voice server's remote-control interface.
//!
//! ## Architecture
//!
//! ### 1. Wire values ([`wire`])
//! Self-describing value tree that arguments and results cross the transport as.
//!
//! ### 2. Transport seam ([`proxy`])
//! The [`Proxy`] trait a transport implements: a liveness ping and a blocking
//! `invoke(target, op, args)`.
//!
//! ### 3. Operation names ([`ops`])
//! Every remote operation, with the exact spelling each generation declares.
//!
//! ### 4. Encoding ([`encoding`])
//! Byte-string to text normalization for generations before 1.5.
//!
//! ### 5. Field renaming ([`translate`])
//! `playerid` / `userid` renaming between 1.1.8 records and the uniform shape.
//!
//! ### 6. Textures ([`texture`])
//! Legacy zlib/BGRA, PNG and opaque avatar codecs.
//!
//! ## Version Support
//!
//! - **1.1.8**: byte strings, `playerid` records, legacy raw textures
//! - **1.2.0 - 1.4.x**: byte strings, `userid` records, legacy/PNG/opaque textures
//! - **1.5+**: text-native, opaque textures

pub mod encoding;
pub mod ops;
pub mod proxy;
pub mod texture;
pub mod translate;
pub mod wire;

// Re-export commonly used items
pub use encoding::{normalize, StringEncoding};
pub use ops::{Op, UserInfo};
pub use proxy::{CallError, Proxy, Target, SERVER_BOOTED_EXCEPTION};
pub use texture::TextureFormat;
pub use translate::{RecordKind, StructureTranslator};
pub use wire::{Fields, Record, WireValue};
