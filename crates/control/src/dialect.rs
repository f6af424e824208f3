//! Per-generation wire dialect
//!
//! # Purpose
//! Bundles the shared helpers a generation is composed from: how strings travel,
//! how record fields are named, and how avatar textures are encoded. Adapters read
//! these instead of re-implementing whole operations per generation.

use mctl_core::Generation;
use mctl_protocol::{StringEncoding, StructureTranslator, TextureFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub generation: Generation,
    pub strings: StringEncoding,
    pub names: StructureTranslator,
    pub texture: TextureFormat,
}

impl Dialect {
    pub fn for_generation(generation: Generation) -> Self {
        match generation {
            Generation::Legacy => Self {
                generation,
                strings: StringEncoding::Utf8Bytes,
                names: StructureTranslator::LEGACY,
                texture: TextureFormat::LegacyRaw,
            },
            Generation::Murmur120 => Self {
                generation,
                strings: StringEncoding::Utf8Bytes,
                names: StructureTranslator::IDENTITY,
                texture: TextureFormat::LegacyRaw,
            },
            Generation::Murmur122 => Self {
                generation,
                strings: StringEncoding::Utf8Bytes,
                names: StructureTranslator::IDENTITY,
                texture: TextureFormat::Png,
            },
            Generation::Murmur123 => Self {
                generation,
                strings: StringEncoding::Utf8Bytes,
                names: StructureTranslator::IDENTITY,
                texture: TextureFormat::Opaque,
            },
            Generation::MumbleServer => Self {
                generation,
                strings: StringEncoding::Native,
                names: StructureTranslator::IDENTITY,
                texture: TextureFormat::Opaque,
            },
        }
    }
}
