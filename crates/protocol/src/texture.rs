//! Avatar texture codecs
//!
//! # Formats
//!
//! ## Legacy raw (1.1.8, 1.2.0)
//! zlib-compressed 600x60 bitmap with 32-bit pixels in B,G,R,A byte order.
//! Uploads use the length-prefixed container:
//! ```text
//! [u32 BE: uncompressed length][zlib stream]
//! ```
//! Downloads may arrive with or without the prefix.
//!
//! ## PNG (1.2.2 and later)
//! Standard PNG; uploads are 8-bit RGBA.
//!
//! ## Opaque (1.2.3 and later)
//! The endpoint stores whatever bytes were uploaded. Adapters expose those bytes
//! unchanged through a raw accessor and decode them as PNG for the bitmap accessor.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use mctl_core::{CtlError, Result, Texture, TEXTURE_HEIGHT, TEXTURE_WIDTH};
use std::io::{Read, Write};

/// Size of a legacy raw bitmap in bytes
pub const LEGACY_TEXTURE_BYTES: usize = TEXTURE_WIDTH as usize * TEXTURE_HEIGHT as usize * 4;

/// Texture wire representation used by a protocol generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    LegacyRaw,
    Png,
    Opaque,
}

impl TextureFormat {
    /// Decode a non-empty wire payload into an RGBA bitmap
    pub fn decode(&self, data: &[u8]) -> Result<Texture> {
        match self {
            TextureFormat::LegacyRaw => decode_legacy(data),
            TextureFormat::Png | TextureFormat::Opaque => decode_png(data),
        }
    }

    /// Normalize to 600x60 and encode for upload
    pub fn encode(&self, texture: &Texture) -> Result<Vec<u8>> {
        let fitted = texture.fit_standard();
        match self {
            TextureFormat::LegacyRaw => encode_legacy(&fitted),
            TextureFormat::Png | TextureFormat::Opaque => encode_png(&fitted),
        }
    }

    /// Whether the stored bytes are exposed unmodified
    pub fn has_raw_access(&self) -> bool {
        matches!(self, TextureFormat::Opaque)
    }
}

/// zlib-compress a buffer
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(texture_io)?;
    encoder.finish().map_err(texture_io)
}

/// Inflate a zlib stream
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).map_err(texture_io)?;
    Ok(decompressed)
}

/// Inflate a zlib stream, refusing to produce more than `limit` bytes
pub fn decompress_bounded(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    ZlibDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(texture_io)?;
    if decompressed.len() > limit {
        return Err(CtlError::Texture(format!("zlib stream inflates past {} bytes", limit)));
    }
    Ok(decompressed)
}

fn texture_io(err: std::io::Error) -> CtlError {
    CtlError::Texture(err.to_string())
}

/// Swap bytes 0 and 2 of every 4-byte pixel (BGRA <-> RGBA)
fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

/// Whether `data` starts with a zlib stream header
fn has_zlib_header(data: &[u8]) -> bool {
    if data.len() < 2 {
        return false;
    }
    let header = u16::from_be_bytes([data[0], data[1]]);
    data[0] & 0x0f == 8 && header % 31 == 0
}

/// Encode a 600x60 bitmap into the length-prefixed legacy container
pub fn encode_legacy(texture: &Texture) -> Result<Vec<u8>> {
    if texture.width() != TEXTURE_WIDTH || texture.height() != TEXTURE_HEIGHT {
        return Err(CtlError::Texture(format!(
            "legacy textures are {}x{}, got {}x{}",
            TEXTURE_WIDTH,
            TEXTURE_HEIGHT,
            texture.width(),
            texture.height()
        )));
    }

    let mut bgra = texture.rgba().to_vec();
    swap_red_blue(&mut bgra);

    let compressed = compress(&bgra)?;
    let mut out = Vec::with_capacity(4 + compressed.len());
    out.extend_from_slice(&(bgra.len() as u32).to_be_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode a legacy payload (bare zlib stream or length-prefixed container)
pub fn decode_legacy(data: &[u8]) -> Result<Texture> {
    let (declared, stream) = if has_zlib_header(data) {
        (None, data)
    } else if data.len() > 4 {
        let declared = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        (Some(declared), &data[4..])
    } else {
        return Err(CtlError::Texture(format!(
            "legacy texture payload too short ({} bytes)",
            data.len()
        )));
    };

    tracing::trace!(bytes = data.len(), prefixed = declared.is_some(), "decoding legacy texture");
    let mut pixels = decompress_bounded(stream, LEGACY_TEXTURE_BYTES)?;
    if let Some(declared) = declared {
        if declared != pixels.len() {
            return Err(CtlError::Texture(format!(
                "container declares {} bytes, stream holds {}",
                declared,
                pixels.len()
            )));
        }
    }
    if pixels.len() != LEGACY_TEXTURE_BYTES {
        return Err(CtlError::Texture(format!(
            "legacy texture holds {} bytes, expected {}",
            pixels.len(),
            LEGACY_TEXTURE_BYTES
        )));
    }

    swap_red_blue(&mut pixels);
    Texture::new(TEXTURE_WIDTH, TEXTURE_HEIGHT, pixels)
}

/// Encode a bitmap as 8-bit RGBA PNG
pub fn encode_png(texture: &Texture) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, texture.width(), texture.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| CtlError::Texture(e.to_string()))?;
        writer
            .write_image_data(texture.rgba())
            .map_err(|e| CtlError::Texture(e.to_string()))?;
        writer.finish().map_err(|e| CtlError::Texture(e.to_string()))?;
    }
    Ok(out)
}

/// Decode any PNG into an RGBA bitmap of its native size
pub fn decode_png(data: &[u8]) -> Result<Texture> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| CtlError::Texture(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| CtlError::Texture(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xff])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 0xff]).collect(),
        png::ColorType::Indexed => {
            return Err(CtlError::Texture("palette image was not expanded".into()));
        }
    };
    Texture::new(info.width, info.height, rgba)
}
