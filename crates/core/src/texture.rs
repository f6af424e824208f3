//! Avatar texture bitmap

use crate::{CtlError, Result};

/// Width every texture is normalized to before upload
pub const TEXTURE_WIDTH: u32 = 600;

/// Height every texture is normalized to before upload
pub const TEXTURE_HEIGHT: u32 = 60;

/// RGBA bitmap, 4 bytes per pixel, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CtlError::Texture(format!(
                "{}x{} RGBA bitmap needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }

    /// Fully transparent bitmap
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.rgba[at..at + 4]);
        Some(px)
    }

    /// Take the top-left `width` x `height` region, padding with transparent black
    pub fn fit(&self, width: u32, height: u32) -> Texture {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Texture::blank(width, height);
        let copy_w = width.min(self.width) as usize * 4;
        for y in 0..height.min(self.height) as usize {
            let src = y * self.width as usize * 4;
            let dst = y * width as usize * 4;
            out.rgba[dst..dst + copy_w].copy_from_slice(&self.rgba[src..src + copy_w]);
        }
        out
    }

    /// Normalize to the upload size
    pub fn fit_standard(&self) -> Texture {
        self.fit(TEXTURE_WIDTH, TEXTURE_HEIGHT)
    }
}
