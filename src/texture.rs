//! The shared particle texture.
//!
//! Every sprite and point cloud samples the same pre-decoded alpha map. The
//! engine never loads it on its own: the host builds a [`TextureHandle`] once
//! (from a file, raw RGBA, or the procedural [`TextureHandle::soft_disc`]) and
//! hands clones to the scheduler. Clones share the pixel data.
//!
//! # Example
//!
//! ```ignore
//! let texture = TextureHandle::from_file("textures/particles/8.png")?;
//! let scheduler = EffectScheduler::new(scene, camera, texture, config);
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::error::TextureError;

#[derive(Debug)]
struct TextureData {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

/// Opaque, immutable, reference-counted RGBA texture.
#[derive(Debug, Clone)]
pub struct TextureHandle {
    data: Arc<TextureData>,
}

impl TextureHandle {
    /// Wrap raw RGBA pixel data (4 bytes per pixel).
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            data: Arc::new(TextureData {
                pixels,
                width,
                height,
            }),
        })
    }

    /// Decode an image file (PNG or JPEG) into a texture.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        let img = image::load_from_memory(&bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        log::debug!(
            "Loaded particle texture {} ({}x{})",
            path.as_ref().display(),
            width,
            height
        );
        Self::from_rgba(img.into_raw(), width, height)
    }

    /// White disc with a radial alpha falloff, used when no sprite image is
    /// available.
    pub fn soft_disc(size: u32) -> Self {
        let size = size.max(1);
        let center = (size as f32 - 1.0) * 0.5;
        let radius = (size as f32 * 0.5).max(f32::EPSILON);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let d = (dx * dx + dy * dy).sqrt() / radius;
                let alpha = (1.0 - d).clamp(0.0, 1.0);
                pixels.extend_from_slice(&[255, 255, 255, (alpha * alpha * 255.0).round() as u8]);
            }
        }
        Self {
            data: Arc::new(TextureData {
                pixels,
                width: size,
                height: size,
            }),
        }
    }

    /// Texture width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.data.width
    }

    /// Texture height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.data.height
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.data.pixels
    }

    /// Whether two handles share the same pixel data.
    #[inline]
    pub fn ptr_eq(&self, other: &TextureHandle) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}
