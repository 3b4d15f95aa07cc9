//! Material descriptors handed to the scene graph with every drawable.
//!
//! A [`Material`] says how a sprite or point cloud should be blended and
//! sized. It carries a clone of the shared [`TextureHandle`] as its alpha map
//! and is otherwise plain data; the host renderer turns it into whatever
//! pipeline state it needs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::texture::TextureHandle;

/// How particle fragments combine with what is already on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending. Overlapping sparks become brighter.
    Additive,
}

/// Rendering description for one drawable.
#[derive(Debug, Clone)]
pub struct Material {
    /// Alpha map sampled by every particle.
    pub texture: TextureHandle,
    /// Blend mode.
    pub blend: BlendMode,
    /// Initial opacity (0.0 - 1.0).
    pub opacity: f32,
    /// Point size for point clouds. Ignored by billboards.
    pub size: f32,
    /// Shrink points with distance (perspective cameras only).
    pub size_attenuation: bool,
    /// Use the per-particle color buffer.
    pub vertex_colors: bool,
    /// Uniform color multiplied into every particle.
    pub tint: Vec3,
    /// Write to the depth buffer. Always off for fireworks.
    pub depth_write: bool,
}

impl Material {
    /// Billboard material for the rising launch sprite.
    pub fn sprite(texture: TextureHandle) -> Self {
        Self {
            texture,
            blend: BlendMode::Alpha,
            opacity: 1.0,
            size: 1.0,
            size_attenuation: true,
            vertex_colors: false,
            tint: Vec3::ONE,
            depth_write: false,
        }
    }

    /// Point cloud material for a burst.
    pub fn points(texture: TextureHandle, size: f32) -> Self {
        Self {
            texture,
            blend: BlendMode::Alpha,
            opacity: 1.0,
            size,
            size_attenuation: true,
            vertex_colors: true,
            tint: Vec3::ONE,
            depth_write: false,
        }
    }

    /// Set the blend mode.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Set the tint color.
    pub fn with_tint(mut self, tint: Vec3) -> Self {
        self.tint = tint;
        self
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in 0-1) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c * 0.5;
    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 1.0)));
        assert!(close(hsl_to_rgb(60.0, 1.0, 0.5), Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_hsl_wraps_hue() {
        assert!(close(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5)));
    }

    #[test]
    fn test_point_material_defaults() {
        let m = Material::points(TextureHandle::soft_disc(2), 0.3).with_blend(BlendMode::Additive);
        assert_eq!(m.size, 0.3);
        assert!(m.vertex_colors);
        assert!(!m.depth_write);
        assert_eq!(m.blend, BlendMode::Additive);
    }
}
