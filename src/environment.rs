//! Viewport-dependent parameters.
//!
//! An [`Environment`] is rebuilt by
//! [`EffectScheduler::on_resize`](crate::EffectScheduler::on_resize) and read
//! once by every effect when it spawns. Effects already in flight keep the
//! values they were born with.

use glam::Vec3;

use crate::camera::ProjectionKind;
use crate::config::FireworksConfig;
use crate::pattern::FrustumNormalization;

/// Default burst point size with an orthographic camera (pixels).
pub const ORTHOGRAPHIC_POINT_SIZE: f32 = 14.0;
/// Default burst point size with a perspective camera (world units).
pub const PERSPECTIVE_POINT_SIZE: f32 = 0.3;

/// Snapshot of the viewport and the effect scales derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
    /// Width over height (1 for a degenerate viewport).
    pub aspect: f32,
    /// Orthographic frustum height.
    pub frustum_size: f32,
    /// Camera projection.
    pub projection: ProjectionKind,
    /// Base launch family particle speed.
    pub speed: f32,
    /// Default point size for bursts without an explicit size.
    pub particle_size: f32,
    /// Burst radius scale for the current zoom.
    pub normalization: FrustumNormalization,
    /// Scale of the rising sprite.
    pub sprite_scale: Vec3,
}

impl Environment {
    /// Derive all parameters for a viewport seen through a camera with the
    /// given projection.
    pub fn from_viewport(
        width: f32,
        height: f32,
        frustum_size: f32,
        projection: ProjectionKind,
        config: &FireworksConfig,
    ) -> Self {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        let normalization =
            FrustumNormalization::new(projection, frustum_size, config.reference_frustum);
        let (particle_size, sprite_scale) = match projection {
            ProjectionKind::Orthographic => {
                let s = normalization.apply(0.1);
                (ORTHOGRAPHIC_POINT_SIZE, Vec3::new(s, s, 0.5))
            }
            ProjectionKind::Perspective => (PERSPECTIVE_POINT_SIZE, Vec3::new(0.2, 0.3, 0.0)),
        };

        Self {
            width,
            height,
            aspect,
            frustum_size,
            projection,
            speed: frustum_size * config.speed_factor,
            particle_size,
            normalization,
            sprite_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthographic_parameters() {
        let config = FireworksConfig::new();
        let env =
            Environment::from_viewport(1600.0, 800.0, 20.0, ProjectionKind::Orthographic, &config);

        assert_eq!(env.aspect, 2.0);
        assert!((env.speed - 0.08).abs() < 1e-6);
        assert_eq!(env.normalization.ratio(), 2.0);
        assert_eq!(env.particle_size, ORTHOGRAPHIC_POINT_SIZE);
        assert!((env.sprite_scale.x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_perspective_is_not_normalized() {
        let config = FireworksConfig::new();
        let env =
            Environment::from_viewport(800.0, 600.0, 40.0, ProjectionKind::Perspective, &config);
        assert_eq!(env.normalization, FrustumNormalization::NONE);
        assert_eq!(env.particle_size, PERSPECTIVE_POINT_SIZE);
    }

    #[test]
    fn test_projection_comes_from_caller_not_config() {
        // Config says perspective, the camera is orthographic.
        let config = FireworksConfig::new();
        let env =
            Environment::from_viewport(800.0, 600.0, 20.0, ProjectionKind::Orthographic, &config);
        assert_eq!(env.projection, ProjectionKind::Orthographic);
        assert_eq!(env.normalization.ratio(), 2.0);
    }

    #[test]
    fn test_zero_height_viewport() {
        let config = FireworksConfig::new();
        let env =
            Environment::from_viewport(800.0, 0.0, 10.0, ProjectionKind::Perspective, &config);
        assert_eq!(env.aspect, 1.0);
    }
}
