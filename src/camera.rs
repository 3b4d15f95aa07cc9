//! Camera abstraction used to place fireworks in the world.
//!
//! Effects only need four things from a camera: which projection it uses,
//! a way to turn a normalized screen point into a world point, the vertical
//! extent of its frustum (for clamping and size normalization) and its world
//! position. [`ViewCamera`] is a ready-made implementation with the usual GL
//! clip-space conventions.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Projection type of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionKind {
    /// Parallel projection; apparent size is independent of depth.
    Orthographic,
    /// Pinhole projection.
    #[default]
    Perspective,
}

/// What the engine needs from a camera.
pub trait Camera {
    /// Projection type.
    fn projection_kind(&self) -> ProjectionKind;

    /// Convert a point in normalized device coordinates (x, y in -1..1, z in
    /// -1..1) to world space.
    fn unproject(&self, ndc: Vec3) -> Vec3;

    /// `(top, bottom)` of the frustum, relative to the camera's vertical
    /// position.
    fn frustum_vertical_extent(&self) -> (f32, f32);

    /// Camera position in world space.
    fn position(&self) -> Vec3;

    /// React to a viewport change. Hosts that manage their own camera can
    /// ignore this.
    fn set_viewport(&mut self, _width: f32, _height: f32, _frustum_size: f32) {}
}

/// Vertical field of view of perspective cameras, in degrees.
pub const PERSPECTIVE_FOV_DEGREES: f32 = 75.0;

/// Simple look-at camera with either projection.
#[derive(Debug, Clone)]
pub struct ViewCamera {
    kind: ProjectionKind,
    /// Camera position.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    width: f32,
    height: f32,
    frustum_size: f32,
    near: f32,
    far: f32,
}

impl ViewCamera {
    /// Orthographic camera whose frustum is `frustum_size` world units tall.
    pub fn orthographic(width: f32, height: f32, frustum_size: f32) -> Self {
        Self {
            kind: ProjectionKind::Orthographic,
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            width,
            height,
            frustum_size,
            near: 0.5,
            far: 1000.0,
        }
    }

    /// Perspective camera with a 75 degree vertical field of view.
    pub fn perspective(width: f32, height: f32) -> Self {
        Self {
            kind: ProjectionKind::Perspective,
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            width,
            height,
            frustum_size: 0.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Camera of the given kind.
    pub fn new(kind: ProjectionKind, width: f32, height: f32, frustum_size: f32) -> Self {
        match kind {
            ProjectionKind::Orthographic => Self::orthographic(width, height, frustum_size),
            ProjectionKind::Perspective => Self {
                frustum_size,
                ..Self::perspective(width, height)
            },
        }
    }

    /// Place the camera.
    pub fn with_eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    /// Width over height, falling back to 1 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Orthographic frustum height (unused by perspective cameras).
    pub fn frustum_size(&self) -> f32 {
        self.frustum_size
    }

    /// View matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Projection matrix (GL clip space).
    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect();
        match self.kind {
            ProjectionKind::Orthographic => {
                let half_h = self.frustum_size * 0.5;
                let half_w = half_h * aspect;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
            ProjectionKind::Perspective => Mat4::perspective_rh_gl(
                PERSPECTIVE_FOV_DEGREES.to_radians(),
                aspect,
                self.near,
                self.far,
            ),
        }
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Camera for ViewCamera {
    fn projection_kind(&self) -> ProjectionKind {
        self.kind
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection().inverse().project_point3(ndc)
    }

    fn frustum_vertical_extent(&self) -> (f32, f32) {
        let half = match self.kind {
            ProjectionKind::Orthographic => self.frustum_size * 0.5,
            ProjectionKind::Perspective => {
                let distance = self.eye.distance(self.target);
                distance * (PERSPECTIVE_FOV_DEGREES.to_radians() * 0.5).tan()
            }
        };
        (half, -half)
    }

    fn position(&self) -> Vec3 {
        self.eye
    }

    fn set_viewport(&mut self, width: f32, height: f32, frustum_size: f32) {
        self.width = width;
        self.height = height;
        if self.kind == ProjectionKind::Orthographic {
            self.frustum_size = frustum_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_orthographic_unproject_corners() {
        let cam = ViewCamera::orthographic(200.0, 100.0, 10.0);
        let p = cam.unproject(Vec3::new(1.0, 1.0, 0.0));
        assert!((p.x - 10.0).abs() < 1e-3);
        assert!((p.y - 5.0).abs() < 1e-3);

        let c = cam.unproject(Vec3::ZERO);
        assert!(c.x.abs() < 1e-3 && c.y.abs() < 1e-3);
    }

    #[test]
    fn test_perspective_center_ray_points_forward() {
        let cam = ViewCamera::perspective(800.0, 600.0);
        let p = cam.unproject(Vec3::ZERO);
        let dir = (p - cam.position()).normalize();
        assert!(close(dir, Vec3::NEG_Z));
    }

    #[test]
    fn test_frustum_extent_follows_resize() {
        let mut cam = ViewCamera::orthographic(100.0, 100.0, 10.0);
        assert_eq!(cam.frustum_vertical_extent(), (5.0, -5.0));

        cam.set_viewport(300.0, 100.0, 20.0);
        assert_eq!(cam.frustum_vertical_extent(), (10.0, -10.0));
        assert_eq!(cam.aspect(), 3.0);
    }

    #[test]
    fn test_degenerate_viewport_aspect() {
        let cam = ViewCamera::perspective(100.0, 0.0);
        assert_eq!(cam.aspect(), 1.0);
    }
}
