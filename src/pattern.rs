//! Burst patterns: per-particle initial velocities.
//!
//! Two families of patterns exist, and both share the tag `"circular"`, so
//! tags are parsed per family.
//!
//! # Launch family
//!
//! Velocities are scaled by the per-particle speed directly.
//!
//! | Pattern | Shape |
//! |---------|-------|
//! | [`Pattern::Circular`] | Uniform directions on the sphere |
//! | [`Pattern::Cone`] | Polar angle below 45 degrees around +Z |
//! | [`Pattern::Cube`] | Each axis uniform in `[-0.5, 0.5] * speed` |
//! | [`Pattern::Ring`] | Flat ring in the XY plane, small Z jitter |
//! | [`Pattern::Star`] | Seven jittered spokes in the XY plane |
//!
//! # Burst family
//!
//! The speed is an explosion radius. When the camera is orthographic the
//! radius follows the zoom level through [`FrustumNormalization`].
//!
//! | Pattern | Shape |
//! |---------|-------|
//! | [`Pattern::Disk`] | Even-area disk (`sqrt(u)` radius) with Z jitter |
//! | [`Pattern::Spherical`] | Random direction, random extent per axis |
//!
//! Unknown tags parse to [`Pattern::Unrecognized`], which yields zero
//! velocity.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::camera::ProjectionKind;

/// Number of spokes in [`Pattern::Star`].
pub const STAR_POINTS: usize = 7;

/// Which set of patterns a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// Velocity-style patterns with direct speed.
    Launch,
    /// Radius-style patterns with frustum normalization.
    Burst,
}

/// Velocity distribution of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Uniform sphere directions (launch family).
    Circular,
    /// 45 degree cone around +Z (launch family).
    Cone,
    /// Axis-aligned box (launch family).
    Cube,
    /// Planar ring (launch family).
    Ring,
    /// Seven-pointed star (launch family).
    Star,
    /// Flat disk; the burst family's `"circular"`.
    Disk,
    /// Filled sphere (burst family).
    Spherical,
    /// Unknown tag. Every particle stays at rest.
    Unrecognized,
}

impl Pattern {
    /// All launch family patterns.
    pub const LAUNCH: [Pattern; 5] = [
        Pattern::Circular,
        Pattern::Cone,
        Pattern::Cube,
        Pattern::Ring,
        Pattern::Star,
    ];

    /// All burst family patterns.
    pub const BURST: [Pattern; 2] = [Pattern::Disk, Pattern::Spherical];

    /// Parse a launch family tag.
    pub fn launch_from_tag(tag: &str) -> Self {
        match tag {
            "circular" => Pattern::Circular,
            "cone" => Pattern::Cone,
            "cube" => Pattern::Cube,
            "ring" => Pattern::Ring,
            "star" => Pattern::Star,
            _ => Pattern::Unrecognized,
        }
    }

    /// Parse a burst family tag.
    pub fn burst_from_tag(tag: &str) -> Self {
        match tag {
            "circular" => Pattern::Disk,
            "spherical" => Pattern::Spherical,
            _ => Pattern::Unrecognized,
        }
    }

    /// Parse a tag in the given family.
    pub fn from_tag(family: PatternFamily, tag: &str) -> Self {
        match family {
            PatternFamily::Launch => Self::launch_from_tag(tag),
            PatternFamily::Burst => Self::burst_from_tag(tag),
        }
    }

    /// Family of this pattern, `None` for [`Pattern::Unrecognized`].
    pub fn family(self) -> Option<PatternFamily> {
        match self {
            Pattern::Circular | Pattern::Cone | Pattern::Cube | Pattern::Ring | Pattern::Star => {
                Some(PatternFamily::Launch)
            }
            Pattern::Disk | Pattern::Spherical => Some(PatternFamily::Burst),
            Pattern::Unrecognized => None,
        }
    }

    /// Pick a pattern of the family uniformly at random.
    pub fn random<R: Rng + ?Sized>(family: PatternFamily, rng: &mut R) -> Self {
        let choices: &[Pattern] = match family {
            PatternFamily::Launch => &Self::LAUNCH,
            PatternFamily::Burst => &Self::BURST,
        };
        choices[rng.gen_range(0..choices.len())]
    }

    /// Largest velocity magnitude the pattern can produce for `speed_scale`
    /// (before normalization).
    ///
    /// Ring and star add an out-of-plane jitter on top of the in-plane speed,
    /// so they can slightly exceed `speed_scale`.
    pub fn max_magnitude(self, speed_scale: f32) -> f32 {
        let s = speed_scale.abs();
        match self {
            Pattern::Circular | Pattern::Cone | Pattern::Disk | Pattern::Spherical => s,
            Pattern::Cube => s * 3f32.sqrt() * 0.5,
            Pattern::Ring => (s * s + 0.25 * 0.25).sqrt(),
            Pattern::Star => s * 1.25f32.sqrt(),
            Pattern::Unrecognized => 0.0,
        }
    }
}

/// Scale applied to burst radii so bursts keep their on-screen size when an
/// orthographic camera zooms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumNormalization {
    ratio: f32,
}

impl FrustumNormalization {
    /// No scaling.
    pub const NONE: FrustumNormalization = FrustumNormalization { ratio: 1.0 };

    /// `current / reference` for orthographic cameras, identity otherwise.
    pub fn new(kind: ProjectionKind, current_frustum: f32, reference_frustum: f32) -> Self {
        match kind {
            ProjectionKind::Orthographic if reference_frustum > 0.0 => Self {
                ratio: current_frustum / reference_frustum,
            },
            _ => Self::NONE,
        }
    }

    /// The scale factor.
    #[inline]
    pub fn ratio(self) -> f32 {
        self.ratio
    }

    /// Scale a length.
    #[inline]
    pub fn apply(self, value: f32) -> f32 {
        value * self.ratio
    }
}

impl Default for FrustumNormalization {
    fn default() -> Self {
        Self::NONE
    }
}

/// Initial velocity of particle `index` for `pattern`.
///
/// `normalization` only affects burst family patterns.
pub fn generate_velocity<R: Rng + ?Sized>(
    pattern: Pattern,
    index: usize,
    speed_scale: f32,
    normalization: FrustumNormalization,
    rng: &mut R,
) -> Vec3 {
    let s = speed_scale;
    match pattern {
        Pattern::Circular => {
            let azimuth = rng.gen::<f32>() * TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
            Vec3::new(
                s * phi.sin() * azimuth.cos(),
                s * phi.sin() * azimuth.sin(),
                s * phi.cos(),
            )
        }
        Pattern::Cone => {
            let azimuth = rng.gen::<f32>() * TAU;
            let theta = rng.gen::<f32>() * PI / 4.0;
            Vec3::new(
                s * theta.sin() * azimuth.cos(),
                s * theta.sin() * azimuth.sin(),
                s * theta.cos(),
            )
        }
        Pattern::Cube => Vec3::new(
            (rng.gen::<f32>() - 0.5) * s,
            (rng.gen::<f32>() - 0.5) * s,
            (rng.gen::<f32>() - 0.5) * s,
        ),
        Pattern::Ring => {
            let azimuth = rng.gen::<f32>() * TAU;
            let height = (rng.gen::<f32>() - 0.5) * 0.5;
            Vec3::new(azimuth.cos() * s, azimuth.sin() * s, height)
        }
        Pattern::Star => {
            let spoke = (index % STAR_POINTS) as f32;
            let jitter = rng.gen::<f32>() * (PI / STAR_POINTS as f32);
            let angle = spoke * TAU / STAR_POINTS as f32 + jitter;
            Vec3::new(angle.cos() * s, angle.sin() * s, (rng.gen::<f32>() - 0.5) * s)
        }
        Pattern::Disk => {
            let angle = rng.gen::<f32>() * TAU;
            let radius = normalization.apply(s * rng.gen::<f32>().sqrt() * 0.5);
            let depth = (rng.gen::<f32>() - 0.5) * normalization.apply(s) * 0.5;
            Vec3::new(radius * angle.cos(), radius * angle.sin(), depth)
        }
        Pattern::Spherical => {
            let dir = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 2.0,
                (rng.gen::<f32>() - 0.5) * 2.0,
                (rng.gen::<f32>() - 0.5) * 2.0,
            )
            .normalize_or_zero();
            let radius = normalization.apply(s);
            Vec3::new(
                dir.x * rng.gen::<f32>() * radius,
                dir.y * rng.gen::<f32>() * radius,
                dir.z * rng.gen::<f32>() * radius,
            )
        }
        Pattern::Unrecognized => Vec3::ZERO,
    }
}

/// Velocities for `count` particles.
pub fn generate_velocities<R: Rng + ?Sized>(
    pattern: Pattern,
    count: usize,
    speed_scale: f32,
    normalization: FrustumNormalization,
    rng: &mut R,
) -> Vec<Vec3> {
    (0..count)
        .map(|i| generate_velocity(pattern, i, speed_scale, normalization, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const ALL: [Pattern; 8] = [
        Pattern::Circular,
        Pattern::Cone,
        Pattern::Cube,
        Pattern::Ring,
        Pattern::Star,
        Pattern::Disk,
        Pattern::Spherical,
        Pattern::Unrecognized,
    ];

    #[test]
    fn test_count_and_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        for pattern in ALL {
            for n in [0usize, 1, 7, 300] {
                let v = generate_velocities(pattern, n, 2.0, FrustumNormalization::NONE, &mut rng);
                assert_eq!(v.len(), n, "{:?}", pattern);
                for vel in v {
                    assert!(vel.is_finite(), "{:?} produced {:?}", pattern, vel);
                    assert!(
                        vel.length() <= pattern.max_magnitude(2.0) + 1e-4,
                        "{:?} produced {:?}",
                        pattern,
                        vel
                    );
                }
            }
        }
    }

    #[test]
    fn test_unit_sphere_patterns_have_exact_speed() {
        let mut rng = SmallRng::seed_from_u64(1);
        for pattern in [Pattern::Circular, Pattern::Cone] {
            for v in generate_velocities(pattern, 100, 3.0, FrustumNormalization::NONE, &mut rng) {
                assert!((v.length() - 3.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_cone_stays_within_45_degrees() {
        let mut rng = SmallRng::seed_from_u64(2);
        let min_z = (PI / 4.0).cos() - 1e-5;
        let norm = FrustumNormalization::NONE;
        for v in generate_velocities(Pattern::Cone, 500, 1.0, norm, &mut rng) {
            assert!(v.z >= min_z);
        }
    }

    #[test]
    fn test_ring_is_flat() {
        let mut rng = SmallRng::seed_from_u64(3);
        let norm = FrustumNormalization::NONE;
        for v in generate_velocities(Pattern::Ring, 200, 5.0, norm, &mut rng) {
            assert!((v.truncate().length() - 5.0).abs() < 1e-3);
            assert!(v.z.abs() <= 0.25);
        }
    }

    #[test]
    fn test_star_spokes() {
        let mut rng = SmallRng::seed_from_u64(4);
        let v = generate_velocities(Pattern::Star, 70, 1.0, FrustumNormalization::NONE, &mut rng);
        for (i, vel) in v.iter().enumerate() {
            let spoke_start = (i % STAR_POINTS) as f32 * TAU / STAR_POINTS as f32;
            let angle = vel.y.atan2(vel.x).rem_euclid(TAU);
            let offset = (angle - spoke_start).rem_euclid(TAU);
            assert!(
                offset <= PI / STAR_POINTS as f32 + 1e-4 || offset >= TAU - 1e-4,
                "particle {} off spoke",
                i
            );
        }
    }

    #[test]
    fn test_unrecognized_is_zero() {
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(Pattern::launch_from_tag("sparkle"), Pattern::Unrecognized);
        assert_eq!(Pattern::burst_from_tag("cone"), Pattern::Unrecognized);
        let norm = FrustumNormalization::NONE;
        for v in generate_velocities(Pattern::Unrecognized, 10, 9.0, norm, &mut rng) {
            assert_eq!(v, Vec3::ZERO);
        }
    }

    #[test]
    fn test_circular_tag_depends_on_family() {
        assert_eq!(Pattern::launch_from_tag("circular"), Pattern::Circular);
        assert_eq!(Pattern::burst_from_tag("circular"), Pattern::Disk);
        assert_eq!(Pattern::from_tag(PatternFamily::Burst, "spherical"), Pattern::Spherical);
        assert_eq!(Pattern::Disk.family(), Some(PatternFamily::Burst));
        assert_eq!(Pattern::Unrecognized.family(), None);
    }

    #[test]
    fn test_normalization_scales_burst_only() {
        let wide = FrustumNormalization::new(ProjectionKind::Orthographic, 20.0, 10.0);
        assert_eq!(wide.ratio(), 2.0);
        assert_eq!(
            FrustumNormalization::new(ProjectionKind::Perspective, 20.0, 10.0),
            FrustumNormalization::NONE
        );

        for pattern in [Pattern::Disk, Pattern::Spherical] {
            let mut rng = SmallRng::seed_from_u64(9);
            let a = generate_velocities(pattern, 50, 0.6, FrustumNormalization::NONE, &mut rng);
            let b = generate_velocities(pattern, 50, 0.6, wide, &mut SmallRng::seed_from_u64(9));
            for (a, b) in a.iter().zip(&b) {
                assert!((*a * 2.0 - *b).length() < 1e-5);
            }
        }

        let mut rng = SmallRng::seed_from_u64(3);
        let a = generate_velocities(Pattern::Cube, 20, 1.0, FrustumNormalization::NONE, &mut rng);
        let b = generate_velocities(Pattern::Cube, 20, 1.0, wide, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_stays_in_family() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..50 {
            let pattern = Pattern::random(PatternFamily::Burst, &mut rng);
            assert_eq!(pattern.family(), Some(PatternFamily::Burst));
            let pattern = Pattern::random(PatternFamily::Launch, &mut rng);
            assert_eq!(pattern.family(), Some(PatternFamily::Launch));
        }
    }
}
