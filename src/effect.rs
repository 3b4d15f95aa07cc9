//! One firework, from launch to the last faded spark.
//!
//! # Phases
//!
//! ```text
//! Ascending ──(elapsed >= ascent)──▶ Exploding ──(opacity < 1)──▶ Fading ──(opacity <= 0)──▶ Disposed
//! ```
//!
//! - **Ascending**: a billboard sprite moves linearly from the start to the
//!   target position.
//! - **Exploding**: on the first step past the ascent the sprite is hidden
//!   and released, and a point cloud is created at the target with velocities
//!   from the effect's [`Pattern`]. Nothing moves on this step.
//! - **Fading**: every following step integrates positions and lowers the
//!   opacity through the effect's [`FadePolicy`].
//! - **Disposed**: opacity reached zero (or the owner tore the effect down).
//!   All drawables are released and [`Effect::advance`] must not be called
//!   again.
//!
//! Particle buffers are allocated at spawn, one entry per particle, and are
//! index aligned: position, velocity and color `i` belong to particle `i`.
//! They are exposed as flat `f32` slices through `bytemuck`.

use std::fmt;

use glam::Vec3;
use rand::Rng;

use crate::config::{EffectStyle, FadePolicy, FireworksConfig};
use crate::environment::Environment;
use crate::material::{hsl_to_rgb, BlendMode, Material};
use crate::pattern::{generate_velocity, FrustumNormalization, Pattern, PatternFamily};
use crate::resources::OwnedDrawable;
use crate::scene::{DrawableId, SceneGraph};
use crate::texture::TextureHandle;

/// Unique id of an effect within one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "firework_{}", self.0)
    }
}

/// Lifecycle phase of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Launch sprite rising towards the target.
    Ascending,
    /// Burst created, not yet faded.
    Exploding,
    /// Burst expanding with decreasing opacity.
    Fading,
    /// Resources released.
    Disposed,
}

/// Result of one [`Effect::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Status {
    /// Still running.
    Alive,
    /// Reached the end of its life on this step and released its drawables.
    Finished,
}

/// Everything an effect needs, frozen at spawn time.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParams {
    /// Velocity distribution.
    pub pattern: Pattern,
    /// How `speed_scale` is interpreted.
    pub family: PatternFamily,
    /// Particles in the burst.
    pub particle_count: usize,
    /// Seconds from launch to detonation.
    pub ascent_duration: f32,
    /// Burst family: explosion radius. Launch family: base particle speed.
    pub speed_scale: f32,
    /// Burst radius scale captured from the camera zoom.
    pub normalization: FrustumNormalization,
    /// Fraction of velocity applied per step.
    pub speed_control: f32,
    /// Per-axis velocity factor.
    pub velocity_multiplier: Vec3,
    /// Subtracted from vertical velocity each step.
    pub vertical_decay: f32,
    /// Optional gravity term.
    pub gravity: Option<f32>,
    /// Opacity clock.
    pub fade: FadePolicy,
    /// Point size of the burst.
    pub point_size: f32,
    /// Scale of the launch sprite.
    pub sprite_scale: Vec3,
    /// Burst blend mode.
    pub blend: BlendMode,
    /// Material tint of the burst.
    pub tint: Vec3,
    /// Launch family base color.
    pub base_color: Vec3,
}

impl EffectParams {
    /// Resolve a style against the current environment. Random choices
    /// (pattern, tint, palette color) are made here.
    pub fn from_style<R: Rng + ?Sized>(
        style: &EffectStyle,
        config: &FireworksConfig,
        env: &Environment,
        rng: &mut R,
    ) -> Self {
        let pattern = style
            .pattern
            .unwrap_or_else(|| Pattern::random(style.family, rng));
        let family = pattern.family().unwrap_or(style.family);

        let (speed_scale, tint, base_color) = match family {
            PatternFamily::Burst => (
                config.explosion_radius,
                hsl_to_rgb(rng.gen::<f32>() * 100.0, 1.0, 0.5),
                Vec3::ONE,
            ),
            PatternFamily::Launch => {
                let base = if config.palette.is_empty() {
                    Vec3::ONE
                } else {
                    Vec3::from(config.palette[rng.gen_range(0..config.palette.len())])
                };
                (env.speed, Vec3::ONE, base)
            }
        };

        Self {
            pattern,
            family,
            particle_count: style.particle_count,
            ascent_duration: config.ascent_duration,
            speed_scale,
            normalization: env.normalization,
            speed_control: style.speed_control,
            velocity_multiplier: Vec3::from(style.velocity_multiplier),
            vertical_decay: style.vertical_decay,
            gravity: style.gravity,
            fade: style.fade,
            point_size: style.point_size.unwrap_or(env.particle_size),
            sprite_scale: env.sprite_scale,
            blend: style.blend,
            tint,
            base_color,
        }
    }

    /// Effective burst size: the normalized radius for burst patterns, the
    /// base speed for launch patterns.
    pub fn radius(&self) -> f32 {
        match self.family {
            PatternFamily::Burst => self.normalization.apply(self.speed_scale),
            PatternFamily::Launch => self.speed_scale,
        }
    }
}

/// A single firework and the drawables it owns.
#[derive(Debug)]
pub struct Effect {
    id: EffectId,
    phase: Phase,
    launched_at: f32,
    start: Vec3,
    target: Vec3,
    params: EffectParams,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    colors: Vec<Vec3>,
    opacity: f32,
    sprite: Option<OwnedDrawable>,
    cloud: Option<OwnedDrawable>,
    texture: TextureHandle,
}

impl Effect {
    /// Launch a firework at `now`. Attaches the rising sprite at `start`.
    pub fn spawn(
        id: EffectId,
        now: f32,
        start: Vec3,
        target: Vec3,
        params: EffectParams,
        texture: TextureHandle,
        scene: &mut dyn SceneGraph,
    ) -> Self {
        let sprite_id = scene.create_billboard(&Material::sprite(texture.clone()));
        let sprite = OwnedDrawable::attach(scene, sprite_id);
        sprite.set_transform(scene, start, params.sprite_scale);

        let n = params.particle_count;
        log::debug!(
            "{} launched at t={:.3}: {:?} -> {:?}, {:?} x{}",
            id,
            now,
            start,
            target,
            params.pattern,
            n
        );

        Self {
            id,
            phase: Phase::Ascending,
            launched_at: now,
            start,
            target,
            positions: vec![target; n],
            velocities: vec![Vec3::ZERO; n],
            colors: vec![Vec3::ZERO; n],
            params,
            opacity: 1.0,
            sprite: Some(sprite),
            cloud: None,
            texture,
        }
    }

    /// Run one simulation step at absolute time `now`.
    ///
    /// Returns [`Status::Finished`] exactly once, on the step that disposes
    /// the effect.
    ///
    /// # Panics
    ///
    /// Panics if the effect is already [`Phase::Disposed`].
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        scene: &mut dyn SceneGraph,
        rng: &mut R,
    ) -> Status {
        assert!(
            self.phase != Phase::Disposed,
            "{} advanced after it was disposed",
            self.id
        );

        if self.phase == Phase::Ascending {
            let elapsed = now - self.launched_at;
            if elapsed < self.params.ascent_duration {
                let t = (elapsed / self.params.ascent_duration).max(0.0);
                if let Some(sprite) = &self.sprite {
                    let position = self.start.lerp(self.target, t);
                    sprite.set_transform(scene, position, self.params.sprite_scale);
                }
            } else {
                self.detonate(scene, rng);
            }
            return Status::Alive;
        }

        self.step(now, scene)
    }

    fn detonate<R: Rng + ?Sized>(&mut self, scene: &mut dyn SceneGraph, rng: &mut R) {
        if let Some(sprite) = self.sprite.take() {
            sprite.set_transform(scene, self.target, self.params.sprite_scale);
            sprite.set_opacity(scene, 0.0);
            sprite.release(scene);
        }

        let p = &self.params;
        for i in 0..p.particle_count {
            let speed = match p.family {
                PatternFamily::Burst => p.speed_scale,
                PatternFamily::Launch => p.speed_scale * (0.5 + rng.gen::<f32>()),
            };
            self.velocities[i] = generate_velocity(p.pattern, i, speed, p.normalization, rng)
                * p.velocity_multiplier;
            self.positions[i] = self.target;
            self.colors[i] = match p.family {
                PatternFamily::Burst => Vec3::new(
                    (rng.gen::<f32>() * 1.5).min(1.0),
                    (rng.gen::<f32>() * 1.5).min(1.0),
                    (rng.gen::<f32>() * 1.5).min(1.0),
                ),
                PatternFamily::Launch => {
                    p.base_color * Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>())
                }
            };
        }

        let material = Material::points(self.texture.clone(), p.point_size)
            .with_blend(p.blend)
            .with_tint(p.tint);
        let cloud_id = scene.create_point_cloud(
            bytemuck::cast_slice(&self.positions),
            bytemuck::cast_slice(&self.colors),
            &material,
        );
        self.cloud = Some(OwnedDrawable::attach(scene, cloud_id));
        self.opacity = 1.0;
        self.phase = Phase::Exploding;

        log::debug!("{} detonated at {:?}", self.id, self.target);
    }

    fn step(&mut self, now: f32, scene: &mut dyn SceneGraph) -> Status {
        let p = &self.params;
        let elapsed = now - self.launched_at;
        for (pos, vel) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *pos += *vel * p.speed_control;
            if let Some(g) = p.gravity {
                pos.y -= 0.25 * g * elapsed;
            }
            vel.y -= p.vertical_decay;
        }

        self.opacity = p.fade.next(self.opacity, now, self.launched_at);
        if self.opacity <= 0.0 {
            self.opacity = 0.0;
            self.dispose(scene);
            return Status::Finished;
        }

        if let Some(cloud) = &self.cloud {
            cloud.set_positions(scene, bytemuck::cast_slice(&self.positions));
            cloud.set_opacity(scene, self.opacity);
        }
        if self.opacity < 1.0 {
            self.phase = Phase::Fading;
        }
        Status::Alive
    }

    /// Release every drawable and buffer now, whatever the phase. Does
    /// nothing if already disposed.
    pub fn dispose(&mut self, scene: &mut dyn SceneGraph) {
        if self.phase == Phase::Disposed {
            return;
        }
        if let Some(sprite) = self.sprite.take() {
            sprite.release(scene);
        }
        if let Some(cloud) = self.cloud.take() {
            cloud.release(scene);
        }
        self.positions = Vec::new();
        self.velocities = Vec::new();
        self.colors = Vec::new();
        self.phase = Phase::Disposed;
        log::debug!("{} disposed", self.id);
    }

    /// Effect id.
    #[inline]
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether resources have been released.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.phase == Phase::Disposed
    }

    /// Spawn time in seconds.
    #[inline]
    pub fn launched_at(&self) -> f32 {
        self.launched_at
    }

    /// Launch position.
    #[inline]
    pub fn start(&self) -> Vec3 {
        self.start
    }

    /// Detonation position.
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current opacity of the burst.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Parameters captured at spawn.
    #[inline]
    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    /// Number of particles.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.params.particle_count
    }

    /// Flat `xyz` positions.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Flat `xyz` velocities.
    pub fn velocities(&self) -> &[f32] {
        bytemuck::cast_slice(&self.velocities)
    }

    /// Flat `rgb` colors.
    pub fn colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Launch sprite, while it exists.
    pub fn sprite_id(&self) -> Option<DrawableId> {
        self.sprite.as_ref().map(OwnedDrawable::id)
    }

    /// Burst point cloud, once detonated.
    pub fn cloud_id(&self) -> Option<DrawableId> {
        self.cloud.as_ref().map(OwnedDrawable::id)
    }
}
