//! # Fireworks - particle lifecycle engine
//!
//! Frame-driven fireworks on top of any scene graph: rockets rise from the
//! ground, burst into point clouds shaped by a velocity pattern, fade out and
//! release everything they allocated.
//!
//! The crate does no rendering itself. A host implements [`SceneGraph`]
//! (drawable creation, attach/detach, buffer updates, release) and
//! [`Camera`] (unprojection and frustum extent), then calls
//! [`EffectScheduler::tick`] once per frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fireworks::prelude::*;
//!
//! let config = FireworksConfig::new()
//!     .with_mode(LaunchMode::Interval)
//!     .with_launches_per_fire(1, 3);
//!
//! let mut fireworks = EffectScheduler::new(
//!     my_scene,
//!     ViewCamera::perspective(1280.0, 720.0),
//!     TextureHandle::from_file("assets/spark.png")?,
//!     config,
//!     1280.0,
//!     720.0,
//! )?;
//!
//! let mut clock = FrameClock::new();
//! loop {
//!     clock.update();
//!     fireworks.tick_with(&clock);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Effects
//!
//! An [`Effect`] is one firework. It moves through
//! `Ascending -> Exploding -> Fading -> Disposed` and owns a billboard while
//! rising and a point cloud after detonation. See [`effect`] for the phase
//! rules.
//!
//! ### Patterns
//!
//! A [`Pattern`] gives each particle its initial velocity. Two families
//! exist with different speed semantics:
//!
//! | Family | Patterns | `speed_scale` means |
//! |--------|----------|---------------------|
//! | Launch | circular, cone, cube, ring, star | base particle speed |
//! | Burst | disk, spherical | explosion radius, scaled by the orthographic zoom |
//!
//! ### Admission
//!
//! [`LaunchMode::Interval`] launches random batches on a timer,
//! [`LaunchMode::Accumulator`] launches one effect per elapsed
//! `launch_duration`. Either way, [`Launcher`] handles can queue launches
//! from other threads.
//!
//! ## Logging
//!
//! Everything goes through the `log` facade. Spawns, detonations and
//! disposals are `debug`, per-tick summaries are `trace`.

pub mod camera;
pub mod config;
pub mod effect;
pub mod environment;
pub mod error;
pub mod material;
pub mod pattern;
pub mod resources;
pub mod scene;
pub mod scheduler;
pub mod texture;
pub mod time;

pub use bytemuck;
pub use camera::{Camera, ProjectionKind, ViewCamera};
pub use config::{EffectStyle, FadePolicy, FireworksConfig, LaunchMode};
pub use effect::{Effect, EffectId, EffectParams, Phase, Status};
pub use environment::Environment;
pub use error::{ConfigError, TextureError};
pub use glam::{Vec2, Vec3};
pub use material::{BlendMode, Material};
pub use pattern::{
    generate_velocities, generate_velocity, FrustumNormalization, Pattern, PatternFamily,
};
pub use resources::OwnedDrawable;
pub use scene::{DrawableId, DrawableKind, RecordingScene, SceneGraph};
pub use scheduler::{EffectScheduler, IntervalTimer, Launcher, SpawnRequest};
pub use texture::TextureHandle;
pub use time::{Clock, FrameClock, ManualClock};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use fireworks::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::{Camera, ProjectionKind, ViewCamera};
    pub use crate::config::{EffectStyle, FadePolicy, FireworksConfig, LaunchMode};
    pub use crate::effect::{Phase, Status};
    pub use crate::material::BlendMode;
    pub use crate::pattern::Pattern;
    pub use crate::scene::{DrawableId, SceneGraph};
    pub use crate::scheduler::{EffectScheduler, Launcher};
    pub use crate::texture::TextureHandle;
    pub use crate::time::{Clock, FrameClock, ManualClock};
    pub use crate::{Vec2, Vec3};
}
