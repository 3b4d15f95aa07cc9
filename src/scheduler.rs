//! Effect admission and the per-frame tick.
//!
//! [`EffectScheduler`] owns the live fireworks together with the host scene
//! and camera. Each [`tick`](EffectScheduler::tick) does three things in
//! order:
//!
//! 1. **Admit**: spawn new effects according to the [`LaunchMode`].
//! 2. **Drain**: spawn whatever [`Launcher`] handles queued since the last
//!    tick.
//! 3. **Advance**: step every live effect once and compact away the ones
//!    that finished.
//!
//! # Launch modes
//!
//! | Mode | Rule | Targets |
//! |------|------|---------|
//! | Interval | timer fires every `interval` s, spawning `launches_per_fire` effects | random screen points unprojected through the camera |
//! | Accumulator | one spawn when `now - last_launch >= launch_duration`, then `last_launch = floor(now)` | random points in the frustum plane |
//!
//! # Example
//!
//! ```ignore
//! let mut fireworks = EffectScheduler::new(
//!     scene,
//!     ViewCamera::perspective(1280.0, 720.0),
//!     TextureHandle::from_file("spark.png")?,
//!     FireworksConfig::new(),
//!     1280.0,
//!     720.0,
//! )?;
//!
//! // Background producer:
//! let launcher = fireworks.launcher();
//! std::thread::spawn(move || launcher.fire(3));
//!
//! // Frame loop:
//! clock.update();
//! fireworks.tick_with(&clock);
//! ```

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::camera::{Camera, ProjectionKind};
use crate::config::{FireworksConfig, LaunchMode};
use crate::effect::{Effect, EffectId, EffectParams, Status};
use crate::environment::Environment;
use crate::error::ConfigError;
use crate::scene::SceneGraph;
use crate::texture::TextureHandle;
use crate::time::Clock;

/// A request queued by a [`Launcher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    /// Spawn `count` effects at positions chosen by the current mode.
    Random {
        /// Number of effects.
        count: usize,
    },
    /// Spawn one effect at a normalized screen point (x, y in -1..1).
    At {
        /// Screen point in normalized device coordinates.
        ndc: Vec2,
    },
}

/// Cloneable handle for requesting launches from anywhere, including other
/// threads. Requests are applied on the scheduler's next tick.
#[derive(Debug, Clone)]
pub struct Launcher {
    sender: Sender<SpawnRequest>,
}

impl Launcher {
    /// Queue `count` launches at random positions. Returns `false` if the
    /// scheduler is gone.
    pub fn fire(&self, count: usize) -> bool {
        self.send(SpawnRequest::Random { count })
    }

    /// Queue one launch towards a normalized screen point.
    pub fn fire_at(&self, ndc: Vec2) -> bool {
        self.send(SpawnRequest::At { ndc })
    }

    /// Queue any request.
    pub fn send(&self, request: SpawnRequest) -> bool {
        self.sender.send(request).is_ok()
    }
}

/// Repeating timer on the simulation clock.
///
/// The first [`poll`](Self::poll) arms it; after each fire it re-arms one
/// period after the firing tick, so a late tick never produces a burst of
/// catch-up fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    period: f32,
    next_fire: Option<f32>,
    paused: bool,
}

impl IntervalTimer {
    /// Timer firing every `period` seconds.
    pub fn new(period: f32) -> Self {
        Self {
            period,
            next_fire: None,
            paused: false,
        }
    }

    /// Whether the timer fires at `now`.
    pub fn poll(&mut self, now: f32) -> bool {
        if self.paused {
            return false;
        }
        match self.next_fire {
            Some(at) if now >= at => {
                self.next_fire = Some(now + self.period);
                true
            }
            Some(_) => false,
            None => {
                self.next_fire = Some(now + self.period);
                false
            }
        }
    }

    /// Stop firing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Start firing again, one full period after the next poll.
    pub fn resume(&mut self) {
        self.paused = false;
        self.next_fire = None;
    }

    /// Change the period. Takes effect when the timer next re-arms.
    pub fn set_period(&mut self, period: f32) {
        self.period = period;
    }

    /// Timer period in seconds.
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Whether the timer is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Owns live fireworks and decides when new ones launch.
pub struct EffectScheduler<S: SceneGraph, C: Camera> {
    scene: S,
    camera: C,
    texture: TextureHandle,
    config: FireworksConfig,
    env: Environment,
    effects: Vec<Effect>,
    next_id: u64,
    last_launch: f32,
    timer: IntervalTimer,
    paused: bool,
    sender: Sender<SpawnRequest>,
    receiver: Receiver<SpawnRequest>,
    rng: SmallRng,
    spawned_total: u64,
    finished_total: u64,
}

impl<S: SceneGraph, C: Camera> EffectScheduler<S, C> {
    /// Validate `config` and build a scheduler for a `width` x `height`
    /// viewport.
    pub fn new(
        scene: S,
        mut camera: C,
        texture: TextureHandle,
        config: FireworksConfig,
        width: f32,
        height: f32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        camera.set_viewport(width, height, config.frustum_size);
        let env = Environment::from_viewport(
            width,
            height,
            config.frustum_size,
            camera.projection_kind(),
            &config,
        );
        let (sender, receiver) = unbounded();

        log::info!(
            "Fireworks scheduler ready: {:?} mode, {:?} camera, {}x{}",
            config.mode,
            camera.projection_kind(),
            width,
            height
        );

        Ok(Self {
            scene,
            camera,
            texture,
            timer: IntervalTimer::new(config.interval),
            config,
            env,
            effects: Vec::new(),
            next_id: 0,
            last_launch: 0.0,
            paused: false,
            sender,
            receiver,
            rng: SmallRng::from_entropy(),
            spawned_total: 0,
            finished_total: 0,
        })
    }

    /// Use a fixed random seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Run one frame at absolute time `now` (seconds).
    pub fn tick(&mut self, now: f32) {
        self.admit(now);
        self.drain_requests(now);

        let Self {
            effects, scene, rng, ..
        } = self;
        let before = effects.len();
        effects.retain_mut(|effect| effect.advance(now, &mut *scene, &mut *rng) == Status::Alive);
        let finished = before - effects.len();
        self.finished_total += finished as u64;

        log::trace!(
            "tick t={:.3}: {} live, {} finished",
            now,
            self.effects.len(),
            finished
        );
    }

    /// [`tick`](Self::tick) at the clock's current time.
    pub fn tick_with<K: Clock + ?Sized>(&mut self, clock: &K) {
        self.tick(clock.now());
    }

    fn admit(&mut self, now: f32) {
        if self.paused {
            return;
        }
        match self.config.mode {
            LaunchMode::Interval => {
                if self.timer.poll(now) {
                    let [min, max] = self.config.launches_per_fire;
                    let count = self.rng.gen_range(min..=max);
                    for _ in 0..count {
                        self.spawn_random(now);
                    }
                }
            }
            LaunchMode::Accumulator => {
                if now - self.last_launch >= self.config.launch_duration {
                    self.spawn_random(now);
                    self.last_launch = now.floor();
                }
            }
        }
    }

    fn drain_requests(&mut self, now: f32) {
        let requests: Vec<SpawnRequest> = self.receiver.try_iter().collect();
        for request in requests {
            match request {
                SpawnRequest::Random { count } => {
                    for _ in 0..count {
                        self.spawn_random(now);
                    }
                }
                SpawnRequest::At { ndc } => {
                    let target = self.target_from_ndc(ndc);
                    self.spawn_at(now, target);
                }
            }
        }
    }

    fn spawn_random(&mut self, now: f32) -> EffectId {
        let target = match self.config.mode {
            LaunchMode::Interval => {
                let ndc = self.random_screen_point();
                self.target_from_ndc(ndc)
            }
            LaunchMode::Accumulator => {
                let frustum = self.env.frustum_size;
                Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * frustum * self.env.aspect,
                    self.rng.gen::<f32>() * frustum / 2.0,
                    0.0,
                )
            }
        };
        self.spawn_at(now, target)
    }

    /// Random launch point in normalized device coordinates. Orthographic
    /// cameras get origins far outside the screen, which the vertical clamp
    /// folds back into view; perspective cameras use the upper 60% of the
    /// screen.
    fn random_screen_point(&mut self) -> Vec2 {
        let width = if self.env.width > 0.0 { self.env.width } else { 1.0 };
        let height = if self.env.height > 0.0 { self.env.height } else { 1.0 };
        let rng = &mut self.rng;
        let (x, y) = match self.camera.projection_kind() {
            ProjectionKind::Orthographic => (
                -rng.gen::<f32>() * width * (rng.gen::<f32>() * 200.0 - 100.0),
                rng.gen::<f32>() * height * -60.0,
            ),
            ProjectionKind::Perspective => {
                (rng.gen::<f32>() * width, rng.gen::<f32>() * height * 0.6)
            }
        };
        Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
    }

    fn target_from_ndc(&self, ndc: Vec2) -> Vec3 {
        let eye = self.camera.position();
        let dir = (self.camera.unproject(ndc.extend(0.0)) - eye).normalize_or_zero();
        let mut target = eye + dir * self.config.launch_distance;
        if self.camera.projection_kind() == ProjectionKind::Orthographic {
            let (top, bottom) = self.camera.frustum_vertical_extent();
            target.y = target.y.max(eye.y + bottom).min(eye.y + top);
        }
        target
    }

    fn spawn_at(&mut self, now: f32, target: Vec3) -> EffectId {
        let start = Vec3::new(target.x, self.config.floor_height, target.z);
        let style = self.config.active_style();
        let params = EffectParams::from_style(style, &self.config, &self.env, &mut self.rng);

        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.spawned_total += 1;

        let texture = self.texture.clone();
        let effect = Effect::spawn(id, now, start, target, params, texture, &mut self.scene);
        self.effects.push(effect);
        id
    }

    /// Queue a launch towards a normalized screen point (x, y in -1..1),
    /// e.g. from a click. It spawns on the next tick.
    pub fn launch_at(&mut self, ndc: Vec2) {
        // The scheduler holds the receiver, so this cannot fail.
        let _ = self.sender.send(SpawnRequest::At { ndc });
    }

    /// A handle for queueing launches from elsewhere.
    pub fn launcher(&self) -> Launcher {
        Launcher {
            sender: self.sender.clone(),
        }
    }

    /// React to a viewport change. Live effects keep the scales they were
    /// spawned with; only later spawns see the new environment.
    pub fn on_resize(&mut self, width: f32, height: f32, frustum_size: f32) {
        self.camera.set_viewport(width, height, frustum_size);
        self.env = Environment::from_viewport(
            width,
            height,
            frustum_size,
            self.camera.projection_kind(),
            &self.config,
        );
        log::debug!(
            "Viewport resized to {}x{} (frustum {}), {} effects in flight",
            width,
            height,
            frustum_size,
            self.effects.len()
        );
    }

    /// Tear down every live effect and release its drawables now.
    pub fn dispose_all(&mut self) {
        let count = self.effects.len();
        for mut effect in self.effects.drain(..) {
            effect.dispose(&mut self.scene);
        }
        if count > 0 {
            log::info!("Disposed {} fireworks", count);
        }
    }

    /// Stop automatic launches. Live effects keep running and
    /// [`Launcher`] requests are still honored.
    pub fn pause(&mut self) {
        self.paused = true;
        self.timer.pause();
    }

    /// Resume automatic launches without catching up on missed ones.
    pub fn resume(&mut self) {
        self.paused = false;
        self.timer.resume();
    }

    /// Whether automatic launches are paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Switch the launch mode. The interval timer re-arms from the next
    /// tick.
    pub fn set_mode(&mut self, mode: LaunchMode) {
        if self.config.mode != mode {
            log::info!("Launch mode {:?} -> {:?}", self.config.mode, mode);
            self.config.mode = mode;
            self.timer = IntervalTimer {
                paused: self.paused,
                ..IntervalTimer::new(self.config.interval)
            };
        }
    }

    /// Change the interval timer period. The next fire keeps its schedule;
    /// later ones use the new period.
    pub fn set_interval(&mut self, seconds: f32) {
        self.config.interval = seconds;
        self.timer.set_period(seconds);
    }

    /// Number of live effects.
    pub fn live_count(&self) -> usize {
        self.effects.len()
    }

    /// Effects spawned since creation.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Effects that ran to completion since creation.
    pub fn finished_total(&self) -> u64 {
        self.finished_total
    }

    /// Live effects in spawn order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// The configuration in use.
    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    /// The current viewport environment.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The host scene.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// The camera.
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Mutable camera access, for hosts that move it.
    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }
}

impl<S: SceneGraph, C: Camera> Drop for EffectScheduler<S, C> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
