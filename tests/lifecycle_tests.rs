//! Integration tests for the firework lifecycle.
//!
//! These drive the public API end to end against a [`RecordingScene`], the
//! same way a host frame loop would.

use fireworks::pattern::{generate_velocities, FrustumNormalization, Pattern, PatternFamily};
use fireworks::prelude::*;
use fireworks::{DrawableKind, RecordingScene};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const FRAME: f32 = 1.0 / 60.0;

fn scheduler(config: FireworksConfig) -> EffectScheduler<RecordingScene, ViewCamera> {
    let camera = ViewCamera::new(config.projection, 800.0, 600.0, config.frustum_size);
    EffectScheduler::new(
        RecordingScene::new(),
        camera,
        TextureHandle::soft_disc(8),
        config,
        800.0,
        600.0,
    )
    .unwrap()
    .with_seed(1234)
}

// ============================================================================
// Velocity patterns
// ============================================================================

#[test]
fn test_every_pattern_yields_n_bounded_vectors() {
    let mut rng = SmallRng::seed_from_u64(99);
    let norm = FrustumNormalization::new(ProjectionKind::Orthographic, 15.0, 10.0);
    let patterns = Pattern::LAUNCH.iter().chain(Pattern::BURST.iter());

    for &pattern in patterns {
        for n in [0usize, 1, 7, 250] {
            let speed = 0.6;
            let velocities = generate_velocities(pattern, n, speed, norm, &mut rng);
            assert_eq!(velocities.len(), n);

            let bound = match pattern.family() {
                Some(PatternFamily::Burst) => pattern.max_magnitude(norm.apply(speed)),
                _ => pattern.max_magnitude(speed),
            };
            for v in velocities {
                assert!(v.is_finite(), "{:?} produced {:?}", pattern, v);
                assert!(v.length() <= bound + 1e-4, "{:?}: |{:?}| > {}", pattern, v, bound);
            }
        }
    }
}

#[test]
fn test_unrecognized_tag_is_inert() {
    let pattern = Pattern::from_tag(PatternFamily::Launch, "sparkler");
    assert_eq!(pattern, Pattern::Unrecognized);

    let mut rng = SmallRng::seed_from_u64(1);
    let velocities = generate_velocities(pattern, 10, 1.0, FrustumNormalization::NONE, &mut rng);
    assert!(velocities.iter().all(|v| *v == Vec3::ZERO));
}

// ============================================================================
// Phases
// ============================================================================

#[test]
fn test_ascent_then_single_detonation() {
    let mut fireworks = scheduler(FireworksConfig::new());
    fireworks.pause();
    fireworks.launcher().fire(1);

    let mut now = 0.0;
    fireworks.tick(now);
    let mut detonations = 0;
    let mut previous = Phase::Ascending;

    while now < 1.5 {
        now += FRAME;
        fireworks.tick(now);
        let effect = &fireworks.effects()[0];
        let elapsed = now - effect.launched_at();

        if elapsed < 1.0 {
            assert_eq!(effect.phase(), Phase::Ascending);
        }
        if previous == Phase::Ascending && effect.phase() != Phase::Ascending {
            assert_eq!(effect.phase(), Phase::Exploding);
            assert!(elapsed >= 1.0);
            detonations += 1;
        }
        previous = effect.phase();
    }

    assert_eq!(detonations, 1);
    assert_eq!(previous, Phase::Fading);
}

#[test]
fn test_only_one_drawable_kind_at_a_time() {
    let mut fireworks = scheduler(FireworksConfig::new());
    fireworks.pause();
    fireworks.launcher().fire(1);

    let mut now = 0.0;
    for _ in 0..120 {
        fireworks.tick(now);
        let scene = fireworks.scene();
        let sprites = scene.attached_of_kind(DrawableKind::Billboard).len();
        let clouds = scene.attached_of_kind(DrawableKind::PointCloud).len();
        assert_eq!(sprites + clouds, 1);
        now += FRAME;
    }
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_fade_to_zero_finishes_once() {
    let rocket = EffectStyle::rocket().with_fade(FadePolicy::FixedDecrement { per_step: 0.1 });
    let mut fireworks = scheduler(FireworksConfig::new().with_rocket(rocket));
    fireworks.pause();
    fireworks.launcher().fire(1);

    let mut now = 0.0;
    for _ in 0..200 {
        fireworks.tick(now);
        now += FRAME;
    }

    assert_eq!(fireworks.finished_total(), 1);
    assert_eq!(fireworks.live_count(), 0);
    assert_eq!(fireworks.scene().attached_count(), 0);
    assert_eq!(fireworks.scene().live_count(), 0);
}

#[test]
fn test_effects_finishing_on_the_same_tick() {
    let rocket = EffectStyle::rocket().with_fade(FadePolicy::FixedDecrement { per_step: 0.5 });
    let mut fireworks = scheduler(FireworksConfig::new().with_rocket(rocket));
    fireworks.pause();
    fireworks.launcher().fire(5);

    fireworks.tick(0.0);
    fireworks.tick(1.0);
    fireworks.tick(1.1);
    assert_eq!(fireworks.live_count(), 5);
    assert_eq!(fireworks.finished_total(), 0);

    // Every burst reaches zero opacity here.
    fireworks.tick(1.2);
    assert_eq!(fireworks.finished_total(), 5);
    assert_eq!(fireworks.live_count(), 0);
    assert_eq!(fireworks.scene().live_count(), 0);
    assert_eq!(fireworks.scene().created_count(), 10);
    assert_eq!(fireworks.scene().released_count(), 10);
}

#[test]
fn test_disposed_effect_cannot_advance() {
    let result = std::panic::catch_unwind(|| {
        let mut scene = RecordingScene::new();
        let config = FireworksConfig::new();
        let env = fireworks::Environment::from_viewport(
            800.0,
            600.0,
            10.0,
            ProjectionKind::Perspective,
            &config,
        );
        let mut rng = SmallRng::seed_from_u64(3);
        let params = fireworks::EffectParams::from_style(&config.rocket, &config, &env, &mut rng);
        let mut effect = fireworks::Effect::spawn(
            fireworks::EffectId(0),
            0.0,
            Vec3::new(0.0, -4.0, 0.0),
            Vec3::ZERO,
            params,
            TextureHandle::soft_disc(4),
            &mut scene,
        );
        effect.dispose(&mut scene);
        let _ = effect.advance(0.5, &mut scene, &mut rng);
    });
    assert!(result.is_err());
}

#[test]
fn test_dispose_all_with_any_number_of_effects() {
    for k in [0usize, 1, 5, 40] {
        let mut fireworks = scheduler(FireworksConfig::new());
        fireworks.pause();
        fireworks.launcher().fire(k);
        fireworks.tick(0.0);
        // Some ascending, some bursting.
        fireworks.launcher().fire(k);
        fireworks.tick(1.0);

        fireworks.dispose_all();
        assert_eq!(fireworks.live_count(), 0);
        assert_eq!(fireworks.scene().attached_count(), 0);
        assert_eq!(fireworks.scene().live_count(), 0);
        assert_eq!(fireworks.scene().created_count(), fireworks.scene().released_count());
    }
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_accumulator_spawns_three_in_three_point_four_seconds() {
    let config = FireworksConfig::new()
        .with_mode(LaunchMode::Accumulator)
        .with_launch_duration(1.0);
    let mut fireworks = scheduler(config);

    let mut clock = ManualClock::new();
    while clock.now() < 3.4 {
        clock.advance(FRAME);
        fireworks.tick_with(&clock);
    }

    assert_eq!(fireworks.spawned_total(), 3);
}

#[test]
fn test_resize_only_affects_later_spawns() {
    // No vertical decay, so a burst's velocities stay constant while it fades.
    let mut rocket = EffectStyle::rocket();
    rocket.vertical_decay = 0.0;
    let config = FireworksConfig::new()
        .with_projection(ProjectionKind::Orthographic, 10.0)
        .with_rocket(rocket);
    let mut fireworks = scheduler(config);
    fireworks.pause();

    fireworks.launcher().fire(1);
    fireworks.tick(0.0);
    fireworks.tick(1.0);
    assert_eq!(fireworks.effects()[0].phase(), Phase::Exploding);
    let radius = fireworks.effects()[0].params().radius();
    let velocities = fireworks.effects()[0].velocities().to_vec();

    fireworks.on_resize(1600.0, 1200.0, 30.0);
    assert_eq!(fireworks.effects()[0].velocities(), &velocities[..]);

    fireworks.launcher().fire(1);
    fireworks.tick(1.1);

    let effects = fireworks.effects();
    assert_eq!(effects[0].params().radius(), radius);
    assert_eq!(effects[0].velocities(), &velocities[..]);
    assert!((radius - 0.6).abs() < 1e-6);
    assert!((effects[1].params().radius() - 1.8).abs() < 1e-5);
}

#[test]
fn test_drop_releases_everything() {
    let launcher;
    {
        let mut fireworks = scheduler(FireworksConfig::new());
        launcher = fireworks.launcher();
        launcher.fire(3);
        fireworks.tick(0.0);
        assert_eq!(fireworks.scene().attached_count(), 3);
    }
    assert!(!launcher.fire(1));
}
