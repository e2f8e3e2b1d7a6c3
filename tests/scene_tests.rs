//! Integration tests for the public scene API.
//!
//! Everything here runs without a window or GPU.

use approx::assert_relative_eq;
use glam::Vec3;

use raindrops::fall::{advance, step, FallConfig};
use raindrops::geometry::{lathe, raindrop_profile};
use raindrops::prelude::*;
use raindrops::viewport::Viewport;

fn seeded(variant: Variant) -> SceneConfig {
    let mut config = SceneConfig::preset(variant);
    config.spawn.seed = Some(42);
    config
}

// ============================================================================
// Fall animation
// ============================================================================

#[test]
fn test_fall_matches_closed_form_until_wrap() {
    let cfg = FallConfig::default();
    let p0 = 3.05_f32;
    let mut y = p0;
    for k in 1..=140 {
        let s = advance(y, &cfg);
        let expected = p0 - 0.1 * k as f32;
        if expected < cfg.floor_y {
            assert!(s.wrapped, "frame {k} should wrap");
            assert_eq!(s.y, cfg.ceiling_y);
            break;
        }
        assert!(!s.wrapped);
        assert_relative_eq!(s.y, expected, epsilon = 1e-3);
        y = s.y;
    }
}

#[test]
fn test_fall_scenarios() {
    let cfg = FallConfig::default();
    assert_eq!(step(-9.95, &cfg), 10.0);
    assert_relative_eq!(step(5.0, &cfg), 4.9, epsilon = 1e-6);
}

#[test]
fn test_custom_fall_bounds() {
    let cfg = FallConfig {
        fall_speed: 0.5,
        floor_y: 0.0,
        ceiling_y: 2.0,
    };
    assert_eq!(step(0.25, &cfg), 2.0);
    assert_relative_eq!(step(1.0, &cfg), 0.5);
}

// ============================================================================
// Scene
// ============================================================================

#[test]
fn test_scene_tick_never_leaves_volume() {
    let mut scene = Scene::new(seeded(Variant::Classic), Viewport::new(800.0, 600.0, 1.0));
    let mut total_wraps = 0;
    for _ in 0..1000 {
        total_wraps += scene.tick().wrapped;
        for (_, drop) in scene.raindrops.iter() {
            assert!(drop.position.y >= -10.0 && drop.position.y <= 10.0);
        }
    }
    // 1000 frames at 0.1 is five full passes through the volume.
    assert!(total_wraps >= 150 * 4);
}

#[test]
fn test_scene_resize_scenario() {
    let mut scene = Scene::new(seeded(Variant::Classic), Viewport::new(800.0, 600.0, 1.0));
    assert_relative_eq!(scene.camera.aspect, 1.333, epsilon = 1e-3);

    scene.resize(1920.0, 1080.0, 1.0);
    assert_relative_eq!(scene.camera.aspect, 1.778, epsilon = 1e-3);
    assert_eq!(scene.viewport.size(), (1920.0, 1080.0));
    assert_eq!(scene.viewport.drawing_buffer_size(), (1920, 1080));
}

#[test]
fn test_pixel_ratio_clamped_for_any_dpr() {
    let mut scene = Scene::new(seeded(Variant::Named), Viewport::new(640.0, 480.0, 1.0));
    for dpr in [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 4.0] {
        scene.resize(640.0, 480.0, dpr);
        assert!(scene.viewport.pixel_ratio() <= 2.0);
        if dpr <= 2.0 && dpr > 0.0 {
            assert_eq!(scene.viewport.pixel_ratio(), dpr);
        }
    }
}

#[test]
fn test_transparent_drops_sorted_far_to_near() {
    let scene = Scene::new(seeded(Variant::Classic), Viewport::new(800.0, 600.0, 1.0));
    let eye = scene.camera.position;
    let raw = scene.raindrop_instances();
    assert_eq!(raw.len(), 150);

    let dist: Vec<f32> = raw
        .iter()
        .map(|r| Vec3::new(r.model[3][0], r.model[3][1], r.model[3][2]).distance(eye))
        .collect();
    assert!(dist.windows(2).all(|w| w[0] >= w[1]));
}

// ============================================================================
// Config and geometry
// ============================================================================

#[test]
fn test_config_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("raindrops-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.json");

    let config = seeded(Variant::Named);
    std::fs::write(&path, config.to_json()).unwrap();
    let loaded = SceneConfig::load(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = std::env::temp_dir().join(format!("raindrops-bad-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.json");
    std::fs::write(&path, r#"{ "fall": { "fall_speed": -1.0 } }"#).unwrap();

    let res = SceneConfig::load(&path);
    std::fs::remove_dir_all(&dir).ok();
    assert!(res.is_err());
}

#[test]
fn test_raindrop_mesh_dimensions() {
    let profile = raindrop_profile();
    let mesh = lathe(&profile, 32);
    assert_eq!(mesh.vertices.len(), profile.len() * 33);
    assert_eq!(mesh.indices.len(), (profile.len() - 1) * 32 * 6);
}
