//! End-to-end scenarios for both fields, run headless with a stand-in
//! rasterizer so no font is needed.

use std::collections::HashMap;
use std::ops::Range;

use approx::assert_relative_eq;
use image::{GrayImage, Luma};
use particle_field::integrator::{noise, AttractRule, SpringRule};
use particle_field::prelude::*;
use particle_field::shape::{Rasterizer, ShapeGenerator};
use particle_field::spawn;
use particle_field::{Attractor, Camera, Clock, MorphField, TouchField};

/// Lights a fixed rectangle for any non-empty text.
struct RectRasterizer {
    x: Range<u32>,
    y: Range<u32>,
}

impl Rasterizer for RectRasterizer {
    fn rasterize(&self, text: &str, width: u32, height: u32) -> GrayImage {
        let mut raster = GrayImage::new(width, height);
        if text.trim().is_empty() {
            return raster;
        }
        for y in self.y.clone() {
            for x in self.x.clone() {
                raster.put_pixel(x, y, Luma([255]));
            }
        }
        raster
    }
}

/// 25 sampled columns x 20 sampled rows.
fn five_hundred_samples() -> RectRasterizer {
    RectRasterizer {
        x: 100..150,
        y: 100..140,
    }
}

fn morph_field(count: usize) -> MorphField {
    MorphField::new(
        count,
        PhraseMap::default(),
        Palette::default(),
        ShapeGenerator::new(Box::new(five_hundred_samples())),
    )
    .unwrap()
}

#[test]
fn spiral_first_frame_moves_by_noise_only() {
    let mut field = morph_field(3000);
    let initial = field.store().positions().to_vec();
    assert_eq!(initial.len(), 9000);

    field.step(0.0);

    let rule = SpringRule::DEFAULT;
    let store = field.store();
    assert_eq!(store.positions().len(), 9000);
    assert_eq!(store.velocities().len(), 9000);
    assert_eq!(store.targets().len(), 9000);

    for i in 0..store.len() {
        let start = Vec3::from_slice(&initial[i * 3..i * 3 + 3]);
        // Target equals the spawn position, so the pull is the noise term alone
        let expected_velocity = noise(i * 3, 0.0) * rule.stiffness * rule.damping;
        assert_relative_eq!(store.velocity(i).x, expected_velocity.x, epsilon = 1e-5);
        assert_relative_eq!(store.velocity(i).y, expected_velocity.y, epsilon = 1e-5);
        assert_relative_eq!(store.velocity(i).z, expected_velocity.z, epsilon = 1e-5);

        let moved = store.position(i) - start;
        assert_relative_eq!(moved.x, expected_velocity.x, epsilon = 1e-3);
        assert_relative_eq!(moved.y, expected_velocity.y, epsilon = 1e-3);
        assert_relative_eq!(moved.z, expected_velocity.z, epsilon = 1e-3);
    }
}

#[test]
fn spring_update_is_reproducible() {
    let mut a = morph_field(200);
    let mut b = morph_field(200);
    for frame in 0..30 {
        let t = frame as f32 / 60.0;
        a.step(t);
        b.step(t);
    }
    assert_eq!(a.store().positions(), b.store().positions());
    assert_eq!(a.store().velocities(), b.store().velocities());
}

#[test]
fn spring_velocity_stays_bounded() {
    let ctx = Simulation::new()
        .with_particle_count(300)
        .with_rasterizer(five_hundred_samples())
        .run_headless(2000)
        .unwrap();
    // Noise amplitude is at most 4.2 per axis, so settled speeds stay small
    assert!(ctx.field.store().mean_speed() < 1.0);
    assert!(ctx.field.store().velocities().iter().all(|v| v.is_finite()));
}

#[test]
fn shape_change_spreads_particles_evenly() {
    let mut field = morph_field(3000);
    let samples = field.shapes().samples("M");
    assert_eq!(samples.len(), 500);

    assert_eq!(field.trigger('m'), Some(500));

    let store = field.store();
    let mut uses: HashMap<[u32; 3], usize> = HashMap::new();
    for i in 0..store.len() {
        let target = store.target(i);
        assert_eq!(target, samples.points()[i % 500]);
        *uses.entry(target.to_array().map(f32::to_bits)).or_default() += 1;
    }
    assert_eq!(uses.len(), 500);
    assert!(uses.values().all(|&n| n == 6));
}

#[test]
fn blank_shape_collapses_to_origin() {
    let mut field = morph_field(50);

    assert_eq!(field.morph_to(" "), 0);
    assert!((0..50).all(|i| field.store().target(i) == Vec3::ZERO));
    // The color still advances so the key press is visible
    assert_eq!(field.palette().cursor(), 1);
}

#[test]
fn inactive_attractor_is_pure_drift() {
    let mut store = ParticleStore::new(64).unwrap();
    spawn::spawn_sphere(&mut store, 100.0, 0.05, 11);
    let before_pos = store.positions().to_vec();
    let before_vel = store.velocities().to_vec();

    // Inactive but placed right next to particles
    let attractor = Attractor {
        point: store.position(0),
        active: false,
    };
    AttractRule::DEFAULT.apply(&mut store, &attractor);

    assert_eq!(store.velocities(), before_vel.as_slice());
    for (i, (&p, &v)) in before_pos.iter().zip(&before_vel).enumerate() {
        assert_eq!(store.positions()[i], p + v);
    }
}

#[test]
fn attractor_impulse_has_fixed_strength() {
    let target = Vec3::new(20.0, -5.0, 0.0);
    let start = target - Vec3::new(6.0, 8.0, 0.0); // distance 10

    let mut store = ParticleStore::new(1).unwrap();
    store.set_position(0, start);
    let mut attractor = Attractor::default();
    attractor.engage(target);

    AttractRule::DEFAULT.apply(&mut store, &attractor);

    let gained = store.velocity(0);
    assert_relative_eq!(gained.length(), 0.05, epsilon = 1e-6);
    let expected = (target - start).normalize() * 0.05;
    assert_relative_eq!(gained.x, expected.x, epsilon = 1e-6);
    assert_relative_eq!(gained.y, expected.y, epsilon = 1e-6);
    assert!(gained.dot(target - start) > 0.0);
}

#[test]
fn touch_pointer_pulls_the_cloud_in() {
    let mut field = TouchField::new(2000, 100.0, 0.0, 5).unwrap();
    let camera = Camera::default();
    // Inside the pull radius, so only inward motion can change the count
    let near_center = |field: &TouchField| {
        (0..field.store().len())
            .filter(|&i| field.store().position(i).length() < 30.0)
            .count()
    };
    let before = near_center(&field);

    assert!(field.handle(&InputEvent::PointerDown(Vec2::ZERO), &camera));
    for frame in 0..20 {
        field.step(frame as f32);
    }
    assert!(near_center(&field) > before);

    field.handle(&InputEvent::PointerUp, &camera);
    let snapshot = field.store().velocities().to_vec();
    field.step(0.0);
    assert_eq!(field.store().velocities(), snapshot.as_slice());
}

#[test]
fn headless_touch_run_keeps_buffer_sizes() {
    let ctx = Simulation::new()
        .with_mode(Mode::Touch)
        .with_particle_count(500)
        .with_seed(9)
        .run_headless(120)
        .unwrap();
    assert_eq!(ctx.clock.frame(), 120);
    assert_eq!(ctx.field.store().positions().len(), 1500);
    assert_eq!(ctx.field.store().velocities().len(), 1500);
}

#[test]
fn initial_key_morphs_before_first_frame() {
    let ctx = Simulation::new()
        .with_particle_count(1000)
        .with_rasterizer(five_hundred_samples())
        .with_initial_key('r')
        .build_with_clock(Clock::fixed(1.0 / 60.0))
        .unwrap();
    let store = ctx.field.store();
    assert!(store.targets().iter().any(|&v| v != 0.0));
    assert!(store.mean_target_distance() > 1.0);
}

#[test]
fn mask_export_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");
    Simulation::new()
        .with_particle_count(10)
        .with_rasterizer(five_hundred_samples())
        .with_mask_export('k', &path)
        .build()
        .unwrap();

    let mask = image::open(&path).unwrap().to_luma8();
    assert_eq!(mask.dimensions(), (1024, 256));
    assert_eq!(mask.get_pixel(120, 120).0[0], 255);
    assert_eq!(mask.get_pixel(0, 0).0[0], 0);
}
