//! End-to-end checks: level text → engine → software backend.

use glam::dvec2;
use gridcast_rs::{
    config::{FogSettings, RenderConfig},
    engine::{EngineState, Side, fog::{BrightCurve, brightness}},
    level::{load_level, load_level_file},
    renderer::{DrawCall, Software},
    world::{Sprite, TextureBank},
};

const EPS: f64 = 1e-9;

fn small() -> RenderConfig {
    RenderConfig {
        width: 64,
        height: 48,
        ..Default::default()
    }
}

fn engine(src: &str) -> EngineState {
    EngineState::new(small(), load_level("t", src).unwrap()).unwrap()
}

/// 11 × 11 room, spawn in the middle at (5.5, 5.5).
fn big_room() -> String {
    let mut s = String::from("5 5 11 11\n");
    for y in 0..11 {
        for x in 0..11 {
            let edge = x == 0 || y == 0 || x == 10 || y == 10;
            s.push_str(if edge { "1 " } else { "0 " });
        }
        s.push('\n');
    }
    s
}

#[test]
fn flat_wall_has_constant_depth() {
    let mut e = engine(&big_room());
    e.cast();
    let cols = e.columns();
    assert_eq!(cols.misses, 0);
    for (x, d) in cols.depth.iter().enumerate() {
        assert!((d - 4.5).abs() < EPS, "column {x}: {d}");
    }
}

#[test]
fn rotated_view_hits_expected_cells() {
    let mut e = engine(&big_room());
    e.rotate(0.3);
    e.cast();
    let cam = *e.camera();
    let screen = *e.screen();
    let hits = &e.columns().hits;
    let ray = |x: usize| cam.project(screen.camera_x(x));

    /* centre: ray = dir, reaches x = 10 at y ≈ 6.89 */
    let h = hits[32].unwrap();
    assert_eq!((h.side, h.cell), (Side::X, (10, 6)));
    assert!((h.dist - 4.5 / cam.dir().x).abs() < EPS);

    /* left edge: ray ≈ (1.251, -0.660), reaches x = 10 at y ≈ 3.13 */
    let h = hits[0].unwrap();
    assert_eq!((h.side, h.cell), (Side::X, (10, 3)));
    assert!((h.dist - 4.5 / ray(0).x).abs() < EPS);

    /* right edge: ray ≈ (0.669, 1.221), reaches y = 10 first at x ≈ 7.97 */
    let h = hits[63].unwrap();
    assert_eq!((h.side, h.cell), (Side::Y, (7, 10)));
    assert!((h.dist - 4.5 / ray(63).y).abs() < EPS);

    for (x, hit) in hits.iter().enumerate() {
        let h = hit.unwrap();
        let p = cam.pos() + ray(x) * h.dist;
        let (lo, v) = match h.side {
            Side::X => (h.cell.0 as f64, p.x),
            Side::Y => (h.cell.1 as f64, p.y),
        };
        assert!((v - lo).abs() < 1e-6 || (v - lo - 1.0).abs() < 1e-6, "column {x}");
        assert!(h.steps as usize <= 11 + 11);
    }
}

#[test]
fn half_open_door_splits_the_view() {
    let mut e = engine("1 1 7 3  1 1 1 1 1 1 1  1 0 0 3 0 0 1  1 1 1 1 1 1 1");
    e.grid_mut().tile_at_mut(3, 1).unwrap().timer = 0.5;
    e.cast();
    let cells: Vec<_> = e
        .columns()
        .hits
        .iter()
        .filter_map(|h| h.map(|h| h.cell))
        .collect();
    assert!(cells.contains(&(3, 1)));
    assert!(cells.contains(&(6, 1)));
}

#[test]
fn pillar_hides_sprite_behind_it() {
    const PILLAR: &str = "1 2 9 5
        1 1 1 1 1 1 1 1 1
        1 0 0 0 0 0 0 0 1
        1 0 0 0 1 0 0 0 1
        1 0 0 0 0 0 0 0 1
        1 1 1 1 1 1 1 1 1";
    let bank = TextureBank::default();
    let sprite_calls = |e: &mut EngineState| {
        e.build_frame(&bank)
            .iter()
            .filter(|c| matches!(c, DrawCall::Sprite(_)))
            .count()
    };

    let mut e = engine(PILLAR);
    e.set_sprites(vec![Sprite::pickup(dvec2(6.5, 2.5), 0.3, 0.3, 0, 8, 8)]);
    assert_eq!(sprite_calls(&mut e), 0);

    e.set_sprites(vec![Sprite::pickup(dvec2(3.0, 2.5), 0.3, 0.3, 0, 8, 8)]);
    assert!(sprite_calls(&mut e) >= 1);
}

#[test]
fn fog_darkens_with_distance() {
    let fog = FogSettings {
        world_min: 0.1,
        player_light: 0.9,
        multiplier: 1.0,
        ..Default::default()
    };
    let curve = BrightCurve::new(64, 90.0);
    let mut last = f64::INFINITY;
    for i in 1..80 {
        let d = i as f64 * 0.25;
        let b = brightness(&fog, curve.at(32), d, 90.0);
        assert!((0.1..=0.9).contains(&b));
        assert!(b <= last);
        last = b;
    }
    assert_eq!(last, 0.1);
}

#[test]
fn fov_round_trip_and_long_spin() {
    let mut e = engine(&big_room());
    let start = *e.camera();
    assert!(e.change_fov(60.0, false));
    assert!(e.change_fov(start.fov(), false));
    assert!((e.camera().dir() - start.dir()).length() < 1e-12);

    for _ in 0..2000 {
        e.rotate(0.0137);
    }
    let cam = e.camera();
    assert!(cam.dir().dot(cam.plane()).abs() < 1e-9);
    assert!((cam.plane().length() - 1.0).abs() < 1e-9);
}

#[test]
fn level_file_renders() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("room.txt");
    std::fs::write(&path, big_room()).unwrap();

    let cfg = RenderConfig {
        fog_enabled: true,
        ..small()
    };
    let mut e = EngineState::new(cfg, load_level_file(&path).unwrap()).unwrap();
    assert_eq!(e.level_name(), "room");

    let mut sw = Software::default();
    let mut frame = Vec::new();
    e.render(&mut sw, &TextureBank::default(), |buf, w, h| {
        assert_eq!((w, h), (64, 48));
        frame = buf.to_vec();
    });
    assert_eq!(frame.len(), 64 * 48);
    assert!(frame.iter().all(|&p| p >> 24 == 0xFF));
    assert!(frame.iter().any(|&p| p != frame[0]));
}
