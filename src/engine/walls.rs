//! Wall projector: one textured vertical strip per screen column.

use glam::DVec2;

use crate::{
    config::{FogSettings, Lighting},
    engine::{
        raycast::{ColumnHit, Side},
        types::Screen,
    },
    renderer::WallStrip,
    world::{Camera, Tile, WallFace, texture::TextureId},
};

/// Screen rows `[top, bot)` covered by a wall `dist` away.
///
/// Line height is `H / dist`; the eye height shifts the span by
/// `vert_height · H / dist` (parallax), the look offset by a flat amount.
#[inline]
pub fn wall_span(dist: f64, cam: &Camera, screen: &Screen) -> (i32, i32) {
    let h = screen.h as f64;
    let line_h = h / dist;
    let centre = screen.horizon(cam.vert_look()) + cam.vert_height() * h / dist;
    let top = (centre - line_h * 0.5).floor() as i32;
    let bot = (centre + line_h * 0.5).floor() as i32;
    (top, bot)
}

/// Empty span sitting on the horizon (ray miss).
#[inline]
pub fn horizon_span(cam: &Camera, screen: &Screen) -> (i32, i32) {
    let row = screen.horizon(cam.vert_look()).ceil() as i32;
    (row, row)
}

/// Which face of the hit cell the ray struck.
#[inline]
pub fn wall_face(hit: &ColumnHit) -> WallFace {
    match hit.side {
        Side::Y if hit.ray_dir.y > 0.0 => WallFace::North,
        Side::Y => WallFace::South,
        Side::X if hit.ray_dir.x < 0.0 => WallFace::East,
        Side::X => WallFace::West,
    }
}

/// Fractional position along the hit face, shifted by `1 - timer` on doors
/// so the panel slides with its opening.
#[inline]
pub fn wall_u(hit: &ColumnHit, pos: DVec2, tile: &Tile) -> f64 {
    let w = match hit.side {
        Side::X => pos.y + hit.dist * hit.ray_dir.y,
        Side::Y => pos.x + hit.dist * hit.ray_dir.x,
    };
    let u = w - w.floor();
    if tile.is_door() { u + (1.0 - tile.timer) } else { u }
}

/// Texel column for `u`, mirrored on the East and North faces so every
/// face reads left-to-right from outside.
#[inline]
pub fn tex_column(hit: &ColumnHit, u: f64, tex_w: usize) -> usize {
    let w = tex_w.max(1) as i64;
    let tx = ((u * w as f64) as i64).clamp(0, w - 1);
    let flip = matches!(
        (hit.side, hit.ray_dir.x < 0.0, hit.ray_dir.y > 0.0),
        (Side::X, true, _) | (Side::Y, _, true)
    );
    (if flip { w - tx - 1 } else { tx }) as usize
}

/// Strip brightness, 255 = unshaded.
#[inline]
pub fn wall_brightness(
    lighting: Lighting,
    fog: &FogSettings,
    hit: &ColumnHit,
    screen_h: usize,
    curve: f64,
) -> u8 {
    match lighting {
        Lighting::TwoTone => match hit.side {
            Side::X => 255,
            Side::Y => 127,
        },
        Lighting::Ambient => {
            let line_h = screen_h as f64 / hit.dist;
            let b = line_h * fog.player_light * curve / (fog.multiplier * hit.dist * 256.0);
            let b = b.min(fog.player_light).max(fog.world_min);
            (b * 255.0).round().clamp(0.0, 255.0) as u8
        }
    }
}

/// Build the draw call for column `x`.  `tex_w` is the width of the texture
/// `tex` resolves to.
pub fn project_wall(
    x: usize,
    hit: &ColumnHit,
    tile: &Tile,
    cam: &Camera,
    screen: &Screen,
    tex: TextureId,
    tex_w: usize,
    brightness: u8,
) -> WallStrip {
    let (y_top, y_bot) = wall_span(hit.dist, cam, screen);
    let u = wall_u(hit, cam.pos(), tile);
    WallStrip {
        x: x as i32,
        y_top,
        y_bot,
        tex,
        tex_x: tex_column(hit, u, tex_w),
        brightness,
    }
}
