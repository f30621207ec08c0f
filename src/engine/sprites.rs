//! Billboard sprite projector.
//!
//! Sprites are drawn back-to-front after all walls.  Each one is clipped
//! against the per-column wall depth so nearer walls hide it; the visible
//! columns are kept as contiguous runs, one billboard per run.

use smallvec::SmallVec;

use crate::{
    config::FogSettings,
    engine::{
        fog::{BrightCurve, brightness, fog_alpha},
        types::Screen,
    },
    renderer::Billboard,
    world::{Camera, Rect, Sprite},
};

/// Sprites closer than this are behind (or inside) the eye.
const MIN_DEPTH: f64 = 1e-6;
/// Projected sizes and positions are clamped to this many pixels so the
/// `i32` screen rectangles never overflow.
const EXTENT_LIMIT: f64 = 1_048_576.0;

/// Visible screen columns `[x0, x1)` of one sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRun {
    pub x0: i32,
    pub x1: i32,
}

/// A sprite after projection and occlusion.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedSprite {
    pub index: usize,
    pub depth: f64,
    /// Centre column, possibly off-screen.
    pub screen_x: i32,
    /// Unclipped destination rectangle.
    pub dest: Rect,
    pub runs: SmallVec<[ClipRun; 2]>,
}

impl ProjectedSprite {
    /// Number of screen columns that will actually be drawn.
    pub fn visible_columns(&self) -> i32 {
        self.runs.iter().map(|r| r.x1 - r.x0).sum()
    }
}

/// Indices of the visible sprites ordered far-to-near; equal distances keep
/// insertion order.
pub fn back_to_front(sprites: &[Sprite], cam: &Camera) -> Vec<usize> {
    let pos = cam.pos();
    let mut order: Vec<(usize, f64)> = sprites
        .iter()
        .enumerate()
        .filter(|(_, s)| s.visible())
        .map(|(i, s)| (i, s.pos.distance_squared(pos)))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    order.into_iter().map(|(i, _)| i).collect()
}

/// Project sprite `index` and split its columns into visible runs.
///
/// `None` when the sprite is behind the eye, degenerate, off-screen or fully
/// hidden.
pub fn project_sprite(
    index: usize,
    sprite: &Sprite,
    cam: &Camera,
    screen: &Screen,
    depth_buf: &[f64],
) -> Option<ProjectedSprite> {
    let t = cam.to_cam(sprite.pos);
    let depth = t.y;
    if depth.is_nan() || depth <= MIN_DEPTH {
        return None;
    }

    let h = screen.h as f64;
    let scale = (h / depth).abs();
    let centre = screen.half_w * (1.0 + t.x / depth);
    let (sw, sh) = (
        (sprite.width * scale).min(EXTENT_LIMIT),
        (sprite.height * scale).min(EXTENT_LIMIT),
    );
    let left = centre - sw * 0.5;
    if !(left < screen.w as f64 && left + sw > 0.0) {
        return None;
    }
    let (screen_x, sw, sh) = (centre as i32, sw as i32, sh as i32);
    if sw <= 0 || sh <= 0 {
        return None;
    }

    /* feet on the floor row at this depth */
    let floor_row =
        screen.horizon(cam.vert_look()) + (screen.half_h + cam.vert_height() * h) / depth;
    let bottom = floor_row.clamp(-EXTENT_LIMIT, EXTENT_LIMIT) as i32;
    let dest = Rect::new(screen_x - sw / 2, bottom - sh, sw, sh);

    let x0 = dest.x.max(0);
    let x1 = dest.right().min(screen.w as i32);
    let mut runs: SmallVec<[ClipRun; 2]> = SmallVec::new();
    let mut open: Option<i32> = None;
    for x in x0..x1 {
        let wall = depth_buf.get(x as usize).copied().unwrap_or(f64::INFINITY);
        match (depth < wall, open) {
            (true, None) => open = Some(x),
            (false, Some(s)) => {
                runs.push(ClipRun { x0: s, x1: x });
                open = None;
            }
            _ => {}
        }
    }
    if let Some(s) = open {
        runs.push(ClipRun { x0: s, x1 });
    }
    if runs.is_empty() {
        return None;
    }

    Some(ProjectedSprite {
        index,
        depth,
        screen_x,
        dest,
        runs,
    })
}

/// One billboard per visible run.  With `fog` set, the tint uses the
/// brightness at the sprite depth on its centre column.
pub fn billboards(
    p: &ProjectedSprite,
    sprite: &Sprite,
    fog: Option<(&FogSettings, &BrightCurve)>,
    screen: &Screen,
    fov_deg: f64,
) -> SmallVec<[Billboard; 2]> {
    let (fog_alpha, fog_color) = match fog {
        Some((settings, curve)) => {
            let col = p.screen_x.clamp(0, screen.w as i32 - 1) as usize;
            let b = brightness(settings, curve.at(col), p.depth, fov_deg);
            (fog_alpha(b), settings.color)
        }
        None => (0, 0),
    };
    let (tex, src, dest) = (sprite.tex, sprite.frame, p.dest);
    p.runs
        .iter()
        .map(|r| Billboard {
            tex,
            src,
            dest,
            clip: Rect::new(r.x0, dest.y, r.x1 - r.x0, dest.h),
            fog_alpha,
            fog_color,
        })
        .collect()
}
