//! Column raycaster: grid DDA from the eye to the first visible tile.
//!
//! * `side` [`Side::X`] = the ray crossed a vertical grid line (x changed),
//!   [`Side::Y`] = it crossed a horizontal one.
//! * Distances are *perpendicular* (measured along the view axis, in `dir`
//!   lengths), so walls come out without fisheye.
//! * Sliding doors sit on the mid-line of their cell and only block the
//!   part of the cell that is still closed.
//! * Every step is bounds-checked and the walk is capped, so an unsealed
//!   grid yields [`RayOutcome::Miss`] instead of looping forever.

use glam::DVec2;

use crate::{
    engine::types::Screen,
    world::{Camera, Grid, Tile},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    X = 0,
    Y = 1,
}

/// Where and how a single ray stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnHit {
    /// Perpendicular distance to the hit surface.
    pub dist: f64,
    pub side: Side,
    pub cell: (i32, i32),
    pub ray_dir: DVec2,
    /// DDA steps taken to get here.
    pub steps: u32,
}

impl ColumnHit {
    /// Distance from the eye to the hit line along the crossed axis only.
    #[inline]
    pub fn axis_dist(&self) -> f64 {
        match self.side {
            Side::X => (self.dist * self.ray_dir.x).abs(),
            Side::Y => (self.dist * self.ray_dir.y).abs(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RayOutcome {
    Hit(ColumnHit),
    /// Left the grid or exhausted the step budget.
    Miss { steps: u32 },
}

impl RayOutcome {
    #[inline]
    pub fn hit(self) -> Option<ColumnHit> {
        match self {
            RayOutcome::Hit(h) => Some(h),
            RayOutcome::Miss { .. } => None,
        }
    }
}

/// The tile straight ahead of the camera (centre column).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockAhead {
    pub x: i32,
    pub y: i32,
    /// Axis-aligned distance to the face that was hit.
    pub dist: f64,
}

impl From<&ColumnHit> for BlockAhead {
    fn from(h: &ColumnHit) -> Self {
        Self {
            x: h.cell.0,
            y: h.cell.1,
            dist: h.axis_dist(),
        }
    }
}

/// Cells hit by the outermost columns.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Periphery {
    pub left: Option<(i32, i32)>,
    pub right: Option<(i32, i32)>,
}

/// Per-column results of one frame.
#[derive(Clone, Debug, Default)]
pub struct ColumnBuffers {
    pub hits: Vec<Option<ColumnHit>>,
    /// Wall depth per column; `+inf` where the ray missed.
    pub depth: Vec<f64>,
    pub block_ahead: Option<BlockAhead>,
    pub periphery: Periphery,
    /// Rays that missed this frame.
    pub misses: usize,
}

/// Upper bound on DDA steps for `grid`.  A sealed grid never needs more
/// than `width + height`.
#[inline]
pub fn step_budget(grid: &Grid) -> u32 {
    (2 * (grid.width() + grid.height()) + 4) as u32
}

/*──────────────────────── DDA ────────────────────────*/

/// Per-axis DDA setup: (step, first crossing, crossing spacing).
#[inline(always)]
fn axis_setup(p: f64, cell: i32, r: f64) -> (i32, f64, f64) {
    if r == 0.0 {
        return (1, f64::INFINITY, f64::INFINITY);
    }
    let delta = (1.0 / r).abs();
    if r < 0.0 {
        (-1, (p - cell as f64) * delta, delta)
    } else {
        (1, (cell as f64 + 1.0 - p) * delta, delta)
    }
}

/// Door panel test.  `perp` is the distance to the panel half a cell in,
/// `exit` the distance at which the ray leaves the cell sideways.
#[inline]
fn door_blocks(tile: &Tile, pos_lateral: f64, ray_lateral: f64, perp: f64, exit: f64) -> bool {
    let w = pos_lateral + perp * ray_lateral;
    let w = w - w.floor();
    exit > perp && w <= tile.timer
}

/// Walk `ray` from `pos` through `grid` until a visible tile stops it.
pub fn cast_ray(grid: &Grid, pos: DVec2, ray: DVec2, max_steps: u32) -> RayOutcome {
    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;
    let (step_x, mut side_x, delta_x) = axis_setup(pos.x, map_x, ray.x);
    let (step_y, mut side_y, delta_y) = axis_setup(pos.y, map_y, ray.y);

    for steps in 1..=max_steps {
        /* y wins ties */
        let side = if side_x < side_y {
            map_x += step_x;
            side_x += delta_x;
            Side::X
        } else {
            map_y += step_y;
            side_y += delta_y;
            Side::Y
        };

        let Some(tile) = grid.get(map_x, map_y) else {
            return RayOutcome::Miss { steps };
        };
        if !tile.visible() {
            continue;
        }

        let dist = match (side, tile.is_door()) {
            (Side::X, false) => (map_x as f64 - pos.x + (1 - step_x) as f64 * 0.5) / ray.x,
            (Side::Y, false) => (map_y as f64 - pos.y + (1 - step_y) as f64 * 0.5) / ray.y,
            (Side::X, true) => {
                let perp = (map_x as f64 + step_x as f64 * 0.5 - pos.x
                    + (1 - step_x) as f64 * 0.5)
                    / ray.x;
                if !door_blocks(tile, pos.y, ray.y, perp, side_y) {
                    continue;
                }
                perp
            }
            (Side::Y, true) => {
                let perp = (map_y as f64 + step_y as f64 * 0.5 - pos.y
                    + (1 - step_y) as f64 * 0.5)
                    / ray.y;
                if !door_blocks(tile, pos.x, ray.x, perp, side_x) {
                    continue;
                }
                perp
            }
        };

        return RayOutcome::Hit(ColumnHit {
            dist,
            side,
            cell: (map_x, map_y),
            ray_dir: ray,
            steps,
        });
    }
    RayOutcome::Miss { steps: max_steps }
}

/// Cast every screen column and refill `buf`.
pub fn cast_columns(cam: &Camera, grid: &Grid, screen: &Screen, buf: &mut ColumnBuffers) {
    let budget = step_budget(grid);
    buf.hits.clear();
    buf.depth.clear();
    buf.misses = 0;

    for x in 0..screen.w {
        let ray = cam.project(screen.camera_x(x));
        match cast_ray(grid, cam.pos(), ray, budget) {
            RayOutcome::Hit(h) => {
                buf.depth.push(h.dist);
                buf.hits.push(Some(h));
            }
            RayOutcome::Miss { .. } => {
                buf.misses += 1;
                buf.depth.push(f64::INFINITY);
                buf.hits.push(None);
            }
        }
    }

    let cell = |x: usize| buf.hits.get(x).copied().flatten();
    buf.block_ahead = cell(screen.w / 2).as_ref().map(BlockAhead::from);
    buf.periphery = Periphery {
        left: cell(0).map(|h| h.cell),
        right: screen.w.checked_sub(1).and_then(cell).map(|h| h.cell),
    };
}

/// Centre-column probe without touching the frame buffers.
pub fn block_ahead(cam: &Camera, grid: &Grid) -> Option<BlockAhead> {
    cast_ray(grid, cam.pos(), cam.dir(), step_budget(grid))
        .hit()
        .as_ref()
        .map(BlockAhead::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    use crate::world::TileKind;

    const EPS: f64 = 1e-9;

    fn room() -> Grid {
        Grid::walled(6, 6, TileKind::Air)
    }

    #[test]
    fn axis_aligned_hit() {
        let g = room();
        let h = cast_ray(&g, dvec2(2.5, 2.5), dvec2(1.0, 0.0), 64)
            .hit()
            .unwrap();
        assert_eq!(h.cell, (5, 2));
        assert_eq!(h.side, Side::X);
        assert!((h.dist - 2.5).abs() < EPS);
        assert_eq!(h.steps, 3);
    }

    #[test]
    fn exact_corner_prefers_y_step() {
        let g = room();
        let h = cast_ray(&g, dvec2(2.5, 2.5), dvec2(1.0, 1.0), 64)
            .hit()
            .unwrap();
        // (2,3) (3,3) (3,4) (4,4) (4,5)
        assert_eq!(h.cell, (4, 5));
        assert_eq!(h.side, Side::Y);
        assert!((h.dist - 2.5).abs() < EPS);
        assert_eq!(h.steps, 5);
    }

    #[test]
    fn negative_direction() {
        let g = room();
        let h = cast_ray(&g, dvec2(3.25, 2.5), dvec2(-1.0, 0.0), 64)
            .hit()
            .unwrap();
        assert_eq!(h.cell, (0, 2));
        assert!((h.dist - 2.25).abs() < EPS);
        assert!((h.axis_dist() - 2.25).abs() < EPS);
    }

    #[test]
    fn open_grid_misses() {
        let mut g = room();
        g.set_kind(0, 2, TileKind::Air).unwrap();
        let out = cast_ray(&g, dvec2(2.5, 2.5), dvec2(-1.0, 0.0), 64);
        assert!(matches!(out, RayOutcome::Miss { steps: 3 }));
    }

    #[test]
    fn step_cap_bounds_the_walk() {
        let g = Grid::walled(40, 3, TileKind::Air);
        let out = cast_ray(&g, dvec2(1.5, 1.5), dvec2(1.0, 0.0), 5);
        assert_eq!(out, RayOutcome::Miss { steps: 5 });
    }

    #[test]
    fn every_angle_hits_the_border_within_budget() {
        let g = Grid::walled(8, 6, TileKind::Air);
        let pos = dvec2(3.3, 2.7);
        for k in 0..16 {
            let a = k as f64 * std::f64::consts::TAU / 16.0 + 0.01;
            let ray = dvec2(a.cos(), a.sin());
            let h = cast_ray(&g, pos, ray, step_budget(&g)).hit().unwrap();
            assert!(h.steps <= 8 + 6, "angle {k}: {} steps", h.steps);
            assert!(g.is_solid(h.cell.0, h.cell.1));

            /* the hit point lies on the struck cell's boundary line */
            let p = pos + ray * h.dist;
            let (lo, v) = match h.side {
                Side::X => (h.cell.0 as f64, p.x),
                Side::Y => (h.cell.1 as f64, p.y),
            };
            assert!((v - lo).abs() < 1e-6 || (v - lo - 1.0).abs() < 1e-6, "angle {k}");
        }
    }

    fn door_corridor(timer: f64) -> Grid {
        let mut g = Grid::walled(7, 3, TileKind::Air);
        g.set_kind(3, 1, TileKind::Door).unwrap();
        g.tile_at_mut(3, 1).unwrap().timer = timer;
        g
    }

    #[test]
    fn half_open_door() {
        let g = door_corridor(0.5);
        let pos = dvec2(1.5, 1.5);

        /* crosses the panel at y = 1.3 -> still closed there */
        let h = cast_ray(&g, pos, dvec2(1.0, -0.1), 64).hit().unwrap();
        assert_eq!(h.cell, (3, 1));
        assert!((h.dist - 2.0).abs() < EPS);

        /* crosses at y = 1.7 -> the open part */
        let h = cast_ray(&g, pos, dvec2(1.0, 0.1), 64).hit().unwrap();
        assert_ne!(h.cell, (3, 1));
        assert!(h.dist > 2.0);
    }

    #[test]
    fn open_door_is_transparent_to_rays() {
        let mut g = door_corridor(1.0);
        g.set_opening(3, 1, true).unwrap();
        g.update_doors((3, 1), 2, 1.0);
        let h = cast_ray(&g, dvec2(1.5, 1.5), dvec2(1.0, 0.0), 64)
            .hit()
            .unwrap();
        assert_eq!(h.cell, (6, 1));
    }

    #[test]
    fn vertical_door_panel() {
        let mut g = Grid::walled(3, 7, TileKind::Air);
        g.set_kind(1, 3, TileKind::Door).unwrap();
        let h = cast_ray(&g, dvec2(1.5, 5.5), dvec2(0.0, -1.0), 64)
            .hit()
            .unwrap();
        assert_eq!((h.cell, h.side), ((1, 3), Side::Y));
        assert!((h.dist - 2.0).abs() < EPS);
    }

    #[test]
    fn columns_fill_buffers() {
        let g = room();
        let cam = Camera::new(dvec2(2.5, 2.5), 90.0);
        let screen = Screen::new(64, 48);
        let mut buf = ColumnBuffers::default();
        cast_columns(&cam, &g, &screen, &mut buf);

        assert_eq!(buf.depth.len(), 64);
        assert_eq!(buf.misses, 0);
        assert!(buf.depth.iter().all(|d| d.is_finite() && *d > 0.0));
        let ahead = buf.block_ahead.unwrap();
        assert_eq!((ahead.x, ahead.y), (5, 2));
        assert!((ahead.dist - 2.5).abs() < EPS);
        assert_eq!(block_ahead(&cam, &g), Some(ahead));
        assert!(buf.periphery.left.is_some() && buf.periphery.right.is_some());
    }
}
