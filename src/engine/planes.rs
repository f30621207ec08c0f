//! Floor / ceiling projector.
//!
//! Both modes sample the same world point for a given pixel:
//!
//! * **Rows**: walk each scan-line from the leftmost to the rightmost ray,
//!   stepping a world-space vector per pixel.
//! * **Columns**: walk each column outward from the wall span, sliding
//!   between the eye and the wall base with weight `row_dist / wall_dist`.
//!
//! Row distances come from [`RowDistanceTable`], rebuilt whenever the look
//! offset, eye height or screen height changes.

use glam::DVec2;

use crate::{
    config::FloorMode,
    engine::{raycast::ColumnBuffers, types::Screen},
    renderer::{PlaneBuffer, Rgba},
    world::{Camera, Texture},
};

const OPAQUE: Rgba = 0xFF00_0000;

/// Distance (in `dir` lengths) of the floor or ceiling seen through each
/// screen row.  `+inf` on the horizon row itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowDistanceTable {
    rows: Vec<f64>,
    horizon: f64,
}

impl RowDistanceTable {
    /// * below the horizon: `(H/2 + vh·H) / (y - horizon)`
    /// * above it: `-(H/2 - vh·H) / (y - horizon)`
    ///
    /// Both agree with the wall span edges at every distance.
    pub fn new(screen: &Screen, vert_look: f64, vert_height: f64) -> Self {
        let h = screen.h as f64;
        let horizon = screen.horizon(vert_look);
        let floor_num = screen.half_h + vert_height * h;
        let ceil_num = screen.half_h - vert_height * h;
        let rows = (0..screen.h)
            .map(|y| {
                let p = y as f64 - horizon;
                if p == 0.0 {
                    f64::INFINITY
                } else if p > 0.0 {
                    floor_num / p
                } else {
                    -ceil_num / p
                }
            })
            .collect();
        log::trace!("row table rebuilt: horizon {horizon:.1}, eye {vert_height:.2}");
        Self { rows, horizon }
    }

    #[inline(always)]
    pub fn at(&self, y: usize) -> f64 {
        self.rows.get(y).copied().unwrap_or(f64::INFINITY)
    }

    #[inline]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Rows at or below the horizon show the floor.
    #[inline]
    pub fn is_floor(&self, y: usize) -> bool {
        y as f64 >= self.horizon
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Plane textures; `ceiling: None` leaves the upper half to the sky.
pub struct PlaneTextures<'a> {
    pub floor: &'a Texture,
    pub ceiling: Option<&'a Texture>,
}

/*──────────────────────── world points ───────────────────────*/

/// Floor/ceiling point under pixel `(x, y)` by row stepping.
#[inline(always)]
pub fn row_point(cam: &Camera, screen: &Screen, row_dist: f64, x: usize) -> DVec2 {
    let r0 = cam.dir() - cam.plane();
    let r1 = cam.dir() + cam.plane();
    let step = row_dist * (r1 - r0) / screen.w as f64;
    cam.pos() + row_dist * r0 + step * x as f64
}

/// Same point by interpolating from the eye to the wall base.
#[inline(always)]
pub fn column_point(pos: DVec2, ray: DVec2, wall_dist: f64, row_dist: f64) -> DVec2 {
    let weight = row_dist / wall_dist;
    let anchor = pos + wall_dist * ray;
    weight * anchor + (1.0 - weight) * pos
}

/*──────────────────────── painters ───────────────────────────*/

fn sample(tex: &Texture, p: DVec2) -> Rgba {
    tex.sample_frac(p.x, p.y) | OPAQUE
}

fn paint_rows(
    cam: &Camera,
    screen: &Screen,
    table: &RowDistanceTable,
    tex: &PlaneTextures,
    px: &mut [Rgba],
) {
    let w = screen.w;
    let r0 = cam.dir() - cam.plane();
    let r1 = cam.dir() + cam.plane();
    for y in 0..screen.h {
        let rd = table.at(y);
        if !rd.is_finite() {
            continue;
        }
        let t = if table.is_floor(y) {
            tex.floor
        } else {
            match tex.ceiling {
                Some(t) => t,
                None => continue,
            }
        };
        let step = rd * (r1 - r0) / w as f64;
        let mut p = cam.pos() + rd * r0;
        for dst in &mut px[y * w..(y + 1) * w] {
            *dst = sample(t, p);
            p += step;
        }
    }
}

fn paint_columns(
    cam: &Camera,
    screen: &Screen,
    table: &RowDistanceTable,
    cols: &ColumnBuffers,
    spans: &[(i32, i32)],
    tex: &PlaneTextures,
    px: &mut [Rgba],
) {
    let (w, h) = (screen.w, screen.h);
    let pos = cam.pos();
    for x in 0..w {
        let ray = cam.project(screen.camera_x(x));
        /* a miss paints the full column with the ray at unit distance */
        let wall_dist = cols
            .depth
            .get(x)
            .copied()
            .filter(|d| d.is_finite())
            .unwrap_or(1.0);
        let (top, bot) = spans.get(x).copied().unwrap_or((0, 0));

        let floor_from = bot.max(table.horizon().ceil() as i32).max(0) as usize;
        for y in floor_from..h {
            let rd = table.at(y);
            if rd.is_finite() {
                px[y * w + x] = sample(tex.floor, column_point(pos, ray, wall_dist, rd));
            }
        }

        let Some(ceil) = tex.ceiling else { continue };
        let ceil_to = (top.min(table.horizon().ceil() as i32).max(0) as usize).min(h);
        for y in 0..ceil_to {
            let rd = table.at(y);
            if rd.is_finite() {
                px[y * w + x] = sample(ceil, column_point(pos, ray, wall_dist, rd));
            }
        }
    }
}

/// Paint floor (and ceiling, when given) into a fresh plane buffer.
/// Unpainted texels stay `0` (transparent).
pub fn build_planes(
    mode: FloorMode,
    cam: &Camera,
    screen: &Screen,
    table: &RowDistanceTable,
    cols: &ColumnBuffers,
    spans: &[(i32, i32)],
    tex: &PlaneTextures,
) -> PlaneBuffer {
    let mut pixels = vec![0; screen.w * screen.h];
    match mode {
        FloorMode::Rows => paint_rows(cam, screen, table, tex, &mut pixels),
        FloorMode::Columns => paint_columns(cam, screen, table, cols, spans, tex, &mut pixels),
    }
    PlaneBuffer {
        width: screen.w,
        height: screen.h,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{raycast::cast_columns, walls::wall_span},
        world::{Grid, TileKind},
    };
    use glam::dvec2;

    #[test]
    fn table_matches_wall_edges() {
        let screen = Screen::new(320, 240);
        let mut cam = Camera::new(dvec2(2.5, 2.5), 90.0);
        cam.look(-17.0, 240);
        let t = RowDistanceTable::new(&screen, cam.vert_look(), cam.vert_height());

        for d in [0.75, 1.0, 2.5, 7.0] {
            let h = 240.0;
            let centre = t.horizon() + cam.vert_height() * h / d;
            let bot = centre + h / d * 0.5;
            let top = centre - h / d * 0.5;
            let below = (h * 0.5 + cam.vert_height() * h) / (bot - t.horizon());
            let above = -(h * 0.5 - cam.vert_height() * h) / (top - t.horizon());
            assert!((below - d).abs() < 1e-9);
            assert!((above - d).abs() < 1e-9);
        }
        assert_eq!(t.len(), 240);
        assert!(t.at(103).is_infinite()); // 120 - 17
        assert!(t.is_floor(103) && !t.is_floor(102));
        assert!(t.at(239) > 0.0 && t.at(0) > 0.0);
    }

    #[test]
    fn rows_and_columns_agree() {
        let screen = Screen::new(64, 48);
        let mut cam = Camera::new(dvec2(2.3, 3.6), 75.0);
        cam.rotate(0.4);
        cam.raise(0.05);
        let t = RowDistanceTable::new(&screen, cam.vert_look(), cam.vert_height());
        let grid = Grid::walled(8, 8, TileKind::Air);
        let mut cols = ColumnBuffers::default();
        cast_columns(&cam, &grid, &screen, &mut cols);

        for x in [0usize, 13, 32, 63] {
            let ray = cam.project(screen.camera_x(x));
            let d = cols.depth[x];
            for y in [0usize, 5, 30, 47] {
                let rd = t.at(y);
                let a = row_point(&cam, &screen, rd, x);
                let b = column_point(cam.pos(), ray, d, rd);
                assert!((a - b).length() < 1e-9, "x={x} y={y}");
            }
        }
    }

    #[test]
    fn columns_mode_paints_outside_walls_only() {
        let screen = Screen::new(32, 24);
        let cam = Camera::new(dvec2(2.5, 2.5), 90.0);
        let t = RowDistanceTable::new(&screen, 0.0, cam.vert_height());
        let grid = Grid::walled(6, 6, TileKind::Air);
        let mut cols = ColumnBuffers::default();
        cast_columns(&cam, &grid, &screen, &mut cols);
        let spans: Vec<_> = cols.depth.iter().map(|&d| wall_span(d, &cam, &screen)).collect();

        let floor = Texture::new("F", 1, 1, vec![0xFF_00FF00]).unwrap();
        let ceil = Texture::new("C", 1, 1, vec![0xFF_0000FF]).unwrap();
        let tex = PlaneTextures {
            floor: &floor,
            ceiling: Some(&ceil),
        };
        let rows = build_planes(FloorMode::Rows, &cam, &screen, &t, &cols, &spans, &tex);
        let by_col = build_planes(FloorMode::Columns, &cam, &screen, &t, &cols, &spans, &tex);

        let x = 16;
        let (top, bot) = spans[x];
        for y in 0..24usize {
            let a = by_col.pixels[y * 32 + x];
            if (y as i32) < top {
                assert_eq!(a, 0xFF_0000FF);
            } else if (y as i32) >= bot {
                assert_eq!(a, 0xFF_00FF00);
            } else {
                assert_eq!(a, 0);
            }
        }
        /* rows mode covers everything except the horizon row */
        assert_eq!(rows.pixels.iter().filter(|&&p| p == 0).count(), 32);
    }

    #[test]
    fn no_ceiling_leaves_upper_half_empty() {
        let screen = Screen::new(16, 10);
        let cam = Camera::new(dvec2(2.5, 2.5), 90.0);
        let t = RowDistanceTable::new(&screen, 0.0, 0.1);
        let floor = Texture::default();
        let tex = PlaneTextures {
            floor: &floor,
            ceiling: None,
        };
        let cols = ColumnBuffers::default();
        let p = build_planes(FloorMode::Rows, &cam, &screen, &t, &cols, &[], &tex);
        assert!(p.pixels[..16 * 5].iter().all(|&px| px == 0));
        assert!(p.pixels[16 * 6..].iter().all(|&px| px >> 24 == 0xFF));
    }
}
