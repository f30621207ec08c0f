//! Tile collision with wall sliding.
//!
//! * Each axis is tried on its own, so a blocked X move still lets Y slide.
//! * Both the target and the body edge (`radius`) beyond it are tested.
//! * Cells outside the grid count as solid.

use glam::DVec2;

use crate::world::Grid;

/// Collision radius of the player, in cells.
pub const PLAYER_RADIUS: f64 = 0.3;

/// What the caller gets back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveResult {
    pub pos: DVec2,
    /// At least one axis was refused.
    pub hit_wall: bool,
}

#[inline]
fn cell(v: f64) -> i32 {
    v.floor() as i32
}

/// Cells to test along one axis for a move of `d`.
#[inline]
fn probes(p: f64, d: f64, radius: f64) -> [i32; 2] {
    [cell(p + d), cell(p + d + d.signum() * radius)]
}

/// Move `pos` by `delta`, refusing each axis separately when it would put
/// the body into a solid tile.
pub fn slide_move(grid: &Grid, mut pos: DVec2, delta: DVec2, radius: f64) -> MoveResult {
    let mut hit_wall = false;

    /* ----- X, probed on the current row ------------------------------- */
    if delta.x != 0.0 {
        let row = cell(pos.y);
        if probes(pos.x, delta.x, radius)
            .iter()
            .any(|&x| grid.is_solid(x, row))
        {
            hit_wall = true;
        } else {
            pos.x += delta.x;
        }
    }

    /* ----- Y, probed on the (possibly new) column --------------------- */
    if delta.y != 0.0 {
        let col = cell(pos.x);
        if probes(pos.y, delta.y, radius)
            .iter()
            .any(|&y| grid.is_solid(col, y))
        {
            hit_wall = true;
        } else {
            pos.y += delta.y;
        }
    }

    MoveResult { pos, hit_wall }
}
