use glam::{DVec2, dvec2};

/// Narrowest horizontal FoV accepted by [`Camera::change_fov`] (degrees).
pub const FOV_MIN: f64 = 45.0;
/// Widest horizontal FoV accepted by [`Camera::change_fov`] (degrees).
pub const FOV_MAX: f64 = 179.0;

/// Eye height the camera is reset to on level load (fraction of a cell).
pub const DEFAULT_EYE_HEIGHT: f64 = 0.1;
/// Lowest / highest eye offset reachable with [`Camera::raise`].
pub const EYE_HEIGHT_MIN: f64 = -0.2;
pub const EYE_HEIGHT_MAX: f64 = 0.4;

/// Player view-point on the tile grid.
///
/// * `dir` points where the camera looks; its length is the focal length
///   `1 / tan(fov / 2)`, so zooming only rescales `dir`.
/// * `plane` is the projection plane: always unit length and always
///   `dir.perp()` direction, i.e. screen column `W-1` lies along `+plane`.
/// * `vert_look` is a flat pixel shift of the horizon, `vert_height` the eye
///   height offset in cells (parallax for walls, floors and sprites).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pos: DVec2,
    dir: DVec2,
    plane: DVec2,
    fov: f64, // degrees
    vert_look: f64,
    vert_height: f64,
}

#[inline]
fn focal_for(fov_deg: f64) -> f64 {
    1.0 / (fov_deg.to_radians() * 0.5).tan()
}

impl Camera {
    /// Camera at `pos` facing east (+X) with horizontal FoV `fov_deg`.
    ///
    /// The FoV is clamped into [`FOV_MIN`, `FOV_MAX`].
    pub fn new(pos: DVec2, fov_deg: f64) -> Self {
        let fov = fov_deg.clamp(FOV_MIN, FOV_MAX);
        Self {
            pos,
            dir: dvec2(focal_for(fov), 0.0),
            plane: dvec2(0.0, 1.0),
            fov,
            vert_look: 0.0,
            vert_height: DEFAULT_EYE_HEIGHT,
        }
    }

    /*──────────────────────── accessors ───────────────────────*/

    #[inline]
    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    #[inline]
    pub fn dir(&self) -> DVec2 {
        self.dir
    }

    #[inline]
    pub fn plane(&self) -> DVec2 {
        self.plane
    }

    /// Horizontal field of view in degrees.
    #[inline]
    pub fn fov(&self) -> f64 {
        self.fov
    }

    #[inline]
    pub fn vert_look(&self) -> f64 {
        self.vert_look
    }

    #[inline]
    pub fn vert_height(&self) -> f64 {
        self.vert_height
    }

    /// Heading in radians, `atan2(dir.y, dir.x)` mapped into `[0, TAU)`.
    pub fn yaw(&self) -> f64 {
        self.dir.y.atan2(self.dir.x).rem_euclid(std::f64::consts::TAU)
    }

    /// Integer cell the eye currently stands in.
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.pos.x.floor() as i32, self.pos.y.floor() as i32)
    }

    /*──────────────────────── projection ──────────────────────*/

    /// Ray direction through `camera_x ∈ [-1, 1]` on the projection plane.
    #[inline(always)]
    pub fn project(&self, camera_x: f64) -> DVec2 {
        self.dir + self.plane * camera_x
    }

    /// Transform world point `p` with the inverse of `[plane dir]`:
    ///  .x = lateral offset on the projection plane (+ towards `plane`)
    ///  .y = depth along the view axis (in `dir` lengths)
    #[inline]
    pub fn to_cam(&self, p: DVec2) -> DVec2 {
        let rel = p - self.pos;
        let inv_det = 1.0 / (self.plane.x * self.dir.y - self.dir.x * self.plane.y);
        dvec2(
            inv_det * (self.dir.y * rel.x - self.dir.x * rel.y),
            inv_det * (-self.plane.y * rel.x + self.plane.x * rel.y),
        )
    }

    /*──────────────────────── mutation ────────────────────────*/

    /// Rotate view and projection plane together by `delta` radians
    /// (positive = counter-clockwise in map coordinates).
    ///
    /// Both vectors are rotated from the same snapshot; afterwards the plane
    /// is re-derived from `dir` so accumulated rounding never skews them.
    pub fn rotate(&mut self, delta: f64) {
        let rot = DVec2::from_angle(delta);
        self.dir = rot.rotate(self.dir);
        self.plane = rot.rotate(self.plane);
        self.renormalize();
    }

    /// Change the horizontal FoV, absolute or `relative` to the current one.
    ///
    /// Returns `false` (and changes nothing) when the result would leave
    /// [`FOV_MIN`, `FOV_MAX`] or is not finite.
    pub fn change_fov(&mut self, fov_deg: f64, relative: bool) -> bool {
        let target = if relative { self.fov + fov_deg } else { fov_deg };
        if !target.is_finite() || !(FOV_MIN..=FOV_MAX).contains(&target) {
            log::warn!("rejected FoV {target:.1}° (allowed {FOV_MIN}°..{FOV_MAX}°)");
            return false;
        }
        self.fov = target;
        self.dir = self.dir.normalize() * focal_for(target);
        log::debug!("FoV now {target:.1}°");
        true
    }

    /// Shift the horizon by `dy` pixels, clamped to half the screen height.
    pub fn look(&mut self, dy: f64, screen_h: usize) {
        let limit = screen_h as f64 * 0.5;
        self.vert_look = (self.vert_look + dy).clamp(-limit, limit);
    }

    /// Raise (or lower, for negative `dz`) the eye.
    pub fn raise(&mut self, dz: f64) {
        self.vert_height = (self.vert_height + dz).clamp(EYE_HEIGHT_MIN, EYE_HEIGHT_MAX);
    }

    /// Teleport without collision; callers go through `sim::slide_move`.
    #[inline]
    pub fn set_pos(&mut self, pos: DVec2) {
        self.pos = pos;
    }

    /// Back to the level-start pose: facing east, level horizon, default
    /// eye height.  The current FoV is kept.
    pub fn reset(&mut self, pos: DVec2) {
        *self = Self::new(pos, self.fov);
    }

    fn renormalize(&mut self) {
        let focal = focal_for(self.fov);
        self.dir = self.dir.normalize() * focal;
        self.plane = self.dir.perp() / focal;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
