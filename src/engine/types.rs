/// Constants that depend on the *frame-buffer*, not on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    pub w: usize,
    pub h: usize,
    pub half_w: f64, // pre-derived for speed
    pub half_h: f64, // pre-derived for speed
}

impl Screen {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            half_w: w as f64 * 0.5,
            half_h: h as f64 * 0.5,
        }
    }

    /// Camera-plane coordinate of column `x`: `-1` at the left edge,
    /// `+1` one past the right edge.
    #[inline(always)]
    pub fn camera_x(&self, x: usize) -> f64 {
        2.0 * x as f64 / self.w as f64 - 1.0
    }

    /// Row the horizon sits on after a vertical look shift.
    #[inline]
    pub fn horizon(&self, vert_look: f64) -> f64 {
        self.half_h + vert_look
    }
}
