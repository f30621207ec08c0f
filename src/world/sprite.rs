use bitflags::bitflags;
use glam::DVec2;

use crate::world::texture::TextureId;

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SpriteFlags: u8 {
        /// Drawn by the billboard projector.
        const VISIBLE = 0x01;
        /// Removed when the player touches it.
        const PICKUP  = 0x02;
    }
}

/// Integer rectangle in pixels (texture or screen space).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// World-space billboard.
///
/// `width` / `height` are fractions of one cell; the sprite stands on the
/// floor and is centred on `pos`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub pos: DVec2,
    pub width: f64,
    pub height: f64,
    pub tex: TextureId,
    /// Source rectangle inside `tex` (the current animation frame).
    pub frame: Rect,
    pub flags: SpriteFlags,
}

impl Sprite {
    /// Visible pickup showing the whole `tex_w × tex_h` texture.
    pub fn pickup(pos: DVec2, width: f64, height: f64, tex: TextureId, tex_w: i32, tex_h: i32) -> Self {
        Self {
            pos,
            width,
            height,
            tex,
            frame: Rect::new(0, 0, tex_w, tex_h),
            flags: SpriteFlags::VISIBLE | SpriteFlags::PICKUP,
        }
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.flags.contains(SpriteFlags::VISIBLE)
    }
}
