//! Rendering abstraction layer.
//!
//! *The engine never touches a pixel buffer directly.*
//! Every frame it produces a list of [`DrawCall`]s (back-to-front) and hands
//! them to a type that implements [`Renderer`].
//!
//! * Textures are referenced by [`TextureId`] only; the backend resolves
//!   them against its [`TextureBank`] when a call executes.
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.

use crate::world::{
    sprite::Rect,
    texture::{TextureBank, TextureId},
};

/// Pixel format of every buffer crossing this boundary (0xAARRGGBB).
pub type Rgba = u32;

/// Horizontally wrapping panorama above the horizon (ceiling disabled).
#[derive(Clone, Debug, PartialEq)]
pub struct Sky {
    /// `None` = fill with `color`.
    pub tex: Option<TextureId>,
    pub color: Rgba,
    /// Left screen edge as a fraction `[0, 1)` of the panorama.
    pub offset: f64,
    /// Visible fraction of the panorama (`fov / 360`).
    pub span: f64,
    /// First row that belongs to the floor half.
    pub horizon: i32,
}

/// Full-frame floor/ceiling image.  Texels with alpha 0 were not painted
/// and must leave the frame untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgba>,
}

/// One textured, one-pixel-wide wall column.
#[derive(Clone, Debug, PartialEq)]
pub struct WallStrip {
    pub x: i32,
    /// Unclipped screen span `[y_top, y_bot)`; may exceed the screen.
    pub y_top: i32,
    pub y_bot: i32,
    pub tex: TextureId,
    /// Texel column inside `tex`.
    pub tex_x: usize,
    /// Colour modulation, 255 = unchanged.
    pub brightness: u8,
}

/// Per-pixel fog opacity over the whole frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FogMask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,
    pub color: Rgba,
}

/// Camera-facing sprite, scaled from `src` into `dest` and drawn only
/// inside `clip` (the columns not hidden by nearer walls).
#[derive(Clone, Debug, PartialEq)]
pub struct Billboard {
    pub tex: TextureId,
    pub src: Rect,
    pub dest: Rect,
    pub clip: Rect,
    /// Fog tint opacity over the sprite's opaque texels (0 = none).
    pub fog_alpha: u8,
    pub fog_color: Rgba,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Sky(Sky),
    Planes(PlaneBuffer),
    Wall(WallStrip),
    Fog(FogMask),
    Sprite(Billboard),
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    fn draw_sky(&mut self, sky: &Sky, bank: &TextureBank);

    /// Copy every painted texel of `planes` into the frame.
    fn blit_planes(&mut self, planes: &PlaneBuffer);

    /// Rasterise one textured wall column.
    fn draw_wall(&mut self, strip: &WallStrip, bank: &TextureBank);

    /// Alpha-blend the fog colour using the per-pixel mask.
    fn blend_fog(&mut self, fog: &FogMask);

    /// Draw a clipped billboard (colour-keyed on alpha 0).
    fn draw_billboard(&mut self, sprite: &Billboard, bank: &TextureBank);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        calls: &[DrawCall],
        bank: &TextureBank,
        submit: F,
    ) where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(width, height);
        for c in calls {
            match c {
                DrawCall::Sky(s) => self.draw_sky(s, bank),
                DrawCall::Planes(p) => self.blit_planes(p),
                DrawCall::Wall(w) => self.draw_wall(w, bank),
                DrawCall::Fog(f) => self.blend_fog(f),
                DrawCall::Sprite(b) => self.draw_billboard(b, bank),
            }
        }
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;
pub use software::Software;

/*──────────────────────── pixel helpers ──────────────────────────────*/

/// Multiply the colour channels by `b / 255`, keeping alpha.
#[inline(always)]
pub fn shade(px: Rgba, b: u8) -> Rgba {
    if b == 255 {
        return px;
    }
    let b = b as u32;
    let r = ((px >> 16) & 0xFF) * b / 255;
    let g = ((px >> 8) & 0xFF) * b / 255;
    let bl = (px & 0xFF) * b / 255;
    (px & 0xFF00_0000) | (r << 16) | (g << 8) | bl
}

/// `src` over `dst` with opacity `a / 255`; result is opaque.
#[inline(always)]
pub fn blend(dst: Rgba, src: Rgba, a: u8) -> Rgba {
    if a == 0 {
        return dst;
    }
    let a = a as u32;
    let inv = 255 - a;
    let mix = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        ((s * a + d * inv) / 255) << shift
    };
    0xFF00_0000 | mix(16) | mix(8) | mix(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_scales_channels() {
        assert_eq!(shade(0xFF_FF8040, 255), 0xFF_FF8040);
        assert_eq!(shade(0xFF_FF8040, 127), 0xFF_7F3F1F);
        assert_eq!(shade(0x80_FFFFFF, 0), 0x80_000000);
    }

    #[test]
    fn blend_extremes() {
        assert_eq!(blend(0xFF_123456, 0xFF_000000, 0), 0xFF_123456);
        assert_eq!(blend(0xFF_123456, 0xFF_ABCDEF, 255), 0xFF_ABCDEF);
        assert_eq!(blend(0xFF_000000, 0xFF_FFFFFF, 51), 0xFF_333333);
    }
}
