//! ---------------------------------------------------------------------------
//! Software (CPU) frame renderer
//!
//! * Fills a `Vec<u32>` frame-buffer in **0xAARRGGBB** format.
//! * Executes [`DrawCall`](crate::renderer::DrawCall)s strictly in the order
//!   the engine emits them (sky, planes, walls, fog, sprites back-to-front),
//!   so no Z-buffer is needed: occlusion is already baked into the calls.
//! ---------------------------------------------------------------------------

use crate::{
    renderer::{Billboard, FogMask, PlaneBuffer, Renderer, Rgba, Sky, WallStrip, blend, shade},
    world::texture::TextureBank,
};

const CLEAR: Rgba = 0xFF_202020;
const OPAQUE: Rgba = 0xFF00_0000;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Column/row rasteriser over an owned scratch buffer.
#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

impl Software {
    #[inline(always)]
    fn put(&mut self, x: usize, y: usize, px: Rgba) {
        self.scratch[y * self.width + x] = px;
    }

    /// Intersect `[lo, hi)` with `[0, len)`.
    #[inline]
    fn span(lo: i32, hi: i32, len: usize) -> std::ops::Range<usize> {
        let lo = lo.max(0) as usize;
        let hi = (hi.max(0) as usize).min(len);
        lo..hi.max(lo)
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        /* dark-grey clear */
        self.scratch.fill(CLEAR);
    }

    fn draw_sky(&mut self, sky: &Sky, bank: &TextureBank) {
        let (w, h) = (self.width, self.height);
        let rows = Self::span(0, sky.horizon, h);
        let Some(id) = sky.tex else {
            for y in rows {
                self.scratch[y * w..(y + 1) * w].fill(sky.color | OPAQUE);
            }
            return;
        };

        let tex = bank.texture_or_missing(id);
        /* panorama spans two screen heights centred on the horizon */
        let v_scale = tex.h as f64 / (2 * h) as f64;
        let u_step = sky.span / w as f64;
        for y in rows {
            let v = ((y as f64 - sky.horizon as f64 + h as f64) * v_scale) as i64;
            let v = v.clamp(0, tex.h as i64 - 1);
            for x in 0..w {
                let u = ((sky.offset + u_step * x as f64) * tex.w as f64).floor() as i64;
                self.put(x, y, tex.texel(u, v) | OPAQUE);
            }
        }
    }

    fn blit_planes(&mut self, planes: &PlaneBuffer) {
        debug_assert_eq!(planes.pixels.len(), planes.width * planes.height);
        if planes.width != self.width || planes.height != self.height {
            log::warn!(
                "plane buffer {}x{} does not match frame {}x{}",
                planes.width,
                planes.height,
                self.width,
                self.height
            );
            return;
        }
        for (dst, &src) in self.scratch.iter_mut().zip(&planes.pixels) {
            if src >> 24 != 0 {
                *dst = src;
            }
        }
    }

    fn draw_wall(&mut self, s: &WallStrip, bank: &TextureBank) {
        if s.x < 0 || s.x as usize >= self.width || s.y_bot <= s.y_top {
            return;
        }
        let tex = bank.texture_or_missing(s.tex);
        let tex_x = s.tex_x.min(tex.w - 1) as i64;
        let line_h = s.y_bot as i64 - s.y_top as i64;
        let x = s.x as usize;

        for y in Self::span(s.y_top, s.y_bot, self.height) {
            /* integer texel step keeps neighbouring columns aligned */
            let tex_y = (y as i64 - s.y_top as i64) * tex.h as i64 / line_h;
            let px = shade(tex.texel(tex_x, tex_y), s.brightness) | OPAQUE;
            self.put(x, y, px);
        }
    }

    fn blend_fog(&mut self, fog: &FogMask) {
        if fog.width != self.width || fog.height != self.height {
            log::warn!("fog mask size mismatch, skipped");
            return;
        }
        for (dst, &a) in self.scratch.iter_mut().zip(&fog.alpha) {
            *dst = blend(*dst, fog.color, a);
        }
    }

    fn draw_billboard(&mut self, b: &Billboard, bank: &TextureBank) {
        if b.dest.is_empty() || b.src.is_empty() {
            return;
        }
        let tex = bank.texture_or_missing(b.tex);
        let cols = Self::span(b.clip.x.max(b.dest.x), b.clip.right().min(b.dest.right()), self.width);
        let rows = Self::span(b.clip.y.max(b.dest.y), b.clip.bottom().min(b.dest.bottom()), self.height);

        let (dw, dh) = (b.dest.w as i64, b.dest.h as i64);
        for x in cols {
            let u = b.src.x as i64 + (x as i64 - b.dest.x as i64) * b.src.w as i64 / dw;
            for y in rows.clone() {
                let v = b.src.y as i64 + (y as i64 - b.dest.y as i64) * b.src.h as i64 / dh;
                let texel = tex.texel(u, v);
                if texel >> 24 == 0 {
                    continue; // colour key
                }
                let px = blend(texel | OPAQUE, b.fog_color, b.fog_alpha);
                self.put(x, y, px);
            }
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
