//! Wall, floor, sky and sprite images keyed by [`TextureId`].
//!
//! Tiles and config store ids only; the backend looks the pixels up while
//! executing draw calls.

use std::collections::{HashMap, hash_map::Entry};

/// Index into a [`TextureBank`]; never reused while the bank lives.
pub type TextureId = u16;

/// Id of the checkerboard every bank starts with.
pub const NO_TEXTURE: TextureId = 0;

/// Row-major `0xAARRGGBB` image.  Alpha 0 is the sprite colour key.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<u32>,
}

impl Default for Texture {
    fn default() -> Self {
        Self::checker(8, 0xFF_A0A0A0, 0xFF_505050)
    }
}

impl Texture {
    /// Build a texture, checking that `pixels` really is `w × h`.
    pub fn new<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        pixels: Vec<u32>,
    ) -> Result<Self, TextureError> {
        if w == 0 || h == 0 || pixels.len() != w * h {
            return Err(TextureError::BadSize {
                w,
                h,
                len: pixels.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            w,
            h,
            pixels,
        })
    }

    /// `size × size` checkerboard with one-texel squares.
    pub fn checker(size: usize, a: u32, b: u32) -> Self {
        let size = size.max(1);
        let pixels = (0..size * size)
            .map(|i| if ((i % size) ^ (i / size)) & 1 == 0 { a } else { b })
            .collect();
        Self {
            name: "CHECKER".to_owned(),
            w: size,
            h: size,
            pixels,
        }
    }

    /// Texel at integer coordinates, wrapping both axes with a true modulo
    /// (dimensions need not be powers of two).
    #[inline(always)]
    pub fn texel(&self, u: i64, v: i64) -> u32 {
        let u = u.rem_euclid(self.w as i64) as usize;
        let v = v.rem_euclid(self.h as i64) as usize;
        self.pixels[v * self.w + u]
    }

    /// Texel at the fractional position `(fu, fv)` of one tile repeat.
    #[inline(always)]
    pub fn sample_frac(&self, fu: f64, fv: f64) -> u32 {
        self.texel(
            (fu * self.w as f64).floor() as i64,
            (fv * self.h as f64).floor() as i64,
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    #[error("texture id {0} out of range")]
    BadId(TextureId),

    #[error("texture {w}x{h} needs {need} pixels, got {len}", need = .w * .h)]
    BadSize { w: usize, h: usize, len: usize },

    #[error("texture bank is full ({0} entries)")]
    Full(usize),
}

/// Append-only texture store.  Slot 0 always holds the fallback that
/// unknown or unset ids render with.
#[derive(Clone, Debug)]
pub struct TextureBank {
    textures: Vec<Texture>,
    ids: HashMap<String, TextureId>,
}

impl Default for TextureBank {
    fn default() -> Self {
        Self::default_with_checker()
    }
}

impl TextureBank {
    /// Bank whose fallback (`NO_TEXTURE`, name `"MISSING"`) is `fallback`.
    pub fn new(fallback: Texture) -> Self {
        Self {
            textures: vec![fallback],
            ids: HashMap::from([("MISSING".to_owned(), NO_TEXTURE)]),
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    /// Entries including the fallback.
    #[inline]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True while only the fallback is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.textures.len() <= 1
    }

    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.ids.get(name).copied()
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.textures
            .get(usize::from(id))
            .ok_or(TextureError::BadId(id))
    }

    /// Like [`texture`](Self::texture) but unknown ids give the fallback.
    #[inline]
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        let i = usize::from(id);
        if i < self.textures.len() {
            &self.textures[i]
        } else {
            &self.textures[usize::from(NO_TEXTURE)]
        }
    }

    /// Store `tex` under `name` and hand back its id.
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let next = self.textures.len();
        let id = TextureId::try_from(next).map_err(|_| TextureError::Full(next))?;
        match self.ids.entry(name.into()) {
            Entry::Occupied(e) => Err(TextureError::Duplicate(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(id);
                self.textures.push(tex);
                Ok(id)
            }
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
