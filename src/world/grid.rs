use crate::world::tile::{Tile, TileKind};

/// Out-of-range grid query.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({x}, {y}) outside {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}

/// Rectangular tile map, row-major (`y` outer, `x` inner).
///
/// Dimensions are fixed at construction; the level loader guarantees the
/// outermost ring seals every ray (see [`Grid::open_border_cell`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// `tiles.len()` must equal `width * height`; the loader checks this.
    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Grid of `kind` tiles surrounded by a wall ring.  Handy for tests and
    /// procedurally built rooms.
    pub fn walled(width: usize, height: usize, kind: TileKind) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                tiles.push(Tile::new(if edge { TileKind::Wall } else { kind }));
            }
        }
        Self::from_tiles(width, height, tiles)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    fn oob(&self, x: i32, y: i32) -> GridError {
        GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// Bounds-checked lookup; `None` outside the grid.
    #[inline(always)]
    pub fn get(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Result<&Tile, GridError> {
        self.get(x, y).ok_or_else(|| self.oob(x, y))
    }

    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> Result<&mut Tile, GridError> {
        match self.index(x, y) {
            Some(i) => Ok(&mut self.tiles[i]),
            None => Err(self.oob(x, y)),
        }
    }

    /// Movement query: anything outside the grid counts as solid.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none_or(Tile::solid)
    }

    /// Replace the tile at `(x, y)` with a fresh tile of `kind`.
    pub fn set_kind(&mut self, x: i32, y: i32, kind: TileKind) -> Result<(), GridError> {
        *self.tile_at_mut(x, y)? = Tile::new(kind);
        Ok(())
    }

    /// Start a door at `(x, y)` opening (`open = true`) or closing.
    ///
    /// `Ok(false)` when the tile is not a door or already heads that way.
    pub fn set_opening(&mut self, x: i32, y: i32, open: bool) -> Result<bool, GridError> {
        let tile = self.tile_at_mut(x, y)?;
        let started = tile.trigger(open);
        if started {
            log::debug!(
                "door ({x}, {y}) {}",
                if open { "opening" } else { "closing" }
            );
        }
        Ok(started)
    }

    /// Advance every animating door within `radius` cells of `center`
    /// (a square, clamped to the grid) by `dt` seconds.
    pub fn update_doors(&mut self, center: (i32, i32), radius: i32, dt: f64) {
        let (cx, cy) = center;
        let y0 = (cy - radius).max(0);
        let y1 = (cy + radius + 1).min(self.height as i32);
        let x0 = (cx - radius).max(0);
        let x1 = (cx + radius + 1).min(self.width as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = y as usize * self.width + x as usize;
                let tile = &mut self.tiles[i];
                if tile.door.is_animating() {
                    let before = tile.door;
                    tile.advance(dt);
                    if tile.door != before {
                        log::debug!("door ({x}, {y}) now {:?}", tile.door);
                    }
                }
            }
        }
    }

    /// First cell of the outer ring that does not permanently stop rays,
    /// scanning row-major.  `None` means the level is sealed.
    pub fn open_border_cell(&self) -> Option<(i32, i32)> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| x == 0 || y == 0 || x == w - 1 || y == h - 1)
            .find(|&(x, y)| self.get(x, y).is_some_and(|t| !t.kind.seals_border()))
    }
}
