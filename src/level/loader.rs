// ──────────────────────────────────────────────────────────────────────────
// level/loader.rs
//
//  *   level source text  ──parse_level──▶  RawLevel ──build_level──▶ Level
//                                                       (ids resolved,
//                                                        border checked)
// ──────────────────────────────────────────────────────────────────────────

use glam::{DVec2, dvec2};
use std::{fs, path::Path};

use crate::{
    level::parse::{LevelError, RawLevel, parse_level},
    world::{Grid, Tile, TileKind},
};

/// Fully validated level, ready to hand to the engine.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    /// Cell-centred player start.
    pub spawn: DVec2,
    pub grid: Grid,
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Parse and validate level source text.
pub fn load_level(name: &str, src: &str) -> Result<Level, LevelError> {
    let raw = parse_level(src)?;
    build_level(name, &raw)
}

/// Read a level file from disk; the file stem becomes the level name.
pub fn load_level_file<P: AsRef<Path>>(path: P) -> Result<Level, LevelError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "level".to_owned());
    load_level(&name, &src)
}

/// Resolve tile ids and check the invariants the raycaster relies on.
pub fn build_level(name: &str, raw: &RawLevel) -> Result<Level, LevelError> {
    /*----- 1. tile ids → tiles -----------------------------------------*/
    let mut tiles = Vec::with_capacity(raw.ids.len());
    for (i, &id) in raw.ids.iter().enumerate() {
        let kind = u32::try_from(id)
            .ok()
            .and_then(TileKind::from_id)
            .ok_or(LevelError::UnknownTile {
                id,
                x: i % raw.width,
                y: i / raw.width,
            })?;
        tiles.push(Tile::new(kind));
    }
    let grid = Grid::from_tiles(raw.width, raw.height, tiles);

    /*----- 2. closed border: guarantees every ray terminates -----------*/
    if let Some((x, y)) = grid.open_border_cell() {
        return Err(LevelError::OpenBorder { x, y });
    }

    /*----- 3. spawn inside and walkable --------------------------------*/
    let (sx, sy) = (raw.start_x, raw.start_y);
    let inside = match (i32::try_from(sx), i32::try_from(sy)) {
        (Ok(x), Ok(y)) => grid.in_bounds(x, y),
        _ => false,
    };
    if !inside {
        return Err(LevelError::SpawnOutOfBounds {
            x: sx,
            y: sy,
            width: raw.width,
            height: raw.height,
        });
    }
    if grid.is_solid(sx as i32, sy as i32) {
        return Err(LevelError::SpawnBlocked { x: sx, y: sy });
    }

    log::info!(
        "level `{name}`: {}x{} spawn ({sx}, {sy})",
        raw.width,
        raw.height
    );

    Ok(Level {
        name: name.to_owned(),
        spawn: dvec2(sx as f64 + 0.5, sy as f64 + 0.5),
        grid,
    })
}
