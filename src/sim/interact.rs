use crate::{
    engine::raycast::BlockAhead,
    world::{Grid, TileKind},
};

/// How far the player can reach, in cells.
pub const USE_RANGE: f64 = 1.0;

/// Result of pressing "use" on the tile ahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    None,
    /// A door started opening.
    Door,
    /// The exit panel was activated.
    Exit,
}

/// Act on the tile straight ahead when it is within [`USE_RANGE`].
pub fn use_block(grid: &mut Grid, ahead: Option<BlockAhead>) -> Interaction {
    let Some(b) = ahead.filter(|b| b.dist < USE_RANGE) else {
        return Interaction::None;
    };
    let Some(kind) = grid.get(b.x, b.y).map(|t| t.kind) else {
        return Interaction::None;
    };
    match kind {
        TileKind::Door => match grid.set_opening(b.x, b.y, true) {
            Ok(true) => Interaction::Door,
            _ => Interaction::None,
        },
        TileKind::Panel => {
            log::info!("exit panel at ({}, {})", b.x, b.y);
            Interaction::Exit
        }
        _ => Interaction::None,
    }
}
