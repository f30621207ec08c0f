//! Tile records and the static tile-kind attribute table.
//!
//! Level sources store plain integer ids; they are resolved **once** at load
//! time through [`TileKind::from_id`] and [`TileKind::attrs`].  After that the
//! renderer only reads the copied per-tile fields.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::world::texture::TextureId;

/// Timer units per second a sliding door travels (full swing = 0.5 s).
pub const DOOR_RATE: f64 = 2.0;

bitflags! {
    /// Per-tile behaviour flags.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileFlags: u8 {
        /// Blocks movement.
        const SOLID       = 0x01;
        /// Stops rays (drawn as a wall).
        const VISIBLE     = 0x02;
        /// See-through for sprites/fog purposes; may still stop rays.
        const TRANSPARENT = 0x04;
    }
}

/// Which face of a cell a ray hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallFace {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
}

/// Closed set of tile kinds known to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Air,
    Wall,
    /// Exit panel: using it ends the level.
    Panel,
    /// Sliding door.
    Door,
    Window,
}

/// Attribute row copied into every [`Tile`] of a kind.
#[derive(Clone, Copy, Debug)]
pub struct KindAttrs {
    pub flags: TileFlags,
    pub wall_tex: [TextureId; 4],
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
    pub height: f64,
}

const fn attrs(flags: TileFlags, tex: TextureId) -> KindAttrs {
    KindAttrs {
        flags,
        wall_tex: [tex; 4],
        floor_tex: 0,
        ceil_tex: 0,
        height: 1.0,
    }
}

const ALL_KINDS: [(u32, TileKind); 5] = [
    (0, TileKind::Air),
    (1, TileKind::Wall),
    (2, TileKind::Panel),
    (3, TileKind::Door),
    (4, TileKind::Window),
];

static BY_ID: Lazy<HashMap<u32, TileKind>> = Lazy::new(|| ALL_KINDS.into_iter().collect());

impl TileKind {
    /// Resolve a level-source id.
    pub fn from_id(id: u32) -> Option<TileKind> {
        BY_ID.get(&id).copied()
    }

    pub fn id(self) -> u32 {
        ALL_KINDS
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(id, _)| *id)
            .unwrap_or(0)
    }

    pub fn attrs(self) -> KindAttrs {
        match self {
            TileKind::Air => attrs(TileFlags::empty(), 0),
            TileKind::Wall => attrs(TileFlags::SOLID | TileFlags::VISIBLE, 0),
            TileKind::Panel => attrs(TileFlags::SOLID | TileFlags::VISIBLE, 1),
            TileKind::Door => attrs(
                TileFlags::SOLID | TileFlags::VISIBLE | TileFlags::TRANSPARENT,
                2,
            ),
            TileKind::Window => attrs(
                TileFlags::SOLID | TileFlags::VISIBLE | TileFlags::TRANSPARENT,
                3,
            ),
        }
    }

    #[inline]
    pub fn is_door(self) -> bool {
        self == TileKind::Door
    }

    /// True for kinds that stop every ray for the whole level lifetime.
    /// Only these may form the outer border of a level.
    pub fn seals_border(self) -> bool {
        !self.is_door() && self.attrs().flags.contains(TileFlags::VISIBLE)
    }
}

/// Sliding-door animation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    #[inline]
    pub fn is_animating(self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Closing)
    }
}

/// One cell of the level grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub flags: TileFlags,
    /// Indexed by [`WallFace`].
    pub wall_tex: [TextureId; 4],
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
    pub height: f64,
    /// Door openness: 1 = closed, 0 = open.  Always 1 for non-doors.
    pub timer: f64,
    pub door: DoorState,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::new(TileKind::Air)
    }
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        let a = kind.attrs();
        Self {
            kind,
            flags: a.flags,
            wall_tex: a.wall_tex,
            floor_tex: a.floor_tex,
            ceil_tex: a.ceil_tex,
            height: a.height,
            timer: 1.0,
            door: DoorState::Closed,
        }
    }

    #[inline]
    pub fn solid(&self) -> bool {
        self.flags.contains(TileFlags::SOLID)
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.flags.contains(TileFlags::VISIBLE)
    }

    #[inline]
    pub fn transparent(&self) -> bool {
        self.flags.contains(TileFlags::TRANSPARENT)
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.kind.is_door()
    }

    #[inline]
    pub fn texture(&self, face: WallFace) -> TextureId {
        self.wall_tex[face as usize]
    }

    /// Start the door moving.  Returns `false` for non-doors and when the
    /// door already is (or is heading) where it was asked to go.
    pub fn trigger(&mut self, open: bool) -> bool {
        if !self.is_door() {
            return false;
        }
        let next = match (open, self.door) {
            (true, DoorState::Closed | DoorState::Closing) => DoorState::Opening,
            (false, DoorState::Open | DoorState::Opening) => DoorState::Closing,
            _ => return false,
        };
        if next == DoorState::Closing {
            // panel must be hit-testable while it slides back in
            self.flags.insert(TileFlags::VISIBLE);
        }
        self.door = next;
        true
    }

    /// Advance the door animation by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        match self.door {
            DoorState::Opening => {
                self.timer -= DOOR_RATE * dt;
                if self.timer <= 0.0 {
                    self.timer = 0.0;
                    self.door = DoorState::Open;
                    self.flags.remove(TileFlags::SOLID | TileFlags::VISIBLE);
                }
            }
            DoorState::Closing => {
                self.timer += DOOR_RATE * dt;
                if self.timer >= 1.0 {
                    self.timer = 1.0;
                    self.door = DoorState::Closed;
                    self.flags.insert(TileFlags::SOLID | TileFlags::VISIBLE);
                }
            }
            DoorState::Closed | DoorState::Open => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_resolve_through_table() {
        for (id, kind) in ALL_KINDS {
            assert_eq!(TileKind::from_id(id), Some(kind));
            assert_eq!(kind.id(), id);
        }
        assert_eq!(TileKind::from_id(99), None);
    }

    #[test]
    fn border_kinds() {
        assert!(TileKind::Wall.seals_border());
        assert!(TileKind::Window.seals_border());
        assert!(!TileKind::Door.seals_border());
        assert!(!TileKind::Air.seals_border());
    }

    #[test]
    fn door_full_cycle() {
        let mut t = Tile::new(TileKind::Door);
        assert!(t.trigger(true));
        assert_eq!(t.door, DoorState::Opening);

        t.advance(0.2);
        assert!((t.timer - 0.6).abs() < 1e-12);
        assert!(t.solid() && t.visible());

        t.advance(1.0);
        assert_eq!(t.door, DoorState::Open);
        assert_eq!(t.timer, 0.0);
        assert!(!t.solid() && !t.visible());

        assert!(t.trigger(false));
        assert!(t.visible() && !t.solid());
        t.advance(0.25);
        assert_eq!(t.door, DoorState::Closing);
        assert!(!t.solid());
        t.advance(10.0);
        assert_eq!(t.door, DoorState::Closed);
        assert_eq!(t.timer, 1.0);
        assert!(t.solid() && t.visible());
    }

    #[test]
    fn trigger_is_idempotent_and_door_only() {
        let mut wall = Tile::new(TileKind::Wall);
        assert!(!wall.trigger(true));
        assert_eq!(wall.timer, 1.0);

        let mut door = Tile::new(TileKind::Door);
        assert!(!door.trigger(false)); // already closed
        assert!(door.trigger(true));
        assert!(!door.trigger(true)); // already opening
    }
}
