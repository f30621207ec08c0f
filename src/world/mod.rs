pub mod camera;
pub mod grid;
pub mod sprite;
pub mod texture;
pub mod tile;

pub use camera::{Camera, FOV_MAX, FOV_MIN};
pub use grid::{Grid, GridError};
pub use sprite::{Rect, Sprite, SpriteFlags};
pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId};
pub use tile::{DoorState, Tile, TileFlags, TileKind, WallFace};
