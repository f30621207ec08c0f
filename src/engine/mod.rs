//! Frame pipeline: camera → column raycaster → {walls, planes} → fog →
//! sprites, all expressed as [`DrawCall`](crate::renderer::DrawCall)s.

#[allow(clippy::module_inception)]
mod engine;
pub mod fog;
pub mod planes;
pub mod raycast;
pub mod sprites;
pub mod types;
pub mod walls;

pub use engine::{DOOR_SCAN_RADIUS, EngineState};
pub use raycast::{BlockAhead, ColumnBuffers, ColumnHit, Periphery, RayOutcome, Side};
pub use types::Screen;
