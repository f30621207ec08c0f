mod collision;
mod interact;
mod tic;

pub use collision::{MoveResult, PLAYER_RADIUS, slide_move};
pub use interact::{Interaction, USE_RANGE, use_block};
pub use tic::{DT, SIM_FPS, TicRunner};
