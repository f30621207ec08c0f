use crate::engine::EngineState;
use std::time::{Duration, Instant};

pub const SIM_FPS: u32 = 35;
pub const DT: f64 = 1.0 / SIM_FPS as f64;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

/// Drives the fixed-rate game logic (door timers) from wall-clock time.
pub struct TicRunner {
    last: Instant,
    tics: u64,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TicRunner {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            tics: 0,
        }
    }

    /// Tics run since creation.
    #[inline]
    pub fn tics(&self) -> u64 {
        self.tics
    }

    /// Advance enough tics to synchronise simulation with real time.
    /// Returns how many ran.
    pub fn pump(&mut self, state: &mut EngineState) -> u32 {
        let mut ran = 0;
        while self.last.elapsed() >= TIC {
            self.tick(state);
            self.last += TIC;
            ran += 1;
        }
        ran
    }

    /* ---------------------------------------------------------------- */
    /* internal: run one fixed-rate game tic                            */
    /* ---------------------------------------------------------------- */
    fn tick(&mut self, state: &mut EngineState) {
        state.tick(DT);
        self.tics += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RenderConfig, level::load_level, world::DoorState};

    #[test]
    fn pump_catches_up_with_wall_clock() {
        let lvl = load_level("t", "1 1 4 3  1 1 1 1  1 0 3 1  1 1 1 1").unwrap();
        let mut state = EngineState::new(RenderConfig::default(), lvl).unwrap();
        state.grid_mut().set_opening(2, 1, true).unwrap();

        let mut tic = TicRunner::new();
        tic.last -= TIC * SIM_FPS; // one second behind
        let ran = tic.pump(&mut state);
        assert!(ran >= SIM_FPS);
        assert_eq!(tic.tics(), ran as u64);
        assert_eq!(state.grid().tile_at(2, 1).unwrap().door, DoorState::Open);
    }
}
