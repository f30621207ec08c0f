mod loader;
mod parse;

pub use loader::{Level, build_level, load_level, load_level_file};
pub use parse::{LevelError, RawLevel, parse_level};
