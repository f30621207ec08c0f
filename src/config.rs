//! Render settings shared by the engine and the viewer binary.

use crate::{
    renderer::Rgba,
    world::{FOV_MAX, FOV_MIN, NO_TEXTURE, TextureId},
};

/// How floors and ceilings are projected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FloorMode {
    /// Row-major affine stepping across each scan-line.
    #[default]
    Rows,
    /// Column-major interpolation between the eye and the wall base.
    Columns,
}

/// Wall shading model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Lighting {
    /// X-crossings at full brightness, Y-crossings at half.
    #[default]
    TwoTone,
    /// Brightness from line height and the angular curve.
    Ambient,
}

/// Distance fog parameters.  All brightness values are in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogSettings {
    /// Brightness floor reached far away.
    pub world_min: f64,
    /// Brightness of the light carried by the player (ceiling).
    pub player_light: f64,
    /// Scales distance before the falloff; larger = thicker fog.
    pub multiplier: f64,
    /// Overlay colour, alpha ignored.
    pub color: Rgba,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            world_min: 0.0,
            player_light: 1.0,
            multiplier: 1.0,
            color: 0xFF_000000,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("screen size {0}x{1} must be non-zero")]
    ZeroScreen(usize, usize),

    #[error("field of view {0}° outside {min}°..{max}°", min = FOV_MIN, max = FOV_MAX)]
    Fov(f64),

    #[error("fog value `{name}` = {value} outside 0..=1")]
    FogRange { name: &'static str, value: f64 },

    #[error("fog world minimum {world_min} exceeds player light {player_light}")]
    FogOrder { world_min: f64, player_light: f64 },

    #[error("fog multiplier {0} must be positive")]
    FogMultiplier(f64),
}

/// Everything the frame pipeline needs besides camera and level.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Initial horizontal FoV in degrees.
    pub fov: f64,
    /// Textured ceiling instead of sky.
    pub ceiling: bool,
    pub floor_mode: FloorMode,
    pub lighting: Lighting,
    pub fog_enabled: bool,
    pub fog: FogSettings,
    pub sky_color: Rgba,
    /// Bank id for each tile texture slot (wall 0, panel 1, door 2,
    /// window 3).  Missing slots render the checkerboard.
    pub wall_textures: Vec<TextureId>,
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
    /// Panorama shown when `ceiling` is off; `NO_TEXTURE` = flat colour.
    pub sky_tex: TextureId,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            fov: 90.0,
            ceiling: false,
            floor_mode: FloorMode::default(),
            lighting: Lighting::default(),
            fog_enabled: false,
            fog: FogSettings::default(),
            sky_color: 0xFF_7FAAFF,
            wall_textures: Vec::new(),
            floor_tex: NO_TEXTURE,
            ceil_tex: NO_TEXTURE,
            sky_tex: NO_TEXTURE,
        }
    }
}

impl RenderConfig {
    /// Resolve a tile texture slot to a bank id.
    #[inline]
    pub fn wall_texture(&self, slot: TextureId) -> TextureId {
        self.wall_textures
            .get(slot as usize)
            .copied()
            .unwrap_or(NO_TEXTURE)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroScreen(self.width, self.height));
        }
        if !(FOV_MIN..=FOV_MAX).contains(&self.fov) {
            return Err(ConfigError::Fov(self.fov));
        }
        self.fog.validate()
    }
}

impl FogSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("world_min", self.world_min),
            ("player_light", self.player_light),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FogRange { name, value });
            }
        }
        if self.world_min > self.player_light {
            return Err(ConfigError::FogOrder {
                world_min: self.world_min,
                player_light: self.player_light,
            });
        }
        if !(self.multiplier > 0.0 && self.multiplier.is_finite()) {
            return Err(ConfigError::FogMultiplier(self.multiplier));
        }
        Ok(())
    }
}
