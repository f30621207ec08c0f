use std::{f64::consts::TAU, path::Path};

use glam::DVec2;

use crate::{
    config::{ConfigError, RenderConfig},
    engine::{
        fog::{BrightCurve, build_mask},
        planes::{PlaneTextures, RowDistanceTable, build_planes},
        raycast::{self, ColumnBuffers},
        sprites::{back_to_front, billboards, project_sprite},
        types::Screen,
        walls::{horizon_span, project_wall, wall_brightness, wall_face, wall_span},
    },
    level::{self, Level, LevelError},
    renderer::{DrawCall, Renderer, RendererExt, Rgba, Sky},
    sim::{Interaction, MoveResult, PLAYER_RADIUS, slide_move, use_block},
    world::{Camera, Grid, NO_TEXTURE, Sprite, SpriteFlags, TextureBank},
};

/// Cells around the camera whose doors keep animating.
pub const DOOR_SCAN_RADIUS: i32 = 2;

/// Everything one frame needs, owned by the update loop.
pub struct EngineState {
    camera: Camera,
    grid: Grid,
    sprites: Vec<Sprite>,
    level_name: String,
    spawn: DVec2,
    config: RenderConfig,
    screen: Screen,
    rows: RowDistanceTable,
    curve: BrightCurve,
    cols: ColumnBuffers,
    spans: Vec<(i32, i32)>,
}

impl EngineState {
    pub fn new(config: RenderConfig, level: Level) -> Result<Self, ConfigError> {
        config.validate()?;
        let screen = Screen::new(config.width, config.height);
        let camera = Camera::new(level.spawn, config.fov);
        let mut state = Self {
            camera,
            grid: level.grid,
            sprites: Vec::new(),
            level_name: level.name,
            spawn: level.spawn,
            config,
            screen,
            rows: RowDistanceTable::default(),
            curve: BrightCurve::default(),
            cols: ColumnBuffers::default(),
            spans: Vec::with_capacity(screen.w),
        };
        state.rebuild_rows();
        state.rebuild_curve();
        Ok(state)
    }

    /*──────────────────────── accessors ───────────────────────*/

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[inline]
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn set_sprites(&mut self, sprites: Vec<Sprite>) {
        self.sprites = sprites;
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Per-column results of the last [`cast`](Self::cast).
    #[inline]
    pub fn columns(&self) -> &ColumnBuffers {
        &self.cols
    }

    #[inline]
    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    #[inline]
    pub fn spawn(&self) -> DVec2 {
        self.spawn
    }

    /*──────────────────────── level ───────────────────────────*/

    /// Parse, validate and swap in a new level.  On error nothing changes.
    pub fn load_level(&mut self, name: &str, src: &str) -> Result<(), LevelError> {
        let level = level::load_level(name, src)?;
        self.install(level);
        Ok(())
    }

    pub fn load_level_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LevelError> {
        let level = level::load_level_file(path)?;
        self.install(level);
        Ok(())
    }

    /// Replace grid and sprites, put the camera back on the spawn.
    pub fn install(&mut self, level: Level) {
        self.grid = level.grid;
        self.spawn = level.spawn;
        self.level_name = level.name;
        self.sprites.clear();
        self.camera.reset(self.spawn);
        self.rebuild_rows();
    }

    /*──────────────────────── camera input ────────────────────*/

    pub fn rotate(&mut self, delta: f64) {
        self.camera.rotate(delta);
    }

    /// See [`Camera::change_fov`]; the brightness curve follows the FoV.
    pub fn change_fov(&mut self, fov_deg: f64, relative: bool) -> bool {
        let changed = self.camera.change_fov(fov_deg, relative);
        if changed {
            self.rebuild_curve();
        }
        changed
    }

    pub fn look(&mut self, dy: f64) {
        self.camera.look(dy, self.screen.h);
        self.rebuild_rows();
        log::debug!("look offset {:.0}px", self.camera.vert_look());
    }

    pub fn raise(&mut self, dz: f64) {
        self.camera.raise(dz);
        self.rebuild_rows();
        log::debug!("eye height {:.2}", self.camera.vert_height());
    }

    /// Move with wall sliding, then collect touched pickups.
    pub fn try_move(&mut self, delta: DVec2) -> MoveResult {
        let res = slide_move(&self.grid, self.camera.pos(), delta, PLAYER_RADIUS);
        self.camera.set_pos(res.pos);
        self.collect_pickups();
        res
    }

    /// Remove pickups overlapping the player; returns how many.
    pub fn collect_pickups(&mut self) -> usize {
        let pos = self.camera.pos();
        let before = self.sprites.len();
        self.sprites.retain(|s| {
            !(s.flags.contains(SpriteFlags::PICKUP)
                && s.pos.distance(pos) < PLAYER_RADIUS + s.width * 0.5)
        });
        let taken = before - self.sprites.len();
        if taken > 0 {
            log::debug!("picked up {taken} sprite(s)");
        }
        taken
    }

    /// Use the tile the centre column is looking at.
    pub fn use_block_ahead(&mut self) -> Interaction {
        let ahead = raycast::block_ahead(&self.camera, &self.grid);
        use_block(&mut self.grid, ahead)
    }

    /// Advance door animations near the camera by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.grid
            .update_doors(self.camera.cell(), DOOR_SCAN_RADIUS, dt);
    }

    /*──────────────────────── frame ───────────────────────────*/

    /// Cast every column and derive the wall spans.
    pub fn cast(&mut self) {
        raycast::cast_columns(&self.camera, &self.grid, &self.screen, &mut self.cols);
        if self.cols.misses > 0 {
            log::warn!(
                "{} of {} rays left `{}` without a hit",
                self.cols.misses,
                self.screen.w,
                self.level_name
            );
        }
        let (cam, screen) = (&self.camera, &self.screen);
        self.spans.clear();
        self.spans.extend(self.cols.hits.iter().map(|h| match h {
            Some(h) => wall_span(h.dist, cam, screen),
            None => horizon_span(cam, screen),
        }));
    }

    /// Cast and emit the draw calls of one frame, back to front.
    pub fn build_frame(&mut self, bank: &TextureBank) -> Vec<DrawCall> {
        self.cast();
        let cfg = &self.config;
        let (cam, screen) = (&self.camera, &self.screen);
        let mut calls = Vec::with_capacity(screen.w + 8);

        /*----- sky ---------------------------------------------------*/
        if !cfg.ceiling {
            let left = cam.yaw() - cam.fov().to_radians() * 0.5;
            calls.push(DrawCall::Sky(Sky {
                tex: (cfg.sky_tex != NO_TEXTURE).then_some(cfg.sky_tex),
                color: cfg.sky_color,
                offset: (left / TAU).rem_euclid(1.0),
                span: cam.fov() / 360.0,
                horizon: self.rows.horizon().ceil() as i32,
            }));
        }

        /*----- floor / ceiling ---------------------------------------*/
        let tex = PlaneTextures {
            floor: bank.texture_or_missing(cfg.floor_tex),
            ceiling: cfg.ceiling.then(|| bank.texture_or_missing(cfg.ceil_tex)),
        };
        calls.push(DrawCall::Planes(build_planes(
            cfg.floor_mode,
            cam,
            screen,
            &self.rows,
            &self.cols,
            &self.spans,
            &tex,
        )));

        /*----- walls -------------------------------------------------*/
        for (x, hit) in self.cols.hits.iter().enumerate() {
            let Some(hit) = hit else { continue };
            let Some(tile) = self.grid.get(hit.cell.0, hit.cell.1) else {
                continue;
            };
            let tex_id = cfg.wall_texture(tile.texture(wall_face(hit)));
            let tex_w = bank.texture_or_missing(tex_id).w;
            let shade = wall_brightness(cfg.lighting, &cfg.fog, hit, screen.h, self.curve.at(x));
            calls.push(DrawCall::Wall(project_wall(
                x, hit, tile, cam, screen, tex_id, tex_w, shade,
            )));
        }

        /*----- fog ---------------------------------------------------*/
        if cfg.fog_enabled {
            calls.push(DrawCall::Fog(build_mask(
                &cfg.fog,
                screen,
                &self.rows,
                &self.cols,
                &self.spans,
                &self.curve,
                cam.fov(),
            )));
        }

        /*----- sprites -----------------------------------------------*/
        let fog = cfg.fog_enabled.then_some((&cfg.fog, &self.curve));
        let mut drawn = 0;
        for i in back_to_front(&self.sprites, cam) {
            let s = &self.sprites[i];
            let Some(p) = project_sprite(i, s, cam, screen, &self.cols.depth) else {
                continue;
            };
            drawn += 1;
            calls.extend(
                billboards(&p, s, fog, screen, cam.fov())
                    .into_iter()
                    .map(DrawCall::Sprite),
            );
        }

        log::trace!(
            "frame: {} calls, {drawn}/{} sprites",
            calls.len(),
            self.sprites.len()
        );
        calls
    }

    /// Build the frame and run it through `renderer`.
    pub fn render<R, F>(&mut self, renderer: &mut R, bank: &TextureBank, submit: F)
    where
        R: Renderer,
        F: FnOnce(&[Rgba], usize, usize),
    {
        let calls = self.build_frame(bank);
        renderer.draw_frame(self.screen.w, self.screen.h, &calls, bank, submit);
    }

    /*──────────────────────── derived tables ──────────────────*/

    fn rebuild_rows(&mut self) {
        self.rows = RowDistanceTable::new(
            &self.screen,
            self.camera.vert_look(),
            self.camera.vert_height(),
        );
    }

    fn rebuild_curve(&mut self) {
        self.curve = BrightCurve::new(self.screen.w, self.camera.fov());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::Software,
        world::{DoorState, TileKind},
    };
    use glam::dvec2;

    const ROOM: &str = "2 2 6 5
        1 1 1 1 1 1
        1 0 0 0 0 1
        1 0 0 3 0 2
        1 0 0 0 0 1
        1 1 1 1 1 1";

    fn engine(cfg: RenderConfig) -> EngineState {
        let lvl = level::load_level("room", ROOM).unwrap();
        EngineState::new(cfg, lvl).unwrap()
    }

    fn small() -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 48,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_bad_config() {
        let lvl = level::load_level("room", ROOM).unwrap();
        let cfg = RenderConfig {
            height: 0,
            ..Default::default()
        };
        assert!(EngineState::new(cfg, lvl).is_err());
    }

    #[test]
    fn frame_has_every_stage() {
        let mut e = engine(RenderConfig {
            fog_enabled: true,
            ..small()
        });
        e.set_sprites(vec![Sprite::pickup(dvec2(2.5, 3.5), 0.4, 0.4, 0, 8, 8)]);
        e.rotate(std::f64::consts::FRAC_PI_2); // face +y, towards the sprite
        let calls = e.build_frame(&TextureBank::default());

        assert!(matches!(calls[0], DrawCall::Sky(_)));
        assert!(matches!(calls[1], DrawCall::Planes(_)));
        let walls = calls.iter().filter(|c| matches!(c, DrawCall::Wall(_))).count();
        assert_eq!(walls, 64);
        assert!(calls.iter().any(|c| matches!(c, DrawCall::Fog(_))));
        assert!(matches!(calls.last(), Some(DrawCall::Sprite(_))));
    }

    #[test]
    fn ceiling_replaces_sky() {
        let mut e = engine(RenderConfig {
            ceiling: true,
            ..small()
        });
        let calls = e.build_frame(&TextureBank::default());
        assert!(!calls.iter().any(|c| matches!(c, DrawCall::Sky(_))));
    }

    #[test]
    fn door_opens_through_interaction() {
        let mut e = engine(small());
        /* spawn (2.5, 2.5) facing east; the panel of door (3, 2) is at x = 3.5 */
        assert_eq!(e.columns().block_ahead, None);
        assert_eq!(e.use_block_ahead(), Interaction::None);
        e.try_move(dvec2(0.15, 0.0));
        assert_eq!(e.use_block_ahead(), Interaction::Door);
        for _ in 0..35 {
            e.tick(1.0 / 35.0);
        }
        let t = e.grid().tile_at(3, 2).unwrap();
        assert_eq!(t.door, DoorState::Open);
        assert!(!t.solid());
        e.cast();
        assert_eq!(e.columns().block_ahead.map(|b| (b.x, b.y)), Some((5, 2)));
    }

    #[test]
    fn exit_panel_reports_exit() {
        let mut e = engine(small());
        e.grid_mut().set_kind(3, 2, TileKind::Air).unwrap();
        for _ in 0..3 {
            assert!(!e.try_move(dvec2(0.6, 0.0)).hit_wall);
        }
        let r = e.try_move(dvec2(0.6, 0.0));
        assert!(r.hit_wall);
        assert!((r.pos.x - 4.3).abs() < 1e-9);
        assert_eq!(e.use_block_ahead(), Interaction::Exit);
    }

    #[test]
    fn fov_change_rebuilds_curve() {
        let mut e = engine(small());
        let before = e.curve.at(0);
        assert!(e.change_fov(60.0, false));
        assert!(e.curve.at(0) < before);
        assert!(!e.change_fov(500.0, false));
        assert_eq!(e.camera().fov(), 60.0);
    }

    #[test]
    fn failed_load_keeps_state() {
        let mut e = engine(small());
        e.try_move(dvec2(0.0, 0.4));
        let pos = e.camera().pos();
        assert!(e.load_level("bad", "1 1 2 2 1 1 1").is_err());
        assert_eq!(e.level_name(), "room");
        assert_eq!(e.camera().pos(), pos);
        assert_eq!(e.grid().width(), 6);

        e.load_level("tiny", "1 1 3 3 1 1 1 1 0 1 1 1 1").unwrap();
        assert_eq!(e.level_name(), "tiny");
        assert_eq!(e.camera().pos(), dvec2(1.5, 1.5));
    }

    #[test]
    fn pickups_are_collected() {
        let mut e = engine(small());
        e.set_sprites(vec![
            Sprite::pickup(dvec2(2.5, 3.0), 0.2, 0.2, 0, 8, 8),
            Sprite::pickup(dvec2(4.5, 3.5), 0.2, 0.2, 0, 8, 8),
        ]);
        e.try_move(dvec2(0.0, 0.3));
        assert_eq!(e.sprites().len(), 1);
    }

    #[test]
    fn render_through_software_backend() {
        let mut e = engine(small());
        let mut sw = Software::default();
        let mut size = (0, 0);
        let mut opaque = false;
        e.render(&mut sw, &TextureBank::default(), |buf, w, h| {
            size = (w, h);
            opaque = buf.iter().all(|&p| p >> 24 == 0xFF);
        });
        assert_eq!(size, (64, 48));
        assert!(opaque);
    }

    #[test]
    fn level_file_swaps_world() {
        let mut e = engine(small());
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("hall.txt");
        std::fs::write(&good, "1 1 5 3  1 1 1 1 1  1 0 0 0 1  1 1 1 1 1").unwrap();
        let bad = dir.path().join("broken.txt");
        std::fs::write(&bad, "1 1 5 3  1 1 1").unwrap();

        assert!(e.load_level_file(&bad).is_err());
        assert_eq!(e.level_name(), "room");

        e.load_level_file(&good).unwrap();
        assert_eq!(e.level_name(), "hall");
        assert_eq!(e.grid().width(), 5);
        assert_eq!(e.spawn(), dvec2(1.5, 1.5));
    }
}
