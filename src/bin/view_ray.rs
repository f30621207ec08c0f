//! Interactive software-rendered viewer.
//!
//! ```bash
//! cargo run --release -- [level.txt] --fog --ceiling --floor-mode columns
//! ```
//!
//! Arrows/WASD move and turn, Shift runs, Space uses the tile ahead,
//! PgUp/PgDn look, Home/End raise or lower the eye, `-`/`=` zoom.

use clap::Parser;
use glam::{DVec2, dvec2};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use gridcast_rs::{
    config::{FloorMode, FogSettings, Lighting, RenderConfig},
    engine::EngineState,
    level::{Level, load_level, load_level_file},
    renderer::Software,
    sim::{Interaction, TicRunner},
    world::{Rect, Sprite, Texture, TextureBank, TextureId},
};

const DEMO_LEVEL: &str = "2 2 16 12
1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1
1 0 0 0 0 0 0 1 0 0 0 0 0 0 0 1
1 0 0 0 0 0 0 1 0 0 0 0 0 0 0 1
1 0 0 4 0 0 0 3 0 0 0 1 1 0 0 1
1 0 0 0 0 0 0 1 0 0 0 1 1 0 0 1
1 0 0 0 0 0 0 1 0 0 0 0 0 0 0 2
1 1 1 3 1 1 1 1 0 0 0 0 0 0 0 1
1 0 0 0 0 0 0 1 1 1 4 1 1 1 1 1
1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 1
1 0 0 4 0 0 0 0 0 0 0 0 4 0 0 1
1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 1
1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1
";

const MOVE_SPEED: f64 = 3.0; // cells / s
const TURN_SPEED: f64 = 2.0; // rad / s
const RUN_FACTOR: f64 = 2.0;
const LOOK_SPEED: f64 = 300.0; // px / s
const RAISE_SPEED: f64 = 0.5; // cells / s
const FOV_STEP: f64 = 5.0;

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Level file; the built-in demo level is used when omitted
    #[arg(value_name = "FILE")]
    level: Option<PathBuf>,

    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 540)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    fov: f64,

    /// Textured ceiling instead of the sky panorama
    #[arg(long)]
    ceiling: bool,

    #[arg(long, value_enum, default_value_t = FloorMode::Rows)]
    floor_mode: FloorMode,

    #[arg(long, value_enum, default_value_t = Lighting::TwoTone)]
    lighting: Lighting,

    /// Enable distance fog
    #[arg(long)]
    fog: bool,

    /// Darkest brightness far away
    #[arg(long, default_value_t = 0.0)]
    fog_min: f64,

    /// Brightness of the player's light
    #[arg(long, default_value_t = 1.0)]
    fog_light: f64,

    /// Fog thickness
    #[arg(long, default_value_t = 1.0)]
    fog_mult: f64,

    /// Number of demo pickups scattered around the spawn
    #[arg(long, default_value_t = 8)]
    sprites: usize,

    /// Seed for the sprite scatter
    #[arg(long, default_value_t = 0x2545_F491)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let level = match &opts.level {
        Some(path) => load_level_file(path)?,
        None => load_level("demo", DEMO_LEVEL)?,
    };

    let mut bank = TextureBank::default_with_checker();
    let assets = Assets::generate(&mut bank)?;

    let config = RenderConfig {
        width: opts.width,
        height: opts.height,
        fov: opts.fov,
        ceiling: opts.ceiling,
        floor_mode: opts.floor_mode,
        lighting: opts.lighting,
        fog_enabled: opts.fog,
        fog: FogSettings {
            world_min: opts.fog_min,
            player_light: opts.fog_light,
            multiplier: opts.fog_mult,
            ..Default::default()
        },
        wall_textures: assets.walls.to_vec(),
        floor_tex: assets.floor,
        ceil_tex: assets.ceiling,
        sky_tex: assets.sky,
        ..Default::default()
    };

    let mut state = EngineState::new(config, level.clone())?;
    let mut rng = XorShift::new(opts.seed);
    state.set_sprites(scatter(&level, &assets, opts.sprites, &mut rng));

    let mut tic = TicRunner::new();
    let mut renderer = Software::default();

    let title = format!("view_ray: {}", state.level_name());
    let mut win = Window::new(&title, opts.width, opts.height, WindowOptions::default())?;
    win.set_target_fps(60);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO; // cumulated render time
    let mut acc_frames = 0usize; // frames in the current window
    let mut last_print = Instant::now(); // when we printed last
    let mut last_frame = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now(); // ┌─ frame timer start
        let dt = (t0 - last_frame).as_secs_f64().min(0.1);
        last_frame = t0;

        /* --------------- movement & camera -------------------------------- */
        let run = win.is_key_down(Key::LeftShift) || win.is_key_down(Key::RightShift);
        let speed = MOVE_SPEED * dt * if run { RUN_FACTOR } else { 1.0 };

        let forward = state.camera().dir().normalize();
        let right = state.camera().plane().normalize();
        let mut step = DVec2::ZERO;
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            step += forward;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            step -= forward;
        }
        if win.is_key_down(Key::A) {
            step -= right;
        }
        if win.is_key_down(Key::D) {
            step += right;
        }
        if step != DVec2::ZERO {
            state.try_move(step.normalize() * speed);
        }

        /* left = towards -plane = clockwise in map space */
        if win.is_key_down(Key::Left) {
            state.rotate(-TURN_SPEED * dt);
        }
        if win.is_key_down(Key::Right) {
            state.rotate(TURN_SPEED * dt);
        }
        if win.is_key_down(Key::PageUp) {
            state.look(-LOOK_SPEED * dt);
        }
        if win.is_key_down(Key::PageDown) {
            state.look(LOOK_SPEED * dt);
        }
        if win.is_key_down(Key::Home) {
            state.raise(RAISE_SPEED * dt);
        }
        if win.is_key_down(Key::End) {
            state.raise(-RAISE_SPEED * dt);
        }
        if win.is_key_pressed(Key::Minus, KeyRepeat::Yes) {
            state.change_fov(FOV_STEP, true);
        }
        if win.is_key_pressed(Key::Equal, KeyRepeat::Yes) {
            state.change_fov(-FOV_STEP, true);
        }

        /* actions ----------------------------------------------------------- */
        if win.is_key_pressed(Key::Space, KeyRepeat::No) {
            match state.use_block_ahead() {
                Interaction::Exit => {
                    println!("exit reached, restarting {}", state.level_name());
                    state.install(level.clone());
                    state.set_sprites(scatter(&level, &assets, opts.sprites, &mut rng));
                }
                Interaction::Door | Interaction::None => {}
            }
        }

        tic.pump(&mut state);

        /* draw */
        let mut shown = Ok(());
        state.render(&mut renderer, &bank, |fb, w, h| {
            // ─────────── accumulate & report every ~3 s ────────────────────
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            let fps = 1000.0 / avg_ms;
            println!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, fps);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/*──────────────────────── demo sprites ───────────────────────────────*/

/// Marsaglia xorshift64; deterministic per seed.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Drop `n` pickups on free cells near the spawn.
fn scatter(level: &Level, assets: &Assets, n: usize, rng: &mut XorShift) -> Vec<Sprite> {
    const SPREAD: f64 = 4.0;
    const TRIES: usize = 64;

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        for _ in 0..TRIES {
            let p = level.spawn + dvec2(rng.unit() - 0.5, rng.unit() - 0.5) * 2.0 * SPREAD;
            let (cx, cy) = (p.x.floor() as i32, p.y.floor() as i32);
            if level.grid.get(cx, cy).is_none_or(|t| t.solid()) {
                continue;
            }
            let width = 0.1 * ((i % 5) + 1) as f64;
            let f = assets.ball_frame;
            let height = (width * f.h as f64 / f.w as f64).min(1.0);
            /* centre of the cell keeps big sprites off the walls */
            let pos = dvec2(cx as f64 + 0.5, cy as f64 + 0.5);
            out.push(Sprite::pickup(pos, width, height, assets.ball, f.w, f.h));
            break;
        }
    }
    log::info!("scattered {} of {n} demo sprites", out.len());
    out
}

/*──────────────────────── procedural assets ──────────────────────────*/

struct Assets {
    /// wall, panel, door, window
    walls: [TextureId; 4],
    floor: TextureId,
    ceiling: TextureId,
    sky: TextureId,
    ball: TextureId,
    ball_frame: Rect,
}

fn argb(r: u32, g: u32, b: u32) -> u32 {
    0xFF00_0000 | (r.min(255) << 16) | (g.min(255) << 8) | b.min(255)
}

fn paint(name: &str, w: usize, h: usize, f: impl Fn(usize, usize) -> u32) -> anyhow::Result<Texture> {
    let pixels = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    Ok(Texture::new(name, w, h, pixels)?)
}

impl Assets {
    fn generate(bank: &mut TextureBank) -> anyhow::Result<Self> {
        let brick = paint("BRICK", 64, 64, |x, y| {
            let row = y / 16;
            let off = if row % 2 == 0 { 0 } else { 16 };
            if y % 16 == 0 || (x + off) % 32 == 0 {
                argb(90, 90, 90)
            } else {
                let n = ((x * 7 + y * 13) % 17) as u32;
                argb(150 + n, 60 + n, 40)
            }
        })?;
        let panel = paint("PANEL", 64, 64, |x, y| {
            if (8..56).contains(&x) && (20..44).contains(&y) {
                if (x / 8 + y / 8) % 2 == 0 { argb(30, 200, 60) } else { argb(20, 120, 40) }
            } else {
                argb(70, 80, 90)
            }
        })?;
        let door = paint("DOOR", 64, 64, |x, y| {
            if x < 4 || x > 59 || y < 4 || y > 59 {
                argb(60, 60, 70)
            } else if (x / 4) % 4 == 0 {
                argb(140, 140, 160)
            } else {
                argb(110, 110, 130)
            }
        })?;
        let window = paint("WINDOW", 64, 64, |x, y| {
            if x % 32 < 3 || y % 32 < 3 {
                argb(200, 200, 210)
            } else {
                argb(60, 110 + (y as u32) / 2, 180)
            }
        })?;
        let floor = paint("FLOOR", 64, 64, |x, y| {
            if ((x / 32) + (y / 32)) % 2 == 0 { argb(110, 90, 60) } else { argb(80, 65, 45) }
        })?;
        let ceiling = paint("CEIL", 64, 64, |x, y| {
            if x % 16 == 0 || y % 16 == 0 { argb(90, 90, 90) } else { argb(150, 150, 140) }
        })?;
        let sky = paint("SKY", 512, 128, |x, y| {
            let t = x as f64 / 512.0 * std::f64::consts::TAU;
            let ridge = 88.0 + 10.0 * (t * 3.0).sin() + 6.0 * (t * 7.0).cos();
            if y as f64 > ridge {
                argb(50, 70 + (y as u32).saturating_sub(88) / 2, 50)
            } else {
                argb(90 + y as u32, 140 + y as u32 / 2, 255)
            }
        })?;
        let ball = paint("BALL", 32, 32, |x, y| {
            let (dx, dy) = (x as f64 - 15.5, y as f64 - 15.5);
            let r = (dx * dx + dy * dy).sqrt();
            if r > 15.0 {
                0 // colour key
            } else {
                let lit = (255.0 * (1.0 - r / 20.0)) as u32;
                argb(lit, lit / 2, 40)
            }
        })?;

        let walls = [
            bank.insert("BRICK", brick)?,
            bank.insert("PANEL", panel)?,
            bank.insert("DOOR", door)?,
            bank.insert("WINDOW", window)?,
        ];
        Ok(Self {
            walls,
            floor: bank.insert("FLOOR", floor)?,
            ceiling: bank.insert("CEIL", ceiling)?,
            sky: bank.insert("SKY", sky)?,
            ball: bank.insert("BALL", ball)?,
            ball_frame: Rect::new(0, 0, 32, 32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assets_generate_into_bank() {
        let mut bank = TextureBank::default_with_checker();
        let assets = Assets::generate(&mut bank).unwrap();
        assert_eq!(bank.len(), 9);
        let sky = bank.texture(assets.sky).unwrap();
        assert_eq!((sky.w, sky.h), (512, 128));
        let ball = bank.texture(assets.ball).unwrap();
        assert_eq!(ball.pixels[0] >> 24, 0); // transparent corner
    }

    #[test]
    fn demo_scatter_is_seeded() {
        let mut bank = TextureBank::default_with_checker();
        let assets = Assets::generate(&mut bank).unwrap();
        let level = load_level("demo", DEMO_LEVEL).unwrap();
        let a = scatter(&level, &assets, 6, &mut XorShift::new(7));
        let b = scatter(&level, &assets, 6, &mut XorShift::new(7));
        assert_eq!(a, b);
        for s in &a {
            let cell = (s.pos.x.floor() as i32, s.pos.y.floor() as i32);
            assert!(!level.grid.is_solid(cell.0, cell.1));
            assert!(s.height <= 1.0);
        }
    }
}
