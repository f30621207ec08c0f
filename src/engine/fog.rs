//! Distance fog / player-light falloff.
//!
//! Brightness is `light / (mult · curve[x] · d²)` clamped into
//! `[world_min, player_light]`, where `d` is rescaled by `90 / fov` so
//! zooming does not thicken the fog.  The overlay alpha is
//! `255 · (1 - brightness)`.

use std::f64::consts::FRAC_PI_2;

use crate::{
    config::FogSettings,
    engine::{planes::RowDistanceTable, raycast::ColumnBuffers, types::Screen},
    renderer::FogMask,
};

/// Per-column angular correction `1 / sin(π/2 - fov/2 + x/W · fov)`.
///
/// `1.0` in the centre, growing towards the edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BrightCurve {
    values: Vec<f64>,
}

impl BrightCurve {
    pub fn new(width: usize, fov_deg: f64) -> Self {
        let fov = fov_deg.to_radians();
        let values = (0..width)
            .map(|x| {
                let a = FRAC_PI_2 - fov * 0.5 + (x as f64 / width as f64) * fov;
                1.0 / a.sin()
            })
            .collect();
        Self { values }
    }

    #[inline(always)]
    pub fn at(&self, x: usize) -> f64 {
        self.values.get(x).copied().unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Light reaching a surface `dist` away, always within
/// `[fog.world_min, fog.player_light]`.
#[inline]
pub fn brightness(fog: &FogSettings, curve: f64, dist: f64, fov_deg: f64) -> f64 {
    let d = dist * 90.0 / fov_deg;
    let falloff = fog.player_light / (fog.multiplier * curve * d * d);
    let b = if falloff.is_nan() {
        fog.world_min
    } else {
        falloff.min(fog.player_light).max(fog.world_min).min(1.0)
    };
    b.clamp(fog.world_min, fog.player_light)
}

/// Overlay opacity for a given brightness.
#[inline(always)]
pub fn fog_alpha(b: f64) -> u8 {
    (255.0 * (1.0 - b)).round().clamp(0.0, 255.0) as u8
}

/// Build the full-frame fog mask.  Rows inside a column's wall span use the
/// wall depth, the rows above and below use the row-distance table; at the
/// span edges both agree.
pub fn build_mask(
    fog: &FogSettings,
    screen: &Screen,
    rows: &RowDistanceTable,
    cols: &ColumnBuffers,
    spans: &[(i32, i32)],
    curve: &BrightCurve,
    fov_deg: f64,
) -> FogMask {
    let (w, h) = (screen.w, screen.h);
    let mut alpha = vec![0u8; w * h];

    for x in 0..w {
        let c = curve.at(x);
        let (top, bot) = spans.get(x).copied().unwrap_or((0, 0));
        let depth = cols.depth.get(x).copied().unwrap_or(f64::INFINITY);
        let wall = fog_alpha(brightness(fog, c, depth, fov_deg));
        for y in 0..h {
            let yi = y as i32;
            let a = if yi >= top && yi < bot {
                wall
            } else {
                fog_alpha(brightness(fog, c, rows.at(y), fov_deg))
            };
            alpha[y * w + x] = a;
        }
    }

    FogMask {
        width: w,
        height: h,
        alpha,
        color: fog.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fog(world_min: f64, player_light: f64, multiplier: f64) -> FogSettings {
        FogSettings {
            world_min,
            player_light,
            multiplier,
            ..Default::default()
        }
    }

    #[test]
    fn curve_is_one_in_the_middle() {
        let c = BrightCurve::new(100, 90.0);
        assert_eq!(c.len(), 100);
        assert!((c.at(50) - 1.0).abs() < 1e-12);
        assert!((c.at(0) - 2f64.sqrt()).abs() < 1e-12);
        assert!(c.at(10) > c.at(40));
    }

    #[test]
    fn brightness_is_monotone_and_bounded() {
        let f = fog(0.15, 0.9, 2.0);
        let c = BrightCurve::new(64, 70.0);
        for x in [0, 17, 32, 63] {
            let mut last = f64::INFINITY;
            for i in 0..400 {
                let d = i as f64 * 0.05;
                let b = brightness(&f, c.at(x), d, 70.0);
                assert!(b <= last + 1e-15, "rose at x={x} d={d}");
                assert!((0.15..=0.9).contains(&b));
                last = b;
            }
        }
        assert_eq!(brightness(&f, 1.0, f64::INFINITY, 70.0), 0.15);
        assert_eq!(brightness(&f, 1.0, 0.0, 70.0), 0.9);
    }

    #[test]
    fn zoom_does_not_change_fog_at_scaled_distance() {
        let f = fog(0.0, 1.0, 1.0);
        let a = brightness(&f, 1.0, 3.0, 90.0);
        let b = brightness(&f, 1.0, 1.5, 45.0);
        assert!((a - b).abs() < 1e-12);
        assert!((a - 1.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn alpha_mapping() {
        assert_eq!(fog_alpha(1.0), 0);
        assert_eq!(fog_alpha(0.0), 255);
        assert_eq!(fog_alpha(0.5), 128);
    }
}
