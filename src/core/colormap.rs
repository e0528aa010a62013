//! Plasma colormap for histogram images

use super::histogram::Grid;

/// Plasma sampled at nine evenly spaced stops
const PLASMA_STOPS: [[u8; 3]; 9] = [
    [13, 8, 135],
    [75, 3, 161],
    [126, 3, 168],
    [168, 34, 150],
    [204, 71, 120],
    [230, 108, 92],
    [248, 149, 64],
    [253, 195, 40],
    [240, 249, 33],
];

/// Map `t` in [0, 1] to an RGB color; out-of-range values saturate
pub fn plasma(t: f32) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (PLASMA_STOPS.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(PLASMA_STOPS.len() - 2);
    let frac = scaled - lo as f32;

    let a = PLASMA_STOPS[lo];
    let b = PLASMA_STOPS[lo + 1];
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = (a[i] as f32 + (b[i] as f32 - a[i] as f32) * frac).round() as u8;
    }
    out
}

/// Autoscale `value` into [0, 1] over `[min, max]`; a flat range maps to 0
pub fn normalize(value: u64, min: u64, max: u64) -> f32 {
    if max <= min {
        return 0.0;
    }
    (value.saturating_sub(min)) as f32 / (max - min) as f32
}

/// Render a grid as RGBA rows, top row first, origin at the lower-left.
///
/// Colors are autoscaled to the grid's own `[min, max]`.
pub fn grid_pixels(grid: &Grid) -> Vec<u8> {
    let n = grid.bins();
    let (min, max) = (grid.min(), grid.max());
    let mut rgba = Vec::with_capacity(n * n * 4);
    for row in 0..n {
        let iy = n - 1 - row;
        for ix in 0..n {
            let [r, g, b] = plasma(normalize(grid.get(ix, iy), min, max));
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{Frame, Particle};
    use crate::core::histogram::{Plane, ProjectionHistograms};

    #[test]
    fn test_plasma_endpoints() {
        assert_eq!(plasma(0.0), PLASMA_STOPS[0]);
        assert_eq!(plasma(1.0), PLASMA_STOPS[8]);
        assert_eq!(plasma(-1.0), PLASMA_STOPS[0]);
        assert_eq!(plasma(7.0), PLASMA_STOPS[8]);
        assert_eq!(plasma(f32::NAN), PLASMA_STOPS[0]);
    }

    #[test]
    fn test_plasma_interpolates_between_stops() {
        // Halfway between stop 0 and stop 1
        let mid = plasma(1.0 / 16.0);
        assert_eq!(mid, [44, 6, 148]);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(5, 0, 10), 0.5);
        assert_eq!(normalize(3, 3, 3), 0.0);
        assert_eq!(normalize(0, 2, 10), 0.0);
        assert_eq!(normalize(10, 2, 10), 1.0);
    }

    #[test]
    fn test_grid_pixels_origin_lower_left() {
        let mut hist = ProjectionHistograms::new(4);
        hist.accumulate(&Frame {
            domain_size: 4.0,
            particles: vec![Particle {
                x: 0.5,
                y: 0.5,
                z: 3.5,
                radius: 1.0,
            }],
        });

        let xy = grid_pixels(hist.grid(Plane::XY).unwrap());
        assert_eq!(xy.len(), 4 * 4 * 4);
        // bin (0, 0) is the first pixel of the last row
        let bottom_left = 3 * 4 * 4;
        assert_eq!(&xy[bottom_left..bottom_left + 3], &PLASMA_STOPS[8]);
        assert_eq!(&xy[0..3], &PLASMA_STOPS[0]);

        // z = 3.5 sits in the top row of the XZ image
        let xz = grid_pixels(hist.grid(Plane::XZ).unwrap());
        assert_eq!(&xz[0..3], &PLASMA_STOPS[8]);
    }
}
