//! Heuristic Mask Metrics
//!
//! Three sub-metrics over a binary mask, all in `[0, 1]`:
//!
//! - `coverage` - fraction of image pixels classified foreground
//! - `connectivity` - fraction of foreground pixels in the single largest
//!   4-connected foreground component
//! - `smoothness` - one minus the fraction of pixels on detected mask edges
//!   (Sobel gradient magnitude over the binarized mask)

use segflow_core::components::foreground_components;
use segflow_core::Mask;

/// Masks with coverage outside `[COVERAGE_MIN, COVERAGE_MAX]` are considered
/// degenerate (almost no target, or almost all target).
pub const COVERAGE_MIN: f64 = 0.01;
pub const COVERAGE_MAX: f64 = 0.95;

/// Gradient magnitude above which a pixel counts as an edge. On a unit step
/// the Sobel response reaches 4.0 on both sides of the boundary.
const EDGE_MAGNITUDE_THRESHOLD: f32 = 1.0;

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Fraction of image pixels classified foreground.
pub fn coverage(mask: &Mask) -> f64 {
    if mask.pixel_count() == 0 {
        return 0.0;
    }
    mask.foreground_count() as f64 / mask.pixel_count() as f64
}

/// Whether a coverage value falls outside the plausible band.
pub fn is_degenerate_coverage(coverage: f64) -> bool {
    coverage < COVERAGE_MIN || coverage > COVERAGE_MAX
}

/// Largest 4-connected foreground component over the foreground pixel
/// count; 0 when there is no foreground.
pub fn connectivity(mask: &Mask) -> f64 {
    let fg = mask.foreground_count();
    if fg == 0 {
        return 0.0;
    }
    foreground_components(mask).largest() as f64 / fg as f64
}

/// One minus the edge-pixel fraction. Fewer and smoother boundaries yield
/// values near 1.
pub fn smoothness(mask: &Mask) -> f64 {
    if mask.pixel_count() == 0 {
        return 1.0;
    }
    1.0 - edge_pixel_count(mask) as f64 / mask.pixel_count() as f64
}

/// Count pixels whose Sobel gradient magnitude exceeds the edge threshold.
/// Borders are handled by clamped sampling.
fn edge_pixel_count(mask: &Mask) -> usize {
    let w = mask.width();
    let h = mask.height();
    if w == 0 || h == 0 {
        return 0;
    }

    let sample = |x: i64, y: i64| -> f32 {
        let cx = x.clamp(0, (w - 1) as i64) as u32;
        let cy = y.clamp(0, (h - 1) as i64) as u32;
        if mask.is_foreground(cx, cy) {
            1.0
        } else {
            0.0
        }
    };

    let mut edges = 0usize;
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let mut gx = 0.0f32;
            let mut gy = 0.0f32;
            for (ky, row) in SOBEL_X.iter().enumerate() {
                for (kx, &wx) in row.iter().enumerate() {
                    let v = sample(x + kx as i64 - 1, y + ky as i64 - 1);
                    gx += v * wx;
                    gy += v * SOBEL_Y[ky][kx];
                }
            }
            if (gx * gx + gy * gy).sqrt() > EDGE_MAGNITUDE_THRESHOLD {
                edges += 1;
            }
        }
    }
    edges
}
