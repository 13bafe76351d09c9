//! Weighted Stitching
//!
//! Recombines per-patch mask candidates into one full-resolution mask.
//! Each patch contributes through a separable triangular blend window that
//! peaks at the patch center and tapers toward the edges, so overlapping
//! regions fuse smoothly instead of hard-cutting at patch boundaries.
//! Accumulator and weight buffers are divided element-wise at the end,
//! clipped to `[0, 1]`, thresholded at 0.5, and scaled back to `{0, 255}`.

use crate::error::{CoreError, CoreResult};
use crate::mask::Mask;
use crate::patch::Patch;

/// Epsilon floor keeping every blend weight strictly positive.
const WEIGHT_EPSILON: f32 = 1e-6;
/// Binarization threshold applied to the normalized accumulator.
const STITCH_THRESHOLD: f32 = 0.5;

/// One-dimensional triangular weight profile of length `n`, normalized to a
/// peak of 1.0. A length-1 profile is the constant 1.0.
fn triangle_profile(n: u32) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n as usize];
    }
    let last = (n - 1) as f32;
    (0..n)
        .map(|i| 1.0 - (2.0 * (i as f32) / last - 1.0).abs())
        .collect()
}

/// Separable triangular blend window for a `height x width` patch, floored
/// at [`WEIGHT_EPSILON`] so accumulation never divides by zero.
pub fn blend_window(height: u32, width: u32) -> Vec<f32> {
    let wy = triangle_profile(height);
    let wx = triangle_profile(width);
    let mut window = Vec::with_capacity((height as usize) * (width as usize));
    for y in &wy {
        for x in &wx {
            window.push(y * x + WEIGHT_EPSILON);
        }
    }
    window
}

/// Stitch per-patch masks back into a full `(height, width)` mask.
///
/// A patch mask whose dimensions drifted from its patch bounds is corrected
/// with nearest-neighbor resizing first, preserving the two-value property.
pub fn stitch(patch_masks: &[(Mask, Patch)], shape: (u32, u32)) -> CoreResult<Mask> {
    let (height, width) = shape;
    let size = (height as usize) * (width as usize);
    let mut acc = vec![0.0f32; size];
    let mut weight = vec![0.0f32; size];

    for (mask, patch) in patch_masks {
        if patch.y1 > height || patch.x1 > width {
            return Err(CoreError::validation(format!(
                "Patch ({},{},{},{}) exceeds target shape {}x{}",
                patch.y0, patch.y1, patch.x0, patch.x1, height, width
            )));
        }

        let local = if mask.height() != patch.height() || mask.width() != patch.width() {
            mask.resize_nearest(patch.width(), patch.height())
        } else {
            mask.clone()
        };

        let window = blend_window(patch.height(), patch.width());
        let raw = local.raw();
        let pw = patch.width() as usize;

        for y in 0..patch.height() as usize {
            let row = ((patch.y0 as usize) + y) * (width as usize) + (patch.x0 as usize);
            for x in 0..pw {
                let w = window[y * pw + x];
                let v = (raw[y * pw + x] as f32) / 255.0;
                acc[row + x] += v * w;
                weight[row + x] += w;
            }
        }
    }

    let mut out = vec![0u8; size];
    for i in 0..size {
        let blended = (acc[i] / weight[i].max(WEIGHT_EPSILON)).clamp(0.0, 1.0);
        if blended > STITCH_THRESHOLD {
            out[i] = 255;
        }
    }

    Mask::from_raw(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::split_patches;

    #[test]
    fn test_triangle_profile_peaks_at_center() {
        let profile = triangle_profile(5);
        assert_eq!(profile.len(), 5);
        assert!((profile[2] - 1.0).abs() < 1e-6);
        assert!(profile[0] < profile[1] && profile[1] < profile[2]);
        assert!((profile[0] - profile[4]).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_profile_length_one() {
        assert_eq!(triangle_profile(1), vec![1.0]);
    }

    #[test]
    fn test_blend_window_strictly_positive() {
        let window = blend_window(9, 7);
        assert_eq!(window.len(), 63);
        assert!(window.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_accumulated_weight_strictly_positive_everywhere() {
        // Accumulate the blend windows exactly as stitch does and check
        // every output pixel ends up with positive total weight, so the
        // final division is never against zero.
        for (rows, cols, overlap) in [(1, 1, 0), (2, 2, 10), (3, 4, 0), (4, 4, 7)] {
            let patches = split_patches(120, 90, rows, cols, overlap).unwrap();
            let mut weight = vec![0.0f32; 120 * 90];
            for patch in &patches {
                let window = blend_window(patch.height(), patch.width());
                let pw = patch.width() as usize;
                for y in 0..patch.height() as usize {
                    for x in 0..pw {
                        let row = ((patch.y0 as usize) + y) * 90 + (patch.x0 as usize);
                        weight[row + x] += window[y * pw + x];
                    }
                }
            }
            assert!(
                weight.iter().all(|&w| w > 0.0),
                "zero accumulated weight in {rows}x{cols} grid with overlap {overlap}"
            );

            // End to end: all-foreground patches must survive the division
            // at every pixel, including cell corners and borders.
            let inputs: Vec<(Mask, Patch)> = patches
                .iter()
                .map(|p| (Mask::from_fn(p.width(), p.height(), |_, _| true), *p))
                .collect();
            let stitched = stitch(&inputs, (120, 90)).unwrap();
            assert_eq!(stitched.foreground_count(), 120 * 90);
        }
    }

    #[test]
    fn test_stitch_output_dimensions_match_shape() {
        for (rows, cols, overlap) in [(1, 1, 0), (2, 3, 5), (4, 4, 7)] {
            let patches = split_patches(120, 90, rows, cols, overlap).unwrap();
            let inputs: Vec<(Mask, Patch)> = patches
                .iter()
                .map(|p| (Mask::new(p.width(), p.height()), *p))
                .collect();
            let stitched = stitch(&inputs, (120, 90)).unwrap();
            assert_eq!(stitched.dimensions(), (120, 90));
            assert!(stitched.is_binary());
        }
    }

    #[test]
    fn test_stitch_constant_patches_reconstitute_constant() {
        // 200x150 image, 2x2 grid, overlap 10, every patch all-foreground:
        // all non-overlap-core pixels must come back foreground.
        let patches = split_patches(200, 150, 2, 2, 10).unwrap();
        let inputs: Vec<(Mask, Patch)> = patches
            .iter()
            .map(|p| (Mask::from_fn(p.width(), p.height(), |_, _| true), *p))
            .collect();
        let stitched = stitch(&inputs, (200, 150)).unwrap();

        for cell in crate::patch::core_cells(200, 150, 2, 2).unwrap() {
            for y in cell.y0..cell.y1 {
                for x in cell.x0..cell.x1 {
                    assert!(stitched.is_foreground(x, y), "pixel ({x},{y}) lost");
                }
            }
        }
    }

    #[test]
    fn test_stitch_all_background_stays_background() {
        let patches = split_patches(64, 64, 2, 2, 4).unwrap();
        let inputs: Vec<(Mask, Patch)> = patches
            .iter()
            .map(|p| (Mask::new(p.width(), p.height()), *p))
            .collect();
        let stitched = stitch(&inputs, (64, 64)).unwrap();
        assert_eq!(stitched.foreground_count(), 0);
    }

    #[test]
    fn test_stitch_resizes_drifted_patch_mask() {
        let patch = Patch { y0: 0, y1: 32, x0: 0, x1: 32 };
        // Patch mask produced at the wrong resolution.
        let drifted = Mask::from_fn(16, 16, |_, _| true);
        let stitched = stitch(&[(drifted, patch)], (32, 32)).unwrap();
        assert_eq!(stitched.dimensions(), (32, 32));
        assert_eq!(stitched.foreground_count(), 32 * 32);
    }

    #[test]
    fn test_stitch_rejects_out_of_bounds_patch() {
        let patch = Patch { y0: 0, y1: 40, x0: 0, x1: 40 };
        let mask = Mask::new(40, 40);
        let err = stitch(&[(mask, patch)], (32, 32)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_stitch_empty_input_yields_background() {
        let stitched = stitch(&[], (16, 16)).unwrap();
        assert_eq!(stitched.dimensions(), (16, 16));
        assert_eq!(stitched.foreground_count(), 0);
    }
}
