//! Patch Splitting
//!
//! Partitions an image into an `rows x cols` grid of possibly-overlapping
//! rectangular regions. The non-overlap cores tile the image exactly: base
//! cell size is the integer division of the image dimensions, and the last
//! row/column absorbs any remainder. Each patch is then extended by the
//! overlap margin independently per side, clipped to the image bounds.

use image::imageops;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::mask::Image;

/// A rectangular sub-region of the source image with half-open bounds
/// `[y0, y1) x [x0, x1)`, overlap margin included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub y0: u32,
    pub y1: u32,
    pub x0: u32,
    pub x1: u32,
}

impl Patch {
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Extract this patch's pixels from a source image.
    pub fn crop(&self, image: &Image) -> Image {
        imageops::crop_imm(image, self.x0, self.y0, self.width(), self.height()).to_image()
    }
}

/// Split an `height x width` image into `rows x cols` overlapping patches.
///
/// Fails with [`CoreError::InvalidGrid`] when the grid would produce an
/// empty patch (`rows`/`cols` of zero, or exceeding the image dimensions).
pub fn split_patches(
    height: u32,
    width: u32,
    rows: u32,
    cols: u32,
    overlap: u32,
) -> CoreResult<Vec<Patch>> {
    if rows == 0 || cols == 0 || rows > height || cols > width {
        return Err(CoreError::invalid_grid(rows, cols, height, width));
    }

    let base_h = height / rows;
    let base_w = width / cols;

    let mut patches = Vec::with_capacity((rows as usize) * (cols as usize));
    for r in 0..rows {
        for c in 0..cols {
            let y0 = r * base_h;
            let x0 = c * base_w;
            // Last row/column absorbs the division remainder.
            let y1 = if r + 1 < rows { (r + 1) * base_h } else { height };
            let x1 = if c + 1 < cols { (c + 1) * base_w } else { width };

            // Saturating margins: overlap is oracle-supplied and may be
            // arbitrarily large; the margin clips to the image bounds.
            patches.push(Patch {
                y0: y0.saturating_sub(overlap),
                y1: y1.saturating_add(overlap).min(height),
                x0: x0.saturating_sub(overlap),
                x1: x1.saturating_add(overlap).min(width),
            });
        }
    }

    Ok(patches)
}

/// The non-overlap core cells of the same grid (overlap of zero). The union
/// of these cells covers the image exactly with no gaps.
pub fn core_cells(height: u32, width: u32, rows: u32, cols: u32) -> CoreResult<Vec<Patch>> {
    split_patches(height, width, rows, cols, 0)
}
