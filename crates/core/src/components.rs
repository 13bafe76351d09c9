//! Connected-Component Labeling
//!
//! 4-connected labeling over a pixel predicate, used by the quality
//! evaluator (connectivity metric) and the structural post-processing tool
//! (small-component removal, hole filling). Label 0 means "not in the set";
//! components are numbered from 1 in scan order.

use crate::mask::Mask;

/// Result of labeling: per-pixel labels plus per-component pixel counts.
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    width: u32,
    /// Row-major label per pixel; 0 for pixels outside the set.
    pub labels: Vec<u32>,
    /// `sizes[i]` is the pixel count of component `i + 1`.
    pub sizes: Vec<usize>,
}

impl ComponentLabels {
    /// Number of components found.
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Pixel count of the largest component, or 0 when there are none.
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Label at `(x, y)`.
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

/// Label 4-connected components among pixels where `predicate(x, y)` holds.
pub fn label_components(
    width: u32,
    height: u32,
    predicate: impl Fn(u32, u32) -> bool,
) -> ComponentLabels {
    let w = width as usize;
    let h = height as usize;
    let mut labels = vec![0u32; w * h];
    let mut sizes = Vec::new();
    let mut stack = Vec::new();

    for sy in 0..height {
        for sx in 0..width {
            let start = (sy as usize) * w + (sx as usize);
            if labels[start] != 0 || !predicate(sx, sy) {
                continue;
            }

            let label = (sizes.len() + 1) as u32;
            let mut size = 0usize;
            labels[start] = label;
            stack.push((sx, sy));

            while let Some((x, y)) = stack.pop() {
                size += 1;
                let mut visit = |nx: u32, ny: u32| {
                    let idx = (ny as usize) * w + (nx as usize);
                    if labels[idx] == 0 && predicate(nx, ny) {
                        labels[idx] = label;
                        stack.push((nx, ny));
                    }
                };
                if x > 0 {
                    visit(x - 1, y);
                }
                if x + 1 < width {
                    visit(x + 1, y);
                }
                if y > 0 {
                    visit(x, y - 1);
                }
                if y + 1 < height {
                    visit(x, y + 1);
                }
            }

            sizes.push(size);
        }
    }

    ComponentLabels {
        width,
        labels,
        sizes,
    }
}

/// Label the foreground components of a mask.
pub fn foreground_components(mask: &Mask) -> ComponentLabels {
    label_components(mask.width(), mask.height(), |x, y| mask.is_foreground(x, y))
}

/// Label the background components of a mask (used for hole filling).
pub fn background_components(mask: &Mask) -> ComponentLabels {
    label_components(mask.width(), mask.height(), |x, y| !mask.is_foreground(x, y))
}
