//! Structural Post-processing
//!
//! Cleanup passes over the current candidate mask. All modes operate on the
//! binarized mask and return a binary mask of the same dimensions.
//!
//! - `remove_small` drops foreground components below
//!   [`SMALL_COMPONENT_THRESHOLD`] pixels.
//! - `fill_holes` fills background components of at most
//!   [`HOLE_SIZE_THRESHOLD`] pixels. Small holes only; large interior
//!   structure is kept.
//! - `smooth` is a 3x3 neighborhood average re-thresholded at 0.5.
//! - `preserve_edges` chains removal, hole filling, and smoothing with the
//!   laxer [`PRESERVE_EDGES_THRESHOLD`] so thin structures survive.

use async_trait::async_trait;
use tracing::debug;

use segflow_core::{
    background_components, foreground_components, CoreError, CoreResult, Mask, PostProcessMode,
    ToolAction, ToolContext, ToolKind,
};

use crate::registry::MaskTool;

/// Foreground components smaller than this are treated as noise.
pub const SMALL_COMPONENT_THRESHOLD: usize = 80;
/// Background components up to this size count as fillable holes.
pub const HOLE_SIZE_THRESHOLD: usize = 200;
/// Re-binarization threshold after edge-preserving smoothing.
pub const PRESERVE_EDGES_THRESHOLD: f32 = 0.4;
/// Re-binarization threshold after plain smoothing.
pub const SMOOTH_THRESHOLD: f32 = 0.5;

/// Drop foreground components smaller than `min_size` pixels.
pub fn remove_small_components(mask: &Mask, min_size: usize) -> Mask {
    let comps = foreground_components(mask);
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let label = comps.label_at(x, y);
        label != 0 && comps.sizes[(label - 1) as usize] >= min_size
    })
}

/// Fill background components of at most `max_size` pixels.
pub fn fill_small_holes(mask: &Mask, max_size: usize) -> Mask {
    let comps = background_components(mask);
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let label = comps.label_at(x, y);
        if label == 0 {
            return true;
        }
        comps.sizes[(label - 1) as usize] <= max_size
    })
}

/// 3x3 neighborhood average over {0, 1} samples with clamped borders,
/// re-thresholded at `threshold`.
pub fn smooth_mask(mask: &Mask, threshold: f32) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    Mask::from_fn(width, height, |x, y| {
        let mut sum = 0.0f32;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                if mask.is_foreground(nx, ny) {
                    sum += 1.0;
                }
            }
        }
        sum / 9.0 > threshold
    })
}

/// The combined pipeline: noise removal, hole filling, then smoothing with
/// the lax threshold.
pub fn preserve_edges(mask: &Mask) -> Mask {
    let cleaned = remove_small_components(mask, SMALL_COMPONENT_THRESHOLD);
    let filled = fill_small_holes(&cleaned, HOLE_SIZE_THRESHOLD);
    smooth_mask(&filled, PRESERVE_EDGES_THRESHOLD)
}

/// Apply one post-processing mode with the default thresholds.
pub fn apply_mode(mask: &Mask, mode: PostProcessMode) -> Mask {
    match mode {
        PostProcessMode::RemoveSmall => remove_small_components(mask, SMALL_COMPONENT_THRESHOLD),
        PostProcessMode::FillHoles => fill_small_holes(mask, HOLE_SIZE_THRESHOLD),
        PostProcessMode::Smooth => smooth_mask(mask, SMOOTH_THRESHOLD),
        PostProcessMode::PreserveEdges => preserve_edges(mask),
    }
}

/// Registry tool wrapping [`apply_mode`].
pub struct PostProcessTool;

#[async_trait]
impl MaskTool for PostProcessTool {
    fn kind(&self) -> ToolKind {
        ToolKind::PostProcess
    }

    fn description(&self) -> &str {
        "Structural cleanup of the current mask (noise removal, hole filling, smoothing)"
    }

    async fn execute(
        &self,
        ctx: &ToolContext,
        action: &ToolAction,
        current: &Mask,
    ) -> CoreResult<Mask> {
        let mode = match action {
            ToolAction::PostProcess { mode } => *mode,
            other => {
                return Err(CoreError::internal(format!(
                    "postprocess dispatched with {:?}",
                    other.kind()
                )))
            }
        };

        debug!(run_id = ctx.run_id(), mode = %mode, "post-processing mask");
        Ok(apply_mode(current, mode))
    }
}
