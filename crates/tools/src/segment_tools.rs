//! Segmentation Tools
//!
//! `FullSegmentTool` re-runs the external segmenter on the whole image.
//! `PatchSegmentTool` splits the image into an overlapping grid, segments
//! the patches concurrently (patches are independent pure computations),
//! and fuses the per-patch masks through the weighted stitcher. Patch
//! results are accumulated under a single writer after the join.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::info;

use segflow_core::{
    split_patches, stitch, CoreError, CoreResult, Image, Mask, Segmenter, ToolAction,
    ToolContext, ToolKind,
};

/// Full-image re-segmentation.
pub struct FullSegmentTool {
    segmenter: Arc<dyn Segmenter>,
}

impl FullSegmentTool {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self { segmenter }
    }
}

#[async_trait]
impl crate::registry::MaskTool for FullSegmentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SegmentFull
    }

    fn description(&self) -> &str {
        "Segment the target object in the full image"
    }

    async fn execute(
        &self,
        ctx: &ToolContext,
        action: &ToolAction,
        _current: &Mask,
    ) -> CoreResult<Mask> {
        let prompt = match action {
            ToolAction::SegmentFull { prompt } => ctx.resolve_prompt(prompt.as_deref()),
            other => {
                return Err(CoreError::internal(format!(
                    "segment_full dispatched with {:?}",
                    other.kind()
                )))
            }
        };

        info!(run_id = ctx.run_id(), prompt, "full-image segmentation");
        self.segmenter.segment(prompt, ctx.image()).await
    }
}

/// Split the image into an `rows x cols` overlapping grid, run the
/// segmenter over every patch concurrently, and stitch the per-patch masks
/// back to full resolution.
pub async fn patch_segment(
    segmenter: &Arc<dyn Segmenter>,
    object_label: &str,
    image: &Image,
    rows: u32,
    cols: u32,
    overlap: u32,
) -> CoreResult<Mask> {
    let (height, width) = (image.height(), image.width());
    let patches = split_patches(height, width, rows, cols, overlap)?;

    let futures = patches.iter().map(|patch| {
        let crop = patch.crop(image);
        let segmenter = Arc::clone(segmenter);
        let prompt = object_label.to_string();
        async move { segmenter.segment(&prompt, &crop).await }
    });

    let results = join_all(futures).await;
    let mut patch_masks = Vec::with_capacity(patches.len());
    for (patch, result) in patches.iter().zip(results) {
        patch_masks.push((result?, *patch));
    }

    stitch(&patch_masks, (height, width))
}

/// Grid split, per-patch segmentation, weighted stitch.
pub struct PatchSegmentTool {
    segmenter: Arc<dyn Segmenter>,
}

impl PatchSegmentTool {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self { segmenter }
    }
}

#[async_trait]
impl crate::registry::MaskTool for PatchSegmentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SegmentPatches
    }

    fn description(&self) -> &str {
        "Split into an overlapping grid, segment each patch, stitch the results"
    }

    async fn execute(
        &self,
        ctx: &ToolContext,
        action: &ToolAction,
        _current: &Mask,
    ) -> CoreResult<Mask> {
        let (rows, cols, overlap, prompt) = match action {
            ToolAction::SegmentPatches {
                rows,
                cols,
                overlap,
                prompt,
            } => (*rows, *cols, *overlap, ctx.resolve_prompt(prompt.as_deref())),
            other => {
                return Err(CoreError::internal(format!(
                    "segment_patches dispatched with {:?}",
                    other.kind()
                )))
            }
        };

        info!(run_id = ctx.run_id(), rows, cols, overlap, "patch segmentation");
        patch_segment(&self.segmenter, prompt, ctx.image(), rows, cols, overlap).await
    }
}
