//! Segflow Tools
//!
//! The corrective tool layer: the `MaskTool` execution contract, the typed
//! `ToolRegistry`, and the standard tool set the refinement loop dispatches
//! to. Every tool takes the read-only context plus the current candidate
//! mask and returns a new candidate sized to the input image.
//!
//! ## Module Organization
//!
//! - `registry` - `MaskTool` trait and `ToolRegistry`
//! - `segment_tools` - full-image and grid-patch segmentation
//! - `postprocess` - structural cleanup modes
//! - `passthrough` - stitch/evaluate/visualize no-op tools

use std::sync::Arc;

use segflow_core::Segmenter;

pub mod passthrough;
pub mod postprocess;
pub mod registry;
pub mod segment_tools;

// ── Registry ───────────────────────────────────────────────────────────
pub use registry::{MaskTool, ToolRegistry};

// ── Tools ──────────────────────────────────────────────────────────────
pub use passthrough::{EvaluateTool, StitchTool, VisualizeTool};
pub use postprocess::{
    apply_mode, fill_small_holes, preserve_edges, remove_small_components, smooth_mask,
    PostProcessTool, HOLE_SIZE_THRESHOLD, PRESERVE_EDGES_THRESHOLD, SMALL_COMPONENT_THRESHOLD,
};
pub use segment_tools::{patch_segment, FullSegmentTool, PatchSegmentTool};

/// Build the standard registry backed by the given segmenter. Registers the
/// full closed vocabulary of mask-producing tools.
pub fn standard_registry(segmenter: Arc<dyn Segmenter>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FullSegmentTool::new(Arc::clone(&segmenter))));
    registry.register(Arc::new(PatchSegmentTool::new(segmenter)));
    registry.register(Arc::new(StitchTool));
    registry.register(Arc::new(EvaluateTool));
    registry.register(Arc::new(PostProcessTool));
    registry.register(Arc::new(VisualizeTool));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use segflow_core::{CoreResult, Image, Mask, ToolKind};

    struct NullSegmenter;

    #[async_trait]
    impl Segmenter for NullSegmenter {
        async fn segment(&self, _object_label: &str, image: &Image) -> CoreResult<Mask> {
            Ok(Mask::new(image.width(), image.height()))
        }
    }

    #[test]
    fn test_standard_registry_covers_vocabulary() {
        let registry = standard_registry(Arc::new(NullSegmenter));
        assert_eq!(registry.len(), 6);
        for kind in [
            ToolKind::SegmentFull,
            ToolKind::SegmentPatches,
            ToolKind::Stitch,
            ToolKind::Evaluate,
            ToolKind::PostProcess,
            ToolKind::Visualize,
        ] {
            assert!(registry.contains(kind), "missing {kind:?}");
        }
    }
}
