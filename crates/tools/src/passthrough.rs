//! Passthrough Tools
//!
//! The oracle vocabulary includes operations whose real work happens
//! elsewhere in the loop: stitching runs inside patch segmentation,
//! evaluation runs in the loop's evaluate phase, and visualization is a log
//! line. These tools keep the vocabulary closed without mutating the mask.

use async_trait::async_trait;
use tracing::info;

use segflow_core::{CoreResult, Mask, ToolAction, ToolContext, ToolKind};

use crate::registry::MaskTool;

/// Stitching happens inside patch segmentation; a standalone request is a
/// no-op on the already-stitched candidate.
pub struct StitchTool;

#[async_trait]
impl MaskTool for StitchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Stitch
    }

    fn description(&self) -> &str {
        "No-op; patch results are stitched during patch segmentation"
    }

    async fn execute(
        &self,
        _ctx: &ToolContext,
        _action: &ToolAction,
        current: &Mask,
    ) -> CoreResult<Mask> {
        Ok(current.clone())
    }
}

/// Quality evaluation runs after every tool invocation; requesting it as a
/// tool keeps the current candidate unchanged.
pub struct EvaluateTool;

#[async_trait]
impl MaskTool for EvaluateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Evaluate
    }

    fn description(&self) -> &str {
        "No-op; the loop evaluates the candidate after every round"
    }

    async fn execute(
        &self,
        _ctx: &ToolContext,
        _action: &ToolAction,
        current: &Mask,
    ) -> CoreResult<Mask> {
        Ok(current.clone())
    }
}

/// Logs the candidate's shape and the oracle's note, then passes the mask
/// through unchanged.
pub struct VisualizeTool;

#[async_trait]
impl MaskTool for VisualizeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Visualize
    }

    fn description(&self) -> &str {
        "Log the current candidate mask for inspection"
    }

    async fn execute(
        &self,
        ctx: &ToolContext,
        action: &ToolAction,
        current: &Mask,
    ) -> CoreResult<Mask> {
        let note = match action {
            ToolAction::Visualize { note } => note.as_deref().unwrap_or(""),
            _ => "",
        };
        info!(
            run_id = ctx.run_id(),
            round = ctx.round(),
            mask = %current.descriptor(),
            foreground = current.foreground_count(),
            note,
            "visualize"
        );
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segflow_core::Image;
    use std::sync::Arc;

    fn make_context() -> ToolContext {
        ToolContext::new("run-9", Arc::new(Image::new(8, 8)), "object")
    }

    #[tokio::test]
    async fn test_stitch_and_evaluate_are_identity() {
        let ctx = make_context();
        let current = Mask::from_fn(8, 8, |x, _| x < 4);

        let stitched = StitchTool
            .execute(&ctx, &ToolAction::Stitch, &current)
            .await
            .unwrap();
        assert_eq!(stitched, current);

        let evaluated = EvaluateTool
            .execute(&ctx, &ToolAction::Evaluate, &current)
            .await
            .unwrap();
        assert_eq!(evaluated, current);
    }

    #[tokio::test]
    async fn test_visualize_passes_mask_through() {
        let ctx = make_context();
        let current = Mask::from_fn(8, 8, |_, y| y == 0);
        let action = ToolAction::Visualize {
            note: Some("after hole filling".to_string()),
        };
        let out = VisualizeTool.execute(&ctx, &action, &current).await.unwrap();
        assert_eq!(out, current);
    }
}
