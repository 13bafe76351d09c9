//! Tool Execution Context
//!
//! Tools never receive raw pixel buffers or object labels through oracle
//! parameters. The oracle emits placeholders; the loop resolves them against
//! this context before invocation: the image placeholder resolves to the
//! original input image, the task-object placeholder to the resolved target
//! object string. Tools get read-only access and cannot mutate loop state.

use std::sync::Arc;

use crate::mask::Image;

/// Read-only context handed to every tool invocation.
#[derive(Clone)]
pub struct ToolContext {
    run_id: String,
    image: Arc<Image>,
    object_label: String,
    round: u32,
}

impl ToolContext {
    /// Create a new context for a refinement run.
    pub fn new(run_id: impl Into<String>, image: Arc<Image>, object_label: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            image,
            object_label: object_label.into(),
            round: 1,
        }
    }

    /// Unique identifier of the owning refinement run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The original input image (image placeholder target).
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Shared handle to the original input image.
    pub fn image_handle(&self) -> Arc<Image> {
        Arc::clone(&self.image)
    }

    /// The resolved target object (task-object placeholder target).
    pub fn object_label(&self) -> &str {
        &self.object_label
    }

    /// Current refinement round, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Derive the context for a given round.
    pub fn for_round(&self, round: u32) -> Self {
        Self {
            round,
            ..self.clone()
        }
    }

    /// Resolve a per-call prompt override against the task-object
    /// placeholder.
    pub fn resolve_prompt<'a>(&'a self, prompt: Option<&'a str>) -> &'a str {
        prompt.unwrap_or(&self.object_label)
    }
}
