//! Mask Tool Trait and Registry
//!
//! `MaskTool` is the execution contract for one corrective operation: given
//! the tool context, a validated action, and the current candidate mask, it
//! returns a new candidate mask sized to the input image.
//!
//! `ToolRegistry` maps [`ToolKind`] to tool implementations. Unknown tool
//! *names* never reach this layer (they are rejected while parsing the
//! oracle decision); dispatching an unregistered *kind* is the same hard
//! error, never a silent fallthrough.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use segflow_core::{CoreError, CoreResult, Mask, ToolAction, ToolContext, ToolKind};

/// One validated, side-effecting corrective operation.
#[async_trait]
pub trait MaskTool: Send + Sync {
    /// The action variant this tool handles.
    fn kind(&self) -> ToolKind;

    /// Human-readable description for logs and documentation.
    fn description(&self) -> &str;

    /// Execute against the current candidate mask.
    ///
    /// Post-condition: the returned mask has the same dimensions as the
    /// context image.
    async fn execute(
        &self,
        ctx: &ToolContext,
        action: &ToolAction,
        current: &Mask,
    ) -> CoreResult<Mask>;
}

/// Registry of mask tools keyed by [`ToolKind`].
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn MaskTool>>,
    /// Insertion order for deterministic iteration.
    order: Vec<ToolKind>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool of the same kind.
    pub fn register(&mut self, tool: Arc<dyn MaskTool>) {
        let kind = tool.kind();
        if !self.tools.contains_key(&kind) {
            self.order.push(kind);
        }
        self.tools.insert(kind, tool);
    }

    /// Look up a tool by kind.
    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn MaskTool>> {
        self.tools.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> Vec<ToolKind> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a validated action to its tool.
    ///
    /// Fails with [`CoreError::UnknownTool`] when no tool is registered for
    /// the action's kind, and with a validation error when a tool returns a
    /// mask whose dimensions do not match the context image.
    pub async fn dispatch(
        &self,
        ctx: &ToolContext,
        action: &ToolAction,
        current: &Mask,
    ) -> CoreResult<Mask> {
        let tool = self
            .get(action.kind())
            .ok_or_else(|| CoreError::unknown_tool(action.tool_name()))?;

        let mask = tool.execute(ctx, action, current).await?;

        let (h, w) = (ctx.image().height(), ctx.image().width());
        if mask.height() != h || mask.width() != w {
            return Err(CoreError::validation(format!(
                "Tool {} returned a {}x{} mask for a {}x{} image",
                action.tool_name(),
                mask.height(),
                mask.width(),
                h,
                w
            )));
        }
        Ok(mask)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
