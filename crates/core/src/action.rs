//! Typed Tool Actions
//!
//! The oracle speaks a closed tool vocabulary. Incoming decisions are
//! converted at the boundary into the tagged variants below, so unknown
//! identifiers are rejected before they can enter the dispatch path and
//! every handler match is exhaustive at compile time.
//!
//! `pass` and `terminate` are terminal verdicts, not tools: they never reach
//! the registry.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{CoreError, CoreResult};

/// Default patch grid used when the oracle omits the parameters.
pub const DEFAULT_GRID_ROWS: u32 = 3;
pub const DEFAULT_GRID_COLS: u32 = 3;
pub const DEFAULT_GRID_OVERLAP: u32 = 0;

/// Structural post-processing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostProcessMode {
    Smooth,
    FillHoles,
    RemoveSmall,
    PreserveEdges,
}

impl PostProcessMode {
    fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "smooth" => Ok(Self::Smooth),
            "fill_holes" => Ok(Self::FillHoles),
            "remove_small" => Ok(Self::RemoveSmall),
            "preserve_edges" => Ok(Self::PreserveEdges),
            other => Err(CoreError::validation(format!(
                "Unknown post-process mode: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PostProcessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smooth => write!(f, "smooth"),
            Self::FillHoles => write!(f, "fill_holes"),
            Self::RemoveSmall => write!(f, "remove_small"),
            Self::PreserveEdges => write!(f, "preserve_edges"),
        }
    }
}

/// Registry key for dispatchable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    SegmentFull,
    SegmentPatches,
    Stitch,
    Evaluate,
    PostProcess,
    Visualize,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SegmentFull => write!(f, "segment_full"),
            Self::SegmentPatches => write!(f, "segment_patches"),
            Self::Stitch => write!(f, "stitch"),
            Self::Evaluate => write!(f, "evaluate"),
            Self::PostProcess => write!(f, "postprocess"),
            Self::Visualize => write!(f, "visualize"),
        }
    }
}

/// A validated, side-effecting tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Re-run full-image segmentation. `prompt` overrides the resolved task
    /// object when present.
    SegmentFull { prompt: Option<String> },
    /// Split into a grid, segment each patch, stitch the results.
    SegmentPatches {
        rows: u32,
        cols: u32,
        overlap: u32,
        prompt: Option<String>,
    },
    /// Re-stitch the current candidate (identity at the registry level;
    /// stitching happens inside patch segmentation).
    Stitch,
    /// Re-score the current candidate.
    Evaluate,
    /// Apply structural post-processing.
    PostProcess { mode: PostProcessMode },
    /// Log a visualization note; the mask is returned unchanged.
    Visualize { note: Option<String> },
}

/// A terminal verdict from the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The oracle asserts the current mask is acceptable.
    Pass { reason: Option<String> },
    /// Stop refining and fall back to the best mask seen so far.
    Terminate { reason: Option<String> },
}

/// One parsed oracle decision: either a tool invocation or a verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Tool(ToolAction),
    Verdict(Verdict),
}

impl ToolAction {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::SegmentFull { .. } => ToolKind::SegmentFull,
            Self::SegmentPatches { .. } => ToolKind::SegmentPatches,
            Self::Stitch => ToolKind::Stitch,
            Self::Evaluate => ToolKind::Evaluate,
            Self::PostProcess { .. } => ToolKind::PostProcess,
            Self::Visualize { .. } => ToolKind::Visualize,
        }
    }

    /// Canonical tool name as it appears on the wire and in memory records.
    pub fn tool_name(&self) -> String {
        self.kind().to_string()
    }

    /// Parameters rendered as JSON for memory records and audit logs.
    pub fn parameters(&self) -> Value {
        match self {
            Self::SegmentFull { prompt } => json!({ "prompt": prompt }),
            Self::SegmentPatches {
                rows,
                cols,
                overlap,
                prompt,
            } => json!({
                "rows": rows,
                "cols": cols,
                "overlap": overlap,
                "prompt": prompt,
            }),
            Self::Stitch | Self::Evaluate => json!({}),
            Self::PostProcess { mode } => json!({ "mode": mode.to_string() }),
            Self::Visualize { note } => json!({ "note": note }),
        }
    }
}

impl Decision {
    /// Build a decision from a tool name and a parameter mapping.
    ///
    /// Unknown names are rejected with [`CoreError::UnknownTool`]; malformed
    /// parameter values with [`CoreError::Validation`]. There is no lenient
    /// fallback: a decision either parses or fails the round.
    pub fn parse(tool: &str, parameters: &Value) -> CoreResult<Self> {
        let params = match parameters {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(CoreError::validation(format!(
                    "Tool parameters must be an object, got {}",
                    other
                )))
            }
        };

        let decision = match tool {
            "segment_full" => Decision::Tool(ToolAction::SegmentFull {
                prompt: opt_string(&params, "prompt")?,
            }),
            "segment_patches" => Decision::Tool(ToolAction::SegmentPatches {
                rows: opt_u32(&params, "rows")?.unwrap_or(DEFAULT_GRID_ROWS),
                cols: opt_u32(&params, "cols")?.unwrap_or(DEFAULT_GRID_COLS),
                overlap: opt_u32(&params, "overlap")?.unwrap_or(DEFAULT_GRID_OVERLAP),
                prompt: opt_string(&params, "prompt")?,
            }),
            "stitch" => Decision::Tool(ToolAction::Stitch),
            "evaluate" => Decision::Tool(ToolAction::Evaluate),
            "postprocess" => {
                let mode = opt_string(&params, "mode")?
                    .ok_or_else(|| CoreError::validation("postprocess requires a `mode`"))?;
                Decision::Tool(ToolAction::PostProcess {
                    mode: PostProcessMode::parse(&mode)?,
                })
            }
            "visualize" => Decision::Tool(ToolAction::Visualize {
                note: opt_string(&params, "note")?,
            }),
            "pass" => Decision::Verdict(Verdict::Pass {
                reason: opt_string(&params, "reason")?,
            }),
            "terminate" => Decision::Verdict(Verdict::Terminate {
                reason: opt_string(&params, "reason")?,
            }),
            other => return Err(CoreError::unknown_tool(other)),
        };

        Ok(decision)
    }
}

fn opt_string(params: &Map<String, Value>, key: &str) -> CoreResult<Option<String>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CoreError::validation(format!(
            "Parameter `{}` must be a string, got {}",
            key, other
        ))),
    }
}

fn opt_u32(params: &Map<String, Value>, key: &str) -> CoreResult<Option<u32>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let v = n.as_u64().ok_or_else(|| {
                CoreError::validation(format!("Parameter `{}` must be a non-negative integer", key))
            })?;
            u32::try_from(v).map(Some).map_err(|_| {
                CoreError::validation(format!("Parameter `{}` out of range: {}", key, v))
            })
        }
        Some(other) => Err(CoreError::validation(format!(
            "Parameter `{}` must be an integer, got {}",
            key, other
        ))),
    }
}
