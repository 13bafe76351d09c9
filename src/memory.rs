//! Step Memory
//!
//! Append-only history of a refinement run, forwarded to the oracle in a
//! bounded window. Records are immutable once appended. Parameter payloads
//! are sanitized on append: oversized strings and long arrays are replaced
//! with shape/type descriptors so a memory summary never drags pixel-scale
//! data into an oracle prompt. Mask and image values are already recorded
//! as descriptors by the callers (`Mask::descriptor`, `image_descriptor`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use segflow_core::ToolAction;
use segflow_eval::EvaluationResult;

/// Strings longer than this are replaced by a descriptor on append.
const MAX_STRING_LEN: usize = 512;
/// Arrays longer than this are replaced by a descriptor on append.
const MAX_ARRAY_LEN: usize = 64;

/// One completed (or failed) refinement round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub round: u32,
    pub tool_name: String,
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only run history.
#[derive(Debug, Clone, Default)]
pub struct StepMemory {
    records: Vec<StepRecord>,
}

impl StepMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful round.
    pub fn record_round(&mut self, round: u32, action: &ToolAction, evaluation: EvaluationResult) {
        self.records.push(StepRecord {
            round,
            tool_name: action.tool_name(),
            parameters: sanitize(action.parameters()),
            evaluation: Some(evaluation),
            error: None,
        });
    }

    /// Record a failed round. Appended before the error propagates, so the
    /// history survives the failure.
    pub fn record_failure(
        &mut self,
        round: u32,
        tool_name: impl Into<String>,
        parameters: Value,
        error: impl std::fmt::Display,
    ) {
        self.records.push(StepRecord {
            round,
            tool_name: tool_name.into(),
            parameters: sanitize(parameters),
            evaluation: None,
            error: Some(error.to_string()),
        });
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render at most the `window` most recent records as a JSON array.
    /// Read-only and idempotent.
    pub fn summary(&self, window: usize) -> String {
        let start = self.records.len().saturating_sub(window);
        serde_json::to_string(&self.records[start..]).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Replace oversized payload values with shape/type descriptors.
fn sanitize(value: Value) -> Value {
    match value {
        Value::String(s) if s.len() > MAX_STRING_LEN => {
            json!(format!("<text {} chars>", s.len()))
        }
        Value::Array(items) if items.len() > MAX_ARRAY_LEN => {
            json!(format!("<array {} items>", items.len()))
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, sanitize(v))).collect())
        }
        other => other,
    }
}
