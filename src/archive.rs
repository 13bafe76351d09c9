//! Strategy Archive
//!
//! Write-only JSONL sink for finished runs. Each line records the target
//! object, a compact summary of the refinement path, and the final score.
//! Nothing in the loop reads the archive back; it exists for offline
//! retrieval and analysis.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use segflow_core::{CoreError, CoreResult};

use crate::memory::StepMemory;

/// Compact description of how a run unfolded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    /// Tool invocations in execution order.
    pub path: Vec<String>,
    /// Tool switches and failures worth recalling.
    pub key_decisions: Vec<String>,
    /// Rounds executed, the initial segmentation included.
    pub rounds: u32,
}

/// One archived run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecord {
    pub object: String,
    pub strategy_summary: StrategySummary,
    pub confidence: f64,
    pub final_score: f64,
    pub created_at: DateTime<Utc>,
}

impl StrategyRecord {
    pub fn new(
        object: impl Into<String>,
        strategy_summary: StrategySummary,
        confidence: f64,
        final_score: f64,
    ) -> Self {
        Self {
            object: object.into(),
            strategy_summary,
            confidence,
            final_score,
            created_at: Utc::now(),
        }
    }
}

/// Derive a strategy summary from a run's step memory.
pub fn summarize_strategy(memory: &StepMemory) -> StrategySummary {
    let mut path = Vec::new();
    let mut key_decisions = Vec::new();
    let mut rounds = 0u32;

    let mut previous_tool: Option<&str> = None;
    for record in memory.records() {
        path.push(record.tool_name.clone());
        rounds = rounds.max(record.round);

        if let Some(error) = &record.error {
            key_decisions.push(format!(
                "round {}: {} failed ({})",
                record.round, record.tool_name, error
            ));
        } else if previous_tool.is_some_and(|prev| prev != record.tool_name) {
            key_decisions.push(format!(
                "round {}: switched to {}",
                record.round, record.tool_name
            ));
        }
        previous_tool = Some(&record.tool_name);
    }

    StrategySummary {
        path,
        key_decisions,
        rounds,
    }
}

/// Appends strategy records to a JSONL file.
#[derive(Debug, Clone)]
pub struct StrategyWriter {
    path: PathBuf,
}

impl StrategyWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    pub async fn append(&self, record: &StrategyRecord) -> CoreResult<()> {
        let mut line = serde_json::to_string(record).map_err(CoreError::from)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
