//! Segflow
//!
//! An agentic refinement loop for binary segmentation masks. An external
//! segmentation model proposes a mask; the loop evaluates it, asks an oracle
//! model which corrective tool to apply next (regional re-segmentation,
//! patch fusion, structural post-processing), and repeats within a bounded
//! retry budget. The best mask ever seen is always recoverable.
//!
//! ## Workspace
//!
//! - [`segflow_core`] - mask/patch data model, stitching, tool vocabulary
//! - [`segflow_eval`] - heuristic and semantic mask quality scoring
//! - [`segflow_oracle`] - oracle port, decision parsing, prompts
//! - [`segflow_tools`] - tool registry and the standard tool set
//! - this crate - the orchestrator: configuration, step memory, the
//!   refinement loop, shared model handles, and the strategy archive
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # async fn demo(
//! #     segmenter: Arc<dyn segflow_core::Segmenter>,
//! #     oracle: Arc<dyn segflow_oracle::Oracle>,
//! #     image: Arc<segflow_core::Image>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! use segflow::{RefineConfig, RefinementLoop};
//!
//! let engine = RefinementLoop::new(segmenter, oracle)
//!     .with_config(RefineConfig::default());
//! let outcome = engine.run(image, "pantograph").await?;
//! println!("verdict {:?} score {}", outcome.verdict, outcome.evaluation.total_score);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod engine;
pub mod handles;
pub mod memory;

// ── Orchestration ──────────────────────────────────────────────────────
pub use config::RefineConfig;
pub use engine::{RefinementLoop, RunFailure, RunOutcome, RunVerdict};
pub use memory::{StepMemory, StepRecord};

// ── Model Handles ──────────────────────────────────────────────────────
pub use handles::{ModelPool, OracleFactory, SegmenterFactory};

// ── Strategy Archive ───────────────────────────────────────────────────
pub use archive::{summarize_strategy, StrategyRecord, StrategySummary, StrategyWriter};

// ── Re-exported Member Crate Surface ───────────────────────────────────
pub use segflow_core::{
    CoreError, CoreResult, Decision, Image, Mask, Patch, PostProcessMode, Segmenter, ToolAction,
    ToolContext, ToolKind, Verdict,
};
pub use segflow_eval::{EvaluationResult, QualityEvaluator, SemanticAssessor};
pub use segflow_oracle::{resolve_intent, Oracle, OracleReply, TaskGoal, TaskIntent};
pub use segflow_tools::{standard_registry, MaskTool, ToolRegistry};
