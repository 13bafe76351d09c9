//! Segflow Core
//!
//! Foundational data model and traits for the Segflow workspace: the binary
//! mask container, patch splitting, weighted stitching, connected-component
//! labeling, the typed tool-action vocabulary, the tool execution context,
//! and the segmenter port. This crate has no dependency on the orchestrator
//! or on any model backend.
//!
//! ## Module Organization
//!
//! - `error` - Core error taxonomy (`CoreError`, `CoreResult`)
//! - `mask` - Binary mask and source image containers
//! - `patch` - Grid splitting with overlap margins
//! - `stitch` - Triangular-window weighted stitching
//! - `components` - 4-connected component labeling
//! - `action` - Closed tool vocabulary (`ToolAction`, `Verdict`, `Decision`)
//! - `context` - Read-only tool execution context
//! - `ports` - External segmenter port

pub mod action;
pub mod components;
pub mod context;
pub mod error;
pub mod mask;
pub mod patch;
pub mod ports;
pub mod stitch;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use mask::{image_descriptor, Image, Mask, BACKGROUND, FOREGROUND};
pub use patch::{core_cells, split_patches, Patch};
pub use stitch::{blend_window, stitch};
pub use components::{background_components, foreground_components, ComponentLabels};

// ── Tool Vocabulary ────────────────────────────────────────────────────
pub use action::{Decision, PostProcessMode, ToolAction, ToolKind, Verdict};

// ── Context & Ports ────────────────────────────────────────────────────
pub use context::ToolContext;
pub use ports::Segmenter;
