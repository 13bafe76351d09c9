//! Segflow Eval
//!
//! Heuristic mask-quality evaluation for the refinement loop:
//!
//! - `metrics` - coverage / connectivity / smoothness sub-metrics
//! - `evaluator` - `QualityEvaluator` and `EvaluationResult`
//! - `assessor` - optional external semantic assessor port (soft score)

pub mod assessor;
pub mod evaluator;
pub mod metrics;

pub use assessor::{SemanticAssessment, SemanticAssessor};
pub use evaluator::{EvaluationResult, QualityEvaluator};
pub use metrics::{connectivity, coverage, is_degenerate_coverage, smoothness};
