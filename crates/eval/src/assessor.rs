//! Semantic Assessor Port
//!
//! Optional external collaborator feeding the evaluator's soft score. The
//! assessor sees the original image, the candidate mask, and the task
//! prompt, and returns qualitative scores in `[0, 1]` with short reasons.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use segflow_core::{CoreResult, Image, Mask};

/// Scores returned by the semantic assessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticAssessment {
    /// How plausible the covered area is for the target object, `[0, 1]`.
    pub coverage_score: f64,
    pub coverage_reason: String,
    /// How well the mask matches the target object semantically, `[0, 1]`.
    pub semantic_score: f64,
    pub semantic_reason: String,
}

/// External qualitative assessment port.
#[async_trait]
pub trait SemanticAssessor: Send + Sync {
    async fn assess(
        &self,
        image: &Image,
        mask: &Mask,
        prompt: &str,
    ) -> CoreResult<SemanticAssessment>;
}
