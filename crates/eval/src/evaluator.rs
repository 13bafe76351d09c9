//! Quality Evaluator
//!
//! Scores a candidate mask on coverage, connectivity, and smoothness.
//! Implausible coverage (almost nothing or almost everything foreground)
//! forces the hard score to exactly 0 while the sub-metrics are still
//! reported for diagnostics; the mask then continues through the ordinary
//! decision path rather than erroring out.
//!
//! When a semantic assessor is attached, its scores blend into a soft score
//! and the total becomes `0.4 * hard + 0.6 * soft`; otherwise the total
//! equals the hard score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use segflow_core::{CoreResult, Image, Mask};

use crate::assessor::SemanticAssessor;
use crate::metrics::{connectivity, coverage, is_degenerate_coverage, smoothness};

const W_COVERAGE: f64 = 0.4;
const W_CONNECTIVITY: f64 = 0.4;
const W_SMOOTHNESS: f64 = 0.2;

const W_HARD: f64 = 0.4;
const W_SOFT: f64 = 0.6;

/// Scores for one candidate mask. All values nominally in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub coverage: f64,
    pub connectivity: f64,
    pub smoothness: f64,
    /// Weighted heuristic score; forced to exactly 0 under the coverage
    /// rejection rule.
    pub hard_score: f64,
    /// Blended assessor score, when an assessor contributed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_score: Option<f64>,
    pub total_score: f64,
}

impl EvaluationResult {
    /// Whether the coverage rejection rule fired.
    pub fn is_degenerate(&self) -> bool {
        self.hard_score == 0.0 && is_degenerate_coverage(self.coverage)
    }
}

/// Heuristic mask-quality evaluator with an optional semantic assessor.
#[derive(Clone, Default)]
pub struct QualityEvaluator {
    assessor: Option<Arc<dyn SemanticAssessor>>,
}

impl QualityEvaluator {
    pub fn new() -> Self {
        Self { assessor: None }
    }

    /// Attach a semantic assessor feeding the soft score.
    pub fn with_assessor(mut self, assessor: Arc<dyn SemanticAssessor>) -> Self {
        self.assessor = Some(assessor);
        self
    }

    pub fn has_assessor(&self) -> bool {
        self.assessor.is_some()
    }

    /// Score a mask on the hard heuristics alone. Pure function of the mask.
    pub fn evaluate(&self, mask: &Mask) -> EvaluationResult {
        let coverage = coverage(mask);
        let connectivity = connectivity(mask);
        let smoothness = smoothness(mask);

        let hard_score = if is_degenerate_coverage(coverage) {
            0.0
        } else {
            W_COVERAGE * coverage + W_CONNECTIVITY * connectivity + W_SMOOTHNESS * smoothness
        };

        debug!(
            coverage,
            connectivity, smoothness, hard_score, "mask evaluated"
        );

        EvaluationResult {
            coverage,
            connectivity,
            smoothness,
            hard_score,
            soft_score: None,
            total_score: hard_score,
        }
    }

    /// Score a mask, blending in the semantic assessor when attached.
    pub async fn evaluate_with_assessment(
        &self,
        image: &Image,
        mask: &Mask,
        prompt: &str,
    ) -> CoreResult<EvaluationResult> {
        let mut result = self.evaluate(mask);

        if let Some(assessor) = &self.assessor {
            let assessment = assessor.assess(image, mask, prompt).await?;
            let soft = 0.5 * assessment.coverage_score + 0.5 * assessment.semantic_score;
            result.soft_score = Some(soft);
            result.total_score = W_HARD * result.hard_score + W_SOFT * soft;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessor::SemanticAssessment;
    use async_trait::async_trait;

    struct FixedAssessor {
        coverage_score: f64,
        semantic_score: f64,
    }

    #[async_trait]
    impl SemanticAssessor for FixedAssessor {
        async fn assess(
            &self,
            _image: &Image,
            _mask: &Mask,
            _prompt: &str,
        ) -> CoreResult<SemanticAssessment> {
            Ok(SemanticAssessment {
                coverage_score: self.coverage_score,
                coverage_reason: String::new(),
                semantic_score: self.semantic_score,
                semantic_reason: String::new(),
            })
        }
    }

    #[test]
    fn test_all_foreground_mask_is_rejected() {
        // 256x256 all-foreground: coverage 1.0 > 0.95.
        let mask = Mask::from_fn(256, 256, |_, _| true);
        let result = QualityEvaluator::new().evaluate(&mask);
        assert_eq!(result.coverage, 1.0);
        assert_eq!(result.hard_score, 0.0);
        assert_eq!(result.total_score, 0.0);
        assert!(result.is_degenerate());
        // Sub-metrics still reported for diagnostics.
        assert_eq!(result.connectivity, 1.0);
        assert_eq!(result.smoothness, 1.0);
    }

    #[test]
    fn test_near_empty_mask_is_rejected() {
        let mask = Mask::from_fn(100, 100, |x, y| x == 0 && y == 0);
        let result = QualityEvaluator::new().evaluate(&mask);
        assert!(result.coverage < 0.01);
        assert_eq!(result.hard_score, 0.0);
        assert_eq!(result.connectivity, 1.0);
    }

    #[test]
    fn test_centered_rectangle_scores_well() {
        // 100x100 filled rectangle centered on a 256x256 canvas.
        let mask = Mask::from_fn(256, 256, |x, y| {
            (78..178).contains(&x) && (78..178).contains(&y)
        });
        let result = QualityEvaluator::new().evaluate(&mask);

        let expected_coverage = 10_000.0 / 65_536.0;
        assert!((result.coverage - expected_coverage).abs() < 1e-9);
        assert_eq!(result.connectivity, 1.0);
        assert!(result.smoothness > 0.97);

        let expected = 0.4 * result.coverage + 0.4 + 0.2 * result.smoothness;
        assert!((result.hard_score - expected).abs() < 1e-12);
        assert!(result.hard_score > 0.6);
        assert!(!result.is_degenerate());
    }

    #[test]
    fn test_fragmented_mask_scores_below_solid() {
        let solid = Mask::from_fn(64, 64, |x, y| (16..48).contains(&x) && (16..48).contains(&y));
        let fragmented = Mask::from_fn(64, 64, |x, y| {
            ((4..20).contains(&x) || (30..46).contains(&x)) && y % 8 < 4
        });
        let evaluator = QualityEvaluator::new();
        assert!(evaluator.evaluate(&solid).hard_score > evaluator.evaluate(&fragmented).hard_score);
    }

    #[tokio::test]
    async fn test_soft_score_blending() {
        let mask = Mask::from_fn(64, 64, |x, y| (16..48).contains(&x) && (16..48).contains(&y));
        let evaluator = QualityEvaluator::new().with_assessor(Arc::new(FixedAssessor {
            coverage_score: 0.9,
            semantic_score: 0.7,
        }));

        let result = evaluator
            .evaluate_with_assessment(&Image::new(64, 64), &mask, "box")
            .await
            .unwrap();

        let soft = 0.5 * 0.9 + 0.5 * 0.7;
        assert_eq!(result.soft_score, Some(soft));
        assert!((result.total_score - (0.4 * result.hard_score + 0.6 * soft)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_without_assessor_total_equals_hard() {
        let mask = Mask::from_fn(64, 64, |x, _| x < 32);
        let evaluator = QualityEvaluator::new();
        let result = evaluator
            .evaluate_with_assessment(&Image::new(64, 64), &mask, "box")
            .await
            .unwrap();
        assert_eq!(result.soft_score, None);
        assert_eq!(result.total_score, result.hard_score);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mask = Mask::from_fn(32, 32, |x, _| x < 16);
        let result = QualityEvaluator::new().evaluate(&mask);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("hardScore").is_some());
        assert!(json.get("totalScore").is_some());
        // No assessor: softScore omitted entirely.
        assert!(json.get("softScore").is_none());
    }
}
