//! Refinement Loop
//!
//! Drives one run: initial full-image segmentation, evaluation, then a
//! bounded corrective loop where the oracle picks the next tool from the
//! latest evaluation and a bounded memory summary. The loop is strictly
//! sequential; the only parallelism lives inside patch segmentation.
//!
//! Outcome semantics: a `pass` verdict (or meeting the quality threshold)
//! returns the current candidate; `terminate` and retry exhaustion return
//! the best mask ever seen. Best tracking is strict improvement, so ties
//! keep the incumbent. Every per-round failure is appended to memory before
//! it propagates, and the memory travels with the error.

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use segflow_core::{
    CoreError, CoreResult, Decision, Image, Mask, Segmenter, ToolAction, ToolContext, Verdict,
};
use segflow_eval::{EvaluationResult, QualityEvaluator};
use segflow_oracle::{parse_decision, Oracle, DECISION_SYSTEM_PROMPT};
use segflow_tools::{standard_registry, ToolRegistry};

use crate::archive::{summarize_strategy, StrategyRecord, StrategyWriter};
use crate::config::RefineConfig;
use crate::memory::StepMemory;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunVerdict {
    /// The oracle passed the candidate, or it met the quality threshold.
    Passed,
    /// The oracle stopped the run; the best mask seen is returned.
    Terminated,
    /// The retry budget ran out; the best mask seen is returned.
    Exhausted,
}

/// A finished refinement run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub mask: Mask,
    pub verdict: RunVerdict,
    pub evaluation: EvaluationResult,
    /// Rounds executed, the initial segmentation included.
    pub rounds: u32,
    pub memory: StepMemory,
    /// Oracle-stated reason for a pass/terminate verdict.
    pub reason: Option<String>,
}

/// A failed refinement run. Carries the step memory so the failed round
/// stays inspectable.
#[derive(Debug, Error)]
#[error("refinement run {run_id} failed: {error}")]
pub struct RunFailure {
    pub run_id: String,
    #[source]
    pub error: CoreError,
    pub memory: StepMemory,
}

impl RunFailure {
    fn new(run_id: &str, error: CoreError, memory: StepMemory) -> Self {
        Self {
            run_id: run_id.to_string(),
            error,
            memory,
        }
    }
}

/// The orchestrator. Owns the model handles, evaluator, tool registry, and
/// configuration; `run` executes one bounded refinement.
pub struct RefinementLoop {
    segmenter: Arc<dyn Segmenter>,
    oracle: Arc<dyn Oracle>,
    evaluator: QualityEvaluator,
    registry: ToolRegistry,
    config: RefineConfig,
    archive: Option<StrategyWriter>,
}

impl RefinementLoop {
    /// Build a loop with the standard tool set and default configuration.
    pub fn new(segmenter: Arc<dyn Segmenter>, oracle: Arc<dyn Oracle>) -> Self {
        let registry = standard_registry(Arc::clone(&segmenter));
        Self {
            segmenter,
            oracle,
            evaluator: QualityEvaluator::new(),
            registry,
            config: RefineConfig::default(),
            archive: None,
        }
    }

    pub fn with_config(mut self, config: RefineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_evaluator(mut self, evaluator: QualityEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Replace the standard tool set.
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Archive finished runs to a JSONL strategy file.
    pub fn with_archive(mut self, archive: StrategyWriter) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn config(&self) -> &RefineConfig {
        &self.config
    }

    /// Execute one refinement run over `image` for `object_label`.
    pub async fn run(
        &self,
        image: Arc<Image>,
        object_label: &str,
    ) -> Result<RunOutcome, RunFailure> {
        let run_id = Uuid::new_v4().to_string();
        let mut memory = StepMemory::new();

        if let Err(e) = self.config.validate() {
            return Err(RunFailure::new(&run_id, e, memory));
        }

        let ctx = ToolContext::new(&run_id, Arc::clone(&image), object_label);
        info!(
            run_id,
            object_label,
            width = image.width(),
            height = image.height(),
            "refinement run started"
        );

        // Round 1: full-image segmentation, exactly once.
        let mut round = 1u32;
        let initial_action = ToolAction::SegmentFull { prompt: None };
        let mut current = match self.initial_segmentation(&ctx).await {
            Ok(mask) => mask,
            Err(e) => {
                memory.record_failure(round, "segment_full", json!({}), &e);
                return Err(RunFailure::new(&run_id, e, memory));
            }
        };

        let mut evaluation = match self.score(&ctx, &current).await {
            Ok(eval) => eval,
            Err(e) => {
                memory.record_failure(round, "evaluate", json!({}), &e);
                return Err(RunFailure::new(&run_id, e, memory));
            }
        };
        memory.record_round(round, &initial_action, evaluation.clone());

        let mut best = current.clone();
        let mut best_score = evaluation.total_score;
        let mut best_evaluation = evaluation.clone();
        let mut attempt = 0u32;

        let outcome = loop {
            info!(
                run_id,
                round,
                total_score = evaluation.total_score,
                best_score,
                "round evaluated"
            );

            if evaluation.total_score >= self.config.quality_threshold {
                break RunOutcome {
                    run_id: run_id.clone(),
                    mask: current,
                    verdict: RunVerdict::Passed,
                    evaluation,
                    rounds: round,
                    memory,
                    reason: None,
                };
            }

            if attempt >= self.config.max_retry {
                info!(run_id, best_score, "retry budget exhausted, returning best mask");
                break RunOutcome {
                    run_id: run_id.clone(),
                    mask: best,
                    verdict: RunVerdict::Exhausted,
                    evaluation: best_evaluation,
                    rounds: round,
                    memory,
                    reason: None,
                };
            }

            // DECIDE: latest evaluation plus the bounded memory window.
            let context = self.decision_context(round, &evaluation, &memory);
            let reply = match self.oracle.decide(DECISION_SYSTEM_PROMPT, &context).await {
                Ok(reply) => reply,
                Err(e) => {
                    memory.record_failure(round, "decision", json!({}), &e);
                    return Err(RunFailure::new(&run_id, e, memory));
                }
            };

            let decision = match parse_decision(&reply.answer) {
                Ok(decision) => decision,
                Err(e) => {
                    memory.record_failure(round, "decision", json!({}), &e);
                    return Err(RunFailure::new(&run_id, e, memory));
                }
            };

            match decision {
                Decision::Verdict(Verdict::Pass { reason }) => {
                    break RunOutcome {
                        run_id: run_id.clone(),
                        mask: current,
                        verdict: RunVerdict::Passed,
                        evaluation,
                        rounds: round,
                        memory,
                        reason,
                    };
                }
                Decision::Verdict(Verdict::Terminate { reason }) => {
                    break RunOutcome {
                        run_id: run_id.clone(),
                        mask: best,
                        verdict: RunVerdict::Terminated,
                        evaluation: best_evaluation,
                        rounds: round,
                        memory,
                        reason,
                    };
                }
                Decision::Tool(action) => {
                    attempt += 1;
                    round += 1;
                    let round_ctx = ctx.for_round(round);
                    info!(run_id, round, tool = %action.tool_name(), "applying tool");

                    let mask = match self.registry.dispatch(&round_ctx, &action, &current).await {
                        Ok(mask) => mask,
                        Err(e) => {
                            memory.record_failure(
                                round,
                                action.tool_name(),
                                action.parameters(),
                                &e,
                            );
                            return Err(RunFailure::new(&run_id, e, memory));
                        }
                    };

                    evaluation = match self.score(&round_ctx, &mask).await {
                        Ok(eval) => eval,
                        Err(e) => {
                            memory.record_failure(
                                round,
                                action.tool_name(),
                                action.parameters(),
                                &e,
                            );
                            return Err(RunFailure::new(&run_id, e, memory));
                        }
                    };
                    memory.record_round(round, &action, evaluation.clone());

                    // Strict improvement; ties keep the incumbent.
                    if evaluation.total_score > best_score {
                        best = mask.clone();
                        best_score = evaluation.total_score;
                        best_evaluation = evaluation.clone();
                    }
                    current = mask;
                }
            }
        };

        info!(
            run_id,
            verdict = ?outcome.verdict,
            rounds = outcome.rounds,
            total_score = outcome.evaluation.total_score,
            "refinement run finished"
        );

        self.archive_outcome(object_label, &outcome).await;
        Ok(outcome)
    }

    async fn initial_segmentation(&self, ctx: &ToolContext) -> CoreResult<Mask> {
        let mask = self
            .segmenter
            .segment(ctx.object_label(), ctx.image())
            .await?;
        if mask.width() != ctx.image().width() || mask.height() != ctx.image().height() {
            return Err(CoreError::validation(format!(
                "Segmenter returned a {}x{} mask for a {}x{} image",
                mask.height(),
                mask.width(),
                ctx.image().height(),
                ctx.image().width()
            )));
        }
        Ok(mask)
    }

    async fn score(&self, ctx: &ToolContext, mask: &Mask) -> CoreResult<EvaluationResult> {
        self.evaluator
            .evaluate_with_assessment(ctx.image(), mask, ctx.object_label())
            .await
    }

    fn decision_context(
        &self,
        round: u32,
        evaluation: &EvaluationResult,
        memory: &StepMemory,
    ) -> String {
        let history: Value = serde_json::from_str(&memory.summary(self.config.memory_window))
            .unwrap_or_else(|_| Value::Array(Vec::new()));
        json!({
            "round": round,
            "maxRetry": self.config.max_retry,
            "qualityThreshold": self.config.quality_threshold,
            "evaluation": evaluation,
            "history": history,
        })
        .to_string()
    }

    /// Archive the finished run. Archiving is best-effort: a sink failure is
    /// logged and does not fail a finished run.
    async fn archive_outcome(&self, object_label: &str, outcome: &RunOutcome) {
        let Some(writer) = &self.archive else {
            return;
        };
        let summary = summarize_strategy(&outcome.memory);
        let record = StrategyRecord::new(
            object_label,
            summary,
            outcome.evaluation.total_score,
            outcome.evaluation.total_score,
        );
        if let Err(e) = writer.append(&record).await {
            warn!(run_id = outcome.run_id, error = %e, "strategy archive append failed");
        }
    }
}
