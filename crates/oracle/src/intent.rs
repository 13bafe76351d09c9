//! Task Intent Resolution
//!
//! Before round 1 the user's free-form request is resolved into a goal and
//! a target object by the oracle (intent parsing is an external concern;
//! only its contract is enforced here). The resolved object string is what
//! the task-object placeholder substitutes to during tool dispatch.

use serde::{Deserialize, Serialize};

use segflow_core::{CoreError, CoreResult};

use crate::decision::extract_json_object;
use crate::prompts::INTENT_SYSTEM_PROMPT;
use crate::provider::Oracle;

/// The high-level goal of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskGoal {
    Detection,
    Segmentation,
}

/// A resolved user request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIntent {
    pub goal: TaskGoal,
    /// Target object string, e.g. "pantograph".
    pub object: String,
}

#[derive(Debug, Deserialize)]
struct IntentEnvelope {
    user_goal: String,
    task_object: String,
}

/// Parse an intent reply of the form
/// `{"user_goal": "Segmentation", "task_object": "hole"}`.
pub fn parse_intent(answer: &str) -> CoreResult<TaskIntent> {
    let body = extract_json_object(answer)
        .ok_or_else(|| CoreError::oracle_parse("No JSON object found in intent answer"))?;
    let envelope: IntentEnvelope = serde_json::from_str(body)
        .map_err(|e| CoreError::oracle_parse(format!("Malformed intent object: {}", e)))?;

    let goal = match envelope.user_goal.as_str() {
        "Detection" => TaskGoal::Detection,
        "Segmentation" => TaskGoal::Segmentation,
        other => {
            return Err(CoreError::oracle_parse(format!(
                "Unknown user goal: {}",
                other
            )))
        }
    };

    if envelope.task_object.trim().is_empty() {
        return Err(CoreError::oracle_parse("Empty task object"));
    }

    Ok(TaskIntent {
        goal,
        object: envelope.task_object,
    })
}

/// Resolve a raw user request into a [`TaskIntent`] via the oracle.
pub async fn resolve_intent(oracle: &dyn Oracle, user_prompt: &str) -> CoreResult<TaskIntent> {
    let reply = oracle.decide(INTENT_SYSTEM_PROMPT, user_prompt).await?;
    parse_intent(&reply.answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OracleReply;
    use async_trait::async_trait;

    #[test]
    fn test_parse_intent_segmentation() {
        let intent =
            parse_intent(r#"{"user_goal": "Segmentation", "task_object": "pantograph"}"#).unwrap();
        assert_eq!(intent.goal, TaskGoal::Segmentation);
        assert_eq!(intent.object, "pantograph");
    }

    #[test]
    fn test_parse_intent_detection() {
        let intent = parse_intent(r#"{"user_goal": "Detection", "task_object": "hole"}"#).unwrap();
        assert_eq!(intent.goal, TaskGoal::Detection);
    }

    #[test]
    fn test_parse_intent_rejects_unknown_goal() {
        let err = parse_intent(r#"{"user_goal": "Captioning", "task_object": "cat"}"#).unwrap_err();
        assert!(matches!(err, CoreError::OracleParse(_)));
    }

    #[test]
    fn test_parse_intent_rejects_empty_object() {
        let err = parse_intent(r#"{"user_goal": "Segmentation", "task_object": "  "}"#).unwrap_err();
        assert!(matches!(err, CoreError::OracleParse(_)));
    }

    struct FixedOracle(&'static str);

    #[async_trait]
    impl Oracle for FixedOracle {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn decide(&self, _system_prompt: &str, _context: &str) -> CoreResult<OracleReply> {
            Ok(OracleReply {
                reasoning: String::new(),
                answer: self.0.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_intent_via_oracle() {
        let oracle = FixedOracle(r#"{"user_goal": "Segmentation", "task_object": "rail"}"#);
        let intent = resolve_intent(&oracle, "segment the rail please").await.unwrap();
        assert_eq!(intent.object, "rail");
    }
}
