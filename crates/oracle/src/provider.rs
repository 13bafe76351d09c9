//! Oracle Port
//!
//! The decision-making model behind the refinement loop is an external
//! collaborator. Its reasoning content is opaque; only the reply contract
//! matters here: given a system prompt and a context payload, it returns
//! free-form reasoning text plus a structured answer that must parse into
//! one tool invocation or one terminal verdict.

use async_trait::async_trait;

use segflow_core::CoreResult;

/// One raw oracle reply: reasoning text and the structured answer body.
#[derive(Debug, Clone)]
pub struct OracleReply {
    /// Free-form reasoning. Never interpreted, only logged and recorded.
    pub reasoning: String,
    /// The answer body, expected to contain a JSON `{tool, parameters}`
    /// object. Parsed by [`crate::decision::parse_decision`].
    pub answer: String,
}

/// External decision-making port.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Identifying name for logs and strategy records.
    fn name(&self) -> &'static str;

    /// Ask the oracle for the next step given a system prompt and a context
    /// payload (latest evaluation plus a bounded memory summary).
    async fn decide(&self, system_prompt: &str, context: &str) -> CoreResult<OracleReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoOracle;

    #[async_trait]
    impl Oracle for EchoOracle {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn decide(&self, _system_prompt: &str, context: &str) -> CoreResult<OracleReply> {
            Ok(OracleReply {
                reasoning: String::new(),
                answer: context.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_oracle_trait_object() {
        let oracle: std::sync::Arc<dyn Oracle> = std::sync::Arc::new(EchoOracle);
        let reply = oracle.decide("sys", "{\"tool\": \"pass\"}").await.unwrap();
        assert_eq!(oracle.name(), "echo");
        assert!(reply.answer.contains("pass"));
    }

    #[test]
    fn test_port_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Oracle>();
    }
}
