//! Segflow Oracle
//!
//! The external decision-making port and everything needed to talk to it:
//!
//! - `provider` - the `Oracle` trait and raw reply type
//! - `decision` - strict parsing of `{tool, parameters}` answers
//! - `intent` - task-intent resolution (goal + target object)
//! - `prompts` - system prompt text
//!
//! Concrete model backends live outside this workspace; tests use scripted
//! implementations of the `Oracle` trait.

pub mod decision;
pub mod intent;
pub mod prompts;
pub mod provider;

pub use decision::parse_decision;
pub use intent::{parse_intent, resolve_intent, TaskGoal, TaskIntent};
pub use prompts::{DECISION_SYSTEM_PROMPT, INTENT_SYSTEM_PROMPT};
pub use provider::{Oracle, OracleReply};
