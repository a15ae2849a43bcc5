//! Autonomous analysis agent.
//!
//! Plans an analysis for a query, investigates in bounded, self-directed
//! steps through pluggable capability providers, and synthesizes a report.
//! Uses a pluggable provider abstraction backed by OpenAI-compatible APIs
//! or a scripted replay.
//!
//! # Architecture
//!
//! ```text
//! Query → AgentRun
//!   ├── PlanningAgent (plan, or raw-text plan)
//!   ├── loop while within the investigation budget
//!   │   ├── ActionSelector → Action (complete ends the loop)
//!   │   ├── ActionExecutor → CapabilityTable → ActionResult
//!   │   ├── RunState records tool, finding, and trace entry
//!   │   └── ContinuationEvaluator (ceiling first, then the model)
//!   └── SynthesizerAgent → report
//! ```
//!
//! [`SimpleResponder`] handles non-analytical messages and chat titles
//! with a single call.

pub mod action;
pub mod client;
pub mod config;
pub mod evaluator;
pub mod executor;
pub mod finding;
pub mod message;
pub mod orchestrator;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod query;
pub mod responder;
pub mod retry;
pub mod selector;
pub mod structured;
pub mod synthesizer;
pub mod traits;

// Re-export key types
pub use action::{Action, ActionKind};
pub use config::AgentConfig;
pub use evaluator::ContinuationEvaluator;
pub use executor::{
    ActionExecutor, CapabilityContext, CapabilityProvider, CapabilityTable, Provided,
};
pub use finding::{ActionResult, AgentRunResult, Findings, RunState, TraceEntry};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::AgentRun;
pub use planner::{AnalysisPlan, Plan, PlanningAgent};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use query::{DatasetContext, Query};
pub use responder::SimpleResponder;
pub use retry::RetryPolicy;
pub use selector::ActionSelector;
pub use structured::{Interpreted, interpret};
pub use synthesizer::SynthesizerAgent;
pub use traits::{Agent, AgentResponse};
