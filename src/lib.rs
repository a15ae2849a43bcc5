//! # insight-agent
//!
//! An autonomous data-analysis agent. Given a natural-language question
//! and an optional dataset description, it plans an analysis, performs a
//! bounded number of self-directed investigation steps through pluggable
//! capability providers, and synthesizes a report.
//!
//! Every call to the text-generation service goes through one protocol:
//! a single request/response round-trip whose text is interpreted as the
//! expected JSON shape or degraded to a raw-text fallback. Malformed output
//! never fails a run; only transport failures do, and those are retried
//! (if at all) by an outer policy around the whole run.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use insight_agent::agent::{AgentConfig, AgentRun, Query};
//! use insight_agent::agent::providers::ScriptedProvider;
//!
//! # async fn demo() -> Result<(), insight_agent::error::AgentError> {
//! let provider = Arc::new(ScriptedProvider::new([
//!     r#"{"main_objective": "explain the dip"}"#,
//!     r#"{"kind": "complete"}"#,
//!     "# Report",
//! ]));
//! let config = AgentConfig::builder().max_iterations(5).build()?;
//! let result = AgentRun::new(provider, config)?
//!     .run_once(&Query::new("Why did revenue dip?"))
//!     .await?;
//! assert_eq!(result.report, "# Report");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod error;

pub use error::{AgentError, CommandError, Error, Result};
