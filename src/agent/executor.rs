//! Action executor that dispatches actions to capability providers.
//!
//! Each dispatchable [`ActionKind`] has one slot in a [`CapabilityTable`].
//! The dispatch `match` is exhaustive over the kinds, so adding a kind
//! forces a decision here. Empty slots, `complete`, and unknown kinds all
//! yield [`ActionResult::unknown_action`] instead of failing the run.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::action::{Action, ActionKind};
use super::config::AgentConfig;
use super::finding::{ActionResult, Findings};
use super::message::TokenUsage;
use super::prompt::build_analysis_prompt;
use super::provider::LlmProvider;
use super::query::Query;
use super::structured::interpret;
use super::traits::Agent;
use crate::error::AgentError;

/// Read-only view of the run handed to capability providers.
#[derive(Clone, Copy)]
pub struct CapabilityContext<'a> {
    /// Text-generation service for providers that call out.
    pub provider: &'a dyn LlmProvider,
    /// Run configuration.
    pub config: &'a AgentConfig,
    /// The run's input.
    pub query: &'a Query,
    /// Findings recorded before this action.
    pub findings: &'a Findings,
}

/// Payload and token usage returned by one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct Provided {
    /// Provider-specific result fields.
    pub payload: Value,
    /// Tokens spent producing it.
    pub usage: TokenUsage,
}

impl Provided {
    /// A payload produced without calling out.
    #[must_use]
    pub fn local(payload: Value) -> Self {
        Self {
            payload,
            usage: TokenUsage::default(),
        }
    }
}

/// A pluggable function performing the analysis for one action kind.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Performs `action` and returns its payload.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only on transport failure. Providers must
    /// return a well-formed payload for any model output.
    async fn provide(
        &self,
        action: &Action,
        ctx: &CapabilityContext<'_>,
    ) -> Result<Provided, AgentError>;
}

/// Dispatch table: one provider slot per dispatchable action kind.
#[derive(Default)]
pub struct CapabilityTable {
    analyze: Option<Box<dyn CapabilityProvider>>,
    calculate: Option<Box<dyn CapabilityProvider>>,
    compare: Option<Box<dyn CapabilityProvider>>,
    investigate_anomaly: Option<Box<dyn CapabilityProvider>>,
}

impl CapabilityTable {
    /// A table with no providers registered.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in providers: LLM-backed analysis plus structured echoes
    /// for calculate, compare, and anomaly investigation.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with(ActionKind::Analyze, AnalyzeCapability)
            .with(
                ActionKind::Calculate,
                EchoCapability::new("calculation", "performed"),
            )
            .with(
                ActionKind::Compare,
                EchoCapability::new("comparison", "completed"),
            )
            .with(
                ActionKind::InvestigateAnomaly,
                EchoCapability::new("anomaly_investigation", "completed"),
            )
    }

    /// Registers `provider` under `kind`, replacing any previous one.
    ///
    /// Returns `false` if `kind` has no slot (`complete` or unknown).
    pub fn register(&mut self, kind: &ActionKind, provider: Box<dyn CapabilityProvider>) -> bool {
        match self.slot_mut(kind) {
            Some(slot) => {
                *slot = Some(provider);
                true
            }
            None => false,
        }
    }

    /// Builder form of [`CapabilityTable::register`].
    #[must_use]
    pub fn with(mut self, kind: ActionKind, provider: impl CapabilityProvider + 'static) -> Self {
        self.register(&kind, Box::new(provider));
        self
    }

    /// Returns the provider registered for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: &ActionKind) -> Option<&dyn CapabilityProvider> {
        let slot = match kind {
            ActionKind::Analyze => &self.analyze,
            ActionKind::Calculate => &self.calculate,
            ActionKind::Compare => &self.compare,
            ActionKind::InvestigateAnomaly => &self.investigate_anomaly,
            ActionKind::Complete | ActionKind::Unknown(_) => return None,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, kind: &ActionKind) -> Option<&mut Option<Box<dyn CapabilityProvider>>> {
        match kind {
            ActionKind::Analyze => Some(&mut self.analyze),
            ActionKind::Calculate => Some(&mut self.calculate),
            ActionKind::Compare => Some(&mut self.compare),
            ActionKind::InvestigateAnomaly => Some(&mut self.investigate_anomaly),
            ActionKind::Complete | ActionKind::Unknown(_) => None,
        }
    }
}

/// Outcome of executing one action.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Capability name to record in the tool-usage log.
    pub tool: String,
    /// The provider's result, or the `unknown_action` result.
    pub result: ActionResult,
    /// Tokens spent by the provider.
    pub usage: TokenUsage,
}

/// Dispatches actions through a [`CapabilityTable`].
pub struct ActionExecutor<'t> {
    table: &'t CapabilityTable,
}

impl<'t> ActionExecutor<'t> {
    /// Creates an executor over `table`.
    #[must_use]
    pub const fn new(table: &'t CapabilityTable) -> Self {
        Self { table }
    }

    /// Executes `action` with the matching provider.
    ///
    /// The attempted kind is always reported as the tool name, even when
    /// no provider is registered for it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only if the provider hits a transport failure.
    pub async fn execute(
        &self,
        action: &Action,
        ctx: &CapabilityContext<'_>,
    ) -> Result<Execution, AgentError> {
        let tool = action.kind.as_str().to_string();

        let Some(provider) = self.table.get(&action.kind) else {
            info!(kind = %action.kind, "no provider registered, recording unknown_action");
            return Ok(Execution {
                tool,
                result: ActionResult::unknown_action(action.kind.clone()),
                usage: TokenUsage::default(),
            });
        };

        debug!(kind = %action.kind, target = %action.target, "dispatching capability");
        let provided = provider.provide(action, ctx).await?;

        Ok(Execution {
            tool,
            result: ActionResult {
                produced_by: action.kind.clone(),
                payload: provided.payload,
            },
            usage: provided.usage,
        })
    }
}

/// LLM-backed general analysis.
///
/// Expects a JSON object back; anything else is kept as `{"insight": raw}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeCapability;

struct AnalystAgent {
    model: String,
    max_tokens: u32,
}

#[async_trait]
impl Agent for AnalystAgent {
    fn name(&self) -> &'static str {
        "analyst"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[async_trait]
impl CapabilityProvider for AnalyzeCapability {
    async fn provide(
        &self,
        action: &Action,
        ctx: &CapabilityContext<'_>,
    ) -> Result<Provided, AgentError> {
        let agent = AnalystAgent {
            model: ctx.config.model.clone(),
            max_tokens: ctx.config.capability_max_tokens,
        };
        let user_msg = build_analysis_prompt(ctx.query, action, ctx.findings);
        let response = agent.execute(ctx.provider, &user_msg).await?;

        let payload = interpret::<Map<String, Value>>(&response.content)
            .unwrap_or_else(|raw| {
                let mut map = Map::new();
                map.insert("insight".to_string(), Value::String(raw));
                map
            });

        Ok(Provided {
            payload: Value::Object(payload),
            usage: response.usage,
        })
    }
}

/// Structured echo of the action under a completion marker.
///
/// Produces `{"<label>": "<status>", "action": {...}}` without calling out.
#[derive(Debug, Clone, Copy)]
pub struct EchoCapability {
    label: &'static str,
    status: &'static str,
}

impl EchoCapability {
    /// Creates an echo provider reporting `label: status`.
    #[must_use]
    pub const fn new(label: &'static str, status: &'static str) -> Self {
        Self { label, status }
    }
}

#[async_trait]
impl CapabilityProvider for EchoCapability {
    async fn provide(
        &self,
        action: &Action,
        _ctx: &CapabilityContext<'_>,
    ) -> Result<Provided, AgentError> {
        let mut payload = Map::new();
        payload.insert(self.label.to_string(), json!(self.status));
        payload.insert(
            "action".to_string(),
            serde_json::to_value(action).unwrap_or(Value::Null),
        );
        Ok(Provided::local(Value::Object(payload)))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::providers::ScriptedProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn action(kind: ActionKind) -> Action {
        Action {
            kind,
            target: "revenue".to_string(),
            method: "sum by region".to_string(),
            rationale: "see which region fell".to_string(),
        }
    }

    fn config() -> AgentConfig {
        AgentConfig::builder()
            .capability_max_tokens(111)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    async fn run(
        table: &CapabilityTable,
        provider: &ScriptedProvider,
        action: &Action,
    ) -> Execution {
        let config = config();
        let query = Query::new("why did revenue fall?");
        let findings = Findings::default();
        let ctx = CapabilityContext {
            provider,
            config: &config,
            query: &query,
            findings: &findings,
        };
        ActionExecutor::new(table)
            .execute(action, &ctx)
            .await
            .unwrap_or_else(|e| panic!("execute failed: {e}"))
    }

    #[tokio::test]
    async fn test_analyze_structured_payload() {
        let table = CapabilityTable::standard();
        let provider = ScriptedProvider::new([r#"{"insight": "EU fell 12%", "data_points": [12]}"#]);

        let execution = run(&table, &provider, &action(ActionKind::Analyze)).await;

        assert_eq!(execution.tool, "analyze");
        assert_eq!(execution.result.produced_by, ActionKind::Analyze);
        assert_eq!(execution.result.payload["insight"], "EU fell 12%");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system_prompt().is_none());
        assert_eq!(requests[0].max_tokens, Some(111));
    }

    #[tokio::test]
    async fn test_analyze_prose_falls_back_to_insight() {
        let table = CapabilityTable::standard();
        let provider = ScriptedProvider::new(["Revenue is flat."]);

        let execution = run(&table, &provider, &action(ActionKind::Analyze)).await;
        assert_eq!(execution.result.payload, json!({"insight": "Revenue is flat."}));
    }

    #[tokio::test]
    async fn test_echo_providers_do_not_call_out() {
        let table = CapabilityTable::standard();
        let provider = ScriptedProvider::new(Vec::<String>::new());

        let calc = run(&table, &provider, &action(ActionKind::Calculate)).await;
        assert_eq!(calc.result.payload["calculation"], "performed");
        assert_eq!(calc.result.payload["action"]["target"], "revenue");

        let cmp = run(&table, &provider, &action(ActionKind::Compare)).await;
        assert_eq!(cmp.result.payload["comparison"], "completed");

        let anomaly = run(&table, &provider, &action(ActionKind::InvestigateAnomaly)).await;
        assert_eq!(anomaly.tool, "investigate_anomaly");
        assert_eq!(anomaly.result.payload["anomaly_investigation"], "completed");

        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_slot_yields_unknown_action() {
        let table = CapabilityTable::empty();
        let provider = ScriptedProvider::new(Vec::<String>::new());

        let execution = run(&table, &provider, &action(ActionKind::Compare)).await;
        assert_eq!(execution.tool, "compare");
        assert_eq!(execution.result.payload, json!({"status": "unknown_action"}));
    }

    #[tokio::test]
    async fn test_unknown_kind_yields_unknown_action() {
        let table = CapabilityTable::standard();
        let provider = ScriptedProvider::new(Vec::<String>::new());

        let execution = run(
            &table,
            &provider,
            &action(ActionKind::Unknown("forecast".to_string())),
        )
        .await;
        assert_eq!(execution.tool, "forecast");
        assert_eq!(execution.result.payload["status"], "unknown_action");
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl CapabilityProvider for Counting {
        async fn provide(
            &self,
            action: &Action,
            ctx: &CapabilityContext<'_>,
        ) -> Result<Provided, AgentError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Provided::local(json!({
                "target": action.target,
                "prior_findings": ctx.findings.len(),
            })))
        }
    }

    #[tokio::test]
    async fn test_registered_provider_replaces_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = CapabilityTable::standard();
        assert!(table.register(&ActionKind::Calculate, Box::new(Counting(Arc::clone(&calls)))));
        let provider = ScriptedProvider::new(Vec::<String>::new());

        let execution = run(&table, &provider, &action(ActionKind::Calculate)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(execution.result.payload["target"], "revenue");
    }

    #[test]
    fn test_register_rejects_terminal_and_unknown() {
        let mut table = CapabilityTable::empty();
        assert!(!table.register(&ActionKind::Complete, Box::new(AnalyzeCapability)));
        assert!(!table.register(
            &ActionKind::Unknown("x".to_string()),
            Box::new(AnalyzeCapability)
        ));
        assert!(table.get(&ActionKind::Complete).is_none());
    }

    #[tokio::test]
    async fn test_analyze_propagates_transport_failure() {
        let table = CapabilityTable::standard();
        let provider = ScriptedProvider::new(Vec::<String>::new());
        let config = config();
        let query = Query::new("q");
        let findings = Findings::default();
        let ctx = CapabilityContext {
            provider: &provider,
            config: &config,
            query: &query,
            findings: &findings,
        };

        let result = ActionExecutor::new(&table)
            .execute(&action(ActionKind::Analyze), &ctx)
            .await;
        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
    }
}
