//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::format_push_string)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::orchestrator::AgentRun;
use crate::agent::prompt::PromptSet;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::ScriptedProvider;
use crate::agent::query::{DatasetContext, Query};
use crate::agent::responder::SimpleResponder;
use crate::agent::retry::RetryPolicy;
use crate::cli::output::{OutputFormat, format_run_text};
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};

/// Parameters for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunParams<'a> {
    /// The question to analyze.
    pub query: &'a str,
    /// Dataset description file.
    pub dataset: Option<&'a Path>,
    /// Iteration ceiling override.
    pub max_iterations: Option<u32>,
    /// Model override.
    pub model: Option<&'a str>,
    /// Provider override.
    pub provider: Option<&'a str>,
    /// Prompt template directory.
    pub prompt_dir: Option<&'a Path>,
    /// Whole-run retry override.
    pub retries: Option<u32>,
    /// Replay script replacing the network provider.
    pub replay: Option<&'a Path>,
    /// Show per-iteration findings in text output.
    pub verbose: bool,
}

/// Parameters shared by the single-call commands (`respond`, `title`).
#[derive(Debug, Clone, Default)]
pub struct DirectParams<'a> {
    /// The user's message.
    pub message: &'a str,
    /// Model override.
    pub model: Option<&'a str>,
    /// Provider override.
    pub provider: Option<&'a str>,
    /// Replay script replacing the network provider.
    pub replay: Option<&'a Path>,
}

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Run {
            query,
            dataset,
            max_iterations,
            model,
            provider,
            prompt_dir,
            retries,
            replay,
        } => {
            let params = RunParams {
                query,
                dataset: dataset.as_deref(),
                max_iterations: *max_iterations,
                model: model.as_deref(),
                provider: provider.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
                retries: *retries,
                replay: replay.as_deref(),
                verbose: cli.verbose,
            };
            cmd_run(&params, format)
        }
        Commands::Respond {
            message,
            context,
            model,
            provider,
            replay,
        } => {
            let params = DirectParams {
                message,
                model: model.as_deref(),
                provider: provider.as_deref(),
                replay: replay.as_deref(),
            };
            cmd_respond(&params, context.as_deref(), format)
        }
        Commands::Title {
            message,
            model,
            provider,
            replay,
        } => {
            let params = DirectParams {
                message,
                model: model.as_deref(),
                provider: provider.as_deref(),
                replay: replay.as_deref(),
            };
            cmd_title(&params, format)
        }
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

// ==================== Command Implementations ====================

fn cmd_run(params: &RunParams<'_>, format: OutputFormat) -> Result<String> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(n) = params.max_iterations {
        builder = builder.max_iterations(n);
    }
    if let Some(model) = params.model {
        builder = builder.model(model);
    }
    if let Some(provider) = params.provider {
        builder = builder.provider(provider);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    let mut config = builder
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Agent configuration error: {e}")))?;
    match params.retries {
        Some(retries) => config.retry.max_retries = retries,
        // A replayed script cannot recover once exhausted.
        None if params.replay.is_some() => config.retry = RetryPolicy::none(),
        None => {}
    }

    let mut query = Query::new(params.query);
    if let Some(path) = params.dataset {
        query = query.with_dataset(load_dataset(path)?);
    }

    let provider = resolve_provider(&config, params.replay)?;
    let policy = config.retry;
    let agent = AgentRun::new(provider, config)?;

    let result = runtime()?
        .block_on(agent.run_with_retry(&query, &policy))
        .map_err(|e| CommandError::ExecutionFailed(format!("Analysis failed: {e}")))?;

    match format {
        OutputFormat::Text => Ok(format_run_text(&result, params.verbose)),
        OutputFormat::Json => serde_json::to_string_pretty(&result).map_err(|e| {
            CommandError::OutputFormat(format!("JSON serialization failed: {e}")).into()
        }),
    }
}

fn cmd_respond(
    params: &DirectParams<'_>,
    context: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let config = direct_config(params)?;
    let provider = resolve_provider(&config, params.replay)?;
    let responder = SimpleResponder::new(&config);

    let response = runtime()?
        .block_on(responder.respond(provider.as_ref(), params.message, context))
        .map_err(|e| CommandError::ExecutionFailed(format!("Reply failed: {e}")))?;

    match format {
        OutputFormat::Text => Ok(response.content),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "response": response.content,
                "tokens": response.usage.total_tokens,
            });
            serde_json::to_string_pretty(&json).map_err(|e| {
                CommandError::OutputFormat(format!("JSON serialization failed: {e}")).into()
            })
        }
    }
}

fn cmd_title(params: &DirectParams<'_>, format: OutputFormat) -> Result<String> {
    let config = direct_config(params)?;
    let provider = resolve_provider(&config, params.replay)?;
    let responder = SimpleResponder::new(&config);

    let title = runtime()?.block_on(responder.title(provider.as_ref(), params.message));

    match format {
        OutputFormat::Text => Ok(title),
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({ "title": title }))
            .map_err(|e| {
                CommandError::OutputFormat(format!("JSON serialization failed: {e}")).into()
            }),
    }
}

// ==================== Helpers ====================

fn direct_config(params: &DirectParams<'_>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(model) = params.model {
        builder = builder.model(model);
    }
    if let Some(provider) = params.provider {
        builder = builder.provider(provider);
    }
    builder.build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

/// Uses the replay script when given, otherwise the configured provider.
fn resolve_provider(config: &AgentConfig, replay: Option<&Path>) -> Result<Arc<dyn LlmProvider>> {
    if let Some(script) = replay {
        debug!(path = %script.display(), "replaying scripted responses");
        let provider = ScriptedProvider::from_file(script)
            .map_err(|e| CommandError::InvalidInput(format!("Replay script rejected: {e}")))?;
        return Ok(Arc::new(provider));
    }

    let provider = create_provider(config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;
    Ok(Arc::from(provider))
}

/// Creates the tokio runtime used as the sync/async bridge.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

/// Reads a dataset description from a JSON file.
fn load_dataset(path: &Path) -> Result<DatasetContext> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        CommandError::InvalidInput(format!(
            "Dataset file {} is not a valid dataset description: {e}",
            path.display()
        ))
        .into()
    })
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize agent system prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir,
                "written": written,
            });
            serde_json::to_string_pretty(&json).map_err(|e| {
                CommandError::OutputFormat(format!("JSON serialization failed: {e}")).into()
            })
        }
    }
}
