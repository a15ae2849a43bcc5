//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// insight-agent: autonomous data-analysis agent.
///
/// Plans an analysis for a question about a dataset, investigates in
/// bounded steps, and writes a report.
#[derive(Parser, Debug)]
#[command(name = "insight-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an analysis for a question.
    ///
    /// Requires an OpenAI-compatible API key unless `--replay` is given.
    #[command(after_help = r#"Examples:
  insight-agent run "Why did Q3 revenue drop?" --dataset sales.json
  insight-agent run "Which segment churns most?" --max-iterations 5
  insight-agent --format json run "Summarize the data" --replay script.json
  OPENAI_API_KEY=sk-... insight-agent run "Find anomalies" --model gpt-4o
"#)]
    Run {
        /// The question to analyze.
        query: String,

        /// JSON file describing the dataset (columns, types, sample rows).
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Iteration ceiling, counting the synthesis slot.
        #[arg(short = 'n', long)]
        max_iterations: Option<u32>,

        /// Model identifier.
        #[arg(short, long)]
        model: Option<String>,

        /// Text-generation provider.
        #[arg(long)]
        provider: Option<String>,

        /// Directory containing prompt template files.
        #[arg(long, env = "INSIGHT_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,

        /// Whole-run retries after a transport failure.
        #[arg(long)]
        retries: Option<u32>,

        /// Replay responses from a JSON array of strings instead of calling out.
        #[arg(long)]
        replay: Option<PathBuf>,
    },

    /// Reply to a non-analytical message directly, without planning.
    #[command(after_help = r#"Examples:
  insight-agent respond "What can you help me with?"
  insight-agent respond "And for August?" --context "EU revenue fell 18% in Q3."
"#)]
    Respond {
        /// The message to answer.
        message: String,

        /// Earlier assistant reply sent ahead of the message.
        #[arg(short, long)]
        context: Option<String>,

        /// Model identifier.
        #[arg(short, long)]
        model: Option<String>,

        /// Text-generation provider.
        #[arg(long)]
        provider: Option<String>,

        /// Replay responses from a JSON array of strings instead of calling out.
        #[arg(long)]
        replay: Option<PathBuf>,
    },

    /// Generate a short title for a conversation from its first message.
    ///
    /// Falls back to "New Analysis Chat" if no title can be generated.
    Title {
        /// The conversation's opening message.
        message: String,

        /// Model identifier.
        #[arg(short, long)]
        model: Option<String>,

        /// Text-generation provider.
        #[arg(long)]
        provider: Option<String>,

        /// Replay responses from a JSON array of strings instead of calling out.
        #[arg(long)]
        replay: Option<PathBuf>,
    },

    /// Write default prompt templates for customization.
    ///
    /// Existing files are not overwritten.
    #[command(after_help = r#"Examples:
  insight-agent init-prompts                    # ~/.config/insight-agent/prompts/
  insight-agent init-prompts --dir ./prompts    # Custom directory
"#)]
    InitPrompts {
        /// Target directory (defaults to ~/.config/insight-agent/prompts/).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "insight-agent",
            "--format",
            "json",
            "run",
            "why?",
            "-n",
            "4",
            "--replay",
            "script.json",
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(cli.format, "json");
        let Commands::Run {
            query,
            max_iterations,
            replay,
            ..
        } = cli.command
        else {
            unreachable!("expected run");
        };
        assert_eq!(query, "why?");
        assert_eq!(max_iterations, Some(4));
        assert_eq!(replay, Some(PathBuf::from("script.json")));
    }

    #[test]
    fn test_parse_respond_with_context() {
        let cli = Cli::try_parse_from(["insight-agent", "respond", "hi", "-c", "earlier"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        let Commands::Respond {
            message, context, ..
        } = cli.command
        else {
            unreachable!("expected respond");
        };
        assert_eq!(message, "hi");
        assert_eq!(context.as_deref(), Some("earlier"));
    }

    #[test]
    fn test_parse_init_prompts() {
        let cli = Cli::try_parse_from(["insight-agent", "init-prompts", "--dir", "p"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(matches!(cli.command, Commands::InitPrompts { dir: Some(_) }));
    }
}
