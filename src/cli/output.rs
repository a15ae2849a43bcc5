//! Output formatting for CLI commands.

use std::fmt::Write;

use crate::agent::finding::AgentRunResult;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognized is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Renders a run as the report followed by a one-line summary footer.
#[must_use]
pub fn format_run_text(result: &AgentRunResult, verbose: bool) -> String {
    let tools = if result.tools_used.is_empty() {
        "none".to_string()
    } else {
        result.tools_used.join(", ")
    };

    let mut output = result.report.clone();
    let _ = write!(
        output,
        "\n\n---\nIterations: {} | Tools: {tools} | Tokens: {} | Time: {:.1}s",
        result.iterations,
        result.total_tokens,
        result.elapsed.as_secs_f64()
    );

    if verbose {
        for (iteration, finding) in result.findings.iter() {
            let _ = write!(
                output,
                "\nFinding {iteration} ({}): {}",
                finding.produced_by, finding.payload
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::finding::RunState;
    use crate::agent::message::TokenUsage;
    use crate::agent::planner::Plan;
    use std::time::Duration;

    #[test]
    fn test_parse() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_format_run_text_footer() {
        let plan = Plan::Raw {
            raw_plan: "p".to_string(),
        };
        let result = RunState::planned(plan, TokenUsage::default())
            .finish("# Report".to_string(), Duration::from_millis(1500));

        let text = format_run_text(&result, false);
        assert!(text.starts_with("# Report"));
        assert!(text.contains("Iterations: 0 | Tools: none | Tokens: 0 | Time: 1.5s"));
    }
}
