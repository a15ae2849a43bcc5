//! Investigation actions chosen by the action selector.

use serde::{Deserialize, Serialize};

/// Rationale recorded when the selector's output could not be decoded.
pub const UNPARSEABLE_ACTION_RATIONALE: &str = "unable to parse action";

/// Kind of investigative step.
///
/// A closed set plus [`ActionKind::Unknown`], which preserves any other
/// string the model produced so it can be logged and reported instead of
/// silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// General analysis of a target.
    Analyze,
    /// A specific calculation.
    Calculate,
    /// Comparison between segments.
    Compare,
    /// Deep dive into an anomaly.
    InvestigateAnomaly,
    /// Terminal sentinel: stop investigating and synthesize.
    Complete,
    /// Anything else the model returned.
    Unknown(String),
}

impl ActionKind {
    /// Parses a wire name (case-insensitive; `-` and `_` are equivalent).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "analyze" => Self::Analyze,
            "calculate" => Self::Calculate,
            "compare" => Self::Compare,
            "investigate_anomaly" => Self::InvestigateAnomaly,
            "complete" => Self::Complete,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Analyze => "analyze",
            Self::Calculate => "calculate",
            Self::Compare => "compare",
            Self::InvestigateAnomaly => "investigate_anomaly",
            Self::Complete => "complete",
            Self::Unknown(s) => s,
        }
    }

    /// Returns `true` for the terminal sentinel.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decided investigative step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// What kind of step this is.
    #[serde(alias = "action")]
    pub kind: ActionKind,
    /// What to look at.
    #[serde(default)]
    pub target: String,
    /// How to look at it.
    #[serde(default)]
    pub method: String,
    /// Why this is the next step.
    #[serde(default, alias = "reasoning")]
    pub rationale: String,
}

impl Action {
    /// Fallback used when the selector's output cannot be decoded.
    ///
    /// Ambiguous intent resolves to stopping, never to another iteration.
    #[must_use]
    pub fn unparseable() -> Self {
        Self {
            kind: ActionKind::Complete,
            target: String::new(),
            method: String::new(),
            rationale: UNPARSEABLE_ACTION_RATIONALE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("analyze", ActionKind::Analyze ; "analyze")]
    #[test_case("Calculate", ActionKind::Calculate ; "case insensitive")]
    #[test_case("compare", ActionKind::Compare ; "compare")]
    #[test_case("investigate_anomaly", ActionKind::InvestigateAnomaly ; "snake case")]
    #[test_case("investigate-anomaly", ActionKind::InvestigateAnomaly ; "kebab case")]
    #[test_case("complete", ActionKind::Complete ; "complete")]
    #[test_case("forecast", ActionKind::Unknown("forecast".to_string()) ; "unknown kept verbatim")]
    fn test_parse(input: &str, expected: ActionKind) {
        assert_eq!(ActionKind::parse(input), expected);
    }

    #[test]
    fn test_action_accepts_both_field_spellings() {
        let canonical: Action = serde_json::from_str(
            r#"{"kind": "compare", "target": "regions", "method": "mean revenue", "rationale": "gap"}"#,
        )
        .unwrap_or_else(|_| unreachable!());
        let legacy: Action = serde_json::from_str(
            r#"{"action": "compare", "target": "regions", "method": "mean revenue", "reasoning": "gap"}"#,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(canonical, legacy);
        assert_eq!(canonical.kind, ActionKind::Compare);
        assert_eq!(canonical.rationale, "gap");
    }

    #[test]
    fn test_action_requires_kind() {
        let result = serde_json::from_str::<Action>(r#"{"target": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_action_defaults_optional_fields() {
        let action: Action =
            serde_json::from_str(r#"{"kind": "complete"}"#).unwrap_or_else(|_| unreachable!());
        assert!(action.kind.is_complete());
        assert!(action.target.is_empty());
        assert!(action.rationale.is_empty());
    }

    #[test]
    fn test_kind_serializes_as_wire_name() {
        let json = serde_json::to_string(&ActionKind::InvestigateAnomaly).unwrap_or_default();
        assert_eq!(json, "\"investigate_anomaly\"");
        let json = serde_json::to_string(&ActionKind::Unknown("forecast".to_string()))
            .unwrap_or_default();
        assert_eq!(json, "\"forecast\"");
    }

    #[test]
    fn test_unparseable_is_complete() {
        let action = Action::unparseable();
        assert!(action.kind.is_complete());
        assert_eq!(action.rationale, UNPARSEABLE_ACTION_RATIONALE);
    }
}
