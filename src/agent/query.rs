//! Run input: the user's request and an optional dataset description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum accepted query length in bytes.
pub const MAX_QUERY_LEN: usize = 10_000;

/// Immutable input to an agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Free-text user request.
    pub text: String,
    /// Description of the dataset the request is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetContext>,
}

impl Query {
    /// Creates a query without dataset context.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dataset: None,
        }
    }

    /// Attaches dataset context.
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetContext) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Dataset context as JSON for prompt building; `{}` when absent.
    #[must_use]
    pub fn dataset_json(&self) -> Value {
        self.dataset
            .as_ref()
            .and_then(|d| serde_json::to_value(d).ok())
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

/// What the agent knows about the dataset up front.
///
/// Every field is optional so partially described datasets still work.
/// Unrecognized keys are kept in [`DatasetContext::extra`] and passed
/// through to the model untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetContext {
    /// Original file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Column names in file order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Number of data rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    /// Number of columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<u64>,
    /// A small sample of rows, each a column → value object.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_data: Vec<Map<String, Value>>,
    /// Column name → type name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_types: BTreeMap<String, String>,
    /// Any other metadata supplied by the caller.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
