use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SourceLink;

/// Time window that the dashboard substitutes for a relative range.
pub const DASHBOARD_TIME: &str = ":dashboardTime:";

/// Structured form of one query, as exchanged with the parse service and
/// persisted inside a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub retention_policy: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_true")]
    pub are_tags_accepted: bool,
    #[serde(default)]
    pub group_by: GroupBy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QueryStatus>,
}

fn default_true() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            measurement: String::new(),
            retention_policy: String::new(),
            fields: Vec::new(),
            tags: BTreeMap::new(),
            are_tags_accepted: true,
            group_by: GroupBy::default(),
            fill: None,
            raw_text: None,
            range: None,
            source: None,
            status: None,
        }
    }
}

impl QueryConfig {
    /// Raw text that is set and non-empty. Whitespace counts as text.
    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Aggregate/selector applied to the field, e.g. `mean`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
}

impl Field {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            alias: None,
            func: None,
        }
    }

    pub fn with_func(value: &str, func: &str) -> Self {
        Self {
            value: value.to_string(),
            alias: None,
            func: Some(func.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub lower: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<String>,
}

impl TimeRange {
    pub fn relative(lower: &str) -> Self {
        Self {
            lower: lower.to_string(),
            upper: None,
        }
    }

    /// The dashboard-wide window used when a draft has no range of its own.
    pub fn dashboard() -> Self {
        Self::relative(DASHBOARD_TIME)
    }
}

/// Last execution status reported for a query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Loading,
    Success(String),
    Warn(String),
    Error(String),
}
