use serde::{Deserialize, Serialize};

use super::{QueryConfig, SourceLink};

/// A persisted dashboard visualization unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub i: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CellType,

    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub w: i32,
    #[serde(default)]
    pub h: i32,

    #[serde(default)]
    pub queries: Vec<CellQuery>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub legend: Legend,

    /// Axis settings are owned by the display-options widgets; carried as-is.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub axes: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub query_config: QueryConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLink>,
}

/// Visualization kind of a cell. Unknown kinds round-trip untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellType(pub String);

impl Default for CellType {
    fn default() -> Self {
        CellType("line".to_string())
    }
}

impl CellType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub hex: String,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}

impl Legend {
    pub fn static_bottom() -> Self {
        Self {
            kind: Some("static".to_string()),
            orientation: Some("bottom".to_string()),
        }
    }

    pub fn is_static(&self) -> bool {
        self.kind.as_deref() == Some("static")
    }
}
