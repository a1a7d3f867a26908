//! Request and response bodies of the parse endpoint.

use crate::model::{QueryConfig, Template};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawQuery {
    pub query: String,
    pub id: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueriesRequest {
    pub queries: Vec<RawQuery>,
    #[serde(default)]
    pub temp_vars: Vec<Template>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub id: String,
    #[serde(default)]
    pub query: String,
    pub query_config: QueryConfig,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct QueriesResponse {
    pub queries: Vec<ParsedQuery>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ServiceError {
    pub message: String,
}
