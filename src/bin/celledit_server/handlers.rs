use super::*;

pub(super) async fn parse_queries(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
    Json(payload): Json<QueriesRequest>,
) -> Result<Json<QueriesResponse>, Response> {
    if !state.sources.is_empty() && !state.sources.contains(&source_id) {
        return Err(not_found());
    }
    if payload.queries.is_empty() {
        return Err(bad_request("no queries to parse"));
    }

    let queries = payload
        .queries
        .into_iter()
        .map(|q| {
            let text = substitute_templates(&q.query, &payload.temp_vars);
            let config = parse_raw_text(&source_id, &q.id, &q.query, &text);
            ParsedQuery {
                id: q.id,
                query: text,
                query_config: config,
            }
        })
        .collect();

    Ok(Json(QueriesResponse { queries }))
}

/// Structured config for `text`; the caller's raw text is always carried back
/// so a query the builder cannot represent still round-trips.
pub(super) fn parse_raw_text(source_id: &str, id: &str, raw: &str, text: &str) -> QueryConfig {
    let config = match parse_query(text) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(source = source_id, id, error = %err, "raw text not representable");
            QueryConfig::default()
        }
    };
    QueryConfig {
        raw_text: Some(raw.to_string()),
        ..config
    }
}
