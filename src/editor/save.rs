//! Assembly of the cell that is handed back on save.

use serde::{Deserialize, Serialize};

use crate::model::{Cell, CellQuery, CellType, Color, Draft, Legend, QueryConfig, TimeRange};
use crate::query::build_query;

/// Picks the colors a saved cell carries.
pub trait ColorAssigner {
    fn colors(&self, cell_type: &CellType) -> Vec<Color>;
}

/// Palettes configured by the display-options widgets, selected by cell type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPalettes {
    #[serde(default)]
    pub gauge: Vec<Color>,
    #[serde(default)]
    pub thresholds_list: Vec<Color>,
    #[serde(default)]
    pub line: Vec<Color>,
}

impl ColorAssigner for CellPalettes {
    fn colors(&self, cell_type: &CellType) -> Vec<Color> {
        match cell_type.as_str() {
            "gauge" => self.gauge.clone(),
            "single-stat" | "line-plus-single-stat" | "table" => self.thresholds_list.clone(),
            "line" | "line-stacked" | "line-stepplot" | "bar" => self.line.clone(),
            _ => Vec::new(),
        }
    }
}

/// Final text of a query: its raw text verbatim, else InfluxQL built from the
/// structured fields over the draft's range or the dashboard window.
pub fn resolve_query_text(q: &QueryConfig) -> String {
    if let Some(raw) = q.raw_text() {
        return raw.to_string();
    }
    let range = q.range.clone().unwrap_or_else(TimeRange::dashboard);
    build_query(q, &range)
}

/// Build the cell to persist from the drafts and the overlay flags.
pub fn assemble_cell(
    cell: &Cell,
    drafts: &[Draft],
    static_legend: bool,
    colors: &dyn ColorAssigner,
) -> Cell {
    let queries = drafts
        .iter()
        .map(|d| {
            let q = d.config();
            CellQuery {
                query: resolve_query_text(q),
                // Execution status is runtime state; it is not persisted.
                query_config: QueryConfig {
                    status: None,
                    ..q.clone()
                },
                source: q.source.clone(),
            }
        })
        .collect();

    Cell {
        queries,
        colors: colors.colors(&cell.kind),
        legend: if static_legend {
            Legend::static_bottom()
        } else {
            Legend::default()
        },
        ..cell.clone()
    }
}
