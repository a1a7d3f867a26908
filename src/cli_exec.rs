use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use celledit::config::{EditorConfig, Session};
use celledit::editor::{CellEditor, CellSink, is_query_savable, resolve_query_text};
use celledit::model::{Cell, QueryStatus};
use celledit::remote::HttpParseService;
use celledit::tui_shell::Outcome;

use crate::SessionArgs;

/// Exit status when the editor was cancelled.
const EXIT_CANCELLED: i32 = 2;

fn open_editor(args: &SessionArgs) -> Result<(EditorConfig, CellEditor)> {
    let mut cfg = EditorConfig::load_or_default(args.config.as_deref())?;
    if let Some(url) = &args.parser_url {
        cfg.parser_url = Some(url.clone());
    }
    let session = Session::load(&args.session)?;
    let inputs = session.into_inputs(&cfg)?;
    let service = HttpParseService::new(cfg.parser_url.clone()).context("create parse client")?;
    let editor = CellEditor::open(inputs, Arc::new(service), cfg.save_delay());
    Ok((cfg, editor))
}

pub(crate) fn handle_edit(
    args: &SessionArgs,
    out: Option<PathBuf>,
    log_file: Option<PathBuf>,
) -> Result<i32> {
    let (cfg, editor) = open_editor(args)?;
    let log_path = log_file
        .or(cfg.log_file.clone())
        .unwrap_or_else(celledit::logging::default_log_path);
    celledit::logging::init(Some(&log_path))?;

    match celledit::tui_shell::run(editor)? {
        Outcome::Saved(cell) => {
            let json = serde_json::to_string_pretty(&cell).context("serialize cell json")?;
            match out {
                Some(path) => fs::write(&path, json + "\n")
                    .with_context(|| format!("write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(0)
        }
        Outcome::Cancelled => {
            eprintln!("Cancelled");
            Ok(EXIT_CANCELLED)
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryReport {
    index: usize,
    id: String,
    source: Option<String>,
    query: String,
    savable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<QueryStatus>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    savable: bool,
    source: String,
    queries: Vec<QueryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cell: Option<Cell>,
}

#[derive(Default)]
struct Captured(Option<Cell>);

impl CellSink for Captured {
    fn on_save(&mut self, cell: Cell) {
        self.0 = Some(cell);
    }

    fn on_cancel(&mut self) {}
}

pub(crate) fn handle_check(
    args: &SessionArgs,
    resolve: bool,
    timeout_secs: u64,
    json: bool,
) -> Result<i32> {
    celledit::logging::init(None)?;
    let (_cfg, mut editor) = open_editor(args)?;

    if resolve {
        let raw = editor
            .store()
            .drafts()
            .iter()
            .filter_map(|d| d.config().raw_text().map(|t| (d.id().clone(), t.to_string())))
            .collect::<Vec<_>>();
        for (id, text) in raw {
            editor.submit_raw_text(&id, &text);
        }
        editor.wait_for_resolutions(Duration::from_secs(timeout_secs));
    }

    let queries = editor
        .store()
        .drafts()
        .iter()
        .enumerate()
        .map(|(index, d)| QueryReport {
            index,
            id: d.id().to_string(),
            source: d.config().source.as_ref().map(|s| s.as_str().to_string()),
            query: resolve_query_text(d.config()),
            savable: is_query_savable(d.config()),
            status: d.config().status.clone(),
        })
        .collect::<Vec<_>>();
    let source = editor.selected_source_label();

    let mut captured = Captured::default();
    let savable = editor.save(&mut captured);
    let report = CheckReport {
        savable,
        source,
        queries,
        cell: captured.0,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize check json")?
        );
    } else {
        println!("source: {}", report.source);
        for q in &report.queries {
            let mark = if q.savable { "ok" } else { "incomplete" };
            let text = if q.query.is_empty() { "-" } else { q.query.as_str() };
            println!("{} [{}] {}", q.index + 1, mark, text);
        }
        println!("savable: {}", report.savable);
    }

    Ok(if report.savable { 0 } else { 1 })
}
