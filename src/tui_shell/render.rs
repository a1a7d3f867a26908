use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};

use super::*;
use crate::editor::{field_value, resolve_query_text};
use crate::model::{DASHBOARD_TIME, QueryStatus};

pub(super) fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_preview(frame, app, parts[0]);
    draw_controls(frame, app, parts[1]);
    if app.editor.store().is_display_options_active() {
        draw_display_options(frame, app, parts[2]);
    } else {
        draw_query_maker(frame, app, parts[2]);
    }
    draw_help(frame, app, parts[3]);
}

fn focused(app: &App, slot: Slot) -> Style {
    if app.slot == slot {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn status_span(status: Option<&QueryStatus>) -> Span<'static> {
    match status {
        None => Span::raw(""),
        Some(QueryStatus::Loading) => Span::styled(" loading", Style::default().fg(Color::Yellow)),
        Some(QueryStatus::Success(m)) => {
            Span::styled(format!(" {}", m), Style::default().fg(Color::Green))
        }
        Some(QueryStatus::Warn(m)) => {
            Span::styled(format!(" {}", m), Style::default().fg(Color::Yellow))
        }
        Some(QueryStatus::Error(m)) => {
            Span::styled(format!(" {}", m), Style::default().fg(Color::Red))
        }
    }
}

fn draw_preview(frame: &mut Frame, app: &App, area: Rect) {
    let inputs = app.editor.inputs();
    let lower = if inputs.time_range.lower.is_empty() {
        DASHBOARD_TIME
    } else {
        inputs.time_range.lower.as_str()
    };
    let refresh = if inputs.auto_refresh.is_zero() {
        "off".to_string()
    } else {
        format!("{}s", inputs.auto_refresh.as_secs())
    };
    let title = format!(
        "{} [{}] range={} refresh={}",
        inputs.cell.name,
        inputs.cell.kind.as_str(),
        lower,
        refresh
    );

    let mut lines = Vec::new();
    for (i, d) in app.editor.store().drafts().iter().enumerate() {
        let text = resolve_query_text(d.config());
        let text = if text.is_empty() {
            "(incomplete)".to_string()
        } else {
            text
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", i + 1), Style::default().fg(Color::Cyan)),
            Span::raw(text),
            status_span(d.config().status.as_ref()),
        ]));
    }
    if app.editor.pending_resolutions() > 0 {
        lines.push(Line::from(Span::styled(
            "resolving...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_controls(frame: &mut Frame, app: &App, area: Rect) {
    let view = if app.editor.store().is_display_options_active() {
        "Visualization"
    } else {
        "Queries"
    };
    let save_style = if app.editor.is_savable() {
        focused(app, Slot::Save).fg(Color::Green)
    } else {
        focused(app, Slot::Save).fg(Color::DarkGray)
    };
    let line = Line::from(vec![
        Span::raw("source: "),
        Span::styled(app.editor.selected_source_label(), focused(app, Slot::Source)),
        Span::raw("  view: "),
        Span::styled(view, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("[Save]", save_style),
        Span::raw(" "),
        Span::styled("[Cancel]", focused(app, Slot::Cancel)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused(app, Slot::Container));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_query_maker(frame: &mut Frame, app: &App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let store = app.editor.store();
    let titles = (1..=store.len())
        .map(|i| format!("Query {}", i))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(store.active_index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, parts[0]);

    let q = store.active_draft().config();
    let mut lines = Vec::new();
    let mut cursor = None;
    for (row, field) in InputField::ALL.iter().copied().enumerate() {
        let slot = Slot::Input(field);
        let value = if app.slot == slot {
            let input = app.editor.input();
            cursor = Some((field.label().len() + 2 + input.cursor(), row));
            input.as_str().to_string()
        } else {
            field_value(q, field)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", field.label()), focused(app, slot)),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[+ Add query]", focused(app, Slot::AddQuery)),
        Span::raw(" "),
        Span::styled("[- Delete query]", focused(app, Slot::DeleteQuery)),
    ]));
    frame.render_widget(Paragraph::new(lines), parts[1]);

    if let Some((x, y)) = cursor {
        let x = parts[1].x.saturating_add(x as u16).min(parts[1].right().saturating_sub(1));
        let y = parts[1].y.saturating_add(y as u16);
        frame.set_cursor_position((x, y));
    }
}

fn draw_display_options(frame: &mut Frame, app: &App, area: Rect) {
    let on = app.editor.store().is_static_legend();
    let colors = app.editor.inputs().cell.colors.len();
    let lines = vec![
        Line::from(vec![
            Span::raw("static legend: "),
            Span::styled(if on { "[x]" } else { "[ ]" }, focused(app, Slot::Legend)),
        ]),
        Line::from(format!("colors: {}", colors)),
    ];
    let block = Block::default().borders(Borders::ALL).title("Display options");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.slot {
        Slot::Container => "Tab: focus  1-9: query  a/d: add/delete  o: view  s: save  q/Esc: cancel",
        Slot::Input(_) => "Enter: commit  Ctrl+Enter: save  Esc: blur  Tab: next",
        Slot::Source => "Up/Down: choose source  Tab: next",
        _ => "Enter: activate  Tab: next  Esc: back",
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
