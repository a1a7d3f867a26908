//! Terminal front end for the cell editor.

use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::editor::{CellEditor, CellSink, FocusTarget, InputField};
use crate::model::Cell;

mod event_loop;
mod render;

/// How the overlay was closed.
#[derive(Debug)]
pub enum Outcome {
    Saved(Box<Cell>),
    Cancelled,
}

#[derive(Default)]
struct OutcomeSink {
    outcome: Option<Outcome>,
}

impl CellSink for OutcomeSink {
    fn on_save(&mut self, cell: Cell) {
        self.outcome = Some(Outcome::Saved(Box::new(cell)));
    }

    fn on_cancel(&mut self) {
        self.outcome = Some(Outcome::Cancelled);
    }
}

/// Focusable places in the overlay, in Tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Container,
    Source,
    Input(InputField),
    AddQuery,
    DeleteQuery,
    Legend,
    Save,
    Cancel,
}

impl Slot {
    fn target(self) -> FocusTarget {
        match self {
            Slot::Container => FocusTarget::Container,
            Slot::Source => FocusTarget::Dropdown,
            Slot::Input(f) => FocusTarget::Input(f),
            Slot::AddQuery | Slot::DeleteQuery | Slot::Legend | Slot::Save | Slot::Cancel => {
                FocusTarget::Button
            }
        }
    }
}

struct App {
    editor: CellEditor,
    slot: Slot,
    sink: OutcomeSink,
}

impl App {
    fn new(editor: CellEditor) -> Self {
        Self {
            editor,
            slot: Slot::Container,
            sink: OutcomeSink::default(),
        }
    }

    fn slots(&self) -> Vec<Slot> {
        let mut out = vec![Slot::Container, Slot::Source];
        if self.editor.store().is_display_options_active() {
            out.push(Slot::Legend);
        } else {
            out.extend(InputField::ALL.iter().copied().map(Slot::Input));
            out.push(Slot::AddQuery);
            out.push(Slot::DeleteQuery);
        }
        out.push(Slot::Save);
        out.push(Slot::Cancel);
        out
    }

    fn move_focus(&mut self, delta: isize) {
        let slots = self.slots();
        let n = slots.len() as isize;
        let cur = slots.iter().position(|s| *s == self.slot).unwrap_or(0) as isize;
        let next = slots[((cur + delta).rem_euclid(n)) as usize];
        self.set_slot(next);
    }

    fn set_slot(&mut self, slot: Slot) {
        match slot {
            Slot::Container => self.editor.focus_container(),
            Slot::Input(f) => self.editor.focus_input(f),
            other => self.editor.focus_control(other.target()),
        }
        self.slot = slot;
    }

    /// Keep the slot in step with focus changes made by the key bindings.
    fn sync_slot(&mut self) {
        match self.editor.focus() {
            None | Some(FocusTarget::Container) => self.slot = Slot::Container,
            Some(_) => {}
        }
    }

    fn cycle_source(&mut self, delta: isize) {
        let sources = &self.editor.inputs().sources;
        if sources.is_empty() {
            return;
        }
        let current = self.editor.effective_source().id.clone();
        let n = sources.len() as isize;
        let cur = sources.iter().position(|s| s.id == current).unwrap_or(0) as isize;
        let next = sources[((cur + delta).rem_euclid(n)) as usize].clone();
        self.editor.set_query_source(&next);
    }

    fn activate(&mut self, slot: Slot) {
        match slot {
            Slot::AddQuery => {
                self.editor.add_query();
            }
            Slot::DeleteQuery => {
                let i = self.editor.store().active_index();
                self.editor.delete_query(i);
            }
            Slot::Legend => {
                let on = self.editor.store().is_static_legend();
                self.editor.toggle_static_legend(!on);
            }
            Slot::Save => {
                // Disabled while the cell is incomplete.
                if self.editor.is_savable() {
                    self.editor.save(&mut self.sink);
                }
            }
            Slot::Cancel => self.editor.cancel(&mut self.sink),
            Slot::Source => self.cycle_source(1),
            Slot::Container | Slot::Input(_) => {}
        }
    }

    fn toggle_view(&mut self) {
        let on = self.editor.store().is_display_options_active();
        self.editor.toggle_display_options(!on);
        self.set_slot(Slot::Container);
    }
}

/// Run the overlay in the terminal until it is saved or cancelled.
pub fn run(editor: CellEditor) -> Result<Outcome> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("the editor requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut app = App::new(editor);
    let res = event_loop::run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res?;
    let outcome = app.sink.outcome.take().unwrap_or(Outcome::Cancelled);
    app.editor.close();
    Ok(outcome)
}
