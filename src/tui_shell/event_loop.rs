use super::*;

pub(super) fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.editor.tick(Instant::now(), &mut app.sink);
        app.sync_slot();

        terminal
            .draw(|f| super::render::draw(f, app))
            .context("draw")?;
        if !app.editor.is_open() {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => handle_key(app, k),
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if app.editor.handle_key(&key, Instant::now(), &mut app.sink) {
        app.sync_slot();
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.move_focus(1);
            return;
        }
        KeyCode::BackTab => {
            app.move_focus(-1);
            return;
        }
        _ => {}
    }

    match app.slot {
        Slot::Container => handle_container_key(app, key),
        Slot::Input(field) => handle_input_key(app, field, key),
        Slot::Source => match key.code {
            KeyCode::Up | KeyCode::Left => app.cycle_source(-1),
            KeyCode::Down | KeyCode::Right | KeyCode::Enter => app.cycle_source(1),
            _ => {}
        },
        slot => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                app.activate(slot);
            }
        }
    }
}

fn handle_container_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let i = c.to_digit(10).unwrap_or(1) as usize - 1;
            app.editor.set_active_query(i);
        }
        KeyCode::Left => {
            let i = app.editor.store().active_index();
            app.editor.set_active_query(i.saturating_sub(1));
        }
        KeyCode::Right => {
            let i = app.editor.store().active_index();
            app.editor.set_active_query(i + 1);
        }
        KeyCode::Char('a') => app.activate(Slot::AddQuery),
        KeyCode::Char('d') => app.activate(Slot::DeleteQuery),
        KeyCode::Char('o') => app.toggle_view(),
        KeyCode::Char('l') if app.editor.store().is_display_options_active() => {
            app.activate(Slot::Legend)
        }
        KeyCode::Char('s') => app.activate(Slot::Save),
        KeyCode::Char('q') => app.activate(Slot::Cancel),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, field: InputField, key: KeyEvent) {
    // Plain Enter commits in place.
    if key.code == KeyCode::Enter {
        app.set_slot(Slot::Input(field));
        return;
    }

    let input = app.editor.input_mut();
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        KeyCode::Char(c)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            input.insert_char(c)
        }
        _ => {}
    }
}
