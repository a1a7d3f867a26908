//! Overlay-level key bindings.
//!
//! The machine holds no state of its own: the outcome of a key depends only
//! on the key and on what currently has focus inside the overlay.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Text inputs the overlay can focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputField {
    RawText,
    Database,
    RetentionPolicy,
    Measurement,
    Fields,
    GroupByTime,
    TimeRange,
}

impl InputField {
    pub const ALL: [InputField; 7] = [
        InputField::RawText,
        InputField::Database,
        InputField::RetentionPolicy,
        InputField::Measurement,
        InputField::Fields,
        InputField::GroupByTime,
        InputField::TimeRange,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InputField::RawText => "Raw query",
            InputField::Database => "Database",
            InputField::RetentionPolicy => "Retention policy",
            InputField::Measurement => "Measurement",
            InputField::Fields => "Fields",
            InputField::GroupByTime => "Group by time",
            InputField::TimeRange => "Time range",
        }
    }
}

/// Element that receives a key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    /// The overlay itself.
    Container,
    Input(InputField),
    Dropdown,
    Button,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEffect {
    Save,
    /// Save once the delay has elapsed.
    SaveAfter(Duration),
    Cancel,
    /// Drop focus from the target, running its commit.
    Blur,
    FocusContainer,
}

/// Enter counts as "save" only with a modifier held; terminals report the
/// platform command key inconsistently, so any of them qualifies.
pub fn has_save_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(
        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META,
    )
}

/// Effects to run, in order, for `key` delivered to `target`.
pub fn interpret(key: &KeyEvent, target: FocusTarget, save_delay: Duration) -> Vec<KeyEffect> {
    match key.code {
        KeyCode::Enter if has_save_modifier(key.modifiers) => match target {
            FocusTarget::Container => vec![KeyEffect::Save],
            // The target's blur commits its pending value; saving first
            // would persist stale data.
            _ => vec![KeyEffect::Blur, KeyEffect::SaveAfter(save_delay)],
        },
        KeyCode::Esc => match target {
            FocusTarget::Container | FocusTarget::Dropdown | FocusTarget::Button => {
                vec![KeyEffect::Cancel]
            }
            FocusTarget::Input(_) => vec![KeyEffect::Blur, KeyEffect::FocusContainer],
        },
        _ => Vec::new(),
    }
}
