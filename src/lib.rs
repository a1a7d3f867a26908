pub mod config;
pub mod editor;
pub mod logging;
pub mod model;
pub mod query;
pub mod remote;
pub mod tui_shell;
