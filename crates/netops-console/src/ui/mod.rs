pub(crate) mod app;
mod form;
mod format;
mod health;
mod input;
mod render;
mod text;
pub(crate) mod theme;

pub(crate) use app::AppState;
pub(crate) use input::handle_key_event;
pub(crate) use render::{draw_ui, timeline_text};
