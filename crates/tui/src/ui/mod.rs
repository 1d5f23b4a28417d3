pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::Frame;

use crate::app::{AppState, Screen};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Landing => screens::landing::render(frame, area, state),
        Screen::Login => screens::auth::render(frame, area, state, false),
        Screen::Register => screens::auth::render(frame, area, state, true),
        Screen::Accounts => screens::accounts::render(frame, area, state),
    }
}
