//! Event handling for the TUI
//!
//! Implements vim-style keybindings and mode switching

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use super::app::{App, Mode};

/// Handle a key event, returns true if app should quit
pub fn handle_event(app: &mut App, key: KeyEvent) -> bool {
    // Windows reports releases too
    if key.kind == KeyEventKind::Release {
        return false;
    }

    // Handle help overlay first
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return false;
    }

    match app.mode {
        Mode::Prompt => handle_prompt_mode(app, key),
        Mode::ConfirmDelete | Mode::ConfirmClear => handle_confirm_mode(app, key),
        Mode::Normal => handle_normal_mode(app, key),
    }
}

fn handle_prompt_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.cancel(),
        KeyCode::Enter => app.prompt_enter(),
        KeyCode::Tab | KeyCode::BackTab => {
            if let Some(prompt) = app.prompt.as_mut() {
                prompt.switch_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(prompt) = app.prompt.as_mut() {
                prompt.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = app.prompt.as_mut() {
                prompt.push(c);
            }
        }
        _ => {}
    }
    false
}

fn handle_confirm_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel(),
        _ => {}
    }
    false
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        // Quit
        KeyCode::Char('q') => return true,

        // Help
        KeyCode::Char('?') => {
            app.show_help = true;
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('g') | KeyCode::Home => app.jump_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.jump_to_bottom(),

        // Check off today
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),

        // Habit management
        KeyCode::Char('a') => app.open_add_prompt(),
        KeyCode::Char('e') => app.open_edit_prompt(),
        KeyCode::Char('d') => app.ask_delete(),
        KeyCode::Char('C') => app.ask_clear(),

        // Settings
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('w') => app.cycle_window(),

        // Refresh
        KeyCode::Char('r') => {
            app.reload();
            app.set_status("Reloaded from disk".to_string());
        }

        _ => {}
    }
    false
}
