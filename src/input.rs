use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::session::Input;
use crate::ui;

/// Routes one terminal event. Returns `Ok(false)` when the user quits.
pub fn handle_event(app: &mut App, event: Event) -> Result<bool> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => {
            handle_mouse(app, mouse);
            Ok(true)
        }
        Event::Resize(cols, rows) => {
            app.on_resize(cols, rows);
            Ok(true)
        }
        _ => Ok(true),
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(false),
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Left | KeyCode::Char('-') => app.nudge_width(-1),
        KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => app.nudge_width(1),
        KeyCode::Char('a') => {
            app.dispatch(Input::SelectAll);
        }
        KeyCode::Char('d') => {
            app.dispatch(Input::DeselectAll);
        }
        KeyCode::Char('n') | KeyCode::Enter => {
            app.dispatch(Input::Next);
        }
        KeyCode::Char('p') => app.open_preview(),
        KeyCode::Char('r') => app.start_load(),
        KeyCode::Char('c') => app.copy_completion(),
        // keyboard stand-in for the pointer
        KeyCode::Char('h') => app.move_cursor(-1, 0),
        KeyCode::Char('l') => app.move_cursor(1, 0),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(0, -1),
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(0, 1),
        KeyCode::Char(' ') => {
            if let Some(id) = app.cursor_frame() {
                app.dispatch(Input::FrameClick(id));
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = app.cursor_frame() {
                app.dispatch(Input::FrameContextClick(id));
            }
        }
        _ => {}
    }
    Ok(true)
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(id) = app.frame_at(col, row) {
                app.dispatch(Input::FrameClick(id));
            } else {
                drag_slider(app, col, row);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => drag_slider(app, col, row),
        MouseEventKind::Down(MouseButton::Right) => {
            if let Some(id) = app.frame_at(col, row) {
                app.dispatch(Input::FrameContextClick(id));
            }
        }
        MouseEventKind::Moved => {
            if let Some(id) = app.frame_at(col, row) {
                app.cursor = None;
                app.dispatch(Input::FrameHover(id));
            }
        }
        MouseEventKind::ScrollUp => app.nudge_width(1),
        MouseEventKind::ScrollDown => app.nudge_width(-1),
        _ => {}
    }
}

fn drag_slider(app: &mut App, col: u16, row: u16) {
    let slider = ui::screen_layout(app.screen).slider;
    if row < slider.y || row >= slider.bottom() {
        return;
    }
    if let Some(value) = ui::slider_value_at(slider, col) {
        app.set_slider(value);
    }
}
