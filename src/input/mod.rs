use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::player::SEEK_STEP_SECS;
use crate::app::state::{AppState, Hit, Screen};
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                let ev = match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
                    Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("terminal read: {e}");
                        continue;
                    }
                };
                if tx.blocking_send(Event::Input(ev)).is_err() {
                    break;
                }
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => handle_mouse(state, m),
        InputEvent::Key(k) => {
            if state.prompt.is_some() {
                return handle_prompt(k);
            }
            handle_global(k).or_else(|| match state.screen {
                Screen::Library => handle_library_screen(k),
                Screen::Player => handle_player_screen(k),
                Screen::Help => None,
            })
        }
    }
}

fn handle_mouse(state: &AppState, m: MouseEvent) -> Option<Action> {
    match (m.kind, state.screen) {
        (MouseEventKind::Down(MouseButton::Left), Screen::Player) => {
            match state.hits.hit_test(m.column, m.row)? {
                Hit::Word(t) => Some(Action::SeekTo(t)),
                Hit::Timeline(f) => Some(Action::SeekFraction(f)),
            }
        }
        // Scrubbing only follows the timeline, never the words.
        (MouseEventKind::Drag(MouseButton::Left), Screen::Player) => {
            match state.hits.hit_test(m.column, m.row)? {
                Hit::Timeline(f) => Some(Action::SeekFraction(f)),
                Hit::Word(_) => None,
            }
        }
        (MouseEventKind::ScrollUp, Screen::Library) => Some(Action::ListUp),
        (MouseEventKind::ScrollDown, Screen::Library) => Some(Action::ListDown),
        (MouseEventKind::ScrollUp, Screen::Player) => Some(Action::SeekBy(-SEEK_STEP_SECS)),
        (MouseEventKind::ScrollDown, Screen::Player) => Some(Action::SeekBy(SEEK_STEP_SECS)),
        _ => None,
    }
}

fn handle_prompt(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc => Some(Action::PromptCancel),
        KeyCode::Enter => Some(Action::PromptSubmit),
        KeyCode::Backspace => Some(Action::PromptBackspace),
        KeyCode::Char(c) if !k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PromptChar(c)),
        _ => None,
    }
}

/// Keys that mean the same thing on every screen.
fn handle_global(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),

        KeyCode::Tab => Some(Action::NextScreen),
        KeyCode::BackTab => Some(Action::PrevScreen),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::SidebarUp),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::SidebarDown),
        KeyCode::Char('1') => Some(Action::SetScreen(Screen::Library)),
        KeyCode::Char('2') => Some(Action::SetScreen(Screen::Player)),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::SetScreen(Screen::Help)),

        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),
        KeyCode::Char(']') => Some(Action::SeekBy(SEEK_STEP_SECS)),
        KeyCode::Char('[') => Some(Action::SeekBy(-SEEK_STEP_SECS)),
        _ => None,
    }
}

fn handle_library_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Char('g') => Some(Action::GoTop),
        KeyCode::Char('G') => Some(Action::GoBottom),
        KeyCode::Enter => Some(Action::OpenSelected),
        KeyCode::Char('r') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::RefreshLibrary),
        KeyCode::F(5) => Some(Action::RefreshLibrary),

        KeyCode::Char('a') => Some(Action::AddSong),
        KeyCode::Char('e') => Some(Action::EditSelected),
        KeyCode::Char('d') => Some(Action::DownloadSelected),
        KeyCode::Char('s') => Some(Action::SearchLyricsSelected),
        KeyCode::Char('v') => Some(Action::VerifySelected),
        KeyCode::Char('p') => Some(Action::ProcessSelected),
        KeyCode::Char('x') | KeyCode::Delete => Some(Action::RemoveSelected),
        _ => None,
    }
}

fn handle_player_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('<') => Some(Action::RateDown),
        KeyCode::Char('>') => Some(Action::RateUp),
        KeyCode::Char('m') => Some(Action::CycleViewMode),
        KeyCode::Char('t') => Some(Action::ToggleTranslations),
        KeyCode::Char(',') | KeyCode::Up => Some(Action::PrevSegment),
        KeyCode::Char('.') | KeyCode::Down => Some(Action::NextSegment),
        KeyCode::Home => Some(Action::SeekTo(0.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{Prompt, PromptKind};
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn click(column: u16, row: u16) -> InputEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    fn drag(column: u16, row: u16) -> InputEvent {
        mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    #[test]
    fn test_player_keys() {
        let mut state = AppState::new();
        state.set_screen(Screen::Player);
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('>'))), Some(Action::RateUp));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('m'))), Some(Action::CycleViewMode));
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Char(']'))),
            Some(Action::SeekBy(SEEK_STEP_SECS))
        );
        // Library-only keys do nothing here.
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('d'))), None);
    }

    #[test]
    fn test_prompt_swallows_keys() {
        let mut state = AppState::new();
        state.prompt = Some(Prompt::new(PromptKind::AddUrl, ""));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('q'))), Some(Action::PromptChar('q')));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Esc)), Some(Action::PromptCancel));
    }

    #[test]
    fn test_click_on_word_seeks() {
        let mut state = AppState::new();
        state.set_screen(Screen::Player);
        state.hits.words.push((Rect::new(4, 2, 6, 1), 31.5));
        state.hits.timeline = Some(Rect::new(0, 10, 100, 1));
        assert_eq!(map_input_to_action(&state, click(5, 2)), Some(Action::SeekTo(31.5)));
        assert_eq!(map_input_to_action(&state, click(49, 10)), Some(Action::SeekFraction(0.495)));
        assert_eq!(map_input_to_action(&state, click(0, 0)), None);

        state.set_screen(Screen::Library);
        assert_eq!(map_input_to_action(&state, click(5, 2)), None);
    }

    #[test]
    fn test_drag_scrubs_timeline() {
        let mut state = AppState::new();
        state.set_screen(Screen::Player);
        state.hits.words.push((Rect::new(4, 2, 6, 1), 31.5));
        state.hits.timeline = Some(Rect::new(0, 10, 100, 1));

        assert_eq!(map_input_to_action(&state, drag(70, 10)), Some(Action::SeekFraction(0.705)));
        assert_eq!(map_input_to_action(&state, drag(20, 10)), Some(Action::SeekFraction(0.205)));
        // Dragging across words or empty space does not seek.
        assert_eq!(map_input_to_action(&state, drag(5, 2)), None);
        assert_eq!(map_input_to_action(&state, drag(70, 4)), None);

        state.set_screen(Screen::Library);
        assert_eq!(map_input_to_action(&state, drag(70, 10)), None);
    }
}
