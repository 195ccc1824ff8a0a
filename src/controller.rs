use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use tablescout::ScoutError;

use crate::domain::{AppConfig, Message};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, ScoutError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, model.raw_keyevents()));
        }
        Ok(None)
    }

    /// Maps a key press to a message. While a text filter is edited every key
    /// is forwarded raw, except Ctrl-C.
    pub fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => Some(Message::NextPage),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => Some(Message::PrevPage),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char(' ') | KeyCode::Char('f') => Some(Message::ToggleFavorite),
            KeyCode::Char(c @ '1'..='9') => c
                .to_digit(10)
                .map(|d| Message::EditFilter(d as usize - 1)),
            KeyCode::Char('F') => Some(Message::CycleFormation),
            KeyCode::Char('C') => Some(Message::CycleCategory),
            KeyCode::Char('x') => Some(Message::ClearFilters),
            KeyCode::Char('y') => Some(Message::CopyRow),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
