use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor used for the text filters. The cursor counts chars, not bytes.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    original: String,
    cursor: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub cursor: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.move_to(self.cursor.saturating_sub(1)),
            (KeyCode::Right, _) => self.move_to(self.cursor + 1),
            (KeyCode::Home, _) => self.move_to(0),
            (KeyCode::End, _) => self.move_to(usize::MAX),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.set_text(""),
            (kc, km) => self.key(kc, km),
        }
    }

    /// Starts a new edit with `s` as the initial text, cursor at the end.
    pub fn start(&mut self, s: &str) {
        self.original = s.to_string();
        self.current_input = s.to_string();
        self.cursor = s.chars().count();
        self.finished = false;
        self.canceled = false;
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            cursor: self.cursor,
        }
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    // Reverts to the text the edit started with.
    fn escape(&mut self) -> InputResult {
        self.current_input = self.original.clone();
        self.cursor = self.current_input.chars().count();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.cursor > 0 {
            self.cursor -= 1;
            let pos = self.byte_pos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.cursor < self.current_input.chars().count() {
            let pos = self.byte_pos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn move_to(&mut self, pos: usize) -> InputResult {
        self.cursor = std::cmp::min(pos, self.current_input.chars().count());
        self.get()
    }

    fn set_text(&mut self, s: &str) -> InputResult {
        self.current_input = s.to_string();
        self.cursor = s.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            trace!("Ignoring {code:?} with {modifier:?}");
        } else if let Some(chr) = code.as_char() {
            let pos = self.byte_pos();
            self.current_input.insert(pos, chr);
            self.cursor += 1;
        }
        self.get()
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.cursor)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn edits_at_cursor_with_multibyte_chars() {
        let mut input = Inputter::default();
        input.start("Séoul");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Backspace);
        let res = press(&mut input, KeyCode::Char('U'));
        assert_eq!(res.input, "SéoUl");
        assert_eq!(res.cursor, 4);
        press(&mut input, KeyCode::Home);
        let res = press(&mut input, KeyCode::Delete);
        assert_eq!(res.input, "éoUl");
        assert!(!res.finished);
    }

    #[test]
    fn escape_restores_original_text() {
        let mut input = Inputter::default();
        input.start("fr");
        press(&mut input, KeyCode::Char('a'));
        let res = press(&mut input, KeyCode::Esc);
        assert!(res.canceled && res.finished);
        assert_eq!(res.input, "fr");
    }

    #[test]
    fn enter_finishes_without_cancel() {
        let mut input = Inputter::default();
        input.start("");
        press(&mut input, KeyCode::Char('x'));
        let res = press(&mut input, KeyCode::Enter);
        assert!(res.finished && !res.canceled);
        assert_eq!(res.input, "x");
    }
}
