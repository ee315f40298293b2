//! Key bindings for the song list
//!
//! Maps crossterm key events to [`Command`]s. A lone `g` is held as a pending
//! prefix: `gg` jumps to the first page, while `g` followed by anything else
//! resolves that key on its own.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    PlaySelected,
    TogglePause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    RowDown,
    RowUp,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    InsertNext,
    FocusSearch,
    ShowHelp,
    ShowQueue,
    /// Clear search results, or quit when not searching
    Back,
    Quit,
}

#[derive(Debug, Default)]
pub struct KeyMap {
    pending_g: bool,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_pending(&mut self) {
        self.pending_g = false;
    }

    /// Resolve a key press. Returns `None` for unbound keys and for a `g`
    /// that starts a sequence.
    pub fn resolve(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.pending_g = false;
            return match key.code {
                KeyCode::Char('c') => Some(Command::Quit),
                _ => None,
            };
        }

        let KeyCode::Char(c) = key.code else {
            self.pending_g = false;
            return Self::special_key(key.code);
        };

        if std::mem::take(&mut self.pending_g) {
            if c == 'g' {
                return Some(Command::FirstPage);
            }
            return Self::char_key(c);
        }

        if c == 'g' {
            self.pending_g = true;
            return None;
        }
        Self::char_key(c)
    }

    fn special_key(code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Enter => Some(Command::PlaySelected),
            KeyCode::Right => Some(Command::Next),
            KeyCode::Left => Some(Command::Previous),
            KeyCode::Down => Some(Command::RowDown),
            KeyCode::Up => Some(Command::RowUp),
            KeyCode::PageDown => Some(Command::NextPage),
            KeyCode::PageUp => Some(Command::PrevPage),
            KeyCode::Home => Some(Command::FirstPage),
            KeyCode::End => Some(Command::LastPage),
            KeyCode::Esc => Some(Command::Back),
            _ => None,
        }
    }

    fn char_key(c: char) -> Option<Command> {
        match c {
            ' ' => Some(Command::TogglePause),
            'n' | 'N' | 'l' => Some(Command::Next),
            'p' | 'P' | 'h' => Some(Command::Previous),
            '+' | '=' => Some(Command::VolumeUp),
            '-' | '_' => Some(Command::VolumeDown),
            'j' => Some(Command::RowDown),
            'k' => Some(Command::RowUp),
            'J' | ']' | '>' => Some(Command::NextPage),
            'K' | '[' | '<' => Some(Command::PrevPage),
            'G' => Some(Command::LastPage),
            'a' => Some(Command::InsertNext),
            '/' => Some(Command::FocusSearch),
            '?' => Some(Command::ShowHelp),
            'q' | 'Q' => Some(Command::ShowQueue),
            _ => None,
        }
    }
}
