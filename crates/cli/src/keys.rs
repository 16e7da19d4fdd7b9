//! Keystroke decoding.
//!
//! Terminal key events are turned into a [`Key`] once, when they are read, so
//! the session never has to guess whether a byte is text or a command.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A decoded keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// A printable character to append to the input
    Char(char),
    /// Enter, Ctrl-D, Ctrl-J or Ctrl-M: wait for the current run and print its output
    Accept,
    /// Escape: quit without output
    Abort,
    /// Ctrl-C: quit without output, exiting with a failure code
    Interrupt,
    /// Backspace, Delete or Ctrl-H
    DeleteChar,
    /// Ctrl-W
    DeleteWord,
}

impl Key {
    /// Decodes a terminal key event.
    ///
    /// Returns `None` for key releases, unbound control combinations and any
    /// non-printable character, which never make it into the input.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }

        match event.code {
            KeyCode::Enter => Some(Key::Accept),
            KeyCode::Esc => Some(Key::Abort),
            KeyCode::Backspace | KeyCode::Delete => Some(Key::DeleteChar),
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                match c.to_ascii_lowercase() {
                    'd' | 'j' | 'm' => Some(Key::Accept),
                    'c' => Some(Key::Interrupt),
                    'h' => Some(Key::DeleteChar),
                    'w' => Some(Key::DeleteWord),
                    '[' => Some(Key::Abort),
                    _ => None,
                }
            }
            KeyCode::Char(_) if event.modifiers.contains(KeyModifiers::ALT) => None,
            KeyCode::Char(c) if !c.is_control() => Some(Key::Char(c)),
            _ => None,
        }
    }
}
