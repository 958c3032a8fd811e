//! Security keypad guarding the office door.
//!
//! Buttons are `0`-`9` and `*`. The buffer is checked once it holds as many
//! characters as the code: a match grants access for good, a miss clears it.

use serde::{Deserialize, Serialize};

use crate::constants::KEYPAD_CODE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypadFeedback {
    /// Character accepted, buffer not full yet.
    Pending,
    Granted,
    /// Wrong code; the buffer has been cleared.
    Denied,
    /// Not a keypad button, or access was already granted.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityKeypad {
    code: String,
    buffer: String,
    granted: bool,
}

impl SecurityKeypad {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            buffer: String::new(),
            granted: false,
        }
    }

    pub fn press(&mut self, button: char) -> KeypadFeedback {
        if self.granted || !(button.is_ascii_digit() || button == '*') {
            return KeypadFeedback::Ignored;
        }
        self.buffer.push(button);
        if self.buffer.chars().count() < self.code.chars().count() {
            return KeypadFeedback::Pending;
        }
        if self.buffer == self.code {
            self.granted = true;
            KeypadFeedback::Granted
        } else {
            self.buffer.clear();
            KeypadFeedback::Denied
        }
    }

    /// The `C` button.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Restore a solved keypad from saved progress.
    pub fn mark_granted(&mut self) {
        self.granted = true;
        self.buffer = self.code.clone();
    }
}

impl Default for SecurityKeypad {
    fn default() -> Self {
        Self::new(KEYPAD_CODE)
    }
}
