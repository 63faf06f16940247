//! Local keystroke translation.
//!
//! The real terminal is put into application cursor-key mode when the
//! display opens, so arrow keys arrive as `ESC O A`..`ESC O D`. When the
//! application behind the mirror has not asked for that mode, the keys are
//! rewritten to the ANSI form `ESC [ A`..`ESC [ D` it expects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum InputState {
    #[default]
    Ground,
    Escape,
    Ss3,
}

/// Three-state translator for bytes typed by the local user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    state: InputState,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one typed byte, appending whatever is ready to `out`.
    /// An `O` following `ESC` is held back until the next byte decides
    /// its form.
    pub fn input(&mut self, byte: u8, application_cursor: bool, out: &mut Vec<u8>) {
        match self.state {
            InputState::Ground => {
                if byte == 0x1B {
                    self.state = InputState::Escape;
                }
                out.push(byte);
            }
            InputState::Escape => {
                if byte == b'O' {
                    self.state = InputState::Ss3;
                    return;
                }
                // Any other byte, ESC included, ends the sequence
                self.state = InputState::Ground;
                out.push(byte);
            }
            InputState::Ss3 => {
                self.state = InputState::Ground;
                if !application_cursor && (b'A'..=b'D').contains(&byte) {
                    out.push(b'[');
                } else {
                    out.push(b'O');
                }
                out.push(byte);
            }
        }
    }
}
