//! A parser and a terminal executor bundled together.

use tracing::{debug, trace};

use super::Terminal;
use crate::core::Framebuffer;
use crate::parser::{Action, Parser};

/// Complete terminal: host bytes in, framebuffer and reply bytes out
#[derive(Debug, Clone)]
pub struct CompleteTerminal {
    parser: Parser,
    terminal: Terminal,
    /// Scratch buffer reused between bytes
    actions: Vec<Action>,
}

impl CompleteTerminal {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            parser: Parser::new(),
            terminal: Terminal::new(cols, rows),
            actions: Vec::new(),
        }
    }

    /// Apply a buffer of host bytes in order, returning the bytes the
    /// terminal must send back to the host.
    pub fn act(&mut self, bytes: &[u8]) -> Vec<u8> {
        for &byte in bytes {
            self.parser.feed(byte, &mut self.actions);
            for action in self.actions.drain(..) {
                self.terminal.apply(action);
            }
        }
        trace!("applied {} host bytes", bytes.len());
        self.terminal.take_host_bytes()
    }

    /// Apply a single host byte
    pub fn act_byte(&mut self, byte: u8) -> Vec<u8> {
        self.act(&[byte])
    }

    /// Translate one locally typed byte, returning what to forward to the
    /// host. The framebuffer is not touched.
    pub fn act_user_byte(&mut self, byte: u8) -> Vec<u8> {
        self.apply(Action::UserByte(byte))
    }

    /// Translate a buffer of locally typed bytes
    pub fn act_user_bytes(&mut self, bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(bytes.len());
        for &byte in bytes {
            out.extend(self.act_user_byte(byte));
        }
        out
    }

    /// Change the window size
    pub fn resize(&mut self, cols: usize, rows: usize) {
        debug!("resize to {}x{}", cols, rows);
        self.apply(Action::Resize { cols, rows });
    }

    /// Apply an already decoded action
    pub fn apply(&mut self, action: Action) -> Vec<u8> {
        self.terminal.apply(action);
        self.terminal.take_host_bytes()
    }

    /// The current screen state
    pub fn framebuffer(&self) -> &Framebuffer {
        self.terminal.framebuffer()
    }

    /// True when the parser is between sequences
    pub fn is_parser_ground(&self) -> bool {
        self.parser.is_ground()
    }

    /// Compare screens with another terminal. Returns `true` when the two
    /// match, the same sense as `==`; rows and cursors that differ are
    /// logged at debug level. Useful when checking that a rendered frame
    /// was reproduced.
    pub fn compare(&self, other: &CompleteTerminal) -> bool {
        let (a, b) = (self.framebuffer(), other.framebuffer());
        if a == b {
            return true;
        }

        if a.cols() != b.cols() || a.rows() != b.rows() {
            debug!(
                "size differs: {}x{} vs {}x{}",
                a.cols(),
                a.rows(),
                b.cols(),
                b.rows()
            );
            return false;
        }

        for (row, (left, right)) in a.lines().iter().zip(b.lines()).enumerate() {
            if left != right {
                debug!("row {} differs: {:?} vs {:?}", row, left.text(), right.text());
            }
        }
        let (ca, cb) = (a.cursor(), b.cursor());
        if (ca.row, ca.col) != (cb.row, cb.col) {
            debug!(
                "cursor differs: ({}, {}) vs ({}, {})",
                ca.row, ca.col, cb.row, cb.col
            );
        }
        false
    }
}
