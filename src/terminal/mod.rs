//! Terminal Executor
//!
//! Applies parsed actions to the framebuffer. This is the integration point
//! between the parser and the screen model; [`CompleteTerminal`] wraps it
//! together with a parser.
//!
//! Applying an action never fails. Unknown or malformed sequences are
//! logged at debug level and otherwise ignored.

mod complete;
mod csi;
mod user_input;

pub use complete::CompleteTerminal;
pub use user_input::UserInput;

use tracing::debug;

use crate::core::Framebuffer;
use crate::parser::{Action, EscAction};

/// Terminal executor that owns the framebuffer and the bytes waiting to be
/// sent back to the host
#[derive(Debug, Clone)]
pub struct Terminal {
    fb: Framebuffer,
    user_input: UserInput,
    /// Replies and forwarded keystrokes, in production order
    to_host: Vec<u8>,
    /// Last printed graphic character, for REP
    last_graphic: Option<char>,
}

impl Terminal {
    /// Create a new terminal with the given dimensions
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            fb: Framebuffer::new(cols, rows),
            user_input: UserInput::new(),
            to_host: Vec::new(),
            last_graphic: None,
        }
    }

    /// Get a reference to the framebuffer
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Take the bytes produced since the last call
    pub fn take_host_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.to_host)
    }

    /// Apply a single action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Ignore => {}
            Action::Print(c) => {
                self.fb.print_char(c);
                self.last_graphic = Some(c);
            }
            Action::Execute(code) => {
                self.execute_control(code);
            }
            Action::EscDispatch(esc) => {
                self.execute_esc(&esc);
            }
            Action::CsiDispatch(csi) => {
                self.execute_csi(&csi);
            }
            Action::OscString(payload) => {
                self.execute_osc(&payload);
            }
            Action::DcsSequence(dcs) => {
                debug!(
                    "DCS sequence ignored: final={} data_len={}",
                    dcs.final_char,
                    dcs.data.len()
                );
            }
            Action::Resize { cols, rows } => {
                self.fb.resize(cols, rows);
            }
            Action::UserByte(byte) => {
                let application_cursor = self.fb.modes.application_cursor;
                self.user_input
                    .input(byte, application_cursor, &mut self.to_host);
            }
        }

        debug_assert!(self.fb.cursor().row < self.fb.rows());
        debug_assert!(self.fb.cursor().col < self.fb.cols());
    }

    /// Execute a C0 or C1 control function
    fn execute_control(&mut self, code: u8) {
        match code {
            0x07 => {
                // BEL - Bell
                self.fb.ring_bell();
            }
            0x08 => {
                // BS - Backspace
                self.fb.backspace();
            }
            0x09 => {
                // HT - Horizontal Tab
                self.fb.tab(1);
            }
            0x0A..=0x0C => {
                // LF, VT, FF - Line Feed (VT and FF treated as LF)
                self.fb.linefeed();
            }
            0x0D => {
                // CR - Carriage Return
                self.fb.carriage_return();
            }
            0x84 => {
                // IND - Index
                self.fb.index();
            }
            0x85 => {
                // NEL - Next Line
                self.fb.next_line();
            }
            0x88 => {
                // HTS - Horizontal Tab Set
                self.fb.set_tab_stop();
            }
            0x8D => {
                // RI - Reverse Index
                self.fb.reverse_index();
            }
            0x0E | 0x0F => {
                debug!("Shift Out/In ignored: {:#04x}", code);
            }
            _ => {
                // Other controls are ignored
            }
        }
    }

    /// Execute an ESC sequence
    fn execute_esc(&mut self, esc: &EscAction) {
        match (esc.intermediates.as_slice(), esc.final_char) {
            ([], '7') => self.fb.save_cursor(),
            ([], '8') => self.fb.restore_cursor(),
            ([], 'D') => self.fb.index(),
            ([], 'E') => self.fb.next_line(),
            ([], 'H') => self.fb.set_tab_stop(),
            ([], 'M') => self.fb.reverse_index(),
            ([], 'c') => {
                // RIS - Full Reset
                self.fb.reset();
                self.user_input = UserInput::new();
                self.last_graphic = None;
            }
            ([], '=') => self.fb.modes.application_keypad = true,
            ([], '>') => self.fb.modes.application_keypad = false,
            // ST terminating a string that has already been dispatched
            ([], '\\') => {}
            (['#'], '8') => self.fb.fill_alignment_pattern(),
            ([designator], charset) if "()*+".contains(*designator) => {
                debug!("Charset designation ignored: {}{}", designator, charset);
            }
            (intermediates, final_char) => {
                debug!(
                    "Unknown ESC sequence: intermediates={:?} final={}",
                    intermediates, final_char
                );
            }
        }
    }

    /// Execute an OSC string
    fn execute_osc(&mut self, payload: &str) {
        let (command, text) = payload.split_once(';').unwrap_or((payload, ""));
        match command.parse::<u16>() {
            Ok(0) => {
                self.fb.set_icon_name(text);
                self.fb.set_title(text);
            }
            Ok(1) => self.fb.set_icon_name(text),
            Ok(2) => self.fb.set_title(text),
            _ => {
                debug!("Unhandled OSC {}: {} bytes", command, text.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, Snapshot};
    use crate::parser::Parser;

    fn run(term: &mut Terminal, bytes: &[u8]) -> Vec<u8> {
        let mut parser = Parser::new();
        for action in parser.parse(bytes) {
            term.apply(action);
        }
        term.take_host_bytes()
    }

    fn text(term: &Terminal, row: usize) -> String {
        term.framebuffer().line(row).unwrap().text()
    }

    #[test]
    fn test_terminal_print() {
        let mut term = Terminal::new(80, 24);
        run(&mut term, b"Hello, World!");

        let snapshot = Snapshot::from_framebuffer(term.framebuffer());
        assert!(snapshot.to_text().contains("Hello, World!"));
    }

    #[test]
    fn test_terminal_controls() {
        let mut term = Terminal::new(20, 5);
        run(&mut term, b"ab\x08c\r\nd\te\x07");
        assert_eq!(text(&term, 0), "ac");
        assert_eq!(text(&term, 1), "d       e");
        assert_eq!(term.framebuffer().bell_count(), 1);
    }

    #[test]
    fn test_terminal_c1_controls() {
        let mut term = Terminal::new(10, 3);
        // NEL as U+0085
        run(&mut term, "ab\u{85}cd".as_bytes());
        assert_eq!(text(&term, 0), "ab");
        assert_eq!(text(&term, 1), "cd");
    }

    #[test]
    fn test_terminal_esc_save_restore() {
        let mut term = Terminal::new(20, 5);
        run(&mut term, b"\x1b[3;4H\x1b7\x1b[H\x1b8X");
        assert_eq!(term.framebuffer().cell(2, 3).unwrap().content, "X");
    }

    #[test]
    fn test_terminal_reverse_index_scrolls() {
        let mut term = Terminal::new(10, 3);
        run(&mut term, b"top\x1b[H\x1bM");
        assert_eq!(text(&term, 0), "");
        assert_eq!(text(&term, 1), "top");
    }

    #[test]
    fn test_terminal_full_reset() {
        let mut term = Terminal::new(10, 3);
        run(&mut term, b"\x1b[31mjunk\x1b]2;t\x07\x1bc");
        let fb = term.framebuffer();
        assert_eq!(text(&term, 0), "");
        assert_eq!(fb.cursor().pen.fg, Color::Default);
        assert_eq!(fb.title(), "");
    }

    #[test]
    fn test_terminal_alignment_pattern() {
        let mut term = Terminal::new(3, 2);
        run(&mut term, b"\x1b#8");
        assert_eq!(text(&term, 0), "EEE");
        assert_eq!(text(&term, 1), "EEE");
    }

    #[test]
    fn test_terminal_title() {
        let mut term = Terminal::new(80, 24);
        assert!(!term.framebuffer().is_title_initialized());
        run(&mut term, b"\x1b]0;Both\x07");
        assert_eq!(term.framebuffer().title(), "Both");
        assert_eq!(term.framebuffer().icon_name(), "Both");
        assert!(term.framebuffer().is_title_initialized());

        run(&mut term, b"\x1b]2;Window\x1b\\\x1b]1;Icon\x07");
        assert_eq!(term.framebuffer().title(), "Window");
        assert_eq!(term.framebuffer().icon_name(), "Icon");
    }

    #[test]
    fn test_terminal_title_with_semicolons() {
        let mut term = Terminal::new(80, 24);
        run(&mut term, b"\x1b]2;a;b;c\x07");
        assert_eq!(term.framebuffer().title(), "a;b;c");
    }

    #[test]
    fn test_terminal_unknown_osc_ignored() {
        let mut term = Terminal::new(80, 24);
        run(&mut term, b"\x1b]52;c;aGVsbG8=\x07\x1b]oops\x07");
        assert_eq!(term.framebuffer(), &Framebuffer::new(80, 24));
    }

    #[test]
    fn test_terminal_resize_action() {
        let mut term = Terminal::new(80, 24);
        term.apply(Action::Resize { cols: 40, rows: 10 });
        assert_eq!(term.framebuffer().cols(), 40);
        assert_eq!(term.framebuffer().rows(), 10);
    }

    #[test]
    fn test_terminal_user_byte_forwarded() {
        let mut term = Terminal::new(80, 24);
        for b in b"ls\r" {
            term.apply(Action::UserByte(*b));
        }
        assert_eq!(term.take_host_bytes(), b"ls\r");
        assert_eq!(term.framebuffer(), &Framebuffer::new(80, 24));
    }
}
