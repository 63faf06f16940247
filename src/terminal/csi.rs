//! CSI dispatch: cursor motion, editing, modes, SGR and device replies.

use std::io::Write;

use tracing::debug;

use super::Terminal;
use crate::core::{Color, MouseEncoding, MouseMode, Rendition};
use crate::parser::CsiAction;

impl Terminal {
    /// Execute a CSI sequence
    pub(super) fn execute_csi(&mut self, csi: &CsiAction) {
        match (csi.private_marker, csi.intermediates.as_slice()) {
            (None, []) => self.execute_csi_standard(csi),
            (Some('?'), []) => self.execute_csi_private(csi),
            (Some('>'), []) if csi.final_char == 'c' => {
                // DA2 - Secondary Device Attributes
                if csi.param(0, 0) == 0 {
                    self.reply(format_args!("\x1b[>1;10;0c"));
                }
            }
            (None, ['!']) if csi.final_char == 'p' => {
                // DECSTR - Soft Terminal Reset
                self.fb.soft_reset();
            }
            _ => {
                debug!(
                    "Unknown CSI sequence: marker={:?} intermediates={:?} final={} params={:?}",
                    csi.private_marker, csi.intermediates, csi.final_char, csi.params
                );
            }
        }
    }

    fn execute_csi_standard(&mut self, csi: &CsiAction) {
        let n = csi.param_or_default(0, 1) as usize;

        match csi.final_char {
            '@' => {
                // ICH - Insert Characters
                self.fb.insert_chars(n);
            }
            'A' => {
                // CUU - Cursor Up
                self.fb.move_cursor_up(n);
            }
            'B' => {
                // CUD - Cursor Down
                self.fb.move_cursor_down(n);
            }
            'C' | 'a' => {
                // CUF - Cursor Forward, HPR
                self.fb.move_cursor_forward(n);
            }
            'D' => {
                // CUB - Cursor Backward
                self.fb.move_cursor_backward(n);
            }
            'E' => {
                // CNL - Cursor Next Line
                self.fb.move_cursor_down(n);
                self.fb.carriage_return();
            }
            'F' => {
                // CPL - Cursor Previous Line
                self.fb.move_cursor_up(n);
                self.fb.carriage_return();
            }
            'G' | '`' => {
                // CHA - Cursor Horizontal Absolute, HPA
                self.fb.move_cursor_to_col(n - 1);
            }
            'H' | 'f' => {
                // CUP - Cursor Position, HVP
                let row = csi.param_or_default(0, 1) as usize - 1;
                let col = csi.param_or_default(1, 1) as usize - 1;
                self.fb.move_cursor_to(row, col);
            }
            'I' => {
                // CHT - Cursor Horizontal Tab
                self.fb.tab(n);
            }
            'J' => {
                // ED - Erase in Display
                self.fb.erase_in_display(csi.param(0, 0));
            }
            'K' => {
                // EL - Erase in Line
                self.fb.erase_in_line(csi.param(0, 0));
            }
            'L' => {
                // IL - Insert Lines
                self.fb.insert_lines(n);
            }
            'M' => {
                // DL - Delete Lines
                self.fb.delete_lines(n);
            }
            'P' => {
                // DCH - Delete Characters
                self.fb.delete_chars(n);
            }
            'S' => {
                // SU - Scroll Up
                self.fb.scroll_up(n);
            }
            'T' => {
                // SD - Scroll Down
                self.fb.scroll_down(n);
            }
            'X' => {
                // ECH - Erase Characters
                self.fb.erase_chars(n);
            }
            'Z' => {
                // CBT - Cursor Backward Tab
                self.fb.back_tab(n);
            }
            'b' => {
                // REP - Repeat preceding graphic character
                if let Some(c) = self.last_graphic {
                    let limit = self.fb.cols() * self.fb.rows();
                    for _ in 0..n.min(limit) {
                        self.fb.print_char(c);
                    }
                }
            }
            'c' => {
                // DA1 - Primary Device Attributes
                if csi.param(0, 0) == 0 {
                    self.reply(format_args!("\x1b[?62c"));
                }
            }
            'd' => {
                // VPA - Vertical Position Absolute
                self.fb.move_cursor_to_row(n - 1);
            }
            'e' => {
                // VPR - Vertical Position Relative
                self.fb.move_cursor_down(n);
            }
            'g' => {
                // TBC - Tab Clear
                match csi.param(0, 0) {
                    0 => self.fb.clear_tab_stop(),
                    3 => self.fb.clear_all_tab_stops(),
                    other => debug!("Unknown TBC mode: {}", other),
                }
            }
            'h' => {
                // SM - Set Mode
                for &mode in &csi.params {
                    self.set_mode(mode, true);
                }
            }
            'l' => {
                // RM - Reset Mode
                for &mode in &csi.params {
                    self.set_mode(mode, false);
                }
            }
            'm' => {
                // SGR - Select Graphic Rendition
                self.execute_sgr(&csi.params);
            }
            'n' => {
                // DSR - Device Status Report
                self.device_status_report(csi.param(0, 0));
            }
            'r' => {
                // DECSTBM - Set Top and Bottom Margins
                let rows = self.fb.rows();
                let top = csi.param_or_default(0, 1) as usize;
                let bottom = (csi.param_or_default(1, rows as u16) as usize).min(rows);
                self.fb.set_scroll_region(top - 1, bottom - 1);
            }
            's' => {
                // SCOSC - Save Cursor
                self.fb.save_cursor();
            }
            'u' => {
                // SCORC - Restore Cursor
                self.fb.restore_cursor();
            }
            't' => {
                // Window manipulation, only the size report is answered
                match csi.param(0, 0) {
                    18 => {
                        let (rows, cols) = (self.fb.rows(), self.fb.cols());
                        self.reply(format_args!("\x1b[8;{};{}t", rows, cols));
                    }
                    other => debug!("Window operation ignored: {}", other),
                }
            }
            _ => {
                debug!(
                    "Unknown CSI sequence: final={} params={:?}",
                    csi.final_char, csi.params
                );
            }
        }
    }

    fn execute_csi_private(&mut self, csi: &CsiAction) {
        match csi.final_char {
            'h' => {
                for &mode in &csi.params {
                    self.set_dec_mode(mode, true);
                }
            }
            'l' => {
                for &mode in &csi.params {
                    self.set_dec_mode(mode, false);
                }
            }
            _ => {
                debug!(
                    "Unknown private CSI sequence: final={} params={:?}",
                    csi.final_char, csi.params
                );
            }
        }
    }

    /// Set or reset a DEC private mode
    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            1 => {
                // DECCKM - Application Cursor Keys
                self.fb.modes.application_cursor = enable;
            }
            5 => {
                // DECSCNM - Reverse Video
                self.fb.modes.reverse_video = enable;
            }
            6 => {
                // DECOM - Origin Mode
                self.fb.cursor_mut().origin_mode = enable;
                self.fb.move_cursor_to(0, 0);
            }
            7 => {
                // DECAWM - Auto-wrap Mode
                let cursor = self.fb.cursor_mut();
                cursor.autowrap = enable;
                if !enable {
                    cursor.pending_wrap = false;
                }
            }
            25 => {
                // DECTCEM - Text Cursor Enable Mode
                self.fb.cursor_mut().visible = enable;
            }
            47 | 1047 => {
                if enable {
                    self.fb.enter_alternate_screen();
                } else {
                    self.fb.exit_alternate_screen();
                }
            }
            1048 => {
                if enable {
                    self.fb.save_cursor();
                } else {
                    self.fb.restore_cursor();
                }
            }
            1049 => {
                if enable {
                    self.fb.save_cursor();
                    self.fb.enter_alternate_screen();
                    self.fb.erase_in_display(2);
                } else {
                    self.fb.exit_alternate_screen();
                    self.fb.restore_cursor();
                }
            }
            1000 => self.set_mouse_mode(MouseMode::Normal, enable),
            1002 => self.set_mouse_mode(MouseMode::ButtonEvent, enable),
            1003 => self.set_mouse_mode(MouseMode::AnyEvent, enable),
            1005 => self.set_mouse_encoding(MouseEncoding::Utf8, enable),
            1006 => self.set_mouse_encoding(MouseEncoding::Sgr, enable),
            1015 => self.set_mouse_encoding(MouseEncoding::Urxvt, enable),
            2004 => {
                // Bracketed Paste Mode
                self.fb.modes.bracketed_paste = enable;
            }
            _ => {
                debug!("Unknown DEC private mode: {} = {}", mode, enable);
            }
        }
    }

    fn set_mouse_mode(&mut self, mode: MouseMode, enable: bool) {
        self.fb.modes.mouse_tracking = if enable { mode } else { MouseMode::None };
    }

    fn set_mouse_encoding(&mut self, encoding: MouseEncoding, enable: bool) {
        let modes = &mut self.fb.modes;
        if enable {
            modes.mouse_encoding = encoding;
        } else if modes.mouse_encoding == encoding {
            modes.mouse_encoding = MouseEncoding::X10;
        }
    }

    /// Set or reset an ANSI mode
    fn set_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            4 => {
                // IRM - Insert/Replace Mode
                self.fb.cursor_mut().insert_mode = enable;
            }
            20 => {
                // LNM - Line Feed/New Line Mode
                self.fb.modes.linefeed_mode = enable;
            }
            _ => {
                debug!("Unknown ANSI mode: {} = {}", mode, enable);
            }
        }
    }

    fn device_status_report(&mut self, request: u16) {
        match request {
            5 => self.reply(format_args!("\x1b[0n")),
            6 => {
                let cursor = self.fb.cursor();
                let row = if cursor.origin_mode {
                    cursor.row.saturating_sub(self.fb.scroll_top())
                } else {
                    cursor.row
                };
                let col = cursor.col;
                self.reply(format_args!("\x1b[{};{}R", row + 1, col + 1));
            }
            other => debug!("Unknown DSR request: {}", other),
        }
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, params: &[u16]) {
        let pen = &mut self.fb.cursor_mut().pen;

        if params.is_empty() {
            *pen = Rendition::default();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => *pen = Rendition::default(),
                1 => pen.style.bold = true,
                2 => pen.style.faint = true,
                3 => pen.style.italic = true,
                4 | 21 => pen.style.underline = true,
                5 | 6 => pen.style.blink = true,
                7 => pen.style.inverse = true,
                8 => pen.style.hidden = true,
                9 => pen.style.strikethrough = true,
                22 => {
                    pen.style.bold = false;
                    pen.style.faint = false;
                }
                23 => pen.style.italic = false,
                24 => pen.style.underline = false,
                25 => pen.style.blink = false,
                27 => pen.style.inverse = false,
                28 => pen.style.hidden = false,
                29 => pen.style.strikethrough = false,
                n @ 30..=37 => pen.fg = Color::Indexed((n - 30) as u8),
                38 => {
                    let (color, used) = extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        pen.fg = color;
                    }
                    i += used;
                }
                39 => pen.fg = Color::Default,
                n @ 40..=47 => pen.bg = Color::Indexed((n - 40) as u8),
                48 => {
                    let (color, used) = extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        pen.bg = color;
                    }
                    i += used;
                }
                49 => pen.bg = Color::Default,
                n @ 90..=97 => pen.fg = Color::Indexed((n - 90 + 8) as u8),
                n @ 100..=107 => pen.bg = Color::Indexed((n - 100 + 8) as u8),
                n => debug!("Unknown SGR parameter: {}", n),
            }
            i += 1;
        }
    }

    fn reply(&mut self, args: std::fmt::Arguments<'_>) {
        // Writing into a Vec cannot fail
        let _ = self.to_host.write_fmt(args);
    }
}

/// Parse the tail of an SGR 38/48 parameter list. Returns the color, if
/// well formed, and how many parameters were consumed.
fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest.first() {
        Some(5) => match rest.get(1) {
            Some(&n) => (u8::try_from(n).ok().map(Color::Indexed), 2),
            None => (None, 1),
        },
        Some(2) => {
            if rest.len() < 4 {
                return (None, rest.len());
            }
            let channel = |v: u16| v.min(255) as u8;
            (
                Some(Color::Rgb(channel(rest[1]), channel(rest[2]), channel(rest[3]))),
                4,
            )
        }
        Some(_) => (None, 1),
        None => (None, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Style;
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

    fn cursor(term: &Terminal) -> (usize, usize) {
        let c = term.framebuffer().cursor();
        (c.row, c.col)
    }

    #[test]
    fn test_terminal_cursor_movement() {
        let mut term = Terminal::new(80, 24);

        run(&mut term, b"\x1b[10;20H");
        assert_eq!(cursor(&term), (9, 19));

        run(&mut term, b"\x1b[5A");
        assert_eq!(cursor(&term), (4, 19));

        run(&mut term, b"\x1b[3B\x1b[10C\x1b[4D");
        assert_eq!(cursor(&term), (7, 25));

        run(&mut term, b"\x1b[2E");
        assert_eq!(cursor(&term), (9, 0));

        run(&mut term, b"\x1b[F\x1b[7G");
        assert_eq!(cursor(&term), (8, 6));

        run(&mut term, b"\x1b[3d\x1b[2e\x1b[3a");
        assert_eq!(cursor(&term), (4, 9));

        run(&mut term, b"\x1b[0;0f");
        assert_eq!(cursor(&term), (0, 0));
    }

    #[test]
    fn test_terminal_cursor_clamped() {
        let mut term = Terminal::new(10, 5);
        run(&mut term, b"\x1b[99;99H");
        assert_eq!(cursor(&term), (4, 9));
        run(&mut term, b"\x1b[99A\x1b[99D");
        assert_eq!(cursor(&term), (0, 0));
    }

    #[test]
    fn test_terminal_erase() {
        let mut term = Terminal::new(10, 3);
        run(&mut term, b"0123456789\r\nabcdefghij\r\nABCDEFGHIJ");

        run(&mut term, b"\x1b[2;5H\x1b[K");
        assert_eq!(text(&term, 1), "abcd");

        run(&mut term, b"\x1b[1;3H\x1b[1K");
        assert_eq!(text(&term, 0), "   3456789");

        run(&mut term, b"\x1b[3;2H\x1b[3X");
        assert_eq!(text(&term, 2), "A   EFGHIJ");

        run(&mut term, b"\x1b[2J");
        for row in 0..3 {
            assert_eq!(text(&term, row), "");
        }
    }

    #[test]
    fn test_terminal_erase_uses_background() {
        let mut term = Terminal::new(10, 2);
        run(&mut term, b"\x1b[44m\x1b[2J");
        let cell = term.framebuffer().cell(1, 9).unwrap();
        assert_eq!(cell.rendition.bg, Color::BLUE);
    }

    #[test]
    fn test_terminal_insert_delete() {
        let mut term = Terminal::new(10, 4);
        run(&mut term, b"abcdef\x1b[1;3H\x1b[2@");
        assert_eq!(text(&term, 0), "ab  cdef");

        run(&mut term, b"\x1b[3P");
        assert_eq!(text(&term, 0), "abdef");

        run(&mut term, b"\x1b[2;1Hline2\r\nline3\x1b[2;1H\x1b[L");
        assert_eq!(text(&term, 1), "");
        assert_eq!(text(&term, 2), "line2");

        run(&mut term, b"\x1b[2M");
        assert_eq!(text(&term, 1), "line3");
    }

    #[test]
    fn test_terminal_scroll_region() {
        let mut term = Terminal::new(10, 5);
        run(&mut term, b"1\r\n2\r\n3\r\n4\r\n5");

        run(&mut term, b"\x1b[2;4r");
        assert_eq!(term.framebuffer().scroll_top(), 1);
        assert_eq!(term.framebuffer().scroll_bottom(), 3);
        assert_eq!(cursor(&term), (0, 0));

        run(&mut term, b"\x1b[4;1H\n");
        assert_eq!(text(&term, 0), "1");
        assert_eq!(text(&term, 1), "3");
        assert_eq!(text(&term, 2), "4");
        assert_eq!(text(&term, 3), "");
        assert_eq!(text(&term, 4), "5");
    }

    #[test]
    fn test_terminal_invalid_scroll_region_ignored() {
        let mut term = Terminal::new(10, 5);
        run(&mut term, b"\x1b[3;3H\x1b[4;2r");
        assert_eq!(term.framebuffer().scroll_top(), 0);
        assert_eq!(term.framebuffer().scroll_bottom(), 4);
        assert_eq!(cursor(&term), (2, 2));

        // Bottom past the screen is clamped
        run(&mut term, b"\x1b[2;99r");
        assert_eq!(term.framebuffer().scroll_top(), 1);
        assert_eq!(term.framebuffer().scroll_bottom(), 4);

        run(&mut term, b"\x1b[r");
        assert_eq!(term.framebuffer().scroll_top(), 0);
    }

    #[test]
    fn test_terminal_scroll_up_down() {
        let mut term = Terminal::new(10, 3);
        run(&mut term, b"a\r\nb\r\nc");
        run(&mut term, b"\x1b[S");
        assert_eq!(text(&term, 0), "b");
        assert_eq!(text(&term, 2), "");
        run(&mut term, b"\x1b[2T");
        assert_eq!(text(&term, 0), "");
        assert_eq!(text(&term, 2), "b");
    }

    #[test]
    fn test_terminal_tabs() {
        let mut term = Terminal::new(40, 2);
        run(&mut term, b"\x1b[2I");
        assert_eq!(cursor(&term), (0, 16));
        run(&mut term, b"\x1b[Z");
        assert_eq!(cursor(&term), (0, 8));

        run(&mut term, b"\x1b[3g\r\t");
        assert_eq!(cursor(&term), (0, 39));

        run(&mut term, b"\x1b[1;5H\x1bH\r\t");
        assert_eq!(cursor(&term), (0, 4));
    }

    #[test]
    fn test_terminal_repeat() {
        let mut term = Terminal::new(10, 2);
        run(&mut term, b"x\x1b[4b");
        assert_eq!(text(&term, 0), "xxxxx");

        // Nothing printed yet after a reset
        let mut fresh = Terminal::new(10, 2);
        run(&mut fresh, b"\x1b[4b");
        assert_eq!(text(&fresh, 0), "");
    }

    #[test]
    fn test_terminal_sgr() {
        let mut term = Terminal::new(80, 24);

        run(&mut term, b"\x1b[1;3;4;9m");
        let style = term.framebuffer().cursor().pen.style;
        assert!(style.bold && style.italic && style.underline && style.strikethrough);

        run(&mut term, b"\x1b[22;23m");
        let style = term.framebuffer().cursor().pen.style;
        assert!(!style.bold && !style.italic && style.underline);

        run(&mut term, b"\x1b[31;102m");
        let pen = term.framebuffer().cursor().pen;
        assert_eq!(pen.fg, Color::RED);
        assert_eq!(pen.bg, Color::Indexed(10));

        run(&mut term, b"\x1b[m");
        assert_eq!(term.framebuffer().cursor().pen, Rendition::default());
    }

    #[test]
    fn test_terminal_sgr_extended_colors() {
        let mut term = Terminal::new(80, 24);

        run(&mut term, b"\x1b[38;5;196;48;2;1;2;3;1m");
        let pen = term.framebuffer().cursor().pen;
        assert_eq!(pen.fg, Color::Indexed(196));
        assert_eq!(pen.bg, Color::Rgb(1, 2, 3));
        assert!(pen.style.bold);

        // Out of range palette index leaves the color alone
        run(&mut term, b"\x1b[38;5;300m");
        assert_eq!(term.framebuffer().cursor().pen.fg, Color::Indexed(196));

        // Truncated forms do not panic
        run(&mut term, b"\x1b[38;2;10m\x1b[48m\x1b[38;5m");
    }

    #[test]
    fn test_terminal_printed_cells_carry_pen() {
        let mut term = Terminal::new(10, 2);
        run(&mut term, b"\x1b[7;32mA\x1b[0mB");
        let a = term.framebuffer().cell(0, 0).unwrap();
        let b = term.framebuffer().cell(0, 1).unwrap();
        assert_eq!(a.rendition.fg, Color::GREEN);
        assert!(a.rendition.style.inverse);
        assert_eq!(b.rendition, Rendition::default());
        assert_eq!(b.rendition.style, Style::default());
    }

    #[test]
    fn test_terminal_dec_modes() {
        let mut term = Terminal::new(80, 24);

        run(&mut term, b"\x1b[?1h\x1b[?5h\x1b[?2004h\x1b[?25l");
        let fb = term.framebuffer();
        assert!(fb.modes.application_cursor);
        assert!(fb.modes.reverse_video);
        assert!(fb.modes.bracketed_paste);
        assert!(!fb.cursor().visible);

        run(&mut term, b"\x1b[?1;5;2004l\x1b[?25h");
        let fb = term.framebuffer();
        assert!(!fb.modes.application_cursor);
        assert!(!fb.modes.reverse_video);
        assert!(!fb.modes.bracketed_paste);
        assert!(fb.cursor().visible);
    }

    #[test]
    fn test_terminal_mouse_modes() {
        let mut term = Terminal::new(80, 24);
        run(&mut term, b"\x1b[?1002h\x1b[?1006h");
        assert_eq!(term.framebuffer().modes.mouse_tracking, MouseMode::ButtonEvent);
        assert_eq!(term.framebuffer().modes.mouse_encoding, MouseEncoding::Sgr);

        // Resetting a different encoding keeps the active one
        run(&mut term, b"\x1b[?1015l");
        assert_eq!(term.framebuffer().modes.mouse_encoding, MouseEncoding::Sgr);

        run(&mut term, b"\x1b[?1002l\x1b[?1006l");
        assert_eq!(term.framebuffer().modes.mouse_tracking, MouseMode::None);
        assert_eq!(term.framebuffer().modes.mouse_encoding, MouseEncoding::X10);
    }

    #[test]
    fn test_terminal_autowrap_off() {
        let mut term = Terminal::new(5, 2);
        run(&mut term, b"\x1b[?7labcdefg");
        assert_eq!(text(&term, 0), "abcdg");
        assert_eq!(text(&term, 1), "");
    }

    #[test]
    fn test_terminal_origin_mode() {
        let mut term = Terminal::new(10, 10);
        run(&mut term, b"\x1b[3;6r\x1b[?6h");
        assert_eq!(cursor(&term), (2, 0));

        run(&mut term, b"\x1b[2;2H");
        assert_eq!(cursor(&term), (3, 1));

        let reply = run(&mut term, b"\x1b[6n");
        assert_eq!(reply, b"\x1b[2;2R");

        run(&mut term, b"\x1b[?6l");
        assert_eq!(cursor(&term), (0, 0));
    }

    #[test]
    fn test_terminal_insert_mode() {
        let mut term = Terminal::new(10, 2);
        run(&mut term, b"world\r\x1b[4hhello \x1b[4l");
        assert_eq!(text(&term, 0), "hello worl");
    }

    #[test]
    fn test_terminal_linefeed_mode() {
        let mut term = Terminal::new(10, 3);
        run(&mut term, b"\x1b[20hab\ncd");
        assert_eq!(text(&term, 1), "cd");
        run(&mut term, b"\x1b[20l\nef");
        assert_eq!(text(&term, 2), "  ef");
    }

    #[test]
    fn test_terminal_alternate_screen() {
        let mut term = Terminal::new(20, 5);
        run(&mut term, b"primary\x1b[?1049h");
        assert!(term.framebuffer().is_alternate_screen());
        assert_eq!(text(&term, 0), "");

        run(&mut term, b"\x1b[Halt");
        assert_eq!(text(&term, 0), "alt");

        run(&mut term, b"\x1b[?1049l");
        assert!(!term.framebuffer().is_alternate_screen());
        assert_eq!(text(&term, 0), "primary");
        assert_eq!(cursor(&term), (0, 7));
    }

    #[test]
    fn test_terminal_save_restore_mode_1048() {
        let mut term = Terminal::new(20, 5);
        run(&mut term, b"\x1b[2;3H\x1b[?1048h\x1b[H\x1b[?1048l");
        assert_eq!(cursor(&term), (1, 2));
        run(&mut term, b"\x1b[4;4H\x1b[s\x1b[H\x1b[u");
        assert_eq!(cursor(&term), (3, 3));
    }

    #[test]
    fn test_terminal_device_attributes() {
        let mut term = Terminal::new(80, 24);
        assert_eq!(run(&mut term, b"\x1b[c"), b"\x1b[?62c");
        assert_eq!(run(&mut term, b"\x1b[0c"), b"\x1b[?62c");
        assert_eq!(run(&mut term, b"\x1b[>c"), b"\x1b[>1;10;0c");
    }

    #[test]
    fn test_terminal_status_reports() {
        let mut term = Terminal::new(80, 24);
        assert_eq!(run(&mut term, b"\x1b[5n"), b"\x1b[0n");
        assert_eq!(run(&mut term, b"\x1b[5;10H\x1b[6n"), b"\x1b[5;10R");
        assert_eq!(run(&mut term, b"\x1b[18t"), b"\x1b[8;24;80t");

        // Replies accumulate in order until taken
        assert_eq!(run(&mut term, b"\x1b[5n\x1b[c"), b"\x1b[0n\x1b[?62c");
    }

    #[test]
    fn test_terminal_soft_reset() {
        let mut term = Terminal::new(10, 5);
        run(&mut term, b"text\x1b[2;4r\x1b[?6h\x1b[1m\x1b[?25l\x1b[!p");
        let fb = term.framebuffer();
        assert_eq!(fb.scroll_top(), 0);
        assert!(!fb.cursor().origin_mode);
        assert!(fb.cursor().visible);
        assert_eq!(fb.cursor().pen, Rendition::default());
        assert_eq!(text(&term, 0), "text");
    }

    #[test]
    fn test_terminal_unknown_csi_is_noop() {
        let mut term = Terminal::new(80, 24);
        let reply = run(&mut term, b"\x1b[;;;q\x1b[?99h\x1b[>5m\x1b[12$z");
        assert!(reply.is_empty());
        assert_eq!(term.framebuffer(), &crate::core::Framebuffer::new(80, 24));
    }
}
