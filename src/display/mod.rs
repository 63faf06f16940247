//! Differential renderer.
//!
//! Produces the bytes that turn what the real terminal currently shows (the
//! previously rendered framebuffer) into a new framebuffer. The target is a
//! fixed xterm-256color profile with back-color-erase, so no terminfo lookup
//! is involved.
//!
//! While emitting a frame the renderer tracks the cursor position and
//! rendition the real terminal will have after each sequence, and only
//! moves or restyles when the next change needs it. Every frame leaves the
//! terminal in the default rendition.

mod throttle;

pub use throttle::FrameClock;

use std::io::Write as _;

use tracing::trace;

use crate::core::{Cell, Framebuffer, MouseEncoding, MouseMode, Rendition, Row};

/// Blank cells slurped in a run before an ECH pays off over plain spaces
const ECH_THRESHOLD: usize = 4;

/// Renderer for one real terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    /// Switch the real terminal to its alternate screen while open
    alternate_screen: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Display {
    pub fn new(alternate_screen: bool) -> Self {
        Self { alternate_screen }
    }

    /// Bytes that prepare the real terminal for rendering
    pub fn open(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.alternate_screen {
            out.extend_from_slice(b"\x1b[?1049h");
        }
        // UTF-8 mode, then application cursor keys
        out.extend_from_slice(b"\x1b%G\x1b[?1h");
        out
    }

    /// Bytes that restore the real terminal when rendering stops
    pub fn close(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"\x1b[?1l\x1b[0m\x1b[?25h");
        for mode in [1003, 1002, 1000, 1015, 1006, 1005] {
            let _ = write!(out, "\x1b[?{}l", mode);
        }
        out.extend_from_slice(b"\x1b[?2004l");
        if self.alternate_screen {
            out.extend_from_slice(b"\x1b[?1049l");
        }
        out
    }

    /// Compute the bytes transforming `last` into `f`.
    ///
    /// When `initialized` is false the contents of `last` are ignored and the
    /// screen is cleared and redrawn; a size change also forces a redraw.
    /// Identical frames produce no output.
    pub fn new_frame(&self, initialized: bool, last: &Framebuffer, f: &Framebuffer) -> Vec<u8> {
        let fresh = !initialized;
        let repaint = fresh || last.cols() != f.cols() || last.rows() != f.rows();

        let mut frame = FrameState::new(f.cols());
        if !repaint {
            let cursor = last.cursor();
            frame.cursor = Some((cursor.row, cursor.col));
        }

        if initialized && f.bell_count() != last.bell_count() {
            frame.out.push(0x07);
        }

        if f.is_title_initialized()
            && (fresh
                || !last.is_title_initialized()
                || f.title() != last.title()
                || f.icon_name() != last.icon_name())
        {
            frame.put_title(f.icon_name(), f.title());
        }

        let reverse_video = f.modes.reverse_video;
        if (fresh && reverse_video) || (!fresh && reverse_video != last.modes.reverse_video) {
            frame.put_dec_mode(5, reverse_video);
        }

        let base: Vec<Row> = if repaint {
            frame.out.extend_from_slice(b"\x1b[r\x1b[0m\x1b[H\x1b[2J");
            frame.cursor = Some((0, 0));
            frame.rendition = Rendition::default();
            vec![Row::new(f.cols()); f.rows()]
        } else {
            let mut base = last.lines().to_vec();
            if let Some(k) = scrolled_by(last, f) {
                // SU fills with the current background
                frame.reset_rendition();
                let _ = write!(frame.out, "\x1b[{}S", k);
                base.drain(..k);
                base.extend((0..k).map(|_| Row::new(f.cols())));
            }
            base
        };

        for (row, (old, new)) in base.iter().zip(f.lines()).enumerate() {
            frame.put_row(row, old.cells(), new.cells());
        }

        frame.reset_rendition();

        let cursor = f.cursor();
        frame.move_to(cursor.row, cursor.col);

        if repaint || cursor.visible != last.cursor().visible {
            frame.put_dec_mode(25, cursor.visible);
        }

        let bracketed_paste = f.modes.bracketed_paste;
        if (fresh && bracketed_paste) || (!fresh && bracketed_paste != last.modes.bracketed_paste)
        {
            frame.put_dec_mode(2004, bracketed_paste);
        }

        frame.put_mouse_modes(fresh, last, f);

        trace!(
            "rendered frame: {} bytes, repaint={}",
            frame.out.len(),
            repaint
        );
        frame.out
    }
}

/// Find how many lines the screen scrolled up by: the first old row `k`
/// (k >= 1) matching the new top row, when that row has content.
fn scrolled_by(last: &Framebuffer, f: &Framebuffer) -> Option<usize> {
    let top = f.line(0)?;
    if top.is_blank() || last.line(0)?.cells() == top.cells() {
        return None;
    }
    (1..last.rows()).find(|&k| {
        last.line(k)
            .map(|row| row.cells() == top.cells())
            .unwrap_or(false)
    })
}

/// What the real terminal looks like while a frame is being emitted
struct FrameState {
    out: Vec<u8>,
    cols: usize,
    /// Known cursor position; `None` after writing into the last column,
    /// where the terminal may be holding a pending wrap
    cursor: Option<(usize, usize)>,
    rendition: Rendition,
}

impl FrameState {
    fn new(cols: usize) -> Self {
        Self {
            out: Vec::new(),
            cols,
            cursor: None,
            rendition: Rendition::default(),
        }
    }

    fn put_dec_mode(&mut self, mode: u16, enable: bool) {
        let _ = write!(
            self.out,
            "\x1b[?{}{}",
            mode,
            if enable { 'h' } else { 'l' }
        );
    }

    fn put_title(&mut self, icon_name: &str, title: &str) {
        // Writing into a Vec cannot fail
        if icon_name == title {
            let _ = write!(self.out, "\x1b]0;{}\x07", title);
        } else {
            let _ = write!(self.out, "\x1b]1;{}\x07\x1b]2;{}\x07", icon_name, title);
        }
    }

    fn put_mouse_modes(&mut self, fresh: bool, last: &Framebuffer, f: &Framebuffer) {
        let tracking = f.modes.mouse_tracking;
        let old_tracking = if fresh {
            MouseMode::None
        } else {
            last.modes.mouse_tracking
        };
        if tracking != old_tracking {
            if let Some(mode) = old_tracking.dec_mode() {
                self.put_dec_mode(mode, false);
            }
            if let Some(mode) = tracking.dec_mode() {
                self.put_dec_mode(mode, true);
            }
        }

        let encoding = f.modes.mouse_encoding;
        let old_encoding = if fresh {
            MouseEncoding::X10
        } else {
            last.modes.mouse_encoding
        };
        if encoding != old_encoding {
            if let Some(mode) = old_encoding.dec_mode() {
                self.put_dec_mode(mode, false);
            }
            if let Some(mode) = encoding.dec_mode() {
                self.put_dec_mode(mode, true);
            }
        }
    }

    fn set_rendition(&mut self, rendition: &Rendition) {
        if self.rendition != *rendition {
            self.out.extend_from_slice(rendition.sgr().as_bytes());
            self.rendition = *rendition;
        }
    }

    fn reset_rendition(&mut self) {
        self.set_rendition(&Rendition::default());
    }

    /// Move the cursor using the shortest sequence the known position allows
    fn move_to(&mut self, row: usize, col: usize) {
        let sink = &mut self.out;
        let _ = match self.cursor {
            Some((r, c)) if r == row && c == col => Ok(()),
            Some((r, _)) if r == row && col == 0 => write!(sink, "\r"),
            Some((r, _)) if r + 1 == row && col == 0 => write!(sink, "\r\n"),
            Some((r, c)) if r == row && col > c => write!(sink, "\x1b[{}C", col - c),
            Some((r, c)) if r == row => write!(sink, "\x1b[{}D", c - col),
            _ => write!(sink, "\x1b[{};{}H", row + 1, col + 1),
        };
        self.cursor = Some((row, col));
    }

    /// Account for `width` columns written at the cursor
    fn advance(&mut self, width: usize) {
        self.cursor = match self.cursor {
            Some((r, c)) if c + width < self.cols => Some((r, c + width)),
            _ => None,
        };
    }

    fn put_cell(&mut self, row: usize, col: usize, cell: &Cell) {
        self.move_to(row, col);
        self.set_rendition(&cell.rendition);
        self.out.extend_from_slice(cell.display_text().as_bytes());
        self.advance(usize::from(cell.width.max(1)));
    }

    /// Clear `count` cells starting at `col` with `rendition`'s background
    fn put_blanks(&mut self, row: usize, col: usize, count: usize, rendition: &Rendition) {
        self.move_to(row, col);
        self.set_rendition(rendition);
        if col + count == self.cols {
            self.out.extend_from_slice(b"\x1b[K");
        } else if count > ECH_THRESHOLD {
            let _ = write!(self.out, "\x1b[{}X", count);
        } else {
            self.out.extend(std::iter::repeat(b' ').take(count));
            self.advance(count);
        }
    }

    fn put_row(&mut self, row: usize, old: &[Cell], new: &[Cell]) {
        if old == new {
            return;
        }
        debug_assert_eq!(old.len(), new.len());

        let cols = new.len();
        let mut col = 0;
        // Pending run of blank cells: start column and shared rendition
        let mut run: Option<(usize, Rendition)> = None;

        while col < cols {
            let cell = &new[col];

            if let Some((start, rendition)) = run {
                if cell.is_blank() && cell.rendition == rendition {
                    col += 1;
                    continue;
                }
                self.put_blanks(row, start, col - start, &rendition);
                run = None;
            }

            if cell.is_placeholder() {
                // Drawn together with the wide character before it
                col += 1;
                continue;
            }

            let unchanged = cell.visibly_equal(&old[col])
                && (!cell.is_wide()
                    || (col + 1 < cols && new[col + 1].visibly_equal(&old[col + 1])));
            if unchanged {
                col += 1;
                continue;
            }

            if cell.is_blank() {
                run = Some((col, cell.rendition));
                col += 1;
                continue;
            }

            self.put_cell(row, col, cell);
            col += usize::from(cell.width.max(1));
        }

        if let Some((start, rendition)) = run {
            self.put_blanks(row, start, cols - start, &rendition);
        }
    }
}
