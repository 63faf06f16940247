//! Terminal framebuffer
//!
//! The framebuffer is the sole mutable model of what the screen looks like:
//! the active cell grid, the cursor, the scrolling region, tab stops, the
//! terminal modes and the window-level attributes (title, icon name, bell).
//!
//! Every primitive here keeps two invariants:
//! - the cursor lies within `[0, rows) x [0, cols)`
//! - a width-2 cell is always followed by its width-0 placeholder, and a
//!   placeholder never appears anywhere else

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use super::cursor::{Cursor, SavedCursor};
use super::{Cell, Color};

/// Upper bound on the bytes a single cell may accumulate from combining marks
const MAX_CELL_CONTENT: usize = 64;

/// Terminal modes that are not part of the cursor state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// Application cursor keys (DECCKM)
    pub application_cursor: bool,
    /// Application keypad mode (DECKPAM/DECKPNM)
    pub application_keypad: bool,
    /// Bracketed paste mode (xterm)
    pub bracketed_paste: bool,
    /// Mouse tracking modes
    pub mouse_tracking: MouseMode,
    /// Mouse encoding format
    pub mouse_encoding: MouseEncoding,
    /// Line feed/new line mode (LNM)
    pub linefeed_mode: bool,
    /// Reverse video mode (DECSCNM)
    pub reverse_video: bool,
}

/// Mouse tracking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    /// No mouse tracking
    #[default]
    None,
    /// VT200 normal tracking (button press and release), mode 1000
    Normal,
    /// Button-event tracking (motion while button pressed), mode 1002
    ButtonEvent,
    /// Any-event tracking (all motion), mode 1003
    AnyEvent,
}

impl MouseMode {
    /// The DEC private mode number enabling this tracking mode
    pub fn dec_mode(self) -> Option<u16> {
        match self {
            MouseMode::None => None,
            MouseMode::Normal => Some(1000),
            MouseMode::ButtonEvent => Some(1002),
            MouseMode::AnyEvent => Some(1003),
        }
    }
}

/// Mouse coordinate encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseEncoding {
    /// Default X10 encoding (limited to 223 columns/rows)
    #[default]
    X10,
    /// UTF-8 encoding, mode 1005
    Utf8,
    /// SGR encoding (CSI < ... M/m), mode 1006
    Sgr,
    /// URXVT encoding, mode 1015
    Urxvt,
}

impl MouseEncoding {
    pub fn dec_mode(self) -> Option<u16> {
        match self {
            MouseEncoding::X10 => None,
            MouseEncoding::Utf8 => Some(1005),
            MouseEncoding::Sgr => Some(1006),
            MouseEncoding::Urxvt => Some(1015),
        }
    }
}

/// A row of cells in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// Create a new row with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self::blank(cols, Color::Default)
    }

    /// Create a row of erased cells with the given background
    pub fn blank(cols: usize, bg: Color) -> Self {
        Self {
            cells: vec![Cell::blank(bg); cols],
        }
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }

    /// Row contents as text, trailing blanks removed
    pub fn text(&self) -> String {
        let mut s: String = self.cells.iter().map(Cell::display_text).collect();
        let trimmed = s.trim_end_matches(' ').len();
        s.truncate(trimmed);
        s
    }

    fn resize(&mut self, cols: usize) {
        self.cells.resize_with(cols, Cell::default);
        self.normalize_wide();
    }

    /// Erase cells in `[start, end)`
    fn erase_range(&mut self, start: usize, end: usize, bg: Color) {
        let end = end.min(self.cells.len());
        if start >= end {
            return;
        }
        for cell in &mut self.cells[start..end] {
            cell.erase(bg);
        }
        self.repair_wide_edges(start, end);
    }

    fn clear(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
    }

    /// Insert `n` blank cells at `col`, shifting the rest right
    fn insert_cells(&mut self, col: usize, n: usize, bg: Color) {
        let cols = self.cells.len();
        if col >= cols {
            return;
        }
        let n = n.min(cols - col);
        self.cells[col..].rotate_right(n);
        for cell in &mut self.cells[col..col + n] {
            cell.erase(bg);
        }
        self.normalize_wide();
    }

    /// Delete `n` cells at `col`, shifting the rest left
    fn delete_cells(&mut self, col: usize, n: usize, bg: Color) {
        let cols = self.cells.len();
        if col >= cols {
            return;
        }
        let n = n.min(cols - col);
        self.cells[col..].rotate_left(n);
        for cell in &mut self.cells[cols - n..] {
            cell.erase(bg);
        }
        self.normalize_wide();
    }

    /// Blank any wide character left without its placeholder and any
    /// placeholder left without its wide character.
    fn normalize_wide(&mut self) {
        let n = self.cells.len();
        let mut i = 0;
        while i < n {
            match self.cells[i].width {
                2 if i + 1 < n && self.cells[i + 1].width == 0 => {
                    i += 2;
                    continue;
                }
                0 | 2 => {
                    let bg = self.cells[i].rendition.bg;
                    self.cells[i].erase(bg);
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Cheaper repair after cells in `[start, end)` were overwritten with
    /// a self-consistent run: only the halves straddling the edges can break.
    fn repair_wide_edges(&mut self, start: usize, end: usize) {
        let n = self.cells.len();
        if start > 0 && start < n && self.cells[start - 1].width == 2 && self.cells[start].width != 0
        {
            let bg = self.cells[start - 1].rendition.bg;
            self.cells[start - 1].erase(bg);
        }
        if end > 0 && end < n && self.cells[end].width == 0 && self.cells[end - 1].width != 2 {
            let bg = self.cells[end].rendition.bg;
            self.cells[end].erase(bg);
        }
    }
}

/// The authoritative model of the terminal display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framebuffer {
    cols: usize,
    rows: usize,
    /// Active grid (the alternate grid while the alternate screen is on)
    grid: Vec<Row>,
    /// Primary grid stashed while the alternate screen is active
    saved_primary: Option<Vec<Row>>,
    cursor: Cursor,
    saved_cursor: SavedCursor,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    tab_stops: Vec<bool>,
    pub modes: Modes,
    title: String,
    icon_name: String,
    /// Set once the application has sent a title or icon name
    title_initialized: bool,
    /// Incremented on every BEL
    bell_count: u64,
}

fn default_tab_stops(cols: usize) -> Vec<bool> {
    (0..cols).map(|i| i > 0 && i % 8 == 0).collect()
}

impl Framebuffer {
    /// Create a blank framebuffer. Degenerate sizes are clamped to 1x1.
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            grid: (0..rows).map(|_| Row::new(cols)).collect(),
            saved_primary: None,
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
            modes: Modes::default(),
            title: String::new(),
            icon_name: String::new(),
            title_initialized: false,
            bell_count: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    /// All rows of the active grid
    pub fn lines(&self) -> &[Row] {
        &self.grid
    }

    pub fn line(&self, row: usize) -> Option<&Row> {
        self.grid.get(row)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|r| r.cell(col))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn is_title_initialized(&self) -> bool {
        self.title_initialized
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.title_initialized = true;
    }

    pub fn set_icon_name(&mut self, name: &str) {
        self.icon_name = name.to_string();
        self.title_initialized = true;
    }

    pub fn bell_count(&self) -> u64 {
        self.bell_count
    }

    pub fn ring_bell(&mut self) {
        self.bell_count = self.bell_count.wrapping_add(1);
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.saved_primary.is_some()
    }

    /// Print a character at the cursor, handling wrap, wide characters,
    /// combining marks and insert mode.
    pub fn print_char(&mut self, c: char) {
        let width = match c.width() {
            Some(w) => w,
            None => return,
        };

        if width == 0 {
            self.combine_char(c);
            return;
        }

        if self.cursor.pending_wrap {
            if self.cursor.autowrap {
                self.wrap_cursor();
            } else {
                self.cursor.pending_wrap = false;
            }
        }

        let cols = self.cols;
        if width == 2 && self.cursor.col == cols - 1 {
            // A wide character never straddles the right edge
            if !self.cursor.autowrap || cols < 2 {
                return;
            }
            let (row, col) = (self.cursor.row, self.cursor.col);
            let bg = self.cursor.erase_bg();
            self.grid[row].erase_range(col, col + 1, bg);
            self.wrap_cursor();
        }

        let row = self.cursor.row;
        let col = self.cursor.col;
        let pen = self.cursor.pen;

        if self.cursor.insert_mode {
            self.grid[row].insert_cells(col, width, pen.bg);
        }

        let line = &mut self.grid[row];
        line.cells[col] = Cell {
            content: c.to_string(),
            width: width as u8,
            rendition: pen,
        };
        if width == 2 {
            line.cells[col + 1] = Cell::placeholder(pen);
        }
        line.repair_wide_edges(col, col + width);

        // Advance cursor
        let new_col = col + width;
        if new_col >= cols {
            self.cursor.col = cols - 1;
            self.cursor.pending_wrap = self.cursor.autowrap;
        } else {
            self.cursor.col = new_col;
        }
    }

    /// Attach a zero-width character to the most recently printed cell
    fn combine_char(&mut self, c: char) {
        let row = self.cursor.row;
        let mut col = if self.cursor.pending_wrap {
            self.cursor.col
        } else if self.cursor.col > 0 {
            self.cursor.col - 1
        } else {
            return;
        };
        if self.grid[row].cells[col].is_placeholder() && col > 0 {
            col -= 1;
        }

        let cell = &mut self.grid[row].cells[col];
        if cell.content.len() + c.len_utf8() > MAX_CELL_CONTENT {
            return;
        }
        if cell.content.is_empty() {
            cell.content.push('\u{a0}');
        }
        cell.content.push(c);
    }

    /// Handle cursor wrap (newline at end of line)
    fn wrap_cursor(&mut self) {
        self.cursor.carriage_return();
        self.index();
    }

    /// Handle linefeed (LF)
    pub fn linefeed(&mut self) {
        self.index();
        // In linefeed mode, LF also does CR
        if self.modes.linefeed_mode {
            self.cursor.carriage_return();
        }
    }

    /// Handle carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Handle backspace (BS)
    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// Advance to the n-th next tab stop, or the last column
    pub fn tab(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        for _ in 0..n {
            let col = self.cursor.col;
            self.cursor.col = ((col + 1)..self.cols)
                .find(|&i| self.tab_stops[i])
                .unwrap_or(self.cols - 1);
        }
    }

    /// Move back to the n-th previous tab stop, or column 0 (CBT)
    pub fn back_tab(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        for _ in 0..n {
            let col = self.cursor.col;
            self.cursor.col = (0..col).rev().find(|&i| self.tab_stops[i]).unwrap_or(0);
        }
    }

    /// Handle index (IND) - move cursor down, scroll if at bottom margin
    pub fn index(&mut self) {
        self.cursor.pending_wrap = false;
        let row = self.cursor.row;
        if row == self.scroll_bottom {
            self.scroll_up(1);
        } else if row < self.rows - 1 {
            self.cursor.row += 1;
        }
    }

    /// Handle reverse index (RI) - move cursor up, scroll if at top margin
    pub fn reverse_index(&mut self) {
        self.cursor.pending_wrap = false;
        let row = self.cursor.row;
        if row == self.scroll_top {
            self.scroll_down(1);
        } else if row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Handle next line (NEL) - move to start of next line
    pub fn next_line(&mut self) {
        self.index();
        self.cursor.carriage_return();
    }

    /// Scroll the region up by n lines (content moves up, blank lines at bottom)
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }
        let bg = self.cursor.erase_bg();
        self.grid[top..=bottom].rotate_left(n);
        for line in &mut self.grid[bottom + 1 - n..=bottom] {
            *line = Row::blank(self.cols, bg);
        }
    }

    /// Scroll the region down by n lines (content moves down, blank lines at top)
    pub fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }
        let bg = self.cursor.erase_bg();
        self.grid[top..=bottom].rotate_right(n);
        for line in &mut self.grid[top..top + n] {
            *line = Row::blank(self.cols, bg);
        }
    }

    /// Set scroll region (DECSTBM), 0-indexed and inclusive. Invalid
    /// regions are ignored; a valid one homes the cursor.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        if top >= bottom || bottom >= self.rows {
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.move_cursor_to(0, 0);
    }

    /// Reset scroll region to full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
    }

    /// Set a tab stop at the current column
    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col;
        self.tab_stops[col] = true;
    }

    /// Clear tab stop at current column
    pub fn clear_tab_stop(&mut self) {
        let col = self.cursor.col;
        self.tab_stops[col] = false;
    }

    /// Clear all tab stops
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|t| *t = false);
    }

    /// Erase in display (ED)
    pub fn erase_in_display(&mut self, mode: u16) {
        let bg = self.cursor.erase_bg();
        let row = self.cursor.row;
        let col = self.cursor.col;
        let cols = self.cols;

        match mode {
            0 => {
                self.grid[row].erase_range(col, cols, bg);
                for line in &mut self.grid[row + 1..] {
                    line.clear(bg);
                }
            }
            1 => {
                for line in &mut self.grid[..row] {
                    line.clear(bg);
                }
                self.grid[row].erase_range(0, col + 1, bg);
            }
            2 => {
                for line in &mut self.grid {
                    line.clear(bg);
                }
            }
            // 3 erases saved lines only; there are none to erase
            _ => {}
        }
    }

    /// Erase in line (EL)
    pub fn erase_in_line(&mut self, mode: u16) {
        let bg = self.cursor.erase_bg();
        let row = self.cursor.row;
        let col = self.cursor.col;
        let cols = self.cols;

        match mode {
            0 => self.grid[row].erase_range(col, cols, bg),
            1 => self.grid[row].erase_range(0, col + 1, bg),
            2 => self.grid[row].erase_range(0, cols, bg),
            _ => {}
        }
    }

    /// Erase characters (ECH)
    pub fn erase_chars(&mut self, n: usize) {
        let bg = self.cursor.erase_bg();
        let row = self.cursor.row;
        let col = self.cursor.col;
        self.grid[row].erase_range(col, col.saturating_add(n), bg);
    }

    /// Insert lines (IL)
    pub fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        let n = n.min(bottom - row + 1);
        let bg = self.cursor.erase_bg();
        self.grid[row..=bottom].rotate_right(n);
        for line in &mut self.grid[row..row + n] {
            *line = Row::blank(self.cols, bg);
        }
        self.cursor.carriage_return();
    }

    /// Delete lines (DL)
    pub fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        let n = n.min(bottom - row + 1);
        let bg = self.cursor.erase_bg();
        self.grid[row..=bottom].rotate_left(n);
        for line in &mut self.grid[bottom + 1 - n..=bottom] {
            *line = Row::blank(self.cols, bg);
        }
        self.cursor.carriage_return();
    }

    /// Insert blank characters (ICH)
    pub fn insert_chars(&mut self, n: usize) {
        let bg = self.cursor.erase_bg();
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid[row].insert_cells(col, n, bg);
        self.cursor.pending_wrap = false;
    }

    /// Delete characters (DCH)
    pub fn delete_chars(&mut self, n: usize) {
        let bg = self.cursor.erase_bg();
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid[row].delete_cells(col, n, bg);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor to position (CUP/HVP), relative to the scroll region in
    /// origin mode
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        let row = if self.cursor.origin_mode {
            self.scroll_top.saturating_add(row).min(self.scroll_bottom)
        } else {
            row
        };
        self.cursor.move_to(col, row, self.cols, self.rows);
    }

    /// Move cursor up (CUU), stopping at the top margin when starting inside
    /// the scroll region
    pub fn move_cursor_up(&mut self, n: usize) {
        let limit = if self.cursor.row >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(limit);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor down (CUD), stopping at the bottom margin when starting
    /// inside the scroll region
    pub fn move_cursor_down(&mut self, n: usize) {
        let limit = if self.cursor.row <= self.scroll_bottom {
            self.scroll_bottom
        } else {
            self.rows - 1
        };
        self.cursor.row = self.cursor.row.saturating_add(n).min(limit);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor forward/right (CUF)
    pub fn move_cursor_forward(&mut self, n: usize) {
        self.cursor.move_right(n, self.cols);
    }

    /// Move cursor backward/left (CUB)
    pub fn move_cursor_backward(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    /// Move cursor to column (CHA)
    pub fn move_cursor_to_col(&mut self, col: usize) {
        self.cursor.set_col(col, self.cols);
    }

    /// Move cursor to row (VPA)
    pub fn move_cursor_to_row(&mut self, row: usize) {
        let col = self.cursor.col;
        self.move_cursor_to(row, col);
    }

    /// Save cursor state (DECSC)
    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor.save();
    }

    /// Restore cursor state (DECRC)
    pub fn restore_cursor(&mut self) {
        let saved = self.saved_cursor.clone();
        self.cursor.restore(&saved, self.cols, self.rows);
    }

    /// Switch to a cleared alternate screen
    pub fn enter_alternate_screen(&mut self) {
        if self.saved_primary.is_some() {
            return;
        }
        let blank = (0..self.rows).map(|_| Row::new(self.cols)).collect();
        self.saved_primary = Some(std::mem::replace(&mut self.grid, blank));
    }

    /// Switch back to primary screen
    pub fn exit_alternate_screen(&mut self) {
        if let Some(primary) = self.saved_primary.take() {
            self.grid = primary;
        }
    }

    /// Resize the grid, keeping the top-left region and clamping the cursor.
    /// Degenerate sizes are clamped to 1x1.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        let new_cols = new_cols.max(1);
        let new_rows = new_rows.max(1);
        if new_cols == self.cols && new_rows == self.rows {
            return;
        }

        resize_grid(&mut self.grid, new_cols, new_rows);
        if let Some(primary) = self.saved_primary.as_mut() {
            resize_grid(primary, new_cols, new_rows);
        }

        // Existing stops survive, new columns get the default stops
        let old_cols = self.cols;
        self.tab_stops.truncate(new_cols);
        self.tab_stops
            .extend((old_cols..new_cols).map(|i| i > 0 && i % 8 == 0));

        self.cols = new_cols;
        self.rows = new_rows;
        self.reset_scroll_region();

        self.cursor.col = self.cursor.col.min(new_cols - 1);
        self.cursor.row = self.cursor.row.min(new_rows - 1);
        self.cursor.pending_wrap = false;
    }

    /// Full reset (RIS). The size and the bell counter survive.
    pub fn reset(&mut self) {
        let bell_count = self.bell_count;
        *self = Self::new(self.cols, self.rows);
        self.bell_count = bell_count;
    }

    /// Soft terminal reset (DECSTR)
    pub fn soft_reset(&mut self) {
        self.cursor.visible = true;
        self.cursor.origin_mode = false;
        self.cursor.autowrap = true;
        self.cursor.insert_mode = false;
        self.cursor.reset_attributes();
        self.cursor.pending_wrap = false;
        self.modes.application_cursor = false;
        self.modes.application_keypad = false;
        self.reset_scroll_region();
        self.saved_cursor = SavedCursor::default();
    }

    /// Screen alignment test (DECALN): fill with 'E' and home the cursor
    pub fn fill_alignment_pattern(&mut self) {
        for line in &mut self.grid {
            for cell in &mut line.cells {
                *cell = Cell::new('E');
            }
        }
        self.reset_scroll_region();
        self.cursor.move_to(0, 0, self.cols, self.rows);
    }
}

fn resize_grid(grid: &mut Vec<Row>, new_cols: usize, new_rows: usize) {
    grid.truncate(new_rows);
    for line in grid.iter_mut() {
        line.resize(new_cols);
    }
    while grid.len() < new_rows {
        grid.push(Row::new(new_cols));
    }
}
