//! Cursor state management
//!
//! The cursor tracks position, visibility, the pen used for new characters
//! and the per-cursor modes. It also supports save/restore operations
//! (DECSC/DECRC and CSI s/u).

use serde::{Deserialize, Serialize};

use super::{Color, Rendition};

/// Cursor state including position, visibility, and pen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// Whether the cursor is visible (DECTCEM)
    pub visible: bool,
    /// Rendition applied to newly printed characters
    pub pen: Rendition,
    /// Origin mode (DECOM) - cursor addressing relative to scroll region
    pub origin_mode: bool,
    /// Autowrap mode (DECAWM) - wrap at end of line
    pub autowrap: bool,
    /// Pending wrap - cursor is at the right margin, next char will wrap
    pub pending_wrap: bool,
    /// Insert mode (IRM) - insert characters instead of overwriting
    pub insert_mode: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            visible: true,
            pen: Rendition::default(),
            origin_mode: false,
            autowrap: true,
            pending_wrap: false,
            insert_mode: false,
        }
    }
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub pen: Rendition,
    pub origin_mode: bool,
    pub autowrap: bool,
    pub pending_wrap: bool,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            pen: Rendition::default(),
            origin_mode: false,
            autowrap: true,
            pending_wrap: false,
        }
    }
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, col: usize, row: usize, cols: usize, rows: usize) {
        self.col = col.min(cols.saturating_sub(1));
        self.row = row.min(rows.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Move cursor left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    /// Move cursor right by n columns, stopping at right margin
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Move cursor to column (0-indexed)
    pub fn set_col(&mut self, col: usize, cols: usize) {
        self.col = col.min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Background used by erase operations
    pub fn erase_bg(&self) -> Color {
        self.pen.bg
    }

    /// Save cursor state
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            col: self.col,
            row: self.row,
            pen: self.pen,
            origin_mode: self.origin_mode,
            autowrap: self.autowrap,
            pending_wrap: self.pending_wrap,
        }
    }

    /// Restore cursor state
    pub fn restore(&mut self, saved: &SavedCursor, cols: usize, rows: usize) {
        self.col = saved.col.min(cols.saturating_sub(1));
        self.row = saved.row.min(rows.saturating_sub(1));
        self.pen = saved.pen;
        self.origin_mode = saved.origin_mode;
        self.autowrap = saved.autowrap;
        self.pending_wrap = saved.pending_wrap && self.col == saved.col;
    }

    /// Reset only the text attributes (SGR 0)
    pub fn reset_attributes(&mut self) {
        self.pen = Rendition::default();
    }
}
