//! Deterministic snapshot generation
//!
//! Snapshots capture the visible framebuffer state in a serializable format
//! for tooling and tests. Given the same byte stream, the terminal must
//! produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::Rendition;
use super::framebuffer::Framebuffer;

/// A snapshot of what the framebuffer shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// Row text with trailing blanks trimmed
    pub lines: Vec<String>,
    /// Every non-blank cell drawn with a non-default rendition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styled: Vec<StyledCell>,
    pub cursor: CursorSnapshot,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_name: String,
    pub bell_count: u64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub alternate_screen: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse_video: bool,
    /// Keypad keys send application sequences (DECKPAM)
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_keypad: bool,
}

/// A cell whose rendition differs from the default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledCell {
    pub row: usize,
    pub col: usize,
    pub content: String,
    pub rendition: Rendition,
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Snapshot {
    /// Create a snapshot from the current framebuffer state
    pub fn from_framebuffer(fb: &Framebuffer) -> Self {
        let lines = fb.lines().iter().map(|row| row.text()).collect();

        let mut styled = Vec::new();
        for (r, row) in fb.lines().iter().enumerate() {
            for (c, cell) in row.cells().iter().enumerate() {
                let plain = cell.rendition == Rendition::default();
                if !plain && !cell.is_placeholder() && !cell.is_blank() {
                    styled.push(StyledCell {
                        row: r,
                        col: c,
                        content: cell.content.clone(),
                        rendition: cell.rendition,
                    });
                }
            }
        }

        let cursor = fb.cursor();
        Snapshot {
            cols: fb.cols(),
            rows: fb.rows(),
            lines,
            styled,
            cursor: CursorSnapshot {
                row: cursor.row,
                col: cursor.col,
                visible: cursor.visible,
            },
            title: fb.title().to_string(),
            icon_name: fb.icon_name().to_string(),
            bell_count: fb.bell_count(),
            alternate_screen: fb.is_alternate_screen(),
            reverse_video: fb.modes.reverse_video,
            application_keypad: fb.modes.application_keypad,
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the screen, trailing empty lines removed
    pub fn to_text(&self) -> String {
        let mut result = String::new();
        for line in &self.lines {
            result.push_str(line);
            result.push('\n');
        }
        while result.ends_with("\n\n") {
            result.pop();
        }
        result
    }
}
