//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - The framebuffer (active grid, alternate screen, modes, title, bell)
//! - Cell representation with renditions
//! - Cursor state and positioning
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! actions, it always produces the same state.

mod cell;
mod cursor;
mod framebuffer;
mod snapshot;

pub use cell::{Cell, Color, Rendition, Style};
pub use cursor::{Cursor, SavedCursor};
pub use framebuffer::{Framebuffer, Modes, MouseEncoding, MouseMode, Row};
pub use snapshot::{CursorSnapshot, Snapshot, StyledCell};
