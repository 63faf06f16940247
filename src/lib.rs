//! Mirrorterm Terminal State Library
//!
//! Replicates a terminal's screen state and redraws it on a real terminal
//! with the fewest bytes possible. This crate provides:
//!
//! - `parser`: UTF-8 decoding and the VT/xterm escape sequence state machine
//! - `core`: Framebuffer model, cells, renditions, cursor, snapshots
//! - `terminal`: Applying actions to a framebuffer, and `CompleteTerminal`
//! - `display`: Differential renderer and frame pacing
//! - `config`: Settings for the command-line tools

pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod parser;
pub mod terminal;

pub use crate::config::Config;
pub use crate::core::{Framebuffer, Snapshot};
pub use crate::display::{Display, FrameClock};
pub use crate::error::{Error, Result};
pub use crate::parser::{Action, Parser};
pub use crate::terminal::{CompleteTerminal, Terminal};
