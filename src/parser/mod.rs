//! Terminal escape sequence parser
//!
//! A stateful parser that converts bytes into terminal actions.
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod action;
mod state;
mod table;
mod utf8;

pub use action::{Action, CsiAction, DcsAction, EscAction};
pub use state::{Parser, StateMachine};
pub use table::StateId;
pub use utf8::Utf8Decoder;
