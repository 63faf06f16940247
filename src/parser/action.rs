//! Terminal Actions
//!
//! Semantic units produced by the parser (and by the owner of the terminal,
//! for resizes and local keystrokes) that are applied to the framebuffer.

use serde::{Deserialize, Serialize};

/// A decoded unit of terminal behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Nothing to do (collecting bytes, ignored input)
    Ignore,

    /// Print a character to the screen (possibly wide or combining)
    Print(char),

    /// Execute a C0 (0x00-0x1F) or C1 (0x80-0x9F) control function
    Execute(u8),

    /// Dispatch an ESC sequence (non-CSI)
    EscDispatch(EscAction),

    /// Dispatch a CSI (Control Sequence Introducer) command
    CsiDispatch(CsiAction),

    /// A terminated OSC (Operating System Command) string
    OscString(String),

    /// A terminated DCS (Device Control String)
    DcsSequence(DcsAction),

    /// New window size; never produced by the byte parser
    Resize { cols: usize, rows: usize },

    /// One raw byte typed by the local user
    UserByte(u8),
}

/// ESC sequence: intermediates and final character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscAction {
    pub intermediates: Vec<char>,
    pub final_char: char,
}

/// CSI (Control Sequence Introducer) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// The final character that identifies the command
    pub final_char: char,
    /// Parameters (semicolon-separated numbers, empty ones recorded as 0)
    pub params: Vec<u16>,
    /// Intermediate characters (0x20-0x2F)
    pub intermediates: Vec<char>,
    /// Private marker (? or > or other)
    pub private_marker: Option<char>,
}

impl CsiAction {
    pub fn new(final_char: char) -> Self {
        Self {
            final_char,
            params: Vec::new(),
            intermediates: Vec::new(),
            private_marker: None,
        }
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(&0) | None => default,
            Some(&v) => v,
        }
    }
}

/// DCS (Device Control String) with its header and payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcsAction {
    pub final_char: char,
    pub params: Vec<u16>,
    pub intermediates: Vec<char>,
    pub private_marker: Option<char>,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csi_action_param() {
        let mut csi = CsiAction::new('H');
        csi.params = vec![10, 20];

        assert_eq!(csi.param(0, 1), 10);
        assert_eq!(csi.param(1, 1), 20);
        assert_eq!(csi.param(2, 1), 1);
    }

    #[test]
    fn test_csi_param_or_default_treats_zero_as_missing() {
        let mut csi = CsiAction::new('A');
        csi.params = vec![0, 7];

        assert_eq!(csi.param(0, 1), 0);
        assert_eq!(csi.param_or_default(0, 1), 1);
        assert_eq!(csi.param_or_default(1, 1), 7);
        assert_eq!(csi.param_or_default(5, 3), 3);
    }
}
