//! Parser State Machine
//!
//! Implements a VT500-series compatible parser driven by the static tables
//! in [`super::table`]. The parser handles arbitrary chunk boundaries and
//! produces semantic actions for the terminal.
//!
//! Two layers:
//! - [`StateMachine`] consumes decoded code points; each one performs
//!   exactly one transition and yields exactly one [`Action`] (often
//!   [`Action::Ignore`]).
//! - [`Parser`] consumes raw bytes, runs them through the UTF-8 decoder
//!   and collects the non-trivial actions.

use super::action::{Action, CsiAction, DcsAction, EscAction};
use super::table::{self, Op, StateId};
use super::utf8::Utf8Decoder;

/// Parameters kept per sequence; further ones are dropped
const MAX_PARAMS: usize = 32;
/// Intermediate bytes kept per sequence
const MAX_INTERMEDIATES: usize = 4;
/// Code points kept from an OSC or DCS payload
const MAX_STRING_LEN: usize = 4096;

/// The code-point level automaton
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: StateId,
    /// Intermediate characters collected during parsing
    intermediates: Vec<char>,
    private_marker: Option<char>,
    /// Completed parameters
    params: Vec<u16>,
    /// Parameter being built
    param: u16,
    /// Whether a digit was seen for the current parameter
    param_has_digit: bool,
    /// OSC string payload
    osc_string: String,
    osc_len: usize,
    /// DCS header and payload between hook and unhook
    dcs: Option<DcsAction>,
    dcs_len: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: StateId::Ground,
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            private_marker: None,
            params: Vec::with_capacity(16),
            param: 0,
            param_has_digit: false,
            osc_string: String::new(),
            osc_len: 0,
            dcs: None,
            dcs_len: 0,
        }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    /// Consume one code point
    pub fn input(&mut self, ch: char) -> Action {
        let transition = table::state(self.state).transition(ch);
        let action = self.perform(transition.op, ch);

        if let Some(next) = transition.next {
            self.state = next;
            let entry = table::state(next).entry;
            // Entry ops only reset or prepare buffers
            let entered = self.perform(entry, ch);
            debug_assert_eq!(entered, Action::Ignore);
        }

        action
    }

    fn perform(&mut self, op: Op, ch: char) -> Action {
        match op {
            Op::Ignore => Action::Ignore,
            Op::Print => Action::Print(ch),
            Op::Execute => Action::Execute(ch as u32 as u8),
            Op::Clear => {
                self.clear();
                Action::Ignore
            }
            Op::Collect => {
                self.collect(ch);
                Action::Ignore
            }
            Op::Param => {
                self.param(ch);
                Action::Ignore
            }
            Op::EscDispatch => Action::EscDispatch(EscAction {
                intermediates: std::mem::take(&mut self.intermediates),
                final_char: ch,
            }),
            Op::CsiDispatch => Action::CsiDispatch(CsiAction {
                final_char: ch,
                params: self.finish_params(),
                intermediates: std::mem::take(&mut self.intermediates),
                private_marker: self.private_marker.take(),
            }),
            Op::Hook => {
                self.dcs = Some(DcsAction {
                    final_char: ch,
                    params: self.finish_params(),
                    intermediates: std::mem::take(&mut self.intermediates),
                    private_marker: self.private_marker.take(),
                    data: String::new(),
                });
                self.dcs_len = 0;
                Action::Ignore
            }
            Op::Put => {
                if let Some(dcs) = self.dcs.as_mut() {
                    if self.dcs_len < MAX_STRING_LEN {
                        dcs.data.push(ch);
                        self.dcs_len += 1;
                    }
                }
                Action::Ignore
            }
            Op::Unhook => match self.dcs.take() {
                Some(dcs) => Action::DcsSequence(dcs),
                None => Action::Ignore,
            },
            Op::OscStart => {
                self.osc_string.clear();
                self.osc_len = 0;
                Action::Ignore
            }
            Op::OscPut => {
                if self.osc_len < MAX_STRING_LEN {
                    self.osc_string.push(ch);
                    self.osc_len += 1;
                }
                Action::Ignore
            }
            Op::OscEnd => Action::OscString(std::mem::take(&mut self.osc_string)),
        }
    }

    fn clear(&mut self) {
        self.intermediates.clear();
        self.private_marker = None;
        self.params.clear();
        self.param = 0;
        self.param_has_digit = false;
    }

    fn collect(&mut self, ch: char) {
        if ('<'..='?').contains(&ch) {
            self.private_marker = Some(ch);
        } else if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(ch);
        }
    }

    fn param(&mut self, ch: char) {
        if ch == ';' {
            self.push_param();
            return;
        }
        let digit = (ch as u32).wrapping_sub('0' as u32) as u16;
        self.param = self.param.saturating_mul(10).saturating_add(digit);
        self.param_has_digit = true;
    }

    fn push_param(&mut self) {
        if self.params.len() < MAX_PARAMS {
            self.params.push(self.param);
        }
        self.param = 0;
        self.param_has_digit = false;
    }

    /// Close the parameter list: a trailing parameter exists if it has
    /// digits or follows a separator.
    fn finish_params(&mut self) -> Vec<u16> {
        if self.param_has_digit || !self.params.is_empty() {
            self.push_param();
        }
        std::mem::take(&mut self.params)
    }
}

/// The byte-level terminal parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    utf8: Utf8Decoder,
    machine: StateMachine,
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the parser to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current automaton state
    pub fn state(&self) -> StateId {
        self.machine.state()
    }

    /// True when no escape sequence or UTF-8 sequence is in progress
    pub fn is_ground(&self) -> bool {
        self.machine.state() == StateId::Ground && self.utf8.is_idle()
    }

    /// Process a single byte, appending any resulting actions
    pub fn feed(&mut self, byte: u8, actions: &mut Vec<Action>) {
        let machine = &mut self.machine;
        self.utf8.decode(byte, &mut |ch| {
            let action = machine.input(ch);
            if action != Action::Ignore {
                actions.push(action);
            }
        });
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        for &byte in data {
            self.feed(byte, &mut actions);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csi(action: &Action) -> &CsiAction {
        match action {
            Action::CsiDispatch(csi) => csi,
            other => panic!("Expected CSI action, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_print() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"Hello");
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Print('H'));
        assert_eq!(actions[4], Action::Print('o'));
    }

    #[test]
    fn test_parser_c0_controls() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\r\n\x07\x08\t");
        assert_eq!(
            actions,
            vec![
                Action::Execute(b'\r'),
                Action::Execute(b'\n'),
                Action::Execute(0x07),
                Action::Execute(0x08),
                Action::Execute(b'\t'),
            ]
        );
    }

    #[test]
    fn test_parser_csi_cursor_position() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[10;20H");
        assert_eq!(actions.len(), 1);
        let csi = csi(&actions[0]);
        assert_eq!(csi.final_char, 'H');
        assert_eq!(csi.params, vec![10, 20]);
        assert!(parser.is_ground());
    }

    #[test]
    fn test_parser_csi_missing_params() {
        let mut parser = Parser::new();
        assert!(csi(&parser.parse(b"\x1b[H")[0]).params.is_empty());
        assert_eq!(csi(&parser.parse(b"\x1b[;5H")[0]).params, vec![0, 5]);
        assert_eq!(csi(&parser.parse(b"\x1b[5;H")[0]).params, vec![5, 0]);
        assert_eq!(csi(&parser.parse(b"\x1b[;;;q")[0]).params, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_parser_csi_private_mode() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[?25h");
        let csi = csi(&actions[0]);
        assert_eq!(csi.final_char, 'h');
        assert_eq!(csi.private_marker, Some('?'));
        assert_eq!(csi.params, vec![25]);
    }

    #[test]
    fn test_parser_csi_intermediates() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[!p\x1b[2 q");
        assert_eq!(csi(&actions[0]).intermediates, vec!['!']);
        assert_eq!(csi(&actions[1]).intermediates, vec![' ']);
        assert_eq!(csi(&actions[1]).params, vec![2]);
    }

    #[test]
    fn test_parser_param_saturates() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[99999999A");
        assert_eq!(csi(&actions[0]).params, vec![u16::MAX]);
    }

    #[test]
    fn test_parser_colon_spoils_sequence() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[38:5:1mX");
        assert_eq!(actions, vec![Action::Print('X')]);
    }

    #[test]
    fn test_parser_c0_inside_csi_executes() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[1\r2H");
        assert_eq!(actions[0], Action::Execute(b'\r'));
        assert_eq!(csi(&actions[1]).params, vec![12]);
    }

    #[test]
    fn test_parser_escape_resynchronizes() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[12\x1b[3Cx");
        assert_eq!(actions.len(), 2);
        assert_eq!(csi(&actions[0]).params, vec![3]);
        assert_eq!(actions[1], Action::Print('x'));
    }

    #[test]
    fn test_parser_c1_csi_code_point() {
        let mut parser = Parser::new();
        // U+009B encoded as UTF-8
        let actions = parser.parse(b"\xc2\x9b5B");
        assert_eq!(csi(&actions[0]).final_char, 'B');
        assert_eq!(csi(&actions[0]).params, vec![5]);
    }

    #[test]
    fn test_parser_raw_c1_byte_is_replacement() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x9b5B");
        assert_eq!(
            actions,
            vec![Action::Print('\u{fffd}'), Action::Print('5'), Action::Print('B')]
        );
    }

    #[test]
    fn test_parser_esc_dispatch() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b7\x1b#8\x1b(0");
        assert_eq!(
            actions,
            vec![
                Action::EscDispatch(EscAction {
                    intermediates: vec![],
                    final_char: '7'
                }),
                Action::EscDispatch(EscAction {
                    intermediates: vec!['#'],
                    final_char: '8'
                }),
                Action::EscDispatch(EscAction {
                    intermediates: vec!['('],
                    final_char: '0'
                }),
            ]
        );
    }

    #[test]
    fn test_parser_osc_title_bel() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b]0;My Title\x07");
        assert_eq!(actions, vec![Action::OscString("0;My Title".to_string())]);
    }

    #[test]
    fn test_parser_osc_title_st() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b]2;Title\x1b\\");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], Action::OscString("2;Title".to_string()));
        // The ST itself is a harmless ESC dispatch
        assert!(matches!(&actions[1], Action::EscDispatch(esc) if esc.final_char == '\\'));
        assert!(parser.is_ground());
    }

    #[test]
    fn test_parser_osc_utf8_payload() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b]2;日本\x07".as_bytes());
        assert_eq!(actions, vec![Action::OscString("2;日本".to_string())]);
    }

    #[test]
    fn test_parser_cancel_abandons_osc() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b]0;abc\x18d");
        assert_eq!(actions, vec![Action::Execute(0x18), Action::Print('d')]);
    }

    #[test]
    fn test_parser_osc_length_capped() {
        let mut parser = Parser::new();
        let mut input = b"\x1b]2;".to_vec();
        input.extend(std::iter::repeat(b'a').take(10_000));
        input.push(0x07);
        let actions = parser.parse(&input);
        match &actions[0] {
            Action::OscString(s) => assert_eq!(s.len(), MAX_STRING_LEN),
            other => panic!("Expected OSC, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_dcs_sequence() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1bP1$qm\x1b\\");
        match &actions[0] {
            Action::DcsSequence(dcs) => {
                assert_eq!(dcs.params, vec![1]);
                assert_eq!(dcs.intermediates, vec!['$']);
                assert_eq!(dcs.final_char, 'q');
                assert_eq!(dcs.data, "m");
            }
            other => panic!("Expected DCS, got {:?}", other),
        }
        assert!(parser.is_ground());
    }

    #[test]
    fn test_parser_sos_pm_apc_swallowed() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b_hidden\x1b\\ok");
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[1], Action::Print('o'));
        assert_eq!(actions[2], Action::Print('k'));
    }

    #[test]
    fn test_parser_chunked_input() {
        let mut parser = Parser::new();
        let mut actions = Vec::new();
        for chunk in [&b"\x1b"[..], b"[", b"3", b"1", b"m", b"\xe4\xb8", b"\xad"] {
            actions.extend(parser.parse(chunk));
        }
        assert_eq!(actions.len(), 2);
        assert_eq!(csi(&actions[0]).params, vec![31]);
        assert_eq!(actions[1], Action::Print('中'));
    }

    #[test]
    fn test_parser_truncated_utf8_then_escape() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\xe4\xb8\x1b[A");
        assert_eq!(actions[0], Action::Print('\u{fffd}'));
        assert_eq!(csi(&actions[1]).final_char, 'A');
    }

    #[test]
    fn test_state_machine_one_action_per_input() {
        let mut machine = StateMachine::new();
        let produced: Vec<Action> = "\x1b[1;2Hab".chars().map(|c| machine.input(c)).collect();
        assert_eq!(produced.len(), 8);
        assert_eq!(
            produced.iter().filter(|a| **a != Action::Ignore).count(),
            3
        );
        assert_eq!(machine.state(), StateId::Ground);
    }
}
