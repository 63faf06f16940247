//! Parser transition tables
//!
//! The automaton is an arena of fourteen states indexed by [`StateId`].
//! Each state carries an entry op and a 256-entry table of transitions
//! indexed by code point (anything above 0xFF is looked up at 0xFF). The
//! whole arena is built by `const` evaluation and lives in a `static`, so
//! a transition is a plain two-byte value with no ownership attached.
//!
//! Layout follows "A parser for DEC's ANSI-compatible video terminals" by
//! Paul Williams (<https://vt100.net/emu/dec_ansi_parser>), with the
//! "anywhere" transitions folded into every table.

/// Identity of a parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    DcsEntry,
    DcsParam,
    DcsIntermediate,
    DcsPassthrough,
    DcsIgnore,
    OscString,
    SosPmApcString,
}

pub(crate) const STATE_COUNT: usize = 14;

/// Internal action tag executed on a transition or on entering a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Ignore,
    Print,
    Execute,
    Clear,
    Collect,
    Param,
    EscDispatch,
    CsiDispatch,
    Hook,
    Put,
    Unhook,
    OscStart,
    OscPut,
    OscEnd,
}

/// What to do with one input and where to go next. `next == None` means
/// stay in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub op: Op,
    pub next: Option<StateId>,
}

impl Transition {
    const fn stay(op: Op) -> Self {
        Self { op, next: None }
    }

    const fn to(op: Op, next: StateId) -> Self {
        Self {
            op,
            next: Some(next),
        }
    }
}

pub(crate) struct State {
    pub entry: Op,
    table: [Transition; 256],
}

impl State {
    pub fn transition(&self, ch: char) -> Transition {
        let index = (ch as u32).min(0xFF) as usize;
        self.table[index]
    }
}

type Table = [Transition; 256];

const IGNORE: Transition = Transition::stay(Op::Ignore);

const fn fill(mut t: Table, lo: usize, hi: usize, tr: Transition) -> Table {
    let mut i = lo;
    while i <= hi {
        t[i] = tr;
        i += 1;
    }
    t
}

const fn set(mut t: Table, i: usize, tr: Transition) -> Table {
    t[i] = tr;
    t
}

/// C0 controls other than CAN, SUB and ESC
const fn c0(t: Table, tr: Transition) -> Table {
    let t = fill(t, 0x00, 0x17, tr);
    let t = set(t, 0x19, tr);
    fill(t, 0x1C, 0x1F, tr)
}

/// Parameter bytes: digits and ';' collect, ':' and the private markers
/// (only legal first) spoil the sequence
const fn params(t: Table, param: Transition, spoil: Transition) -> Table {
    let t = fill(t, 0x30, 0x39, param);
    let t = set(t, 0x3B, param);
    let t = set(t, 0x3A, spoil);
    fill(t, 0x3C, 0x3F, spoil)
}

/// A table holding only the transitions valid from any state
const fn anywhere() -> Table {
    let ground_exec = Transition::to(Op::Execute, StateId::Ground);
    let t = [IGNORE; 256];
    let t = set(t, 0x18, ground_exec);
    let t = set(t, 0x1A, ground_exec);
    let t = set(t, 0x1B, Transition::to(Op::Ignore, StateId::Escape));
    let t = fill(t, 0x80, 0x8F, ground_exec);
    let t = set(t, 0x90, Transition::to(Op::Ignore, StateId::DcsEntry));
    let t = fill(t, 0x91, 0x97, ground_exec);
    let t = set(t, 0x98, Transition::to(Op::Ignore, StateId::SosPmApcString));
    let t = set(t, 0x99, ground_exec);
    let t = set(t, 0x9A, ground_exec);
    let t = set(t, 0x9B, Transition::to(Op::Ignore, StateId::CsiEntry));
    let t = set(t, 0x9C, Transition::to(Op::Ignore, StateId::Ground));
    let t = set(t, 0x9D, Transition::to(Op::Ignore, StateId::OscString));
    let t = set(t, 0x9E, Transition::to(Op::Ignore, StateId::SosPmApcString));
    set(t, 0x9F, Transition::to(Op::Ignore, StateId::SosPmApcString))
}

const fn ground() -> State {
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x20, 0x7E, Transition::stay(Op::Print));
    let t = fill(t, 0xA0, 0xFF, Transition::stay(Op::Print));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn escape() -> State {
    let dispatch = Transition::to(Op::EscDispatch, StateId::Ground);
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x20, 0x2F, Transition::to(Op::Collect, StateId::EscapeIntermediate));
    let t = fill(t, 0x30, 0x7E, dispatch);
    let t = set(t, 0x50, Transition::to(Op::Ignore, StateId::DcsEntry));
    let t = set(t, 0x58, Transition::to(Op::Ignore, StateId::SosPmApcString));
    let t = set(t, 0x5B, Transition::to(Op::Ignore, StateId::CsiEntry));
    let t = set(t, 0x5D, Transition::to(Op::Ignore, StateId::OscString));
    let t = set(t, 0x5E, Transition::to(Op::Ignore, StateId::SosPmApcString));
    let t = set(t, 0x5F, Transition::to(Op::Ignore, StateId::SosPmApcString));
    State {
        entry: Op::Clear,
        table: t,
    }
}

const fn escape_intermediate() -> State {
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x20, 0x2F, Transition::stay(Op::Collect));
    let t = fill(t, 0x30, 0x7E, Transition::to(Op::EscDispatch, StateId::Ground));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn csi_entry() -> State {
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x20, 0x2F, Transition::to(Op::Collect, StateId::CsiIntermediate));
    let t = params(
        t,
        Transition::to(Op::Param, StateId::CsiParam),
        Transition::to(Op::Ignore, StateId::CsiIgnore),
    );
    let t = fill(t, 0x3C, 0x3F, Transition::to(Op::Collect, StateId::CsiParam));
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::CsiDispatch, StateId::Ground));
    State {
        entry: Op::Clear,
        table: t,
    }
}

const fn csi_param() -> State {
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x20, 0x2F, Transition::to(Op::Collect, StateId::CsiIntermediate));
    let t = params(
        t,
        Transition::stay(Op::Param),
        Transition::to(Op::Ignore, StateId::CsiIgnore),
    );
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::CsiDispatch, StateId::Ground));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn csi_intermediate() -> State {
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x20, 0x2F, Transition::stay(Op::Collect));
    let t = fill(t, 0x30, 0x3F, Transition::to(Op::Ignore, StateId::CsiIgnore));
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::CsiDispatch, StateId::Ground));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn csi_ignore() -> State {
    let t = c0(anywhere(), Transition::stay(Op::Execute));
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::Ignore, StateId::Ground));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn dcs_entry() -> State {
    let t = fill(anywhere(), 0x20, 0x2F, Transition::to(Op::Collect, StateId::DcsIntermediate));
    let t = params(
        t,
        Transition::to(Op::Param, StateId::DcsParam),
        Transition::to(Op::Ignore, StateId::DcsIgnore),
    );
    let t = fill(t, 0x3C, 0x3F, Transition::to(Op::Collect, StateId::DcsParam));
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::Ignore, StateId::DcsPassthrough));
    State {
        entry: Op::Clear,
        table: t,
    }
}

const fn dcs_param() -> State {
    let t = fill(anywhere(), 0x20, 0x2F, Transition::to(Op::Collect, StateId::DcsIntermediate));
    let t = params(
        t,
        Transition::stay(Op::Param),
        Transition::to(Op::Ignore, StateId::DcsIgnore),
    );
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::Ignore, StateId::DcsPassthrough));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn dcs_intermediate() -> State {
    let t = fill(anywhere(), 0x20, 0x2F, Transition::stay(Op::Collect));
    let t = fill(t, 0x30, 0x3F, Transition::to(Op::Ignore, StateId::DcsIgnore));
    let t = fill(t, 0x40, 0x7E, Transition::to(Op::Ignore, StateId::DcsPassthrough));
    State {
        entry: Op::Ignore,
        table: t,
    }
}

const fn dcs_passthrough() -> State {
    let put = Transition::stay(Op::Put);
    let t = c0(anywhere(), put);
    let t = fill(t, 0x20, 0x7E, put);
    let t = fill(t, 0xA0, 0xFF, put);
    let t = set(t, 0x1B, Transition::to(Op::Unhook, StateId::Escape));
    let t = set(t, 0x9C, Transition::to(Op::Unhook, StateId::Ground));
    State {
        entry: Op::Hook,
        table: t,
    }
}

const fn dcs_ignore() -> State {
    State {
        entry: Op::Ignore,
        table: anywhere(),
    }
}

const fn osc_string() -> State {
    let put = Transition::stay(Op::OscPut);
    let t = fill(anywhere(), 0x20, 0x7E, put);
    let t = fill(t, 0xA0, 0xFF, put);
    let t = set(t, 0x07, Transition::to(Op::OscEnd, StateId::Ground));
    let t = set(t, 0x1B, Transition::to(Op::OscEnd, StateId::Escape));
    let t = set(t, 0x9C, Transition::to(Op::OscEnd, StateId::Ground));
    State {
        entry: Op::OscStart,
        table: t,
    }
}

const fn sos_pm_apc_string() -> State {
    State {
        entry: Op::Ignore,
        table: anywhere(),
    }
}

/// The automaton, indexed by `StateId as usize`
pub(crate) static STATES: [State; STATE_COUNT] = [
    ground(),
    escape(),
    escape_intermediate(),
    csi_entry(),
    csi_param(),
    csi_intermediate(),
    csi_ignore(),
    dcs_entry(),
    dcs_param(),
    dcs_intermediate(),
    dcs_passthrough(),
    dcs_ignore(),
    osc_string(),
    sos_pm_apc_string(),
];

pub(crate) fn state(id: StateId) -> &'static State {
    &STATES[id as usize]
}
