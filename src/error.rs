//! Typed errors crossing the netlist/REPL boundary (see SPEC_FULL.md §10.1).

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong loading a `.lev` netlist or a `.initState` file.
#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("can't open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {record}: {message}")]
    Malformed {
        record: &'static str,
        message: String,
    },

    #[error("gate {gate} references out-of-range fanin {fanin}")]
    InvalidFanin { gate: u32, fanin: u32 },

    #[error("gate {gate} has unknown gate-kind code {code}")]
    UnknownGateKind { gate: u32, code: u32 },

    #[error("gate {gate} of kind {kind} has {count} fanin, expected {expected}")]
    ArityMismatch {
        gate: u32,
        kind: crate::circuit::GateKind,
        count: usize,
        expected: crate::circuit::ExpectedArity,
    },

    #[error("level {level} on gate {gate} exceeds configured maximum {max}")]
    LevelBoundExceeded { gate: u32, level: u32, max: u32 },

    #[error("fanin count {count} for gate {gate} exceeds configured maximum {max}")]
    FaninBoundExceeded { gate: u32, count: usize, max: usize },

    #[error("fanout count {count} for gate {gate} exceeds configured maximum {max}")]
    FanoutBoundExceeded { gate: u32, count: usize, max: usize },

    #[error("circuit has {count} flip-flops, exceeding configured maximum {max}")]
    FlipFlopBoundExceeded { count: usize, max: usize },

    #[error("circuit has {count} tied nodes, exceeding configured maximum {max}")]
    TieBoundExceeded { count: usize, max: usize },
}

/// Local, non-fatal errors from a single REPL command (see SPEC_FULL.md §7 items 4-5).
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid gate number {0}")]
    BadGateNumber(String),

    #[error("gate {0} is out of range")]
    GateOutOfRange(u32),

    #[error("invalid implication value (must be 0 or 1)")]
    BadLiteralValue,

    #[error("bad input value '{0}'")]
    BadVectorChar(char),

    #[error("bad input vector, too few values (need at least {needed})")]
    VectorTooShort { needed: usize },
}
