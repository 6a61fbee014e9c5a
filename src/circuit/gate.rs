use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Amount of fanin/fanout kept inline before a [Gate] spills its adjacency to the heap.
///
/// Most gates in a gate-level netlist are 2-input; this keeps the common case pointer-free.
const GATE_ADJACENCY_TINYVEC_SIZE: usize = 2;

/// Index of a gate within a [Circuit](super::Circuit). Gate `0` is a reserved sentinel
/// (the original tool's 1-based `netnum` convention); real gates occupy `1..N`.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct GateId(pub(super) u32);

impl GateId {
    pub const fn new(idx: u32) -> GateId {
        GateId(idx)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl Display for GateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The gate-kind enumeration, following the original tool's on-disk `.lev` numbering
/// (SPEC_FULL.md §6) so the netlist loader can map the file's integer straight to a
/// variant without an intermediate table.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GateKind {
    Input = 1,
    Output = 2,
    Xor = 3,
    Xnor = 4,
    Dff = 5,
    And = 6,
    Nand = 7,
    Or = 8,
    Nor = 9,
    Not = 10,
    Buf = 11,
    Tie1 = 12,
    Tie0 = 13,
    TieX = 14,
    TieZ = 15,
}

impl GateKind {
    /// Parses the on-disk kind code. Codes `0` and `16` and above (muxes, buses, tristates
    /// in the original tool) have no evaluator semantics here and are rejected.
    pub fn from_code(code: u32) -> Option<GateKind> {
        use GateKind::*;
        Some(match code {
            1 => Input,
            2 => Output,
            3 => Xor,
            4 => Xnor,
            5 => Dff,
            6 => And,
            7 => Nand,
            8 => Or,
            9 => Nor,
            10 => Not,
            11 => Buf,
            12 => Tie1,
            13 => Tie0,
            14 => TieX,
            15 => TieZ,
            _ => return None,
        })
    }

    /// The expected fanin arity for this kind, for netlist validation; `None` means "any".
    pub fn expected_arity(&self) -> ExpectedArity {
        use GateKind::*;
        match self {
            And | Nand | Or | Nor => ExpectedArity::AtLeast(1),
            Xor | Xnor => ExpectedArity::OneOrTwo,
            Not | Buf | Output | Dff => ExpectedArity::Exactly(1),
            Input | Tie0 | Tie1 | TieX | TieZ => ExpectedArity::Exactly(0),
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, GateKind::Tie0 | GateKind::Tie1)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ExpectedArity {
    Exactly(usize),
    AtLeast(usize),
    OneOrTwo,
}

impl ExpectedArity {
    pub fn matches(self, count: usize) -> bool {
        match self {
            ExpectedArity::Exactly(n) => count == n,
            ExpectedArity::AtLeast(n) => count >= n,
            ExpectedArity::OneOrTwo => count == 1 || count == 2,
        }
    }
}

impl Display for ExpectedArity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedArity::Exactly(n) => write!(f, "exactly {}", n),
            ExpectedArity::AtLeast(n) => write!(f, "at least {}", n),
            ExpectedArity::OneOrTwo => write!(f, "1 or 2"),
        }
    }
}

impl Display for GateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use GateKind::*;
        let name = match self {
            Input => "Primary Input",
            Output => "Primary Output",
            Xor => "XOR",
            Xnor => "XNOR",
            Dff => "D Flip Flop",
            And => "AND",
            Nand => "NAND",
            Or => "OR",
            Nor => "NOR",
            Not => "Inverter",
            Buf => "Buffer",
            Tie1 => "Tie-1",
            Tie0 => "Tie-0",
            TieX => "Tie-X",
            TieZ => "Tie-Z",
        };
        write!(f, "{}", name)
    }
}

pub(super) type Adjacency = SmallVec<[GateId; GATE_ADJACENCY_TINYVEC_SIZE]>;

/// A single immutable gate record (SPEC_FULL.md §3).
#[derive(Debug, Clone)]
pub struct Gate {
    pub(super) kind: GateKind,
    pub(super) fanin: Adjacency,
    pub(super) fanout: Adjacency,
    pub(super) level: u32,
}
