//! The `{0, 1, X_k}` gate-value algebra (SPEC_FULL.md §3, §4.3).
//!
//! A `Value` is `0`, `1`, or an X-tag (any integer `>= 2`). X-tags are allocated in
//! consecutive even/odd pairs by [`XAllocator`]; an even tag and the following odd
//! tag are complements of the same unknown signal.

use std::fmt;

const FIRST_X_TAG: u32 = 4;

/// A single three-valued gate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value(u32);

impl Value {
    pub const ZERO: Value = Value(0);
    pub const ONE: Value = Value(1);

    /// Wraps a raw X-tag. `tag` must be `>= 4`; use [`Value::ZERO`]/[`Value::ONE`] for constants.
    pub fn x_tag(tag: u32) -> Value {
        debug_assert!(tag >= FIRST_X_TAG, "raw X-tags start at {}", FIRST_X_TAG);
        Value(tag)
    }

    pub fn from_bool(b: bool) -> Value {
        if b {
            Value::ONE
        } else {
            Value::ZERO
        }
    }

    pub fn is_const(self) -> bool {
        self.0 < 2
    }

    pub fn is_x(self) -> bool {
        self.0 >= FIRST_X_TAG
    }

    pub fn as_bool(self) -> Option<bool> {
        match self.0 {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Logical negation: `0<->1`, and an X-tag maps to its paired complement.
    pub fn complement(self) -> Value {
        match self.0 {
            0 => Value(1),
            1 => Value(0),
            t if t & 1 == 1 => Value(t - 1),
            t => Value(t + 1),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_bool() {
            Some(true) => write!(f, "1"),
            Some(false) => write!(f, "0"),
            None => write!(f, "X"),
        }
    }
}

/// Per-circuit counter handing out fresh, pairwise-distinguishable X-tags.
///
/// Starts at 4 so `0`/`1` stay reserved for the constants. [`checkpoint`]/[`restore`]
/// let the simulator rewind to a prior allocation point (used to reproduce the
/// baseline all-X simulation's tags across learner iterations) without reusing a tag
/// that has already been handed to a *different* simulation pass.
///
/// [`checkpoint`]: XAllocator::checkpoint
/// [`restore`]: XAllocator::restore
#[derive(Debug, Clone)]
pub struct XAllocator {
    next: u32,
}

impl XAllocator {
    pub fn new() -> XAllocator {
        XAllocator { next: FIRST_X_TAG }
    }

    /// Allocates a fresh even tag; its complement is `tag + 1`.
    pub fn fresh(&mut self) -> Value {
        let tag = self.next;
        self.next += 2;
        Value(tag)
    }

    pub fn checkpoint(&self) -> u32 {
        self.next
    }

    pub fn restore(&mut self, checkpoint: u32) {
        self.next = checkpoint;
    }
}

impl Default for XAllocator {
    fn default() -> Self {
        XAllocator::new()
    }
}
