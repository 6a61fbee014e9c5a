//! Event-driven three-valued simulation (C2-C4, SPEC_FULL.md §4.2-§4.4).

mod eval;
mod simulator;
mod wheel;

pub use eval::{eval_and, eval_or, eval_xor};
pub use simulator::{InputSymbol, Simulator};
pub use wheel::EventWheel;
