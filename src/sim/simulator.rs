//! The simulation driver (C4, SPEC_FULL.md §4.4).

use super::eval::{eval_and, eval_or, eval_xor};
use super::wheel::EventWheel;
use crate::circuit::{Circuit, GateId, GateKind};
use crate::literal::Literal;
use crate::value::{Value, XAllocator};
use smallvec::SmallVec;

/// One primary-input symbol, as accepted by [`Simulator::apply_vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSymbol {
    Zero,
    One,
    X,
}

/// Drives `circuit` through repeated input assignments, owning the mutable
/// simulation state the circuit itself does not (SPEC_FULL.md §3 "Circuit state").
pub struct Simulator<'c> {
    circuit: &'c Circuit,
    values: Vec<Value>,
    xalloc: XAllocator,
    wheel: EventWheel,
    changes: Vec<Literal>,
    ff_next_state: Vec<Value>,
    num_simulations: u64,
}

impl<'c> Simulator<'c> {
    pub fn new(circuit: &'c Circuit) -> Simulator<'c> {
        let n = circuit.len();
        let values = (0..=n as u32)
            .map(|i| circuit.initial_value(GateId::new(i)))
            .collect();
        Simulator {
            circuit,
            values,
            xalloc: XAllocator::new(),
            wheel: EventWheel::new(n, circuit.max_level()),
            changes: Vec::new(),
            ff_next_state: vec![Value::x_tag(4); circuit.flip_flops().len()],
            num_simulations: 0,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        self.circuit
    }

    pub fn value(&self, g: GateId) -> Value {
        self.values[g.index()]
    }

    pub fn num_simulations(&self) -> u64 {
        self.num_simulations
    }

    pub fn changes(&self) -> &[Literal] {
        &self.changes
    }

    pub fn take_changes(&mut self) -> Vec<Literal> {
        std::mem::take(&mut self.changes)
    }

    pub fn x_checkpoint(&self) -> u32 {
        self.xalloc.checkpoint()
    }

    /// Resets `value` to `orig`, rewinds the X-allocator to `x_checkpoint`, clears
    /// the event wheel and the changes buffer (SPEC_FULL.md §4.6 Phase B step 1).
    pub fn reset_to(&mut self, orig: &[Value], x_checkpoint: u32) {
        self.values.copy_from_slice(orig);
        self.xalloc.restore(x_checkpoint);
        self.wheel.reset();
        self.changes.clear();
    }

    pub fn snapshot_values(&self) -> Vec<Value> {
        self.values.clone()
    }

    /// Forces `lit`'s gate to `lit`'s value and enqueues its successors, without
    /// running a simulation pass (used by the learner to seed a closure's gates
    /// before draining, SPEC_FULL.md §4.6 Phase B step 3).
    pub fn force_literal(&mut self, lit: Literal) {
        let g = lit.gate();
        self.values[g.index()] = Value::from_bool(lit.value());
        for &succ in self.circuit.fanout(g) {
            self.wheel.insert(succ, self.circuit.level(succ));
        }
    }

    /// Seeds `g`'s value directly and enqueues its successors, without requiring `g`
    /// to have a predecessor driving it first. `None` allocates a fresh X-tag. Used to
    /// load a flip-flop's power-up reset state before the first drain (SPEC_FULL.md §6).
    pub fn seed_gate_value(&mut self, g: GateId, value: Option<bool>) {
        self.values[g.index()] = match value {
            Some(b) => Value::from_bool(b),
            None => self.xalloc.fresh(),
        };
        for &succ in self.circuit.fanout(g) {
            self.wheel.insert(succ, self.circuit.level(succ));
        }
    }

    /// Assigns `bits` to the primary inputs in order, ignoring any symbols past
    /// `numpri` (SPEC_FULL.md §9, corrected open question on vector length).
    pub fn apply_vector(&mut self, bits: &[InputSymbol]) {
        for (&pi, &bit) in self.circuit.inputs().iter().zip(bits) {
            let new_val = match bit {
                InputSymbol::Zero => Value::ZERO,
                InputSymbol::One => Value::ONE,
                InputSymbol::X => self.xalloc.fresh(),
            };
            self.values[pi.index()] = new_val;
            for &succ in self.circuit.fanout(pi) {
                self.wheel.insert(succ, self.circuit.level(succ));
            }
        }
    }

    fn gather(&self, ids: &[GateId]) -> SmallVec<[Value; 2]> {
        ids.iter().map(|&id| self.values[id.index()]).collect()
    }

    fn eval_gate(&mut self, g: GateId) -> Value {
        match self.circuit.kind(g) {
            GateKind::And => eval_and(&self.gather(self.circuit.fanin(g)), &mut self.xalloc),
            GateKind::Nand => {
                eval_and(&self.gather(self.circuit.fanin(g)), &mut self.xalloc).complement()
            }
            GateKind::Or => eval_or(&self.gather(self.circuit.fanin(g)), &mut self.xalloc),
            GateKind::Nor => {
                eval_or(&self.gather(self.circuit.fanin(g)), &mut self.xalloc).complement()
            }
            GateKind::Xor => {
                let fanin = self.circuit.fanin(g);
                let a = self.values[fanin[0].index()];
                let b = if fanin.len() > 1 {
                    self.values[fanin[1].index()]
                } else {
                    a
                };
                eval_xor(a, b, &mut self.xalloc)
            }
            GateKind::Xnor => {
                let fanin = self.circuit.fanin(g);
                let a = self.values[fanin[0].index()];
                let b = if fanin.len() > 1 {
                    self.values[fanin[1].index()]
                } else {
                    a
                };
                eval_xor(a, b, &mut self.xalloc).complement()
            }
            GateKind::Not => self.values[self.circuit.fanin(g)[0].index()].complement(),
            GateKind::Buf | GateKind::Output | GateKind::Dff => {
                self.values[self.circuit.fanin(g)[0].index()]
            }
            GateKind::Input | GateKind::Tie0 | GateKind::Tie1 | GateKind::TieX | GateKind::TieZ => {
                self.values[g.index()]
            }
        }
    }

    /// Drains the event wheel to completion, recording value changes and, if
    /// `verbose`, printing the primary-output projection (SPEC_FULL.md §4.4).
    ///
    /// Once the drain settles, every flip-flop's next state is sampled from its
    /// (now-stable) predecessor, and any flip-flop re-activated along the way is
    /// staged back into bucket `0` so the next call evaluates it again.
    pub fn good_sim(&mut self, verbose: bool) {
        self.num_simulations += 1;

        while let Some(g) = self.wheel.retrieve() {
            let new_val = self.eval_gate(g);
            if new_val != self.values[g.index()] {
                self.values[g.index()] = new_val;
                if let Some(bit) = new_val.as_bool() {
                    self.changes.push(Literal::new(g, bit));
                }
                for &succ in self.circuit.fanout(g) {
                    self.wheel.propagate(succ, self.circuit.level(succ));
                }
            }
        }

        self.wheel.finish_drain();

        for (pos, &ff) in self.circuit.flip_flops().iter().enumerate() {
            let predecessor = self.circuit.fanin(ff)[0];
            self.ff_next_state[pos] = self.values[predecessor.index()];
        }

        if verbose {
            log::debug!("output: {}", self.po_projection());
        }
    }

    pub fn po_projection(&self) -> String {
        self.circuit
            .outputs()
            .iter()
            .map(|&g| self.values[g.index()].to_string())
            .collect()
    }

    pub fn ff_state_projection(&self) -> String {
        self.ff_next_state.iter().map(Value::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::GateSpec;

    fn gid(n: u32) -> GateId {
        GateId::new(n)
    }

    fn and_circuit() -> Circuit {
        // PI 1, PI 2, AND 3 <- {1,2}, OUTPUT 4 <- {3}
        Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::And, 1, vec![gid(1), gid(2)]),
            GateSpec::new(GateKind::Output, 2, vec![gid(3)]),
        ])
        .unwrap()
    }

    #[test]
    fn and_gate_truth_table() {
        let c = and_circuit();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::One, InputSymbol::One]);
        sim.good_sim(false);
        assert_eq!(sim.po_projection(), "1");

        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::One, InputSymbol::Zero]);
        sim.good_sim(false);
        assert_eq!(sim.po_projection(), "0");
    }

    #[test]
    fn all_x_gives_x_output() {
        let c = and_circuit();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::X, InputSymbol::X]);
        sim.good_sim(false);
        assert_eq!(sim.po_projection(), "X");
    }

    #[test]
    fn x_and_zero_is_zero() {
        let c = and_circuit();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::X, InputSymbol::Zero]);
        sim.good_sim(false);
        assert_eq!(sim.po_projection(), "0");
    }

    #[test]
    fn inverter_chain_preserves_x_identity() {
        // PI 1 -> NOT 2 -> NOT 3 -> OUTPUT 4
        let c = Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Not, 1, vec![gid(1)]),
            GateSpec::new(GateKind::Not, 2, vec![gid(2)]),
            GateSpec::new(GateKind::Output, 3, vec![gid(3)]),
        ])
        .unwrap();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::X]);
        sim.good_sim(false);
        assert_eq!(sim.value(gid(4)), sim.value(gid(1)));
    }

    #[test]
    fn xor_of_same_pi_cancels() {
        // PI 1, XOR 2 <- {1,1}, OUTPUT 3
        let c = Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Xor, 1, vec![gid(1), gid(1)]),
            GateSpec::new(GateKind::Output, 2, vec![gid(2)]),
        ])
        .unwrap();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::X]);
        sim.good_sim(false);
        assert_eq!(sim.po_projection(), "0");
    }

    #[test]
    fn complementary_x_through_and_squashes_to_zero() {
        // PI 1, NOT 2 <- {1}, AND 3 <- {1,2}, OUTPUT 4
        let c = Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Not, 1, vec![gid(1)]),
            GateSpec::new(GateKind::And, 2, vec![gid(1), gid(2)]),
            GateSpec::new(GateKind::Output, 3, vec![gid(3)]),
        ])
        .unwrap();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::X]);
        sim.good_sim(false);
        assert_eq!(sim.po_projection(), "0");
    }

    #[test]
    fn dff_feedback_is_staged_for_next_drain() {
        // PI 1, DFF 2 <- {1} at level 0, OUTPUT 3 <- {2}
        let c = Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Dff, 0, vec![gid(1)]),
            GateSpec::new(GateKind::Output, 1, vec![gid(2)]),
        ])
        .unwrap();
        let mut sim = Simulator::new(&c);
        sim.apply_vector(&[InputSymbol::One]);
        sim.good_sim(false);
        // The DFF's own value does not update mid-drain; its next state is recorded
        // separately and takes effect only on the following simulation.
        assert_eq!(sim.ff_state_projection(), "1");
    }
}
