//! Learns the implication graph from gate structure and repeated simulation
//! (C6, SPEC_FULL.md §4.6).

use super::ImplicationDb;
use crate::circuit::{Circuit, GateId, GateKind};
use crate::literal::Literal;
use crate::sim::{InputSymbol, Simulator};
use std::time::Instant;

/// Counters and timings from a completed [`Learner::learn`] run, surfaced to the
/// `stats` REPL command (SPEC_FULL.md §4.6, §7).
#[derive(Debug, Clone, Copy, Default)]
pub struct LearnerStats {
    pub num_indirect_implications: u64,
    pub fixed_node_counter: u64,
    pub num_simulations: u64,
    pub elapsed_ms_direct: u64,
    pub elapsed_ms_indirect: u64,
}

/// Drives a [`Simulator`] to build an [`ImplicationDb`] for `circuit`: structural
/// (Phase A) implications first, then simulation-discovered (Phase B) ones.
pub struct Learner<'c> {
    sim: Simulator<'c>,
    db: ImplicationDb,
}

impl<'c> Learner<'c> {
    pub fn new(circuit: &'c Circuit) -> Learner<'c> {
        Learner {
            sim: Simulator::new(circuit),
            db: ImplicationDb::new(circuit.len()),
        }
    }

    pub fn db(&self) -> &ImplicationDb {
        &self.db
    }

    pub fn simulator(&self) -> &Simulator<'c> {
        &self.sim
    }

    /// Consumes the learner, handing ownership of the learned graph to the caller.
    pub fn into_db(self) -> ImplicationDb {
        self.db
    }

    /// Runs both learning phases and returns the combined statistics.
    pub fn learn(&mut self) -> LearnerStats {
        let direct_start = Instant::now();
        self.seed_direct_implications();
        let elapsed_ms_direct = direct_start.elapsed().as_millis() as u64;
        log::info!("finished finding all direct implications");

        let indirect_start = Instant::now();
        let (num_indirect_implications, fixed_node_counter) = self.learn_indirect_implications();
        let elapsed_ms_indirect = indirect_start.elapsed().as_millis() as u64;
        log::info!("finished finding all indirect implications");

        LearnerStats {
            num_indirect_implications,
            fixed_node_counter,
            num_simulations: self.sim.num_simulations(),
            elapsed_ms_direct,
            elapsed_ms_indirect,
        }
    }

    /// Phase A: seeds each literal's reflexive self-implication plus the structural
    /// implications its gate type gives for free, along with their contrapositives
    /// (SPEC_FULL.md §4.6 Phase A).
    fn seed_direct_implications(&mut self) {
        for g in self.sim.circuit().gate_ids() {
            for &value in &[false, true] {
                let lit = Literal::new(g, value);
                self.db.insert(lit, lit);
                for implied in structural_implications(self.sim.circuit(), lit) {
                    self.db.insert(lit, implied);
                    self.db.insert(implied.complement(), lit.complement());
                }
            }
        }
    }

    /// Phase B: for every literal, repeatedly close it over the current implication
    /// graph, force the closure, and simulate; newly-derived constants are folded back
    /// into the graph and the process repeats until a pass yields nothing new. A
    /// closure that contradicts itself marks the literal as fixed (unreachable) and its
    /// direct edges are discarded (SPEC_FULL.md §4.6 Phase B).
    fn learn_indirect_implications(&mut self) -> (u64, u64) {
        let all_x: Vec<InputSymbol> = vec![InputSymbol::X; self.sim.circuit().inputs().len()];
        self.sim.apply_vector(&all_x);
        self.sim.good_sim(false);
        let baseline_values = self.sim.snapshot_values();
        let baseline_x_checkpoint = self.sim.x_checkpoint();

        let mut num_indirect_implications = 0u64;
        let mut fixed_node_counter = 0u64;

        for g in self.sim.circuit().gate_ids() {
            for &value in &[false, true] {
                let seed = Literal::new(g, value);
                loop {
                    self.sim.reset_to(&baseline_values, baseline_x_checkpoint);
                    let closure = self.db.close(seed);
                    if closure.contradiction {
                        self.db.clear(seed);
                        fixed_node_counter += 1;
                        break;
                    }
                    for &lit in &closure.literals {
                        self.sim.force_literal(lit);
                    }
                    self.sim.good_sim(false);
                    let changes = self.sim.take_changes();
                    if changes.is_empty() {
                        break;
                    }
                    num_indirect_implications += changes.len() as u64;
                    for lit in changes {
                        self.db.insert(seed, lit);
                    }
                }
            }
        }

        (num_indirect_implications, fixed_node_counter)
    }
}

/// The first-level implications a gate's type gives "for free", with no simulation
/// needed: what must its fanin be, for it to already sit at `lit`'s value.
fn structural_implications(circuit: &Circuit, lit: Literal) -> Vec<Literal> {
    let g = lit.gate();
    let value = lit.value();
    let fanin = circuit.fanin(g);
    match circuit.kind(g) {
        GateKind::And if value => fanin.iter().map(|&f| Literal::new(f, true)).collect(),
        GateKind::Nand if !value => fanin.iter().map(|&f| Literal::new(f, true)).collect(),
        GateKind::Or if !value => fanin.iter().map(|&f| Literal::new(f, false)).collect(),
        GateKind::Nor if value => fanin.iter().map(|&f| Literal::new(f, false)).collect(),
        GateKind::Output | GateKind::Buf => vec![Literal::new(fanin[0], value)],
        GateKind::Not => vec![Literal::new(fanin[0], !value)],
        _ => Vec::new(),
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
    fn direct_implications_follow_and_gate_rule() {
        let c = and_circuit();
        let mut learner = Learner::new(&c);
        learner.seed_direct_implications();
        let closure = learner.db().close(Literal::new(gid(3), true));
        assert!(closure.literals.contains(&Literal::new(gid(1), true)));
        assert!(closure.literals.contains(&Literal::new(gid(2), true)));
        assert!(closure.literals.contains(&Literal::new(gid(4), true)));
    }

    #[test]
    fn and_gate_at_zero_has_no_single_structural_implication() {
        let c = and_circuit();
        let mut learner = Learner::new(&c);
        learner.seed_direct_implications();
        let closure = learner.db().close(Literal::new(gid(3), false));
        assert!(!closure.literals.contains(&Literal::new(gid(1), false)));
    }

    #[test]
    fn indirect_learning_discovers_and_from_single_input() {
        // AND 3 at 0 must follow from PI 1 at 0 alone, but that's only discoverable
        // by simulation, not by the direct rule (which needs every fanin to be 1).
        let c = and_circuit();
        let mut learner = Learner::new(&c);
        let stats = learner.learn();
        assert!(stats.num_simulations > 0);
        let closure = learner.db().close(Literal::new(gid(1), false));
        assert!(closure.literals.contains(&Literal::new(gid(3), false)));
        assert!(closure.literals.contains(&Literal::new(gid(4), false)));
    }

    #[test]
    fn reconvergent_fanout_produces_a_fixed_gate() {
        // PI 1, NOT 2 <- {1}, AND 3 <- {1,2}, OUTPUT 4 <- {3}: gate 3 can never be 1,
        // since its fanin is a signal ANDed with its own complement.
        let c = Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Not, 1, vec![gid(1)]),
            GateSpec::new(GateKind::And, 1, vec![gid(1), gid(2)]),
            GateSpec::new(GateKind::Output, 2, vec![gid(3)]),
        ])
        .unwrap();
        let mut learner = Learner::new(&c);
        let stats = learner.learn();
        assert!(stats.fixed_node_counter > 0);
        assert!(learner.db().direct_of(Literal::new(gid(3), true)).is_empty());
    }
}
