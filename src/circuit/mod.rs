//! The immutable gate graph (C1, SPEC_FULL.md §3, §4.1).

mod gate;

pub use gate::{ExpectedArity, GateId, GateKind};
use gate::{Adjacency, Gate};

use crate::data_structures::Immutable;
use crate::value::{Value, XAllocator};
use std::collections::HashMap;

/// One gate as handed to [`Circuit::build`], before fanout has been derived and
/// before the gate-0 sentinel has been prepended.
#[derive(Debug, Clone)]
pub struct GateSpec {
    pub kind: GateKind,
    pub level: u32,
    pub fanin: Vec<GateId>,
}

impl GateSpec {
    pub fn new(kind: GateKind, level: u32, fanin: Vec<GateId>) -> GateSpec {
        GateSpec { kind, level, fanin }
    }
}

/// The circuit's immutable gate graph. Holds no simulation state: [`initial_value`]
/// returns each gate's construction-time value (constants for ties, a fresh X-tag for
/// everything else), a fixed attribute of the gate rather than mutable runtime state.
///
/// [`initial_value`]: Circuit::initial_value
pub struct Circuit {
    gates: Immutable<Vec<Gate>>,
    initial_values: Immutable<Vec<Value>>,
    inputs: Immutable<Vec<GateId>>,
    outputs: Immutable<Vec<GateId>>,
    flip_flops: Immutable<Vec<GateId>>,
    ff_index: Immutable<HashMap<GateId, usize>>,
    max_level: u32,
}

impl Circuit {
    /// Builds a circuit from `specs`, indexed so that `specs[i]` becomes gate `i + 1`
    /// (gate `0` is the reserved sentinel). Fanout is derived from fanin, never taken
    /// on faith, so the symmetric-adjacency invariant holds unconditionally.
    pub fn build(specs: Vec<GateSpec>) -> Result<Circuit, CircuitError> {
        let n = specs.len();
        let mut gates = Vec::with_capacity(n + 1);
        gates.push(Gate {
            kind: GateKind::TieX,
            fanin: Adjacency::new(),
            fanout: Adjacency::new(),
            level: 0,
        });

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut flip_flops = Vec::new();
        let mut max_level = 0;

        for (i, spec) in specs.iter().enumerate() {
            let id = GateId::new((i + 1) as u32);
            for &p in &spec.fanin {
                if p.index() == 0 || p.index() > n {
                    return Err(CircuitError::InvalidFanin { gate: id, fanin: p });
                }
            }
            match spec.kind {
                GateKind::Input => inputs.push(id),
                GateKind::Output => outputs.push(id),
                GateKind::Dff => flip_flops.push(id),
                _ => {}
            }
            max_level = max_level.max(spec.level);
            gates.push(Gate {
                kind: spec.kind,
                fanin: spec.fanin.iter().copied().collect(),
                fanout: Adjacency::new(),
                level: spec.level,
            });
        }

        for i in 1..=n {
            let id = GateId::new(i as u32);
            let fanin = gates[i].fanin.clone();
            for p in fanin {
                gates[p.index()].fanout.push(id);
            }
        }

        let mut construction_xs = XAllocator::new();
        let initial_values = (0..=n)
            .map(|i| match gates[i].kind {
                GateKind::Tie1 => Value::ONE,
                GateKind::Tie0 => Value::ZERO,
                _ => construction_xs.fresh(),
            })
            .collect::<Vec<_>>();

        let ff_index: HashMap<GateId, usize> = flip_flops
            .iter()
            .enumerate()
            .map(|(pos, &g)| (g, pos))
            .collect();

        Ok(Circuit {
            gates: gates.into(),
            initial_values: initial_values.into(),
            inputs: inputs.into(),
            outputs: outputs.into(),
            flip_flops: flip_flops.into(),
            ff_index: ff_index.into(),
            max_level,
        })
    }

    pub fn len(&self) -> usize {
        self.gates.get().len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, g: GateId) -> bool {
        g.index() >= 1 && g.index() < self.gates.get().len()
    }

    pub fn kind(&self, g: GateId) -> GateKind {
        self.gates.get()[g.index()].kind
    }

    pub fn fanin(&self, g: GateId) -> &[GateId] {
        &self.gates.get()[g.index()].fanin
    }

    pub fn fanout(&self, g: GateId) -> &[GateId] {
        &self.gates.get()[g.index()].fanout
    }

    pub fn level(&self, g: GateId) -> u32 {
        self.gates.get()[g.index()].level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn inputs(&self) -> &[GateId] {
        self.inputs.get()
    }

    pub fn outputs(&self) -> &[GateId] {
        self.outputs.get()
    }

    pub fn flip_flops(&self) -> &[GateId] {
        self.flip_flops.get()
    }

    pub fn ff_position(&self, g: GateId) -> Option<usize> {
        self.ff_index.get().get(&g).copied()
    }

    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> {
        (1..self.gates.get().len() as u32).map(GateId::new)
    }

    /// Each gate's construction-time value: `0`/`1` for the tie constants, a distinct
    /// fresh X-tag for everything else (including `INPUT`, `TIEX`, `TIEZ`).
    pub fn initial_value(&self, g: GateId) -> Value {
        self.initial_values.get()[g.index()]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("gate {gate} references out-of-range fanin {fanin}")]
    InvalidFanin { gate: GateId, fanin: GateId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gid(n: u32) -> GateId {
        GateId::new(n)
    }

    #[test]
    fn fanout_is_derived_from_fanin() {
        // PI 1, PI 2, AND 3 <- {1,2}, OUTPUT 4 <- {3}
        let specs = vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::And, 1, vec![gid(1), gid(2)]),
            GateSpec::new(GateKind::Output, 2, vec![gid(3)]),
        ];
        let c = Circuit::build(specs).unwrap();
        assert_eq!(c.fanout(gid(1)), &[gid(3)]);
        assert_eq!(c.fanout(gid(2)), &[gid(3)]);
        assert_eq!(c.fanout(gid(3)), &[gid(4)]);
        assert!(c.fanout(gid(4)).is_empty());
        assert_eq!(c.inputs(), &[gid(1), gid(2)]);
        assert_eq!(c.outputs(), &[gid(4)]);
        assert_eq!(c.max_level(), 2);
    }

    #[test]
    fn rejects_out_of_range_fanin() {
        let specs = vec![GateSpec::new(GateKind::Buf, 1, vec![gid(9)])];
        assert!(Circuit::build(specs).is_err());
    }

    #[test]
    fn ties_get_constant_initial_values() {
        let specs = vec![
            GateSpec::new(GateKind::Tie0, 0, vec![]),
            GateSpec::new(GateKind::Tie1, 0, vec![]),
            GateSpec::new(GateKind::Input, 0, vec![]),
        ];
        let c = Circuit::build(specs).unwrap();
        assert_eq!(c.initial_value(gid(1)), Value::ZERO);
        assert_eq!(c.initial_value(gid(2)), Value::ONE);
        assert!(c.initial_value(gid(3)).is_x());
    }

    #[test]
    fn dff_is_tracked_by_position() {
        let specs = vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Dff, 0, vec![gid(1)]),
        ];
        let c = Circuit::build(specs).unwrap();
        assert_eq!(c.ff_position(gid(2)), Some(0));
        assert_eq!(c.ff_position(gid(1)), None);
    }
}
