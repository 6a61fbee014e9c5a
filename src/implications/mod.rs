//! The implication graph and its transitive closure (C5, SPEC_FULL.md §4.5).

mod learner;

pub use learner::{Learner, LearnerStats};

use crate::literal::Literal;
use indexmap::IndexSet;
use std::collections::HashSet;

/// Direct-implication edges, stored densely by [`Literal::index`] so lookup never
/// touches a hash table. `direct[lit.index()]` is the set of literals directly implied
/// by `lit` (SPEC_FULL.md §4.5's `imp0`/`imp1` arrays, generalized to one array keyed
/// by the packed literal).
pub struct ImplicationDb {
    direct: Vec<IndexSet<Literal>>,
}

/// The result of closing a literal over the implication graph: every literal reachable
/// from it, or notice that the closure collided with a literal's own complement.
pub struct Closure {
    pub literals: IndexSet<Literal>,
    pub contradiction: bool,
}

impl ImplicationDb {
    /// `num_gates` is the circuit's gate count (gate `0` excluded); the db is sized for
    /// both literal polarities of every gate, `0..=num_gates`.
    pub fn new(num_gates: usize) -> ImplicationDb {
        ImplicationDb {
            direct: (0..2 * (num_gates + 1)).map(|_| IndexSet::new()).collect(),
        }
    }

    /// Adds the edge `src -> dst`. Returns `true` if the edge was new.
    pub fn insert(&mut self, src: Literal, dst: Literal) -> bool {
        self.direct[src.index()].insert(dst)
    }

    /// Drops every direct edge out of `lit` (used when `lit` turns out to be
    /// unreachable, SPEC_FULL.md §4.6 Phase B step 2).
    pub fn clear(&mut self, lit: Literal) {
        self.direct[lit.index()].clear();
    }

    pub fn direct_of(&self, lit: Literal) -> &IndexSet<Literal> {
        &self.direct[lit.index()]
    }

    /// Depth-first transitive closure of `seed`'s direct implications. A literal whose
    /// closure already contains its own complement is a contradiction: `seed` can never
    /// actually take its assumed value in a consistent circuit state. Mirrors the
    /// original tool's check-before-insert ordering exactly, so a contradiction is
    /// detected the instant it would be inserted rather than after the fact.
    pub fn close(&self, seed: Literal) -> Closure {
        let mut literals = IndexSet::new();
        let mut traversed = HashSet::new();
        let mut contradiction = false;
        traversed.insert(seed);
        for &next in self.direct_of(seed) {
            self.close_into(next, &mut literals, &mut traversed, &mut contradiction);
            if contradiction {
                break;
            }
        }
        Closure {
            literals,
            contradiction,
        }
    }

    fn close_into(
        &self,
        imp: Literal,
        literals: &mut IndexSet<Literal>,
        traversed: &mut HashSet<Literal>,
        contradiction: &mut bool,
    ) {
        if *contradiction {
            return;
        }
        if literals.contains(&imp.complement()) {
            *contradiction = true;
            return;
        }
        literals.insert(imp);
        if traversed.insert(imp) {
            for &next in self.direct_of(imp) {
                self.close_into(next, literals, traversed, contradiction);
                if *contradiction {
                    return;
                }
            }
        }
    }
}
