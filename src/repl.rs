//! The interactive command loop (C8, SPEC_FULL.md §7).

use crate::circuit::{Circuit, GateId};
use crate::error::CommandError;
use crate::implications::{ImplicationDb, Learner, LearnerStats};
use crate::literal::Literal;
use crate::sim::{InputSymbol, Simulator};
use std::io::{self, BufRead, Write};

/// Owns the circuit's learned implication graph and a live simulator, and drives the
/// `imp`/`gate`/`ckt`/`sim`/`stats`/`help`/`quit` command set over a line-oriented
/// input/output pair.
pub struct Repl<'c> {
    circuit: &'c Circuit,
    circuit_path: String,
    db: ImplicationDb,
    stats: LearnerStats,
    sim: Simulator<'c>,
}

impl<'c> Repl<'c> {
    /// Learns `circuit`'s implication graph up front, then constructs a REPL ready to
    /// serve queries against it. `circuit_path` is cosmetic, used only by `ckt`.
    pub fn new(circuit: &'c Circuit, circuit_path: String) -> Repl<'c> {
        Repl::with_flip_flop_resets(circuit, circuit_path, &[])
    }

    /// Like [`Repl::new`], but first seeds each flip-flop's power-up value from
    /// `resets` (`Some(bit)` for a pinned reset, `None` for unknown), in netlist order.
    /// Shorter than `circuit.flip_flops()` is fine; the remaining flip-flops keep their
    /// construction-time X-tag.
    pub fn with_flip_flop_resets(
        circuit: &'c Circuit,
        circuit_path: String,
        resets: &[Option<bool>],
    ) -> Repl<'c> {
        let mut learner = Learner::new(circuit);
        let stats = learner.learn();
        let mut sim = Simulator::new(circuit);
        for (&ff, &reset) in circuit.flip_flops().iter().zip(resets) {
            sim.seed_gate_value(ff, reset);
        }
        Repl {
            circuit,
            circuit_path,
            db: learner.into_db(),
            stats,
            sim,
        }
    }

    /// Runs the read-eval-print loop until `quit` or end of input.
    pub fn run(&mut self, mut input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        writeln!(out, "Welcome to the gate implication analyzer")?;
        writeln!(out, "Enter a command, or help to begin")?;

        let mut line = String::new();
        loop {
            write!(out, ">")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
            if !self.dispatch(&trimmed, &mut out)? {
                break;
            }
        }
        Ok(())
    }

    /// Returns `false` once the REPL should stop (the `quit` command).
    fn dispatch(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let (command, rest) = match line.find(' ') {
            Some(i) => (&line[..i], line[i + 1..].trim()),
            None => (line, ""),
        };
        match command {
            "quit" => return Ok(false),
            "help" => self.print_help(out)?,
            "ckt" => self.print_circuit(out)?,
            "gate" => self.handle_gate(rest, out)?,
            "imp" => self.handle_implication(rest, out)?,
            "sim" => self.handle_sim(rest, out)?,
            "stats" => self.print_stats(out)?,
            "" => {}
            _ => {
                writeln!(out, "Error: Unknown command {}", line)?;
                writeln!(out, "Enter help for command list")?;
            }
        }
        Ok(true)
    }

    fn print_help(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Gate Implication Analyzer Help")?;
        writeln!(out, "Please enter one of the following commands:\n")?;
        writeln!(out, "imp <gate number> <gate value>")?;
        writeln!(out, "Prints the logical implications for the specified gate")?;
        writeln!(out, "Example, implications of gate 1 at value 0: >imp 1 0\n")?;
        writeln!(out, "sim <input vector>")?;
        writeln!(out, "Simulates an input vector and prints the circuit's outputs")?;
        writeln!(out, "Example, simulating 1X0 on the current circuit: >sim 1X0\n")?;
        writeln!(out, "gate <gate number>")?;
        writeln!(out, "Prints the type and connectivity of the specified gate")?;
        writeln!(out, "Example, info for gate 1: >gate 1\n")?;
        writeln!(out, "ckt")?;
        writeln!(out, "Prints a summary of the current circuit\n")?;
        writeln!(out, "stats")?;
        writeln!(out, "Prints statistics about the implication-learning process\n")?;
        writeln!(out, "quit")?;
        writeln!(out, "Exits the analyzer")
    }

    fn print_circuit(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Circuit: {}", self.circuit_path)?;
        writeln!(out, "\t{} PIs.", self.circuit.inputs().len())?;
        writeln!(out, "\t{} POs.", self.circuit.outputs().len())?;
        writeln!(out, "\t{} Dffs.", self.circuit.flip_flops().len())?;
        writeln!(out, "\t{} total number of gates.", self.circuit.len())?;
        writeln!(out, "\t{} levels in the circuit.", self.circuit.max_level())
    }

    fn print_stats(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "Found a total of {} implications via logic simulation",
            self.stats.num_indirect_implications
        )?;
        writeln!(
            out,
            "Found a total of {} fixed gates which can only take a single value",
            self.stats.fixed_node_counter
        )?;
        writeln!(out, "Circuit was logic simulated {} times", self.stats.num_simulations)?;
        writeln!(
            out,
            "Calculated all direct implications in {} milliseconds",
            self.stats.elapsed_ms_direct
        )?;
        writeln!(
            out,
            "Calculated all indirect implications in {} milliseconds",
            self.stats.elapsed_ms_indirect
        )
    }

    fn parse_gate(&self, token: &str) -> Result<GateId, CommandError> {
        let n: u32 = token
            .parse()
            .map_err(|_| CommandError::BadGateNumber(token.to_string()))?;
        if n == 0 || n as usize > self.circuit.len() {
            return Err(CommandError::GateOutOfRange(n));
        }
        Ok(GateId::new(n))
    }

    fn handle_gate(&self, rest: &str, out: &mut impl Write) -> io::Result<()> {
        let gate = match self.parse_gate(rest.trim()) {
            Ok(g) => g,
            Err(e) => return writeln!(out, "Error: {}", e),
        };
        writeln!(out, "Gate Type: {}", self.circuit.kind(gate))?;
        write!(out, "Direct Fan-In:")?;
        for f in self.circuit.fanin(gate) {
            write!(out, " {}", f)?;
        }
        writeln!(out)?;
        write!(out, "Direct Fan-Out:")?;
        for f in self.circuit.fanout(gate) {
            write!(out, " {}", f)?;
        }
        writeln!(out)
    }

    fn handle_implication(&self, rest: &str, out: &mut impl Write) -> io::Result<()> {
        let mut parts = rest.split_whitespace();
        let gate = match self.parse_gate(parts.next().unwrap_or("")) {
            Ok(g) => g,
            Err(e) => return writeln!(out, "Error: {}", e),
        };
        let value = match parts.next() {
            Some("0") => false,
            Some("1") => true,
            _ => return writeln!(out, "Error: {}", CommandError::BadLiteralValue),
        };

        let closure = self.db.close(Literal::new(gate, value));
        if closure.literals.is_empty() {
            return writeln!(
                out,
                "Gate {} at value {} is not reachable in this circuit",
                gate, value as u8
            );
        }
        writeln!(out, "Gate {} at value {} implies:", gate, value as u8)?;
        for implied in &closure.literals {
            writeln!(out, "Gate {} at value {}", implied.gate(), implied.value() as u8)?;
        }
        Ok(())
    }

    fn handle_sim(&mut self, rest: &str, out: &mut impl Write) -> io::Result<()> {
        let mut symbols = Vec::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0' => symbols.push(InputSymbol::Zero),
                '1' => symbols.push(InputSymbol::One),
                'x' | 'X' => symbols.push(InputSymbol::X),
                c if c.is_whitespace() => {}
                bad => return writeln!(out, "Error: {}", CommandError::BadVectorChar(bad)),
            }
        }
        let needed = self.circuit.inputs().len();
        if symbols.len() < needed {
            return writeln!(out, "Error: {}", CommandError::VectorTooShort { needed });
        }
        self.sim.apply_vector(&symbols);
        self.sim.good_sim(false);
        writeln!(out, "output: {}", self.sim.po_projection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{GateKind, GateSpec};

    fn gid(n: u32) -> GateId {
        GateId::new(n)
    }

    fn and_circuit() -> Circuit {
        Circuit::build(vec![
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::Input, 0, vec![]),
            GateSpec::new(GateKind::And, 1, vec![gid(1), gid(2)]),
            GateSpec::new(GateKind::Output, 2, vec![gid(3)]),
        ])
        .unwrap()
    }

    fn run_session(circuit: &Circuit, script: &str) -> String {
        let mut repl = Repl::new(circuit, "test.lev".to_string());
        let mut out = Vec::new();
        repl.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn sim_command_reports_the_output_projection() {
        let c = and_circuit();
        let transcript = run_session(&c, "sim 1 1\nquit\n");
        assert!(transcript.contains("output: 1"));
    }

    #[test]
    fn imp_command_reports_unreachable_for_fixed_gates() {
        // AND 3 at value 1 implies PI 1 at 1, which is always reachable; the inverse
        // scenario (a gate fixed by reconvergent fanout) is exercised in the learner's
        // own tests. Here we just check the happy path prints the implied literal.
        let c = and_circuit();
        let transcript = run_session(&c, "imp 3 1\nquit\n");
        assert!(transcript.contains("Gate 1 at value 1"));
        assert!(transcript.contains("Gate 2 at value 1"));
    }

    #[test]
    fn gate_command_rejects_out_of_range_numbers() {
        let c = and_circuit();
        let transcript = run_session(&c, "gate 99\nquit\n");
        assert!(transcript.contains("Error:"));
    }

    #[test]
    fn unknown_command_prints_an_error_and_keeps_the_session_alive() {
        let c = and_circuit();
        let transcript = run_session(&c, "bogus\nckt\nquit\n");
        assert!(transcript.contains("Unknown command"));
        assert!(transcript.contains("Circuit: test.lev"));
    }
}
