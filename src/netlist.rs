//! Loads a leveled gate netlist and its optional flip-flop reset state (C7,
//! SPEC_FULL.md §3 "Netlist record", §6).

use crate::circuit::{Circuit, GateId, GateKind, GateSpec};
use crate::error::NetlistError;
use std::path::Path;

/// Bounds enforced while loading a netlist, standing in for the original tool's
/// hardcoded array capacities (SPEC_FULL.md §10.2).
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_level: u32,
    pub max_fanin: usize,
    pub max_fanout: usize,
    pub max_flip_flops: usize,
    pub max_tie_nodes: usize,
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            max_level: 10_000,
            max_fanin: 10_192,
            max_fanout: 10_192,
            max_flip_flops: 40_048,
            max_tie_nodes: 512,
        }
    }
}

/// A flip-flop's reset value, as read from a `.initState` file: `'0'`/`'1'` pin it to a
/// constant, anything else leaves it unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipFlopReset {
    Zero,
    One,
    X,
}

struct Tokens<'a> {
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Tokens<'a> {
        Tokens {
            words: text.split_whitespace(),
        }
    }

    fn next(&mut self, record: &'static str) -> Result<&'a str, NetlistError> {
        self.words.next().ok_or_else(|| NetlistError::Malformed {
            record,
            message: "unexpected end of file".to_string(),
        })
    }

    fn next_u32(&mut self, record: &'static str) -> Result<u32, NetlistError> {
        let word = self.next(record)?;
        word.parse().map_err(|_| NetlistError::Malformed {
            record,
            message: format!("expected an integer, found {:?}", word),
        })
    }
}

/// Loads the netlist at `path` (a `.lev` file), deriving fanout from fanin rather than
/// trusting the file's own redundant fanout list (SPEC_FULL.md §3).
pub fn load_netlist(path: &Path, limits: &Limits) -> Result<Circuit, NetlistError> {
    let text = std::fs::read_to_string(path).map_err(|source| NetlistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_netlist(&text, limits)
}

/// Parses netlist text already in memory (what [`load_netlist`] reads off disk and
/// hands here). Exposed directly so fixtures — tests, or a future caller reading a
/// netlist embedded in something other than a bare file — don't need a temp file.
pub fn parse_netlist(text: &str, limits: &Limits) -> Result<Circuit, NetlistError> {
    let mut tokens = Tokens::new(text);

    let count = tokens.next_u32("header")?;
    let _total_pins = tokens.next_u32("header")?;
    let num_gates = count.saturating_sub(1) as usize;

    let mut specs: Vec<Option<GateSpec>> = (0..num_gates).map(|_| None).collect();

    for _ in 0..num_gates {
        let netnum = tokens.next_u32("gate record")?;
        if netnum == 0 || netnum as usize > num_gates {
            return Err(NetlistError::Malformed {
                record: "gate record",
                message: format!("gate number {} out of range 1..={}", netnum, num_gates),
            });
        }

        let kind_code = tokens.next_u32("gate record")?;
        let kind = GateKind::from_code(kind_code).ok_or(NetlistError::UnknownGateKind {
            gate: netnum,
            code: kind_code,
        })?;

        let level = tokens.next_u32("gate record")?;
        if level > limits.max_level {
            return Err(NetlistError::LevelBoundExceeded {
                gate: netnum,
                level,
                max: limits.max_level,
            });
        }

        let fanin_count = tokens.next_u32("gate record")? as usize;
        if fanin_count > limits.max_fanin {
            return Err(NetlistError::FaninBoundExceeded {
                gate: netnum,
                count: fanin_count,
                max: limits.max_fanin,
            });
        }
        if !kind.expected_arity().matches(fanin_count) {
            return Err(NetlistError::ArityMismatch {
                gate: netnum,
                kind,
                count: fanin_count,
                expected: kind.expected_arity(),
            });
        }

        let mut fanin = Vec::with_capacity(fanin_count);
        for _ in 0..fanin_count {
            let pred = tokens.next_u32("fanin list")?;
            if pred == 0 || pred as usize > num_gates {
                return Err(NetlistError::InvalidFanin { gate: netnum, fanin: pred });
            }
            fanin.push(GateId::new(pred));
        }
        // Redundant re-read of the same fanin list; discarded.
        for _ in 0..fanin_count {
            tokens.next("fanin list (redundant)")?;
        }

        let fanout_count = tokens.next_u32("gate record")? as usize;
        if fanout_count > limits.max_fanout {
            return Err(NetlistError::FanoutBoundExceeded {
                gate: netnum,
                count: fanout_count,
                max: limits.max_fanout,
            });
        }
        // The file's own fanout list is never trusted; fanout is derived from fanin by
        // `Circuit::build` instead.
        for _ in 0..fanout_count {
            tokens.next("fanout list")?;
        }

        // Four observability fields, unused by this tool.
        for _ in 0..4 {
            tokens.next("observability fields")?;
        }

        specs[(netnum - 1) as usize] = Some(GateSpec::new(kind, level, fanin));
    }

    let specs: Vec<GateSpec> = specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            spec.ok_or_else(|| NetlistError::Malformed {
                record: "gate record",
                message: format!("gate {} was never defined", i + 1),
            })
        })
        .collect::<Result<_, _>>()?;

    let flip_flop_count = specs.iter().filter(|s| s.kind == GateKind::Dff).count();
    if flip_flop_count > limits.max_flip_flops {
        return Err(NetlistError::FlipFlopBoundExceeded {
            count: flip_flop_count,
            max: limits.max_flip_flops,
        });
    }
    let tie_count = specs.iter().filter(|s| s.kind.is_tie()).count();
    if tie_count > limits.max_tie_nodes {
        return Err(NetlistError::TieBoundExceeded {
            count: tie_count,
            max: limits.max_tie_nodes,
        });
    }

    Circuit::build(specs).map_err(|err| NetlistError::Malformed {
        record: "gate record",
        message: err.to_string(),
    })
}

/// Loads a `.initState` file: one character per flip-flop, in netlist order.
pub fn load_init_state(path: &Path, num_flip_flops: usize) -> Result<Vec<FlipFlopReset>, NetlistError> {
    let text = std::fs::read_to_string(path).map_err(|source| NetlistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut chars = text.chars().filter(|c| !c.is_whitespace());
    let mut resets = Vec::with_capacity(num_flip_flops);
    for _ in 0..num_flip_flops {
        let c = chars.next().ok_or_else(|| NetlistError::Malformed {
            record: "init state",
            message: "fewer symbols than flip-flops".to_string(),
        })?;
        resets.push(match c {
            '0' => FlipFlopReset::Zero,
            '1' => FlipFlopReset::One,
            _ => FlipFlopReset::X,
        });
    }
    Ok(resets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_minimal_and_gate_netlist() {
        // 4 gates total (header count = 5): PI 1, PI 2, AND 3 <- {1,2}, OUTPUT 4 <- {3}.
        let text = "5 0 \
            1 1 0 0  0  0 0 0 j \
            2 1 0 0  0  0 0 0 j \
            3 6 1 2 1 2 1 2  0  0 0 0 j \
            4 2 2 1 3  3  0  0 0 0 j";
        let circuit = parse_netlist(text, &Limits::default()).unwrap();
        assert_eq!(circuit.len(), 4);
        assert_eq!(circuit.inputs().len(), 2);
        assert_eq!(circuit.outputs().len(), 1);
        assert_eq!(circuit.fanin(GateId::new(3)), &[GateId::new(1), GateId::new(2)]);
    }

    #[test]
    fn rejects_unknown_gate_kind_code() {
        let text = "2 0 1 99 0 0  0  0 0 0 j";
        assert!(parse_netlist(text, &Limits::default()).is_err());
    }

    #[test]
    fn accepts_out_of_order_gate_numbers() {
        // Same two PI records as the minimal test above, written gate 2 before gate 1.
        let text = "3 0 \
            2 1 0 0  0  0 0 0 j \
            1 1 0 0  0  0 0 0 j";
        let circuit = parse_netlist(text, &Limits::default()).unwrap();
        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.inputs().len(), 2);
    }

    #[test]
    fn rejects_out_of_range_gate_number() {
        let text = "2 0 \
            5 1 0 0  0  0 0 0 j";
        assert!(parse_netlist(text, &Limits::default()).is_err());
    }

    #[test]
    fn init_state_maps_digits_to_resets() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!(
            "gateimp-test-{}-{}.initState",
            std::process::id(),
            unique
        ));
        std::fs::write(&path, "01X").unwrap();
        let resets = load_init_state(&path, 3).unwrap();
        assert_eq!(
            resets,
            vec![FlipFlopReset::Zero, FlipFlopReset::One, FlipFlopReset::X]
        );
        let _ = std::fs::remove_file(&path);
    }
}
