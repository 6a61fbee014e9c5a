//! Command-line entry point (C9, SPEC_FULL.md §6-§7).

use gateimp::netlist::{self, Limits};
use gateimp::repl::Repl;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args();
    let _argv0 = args.next();
    let stem = match args.next() {
        Some(stem) => stem,
        None => {
            log::error!("please specify a circuit path as a command line argument");
            return ExitCode::FAILURE;
        }
    };
    let init_stem = args.next();

    let lev_path = PathBuf::from(format!("{}.lev", stem));
    let circuit = match netlist::load_netlist(&lev_path, &Limits::default()) {
        Ok(circuit) => circuit,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let resets: Option<Vec<Option<bool>>> = match init_stem {
        Some(init_stem) => {
            let initstate_path = PathBuf::from(format!("{}.initState", init_stem));
            match netlist::load_init_state(&initstate_path, circuit.flip_flops().len()) {
                Ok(resets) => {
                    log::info!("loaded {} flip-flop reset values from {:?}", resets.len(), initstate_path);
                    Some(
                        resets
                            .into_iter()
                            .map(|r| match r {
                                netlist::FlipFlopReset::Zero => Some(false),
                                netlist::FlipFlopReset::One => Some(true),
                                netlist::FlipFlopReset::X => None,
                            })
                            .collect(),
                    )
                }
                Err(err) => {
                    log::error!("{}", err);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => None,
    };

    let mut repl = match &resets {
        Some(resets) => Repl::with_flip_flop_resets(&circuit, lev_path.display().to_string(), resets),
        None => Repl::new(&circuit, lev_path.display().to_string()),
    };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(err) = repl.run(stdin.lock(), stdout.lock()) {
        log::error!("{}", err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
