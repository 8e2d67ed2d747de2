mod backend;
mod cpu;
mod cpu_tests;
mod instructions;
mod loader;
mod memory_subsystem;

use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use crate::cpu::{load_cpu_config, load_initial_state, CPUConfig, InitialState, CPU};

/// Cycle-accurate emulator of a Tomasulo-style out-of-order RV64 core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// program binary: a concatenation of little-endian 32-bit instruction words
    program: String,
    /// cpu configuration file (yaml)
    #[arg(short, long)]
    config: Option<String>,
    /// initial register and memory state (yaml)
    #[arg(short, long)]
    state: Option<String>,
    /// print the full machine state every cycle
    #[arg(long)]
    trace_cycle: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cpu_config = match &args.config {
        Some(path) => load_cpu_config(path)
            .map_err(|err| anyhow!("could not load cpu config `{}`: {}", path, err))?,
        None => CPUConfig::default(),
    };
    if args.trace_cycle {
        cpu_config.trace.cycle = true;
    }

    let initial_state = match &args.state {
        Some(path) => load_initial_state(path)
            .map_err(|err| anyhow!("could not load initial state `{}`: {}", path, err))?,
        None => InitialState::default(),
    };

    let program = loader::loader::load(&args.program)
        .with_context(|| format!("could not load program `{}`", args.program))?;
    let program = Rc::new(program);

    let mut cpu = CPU::new(&cpu_config);
    cpu.run(&program, &initial_state);

    let perf_counters = cpu.perf_counters.borrow();
    println!(
        "Program complete! [Cycles={}][Issued={}][Retired={}][IPC={:.2}]",
        perf_counters.cycle_cnt,
        perf_counters.issue_cnt,
        perf_counters.retire_cnt,
        perf_counters.retire_cnt as f32 / perf_counters.cycle_cnt as f32
    );

    Ok(())
}
