use std::cell::RefCell;
use std::error::Error;
use std::fs::File;
use std::rc::Rc;

use serde::Deserialize;

use crate::backend::backend::Backend;
use crate::instructions::instructions::{
    DWordType, Program, RSKind, RegisterType, ARCH_REG_COUNT,
};
use crate::memory_subsystem::memory_subsystem::MemorySubsystem;

pub(crate) struct PerfCounters {
    pub issue_cnt: u64,
    pub dispatch_cnt: u64,
    pub execute_cnt: u64,
    pub retire_cnt: u64,
    pub cycle_cnt: u64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            issue_cnt: 0,
            dispatch_cnt: 0,
            execute_cnt: 0,
            retire_cnt: 0,
            cycle_cnt: 0,
        }
    }
}

#[derive(Clone, Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct Trace {
    pub issue: bool,
    pub dispatch: bool,
    pub execute: bool,
    pub retire: bool,
    // the full machine dump, every cycle
    pub cycle: bool,
}

#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub(crate) struct CPUConfig {
    // the number of reservation stations per pool
    pub(crate) intalu_rs_count: u16,
    pub(crate) muldiv_rs_count: u16,
    pub(crate) load_rs_count: u16,
    pub(crate) store_rs_count: u16,
    pub(crate) fpadd_rs_count: u16,
    pub(crate) fpmul_rs_count: u16,
    pub(crate) fpdiv_rs_count: u16,
    // the number of execution units per pool
    pub(crate) intalu_eu_count: u8,
    pub(crate) muldiv_eu_count: u8,
    pub(crate) load_eu_count: u8,
    pub(crate) store_eu_count: u8,
    pub(crate) fpadd_eu_count: u8,
    pub(crate) fpmul_eu_count: u8,
    pub(crate) fpdiv_eu_count: u8,
    // the capacity of the reorder buffer
    pub(crate) rob_capacity: u16,
    // the capacity of the load/store queue
    pub(crate) lsq_capacity: u16,
    // which pipeline events should be traced (printed)
    pub(crate) trace: Trace,
}

impl Default for CPUConfig {
    fn default() -> Self {
        Self {
            intalu_rs_count: 6,
            muldiv_rs_count: 2,
            load_rs_count: 8,
            store_rs_count: 6,
            fpadd_rs_count: 4,
            fpmul_rs_count: 4,
            fpdiv_rs_count: 2,
            intalu_eu_count: 2,
            muldiv_eu_count: 1,
            load_eu_count: 2,
            store_eu_count: 1,
            fpadd_eu_count: 2,
            fpmul_eu_count: 2,
            fpdiv_eu_count: 1,
            rob_capacity: 32,
            lsq_capacity: 16,
            trace: Trace::default(),
        }
    }
}

impl CPUConfig {
    pub(crate) fn rs_count(&self, kind: RSKind) -> u16 {
        match kind {
            RSKind::INTALU => self.intalu_rs_count,
            RSKind::MULDIV => self.muldiv_rs_count,
            RSKind::LOAD => self.load_rs_count,
            RSKind::STORE => self.store_rs_count,
            RSKind::FPADD => self.fpadd_rs_count,
            RSKind::FPMUL => self.fpmul_rs_count,
            RSKind::FPDIV => self.fpdiv_rs_count,
        }
    }

    pub(crate) fn eu_count(&self, kind: RSKind) -> u8 {
        match kind {
            RSKind::INTALU => self.intalu_eu_count,
            RSKind::MULDIV => self.muldiv_eu_count,
            RSKind::LOAD => self.load_eu_count,
            RSKind::STORE => self.store_eu_count,
            RSKind::FPADD => self.fpadd_eu_count,
            RSKind::FPMUL => self.fpmul_eu_count,
            RSKind::FPDIV => self.fpdiv_eu_count,
        }
    }
}

pub fn load_cpu_config(file_path: &str) -> Result<CPUConfig, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let config = serde_yaml::from_reader(file)?;
    Ok(config)
}

/// The architectural state a simulation starts from: register values and
/// pre-populated memory, as (index, value) and (address, value) pairs.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InitialState {
    pub int_regs: Vec<(RegisterType, DWordType)>,
    pub fp_regs: Vec<(RegisterType, f64)>,
    pub int_memory: Vec<(DWordType, DWordType)>,
    pub fp_memory: Vec<(DWordType, f64)>,
}

pub fn load_initial_state(file_path: &str) -> Result<InitialState, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let initial_state = serde_yaml::from_reader(file)?;
    Ok(initial_state)
}

/// The committed architectural register files: 32 integer and 32 fp
/// registers. x0 is hardwired to zero.
pub(crate) struct ArchRegFile {
    int_entries: Vec<DWordType>,
    fp_entries: Vec<f64>,
}

impl ArchRegFile {
    fn new() -> ArchRegFile {
        ArchRegFile {
            int_entries: vec![0; ARCH_REG_COUNT],
            fp_entries: vec![0.0; ARCH_REG_COUNT],
        }
    }

    fn init(&mut self, initial_state: &InitialState) {
        self.int_entries.fill(0);
        self.fp_entries.fill(0.0);

        for &(reg, value) in &initial_state.int_regs {
            self.set_int(reg, value);
        }
        for &(reg, value) in &initial_state.fp_regs {
            self.set_fp(reg, value);
        }
    }

    pub(crate) fn get_int(&self, reg: RegisterType) -> DWordType {
        self.int_entries[reg as usize]
    }

    pub(crate) fn set_int(&mut self, reg: RegisterType, value: DWordType) {
        if reg == 0 {
            // x0 is hardwired to zero
            return;
        }
        self.int_entries[reg as usize] = value;
    }

    pub(crate) fn get_fp(&self, reg: RegisterType) -> f64 {
        self.fp_entries[reg as usize]
    }

    pub(crate) fn set_fp(&mut self, reg: RegisterType, value: f64) {
        self.fp_entries[reg as usize] = value;
    }
}

pub(crate) struct CPU {
    pub(crate) backend: Backend,
    pub(crate) memory_subsystem: Rc<RefCell<MemorySubsystem>>,
    pub(crate) arch_reg_file: Rc<RefCell<ArchRegFile>>,
    pub(crate) perf_counters: Rc<RefCell<PerfCounters>>,
    trace: Trace,
}

impl CPU {
    pub(crate) fn new(cpu_config: &CPUConfig) -> CPU {
        let memory_subsystem = Rc::new(RefCell::new(MemorySubsystem::new()));
        let arch_reg_file = Rc::new(RefCell::new(ArchRegFile::new()));
        let perf_counters = Rc::new(RefCell::new(PerfCounters::new()));

        let backend = Backend::new(
            cpu_config,
            &memory_subsystem,
            &arch_reg_file,
            &perf_counters,
        );

        CPU {
            backend,
            memory_subsystem,
            arch_reg_file,
            perf_counters,
            trace: cpu_config.trace.clone(),
        }
    }

    /// Runs the program to completion: until the instruction stream is
    /// exhausted and every issued instruction has retired.
    pub(crate) fn run(&mut self, program: &Rc<Program>, initial_state: &InitialState) {
        self.arch_reg_file.borrow_mut().init(initial_state);
        self.memory_subsystem.borrow_mut().init(initial_state);
        self.backend.init(program);

        while !self.backend.is_done() {
            self.perf_counters.borrow_mut().cycle_cnt += 1;

            self.backend.do_cycle();

            if self.trace.cycle {
                let cycle = self.perf_counters.borrow().cycle_cnt;
                self.backend.print_cycle_state(cycle);
            }
        }
    }
}
