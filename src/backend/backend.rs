use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::execution_unit::{EUState, EUTable};
use crate::backend::register_alias_table::RAT;
use crate::backend::reorder_buffer::{ROBSlotState, ROB};
use crate::backend::reservation_station::{RSState, RSTable};
use crate::cpu::{ArchRegFile, CPUConfig, PerfCounters, Trace};
use crate::instructions::instructions::{
    is_control_op, is_load_op, is_store_op, latency, DWordType, DestReg, Instr, Opcode, Operand,
    Program, RSKind, RegisterType, ARCH_REG_COUNT,
};
use crate::memory_subsystem::load_store_queue::LSQ;
use crate::memory_subsystem::memory_subsystem::MemorySubsystem;

#[derive(Clone, Copy)]
pub(crate) struct CDBBroadcast {
    pub(crate) rob_index: u16,
    pub(crate) value: Operand,
}

// The outcome of renaming one source register: a resolved value, or the tag
// of the producing ROB slot.
struct RenamedOperand {
    q: Option<u16>,
    v: Option<Operand>,
}

/// The out-of-order engine: reservation stations, execution units, reorder
/// buffer, load/store queue and the register status tables, advanced one
/// clock cycle at a time.
pub(crate) struct Backend {
    arch_reg_file: Rc<RefCell<ArchRegFile>>,
    memory_subsystem: Rc<RefCell<MemorySubsystem>>,
    perf_counters: Rc<RefCell<PerfCounters>>,
    // both indexed by RSKind discriminant
    rs_tables: Vec<RSTable>,
    pub(crate) eu_tables: Vec<EUTable>,
    pub(crate) rob: ROB,
    lsq: LSQ,
    rat: RAT,
    cdb_broadcast_buffer: Vec<CDBBroadcast>,
    program: Option<Rc<Program>>,
    next_fetch: usize,
    // fetch is held behind an unresolved control instruction
    fetch_halted: bool,
    // fetch is permanently stopped (ebreak)
    fetch_stopped: bool,
    trace: Trace,
    // (instruction index, cycle) per retired instruction
    pub(crate) commit_log: Vec<(usize, u64)>,
    // (instruction index, cycle) per completed execution
    pub(crate) execute_log: Vec<(usize, u64)>,
}

impl Backend {
    pub(crate) fn new(
        cpu_config: &CPUConfig,
        memory_subsystem: &Rc<RefCell<MemorySubsystem>>,
        arch_reg_file: &Rc<RefCell<ArchRegFile>>,
        perf_counters: &Rc<RefCell<PerfCounters>>,
    ) -> Backend {
        let rs_tables = RSKind::ALL
            .iter()
            .map(|&kind| RSTable::new(kind, cpu_config.rs_count(kind)))
            .collect();
        let eu_tables = RSKind::ALL
            .iter()
            .map(|&kind| EUTable::new(kind, cpu_config.eu_count(kind)))
            .collect();

        Backend {
            arch_reg_file: Rc::clone(arch_reg_file),
            memory_subsystem: Rc::clone(memory_subsystem),
            perf_counters: Rc::clone(perf_counters),
            rs_tables,
            eu_tables,
            rob: ROB::new(cpu_config.rob_capacity),
            lsq: LSQ::new(cpu_config.lsq_capacity),
            rat: RAT::new(),
            cdb_broadcast_buffer: Vec::new(),
            program: None,
            next_fetch: 0,
            fetch_halted: false,
            fetch_stopped: false,
            trace: cpu_config.trace.clone(),
            commit_log: Vec::new(),
            execute_log: Vec::new(),
        }
    }

    pub(crate) fn init(&mut self, program: &Rc<Program>) {
        self.program = Some(Rc::clone(program));
        self.next_fetch = 0;
        self.fetch_halted = false;
        self.fetch_stopped = false;
    }

    pub(crate) fn is_done(&self) -> bool {
        let fetch_done = match &self.program {
            Some(program) => self.fetch_stopped || self.next_fetch >= program.code.len(),
            None => true,
        };
        fetch_done && self.rob.is_empty()
    }

    pub(crate) fn do_cycle(&mut self) {
        self.cycle_retire();
        self.cycle_dispatch();
        self.cycle_eu_table();
        self.cdb_broadcast();
        self.cycle_issue();
    }

    // Moves ready reservation stations into idle execution units, in the
    // fixed pool order. The station is released here, on dispatch; the unit
    // snapshots everything it needs.
    fn cycle_dispatch(&mut self) {
        // last cycle's broadcasts have been consumed
        self.cdb_broadcast_buffer.clear();

        for kind in RSKind::ALL {
            let k = kind as usize;
            for rs_index in 0..self.rs_tables[k].capacity {
                if !self.eu_tables[k].has_idle() {
                    break;
                }

                {
                    let rs = self.rs_tables[k].get(rs_index);
                    if rs.state != RSState::BUSY || !rs.is_ready(kind) {
                        continue;
                    }

                    // A load reads memory when it executes; it must not slip
                    // past an older store that has yet to commit its write.
                    if kind == RSKind::LOAD {
                        let lsq_index = self.rob.get(rs.rob_index.unwrap()).lsq_index.unwrap();
                        if self.lsq.has_older_store(lsq_index) {
                            continue;
                        }
                    }
                }

                let (opcode, vj, vk, a, pc, rob_index) = {
                    let rs = self.rs_tables[k].get(rs_index);
                    (rs.opcode, rs.vj, rs.vk, rs.a, rs.pc, rs.rob_index.unwrap())
                };

                let eu_index = self.eu_tables[k].allocate();
                let eu = self.eu_tables[k].get_mut(eu_index);
                eu.opcode = opcode;
                eu.v1 = vj;
                eu.v2 = vk;
                eu.a = a;
                eu.pc = pc;
                eu.rob_index = Some(rob_index);
                eu.cycles_remaining = latency(opcode);

                self.rs_tables[k].deallocate(rs_index);

                let rob_slot = self.rob.get_mut(rob_index);
                debug_assert!(rob_slot.state == ROBSlotState::ISSUED);
                rob_slot.state = ROBSlotState::EXECUTING;

                if self.trace.dispatch {
                    println!("Dispatched [{}]", self.rob.get(rob_index).instr.unwrap());
                }
                self.perf_counters.borrow_mut().dispatch_cnt += 1;
            }
        }
    }

    // Advances every busy execution unit by one cycle and completes those
    // that reach zero remaining cycles.
    fn cycle_eu_table(&mut self) {
        for kind in RSKind::ALL {
            let k = kind as usize;
            for eu_index in 0..self.eu_tables[k].capacity {
                {
                    let eu = self.eu_tables[k].get_mut(eu_index);
                    if eu.state == EUState::IDLE {
                        continue;
                    }
                    debug_assert!(eu.cycles_remaining > 0);

                    eu.cycles_remaining -= 1;
                    if eu.cycles_remaining > 0 {
                        continue;
                    }
                }

                self.complete(kind, eu_index);
                self.eu_tables[k].deallocate(eu_index);
            }
        }
    }

    fn complete(&mut self, kind: RSKind, eu_index: u8) {
        let k = kind as usize;
        let (opcode, v1, v2, a, pc, rob_index) = {
            let eu = self.eu_tables[k].get(eu_index);
            (eu.opcode, eu.v1, eu.v2, eu.a, eu.pc, eu.rob_index.unwrap())
        };

        match kind {
            RSKind::LOAD => {
                let addr = v1.unwrap().to_int().wrapping_add(a as DWordType);
                let result = self.memory_subsystem.borrow().load(opcode, addr);

                let lsq_index = self.rob.get(rob_index).lsq_index.unwrap();
                let lsq_entry = self.lsq.get_mut(lsq_index);
                lsq_entry.address = addr;
                lsq_entry.addr_ready = true;
                lsq_entry.data = Some(result);

                self.rob.get_mut(rob_index).result = Some(result);
                self.cdb_broadcast_buffer.push(CDBBroadcast { rob_index, value: result });
            }
            RSKind::STORE => {
                let addr = v1.unwrap().to_int().wrapping_add(a as DWordType);

                let lsq_index = self.rob.get(rob_index).lsq_index.unwrap();
                let lsq_entry = self.lsq.get_mut(lsq_index);
                lsq_entry.address = addr;
                lsq_entry.addr_ready = true;
                lsq_entry.data = v2;
                // no broadcast: a store has no register result
            }
            _ => {
                let result = self.eu_tables[k].get(eu_index).compute_result();
                self.rob.get_mut(rob_index).result = Some(result);
                self.cdb_broadcast_buffer.push(CDBBroadcast { rob_index, value: result });

                // Control instructions redirect fetch here, between execute
                // and this cycle's issue, computed from their own pc.
                match opcode {
                    Opcode::BNE => {
                        if result.to_int() != 0 {
                            self.next_fetch = (pc as i64 + a / 4) as usize;
                        }
                        self.fetch_halted = false;
                    }
                    Opcode::JALR => {
                        let target = v1.unwrap().to_int().wrapping_add(a as DWordType) / 4;
                        self.next_fetch = target as usize;
                        self.fetch_halted = false;
                    }
                    _ => {}
                }
            }
        }

        let rob_slot = self.rob.get_mut(rob_index);
        rob_slot.state = ROBSlotState::EXECUTED;

        if self.trace.execute {
            println!("Executed [{}]", self.rob.get(rob_index).instr.unwrap());
        }
        let mut perf_counters = self.perf_counters.borrow_mut();
        perf_counters.execute_cnt += 1;
        self.execute_log.push((pc, perf_counters.cycle_cnt));
    }

    // Wakes every reservation station waiting on a tag that completed this
    // cycle. The woken entries become dispatchable next cycle; the buffer is
    // kept around for the cycle trace and cleared by the next execute phase.
    fn cdb_broadcast(&mut self) {
        for broadcast_index in 0..self.cdb_broadcast_buffer.len() {
            let broadcast = self.cdb_broadcast_buffer[broadcast_index];

            for kind in RSKind::ALL {
                let rs_table = &mut self.rs_tables[kind as usize];
                for rs_index in 0..rs_table.capacity {
                    let rs = rs_table.get_mut(rs_index);
                    if rs.state != RSState::BUSY {
                        continue;
                    }

                    if rs.qj == Some(broadcast.rob_index) {
                        rs.vj = Some(broadcast.value);
                        rs.qj = None;
                    }
                    if rs.qk == Some(broadcast.rob_index) {
                        rs.vk = Some(broadcast.value);
                        rs.qk = None;
                    }
                }
            }
        }
    }

    // Issues at most one instruction from the fetch pointer. On a structural
    // stall nothing changes and the pointer does not advance.
    fn cycle_issue(&mut self) {
        if self.fetch_halted || self.fetch_stopped {
            return;
        }

        let program = match &self.program {
            Some(program) => Rc::clone(program),
            None => return,
        };
        if self.next_fetch >= program.code.len() {
            return;
        }

        let pc = self.next_fetch;
        let instr = program.get_instr(pc);
        if !self.try_issue(&instr, pc) {
            return;
        }

        self.next_fetch += 1;
        if is_control_op(instr.opcode) {
            // no prediction: hold fetch until the branch resolves
            self.fetch_halted = true;
        }
        if instr.opcode == Opcode::EBREAK {
            self.fetch_stopped = true;
        }

        if self.trace.issue {
            println!("Issued [{}]", instr);
        }
        self.perf_counters.borrow_mut().issue_cnt += 1;
    }

    fn try_issue(&mut self, instr: &Instr, pc: usize) -> bool {
        if !self.rob.has_space() {
            return false;
        }

        let kind = match RSKind::of(instr.opcode) {
            Some(kind) => kind,
            None => {
                // UNKNOWN and EBREAK occupy a ROB slot and retire as no-ops
                let rob_index = self.rob.allocate();
                let rob_slot = self.rob.get_mut(rob_index);
                rob_slot.state = ROBSlotState::EXECUTED;
                rob_slot.opcode = instr.opcode;
                rob_slot.pc = pc;
                rob_slot.instr = Some(*instr);
                return true;
            }
        };

        if !self.rs_tables[kind as usize].has_idle() {
            return false;
        }

        let is_load = is_load_op(instr.opcode);
        let is_store = is_store_op(instr.opcode);
        if (is_load || is_store) && !self.lsq.has_space() {
            return false;
        }

        // Rename both sources before the destination so an instruction that
        // reads its own destination register sees the previous producer.
        let op1 = if let Some(reg) = instr.rs1 {
            self.rename_int_src(reg)
        } else if let Some(reg) = instr.fs1 {
            self.rename_fp_src(reg)
        } else {
            // no first source (lui)
            RenamedOperand { q: None, v: Some(Operand::Int(0)) }
        };

        let op2 = if let Some(reg) = instr.rs2 {
            self.rename_int_src(reg)
        } else if let Some(reg) = instr.fs2 {
            self.rename_fp_src(reg)
        } else if !is_load && !is_store {
            // I-type: the sign-extended immediate is the second operand
            RenamedOperand { q: None, v: Some(Operand::Int(instr.imm as i64 as DWordType)) }
        } else {
            RenamedOperand { q: None, v: None }
        };

        let rob_index = self.rob.allocate();
        let rob_slot = self.rob.get_mut(rob_index);
        rob_slot.state = ROBSlotState::ISSUED;
        rob_slot.opcode = instr.opcode;
        rob_slot.dest = instr.dest();
        rob_slot.is_load = is_load;
        rob_slot.is_store = is_store;
        rob_slot.pc = pc;
        rob_slot.instr = Some(*instr);

        let rs_index = self.rs_tables[kind as usize].allocate();
        let rs = self.rs_tables[kind as usize].get_mut(rs_index);
        rs.opcode = instr.opcode;
        rs.a = instr.imm as i64;
        rs.pc = pc;
        rs.rob_index = Some(rob_index);
        rs.qj = op1.q;
        rs.vj = op1.v;
        rs.qk = op2.q;
        rs.vk = op2.v;

        if is_load || is_store {
            let lsq_index = self.lsq.allocate();
            let lsq_entry = self.lsq.get_mut(lsq_index);
            lsq_entry.is_store = is_store;
            lsq_entry.opcode = instr.opcode;
            lsq_entry.rob_index = rob_index;
            lsq_entry.dest = instr.dest();
            self.rob.get_mut(rob_index).lsq_index = Some(lsq_index);
        }

        // Destination renaming: the status entry now names this slot as the
        // youngest writer. x0 stays unrenamed.
        match instr.dest() {
            DestReg::Int(reg) if reg != 0 => {
                let rat_entry = self.rat.get_int_mut(reg);
                rat_entry.rob_index = rob_index;
                rat_entry.valid = true;
            }
            DestReg::Fp(reg) => {
                let rat_entry = self.rat.get_fp_mut(reg);
                rat_entry.rob_index = rob_index;
                rat_entry.valid = true;
            }
            _ => {}
        }

        true
    }

    fn rename_int_src(&self, arch_reg: RegisterType) -> RenamedOperand {
        let rat_entry = self.rat.get_int(arch_reg);
        if !rat_entry.valid {
            let value = self.arch_reg_file.borrow().get_int(arch_reg);
            return RenamedOperand { q: None, v: Some(Operand::Int(value)) };
        }

        let producer = self.rob.get(rat_entry.rob_index);
        if producer.state == ROBSlotState::EXECUTED {
            // the result already sits in the producer's slot; no need to
            // wait a cycle for the broadcast
            debug_assert!(producer.result.is_some());
            RenamedOperand { q: None, v: producer.result }
        } else {
            RenamedOperand { q: Some(rat_entry.rob_index), v: None }
        }
    }

    fn rename_fp_src(&self, arch_reg: RegisterType) -> RenamedOperand {
        let rat_entry = self.rat.get_fp(arch_reg);
        if !rat_entry.valid {
            let value = self.arch_reg_file.borrow().get_fp(arch_reg);
            return RenamedOperand { q: None, v: Some(Operand::Fp(value)) };
        }

        let producer = self.rob.get(rat_entry.rob_index);
        if producer.state == ROBSlotState::EXECUTED {
            debug_assert!(producer.result.is_some());
            RenamedOperand { q: None, v: producer.result }
        } else {
            RenamedOperand { q: Some(rat_entry.rob_index), v: None }
        }
    }

    // Retires at most one instruction from the head of the ROB, making its
    // effect architectural.
    fn cycle_retire(&mut self) {
        if self.rob.is_empty() {
            return;
        }

        let head_index = self.rob.head_index();
        if self.rob.get(head_index).state != ROBSlotState::EXECUTED {
            return;
        }

        let (dest, is_load, is_store, result, lsq_index, pc, instr) = {
            let slot = self.rob.get(head_index);
            (
                slot.dest,
                slot.is_load,
                slot.is_store,
                slot.result,
                slot.lsq_index,
                slot.pc,
                slot.instr,
            )
        };

        if is_store {
            // the memory write was deferred until this point
            let lsq_index = lsq_index.unwrap();
            let (opcode, address, data) = {
                let lsq_entry = self.lsq.get(lsq_index);
                debug_assert!(lsq_entry.valid && lsq_entry.addr_ready);
                debug_assert!(lsq_entry.is_store && lsq_entry.rob_index == head_index);
                (lsq_entry.opcode, lsq_entry.address, lsq_entry.data.unwrap())
            };
            self.memory_subsystem.borrow_mut().store(opcode, address, data);
            self.lsq.release(lsq_index);
        } else {
            if let Some(result) = result {
                match dest {
                    DestReg::Int(reg) => {
                        self.arch_reg_file.borrow_mut().set_int(reg, result.to_int());
                        let rat_entry = self.rat.get_int_mut(reg);
                        if rat_entry.valid && rat_entry.rob_index == head_index {
                            rat_entry.valid = false;
                        }
                    }
                    DestReg::Fp(reg) => {
                        self.arch_reg_file.borrow_mut().set_fp(reg, result.to_fp());
                        let rat_entry = self.rat.get_fp_mut(reg);
                        if rat_entry.valid && rat_entry.rob_index == head_index {
                            rat_entry.valid = false;
                        }
                    }
                    DestReg::None => {}
                }
            }

            if is_load {
                let lsq_index = lsq_index.unwrap();
                debug_assert!(self.lsq.get(lsq_index).dest == dest);
                self.lsq.release(lsq_index);
            }
        }

        if self.trace.retire {
            println!("Retired [{}]", instr.unwrap());
        }
        let mut perf_counters = self.perf_counters.borrow_mut();
        perf_counters.retire_cnt += 1;
        self.commit_log.push((pc, perf_counters.cycle_cnt));
        drop(perf_counters);

        self.rob.get_mut(head_index).state = ROBSlotState::COMMITTED;
        self.rob.deallocate();
    }

    pub(crate) fn print_cycle_state(&self, cycle: u64) {
        println!("\n========== CYCLE {} ==========", cycle);

        if !self.rob.is_empty() {
            println!(
                "ROB (head={}, tail={}, count={}):",
                self.rob.head_index(),
                self.rob.to_index(self.rob.tail),
                self.rob.size()
            );
            for seq in self.rob.head..self.rob.tail {
                let slot = self.rob.get(self.rob.to_index(seq));
                let lsq = match slot.lsq_index {
                    Some(index) => format!("{}", index),
                    None => String::from("-"),
                };
                println!(
                    "  ROB{} : {} dest={} state={:?} lsq={}{}",
                    slot.index,
                    slot.instr.unwrap(),
                    slot.dest,
                    slot.state,
                    lsq,
                    if slot.result.is_some() { " [has result]" } else { "" }
                );
            }
        }

        println!("Integer register status:");
        for reg in 0..ARCH_REG_COUNT {
            let rat_entry = &self.rat.int_table[reg];
            if rat_entry.valid {
                println!("  x{} <- ROB{}", reg, rat_entry.rob_index);
            }
        }
        println!("FP register status:");
        for reg in 0..ARCH_REG_COUNT {
            let rat_entry = &self.rat.fp_table[reg];
            if rat_entry.valid {
                println!("  f{} <- ROB{}", reg, rat_entry.rob_index);
            }
        }

        let arch_reg_file = self.arch_reg_file.borrow();
        println!("Integer register values:");
        for reg in 0..ARCH_REG_COUNT {
            let value = arch_reg_file.get_int(reg as RegisterType);
            if value != 0 {
                println!("  x{} = {}", reg, value as i64);
            }
        }
        println!("FP register values:");
        for reg in 0..ARCH_REG_COUNT {
            let value = arch_reg_file.get_fp(reg as RegisterType);
            if value != 0.0 {
                println!("  f{} = {}", reg, value);
            }
        }

        for rs_table in &self.rs_tables {
            let mut printed_header = false;
            for rs_index in 0..rs_table.capacity {
                let rs = rs_table.get(rs_index);
                if rs.state != RSState::BUSY {
                    continue;
                }
                if !printed_header {
                    println!("{}_RS:", rs_table.kind.name());
                    printed_header = true;
                }
                println!("  {}{}: {}", rs_table.kind.name(), rs_index, rs);
            }
        }

        if !self.cdb_broadcast_buffer.is_empty() {
            println!("CDB broadcasts:");
            for broadcast in &self.cdb_broadcast_buffer {
                println!("  ROB{} -> {}", broadcast.rob_index, broadcast.value);
            }
        }

        println!("========================================");
    }
}
