use std::collections::HashMap;

use crate::cpu::InitialState;
use crate::instructions::instructions::{DWordType, Opcode, Operand};

/// The memory of the machine: two sparse address-keyed stores, one for
/// integer words/doublewords and one for fp doublewords. A load from an
/// address without an entry reads zero of the appropriate variant.
pub(crate) struct MemorySubsystem {
    pub(crate) memory_int: HashMap<DWordType, DWordType>,
    pub(crate) memory_fp: HashMap<DWordType, f64>,
}

impl MemorySubsystem {
    pub(crate) fn new() -> MemorySubsystem {
        MemorySubsystem {
            memory_int: HashMap::new(),
            memory_fp: HashMap::new(),
        }
    }

    pub(crate) fn init(&mut self, initial_state: &InitialState) {
        self.memory_int.clear();
        self.memory_fp.clear();

        for &(addr, value) in &initial_state.int_memory {
            self.memory_int.insert(addr, value);
        }
        for &(addr, value) in &initial_state.fp_memory {
            self.memory_fp.insert(addr, value);
        }
    }

    pub(crate) fn load(&self, opcode: Opcode, addr: DWordType) -> Operand {
        match opcode {
            Opcode::LW | Opcode::LD => {
                Operand::Int(self.memory_int.get(&addr).copied().unwrap_or(0))
            }
            Opcode::FLD => Operand::Fp(self.memory_fp.get(&addr).copied().unwrap_or(0.0)),
            _ => panic!("Not a load: {:?}", opcode),
        }
    }

    pub(crate) fn store(&mut self, opcode: Opcode, addr: DWordType, data: Operand) {
        match opcode {
            Opcode::SW | Opcode::SD => {
                self.memory_int.insert(addr, data.to_int());
            }
            Opcode::FSD => {
                self.memory_fp.insert(addr, data.to_fp());
            }
            _ => panic!("Not a store: {:?}", opcode),
        }
    }
}
