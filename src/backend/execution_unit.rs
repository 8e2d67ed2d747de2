use crate::instructions::instructions::{DWordType, Opcode, Operand, RSKind};

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum EUState {
    IDLE,
    EXECUTING,
}

/// A single execution unit. Operands, immediate and pc are snapshotted from
/// the reservation station at dispatch; the station itself is released at
/// that point.
pub(crate) struct EU {
    pub(crate) index: u8,
    pub(crate) state: EUState,
    pub(crate) kind: RSKind,
    pub(crate) opcode: Opcode,
    pub(crate) v1: Option<Operand>,
    pub(crate) v2: Option<Operand>,
    pub(crate) a: i64,
    pub(crate) pc: usize,
    pub(crate) rob_index: Option<u16>,
    pub(crate) cycles_remaining: u8,
}

impl EU {
    fn reset(&mut self) {
        self.state = EUState::IDLE;
        self.opcode = Opcode::UNKNOWN;
        self.v1 = None;
        self.v2 = None;
        self.a = 0;
        self.pc = 0;
        self.rob_index = None;
        self.cycles_remaining = 0;
    }

    // The byte address of the instruction this EU is processing.
    fn pc_bytes(&self) -> DWordType {
        (self.pc as DWordType) * 4
    }

    /// Computes the result of a completed arithmetic operation. Loads and
    /// stores are handled by the backend because they touch memory and the
    /// LSQ rather than produce a pure value.
    pub(crate) fn compute_result(&self) -> Operand {
        match self.kind {
            RSKind::INTALU => self.execute_int_alu(),
            RSKind::MULDIV => self.execute_muldiv(),
            RSKind::FPADD => self.execute_fp_add(),
            RSKind::FPMUL => self.execute_fp_mul(),
            RSKind::FPDIV => self.execute_fp_div(),
            RSKind::LOAD | RSKind::STORE => {
                panic!("{:?} has no computed result", self.kind)
            }
        }
    }

    fn execute_int_alu(&self) -> Operand {
        let j = self.v1.unwrap().to_int();
        let k = self.v2.unwrap().to_int();

        let result = match self.opcode {
            Opcode::ADD | Opcode::ADDI => j.wrapping_add(k),
            Opcode::SUB => j.wrapping_sub(k),
            Opcode::AND | Opcode::ANDI => j & k,
            Opcode::OR | Opcode::ORI => j | k,
            Opcode::XOR | Opcode::XORI => j ^ k,
            Opcode::SLT | Opcode::SLTI => ((j as i64) < (k as i64)) as DWordType,
            Opcode::SLTU | Opcode::SLTIU => (j < k) as DWordType,
            Opcode::SLL => j << (k & 0x3F),
            Opcode::SRL => j >> (k & 0x3F),
            Opcode::SRA => ((j as i64) >> (k & 0x3F)) as DWordType,
            Opcode::LUI => k,
            Opcode::AUIPC => self.pc_bytes().wrapping_add(k),
            // the link value; the redirect itself is handled by the backend
            Opcode::JALR => self.pc_bytes() + 4,
            // the taken bit
            Opcode::BNE => (j != k) as DWordType,
            _ => panic!("Unsupported INTALU op {:?}", self.opcode),
        };
        Operand::Int(result)
    }

    fn execute_muldiv(&self) -> Operand {
        let uj = self.v1.unwrap().to_int();
        let uk = self.v2.unwrap().to_int();
        let j = uj as i64;
        let k = uk as i64;

        let result = match self.opcode {
            Opcode::MUL => j.wrapping_mul(k) as DWordType,
            Opcode::MULH => (((j as i128) * (k as i128)) >> 64) as DWordType,
            Opcode::MULHSU => (((j as i128) * (uk as i128)) >> 64) as DWordType,
            Opcode::MULHU => (((uj as u128) * (uk as u128)) >> 64) as DWordType,
            Opcode::DIV => {
                if k == 0 {
                    DWordType::MAX
                } else {
                    j.wrapping_div(k) as DWordType
                }
            }
            Opcode::DIVU => {
                if uk == 0 {
                    DWordType::MAX
                } else {
                    uj / uk
                }
            }
            Opcode::REM => {
                if k == 0 {
                    uj
                } else {
                    j.wrapping_rem(k) as DWordType
                }
            }
            Opcode::REMU => {
                if uk == 0 {
                    uj
                } else {
                    uj % uk
                }
            }
            _ => panic!("Unsupported MULDIV op {:?}", self.opcode),
        };
        Operand::Int(result)
    }

    fn execute_fp_add(&self) -> Operand {
        let fj = self.v1.unwrap().to_fp();
        let fk = self.v2.unwrap().to_fp();

        match self.opcode {
            Opcode::FADD_D => Operand::Fp(fj + fk),
            Opcode::FSUB_D => Operand::Fp(fj - fk),
            Opcode::FEQ_D => Operand::Int((fj == fk) as DWordType),
            Opcode::FLT_D => Operand::Int((fj < fk) as DWordType),
            Opcode::FLE_D => Operand::Int((fj <= fk) as DWordType),
            _ => panic!("Unsupported FPADD op {:?}", self.opcode),
        }
    }

    fn execute_fp_mul(&self) -> Operand {
        match self.opcode {
            Opcode::FMUL_D => {
                let fj = self.v1.unwrap().to_fp();
                let fk = self.v2.unwrap().to_fp();
                Operand::Fp(fj * fk)
            }
            Opcode::FCVT_D_W => {
                let word = self.v1.unwrap().to_int() as u32;
                Operand::Fp(word as i32 as f64)
            }
            Opcode::FCVT_W_D => {
                let value = self.v1.unwrap().to_fp();
                Operand::Int((value as i32) as u32 as DWordType)
            }
            _ => panic!("Unsupported FPMUL op {:?}", self.opcode),
        }
    }

    fn execute_fp_div(&self) -> Operand {
        debug_assert!(self.opcode == Opcode::FDIV_D);

        let fj = self.v1.unwrap().to_fp();
        let fk = self.v2.unwrap().to_fp();
        if fk == 0.0 {
            Operand::Fp(f64::NAN)
        } else {
            Operand::Fp(fj / fk)
        }
    }
}

/// One pool of execution units, matching one reservation-station pool.
pub(crate) struct EUTable {
    pub(crate) kind: RSKind,
    pub(crate) capacity: u8,
    idle_stack: Vec<u8>,
    array: Vec<EU>,
}

impl EUTable {
    pub(crate) fn new(kind: RSKind, capacity: u8) -> EUTable {
        let mut idle_stack = Vec::with_capacity(capacity as usize);
        let mut array = Vec::with_capacity(capacity as usize);
        for i in 0..capacity {
            array.push(EU {
                index: i,
                state: EUState::IDLE,
                kind,
                opcode: Opcode::UNKNOWN,
                v1: None,
                v2: None,
                a: 0,
                pc: 0,
                rob_index: None,
                cycles_remaining: 0,
            });
            idle_stack.push(capacity - 1 - i);
        }

        EUTable {
            kind,
            capacity,
            array,
            idle_stack,
        }
    }

    pub(crate) fn has_idle(&self) -> bool {
        !self.idle_stack.is_empty()
    }

    pub(crate) fn get(&self, eu_index: u8) -> &EU {
        &self.array[eu_index as usize]
    }

    pub(crate) fn get_mut(&mut self, eu_index: u8) -> &mut EU {
        &mut self.array[eu_index as usize]
    }

    pub(crate) fn allocate(&mut self) -> u8 {
        if let Some(eu_index) = self.idle_stack.pop() {
            let eu = &mut self.array[eu_index as usize];
            debug_assert!(eu.state == EUState::IDLE);
            debug_assert!(eu.rob_index.is_none());
            debug_assert!(eu.cycles_remaining == 0);

            eu.state = EUState::EXECUTING;
            eu_index
        } else {
            panic!("No idle EU in the {} pool", self.kind.name())
        }
    }

    pub(crate) fn deallocate(&mut self, eu_index: u8) {
        let eu = &mut self.array[eu_index as usize];
        debug_assert!(eu.index == eu_index);
        debug_assert!(eu.state == EUState::EXECUTING);
        debug_assert!(!self.idle_stack.contains(&eu_index));

        eu.reset();
        self.idle_stack.push(eu_index);
    }
}
