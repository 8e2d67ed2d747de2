use std::fmt;
use std::fmt::Display;

use crate::instructions::instructions::{mnemonic, Opcode, Operand, RSKind};

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum RSState {
    IDLE,
    BUSY,
}

/// A single reservation station. An operand slot is either resolved (`vj`
/// present, `qj` empty) or waiting on the ROB slot named by `qj`.
pub(crate) struct RS {
    pub(crate) index: u16,
    pub(crate) state: RSState,
    pub(crate) opcode: Opcode,
    pub(crate) qj: Option<u16>,
    pub(crate) vj: Option<Operand>,
    pub(crate) qk: Option<u16>,
    pub(crate) vk: Option<Operand>,
    // the immediate (address offset for loads/stores)
    pub(crate) a: i64,
    pub(crate) pc: usize,
    pub(crate) rob_index: Option<u16>,
}

impl RS {
    fn new(index: u16) -> Self {
        Self {
            index,
            state: RSState::IDLE,
            opcode: Opcode::UNKNOWN,
            qj: None,
            vj: None,
            qk: None,
            vk: None,
            a: 0,
            pc: 0,
            rob_index: None,
        }
    }

    fn reset(&mut self) {
        self.state = RSState::IDLE;
        self.opcode = Opcode::UNKNOWN;
        self.qj = None;
        self.vj = None;
        self.qk = None;
        self.vk = None;
        self.a = 0;
        self.pc = 0;
        self.rob_index = None;
    }

    // Ready for dispatch: every tag resolved. Loads only carry one operand.
    pub(crate) fn is_ready(&self, kind: RSKind) -> bool {
        if self.qj.is_some() || self.vj.is_none() {
            return false;
        }
        if kind == RSKind::LOAD {
            return true;
        }
        self.qk.is_none() && self.vk.is_some()
    }
}

impl Display for RS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mnemonic(self.opcode))?;
        if let Some(rob_index) = self.rob_index {
            write!(f, " ROB{}", rob_index)?;
        }
        match self.qj {
            Some(tag) => write!(f, " Qj=ROB{}", tag)?,
            None => write!(f, " Qj=-")?,
        }
        match self.qk {
            Some(tag) => write!(f, " Qk=ROB{}", tag)?,
            None => write!(f, " Qk=-")?,
        }
        if let Some(vj) = self.vj {
            write!(f, " Vj={}", vj)?;
        }
        if let Some(vk) = self.vk {
            write!(f, " Vk={}", vk)?;
        }
        write!(f, " A={}", self.a)
    }
}

/// One reservation-station pool: the fixed-capacity set of stations in front
/// of one class of execution units.
pub(crate) struct RSTable {
    pub(crate) kind: RSKind,
    pub(crate) capacity: u16,
    idle_stack: Vec<u16>,
    array: Vec<RS>,
}

impl RSTable {
    pub(crate) fn new(kind: RSKind, capacity: u16) -> Self {
        let mut idle_stack = Vec::with_capacity(capacity as usize);
        let mut array = Vec::with_capacity(capacity as usize);
        for i in 0..capacity {
            array.push(RS::new(i));
            idle_stack.push(capacity - 1 - i);
        }

        RSTable {
            kind,
            capacity,
            array,
            idle_stack,
        }
    }

    pub(crate) fn get(&self, rs_index: u16) -> &RS {
        &self.array[rs_index as usize]
    }

    pub(crate) fn get_mut(&mut self, rs_index: u16) -> &mut RS {
        &mut self.array[rs_index as usize]
    }

    pub(crate) fn has_idle(&self) -> bool {
        !self.idle_stack.is_empty()
    }

    pub(crate) fn allocate(&mut self) -> u16 {
        if let Some(rs_index) = self.idle_stack.pop() {
            let rs = &mut self.array[rs_index as usize];
            debug_assert!(rs.state == RSState::IDLE);
            rs.state = RSState::BUSY;
            rs_index
        } else {
            panic!("No idle RS in the {} pool", self.kind.name())
        }
    }

    pub(crate) fn deallocate(&mut self, rs_index: u16) {
        let rs = &mut self.array[rs_index as usize];
        debug_assert!(rs.index == rs_index);
        debug_assert!(rs.state == RSState::BUSY);
        debug_assert!(!self.idle_stack.contains(&rs_index));

        rs.reset();
        self.idle_stack.push(rs_index);
    }
}
