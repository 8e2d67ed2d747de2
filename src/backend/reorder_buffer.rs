use crate::instructions::instructions::{DestReg, Instr, Opcode, Operand};

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum ROBSlotState {
    // the initial state
    IDLE,
    // the instruction occupies the slot but has not been dispatched
    ISSUED,
    // the instruction is being processed by an execution unit
    EXECUTING,
    // the result (if any) is available in the slot
    EXECUTED,
    // the instruction has retired
    COMMITTED,
}

pub(crate) struct ROBSlot {
    pub(crate) index: u16,
    pub(crate) state: ROBSlotState,
    pub(crate) opcode: Opcode,
    pub(crate) dest: DestReg,
    pub(crate) is_load: bool,
    pub(crate) is_store: bool,
    pub(crate) result: Option<Operand>,
    pub(crate) lsq_index: Option<u16>,
    // index of the instruction in the stream; branch redirects are computed
    // from it
    pub(crate) pc: usize,
    pub(crate) instr: Option<Instr>,
}

impl ROBSlot {
    fn reset(&mut self) {
        self.state = ROBSlotState::IDLE;
        self.opcode = Opcode::UNKNOWN;
        self.dest = DestReg::None;
        self.is_load = false;
        self.is_store = false;
        self.result = None;
        self.lsq_index = None;
        self.pc = 0;
        self.instr = None;
    }
}

/// The reorder buffer: a circular queue of every in-flight instruction,
/// retired strictly from the head.
pub(crate) struct ROB {
    pub(crate) capacity: u16,
    pub(crate) head: u64,
    pub(crate) tail: u64,
    pub(crate) slots: Vec<ROBSlot>,
}

impl ROB {
    pub(crate) fn new(capacity: u16) -> Self {
        let mut slots = Vec::with_capacity(capacity as usize);
        for k in 0..capacity {
            slots.push(ROBSlot {
                index: k,
                state: ROBSlotState::IDLE,
                opcode: Opcode::UNKNOWN,
                dest: DestReg::None,
                is_load: false,
                is_store: false,
                result: None,
                lsq_index: None,
                pc: 0,
                instr: None,
            });
        }

        Self {
            capacity,
            head: 0,
            tail: 0,
            slots,
        }
    }

    pub(crate) fn to_index(&self, seq: u64) -> u16 {
        (seq % self.capacity as u64) as u16
    }

    pub(crate) fn head_index(&self) -> u16 {
        self.to_index(self.head)
    }

    pub(crate) fn get(&self, slot_index: u16) -> &ROBSlot {
        &self.slots[slot_index as usize]
    }

    pub(crate) fn get_mut(&mut self, slot_index: u16) -> &mut ROBSlot {
        &mut self.slots[slot_index as usize]
    }

    pub(crate) fn allocate(&mut self) -> u16 {
        debug_assert!(self.has_space(), "ROB: can't allocate if the ROB has no space");

        let index = self.to_index(self.tail);
        self.tail += 1;
        index
    }

    pub(crate) fn deallocate(&mut self) {
        debug_assert!(!self.is_empty(), "ROB: can't deallocate if the ROB is empty");

        let index = self.head_index() as usize;
        self.slots[index].reset();
        self.head += 1;
    }

    pub(crate) fn size(&self) -> u16 {
        (self.tail - self.head) as u16
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub(crate) fn has_space(&self) -> bool {
        self.capacity > self.size()
    }
}
