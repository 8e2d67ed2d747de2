use crate::instructions::instructions::{DestReg, DWordType, Opcode, Operand};

/// One load/store queue entry. For a store, `data` is the value to write at
/// commit; for a load, the value read at execute.
pub(crate) struct LSQEntry {
    pub(crate) valid: bool,
    pub(crate) is_store: bool,
    pub(crate) opcode: Opcode,
    pub(crate) address: DWordType,
    pub(crate) addr_ready: bool,
    pub(crate) data: Option<Operand>,
    pub(crate) rob_index: u16,
    pub(crate) dest: DestReg,
}

impl LSQEntry {
    fn reset(&mut self) {
        self.valid = false;
        self.is_store = false;
        self.opcode = Opcode::UNKNOWN;
        self.address = 0;
        self.addr_ready = false;
        self.data = None;
        self.rob_index = 0;
        self.dest = DestReg::None;
    }
}

/// The load/store queue. Entries sit in program order; because memory
/// operations commit in ROB order, entries are also released strictly in
/// allocation order, so the queue is a plain circular buffer.
pub(crate) struct LSQ {
    pub(crate) capacity: u16,
    head: u64,
    tail: u64,
    entries: Vec<LSQEntry>,
}

impl LSQ {
    pub(crate) fn new(capacity: u16) -> LSQ {
        let mut entries = Vec::with_capacity(capacity as usize);
        for _ in 0..capacity {
            entries.push(LSQEntry {
                valid: false,
                is_store: false,
                opcode: Opcode::UNKNOWN,
                address: 0,
                addr_ready: false,
                data: None,
                rob_index: 0,
                dest: DestReg::None,
            });
        }

        LSQ {
            capacity,
            head: 0,
            tail: 0,
            entries,
        }
    }

    fn to_index(&self, seq: u64) -> u16 {
        (seq % self.capacity as u64) as u16
    }

    pub(crate) fn size(&self) -> u16 {
        (self.tail - self.head) as u16
    }

    pub(crate) fn has_space(&self) -> bool {
        self.size() < self.capacity
    }

    pub(crate) fn allocate(&mut self) -> u16 {
        debug_assert!(self.has_space(), "LSQ: can't allocate when the LSQ is full");

        let index = self.to_index(self.tail);
        let entry = &mut self.entries[index as usize];
        debug_assert!(!entry.valid);
        entry.valid = true;
        self.tail += 1;
        index
    }

    pub(crate) fn get(&self, index: u16) -> &LSQEntry {
        &self.entries[index as usize]
    }

    // True if a store older than the given entry is still in the queue.
    // Such a store has not written memory yet, so a younger load must hold.
    pub(crate) fn has_older_store(&self, lsq_index: u16) -> bool {
        for seq in self.head..self.tail {
            let index = self.to_index(seq);
            if index == lsq_index {
                return false;
            }
            let entry = &self.entries[index as usize];
            if entry.valid && entry.is_store {
                return true;
            }
        }
        false
    }

    pub(crate) fn get_mut(&mut self, index: u16) -> &mut LSQEntry {
        &mut self.entries[index as usize]
    }

    // Entries are released at commit, which runs in program order.
    pub(crate) fn release(&mut self, index: u16) {
        debug_assert!(
            index == self.to_index(self.head),
            "LSQ: release out of order, index={} head={}",
            index,
            self.to_index(self.head)
        );

        let entry = &mut self.entries[index as usize];
        debug_assert!(entry.valid);
        entry.reset();
        self.head += 1;
    }
}
