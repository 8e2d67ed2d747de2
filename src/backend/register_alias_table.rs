use crate::instructions::instructions::{RegisterType, ARCH_REG_COUNT};

pub(crate) struct RATEntry {
    // The ROB slot of the youngest in-flight writer of this register.
    pub(crate) rob_index: u16,
    // If not valid, the committed value in the register file is current.
    pub(crate) valid: bool,
}

/// The register status tables used for renaming: one per register file. A
/// valid entry aliases the architectural register to the ROB slot that will
/// produce its next value; as long as such an entry exists, readers must
/// depend on that slot instead of the register file.
pub(crate) struct RAT {
    pub(crate) int_table: Vec<RATEntry>,
    pub(crate) fp_table: Vec<RATEntry>,
}

impl RAT {
    pub(crate) fn new() -> Self {
        let mut int_table = Vec::with_capacity(ARCH_REG_COUNT);
        let mut fp_table = Vec::with_capacity(ARCH_REG_COUNT);
        for _ in 0..ARCH_REG_COUNT {
            int_table.push(RATEntry { rob_index: 0, valid: false });
            fp_table.push(RATEntry { rob_index: 0, valid: false });
        }
        Self { int_table, fp_table }
    }

    pub(crate) fn get_int(&self, arch_reg: RegisterType) -> &RATEntry {
        &self.int_table[arch_reg as usize]
    }

    pub(crate) fn get_int_mut(&mut self, arch_reg: RegisterType) -> &mut RATEntry {
        &mut self.int_table[arch_reg as usize]
    }

    pub(crate) fn get_fp(&self, arch_reg: RegisterType) -> &RATEntry {
        &self.fp_table[arch_reg as usize]
    }

    pub(crate) fn get_fp_mut(&mut self, arch_reg: RegisterType) -> &mut RATEntry {
        &mut self.fp_table[arch_reg as usize]
    }
}
