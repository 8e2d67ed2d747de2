use crate::instructions::instructions::{Instr, Opcode};

const OP_LOAD: u32 = 0x03;
const OP_FLOAD: u32 = 0x07;
const OP_IMM: u32 = 0x13;
const OP_AUIPC: u32 = 0x17;
const OP_STORE: u32 = 0x23;
const OP_FSTORE: u32 = 0x27;
const OP_OP: u32 = 0x33;
const OP_LUI: u32 = 0x37;
const OP_FP: u32 = 0x53;
const OP_BRANCH: u32 = 0x63;
const OP_JALR: u32 = 0x67;
const OP_SYSTEM: u32 = 0x73;

fn get_opcode(inst: u32) -> u32 {
    inst & 0x7F
}

fn get_rd(inst: u32) -> u8 {
    ((inst >> 7) & 0x1F) as u8
}

fn get_funct3(inst: u32) -> u32 {
    (inst >> 12) & 0x7
}

fn get_rs1(inst: u32) -> u8 {
    ((inst >> 15) & 0x1F) as u8
}

fn get_rs2(inst: u32) -> u8 {
    ((inst >> 20) & 0x1F) as u8
}

fn get_funct7(inst: u32) -> u32 {
    (inst >> 25) & 0x7F
}

fn decode_imm_i(inst: u32) -> i32 {
    (inst as i32) >> 20
}

fn decode_imm_s(inst: u32) -> i32 {
    let imm11_5 = (inst >> 25) & 0x7F;
    let imm4_0 = (inst >> 7) & 0x1F;
    let mut imm = (imm11_5 << 5) | imm4_0;
    if (imm & (1 << 11)) != 0 {
        imm |= 0xFFFF_F000;
    }
    imm as i32
}

fn decode_imm_b(inst: u32) -> i32 {
    let imm12 = (inst >> 31) & 0x1;
    let imm11 = (inst >> 7) & 0x1;
    let imm10_5 = (inst >> 25) & 0x3F;
    let imm4_1 = (inst >> 8) & 0xF;
    let mut imm = (imm12 << 12) | (imm11 << 11) | (imm10_5 << 5) | (imm4_1 << 1);
    if (imm & (1 << 12)) != 0 {
        imm |= 0xFFFF_E000;
    }
    imm as i32
}

/// Decodes one little-endian 32-bit word into the uniform instruction record.
/// Unrecognized encodings decode as UNKNOWN and retire as no-ops.
pub(crate) fn decode_instruction(inst_word: u32) -> Instr {
    let mut inst = Instr::unknown(inst_word);

    match get_opcode(inst_word) {
        OP_LOAD => {
            inst.rd = Some(get_rd(inst_word));
            inst.rs1 = Some(get_rs1(inst_word));
            inst.imm = decode_imm_i(inst_word);
            inst.opcode = match get_funct3(inst_word) {
                0x2 => Opcode::LW,
                0x3 => Opcode::LD,
                _ => return Instr::unknown(inst_word),
            };
        }
        OP_STORE => {
            inst.rs1 = Some(get_rs1(inst_word));
            inst.rs2 = Some(get_rs2(inst_word));
            inst.imm = decode_imm_s(inst_word);
            inst.opcode = match get_funct3(inst_word) {
                0x2 => Opcode::SW,
                0x3 => Opcode::SD,
                _ => return Instr::unknown(inst_word),
            };
        }
        OP_OP => {
            inst.rd = Some(get_rd(inst_word));
            inst.rs1 = Some(get_rs1(inst_word));
            inst.rs2 = Some(get_rs2(inst_word));
            inst.opcode = match (get_funct3(inst_word), get_funct7(inst_word)) {
                (0x0, 0x00) => Opcode::ADD,
                (0x0, 0x20) => Opcode::SUB,
                (0x1, 0x00) => Opcode::SLL,
                (0x2, 0x00) => Opcode::SLT,
                (0x3, 0x00) => Opcode::SLTU,
                (0x4, 0x00) => Opcode::XOR,
                (0x5, 0x00) => Opcode::SRL,
                (0x5, 0x20) => Opcode::SRA,
                (0x6, 0x00) => Opcode::OR,
                (0x7, 0x00) => Opcode::AND,
                (0x0, 0x01) => Opcode::MUL,
                (0x1, 0x01) => Opcode::MULH,
                (0x2, 0x01) => Opcode::MULHSU,
                (0x3, 0x01) => Opcode::MULHU,
                (0x4, 0x01) => Opcode::DIV,
                (0x5, 0x01) => Opcode::DIVU,
                (0x6, 0x01) => Opcode::REM,
                (0x7, 0x01) => Opcode::REMU,
                _ => return Instr::unknown(inst_word),
            };
        }
        OP_IMM => {
            inst.rd = Some(get_rd(inst_word));
            inst.rs1 = Some(get_rs1(inst_word));
            inst.imm = decode_imm_i(inst_word);
            inst.opcode = match get_funct3(inst_word) {
                0x0 => Opcode::ADDI,
                0x2 => Opcode::SLTI,
                0x3 => Opcode::SLTIU,
                0x4 => Opcode::XORI,
                0x6 => Opcode::ORI,
                0x7 => Opcode::ANDI,
                _ => return Instr::unknown(inst_word),
            };
        }
        OP_LUI => {
            inst.opcode = Opcode::LUI;
            inst.rd = Some(get_rd(inst_word));
            inst.imm = (inst_word & 0xFFFF_F000) as i32;
        }
        OP_AUIPC => {
            inst.opcode = Opcode::AUIPC;
            inst.rd = Some(get_rd(inst_word));
            inst.imm = (inst_word & 0xFFFF_F000) as i32;
        }
        OP_JALR => {
            inst.opcode = Opcode::JALR;
            inst.rd = Some(get_rd(inst_word));
            inst.rs1 = Some(get_rs1(inst_word));
            inst.imm = decode_imm_i(inst_word);
        }
        OP_BRANCH => {
            if get_funct3(inst_word) != 0x1 {
                return Instr::unknown(inst_word);
            }
            inst.opcode = Opcode::BNE;
            inst.rs1 = Some(get_rs1(inst_word));
            inst.rs2 = Some(get_rs2(inst_word));
            inst.imm = decode_imm_b(inst_word);
        }
        OP_FLOAD => {
            if get_funct3(inst_word) != 0x3 {
                return Instr::unknown(inst_word);
            }
            inst.opcode = Opcode::FLD;
            inst.fd = Some(get_rd(inst_word));
            inst.rs1 = Some(get_rs1(inst_word));
            inst.imm = decode_imm_i(inst_word);
            inst.is_fp = true;
        }
        OP_FSTORE => {
            if get_funct3(inst_word) != 0x3 {
                return Instr::unknown(inst_word);
            }
            inst.opcode = Opcode::FSD;
            inst.rs1 = Some(get_rs1(inst_word));
            inst.fs2 = Some(get_rs2(inst_word));
            inst.imm = decode_imm_s(inst_word);
            inst.is_fp = true;
        }
        OP_FP => {
            let f3 = get_funct3(inst_word);
            let f7 = get_funct7(inst_word);
            inst.fd = Some(get_rd(inst_word));
            inst.fs1 = Some(get_rs1(inst_word));
            inst.fs2 = Some(get_rs2(inst_word));
            inst.is_fp = true;

            if f3 == 0x3 || f3 == 0x7 {
                inst.opcode = match f7 {
                    0x01 | 0x02 => Opcode::FADD_D,
                    0x05 => Opcode::FSUB_D,
                    0x09 => Opcode::FMUL_D,
                    0x0D => Opcode::FDIV_D,
                    _ => return Instr::unknown(inst_word),
                };
            } else if f7 == 0x51 {
                // Comparisons produce an integer 0/1 into rd.
                inst.rd = inst.fd.take();
                inst.opcode = match f3 {
                    0x2 => Opcode::FEQ_D,
                    0x1 => Opcode::FLT_D,
                    0x0 => Opcode::FLE_D,
                    _ => return Instr::unknown(inst_word),
                };
            } else if f3 == 0x0 && (f7 == 0x60 || f7 == 0x68 || f7 == 0x69) {
                // fcvt.d.w: the source is an integer register.
                inst.rs1 = inst.fs1.take();
                inst.fs2 = None;
                inst.opcode = Opcode::FCVT_D_W;
            } else if f3 == 0x1 && (f7 == 0x60 || f7 == 0x61) {
                // fcvt.w.d: the destination is an integer register.
                inst.rd = inst.fd.take();
                inst.fs2 = None;
                inst.opcode = Opcode::FCVT_W_D;
            } else {
                return Instr::unknown(inst_word);
            }
        }
        OP_SYSTEM => {
            // Any imm bits are accepted, so both 0x00000073 and 0x00100073
            // terminate the simulation.
            if (inst_word & 0x000F_FFFF) == OP_SYSTEM {
                inst.opcode = Opcode::EBREAK;
            } else {
                return Instr::unknown(inst_word);
            }
        }
        _ => return Instr::unknown(inst_word),
    }

    inst
}
