#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::cpu::{CPUConfig, InitialState, CPU};
    use crate::instructions::instructions::{DWordType, Opcode, Program, RegisterType};
    use crate::loader::decoder::decode_instruction;

    // Encoders for the instruction formats, so test programs are real
    // binaries that go through the decoder.

    fn r_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, rs2: u32, funct7: u32) -> u32 {
        opcode | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (funct7 << 25)
    }

    fn i_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, imm: i32) -> u32 {
        opcode | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (((imm as u32) & 0xFFF) << 20)
    }

    fn s_type(opcode: u32, funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
        let imm = imm as u32;
        opcode
            | ((imm & 0x1F) << 7)
            | (funct3 << 12)
            | (rs1 << 15)
            | (rs2 << 20)
            | (((imm >> 5) & 0x7F) << 25)
    }

    fn b_type(funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
        let imm = imm as u32;
        0x63 | (((imm >> 11) & 0x1) << 7)
            | (((imm >> 1) & 0xF) << 8)
            | (funct3 << 12)
            | (rs1 << 15)
            | (rs2 << 20)
            | (((imm >> 5) & 0x3F) << 25)
            | (((imm >> 12) & 0x1) << 31)
    }

    fn add(rd: u32, rs1: u32, rs2: u32) -> u32 {
        r_type(0x33, rd, 0x0, rs1, rs2, 0x00)
    }

    fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
        r_type(0x33, rd, 0x0, rs1, rs2, 0x20)
    }

    fn sra(rd: u32, rs1: u32, rs2: u32) -> u32 {
        r_type(0x33, rd, 0x5, rs1, rs2, 0x20)
    }

    fn mul(rd: u32, rs1: u32, rs2: u32) -> u32 {
        r_type(0x33, rd, 0x0, rs1, rs2, 0x01)
    }

    fn div(rd: u32, rs1: u32, rs2: u32) -> u32 {
        r_type(0x33, rd, 0x4, rs1, rs2, 0x01)
    }

    fn rem(rd: u32, rs1: u32, rs2: u32) -> u32 {
        r_type(0x33, rd, 0x6, rs1, rs2, 0x01)
    }

    fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
        i_type(0x13, rd, 0x0, rs1, imm)
    }

    fn ld(rd: u32, rs1: u32, imm: i32) -> u32 {
        i_type(0x03, rd, 0x3, rs1, imm)
    }

    fn lw(rd: u32, rs1: u32, imm: i32) -> u32 {
        i_type(0x03, rd, 0x2, rs1, imm)
    }

    fn sd(rs2: u32, rs1: u32, imm: i32) -> u32 {
        s_type(0x23, 0x3, rs1, rs2, imm)
    }

    fn sw(rs2: u32, rs1: u32, imm: i32) -> u32 {
        s_type(0x23, 0x2, rs1, rs2, imm)
    }

    fn fld(fd: u32, rs1: u32, imm: i32) -> u32 {
        i_type(0x07, fd, 0x3, rs1, imm)
    }

    fn fsd(fs2: u32, rs1: u32, imm: i32) -> u32 {
        s_type(0x27, 0x3, rs1, fs2, imm)
    }

    fn fadd_d(fd: u32, fs1: u32, fs2: u32) -> u32 {
        r_type(0x53, fd, 0x7, fs1, fs2, 0x01)
    }

    fn fmul_d(fd: u32, fs1: u32, fs2: u32) -> u32 {
        r_type(0x53, fd, 0x7, fs1, fs2, 0x09)
    }

    fn fdiv_d(fd: u32, fs1: u32, fs2: u32) -> u32 {
        r_type(0x53, fd, 0x7, fs1, fs2, 0x0D)
    }

    fn feq_d(rd: u32, fs1: u32, fs2: u32) -> u32 {
        r_type(0x53, rd, 0x2, fs1, fs2, 0x51)
    }

    fn flt_d(rd: u32, fs1: u32, fs2: u32) -> u32 {
        r_type(0x53, rd, 0x1, fs1, fs2, 0x51)
    }

    fn fcvt_d_w(fd: u32, rs1: u32) -> u32 {
        r_type(0x53, fd, 0x0, rs1, 0, 0x69)
    }

    fn fcvt_w_d(rd: u32, fs1: u32) -> u32 {
        r_type(0x53, rd, 0x1, fs1, 0, 0x61)
    }

    fn lui(rd: u32, imm: u32) -> u32 {
        0x37 | (rd << 7) | (imm & 0xFFFF_F000)
    }

    fn auipc(rd: u32, imm: u32) -> u32 {
        0x17 | (rd << 7) | (imm & 0xFFFF_F000)
    }

    fn jalr(rd: u32, rs1: u32, imm: i32) -> u32 {
        i_type(0x67, rd, 0x0, rs1, imm)
    }

    fn bne(rs1: u32, rs2: u32, imm: i32) -> u32 {
        b_type(0x1, rs1, rs2, imm)
    }

    fn ebreak() -> u32 {
        0x0010_0073
    }

    #[test]
    fn test_decode_r_type_fields() {
        let instr = decode_instruction(add(7, 5, 6));
        assert_eq!(instr.opcode, Opcode::ADD);
        assert_eq!(instr.rd, Some(7));
        assert_eq!(instr.rs1, Some(5));
        assert_eq!(instr.rs2, Some(6));

        let instr = decode_instruction(sub(1, 2, 3));
        assert_eq!(instr.opcode, Opcode::SUB);

        let instr = decode_instruction(mul(1, 2, 3));
        assert_eq!(instr.opcode, Opcode::MUL);
    }

    #[test]
    fn test_decode_imm_sign_extension() {
        let instr = decode_instruction(addi(5, 0, -1));
        assert_eq!(instr.opcode, Opcode::ADDI);
        assert_eq!(instr.imm, -1);

        let instr = decode_instruction(sd(5, 6, -16));
        assert_eq!(instr.opcode, Opcode::SD);
        assert_eq!(instr.imm, -16);
        assert_eq!(instr.rs1, Some(6));
        assert_eq!(instr.rs2, Some(5));

        let instr = decode_instruction(bne(5, 0, -8));
        assert_eq!(instr.opcode, Opcode::BNE);
        assert_eq!(instr.imm, -8);
    }

    #[test]
    fn test_decode_fp() {
        let instr = decode_instruction(fadd_d(3, 1, 2));
        assert_eq!(instr.opcode, Opcode::FADD_D);
        assert_eq!(instr.fd, Some(3));
        assert_eq!(instr.fs1, Some(1));
        assert_eq!(instr.fs2, Some(2));
        assert!(instr.is_fp);

        // conversions cross the register files
        let instr = decode_instruction(fcvt_d_w(3, 5));
        assert_eq!(instr.opcode, Opcode::FCVT_D_W);
        assert_eq!(instr.fd, Some(3));
        assert_eq!(instr.rs1, Some(5));
        assert_eq!(instr.fs1, None);

        let instr = decode_instruction(fcvt_w_d(5, 3));
        assert_eq!(instr.opcode, Opcode::FCVT_W_D);
        assert_eq!(instr.rd, Some(5));
        assert_eq!(instr.fs1, Some(3));
        assert_eq!(instr.fd, None);

        // comparisons write an integer register
        let instr = decode_instruction(feq_d(5, 1, 2));
        assert_eq!(instr.opcode, Opcode::FEQ_D);
        assert_eq!(instr.rd, Some(5));
        assert_eq!(instr.fd, None);
    }

    #[test]
    fn test_decode_unknown() {
        let instr = decode_instruction(0xFFFF_FFFF);
        assert_eq!(instr.opcode, Opcode::UNKNOWN);

        let instr = decode_instruction(ebreak());
        assert_eq!(instr.opcode, Opcode::EBREAK);
    }

    #[test]
    fn test_load_missing_file() {
        use crate::loader::loader::{load, LoadError};

        match load("/nonexistent/program.bin") {
            Err(LoadError::NotFoundError(_)) => {}
            _ => panic!("expected NotFoundError"),
        }
    }

    #[test]
    fn test_add_chain() {
        let mut harness = TestHarness::default();
        harness.run(&[addi(5, 0, 100), addi(6, 0, 10), add(7, 5, 6)]);
        harness.assert_int_reg(5, 100);
        harness.assert_int_reg(6, 10);
        harness.assert_int_reg(7, 110);
    }

    // A slow MUL and a fast ADD write the same register; renaming plus
    // in-order commit must leave the ADD's value, and both must retire.
    #[test]
    fn test_waw_elimination() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 100);
        harness.set_int_reg(6, 200);
        harness.set_int_reg(7, 1);
        harness.set_int_reg(8, 2);
        harness.run(&[mul(10, 5, 6), add(10, 7, 8)]);

        harness.assert_int_reg(10, 3);
        assert_eq!(harness.retired(), 2);
        assert!(harness.commit_cycle(0) < harness.commit_cycle(1));
    }

    #[test]
    fn test_waw_same_reg_burst() {
        let mut harness = TestHarness::default();
        harness.run(&[
            addi(5, 0, 1),
            addi(5, 0, 2),
            addi(5, 0, 3),
            addi(5, 0, 4),
            addi(5, 0, 5),
            addi(5, 0, 6),
            addi(5, 0, 7),
            addi(5, 0, 8),
        ]);
        harness.assert_int_reg(5, 8);
    }

    #[test]
    fn test_raw_dependency_chain() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 10);
        harness.set_int_reg(6, 20);
        harness.set_int_reg(7, 30);
        harness.set_int_reg(8, 40);
        harness.run(&[add(10, 5, 6), mul(11, 10, 7), add(12, 11, 8)]);

        harness.assert_int_reg(10, 30);
        harness.assert_int_reg(11, 900);
        harness.assert_int_reg(12, 940);
    }

    // The ADD is independent of the in-flight MUL and must not wait for it,
    // yet commit order stays the program order.
    #[test]
    fn test_multicycle_non_blocking() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 7);
        harness.set_int_reg(6, 8);
        harness.set_int_reg(7, 100);
        harness.set_int_reg(8, 200);
        harness.run(&[mul(10, 5, 6), add(11, 7, 8)]);

        harness.assert_int_reg(10, 56);
        harness.assert_int_reg(11, 300);
        assert!(harness.execute_cycle(1) <= harness.execute_cycle(0));
        assert!(harness.commit_cycle(0) < harness.commit_cycle(1));
    }

    #[test]
    fn test_long_latency_fp_chain() {
        let mut harness = TestHarness::default();
        harness.set_fp_reg(1, 10.0);
        harness.set_fp_reg(2, 2.0);
        harness.set_fp_reg(4, 4.0);
        harness.run(&[fmul_d(3, 1, 2), fdiv_d(5, 3, 4)]);

        harness.assert_fp_reg(3, 20.0);
        harness.assert_fp_reg(5, 5.0);
        // the chain is serial: 4 cycles of fmul plus 8 of fdiv
        assert!(harness.commit_cycle(1) >= 12);
    }

    // The fadd depends on nothing and completes long before the dependent
    // fmul, while commits stay in order.
    #[test]
    fn test_independent_fp_parallelism() {
        let mut harness = TestHarness::default();
        harness.set_fp_reg(1, 100.0);
        harness.set_fp_reg(2, 5.0);
        harness.set_fp_reg(3, 2.0);
        harness.set_fp_reg(4, 5.0);
        harness.set_fp_reg(5, 2.0);
        harness.run(&[fdiv_d(10, 1, 2), fmul_d(11, 10, 3), fadd_d(12, 4, 5)]);

        harness.assert_fp_reg(10, 20.0);
        harness.assert_fp_reg(11, 40.0);
        harness.assert_fp_reg(12, 7.0);
        assert!(harness.execute_cycle(2) < harness.execute_cycle(1));
        assert!(harness.commit_cycle(0) < harness.commit_cycle(1));
        assert!(harness.commit_cycle(1) < harness.commit_cycle(2));
    }

    #[test]
    fn test_store_load_roundtrip() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 0xDEAD_BEEF);
        harness.set_int_reg(6, 0x1000);
        harness.run(&[sd(5, 6, 0), ld(7, 6, 0)]);

        harness.assert_int_mem(0x1000, 0xDEAD_BEEF);
        harness.assert_int_reg(7, 0xDEAD_BEEF);
    }

    #[test]
    fn test_sw_lw_roundtrip() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 1234);
        harness.set_int_reg(6, 0x2000);
        harness.run(&[sw(5, 6, 8), lw(7, 6, 8)]);

        harness.assert_int_mem(0x2008, 1234);
        harness.assert_int_reg(7, 1234);
    }

    // The store's data operand arrives late; the memory write still happens
    // at the store's commit with the forwarded value.
    #[test]
    fn test_store_waits_for_data() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 6);
        harness.set_int_reg(6, 7);
        harness.set_int_reg(10, 0x3000);
        harness.run(&[mul(7, 5, 6), sd(7, 10, 0)]);

        harness.assert_int_mem(0x3000, 42);
    }

    // The store's data arrives late from a multiply; the younger load to
    // the same address must not slip past it and read stale memory.
    #[test]
    fn test_load_waits_for_older_store() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 6);
        harness.set_int_reg(6, 7);
        harness.set_int_reg(10, 0x4000);
        harness.run(&[mul(7, 5, 6), sd(7, 10, 0), ld(8, 10, 0)]);

        harness.assert_int_mem(0x4000, 42);
        harness.assert_int_reg(8, 42);
        assert!(harness.execute_cycle(2) > harness.commit_cycle(1));
    }

    #[test]
    fn test_fsd_fld_roundtrip() {
        let mut harness = TestHarness::default();
        harness.set_fp_reg(1, 3.25);
        harness.set_int_reg(6, 0x1000);
        harness.run(&[fsd(1, 6, 0), fld(2, 6, 8)]);

        harness.assert_fp_mem(0x1000, 3.25);
        // no entry at 0x1008: reads as 0.0
        harness.assert_fp_reg(2, 0.0);
    }

    #[test]
    fn test_load_from_initialized_memory() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 0x1000);
        harness.set_fp_mem(0x1000, 2.5);
        harness.run(&[fld(1, 5, 0), fadd_d(2, 1, 1)]);

        harness.assert_fp_reg(1, 2.5);
        harness.assert_fp_reg(2, 5.0);
    }

    #[test]
    fn test_div_rem_by_zero() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 17);
        harness.run(&[div(6, 5, 0), rem(7, 5, 0)]);

        harness.assert_int_reg(6, DWordType::MAX);
        harness.assert_int_reg(7, 17);
    }

    #[test]
    fn test_sra_is_arithmetic() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, (-64i64) as DWordType);
        harness.set_int_reg(6, 3);
        harness.run(&[sra(7, 5, 6)]);

        harness.assert_int_reg(7, (-8i64) as DWordType);
    }

    #[test]
    fn test_fp_compare_and_convert() {
        let mut harness = TestHarness::default();
        harness.set_fp_reg(1, 2.5);
        harness.set_fp_reg(2, 2.5);
        harness.set_int_reg(8, 7);
        harness.run(&[feq_d(5, 1, 2), flt_d(6, 1, 2), fcvt_w_d(7, 1), fcvt_d_w(3, 8)]);

        harness.assert_int_reg(5, 1);
        harness.assert_int_reg(6, 0);
        harness.assert_int_reg(7, 2);
        harness.assert_fp_reg(3, 7.0);
    }

    #[test]
    fn test_fdiv_by_zero_is_nan() {
        let mut harness = TestHarness::default();
        harness.set_fp_reg(1, 1.0);
        harness.run(&[fdiv_d(2, 1, 0)]);

        assert!(harness.fp_reg(2).is_nan());
    }

    #[test]
    fn test_lui_auipc() {
        let mut harness = TestHarness::default();
        harness.run(&[lui(5, 0x12345000), auipc(6, 0x1000)]);

        harness.assert_int_reg(5, 0x12345000);
        // auipc sits at byte pc 4
        harness.assert_int_reg(6, 0x1004);
    }

    #[test]
    fn test_bne_loop() {
        let mut harness = TestHarness::default();
        // x5 = 3; loop: x6 += 1; x5 -= 1; bne x5, x0, loop
        harness.run(&[
            addi(5, 0, 3),
            addi(6, 6, 1),
            addi(5, 5, -1),
            bne(5, 0, -8),
        ]);

        harness.assert_int_reg(5, 0);
        harness.assert_int_reg(6, 3);
    }

    #[test]
    fn test_bne_not_taken() {
        let mut harness = TestHarness::default();
        harness.run(&[bne(0, 0, 8), addi(5, 0, 1), addi(6, 0, 2)]);

        harness.assert_int_reg(5, 1);
        harness.assert_int_reg(6, 2);
    }

    #[test]
    fn test_jalr_redirect_and_link() {
        let mut harness = TestHarness::default();
        harness.set_int_reg(5, 16);
        harness.run(&[
            jalr(1, 5, 0),
            addi(6, 0, 11),
            addi(6, 0, 22),
            addi(7, 0, 1),
            addi(8, 0, 33),
        ]);

        // lands on index 4; nothing on the skipped path ran
        harness.assert_int_reg(8, 33);
        harness.assert_int_reg(6, 0);
        harness.assert_int_reg(7, 0);
        // the link register holds pc + 4
        harness.assert_int_reg(1, 4);
    }

    #[test]
    fn test_x0_stays_zero() {
        let mut harness = TestHarness::default();
        harness.run(&[addi(0, 0, 5), add(5, 0, 0)]);

        harness.assert_int_reg(0, 0);
        harness.assert_int_reg(5, 0);
    }

    #[test]
    fn test_ebreak_terminates() {
        let mut harness = TestHarness::default();
        harness.run(&[addi(5, 0, 1), ebreak(), addi(5, 0, 99)]);

        harness.assert_int_reg(5, 1);
        // the instruction behind the ebreak is never fetched
        assert_eq!(harness.retired(), 2);
    }

    #[test]
    fn test_unknown_retires_as_noop() {
        let mut harness = TestHarness::default();
        harness.run(&[0xFFFF_FFFF, addi(5, 0, 7)]);

        harness.assert_int_reg(5, 7);
        assert_eq!(harness.retired(), 2);
    }

    // Four independent divisions through a single FPDIV unit serialize;
    // the pool size bounds concurrency even though issue runs far ahead.
    #[test]
    fn test_fpdiv_capacity_serializes() {
        let mut harness = TestHarness::default();
        harness.set_fp_reg(1, 64.0);
        harness.set_fp_reg(2, 2.0);
        harness.run(&[
            fdiv_d(3, 1, 2),
            fdiv_d(4, 1, 2),
            fdiv_d(5, 1, 2),
            fdiv_d(6, 1, 2),
        ]);

        harness.assert_fp_reg(3, 32.0);
        harness.assert_fp_reg(6, 32.0);
        assert!(harness.cycles() >= 32);
    }

    // Structural stall: with a single FPDIV station the third division
    // cannot issue until the waiting one dispatches, and because issue is
    // in order the independent ADDI behind it is held back too.
    #[test]
    fn test_rs_structural_stall() {
        let mut cpu_config = CPUConfig::default();
        cpu_config.fpdiv_rs_count = 1;

        let mut harness = TestHarness::with_config(&cpu_config);
        harness.set_fp_reg(1, 8.0);
        harness.set_fp_reg(2, 2.0);
        harness.run(&[fdiv_d(3, 1, 2), fdiv_d(4, 1, 2), fdiv_d(5, 1, 2), addi(6, 0, 9)]);

        harness.assert_fp_reg(3, 4.0);
        harness.assert_fp_reg(4, 4.0);
        harness.assert_fp_reg(5, 4.0);
        harness.assert_int_reg(6, 9);
        // a one-cycle op stuck behind the stalled fetch pointer finishes
        // far later than its own latency
        assert!(harness.execute_cycle(3) > 10);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let program = [mul(10, 5, 6), add(10, 7, 8), sd(10, 9, 0), ld(11, 9, 0)];

        let mut first = TestHarness::default();
        let mut second = TestHarness::default();
        for harness in [&mut first, &mut second] {
            harness.set_int_reg(5, 100);
            harness.set_int_reg(6, 200);
            harness.set_int_reg(7, 1);
            harness.set_int_reg(8, 2);
            harness.set_int_reg(9, 0x1000);
            harness.run(&program);
        }

        for reg in 0..32 {
            assert_eq!(first.int_reg(reg), second.int_reg(reg));
        }
        assert_eq!(first.cycles(), second.cycles());
        first.assert_int_mem(0x1000, 3);
        second.assert_int_mem(0x1000, 3);
        first.assert_int_reg(11, 3);
    }

    struct TestHarness {
        cpu: CPU,
        initial_state: InitialState,
    }

    impl TestHarness {
        fn default() -> TestHarness {
            TestHarness::with_config(&CPUConfig::default())
        }

        fn with_config(cpu_config: &CPUConfig) -> TestHarness {
            TestHarness {
                cpu: CPU::new(cpu_config),
                initial_state: InitialState::default(),
            }
        }

        fn set_int_reg(&mut self, reg: RegisterType, value: DWordType) {
            self.initial_state.int_regs.push((reg, value));
        }

        fn set_fp_reg(&mut self, reg: RegisterType, value: f64) {
            self.initial_state.fp_regs.push((reg, value));
        }

        fn set_fp_mem(&mut self, addr: DWordType, value: f64) {
            self.initial_state.fp_memory.push((addr, value));
        }

        fn run(&mut self, words: &[u32]) {
            let code = words.iter().map(|&word| decode_instruction(word)).collect();
            let program = Rc::new(Program { code });
            self.cpu.run(&program, &self.initial_state);
        }

        fn int_reg(&self, reg: RegisterType) -> DWordType {
            self.cpu.arch_reg_file.borrow().get_int(reg)
        }

        fn fp_reg(&self, reg: RegisterType) -> f64 {
            self.cpu.arch_reg_file.borrow().get_fp(reg)
        }

        fn assert_int_reg(&self, reg: RegisterType, value: DWordType) {
            assert_eq!(self.int_reg(reg), value, "register x{}", reg);
        }

        fn assert_fp_reg(&self, reg: RegisterType, value: f64) {
            assert_eq!(self.fp_reg(reg), value, "register f{}", reg);
        }

        fn assert_int_mem(&self, addr: DWordType, value: DWordType) {
            let memory_subsystem = self.cpu.memory_subsystem.borrow();
            let actual = memory_subsystem.memory_int.get(&addr).copied().unwrap_or(0);
            assert_eq!(actual, value, "memory at 0x{:x}", addr);
        }

        fn assert_fp_mem(&self, addr: DWordType, value: f64) {
            let memory_subsystem = self.cpu.memory_subsystem.borrow();
            let actual = memory_subsystem.memory_fp.get(&addr).copied().unwrap_or(0.0);
            assert_eq!(actual, value, "memory at 0x{:x}", addr);
        }

        // The cycle the instruction at `pc` retired.
        fn commit_cycle(&self, pc: usize) -> u64 {
            self.cpu
                .backend
                .commit_log
                .iter()
                .find(|&&(index, _)| index == pc)
                .map(|&(_, cycle)| cycle)
                .expect("instruction never committed")
        }

        // The cycle the instruction at `pc` finished executing.
        fn execute_cycle(&self, pc: usize) -> u64 {
            self.cpu
                .backend
                .execute_log
                .iter()
                .find(|&&(index, _)| index == pc)
                .map(|&(_, cycle)| cycle)
                .expect("instruction never executed")
        }

        fn cycles(&self) -> u64 {
            self.cpu.perf_counters.borrow().cycle_cnt
        }

        fn retired(&self) -> u64 {
            self.cpu.perf_counters.borrow().retire_cnt
        }
    }
}
