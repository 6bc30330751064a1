//! The instruction decoder: a pure function from a raw 16/32-bit word (plus
//! addressing context) to a `DecodedInst`. Bit extraction (`fields.rs`) is
//! split from dispatch, with the dispatch table kept in its own module
//! (`table.rs`) rather than inlined.

mod compressed;
mod decoded_inst;
mod decoder;
mod opcodes;
mod table;

pub use decoded_inst::{DecodedInst, VecFields};
pub use decoder::decode;
pub use table::{Category, Extension, Format, InstrId, OpcodeEntry, OperandKind, OperandMode};

#[cfg(test)]
mod tests {
    use super::*;

    fn rtype(opcode: u32, funct3: u32, funct7: u32, rd: u32, rs1: u32, rs2: u32) -> u32 {
        (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    fn itype(opcode: u32, funct3: u32, imm: u32, rd: u32, rs1: u32) -> u32 {
        ((imm & 0xfff) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    // Six literal end-to-end decode scenarios.

    #[test]
    fn s1_addi() {
        // addi x5, x6, -1
        let word = itype(0b0010011, 0b000, 0xfff, 5, 6);
        let d = decode(word, 0x1000, 0x1000, true);
        assert!(d.valid);
        assert_eq!(d.instr_id(), InstrId::Addi);
        assert_eq!(d.size, 4);
        assert_eq!(d.op0(), 5);
        assert_eq!(d.op1(), 6);
        assert_eq!(d.op2() as i32, -1);
    }

    #[test]
    fn s2_jal() {
        // jal x1, +0 (degenerate but a legal encoding)
        let word = 0b1101111 | (1 << 7);
        let d = decode(word, 0x2000, 0x2000, true);
        assert!(d.valid);
        assert_eq!(d.instr_id(), InstrId::Jal);
        assert!(d.category().is_jump);
    }

    #[test]
    fn s3_lw() {
        let word = itype(0b0000011, 0b010, 16, 7, 2);
        let d = decode(word, 0x3000, 0x3000, true);
        assert_eq!(d.instr_id(), InstrId::Lw);
        assert!(d.category().is_load);
        assert_eq!(d.data_size(), 4);
    }

    #[test]
    fn s4_add_vs_sub_by_funct7() {
        let add = rtype(0b0110011, 0b000, 0b0000000, 1, 2, 3);
        let sub = rtype(0b0110011, 0b000, 0b0100000, 1, 2, 3);
        assert_eq!(decode(add, 0, 0, true).instr_id(), InstrId::Add);
        assert_eq!(decode(sub, 0, 0, true).instr_id(), InstrId::Sub);
    }

    #[test]
    fn s5_compressed_addi4spn() {
        // c.addi4spn x8, sp, 8: quadrant=00, rd'=000 (x8), nzuimm bit[3] set
        // (word bit 5), everything else zero.
        let word: u16 = 1 << 5;
        let d = decode(word as u32, 0x4000, 0x4000, true);
        assert!(d.valid);
        assert_eq!(d.size, 2);
        assert_eq!(d.instr_id(), InstrId::CAddi4spn);
        assert_eq!(d.op1(), 8);
    }

    #[test]
    fn s6_illegal_word_never_panics() {
        let d = decode(0xffff_ffff, 0x5000, 0x5000, true);
        assert!(!d.valid);
        assert_eq!(d.instr_id(), InstrId::Illegal);
    }

    // Property checks (), parametrized over representative inputs
    // rather than a dedicated property-testing crate.

    #[test]
    fn decoder_is_total_over_random_sample() {
        // A fixed pseudo-random sweep: every word must decode to *something*
        // without panicking, matching this totality property.
        let mut state: u32 = 0x1234_5678;
        for _ in 0..4096 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let _ = decode(state, 0, 0, true);
            let _ = decode(state, 0, 0, false);
        }
    }

    #[test]
    fn addi4spn_zero_immediate_is_illegal() {
        let d = decode(0u32, 0, 0, true);
        assert!(!d.valid, "c.addi4spn with an all-zero immediate is reserved");
    }

    /// Builds a quadrant-2-style compressed word: funct3 in bits[15:13],
    /// bit12, rd/rs1 in bits[11:7], rs2 in bits[6:2], quadrant in bits[1:0].
    fn q2_word(funct3: u32, bit12: u32, rd: u32, rs2: u32, quadrant: u32) -> u16 {
        ((funct3 << 13) | (bit12 << 12) | (rd << 7) | (rs2 << 2) | quadrant) as u16
    }

    #[test]
    fn quadrant0_f3_011_disambiguates_by_xlen() {
        let word: u16 = 0b011_00_000_00_000_00;
        let rv32 = decode(word as u32, 0, 0, false);
        let rv64 = decode(word as u32, 0, 0, true);
        assert_eq!(rv32.instr_id(), InstrId::CFlw);
        assert_eq!(rv64.instr_id(), InstrId::CLd);
    }

    #[test]
    fn c_mop_from_zero_immediate_odd_rd() {
        // c.addi16sp/c.lui space (funct3=011, quadrant=01), rd=1 (odd, <=15)
        // with every immediate bit zero: the Zc maybe-op, not illegal.
        let word = q2_word(0b011, 0, 1, 0, 0b01);
        let d = decode(word as u32, 0, 0, true);
        assert!(d.valid);
        assert_eq!(d.instr_id(), InstrId::CMop);
        assert_eq!(d.op0(), 1);
    }

    #[test]
    fn c_lui_zero_immediate_even_rd_is_illegal() {
        let word = q2_word(0b011, 0, 4, 0, 0b01);
        let d = decode(word as u32, 0, 0, true);
        assert!(
            !d.valid,
            "zero immediate with an even, non-sp rd has no c.mop encoding"
        );
    }

    #[test]
    fn c_jal_only_valid_on_rv32() {
        let word = q2_word(0b001, 0, 0, 0, 0b01);
        let rv32 = decode(word as u32, 0, 0, false);
        let rv64 = decode(word as u32, 0, 0, true);
        assert_eq!(rv32.instr_id(), InstrId::CJal);
        // rv64 with rd=0 is reserved (c.addiw requires rd != 0)
        assert!(!rv64.valid);
    }

    #[test]
    fn c_ebreak_vs_c_jr_vs_c_jalr_disambiguation() {
        let ebreak = q2_word(0b100, 1, 0, 0, 0b10);
        assert_eq!(
            decode(ebreak as u32, 0, 0, true).instr_id(),
            InstrId::CEbreak
        );
        let jr = q2_word(0b100, 0, 1, 0, 0b10);
        assert_eq!(decode(jr as u32, 0, 0, true).instr_id(), InstrId::CJr);
        let jalr = q2_word(0b100, 1, 1, 0, 0b10);
        assert_eq!(decode(jalr as u32, 0, 0, true).instr_id(), InstrId::CJalr);
        let mv = q2_word(0b100, 0, 1, 2, 0b10);
        assert_eq!(decode(mv as u32, 0, 0, true).instr_id(), InstrId::CMv);
        let add = q2_word(0b100, 1, 1, 2, 0b10);
        assert_eq!(decode(add as u32, 0, 0, true).instr_id(), InstrId::CAdd);
    }

    #[test]
    fn privileged_no_operand_forms_require_rd_and_rs1_zero() {
        // mret with garbage rd/rs1 fields sharing the same immediate is illegal.
        let garbage_mret = itype(0b1110011, 0, 0x302, 5, 6);
        assert!(!decode(garbage_mret, 0, 0, true).valid);

        let real_mret = itype(0b1110011, 0, 0x302, 0, 0);
        assert_eq!(decode(real_mret, 0, 0, true).instr_id(), InstrId::Mret);
    }

    #[test]
    fn zbs_single_bit_immediate_ops_split_by_funct3_and_funct7() {
        // bclri/binvi/bseti all share funct3=001 (the slli slot), disambiguated
        // by funct7; bexti lives in funct3=101 (the srli/srai slot).
        let bclri = itype(0b0010011, 0b001, (0b0100100 << 5) | 3, 5, 6);
        assert_eq!(decode(bclri, 0, 0, true).instr_id(), InstrId::Bclri);

        let binvi = itype(0b0010011, 0b001, (0b0110100 << 5) | 3, 5, 6);
        assert_eq!(decode(binvi, 0, 0, true).instr_id(), InstrId::Binvi);

        let bseti = itype(0b0010011, 0b001, (0b0010100 << 5) | 3, 5, 6);
        assert_eq!(decode(bseti, 0, 0, true).instr_id(), InstrId::Bseti);

        let bexti = itype(0b0010011, 0b101, (0b0100100 << 5) | 3, 5, 6);
        assert_eq!(decode(bexti, 0, 0, true).instr_id(), InstrId::Bexti);
    }

    #[test]
    fn mop_rr_decodes_by_top7() {
        // mop.rr x5, x6, x7 with top7 = 0x41 (one of the eight reserved values)
        let word = rtype(0b1110011, 0b100, 0x41, 5, 6, 7);
        let d = decode(word, 0, 0, true);
        assert_eq!(d.instr_id(), InstrId::MopRr);
        assert_eq!(d.op0(), 5);
        assert_eq!(d.op1(), 6);
        assert_eq!(d.op2(), 7);
    }

    #[test]
    fn mop_r_decodes_by_top12_with_no_rs2() {
        // mop.r x5, x6 with top12 = 0x81c (one of the 32 reserved values)
        let word = itype(0b1110011, 0b100, 0x81c, 5, 6);
        let d = decode(word, 0, 0, true);
        assert_eq!(d.instr_id(), InstrId::MopR);
        assert_eq!(d.op0(), 5);
        assert_eq!(d.op1(), 6);
        assert_eq!(d.op2(), 0);
    }

    #[test]
    fn csrrs_operand_kinds_match_decoded_inst_doc() {
        let word = itype(0b1110011, 0b010, 0x300, 5, 1);
        let d = decode(word, 0, 0, true);
        assert_eq!(d.ith_operand_type(0), OperandKind::IntReg);
        assert_eq!(d.ith_operand_type(1), OperandKind::CsReg);
        assert_eq!(d.ith_operand_type(2), OperandKind::IntReg);
    }

    #[test]
    fn vmacc_operand_modes_reflect_accumulator_readwrite() {
        // vmacc.vv: funct6=101101, OPMVV (funct3=010), opcode 1010111
        let word = rtype(0b1010111, 0b010, 0b1011010, 1, 2, 3);
        let d = decode(word, 0, 0, true);
        assert_eq!(d.instr_id(), InstrId::VmaccVv);
        assert_eq!(
            d.ith_operand_mode(0),
            OperandMode::ReadWrite,
            "vmacc's destination is also a source (the accumulator)"
        );
    }
}
