//! Entry point: `decode()` dispatches a raw 16- or 32-bit word into a
//! `DecodedInst`, as a chain of field-extract-then-match steps that
//! bottoms out at `Illegal` rather than panicking.

use super::compressed::decode_compressed;
use super::decoded_inst::{DecodedInst, VecFields};
use super::opcodes::*;
use super::table::InstrId;
use crate::fields::{
    extract_bits, funct3, funct6, funct7, imm_btype, imm_itype, imm_jtype, imm_stype, imm_utype,
    opcode, rd, rs1, rs2, rs3,
};

/// Decode one instruction word fetched from `vaddr`/`paddr`. `xlen64`
/// selects RV64 semantics where the encoding depends on it (widths, the
/// compressed `c.ld`/`c.addiw` family, shift-amount width). Always returns
/// a `DecodedInst`; never panics, never returns an `Err` ().
pub fn decode(word: u32, vaddr: u64, paddr: u64, xlen64: bool) -> DecodedInst {
    if extract_bits(word, 0, 2) != 0b11 {
        let word16 = word as u16;
        return decode_compressed(word16, vaddr, paddr, xlen64);
    }
    if extract_bits(word, 0, 7) & 0b11 == 0b11 && extract_bits(word, 2, 3) == 0b111 {
        // Encodings with >32-bit length (funct3 of low byte == 111) are
        // outside this decoder's scope; treat as illegal rather than
        // misread the next halfword as part of this instruction.
        return DecodedInst::illegal(vaddr, paddr, word, 4);
    }

    let op = opcode(word);
    let result = match op {
        OP_LOAD => decode_load(word),
        OP_LOAD_FP => decode_load_fp(word),
        OP_MISC_MEM => decode_misc_mem(word),
        OP_IMM => decode_op_imm(word, xlen64),
        OP_AUIPC => Some((InstrId::Auipc, [rd(word), imm_utype(word), 0, 0])),
        OP_IMM_32 => decode_op_imm_32(word),
        OP_STORE => decode_store(word),
        OP_STORE_FP => decode_store_fp(word),
        OP_AMO => decode_amo(word),
        OP => decode_op(word),
        OP_LUI => Some((InstrId::Lui, [rd(word), imm_utype(word), 0, 0])),
        OP_32 => decode_op_32(word),
        OP_FMADD | OP_FMSUB | OP_FNMSUB | OP_FNMADD => decode_fma(word, op),
        OP_FP => decode_fp(word),
        OP_V => return decode_vector(word, vaddr, paddr),
        OP_BRANCH => decode_branch(word),
        OP_JALR => Some((InstrId::Jalr, [rd(word), rs1(word), imm_itype(word), 0])),
        OP_JAL => Some((InstrId::Jal, [rd(word), imm_jtype(word), 0, 0])),
        OP_SYSTEM => decode_system(word),
        OP_V_CRYPTO => decode_vector_crypto(word),
        _ => None,
    };

    match result {
        Some((id, operands)) => DecodedInst::new(vaddr, paddr, word, 4, id, operands),
        None => DecodedInst::illegal(vaddr, paddr, word, 4),
    }
}

fn decode_load(word: u32) -> Option<(InstrId, [u32; 4])> {
    let id = match funct3(word) {
        F3_B => InstrId::Lb,
        F3_H => InstrId::Lh,
        F3_W => InstrId::Lw,
        F3_BU => InstrId::Lbu,
        F3_HU => InstrId::Lhu,
        F3_WU => InstrId::Lwu,
        F3_D => InstrId::Ld,
        _ => return None,
    };
    Some((id, [rd(word), rs1(word), imm_itype(word), 0]))
}

fn decode_load_fp(word: u32) -> Option<(InstrId, [u32; 4])> {
    let id = match funct3(word) {
        F3_W => InstrId::Flw,
        F3_D => InstrId::Fld,
        F3_H => InstrId::Flh,
        _ => return None,
    };
    Some((id, [rd(word), rs1(word), imm_itype(word), 0]))
}

fn decode_store(word: u32) -> Option<(InstrId, [u32; 4])> {
    let id = match funct3(word) {
        F3_B => InstrId::Sb,
        F3_H => InstrId::Sh,
        F3_W => InstrId::Sw,
        F3_D => InstrId::Sd,
        _ => return None,
    };
    Some((id, [rs1(word), rs2(word), imm_stype(word), 0]))
}

fn decode_store_fp(word: u32) -> Option<(InstrId, [u32; 4])> {
    let id = match funct3(word) {
        F3_W => InstrId::Fsw,
        F3_D => InstrId::Fsd,
        F3_H => InstrId::Fsh,
        _ => return None,
    };
    Some((id, [rs1(word), rs2(word), imm_stype(word), 0]))
}

fn decode_branch(word: u32) -> Option<(InstrId, [u32; 4])> {
    let id = match funct3(word) {
        F3_BEQ => InstrId::Beq,
        F3_BNE => InstrId::Bne,
        F3_BLT => InstrId::Blt,
        F3_BGE => InstrId::Bge,
        F3_BLTU => InstrId::Bltu,
        F3_BGEU => InstrId::Bgeu,
        _ => return None,
    };
    Some((id, [rs1(word), rs2(word), imm_btype(word), 0]))
}

fn decode_op_imm(word: u32, xlen64: bool) -> Option<(InstrId, [u32; 4])> {
    let f3 = funct3(word);
    match f3 {
        F3_ADDI => Some((InstrId::Addi, [rd(word), rs1(word), imm_itype(word), 0])),
        F3_SLTI => Some((InstrId::Slti, [rd(word), rs1(word), imm_itype(word), 0])),
        F3_SLTIU => Some((InstrId::Sltiu, [rd(word), rs1(word), imm_itype(word), 0])),
        F3_XORI => Some((InstrId::Xori, [rd(word), rs1(word), imm_itype(word), 0])),
        F3_ORI => Some((InstrId::Ori, [rd(word), rs1(word), imm_itype(word), 0])),
        F3_ANDI => decode_andi_or_bitmanip(word),
        F3_SLLI => decode_shift_imm_or_bitmanip(word, xlen64, true),
        F3_SRLI_SRAI => decode_shift_imm_or_bitmanip(word, xlen64, false),
        _ => None,
    }
}

fn decode_andi_or_bitmanip(word: u32) -> Option<(InstrId, [u32; 4])> {
    let imm12 = imm_itype(word) & 0xfff;
    if imm12 == F12_ORC_B {
        return Some((InstrId::OrcB, [rd(word), rs1(word), 0, 0]));
    }
    Some((InstrId::Andi, [rd(word), rs1(word), imm_itype(word), 0]))
}

/// OP-IMM's `slli`/`srli`/`srai` slots also host the Zbb/Zbs single-operand
/// and shift-amount-carrying bit-manipulation instructions, disambiguated
/// by the top bits of the would-be shift amount (`funct7`, or the full
/// 12-bit immediate for the zero-operand forms like `clz`).
fn decode_shift_imm_or_bitmanip(
    word: u32,
    xlen64: bool,
    is_left: bool,
) -> Option<(InstrId, [u32; 4])> {
    let f7 = funct7(word);
    let f12 = imm_itype(word) & 0xfff;
    if is_left {
        match f12 {
            F12_CLZ => return Some((InstrId::Clz, [rd(word), rs1(word), 0, 0])),
            F12_CTZ => return Some((InstrId::Ctz, [rd(word), rs1(word), 0, 0])),
            F12_CPOP => return Some((InstrId::Cpop, [rd(word), rs1(word), 0, 0])),
            F12_SEXT_B => return Some((InstrId::SextB, [rd(word), rs1(word), 0, 0])),
            F12_SEXT_H => return Some((InstrId::SextH, [rd(word), rs1(word), 0, 0])),
            _ => {}
        }
        let id = match f7 {
            F7_BSET => InstrId::Bseti,
            F7_BCLR_BEXT => InstrId::Bclri,
            F7_BINV => InstrId::Binvi,
            _ => InstrId::Slli,
        };
        Some((id, [rd(word), rs1(word), shamt(word, xlen64), 0]))
    } else {
        if f12 == F12_REV8_32 || f12 == F12_REV8_64 {
            return Some((InstrId::Rev8, [rd(word), rs1(word), 0, 0]));
        }
        let id = match f7 {
            F7_SUB_SRA => InstrId::Srai,
            F7_BCLR_BEXT => InstrId::Bexti,
            F7_ROL_ROR => InstrId::Rori,
            _ => InstrId::Srli,
        };
        Some((id, [rd(word), rs1(word), shamt(word, xlen64), 0]))
    }
}

fn shamt(word: u32, xlen64: bool) -> u32 {
    if xlen64 {
        extract_bits(word, 20, 6)
    } else {
        extract_bits(word, 20, 5)
    }
}

fn decode_op_imm_32(word: u32) -> Option<(InstrId, [u32; 4])> {
    match funct3(word) {
        F3_ADDI => Some((InstrId::Addiw, [rd(word), rs1(word), imm_itype(word), 0])),
        F3_SLLI => Some((
            InstrId::Slliw,
            [rd(word), rs1(word), extract_bits(word, 20, 5), 0],
        )),
        F3_SRLI_SRAI => {
            let id = if funct7(word) == F7_SUB_SRA {
                InstrId::Sraiw
            } else {
                InstrId::Srliw
            };
            Some((id, [rd(word), rs1(word), extract_bits(word, 20, 5), 0]))
        }
        _ => None,
    }
}

fn decode_op(word: u32) -> Option<(InstrId, [u32; 4])> {
    let f3 = funct3(word);
    let f7 = funct7(word);
    let operands = [rd(word), rs1(word), rs2(word), 0];
    let id = match (f7, f3) {
        (F7_BASE, F3_ADD_SUB) => InstrId::Add,
        (F7_SUB_SRA, F3_ADD_SUB) => InstrId::Sub,
        (F7_BASE, F3_SLL) => InstrId::Sll,
        (F7_BASE, F3_SLT) => InstrId::Slt,
        (F7_BASE, F3_SLTU) => InstrId::Sltu,
        (F7_BASE, F3_XOR) => InstrId::Xor,
        (F7_BASE, F3_SRL_SRA) => InstrId::Srl,
        (F7_SUB_SRA, F3_SRL_SRA) => InstrId::Sra,
        (F7_BASE, F3_OR) => InstrId::Or,
        (F7_BASE, F3_AND) => InstrId::And,
        (F7_MULDIV, F3_MUL) => InstrId::Mul,
        (F7_MULDIV, F3_MULH) => InstrId::Mulh,
        (F7_MULDIV, F3_MULHSU) => InstrId::Mulhsu,
        (F7_MULDIV, F3_MULHU) => InstrId::Mulhu,
        (F7_MULDIV, F3_DIV) => InstrId::Div,
        (F7_MULDIV, F3_DIVU) => InstrId::Divu,
        (F7_MULDIV, F3_REM) => InstrId::Rem,
        (F7_MULDIV, F3_REMU) => InstrId::Remu,
        (F7_SH_ADD, F3_SLL) => InstrId::Sh1add,
        (F7_SH_ADD, F3_SLT) => InstrId::Sh2add,
        (F7_SH_ADD, F3_SLTU) => InstrId::Sh3add,
        (F7_ANDN_ORN_XNOR, F3_XOR) => InstrId::Xnor,
        (F7_ANDN_ORN_XNOR, F3_OR) => InstrId::Orn,
        (F7_ANDN_ORN_XNOR, F3_AND) => InstrId::Andn,
        (F7_MINMAX, F3_SLT) => InstrId::Min,
        (F7_MINMAX, F3_SLTU) => InstrId::Minu,
        (F7_MINMAX, F3_XOR) => InstrId::Max,
        (F7_MINMAX, F3_OR) => InstrId::Maxu,
        (F7_ROL_ROR, F3_SLL) => InstrId::Rol,
        (F7_ROL_ROR, F3_SRL_SRA) => InstrId::Ror,
        (F7_BCLR_BEXT, F3_SLL) => InstrId::Bclr,
        (F7_BCLR_BEXT, F3_SRL_SRA) => InstrId::Bext,
        (F7_BINV, F3_SLL) => InstrId::Binv,
        (F7_BSET, F3_SLL) => InstrId::Bset,
        (F7_CLMUL, F3_MUL) => InstrId::Clmul,
        (F7_CLMUL, F3_MULH) => InstrId::Clmulh,
        (F7_CLMUL, F3_REM) => InstrId::Clmulr,
        (F7_CZERO, F3_SLT) => InstrId::CzeroEqz,
        (F7_CZERO, F3_SLTU) => InstrId::CzeroNez,
        (F7_AES32, F3_ADD_SUB) => InstrId::Aes32esi,
        _ => return None,
    };
    Some((id, operands))
}

fn decode_op_32(word: u32) -> Option<(InstrId, [u32; 4])> {
    let f3 = funct3(word);
    let f7 = funct7(word);
    let operands = [rd(word), rs1(word), rs2(word), 0];
    let id = match (f7, f3) {
        (F7_BASE, F3_ADD_SUB) => InstrId::Addw,
        (F7_SUB_SRA, F3_ADD_SUB) => InstrId::Subw,
        (F7_BASE, F3_SLL) => InstrId::Sllw,
        (F7_BASE, F3_SRL_SRA) => InstrId::Srlw,
        (F7_SUB_SRA, F3_SRL_SRA) => InstrId::Sraw,
        (F7_MULDIV, F3_MUL) => InstrId::Mulw,
        (F7_MULDIV, F3_DIV) => InstrId::Divw,
        (F7_MULDIV, F3_DIVU) => InstrId::Divuw,
        (F7_MULDIV, F3_REM) => InstrId::Remw,
        (F7_MULDIV, F3_REMU) => InstrId::Remuw,
        _ => return None,
    };
    Some((id, operands))
}

fn decode_amo(word: u32) -> Option<(InstrId, [u32; 4])> {
    let width = funct3(word);
    let f5 = extract_bits(word, 27, 5);
    let operands = [rd(word), rs1(word), rs2(word), 0];
    let id = match (width, f5) {
        (F3_W, F5_LR) => InstrId::LrW,
        (F3_W, F5_SC) => InstrId::ScW,
        (F3_W, F5_AMOSWAP) => InstrId::AmoswapW,
        (F3_W, F5_AMOADD) => InstrId::AmoaddW,
        (F3_W, F5_AMOXOR) => InstrId::AmoxorW,
        (F3_W, F5_AMOAND) => InstrId::AmoandW,
        (F3_W, F5_AMOOR) => InstrId::AmoorW,
        (F3_W, F5_AMOMIN) => InstrId::AmominW,
        (F3_W, F5_AMOMAX) => InstrId::AmomaxW,
        (F3_W, F5_AMOMINU) => InstrId::AmominuW,
        (F3_W, F5_AMOMAXU) => InstrId::AmomaxuW,
        (F3_W, F5_AMOCAS) => InstrId::AmocasW,
        (F3_D, F5_LR) => InstrId::LrD,
        (F3_D, F5_SC) => InstrId::ScD,
        (F3_D, F5_AMOSWAP) => InstrId::AmoswapD,
        (F3_D, F5_AMOADD) => InstrId::AmoaddD,
        (F3_D, F5_AMOXOR) => InstrId::AmoxorD,
        (F3_D, F5_AMOAND) => InstrId::AmoandD,
        (F3_D, F5_AMOOR) => InstrId::AmoorD,
        (F3_D, F5_AMOMIN) => InstrId::AmominD,
        (F3_D, F5_AMOMAX) => InstrId::AmomaxD,
        (F3_D, F5_AMOMINU) => InstrId::AmominuD,
        (F3_D, F5_AMOMAXU) => InstrId::AmomaxuD,
        (F3_D, F5_AMOCAS) => InstrId::AmocasD,
        _ => return None,
    };
    Some((id, operands))
}

const FENCE_TSO_IMM: u32 = 0b1000_0011_0011;
const PAUSE_IMM: u32 = 0b0000_0001_0000;

fn decode_misc_mem(word: u32) -> Option<(InstrId, [u32; 4])> {
    match funct3(word) {
        F3_FENCE => {
            let imm = extract_bits(word, 20, 12);
            if imm == FENCE_TSO_IMM {
                Some((InstrId::FenceTso, [0; 4]))
            } else if rd(word) == 0 && rs1(word) == 0 && imm == PAUSE_IMM {
                Some((InstrId::Pause, [0; 4]))
            } else {
                Some((InstrId::Fence, [0; 4]))
            }
        }
        F3_FENCE_I => Some((InstrId::FenceI, [0; 4])),
        _ => None,
    }
}

fn decode_system(word: u32) -> Option<(InstrId, [u32; 4])> {
    let f3 = funct3(word);
    if f3 == F3_MOP {
        return decode_mop(word);
    }
    if f3 != F3_PRIV {
        let id = match f3 {
            F3_CSRRW => InstrId::Csrrw,
            F3_CSRRS => InstrId::Csrrs,
            F3_CSRRC => InstrId::Csrrc,
            F3_CSRRWI => InstrId::Csrrwi,
            F3_CSRRSI => InstrId::Csrrsi,
            F3_CSRRCI => InstrId::Csrrci,
            _ => return None,
        };
        let csr = extract_bits(word, 20, 12);
        return Some((id, [rd(word), csr, rs1(word), 0]));
    }

    let imm12 = extract_bits(word, 20, 12);
    let f7 = funct7(word);
    let id = match imm12 {
        IMM_ECALL | IMM_EBREAK | IMM_SRET | IMM_WFI | IMM_MRET | IMM_MNRET | IMM_DRET => {
            if rd(word) != 0 || rs1(word) != 0 {
                return None;
            }
            match imm12 {
                IMM_ECALL => InstrId::Ecall,
                IMM_EBREAK => InstrId::Ebreak,
                IMM_SRET => InstrId::Sret,
                IMM_WFI => InstrId::Wfi,
                IMM_MRET => InstrId::Mret,
                IMM_MNRET => InstrId::Mnret,
                IMM_DRET => InstrId::Dret,
                _ => unreachable!(),
            }
        }
        _ if f7 == 0b0001001 => InstrId::SfenceVma,
        _ if f7 == 0b0001011 => InstrId::SinvalVma,
        _ if imm12 == 0b000110000000 => InstrId::SfenceWInval,
        _ if imm12 == 0b000110000001 => InstrId::SfenceInvalIr,
        _ if f7 == 0b0010001 => InstrId::HfenceVvma,
        _ if f7 == 0b0010011 => InstrId::HinvalVvma,
        _ if f7 == 0b0110001 => InstrId::HfenceGvma,
        _ if f7 == 0b0110011 => InstrId::HinvalGvma,
        _ if f7 == 0b0110000 && rs2(word) == 0b00000 => InstrId::HlvW,
        _ if f7 == 0b0110000 && rs2(word) == 0b00001 => InstrId::HlvWu,
        _ if f7 == 0b0110110 && rs2(word) == 0b00000 => InstrId::HlvD,
        _ if f7 == 0b0110010 && rs2(word) == 0b00011 => InstrId::HlvxWu,
        _ if f7 == 0b0110001 && rd(word) == 0 => InstrId::HsvW,
        _ if f7 == 0b0110111 && rd(word) == 0 => InstrId::HsvD,
        _ => return None,
    };
    Some((id, [rs1(word), rs2(word), 0, 0]))
}

/// Zimop's maybe-ops: `mop.rr` (R-format-shaped, top7 one of 8 reserved
/// values) and `mop.r` (top12 one of 32 reserved values, no rs2 operand).
fn decode_mop(word: u32) -> Option<(InstrId, [u32; 4])> {
    let top12 = extract_bits(word, 20, 12);
    let top7 = top12 >> 5;
    const MOP_RR_TOP7: [u32; 8] = [0x41, 0x43, 0x45, 0x47, 0x61, 0x63, 0x65, 0x67];
    if MOP_RR_TOP7.contains(&top7) {
        return Some((InstrId::MopRr, [rd(word), rs1(word), rs2(word), 0]));
    }
    const MOP_R_TOP12: [u32; 32] = [
        0x81c, 0x81d, 0x81e, 0x81f, 0x85c, 0x85d, 0x85e, 0x85f, 0x89c, 0x89d, 0x89e, 0x89f,
        0x8dc, 0x8dd, 0x8de, 0x8df, 0xc1c, 0xc1d, 0xc1e, 0xc1f, 0xc5c, 0xc5d, 0xc5e, 0xc5f,
        0xc9c, 0xc9d, 0xc9e, 0xc9f, 0xcdc, 0xcdd, 0xcde, 0xcdf,
    ];
    if MOP_R_TOP12.contains(&top12) {
        return Some((InstrId::MopR, [rd(word), rs1(word), 0, 0]));
    }
    None
}

fn decode_fma(word: u32, opc: u32) -> Option<(InstrId, [u32; 4])> {
    let fmt = funct7(word) & 0b11;
    if fmt != FMT_S {
        return None;
    }
    let id = match opc {
        OP_FMADD => InstrId::FmaddS,
        OP_FMSUB => InstrId::FmsubS,
        OP_FNMSUB => InstrId::FnmsubS,
        OP_FNMADD => InstrId::FnmaddS,
        _ => return None,
    };
    Some((id, [rd(word), rs1(word), rs2(word), rs3(word)]))
}

fn decode_fp(word: u32) -> Option<(InstrId, [u32; 4])> {
    let f5 = funct7(word) >> 2;
    let fmt = funct7(word) & 0b11;
    let operands = [rd(word), rs1(word), rs2(word), 0];
    let id = match (f5, fmt) {
        (F5_FADD, FMT_S) => InstrId::FaddS,
        (F5_FSUB, FMT_S) => InstrId::FsubS,
        (F5_FMUL, FMT_S) => InstrId::FmulS,
        (F5_FDIV, FMT_S) => InstrId::FdivS,
        (F5_FSQRT, FMT_S) => InstrId::FsqrtS,
        (F5_FSGNJ, FMT_S) => match funct3(word) {
            0 => InstrId::FsgnjS,
            1 => InstrId::FsgnjnS,
            2 => InstrId::FsgnjxS,
            _ => return None,
        },
        (F5_FMINMAX, FMT_S) => match funct3(word) {
            0 => InstrId::FminS,
            1 => InstrId::FmaxS,
            _ => return None,
        },
        (F5_FCMP, FMT_S) => match funct3(word) {
            0 => InstrId::FleS,
            1 => InstrId::FltS,
            2 => InstrId::FeqS,
            _ => return None,
        },
        (F5_FCVT_TO_INT, FMT_S) => match rs2(word) {
            0 => InstrId::FcvtWS,
            1 => InstrId::FcvtWuS,
            _ => return None,
        },
        (F5_FCVT_FROM_INT, FMT_S) => match rs2(word) {
            0 => InstrId::FcvtSW,
            1 => InstrId::FcvtSWu,
            _ => return None,
        },
        (F5_FMV_X_W_FCLASS, FMT_S) => match funct3(word) {
            0 => InstrId::FmvXW,
            1 => InstrId::FclassS,
            _ => return None,
        },
        (F5_FMV_W_X, FMT_S) => InstrId::FmvWX,
        (F5_FADD, FMT_D) => InstrId::FaddD,
        (F5_FSUB, FMT_D) => InstrId::FsubD,
        (F5_FMUL, FMT_D) => InstrId::FmulD,
        (F5_FDIV, FMT_D) => InstrId::FdivD,
        (F5_FSQRT, FMT_D) => InstrId::FsqrtD,
        (F5_FSGNJ, FMT_D) => match funct3(word) {
            0 => InstrId::FsgnjD,
            1 => InstrId::FsgnjnD,
            2 => InstrId::FsgnjxD,
            _ => return None,
        },
        (F5_FMINMAX, FMT_D) => match funct3(word) {
            0 => InstrId::FminD,
            1 => InstrId::FmaxD,
            _ => return None,
        },
        (F5_FCMP, FMT_D) => match funct3(word) {
            0 => InstrId::FleD,
            1 => InstrId::FltD,
            2 => InstrId::FeqD,
            _ => return None,
        },
        (F5_FCVT_TO_INT, FMT_D) => match rs2(word) {
            0 => InstrId::FcvtWD,
            1 => InstrId::FcvtWuD,
            _ => return None,
        },
        (F5_FCVT_FROM_INT, FMT_D) => match rs2(word) {
            0 => InstrId::FcvtDW,
            1 => InstrId::FcvtDWu,
            _ => return None,
        },
        (F5_FMV_X_W_FCLASS, FMT_D) => {
            if funct3(word) == 1 {
                InstrId::FclassD
            } else {
                return None;
            }
        }
        (F5_FCVT_FMT, FMT_S) if rs2(word) == 0b00001 => InstrId::FcvtSD,
        (F5_FCVT_FMT, FMT_D) if rs2(word) == 0b00000 => InstrId::FcvtDS,
        (F5_FCVT_FMT, FMT_S) if rs2(word) == 0b00010 => InstrId::FcvtSH,
        (F5_FCVT_FMT, FMT_H) if rs2(word) == 0b00000 => InstrId::FcvtHS,
        (F5_FADD, FMT_H) => InstrId::FaddH,
        _ => return None,
    };
    Some((id, operands))
}

fn decode_vector(word: u32, vaddr: u64, paddr: u64) -> DecodedInst {
    let f3 = funct3(word);
    if f3 == F3_VSETVLI_FAMILY {
        let is_vsetvl = extract_bits(word, 31, 1) == 1;
        let id = if is_vsetvl {
            InstrId::Vsetvl
        } else if extract_bits(word, 30, 1) == 1 {
            InstrId::Vsetivli
        } else {
            InstrId::Vsetvli
        };
        let operands = [rd(word), rs1(word), extract_bits(word, 20, 11), 0];
        return DecodedInst::new(vaddr, paddr, word, 4, id, operands);
    }

    if opcode(word) == 0b0000111 {
        return decode_vector_mem(word, vaddr, paddr, true);
    }
    if opcode(word) == 0b0100111 {
        return decode_vector_mem(word, vaddr, paddr, false);
    }

    let funct6v = funct6(word);
    let vm = extract_bits(word, 25, 1) == 0;
    let vec_fields = VecFields {
        vm,
        ..Default::default()
    };
    let operands = [rd(word), rs1(word), rs2(word), 0];

    let id = match (f3, funct6v) {
        (F3_OPIVV, 0b000000) => InstrId::VaddVv,
        (F3_OPIVV, 0b000010) => InstrId::VsubVv,
        (F3_OPIVV, 0b001001) => InstrId::VandVv,
        (F3_OPIVV, 0b001010) => InstrId::VorVv,
        (F3_OPIVV, 0b001011) => InstrId::VxorVv,
        (F3_OPIVV, 0b000100) => InstrId::VminuVv,
        (F3_OPIVV, 0b011000) => InstrId::VmseqVv,
        (F3_OPIVV, 0b010111) => InstrId::VmergeVvm,
        (F3_OPIVI, 0b000000) => InstrId::VaddVi,
        (F3_OPIVX, 0b000000) => InstrId::VaddVx,
        (F3_OPMVV, 0b101101) => InstrId::VmaccVv,
        (F3_OPMVV, 0b110001) => InstrId::VwaddVv,
        (F3_OPMVV, 0b100101) => InstrId::VmulVv,
        (F3_OPFVV, 0b000000) => InstrId::VfaddVv,
        _ => {
            return DecodedInst::illegal(vaddr, paddr, word, 4);
        }
    };
    DecodedInst::new(vaddr, paddr, word, 4, id, operands).with_vec_fields(vec_fields)
}

fn decode_vector_mem(word: u32, vaddr: u64, paddr: u64, is_load: bool) -> DecodedInst {
    let mop = extract_bits(word, 26, 2);
    let vm = extract_bits(word, 25, 1) == 0;
    let lumop_or_sumop = extract_bits(word, 20, 5);
    let nf = extract_bits(word, 29, 3);
    let mew = extract_bits(word, 28, 1) == 1;
    let width = funct3(word);
    let id = if is_load {
        InstrId::VectorLoad
    } else {
        InstrId::VectorStore
    };
    let operands = [rd(word), rs1(word), width, 0];
    let vec_fields = VecFields {
        vm,
        lumop: mop << 5 | lumop_or_sumop,
        mop,
        mew,
        nf,
    };
    DecodedInst::new(vaddr, paddr, word, 4, id, operands).with_vec_fields(vec_fields)
}

fn decode_vector_crypto(word: u32) -> Option<(InstrId, [u32; 4])> {
    let funct6v = funct6(word);
    let operands = [rd(word), rs1(word), rs2(word), 0];
    let id = match funct6v {
        0b101000 => InstrId::VaesdmVv,
        0b101101 => InstrId::Vsha2msVv,
        0b110000 => InstrId::Vsm4rVv,
        0b101100 => InstrId::VghshVv,
        _ => return None,
    };
    Some((id, operands))
}
