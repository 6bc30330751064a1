//! `DecodedInst`: the decoder's single output type. Carries everything
//! downstream code (a Hart, a disassembler, the IOMMU's ATS path) needs
//! without re-parsing the raw word.

use super::table::{table, Category, Extension, Format, InstrId, OperandKind, OperandMode};

/// Auxiliary vector-instruction fields, populated only when the decoded
/// instruction belongs to the `V`/`Zvk` extensions (`vm` mask bit, effective
/// element width/count once `vtype`/`vl` are known to the caller).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VecFields {
    pub vm: bool,
    pub lumop: u32,
    pub mop: u32,
    pub mew: bool,
    pub nf: u32,
}

/// The decoder's output: either a fully valid instruction referencing its
/// `OpcodeEntry`, or `valid: false` with `entry` left `None` (the decoder
/// never panics or returns `Err`; see 's totality requirement).
#[derive(Debug, Clone, Copy)]
pub struct DecodedInst {
    pub vaddr: u64,
    pub paddr: u64,
    pub inst: u32,
    pub size: u8,
    entry: Option<InstrId>,
    pub op: [u32; 4],
    pub values: [u64; 4],
    pub valid: bool,
    /// Set when a caller-supplied PMP/PMA mask hid part of this fetch
    /// (mirrors `DecodedInst.hpp`'s `masked_` flag).
    pub masked: bool,
    pub vec_fields: VecFields,
}

impl DecodedInst {
    pub(super) fn illegal(vaddr: u64, paddr: u64, inst: u32, size: u8) -> Self {
        DecodedInst {
            vaddr,
            paddr,
            inst,
            size,
            entry: None,
            op: [0; 4],
            values: [0; 4],
            valid: false,
            masked: false,
            vec_fields: VecFields::default(),
        }
    }

    pub(super) fn new(
        vaddr: u64,
        paddr: u64,
        inst: u32,
        size: u8,
        id: InstrId,
        op: [u32; 4],
    ) -> Self {
        DecodedInst {
            vaddr,
            paddr,
            inst,
            size,
            entry: Some(id),
            op,
            values: [0; 4],
            valid: true,
            masked: false,
            vec_fields: VecFields::default(),
        }
    }

    pub(super) fn with_vec_fields(mut self, vec_fields: VecFields) -> Self {
        self.vec_fields = vec_fields;
        self
    }

    pub fn instr_id(&self) -> InstrId {
        self.entry.unwrap_or(InstrId::Illegal)
    }

    pub fn mnemonic(&self) -> &'static str {
        table().entry(self.instr_id()).mnemonic
    }

    pub fn format(&self) -> Format {
        table().entry(self.instr_id()).format
    }

    pub fn extension(&self) -> Extension {
        table().entry(self.instr_id()).extension
    }

    pub fn category(&self) -> Category {
        table().entry(self.instr_id()).category
    }

    pub fn data_size(&self) -> u8 {
        table().entry(self.instr_id()).data_size
    }

    pub fn operand_count(&self) -> u8 {
        table().entry(self.instr_id()).operand_count
    }

    /// `op0()`..`op3()` convenience accessors, matching `DecodedInst.hpp`.
    pub fn op0(&self) -> u32 {
        self.op[0]
    }
    pub fn op1(&self) -> u32 {
        self.op[1]
    }
    pub fn op2(&self) -> u32 {
        self.op[2]
    }
    pub fn op3(&self) -> u32 {
        self.op[3]
    }

    /// The raw operand word for slot `i`, or 0 for an out-of-range slot.
    pub fn ith_operand(&self, i: usize) -> u32 {
        self.op.get(i).copied().unwrap_or(0)
    }

    pub fn ith_operand_type(&self, i: usize) -> OperandKind {
        table()
            .entry(self.instr_id())
            .operand_kinds
            .get(i)
            .copied()
            .unwrap_or(OperandKind::None)
    }

    /// The *declared* mode for operand `i`, ignoring any instruction-specific
    /// special case.
    pub fn ith_operand_mode(&self, i: usize) -> OperandMode {
        table()
            .entry(self.instr_id())
            .operand_modes
            .get(i)
            .copied()
            .unwrap_or(OperandMode::None)
    }

    /// The *effective* mode for operand `i`, applying the one documented
    /// special case from `DecodedInst.hpp`: `csrrs`/`csrrc` declare their CSR
    /// operand read-write, but when the paired integer source register
    /// (`op2`, `rs1`) is `x0`, the instruction does not actually write the
    /// CSR, so the effective mode narrows to `Read`.
    pub fn effective_ith_operand_mode(&self, i: usize) -> OperandMode {
        let id = self.instr_id();
        if matches!(id, InstrId::Csrrs | InstrId::Csrrc)
            && self.ith_operand_type(i) == OperandKind::CsReg
            && self.op2() == 0
        {
            return OperandMode::Read;
        }
        self.ith_operand_mode(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    #[test]
    fn csrrs_with_x0_source_is_read_only() {
        // csrrs x5, mstatus(0x300), x0
        let word = (0x300u32 << 20) | (0 << 15) | (0b010 << 12) | (5 << 7) | 0b1110011;
        let d = decode(word, 0, 0, true);
        assert!(d.valid);
        assert_eq!(d.instr_id(), InstrId::Csrrs);
        assert_eq!(
            d.effective_ith_operand_mode(1),
            OperandMode::Read,
            "csrrs with rs1=x0 must not report a CSR write"
        );
    }

    #[test]
    fn csrrs_with_nonzero_source_is_readwrite() {
        // csrrs x5, mstatus(0x300), x1
        let word = (0x300u32 << 20) | (1 << 15) | (0b010 << 12) | (5 << 7) | 0b1110011;
        let d = decode(word, 0, 0, true);
        assert_eq!(d.effective_ith_operand_mode(1), OperandMode::ReadWrite);
    }
}
