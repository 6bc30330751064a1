//! The IOMMU's memory-mapped CSR bank and its MMIO offset layout. The
//! write path (RW1C/RW1S-then-mask algorithm — see DESIGN.md) and the
//! `iohpmctr`/`iohpmevt`/MSI-table offset ordering follow the RISC-V
//! IOMMU architecture's register semantics.
//!
//! One `Csr` value per register, addressed both by a strongly typed
//! `CsrId` (used by the translation/command engines) and by its byte
//! offset (used by the MMIO dispatcher), in a "construct once, look up by
//! address" shape.

use std::collections::HashMap;

/// Identifies one CSR (or one element of an indexed CSR family) without
/// going through its byte offset. Indexed families use 1-based indices
/// matching the architecture's own numbering (`iohpmctr1..31`, vectors
/// `0..15` for the MSI table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsrId {
    Capabilities,
    Fctl,
    Ddtp,
    Cqb,
    Cqh,
    Cqt,
    Fqb,
    Fqh,
    Fqt,
    Pqb,
    Pqh,
    Pqt,
    Cqcsr,
    Fqcsr,
    Pqcsr,
    Ipsr,
    IoCountOvf,
    IoCountInh,
    IoHpmCycles,
    IoHpmCtr(u8),
    IoHpmEvt(u8),
    TrReqIova,
    TrReqCtl,
    TrResponse,
    IommuQosid,
    Icvec,
    MsiAddr(u8),
    MsiData(u8),
    MsiVecCtl(u8),
}

/// One CSR: its wire geometry (offset/size), its reset value, and its
/// three field masks (`RW1C & RW1S = 0`).
#[derive(Debug, Clone, Copy)]
pub struct Csr {
    pub id: CsrId,
    pub name: &'static str,
    pub offset: u32,
    pub size: u8,
    pub reset: u64,
    pub write_mask: u64,
    pub rw1c_mask: u64,
    pub rw1s_mask: u64,
    value: u64,
}

impl Csr {
    fn new(
        id: CsrId,
        name: &'static str,
        offset: u32,
        size: u8,
        reset: u64,
        write_mask: u64,
        rw1c_mask: u64,
        rw1s_mask: u64,
    ) -> Self {
        debug_assert_eq!(rw1c_mask & rw1s_mask, 0, "{name}: RW1C and RW1S overlap");
        Csr {
            id,
            name,
            offset,
            size,
            reset,
            write_mask,
            rw1c_mask,
            rw1s_mask,
            value: reset,
        }
    }

    pub fn read(&self) -> u64 {
        self.value
    }

    /// RW1C/RW1S are applied
    /// against the incoming value before the write mask gates which bits
    /// of the result actually land (a bit outside `write_mask` is
    /// preserved even if it is also set in `rw1c_mask`/`rw1s_mask`).
    pub fn write(&mut self, new_val: u64) {
        let mut eff = new_val & !self.rw1c_mask;
        eff |= self.rw1c_mask & self.value & !new_val;
        eff &= !self.rw1s_mask;
        eff |= self.rw1s_mask & (new_val | (self.value & !new_val));
        self.value = (self.value & !self.write_mask) | (eff & self.write_mask);
    }

    /// Write bypassing RW1C/RW1S semantics, used internally by the
    /// translation/command engines to update state the CSR bank merely
    /// exposes (e.g. advancing `cqh`, setting `ipsr` bits programmatically).
    pub fn poke(&mut self, new_val: u64) {
        self.value = (self.value & !self.write_mask) | (new_val & self.write_mask);
    }

    /// Set the full raw value, ignoring the write mask entirely (reset,
    /// and fields like `capabilities` that are configured once at
    /// construction and otherwise read-only).
    pub fn force(&mut self, value: u64) {
        self.value = value;
    }

    pub fn reset_value(&mut self) {
        self.value = self.reset;
    }
}

/// Capability bits configured at construction; `capabilities` itself is
/// read-only after that and configurable only here.
#[derive(Debug, Clone, Copy, Default)]
pub struct IommuCapabilities {
    pub version: u8,
    pub sv32: bool,
    pub sv39: bool,
    pub sv48: bool,
    pub sv57: bool,
    pub svpbmt: bool,
    pub sv32x4: bool,
    pub sv39x4: bool,
    pub sv48x4: bool,
    pub sv57x4: bool,
    pub amo_mrif: bool,
    pub msi_flat: bool,
    pub msi_mrif: bool,
    pub amo_hwad: bool,
    pub ats: bool,
    pub t2gpa: bool,
    pub end_field: bool,
    pub igs: IgsMode,
    pub hpm: bool,
    pub debug: bool,
    pub pas: u8,
    pub pd8: bool,
    pub pd17: bool,
    pub pd20: bool,
    pub qosid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgsMode {
    #[default]
    Msi,
    Wsi,
    Both,
}

impl IommuCapabilities {
    /// Inverse of `pack`, used by the translation engine to consult
    /// capability bits without re-deriving them from the raw register
    /// value at every call site.
    pub fn unpack(v: u64) -> Self {
        let igs = match (v >> 28) & 0x3 {
            1 => IgsMode::Wsi,
            2 => IgsMode::Both,
            _ => IgsMode::Msi,
        };
        IommuCapabilities {
            version: (v & 0xff) as u8,
            sv32: v & (1 << 8) != 0,
            sv39: v & (1 << 9) != 0,
            sv48: v & (1 << 10) != 0,
            sv57: v & (1 << 11) != 0,
            svpbmt: v & (1 << 15) != 0,
            sv32x4: v & (1 << 16) != 0,
            sv39x4: v & (1 << 17) != 0,
            sv48x4: v & (1 << 18) != 0,
            sv57x4: v & (1 << 19) != 0,
            amo_mrif: v & (1 << 21) != 0,
            msi_flat: v & (1 << 22) != 0,
            msi_mrif: v & (1 << 23) != 0,
            amo_hwad: v & (1 << 24) != 0,
            ats: v & (1 << 25) != 0,
            t2gpa: v & (1 << 26) != 0,
            end_field: v & (1 << 27) != 0,
            igs,
            hpm: v & (1 << 30) != 0,
            debug: v & (1 << 31) != 0,
            pas: ((v >> 32) & 0x3f) as u8,
            pd8: v & (1 << 38) != 0,
            pd17: v & (1 << 39) != 0,
            pd20: v & (1 << 40) != 0,
            qosid: v & (1 << 41) != 0,
        }
    }

    fn pack(self) -> u64 {
        let mut v: u64 = 0;
        v |= self.version as u64;
        v |= (self.sv32 as u64) << 8;
        v |= (self.sv39 as u64) << 9;
        v |= (self.sv48 as u64) << 10;
        v |= (self.sv57 as u64) << 11;
        v |= (self.svpbmt as u64) << 15;
        v |= (self.sv32x4 as u64) << 16;
        v |= (self.sv39x4 as u64) << 17;
        v |= (self.sv48x4 as u64) << 18;
        v |= (self.sv57x4 as u64) << 19;
        v |= (self.amo_mrif as u64) << 21;
        v |= (self.msi_flat as u64) << 22;
        v |= (self.msi_mrif as u64) << 23;
        v |= (self.amo_hwad as u64) << 24;
        v |= (self.ats as u64) << 25;
        v |= (self.t2gpa as u64) << 26;
        v |= (self.end_field as u64) << 27;
        let igs = match self.igs {
            IgsMode::Msi => 0u64,
            IgsMode::Wsi => 1,
            IgsMode::Both => 2,
        };
        v |= igs << 28;
        v |= (self.hpm as u64) << 30;
        v |= (self.debug as u64) << 31;
        v |= (self.pas as u64 & 0x3f) << 32;
        v |= (self.pd8 as u64) << 38;
        v |= (self.pd17 as u64) << 39;
        v |= (self.pd20 as u64) << 40;
        v |= (self.qosid as u64) << 41;
        v
    }
}

/// `Ddtp.Mode`, carried over verbatim from the RISC-V IOMMU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdtpMode {
    Off,
    Bare,
    Level1,
    Level2,
    Level3,
}

impl DdtpMode {
    pub fn from_bits(bits: u64) -> Option<DdtpMode> {
        match bits {
            0 => Some(DdtpMode::Off),
            1 => Some(DdtpMode::Bare),
            2 => Some(DdtpMode::Level1),
            3 => Some(DdtpMode::Level2),
            4 => Some(DdtpMode::Level3),
            _ => None,
        }
    }

    pub fn bits(self) -> u64 {
        match self {
            DdtpMode::Off => 0,
            DdtpMode::Bare => 1,
            DdtpMode::Level1 => 2,
            DdtpMode::Level2 => 3,
            DdtpMode::Level3 => 4,
        }
    }

    pub fn levels(self) -> u32 {
        match self {
            DdtpMode::Level1 => 1,
            DdtpMode::Level2 => 2,
            DdtpMode::Level3 => 3,
            _ => 0,
        }
    }
}

/// Which ring-buffer side effect a CSR write triggered, reported back to
/// the top-level `Iommu` so it can drive the command/fault/page-request
/// engines without the CSR bank depending on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEffect {
    None,
    /// `cqt` was written: a write to `cqt` triggers command processing.
    CommandTailUpdated,
    /// Positive edge on `cqcsr`/`fqcsr`/`pqcsr`.enable.
    QueueEnabled(Queue),
    /// Negative edge on the same bit.
    QueueDisabled(Queue),
    /// `tr_req_ctl.go_busy` rising edge: launch a debug translation.
    DebugTranslateRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Queue {
    Command,
    Fault,
    PageRequest,
}

/// The MMIO CSR bank: 1024 bytes of architected registers plus whatever
/// PMP/PMA region CSRs the host places beyond that (owned separately by
/// `PmpManager`, not modelled here).
pub struct CsrBank {
    csrs: Vec<Csr>,
    by_offset: HashMap<u32, usize>,
    by_id: HashMap<CsrId, usize>,
}

const MSI_TABLE_ENTRIES: u8 = 16;

impl CsrBank {
    pub fn new(caps: IommuCapabilities) -> Self {
        let mut csrs = Vec::new();
        let wsi_hardwired = caps.igs != IgsMode::Both;

        csrs.push(Csr::new(
            CsrId::Capabilities,
            "capabilities",
            0,
            8,
            caps.pack(),
            0,
            0,
            0,
        ));
        let fctl_mask = if wsi_hardwired { 0b101 } else { 0b111 };
        csrs.push(Csr::new(CsrId::Fctl, "fctl", 8, 4, 0, fctl_mask, 0, 0));
        csrs.push(Csr::new(
            CsrId::Ddtp,
            "ddtp",
            16,
            8,
            0,
            0x0003_ffff_ffff_fc0f,
            0,
            0,
        ));
        csrs.push(Csr::new(CsrId::Cqb, "cqb", 24, 8, 0, 0x0003_ffff_ffff_fc1f, 0, 0));
        csrs.push(Csr::new(CsrId::Cqh, "cqh", 32, 4, 0, 0x00ff_ffff, 0, 0));
        csrs.push(Csr::new(CsrId::Cqt, "cqt", 36, 4, 0, 0x00ff_ffff, 0, 0));
        csrs.push(Csr::new(CsrId::Fqb, "fqb", 40, 8, 0, 0x0003_ffff_ffff_fc1f, 0, 0));
        csrs.push(Csr::new(CsrId::Fqh, "fqh", 48, 4, 0, 0x00ff_ffff, 0, 0));
        csrs.push(Csr::new(CsrId::Fqt, "fqt", 52, 4, 0, 0x00ff_ffff, 0, 0));
        csrs.push(Csr::new(CsrId::Pqb, "pqb", 56, 8, 0, 0x0003_ffff_ffff_fc1f, 0, 0));
        csrs.push(Csr::new(CsrId::Pqh, "pqh", 64, 4, 0, 0x00ff_ffff, 0, 0));
        csrs.push(Csr::new(CsrId::Pqt, "pqt", 68, 4, 0, 0x00ff_ffff, 0, 0));
        // `mask_` gates the result of the RW1C/RW1S computation too (see
        // `Csr::write`), so it must include those bits, not just the
        // plainly-writable ones.
        csrs.push(Csr::new(
            CsrId::Cqcsr,
            "cqcsr",
            72,
            4,
            0,
            0x0000_0f03,
            0b0000_1111_0000_0000,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::Fqcsr,
            "fqcsr",
            76,
            4,
            0,
            0x0000_0303,
            0b0000_0011_0000_0000,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::Pqcsr,
            "pqcsr",
            80,
            4,
            0,
            0x0000_0303,
            0b0000_0011_0000_0000,
            0,
        ));
        csrs.push(Csr::new(CsrId::Ipsr, "ipsr", 84, 4, 0, 0b1111, 0b1111, 0));
        csrs.push(Csr::new(
            CsrId::IoCountOvf,
            "iocountovf",
            88,
            4,
            0,
            0,
            0,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::IoCountInh,
            "iocountinh",
            92,
            4,
            0,
            if caps.hpm { 0xffff_ffff } else { 0 },
            0,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::IoHpmCycles,
            "iohpmcycles",
            96,
            8,
            0,
            if caps.hpm { u64::MAX } else { 0 },
            0,
            0,
        ));
        for i in 1..=31u8 {
            let offset = 104 + (i as u32 - 1) * 8;
            csrs.push(Csr::new(
                CsrId::IoHpmCtr(i),
                "iohpmctr",
                offset,
                8,
                0,
                if caps.hpm { u64::MAX } else { 0 },
                0,
                0,
            ));
        }
        for i in 1..=31u8 {
            let offset = 352 + (i as u32 - 1) * 8;
            csrs.push(Csr::new(
                CsrId::IoHpmEvt(i),
                "iohpmevt",
                offset,
                8,
                0,
                if caps.hpm { u64::MAX } else { 0 },
                0,
                0,
            ));
        }
        csrs.push(Csr::new(
            CsrId::TrReqIova,
            "tr_req_iova",
            600,
            8,
            0,
            if caps.debug { !0xfff } else { 0 },
            0,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::TrReqCtl,
            "tr_req_ctl",
            608,
            8,
            0,
            if caps.debug { 0x001f_ffff } else { 0 },
            0,
            if caps.debug { 1 } else { 0 },
        ));
        csrs.push(Csr::new(
            CsrId::TrResponse,
            "tr_response",
            616,
            8,
            0,
            0,
            0,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::IommuQosid,
            "iommu_qosid",
            624,
            4,
            0,
            if caps.qosid { 0xffff } else { 0 },
            0,
            0,
        ));
        csrs.push(Csr::new(
            CsrId::Icvec,
            "icvec",
            760,
            8,
            0,
            if caps.igs != IgsMode::Wsi { 0xffff } else { 0 },
            0,
            0,
        ));
        for i in 0..MSI_TABLE_ENTRIES {
            let base = 768 + (i as u32) * 16;
            let writable = caps.igs != IgsMode::Wsi;
            csrs.push(Csr::new(
                CsrId::MsiAddr(i),
                "msi_addr",
                base,
                8,
                0,
                if writable { 0xffff_ffff_ffff_fffc } else { 0 },
                0,
                0,
            ));
            csrs.push(Csr::new(
                CsrId::MsiData(i),
                "msi_data",
                base + 8,
                4,
                0,
                if writable { 0xffff_ffff } else { 0 },
                0,
                0,
            ));
            csrs.push(Csr::new(
                CsrId::MsiVecCtl(i),
                "msi_vec_ctl",
                base + 12,
                4,
                0,
                if writable { 1 } else { 0 },
                0,
                0,
            ));
        }

        let mut by_offset = HashMap::new();
        let mut by_id = HashMap::new();
        for (idx, csr) in csrs.iter().enumerate() {
            by_offset.insert(csr.offset, idx);
            by_id.insert(csr.id, idx);
        }

        CsrBank {
            csrs,
            by_offset,
            by_id,
        }
    }

    pub fn get(&self, id: CsrId) -> u64 {
        self.by_id.get(&id).map(|&i| self.csrs[i].read()).unwrap_or(0)
    }

    pub fn set(&mut self, id: CsrId, value: u64) {
        if let Some(&i) = self.by_id.get(&id) {
            self.csrs[i].poke(value);
        }
    }

    pub fn force(&mut self, id: CsrId, value: u64) {
        if let Some(&i) = self.by_id.get(&id) {
            self.csrs[i].force(value);
        }
    }

    /// Read-modify-write a CSR's full raw value, bypassing the write mask
    /// entirely. Used by the translation/command/queue engines to update
    /// bits software cannot directly write (`cqon`/`busy`, `cqh`/`fqh`/`pqh`
    /// advancement, `ipsr` bits the hardware itself sets).
    pub fn modify(&mut self, id: CsrId, f: impl FnOnce(u64) -> u64) {
        if let Some(&i) = self.by_id.get(&id) {
            let new = f(self.csrs[i].read());
            self.csrs[i].force(new);
        }
    }

    pub fn csr(&self, id: CsrId) -> Option<&Csr> {
        self.by_id.get(&id).map(|&i| &self.csrs[i])
    }

    /// Word-offset lookup used by the MMIO dispatcher.
    /// Accesses must be 4 or 8 bytes and naturally aligned; a 4-byte access
    /// into an 8-byte CSR selects the low or high half by the low bit of
    /// the word offset.
    pub fn mmio_read(&self, addr: u64, size: u8) -> Option<u64> {
        if size != 4 && size != 8 {
            return None;
        }
        if addr % size as u64 != 0 {
            return None;
        }
        let addr = addr as u32;
        if size == 8 {
            let idx = *self.by_offset.get(&addr)?;
            if self.csrs[idx].size != 8 {
                return None;
            }
            return Some(self.csrs[idx].read());
        }
        // 4-byte access: either a naturally 4-byte CSR, or one half of an
        // 8-byte CSR.
        if let Some(&idx) = self.by_offset.get(&addr) {
            let csr = &self.csrs[idx];
            if csr.size == 4 {
                return Some(csr.read());
            }
            return Some(csr.read() & 0xffff_ffff);
        }
        let base = addr & !0x7;
        let &idx = self.by_offset.get(&base)?;
        let csr = &self.csrs[idx];
        if csr.size != 8 {
            return None;
        }
        Some((csr.read() >> 32) & 0xffff_ffff)
    }

    pub fn mmio_write(&mut self, addr: u64, size: u8, value: u64) -> Option<WriteEffect> {
        if size != 4 && size != 8 {
            return None;
        }
        if addr % size as u64 != 0 {
            return None;
        }
        let addr32 = addr as u32;
        let idx = if let Some(&idx) = self.by_offset.get(&addr32) {
            idx
        } else if size == 4 {
            *self.by_offset.get(&(addr32 & !0x7))?
        } else {
            return None;
        };

        let id = self.csrs[idx].id;
        let before = self.csrs[idx].read();
        let csr_size = self.csrs[idx].size;

        if size == 8 || csr_size == 4 {
            self.csrs[idx].write(value);
        } else {
            // 4-byte write into one half of an 8-byte CSR; the unaffected
            // half is preserved by folding it into the write mask's
            // complement before re-writing the full value.
            let low_half = addr32 == self.csrs[idx].offset;
            let new_full = if low_half {
                (before & !0xffff_ffff) | (value & 0xffff_ffff)
            } else {
                (before & 0xffff_ffff) | (value << 32)
            };
            self.csrs[idx].write(new_full);
        }
        let after = self.csrs[idx].read();

        Some(self.effect_for(id, before, after))
    }

    fn effect_for(&self, id: CsrId, before: u64, after: u64) -> WriteEffect {
        match id {
            CsrId::Cqt => WriteEffect::CommandTailUpdated,
            CsrId::Cqcsr => self.enable_edge(before, after, Queue::Command),
            CsrId::Fqcsr => self.enable_edge(before, after, Queue::Fault),
            CsrId::Pqcsr => self.enable_edge(before, after, Queue::PageRequest),
            CsrId::TrReqCtl if before & 1 == 0 && after & 1 == 1 => {
                WriteEffect::DebugTranslateRequested
            }
            _ => WriteEffect::None,
        }
    }

    fn enable_edge(&self, before: u64, after: u64, queue: Queue) -> WriteEffect {
        let was_on = before & 1 != 0;
        let now_on = after & 1 != 0;
        if !was_on && now_on {
            WriteEffect::QueueEnabled(queue)
        } else if was_on && !now_on {
            WriteEffect::QueueDisabled(queue)
        } else {
            WriteEffect::None
        }
    }

    pub fn capabilities(&self) -> u64 {
        self.get(CsrId::Capabilities)
    }

    pub fn capability_flags(&self) -> IommuCapabilities {
        IommuCapabilities::unpack(self.capabilities())
    }

    pub fn fctl_be(&self) -> bool {
        self.get(CsrId::Fctl) & 1 != 0
    }

    pub fn fctl_gxl(&self) -> bool {
        self.get(CsrId::Fctl) & 0b100 != 0
    }

    pub fn ddtp_mode(&self) -> DdtpMode {
        DdtpMode::from_bits(self.get(CsrId::Ddtp) & 0xf).unwrap_or(DdtpMode::Off)
    }

    pub fn ddtp_ppn(&self) -> u64 {
        (self.get(CsrId::Ddtp) >> 10) & 0x0fff_ffff_ffff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rw1c_clears_only_on_write_one() {
        let mut bank = CsrBank::new(IommuCapabilities::default());
        bank.set(CsrId::Ipsr, 0b1111);
        bank.mmio_write(84, 4, 0b0001);
        assert_eq!(bank.get(CsrId::Ipsr) & 0b1111, 0b1110);
    }

    #[test]
    fn rw1s_sets_only_on_write_one() {
        let mut bank = CsrBank::new(IommuCapabilities {
            debug: true,
            ..Default::default()
        });
        bank.mmio_write(608, 8, 1);
        assert_eq!(bank.get(CsrId::TrReqCtl) & 1, 1);
    }

    #[test]
    fn four_byte_access_preserves_other_half_of_eight_byte_csr() {
        let mut bank = CsrBank::new(IommuCapabilities::default());
        bank.mmio_write(16, 8, 0x0000_0000_0000_0002);
        let low_before = bank.mmio_read(16, 4).unwrap();
        bank.mmio_write(20, 4, 0xffff_ffff);
        let low_after = bank.mmio_read(16, 4).unwrap();
        assert_eq!(low_before, low_after, "low half must survive a write to the high half");
        assert_ne!(bank.mmio_read(20, 4).unwrap(), 0, "high half should have taken the new ppn bits");
    }

    #[test]
    fn cqt_write_reports_command_tail_updated() {
        let mut bank = CsrBank::new(IommuCapabilities::default());
        let effect = bank.mmio_write(36, 4, 5).unwrap();
        assert_eq!(effect, WriteEffect::CommandTailUpdated);
    }

    #[test]
    fn cqcsr_enable_edge_detected() {
        let mut bank = CsrBank::new(IommuCapabilities::default());
        let effect = bank.mmio_write(72, 4, 1).unwrap();
        assert_eq!(effect, WriteEffect::QueueEnabled(Queue::Command));
        let effect = bank.mmio_write(72, 4, 0).unwrap();
        assert_eq!(effect, WriteEffect::QueueDisabled(Queue::Command));
    }

    #[test]
    fn capabilities_read_only() {
        let mut bank = CsrBank::new(IommuCapabilities {
            version: 1,
            ats: true,
            ..Default::default()
        });
        let before = bank.get(CsrId::Capabilities);
        bank.mmio_write(0, 8, 0xffff_ffff_ffff_ffff);
        assert_eq!(bank.get(CsrId::Capabilities), before);
    }
}
