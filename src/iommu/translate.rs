//! The translation engine: device/process directory walks, two-stage
//! translation and MSI remap, following the RISC-V IOMMU architecture's
//! directory-walk and translation algorithm step for step.
//!
//! Lives as an `impl` block on `Iommu` rather than a separate struct: the
//! walk needs the CSR bank (for capabilities/fctl/ddtp), the directory
//! caches, and the platform callbacks all at once, and splitting those
//! across a second owner would just mean passing them all back in through
//! every call.

use super::callbacks::StageResult;
use super::csr::{DdtpMode, IommuCapabilities};
use super::device_context::{DeviceContext, IohgatpMode, MsiptpMode, PdtpMode};
use super::fault::{Cause, FaultRecord, TransactionType, TranslateFault};
use super::process_context::{Ddte, IosatpMode, Pdte, ProcessContext};
use super::Iommu;
use crate::iommu::callbacks::IommuPlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    User,
    Supervisor,
}

#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest {
    pub device_id: u32,
    pub pid: Option<u32>,
    pub ttype: TransactionType,
    pub iova: u64,
    pub privilege: Privilege,
    pub is_write: bool,
    pub is_exec: bool,
}

/// Effective first-stage context, resolved from either the device context
/// directly (PDTV=0) or a process-context leaf (PDTV=1), or left `Bare`.
enum FirstStage {
    Bare,
    Active {
        mode: IosatpMode,
        ppn: u64,
        pscid: u32,
        sum: bool,
    },
}

const DDI_WIDTHS_BASE: [u32; 3] = [7, 9, 8];
const DDI_WIDTHS_EXTENDED: [u32; 3] = [6, 9, 9];
const PDI_WIDTHS: [u32; 3] = [8, 9, 3];

fn ddi(device_id: u32, extended: bool, i: usize) -> u32 {
    let widths = if extended { DDI_WIDTHS_EXTENDED } else { DDI_WIDTHS_BASE };
    let shift: u32 = widths[..i].iter().sum();
    (device_id >> shift) & ((1u32 << widths[i]) - 1)
}

fn ddi_total_width(extended: bool, levels: u32) -> u32 {
    let widths = if extended { DDI_WIDTHS_EXTENDED } else { DDI_WIDTHS_BASE };
    widths[..levels as usize].iter().sum()
}

fn pdi(pid: u32, i: u32) -> u32 {
    let shift: u32 = PDI_WIDTHS[..i as usize].iter().sum();
    (pid >> shift) & ((1u32 << PDI_WIDTHS[i as usize]) - 1)
}

impl<P: IommuPlatform> Iommu<P> {
    /// Entry point: mode gate through second-stage translation. Fault
    /// recording happens at the point of failure (so `dtf` gating sees
    /// whether a device context was actually resolved), not here.
    pub fn translate(&mut self, req: TranslationRequest) -> Result<u64, TranslateFault> {
        self.translate_inner(req)
    }

    fn translate_inner(&mut self, req: TranslationRequest) -> Result<u64, TranslateFault> {
        // Step 1 -- IOMMU mode gate.
        match self.csr.ddtp_mode() {
            DdtpMode::Off => {
                return Err(self.fail(&req, None, Cause::ALL_INBOUND_DISALLOWED, req.iova, 0));
            }
            DdtpMode::Bare => {
                if req.ttype.is_translated() || req.ttype.is_ats() {
                    return Err(self.fail(&req, None, Cause::TRANSACTION_TYPE_DISALLOWED, req.iova, 0));
                }
                return Ok(req.iova);
            }
            _ => {}
        }

        // Step 2/3 -- device-context lookup and validation.
        let dc = match self.load_device_context(req.device_id) {
            Ok(dc) => dc,
            Err(cause) => return Err(self.fail(&req, None, cause, 0, 0)),
        };

        // Step 4 -- permission gate.
        if (req.ttype.is_translated() || req.ttype.is_ats()) && !dc.ats() {
            return Err(self.fail(&req, Some(&dc), Cause::TRANSACTION_TYPE_DISALLOWED, req.iova, 0));
        }
        if req.pid.is_some() && !dc.pdtv() {
            return Err(self.fail(&req, Some(&dc), Cause::TRANSACTION_TYPE_DISALLOWED, req.iova, 0));
        }

        // Step 5 -- fast path for translated requests.
        if req.ttype.is_translated() && !dc.t2gpa() {
            return Ok(req.iova);
        }

        // Step 6 -- first-stage selection.
        let first_stage = match self.select_first_stage(&dc, req.pid, req.privilege) {
            Ok(fs) => fs,
            Err(cause) => return Err(self.fail(&req, Some(&dc), cause, req.iova, 0)),
        };

        // Step 7 -- first-stage translation.
        let gpa = match first_stage {
            FirstStage::Bare => req.iova,
            FirstStage::Active { mode, .. } if mode == IosatpMode::Bare => req.iova,
            FirstStage::Active { mode, ppn, pscid, sum } => {
                self.platform.stage1_config(iosatp_mode_bits(mode), pscid, ppn, sum);
                match self.platform.stage1(req.iova, req.is_write, req.is_exec) {
                    Ok(StageResult { output_addr, .. }) => output_addr,
                    Err(f) => return Err(self.fail(&req, Some(&dc), f.cause, f.iova, f.iotval2)),
                }
            }
        };

        // Step 8 -- MSI remap.
        if dc.extended && dc.msi_mode() != Some(MsiptpMode::Off) && dc.is_msi_address(gpa) {
            return match self.remap_msi(&dc, gpa, req.is_exec) {
                Ok(pa) => Ok(pa),
                Err(cause) => Err(self.fail(&req, Some(&dc), cause, gpa, 0)),
            };
        }

        // Step 9 -- second-stage translation.
        match dc.iohgatp_mode() {
            Some(IohgatpMode::Bare) | None => Ok(gpa),
            Some(_) => {
                self.platform
                    .stage2_config(iohgatp_mode_bits(dc.iohgatp_mode()), dc.iohgatp_gscid(), dc.iohgatp_ppn());
                match self.platform.stage2(gpa, req.is_write, req.is_exec) {
                    Ok(StageResult { output_addr, .. }) => Ok(output_addr),
                    Err(f) => {
                        let iotval2 = if f.cause.is_guest_page_fault() {
                            self.guest_page_fault_iotval2(req.is_write)
                        } else {
                            f.iotval2
                        };
                        Err(self.fail(&req, Some(&dc), f.cause, f.iova, iotval2))
                    }
                }
            }
        }
    }

    /// Build and (unless `dc.dtf()`) record a fault, then return the
    /// `TranslateFault` the caller should propagate. `dc` is `None` only
    /// when no device context has been resolved yet (mode gate, DDT walk
    /// itself) -- dtf can never suppress those.
    fn fail(&mut self, req: &TranslationRequest, dc: Option<&DeviceContext>, cause: Cause, iova: u64, iotval2: u64) -> TranslateFault {
        let suppressed = dc.map(|d| d.dtf()).unwrap_or(false);
        if !suppressed {
            let record = FaultRecord {
                cause: cause.0,
                pid: req.pid.unwrap_or(0),
                pv: req.pid.is_some(),
                priv_mode: req.privilege == Privilege::Supervisor,
                ttype: req.ttype,
                device_id: req.device_id,
                iotval: iova,
                iotval2,
            };
            self.write_fault_record(record);
        }
        TranslateFault { cause, iova, iotval2 }
    }

    fn guest_page_fault_iotval2(&self, is_write: bool) -> u64 {
        let trap_gpa = self.platform.stage2_trap_info();
        ((trap_gpa >> 2) << 2) | ((is_write as u64) << 1)
    }

    fn load_device_context(&mut self, device_id: u32) -> Result<DeviceContext, Cause> {
        if let Some(dc) = self.ddt_cache.get(&device_id) {
            return Ok(*dc);
        }
        let caps = self.csr.capability_flags();
        let extended = caps.msi_flat;
        let big_endian = self.csr.fctl_be();
        let levels = self.csr.ddtp_mode().levels();
        if levels == 0 {
            return Err(Cause::ALL_INBOUND_DISALLOWED);
        }
        let total_width = ddi_total_width(extended, levels);
        if device_id >> total_width.min(31) != 0 {
            return Err(Cause::TRANSACTION_TYPE_DISALLOWED);
        }

        let mut addr = self.csr.ddtp_ppn() * self.page_size;
        for ii in (1..levels).rev() {
            let entry_addr = addr + (ddi(device_id, extended, ii as usize) as u64) * 8;
            let mut buf = [0u8; 8];
            if !self.platform.mem_read(entry_addr, &mut buf) {
                return Err(Cause::DDT_ENTRY_LOAD_ACCESS_FAULT);
            }
            let ddte = Ddte(read_u64(&buf, big_endian));
            if !ddte.valid() {
                return Err(Cause::DDT_ENTRY_NOT_VALID);
            }
            if ddte.has_nonzero_reserved_bits() {
                return Err(Cause::DDT_ENTRY_MISCONFIGURED);
            }
            addr = ddte.ppn() * self.page_size;
        }

        let dc_size: u64 = if extended { 64 } else { 32 };
        let dc_addr = addr + (ddi(device_id, extended, 0) as u64) * dc_size;
        let dc = if extended {
            let mut buf = [0u8; 64];
            if !self.platform.mem_read(dc_addr, &mut buf) {
                return Err(Cause::DDT_ENTRY_LOAD_ACCESS_FAULT);
            }
            DeviceContext::from_extended_bytes(&buf, big_endian)
        } else {
            let mut buf = [0u8; 32];
            if !self.platform.mem_read(dc_addr, &mut buf) {
                return Err(Cause::DDT_ENTRY_LOAD_ACCESS_FAULT);
            }
            DeviceContext::from_base_bytes(&buf, big_endian)
        };

        if !dc.valid() {
            return Err(Cause::DDT_ENTRY_NOT_VALID);
        }
        if self.misconfigured_dc(&dc, &caps) {
            return Err(Cause::DDT_ENTRY_MISCONFIGURED);
        }

        self.ddt_cache.insert(device_id, dc);
        Ok(dc)
    }

    /// Device-context validation: the enumerated misconfiguration
    /// conditions (reserved bits, capability/mode mismatches, unsupported
    /// directory depths). Two simplifications noted in DESIGN.md: no
    /// configured-RCID/MCID-width check (this model doesn't carry
    /// configured widths), and the SXL-vs-GXL check below is a plain
    /// consistency check rather than tracking a specific write-mask bit.
    fn misconfigured_dc(&self, dc: &DeviceContext, caps: &IommuCapabilities) -> bool {
        if dc.has_nonzero_reserved_bits() {
            return true;
        }
        if !caps.ats && (dc.ats() || dc.pri() || dc.prpr()) {
            return true;
        }
        if !dc.ats() && (dc.t2gpa() || dc.pri()) {
            return true;
        }
        if !dc.pri() && dc.prpr() {
            return true;
        }
        if !caps.t2gpa && dc.t2gpa() {
            return true;
        }
        if dc.t2gpa() && dc.iohgatp_mode() == Some(IohgatpMode::Bare) {
            return true;
        }
        if dc.pdtv() {
            match dc.pdtp_mode() {
                None => return true,
                Some(PdtpMode::Pd20) if !caps.pd20 => return true,
                Some(PdtpMode::Pd17) if !caps.pd17 => return true,
                Some(PdtpMode::Pd8) if !caps.pd8 => return true,
                _ => {}
            }
        } else {
            let mode = dc.iosatp_mode();
            if dc.sxl() {
                if !matches!(mode, Some(IosatpMode::Bare) | Some(IosatpMode::Sv32)) {
                    return true;
                }
                if mode == Some(IosatpMode::Sv32) && !caps.sv32 {
                    return true;
                }
            } else {
                if !matches!(
                    mode,
                    Some(IosatpMode::Bare) | Some(IosatpMode::Sv39) | Some(IosatpMode::Sv48) | Some(IosatpMode::Sv57)
                ) {
                    return true;
                }
                if (mode == Some(IosatpMode::Sv39) && !caps.sv39)
                    || (mode == Some(IosatpMode::Sv48) && !caps.sv48)
                    || (mode == Some(IosatpMode::Sv57) && !caps.sv57)
                {
                    return true;
                }
            }
        }

        let gxl = self.csr.fctl_gxl();
        match dc.iohgatp_mode() {
            None => return true,
            Some(gmode) => {
                if gxl {
                    if !matches!(gmode, IohgatpMode::Bare | IohgatpMode::Sv32x4) {
                        return true;
                    }
                    if gmode == IohgatpMode::Sv32x4 && !caps.sv32x4 {
                        return true;
                    }
                } else {
                    if !matches!(
                        gmode,
                        IohgatpMode::Bare | IohgatpMode::Sv39x4 | IohgatpMode::Sv48x4 | IohgatpMode::Sv57x4
                    ) {
                        return true;
                    }
                    if (gmode == IohgatpMode::Sv39x4 && !caps.sv39x4)
                        || (gmode == IohgatpMode::Sv48x4 && !caps.sv48x4)
                        || (gmode == IohgatpMode::Sv57x4 && !caps.sv57x4)
                    {
                        return true;
                    }
                }
                if gmode != IohgatpMode::Bare && (dc.iohgatp_ppn() & 0x3) != 0 {
                    return true;
                }
                // IOHGATP Bare requires MSI mode Off; see DESIGN.md for
                // the direction of this check.
                if gmode == IohgatpMode::Bare && dc.extended && dc.msi_mode() != Some(MsiptpMode::Off) {
                    return true;
                }
            }
        }

        if !caps.amo_hwad && (dc.sade() || dc.gade()) {
            return true;
        }
        if !caps.end_field && self.csr.fctl_be() != dc.sbe() {
            return true;
        }
        if gxl && !dc.sxl() {
            return true;
        }

        false
    }

    fn select_first_stage(&mut self, dc: &DeviceContext, pid: Option<u32>, privilege: Privilege) -> Result<FirstStage, Cause> {
        if !dc.pdtv() {
            return Ok(FirstStage::Active {
                mode: dc.iosatp_mode().unwrap_or(IosatpMode::Bare),
                ppn: dc.iosatp_ppn(),
                pscid: dc.pscid(),
                sum: false,
            });
        }

        let effective_pid = match pid {
            Some(p) => p,
            None => {
                if dc.dpe() {
                    0
                } else {
                    return Ok(FirstStage::Bare);
                }
            }
        };

        match dc.pdtp_mode() {
            None | Some(PdtpMode::Bare) => Ok(FirstStage::Bare),
            Some(mode) => {
                let pc = self.load_process_context(dc, effective_pid, mode)?;
                if privilege == Privilege::Supervisor && !pc.ens() {
                    return Err(Cause::TRANSACTION_TYPE_DISALLOWED);
                }
                Ok(FirstStage::Active {
                    mode: pc.iosatp_mode().unwrap_or(IosatpMode::Bare),
                    ppn: pc.iosatp_ppn(),
                    pscid: pc.pscid(),
                    sum: pc.sum(),
                })
            }
        }
    }

    /// Process-directory walk, cached by `(device id, process id)`. Every
    /// intermediate physical address along the PDT walk is itself run
    /// through second-stage translation whenever
    /// `dc.iohgatp.mode != Bare`. The cache key folds the device's GSCID
    /// in as a per-device proxy since a `DeviceContext` value doesn't
    /// carry the device id it was loaded under.
    fn load_process_context(&mut self, dc: &DeviceContext, pid: u32, pdtp_mode: PdtpMode) -> Result<ProcessContext, Cause> {
        let key = (dc.iohgatp_gscid().wrapping_mul(0x9e37_79b9) ^ pid.rotate_left(13), pid);
        if let Some(pc) = self.pdt_cache.get(&key) {
            return Ok(*pc);
        }
        let big_endian = dc.sbe();
        let levels = pdtp_mode.levels();
        let mut addr = dc.pdtp_ppn() * self.page_size;

        for ii in (1..levels).rev() {
            addr = self.stage2_if_needed(dc, addr)?;
            let entry_addr = addr + (pdi(pid, ii) as u64) * 8;
            let mut buf = [0u8; 8];
            if !self.platform.mem_read(entry_addr, &mut buf) {
                return Err(Cause::PDT_ENTRY_LOAD_ACCESS_FAULT);
            }
            let pdte = Pdte(read_u64(&buf, big_endian));
            if !pdte.valid() {
                return Err(Cause::PDT_ENTRY_NOT_VALID);
            }
            if pdte.has_nonzero_reserved_bits() {
                return Err(Cause::PDT_ENTRY_MISCONFIGURED);
            }
            addr = pdte.ppn() * self.page_size;
        }
        addr = self.stage2_if_needed(dc, addr)?;

        let pc_addr = addr + (pdi(pid, 0) as u64) * 16;
        let mut buf = [0u8; 16];
        if !self.platform.mem_read(pc_addr, &mut buf) {
            return Err(Cause::PDT_ENTRY_LOAD_ACCESS_FAULT);
        }
        let pc = ProcessContext::from_bytes(&buf, big_endian);
        if !pc.valid() {
            return Err(Cause::PDT_ENTRY_NOT_VALID);
        }
        if pc.has_nonzero_reserved_bits() {
            return Err(Cause::PDT_ENTRY_MISCONFIGURED);
        }

        self.pdt_cache.insert(key, pc);
        Ok(pc)
    }

    fn stage2_if_needed(&mut self, dc: &DeviceContext, addr: u64) -> Result<u64, Cause> {
        if matches!(dc.iohgatp_mode(), Some(IohgatpMode::Bare) | None) {
            return Ok(addr);
        }
        self.platform
            .stage2_config(iohgatp_mode_bits(dc.iohgatp_mode()), dc.iohgatp_gscid(), dc.iohgatp_ppn());
        match self.platform.stage2(addr, false, false) {
            Ok(r) => Ok(r.output_addr),
            Err(f) => Err(f.cause),
        }
    }

    /// MSI remap: match the guest physical address against the MSI
    /// pattern/mask, then resolve through the MSI page table.
    fn remap_msi(&mut self, dc: &DeviceContext, gpa: u64, is_exec: bool) -> Result<u64, Cause> {
        if is_exec {
            return Err(Cause::INSTRUCTION_ACCESS_FAULT);
        }
        let file = DeviceContext::extract_msi_bits(gpa >> 12, dc.msi_mask());
        let pte_addr = dc.msi_ppn() * self.page_size + file * 16;
        let mut buf = [0u8; 16];
        if !self.platform.mem_read(pte_addr, &mut buf) {
            return Err(Cause::MSI_PTE_LOAD_ACCESS_FAULT);
        }
        match super::msi::parse_msi_pte(&buf, self.csr.fctl_be()) {
            super::msi::MsiPte::NotValid => Err(Cause::MSI_PTE_NOT_VALID),
            super::msi::MsiPte::Misconfigured => Err(Cause::MSI_PTE_MISCONFIGURED),
            super::msi::MsiPte::Basic(basic) => Ok((basic.ppn << 12) | (gpa & 0xfff)),
            super::msi::MsiPte::Mrif(mrif) => {
                let caps = self.csr.capability_flags();
                if !caps.msi_mrif {
                    return Err(Cause::MSI_PTE_MISCONFIGURED);
                }
                Ok(mrif.mrif_addr << 12)
            }
        }
    }
}

fn iosatp_mode_bits(mode: IosatpMode) -> u8 {
    match mode {
        IosatpMode::Bare => 0,
        IosatpMode::Sv32 => 1,
        IosatpMode::Sv39 => 8,
        IosatpMode::Sv48 => 9,
        IosatpMode::Sv57 => 10,
    }
}

fn iohgatp_mode_bits(mode: Option<IohgatpMode>) -> u8 {
    match mode {
        None | Some(IohgatpMode::Bare) => 0,
        Some(IohgatpMode::Sv32x4) => 1,
        Some(IohgatpMode::Sv39x4) => 8,
        Some(IohgatpMode::Sv48x4) => 9,
        Some(IohgatpMode::Sv57x4) => 10,
    }
}

fn read_u64(bytes: &[u8], big_endian: bool) -> u64 {
    let chunk: [u8; 8] = bytes.try_into().unwrap();
    if big_endian {
        u64::from_be_bytes(chunk)
    } else {
        u64::from_le_bytes(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddi0_base_is_low_seven_bits() {
        let id = 0b0000001u32;
        assert_eq!(ddi(id, false, 0), 0b0000001);
    }

    #[test]
    fn ddi_total_width_matches_base_three_level_sum() {
        assert_eq!(ddi_total_width(false, 3), 24);
        assert_eq!(ddi_total_width(true, 3), 24);
    }

    #[test]
    fn pdi0_is_low_eight_bits() {
        let pid = 0xAB;
        assert_eq!(pdi(pid, 0), 0xAB);
        assert_eq!(pdi(pid, 1), 0);
    }
}
