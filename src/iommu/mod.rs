//! The I/O Memory Management Unit: composes the CSR bank, the PMP/PMA
//! manager, the directory caches, the ITAG tracker and a caller-supplied
//! platform (memory + stage-1/2 translation + interrupt + ATS callbacks)
//! behind synchronous entry points: no internal thread, every callback
//! completes before an entry point returns.
//!
//! Mirrors the RISC-V IOMMU architecture's own collaborator split, which
//! owns exactly this set of parts and exposes the same
//! translate/process-command/ATS-completion surface.

pub mod cache;
pub mod callbacks;
pub mod command;
pub mod csr;
pub mod device_context;
pub mod fault;
pub mod itag;
pub mod msi;
pub mod pmp;
pub mod process_context;
pub mod queue;
pub mod translate;

use cache::{DdtCache, PdtCache, DDT_CACHE_CAPACITY, PDT_CACHE_CAPACITY};
use callbacks::IommuPlatform;
use csr::{CsrBank, CsrId, IommuCapabilities, Queue as QueueKind, WriteEffect};
use device_context::DeviceContext;
use fault::FaultRecord;
use itag::ItagTracker;
use pmp::PmpManager;
use process_context::ProcessContext;
use queue::{EntryKind, QueueGeometry};

/// Command saved by an IOFENCE.C that had to stall on outstanding ATS
/// invalidations: stash the parameters and stall the command queue,
/// retry once all ITAGs are free.
#[derive(Debug, Clone, Copy)]
struct PendingIofence {
    av: bool,
    wsi: bool,
    data: u32,
    addr: u64,
}

/// Which interrupt source raised a new `ipsr` bit, used to pick the right
/// `icvec` nibble (four 4-bit vector fields, one per source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptSource {
    Command,
    Fault,
    PerfMonitor,
    PageRequest,
}

impl InterruptSource {
    fn ipsr_bit(self) -> u64 {
        match self {
            InterruptSource::Command => 1 << 0,
            InterruptSource::Fault => 1 << 1,
            InterruptSource::PerfMonitor => 1 << 2,
            InterruptSource::PageRequest => 1 << 3,
        }
    }

    fn icvec_shift(self) -> u32 {
        match self {
            InterruptSource::Command => 0,
            InterruptSource::Fault => 4,
            InterruptSource::PerfMonitor => 8,
            InterruptSource::PageRequest => 12,
        }
    }
}

pub struct Iommu<P: IommuPlatform> {
    csr: CsrBank,
    pmp: PmpManager,
    ddt_cache: DdtCache<DeviceContext>,
    pdt_cache: PdtCache<ProcessContext>,
    itags: ItagTracker,
    pending_iofence: Option<PendingIofence>,
    page_size: u64,
    platform: P,
}

impl<P: IommuPlatform> Iommu<P> {
    pub fn new(caps: IommuCapabilities, platform: P) -> Self {
        Iommu {
            csr: CsrBank::new(caps),
            pmp: PmpManager::new(64, true),
            ddt_cache: DdtCache::new(DDT_CACHE_CAPACITY),
            pdt_cache: PdtCache::new(PDT_CACHE_CAPACITY),
            itags: ItagTracker::new(),
            pending_iofence: None,
            page_size: 4096,
            platform,
        }
    }

    pub fn pmp_manager(&mut self) -> &mut PmpManager {
        &mut self.pmp
    }

    pub fn platform(&mut self) -> &mut P {
        &mut self.platform
    }

    fn big_endian(&self) -> bool {
        self.csr.fctl_be()
    }

    /// MMIO read entry point into the first 1024 bytes of the IOMMU's
    /// window. Addresses beyond that belong to the PMP manager and are
    /// not modelled as MMIO here.
    pub fn read(&self, offset: u64, size: u8) -> Option<u64> {
        self.csr.mmio_read(offset, size)
    }

    /// MMIO write entry point; drives the command engine when `cqt` is
    /// written and toggles queue/debug-translate state on the relevant
    /// control-register edges.
    pub fn write(&mut self, offset: u64, size: u8, value: u64) -> Option<()> {
        let effect = self.csr.mmio_write(offset, size, value)?;
        match effect {
            WriteEffect::CommandTailUpdated => self.process_command(),
            WriteEffect::QueueEnabled(QueueKind::Command) => {
                self.csr.modify(CsrId::Cqh, |_| 0);
                self.csr.modify(CsrId::Cqcsr, |v| v | (1 << 16)); // cqon
            }
            WriteEffect::QueueEnabled(QueueKind::Fault) => {
                self.csr.modify(CsrId::Fqh, |_| 0);
                self.csr.modify(CsrId::Fqcsr, |v| v | (1 << 16)); // fqon
            }
            WriteEffect::QueueEnabled(QueueKind::PageRequest) => {
                self.csr.modify(CsrId::Pqh, |_| 0);
                self.csr.modify(CsrId::Pqcsr, |v| v | (1 << 16)); // pqon
            }
            WriteEffect::QueueDisabled(QueueKind::Command) => {
                self.csr.modify(CsrId::Cqcsr, |v| v & !(1 << 16));
            }
            WriteEffect::QueueDisabled(QueueKind::Fault) => {
                self.csr.modify(CsrId::Fqcsr, |v| v & !(1 << 16));
            }
            WriteEffect::QueueDisabled(QueueKind::PageRequest) => {
                self.csr.modify(CsrId::Pqcsr, |v| v & !(1 << 16));
            }
            WriteEffect::DebugTranslateRequested => self.run_debug_translate(),
            WriteEffect::None => {}
        }
        Some(())
    }

    fn run_debug_translate(&mut self) {
        let iova = self.csr.get(CsrId::TrReqIova);
        let ctl = self.csr.get(CsrId::TrReqCtl);
        let pid = ((ctl >> 1) & 0xf_ffff) as u32;
        let pv = ctl & (1 << 21) != 0;
        let req = translate::TranslationRequest {
            device_id: ((ctl >> 24) & 0xff_ffff) as u32,
            pid: if pv { Some(pid) } else { None },
            ttype: fault::TransactionType::UntranslatedRead,
            iova,
            privilege: translate::Privilege::User,
            is_write: false,
            is_exec: false,
        };
        let result = self.translate(req);
        let response = match result {
            Ok(pa) => pa & !0xfff,
            Err(f) => 1 | ((f.cause.0 as u64) << 10),
        };
        self.csr.force(CsrId::TrResponse, response);
        self.csr.modify(CsrId::TrReqCtl, |v| v & !1);
    }

    fn queue_geometry(&self, base_id: CsrId, kind: EntryKind) -> QueueGeometry {
        let base = self.csr.get(base_id);
        QueueGeometry {
            base_ppn: (base >> 10) & 0x0fff_ffff_ffff,
            log2sz_minus1: (base & 0x1f) as u32,
            kind,
        }
    }

    /// Append a fault record, honoring overflow/store failure, and raise
    /// the fault-queue interrupt on success.
    fn write_fault_record(&mut self, record: FaultRecord) {
        let fqcsr = self.csr.get(CsrId::Fqcsr);
        let active = fqcsr & (1 << 16) != 0; // fqon
        let errored = fqcsr & 0b11 != 0; // fqof | fqmf
        if !active || errored {
            return;
        }
        let geom = self.queue_geometry(CsrId::Fqb, EntryKind::Fault);
        let head = self.csr.get(CsrId::Fqh) & geom.index_mask();
        let tail = self.csr.get(CsrId::Fqt) & geom.index_mask();
        if geom.is_full(head, tail) {
            self.csr.modify(CsrId::Fqcsr, |v| v | 0b01); // fqof
            self.raise_interrupt(InterruptSource::Fault);
            return;
        }
        let addr = geom.entry_address(tail);
        let bytes = record.to_bytes(self.big_endian());
        if !self.platform.mem_write(addr, &bytes) {
            self.csr.modify(CsrId::Fqcsr, |v| v | 0b10); // fqmf
            return;
        }
        self.csr.modify(CsrId::Fqt, |_| geom.advance(tail));
        self.raise_interrupt(InterruptSource::Fault);
    }

    /// Page requests require the initiating device's context to have
    /// PRI=1; failing that an immediate PRGR response is sent instead of
    /// enqueueing.
    fn write_page_request(&mut self, device_id: u32, dc: &DeviceContext, pid: Option<u32>, prgi: u16, bytes: [u8; 16]) {
        if !dc.pri() {
            self.platform.send_prgr(
                device_id,
                callbacks::PrgrPayload {
                    pid: pid.unwrap_or(0),
                    pv: pid.is_some(),
                    prgi,
                    response_code: 0, // invalid request
                },
            );
            return;
        }
        let pqcsr = self.csr.get(CsrId::Pqcsr);
        if pqcsr & (1 << 16) == 0 || pqcsr & 0b11 != 0 {
            return;
        }
        let geom = self.queue_geometry(CsrId::Pqb, EntryKind::PageRequest);
        let head = self.csr.get(CsrId::Pqh) & geom.index_mask();
        let tail = self.csr.get(CsrId::Pqt) & geom.index_mask();
        if geom.is_full(head, tail) {
            self.csr.modify(CsrId::Pqcsr, |v| v | 0b01);
            self.raise_interrupt(InterruptSource::PageRequest);
            return;
        }
        let addr = geom.entry_address(tail);
        if !self.platform.mem_write(addr, &bytes) {
            self.csr.modify(CsrId::Pqcsr, |v| v | 0b10);
            return;
        }
        self.csr.modify(CsrId::Pqt, |_| geom.advance(tail));
        self.raise_interrupt(InterruptSource::PageRequest);
    }

    /// Interrupt dispatch: set the `ipsr` bit, and, if the matching
    /// enable bit is set, notify either a wired vector or an MSI.
    fn raise_interrupt(&mut self, source: InterruptSource) {
        let bit = source.ipsr_bit();
        let ipsr_before = self.csr.get(CsrId::Ipsr);
        self.csr.modify(CsrId::Ipsr, |v| v | bit);
        if ipsr_before & bit != 0 {
            return; // already pending, no edge
        }
        let enabled = match source {
            InterruptSource::Command => self.csr.get(CsrId::Cqcsr) & (1 << 8) != 0,
            InterruptSource::Fault => self.csr.get(CsrId::Fqcsr) & (1 << 8) != 0,
            InterruptSource::PerfMonitor => self.csr.get(CsrId::IoCountInh) & (1 << 31) == 0,
            InterruptSource::PageRequest => self.csr.get(CsrId::Pqcsr) & (1 << 8) != 0,
        };
        if !enabled {
            return;
        }
        let icvec = self.csr.get(CsrId::Icvec);
        let vector = ((icvec >> source.icvec_shift()) & 0xf) as u8;
        let wsi_mode = self.csr.get(CsrId::Fctl) & 0b10 != 0;
        if wsi_mode {
            self.platform.signal_wired_interrupt(vector, true);
        } else {
            let masked = self.csr.get(CsrId::MsiVecCtl(vector)) & 1 != 0;
            if masked {
                return;
            }
            let addr = self.csr.get(CsrId::MsiAddr(vector));
            let data = self.csr.get(CsrId::MsiData(vector)) as u32;
            self.platform.mem_write(addr, &data.to_le_bytes());
        }
    }

    pub fn ats_invalidation_completion(&mut self, itag_bitmap: u32, completion_count: u8) {
        self.itags.complete(itag_bitmap, completion_count);
        if !self.itags.any_busy() {
            self.process_command();
        }
    }

    pub fn ats_invalidation_timeout(&mut self, itag_bitmap: u32) {
        self.itags.timeout(itag_bitmap);
        if !self.itags.any_busy() {
            self.process_command();
        }
    }

    pub fn invalidate_ddt_cache(&mut self, device_id: Option<u32>) {
        match device_id {
            Some(id) => self.ddt_cache.invalidate(&id),
            None => self.ddt_cache.invalidate_all(),
        }
    }

    pub fn invalidate_pdt_cache(&mut self, device_id: u32, process_id: Option<u32>) {
        match process_id {
            Some(pid) => self.pdt_cache.invalidate(&(device_id, pid)),
            None => {
                // No device-scoped "all processes" primitive beyond a full
                // flush; IODIR.INVAL_PDT always names one PID.
                self.pdt_cache.invalidate(&(device_id, 0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::callbacks::*;
    use super::fault::TranslateFault;
    use super::*;
    use std::collections::HashMap;

    /// A tiny in-memory platform model for end-to-end scenario tests.
    pub struct TestPlatform {
        pub mem: HashMap<u64, u8>,
        pub inval_reqs: Vec<(u32, u8, AtsInvalPayload)>,
        pub wired: Vec<(u8, bool)>,
    }

    impl TestPlatform {
        pub fn new() -> Self {
            TestPlatform {
                mem: HashMap::new(),
                inval_reqs: Vec::new(),
                wired: Vec::new(),
            }
        }

        pub fn write_u128(&mut self, addr: u64, bytes: &[u8]) {
            for (i, b) in bytes.iter().enumerate() {
                self.mem.insert(addr + i as u64, *b);
            }
        }
    }

    impl MemoryAccess for TestPlatform {
        fn mem_read(&mut self, paddr: u64, buf: &mut [u8]) -> bool {
            for (i, b) in buf.iter_mut().enumerate() {
                *b = *self.mem.get(&(paddr + i as u64)).unwrap_or(&0);
            }
            true
        }

        fn mem_write(&mut self, paddr: u64, buf: &[u8]) -> bool {
            self.write_u128(paddr, buf);
            true
        }
    }

    impl StageTranslate for TestPlatform {
        fn stage1_config(&mut self, _: u8, _: u32, _: u64, _: bool) {}
        fn stage2_config(&mut self, _: u8, _: u32, _: u64) {}
        fn stage1(&mut self, iova: u64, _: bool, _: bool) -> Result<StageResult, TranslateFault> {
            Ok(StageResult {
                output_addr: iova,
                page_size: 4096,
            })
        }
        fn stage2(&mut self, gpa: u64, _: bool, _: bool) -> Result<StageResult, TranslateFault> {
            Ok(StageResult {
                output_addr: gpa,
                page_size: 4096,
            })
        }
        fn stage2_trap_info(&self) -> u64 {
            0
        }
    }

    impl InterruptSignal for TestPlatform {
        fn signal_wired_interrupt(&mut self, vector: u8, asserted: bool) {
            self.wired.push((vector, asserted));
        }
    }

    impl AtsEndpoint for TestPlatform {
        fn send_inval_req(&mut self, device_id: u32, itag: u8, payload: AtsInvalPayload) {
            self.inval_reqs.push((device_id, itag, payload));
        }
        fn send_prgr(&mut self, _device_id: u32, _payload: PrgrPayload) {}
    }

    fn new_iommu() -> Iommu<TestPlatform> {
        Iommu::new(IommuCapabilities::default(), TestPlatform::new())
    }

    #[test]
    fn s4_ddtp_off_fault_256_and_one_fault_record() {
        let mut iommu = new_iommu();
        iommu.write(40, 8, 0x1f); // fqb: log2sz-1=31 -> capacity huge, base 0
        iommu.write(76, 4, 1); // fqcsr.fqie not needed; enable fqon
        let req = translate::TranslationRequest {
            device_id: 1,
            pid: None,
            ttype: fault::TransactionType::UntranslatedRead,
            iova: 0x1000,
            privilege: translate::Privilege::User,
            is_write: false,
            is_exec: false,
        };
        let result = iommu.translate(req);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().cause, fault::Cause::ALL_INBOUND_DISALLOWED);
        let fqt = iommu.csr.get(CsrId::Fqt);
        assert_eq!(fqt, 1, "one fault record should have been appended");
    }

    #[test]
    fn s5_bare_identity_translate() {
        let mut iommu = new_iommu();
        iommu.write(16, 8, 1); // ddtp.mode = Bare
        let req = translate::TranslationRequest {
            device_id: 1,
            pid: None,
            ttype: fault::TransactionType::UntranslatedRead,
            iova: 0x1000,
            privilege: translate::Privilege::User,
            is_write: false,
            is_exec: false,
        };
        let pa = iommu.translate(req).expect("bare mode must succeed");
        assert_eq!(pa, 0x1000);
        assert_eq!(iommu.csr.get(CsrId::Fqt), 0, "no fault should be written");
    }
}
