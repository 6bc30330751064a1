//! The IOMMU's external boundary: everything it needs from the platform it
//! sits inside (guest/host memory, the two translation stages it delegates
//! to, and the two ways it can signal the outside world), expressed as
//! traits rather than free functions or callback-function pointers.
//!
//! A single `Iommu` is generic over one implementor of each trait (or one
//! combined implementor of all of them) so that tests can supply a plain
//! `Vec<u8>`-backed model without pulling in a real Hart.

use crate::iommu::fault::TranslateFault;

/// Physical-memory access, addressed in host physical address space.
/// The IOMMU itself never holds memory, it only walks structures that
/// live in it.
pub trait MemoryAccess {
    /// Reads `buf.len()` bytes starting at `paddr`. Returns `false` on a
    /// physical access the callback considers out of range (translated by
    /// the caller into a data-corruption fault).
    fn mem_read(&mut self, paddr: u64, buf: &mut [u8]) -> bool;

    /// Writes `buf` starting at `paddr`. Same failure convention as
    /// `mem_read`.
    fn mem_write(&mut self, paddr: u64, buf: &[u8]) -> bool;
}

/// Outcome of delegating a single stage of translation to the platform's
/// page-table walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageResult {
    pub output_addr: u64,
    /// Page size of the translation, used to round `output_addr` down and to
    /// compute the low-bits pass-through for the next stage.
    pub page_size: u64,
}

/// First/second-stage address translation, delegated rather than
/// reimplemented: the IOMMU configures the walker (satp/hgatp-equivalent
/// roots) and asks it to translate one address.
pub trait StageTranslate {
    fn stage1_config(&mut self, iosatp_mode: u8, pscid: u32, root_ppn: u64, sum: bool);
    fn stage2_config(&mut self, iohgatp_mode: u8, gscid: u32, root_ppn: u64);

    /// Translate `iova` through stage 1 (process-scoped) for the access kind
    /// described by `is_write`/`is_exec`.
    fn stage1(&mut self, iova: u64, is_write: bool, is_exec: bool) -> Result<StageResult, TranslateFault>;

    /// Translate a guest physical address through stage 2 (VM-scoped).
    fn stage2(&mut self, gpa: u64, is_write: bool, is_exec: bool) -> Result<StageResult, TranslateFault>;

    /// Extra detail attached to a stage-2 fault so the caller can fill in
    /// `iotval2`'s guest-page-fault encoding.
    fn stage2_trap_info(&self) -> u64;
}

/// Interrupt delivery: either a platform-level wired line (selected by
/// `icvec`) or an MSI write through `mem_write` performed by the caller
/// directly. Kept as its own trait since it is the one callback with no
/// associated data payload.
pub trait InterruptSignal {
    fn signal_wired_interrupt(&mut self, vector: u8, asserted: bool);
}

/// ATS (Address Translation Service) session with a connected endpoint:
/// invalidation requests the IOMMU originates, and page-request-group
/// responses it sends back. Both are fire-and-forget from the IOMMU's point
/// of view; completion/timeout arrive later through
/// `Iommu::ats_invalidation_completion`/`ats_invalidation_timeout`.
pub trait AtsEndpoint {
    fn send_inval_req(&mut self, device_id: u32, itag: u8, payload: AtsInvalPayload);
    fn send_prgr(&mut self, device_id: u32, payload: PrgrPayload);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtsInvalPayload {
    pub pid: u32,
    pub pv: bool,
    pub addr: u64,
    pub size_is_global: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrgrPayload {
    pub pid: u32,
    pub pv: bool,
    pub prgi: u16,
    pub response_code: u8,
}

/// Convenience umbrella implemented once by any platform model that
/// provides all five callback groups; `Iommu` is generic over this bound
/// alone rather than five separate type parameters.
pub trait IommuPlatform: MemoryAccess + StageTranslate + InterruptSignal + AtsEndpoint {}

impl<T> IommuPlatform for T where T: MemoryAccess + StageTranslate + InterruptSignal + AtsEndpoint {}
