//! Fault cause numbers and the 32-byte fault record. Kept as a plain
//! numeric newtype rather than a full enum: the architecture defines
//! these as wire values written into
//! guest memory, and gaps in the numbering (e.g. no cause 2-4, 6, 8-11) mean
//! an exhaustive enum would need as many "reserved" placeholders as real
//! variants, for no benefit over validating at the one place a cause is
//! constructed.

use thiserror::Error;

/// A named constructor per §7 cause, used throughout the translation and
/// queue-writer code instead of bare integer literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cause(pub u16);

impl Cause {
    pub const INSTRUCTION_ACCESS_FAULT: Cause = Cause(1);
    pub const LOAD_ACCESS_FAULT: Cause = Cause(5);
    pub const STORE_ACCESS_FAULT: Cause = Cause(7);
    pub const INSTRUCTION_PAGE_FAULT: Cause = Cause(12);
    pub const LOAD_PAGE_FAULT: Cause = Cause(13);
    pub const STORE_PAGE_FAULT: Cause = Cause(15);
    pub const INSTRUCTION_GUEST_PAGE_FAULT: Cause = Cause(20);
    pub const LOAD_GUEST_PAGE_FAULT: Cause = Cause(21);
    pub const STORE_GUEST_PAGE_FAULT: Cause = Cause(23);
    pub const ALL_INBOUND_DISALLOWED: Cause = Cause(256);
    pub const DDT_ENTRY_LOAD_ACCESS_FAULT: Cause = Cause(257);
    pub const DDT_ENTRY_NOT_VALID: Cause = Cause(258);
    pub const DDT_ENTRY_MISCONFIGURED: Cause = Cause(259);
    pub const TRANSACTION_TYPE_DISALLOWED: Cause = Cause(260);
    pub const MSI_PTE_LOAD_ACCESS_FAULT: Cause = Cause(261);
    pub const MSI_PTE_NOT_VALID: Cause = Cause(262);
    pub const MSI_PTE_MISCONFIGURED: Cause = Cause(263);
    pub const PDT_ENTRY_LOAD_ACCESS_FAULT: Cause = Cause(265);
    pub const PDT_ENTRY_NOT_VALID: Cause = Cause(266);
    pub const PDT_ENTRY_MISCONFIGURED: Cause = Cause(267);
    pub const DDT_DATA_CORRUPTION: Cause = Cause(268);
    pub const PDT_DATA_CORRUPTION: Cause = Cause(269);
    pub const MSI_PT_DATA_CORRUPTION: Cause = Cause(270);
    pub const FAULT_QUEUE_MSI_STORE_FAILURE: Cause = Cause(273);
    pub const PAGE_TABLE_DATA_CORRUPTION: Cause = Cause(274);

    pub fn is_guest_page_fault(self) -> bool {
        matches!(self.0, 20 | 21 | 23)
    }
}

/// A failed translation step: a cause plus enough context to decide whether
/// it must be written to the fault queue (`dtf`-gated by the caller) and,
/// for guest-page faults, to fill in `iotval2`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("iommu translation fault: cause={cause:?} iova={iova:#x}")]
pub struct TranslateFault {
    pub cause: Cause,
    pub iova: u64,
    pub iotval2: u64,
}

impl TranslateFault {
    pub fn new(cause: Cause, iova: u64) -> Self {
        TranslateFault {
            cause,
            iova,
            iotval2: 0,
        }
    }

    pub fn with_iotval2(mut self, iotval2: u64) -> Self {
        self.iotval2 = iotval2;
        self
    }
}

/// Transaction type, used both by the translation engine's entry point and
/// by the fault record it produces on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    UntranslatedRead,
    UntranslatedWrite,
    UntranslatedExec,
    TranslatedRead,
    TranslatedWrite,
    TranslatedExec,
    PcieAts,
    PcieMessage,
}

impl TransactionType {
    pub fn is_translated(self) -> bool {
        matches!(
            self,
            TransactionType::TranslatedRead
                | TransactionType::TranslatedWrite
                | TransactionType::TranslatedExec
        )
    }

    pub fn is_ats(self) -> bool {
        matches!(self, TransactionType::PcieAts)
    }

    /// Wire encoding used by `FaultRecord::ttype` (6 bits).
    pub fn wire_value(self) -> u8 {
        match self {
            TransactionType::UntranslatedRead => 0,
            TransactionType::UntranslatedWrite => 1,
            TransactionType::UntranslatedExec => 2,
            TransactionType::TranslatedRead => 3,
            TransactionType::TranslatedWrite => 4,
            TransactionType::TranslatedExec => 5,
            TransactionType::PcieAts => 6,
            TransactionType::PcieMessage => 7,
        }
    }
}

/// The 32-byte record appended to the fault queue ().
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultRecord {
    pub cause: u16,
    pub pid: u32,
    pub pv: bool,
    pub priv_mode: bool,
    pub ttype: TransactionType,
    pub device_id: u32,
    pub iotval: u64,
    pub iotval2: u64,
}

impl FaultRecord {
    pub fn to_bytes(self, big_endian: bool) -> [u8; 32] {
        let mut word0: u64 = 0;
        word0 |= self.cause as u64 & 0xfff;
        word0 |= ((self.pid as u64) & 0xfffff) << 12;
        word0 |= (self.pv as u64) << 32;
        word0 |= (self.priv_mode as u64) << 33;
        word0 |= (self.ttype.wire_value() as u64 & 0x3f) << 34;
        word0 |= ((self.device_id as u64) & 0xff_ffff) << 40;

        let mut out = [0u8; 32];
        write_u64(&mut out[0..8], word0, big_endian);
        write_u64(&mut out[8..16], self.iotval, big_endian);
        write_u64(&mut out[16..24], self.iotval2, big_endian);
        // bytes 24..32 reserved, left zero.
        out
    }
}

fn write_u64(dst: &mut [u8], value: u64, big_endian: bool) {
    if big_endian {
        dst.copy_from_slice(&value.to_be_bytes());
    } else {
        dst.copy_from_slice(&value.to_le_bytes());
    }
}
