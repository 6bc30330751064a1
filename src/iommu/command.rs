//! Command-queue entry parsing: `IOTINVAL.VMA`/`.GVMA`, `IOFENCE.C`,
//! `IODIR.INVAL_DDT`/`INVAL_PDT`, `ATS.INVAL`, `ATS.PRGR`. Each 16-byte
//! entry is two little/big-endian double-words (per `fctl.be`); this
//! module only unpacks them into a `Command` and checks the
//! field-combination legality the architecture requires. Draining the
//! queue and executing a parsed command is the `Iommu`'s job (it needs the
//! CSR bank, the ITAG tracker, the directory caches and the platform
//! callbacks all at once), so it lives in `iommu::mod`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationScope {
    Vma,
    Gvma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IotinvalCommand {
    pub scope: InvalidationScope,
    pub av: bool,
    pub pscid: u32,
    pub pscv: bool,
    pub gv: bool,
    pub gscid: u16,
    pub addr_ppn: u64, // address[63:12]
}

impl IotinvalCommand {
    /// PSCV must be 0 for GVMA; PSCV without AV is illegal for VMA.
    pub fn is_legal(&self) -> bool {
        if self.scope == InvalidationScope::Gvma && self.pscv {
            return false;
        }
        if self.scope == InvalidationScope::Vma && self.pscv && !self.av {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IofenceCCommand {
    pub av: bool,
    pub wsi: bool,
    pub pr: bool,
    pub pw: bool,
    pub data: u32,
    pub addr_shifted: u64, // ADDR<<2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IodirCommand {
    pub invalidate_pdt: bool,
    pub pid: u32,
    pub dv: bool,
    pub did: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtsInvalCommand {
    pub pid: u32,
    pub pv: bool,
    pub dsv: bool,
    pub rid: u16,
    pub dseg: u8,
    pub global: bool,
    pub addr_page: u64, // address[63:12]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtsPrgrCommand {
    pub pid: u32,
    pub pv: bool,
    pub dsv: bool,
    pub rid: u16,
    pub dseg: u8,
    pub prgi: u16,
    pub response_code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Iotinval(IotinvalCommand),
    IofenceC(IofenceCCommand),
    Iodir(IodirCommand),
    AtsInval(AtsInvalCommand),
    AtsPrgr(AtsPrgrCommand),
    /// Unrecognized opcode/func3 or no plausible interpretation at all.
    Illegal,
}

const OPCODE_IOTINVAL: u64 = 1;
const OPCODE_IOFENCE: u64 = 2;
const OPCODE_IODIR: u64 = 3;
const OPCODE_ATS: u64 = 4;

/// Parse a 16-byte command entry given as two little/big-endian
/// double-words, per the common header in bits 0..9 (opcode bits 0-6,
/// func3 bits 7-9) shared by every command kind.
pub fn parse(bytes: &[u8; 16], big_endian: bool) -> Command {
    let dw0 = read_u64(&bytes[0..8], big_endian);
    let dw1 = read_u64(&bytes[8..16], big_endian);
    let opcode = dw0 & 0x7f;
    let func3 = (dw0 >> 7) & 0x7;

    match opcode {
        OPCODE_IOTINVAL => {
            let scope = match func3 {
                0 => InvalidationScope::Vma,
                1 => InvalidationScope::Gvma,
                _ => return Command::Illegal,
            };
            Command::Iotinval(IotinvalCommand {
                scope,
                av: bit(dw0, 10),
                pscid: field(dw0, 12, 20) as u32,
                pscv: bit(dw0, 32),
                gv: bit(dw0, 33),
                gscid: field(dw0, 44, 16) as u16,
                addr_ppn: field128(dw0, dw1, 74, 52),
            })
        }
        OPCODE_IOFENCE if func3 == 0 => Command::IofenceC(IofenceCCommand {
            av: bit(dw0, 10),
            wsi: bit(dw0, 11),
            pr: bit(dw0, 12),
            pw: bit(dw0, 13),
            data: field(dw0, 32, 32) as u32,
            addr_shifted: field(dw1, 0, 62) << 2,
        }),
        OPCODE_IODIR => {
            let invalidate_pdt = match func3 {
                0 => false,
                1 => true,
                _ => return Command::Illegal,
            };
            Command::Iodir(IodirCommand {
                invalidate_pdt,
                pid: field(dw0, 12, 20) as u32,
                dv: bit(dw0, 33),
                did: field(dw0, 40, 24) as u32,
            })
        }
        OPCODE_ATS if func3 == 0 => Command::AtsInval(AtsInvalCommand {
            pid: field(dw0, 12, 20) as u32,
            pv: bit(dw0, 32),
            dsv: bit(dw0, 33),
            rid: field(dw0, 40, 16) as u16,
            dseg: field(dw0, 56, 8) as u8,
            global: bit(dw1, 0),
            addr_page: field(dw1, 12, 52),
        }),
        OPCODE_ATS if func3 == 1 => Command::AtsPrgr(AtsPrgrCommand {
            pid: field(dw0, 12, 20) as u32,
            pv: bit(dw0, 32),
            dsv: bit(dw0, 33),
            rid: field(dw0, 40, 16) as u16,
            dseg: field(dw0, 56, 8) as u8,
            prgi: field(dw1, 32, 9) as u16,
            response_code: field(dw1, 44, 4) as u8,
        }),
        _ => Command::Illegal,
    }
}

fn bit(word: u64, pos: u32) -> bool {
    (word >> pos) & 1 != 0
}

fn field(word: u64, pos: u32, width: u32) -> u64 {
    if width >= 64 {
        word >> pos
    } else {
        (word >> pos) & ((1u64 << width) - 1)
    }
}

/// Extract a field spanning the 128-bit `(dw1:dw0)` pair, used for the
/// IOTINVAL address which starts in `dw1` at bit position `pos-64`.
fn field128(dw0: u64, dw1: u64, pos: u32, width: u32) -> u64 {
    debug_assert!(pos >= 64, "only used for dw1-resident fields");
    field(dw1, pos - 64, width)
}

fn read_u64(bytes: &[u8], big_endian: bool) -> u64 {
    let chunk: [u8; 8] = bytes.try_into().unwrap();
    if big_endian {
        u64::from_be_bytes(chunk)
    } else {
        u64::from_le_bytes(chunk)
    }
}

use super::callbacks::{AtsInvalPayload, IommuPlatform, PrgrPayload};
use super::csr::CsrId;
use super::itag::ItagRoute;
use super::queue::EntryKind;
use super::{InterruptSource, Iommu, PendingIofence};

const CQCSR_CQMF: u64 = 1 << 8;
const CQCSR_CMD_ILL: u64 = 1 << 9;
const CQCSR_CMD_TO: u64 = 1 << 10;
const CQCSR_FENCE_W_IP: u64 = 1 << 11;
const CQCSR_CQON: u64 = 1 << 16;

/// The command engine: drains the queue from `cqh` towards `cqt`,
/// stopping at the first illegal command, memory fault, or ITAG
/// exhaustion. `IOTINVAL` here invalidates the whole
/// relevant directory cache rather than scoping precisely by
/// PSCID/GSCID/ADDR -- this model has no separate address-translation
/// cache to scope against, only the DDT/PDT software caches `IODIR`
/// targets more precisely (see DESIGN.md).
impl<P: IommuPlatform> Iommu<P> {
    pub(crate) fn process_command(&mut self) {
        loop {
            let cqcsr = self.csr.get(CsrId::Cqcsr);
            if cqcsr & CQCSR_CQON == 0 {
                return;
            }
            if cqcsr & (CQCSR_CQMF | CQCSR_CMD_ILL | CQCSR_CMD_TO) != 0 {
                return;
            }

            if let Some(pending) = self.pending_iofence {
                if self.itags.any_busy() {
                    return;
                }
                self.finish_iofence(pending);
                self.pending_iofence = None;
                continue;
            }

            let geom = self.queue_geometry(CsrId::Cqb, EntryKind::Command);
            let mask = geom.index_mask();
            let head = self.csr.get(CsrId::Cqh) & mask;
            let tail = self.csr.get(CsrId::Cqt) & mask;
            if geom.is_empty(head, tail) {
                return;
            }

            let addr = geom.entry_address(head);
            let mut buf = [0u8; 16];
            if !self.platform.mem_read(addr, &mut buf) {
                self.csr.modify(CsrId::Cqcsr, |v| v | CQCSR_CQMF);
                self.raise_interrupt(InterruptSource::Command);
                return;
            }

            let big_endian = self.csr.fctl_be();
            match parse(&buf, big_endian) {
                Command::Illegal => {
                    self.csr.modify(CsrId::Cqcsr, |v| v | CQCSR_CMD_ILL);
                    self.raise_interrupt(InterruptSource::Command);
                    return;
                }
                Command::Iotinval(c) => {
                    if !c.is_legal() {
                        self.csr.modify(CsrId::Cqcsr, |v| v | CQCSR_CMD_ILL);
                        self.raise_interrupt(InterruptSource::Command);
                        return;
                    }
                    self.execute_iotinval(c);
                }
                Command::Iodir(c) => self.execute_iodir(c),
                Command::IofenceC(c) => {
                    let pending = PendingIofence {
                        av: c.av,
                        wsi: c.wsi,
                        data: c.data,
                        addr: c.addr_shifted,
                    };
                    if self.itags.any_busy() {
                        self.pending_iofence = Some(pending);
                        self.csr.modify(CsrId::Cqh, |_| geom.advance(head));
                        continue;
                    }
                    self.finish_iofence(pending);
                }
                Command::AtsInval(c) => {
                    if !self.execute_ats_inval(c) {
                        return; // both ITAGs busy; stall without advancing cqh
                    }
                }
                Command::AtsPrgr(c) => self.execute_ats_prgr(c),
            }
            self.csr.modify(CsrId::Cqh, |_| geom.advance(head));
        }
    }

    fn finish_iofence(&mut self, p: PendingIofence) {
        if p.av {
            let bytes = p.data.to_le_bytes();
            if !self.platform.mem_write(p.addr, &bytes) {
                self.csr.modify(CsrId::Cqcsr, |v| v | CQCSR_CQMF);
                return;
            }
        }
        if p.wsi {
            self.csr.modify(CsrId::Cqcsr, |v| v | CQCSR_FENCE_W_IP);
            self.raise_interrupt(InterruptSource::Command);
        }
    }

    fn execute_iotinval(&mut self, c: IotinvalCommand) {
        match c.scope {
            InvalidationScope::Vma => self.pdt_cache.invalidate_all(),
            InvalidationScope::Gvma => self.invalidate_ddt_cache(None),
        }
    }

    fn execute_iodir(&mut self, c: IodirCommand) {
        if c.invalidate_pdt {
            match c.dv {
                true => self.invalidate_pdt_cache(c.did, Some(c.pid)),
                false => self.pdt_cache.invalidate_all(),
            }
        } else {
            self.invalidate_ddt_cache(if c.dv { Some(c.did) } else { None });
        }
    }

    /// `ATS.INVAL` is routed by RID/segment rather than device id; this
    /// model has no RID-to-device routing table, so requests are sent
    /// with `device_id = 0` (the platform is expected to resolve routing
    /// from `ItagRoute` itself).
    fn execute_ats_inval(&mut self, c: AtsInvalCommand) -> bool {
        let route = ItagRoute {
            segment_valid: c.dsv,
            segment: c.dseg,
            requester_id: c.rid,
            full_device_id: 0,
        };
        let pid = if c.pv { Some(c.pid) } else { None };
        let addr = c.addr_page << 12;
        match self.itags.allocate(route, pid, addr, c.global, InvalidationScope::Vma, 1) {
            Some(itag) => {
                self.platform.send_inval_req(
                    route.full_device_id,
                    itag,
                    AtsInvalPayload {
                        pid: pid.unwrap_or(0),
                        pv: c.pv,
                        addr,
                        size_is_global: c.global,
                    },
                );
                true
            }
            None => false,
        }
    }

    fn execute_ats_prgr(&mut self, c: AtsPrgrCommand) {
        self.platform.send_prgr(
            0,
            PrgrPayload {
                pid: c.pid,
                pv: c.pv,
                prgi: c.prgi,
                response_code: c.response_code,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_bytes(dw0: u64, dw1: u64) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..8].copy_from_slice(&dw0.to_le_bytes());
        out[8..16].copy_from_slice(&dw1.to_le_bytes());
        out
    }

    #[test]
    fn iotinval_vma_parses_pscid_and_address() {
        let dw0 = OPCODE_IOTINVAL | (1 << 10) | (0x1234 << 12) | (1 << 32);
        let dw1 = 0x10u64; // address[63:12] low bits -> ppn 0x10
        let bytes = le_bytes(dw0, dw1);
        match parse(&bytes, false) {
            Command::Iotinval(c) => {
                assert_eq!(c.scope, InvalidationScope::Vma);
                assert!(c.av);
                assert_eq!(c.pscid, 0x1234);
                assert!(c.pscv);
                assert_eq!(c.addr_ppn, 0x10);
                assert!(c.is_legal());
            }
            other => panic!("expected Iotinval, got {other:?}"),
        }
    }

    #[test]
    fn iotinval_gvma_with_pscv_is_illegal() {
        let cmd = IotinvalCommand {
            scope: InvalidationScope::Gvma,
            av: false,
            pscid: 0,
            pscv: true,
            gv: false,
            gscid: 0,
            addr_ppn: 0,
        };
        assert!(!cmd.is_legal());
    }

    #[test]
    fn iotinval_vma_pscv_without_av_is_illegal() {
        let cmd = IotinvalCommand {
            scope: InvalidationScope::Vma,
            av: false,
            pscid: 0,
            pscv: true,
            gv: false,
            gscid: 0,
            addr_ppn: 0,
        };
        assert!(!cmd.is_legal());
    }

    #[test]
    fn iofence_c_parses_data_and_shifted_address() {
        let dw0 = OPCODE_IOFENCE | (1 << 10) | (0xDEADBEEFu64 << 32);
        let dw1 = 0x2000u64 >> 2;
        let bytes = le_bytes(dw0, dw1);
        match parse(&bytes, false) {
            Command::IofenceC(c) => {
                assert!(c.av);
                assert_eq!(c.data, 0xDEADBEEF);
                assert_eq!(c.addr_shifted, 0x2000);
            }
            other => panic!("expected IofenceC, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_opcode_is_illegal() {
        let bytes = le_bytes(0x7f, 0);
        assert_eq!(parse(&bytes, false), Command::Illegal);
    }

    #[test]
    fn ats_inval_parses_routing_and_page_address() {
        let dw0 = OPCODE_ATS | (0x55 << 12) | (1 << 32) | (0xBEEFu64 << 40) | (0x7u64 << 56);
        let dw1 = 1u64 | (0x100u64 << 12);
        let bytes = le_bytes(dw0, dw1);
        match parse(&bytes, false) {
            Command::AtsInval(c) => {
                assert_eq!(c.pid, 0x55);
                assert!(c.pv);
                assert_eq!(c.rid, 0xBEEF);
                assert_eq!(c.dseg, 0x7);
                assert!(c.global);
                assert_eq!(c.addr_page, 0x100);
            }
            other => panic!("expected AtsInval, got {other:?}"),
        }
    }
}
