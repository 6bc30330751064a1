//! Command-line front end over the library: decode a single instruction
//! word, or run a scripted walk through the IOMMU translation/command
//! path against an in-memory platform model. Grounded on
//! `src/bin/emulate.rs`'s `clap::Parser` + `clap_num::maybe_hex` shape.

use clap::{Parser, Subcommand};
use clap_num::maybe_hex;
use rv_iommu_sim::decode::decode;
use rv_iommu_sim::iommu::callbacks::{
    AtsInvalPayload, InterruptSignal, MemoryAccess, PrgrPayload, StageResult, StageTranslate,
};
use rv_iommu_sim::iommu::csr::IommuCapabilities;
use rv_iommu_sim::iommu::fault::{TransactionType, TranslateFault};
use rv_iommu_sim::iommu::translate::{Privilege, TranslationRequest};
use rv_iommu_sim::iommu::{CsrId, Iommu};
use std::collections::HashMap;

/// Decode RISC-V instruction words, or exercise the IOMMU core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode one instruction word and print its fields
    Decode {
        /// Raw instruction word (use 0x prefix for hexadecimal)
        #[arg(value_parser=maybe_hex::<u32>)]
        word: u32,

        /// Decode as RV32 instead of RV64
        #[arg(long)]
        rv32: bool,

        /// Virtual address the word was fetched from
        #[arg(long, value_parser=maybe_hex::<u64>, default_value_t = 0)]
        vaddr: u64,
    },
    /// Run a small scripted IOMMU scenario: DDTP off, then DDTP bare,
    /// then an IOTINVAL.VMA command, printing what happens at each step
    Demo,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    match args.command {
        Cmd::Decode { word, rv32, vaddr } => decode_one(word, vaddr, !rv32),
        Cmd::Demo => run_demo(),
    }
}

fn decode_one(word: u32, vaddr: u64, xlen64: bool) {
    let d = decode(word, vaddr, vaddr, xlen64);
    println!("word:      0x{word:08x}");
    println!("size:      {} bytes", d.size);
    println!("valid:     {}", d.valid);
    if !d.valid {
        println!("-> illegal or reserved encoding");
        return;
    }
    println!("mnemonic:  {}", d.mnemonic());
    println!("format:    {:?}", d.format());
    println!("extension: {:?}", d.extension());
    println!("category:  {:?}", d.category());
    for i in 0..d.operand_count() as usize {
        println!(
            "  op{i}: 0x{:x} ({:?}, {:?})",
            d.ith_operand(i),
            d.ith_operand_type(i),
            d.effective_ith_operand_mode(i),
        );
    }
}

/// Identity-translating platform model, standing in for a real hart's
/// page-table walker and PCIe fabric: enough to drive the engine through
/// its fault/success paths without a full system.
struct DemoPlatform {
    mem: HashMap<u64, u8>,
}

impl DemoPlatform {
    fn new() -> Self {
        DemoPlatform {
            mem: HashMap::new(),
        }
    }
}

impl MemoryAccess for DemoPlatform {
    fn mem_read(&mut self, paddr: u64, buf: &mut [u8]) -> bool {
        for (i, b) in buf.iter_mut().enumerate() {
            *b = *self.mem.get(&(paddr + i as u64)).unwrap_or(&0);
        }
        true
    }

    fn mem_write(&mut self, paddr: u64, buf: &[u8]) -> bool {
        for (i, b) in buf.iter().enumerate() {
            self.mem.insert(paddr + i as u64, *b);
        }
        true
    }
}

impl StageTranslate for DemoPlatform {
    fn stage1_config(&mut self, _mode: u8, _pscid: u32, _root_ppn: u64, _sum: bool) {}
    fn stage2_config(&mut self, _mode: u8, _gscid: u32, _root_ppn: u64) {}
    fn stage1(&mut self, iova: u64, _is_write: bool, _is_exec: bool) -> Result<StageResult, TranslateFault> {
        Ok(StageResult {
            output_addr: iova,
            page_size: 4096,
        })
    }
    fn stage2(&mut self, gpa: u64, _is_write: bool, _is_exec: bool) -> Result<StageResult, TranslateFault> {
        Ok(StageResult {
            output_addr: gpa,
            page_size: 4096,
        })
    }
    fn stage2_trap_info(&self) -> u64 {
        0
    }
}

impl InterruptSignal for DemoPlatform {
    fn signal_wired_interrupt(&mut self, vector: u8, asserted: bool) {
        println!("  wired interrupt: vector {vector}, asserted {asserted}");
    }
}

impl rv_iommu_sim::iommu::callbacks::AtsEndpoint for DemoPlatform {
    fn send_inval_req(&mut self, device_id: u32, itag: u8, _payload: AtsInvalPayload) {
        println!("  ATS invalidation request sent: device {device_id}, itag {itag}");
    }
    fn send_prgr(&mut self, device_id: u32, _payload: PrgrPayload) {
        println!("  page-request-group response sent: device {device_id}");
    }
}

fn translate_read(iommu: &mut Iommu<DemoPlatform>, device_id: u32, iova: u64) {
    let req = TranslationRequest {
        device_id,
        pid: None,
        ttype: TransactionType::UntranslatedRead,
        iova,
        privilege: Privilege::User,
        is_write: false,
        is_exec: false,
    };
    match iommu.translate(req) {
        Ok(pa) => println!("  translate(device={device_id}, iova=0x{iova:x}) -> 0x{pa:x}"),
        Err(f) => println!(
            "  translate(device={device_id}, iova=0x{iova:x}) -> fault, cause={}",
            f.cause.0
        ),
    }
}

fn run_demo() {
    let mut iommu = Iommu::new(IommuCapabilities::default(), DemoPlatform::new());

    println!("step 1: ddtp left at its reset value (mode Off)");
    translate_read(&mut iommu, 1, 0x1000);
    println!("  fqt now {}", iommu.read(44, 4).unwrap_or(0));

    println!("step 2: ddtp.mode set to Bare, identity translation");
    iommu.write(16, 8, 1);
    translate_read(&mut iommu, 1, 0x2000);

    println!("step 3: enabling and draining the command queue");
    iommu.write(8, 8, 0x1f); // cqb: log2sz-1=31, base ppn 0
    iommu.write(92, 4, 1 << 16); // cqcsr.cqon
    let iotinval_vma: [u8; 16] = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    iommu.platform().mem_write(0, &iotinval_vma);
    iommu.write(20, 4, 1); // cqt = 1, drains the one queued command
    println!("  command queue drained, cqh now {}", iommu.read(16, 4).unwrap_or(0));
}
