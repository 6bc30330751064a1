#![forbid(unsafe_code)]

//! A RISC-V instruction decoder and an I/O Memory Management Unit (IOMMU)
//! translation/command engine, the two hardest subsystems of a RISC-V
//! system simulator. Everything else that subsystem needs — the
//! execution pipeline, the architectural memory model, a TLB, CLI and
//! config loaders — is treated as an external collaborator and is not
//! part of this crate; see `iommu::callbacks` for the seams this crate
//! expects the rest of a simulator to fill in.

pub mod decode;
pub mod fields;
pub mod iommu;
