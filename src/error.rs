//! `SimFault` - the "simulator fault" error plane (spec §7, plane 2).
//!
//! These never arise from simulated firmware; they mean the host-side setup was
//! invalid (a malformed image, an impossible configuration, a JIT init failure) and the
//! simulator cannot continue. Contrast with `ExceptionType` (`crate::thread::exceptions`),
//! the in-band plane that firmware itself can trigger and recover from via the kernel
//! entry vector.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimFault {
    #[error("bad XE image: {0}")]
    BadXe(String),

    #[error("bad ELF image: {0}")]
    BadElf(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("JIT initialisation failed: {0}")]
    JitInit(String),

    #[error("hard fault: KEP vector {addr:#x} is not a valid RAM/ROM address")]
    InvalidKep { addr: u32 },
}
