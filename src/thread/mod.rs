/*!
thread/mod.rs - per-hardware-thread register file and the exception-entry mechanism
(spec §3 "Thread", §6 "Exceptions").

Register file
==============
23 architectural registers: 12 general-purpose (`r0..r11`), `sp`/`dp`/`cp`/`lr` (stack,
data, constant, link pointers), `pc` (a decode-cache slot index, not a raw byte address -
see `decode_cache` module docs), `sr` (the status bitfield, broken out as `StatusFlags`),
and the kernel-entry shadow bank `kep`/`ksp`/`spc`/`ssr`/`ed`/`et` used only while
handling an exception.

Exception entry
================
`exception()` is the one path every `ExceptionType` in `thread::exceptions` funnels
through (spec §7 plane 1): it banks `pc`/`sr` into `spc`/`ssr`, clears the event/interrupt
enable flags (so a second exception can't recurse into the handler), and redirects `pc`
to the thread's kernel entry point `kep`. If `kep` itself is not a valid decode-cache
slot, that is not a recoverable in-band exception: it is a host-side `SimFault` (spec §7
"a hard fault - invalid KEP always stops the simulator, never retried in-band").
*/

pub mod exceptions;

use crate::decode_cache::{DecodeCache, SLOT_ILLEGAL_PC};
use crate::error::SimFault;
use crate::resource::ResourceId;
use crate::thread::exceptions::ExceptionType;
use crate::time::Ticks;

/// The status register's individual flags (spec §6 "SR bitfield").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub event_enable: bool,
    pub interrupt_enable: bool,
    pub in_kernel: bool,
    pub waiting: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Registers {
    pub r: [u32; 12],
    pub sp: u32,
    pub dp: u32,
    pub cp: u32,
    pub lr: u32,
    /// Decode-cache slot index of the next instruction (spec §4.3: "PC is an index into
    /// the decode cache, not a byte address").
    pub pc: usize,
    pub sr: StatusFlags,
    /// Kernel entry point: a decode-cache slot index, validated on every exception.
    pub kep: usize,
    pub ksp: u32,
    /// Shadow PC/SR banked on exception entry.
    pub spc: usize,
    pub ssr: StatusFlags,
    pub ed: u32,
    pub et: u32,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            r: [0; 12],
            sp: 0,
            dp: 0,
            cp: 0,
            lr: 0,
            pc: SLOT_ILLEGAL_PC,
            sr: StatusFlags::default(),
            kep: SLOT_ILLEGAL_PC,
            ksp: 0,
            spc: SLOT_ILLEGAL_PC,
            ssr: StatusFlags::default(),
            ed: 0,
            et: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Thread {
    pub regs: Registers,
    /// Local thread time, advanced by instruction/resource-operation cost (spec §4.1
    /// "each Runnable owns a monotone local time").
    pub time: Ticks,
    /// Resources with events enabled against this thread (spec §9 simplification: a
    /// plain `Vec` in place of an intrusive list, see `resource::mod` docs).
    pub event_resources: Vec<ResourceId>,
    pub interrupt_resources: Vec<ResourceId>,
    pub running: bool,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the kernel exception handler for `kind`. Banks `pc`/`sr`, disables further
    /// events/interrupts, and redirects `pc` to `kep`. `et`/`ed` record the exception
    /// type and an opaque data word (e.g. the faulting address) for the handler to read.
    ///
    /// Returns `Err(SimFault::InvalidKep)` if `kep` does not name a real decode-cache
    /// slot - per spec §7, this is unrecoverable and never retried in-band.
    pub fn exception(&mut self, cache: &DecodeCache, kind: ExceptionType, data: u32) -> Result<(), SimFault> {
        if DecodeCache::is_pseudo_slot(self.regs.kep) {
            return Err(SimFault::InvalidKep {
                addr: self.regs.kep as u32,
            });
        }
        self.regs.spc = self.regs.pc;
        self.regs.ssr = self.regs.sr;
        self.regs.sr.event_enable = false;
        self.regs.sr.interrupt_enable = false;
        self.regs.sr.in_kernel = true;
        self.regs.et = kind as u32;
        self.regs.ed = data;
        self.regs.pc = self.regs.kep;
        Ok(())
    }

    /// `kret`: return from the exception handler, restoring the banked `pc`/`sr`.
    pub fn kernel_return(&mut self) {
        self.regs.pc = self.regs.spc;
        self.regs.sr = self.regs.ssr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    fn cache_with_kep_at(idx: usize) -> (DecodeCache, usize) {
        let cache = DecodeCache::new(8, 0);
        (cache, idx)
    }

    #[test]
    fn exception_banks_pc_and_sr_then_jumps_to_kep() {
        let (cache, kep) = cache_with_kep_at(crate::decode_cache::FIRST_REAL_SLOT);
        let mut t = Thread::new();
        t.regs.kep = kep;
        t.regs.pc = kep + 1;
        t.regs.sr.event_enable = true;
        t.exception(&cache, ExceptionType::DivideByZero, 0x42).unwrap();
        assert_eq!(t.regs.pc, kep);
        assert_eq!(t.regs.spc, kep + 1);
        assert!(!t.regs.sr.event_enable);
        assert!(t.regs.sr.in_kernel);
        assert_eq!(t.regs.et, ExceptionType::DivideByZero as u32);
        assert_eq!(t.regs.ed, 0x42);
    }

    #[test]
    fn exception_with_invalid_kep_is_a_hard_fault() {
        let cache = DecodeCache::new(8, 0);
        let mut t = Thread::new();
        t.regs.kep = SLOT_ILLEGAL_PC;
        let err = t.exception(&cache, ExceptionType::IllegalInstruction, 0).unwrap_err();
        matches!(err, SimFault::InvalidKep { .. });
    }

    #[test]
    fn kernel_return_restores_banked_state() {
        let (cache, kep) = cache_with_kep_at(crate::decode_cache::FIRST_REAL_SLOT);
        let mut t = Thread::new();
        t.regs.kep = kep;
        t.regs.pc = kep + 3;
        t.regs.sr.interrupt_enable = true;
        t.exception(&cache, ExceptionType::Breakpoint, 0).unwrap();
        t.kernel_return();
        assert_eq!(t.regs.pc, kep + 3);
        assert!(t.regs.sr.interrupt_enable);
    }

    #[test]
    fn resource_event_lists_track_allocation() {
        let mut t = Thread::new();
        let r = ResourceId::new(ResourceType::Timer, 0, 0);
        t.event_resources.push(r);
        assert_eq!(t.event_resources.len(), 1);
    }
}
