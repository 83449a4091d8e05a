/*!
core_tile.rs - a single tile's RAM/ROM, resource pools, decode cache, and
breakpoint/watchpoint bookkeeping (spec §3 "Core", §4.3, §4.4, §5 "Debugging").

A `Core` owns everything local to one tile: its threads, its flat RAM/ROM address
space, its decode cache, and one pool per hardware resource type (spec §3 lists eight
resource kinds; `Ps`/`Config` are per-core pseudo-resources handled directly by
`syscall`/`switch` rather than pooled here). Cross-tile communication (chanend routing
to a *different* node) is `crate::routing`'s job; a `Core` only resolves chanend
destinations that stay on its own node.
*/

use std::collections::HashSet;

use crate::decode_cache::DecodeCache;
use crate::error::SimFault;
use crate::resource::chanend::Chanend;
use crate::resource::clockblock::ClockBlock;
use crate::resource::lock::Lock;
use crate::resource::port::Port;
use crate::resource::sync::Synchroniser;
use crate::resource::timer::Timer;
use crate::resource::{ResourceId, ResourceType};
use crate::thread::Thread;

/// A code- or data-space byte address outside `[0, ram.len() + rom.len())`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressOutOfRange(pub u32);

pub struct Core {
    pub node: u16,
    pub tile: u8,
    pub ram: Vec<u8>,
    pub rom: Vec<u8>,
    pub cache: DecodeCache,
    pub threads: Vec<Thread>,
    pub timers: Vec<Timer>,
    pub locks: Vec<Lock>,
    pub syncs: Vec<Synchroniser>,
    pub chanends: Vec<Chanend>,
    pub clockblocks: Vec<ClockBlock>,
    pub ports: Vec<Port>,
    breakpoints: HashSet<usize>,
    /// Watched byte addresses (spec §5 "Watchpoints trigger on the store that touches
    /// the watched address, not on the instruction that issues it").
    watchpoints: HashSet<u32>,
}

impl Core {
    pub fn new(node: u16, tile: u8, ram_words: usize, rom_words: usize, num_threads: usize) -> Self {
        Self {
            node,
            tile,
            ram: vec![0u8; ram_words * 4],
            rom: vec![0u8; rom_words * 4],
            cache: DecodeCache::new(ram_words + rom_words, 0),
            threads: (0..num_threads).map(|_| Thread::new()).collect(),
            timers: Vec::new(),
            locks: Vec::new(),
            syncs: Vec::new(),
            chanends: Vec::new(),
            clockblocks: Vec::new(),
            ports: Vec::new(),
            breakpoints: HashSet::new(),
            watchpoints: HashSet::new(),
        }
    }

    fn mem_mut(&mut self, addr: u32) -> Result<(&mut [u8], usize), AddressOutOfRange> {
        let addr = addr as usize;
        if addr < self.ram.len() {
            Ok((&mut self.ram, addr))
        } else if addr < self.ram.len() + self.rom.len() {
            Err(AddressOutOfRange(addr as u32))
        } else {
            Err(AddressOutOfRange(addr as u32))
        }
    }

    pub fn read_word(&self, addr: u32) -> Result<u32, AddressOutOfRange> {
        let a = addr as usize;
        let bytes = if a + 4 <= self.ram.len() {
            &self.ram[a..a + 4]
        } else if a >= self.ram.len() && a + 4 <= self.ram.len() + self.rom.len() {
            let b = a - self.ram.len();
            &self.rom[b..b + 4]
        } else {
            return Err(AddressOutOfRange(addr));
        };
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Write a word into RAM. A store to code space invalidates the corresponding
    /// decode-cache slot (spec §4.3 "self-modifying code") and trips any matching
    /// watchpoint.
    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<Option<u32>, AddressOutOfRange> {
        let watch_hit = self.watchpoints.contains(&addr);
        let (buf, off) = self.mem_mut(addr)?;
        buf[off..off + 4].copy_from_slice(&value.to_le_bytes());
        self.cache.invalidate(addr / 4);
        Ok(if watch_hit { Some(addr) } else { None })
    }

    pub fn add_breakpoint(&mut self, slot: usize) {
        self.breakpoints.insert(slot);
    }

    pub fn remove_breakpoint(&mut self, slot: usize) {
        self.breakpoints.remove(&slot);
    }

    pub fn has_breakpoint(&self, slot: usize) -> bool {
        self.breakpoints.contains(&slot)
    }

    pub fn add_watchpoint(&mut self, addr: u32) {
        self.watchpoints.insert(addr);
    }

    pub fn remove_watchpoint(&mut self, addr: u32) {
        self.watchpoints.remove(&addr);
    }

    /// Allocate the first free slot in `pool`-shaped resource storage, or grow it.
    /// Used by `GETR` (spec §6 "GETR allocates the lowest-numbered free resource of the
    /// requested type").
    pub fn alloc_timer(&mut self) -> ResourceId {
        let num = self.timers.len() as u8;
        let id = ResourceId::new(ResourceType::Timer, num, 0);
        self.timers.push(Timer::new(id));
        id
    }

    pub fn alloc_lock(&mut self) -> ResourceId {
        let num = self.locks.len() as u8;
        let id = ResourceId::new(ResourceType::Lock, num, 0);
        self.locks.push(Lock::new());
        id
    }

    pub fn alloc_chanend(&mut self) -> ResourceId {
        let num = self.chanends.len() as u8;
        let id = ResourceId::new(ResourceType::Chanend, num, self.node);
        self.chanends.push(Chanend::new(id));
        id
    }

    pub fn jit_init_guard(&self) -> Result<(), SimFault> {
        if self.cache.slot(crate::decode_cache::FIRST_REAL_SLOT).opcode == u16::MAX {
            return Err(SimFault::JitInit("reserved opcode sentinel in first real slot".into()));
        }
        Ok(())
    }
}
