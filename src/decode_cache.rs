/*!
decode_cache.rs - per-core PC -> decoded-instruction cache (spec §4.3 "Decode cache").

Overview
========
Every core owns one `DecodeCache`, indexed directly by (word-aligned) PC: slot `i`
holds the decoded form of the instruction at that address, an invalidation-info byte
used when a `stw`/`st16`/`st8` to code space must flush stale decodes, an
execution-frequency counter feeding the JIT's hotness threshold (spec §4.5), and the
slot's self-rewriting dispatch target (which starts out as a generic "decode, execute,
rewrite" thunk and becomes a direct "already decoded" thunk after first execution).

Four reserved pseudo-slots precede real code slots (spec §4.3 "four pseudo-slots"):
`ILLEGAL_PC` (any control-flow target outside of mapped code), `RUN_JIT` (this slot's
thread should resume inside a compiled trace), `INTERPRET_ONE` (single-step out of a
trace back into the interpreter), `ILLEGAL_PC_THREAD` (like `ILLEGAL_PC`, but raised
against a specific thread rather than the currently dispatching one, used by
cross-thread control-flow resources like `START_PC`/KEP validation). Real instructions
start at `FIRST_REAL_SLOT`.

Dispatch-loop contract
=======================
`Core::dispatch` repeatedly asks the cache for the next `DispatchAction`: `Continue`
(keep looping, the common case), `EndTrace` (a JIT trace hit a point it cannot keep
compiling past and control returns to the interpreter), `EndThreadExecution` (the
thread blocked, exited, or a breakpoint/watchpoint fired and the scheduler should pick
the next runnable).
*/

use std::collections::HashMap;

/// Reserved pseudo-slot indices (spec §4.3).
pub const SLOT_ILLEGAL_PC: usize = 0;
pub const SLOT_RUN_JIT: usize = 1;
pub const SLOT_INTERPRET_ONE: usize = 2;
pub const SLOT_ILLEGAL_PC_THREAD: usize = 3;
/// First slot index available to real decoded instructions.
pub const FIRST_REAL_SLOT: usize = 4;

/// What the dispatch loop should do after a slot's thunk returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchAction {
    Continue,
    EndTrace,
    EndThreadExecution,
}

/// A slot's self-rewriting dispatch state: it starts pointing at the generic
/// decode-then-execute thunk and is rewritten to `Decoded` the first time that
/// instruction is actually reached (spec §4.3 "self-rewriting dispatch").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Undecoded,
    Decoded,
}

/// Invalidation-info recorded for a slot: which other slot addresses might alias it
/// (instructions can straddle the word a store lands on), consulted when `stw`/`st16`/
/// `st8` targets code space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationInfo(pub u8);

impl InvalidationInfo {
    pub const CLEAN: InvalidationInfo = InvalidationInfo(0);

    pub fn is_dirty(&self) -> bool {
        self.0 != 0
    }
}

#[derive(Debug, Clone)]
pub struct DecodeSlot {
    pub opcode: u16,
    pub operands: [u32; 4],
    pub invalidation: InvalidationInfo,
    pub frequency: u32,
    pub dispatch: Dispatch,
    /// Index of the compiled JIT trace covering this slot, if one exists (spec §4.5).
    pub jit_trace: Option<u32>,
}

impl DecodeSlot {
    fn empty() -> Self {
        Self {
            opcode: 0,
            operands: [0; 4],
            invalidation: InvalidationInfo::CLEAN,
            frequency: 0,
            dispatch: Dispatch::Undecoded,
            jit_trace: None,
        }
    }
}

/// Per-core decode cache, indexed by word address (`pc / 2`, matching the 16-bit
/// instruction alignment used throughout spec.md's examples).
pub struct DecodeCache {
    slots: Vec<DecodeSlot>,
    base_word_addr: u32,
    /// Word addresses whose slot has been invalidated since last decode, tracked
    /// separately from `InvalidationInfo` so a full re-decode can be driven lazily.
    dirty: HashMap<usize, ()>,
}

impl DecodeCache {
    pub fn new(num_words: usize, base_word_addr: u32) -> Self {
        let mut slots = Vec::with_capacity(FIRST_REAL_SLOT + num_words);
        for _ in 0..FIRST_REAL_SLOT {
            slots.push(DecodeSlot::empty());
        }
        slots.resize_with(FIRST_REAL_SLOT + num_words, DecodeSlot::empty);
        Self {
            slots,
            base_word_addr,
            dirty: HashMap::new(),
        }
    }

    #[inline]
    pub fn is_pseudo_slot(idx: usize) -> bool {
        idx < FIRST_REAL_SLOT
    }

    /// Map a word-aligned code address to a slot index, or `SLOT_ILLEGAL_PC` if it
    /// falls outside this cache's mapped range.
    pub fn slot_for_addr(&self, word_addr: u32) -> usize {
        if word_addr < self.base_word_addr {
            return SLOT_ILLEGAL_PC;
        }
        let idx = FIRST_REAL_SLOT + (word_addr - self.base_word_addr) as usize;
        if idx < self.slots.len() {
            idx
        } else {
            SLOT_ILLEGAL_PC
        }
    }

    pub fn slot(&self, idx: usize) -> &DecodeSlot {
        &self.slots[idx]
    }

    pub fn slot_mut(&mut self, idx: usize) -> &mut DecodeSlot {
        &mut self.slots[idx]
    }

    /// Install a freshly decoded instruction and flip the slot's dispatch to
    /// `Decoded`, as the self-rewriting dispatch loop does on first execution.
    pub fn install(&mut self, idx: usize, opcode: u16, operands: [u32; 4]) {
        let slot = &mut self.slots[idx];
        slot.opcode = opcode;
        slot.operands = operands;
        slot.dispatch = Dispatch::Decoded;
        self.dirty.remove(&idx);
    }

    /// Bump the slot's execution-frequency counter; returns the new count so the
    /// caller can compare against `EngineConfig::hotness_threshold` (spec §4.5).
    pub fn record_execution(&mut self, idx: usize) -> u32 {
        let slot = &mut self.slots[idx];
        slot.frequency = slot.frequency.saturating_add(1);
        slot.frequency
    }

    /// A store into code space landed on `word_addr`: flush its decode and rewrite
    /// the dispatch back to the generic decode-then-execute thunk. Returns whether
    /// the slot held a JIT trace, so the caller can propagate invalidation to `jit`.
    pub fn invalidate(&mut self, word_addr: u32) -> Option<u32> {
        let idx = self.slot_for_addr(word_addr);
        if Self::is_pseudo_slot(idx) {
            return None;
        }
        let slot = &mut self.slots[idx];
        slot.dispatch = Dispatch::Undecoded;
        slot.invalidation = InvalidationInfo::CLEAN;
        slot.frequency = 0;
        self.dirty.insert(idx, ());
        slot.jit_trace.take()
    }

    pub fn is_decoded(&self, idx: usize) -> bool {
        !Self::is_pseudo_slot(idx) && self.slots[idx].dispatch == Dispatch::Decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_slots_precede_real_slots() {
        assert!(DecodeCache::is_pseudo_slot(SLOT_ILLEGAL_PC));
        assert!(DecodeCache::is_pseudo_slot(SLOT_RUN_JIT));
        assert!(DecodeCache::is_pseudo_slot(SLOT_INTERPRET_ONE));
        assert!(DecodeCache::is_pseudo_slot(SLOT_ILLEGAL_PC_THREAD));
        assert!(!DecodeCache::is_pseudo_slot(FIRST_REAL_SLOT));
    }

    #[test]
    fn addr_outside_range_maps_to_illegal_pc() {
        let cache = DecodeCache::new(4, 0x1000);
        assert_eq!(cache.slot_for_addr(0x0ff0), SLOT_ILLEGAL_PC);
        assert_eq!(cache.slot_for_addr(0x2000), SLOT_ILLEGAL_PC);
    }

    #[test]
    fn install_flips_dispatch_and_clears_dirty() {
        let mut cache = DecodeCache::new(4, 0);
        let idx = cache.slot_for_addr(1);
        assert!(!cache.is_decoded(idx));
        cache.install(idx, 0xABCD, [1, 2, 3, 4]);
        assert!(cache.is_decoded(idx));
        assert_eq!(cache.slot(idx).opcode, 0xABCD);
    }

    #[test]
    fn invalidate_resets_decoded_slot_and_returns_trace() {
        let mut cache = DecodeCache::new(4, 0);
        let idx = cache.slot_for_addr(0);
        cache.install(idx, 1, [0; 4]);
        cache.slot_mut(idx).jit_trace = Some(7);
        let trace = cache.invalidate(0);
        assert_eq!(trace, Some(7));
        assert!(!cache.is_decoded(idx));
        assert_eq!(cache.slot(idx).frequency, 0);
    }

    #[test]
    fn invalidate_on_pseudo_slot_is_a_no_op() {
        let mut cache = DecodeCache::new(4, 0x1000);
        assert_eq!(cache.invalidate(0), None);
    }

    #[test]
    fn execution_frequency_accumulates() {
        let mut cache = DecodeCache::new(2, 0);
        let idx = cache.slot_for_addr(0);
        assert_eq!(cache.record_execution(idx), 1);
        assert_eq!(cache.record_execution(idx), 2);
    }
}
