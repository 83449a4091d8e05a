/*!
jit/mod.rs - hot-trace bookkeeping and invalidation propagation (spec §4.5 "JIT
manager").

No native backend is shipped: compiling to host machine code is explicitly out of
scope (spec.md Non-goals). What lives here is everything *around* that boundary a
correct simulator still needs: deciding when a decode-cache slot has gotten hot enough
to route through `RUN_JIT` instead of the interpreter, and making sure a store into
code space that invalidates a decode-cache slot also invalidates whatever compiled
trace covered it, so a JIT implementation plugged in later can never execute stale
code.
*/

use std::collections::HashMap;

use crate::decode_cache::DecodeCache;

/// Bookkeeping for one hot trace: which decode-cache slots it covers.
#[derive(Debug, Clone, Default)]
pub struct JitFunctionInfo {
    pub entry_slot: usize,
    pub covered_slots: Vec<usize>,
    pub valid: bool,
}

#[derive(Default)]
pub struct JitManager {
    traces: HashMap<u32, JitFunctionInfo>,
    next_id: u32,
}

impl JitManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A decode-cache slot just crossed `hotness_threshold`: register a pending trace
    /// covering it (compilation itself is out of scope; only the bookkeeping exists).
    pub fn mark_hot(&mut self, entry_slot: usize, covered_slots: Vec<usize>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.traces.insert(
            id,
            JitFunctionInfo {
                entry_slot,
                covered_slots,
                valid: true,
            },
        );
        id
    }

    pub fn is_valid(&self, trace_id: u32) -> bool {
        self.traces.get(&trace_id).map(|t| t.valid).unwrap_or(false)
    }

    /// Invalidate `trace_id` directly (e.g. the decode cache already told us which one).
    pub fn invalidate(&mut self, trace_id: u32) {
        if let Some(t) = self.traces.get_mut(&trace_id) {
            t.valid = false;
        }
    }

    /// Invalidate every trace covering `slot`, independent of whether the caller already
    /// knows the trace id (used when invalidation is driven by address rather than by
    /// `DecodeCache::invalidate`'s returned trace id).
    pub fn invalidate_covering(&mut self, slot: usize) {
        for trace in self.traces.values_mut() {
            if trace.covered_slots.contains(&slot) {
                trace.valid = false;
            }
        }
    }

    pub fn trace(&self, trace_id: u32) -> Option<&JitFunctionInfo> {
        self.traces.get(&trace_id)
    }
}

/// Propagate a decode-cache invalidation (spec §4.3/§4.5 "a store into code space
/// invalidates both the decode slot and any JIT trace covering it").
pub fn propagate_invalidation(cache: &mut DecodeCache, jit: &mut JitManager, word_addr: u32) {
    if let Some(trace_id) = cache.invalidate(word_addr) {
        jit.invalidate(trace_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_hot_registers_a_valid_trace() {
        let mut jit = JitManager::new();
        let id = jit.mark_hot(4, vec![4, 5, 6]);
        assert!(jit.is_valid(id));
    }

    #[test]
    fn invalidate_covering_flags_every_matching_trace() {
        let mut jit = JitManager::new();
        let a = jit.mark_hot(4, vec![4, 5]);
        let b = jit.mark_hot(10, vec![10, 11]);
        jit.invalidate_covering(5);
        assert!(!jit.is_valid(a));
        assert!(jit.is_valid(b));
    }

    #[test]
    fn propagate_invalidation_flows_from_decode_cache_to_jit() {
        let mut cache = DecodeCache::new(4, 0);
        let mut jit = JitManager::new();
        let slot = cache.slot_for_addr(0);
        cache.install(slot, 1, [0; 4]);
        let trace = jit.mark_hot(slot, vec![slot]);
        cache.slot_mut(slot).jit_trace = Some(trace);
        propagate_invalidation(&mut cache, &mut jit, 0);
        assert!(!jit.is_valid(trace));
        assert!(!cache.is_decoded(slot));
    }
}
