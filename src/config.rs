//! `EngineConfig` - ambient tunables layer.
//!
//! No file format is parsed here (XML-driven configuration is explicitly out of scope);
//! this struct is the seam an external loader would populate. Defaults match the
//! reference constants named throughout spec §3-§4.

use crate::time::{CYCLES_PER_TICK, INSTRUCTION_CYCLES, Ticks};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub cycles_per_tick: Ticks,
    pub instruction_cycles: Ticks,
    /// Execution-frequency threshold past which a decode-cache slot is routed through
    /// the JIT manager instead of the interpreter (spec §4.3).
    pub hotness_threshold: u32,
    /// Hardware threads per tile.
    pub num_threads_per_core: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycles_per_tick: CYCLES_PER_TICK,
            instruction_cycles: INSTRUCTION_CYCLES,
            hotness_threshold: 128,
            num_threads_per_core: 8,
        }
    }
}
