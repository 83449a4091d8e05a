//! Tick/cycle constants and the monotone simulator clock (spec §3 "Time").

/// Monotone, non-negative scheduler tick counter.
pub type Ticks = u64;

/// Scheduler ticks per simulated processor cycle. Must be even and >= 2; the reference
/// value keeps a rising/falling edge pair representable within one cycle.
pub const CYCLES_PER_TICK: Ticks = 4;

/// Ticks a normal instruction advances its executing thread's time by.
pub const INSTRUCTION_CYCLES: Ticks = 4;

/// DIV/REM family cost roughly 32 cycles on real hardware; cheaper than a full
/// per-bit simulation but still visibly more expensive than a normal instruction.
pub const DIVIDE_CYCLES: Ticks = 32 * INSTRUCTION_CYCLES;

/// Long-latency pseudo-fnops (retsp/blat/blacp) cost one extra fnop's worth of time.
pub const FNOP_CYCLES: Ticks = INSTRUCTION_CYCLES;

/// Convert a cycle count to ticks.
#[inline]
pub const fn cycles_to_ticks(cycles: u64) -> Ticks {
    cycles * CYCLES_PER_TICK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_per_tick_is_even_and_at_least_two() {
        assert!(CYCLES_PER_TICK >= 2);
        assert_eq!(CYCLES_PER_TICK % 2, 0);
    }

    #[test]
    fn cycles_to_ticks_scales_linearly() {
        assert_eq!(cycles_to_ticks(0), 0);
        assert_eq!(cycles_to_ticks(1), CYCLES_PER_TICK);
        assert_eq!(cycles_to_ticks(10), 10 * CYCLES_PER_TICK);
    }
}
