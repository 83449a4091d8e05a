/*!
driver.rs - the external driver API: `Engine` (spec §3 "Engine", §6 "Driver API").

`Engine` is the single entry point an embedder uses: construct one from an
`EngineConfig`, hand it a boot image set, then call `run` repeatedly, each call
returning once a `StopReason` fires (a breakpoint, a watchpoint, a thread exit, the
scheduler draining, or the caller's tick budget expiring). Memory and register access
for an attached debugger go through `read_memory`/`write_memory` rather than reaching
into a `Core` directly, so the same invalidation/watchpoint bookkeeping `Core::write_word`
performs internally also applies to debugger-initiated writes.
*/

pub use crate::scheduler::StopReason;

use crate::boot::{BootSequencer, Image};
use crate::config::EngineConfig;
use crate::core_tile::{AddressOutOfRange, Core};
use crate::error::SimFault;
use crate::scheduler::{RunOutcome, RunnableId, Scheduler};
use crate::time::Ticks;

pub struct Engine {
    pub config: EngineConfig,
    pub cores: Vec<Core>,
    scheduler: Scheduler,
}

impl Engine {
    pub fn new(config: EngineConfig, cores: Vec<Core>) -> Self {
        let mut scheduler = Scheduler::new();
        for core in cores.iter() {
            for (t, thread) in core.threads.iter().enumerate() {
                if thread.running {
                    scheduler.push(
                        RunnableId::Thread {
                            node: core.node,
                            core: core.tile,
                            thread: t as u8,
                        },
                        0,
                    );
                }
            }
        }
        Self { config, cores, scheduler }
    }

    /// Load and boot a firmware image set (spec §4.7).
    pub fn boot(&mut self, images: Vec<Image>) -> Result<(), SimFault> {
        BootSequencer::standard().run(images, &mut self.cores)?;
        for core in self.cores.iter() {
            for (t, thread) in core.threads.iter().enumerate() {
                if thread.running {
                    self.scheduler.push(
                        RunnableId::Thread {
                            node: core.node,
                            core: core.tile,
                            thread: t as u8,
                        },
                        thread.time,
                    );
                }
            }
        }
        Ok(())
    }

    fn core_index(&self, node: u16, core: u8) -> Option<usize> {
        self.cores
            .iter()
            .position(|c| c.node == node && c.tile == core)
    }

    pub fn read_memory(&self, node: u16, core: u8, addr: u32) -> Result<u32, AddressOutOfRange> {
        let idx = self.core_index(node, core).ok_or(AddressOutOfRange(addr))?;
        self.cores[idx].read_word(addr)
    }

    pub fn write_memory(&mut self, node: u16, core: u8, addr: u32, value: u32) -> Result<Option<u32>, AddressOutOfRange> {
        let idx = self.core_index(node, core).ok_or(AddressOutOfRange(addr))?;
        self.cores[idx].write_word(addr, value)
    }

    pub fn add_breakpoint(&mut self, node: u16, core: u8, slot: usize) {
        if let Some(idx) = self.core_index(node, core) {
            self.cores[idx].add_breakpoint(slot);
        }
    }

    pub fn add_watchpoint(&mut self, node: u16, core: u8, addr: u32) {
        if let Some(idx) = self.core_index(node, core) {
            self.cores[idx].add_watchpoint(addr);
        }
    }

    /// Run until a `StopReason` fires or `max_ticks` elapse, whichever comes first.
    /// Driving an individual runnable's `RunOutcome` into register/resource state is
    /// `Core`'s job; here we only own the scheduler loop and stop-condition plumbing.
    pub fn run(&mut self, max_ticks: Ticks, mut step: impl FnMut(&mut Core, RunnableId, Ticks) -> RunOutcome) -> StopReason {
        loop {
            let Some((time, id)) = self.scheduler.pop() else {
                return StopReason::NoRunnableThreads {
                    time: self.scheduler.last_time(),
                };
            };
            if time > max_ticks {
                self.scheduler.push(id, time);
                return StopReason::Timeout { time };
            }
            let RunnableId::Thread { node, core, thread: _ } = id else {
                continue;
            };
            let Some(idx) = self.core_index(node, core) else {
                continue;
            };
            match step(&mut self.cores[idx], id, time) {
                RunOutcome::Continue => {
                    self.scheduler.push(id, time + self.config.instruction_cycles);
                }
                RunOutcome::Exit { status } => return StopReason::Exit { time, status },
                RunOutcome::Timeout => return StopReason::Timeout { time },
                RunOutcome::Breakpoint { thread } => return StopReason::Breakpoint { time, thread },
                RunOutcome::Watchpoint { thread } => return StopReason::Watchpoint { time, thread },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_with_no_runnables_stops_immediately() {
        let cores = vec![Core::new(0, 0, 4, 0, 1)];
        let mut engine = Engine::new(EngineConfig::default(), cores);
        let result = engine.run(1000, |_, _, _| RunOutcome::Continue);
        matches!(result, StopReason::NoRunnableThreads { .. });
    }

    #[test]
    fn engine_stops_at_timeout_budget() {
        let mut core = Core::new(0, 0, 4, 0, 1);
        core.threads[0].running = true;
        let mut engine = Engine::new(EngineConfig::default(), vec![core]);
        let result = engine.run(2, |_, _, _| RunOutcome::Continue);
        match result {
            StopReason::Timeout { .. } => {}
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[test]
    fn read_write_memory_round_trips_through_engine() {
        let cores = vec![Core::new(0, 0, 4, 0, 1)];
        let mut engine = Engine::new(EngineConfig::default(), cores);
        engine.write_memory(0, 0, 0, 0xCAFEBABE).unwrap();
        assert_eq!(engine.read_memory(0, 0, 0).unwrap(), 0xCAFEBABE);
    }
}
