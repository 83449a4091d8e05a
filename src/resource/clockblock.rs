/*!
resource/clockblock.rs - clock block driving attached ports (spec §3 "ClockBlock").

`source_port = None` selects the reference clock; otherwise the block divides a
sampled port's edges. With a fixed `divide` and no external source, a running block
produces a free-running `Signal` of half-period `divide * (CYCLES_PER_TICK / 2)`.
*/

use crate::resource::ResourceId;
use crate::signal::Signal;
use crate::time::Ticks;

#[derive(Debug, Clone)]
pub struct ClockBlock {
    pub id: ResourceId,
    pub in_use: bool,
    pub source_port: Option<ResourceId>,
    pub ready_in_port: Option<ResourceId>,
    pub divide: u32,
    pub running: bool,
    pub signal: Signal,
    pub attached_ports: Vec<ResourceId>,
}

impl ClockBlock {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            in_use: false,
            source_port: None,
            ready_in_port: None,
            divide: 1,
            running: false,
            signal: Signal::constant(0),
            attached_ports: Vec::new(),
        }
    }

    /// `RUN_START` with a fixed divide and the reference clock as source.
    pub fn start(&mut self, start_time: Ticks, cycles_per_tick: Ticks) {
        self.running = true;
        let half_period = ((self.divide as Ticks) * (cycles_per_tick / 2)).max(1);
        self.signal = Signal::clock(half_period, start_time);
    }

    /// `RUN_STOP`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn attach(&mut self, port: ResourceId) {
        if !self.attached_ports.contains(&port) {
            self.attached_ports.push(port);
        }
    }

    pub fn detach(&mut self, port: ResourceId) {
        self.attached_ports.retain(|&p| p != port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    #[test]
    fn start_produces_expected_half_period() {
        let mut cb = ClockBlock::new(ResourceId::new(ResourceType::ClkBlk, 0, 0));
        cb.divide = 5;
        cb.start(0, 4);
        assert!(cb.signal.is_clock());
        assert_eq!(cb.signal.half_period(), 5 * 2);
    }

    #[test]
    fn stop_clears_running() {
        let mut cb = ClockBlock::new(ResourceId::new(ResourceType::ClkBlk, 0, 0));
        cb.start(0, 4);
        cb.stop();
        assert!(!cb.running);
    }

    #[test]
    fn attach_is_idempotent() {
        let mut cb = ClockBlock::new(ResourceId::new(ResourceType::ClkBlk, 0, 0));
        let p = ResourceId::new(ResourceType::Port, 1, 4);
        cb.attach(p);
        cb.attach(p);
        assert_eq!(cb.attached_ports.len(), 1);
    }
}
