/*!
resource/timer.rs - hardware timer (spec §3 "Timer").

Ready when `after` is false, or when `(time / CYCLES_PER_TICK) - data` has wrapped into
positive 32-bit territory (a 32-bit signed subtract greater than zero). `after` is the
COND_AFTER / COND_FULL toggle driven by SETC.
*/

use crate::resource::EventableBase;
use crate::resource::ResourceId;
use crate::time::Ticks;

#[derive(Debug, Clone, Copy)]
pub struct Timer {
    pub base: EventableBase,
    /// true selects COND_AFTER (ready once the comparand has elapsed); false is
    /// COND_FULL (always ready).
    pub after: bool,
    pub data: u32,
}

impl Timer {
    pub fn new(id: ResourceId) -> Self {
        Self {
            base: EventableBase::new(id),
            after: false,
            data: 0,
        }
    }

    pub fn is_ready(&self, time: Ticks, cycles_per_tick: Ticks) -> bool {
        if !self.after {
            return true;
        }
        let now = (time / cycles_per_tick) as u32;
        let diff = now.wrapping_sub(self.data);
        (diff as i32) > 0
    }

    pub fn set_data(&mut self, data: u32) {
        self.data = data;
    }

    pub fn current_value(&self, time: Ticks, cycles_per_tick: Ticks) -> u32 {
        (time / cycles_per_tick) as u32
    }
}
