/*!
resource/port.rs - data/ready/clock port state machine (spec §3 "Port", §4.4 "Port
dispatch").

A port is independent of the decode cache; it is driven purely by its clock block's
edges. `update` walks the clock signal's edge iterator from the port's last-processed
time up to the target time and, for each edge, performs the sampling (rising, for
inputs) or driving (falling, for outputs) half-cycle described in spec §4.4. `portCounter`
increments on every falling edge while the clock is running and the port is an in-use
data port, independent of whether the shift/transfer handshake actually completes that
cycle (spec §8 "Port counter").
*/

use crate::resource::{EventableBase, ResourceId};
use crate::scheduler::RunnableId;
use crate::signal::{EdgeKind, Signal};
use crate::time::Ticks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Full,
    After,
    Eq,
    Neq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Data,
    Ready,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyMode {
    NoReady,
    Strobed,
    Handshake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterSlave {
    Master,
    Slave,
}

/// What a port edge produced: who (if anyone) should be rescheduled, and whether an
/// event/interrupt should be taken by the owning thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortWake {
    pub wake_in: Option<RunnableId>,
    pub wake_out: Option<RunnableId>,
    pub wake_sync: Option<RunnableId>,
    pub fire_event: bool,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub base: EventableBase,
    pub width: u8,
    pub data: u32,
    pub condition: Condition,
    pub transfer_reg: Option<u32>,
    pub shift_reg: u32,
    pub valid_shift_entries: u8,
    pub shift_reg_entries: u8,
    pub time_reg: Option<u16>,
    pub port_counter: u16,
    pub ready_out_ports: Vec<ResourceId>,
    pub paused_out: Option<RunnableId>,
    pub paused_in: Option<RunnableId>,
    pub paused_sync: Option<RunnableId>,
    pub direction: Direction,
    pub port_type: PortKind,
    pub master_slave: MasterSlave,
    pub ready_mode: ReadyMode,
    pub buffered: bool,
    pub transfer_width: u8,
    pub sampling_edge: EdgeKind,
    pub inverted: bool,
    pub clock: Option<ResourceId>,
    last_update: Ticks,
}

impl Port {
    pub fn new(id: ResourceId, width: u8) -> Self {
        Self {
            base: EventableBase::new(id),
            width,
            data: 0,
            condition: Condition::Full,
            transfer_reg: None,
            shift_reg: 0,
            valid_shift_entries: 0,
            shift_reg_entries: width.max(1),
            time_reg: None,
            port_counter: 0,
            ready_out_ports: Vec::new(),
            paused_out: None,
            paused_in: None,
            paused_sync: None,
            direction: Direction::Input,
            port_type: PortKind::Data,
            master_slave: MasterSlave::Master,
            ready_mode: ReadyMode::NoReady,
            buffered: false,
            transfer_width: width,
            sampling_edge: EdgeKind::Rising,
            inverted: false,
            clock: None,
            last_update: 0,
        }
    }

    fn condition_met(&self, value: u32) -> bool {
        match self.condition {
            Condition::Full => true,
            Condition::After => self.time_reg.is_none(),
            Condition::Eq => value == self.data,
            Condition::Neq => value != self.data,
        }
    }

    /// Rising-edge (sampling) half of the protocol: input ports shift a new sample in.
    fn on_sample_edge(&mut self, pin_value: u32) -> PortWake {
        let mut wake = PortWake::default();
        if self.direction != Direction::Input || self.port_type != PortKind::Data || !self.base.in_use {
            return wake;
        }
        let bit = if self.inverted { pin_value ^ 1 } else { pin_value } & 1;
        self.shift_reg = (self.shift_reg << 1) | bit;
        self.valid_shift_entries = self.valid_shift_entries.saturating_add(1);
        if self.valid_shift_entries >= self.shift_reg_entries && self.condition_met(self.shift_reg) {
            self.transfer_reg = Some(self.shift_reg);
            if self.buffered {
                self.condition = Condition::Full;
            }
            self.valid_shift_entries = 0;
            if let Some(t) = self.paused_in.take() {
                wake.wake_in = Some(t);
            }
            wake.fire_event = true;
        }
        wake
    }

    /// Falling-edge (driving) half: `portCounter` always advances for an in-use data
    /// port while the clock runs; output ports additionally retire the shift register.
    fn on_drive_edge(&mut self) -> PortWake {
        let mut wake = PortWake::default();
        if self.port_type == PortKind::Data && self.base.in_use {
            self.port_counter = self.port_counter.wrapping_add(1);
        }
        if self.direction != Direction::Output || self.port_type != PortKind::Data || !self.base.in_use {
            return wake;
        }
        let time_matches = match self.time_reg {
            Some(t) => t == self.port_counter,
            None => true,
        };
        if time_matches && self.valid_shift_entries > 0 {
            self.valid_shift_entries -= 1;
            if self.valid_shift_entries == 0 {
                if let Some(next) = self.transfer_reg.take() {
                    self.shift_reg = next;
                    self.valid_shift_entries = self.shift_reg_entries;
                }
                if let Some(t) = self.paused_out.take() {
                    wake.wake_out = Some(t);
                }
                if let Some(t) = self.paused_sync.take() {
                    wake.wake_sync = Some(t);
                }
                wake.fire_event = true;
            }
        }
        wake
    }

    /// Advance this port from its last-processed time up to (and including) `t`,
    /// driven by `clock_signal` (the attached clock block's current `Signal`).
    /// `pin_at` supplies the raw upstream pin value for a given tick (inputs only).
    pub fn update(&mut self, clock_signal: &Signal, t: Ticks, pin_at: impl Fn(Ticks) -> u32) -> Vec<PortWake> {
        let mut events = Vec::new();
        if !clock_signal.is_clock() {
            return events;
        }
        let mut iter = clock_signal.edges_after(self.last_update);
        while iter.time() <= t {
            let edge = iter.edge();
            let wake = match edge.kind {
                EdgeKind::Rising => self.on_sample_edge(pin_at(edge.time)),
                EdgeKind::Falling => self.on_drive_edge(),
            };
            if wake != PortWake::default() {
                events.push(wake);
            }
            self.last_update = edge.time;
            iter.advance();
        }
        events
    }
}
