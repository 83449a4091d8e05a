/*!
resource/chanend.rs - channel endpoint: a 9-bit token FIFO (spec §3 "Channel endpoint
(Chanend)", §4.4 "Channel end").

Tokens are 8 data bits plus a control bit; `CT_END`/`CT_PAUSE` are the two control values
used to delimit packets. `out`/`outct` enqueue into the *destination's* buffer (resolved
lazily via `crate::routing`); if that buffer is full the writer is queued on
`blocked_writers` and described; `in`/`int`/`inct`/`chkct` drain this endpoint's own
buffer.
*/

use std::collections::VecDeque;

use crate::resource::{EventableBase, OpResult, ResourceId};
use crate::scheduler::RunnableId;

pub const CT_END: u8 = 0x01;
pub const CT_PAUSE: u8 = 0x02;

/// A single 9-bit channel token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub data: u8,
    pub control: bool,
}

impl Token {
    pub fn data(data: u8) -> Self {
        Token {
            data,
            control: false,
        }
    }
    pub fn control(code: u8) -> Self {
        Token {
            data: code,
            control: true,
        }
    }
}

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Chanend {
    pub base: EventableBase,
    /// Destination endpoint, once resolved by `crate::routing`.
    pub dest: Option<ResourceId>,
    queue: VecDeque<Token>,
    capacity: usize,
    blocked_writers: VecDeque<RunnableId>,
}

impl Chanend {
    pub fn new(id: ResourceId) -> Self {
        Self {
            base: EventableBase::new(id),
            dest: None,
            queue: VecDeque::new(),
            capacity: DEFAULT_CAPACITY,
            blocked_writers: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Deliver a token into *this* endpoint's buffer (called on the destination
    /// chanend by the routing layer on behalf of a remote `out`/`outct`).
    pub fn deliver(&mut self, tok: Token, writer: RunnableId) -> OpResult {
        if self.queue.len() >= self.capacity {
            self.blocked_writers.push_back(writer);
            OpResult::Deschedule
        } else {
            self.queue.push_back(tok);
            OpResult::Continue
        }
    }

    /// A blocked writer to retry now that a slot has freed, if any.
    pub fn take_blocked_writer(&mut self) -> Option<RunnableId> {
        if self.queue.len() < self.capacity {
            self.blocked_writers.pop_front()
        } else {
            None
        }
    }

    /// `in`/`int`: pop the next token, verifying it's a data token.
    pub fn take_data(&mut self) -> Result<Option<u8>, ()> {
        match self.queue.front() {
            None => Ok(None),
            Some(tok) if !tok.control => {
                let tok = self.queue.pop_front().unwrap();
                Ok(Some(tok.data))
            }
            Some(_) => Err(()),
        }
    }

    /// `inct`: pop the next token, verifying it's a control token.
    pub fn take_control(&mut self) -> Result<Option<u8>, ()> {
        match self.queue.front() {
            None => Ok(None),
            Some(tok) if tok.control => {
                let tok = self.queue.pop_front().unwrap();
                Ok(Some(tok.data))
            }
            Some(_) => Err(()),
        }
    }

    /// `chkct`: verify (and consume) the next token is the control token `expected`.
    pub fn check_control(&mut self, expected: u8) -> OpResult {
        match self.queue.front() {
            None => OpResult::Deschedule,
            Some(tok) if tok.control && tok.data == expected => {
                self.queue.pop_front();
                OpResult::Continue
            }
            Some(_) => OpResult::Illegal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    fn chanend() -> Chanend {
        Chanend::new(ResourceId::new(ResourceType::Chanend, 0, 0))
    }

    fn writer() -> RunnableId {
        RunnableId::Thread {
            node: 0,
            core: 0,
            thread: 0,
        }
    }

    #[test]
    fn data_then_control_round_trip() {
        let mut c = chanend();
        c.deliver(Token::data(0x01), writer());
        c.deliver(Token::data(0x02), writer());
        c.deliver(Token::control(CT_END), writer());
        assert_eq!(c.take_data(), Ok(Some(0x01)));
        assert_eq!(c.take_data(), Ok(Some(0x02)));
        assert_eq!(c.take_control(), Ok(Some(CT_END)));
        assert_eq!(c.take_control(), Ok(None));
    }

    #[test]
    fn take_data_on_control_token_is_illegal() {
        let mut c = chanend();
        c.deliver(Token::control(CT_PAUSE), writer());
        assert_eq!(c.take_data(), Err(()));
    }

    #[test]
    fn check_control_matches_and_consumes() {
        let mut c = chanend();
        c.deliver(Token::control(CT_END), writer());
        assert_eq!(c.check_control(CT_END), OpResult::Continue);
        assert_eq!(c.check_control(CT_END), OpResult::Deschedule); // now empty
    }

    #[test]
    fn check_control_mismatch_is_illegal() {
        let mut c = chanend();
        c.deliver(Token::control(CT_PAUSE), writer());
        assert_eq!(c.check_control(CT_END), OpResult::Illegal);
    }

    #[test]
    fn full_buffer_blocks_writer() {
        let mut c = chanend();
        c.capacity = 1;
        assert_eq!(c.deliver(Token::data(1), writer()), OpResult::Continue);
        assert_eq!(c.deliver(Token::data(2), writer()), OpResult::Deschedule);
        assert!(c.take_blocked_writer().is_none()); // still full
        c.take_data().unwrap();
        assert_eq!(c.take_blocked_writer(), Some(writer()));
    }
}
