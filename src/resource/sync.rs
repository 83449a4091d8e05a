/*!
resource/sync.rs - N-thread rendezvous & fork/join object (spec §3 "Synchroniser",
§4.4 "Synchroniser state machine").

State machine
=============
`alloc(master)`: `NumThreads=1, NumPaused=0, join=false`.
`addChild(t)`: `NumThreads += 1; NumPaused += 1` (a forked child starts paused, waiting
at the rendezvous point until the master also reaches it).
`ssync`/`msync`: if `NumPaused + 1 < NumThreads`, increment `NumPaused` and deschedule;
otherwise every other participant wakes, `NumPaused` resets to 0, and the caller
continues.
`mjoin`: behaves like `msync` from the master, but on completion frees every slave
(they report back to the caller as "kill this thread") and collapses `NumThreads` to 1.
*/

use crate::resource::{EventableBase, ResourceId};
use crate::scheduler::RunnableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    Deschedule,
    /// Rendezvous completed; wake every other participant (their PC should be bumped
    /// past the ssync/msync that parked them).
    Continue,
}

#[derive(Debug, Clone)]
pub struct Synchroniser {
    pub base: EventableBase,
    master: Option<RunnableId>,
    slaves: Vec<RunnableId>,
    num_threads: u32,
    num_paused: u32,
    join: bool,
}

impl Synchroniser {
    pub fn new(id: ResourceId) -> Self {
        Self {
            base: EventableBase::new(id),
            master: None,
            slaves: Vec::new(),
            num_threads: 0,
            num_paused: 0,
            join: false,
        }
    }

    pub fn alloc(&mut self, master: RunnableId) {
        self.master = Some(master);
        self.slaves.clear();
        self.num_threads = 1;
        self.num_paused = 0;
        self.join = false;
        self.base.in_use = true;
    }

    pub fn add_child(&mut self, slave: RunnableId) {
        self.slaves.push(slave);
        self.num_threads += 1;
        self.num_paused += 1;
    }

    /// Every participant other than `caller`: the set to reschedule once the
    /// rendezvous completes.
    fn others(&self, caller: RunnableId) -> Vec<RunnableId> {
        let mut all: Vec<RunnableId> = self.master.into_iter().chain(self.slaves.iter().copied()).collect();
        all.retain(|&id| id != caller);
        all
    }

    fn rendezvous(&mut self) -> SyncResult {
        if self.num_paused + 1 < self.num_threads {
            self.num_paused += 1;
            SyncResult::Deschedule
        } else {
            self.num_paused = 0;
            SyncResult::Continue
        }
    }

    /// `ssync`: called by a slave (or the master; the rule is symmetric).
    pub fn ssync(&mut self, caller: RunnableId) -> (SyncResult, Vec<RunnableId>) {
        let result = self.rendezvous();
        let woken = if result == SyncResult::Continue {
            self.others(caller)
        } else {
            Vec::new()
        };
        (result, woken)
    }

    /// `msync`: called by the master; same state transition as `ssync`.
    pub fn msync(&mut self, master: RunnableId) -> (SyncResult, Vec<RunnableId>) {
        self.ssync(master)
    }

    /// `mjoin`: behaves like `msync`, but on completion every slave is freed
    /// (the caller should terminate those threads) and `NumThreads` collapses to 1.
    pub fn mjoin(&mut self, master: RunnableId) -> (SyncResult, Vec<RunnableId>) {
        self.join = true;
        let (result, _) = self.rendezvous();
        match result {
            SyncResult::Deschedule => (SyncResult::Deschedule, Vec::new()),
            SyncResult::Continue => {
                let slaves = std::mem::take(&mut self.slaves);
                self.num_threads = 1;
                self.num_paused = 0;
                self.master = Some(master);
                (SyncResult::Continue, slaves)
            }
        }
    }

    pub fn is_join(&self) -> bool {
        self.join
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    fn tid(n: u8) -> RunnableId {
        RunnableId::Thread {
            node: 0,
            core: 0,
            thread: n,
        }
    }

    fn sync_with(n_slaves: u8) -> (Synchroniser, RunnableId, Vec<RunnableId>) {
        let mut s = Synchroniser::new(ResourceId::new(ResourceType::Sync, 0, 0));
        let master = tid(0);
        s.alloc(master);
        let mut slaves = Vec::new();
        for i in 1..=n_slaves {
            let slave = tid(i);
            s.add_child(slave);
            slaves.push(slave);
        }
        (s, master, slaves)
    }

    #[test]
    fn ssync_unblocks_all_once_every_participant_arrives() {
        let (mut s, master, slaves) = sync_with(2);
        // Slaves ssync first: not everyone has arrived yet.
        let (r0, w0) = s.ssync(slaves[0]);
        assert_eq!(r0, SyncResult::Deschedule);
        assert!(w0.is_empty());
        let (r1, w1) = s.ssync(slaves[1]);
        assert_eq!(r1, SyncResult::Deschedule);
        assert!(w1.is_empty());
        // Master's msync is the last arrival: everyone else wakes.
        let (r2, w2) = s.msync(master);
        assert_eq!(r2, SyncResult::Continue);
        assert_eq!(w2.len(), 2);
        assert!(w2.contains(&slaves[0]));
        assert!(w2.contains(&slaves[1]));
    }

    #[test]
    fn mjoin_frees_slaves_and_collapses_to_master_only() {
        let (mut s, master, slaves) = sync_with(2);
        s.ssync(slaves[0]);
        s.ssync(slaves[1]);
        let (result, freed) = s.mjoin(master);
        assert_eq!(result, SyncResult::Continue);
        assert_eq!(freed.len(), 2);
        assert!(s.is_join());
    }
}
