#![doc = r#"
tilesim library crate.

This crate is the core execution engine for a cycle-accurate simulator of a
multi-threaded tile whose hardware-managed resources (ports, timers, channel
ends, synchronisers, locks, clock blocks) are first-class operands of the
instruction set. It owns the discrete-event scheduler, the per-thread
interpreter and decode cache, the resource state machines, inter-tile
message routing, the JIT bookkeeping (hotness tracking + invalidation; no
native backend is shipped, see `jit` module docs), and the boot sequencer.

Modules:
- time: tick/cycle constants and the monotone `Ticks` counter
- signal: constant/clock 1-bit `Signal` and its `EdgeIterator`
- scheduler: `Runnable`, priority queue, `StopReason`
- resource: per-type hardware resource state machines + the eventable base
- decode_cache: PC -> (opcode, operands, invalidation, frequency) map
- isa: opcode table, operand encodings, per-category instruction semantics
- thread: register file, status bits, dispatch loop
- core_tile: a tile's RAM/ROM, resource pools, decode cache, breakpoints
- node: XLink topology and node-local routing
- switch: per-node SSwitch configuration register file
- routing: chanend-id -> endpoint resolution across the fabric
- jit: hot-trace bookkeeping and invalidation propagation
- boot: `BootSequencer` and its ordered steps
- elf: minimal ELF32 loader (PT_LOAD segments only)
- syscall: host syscall ABI dispatch (§6)
- tracer: optional per-instruction trace + symbol annotation
- driver: the external driver API (`Engine`, memory/register access, `run`)
- error: `SimFault`, the "simulator fault" error plane (§7)
- config: `EngineConfig`, the ambient tunables layer
"#]

pub mod boot;
pub mod config;
pub mod core_tile;
pub mod decode_cache;
pub mod driver;
pub mod elf;
pub mod error;
pub mod isa;
pub mod jit;
pub mod node;
pub mod resource;
pub mod routing;
pub mod scheduler;
pub mod signal;
pub mod switch;
pub mod syscall;
pub mod thread;
pub mod time;
pub mod tracer;

pub use config::EngineConfig;
pub use driver::{Engine, StopReason};
pub use error::SimFault;
pub use time::Ticks;
