//! tracer.rs - symbol table + optional per-instruction trace (spec.md's expanded scope;
//! grounded on `SymbolInfo`-style address->name lookup from the original source).
//!
//! Symbolication is ordinary bookkeeping: a sorted table of `(address, name)` pairs,
//! looked up by the address of the innermost symbol at or below a given PC (the usual
//! "which function contains this address" query). The `Tracer` itself is a thin sink
//! trait so a driver can plug in whatever destination it wants (stdout, a file, nothing)
//! without this module caring; `log`'s `trace!` level is used for the always-on path
//! when no explicit tracer is attached, behind the `trace-log` feature so it costs
//! nothing in a release build that doesn't ask for it.

pub struct SymbolTable {
    /// Sorted ascending by address.
    symbols: Vec<(u32, String)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { symbols: Vec::new() }
    }

    pub fn insert(&mut self, addr: u32, name: String) {
        match self.symbols.binary_search_by_key(&addr, |&(a, _)| a) {
            Ok(i) => self.symbols[i].1 = name,
            Err(i) => self.symbols.insert(i, (addr, name)),
        }
    }

    /// The innermost symbol at or below `addr`, i.e. the function `addr` is presumed to
    /// be executing inside.
    pub fn lookup(&self, addr: u32) -> Option<&str> {
        match self.symbols.binary_search_by_key(&addr, |&(a, _)| a) {
            Ok(i) => Some(&self.symbols[i].1),
            Err(0) => None,
            Err(i) => Some(&self.symbols[i - 1].1),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One traced instruction (spec.md's expanded scope: enough to annotate a
/// disassembly-style log line, not a full execution history).
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent {
    pub node: u16,
    pub tile: u8,
    pub thread: u8,
    pub pc_word_addr: u32,
}

pub trait Tracer {
    fn on_instruction(&mut self, event: TraceEvent, symbol: Option<&str>);
}

/// Tracer backed by the `log` crate's `trace!` macro, matching the teacher's ambient
/// logging stack; enabled only behind the `trace-log` feature since per-instruction
/// logging is too hot a path to pay for unconditionally.
#[cfg(feature = "trace-log")]
pub struct LogTracer;

#[cfg(feature = "trace-log")]
impl Tracer for LogTracer {
    fn on_instruction(&mut self, event: TraceEvent, symbol: Option<&str>) {
        log::trace!(
            "node={} tile={} thread={} pc={:#x} sym={}",
            event.node,
            event.tile,
            event.thread,
            event.pc_word_addr,
            symbol.unwrap_or("?")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_innermost_symbol_at_or_below() {
        let mut table = SymbolTable::new();
        table.insert(0x100, "main".into());
        table.insert(0x200, "helper".into());
        assert_eq!(table.lookup(0x150), Some("main"));
        assert_eq!(table.lookup(0x200), Some("helper"));
        assert_eq!(table.lookup(0x250), Some("helper"));
    }

    #[test]
    fn lookup_below_first_symbol_is_none() {
        let mut table = SymbolTable::new();
        table.insert(0x100, "main".into());
        assert_eq!(table.lookup(0x10), None);
    }

    #[test]
    fn insert_at_existing_address_overwrites_name() {
        let mut table = SymbolTable::new();
        table.insert(0x100, "old".into());
        table.insert(0x100, "new".into());
        assert_eq!(table.lookup(0x100), Some("new"));
    }
}
