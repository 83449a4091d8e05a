//! isa/branch.rs - control transfer semantics (spec §6 "Branches").
//!
//! A taken branch to an address the decode cache maps to `SLOT_ILLEGAL_PC` raises
//! `IllegalPc` rather than silently continuing. A *backward* branch (the common loop
//! back-edge) additionally yields the dispatch loop back to the scheduler once taken,
//! giving other runnables a fair chance to run even inside a tight loop (spec §6
//! "backward-branch-yield").

use crate::decode_cache::{DecodeCache, SLOT_ILLEGAL_PC};
use crate::thread::exceptions::ExceptionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchOutcome {
    pub target_slot: usize,
    /// True if this branch's target address is numerically behind the branch's own
    /// address (a loop back-edge).
    pub yields: bool,
}

/// Resolve a taken branch from `from_word_addr` to `target_word_addr` against `cache`.
pub fn resolve_branch(
    cache: &DecodeCache,
    from_word_addr: u32,
    target_word_addr: u32,
) -> Result<BranchOutcome, ExceptionType> {
    let target_slot = cache.slot_for_addr(target_word_addr);
    if target_slot == SLOT_ILLEGAL_PC {
        return Err(ExceptionType::IllegalPc);
    }
    Ok(BranchOutcome {
        target_slot,
        yields: target_word_addr <= from_word_addr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_to_unmapped_address_is_illegal_pc() {
        let cache = DecodeCache::new(4, 0x1000);
        let err = resolve_branch(&cache, 0x1000, 0x2000).unwrap_err();
        assert_eq!(err, ExceptionType::IllegalPc);
    }

    #[test]
    fn forward_branch_does_not_yield() {
        let cache = DecodeCache::new(8, 0);
        let outcome = resolve_branch(&cache, 0, 4).unwrap();
        assert!(!outcome.yields);
    }

    #[test]
    fn backward_branch_yields() {
        let cache = DecodeCache::new(8, 0);
        let outcome = resolve_branch(&cache, 4, 0).unwrap();
        assert!(outcome.yields);
    }
}
