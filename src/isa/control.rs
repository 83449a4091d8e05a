//! isa/control.rs - stack-frame and resource-operation glue (spec §6 "Stack frames",
//! "SSYNC/MSYNC/MJOIN", "IN/OUT").
//!
//! `entsp`/`retsp` are the ordinary user-mode frame open/close pair; `kentsp`/`krestsp`
//! are their kernel-entry counterparts, used when a thread takes an exception and must
//! bank its user state before touching the kernel stack. The arithmetic is identical in
//! this model (both move `sp` by `n` words); what differs is which register file the
//! caller is operating on, a distinction `thread::Thread::exception` makes, not this
//! module. `GETR`/`SETC` are implemented directly against a core's live resource pools
//! in `core_tile::Core` rather than here, since they need first-class allocation state
//! this module deliberately has no access to.

use crate::resource::OpResult;
use crate::thread::exceptions::ExceptionType;

/// `entsp n`: open a new frame by reserving `n` words.
pub fn entsp(sp: u32, n: u32) -> u32 {
    sp.wrapping_sub(n * 4)
}

/// `retsp n`: close the current frame, releasing `n` words.
pub fn retsp(sp: u32, n: u32) -> u32 {
    sp.wrapping_add(n * 4)
}

/// `kentsp n`: kernel-entry frame open, identical arithmetic to `entsp`.
pub fn kentsp(sp: u32, n: u32) -> u32 {
    entsp(sp, n)
}

/// `krestsp n`: kernel-entry frame close, identical arithmetic to `retsp`.
pub fn krestsp(sp: u32, n: u32) -> u32 {
    retsp(sp, n)
}

/// Translate a resource operation's three-way `OpResult` into the dispatch loop's
/// vocabulary: `Illegal` always becomes `IllegalResource` (spec §7 "ILLEGAL always
/// translates to ILLEGAL_RESOURCE").
pub fn resource_result_to_exception(result: OpResult) -> Option<ExceptionType> {
    match result {
        OpResult::Illegal => Some(ExceptionType::IllegalResource),
        OpResult::Continue | OpResult::Deschedule => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entsp_and_retsp_are_inverses() {
        let sp = 0x1000;
        let opened = entsp(sp, 4);
        assert_eq!(retsp(opened, 4), sp);
    }

    #[test]
    fn illegal_op_result_always_maps_to_illegal_resource() {
        assert_eq!(
            resource_result_to_exception(OpResult::Illegal),
            Some(ExceptionType::IllegalResource)
        );
        assert_eq!(resource_result_to_exception(OpResult::Continue), None);
        assert_eq!(resource_result_to_exception(OpResult::Deschedule), None);
    }
}
