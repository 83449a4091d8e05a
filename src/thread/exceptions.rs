//! `ExceptionType` - the in-band exception plane (spec §7, plane 1).
//!
//! These are raised by simulated firmware's own actions (a divide by zero, an illegal
//! resource operation, a misaligned load) and are never wrapped in `Result`: they are
//! delivered to the faulting thread's kernel entry point (`thread::Thread::exception`)
//! exactly as real xCORE hardware would, not propagated to the host. Contrast with
//! `crate::error::SimFault`, the host-side fault plane.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    LinkError,
    IllegalInstruction,
    IllegalResource,
    IllegalAddress,
    LoadStoreAddressNotWordAligned,
    LoadStoreError,
    CallOfNonFunction,
    JumpToNonFunction,
    DivideByZero,
    GenericException,
    DataAccessException,
    IllegalPc,
    Breakpoint,
    Watchpoint,
    Ecall,
    ResourceDeadlock,
}
