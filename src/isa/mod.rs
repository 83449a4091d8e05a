/*!
isa/mod.rs - opcode table, operand-encoding categories, and per-category instruction
semantics (spec §4 "Instruction set", §6 "Arithmetic & control transfer").

Bit-exact reproduction of the real instruction encoding is out of scope here (the
source encoding tables are not part of this corpus); `Opcode` below is an
implementer-chosen, internally-consistent synthetic encoding that covers every operand
category and semantic group spec.md names (see DESIGN.md "ISA encoding"). What matters
for the simulator is that `decode_cache::DecodeSlot::operands` and the semantics in
`arith`/`branch`/`control` line up with exactly these categories.
*/

pub mod arith;
pub mod branch;
pub mod control;

/// The operand-encoding categories named in spec.md: three/two register forms, register
/// + unsigned-immediate forms, and their long (32-bit) counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandEncoding {
    /// 3 registers.
    R3,
    /// 2 registers + unsigned immediate.
    Rus2,
    /// long 3-register.
    LR3,
    /// long 2-register + unsigned immediate.
    LRus2,
    /// register + 6-bit unsigned immediate (short or long form).
    Ru6,
    LRu6,
    /// 6-bit unsigned immediate only.
    U6,
    LU6,
    /// 10-bit unsigned immediate.
    U10,
    LU10,
    /// 2 registers.
    R2,
    /// register + unsigned immediate, no destination.
    Rus,
    LR2,
    /// 1 register.
    R1,
    /// no operands.
    R0,
    LR4,
    LR5,
    LR6,
}

/// Every instruction the interpreter and JIT both understand, grouped by the semantic
/// families spec §4/§6 describe. Operand categories above determine how `operands` in a
/// `DecodeSlot` is populated for a given opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Opcode {
    // Arithmetic / logic (R3, Rus2, Ru6 families).
    Add,
    Sub,
    Mul,
    DivS,
    DivU,
    RemS,
    RemU,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    AShr,
    BitRev,
    ByteRev,
    Eq,
    Lss,
    // Data movement.
    Ldw,
    Stw,
    Ld16,
    St16,
    Ld8,
    St8,
    Mov,
    Ldc,
    // Control transfer.
    Bu,
    Bt,
    Bf,
    Bl,
    Bla,
    Blat,
    Blacp,
    Retsp,
    Entsp,
    Kentsp,
    Krestsp,
    // Resource operations.
    In,
    Out,
    Inct,
    Outct,
    Chkct,
    Int,
    GetR,
    SetC,
    SetD,
    SetV,
    SetEv,
    InEbu,
    SetPs,
    GetPs,
    // Synchronisation.
    Ssync,
    Msync,
    Mjoin,
    // Miscellaneous.
    Nop,
    Waitet,
    Waitef,
    ClrE,
    Edu,
    Eeu,
}

impl Opcode {
    pub fn encoding(self) -> OperandEncoding {
        use Opcode::*;
        match self {
            Add | Sub | Mul | DivS | DivU | RemS | RemU | And | Or | Xor | Eq | Lss => OperandEncoding::R3,
            Not | Shl | Shr | AShr | BitRev | ByteRev | Mov => OperandEncoding::R2,
            Ldw | Stw | Ld16 | St16 | Ld8 | St8 => OperandEncoding::Rus2,
            Ldc => OperandEncoding::Ru6,
            Bu | Bt | Bf => OperandEncoding::Ru6,
            Bl | Bla | Blat | Blacp => OperandEncoding::LU10,
            Retsp | Entsp | Kentsp | Krestsp => OperandEncoding::U6,
            In | Out | Inct | Outct | Chkct | Int | GetR | SetC | SetD | SetV | SetEv | InEbu => OperandEncoding::R2,
            SetPs | GetPs => OperandEncoding::R1,
            Ssync | Msync | Mjoin => OperandEncoding::R0,
            Nop | Waitet | Waitef | ClrE | Edu | Eeu => OperandEncoding::R0,
        }
    }
}
