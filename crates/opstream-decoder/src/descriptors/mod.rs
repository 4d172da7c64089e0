//! Operand layout of the standard Neo VM instruction set.
//!
//! Opcodes that are absent here take no operand.

use opstream_core::{OpCode, OperandDescriptor};

const fn fixed(opcode: OpCode, size: u32) -> OperandDescriptor {
    OperandDescriptor::fixed(opcode, size)
}

const fn prefixed(opcode: OpCode, width: u8) -> OperandDescriptor {
    OperandDescriptor::prefixed(opcode, width)
}

pub const NEO_DESCRIPTORS: &[OperandDescriptor] = &[
    // constants
    fixed(OpCode::PUSHINT8, 1),
    fixed(OpCode::PUSHINT16, 2),
    fixed(OpCode::PUSHINT32, 4),
    fixed(OpCode::PUSHINT64, 8),
    fixed(OpCode::PUSHINT128, 16),
    fixed(OpCode::PUSHINT256, 32),
    fixed(OpCode::PUSHA, 4),
    prefixed(OpCode::PUSHDATA1, 1),
    prefixed(OpCode::PUSHDATA2, 2),
    prefixed(OpCode::PUSHDATA4, 4),
    // flow control
    fixed(OpCode::JMP, 1),
    fixed(OpCode::JMP_L, 4),
    fixed(OpCode::JMPIF, 1),
    fixed(OpCode::JMPIF_L, 4),
    fixed(OpCode::JMPIFNOT, 1),
    fixed(OpCode::JMPIFNOT_L, 4),
    fixed(OpCode::JMPEQ, 1),
    fixed(OpCode::JMPEQ_L, 4),
    fixed(OpCode::JMPNE, 1),
    fixed(OpCode::JMPNE_L, 4),
    fixed(OpCode::JMPGT, 1),
    fixed(OpCode::JMPGT_L, 4),
    fixed(OpCode::JMPGE, 1),
    fixed(OpCode::JMPGE_L, 4),
    fixed(OpCode::JMPLT, 1),
    fixed(OpCode::JMPLT_L, 4),
    fixed(OpCode::JMPLE, 1),
    fixed(OpCode::JMPLE_L, 4),
    fixed(OpCode::CALL, 1),
    fixed(OpCode::CALL_L, 4),
    fixed(OpCode::CALLT, 2),
    // catch/finally offsets, packed
    fixed(OpCode::TRY, 2),
    fixed(OpCode::TRY_L, 8),
    fixed(OpCode::ENDTRY, 1),
    fixed(OpCode::ENDTRY_L, 4),
    fixed(OpCode::SYSCALL, 4),
    // slots
    fixed(OpCode::INITSSLOT, 1),
    fixed(OpCode::INITSLOT, 2),
    fixed(OpCode::LDSFLD, 1),
    fixed(OpCode::STSFLD, 1),
    fixed(OpCode::LDLOC, 1),
    fixed(OpCode::STLOC, 1),
    fixed(OpCode::LDARG, 1),
    fixed(OpCode::STARG, 1),
    // types
    fixed(OpCode::NEWARRAY_T, 1),
    fixed(OpCode::ISTYPE, 1),
    fixed(OpCode::CONVERT, 1),
];
