/*!
 * Opstream Types
 *
 * Tipos comuns usados em toda a workspace Opstream
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identificador de instrução de um byte
///
/// O conjunto de opcodes e sua semântica pertencem à camada de execução;
/// aqui só existem as constantes necessárias para descrever operandos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpCode(pub u8);

impl OpCode {
    pub const PUSHINT8: OpCode = OpCode(0x00);
    pub const PUSHINT16: OpCode = OpCode(0x01);
    pub const PUSHINT32: OpCode = OpCode(0x02);
    pub const PUSHINT64: OpCode = OpCode(0x03);
    pub const PUSHINT128: OpCode = OpCode(0x04);
    pub const PUSHINT256: OpCode = OpCode(0x05);
    pub const PUSHA: OpCode = OpCode(0x0a);
    pub const PUSHDATA1: OpCode = OpCode(0x0c);
    pub const PUSHDATA2: OpCode = OpCode(0x0d);
    pub const PUSHDATA4: OpCode = OpCode(0x0e);
    pub const PUSH0: OpCode = OpCode(0x10);
    pub const NOP: OpCode = OpCode(0x21);
    pub const JMP: OpCode = OpCode(0x22);
    pub const JMP_L: OpCode = OpCode(0x23);
    pub const JMPIF: OpCode = OpCode(0x24);
    pub const JMPIF_L: OpCode = OpCode(0x25);
    pub const JMPIFNOT: OpCode = OpCode(0x26);
    pub const JMPIFNOT_L: OpCode = OpCode(0x27);
    pub const JMPEQ: OpCode = OpCode(0x28);
    pub const JMPEQ_L: OpCode = OpCode(0x29);
    pub const JMPNE: OpCode = OpCode(0x2a);
    pub const JMPNE_L: OpCode = OpCode(0x2b);
    pub const JMPGT: OpCode = OpCode(0x2c);
    pub const JMPGT_L: OpCode = OpCode(0x2d);
    pub const JMPGE: OpCode = OpCode(0x2e);
    pub const JMPGE_L: OpCode = OpCode(0x2f);
    pub const JMPLT: OpCode = OpCode(0x30);
    pub const JMPLT_L: OpCode = OpCode(0x31);
    pub const JMPLE: OpCode = OpCode(0x32);
    pub const JMPLE_L: OpCode = OpCode(0x33);
    pub const CALL: OpCode = OpCode(0x34);
    pub const CALL_L: OpCode = OpCode(0x35);
    pub const CALLT: OpCode = OpCode(0x37);
    pub const TRY: OpCode = OpCode(0x3b);
    pub const TRY_L: OpCode = OpCode(0x3c);
    pub const ENDTRY: OpCode = OpCode(0x3d);
    pub const ENDTRY_L: OpCode = OpCode(0x3e);
    pub const RET: OpCode = OpCode(0x40);
    pub const SYSCALL: OpCode = OpCode(0x41);
    pub const INITSSLOT: OpCode = OpCode(0x56);
    pub const INITSLOT: OpCode = OpCode(0x57);
    pub const LDSFLD: OpCode = OpCode(0x5f);
    pub const STSFLD: OpCode = OpCode(0x67);
    pub const LDLOC: OpCode = OpCode(0x6f);
    pub const STLOC: OpCode = OpCode(0x77);
    pub const LDARG: OpCode = OpCode(0x7f);
    pub const STARG: OpCode = OpCode(0x87);
    pub const NEWARRAY_T: OpCode = OpCode(0xc4);
    pub const ISTYPE: OpCode = OpCode(0xd9);
    pub const CONVERT: OpCode = OpCode(0xdb);

    /// Valor bruto do opcode
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Índice na tabela de codificação
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for OpCode {
    fn from(value: u8) -> Self {
        OpCode(value)
    }
}

impl From<OpCode> for u8 {
    fn from(value: OpCode) -> Self {
        value.0
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opcode 0x{:02x}", self.0)
    }
}

/// Descritor de codificação de operando fornecido pela camada de execução
///
/// `prefix_width = 0` significa operando de tamanho fixo (`fixed_size` bytes);
/// caso contrário o tamanho é lido de `prefix_width` bytes little-endian logo
/// após o opcode e `fixed_size` é ignorado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperandDescriptor {
    pub opcode: OpCode,
    #[serde(default)]
    pub prefix_width: u8,
    #[serde(default)]
    pub fixed_size: u32,
}

impl OperandDescriptor {
    /// Operando de tamanho fixo, sem prefixo
    pub const fn fixed(opcode: OpCode, fixed_size: u32) -> Self {
        Self { opcode, prefix_width: 0, fixed_size }
    }

    /// Operando precedido por um prefixo de tamanho de `prefix_width` bytes
    pub const fn prefixed(opcode: OpCode, prefix_width: u8) -> Self {
        Self { opcode, prefix_width, fixed_size: 0 }
    }
}
