use std::iter::FusedIterator;

use once_cell::sync::Lazy;
use opstream_core::{Error, OpCode, Result};
use tracing::trace;

use crate::config::DecoderConfig;
use crate::table::{self, EncodingTable, OperandEncoding};

/// Decoded instruction borrowing its operand from the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub opcode: OpCode,
    pub operand: &'a [u8],
    encoding: OperandEncoding,
}

impl Instruction<'static> {
    /// Terminator used as the implicit end of every script.
    pub const RET: Instruction<'static> = Instruction {
        opcode: OpCode::RET,
        operand: &[],
        encoding: OperandEncoding::Fixed(0),
    };
}

impl<'a> Instruction<'a> {
    /// Encoding the opcode had in the table used for decoding.
    #[inline]
    pub fn encoding(&self) -> OperandEncoding {
        self.encoding
    }

    /// Bytes this instruction occupies in the script, opcode included.
    #[inline]
    pub fn size(&self) -> usize {
        match self.encoding {
            OperandEncoding::Fixed(size) => 1 + size as usize,
            OperandEncoding::Prefixed(width) => 1 + width.bytes() + self.operand.len(),
        }
    }
}

/// Decodes instructions against one encoding table.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'t> {
    table: &'t EncodingTable,
    config: DecoderConfig,
}

static ENV_CONFIG: Lazy<DecoderConfig> = Lazy::new(DecoderConfig::from_env);

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(table::global(), Some(*ENV_CONFIG))
    }
}

impl<'t> Decoder<'t> {
    pub fn new(table: &'t EncodingTable, config: Option<DecoderConfig>) -> Self {
        Self {
            table,
            config: config.unwrap_or_default(),
        }
    }

    pub fn table(&self) -> &'t EncodingTable {
        self.table
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes the instruction starting at `ip`.
    pub fn decode<'a>(&self, script: &'a [u8], ip: usize) -> Result<Instruction<'a>> {
        let result = self.decode_unlogged(script, ip);
        if let Err(err) = &result {
            trace!(ip, opcode = ?script.get(ip), error = %err, "rejected instruction");
        }
        result
    }

    fn decode_unlogged<'a>(&self, script: &'a [u8], ip: usize) -> Result<Instruction<'a>> {
        let opcode = script.get(ip).copied().map(OpCode).ok_or(Error::OutOfBounds {
            offset: ip,
            needed: 1,
            available: 0,
        })?;
        let encoding = self.table.lookup(opcode);

        let (operand_start, operand_len) = match encoding {
            OperandEncoding::Fixed(size) => (ip + 1, u64::from(size)),
            OperandEncoding::Prefixed(width) => {
                let start = ip + 1;
                let prefix = script
                    .get(start..start + width.bytes())
                    .ok_or(Error::OutOfBounds {
                        offset: start,
                        needed: width.bytes(),
                        available: script.len() - start,
                    })?;
                (start + width.bytes(), width.read_len(prefix))
            }
        };

        let available = script.len() - operand_start;
        if operand_len > u64::from(self.config.max_operand_len) || operand_len > available as u64 {
            return Err(Error::TruncatedOperand {
                offset: operand_start,
                declared: operand_len,
                available,
            });
        }

        let operand = if operand_len == 0 {
            &[][..]
        } else {
            &script[operand_start..operand_start + operand_len as usize]
        };
        Ok(Instruction { opcode, operand, encoding })
    }

    /// Walks `script` from offset zero.
    pub fn instructions<'a>(&self, script: &'a [u8]) -> Instructions<'a, 't> {
        Instructions {
            decoder: *self,
            script,
            ip: 0,
            failed: false,
        }
    }
}

impl EncodingTable {
    /// Decodes with this table and the default limits.
    pub fn decode<'a>(&self, script: &'a [u8], ip: usize) -> Result<Instruction<'a>> {
        Decoder::new(self, None).decode(script, ip)
    }

    pub fn instructions<'a, 't>(&'t self, script: &'a [u8]) -> Instructions<'a, 't> {
        Decoder::new(self, None).instructions(script)
    }
}

/// Decodes the instruction at `ip` using the process-wide table.
pub fn decode(script: &[u8], ip: usize) -> Result<Instruction<'_>> {
    Decoder::default().decode(script, ip)
}

/// Walks `script` using the process-wide table.
pub fn instructions(script: &[u8]) -> Instructions<'_, 'static> {
    Decoder::default().instructions(script)
}

/// Iterator over `(offset, instruction)` pairs of a script.
///
/// Stops at the end of the script or after yielding the first error.
#[derive(Debug, Clone)]
pub struct Instructions<'a, 't> {
    decoder: Decoder<'t>,
    script: &'a [u8],
    ip: usize,
    failed: bool,
}

impl<'a, 't> Instructions<'a, 't> {
    /// Offset of the next instruction to decode.
    pub fn offset(&self) -> usize {
        self.ip
    }
}

impl<'a, 't> Iterator for Instructions<'a, 't> {
    type Item = Result<(usize, Instruction<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.ip >= self.script.len() {
            return None;
        }
        match self.decoder.decode(self.script, self.ip) {
            Ok(ins) => {
                let pos = self.ip;
                self.ip += ins.size();
                Some(Ok((pos, ins)))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Instructions<'_, '_> {}
