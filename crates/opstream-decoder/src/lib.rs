//! Opstream Decoder
//!
//! Table-driven decoding of stack VM bytecode into zero-copy instructions.

pub mod config;
pub mod descriptors;
pub mod table;
pub mod parser;
pub mod operand;

pub use config::DecoderConfig;
pub use descriptors::NEO_DESCRIPTORS;
pub use parser::{decode, instructions, Decoder, Instruction, Instructions};
pub use table::{EncodingTable, OperandEncoding, PrefixWidth};

pub use opstream_core::{Error, OpCode, OperandDescriptor, Result};
