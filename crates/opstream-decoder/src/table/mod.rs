use std::fmt;

use once_cell::sync::OnceCell;
use opstream_core::{Error, OpCode, OperandDescriptor, Result};
use tracing::{debug, error, warn};

use crate::descriptors::NEO_DESCRIPTORS;

/// Width in bytes of a little-endian operand length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrefixWidth {
    One = 1,
    Two = 2,
    Four = 4,
}

impl PrefixWidth {
    /// Maps a raw descriptor width; `0` and anything outside {1, 2, 4} yield `None`.
    pub const fn from_width(width: u8) -> Option<Self> {
        match width {
            1 => Some(PrefixWidth::One),
            2 => Some(PrefixWidth::Two),
            4 => Some(PrefixWidth::Four),
            _ => None,
        }
    }

    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Reads the unsigned length stored in `prefix`, which must be exactly `bytes()` long.
    #[inline]
    pub(crate) fn read_len(self, prefix: &[u8]) -> u64 {
        match self {
            PrefixWidth::One => u64::from(prefix[0]),
            PrefixWidth::Two => u64::from(u16::from_le_bytes([prefix[0], prefix[1]])),
            PrefixWidth::Four => {
                u64::from(u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]))
            }
        }
    }
}

/// Operand layout of a single opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandEncoding {
    /// Constant operand length, no length bytes in the stream.
    Fixed(u32),
    /// Operand length read from a prefix following the opcode byte.
    Prefixed(PrefixWidth),
}

impl OperandEncoding {
    pub const fn prefix_width(self) -> u8 {
        match self {
            OperandEncoding::Fixed(_) => 0,
            OperandEncoding::Prefixed(width) => width as u8,
        }
    }

    /// Zero for prefixed encodings, where the field carries no meaning.
    pub const fn fixed_size(self) -> u32 {
        match self {
            OperandEncoding::Fixed(size) => size,
            OperandEncoding::Prefixed(_) => 0,
        }
    }

    fn from_descriptor(descriptor: &OperandDescriptor) -> Result<Self> {
        if descriptor.prefix_width == 0 {
            return Ok(OperandEncoding::Fixed(descriptor.fixed_size));
        }
        PrefixWidth::from_width(descriptor.prefix_width)
            .map(OperandEncoding::Prefixed)
            .ok_or(Error::InvalidMetadata {
                opcode: descriptor.opcode,
                prefix_width: descriptor.prefix_width,
            })
    }
}

impl Default for OperandEncoding {
    fn default() -> Self {
        OperandEncoding::Fixed(0)
    }
}

/// Maps every opcode value to its operand encoding.
///
/// Immutable once built. The process-wide instance lives behind [`global`]
/// and is shared by every decode call without locking.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodingTable {
    entries: [OperandEncoding; 256],
}

impl EncodingTable {
    /// Table where every opcode has an empty fixed operand.
    pub fn empty() -> Self {
        Self {
            entries: [OperandEncoding::Fixed(0); 256],
        }
    }

    /// Builds the table, aborting on malformed metadata.
    ///
    /// An out-of-range prefix width is a defect in the supplied descriptor
    /// set, never a property of a script, so it panics instead of returning.
    pub fn build(descriptors: &[OperandDescriptor]) -> Self {
        match Self::try_build(descriptors) {
            Ok(table) => table,
            Err(err) => {
                error!(error = %err, "descriptor set rejected");
                panic!("invalid operand descriptor set: {err}");
            }
        }
    }

    /// Builds the table, reporting malformed metadata as [`Error::InvalidMetadata`].
    pub fn try_build(descriptors: &[OperandDescriptor]) -> Result<Self> {
        let mut table = Self::empty();
        let mut seen = [false; 256];
        for descriptor in descriptors {
            let encoding = OperandEncoding::from_descriptor(descriptor)?;
            let idx = descriptor.opcode.index();
            if seen[idx] && table.entries[idx] != encoding {
                warn!(
                    opcode = idx,
                    previous = ?table.entries[idx],
                    replacement = ?encoding,
                    "duplicate operand descriptor, keeping the last one"
                );
            }
            seen[idx] = true;
            table.entries[idx] = encoding;
        }
        debug!(
            descriptors = descriptors.len(),
            prefixed = table.prefixed_count(),
            "operand encoding table built"
        );
        Ok(table)
    }

    /// Parses a JSON array of descriptors and builds the table from it.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<OperandDescriptor> =
            serde_json::from_str(json).map_err(|e| Error::DescriptorSet(e.to_string()))?;
        Self::try_build(&descriptors)
    }

    /// Encoding of `opcode`. Total: undescribed opcodes report `Fixed(0)`.
    #[inline]
    pub fn lookup(&self, opcode: OpCode) -> OperandEncoding {
        self.entries[opcode.index()]
    }

    fn prefixed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, OperandEncoding::Prefixed(_)))
            .count()
    }
}

impl Default for EncodingTable {
    fn default() -> Self {
        Self::build(NEO_DESCRIPTORS)
    }
}

impl fmt::Debug for EncodingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| **e != OperandEncoding::Fixed(0))
                    .map(|(op, e)| (OpCode(op as u8), e)),
            )
            .finish()
    }
}

static GLOBAL: OnceCell<EncodingTable> = OnceCell::new();

/// Process-wide table, built from [`NEO_DESCRIPTORS`] on first use unless
/// [`install`] ran before.
pub fn global() -> &'static EncodingTable {
    GLOBAL.get_or_init(EncodingTable::default)
}

/// Installs `descriptors` as the process-wide table.
///
/// Installing the same set again is a no-op. Installing a different set once
/// the global table exists panics.
pub fn install(descriptors: &[OperandDescriptor]) -> &'static EncodingTable {
    match GLOBAL.try_insert(EncodingTable::build(descriptors)) {
        Ok(table) => table,
        Err((current, rejected)) if *current == rejected => current,
        Err(_) => {
            error!("global encoding table already built from a different descriptor set");
            panic!("global encoding table already initialised with different descriptors");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undescribed_opcodes_default_to_empty_fixed() {
        let table = EncodingTable::build(&[OperandDescriptor::fixed(OpCode(0x10), 1)]);
        for op in 0..=255u8 {
            let enc = table.lookup(OpCode(op));
            if op == 0x10 {
                assert_eq!(enc, OperandEncoding::Fixed(1));
            } else {
                assert_eq!(enc.prefix_width(), 0);
                assert_eq!(enc.fixed_size(), 0);
            }
        }
    }

    #[test]
    fn prefixed_lookup_reports_width() {
        let table = EncodingTable::build(&[
            OperandDescriptor::prefixed(OpCode(0x20), 1),
            OperandDescriptor::prefixed(OpCode(0x21), 2),
            OperandDescriptor::prefixed(OpCode(0x22), 4),
        ]);
        assert_eq!(table.lookup(OpCode(0x20)).prefix_width(), 1);
        assert_eq!(table.lookup(OpCode(0x21)).prefix_width(), 2);
        assert_eq!(table.lookup(OpCode(0x22)).prefix_width(), 4);
        assert_eq!(table.lookup(OpCode(0x22)).fixed_size(), 0);
    }

    #[test]
    fn prefixed_descriptor_ignores_fixed_size() {
        let d = OperandDescriptor { opcode: OpCode(0x0c), prefix_width: 1, fixed_size: 9 };
        let table = EncodingTable::build(&[d]);
        assert_eq!(table.lookup(OpCode(0x0c)), OperandEncoding::Prefixed(PrefixWidth::One));
    }

    #[test]
    fn try_build_rejects_bad_prefix_width() {
        for width in [3u8, 5, 8, 255] {
            let d = OperandDescriptor::prefixed(OpCode(0x0c), width);
            let err = EncodingTable::try_build(&[d]).unwrap_err();
            assert_eq!(err, Error::InvalidMetadata { opcode: OpCode(0x0c), prefix_width: width });
        }
    }

    #[test]
    #[should_panic(expected = "invalid operand descriptor set")]
    fn build_panics_on_bad_prefix_width() {
        EncodingTable::build(&[OperandDescriptor::prefixed(OpCode(0x0c), 3)]);
    }

    #[test]
    fn last_duplicate_wins() {
        let table = EncodingTable::build(&[
            OperandDescriptor::fixed(OpCode(0x01), 2),
            OperandDescriptor::fixed(OpCode(0x01), 4),
        ]);
        assert_eq!(table.lookup(OpCode(0x01)), OperandEncoding::Fixed(4));
    }

    #[test]
    fn rebuilding_is_idempotent() {
        assert_eq!(EncodingTable::build(NEO_DESCRIPTORS), EncodingTable::build(NEO_DESCRIPTORS));
    }

    #[test]
    fn read_len_is_little_endian() {
        assert_eq!(PrefixWidth::One.read_len(&[0xff]), 255);
        assert_eq!(PrefixWidth::Two.read_len(&[0x34, 0x12]), 0x1234);
        assert_eq!(PrefixWidth::Four.read_len(&[0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(PrefixWidth::Four.read_len(&[0xff, 0xff, 0xff, 0xff]), u64::from(u32::MAX));
    }

    #[test]
    fn from_json_builds_table() {
        let json = r#"[
            {"opcode": 16, "fixed_size": 1},
            {"opcode": 32, "prefix_width": 1}
        ]"#;
        let table = EncodingTable::from_json(json).unwrap();
        assert_eq!(table.lookup(OpCode(0x10)), OperandEncoding::Fixed(1));
        assert_eq!(table.lookup(OpCode(0x20)), OperandEncoding::Prefixed(PrefixWidth::One));
    }

    #[test]
    fn from_json_reports_errors() {
        assert!(matches!(EncodingTable::from_json("[{"), Err(Error::DescriptorSet(_))));
        let bad = r#"[{"opcode": 12, "prefix_width": 3}]"#;
        assert!(matches!(EncodingTable::from_json(bad), Err(Error::InvalidMetadata { .. })));
    }

    #[test]
    fn global_matches_default_set() {
        assert_eq!(*global(), EncodingTable::build(NEO_DESCRIPTORS));
        // the default set is identical, so this is a no-op
        let installed = install(NEO_DESCRIPTORS);
        assert!(std::ptr::eq(installed, global()));
    }

    #[test]
    fn debug_lists_only_described_opcodes() {
        let table = EncodingTable::build(&[OperandDescriptor::fixed(OpCode(0x10), 1)]);
        let out = format!("{:?}", table);
        assert!(out.contains("Fixed(1)"));
        assert_eq!(out.matches("Fixed").count(), 1);
    }
}
