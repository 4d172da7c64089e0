//! Typed views over an instruction operand.
//!
//! Accessors only reinterpret bytes; which one is valid depends on the opcode
//! and is the caller's call. Offsets in errors are relative to the operand.

use std::borrow::Cow;

use opstream_core::{Error, Result};

use crate::parser::Instruction;

impl<'a> Instruction<'a> {
    fn le_bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        offset
            .checked_add(N)
            .and_then(|end| self.operand.get(offset..end))
            .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
            .ok_or(Error::OutOfBounds {
                offset,
                needed: N,
                available: self.operand.len().saturating_sub(offset),
            })
    }

    pub fn read_u8_at(&self, offset: usize) -> Result<u8> {
        self.le_bytes::<1>(offset).map(|[b]| b)
    }

    pub fn read_i8_at(&self, offset: usize) -> Result<i8> {
        self.le_bytes(offset).map(i8::from_le_bytes)
    }

    pub fn read_u16_at(&self, offset: usize) -> Result<u16> {
        self.le_bytes(offset).map(u16::from_le_bytes)
    }

    pub fn read_i16_at(&self, offset: usize) -> Result<i16> {
        self.le_bytes(offset).map(i16::from_le_bytes)
    }

    pub fn read_u32_at(&self, offset: usize) -> Result<u32> {
        self.le_bytes(offset).map(u32::from_le_bytes)
    }

    pub fn read_i32_at(&self, offset: usize) -> Result<i32> {
        self.le_bytes(offset).map(i32::from_le_bytes)
    }

    pub fn read_i64_at(&self, offset: usize) -> Result<i64> {
        self.le_bytes(offset).map(i64::from_le_bytes)
    }

    #[inline]
    pub fn token_u8(&self) -> Result<u8> {
        self.read_u8_at(0)
    }

    /// Second byte, for operands packing two 1-byte fields (e.g. `INITSLOT`).
    #[inline]
    pub fn token_u8_1(&self) -> Result<u8> {
        self.read_u8_at(1)
    }

    #[inline]
    pub fn token_i8(&self) -> Result<i8> {
        self.read_i8_at(0)
    }

    #[inline]
    pub fn token_i8_1(&self) -> Result<i8> {
        self.read_i8_at(1)
    }

    #[inline]
    pub fn token_u16(&self) -> Result<u16> {
        self.read_u16_at(0)
    }

    #[inline]
    pub fn token_i16(&self) -> Result<i16> {
        self.read_i16_at(0)
    }

    #[inline]
    pub fn token_u32(&self) -> Result<u32> {
        self.read_u32_at(0)
    }

    #[inline]
    pub fn token_i32(&self) -> Result<i32> {
        self.read_i32_at(0)
    }

    /// Second 4-byte field of an 8-byte operand (e.g. the finally offset of `TRY_L`).
    #[inline]
    pub fn token_i32_1(&self) -> Result<i32> {
        self.read_i32_at(4)
    }

    #[inline]
    pub fn token_i64(&self) -> Result<i64> {
        self.read_i64_at(0)
    }

    /// Operand as ASCII text, one character per byte.
    ///
    /// Borrowed when every byte is ASCII; bytes above 0x7f become `'?'`.
    pub fn token_string(&self) -> Cow<'a, str> {
        match std::str::from_utf8(self.operand) {
            Ok(text) if text.is_ascii() => Cow::Borrowed(text),
            _ => Cow::Owned(
                self.operand
                    .iter()
                    .map(|&b| if b.is_ascii() { b as char } else { '?' })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::table::EncodingTable;
    use opstream_core::{Error, OpCode, OperandDescriptor};
    use std::borrow::Cow;

    fn table() -> EncodingTable {
        EncodingTable::build(&[
            OperandDescriptor::fixed(OpCode(0x01), 2),
            OperandDescriptor::fixed(OpCode(0x08), 8),
            OperandDescriptor::prefixed(OpCode(0x0c), 1),
        ])
    }

    #[test]
    fn packed_four_byte_fields() {
        let t = table();
        let script = [0x08, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let ins = t.decode(&script, 0).unwrap();
        assert_eq!(ins.token_i32().unwrap(), 0x0403_0201);
        assert_eq!(ins.token_i32_1().unwrap(), 0x0807_0605);
        assert_eq!(ins.token_u32().unwrap(), 0x0403_0201);
        assert_eq!(ins.token_i64().unwrap(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn signed_and_unsigned_round_trip() {
        let t = table();
        for value in [i16::MIN, -2, -1, 0, 1, 0x1234, i16::MAX] {
            let mut script = vec![0x01];
            script.extend_from_slice(&value.to_le_bytes());
            let ins = t.decode(&script, 0).unwrap();
            assert_eq!(ins.token_i16().unwrap(), value);
            assert_eq!(ins.token_u16().unwrap(), value as u16);
        }

        let mut script = vec![0x08];
        script.extend_from_slice(&(-7i32).to_le_bytes());
        script.extend_from_slice(&i32::MIN.to_le_bytes());
        let ins = t.decode(&script, 0).unwrap();
        assert_eq!(ins.token_i32().unwrap(), -7);
        assert_eq!(ins.token_u32().unwrap(), (-7i32) as u32);
        assert_eq!(ins.token_i32_1().unwrap(), i32::MIN);
    }

    #[test]
    fn byte_accessors() {
        let t = table();
        let ins = t.decode(&[0x01, 0xfe, 0x7f], 0).unwrap();
        assert_eq!(ins.token_u8().unwrap(), 0xfe);
        assert_eq!(ins.token_i8().unwrap(), -2);
        assert_eq!(ins.token_u8_1().unwrap(), 0x7f);
        assert_eq!(ins.token_i8_1().unwrap(), 127);
    }

    #[test]
    fn short_operand_is_out_of_bounds() {
        let t = table();
        let ins = t.decode(&[0x01, 0xaa, 0xbb], 0).unwrap();
        assert_eq!(
            ins.token_i32().unwrap_err(),
            Error::OutOfBounds { offset: 0, needed: 4, available: 2 }
        );
        assert_eq!(
            ins.token_i32_1().unwrap_err(),
            Error::OutOfBounds { offset: 4, needed: 4, available: 0 }
        );
        assert!(ins.read_u8_at(usize::MAX).is_err());

        let empty = t.decode(&[0x40], 0).unwrap();
        assert!(matches!(empty.token_u8(), Err(Error::OutOfBounds { needed: 1, .. })));
        assert!(empty.token_i8_1().is_err());
    }

    #[test]
    fn ascii_text_is_borrowed() {
        let t = table();
        let script = [0x0c, 0x03, b'A', b'B', b'C'];
        let ins = t.decode(&script, 0).unwrap();
        assert!(matches!(ins.token_string(), Cow::Borrowed("ABC")));
    }

    #[test]
    fn non_ascii_bytes_are_replaced() {
        let t = table();
        let script = [0x0c, 0x03, b'o', 0xc3, 0xa9];
        let ins = t.decode(&script, 0).unwrap();
        assert_eq!(ins.token_string(), "o??");

        let empty = t.decode(&[0x0c, 0x00], 0).unwrap();
        assert_eq!(empty.token_string(), "");
    }
}
