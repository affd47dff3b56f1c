use std::io::{Read, Write};

use anyhow::bail;
use byteorder::{ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::{Decode, Encode};

/// An `i32` encoded with variable length.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct VarInt(pub i32);

impl VarInt {
    /// The maximum number of bytes a VarInt could occupy when read from and
    /// written to the wire.
    pub const MAX_SIZE: usize = 5;

    /// Returns the exact number of bytes this varint will write when
    /// [`Encode::encode`] is called, assuming no error occurs.
    pub fn written_size(self) -> usize {
        match self.0 {
            0 => 1,
            n => (31 - n.leading_zeros() as usize) / 7 + 1,
        }
    }

    /// Decodes a VarInt from a reader that may not have all of its bytes yet.
    pub fn decode_partial(mut r: impl Read) -> Result<i32, VarIntDecodeError> {
        let mut val = 0;
        for i in 0..Self::MAX_SIZE {
            let byte = r.read_u8().map_err(|_| VarIntDecodeError::Incomplete)?;
            val |= (i32::from(byte) & 0b0111_1111) << (i * 7);
            if byte & 0b1000_0000 == 0 {
                return Ok(val);
            }
        }

        Err(VarIntDecodeError::TooLarge)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Error)]
pub enum VarIntDecodeError {
    #[error("incomplete VarInt decode")]
    Incomplete,
    #[error("VarInt is too large")]
    TooLarge,
}

impl Encode for VarInt {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        let mut val = self.0 as u32;
        loop {
            if val & !0b0111_1111 == 0 {
                w.write_u8(val as u8)?;
                return Ok(());
            }
            w.write_u8(val as u8 & 0b0111_1111 | 0b1000_0000)?;
            val >>= 7;
        }
    }
}

impl Decode<'_> for VarInt {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        match VarInt::decode_partial(r) {
            Ok(val) => Ok(VarInt(val)),
            Err(VarIntDecodeError::Incomplete) => bail!("unexpected end of input in VarInt"),
            Err(VarIntDecodeError::TooLarge) => bail!("VarInt is too large"),
        }
    }
}

impl From<i32> for VarInt {
    fn from(i: i32) -> Self {
        VarInt(i)
    }
}

impl From<VarInt> for i32 {
    fn from(i: VarInt) -> Self {
        i.0
    }
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, Rng};

    use super::*;

    #[test]
    fn varint_written_size() {
        let mut rng = thread_rng();
        let mut buf = vec![];

        for n in (0..10_000)
            .map(|_| rng.gen())
            .chain([0, 1, 127, 128, i32::MIN, i32::MAX])
            .map(VarInt)
        {
            buf.clear();
            n.encode(&mut buf).unwrap();
            assert_eq!(buf.len(), n.written_size());
        }
    }

    #[test]
    fn negative_varints_use_all_five_bytes() {
        let mut buf = vec![];
        VarInt(-1).encode(&mut buf).unwrap();
        assert_eq!(buf, [0xff, 0xff, 0xff, 0xff, 0x0f]);

        let mut slice = buf.as_slice();
        assert_eq!(VarInt::decode(&mut slice).unwrap(), VarInt(-1));
        assert!(slice.is_empty());
    }

    #[test]
    fn partial_varint_is_incomplete() {
        let bytes = [0x80u8, 0x80];
        assert_eq!(
            VarInt::decode_partial(&bytes[..]),
            Err(VarIntDecodeError::Incomplete)
        );
    }
}
