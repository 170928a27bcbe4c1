//! A 128-bit wire label.

use std::fmt;

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 128-bit value used as a wire label.
///
/// The least significant bit is the label's select bit: it is public to
/// whoever holds the label and indexes rows of garbled tables. The two
/// labels of a wire carry complementary select bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block([u8; 16]);

impl Block {
    /// Byte width of a label.
    pub const LEN: usize = 16;

    /// The select bit.
    #[inline]
    pub fn lsb(&self) -> bool {
        self.0[0] & 1 != 0
    }

    /// A copy of this label with the select bit forced to `bit`.
    #[inline]
    pub fn with_lsb(mut self, bit: bool) -> Block {
        self.0[0] = (self.0[0] & !1) | bit as u8;
        self
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Build a block from a 16-byte slice.
    #[inline]
    pub fn try_from_slice(bytes: &[u8]) -> Option<Block> {
        let bytes: [u8; 16] = bytes.try_into().ok()?;
        Some(Block(bytes))
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(v: u128) -> Block {
        Block(v.to_le_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(b: Block) -> u128 {
        u128::from_le_bytes(b.0)
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Block {
        Block(bytes)
    }
}

impl AsRef<[u8]> for Block {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::BitXor for Block {
    type Output = Block;

    #[inline]
    fn bitxor(self, rhs: Block) -> Block {
        Block::from(u128::from(self) ^ u128::from(rhs))
    }
}

impl std::ops::BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Block) {
        *self = *self ^ rhs;
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block::from(rng.gen::<u128>())
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({:032x})", u128::from(*self))
    }
}
