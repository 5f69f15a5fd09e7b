use std::io::Read;

use crate::error::Result;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// On-disk archive header: the `'XMVP'` fourCC rendered little-endian,
/// followed by a single version byte.
#[derive(Debug, Clone, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u8,
}

static_assertions::assert_eq_size!(Header, [u8; 5]);

impl Header {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn from_reader<R>(reader: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self::read_from_bytes(&buf).unwrap())
    }

    pub fn into_bytes(self) -> [u8; Self::SIZE] {
        self.as_bytes().try_into().unwrap()
    }
}
