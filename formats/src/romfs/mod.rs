//! RomFS region framing.
//!
//! The region starts with the IVFC magic followed by a zero-filled info
//! block reserving space for the level 3 partition header, which is not
//! reconstructed; raw partition bytes follow immediately after.

pub const MAGIC: [u8; 4] = *b"IVFC";

/// Bytes of zero padding between the magic and the partition data.
pub const INFO_BLOCK_SIZE: usize = 0x1000;

/// Total framing overhead before the first partition byte.
pub const PREAMBLE_SIZE: usize = MAGIC.len() + INFO_BLOCK_SIZE;
