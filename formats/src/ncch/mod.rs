//! Top-level NCCH container header.
//!
//! All multi-byte fields are little-endian. Offsets and sizes of the four
//! payload regions are expressed in media units relative to the start of the
//! header itself.

pub const MAGIC: [u8; 4] = *b"NCCH";

/// Value of the `exheader_size` field: the hashed prefix of the extended
/// header, not its 0x800-byte on-disk footprint.
pub const EXHEADER_SIZE_FIELD: u32 = 0x400;

// flags[4]
pub const PLATFORM_OLD3DS: u8 = 1;
// flags[5] bits
pub const TYPE_DATA: u8 = 0x1;
pub const TYPE_EXECUTABLE: u8 = 0x2;
// flags[7] bits
pub const CRYPTO_FIXED_KEY: u8 = 0x1;
pub const CRYPTO_NO_MOUNT_ROMFS: u8 = 0x2;
pub const CRYPTO_NO_CRYPTO: u8 = 0x4;

/// Byte indices into `Header::flags`.
pub const FLAG_CRYPTO_METHOD: usize = 3;
pub const FLAG_PLATFORM: usize = 4;
pub const FLAG_CONTENT_TYPE: usize = 5;
pub const FLAG_UNIT_SIZE: usize = 6; // media unit = 0x200 << flags[6]
pub const FLAG_CRYPTO: usize = 7;

#[repr(C)]
pub struct Header {
    pub signature: [u8; 0x100],
    pub magic: [u8; 4],
    pub content_size: u32,
    pub partition_id: u64,
    pub maker_code: u16,
    pub version: u16,
    pub verification_word: u32,
    pub program_id: u64,
    _0: [u8; 0x10],
    pub logo_region_hash: [u8; 0x20],
    pub product_code: [u8; 0x10],
    pub exheader_hash: [u8; 0x20],
    pub exheader_size: u32,
    _1: [u8; 4],
    pub flags: [u8; 8],
    pub plain_region_offset: u32,
    pub plain_region_size: u32,
    pub logo_region_offset: u32,
    pub logo_region_size: u32,
    pub exefs_offset: u32,
    pub exefs_size: u32,
    pub exefs_hash_region_size: u32,
    _2: [u8; 4],
    pub romfs_offset: u32,
    pub romfs_size: u32,
    pub romfs_hash_region_size: u32,
    _3: [u8; 4],
    pub exefs_superblock_hash: [u8; 0x20],
    pub romfs_superblock_hash: [u8; 0x20],
}

unsafe impl plain::Plain for Header {}

static_assertions::const_assert!(ncch_header_size; std::mem::size_of::<Header>() == 0x200);

impl Header {
    pub fn zero() -> Header {
        unsafe { std::mem::zeroed() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe { plain::as_bytes(self) }
    }

    pub fn copy_from_bytes(&mut self, b: &[u8]) {
        (self as &mut dyn plain::Plain).copy_from_bytes(b).expect("NCCH header truncated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let mut header = Header::zero();
        header.magic = MAGIC;
        header.content_size = 0x1234;
        header.partition_id = 0x0004_0000_000F_AB00;
        header.program_id = 0x0004_0000_000F_AB00;
        header.version = 2;
        header.exheader_size = EXHEADER_SIZE_FIELD;
        header.flags[FLAG_PLATFORM] = PLATFORM_OLD3DS;
        header.flags[FLAG_CONTENT_TYPE] = TYPE_EXECUTABLE;
        header.flags[FLAG_CRYPTO] = CRYPTO_NO_CRYPTO;
        header.exefs_offset = 5;
        header.exefs_size = 7;
        header.romfs_offset = 12;
        header.romfs_size = 0x800;

        let bytes = header.as_bytes().to_vec();
        assert_eq!(bytes.len(), 0x200);

        let mut reread = Header::zero();
        reread.copy_from_bytes(&bytes);
        assert_eq!(reread.as_bytes(), &bytes[..]);
        assert_eq!(reread.magic, MAGIC);
        assert_eq!(reread.romfs_size, 0x800);
    }

    #[test]
    fn zero_header_is_all_zero_bytes() {
        assert!(Header::zero().as_bytes().iter().all(|&b| b == 0));
    }
}
