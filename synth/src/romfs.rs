//! RomFS region writer: fixed framing followed by a chunked verbatim copy of
//! the data partition.

use std::io::{Read, Write};

use recxi_formats::romfs;

use crate::error::DumpError;
use crate::write::write_zeros;

const CHUNK_SIZE: usize = 0x10_0000;

/// Copies `size` partition bytes behind the IVFC framing and returns the
/// full region length. Bytes already flushed stay in place on failure.
pub fn write_romfs<W: Write>(
    out: &mut W,
    reader: &mut dyn Read,
    size: u64,
) -> Result<u64, DumpError> {
    out.write_all(&romfs::MAGIC)?;
    write_zeros(out, romfs::INFO_BLOCK_SIZE as u64)?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut offset = 0u64;
    while offset < size {
        let want = (size - offset).min(CHUNK_SIZE as u64) as usize;
        let got = match reader.read(&mut buf[..want]) {
            Ok(0) => return Err(DumpError::StalledSource { offset }),
            Ok(n) => n,
            Err(_) => {
                return Err(DumpError::TruncatedRead {
                    name: "romfs",
                    got: offset,
                    expected: size,
                })
            }
        };
        out.write_all(&buf[..got])?;
        offset += got as u64;
    }

    Ok(romfs::PREAMBLE_SIZE as u64 + size)
}
