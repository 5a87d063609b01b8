//! Placeholder-then-backpatch primitives shared by the region writers.

use std::io::{self, Seek, SeekFrom, Write};

use crate::align::MEDIA_UNIT;

/// A zero-filled byte range whose real contents are only known after later
/// regions have been written. `fill` resolves it in place and restores the
/// stream position.
pub struct Reservation {
    pos: u64,
    len: usize,
}

impl Reservation {
    pub fn reserve<W: Write + Seek>(out: &mut W, len: usize) -> io::Result<Reservation> {
        let pos = out.seek(SeekFrom::Current(0))?;
        write_zeros(out, len as u64)?;
        Ok(Reservation { pos, len })
    }

    pub fn fill<W: Write + Seek>(self, out: &mut W, bytes: &[u8]) -> io::Result<()> {
        assert_eq!(bytes.len(), self.len, "reservation filled with a different size");
        let end = out.seek(SeekFrom::Current(0))?;
        out.seek(SeekFrom::Start(self.pos))?;
        out.write_all(bytes)?;
        out.seek(SeekFrom::Start(end))?;
        Ok(())
    }
}

pub fn write_zeros<W: Write>(out: &mut W, mut len: u64) -> io::Result<()> {
    const ZEROS: [u8; MEDIA_UNIT as usize] = [0; MEDIA_UNIT as usize];
    while len > 0 {
        let n = len.min(ZEROS.len() as u64) as usize;
        out.write_all(&ZEROS[..n])?;
        len -= n as u64;
    }
    Ok(())
}

/// Zero-pads a region of `len` bytes out to the next media unit and returns
/// the padded length.
pub fn pad_to_media_unit<W: Write>(out: &mut W, len: u64) -> io::Result<u64> {
    let unit = u64::from(MEDIA_UNIT);
    let padded = len.checked_add(unit - 1).expect("region length overflow") & !(unit - 1);
    write_zeros(out, padded - len)?;
    Ok(padded)
}
