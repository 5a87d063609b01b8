//! ExeFS region writer.

use std::io::{Seek, Write};
use std::mem;

use byteorder::{ByteOrder, LE};

use recxi_formats::exefs;

use crate::error::DumpError;
use crate::source::{ContentKind, ContentSource};
use crate::write::{pad_to_media_unit, Reservation};

/// Section names in write order. The remaining four directory slots stay
/// zero.
pub const SECTION_NAMES: [&str; 4] = [".code", "banner", "icon", "logo"];

/// Writes a complete ExeFS region at the stream's current position and
/// returns the decompressed size of `.code`.
///
/// The stored `.code` image stays compressed; its true size is recovered
/// from the trailing size-delta word so the extended header can be derived
/// later. On any missing section the region is abandoned as written so far,
/// with the directory header left zeroed.
pub fn write_exefs<W: Write + Seek>(
    out: &mut W,
    source: &mut dyn ContentSource,
) -> Result<u32, DumpError> {
    let reservation = Reservation::reserve(out, mem::size_of::<exefs::Header>())?;

    let mut header = exefs::Header::zero();
    let mut cursor = 0u32; // next section start, relative to the header end
    let mut decompressed_code_size = 0u32;

    for (slot, &name) in SECTION_NAMES.iter().enumerate() {
        let contents = match source.fetch(ContentKind::ExeFs, name) {
            Some(c) if !c.is_empty() => c,
            _ => return Err(DumpError::ContentUnavailable { kind: ContentKind::ExeFs, name }),
        };
        let size = contents.len() as u32;

        if slot == 0 {
            if contents.len() < 4 {
                return Err(DumpError::TruncatedRead {
                    name,
                    got: contents.len() as u64,
                    expected: 4,
                });
            }
            // The last word of the stored image is the byte count the
            // in-place decompressor grows it by.
            let delta = LE::read_u32(&contents[contents.len() - 4..]);
            decompressed_code_size = size.wrapping_add(delta);
        }

        out.write_all(&contents)?;
        let padded = pad_to_media_unit(out, u64::from(size))? as u32;

        header.sections[slot] = exefs::SectionHeader::new(name, cursor, size);
        cursor += padded;
    }

    // TODO: compute the per-section hashes; the slots stay zero for now.
    reservation.fill(out, header.as_bytes())?;

    Ok(decompressed_code_size)
}
