//! Container assembly: reserve headers, stream the payload regions, then
//! backpatch the headers with the final geometry.

use std::io::{Seek, SeekFrom, Write};
use std::mem;

use recxi_formats::{exheader, ncch};

use crate::align::MEDIA_UNIT;
use crate::error::{DumpError, InconsistentGeometry};
use crate::exefs::write_exefs;
use crate::exheader::{synthesize, LayoutConfig};
use crate::romfs::write_romfs;
use crate::source::{ContentKind, ContentSource, RegionSizeProbe};
use crate::write::{pad_to_media_unit, Reservation};

/// A written payload region, in bytes relative to the container base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: u64,
    pub size: u64,
}

impl Region {
    fn offset_in_media_units(&self) -> u32 {
        (self.offset / u64::from(MEDIA_UNIT)) as u32
    }

    fn size_in_media_units(&self) -> u32 {
        (self.size / u64::from(MEDIA_UNIT)) as u32
    }
}

#[derive(Debug)]
pub struct DumpReport {
    /// True only when every payload region was written in full. The headers
    /// are finalized either way, so check this rather than the output file.
    pub success: bool,
    pub exefs: Option<Region>,
    pub romfs: Option<Region>,
    pub decompressed_code_size: u32,
    pub geometry: Option<InconsistentGeometry>,
    pub failure: Option<DumpError>,
}

/// Writes a complete container at the stream's current position.
///
/// Content-side failures abandon the remaining payload phases but still
/// finalize both headers, leaving the failed regions' header fields zeroed;
/// only sink failures abort the run itself.
pub fn dump_container<W: Write + Seek>(
    out: &mut W,
    source: &mut dyn ContentSource,
    probe: &dyn RegionSizeProbe,
    cfg: &LayoutConfig,
    title_id: u64,
) -> Result<DumpReport, DumpError> {
    let base = out.seek(SeekFrom::Current(0))?;

    let ncch_reservation = Reservation::reserve(out, mem::size_of::<ncch::Header>())?;
    let exheader_reservation = Reservation::reserve(out, mem::size_of::<exheader::ExHeader>())?;
    let mut cursor = relative_position(out, base)?;
    cursor = pad_to_media_unit(out, cursor)?;

    let mut failure = None;
    let mut exefs_region = None;
    let mut decompressed_code_size = 0;

    let exefs_start = cursor;
    match write_exefs(out, source) {
        Ok(size) => {
            decompressed_code_size = size;
            let written = relative_position(out, base)? - exefs_start;
            let padded = pad_to_media_unit(out, written)?;
            cursor = exefs_start + padded;
            exefs_region = Some(Region { offset: exefs_start, size: padded });
        }
        Err(err) => {
            let written = relative_position(out, base)? - exefs_start;
            cursor = exefs_start + pad_to_media_unit(out, written)?;
            failure = Some(err);
        }
    }

    let mut romfs_region = None;
    if failure.is_none() {
        let romfs_start = cursor;
        match source.open_partition() {
            Some((mut reader, size)) => match write_romfs(out, &mut *reader, size) {
                Ok(written) => {
                    let padded = pad_to_media_unit(out, written)?;
                    cursor = romfs_start + padded;
                    romfs_region = Some(Region { offset: romfs_start, size: padded });
                }
                Err(err) => {
                    let written = relative_position(out, base)? - romfs_start;
                    cursor = romfs_start + pad_to_media_unit(out, written)?;
                    failure = Some(err);
                }
            },
            None => {
                failure = Some(DumpError::ContentUnavailable {
                    kind: ContentKind::RomFs,
                    name: "romfs",
                })
            }
        }
    }

    let synthesized = synthesize(probe, cfg, title_id, decompressed_code_size);
    exheader_reservation.fill(out, synthesized.header.as_bytes())?;

    let mut header = ncch::Header::zero();
    header.magic = ncch::MAGIC;
    header.content_size = (cursor / u64::from(MEDIA_UNIT)) as u32;
    header.partition_id = title_id;
    header.program_id = title_id;
    header.version = 2;
    header.exheader_size = ncch::EXHEADER_SIZE_FIELD;
    header.flags[ncch::FLAG_PLATFORM] = ncch::PLATFORM_OLD3DS;
    header.flags[ncch::FLAG_CONTENT_TYPE] = ncch::TYPE_EXECUTABLE;
    header.flags[ncch::FLAG_UNIT_SIZE] = 0;
    // the payload is written in the clear
    header.flags[ncch::FLAG_CRYPTO] = ncch::CRYPTO_NO_CRYPTO;
    if let Some(region) = exefs_region {
        header.exefs_offset = region.offset_in_media_units();
        header.exefs_size = region.size_in_media_units();
    }
    if let Some(region) = romfs_region {
        header.romfs_offset = region.offset_in_media_units();
        header.romfs_size = region.size_in_media_units();
    }
    ncch_reservation.fill(out, header.as_bytes())?;

    Ok(DumpReport {
        success: failure.is_none(),
        exefs: exefs_region,
        romfs: romfs_region,
        decompressed_code_size,
        geometry: synthesized.geometry,
        failure,
    })
}

fn relative_position<W: Seek>(out: &mut W, base: u64) -> std::io::Result<u64> {
    Ok(out.seek(SeekFrom::Current(0))? - base)
}
