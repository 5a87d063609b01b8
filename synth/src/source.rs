//! Capabilities the engine needs from its environment.

use std::io::Read;

/// Content-type discriminator used by the acquisition side when addressing a
/// title's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    RomFs = 0,
    ExeFs = 2,
}

pub trait ContentSource {
    /// Raw bytes of the named content item, or `None` when it cannot be
    /// read. Callers do not retry.
    fn fetch(&mut self, kind: ContentKind, name: &str) -> Option<Vec<u8>>;

    /// The data partition as a byte stream with its size known up front.
    fn open_partition(&mut self) -> Option<(Box<dyn Read + '_>, u64)>;
}

pub trait RegionSizeProbe {
    /// Size of the mapped address-space region containing `addr`, or 0 when
    /// nothing is mapped there.
    fn region_size(&self, addr: u32) -> u32;
}
