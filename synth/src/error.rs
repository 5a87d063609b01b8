use std::io;

use thiserror::Error;

use crate::source::ContentKind;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("content {kind:?}/{name} is missing or empty")]
    ContentUnavailable { kind: ContentKind, name: &'static str },
    #[error("short read of {name}: got {got} bytes, expected {expected}")]
    TruncatedRead { name: &'static str, got: u64, expected: u64 },
    #[error("output write failed: {0}")]
    Sink(#[from] io::Error),
    #[error("content source stalled at offset {offset:#x}")]
    StalledSource { offset: u64 },
}

/// Non-fatal: the back-to-back text/ro/data layout assumption did not hold
/// for this title, so the derived bss and data sizes are unreliable. The
/// header is still written; the run is tagged low-confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "inconsistent code geometry: {mapped:#x} mapped bytes vs {decompressed:#x} bytes of decompressed code"
)]
pub struct InconsistentGeometry {
    /// Total bytes reported across the text, ro and data+bss regions.
    pub mapped: u64,
    pub decompressed: u32,
}
