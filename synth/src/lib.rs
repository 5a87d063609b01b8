//! Rebuilds an unencrypted NCCH container from content streams pulled out of
//! a running title, when no complete source image is available to copy.
//!
//! The engine only consumes the narrow capabilities in [`source`]; how the
//! bytes are actually acquired (FS archive reads, address-space queries) is
//! the caller's concern.

pub mod align;
pub mod container;
pub mod error;
pub mod exefs;
pub mod exheader;
pub mod romfs;
pub mod source;

mod write;

pub use crate::container::{dump_container, DumpReport, Region};
pub use crate::error::{DumpError, InconsistentGeometry};
pub use crate::exheader::LayoutConfig;
pub use crate::source::{ContentKind, ContentSource, RegionSizeProbe};
