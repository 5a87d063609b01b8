//! Host-side implementations of the engine's environment capabilities,
//! backed by a directory of previously extracted content blobs and a region
//! table built from user-supplied sizes.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use recxi_synth::align::round_up_to_page;
use recxi_synth::{ContentKind, ContentSource, LayoutConfig, RegionSizeProbe};

pub struct DirContentSource {
    root: PathBuf,
}

impl DirContentSource {
    pub fn new(root: &Path) -> DirContentSource {
        DirContentSource { root: root.to_path_buf() }
    }

    fn blob_file(name: &str) -> Option<&'static str> {
        match name {
            ".code" => Some("code.bin"),
            "banner" => Some("banner.bin"),
            "icon" => Some("icon.bin"),
            "logo" => Some("logo.bin"),
            _ => None,
        }
    }
}

impl ContentSource for DirContentSource {
    fn fetch(&mut self, _kind: ContentKind, name: &str) -> Option<Vec<u8>> {
        let file = Self::blob_file(name)?;
        fs::read(self.root.join(file)).ok()
    }

    fn open_partition(&mut self) -> Option<(Box<dyn Read + '_>, u64)> {
        let file = File::open(self.root.join("romfs.bin")).ok()?;
        let size = file.metadata().ok()?.len();
        Some((Box::new(file), size))
    }
}

/// Answers region-size queries from a fixed table laid out back to back the
/// way a running title's code regions are.
pub struct StaticProbe {
    regions: Vec<(u32, u32)>,
}

impl StaticProbe {
    pub fn from_layout(
        cfg: &LayoutConfig,
        text_size: u32,
        ro_size: u32,
        data_and_bss_size: u32,
        stack_size: u32,
    ) -> StaticProbe {
        let mut regions = Vec::new();
        let mut addr = cfg.text_base;
        for &size in &[text_size, ro_size, data_and_bss_size] {
            if size != 0 {
                regions.push((addr, size));
            }
            addr = addr.wrapping_add(round_up_to_page(size, cfg.page_size));
        }
        if stack_size != 0 {
            let stack_top = cfg.stack_probe.wrapping_add(4);
            regions.push((stack_top.wrapping_sub(stack_size), stack_size));
        }
        StaticProbe { regions }
    }
}

impl RegionSizeProbe for StaticProbe {
    fn region_size(&self, addr: u32) -> u32 {
        for &(start, size) in &self.regions {
            if addr >= start && u64::from(addr) < u64::from(start) + u64::from(size) {
                return size;
            }
        }
        0
    }
}
