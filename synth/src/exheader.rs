//! Extended header synthesis.
//!
//! The authentic extended header is never readable, so the code geometry is
//! reconstructed from address-space region sizes and the decompressed code
//! size recovered by the ExeFS writer. Everything that cannot be derived is
//! filled with documented defaults and the result is best-effort by design.

use recxi_formats::exheader::{ExHeader, Segment};

use crate::align::pages;
use crate::error::InconsistentGeometry;
use crate::source::RegionSizeProbe;

/// Syscall-mask kernel descriptor: bits 31..27 are the type pattern, bits
/// 26..24 the table index, bits 23..0 the mask.
const SVC_MASK_BASE: u32 = 0b11110 << 27;
const SVC_MASK_ALL: u32 = 0x00FF_FFFF;
const SVC_MASK_TABLES: usize = 8;

/// Kernel descriptor slot with no meaning.
const DESCRIPTOR_UNUSED: u32 = 0xFFFF_FFFF;

/// Address-space constants the probe walk starts from. Explicit so tests can
/// pair them with synthetic probes.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Where application text is mapped.
    pub text_base: u32,
    /// An address inside the main thread's stack region.
    pub stack_probe: u32,
    pub page_size: u32,
}

impl Default for LayoutConfig {
    fn default() -> LayoutConfig {
        LayoutConfig {
            text_base: 0x0010_0000,
            stack_probe: 0x0FFF_FFFC,
            page_size: 0x1000,
        }
    }
}

pub struct Synthesized {
    pub header: ExHeader,
    /// Present when the geometry heuristic contradicted itself; the header
    /// fields are still populated, saturated at zero where the arithmetic
    /// went negative.
    pub geometry: Option<InconsistentGeometry>,
}

/// Derives a plausible extended header. Never fails outright; a broken
/// layout assumption is reported through `Synthesized::geometry`.
pub fn synthesize(
    probe: &dyn RegionSizeProbe,
    cfg: &LayoutConfig,
    title_id: u64,
    decompressed_code_size: u32,
) -> Synthesized {
    let page = cfg.page_size;

    let text_addr = cfg.text_base;
    let text_size = probe.region_size(text_addr);
    let text_pages = pages(text_size, page);

    // ro and data are assumed to be mapped back to back after text. That
    // holds for the regular application layout but is not verifiable from
    // here; the bss subtraction below is the canary.
    let ro_addr = text_addr.wrapping_add(text_pages.wrapping_mul(page));
    let ro_size = probe.region_size(ro_addr);
    let ro_pages = pages(ro_size, page);

    let data_addr = ro_addr.wrapping_add(ro_pages.wrapping_mul(page));
    let data_and_bss_size = probe.region_size(data_addr);

    let mapped = u64::from(text_size) + u64::from(ro_size) + u64::from(data_and_bss_size);

    let warning = InconsistentGeometry {
        mapped,
        decompressed: decompressed_code_size,
    };

    let mut geometry = None;
    let bss_size = match mapped.checked_sub(u64::from(decompressed_code_size)) {
        Some(v) => v as u32,
        None => {
            geometry = Some(warning);
            0
        }
    };
    let data_size = match data_and_bss_size.checked_sub(bss_size) {
        Some(v) => v,
        None => {
            geometry = Some(warning);
            0
        }
    };

    let stack_size = probe.region_size(cfg.stack_probe);

    let mut header = ExHeader::zero();

    let codeset = &mut header.codeset;
    codeset.text = Segment { address: text_addr, pages: text_pages, size: text_size };
    codeset.ro = Segment { address: ro_addr, pages: ro_pages, size: ro_size };
    codeset.data = Segment { address: data_addr, pages: pages(data_size, page), size: data_size };
    codeset.bss_size = bss_size;
    codeset.stack_size = stack_size;

    let caps = &mut header.local_caps;
    caps.program_id = title_id;
    caps.resource_limits = [[0xFF; 2]; 16];
    caps.service_access = [[0xFF; 8]; 32];
    caps.extended_service_access = [[0xFF; 8]; 2];

    // Grant every syscall rather than guessing at the real grants; a dump
    // that launches beats one that matches the original's scoping.
    for (i, descriptor) in header.kernel_caps.descriptors.iter_mut().enumerate() {
        *descriptor = if i < SVC_MASK_TABLES {
            SVC_MASK_BASE | ((i as u32) << 24) | SVC_MASK_ALL
        } else {
            DESCRIPTOR_UNUSED
        };
    }

    // dependencies, system info and the signed access descriptor mirror stay
    // zero: nothing observable to reconstruct them from.

    Synthesized { header, geometry }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Replays region sizes in query order: text, ro, data+bss, stack.
    struct SequenceProbe(RefCell<VecDeque<u32>>);

    impl SequenceProbe {
        fn new(sizes: &[u32]) -> SequenceProbe {
            SequenceProbe(RefCell::new(sizes.iter().copied().collect()))
        }
    }

    impl RegionSizeProbe for SequenceProbe {
        fn region_size(&self, _addr: u32) -> u32 {
            self.0.borrow_mut().pop_front().unwrap_or(0)
        }
    }

    const TITLE_ID: u64 = 0x0004_0000_000F_AB00;

    #[test]
    fn derives_contiguous_geometry() {
        let probe = SequenceProbe::new(&[0x3400, 0x800, 0x2200, 0x8000]);
        let cfg = LayoutConfig::default();

        // 0x3400 + 0x800 + 0x2200 - 0x5A00 = 0x400 of bss
        let out = synthesize(&probe, &cfg, TITLE_ID, 0x5A00);
        assert!(out.geometry.is_none());

        let cs = &out.header.codeset;
        assert_eq!(cs.text.address, 0x0010_0000);
        assert_eq!(cs.text.size, 0x3400);
        assert_eq!(cs.text.pages, 4);
        assert_eq!(cs.ro.address, 0x0010_4000);
        assert_eq!(cs.ro.size, 0x800);
        assert_eq!(cs.ro.pages, 1);
        assert_eq!(cs.data.address, 0x0010_5000);
        assert_eq!(cs.data.size, 0x2200 - 0x400);
        assert_eq!(cs.data.pages, 2);
        assert_eq!(cs.bss_size, 0x400);
        assert_eq!(cs.stack_size, 0x8000);
    }

    #[test]
    fn negative_data_size_raises_inconsistent_geometry() {
        let probe = SequenceProbe::new(&[4096, 0, 8192, 0x4000]);
        let cfg = LayoutConfig::default();

        // bss = 4096 + 0 + 8192 - 1000 = 11288, which exceeds the 8192 bytes
        // actually mapped at the data address
        let out = synthesize(&probe, &cfg, TITLE_ID, 1000);
        let warning = out.geometry.expect("geometry must be flagged");
        assert_eq!(warning.mapped, 4096 + 8192);
        assert_eq!(warning.decompressed, 1000);
        assert_eq!(out.header.codeset.data.size, 0);
        assert_eq!(out.header.codeset.bss_size, 4096 + 8192 - 1000);
    }

    #[test]
    fn negative_bss_raises_inconsistent_geometry() {
        let probe = SequenceProbe::new(&[0x1000, 0x1000, 0x1000, 0]);
        let cfg = LayoutConfig::default();

        let out = synthesize(&probe, &cfg, TITLE_ID, 0x4000);
        let warning = out.geometry.expect("geometry must be flagged");
        assert_eq!(warning.mapped, 0x3000);
        assert_eq!(out.header.codeset.bss_size, 0);
    }

    #[test]
    fn capability_defaults_are_permissive() {
        let probe = SequenceProbe::new(&[0x1000, 0x1000, 0x1000, 0x2000]);
        let out = synthesize(&probe, &LayoutConfig::default(), TITLE_ID, 0x2800);

        let caps = &out.header.local_caps;
        assert_eq!(caps.program_id, TITLE_ID);
        assert!(caps.resource_limits.iter().all(|s| *s == [0xFF; 2]));
        assert!(caps.service_access.iter().all(|s| *s == [0xFF; 8]));

        let descriptors = &out.header.kernel_caps.descriptors;
        assert_eq!(descriptors[0], 0xF0FF_FFFF);
        assert_eq!(descriptors[7], 0xF7FF_FFFF);
        assert!(descriptors[8..].iter().all(|&d| d == 0xFFFF_FFFF));

        // the signed mirror must stay zero
        let bytes = out.header.as_bytes();
        assert!(bytes[0x400..].iter().all(|&b| b == 0));
    }
}
