//! Extended header: code set geometry plus ARM11/ARM9 access control, with
//! the trailing access-descriptor mirror.

#[repr(C)]
pub struct ExHeader {
    pub codeset: CodeSetInfo,
    pub dependencies: [[u8; 8]; 48],
    pub system_info: SystemInfo,
    pub local_caps: Arm11LocalCaps,
    pub kernel_caps: Arm11KernelCaps,
    pub arm9_control: Arm9AccessControl,
    pub access_desc: AccessDescriptor,
}

unsafe impl plain::Plain for ExHeader {}

static_assertions::const_assert!(exheader_size; std::mem::size_of::<ExHeader>() == 0x800);

impl ExHeader {
    pub fn zero() -> ExHeader {
        unsafe { std::mem::zeroed() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe { plain::as_bytes(self) }
    }

    pub fn copy_from_bytes(&mut self, b: &[u8]) {
        (self as &mut dyn plain::Plain).copy_from_bytes(b).expect("ExHeader truncated");
    }
}

/// One of the three mapped code segments.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Segment {
    pub address: u32,
    pub pages: u32,
    pub size: u32,
}

#[repr(C)]
pub struct CodeSetInfo {
    pub name: [u8; 8],
    _0: [u8; 5],
    pub flag: u8,
    pub remaster_version: u16,
    pub text: Segment,
    pub stack_size: u32,
    pub ro: Segment,
    _1: [u8; 4],
    pub data: Segment,
    pub bss_size: u32,
}

static_assertions::const_assert!(codeset_info_size; std::mem::size_of::<CodeSetInfo>() == 0x40);

#[repr(C)]
pub struct SystemInfo {
    pub savedata_size: u64,
    pub jump_id: u64,
    _0: [u8; 0x30],
}

#[repr(C)]
pub struct Arm11LocalCaps {
    pub program_id: u64,
    pub core_version: u32,
    pub flag1: u8,
    pub flag2: u8,
    pub flag0: u8,
    pub priority: u8,
    pub resource_limits: [[u8; 2]; 16],
    pub storage_info: StorageInfo,
    pub service_access: [[u8; 8]; 32],
    pub extended_service_access: [[u8; 8]; 2],
    _0: [u8; 0xF],
    pub resource_limit_category: u8,
}

static_assertions::const_assert!(arm11_local_caps_size; std::mem::size_of::<Arm11LocalCaps>() == 0x170);

#[repr(C)]
pub struct StorageInfo {
    pub extdata_id: u64,
    pub system_savedata_id: u64,
    pub storage_accessible_unique_id: u64,
    pub flags: u64,
}

#[repr(C)]
pub struct Arm11KernelCaps {
    pub descriptors: [u32; 28],
    _0: [u8; 0x10],
}

#[repr(C)]
pub struct Arm9AccessControl {
    pub descriptors: [u8; 15],
    pub descriptor_version: u8,
}

/// Signed mirror of the access control info. A synthesized header leaves the
/// whole block zero; it is not a valid signed descriptor.
#[repr(C)]
pub struct AccessDescriptor {
    pub signature: [u8; 0x100],
    pub public_key_modulus: [u8; 0x100],
    pub local_caps: Arm11LocalCaps,
    pub kernel_caps: Arm11KernelCaps,
    pub arm9_control: Arm9AccessControl,
}

static_assertions::const_assert!(access_descriptor_size; std::mem::size_of::<AccessDescriptor>() == 0x400);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let mut header = ExHeader::zero();
        header.codeset.text = Segment { address: 0x0010_0000, pages: 4, size: 0x3400 };
        header.codeset.ro = Segment { address: 0x0010_4000, pages: 1, size: 0x800 };
        header.codeset.data = Segment { address: 0x0010_5000, pages: 2, size: 0x1200 };
        header.codeset.bss_size = 0x300;
        header.codeset.stack_size = 0x4000;
        header.local_caps.program_id = 0x0004_0000_000F_AB00;
        header.kernel_caps.descriptors[0] = 0xF0FF_FFFF;

        let bytes = header.as_bytes().to_vec();
        assert_eq!(bytes.len(), 0x800);

        let mut reread = ExHeader::zero();
        reread.copy_from_bytes(&bytes);
        assert_eq!(reread.as_bytes(), &bytes[..]);
        assert_eq!(reread.codeset.data.size, 0x1200);
        assert_eq!(reread.local_caps.program_id, 0x0004_0000_000F_AB00);
    }

    #[test]
    fn segment_fields_sit_at_fixed_offsets() {
        let mut header = ExHeader::zero();
        header.codeset.text.address = 0x0010_0000;
        header.codeset.stack_size = 0x4000;
        header.local_caps.program_id = 0x1122_3344_5566_7788;

        let bytes = header.as_bytes();
        // text address at 0x10, stack size at 0x1C, ARM11 caps at 0x200
        assert_eq!(&bytes[0x10..0x14], &[0x00, 0x00, 0x10, 0x00]);
        assert_eq!(&bytes[0x1C..0x20], &[0x00, 0x40, 0x00, 0x00]);
        assert_eq!(
            &bytes[0x200..0x208],
            &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
        );
    }
}
