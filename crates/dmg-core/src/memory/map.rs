//! Fixed DMG memory-region map and decoding helpers.

use std::fmt;

/// Inclusive start address of cartridge ROM.
pub const ROM_START: u16 = 0x0000;
/// Inclusive end address of cartridge ROM.
pub const ROM_END: u16 = 0x7FFF;
/// Inclusive start address of video RAM.
pub const VRAM_START: u16 = 0x8000;
/// Inclusive end address of video RAM.
pub const VRAM_END: u16 = 0x9FFF;
/// Inclusive start address of cartridge (external) RAM.
pub const XRAM_START: u16 = 0xA000;
/// Inclusive end address of cartridge (external) RAM.
pub const XRAM_END: u16 = 0xBFFF;
/// Inclusive start address of work RAM.
pub const WRAM_START: u16 = 0xC000;
/// Inclusive end address of work RAM.
pub const WRAM_END: u16 = 0xDFFF;
/// Inclusive start address of echo RAM.
pub const ECHO_START: u16 = 0xE000;
/// Inclusive end address of echo RAM.
pub const ECHO_END: u16 = 0xFDFF;
/// Inclusive start address of object-attribute memory.
pub const OAM_START: u16 = 0xFE00;
/// Inclusive end address of object-attribute memory.
pub const OAM_END: u16 = 0xFE9F;
/// Inclusive start address of the unusable window.
pub const UNUSABLE_START: u16 = 0xFEA0;
/// Inclusive end address of the unusable window.
pub const UNUSABLE_END: u16 = 0xFEFF;
/// Inclusive start address of I/O registers.
pub const IO_START: u16 = 0xFF00;
/// Inclusive end address of I/O registers.
pub const IO_END: u16 = 0xFF7F;
/// Inclusive start address of high RAM.
pub const HRAM_START: u16 = 0xFF80;
/// Inclusive end address of high RAM.
pub const HRAM_END: u16 = 0xFFFE;
/// Address of the interrupt-enable register.
pub const IE_ADDR: u16 = 0xFFFF;

/// Canonical fixed-region descriptor for the architectural memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionDescriptor {
    /// Region classification.
    pub region: MemoryRegion,
    /// Inclusive start address.
    pub start: u16,
    /// Inclusive end address.
    pub end: u16,
}

/// Region classification for architectural addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemoryRegion {
    /// Cartridge ROM (`0x0000..=0x7FFF`).
    Rom,
    /// Video RAM (`0x8000..=0x9FFF`).
    VideoRam,
    /// Cartridge RAM (`0xA000..=0xBFFF`).
    ExternalRam,
    /// Work RAM (`0xC000..=0xDFFF`).
    WorkRam,
    /// Mirror of work RAM (`0xE000..=0xFDFF`).
    EchoRam,
    /// Object-attribute memory (`0xFE00..=0xFE9F`).
    Oam,
    /// Prohibited window (`0xFEA0..=0xFEFF`).
    Unusable,
    /// I/O registers (`0xFF00..=0xFF7F`).
    Io,
    /// High RAM (`0xFF80..=0xFFFE`).
    HighRam,
    /// Interrupt-enable register (`0xFFFF`).
    InterruptEnable,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for this region.
    #[must_use]
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::Rom => (ROM_START, ROM_END),
            Self::VideoRam => (VRAM_START, VRAM_END),
            Self::ExternalRam => (XRAM_START, XRAM_END),
            Self::WorkRam => (WRAM_START, WRAM_END),
            Self::EchoRam => (ECHO_START, ECHO_END),
            Self::Oam => (OAM_START, OAM_END),
            Self::Unusable => (UNUSABLE_START, UNUSABLE_END),
            Self::Io => (IO_START, IO_END),
            Self::HighRam => (HRAM_START, HRAM_END),
            Self::InterruptEnable => (IE_ADDR, IE_ADDR),
        }
    }

    /// Returns `true` when `addr` belongs to this region.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        let (start, end) = self.bounds();
        addr >= start && addr <= end
    }

    /// Number of addressable bytes in this region.
    #[must_use]
    pub const fn len(self) -> usize {
        let (start, end) = self.bounds();
        (end - start) as usize + 1
    }

    /// Regions always span at least one byte.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Short lower-case name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rom => "rom",
            Self::VideoRam => "vram",
            Self::ExternalRam => "xram",
            Self::WorkRam => "wram",
            Self::EchoRam => "echo",
            Self::Oam => "oam",
            Self::Unusable => "unusable",
            Self::Io => "io",
            Self::HighRam => "hram",
            Self::InterruptEnable => "ie",
        }
    }

    /// Returns the canonical descriptor for this region.
    #[must_use]
    pub const fn descriptor(self) -> RegionDescriptor {
        let (start, end) = self.bounds();
        RegionDescriptor {
            region: self,
            start,
            end,
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical fixed architectural region layout in ascending address order.
pub const FIXED_MEMORY_REGIONS: [RegionDescriptor; 10] = [
    MemoryRegion::Rom.descriptor(),
    MemoryRegion::VideoRam.descriptor(),
    MemoryRegion::ExternalRam.descriptor(),
    MemoryRegion::WorkRam.descriptor(),
    MemoryRegion::EchoRam.descriptor(),
    MemoryRegion::Oam.descriptor(),
    MemoryRegion::Unusable.descriptor(),
    MemoryRegion::Io.descriptor(),
    MemoryRegion::HighRam.descriptor(),
    MemoryRegion::InterruptEnable.descriptor(),
];

const _: () = assert_fixed_region_layout();

const fn assert_fixed_region_layout() {
    let mut index = 0;
    while index < FIXED_MEMORY_REGIONS.len() {
        let descriptor = FIXED_MEMORY_REGIONS[index];
        assert!(
            descriptor.start <= descriptor.end,
            "region start cannot be greater than end"
        );

        if index > 0 {
            let previous = FIXED_MEMORY_REGIONS[index - 1];
            assert!(
                previous.end.wrapping_add(1) == descriptor.start,
                "fixed regions must be contiguous"
            );
        }

        index += 1;
    }

    assert!(
        FIXED_MEMORY_REGIONS[0].start == 0x0000 && FIXED_MEMORY_REGIONS[9].end == u16::MAX,
        "fixed regions must cover full address space"
    );
}

/// Decodes a 16-bit address into its fixed memory region.
#[must_use]
pub const fn decode_memory_region(addr: u16) -> MemoryRegion {
    match addr {
        ROM_START..=ROM_END => MemoryRegion::Rom,
        VRAM_START..=VRAM_END => MemoryRegion::VideoRam,
        XRAM_START..=XRAM_END => MemoryRegion::ExternalRam,
        WRAM_START..=WRAM_END => MemoryRegion::WorkRam,
        ECHO_START..=ECHO_END => MemoryRegion::EchoRam,
        OAM_START..=OAM_END => MemoryRegion::Oam,
        UNUSABLE_START..=UNUSABLE_END => MemoryRegion::Unusable,
        IO_START..=IO_END => MemoryRegion::Io,
        HRAM_START..=HRAM_END => MemoryRegion::HighRam,
        IE_ADDR => MemoryRegion::InterruptEnable,
    }
}
