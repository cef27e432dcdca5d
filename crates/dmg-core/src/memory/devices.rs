use super::map::{
    decode_memory_region, MemoryRegion, HRAM_END, HRAM_START, IE_ADDR, OAM_END, OAM_START,
    ROM_END, ROM_START, UNUSABLE_END, UNUSABLE_START, WRAM_END, WRAM_START, XRAM_END, XRAM_START,
};
use super::MemoryDevice;
use crate::fault::BusError;
use crate::rom::RomImage;

/// Value observed when reading ROM addresses the image does not back.
pub const OPEN_BUS: u8 = 0xFF;

/// Read-only cartridge ROM mapped at `0x0000..=0x7FFF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomDevice {
    data: Box<[u8]>,
    title: String,
}

impl RomDevice {
    /// Wraps a validated ROM image.
    #[must_use]
    pub fn new(image: RomImage) -> Self {
        let title = image.title().to_owned();
        Self {
            data: image.into_bytes().into_boxed_slice(),
            title,
        }
    }

    /// Wraps raw bytes without header validation.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
            title: String::new(),
        }
    }

    /// Cartridge title from the header, empty for unvalidated images.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl MemoryDevice for RomDevice {
    fn contains(&self, addr: u16) -> bool {
        (ROM_START..=ROM_END).contains(&addr)
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.data.get(usize::from(addr)).copied().unwrap_or(OPEN_BUS)
    }

    fn write_byte(&mut self, addr: u16, _value: u8) -> Result<(), BusError> {
        Err(BusError::ReadOnlyViolation { addr })
    }

    fn byte_mut(&mut self, addr: u16) -> Result<&mut u8, BusError> {
        Err(BusError::ReadOnlyViolation { addr })
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

/// Zero-initialized read/write window over an inclusive address range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamDevice {
    start: u16,
    end: u16,
    data: Box<[u8]>,
}

impl RamDevice {
    /// Creates a RAM window over `start..=end`.
    #[must_use]
    pub fn new(start: u16, end: u16) -> Self {
        let len = usize::from(end.saturating_sub(start)) + 1;
        Self {
            start,
            end,
            data: vec![0; len].into_boxed_slice(),
        }
    }

    /// Cartridge RAM at `0xA000..=0xBFFF`.
    #[must_use]
    pub fn external_ram() -> Self {
        Self::new(XRAM_START, XRAM_END)
    }

    /// Work RAM at `0xC000..=0xDFFF`.
    #[must_use]
    pub fn work_ram() -> Self {
        Self::new(WRAM_START, WRAM_END)
    }

    /// Object-attribute memory at `0xFE00..=0xFE9F`.
    #[must_use]
    pub fn oam() -> Self {
        Self::new(OAM_START, OAM_END)
    }

    /// High RAM at `0xFF80..=0xFFFE`.
    #[must_use]
    pub fn high_ram() -> Self {
        Self::new(HRAM_START, HRAM_END)
    }

    /// Inclusive bounds of this window.
    #[must_use]
    pub const fn bounds(&self) -> (u16, u16) {
        (self.start, self.end)
    }

    fn slot(&mut self, addr: u16) -> Result<&mut u8, BusError> {
        let index = usize::from(addr.wrapping_sub(self.start));
        self.data.get_mut(index).ok_or(BusError::UnmappedAddress {
            addr,
            region: decode_memory_region(addr),
        })
    }
}

impl MemoryDevice for RamDevice {
    fn contains(&self, addr: u16) -> bool {
        (self.start..=self.end).contains(&addr)
    }

    fn read_byte(&self, addr: u16) -> u8 {
        let index = usize::from(addr.wrapping_sub(self.start));
        self.data.get(index).copied().unwrap_or(OPEN_BUS)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        *self.slot(addr)? = value;
        Ok(())
    }

    fn byte_mut(&mut self, addr: u16) -> Result<&mut u8, BusError> {
        self.slot(addr)
    }
}

/// The prohibited `0xFEA0..=0xFEFF` window.
///
/// Reads always return zero. Writes land in a shadow buffer that has no
/// visible effect on reads and exists only for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusableDevice {
    shadow: Box<[u8]>,
}

impl Default for UnusableDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl UnusableDevice {
    /// Creates the unusable window with a zeroed shadow buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shadow: vec![0; MemoryRegion::Unusable.len()].into_boxed_slice(),
        }
    }

    /// Bytes written so far, indexed from `0xFEA0`.
    #[must_use]
    pub fn shadow(&self) -> &[u8] {
        &self.shadow
    }

    fn slot(&mut self, addr: u16) -> Result<&mut u8, BusError> {
        let index = usize::from(addr.wrapping_sub(UNUSABLE_START));
        self.shadow.get_mut(index).ok_or(BusError::UnmappedAddress {
            addr,
            region: decode_memory_region(addr),
        })
    }
}

impl MemoryDevice for UnusableDevice {
    fn contains(&self, addr: u16) -> bool {
        (UNUSABLE_START..=UNUSABLE_END).contains(&addr)
    }

    fn read_byte(&self, _addr: u16) -> u8 {
        0
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        *self.slot(addr)? = value;
        Ok(())
    }

    fn byte_mut(&mut self, addr: u16) -> Result<&mut u8, BusError> {
        self.slot(addr)
    }
}

/// Single addressable byte, such as the interrupt-enable register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDevice {
    addr: u16,
    value: u8,
}

impl RegisterDevice {
    /// Creates a zeroed register at `addr`.
    #[must_use]
    pub const fn new(addr: u16) -> Self {
        Self { addr, value: 0 }
    }

    /// The interrupt-enable register at `0xFFFF`.
    #[must_use]
    pub const fn interrupt_enable() -> Self {
        Self::new(IE_ADDR)
    }

    /// Current register value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }
}

impl MemoryDevice for RegisterDevice {
    fn contains(&self, addr: u16) -> bool {
        addr == self.addr
    }

    fn read_byte(&self, _addr: u16) -> u8 {
        self.value
    }

    fn write_byte(&mut self, _addr: u16, value: u8) -> Result<(), BusError> {
        self.value = value;
        Ok(())
    }

    fn byte_mut(&mut self, _addr: u16) -> Result<&mut u8, BusError> {
        Ok(&mut self.value)
    }
}
