use super::devices::{RamDevice, RegisterDevice, RomDevice, UnusableDevice};
use super::map::decode_memory_region;
use super::MemoryDevice;
use crate::fault::BusError;
use crate::rom::RomImage;

/// Insertion-ordered set of mapped devices. The first device claiming an
/// address serves the access.
#[derive(Debug, Default)]
pub struct Bus {
    devices: Vec<Box<dyn MemoryDevice>>,
}

const fn unmapped(addr: u16) -> BusError {
    BusError::UnmappedAddress {
        addr,
        region: decode_memory_region(addr),
    }
}

impl Bus {
    /// Creates a bus with no devices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the canonical cartridge layout: ROM, external RAM, work RAM,
    /// OAM, the unusable window, high RAM and the interrupt-enable register.
    #[must_use]
    pub fn with_dmg_layout(rom: RomImage) -> Self {
        Self::with_rom_device(RomDevice::new(rom))
    }

    /// Same layout as [`Bus::with_dmg_layout`] around an already-built ROM device.
    #[must_use]
    pub fn with_rom_device(rom: RomDevice) -> Self {
        let mut bus = Self::new();
        bus.map(rom);
        bus.map(RamDevice::external_ram());
        bus.map(RamDevice::work_ram());
        bus.map(RamDevice::oam());
        bus.map(UnusableDevice::new());
        bus.map(RamDevice::high_ram());
        bus.map(RegisterDevice::interrupt_enable());
        bus
    }

    /// Appends a device. Overlap with earlier devices is not validated.
    pub fn map<D: MemoryDevice + 'static>(&mut self, device: D) {
        self.devices.push(Box::new(device));
    }

    /// Number of mapped devices.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Reads one byte through the first claiming device.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnmappedAddress`] when no device claims `addr`.
    pub fn read_byte(&self, addr: u16) -> Result<u8, BusError> {
        self.devices
            .iter()
            .find(|device| device.contains(addr))
            .map(|device| device.read_byte(addr))
            .ok_or_else(|| unmapped(addr))
    }

    /// Writes one byte through the first claiming device.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnmappedAddress`] when no device claims `addr`, or
    /// [`BusError::ReadOnlyViolation`] when the claiming device is read-only.
    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        self.devices
            .iter_mut()
            .find(|device| device.contains(addr))
            .ok_or_else(|| unmapped(addr))?
            .write_byte(addr, value)
    }

    /// Routes once and returns an exclusive handle to the byte at `addr`.
    ///
    /// # Errors
    ///
    /// Same as [`Bus::write_byte`].
    pub fn byte_mut(&mut self, addr: u16) -> Result<&mut u8, BusError> {
        self.devices
            .iter_mut()
            .find(|device| device.contains(addr))
            .ok_or_else(|| unmapped(addr))?
            .byte_mut(addr)
    }

    /// Reads a little-endian word from `addr` and `addr + 1` (wrapping).
    ///
    /// # Errors
    ///
    /// Same as [`Bus::read_byte`] for either byte.
    pub fn read_word(&self, addr: u16) -> Result<u16, BusError> {
        let lo = self.read_byte(addr)?;
        let hi = self.read_byte(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Writes a little-endian word, low byte first.
    ///
    /// # Errors
    ///
    /// Same as [`Bus::write_byte`] for either byte.
    pub fn write_word(&mut self, addr: u16, value: u16) -> Result<(), BusError> {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo)?;
        self.write_byte(addr.wrapping_add(1), hi)
    }
}
