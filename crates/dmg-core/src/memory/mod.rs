//! Memory model: fixed region map, device contract, concrete devices and bus.

use std::fmt;

use crate::fault::BusError;

/// Address routing across mapped devices.
pub mod bus;
/// Concrete ROM, RAM, unusable-window and register devices.
pub mod devices;
/// Fixed memory-region map and address decoder.
pub mod map;

pub use bus::Bus;
pub use devices::{RamDevice, RegisterDevice, RomDevice, UnusableDevice, OPEN_BUS};
pub use map::{
    decode_memory_region, MemoryRegion, RegionDescriptor, ECHO_END, ECHO_START,
    FIXED_MEMORY_REGIONS, HRAM_END, HRAM_START, IE_ADDR, IO_END, IO_START, OAM_END, OAM_START,
    ROM_END, ROM_START, UNUSABLE_END, UNUSABLE_START, VRAM_END, VRAM_START, WRAM_END, WRAM_START,
    XRAM_END, XRAM_START,
};

/// Capability contract implemented by every addressable component.
///
/// Callers only pass addresses for which [`MemoryDevice::contains`] returned
/// `true`. Devices never overlap on a well-formed bus; the bus does not check.
pub trait MemoryDevice: fmt::Debug {
    /// Returns `true` when this device claims `addr`.
    fn contains(&self, addr: u16) -> bool;

    /// Reads the byte at `addr`.
    fn read_byte(&self, addr: u16) -> u8;

    /// Writes `value` at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ReadOnlyViolation`] when the device is read-only.
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), BusError>;

    /// Returns an exclusive handle to the byte at `addr` for read-modify-write.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ReadOnlyViolation`] when the device is read-only.
    fn byte_mut(&mut self, addr: u16) -> Result<&mut u8, BusError>;

    /// Returns `true` when writes to this device are rejected.
    fn is_read_only(&self) -> bool {
        false
    }
}
