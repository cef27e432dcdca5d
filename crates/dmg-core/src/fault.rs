use std::fmt;

use thiserror::Error;

use crate::memory::MemoryRegion;
use crate::state::Registers;

/// Fault classes used for diagnostics aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Bus routing or device access-policy violation.
    Bus,
    /// Opcode table lookup hit the unimplemented sentinel.
    Decode,
}

/// Stable fault taxonomy. Every variant halts the fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// No mapped device claims the accessed address.
    #[error("unmapped address")]
    UnmappedAddress = 0x01,
    /// Write or in-place mutation attempted against a read-only device.
    #[error("read-only violation")]
    ReadOnlyViolation = 0x02,
    /// Opcode has no entry in the dispatch table.
    #[error("unimplemented opcode")]
    UnimplementedOpcode = 0x03,
}

impl FaultCode {
    /// Converts a fault code to its stable one-byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable one-byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnmappedAddress),
            0x02 => Some(Self::ReadOnlyViolation),
            0x03 => Some(Self::UnimplementedOpcode),
            _ => None,
        }
    }

    /// Returns the diagnostics class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnmappedAddress | Self::ReadOnlyViolation => FaultClass::Bus,
            Self::UnimplementedOpcode => FaultClass::Decode,
        }
    }
}

/// Failure raised by bus routing or by a mapped device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusError {
    /// No device on the bus claims `addr`.
    #[error("no device mapped at address {addr:#06X} ({region})")]
    UnmappedAddress {
        /// Address that was accessed.
        addr: u16,
        /// Architectural region the address falls in.
        region: MemoryRegion,
    },
    /// The claiming device is read-only.
    #[error("cannot write to read-only address {addr:#06X}")]
    ReadOnlyViolation {
        /// Address that was written.
        addr: u16,
    },
}

impl BusError {
    /// Returns the stable fault code for this error.
    #[must_use]
    pub const fn code(self) -> FaultCode {
        match self {
            Self::UnmappedAddress { .. } => FaultCode::UnmappedAddress,
            Self::ReadOnlyViolation { .. } => FaultCode::ReadOnlyViolation,
        }
    }
}

/// Fatal condition raised while executing an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// A bus access failed.
    #[error(transparent)]
    Bus(#[from] BusError),
    /// The fetched opcode has no table entry.
    #[error("opcode {opcode:#04X} at {pc:#06X} has not been implemented")]
    UnimplementedOpcode {
        /// Offending opcode byte.
        opcode: u8,
        /// Address of the offending opcode.
        pc: u16,
    },
}

impl Fault {
    /// Returns the stable fault code for this fault.
    #[must_use]
    pub const fn code(self) -> FaultCode {
        match self {
            Self::Bus(error) => error.code(),
            Self::UnimplementedOpcode { .. } => FaultCode::UnimplementedOpcode,
        }
    }
}

/// Diagnostic bundle produced when the fetch loop terminates on a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FaultReport {
    /// The fault that stopped execution.
    pub fault: Fault,
    /// Register file at the moment the fault surfaced.
    pub registers: Registers,
    /// Instructions retired before the fault.
    pub retired: u64,
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.fault)?;
        writeln!(f, "{}", self.registers)?;
        write!(f, "Ran {} instructions", self.retired)
    }
}

impl std::error::Error for FaultReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.fault)
    }
}
