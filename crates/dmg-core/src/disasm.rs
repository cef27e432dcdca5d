//! Instruction disassembly into `ADDR: BYTES (MNEMONIC)` rows.

use std::fmt;

use crate::decoder::decode_cb;
use crate::encoding::{lookup, Operation};
use crate::fault::BusError;
use crate::memory::Bus;

/// Raw bytes of one instruction, opcode first. At most three bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InstructionBytes {
    bytes: [u8; 3],
    len: u8,
}

impl InstructionBytes {
    /// Copies up to three bytes from `bytes`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut out = Self::default();
        for byte in bytes.iter().take(3) {
            out.push(*byte);
        }
        out
    }

    /// Appends a byte. Bytes past the third are dropped.
    pub fn push(&mut self, byte: u8) {
        if let Some(slot) = self.bytes.get_mut(usize::from(self.len)) {
            *slot = byte;
            self.len += 1;
        }
    }

    /// The fetched bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Number of fetched bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` before any byte has been pushed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Opcode byte.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// First operand byte.
    #[must_use]
    pub const fn imm8(&self) -> u8 {
        self.bytes[1]
    }

    /// Little-endian 16-bit operand.
    #[must_use]
    pub const fn imm16(&self) -> u16 {
        u16::from_le_bytes([self.bytes[1], self.bytes[2]])
    }
}

impl fmt::Display for InstructionBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.as_slice().iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// A single disassembled instruction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisassemblyRow {
    /// Start address.
    pub addr: u16,
    /// Raw instruction bytes.
    pub bytes: InstructionBytes,
    /// Table mnemonic.
    pub mnemonic: &'static str,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}: {} (", self.addr, self.bytes)?;
        let prefixed = matches!(lookup(self.bytes.opcode()).operation, Operation::Prefix);
        if prefixed && self.bytes.len() == 2 {
            write!(f, "{}", decode_cb(self.bytes.imm8()))?;
        } else {
            f.write_str(self.mnemonic)?;
        }
        f.write_str(")")
    }
}

/// Disassembles the instruction starting at `addr`.
///
/// # Errors
///
/// Returns the first [`BusError`] hit while reading instruction bytes.
pub fn disassemble_one(bus: &Bus, addr: u16) -> Result<DisassemblyRow, BusError> {
    let instruction = lookup(bus.read_byte(addr)?);
    let mut bytes = InstructionBytes::default();
    let mut cursor = addr;
    for _ in 0..instruction.length {
        bytes.push(bus.read_byte(cursor)?);
        cursor = cursor.wrapping_add(1);
    }

    Ok(DisassemblyRow {
        addr,
        bytes,
        mnemonic: instruction.mnemonic,
    })
}

/// Disassembles up to `count` consecutive instructions from `start`.
///
/// Stops early at the first address that cannot be read.
#[must_use]
pub fn disassemble_range(bus: &Bus, start: u16, count: usize) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(count);
    let mut addr = start;
    while rows.len() < count {
        let Ok(row) = disassemble_one(bus, addr) else {
            break;
        };
        addr = addr.wrapping_add(u16::from(row.bytes.len));
        rows.push(row);
    }
    rows
}
