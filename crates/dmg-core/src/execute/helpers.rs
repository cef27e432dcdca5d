//! Operand and stack access shared by the execution routines.

use crate::decoder::{Indirect, Operand8};
use crate::fault::BusError;
use crate::memory::Bus;
use crate::state::Registers;

/// Reads an 8-bit operand; `(hl)` goes through the bus.
///
/// # Errors
///
/// Propagates bus routing failures.
pub fn read_operand(regs: &Registers, bus: &Bus, operand: Operand8) -> Result<u8, BusError> {
    match operand {
        Operand8::Reg(reg) => Ok(regs.reg8(reg)),
        Operand8::HlIndirect => bus.read_byte(regs.hl()),
    }
}

/// Writes an 8-bit operand; `(hl)` goes through the bus.
///
/// # Errors
///
/// Propagates bus routing and read-only failures.
pub fn write_operand(
    regs: &mut Registers,
    bus: &mut Bus,
    operand: Operand8,
    value: u8,
) -> Result<(), BusError> {
    match operand {
        Operand8::Reg(reg) => {
            regs.set_reg8(reg, value);
            Ok(())
        }
        Operand8::HlIndirect => bus.write_byte(regs.hl(), value),
    }
}

/// Applies `f` to an 8-bit operand in place and returns its second output.
///
/// `(hl)` is routed once through [`Bus::byte_mut`].
///
/// # Errors
///
/// Propagates bus routing and read-only failures.
pub fn modify_operand<T>(
    regs: &mut Registers,
    bus: &mut Bus,
    operand: Operand8,
    f: impl FnOnce(u8) -> (u8, T),
) -> Result<T, BusError> {
    match operand {
        Operand8::Reg(reg) => {
            let (value, out) = f(regs.reg8(reg));
            regs.set_reg8(reg, value);
            Ok(out)
        }
        Operand8::HlIndirect => {
            let byte = bus.byte_mut(regs.hl())?;
            let (value, out) = f(*byte);
            *byte = value;
            Ok(out)
        }
    }
}

/// Resolves the address of an indirect accumulator operand, applying the
/// `(hl+)`/`(hl-)` post-adjustment.
pub const fn indirect_address(regs: &mut Registers, indirect: Indirect) -> u16 {
    match indirect {
        Indirect::Bc => regs.bc(),
        Indirect::De => regs.de(),
        Indirect::HlIncrement => {
            let hl = regs.hl();
            regs.set_hl(hl.wrapping_add(1));
            hl
        }
        Indirect::HlDecrement => {
            let hl = regs.hl();
            regs.set_hl(hl.wrapping_sub(1));
            hl
        }
    }
}

/// Pushes `value`: high byte at `SP-1`, low byte at `SP-2`.
///
/// # Errors
///
/// Propagates bus routing and read-only failures.
pub fn push_word(regs: &mut Registers, bus: &mut Bus, value: u16) -> Result<(), BusError> {
    let [lo, hi] = value.to_le_bytes();
    let sp = regs.sp().wrapping_sub(1);
    bus.write_byte(sp, hi)?;
    let sp = sp.wrapping_sub(1);
    bus.write_byte(sp, lo)?;
    regs.set_sp(sp);
    Ok(())
}

/// Pops a word: low byte at `SP`, high byte at `SP+1`.
///
/// # Errors
///
/// Propagates bus routing failures.
pub fn pop_word(regs: &mut Registers, bus: &Bus) -> Result<u16, BusError> {
    let sp = regs.sp();
    let lo = bus.read_byte(sp)?;
    let hi = bus.read_byte(sp.wrapping_add(1))?;
    regs.set_sp(sp.wrapping_add(2));
    Ok(u16::from_le_bytes([lo, hi]))
}

/// Target of a relative jump from the already-advanced `pc`.
#[must_use]
#[allow(clippy::cast_lossless)]
pub const fn relative_target(pc: u16, offset: u8) -> u16 {
    pc.wrapping_add_signed(i8::from_ne_bytes([offset]) as i16)
}
