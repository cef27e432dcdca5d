//! Pure 8- and 16-bit arithmetic with SM83 flag semantics.

#![allow(clippy::cast_lossless, clippy::cast_possible_truncation)]

use super::flags::FlagsUpdate;
use crate::decoder::{AluOp, CbOp};

/// `inc r8`: carry is unaffected.
#[must_use]
pub const fn inc8(value: u8) -> (u8, FlagsUpdate) {
    let result = value.wrapping_add(1);
    let flags = FlagsUpdate {
        zero: Some(result == 0),
        subtract: Some(false),
        half_carry: Some(value & 0x0F == 0x0F),
        carry: None,
    };
    (result, flags)
}

/// `dec r8`: carry is unaffected.
#[must_use]
pub const fn dec8(value: u8) -> (u8, FlagsUpdate) {
    let result = value.wrapping_sub(1);
    let flags = FlagsUpdate {
        zero: Some(result == 0),
        subtract: Some(true),
        half_carry: Some(value & 0x0F == 0),
        carry: None,
    };
    (result, flags)
}

/// Accumulator ALU operation. Returns the new accumulator value; `cp`
/// returns `a` unchanged.
#[must_use]
pub const fn alu8(op: AluOp, a: u8, operand: u8, carry_in: bool) -> (u8, FlagsUpdate) {
    match op {
        AluOp::Add => add8(a, operand, false),
        AluOp::Adc => add8(a, operand, carry_in),
        AluOp::Sub => sub8(a, operand, false),
        AluOp::Sbc => sub8(a, operand, carry_in),
        AluOp::And => {
            let result = a & operand;
            (result, FlagsUpdate::all(result == 0, false, true, false))
        }
        AluOp::Xor => {
            let result = a ^ operand;
            (result, FlagsUpdate::all(result == 0, false, false, false))
        }
        AluOp::Or => {
            let result = a | operand;
            (result, FlagsUpdate::all(result == 0, false, false, false))
        }
        AluOp::Cp => {
            let (_, flags) = sub8(a, operand, false);
            (a, flags)
        }
    }
}

const fn add8(a: u8, b: u8, carry_in: bool) -> (u8, FlagsUpdate) {
    let c = carry_in as u16;
    let sum = a as u16 + b as u16 + c;
    let half = (a & 0x0F) as u16 + (b & 0x0F) as u16 + c > 0x0F;
    let result = sum as u8;
    (result, FlagsUpdate::all(result == 0, false, half, sum > 0xFF))
}

const fn sub8(a: u8, b: u8, carry_in: bool) -> (u8, FlagsUpdate) {
    let c = carry_in as u16;
    let subtrahend = b as u16 + c;
    let result = (a as u16).wrapping_sub(subtrahend) as u8;
    let half = ((a & 0x0F) as u16) < (b & 0x0F) as u16 + c;
    let borrow = (a as u16) < subtrahend;
    (result, FlagsUpdate::all(result == 0, true, half, borrow))
}

/// `add hl,r16`: half-carry from bit 11, carry from bit 15, zero unaffected.
#[must_use]
pub const fn add16(hl: u16, operand: u16) -> (u16, FlagsUpdate) {
    let (result, carry) = hl.overflowing_add(operand);
    let flags = FlagsUpdate {
        zero: None,
        subtract: Some(false),
        half_carry: Some((hl & 0x0FFF) + (operand & 0x0FFF) > 0x0FFF),
        carry: Some(carry),
    };
    (result, flags)
}

/// `add sp,e8` and `ld hl,sp+e8`: flags come from the unsigned low-byte
/// addition; zero and subtract are cleared.
#[must_use]
pub const fn add_sp_offset(sp: u16, offset: u8) -> (u16, FlagsUpdate) {
    let result = sp.wrapping_add_signed(i8::from_ne_bytes([offset]) as i16);
    let low = sp & 0x00FF;
    let unsigned = offset as u16;
    let half = (low & 0x0F) + (unsigned & 0x0F) > 0x0F;
    let carry = low + unsigned > 0xFF;
    (result, FlagsUpdate::all(false, false, half, carry))
}

/// `daa`: decimal-adjusts `a` after a BCD add or subtract.
#[must_use]
pub const fn daa(a: u8, subtract: bool, half_carry: bool, carry: bool) -> (u8, FlagsUpdate) {
    let mut adjust = 0_u8;
    let mut carry_out = carry;

    let result = if subtract {
        if carry {
            adjust |= 0x60;
        }
        if half_carry {
            adjust |= 0x06;
        }
        a.wrapping_sub(adjust)
    } else {
        if carry || a > 0x99 {
            adjust |= 0x60;
            carry_out = true;
        }
        if half_carry || a & 0x0F > 0x09 {
            adjust |= 0x06;
        }
        a.wrapping_add(adjust)
    };

    let flags = FlagsUpdate {
        zero: Some(result == 0),
        subtract: None,
        half_carry: Some(false),
        carry: Some(carry_out),
    };
    (result, flags)
}

/// Rotate, shift or swap from the `CB` group 0 table.
///
/// `bit`, `res` and `set` are handled by [`bit_test`] and [`apply_bit_op`].
#[must_use]
pub const fn shift(op: CbOp, value: u8, carry_in: bool) -> (u8, FlagsUpdate) {
    let (result, carry) = match op {
        CbOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
        CbOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
        CbOp::Rl => ((value << 1) | carry_in as u8, value & 0x80 != 0),
        CbOp::Rr => ((value >> 1) | ((carry_in as u8) << 7), value & 0x01 != 0),
        CbOp::Sla => (value << 1, value & 0x80 != 0),
        CbOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
        CbOp::Swap => (value.rotate_left(4), false),
        CbOp::Srl => (value >> 1, value & 0x01 != 0),
        CbOp::Bit(_) | CbOp::Res(_) | CbOp::Set(_) => return apply_bit_op(op, value),
    };
    (result, FlagsUpdate::all(result == 0, false, false, carry))
}

/// Accumulator rotates (`rlca rrca rla rra`) always clear zero.
#[must_use]
pub const fn rotate_accumulator(op: CbOp, a: u8, carry_in: bool) -> (u8, FlagsUpdate) {
    let (result, mut flags) = shift(op, a, carry_in);
    flags.zero = Some(false);
    (result, flags)
}

/// `bit n`: zero reflects the complement of the tested bit; carry is unaffected.
#[must_use]
pub const fn bit_test(bit: u8, value: u8) -> FlagsUpdate {
    FlagsUpdate {
        zero: Some(value & (1 << (bit & 0x07)) == 0),
        subtract: Some(false),
        half_carry: Some(true),
        carry: None,
    }
}

/// `res n` / `set n`; flags are unaffected. Other ops pass `value` through.
#[must_use]
pub const fn apply_bit_op(op: CbOp, value: u8) -> (u8, FlagsUpdate) {
    let result = match op {
        CbOp::Res(bit) => value & !(1 << (bit & 0x07)),
        CbOp::Set(bit) => value | (1 << (bit & 0x07)),
        _ => value,
    };
    (result, FlagsUpdate::UNCHANGED)
}
