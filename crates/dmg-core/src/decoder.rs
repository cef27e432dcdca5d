//! Operand field decoding for the base and `CB`-prefixed opcode spaces.

use std::fmt;

use crate::state::{Reg16, Reg8, Registers, FLAG_C, FLAG_Z};

/// 8-bit operand selected by a 3-bit field: a register or the byte at `(hl)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand8 {
    /// A plain 8-bit register.
    Reg(Reg8),
    /// The byte addressed by `HL`.
    HlIndirect,
}

impl Operand8 {
    /// Decodes the low three bits of `bits`.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        match Reg8::from_u3(bits & 0x07) {
            Some(reg) => Self::Reg(reg),
            None => Self::HlIndirect,
        }
    }

    /// Returns `true` for the `(hl)` form.
    #[must_use]
    pub const fn is_indirect(self) -> bool {
        matches!(self, Self::HlIndirect)
    }
}

impl fmt::Display for Operand8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(reg) => f.write_str(reg.name()),
            Self::HlIndirect => f.write_str("(hl)"),
        }
    }
}

/// 16-bit pair used by loads and 16-bit arithmetic (`BC DE HL SP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Pair {
    Bc,
    De,
    Hl,
    Sp,
}

impl Pair {
    /// Decodes a 2-bit pair field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Sp,
        }
    }

    /// Register-file selector for this pair.
    #[must_use]
    pub const fn reg16(self) -> Reg16 {
        match self {
            Self::Bc => Reg16::Bc,
            Self::De => Reg16::De,
            Self::Hl => Reg16::Hl,
            Self::Sp => Reg16::Sp,
        }
    }
}

/// 16-bit pair used by `push`/`pop` (`BC DE HL AF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StackPair {
    Bc,
    De,
    Hl,
    Af,
}

impl StackPair {
    /// Decodes a 2-bit pair field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Af,
        }
    }

    /// Register-file selector for this pair.
    #[must_use]
    pub const fn reg16(self) -> Reg16 {
        match self {
            Self::Bc => Reg16::Bc,
            Self::De => Reg16::De,
            Self::Hl => Reg16::Hl,
            Self::Af => Reg16::Af,
        }
    }
}

/// Memory operand for `ld (r16),a` and `ld a,(r16)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirect {
    /// `(bc)`.
    Bc,
    /// `(de)`.
    De,
    /// `(hl+)`: `HL` is incremented after the access.
    HlIncrement,
    /// `(hl-)`: `HL` is decremented after the access.
    HlDecrement,
}

impl Indirect {
    /// Decodes a 2-bit field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::HlIncrement,
            _ => Self::HlDecrement,
        }
    }
}

/// Branch condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Unconditional.
    Always,
    /// `nz`.
    NotZero,
    /// `z`.
    Zero,
    /// `nc`.
    NotCarry,
    /// `c`.
    Carry,
}

impl Condition {
    /// Decodes the 2-bit `cc` field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::NotZero,
            1 => Self::Zero,
            2 => Self::NotCarry,
            _ => Self::Carry,
        }
    }

    /// Returns `true` when the branch is taken for the current flags.
    #[must_use]
    pub const fn holds(self, regs: &Registers) -> bool {
        match self {
            Self::Always => true,
            Self::NotZero => !regs.flag(FLAG_Z),
            Self::Zero => regs.flag(FLAG_Z),
            Self::NotCarry => !regs.flag(FLAG_C),
            Self::Carry => regs.flag(FLAG_C),
        }
    }

    /// Returns `true` for every form except [`Condition::Always`].
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        !matches!(self, Self::Always)
    }
}

/// Accumulator ALU operation selected by bits 5..3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    /// Decodes a 3-bit field.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            _ => Self::Cp,
        }
    }
}

/// Operation encoded by the byte following a `CB` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CbOp {
    /// Rotate left circular.
    Rlc,
    /// Rotate right circular.
    Rrc,
    /// Rotate left through carry.
    Rl,
    /// Rotate right through carry.
    Rr,
    /// Arithmetic shift left.
    Sla,
    /// Arithmetic shift right, bit 7 preserved.
    Sra,
    /// Exchange nibbles.
    Swap,
    /// Logical shift right.
    Srl,
    /// Test bit `n`.
    Bit(u8),
    /// Clear bit `n`.
    Res(u8),
    /// Set bit `n`.
    Set(u8),
}

/// Fully decoded `CB`-prefixed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CbInstruction {
    /// Operation to apply.
    pub op: CbOp,
    /// Target operand.
    pub operand: Operand8,
}

/// Decodes the byte following a `CB` prefix.
#[must_use]
pub const fn decode_cb(byte: u8) -> CbInstruction {
    let y = (byte >> 3) & 0x07;
    let op = match byte >> 6 {
        0 => match y {
            0 => CbOp::Rlc,
            1 => CbOp::Rrc,
            2 => CbOp::Rl,
            3 => CbOp::Rr,
            4 => CbOp::Sla,
            5 => CbOp::Sra,
            6 => CbOp::Swap,
            _ => CbOp::Srl,
        },
        1 => CbOp::Bit(y),
        2 => CbOp::Res(y),
        _ => CbOp::Set(y),
    };

    CbInstruction {
        op,
        operand: Operand8::from_u3(byte),
    }
}

impl fmt::Display for CbInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.op {
            CbOp::Rlc => "rlc",
            CbOp::Rrc => "rrc",
            CbOp::Rl => "rl",
            CbOp::Rr => "rr",
            CbOp::Sla => "sla",
            CbOp::Sra => "sra",
            CbOp::Swap => "swap",
            CbOp::Srl => "srl",
            CbOp::Bit(bit) => return write!(f, "bit {bit},{}", self.operand),
            CbOp::Res(bit) => return write!(f, "res {bit},{}", self.operand),
            CbOp::Set(bit) => return write!(f, "set {bit},{}", self.operand),
        };
        write!(f, "{name} {}", self.operand)
    }
}
