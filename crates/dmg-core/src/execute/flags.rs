//! Flag updates produced by ALU operations.

use crate::state::{Registers, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

/// Per-flag update. `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagsUpdate {
    /// Zero flag.
    pub zero: Option<bool>,
    /// Subtract flag.
    pub subtract: Option<bool>,
    /// Half-carry flag.
    pub half_carry: Option<bool>,
    /// Carry flag.
    pub carry: Option<bool>,
}

impl FlagsUpdate {
    /// Update that touches no flag.
    pub const UNCHANGED: Self = Self {
        zero: None,
        subtract: None,
        half_carry: None,
        carry: None,
    };

    /// Update that writes all four flags.
    #[must_use]
    pub const fn all(zero: bool, subtract: bool, half_carry: bool, carry: bool) -> Self {
        Self {
            zero: Some(zero),
            subtract: Some(subtract),
            half_carry: Some(half_carry),
            carry: Some(carry),
        }
    }

    /// Writes the selected flags into `regs`.
    pub const fn apply(self, regs: &mut Registers) {
        if let Some(zero) = self.zero {
            regs.set_flag(FLAG_Z, zero);
        }
        if let Some(subtract) = self.subtract {
            regs.set_flag(FLAG_N, subtract);
        }
        if let Some(half_carry) = self.half_carry {
            regs.set_flag(FLAG_H, half_carry);
        }
        if let Some(carry) = self.carry {
            regs.set_flag(FLAG_C, carry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FlagsUpdate;
    use crate::state::{Registers, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

    #[test]
    fn default_update_is_a_no_op() {
        let mut regs = Registers::default();
        regs.set_f(FLAG_Z | FLAG_C);
        FlagsUpdate::default().apply(&mut regs);
        assert_eq!(regs.f(), FLAG_Z | FLAG_C);
    }

    #[test]
    fn partial_update_leaves_other_flags() {
        let mut regs = Registers::default();
        regs.set_f(FLAG_C);
        FlagsUpdate {
            zero: Some(true),
            subtract: Some(false),
            half_carry: Some(true),
            carry: None,
        }
        .apply(&mut regs);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H | FLAG_C);

        FlagsUpdate::all(false, true, false, false).apply(&mut regs);
        assert_eq!(regs.f(), FLAG_N);
    }
}
