use std::fmt;

/// `F` bit for zero result.
pub const FLAG_Z: u8 = 1 << 7;
/// `F` bit for subtract (last operation was a subtraction).
pub const FLAG_N: u8 = 1 << 6;
/// `F` bit for carry out of bit 3.
pub const FLAG_H: u8 = 1 << 5;
/// `F` bit for carry out of bit 7.
pub const FLAG_C: u8 = 1 << 4;
/// Mask of architecturally active `F` bits; the low nibble always reads zero.
pub const FLAGS_ACTIVE_MASK: u8 = FLAG_Z | FLAG_N | FLAG_H | FLAG_C;

/// `PC` after the boot ROM hands over to the cartridge.
pub const POST_BOOT_PC: u16 = 0x0100;
/// `SP` after the boot ROM hands over to the cartridge.
pub const POST_BOOT_SP: u16 = 0xFFFE;
/// `AF` after the boot ROM hands over to the cartridge.
pub const POST_BOOT_AF: u16 = 0x01B0;
/// `BC` after the boot ROM hands over to the cartridge.
pub const POST_BOOT_BC: u16 = 0x0013;
/// `DE` after the boot ROM hands over to the cartridge.
pub const POST_BOOT_DE: u16 = 0x00D8;
/// `HL` after the boot ROM hands over to the cartridge.
pub const POST_BOOT_HL: u16 = 0x00D8;

/// 8-bit register identifier, in opcode-field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg8 {
    B = 0,
    C = 1,
    D = 2,
    E = 3,
    H = 4,
    L = 5,
    A = 7,
}

impl Reg8 {
    /// Ordered list of all 8-bit registers.
    pub const ALL: [Self; 7] = [
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::H,
        Self::L,
        Self::A,
    ];

    /// Decodes a 3-bit register field. `6` encodes `(hl)` and is not a register.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::B),
            1 => Some(Self::C),
            2 => Some(Self::D),
            3 => Some(Self::E),
            4 => Some(Self::H),
            5 => Some(Self::L),
            7 => Some(Self::A),
            _ => None,
        }
    }

    /// Lower-case assembler name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::H => "h",
            Self::L => "l",
            Self::A => "a",
        }
    }
}

/// 16-bit register pair identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Reg16 {
    Af,
    Bc,
    De,
    Hl,
    Sp,
}

/// Register file: seven 8-bit registers, a masked flags byte, `SP` and `PC`.
///
/// The pairs `AF`, `BC`, `DE` and `HL` are views over the 8-bit halves and
/// have no storage of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    a: u8,
    f: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    h: u8,
    l: u8,
    sp: u16,
    pc: u16,
}

const fn pack(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

#[allow(clippy::cast_possible_truncation)]
const fn unpack(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}

impl Registers {
    /// Restores the post-boot-ROM register values.
    pub const fn reset(&mut self) {
        self.pc = POST_BOOT_PC;
        self.sp = POST_BOOT_SP;
        self.set_af(POST_BOOT_AF);
        self.set_bc(POST_BOOT_BC);
        self.set_de(POST_BOOT_DE);
        self.set_hl(POST_BOOT_HL);
    }

    /// Reads an 8-bit register.
    #[must_use]
    pub const fn reg8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    /// Writes an 8-bit register.
    pub const fn set_reg8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    /// Reads a 16-bit register or pair view.
    #[must_use]
    pub const fn reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::Af => self.af(),
            Reg16::Bc => self.bc(),
            Reg16::De => self.de(),
            Reg16::Hl => self.hl(),
            Reg16::Sp => self.sp,
        }
    }

    /// Writes a 16-bit register or pair view.
    pub const fn set_reg16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::Af => self.set_af(value),
            Reg16::Bc => self.set_bc(value),
            Reg16::De => self.set_de(value),
            Reg16::Hl => self.set_hl(value),
            Reg16::Sp => self.sp = value,
        }
    }

    /// Reads `A`.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.a
    }

    /// Writes `A`.
    pub const fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    /// Reads `F`.
    #[must_use]
    pub const fn f(&self) -> u8 {
        self.f
    }

    /// Writes `F`, discarding the low nibble.
    pub const fn set_f(&mut self, value: u8) {
        self.f = value & FLAGS_ACTIVE_MASK;
    }

    /// Reads the `AF` view.
    #[must_use]
    pub const fn af(&self) -> u16 {
        pack(self.a, self.f)
    }

    /// Writes the `AF` view; the low nibble of `F` is discarded.
    pub const fn set_af(&mut self, value: u16) {
        let (hi, lo) = unpack(value);
        self.a = hi;
        self.set_f(lo);
    }

    /// Reads the `BC` view.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        pack(self.b, self.c)
    }

    /// Writes the `BC` view.
    pub const fn set_bc(&mut self, value: u16) {
        let (hi, lo) = unpack(value);
        self.b = hi;
        self.c = lo;
    }

    /// Reads the `DE` view.
    #[must_use]
    pub const fn de(&self) -> u16 {
        pack(self.d, self.e)
    }

    /// Writes the `DE` view.
    pub const fn set_de(&mut self, value: u16) {
        let (hi, lo) = unpack(value);
        self.d = hi;
        self.e = lo;
    }

    /// Reads the `HL` view.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        pack(self.h, self.l)
    }

    /// Writes the `HL` view.
    pub const fn set_hl(&mut self, value: u16) {
        let (hi, lo) = unpack(value);
        self.h = hi;
        self.l = lo;
    }

    /// Reads `SP`.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes `SP`.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads `PC`.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes `PC`.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Returns `PC` and post-increments it, wrapping at `0xFFFF`.
    pub const fn advance_pc(&mut self) -> u16 {
        let pc = self.pc;
        self.pc = pc.wrapping_add(1);
        pc
    }

    /// Returns `true` when a specific `F` bit is set.
    #[must_use]
    pub const fn flag(&self, flag: u8) -> bool {
        (self.f & flag) != 0
    }

    /// Sets or clears a specific active `F` bit.
    pub const fn set_flag(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.f |= flag & FLAGS_ACTIVE_MASK;
        } else {
            self.f &= !(flag & FLAGS_ACTIVE_MASK);
        }
    }

    /// Clears every flag.
    pub const fn clear_flags(&mut self) {
        self.f = 0;
    }
}

/// Renders the register dump line followed by the flag dump line.
impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pc: {:04X} sp: {:04X} a: {:02X} f: {:02X} b: {:02X} c: {:02X} d: {:02X} e: {:02X} h: {:02X} l: {:02X}",
            self.pc, self.sp, self.a, self.f, self.b, self.c, self.d, self.e, self.h, self.l
        )?;
        write!(
            f,
            "Z: {} N: {} H: {} C: {}",
            u8::from(self.flag(FLAG_Z)),
            u8::from(self.flag(FLAG_N)),
            u8::from(self.flag(FLAG_H)),
            u8::from(self.flag(FLAG_C))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Reg16, Reg8, Registers, FLAGS_ACTIVE_MASK, FLAG_C, FLAG_H, FLAG_N, FLAG_Z,
    };

    #[test]
    fn register_decode_matches_opcode_fields() {
        for reg in Reg8::ALL {
            assert_eq!(Reg8::from_u3(reg as u8), Some(reg));
        }

        assert!(Reg8::from_u3(6).is_none());
        assert!(Reg8::from_u3(8).is_none());
    }

    #[test]
    fn default_register_file_is_all_zero() {
        let regs = Registers::default();
        assert_eq!(regs.af(), 0);
        assert_eq!(regs.bc(), 0);
        assert_eq!(regs.de(), 0);
        assert_eq!(regs.hl(), 0);
        assert_eq!(regs.sp(), 0);
        assert_eq!(regs.pc(), 0);
    }

    #[test]
    fn reset_restores_post_boot_values() {
        let mut regs = Registers::default();
        regs.reset();

        assert_eq!(regs.pc(), 0x0100);
        assert_eq!(regs.sp(), 0xFFFE);
        assert_eq!(regs.af(), 0x01B0);
        assert_eq!(regs.bc(), 0x0013);
        assert_eq!(regs.de(), 0x00D8);
        assert_eq!(regs.hl(), 0x00D8);
    }

    #[test]
    fn pair_views_share_storage_with_halves() {
        let mut regs = Registers::default();

        regs.set_bc(0x1234);
        assert_eq!(regs.reg8(Reg8::B), 0x12);
        assert_eq!(regs.reg8(Reg8::C), 0x34);

        regs.set_reg8(Reg8::C, 0xCD);
        assert_eq!(regs.bc(), 0x12CD);

        regs.set_reg16(Reg16::Hl, 0xBEEF);
        assert_eq!(regs.reg8(Reg8::H), 0xBE);
        assert_eq!(regs.reg8(Reg8::L), 0xEF);

        regs.set_reg8(Reg8::D, 0x80);
        regs.set_reg8(Reg8::E, 0x01);
        assert_eq!(regs.reg16(Reg16::De), 0x8001);
    }

    #[test]
    fn af_view_masks_flag_low_nibble() {
        let mut regs = Registers::default();
        regs.set_af(0x12FF);

        assert_eq!(regs.a(), 0x12);
        assert_eq!(regs.f(), 0xF0);
        assert_eq!(regs.af(), 0x12F0);
    }

    #[test]
    fn flags_only_store_active_architectural_bits() {
        let mut regs = Registers::default();
        regs.set_f(u8::MAX);
        assert_eq!(regs.f(), FLAGS_ACTIVE_MASK);

        regs.set_flag(0x0F, true);
        assert_eq!(regs.f() & 0x0F, 0);
    }

    #[test]
    fn flags_individual_bits_can_be_set_and_cleared() {
        let mut regs = Registers::default();

        for flag in [FLAG_Z, FLAG_N, FLAG_H, FLAG_C] {
            regs.set_flag(flag, true);
            assert!(regs.flag(flag));
        }

        for flag in [FLAG_Z, FLAG_N, FLAG_H, FLAG_C] {
            regs.set_flag(flag, false);
            assert!(!regs.flag(flag));
        }

        regs.set_f(0xF0);
        regs.clear_flags();
        assert_eq!(regs.f(), 0);
    }

    #[test]
    fn program_counter_wraps_on_advance() {
        let mut regs = Registers::default();
        regs.set_pc(0xFFFF);

        assert_eq!(regs.advance_pc(), 0xFFFF);
        assert_eq!(regs.pc(), 0x0000);
    }
}
