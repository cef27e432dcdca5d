//! Opcode dispatch table: per-opcode metadata bound to an operation.

use crate::decoder::{AluOp, Condition, Indirect, Operand8, Pair, StackPair};

/// Behaviour bound to an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `nop`.
    Nop,
    /// `stop`: enters [`crate::CpuMode::Stopped`].
    Stop,
    /// `halt`: enters [`crate::CpuMode::Halted`].
    Halt,
    /// `di`.
    DisableInterrupts,
    /// `ei`.
    EnableInterrupts,
    /// `ld r16,imm16`.
    LoadPairImmediate(Pair),
    /// `ld (r16),a`.
    StoreAccumulatorIndirect(Indirect),
    /// `ld a,(r16)`.
    LoadAccumulatorIndirect(Indirect),
    /// `ld (imm16),sp`.
    StoreStackPointer,
    /// `inc r16`.
    IncrementPair(Pair),
    /// `dec r16`.
    DecrementPair(Pair),
    /// `add hl,r16`.
    AddHl(Pair),
    /// `inc r8` / `inc (hl)`.
    Increment(Operand8),
    /// `dec r8` / `dec (hl)`.
    Decrement(Operand8),
    /// `ld r8,imm8` / `ld (hl),imm8`.
    LoadImmediate(Operand8),
    /// `ld r8,r8` including the `(hl)` forms.
    Load {
        /// Destination operand.
        dst: Operand8,
        /// Source operand.
        src: Operand8,
    },
    /// `rlca`.
    RotateLeftCircularA,
    /// `rrca`.
    RotateRightCircularA,
    /// `rla`.
    RotateLeftA,
    /// `rra`.
    RotateRightA,
    /// `daa`.
    DecimalAdjust,
    /// `cpl`.
    Complement,
    /// `scf`.
    SetCarry,
    /// `ccf`.
    ComplementCarry,
    /// `jr e8` / `jr cc,e8`.
    JumpRelative(Condition),
    /// Accumulator ALU op with an 8-bit operand.
    Alu(AluOp, Operand8),
    /// Accumulator ALU op with an immediate.
    AluImmediate(AluOp),
    /// `ret` / `ret cc`.
    Return(Condition),
    /// `reti`.
    ReturnFromInterrupt,
    /// `pop r16`.
    Pop(StackPair),
    /// `push r16`.
    Push(StackPair),
    /// `jp imm16` / `jp cc,imm16`.
    Jump(Condition),
    /// `jp hl`.
    JumpHl,
    /// `call imm16` / `call cc,imm16`.
    Call(Condition),
    /// `rst` to the given vector.
    Restart(u8),
    /// `CB` prefix; the second byte selects the operation.
    Prefix,
    /// `ldh (imm8),a`.
    StoreHigh,
    /// `ldh a,(imm8)`.
    LoadHigh,
    /// `ld (c),a`.
    StoreHighC,
    /// `ld a,(c)`.
    LoadHighC,
    /// `ld (imm16),a`.
    StoreAbsolute,
    /// `ld a,(imm16)`.
    LoadAbsolute,
    /// `add sp,e8`.
    AddStackPointer,
    /// `ld hl,sp+e8`.
    LoadHlStackOffset,
    /// `ld sp,hl`.
    LoadStackPointerHl,
    /// No real opcode at this slot.
    Unimplemented,
}

/// Immutable opcode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Assembler mnemonic, diagnostics only.
    pub mnemonic: &'static str,
    /// Encoded length in bytes, opcode included.
    pub length: u8,
    /// Base cycle cost.
    pub cycles: u8,
    /// Extra cycles charged only when a conditional branch is taken.
    pub additional_cycles: u8,
    /// Bound behaviour.
    pub operation: Operation,
}

impl Instruction {
    /// Sentinel occupying every slot without a real opcode.
    pub const UNIMPLEMENTED: Self = Self::new("unimplemented", 1, 4, 0, Operation::Unimplemented);

    /// Creates a table entry.
    #[must_use]
    pub const fn new(
        mnemonic: &'static str,
        length: u8,
        cycles: u8,
        additional_cycles: u8,
        operation: Operation,
    ) -> Self {
        Self {
            mnemonic,
            length,
            cycles,
            additional_cycles,
            operation,
        }
    }

    /// Returns `true` for the unimplemented sentinel.
    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self.operation, Operation::Unimplemented)
    }

    /// Cycle cost when a conditional branch is taken.
    #[must_use]
    pub const fn taken_cycles(&self) -> u8 {
        self.cycles + self.additional_cycles
    }
}

/// Returns the table entry for `opcode`.
#[must_use]
pub fn lookup(opcode: u8) -> &'static Instruction {
    &OPCODE_TABLE[usize::from(opcode)]
}

/// Base (unprefixed) opcode table indexed by the first instruction byte.
pub static OPCODE_TABLE: [Instruction; 256] = build_opcode_table();

#[allow(clippy::cast_possible_truncation)]
const fn build_opcode_table() -> [Instruction; 256] {
    let mut table = [Instruction::UNIMPLEMENTED; 256];
    let mut index = 0;
    while index < table.len() {
        table[index] = decode_opcode(index as u8);
        index += 1;
    }
    table
}

/// Builds the entry for one base opcode from its `xx yyy zzz` fields, where
/// `yyy` splits further into `pp q`.
#[allow(clippy::cast_lossless)]
const fn decode_opcode(opcode: u8) -> Instruction {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 0x01;
    let dst = Operand8::from_u3(y);
    let src = Operand8::from_u3(z);

    let (length, cycles, additional_cycles, operation) = match (x, z) {
        (0, 0) => match y {
            0 => (1, 4, 0, Operation::Nop),
            1 => (3, 20, 0, Operation::StoreStackPointer),
            2 => (2, 4, 0, Operation::Stop),
            3 => (2, 12, 0, Operation::JumpRelative(Condition::Always)),
            _ => (2, 8, 4, Operation::JumpRelative(Condition::from_u2(y - 4))),
        },
        (0, 1) if q == 0 => (3, 12, 0, Operation::LoadPairImmediate(Pair::from_u2(p))),
        (0, 1) => (1, 8, 0, Operation::AddHl(Pair::from_u2(p))),
        (0, 2) if q == 0 => (1, 8, 0, Operation::StoreAccumulatorIndirect(Indirect::from_u2(p))),
        (0, 2) => (1, 8, 0, Operation::LoadAccumulatorIndirect(Indirect::from_u2(p))),
        (0, 3) if q == 0 => (1, 8, 0, Operation::IncrementPair(Pair::from_u2(p))),
        (0, 3) => (1, 8, 0, Operation::DecrementPair(Pair::from_u2(p))),
        (0, 4) => (1, read_modify_write_cycles(dst), 0, Operation::Increment(dst)),
        (0, 5) => (1, read_modify_write_cycles(dst), 0, Operation::Decrement(dst)),
        (0, 6) => {
            let cycles = if dst.is_indirect() { 12 } else { 8 };
            (2, cycles, 0, Operation::LoadImmediate(dst))
        }
        (0, _) => {
            let operation = match y {
                0 => Operation::RotateLeftCircularA,
                1 => Operation::RotateRightCircularA,
                2 => Operation::RotateLeftA,
                3 => Operation::RotateRightA,
                4 => Operation::DecimalAdjust,
                5 => Operation::Complement,
                6 => Operation::SetCarry,
                _ => Operation::ComplementCarry,
            };
            (1, 4, 0, operation)
        }
        // `ld (hl),(hl)` encodes `halt`.
        (1, _) if dst.is_indirect() && src.is_indirect() => (1, 4, 0, Operation::Halt),
        (1, _) => {
            let cycles = if dst.is_indirect() || src.is_indirect() { 8 } else { 4 };
            (1, cycles, 0, Operation::Load { dst, src })
        }
        (2, _) => {
            let cycles = if src.is_indirect() { 8 } else { 4 };
            (1, cycles, 0, Operation::Alu(AluOp::from_u3(y), src))
        }
        (_, 0) => match y {
            0..=3 => (1, 8, 12, Operation::Return(Condition::from_u2(y))),
            4 => (2, 12, 0, Operation::StoreHigh),
            5 => (2, 16, 0, Operation::AddStackPointer),
            6 => (2, 12, 0, Operation::LoadHigh),
            _ => (2, 12, 0, Operation::LoadHlStackOffset),
        },
        (_, 1) if q == 0 => (1, 12, 0, Operation::Pop(StackPair::from_u2(p))),
        (_, 1) => match p {
            0 => (1, 16, 0, Operation::Return(Condition::Always)),
            1 => (1, 16, 0, Operation::ReturnFromInterrupt),
            2 => (1, 4, 0, Operation::JumpHl),
            _ => (1, 8, 0, Operation::LoadStackPointerHl),
        },
        (_, 2) => match y {
            0..=3 => (3, 12, 4, Operation::Jump(Condition::from_u2(y))),
            4 => (1, 8, 0, Operation::StoreHighC),
            5 => (3, 16, 0, Operation::StoreAbsolute),
            6 => (1, 8, 0, Operation::LoadHighC),
            _ => (3, 16, 0, Operation::LoadAbsolute),
        },
        (_, 3) => match y {
            0 => (3, 16, 0, Operation::Jump(Condition::Always)),
            1 => (2, 8, 0, Operation::Prefix),
            6 => (1, 4, 0, Operation::DisableInterrupts),
            7 => (1, 4, 0, Operation::EnableInterrupts),
            _ => return Instruction::UNIMPLEMENTED,
        },
        (_, 4) if y < 4 => (3, 12, 12, Operation::Call(Condition::from_u2(y))),
        (_, 5) if q == 0 => (1, 16, 0, Operation::Push(StackPair::from_u2(p))),
        (_, 5) if p == 0 => (3, 24, 0, Operation::Call(Condition::Always)),
        (_, 6) => (2, 8, 0, Operation::AluImmediate(AluOp::from_u3(y))),
        (_, 7) => (1, 16, 0, Operation::Restart(y * 8)),
        _ => return Instruction::UNIMPLEMENTED,
    };

    Instruction::new(MNEMONICS[opcode as usize], length, cycles, additional_cycles, operation)
}

const fn read_modify_write_cycles(operand: Operand8) -> u8 {
    if operand.is_indirect() {
        12
    } else {
        4
    }
}

/// Mnemonic per base opcode; `imm8`/`imm16`/`e8` name the operand bytes.
const MNEMONICS: [&str; 256] = [
    // 0x00..=0x0F
    "nop",
    "ld bc,imm16",
    "ld (bc),a",
    "inc bc",
    "inc b",
    "dec b",
    "ld b,imm8",
    "rlca",
    "ld (imm16),sp",
    "add hl,bc",
    "ld a,(bc)",
    "dec bc",
    "inc c",
    "dec c",
    "ld c,imm8",
    "rrca",
    // 0x10..=0x1F
    "stop",
    "ld de,imm16",
    "ld (de),a",
    "inc de",
    "inc d",
    "dec d",
    "ld d,imm8",
    "rla",
    "jr e8",
    "add hl,de",
    "ld a,(de)",
    "dec de",
    "inc e",
    "dec e",
    "ld e,imm8",
    "rra",
    // 0x20..=0x2F
    "jr nz,e8",
    "ld hl,imm16",
    "ld (hl+),a",
    "inc hl",
    "inc h",
    "dec h",
    "ld h,imm8",
    "daa",
    "jr z,e8",
    "add hl,hl",
    "ld a,(hl+)",
    "dec hl",
    "inc l",
    "dec l",
    "ld l,imm8",
    "cpl",
    // 0x30..=0x3F
    "jr nc,e8",
    "ld sp,imm16",
    "ld (hl-),a",
    "inc sp",
    "inc (hl)",
    "dec (hl)",
    "ld (hl),imm8",
    "scf",
    "jr c,e8",
    "add hl,sp",
    "ld a,(hl-)",
    "dec sp",
    "inc a",
    "dec a",
    "ld a,imm8",
    "ccf",
    // 0x40..=0x4F
    "ld b,b",
    "ld b,c",
    "ld b,d",
    "ld b,e",
    "ld b,h",
    "ld b,l",
    "ld b,(hl)",
    "ld b,a",
    "ld c,b",
    "ld c,c",
    "ld c,d",
    "ld c,e",
    "ld c,h",
    "ld c,l",
    "ld c,(hl)",
    "ld c,a",
    // 0x50..=0x5F
    "ld d,b",
    "ld d,c",
    "ld d,d",
    "ld d,e",
    "ld d,h",
    "ld d,l",
    "ld d,(hl)",
    "ld d,a",
    "ld e,b",
    "ld e,c",
    "ld e,d",
    "ld e,e",
    "ld e,h",
    "ld e,l",
    "ld e,(hl)",
    "ld e,a",
    // 0x60..=0x6F
    "ld h,b",
    "ld h,c",
    "ld h,d",
    "ld h,e",
    "ld h,h",
    "ld h,l",
    "ld h,(hl)",
    "ld h,a",
    "ld l,b",
    "ld l,c",
    "ld l,d",
    "ld l,e",
    "ld l,h",
    "ld l,l",
    "ld l,(hl)",
    "ld l,a",
    // 0x70..=0x7F
    "ld (hl),b",
    "ld (hl),c",
    "ld (hl),d",
    "ld (hl),e",
    "ld (hl),h",
    "ld (hl),l",
    "halt",
    "ld (hl),a",
    "ld a,b",
    "ld a,c",
    "ld a,d",
    "ld a,e",
    "ld a,h",
    "ld a,l",
    "ld a,(hl)",
    "ld a,a",
    // 0x80..=0x8F
    "add a,b",
    "add a,c",
    "add a,d",
    "add a,e",
    "add a,h",
    "add a,l",
    "add a,(hl)",
    "add a,a",
    "adc a,b",
    "adc a,c",
    "adc a,d",
    "adc a,e",
    "adc a,h",
    "adc a,l",
    "adc a,(hl)",
    "adc a,a",
    // 0x90..=0x9F
    "sub b",
    "sub c",
    "sub d",
    "sub e",
    "sub h",
    "sub l",
    "sub (hl)",
    "sub a",
    "sbc a,b",
    "sbc a,c",
    "sbc a,d",
    "sbc a,e",
    "sbc a,h",
    "sbc a,l",
    "sbc a,(hl)",
    "sbc a,a",
    // 0xA0..=0xAF
    "and b",
    "and c",
    "and d",
    "and e",
    "and h",
    "and l",
    "and (hl)",
    "and a",
    "xor b",
    "xor c",
    "xor d",
    "xor e",
    "xor h",
    "xor l",
    "xor (hl)",
    "xor a",
    // 0xB0..=0xBF
    "or b",
    "or c",
    "or d",
    "or e",
    "or h",
    "or l",
    "or (hl)",
    "or a",
    "cp b",
    "cp c",
    "cp d",
    "cp e",
    "cp h",
    "cp l",
    "cp (hl)",
    "cp a",
    // 0xC0..=0xCF
    "ret nz",
    "pop bc",
    "jp nz,imm16",
    "jp imm16",
    "call nz,imm16",
    "push bc",
    "add a,imm8",
    "rst 0x00",
    "ret z",
    "ret",
    "jp z,imm16",
    "prefix cb",
    "call z,imm16",
    "call imm16",
    "adc a,imm8",
    "rst 0x08",
    // 0xD0..=0xDF
    "ret nc",
    "pop de",
    "jp nc,imm16",
    "unimplemented",
    "call nc,imm16",
    "push de",
    "sub imm8",
    "rst 0x10",
    "ret c",
    "reti",
    "jp c,imm16",
    "unimplemented",
    "call c,imm16",
    "unimplemented",
    "sbc a,imm8",
    "rst 0x18",
    // 0xE0..=0xEF
    "ldh (imm8),a",
    "pop hl",
    "ld (c),a",
    "unimplemented",
    "unimplemented",
    "push hl",
    "and imm8",
    "rst 0x20",
    "add sp,e8",
    "jp hl",
    "ld (imm16),a",
    "unimplemented",
    "unimplemented",
    "unimplemented",
    "xor imm8",
    "rst 0x28",
    // 0xF0..=0xFF
    "ldh a,(imm8)",
    "pop af",
    "ld a,(c)",
    "di",
    "unimplemented",
    "push af",
    "or imm8",
    "rst 0x30",
    "ld hl,sp+e8",
    "ld sp,hl",
    "ld a,(imm16)",
    "ei",
    "unimplemented",
    "unimplemented",
    "cp imm8",
    "rst 0x38",
];
