//! Cycle costs that are not fixed by the base opcode table.

use crate::decoder::{CbInstruction, CbOp, Operand8};
use crate::encoding::Instruction;

/// `CB`-prefixed instruction forms with distinct cycle costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleCostKind {
    /// Any `CB` operation on a plain register.
    CbRegister,
    /// `bit n,(hl)`: read only.
    CbBitIndirect,
    /// Rotate, shift, swap, `res` or `set` on `(hl)`: read-modify-write.
    CbIndirectReadModifyWrite,
}

/// Single source-of-truth cycle-cost table for `CB`-prefixed forms,
/// prefix fetch included.
pub const CB_CYCLE_COST_TABLE: &[(CycleCostKind, u8)] = &[
    (CycleCostKind::CbRegister, 8),
    (CycleCostKind::CbBitIndirect, 12),
    (CycleCostKind::CbIndirectReadModifyWrite, 16),
];

/// Returns the cycle cost for one `CB` form.
#[must_use]
pub const fn cycle_cost(kind: CycleCostKind) -> u8 {
    let mut index = 0;
    while index < CB_CYCLE_COST_TABLE.len() {
        let (entry_kind, cost) = CB_CYCLE_COST_TABLE[index];
        if entry_kind as u8 == kind as u8 {
            return cost;
        }
        index += 1;
    }
    0
}

/// Classifies a decoded `CB` instruction.
#[must_use]
pub const fn classify_cb(instruction: CbInstruction) -> CycleCostKind {
    match (instruction.operand, instruction.op) {
        (Operand8::Reg(_), _) => CycleCostKind::CbRegister,
        (Operand8::HlIndirect, CbOp::Bit(_)) => CycleCostKind::CbBitIndirect,
        (Operand8::HlIndirect, _) => CycleCostKind::CbIndirectReadModifyWrite,
    }
}

/// Total cycles for a `CB`-prefixed instruction.
#[must_use]
pub const fn cb_cycle_cost(instruction: CbInstruction) -> u8 {
    cycle_cost(classify_cb(instruction))
}

/// Cycles charged for a base-table instruction.
#[must_use]
pub const fn instruction_cycles(instruction: &Instruction, branch_taken: bool) -> u8 {
    if branch_taken {
        instruction.taken_cycles()
    } else {
        instruction.cycles
    }
}
