//! Instruction execution.
//!
//! [`execute_instruction`] runs one already-fetched instruction against the
//! core state and bus. `PC` already points past the instruction when it is
//! called; control-flow operations overwrite it.

mod alu;
mod flags;
mod helpers;

pub use alu::{
    add16, add_sp_offset, alu8, apply_bit_op, bit_test, daa, dec8, inc8, rotate_accumulator,
    shift,
};
pub use flags::FlagsUpdate;
pub use helpers::{
    indirect_address, modify_operand, pop_word, push_word, read_operand, relative_target,
    write_operand,
};

use crate::api::CoreState;
use crate::decoder::{decode_cb, CbInstruction, CbOp, Condition};
use crate::disasm::InstructionBytes;
use crate::encoding::{Instruction, Operation};
use crate::fault::Fault;
use crate::memory::Bus;
use crate::state::{CpuMode, Reg8, Registers, FLAG_C, FLAG_H, FLAG_N};
use crate::timing::{cb_cycle_cost, instruction_cycles};

/// Address of the high page used by `ldh` and `ld (c)`.
pub const HIGH_PAGE: u16 = 0xFF00;

/// Control-flow result of one executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteOutcome {
    /// Fell through, or an unconditional transfer with no surcharge.
    Sequential,
    /// A conditional branch was taken.
    BranchTaken,
    /// A `CB`-prefixed instruction ran.
    Prefixed(CbInstruction),
}

impl ExecuteOutcome {
    /// Cycles charged for `instruction` given this outcome.
    #[must_use]
    pub const fn cycles(self, instruction: &Instruction) -> u8 {
        match self {
            Self::Sequential => instruction_cycles(instruction, false),
            Self::BranchTaken => instruction_cycles(instruction, true),
            Self::Prefixed(cb) => cb_cycle_cost(cb),
        }
    }
}

/// Executes one fetched instruction.
///
/// # Errors
///
/// Returns [`Fault::Bus`] when a memory access fails and
/// [`Fault::UnimplementedOpcode`] for sentinel entries. In the latter case
/// `PC` is moved back to the offending opcode.
#[allow(clippy::too_many_lines)]
pub fn execute_instruction(
    instruction: &Instruction,
    bytes: &InstructionBytes,
    state: &mut CoreState,
    bus: &mut Bus,
) -> Result<ExecuteOutcome, Fault> {
    let regs = &mut state.registers;

    match instruction.operation {
        Operation::Nop => {}
        Operation::Stop => state.mode = CpuMode::Stopped,
        Operation::Halt => state.mode = CpuMode::Halted,
        Operation::DisableInterrupts => state.ime = false,
        Operation::EnableInterrupts => state.ime = true,
        Operation::LoadPairImmediate(pair) => regs.set_reg16(pair.reg16(), bytes.imm16()),
        Operation::StoreAccumulatorIndirect(indirect) => {
            let addr = indirect_address(regs, indirect);
            bus.write_byte(addr, regs.a())?;
        }
        Operation::LoadAccumulatorIndirect(indirect) => {
            let addr = indirect_address(regs, indirect);
            regs.set_a(bus.read_byte(addr)?);
        }
        Operation::StoreStackPointer => bus.write_word(bytes.imm16(), regs.sp())?,
        Operation::IncrementPair(pair) => {
            let reg = pair.reg16();
            regs.set_reg16(reg, regs.reg16(reg).wrapping_add(1));
        }
        Operation::DecrementPair(pair) => {
            let reg = pair.reg16();
            regs.set_reg16(reg, regs.reg16(reg).wrapping_sub(1));
        }
        Operation::AddHl(pair) => {
            let (result, flags) = add16(regs.hl(), regs.reg16(pair.reg16()));
            regs.set_hl(result);
            flags.apply(regs);
        }
        Operation::Increment(operand) => {
            let flags = modify_operand(regs, bus, operand, inc8)?;
            flags.apply(regs);
        }
        Operation::Decrement(operand) => {
            let flags = modify_operand(regs, bus, operand, dec8)?;
            flags.apply(regs);
        }
        Operation::LoadImmediate(operand) => write_operand(regs, bus, operand, bytes.imm8())?,
        Operation::Load { dst, src } => {
            let value = read_operand(regs, bus, src)?;
            write_operand(regs, bus, dst, value)?;
        }
        Operation::RotateLeftCircularA => rotate_a(regs, CbOp::Rlc),
        Operation::RotateRightCircularA => rotate_a(regs, CbOp::Rrc),
        Operation::RotateLeftA => rotate_a(regs, CbOp::Rl),
        Operation::RotateRightA => rotate_a(regs, CbOp::Rr),
        Operation::DecimalAdjust => {
            let (result, flags) = daa(
                regs.a(),
                regs.flag(FLAG_N),
                regs.flag(FLAG_H),
                regs.flag(FLAG_C),
            );
            regs.set_a(result);
            flags.apply(regs);
        }
        Operation::Complement => {
            regs.set_a(!regs.a());
            regs.set_flag(FLAG_N, true);
            regs.set_flag(FLAG_H, true);
        }
        Operation::SetCarry => {
            regs.set_flag(FLAG_N, false);
            regs.set_flag(FLAG_H, false);
            regs.set_flag(FLAG_C, true);
        }
        Operation::ComplementCarry => {
            let carry = regs.flag(FLAG_C);
            regs.set_flag(FLAG_N, false);
            regs.set_flag(FLAG_H, false);
            regs.set_flag(FLAG_C, !carry);
        }
        Operation::JumpRelative(condition) => {
            if condition.holds(regs) {
                regs.set_pc(relative_target(regs.pc(), bytes.imm8()));
                return Ok(branch_outcome(condition));
            }
        }
        Operation::Alu(op, operand) => {
            let value = read_operand(regs, bus, operand)?;
            let (result, flags) = alu8(op, regs.a(), value, regs.flag(FLAG_C));
            regs.set_a(result);
            flags.apply(regs);
        }
        Operation::AluImmediate(op) => {
            let (result, flags) = alu8(op, regs.a(), bytes.imm8(), regs.flag(FLAG_C));
            regs.set_a(result);
            flags.apply(regs);
        }
        Operation::Return(condition) => {
            if condition.holds(regs) {
                let target = pop_word(regs, bus)?;
                regs.set_pc(target);
                return Ok(branch_outcome(condition));
            }
        }
        Operation::ReturnFromInterrupt => {
            let target = pop_word(regs, bus)?;
            regs.set_pc(target);
            state.ime = true;
        }
        Operation::Pop(pair) => {
            let value = pop_word(regs, bus)?;
            regs.set_reg16(pair.reg16(), value);
        }
        Operation::Push(pair) => {
            let value = regs.reg16(pair.reg16());
            push_word(regs, bus, value)?;
        }
        Operation::Jump(condition) => {
            if condition.holds(regs) {
                regs.set_pc(bytes.imm16());
                return Ok(branch_outcome(condition));
            }
        }
        Operation::JumpHl => regs.set_pc(regs.hl()),
        Operation::Call(condition) => {
            if condition.holds(regs) {
                let ret = regs.pc();
                push_word(regs, bus, ret)?;
                regs.set_pc(bytes.imm16());
                return Ok(branch_outcome(condition));
            }
        }
        Operation::Restart(vector) => {
            let ret = regs.pc();
            push_word(regs, bus, ret)?;
            regs.set_pc(u16::from(vector));
        }
        Operation::Prefix => {
            let cb = decode_cb(bytes.imm8());
            execute_cb(cb, state, bus)?;
            return Ok(ExecuteOutcome::Prefixed(cb));
        }
        Operation::StoreHigh => bus.write_byte(HIGH_PAGE | u16::from(bytes.imm8()), regs.a())?,
        Operation::LoadHigh => regs.set_a(bus.read_byte(HIGH_PAGE | u16::from(bytes.imm8()))?),
        Operation::StoreHighC => {
            let addr = HIGH_PAGE | u16::from(regs.reg8(Reg8::C));
            bus.write_byte(addr, regs.a())?;
        }
        Operation::LoadHighC => {
            let addr = HIGH_PAGE | u16::from(regs.reg8(Reg8::C));
            regs.set_a(bus.read_byte(addr)?);
        }
        Operation::StoreAbsolute => bus.write_byte(bytes.imm16(), regs.a())?,
        Operation::LoadAbsolute => regs.set_a(bus.read_byte(bytes.imm16())?),
        Operation::AddStackPointer => {
            let (result, flags) = add_sp_offset(regs.sp(), bytes.imm8());
            regs.set_sp(result);
            flags.apply(regs);
        }
        Operation::LoadHlStackOffset => {
            let (result, flags) = add_sp_offset(regs.sp(), bytes.imm8());
            regs.set_hl(result);
            flags.apply(regs);
        }
        Operation::LoadStackPointerHl => regs.set_sp(regs.hl()),
        Operation::Unimplemented => {
            let pc = regs.pc().wrapping_sub(u16::from(instruction.length));
            regs.set_pc(pc);
            return Err(Fault::UnimplementedOpcode {
                opcode: bytes.opcode(),
                pc,
            });
        }
    }

    Ok(ExecuteOutcome::Sequential)
}

const fn branch_outcome(condition: Condition) -> ExecuteOutcome {
    if condition.is_conditional() {
        ExecuteOutcome::BranchTaken
    } else {
        ExecuteOutcome::Sequential
    }
}

fn rotate_a(regs: &mut Registers, op: CbOp) {
    let (result, flags) = rotate_accumulator(op, regs.a(), regs.flag(FLAG_C));
    regs.set_a(result);
    flags.apply(regs);
}

/// Executes a decoded `CB`-prefixed instruction.
///
/// # Errors
///
/// Returns [`Fault::Bus`] when the `(hl)` access fails. `bit n,(hl)` only
/// reads, so it succeeds on read-only devices.
pub fn execute_cb(cb: CbInstruction, state: &mut CoreState, bus: &mut Bus) -> Result<(), Fault> {
    let regs = &mut state.registers;
    let carry_in = regs.flag(FLAG_C);

    let flags = match cb.op {
        CbOp::Bit(bit) => bit_test(bit, read_operand(regs, bus, cb.operand)?),
        CbOp::Res(_) | CbOp::Set(_) => {
            modify_operand(regs, bus, cb.operand, |value| apply_bit_op(cb.op, value))?
        }
        _ => modify_operand(regs, bus, cb.operand, |value| shift(cb.op, value, carry_in))?,
    };
    flags.apply(regs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{execute_instruction, ExecuteOutcome};
    use crate::api::CoreState;
    use crate::disasm::InstructionBytes;
    use crate::encoding::lookup;
    use crate::fault::{BusError, Fault};
    use crate::memory::{Bus, RamDevice, RomDevice};
    use crate::state::{CpuMode, Reg8, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

    fn setup() -> (CoreState, Bus) {
        let mut state = CoreState::default();
        state.reset_canonical();
        let mut bus = Bus::new();
        bus.map(RomDevice::from_bytes(vec![0x00; 0x8000]));
        bus.map(RamDevice::work_ram());
        bus.map(RamDevice::high_ram());
        (state, bus)
    }

    /// Mimics the fetch stage: advances `PC` past the encoded bytes.
    fn run(state: &mut CoreState, bus: &mut Bus, encoded: &[u8]) -> Result<ExecuteOutcome, Fault> {
        let instruction = lookup(encoded[0]);
        let bytes = InstructionBytes::from_slice(&encoded[..usize::from(instruction.length)]);
        for _ in 0..instruction.length {
            state.registers.advance_pc();
        }
        execute_instruction(instruction, &bytes, state, bus)
    }

    #[test]
    fn ld_pair_immediate_is_little_endian() {
        let (mut state, mut bus) = setup();
        run(&mut state, &mut bus, &[0x01, 0x34, 0x12]).expect("executes");
        assert_eq!(state.registers.bc(), 0x1234);
        assert_eq!(state.registers.pc(), 0x0103);
    }

    #[test]
    fn hl_increment_store_advances_hl() {
        let (mut state, mut bus) = setup();
        state.registers.set_hl(0xC000);
        state.registers.set_a(0x5A);
        run(&mut state, &mut bus, &[0x22]).expect("executes");
        assert_eq!(bus.read_byte(0xC000), Ok(0x5A));
        assert_eq!(state.registers.hl(), 0xC001);

        run(&mut state, &mut bus, &[0x3A]).expect("executes");
        assert_eq!(state.registers.hl(), 0xC000);
    }

    #[test]
    fn xor_a_clears_accumulator_and_sets_only_zero() {
        let (mut state, mut bus) = setup();
        run(&mut state, &mut bus, &[0xAF]).expect("executes");
        assert_eq!(state.registers.a(), 0);
        assert_eq!(state.registers.f(), FLAG_Z);
    }

    #[test]
    fn inc_hl_indirect_on_rom_faults_read_only() {
        let (mut state, mut bus) = setup();
        state.registers.set_hl(0x0200);
        assert_eq!(
            run(&mut state, &mut bus, &[0x34]),
            Err(Fault::Bus(BusError::ReadOnlyViolation { addr: 0x0200 }))
        );
    }

    #[test]
    fn call_and_ret_round_trip() {
        let (mut state, mut bus) = setup();
        state.registers.set_sp(0xD000);
        assert_eq!(
            run(&mut state, &mut bus, &[0xCD, 0x00, 0x20]),
            Ok(ExecuteOutcome::Sequential)
        );
        assert_eq!(state.registers.pc(), 0x2000);
        assert_eq!(state.registers.sp(), 0xCFFE);
        assert_eq!(bus.read_word(0xCFFE), Ok(0x0103));

        run(&mut state, &mut bus, &[0xC9]).expect("executes");
        assert_eq!(state.registers.pc(), 0x0103);
        assert_eq!(state.registers.sp(), 0xD000);
    }

    #[test]
    fn conditional_call_not_taken_leaves_stack() {
        let (mut state, mut bus) = setup();
        state.registers.set_sp(0xD000);
        state.registers.set_flag(FLAG_Z, true);
        assert_eq!(
            run(&mut state, &mut bus, &[0xC4, 0x00, 0x20]),
            Ok(ExecuteOutcome::Sequential)
        );
        assert_eq!(state.registers.pc(), 0x0103);
        assert_eq!(state.registers.sp(), 0xD000);
    }

    #[test]
    fn reti_and_ei_di_toggle_ime() {
        let (mut state, mut bus) = setup();
        run(&mut state, &mut bus, &[0xFB]).expect("executes");
        assert!(state.ime);
        run(&mut state, &mut bus, &[0xF3]).expect("executes");
        assert!(!state.ime);

        state.registers.set_sp(0xCFFE);
        bus.write_word(0xCFFE, 0x4000).expect("mapped");
        run(&mut state, &mut bus, &[0xD9]).expect("executes");
        assert!(state.ime);
        assert_eq!(state.registers.pc(), 0x4000);
    }

    #[test]
    fn pop_af_masks_low_nibble() {
        let (mut state, mut bus) = setup();
        state.registers.set_sp(0xCFFE);
        bus.write_word(0xCFFE, 0x12FF).expect("mapped");
        run(&mut state, &mut bus, &[0xF1]).expect("executes");
        assert_eq!(state.registers.af(), 0x12F0);
    }

    #[test]
    fn ldh_round_trips_through_high_ram() {
        let (mut state, mut bus) = setup();
        state.registers.set_a(0x99);
        run(&mut state, &mut bus, &[0xE0, 0x80]).expect("executes");
        assert_eq!(bus.read_byte(0xFF80), Ok(0x99));

        state.registers.set_a(0);
        state.registers.set_reg8(Reg8::C, 0x80);
        run(&mut state, &mut bus, &[0xF2]).expect("executes");
        assert_eq!(state.registers.a(), 0x99);
    }

    #[test]
    fn cb_bit_on_rom_reads_without_fault() {
        let (mut state, mut bus) = setup();
        state.registers.set_hl(0x0200);
        state.registers.set_f(FLAG_C);
        let outcome = run(&mut state, &mut bus, &[0xCB, 0x46]).expect("bit only reads");
        assert_eq!(outcome.cycles(lookup(0xCB)), 12);
        assert_eq!(state.registers.f(), FLAG_Z | FLAG_H | FLAG_C);
    }

    #[test]
    fn cb_swap_and_set_on_registers() {
        let (mut state, mut bus) = setup();
        state.registers.set_a(0xF1);
        run(&mut state, &mut bus, &[0xCB, 0x37]).expect("executes");
        assert_eq!(state.registers.a(), 0x1F);
        assert_eq!(state.registers.f(), 0);

        run(&mut state, &mut bus, &[0xCB, 0xC0]).expect("executes");
        assert_eq!(state.registers.reg8(Reg8::B), 0x01);
    }

    #[test]
    fn halt_and_stop_change_mode() {
        let (mut state, mut bus) = setup();
        run(&mut state, &mut bus, &[0x76]).expect("executes");
        assert_eq!(state.mode, CpuMode::Halted);

        state.reset_canonical();
        run(&mut state, &mut bus, &[0x10, 0x00]).expect("executes");
        assert_eq!(state.mode, CpuMode::Stopped);
        assert_eq!(state.registers.pc(), 0x0102);
    }

    #[test]
    fn unimplemented_opcode_rewinds_pc() {
        let (mut state, mut bus) = setup();
        assert_eq!(
            run(&mut state, &mut bus, &[0xED]),
            Err(Fault::UnimplementedOpcode {
                opcode: 0xED,
                pc: 0x0100,
            })
        );
        assert_eq!(state.registers.pc(), 0x0100);
    }

    #[test]
    fn cpl_scf_ccf_flag_behaviour() {
        let (mut state, mut bus) = setup();
        state.registers.set_a(0x35);
        state.registers.set_f(0);
        run(&mut state, &mut bus, &[0x2F]).expect("executes");
        assert_eq!(state.registers.a(), 0xCA);
        assert_eq!(state.registers.f(), FLAG_N | FLAG_H);

        run(&mut state, &mut bus, &[0x37]).expect("executes");
        assert_eq!(state.registers.f(), FLAG_C);

        run(&mut state, &mut bus, &[0x3F]).expect("executes");
        assert_eq!(state.registers.f(), 0);
    }
}
