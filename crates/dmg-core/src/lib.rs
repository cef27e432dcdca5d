//! Instruction-execution core for a DMG-class 8-bit CPU.

/// Memory model primitives, devices and the address bus.
pub mod memory;
pub use memory::{
    decode_memory_region, Bus, MemoryDevice, MemoryRegion, RamDevice, RegionDescriptor,
    RegisterDevice, RomDevice, UnusableDevice, FIXED_MEMORY_REGIONS, IE_ADDR, OPEN_BUS,
};

/// Cartridge image loading and header validation.
pub mod rom;
pub use rom::{header_checksum, RomError, RomImage};

/// Public host-facing configuration, outcome and trace types.
pub mod api;
pub use api::{
    CoreConfig, CoreState, NullTraceSink, RunBoundary, RunOutcome, StepOutcome, TraceEvent,
    TraceSink,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{CpuMode, Reg16, Reg8, Registers, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

/// Opcode table: mnemonic, length, cycles and operation per opcode.
pub mod encoding;
pub use encoding::{lookup, Instruction, Operation, OPCODE_TABLE};

/// Operand field decoding and the `CB` sub-table.
pub mod decoder;
pub use decoder::{
    decode_cb, AluOp, CbInstruction, CbOp, Condition, Indirect, Operand8, Pair, StackPair,
};

/// Fault taxonomy for bus and decode failures.
pub mod fault;
pub use fault::{BusError, Fault, FaultClass, FaultCode, FaultReport};

/// Cycle-cost table for `CB`-prefixed forms and branch surcharges.
pub mod timing;
pub use timing::{cb_cycle_cost, cycle_cost, CycleCostKind, CB_CYCLE_COST_TABLE};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{execute_cb, execute_instruction, ExecuteOutcome, FlagsUpdate};

/// Instruction disassembly for traces and fault dumps.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_range, DisassemblyRow, InstructionBytes};

/// Fetch-decode-execute engine.
pub mod cpu;
pub use cpu::Cpu;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
