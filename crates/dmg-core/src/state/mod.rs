//! Architectural CPU state: register file and execution mode.

/// Register file with packed 8/16-bit views.
pub mod registers;
/// Fetch-loop execution mode.
pub mod run_mode;

pub use registers::{Reg16, Reg8, Registers, FLAGS_ACTIVE_MASK, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};
pub use run_mode::CpuMode;
