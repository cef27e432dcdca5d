//! Host-facing configuration, state, step outcomes and trace hooks.

use std::fmt;

use crate::disasm::DisassemblyRow;
use crate::fault::Fault;
use crate::state::{CpuMode, Registers};

/// Runtime configuration for a [`crate::Cpu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Emit [`TraceEvent`]s to the sink passed to `step`/`run`.
    pub tracing_enabled: bool,
    /// Stop [`crate::Cpu::run`] after this many retired instructions.
    pub step_limit: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tracing_enabled: true,
            step_limit: None,
        }
    }
}

/// Architectural state mutated by instruction execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Register file.
    pub registers: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    /// Fetch-loop mode.
    pub mode: CpuMode,
}

impl CoreState {
    /// Restores post-boot registers, clears IME and resumes running.
    pub const fn reset_canonical(&mut self) {
        self.registers.reset();
        self.ime = false;
        self.mode = CpuMode::Running;
    }
}

/// Result of a single [`crate::Cpu::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// One instruction retired.
    Retired {
        /// Cycles consumed, including the taken-branch surcharge.
        cycles: u8,
    },
    /// Nothing executed because the core is not running.
    Idle {
        /// Mode that kept the core from fetching.
        mode: CpuMode,
    },
}

/// Why a [`crate::Cpu::run`] call returned without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunBoundary {
    /// A `halt` or `stop` left the running mode.
    ModeChanged(CpuMode),
    /// [`CoreConfig::step_limit`] was reached while still running.
    StepLimit,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Instructions retired during this run.
    pub steps: u64,
    /// Cycles consumed during this run.
    pub cycles: u64,
    /// What ended the run.
    pub boundary: RunBoundary,
}

/// Deterministic trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction fetched and about to execute.
    InstructionStart(DisassemblyRow),
    /// Instruction finished.
    InstructionRetired {
        /// Start address of the retired instruction.
        pc: u16,
        /// Cycles consumed.
        cycles: u8,
    },
    /// Execution mode changed.
    ModeChanged {
        /// Mode before the instruction.
        from: CpuMode,
        /// Mode after the instruction.
        to: CpuMode,
    },
    /// A fault stopped execution.
    FaultRaised {
        /// The fault.
        fault: Fault,
        /// Start address of the faulting instruction.
        pc: u16,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionStart(row) => write!(f, "{row}"),
            Self::InstructionRetired { pc, cycles } => {
                write!(f, "{pc:04X}: retired in {cycles} cycles")
            }
            Self::ModeChanged { from, to } => write!(f, "mode {} -> {}", from.name(), to.name()),
            Self::FaultRaised { fault, pc } => write!(f, "{pc:04X}: fault: {fault}"),
        }
    }
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
