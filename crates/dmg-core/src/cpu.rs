//! Fetch-decode-execute engine.

use crate::api::{
    CoreConfig, CoreState, RunBoundary, RunOutcome, StepOutcome, TraceEvent, TraceSink,
};
use crate::disasm::{DisassemblyRow, InstructionBytes};
use crate::encoding::lookup;
use crate::execute::execute_instruction;
use crate::fault::{Fault, FaultReport};
use crate::memory::Bus;
use crate::state::{CpuMode, Registers};

/// CPU core: architectural state, the bus it owns, and run counters.
#[derive(Debug)]
pub struct Cpu {
    state: CoreState,
    bus: Bus,
    retired: u64,
    cycles: u64,
    config: CoreConfig,
}

impl Cpu {
    /// Creates a core in the post-boot state around `bus`.
    #[must_use]
    pub fn new(bus: Bus, config: CoreConfig) -> Self {
        let mut cpu = Self {
            state: CoreState::default(),
            bus,
            retired: 0,
            cycles: 0,
            config,
        };
        cpu.reset();
        cpu
    }

    /// Restores post-boot registers, clears IME and counters, and resumes
    /// running. Mapped devices keep their contents.
    pub const fn reset(&mut self) {
        self.state.reset_canonical();
        self.retired = 0;
        self.cycles = 0;
    }

    /// Fetches, traces and executes one instruction.
    ///
    /// Does nothing and reports [`StepOutcome::Idle`] once the core has left
    /// the running mode.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that stopped the instruction. Register and bus
    /// side effects made before the fault are kept.
    pub fn step(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, Fault> {
        let mode_before = self.state.mode;
        if !mode_before.is_running() {
            return Ok(StepOutcome::Idle { mode: mode_before });
        }

        let start = self.state.registers.pc();
        let result = self.fetch_and_execute(start, sink);
        let cycles = match result {
            Ok(cycles) => cycles,
            Err(fault) => {
                if self.config.tracing_enabled {
                    sink.on_event(TraceEvent::FaultRaised { fault, pc: start });
                }
                return Err(fault);
            }
        };

        self.retired += 1;
        self.cycles += u64::from(cycles);

        if self.config.tracing_enabled {
            sink.on_event(TraceEvent::InstructionRetired { pc: start, cycles });
            if self.state.mode != mode_before {
                sink.on_event(TraceEvent::ModeChanged {
                    from: mode_before,
                    to: self.state.mode,
                });
            }
        }

        Ok(StepOutcome::Retired { cycles })
    }

    fn fetch_and_execute(&mut self, start: u16, sink: &mut dyn TraceSink) -> Result<u8, Fault> {
        let opcode = self.bus.read_byte(start)?;
        let instruction = lookup(opcode);

        let mut bytes = InstructionBytes::default();
        for _ in 0..instruction.length {
            let addr = self.state.registers.advance_pc();
            bytes.push(self.bus.read_byte(addr)?);
        }

        if self.config.tracing_enabled {
            sink.on_event(TraceEvent::InstructionStart(DisassemblyRow {
                addr: start,
                bytes,
                mnemonic: instruction.mnemonic,
            }));
        }

        let outcome = execute_instruction(instruction, &bytes, &mut self.state, &mut self.bus)?;
        Ok(outcome.cycles(instruction))
    }

    /// Steps until the core leaves the running mode or the configured step
    /// limit is reached. Does not reset first.
    ///
    /// # Errors
    ///
    /// Returns the first [`Fault`].
    pub fn run(&mut self, sink: &mut dyn TraceSink) -> Result<RunOutcome, Fault> {
        let retired_before = self.retired;
        let cycles_before = self.cycles;

        let boundary = loop {
            if !self.state.mode.is_running() {
                break RunBoundary::ModeChanged(self.state.mode);
            }
            if self
                .config
                .step_limit
                .is_some_and(|limit| self.retired - retired_before >= limit)
            {
                break RunBoundary::StepLimit;
            }
            self.step(sink)?;
        };

        Ok(RunOutcome {
            steps: self.retired - retired_before,
            cycles: self.cycles - cycles_before,
            boundary,
        })
    }

    /// Resets, then runs until halt, stop, the step limit, or a fault.
    ///
    /// # Errors
    ///
    /// Returns a [`FaultReport`] carrying the fault, a register snapshot taken
    /// after the fault, and the number of retired instructions.
    pub fn begin_execution(&mut self, sink: &mut dyn TraceSink) -> Result<RunOutcome, FaultReport> {
        self.reset();
        self.run(sink).map_err(|fault| FaultReport {
            fault,
            registers: self.state.registers,
            retired: self.retired,
        })
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.state.registers
    }

    /// Mutable register file, for test setup and debuggers.
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.state.registers
    }

    /// Full architectural state.
    #[must_use]
    pub const fn state(&self) -> &CoreState {
        &self.state
    }

    /// The owned bus.
    #[must_use]
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable access to the owned bus.
    pub const fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Current execution mode.
    #[must_use]
    pub const fn mode(&self) -> CpuMode {
        self.state.mode
    }

    /// Interrupt master enable.
    #[must_use]
    pub const fn ime(&self) -> bool {
        self.state.ime
    }

    /// Instructions retired since the last reset.
    #[must_use]
    pub const fn retired(&self) -> u64 {
        self.retired
    }

    /// Cycles consumed since the last reset.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }
}
