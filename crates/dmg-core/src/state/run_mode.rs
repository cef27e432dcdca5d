/// Execution mode that governs whether the fetch loop continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CpuMode {
    /// Fetching and executing instructions.
    #[default]
    Running,
    /// Entered by `halt`; waits for an interrupt that this core never raises.
    Halted,
    /// Entered by `stop`; waits for a wake condition that this core never raises.
    Stopped,
}

impl CpuMode {
    /// Returns `true` while the fetch loop should keep stepping.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Lower-case name used in trace output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Halted => "halted",
            Self::Stopped => "stopped",
        }
    }
}
