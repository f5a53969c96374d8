use crate::error::VmError;
use super::Opcode;

/// VM execution states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VMState {
    Running,
    Halted,
    Aborted(VmError),
}

/// What a single `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Output(i64),
    Halted,
}

/// A value emitted by OUTPUT, tagged with the emitting instance's address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEvent {
    pub address: Option<i64>,
    pub value: i64,
}

/// Returned by `run` whenever a run segment ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Most recent value the instance has emitted, if it ever emitted one
    pub output: Option<i64>,
    /// Opcode of the instruction that ended the segment
    pub opcode: Option<Opcode>,
    pub address: Option<i64>,
}

impl RunResult {
    pub fn is_halted(&self) -> bool {
        self.opcode == Some(Opcode::Stop)
    }
}
