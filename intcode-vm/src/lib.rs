//! IntCode virtual machine
//!
//! A fetch/decode/execute interpreter over signed 64-bit cells with three
//! addressing modes, an input channel with a one-shot node address, and
//! output that can suspend execution so callers drive the VM one value at a
//! time.

pub mod constants;
pub mod debug;
pub mod error;
pub mod program;
pub mod settings;
pub mod trace;
pub mod vm;

// Re-export commonly used types
pub use error::{ConfigError, ProgramError, VmError};
pub use program::Program;
pub use settings::VmConfig;
pub use trace::{LogTraceSink, RecordingSink, TraceEvent, TraceSink};
pub use vm::{render_output, Opcode, OutputEvent, ParamMode, RunResult, StepOutcome, VMState, VM};
