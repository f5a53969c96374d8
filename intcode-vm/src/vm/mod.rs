/// VM module - fetch/decode/execute loop for IntCode programs

mod execution;
mod instruction;
mod memory;
mod state;

pub use instruction::{split_digits, Instr, Opcode, ParamMode};
pub use memory::Memory;
pub use state::{OutputEvent, RunResult, StepOutcome, VMState};

use std::collections::VecDeque;
use std::fmt;

use log::{debug, warn};

use crate::constants::ASCII_MAX;
use crate::error::VmError;
use crate::program::Program;
use crate::settings::VmConfig;
use crate::trace::{LogTraceSink, TraceSink};

/// The IntCode Virtual Machine
pub struct VM {
    // Template the memory is restored from on reset
    image: Vec<i64>,

    // Code and data share this address space
    memory: Memory,

    ip: usize,
    relative_base: i64,

    state: VMState,
    config: VmConfig,

    // Node identity, delivered once as the first consumed input
    address: Option<i64>,
    pending_address: Option<i64>,

    // Input channel for STORE
    input_buffer: VecDeque<i64>,

    // Every emitted value, until drained by the caller
    output_buffer: Vec<i64>,
    last_output: Option<i64>,
    last_opcode: Option<Opcode>,

    sink: Box<dyn TraceSink>,
}

impl VM {
    pub fn new(program: &Program, address: Option<i64>) -> Self {
        Self::with_config(program, address, VmConfig::default())
    }

    pub fn with_config(program: &Program, address: Option<i64>, config: VmConfig) -> Self {
        let image = program.cells().to_vec();
        let memory = Memory::new(&image, config.memory_headroom);

        VM {
            image,
            memory,
            ip: 0,
            relative_base: 0,
            state: VMState::Running,
            config,
            address,
            pending_address: address,
            input_buffer: VecDeque::new(),
            output_buffer: Vec::new(),
            last_output: None,
            last_opcode: None,
            sink: Box::new(LogTraceSink),
        }
    }

    /// Replace the sink debug-mode trace events go to
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = sink;
    }

    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn set_ascii_mode(&mut self, ascii: bool) {
        self.config.ascii_mode = ascii;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn set_suspend_on_output(&mut self, suspend: bool) {
        self.config.suspend_on_output = suspend;
    }

    pub fn state(&self) -> &VMState {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == VMState::Halted
    }

    pub fn address(&self) -> Option<i64> {
        self.address
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    pub fn last_opcode(&self) -> Option<Opcode> {
        self.last_opcode
    }

    pub fn last_output(&self) -> Option<i64> {
        self.last_output
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Append a value to the input channel
    pub fn feed_input(&mut self, value: i64) {
        self.input_buffer.push_back(value);
    }

    pub fn feed_inputs<I: IntoIterator<Item = i64>>(&mut self, values: I) {
        self.input_buffer.extend(values);
    }

    /// Queue every byte of `text` as one input value
    pub fn feed_ascii(&mut self, text: &str) {
        self.input_buffer.extend(text.bytes().map(i64::from));
    }

    /// Values waiting in the input channel, not counting a pending address
    pub fn pending_input(&self) -> usize {
        self.input_buffer.len()
    }

    /// Move the instruction pointer. A halted VM resumes from `ip` on the next
    /// run; an aborted one stays aborted.
    pub fn seek(&mut self, ip: usize) {
        self.ip = ip;
        if self.state == VMState::Halted {
            self.state = VMState::Running;
        }
    }

    /// Read a cell. Cells past the addressable limit read as 0.
    pub fn read_memory(&self, address: usize) -> i64 {
        self.memory.get(address)
    }

    /// Patch a cell before or between run segments
    pub fn write_memory(&mut self, address: usize, value: i64) -> Result<(), VmError> {
        if !self.memory.contains(address) {
            return Err(VmError::AddressOutOfRange {
                ip: self.ip,
                address,
                limit: self.memory.limit(),
            });
        }
        self.memory.set(address, value);
        Ok(())
    }

    /// Drain every value emitted since the last call
    pub fn take_output(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.output_buffer)
    }

    /// Drain emitted values, tagged with this instance's address
    pub fn take_output_events(&mut self) -> Vec<OutputEvent> {
        let address = self.address;
        self.take_output()
            .into_iter()
            .map(|value| OutputEvent { address, value })
            .collect()
    }

    /// Drain emitted values and render them for display
    pub fn render_output(&mut self) -> String {
        let values = self.take_output();
        render_output(&values, self.config.ascii_mode)
    }

    /// Execute a single instruction. STORE with an empty channel starves.
    pub fn step(&mut self) -> Result<StepOutcome, VmError> {
        self.step_with(None)
    }

    /// Run until STOP, or until the next OUTPUT when suspend-on-output is set.
    ///
    /// `fallback` feeds STORE when the address and the input channel are both
    /// exhausted. Without one, an empty channel returns `VmError::InputStarved`
    /// and the VM stays parked on the STORE so the caller can feed it and call
    /// `run` again.
    pub fn run(&mut self, fallback: Option<i64>) -> Result<RunResult, VmError> {
        loop {
            match self.step_with(fallback)? {
                StepOutcome::Continue => {}
                StepOutcome::Output(_) if self.config.suspend_on_output => break,
                StepOutcome::Output(_) => {}
                StepOutcome::Halted => break,
            }
        }
        Ok(self.result())
    }

    /// Resume segments until STOP and return everything emitted meanwhile
    pub fn run_to_completion(&mut self, fallback: Option<i64>) -> Result<Vec<i64>, VmError> {
        while !self.run(fallback)?.is_halted() {}
        Ok(self.take_output())
    }

    /// Restore memory from the image and clear registers, channels and state
    pub fn reset(&mut self) {
        self.memory.reload(&self.image);
        self.ip = 0;
        self.relative_base = 0;
        self.state = VMState::Running;
        self.pending_address = self.address;
        self.input_buffer.clear();
        self.output_buffer.clear();
        self.last_output = None;
        self.last_opcode = None;
    }

    fn result(&self) -> RunResult {
        RunResult {
            output: self.last_output,
            opcode: self.last_opcode,
            address: self.address,
        }
    }

    fn step_with(&mut self, fallback: Option<i64>) -> Result<StepOutcome, VmError> {
        match &self.state {
            VMState::Running => {}
            VMState::Halted => return Ok(StepOutcome::Halted),
            VMState::Aborted(e) => return Err(e.clone()),
        }

        let ip = self.ip;
        let outcome = self
            .load(ip)
            .and_then(|raw| Instr::decode(raw, ip))
            .and_then(|instr| {
                self.last_opcode = Some(instr.opcode);
                self.execute_instruction(instr, fallback)
            });

        match outcome {
            Err(e) if !e.is_recoverable() => {
                warn!("Aborting VM {:?}: {}", self.address, e);
                self.state = VMState::Aborted(e.clone());
                Err(e)
            }
            Ok(StepOutcome::Halted) => {
                debug!("TERMINATE (ip: {}, address: {:?})", self.ip, self.address);
                Ok(StepOutcome::Halted)
            }
            other => other,
        }
    }

    /// Take the next STORE value: address first, then channel, then fallback
    fn next_input(&mut self, fallback: Option<i64>) -> Option<i64> {
        self.pending_address
            .take()
            .or_else(|| self.input_buffer.pop_front())
            .or(fallback)
    }
}

impl fmt::Debug for VM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VM")
            .field("address", &self.address)
            .field("ip", &self.ip)
            .field("relative_base", &self.relative_base)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("pending_input", &self.input_buffer.len())
            .field("memory_cells", &self.memory.len())
            .finish()
    }
}

/// Render output values: characters in ASCII mode, otherwise `a, b, c`.
///
/// Values outside the ASCII range are printed as decimals even in ASCII mode.
pub fn render_output(values: &[i64], ascii: bool) -> String {
    if !ascii {
        return values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
    }

    let mut out = String::new();
    for &value in values {
        match u8::try_from(value) {
            Ok(byte) if i64::from(byte) <= ASCII_MAX => out.push(char::from(byte)),
            _ => {
                out.push_str(&value.to_string());
                out.push('\n');
            }
        }
    }
    out
}
