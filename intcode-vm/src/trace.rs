//! Instruction tracing
//!
//! With debug mode on, the VM hands a `TraceEvent` to its sink after every
//! executed instruction. Tracing never changes program semantics.

use std::fmt;
use std::sync::{Arc, Mutex};

use log::trace;

use crate::vm::{Opcode, ParamMode};

/// A decoded operand: the value it resolved to and the mode used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub value: i64,
    pub mode: ParamMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub address: Option<i64>,
    pub ip: usize,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub result: Option<i64>,
    pub destination: Option<usize>,
    pub relative_base: i64,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(address) = self.address {
            write!(f, "[nic {address}] ")?;
        }
        write!(f, "ip: {} {}", self.ip, self.opcode)?;
        for operand in &self.operands {
            write!(f, " ({}, {})", operand.value, operand.mode)?;
        }
        if let Some(result) = self.result {
            write!(f, " result = {result}")?;
        }
        if let Some(destination) = self.destination {
            write!(f, " pos: {destination}")?;
        }
        if self.opcode == Opcode::UpdateBase {
            write!(f, " base: {}", self.relative_base)?;
        }
        Ok(())
    }
}

pub trait TraceSink: Send {
    fn record(&mut self, event: &TraceEvent);
}

/// Default sink, writes every event through `log::trace!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn record(&mut self, event: &TraceEvent) {
        trace!(target: "intcode::trace", "{event}");
    }
}

/// Collects events in memory. Clones share the same buffer, so a test can keep
/// one handle and give the other to the VM.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TraceSink for RecordingSink {
    fn record(&mut self, event: &TraceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let event = TraceEvent {
            address: Some(3),
            ip: 4,
            opcode: Opcode::Add,
            operands: vec![
                Operand { value: 2, mode: ParamMode::Position },
                Operand { value: 5, mode: ParamMode::Immediate },
            ],
            result: Some(7),
            destination: Some(10),
            relative_base: 0,
        };
        assert_eq!(
            event.to_string(),
            "[nic 3] ip: 4 ADD (2, pos) (5, imm) result = 7 pos: 10"
        );
    }

    #[test]
    fn test_recording_sink_shares_buffer() {
        let sink = RecordingSink::new();
        let mut handle = sink.clone();
        let event = TraceEvent {
            address: None,
            ip: 0,
            opcode: Opcode::Stop,
            operands: Vec::new(),
            result: None,
            destination: None,
            relative_base: 0,
        };
        handle.record(&event);
        assert_eq!(sink.events(), vec![event]);
    }
}
