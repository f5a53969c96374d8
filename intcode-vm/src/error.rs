//! Error types for the IntCode VM
//!
//! Every variant except `InputStarved` is fatal: once returned, the instance is
//! aborted and every further `run` reports the same error.

use thiserror::Error;

use crate::vm::Opcode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Invalid opcode {value} at ip {ip}")]
    InvalidOpcode { ip: usize, value: i64 },

    #[error("Invalid addressing mode {mode} for parameter {param} at ip {ip}")]
    InvalidMode { ip: usize, param: usize, mode: i64 },

    #[error("{opcode} at ip {ip} uses immediate mode for its destination")]
    ImmediateDestination { ip: usize, opcode: Opcode },

    #[error("No input available for STORE at ip {ip}")]
    InputStarved { ip: usize },

    #[error("Negative memory address {address} at ip {ip}")]
    NegativeAddress { ip: usize, address: i64 },

    #[error("Memory address {address} at ip {ip} is beyond the addressable limit {limit}")]
    AddressOutOfRange { ip: usize, address: usize, limit: usize },

    #[error("Arithmetic overflow in {opcode} at ip {ip}")]
    ArithmeticOverflow { ip: usize, opcode: Opcode },
}

impl VmError {
    /// Whether the instance can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VmError::InputStarved { .. })
    }
}

/// Errors raised while parsing a program image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Program image is empty")]
    Empty,

    #[error("Invalid integer '{text}' at cell {index}")]
    InvalidCell { index: usize, text: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

/// Convert from std::io::Error
impl From<std::io::Error> for ProgramError {
    fn from(err: std::io::Error) -> Self {
        ProgramError::IoError {
            message: err.to_string(),
        }
    }
}

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
