use std::fmt;

use crate::error::VmError;

/// IntCode operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add = 1,
    Multiply = 2,
    Store = 3,
    Output = 4,
    JumpTrue = 5,
    JumpFalse = 6,
    LessThan = 7,
    Equals = 8,
    UpdateBase = 9,
    Stop = 99,
}

impl Opcode {
    pub fn from_i64(code: i64) -> Option<Self> {
        match code {
            1 => Some(Opcode::Add),
            2 => Some(Opcode::Multiply),
            3 => Some(Opcode::Store),
            4 => Some(Opcode::Output),
            5 => Some(Opcode::JumpTrue),
            6 => Some(Opcode::JumpFalse),
            7 => Some(Opcode::LessThan),
            8 => Some(Opcode::Equals),
            9 => Some(Opcode::UpdateBase),
            99 => Some(Opcode::Stop),
            _ => None,
        }
    }

    /// Number of parameter cells following the opcode cell
    pub fn param_count(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpTrue | Opcode::JumpFalse => 2,
            Opcode::Store | Opcode::Output | Opcode::UpdateBase => 1,
            Opcode::Stop => 0,
        }
    }

    /// Index of the parameter written by this opcode, if any
    pub fn destination_param(self) -> Option<usize> {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => Some(2),
            Opcode::Store => Some(0),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MULTIPLY",
            Opcode::Store => "STORE",
            Opcode::Output => "OUTPUT",
            Opcode::JumpTrue => "JUMP_TRUE",
            Opcode::JumpFalse => "JUMP_FALSE",
            Opcode::LessThan => "LESS_THAN",
            Opcode::Equals => "EQUALS",
            Opcode::UpdateBase => "UPDATE_BASE",
            Opcode::Stop => "STOP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamMode {
    Position = 0,
    Immediate = 1,
    Relative = 2,
}

impl ParamMode {
    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(ParamMode::Position),
            1 => Some(ParamMode::Immediate),
            2 => Some(ParamMode::Relative),
            _ => None,
        }
    }
}

impl fmt::Display for ParamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Position => write!(f, "pos"),
            ParamMode::Immediate => write!(f, "imm"),
            ParamMode::Relative => write!(f, "rel"),
        }
    }
}

/// Raw decoding of an instruction cell: opcode digits plus three mode digits.
///
/// No validation happens here; `Instr::decode` turns the digits into typed values.
pub fn split_digits(value: i64) -> (i64, [i64; 3]) {
    (
        value % 100,
        [(value / 100) % 10, (value / 1000) % 10, (value / 10000) % 10],
    )
}

/// A decoded instruction header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instr {
    pub opcode: Opcode,
    pub modes: [ParamMode; 3],
}

impl Instr {
    pub fn decode(value: i64, ip: usize) -> Result<Self, VmError> {
        let (code, digits) = split_digits(value);
        let opcode = Opcode::from_i64(code).ok_or(VmError::InvalidOpcode { ip, value })?;

        let mut modes = [ParamMode::Position; 3];
        for (param, digit) in digits.iter().enumerate().take(opcode.param_count()) {
            modes[param] = ParamMode::from_digit(*digit).ok_or(VmError::InvalidMode {
                ip,
                param: param + 1,
                mode: *digit,
            })?;
        }

        if let Some(dst) = opcode.destination_param() {
            if modes[dst] == ParamMode::Immediate {
                return Err(VmError::ImmediateDestination { ip, opcode });
            }
        }

        Ok(Self { opcode, modes })
    }

    /// Number of cells this instruction occupies, including the opcode cell
    pub fn width(&self) -> usize {
        self.opcode.param_count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_split_matches_formula() {
        for value in [1002, 1101, 21108, 204, 99, 3, 11105, 22201] {
            let (code, modes) = split_digits(value);
            assert_eq!(code, value % 100);
            assert_eq!(modes[0], (value / 100) % 10);
            assert_eq!(modes[1], (value / 1000) % 10);
            assert_eq!(modes[2], (value / 10000) % 10);
        }
    }

    #[test]
    fn test_decode_modes() {
        let instr = Instr::decode(21002, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Multiply);
        assert_eq!(
            instr.modes,
            [ParamMode::Position, ParamMode::Immediate, ParamMode::Relative]
        );
        assert_eq!(instr.width(), 4);
    }

    #[test]
    fn test_unused_mode_digits_are_ignored() {
        // STORE only has one parameter, the higher digits never matter
        let instr = Instr::decode(11203, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Store);
        assert_eq!(instr.modes[0], ParamMode::Relative);
    }

    #[test]
    fn test_rejects_bad_opcode() {
        assert_eq!(
            Instr::decode(42, 7),
            Err(VmError::InvalidOpcode { ip: 7, value: 42 })
        );
    }

    #[test]
    fn test_rejects_immediate_destination() {
        assert_eq!(
            Instr::decode(10001, 3),
            Err(VmError::ImmediateDestination { ip: 3, opcode: Opcode::Add })
        );
        assert_eq!(
            Instr::decode(103, 0),
            Err(VmError::ImmediateDestination { ip: 0, opcode: Opcode::Store })
        );
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert_eq!(
            Instr::decode(305, 12),
            Err(VmError::InvalidMode { ip: 12, param: 1, mode: 3 })
        );
    }
}
