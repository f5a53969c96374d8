use super::instruction::{Instr, Opcode, ParamMode};
use super::{StepOutcome, VMState, VM};
use crate::error::VmError;
use crate::trace::{Operand, TraceEvent};

impl VM {
    pub(super) fn execute_instruction(
        &mut self,
        instr: Instr,
        fallback: Option<i64>,
    ) -> Result<StepOutcome, VmError> {
        let ip = self.ip;

        match instr.opcode {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => {
                let a = self.read_param(&instr, 0)?;
                let b = self.read_param(&instr, 1)?;
                let dst = self.write_address(&instr, 2)?;
                let overflow = VmError::ArithmeticOverflow { ip, opcode: instr.opcode };

                let result = match instr.opcode {
                    Opcode::Add => a.value.checked_add(b.value).ok_or(overflow)?,
                    Opcode::Multiply => a.value.checked_mul(b.value).ok_or(overflow)?,
                    Opcode::LessThan => i64::from(a.value < b.value),
                    _ => i64::from(a.value == b.value),
                };

                self.memory.set(dst, result);
                self.trace(ip, instr.opcode, vec![a, b], Some(result), Some(dst));
                self.ip = ip + instr.width();
                Ok(StepOutcome::Continue)
            }

            Opcode::Store => {
                let dst = self.write_address(&instr, 0)?;
                // Nothing is consumed and ip stays put when starved
                let value = self
                    .next_input(fallback)
                    .ok_or(VmError::InputStarved { ip })?;

                self.memory.set(dst, value);
                let operand = Operand { value, mode: instr.modes[0] };
                self.trace(ip, instr.opcode, vec![operand], None, Some(dst));
                self.ip = ip + instr.width();
                Ok(StepOutcome::Continue)
            }

            Opcode::Output => {
                let a = self.read_param(&instr, 0)?;

                self.output_buffer.push(a.value);
                self.last_output = Some(a.value);
                self.trace(ip, instr.opcode, vec![a], None, None);
                self.ip = ip + instr.width();
                Ok(StepOutcome::Output(a.value))
            }

            Opcode::JumpTrue | Opcode::JumpFalse => {
                let a = self.read_param(&instr, 0)?;
                let target = self.read_param(&instr, 1)?;
                let taken = match instr.opcode {
                    Opcode::JumpTrue => a.value != 0,
                    _ => a.value == 0,
                };

                let destination = if taken {
                    let dst = self.to_address(target.value)?;
                    self.ip = dst;
                    Some(dst)
                } else {
                    self.ip = ip + instr.width();
                    None
                };
                self.trace(ip, instr.opcode, vec![a, target], Some(i64::from(taken)), destination);
                Ok(StepOutcome::Continue)
            }

            Opcode::UpdateBase => {
                let a = self.read_param(&instr, 0)?;
                self.relative_base = self
                    .relative_base
                    .checked_add(a.value)
                    .ok_or(VmError::ArithmeticOverflow { ip, opcode: instr.opcode })?;

                self.trace(ip, instr.opcode, vec![a], Some(self.relative_base), None);
                self.ip = ip + instr.width();
                Ok(StepOutcome::Continue)
            }

            Opcode::Stop => {
                self.trace(ip, instr.opcode, Vec::new(), None, None);
                self.ip = ip + instr.width();
                self.state = VMState::Halted;
                Ok(StepOutcome::Halted)
            }
        }
    }

    /// Fetch a cell, failing past the addressable limit
    pub(super) fn load(&self, address: usize) -> Result<i64, VmError> {
        if !self.memory.contains(address) {
            return Err(VmError::AddressOutOfRange {
                ip: self.ip,
                address,
                limit: self.memory.limit(),
            });
        }
        Ok(self.memory.get(address))
    }

    /// Turn a computed value into a checked memory address
    fn to_address(&self, value: i64) -> Result<usize, VmError> {
        if value < 0 {
            return Err(VmError::NegativeAddress { ip: self.ip, address: value });
        }
        let limit = self.memory.limit();
        match usize::try_from(value) {
            Ok(address) if address < limit => Ok(address),
            Ok(address) => Err(VmError::AddressOutOfRange { ip: self.ip, address, limit }),
            Err(_) => Err(VmError::AddressOutOfRange { ip: self.ip, address: usize::MAX, limit }),
        }
    }

    fn relative(&self, instr: &Instr, offset: i64) -> Result<i64, VmError> {
        offset
            .checked_add(self.relative_base)
            .ok_or(VmError::ArithmeticOverflow { ip: self.ip, opcode: instr.opcode })
    }

    fn read_param(&self, instr: &Instr, index: usize) -> Result<Operand, VmError> {
        let raw = self.load(self.ip + 1 + index)?;
        let mode = instr.modes[index];
        let value = match mode {
            ParamMode::Immediate => raw,
            ParamMode::Position => self.load(self.to_address(raw)?)?,
            ParamMode::Relative => self.load(self.to_address(self.relative(instr, raw)?)?)?,
        };
        Ok(Operand { value, mode })
    }

    /// Destinations are only ever positional or relative; decode rejects the rest
    fn write_address(&self, instr: &Instr, index: usize) -> Result<usize, VmError> {
        let raw = self.load(self.ip + 1 + index)?;
        match instr.modes[index] {
            ParamMode::Relative => self.to_address(self.relative(instr, raw)?),
            _ => self.to_address(raw),
        }
    }

    fn trace(
        &mut self,
        ip: usize,
        opcode: Opcode,
        operands: Vec<Operand>,
        result: Option<i64>,
        destination: Option<usize>,
    ) {
        if !self.config.debug {
            return;
        }
        let event = TraceEvent {
            address: self.address,
            ip,
            opcode,
            operands,
            result,
            destination,
            relative_base: self.relative_base,
        };
        self.sink.record(&event);
    }
}
