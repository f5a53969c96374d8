use colored::*;

use crate::constants::{DEBUG_MEMORY_DISPLAY_WORDS, DEBUG_MEMORY_WORDS_PER_LINE};
use crate::vm::{Instr, Opcode, ParamMode, VMState, VM};

pub struct Debugger {}

impl Default for Debugger {
    fn default() -> Self {
        Self::new()
    }
}

impl Debugger {
    pub fn new() -> Self {
        Self {}
    }

    /// Format the instruction at `ip`. Returns `None` if the cell does not decode.
    pub fn format_at(cells: &[i64], ip: usize) -> Option<String> {
        let raw = cells.get(ip).copied().unwrap_or(0);
        let instr = Instr::decode(raw, ip).ok()?;

        let operands: Vec<String> = (0..instr.opcode.param_count())
            .map(|i| {
                let value = cells.get(ip + 1 + i).copied().unwrap_or(0);
                Self::format_operand(value, instr.modes[i])
            })
            .collect();

        if operands.is_empty() {
            Some(instr.opcode.to_string())
        } else {
            Some(format!("{} {}", instr.opcode, operands.join(", ")))
        }
    }

    /// Format the instruction the VM will execute next
    pub fn format_instruction(&self, vm: &VM) -> Option<String> {
        Self::format_at(vm.memory().as_slice(), vm.ip())
    }

    /// Linear disassembly. Cells that do not decode are listed as data.
    pub fn disassemble(cells: &[i64]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut ip = 0;

        while ip < cells.len() {
            match Instr::decode(cells[ip], ip) {
                Ok(instr) if ip + instr.width() <= cells.len() => {
                    let text = Self::format_at(cells, ip).unwrap_or_default();
                    let raw: Vec<String> = cells[ip..ip + instr.width()]
                        .iter()
                        .map(|c| c.to_string())
                        .collect();
                    lines.push(format!("{ip:05}  {text:<32} ; {}", raw.join(",")));
                    ip += instr.width();
                }
                _ => {
                    lines.push(format!("{ip:05}  {:<32} ; {}", "DATA", cells[ip]));
                    ip += 1;
                }
            }
        }

        lines
    }

    /// Print the current VM state in a pretty format
    pub fn print_state(&self, vm: &VM) {
        println!("\n{}", "─".repeat(80).bright_black());

        print!("{}: ", "IP".bright_cyan().bold());
        println!(
            "{:05}  {}: {}  {}: {}",
            vm.ip(),
            "Base".bright_cyan().bold(),
            vm.relative_base(),
            "State".bright_cyan().bold(),
            Self::format_state(vm.state())
        );

        if let Some(address) = vm.address() {
            println!("{}: {}", "Address".bright_cyan().bold(), address);
        }
        println!(
            "{}: {}",
            "Pending input".bright_cyan().bold(),
            vm.pending_input()
        );

        println!("\n{}", "Memory:".bright_cyan().bold());
        let start = vm.ip() - vm.ip() % DEBUG_MEMORY_WORDS_PER_LINE;
        for row in (start..start + DEBUG_MEMORY_DISPLAY_WORDS).step_by(DEBUG_MEMORY_WORDS_PER_LINE) {
            print!("  {}", format!("{row:05}:").bright_black());
            for address in row..row + DEBUG_MEMORY_WORDS_PER_LINE {
                let formatted = format!("{:>8}", vm.read_memory(address));
                if address == vm.ip() {
                    print!(" {}", formatted.bright_green().bold());
                } else if vm.read_memory(address) != 0 {
                    print!(" {}", formatted.bright_white());
                } else {
                    print!(" {}", formatted.bright_black());
                }
            }
            println!();
        }

        if let Some(formatted) = self.format_instruction(vm) {
            println!("\n{}", "Next Instruction:".bright_cyan().bold());
            print!("  [{:05}] ", vm.ip());

            let opcode = Instr::decode(vm.read_memory(vm.ip()), vm.ip())
                .map(|instr| instr.opcode)
                .ok();
            let colored = match opcode {
                Some(Opcode::Stop) => formatted.bright_red(),
                Some(Opcode::JumpTrue | Opcode::JumpFalse) => formatted.bright_yellow(),
                Some(Opcode::Store | Opcode::Output) => formatted.bright_blue(),
                _ => formatted.normal(),
            };
            println!("{colored}");
        }

        println!("{}", "─".repeat(80).bright_black());
    }

    fn format_state(state: &VMState) -> ColoredString {
        match state {
            VMState::Running => "Running".bright_green(),
            VMState::Halted => "Halted".bright_red(),
            VMState::Aborted(e) => format!("Aborted: {e}").bright_red().bold(),
        }
    }

    fn format_operand(value: i64, mode: ParamMode) -> String {
        match mode {
            ParamMode::Position => format!("[{value}]"),
            ParamMode::Immediate => format!("{value}"),
            ParamMode::Relative if value < 0 => format!("[rb{value}]"),
            ParamMode::Relative => format!("[rb+{value}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_modes() {
        let cells = [21101, 3, -4, 7, 204, -1, 99];
        assert_eq!(Debugger::format_at(&cells, 0).unwrap(), "ADD 3, -4, [rb+7]");
        assert_eq!(Debugger::format_at(&cells, 4).unwrap(), "OUTPUT [rb-1]");
        assert_eq!(Debugger::format_at(&cells, 6).unwrap(), "STOP");
        assert!(Debugger::format_at(&cells, 2).is_none());
    }

    #[test]
    fn test_disassemble_marks_data() {
        let lines = Debugger::disassemble(&[1002, 4, 3, 4, 33]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000  MULTIPLY [4], 3, [4]"));
        assert!(lines[0].ends_with("; 1002,4,3,4"));
        assert!(lines[1].contains("DATA"));
        assert!(lines[1].ends_with("; 33"));
    }
}
