//! IntCode VM driver
//!
//! Command line front end for single programs, NIC networks and disassembly.

mod cli;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use intcode_net::{Network, NetworkConfig};
use intcode_vm::debug::Debugger;
use intcode_vm::{Program, StepOutcome, VMState, VmConfig, VM};
use log::info;

use cli::{unescape, Cli, Commands, NetworkArgs, RunArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Commands::Run(args) if args.debug);
    if cli.verbose || debug {
        let level = if debug { "trace" } else { "debug" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }

    match cli.command {
        Commands::Run(args) => run_program(args),
        Commands::Network(args) => run_network(args),
        Commands::Disasm { file } => {
            let program = load_program(&file)?;
            for line in Debugger::disassemble(program.cells()) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn load_program(path: &std::path::Path) -> Result<Program> {
    Program::from_file(path).with_context(|| format!("Error reading program '{}'", path.display()))
}

fn run_program(args: RunArgs) -> Result<()> {
    let program = load_program(&args.file)?;

    let mut config = match &args.config {
        Some(path) => VmConfig::load(path)
            .with_context(|| format!("Error loading config '{}'", path.display()))?,
        None => VmConfig::default(),
    };
    if args.ascii {
        config.ascii_mode = true;
    }
    if args.debug {
        config.debug = true;
    }
    if args.no_suspend {
        config.suspend_on_output = false;
    }

    let mut vm = VM::with_config(&program, args.address, config);
    for &(address, value) in &args.patch {
        vm.write_memory(address, value)
            .with_context(|| format!("Error patching cell {address}"))?;
    }
    vm.feed_inputs(args.input.iter().copied());
    if let Some(text) = &args.ascii_input {
        vm.feed_ascii(&unescape(text));
    }

    info!("Loaded {} cells from {}", program.len(), args.file.display());

    if args.step {
        return step_program(&mut vm, args.fallback);
    }

    run_segments(&mut vm, args.fallback, &mut io::stdout())?;

    if let Some(last) = vm.last_output() {
        info!("Last output: {last}");
    }
    Ok(())
}

/// Run to STOP, writing output after every segment
fn run_segments(vm: &mut VM, fallback: Option<i64>, out: &mut impl Write) -> Result<()> {
    loop {
        let result = vm.run(fallback);
        // Values emitted before a failure are still shown
        write_output(vm, out)?;
        match result {
            Ok(result) if result.is_halted() => return Ok(()),
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                anyhow::bail!("{e} (supply more values with -i or use --fallback)")
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn write_output(vm: &mut VM, out: &mut impl Write) -> io::Result<()> {
    if vm.config().ascii_mode {
        write!(out, "{}", vm.render_output())?;
    } else {
        for value in vm.take_output() {
            writeln!(out, "{value}")?;
        }
    }
    out.flush()
}

fn print_welcome() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║         IntCode VM Debugger - Interactive Mode               ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
    println!("Commands:");
    println!("  {}  Step one instruction", "Enter".bright_green().bold());
    println!("  {}       Run to completion", "r".bright_green().bold());
    println!("  {}       Quit debugger", "q".bright_green().bold());
    println!();
}

fn step_program(vm: &mut VM, fallback: Option<i64>) -> Result<()> {
    print_welcome();

    let stdin = io::stdin();
    let mut input = String::new();
    let debugger = Debugger::new();
    debugger.print_state(vm);

    loop {
        if matches!(vm.state(), VMState::Halted) {
            println!("\n{}", "Program halted".bright_red().bold());
            break;
        }

        print!("{} ", ">".bright_green().bold());
        io::stdout().flush()?;
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" => break,
            "r" => {
                vm.set_suspend_on_output(false);
                let result = vm.run(fallback);
                write_output(vm, &mut io::stdout())?;
                match result {
                    Ok(_) => break,
                    Err(e) if e.is_recoverable() => {
                        println!("{}: {}", "Waiting".bright_yellow().bold(), e);
                        debugger.print_state(vm);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            _ => {
                let mut outcome = vm.step();
                let starved = matches!(&outcome, Err(e) if e.is_recoverable());
                if let (true, Some(value)) = (starved, fallback) {
                    vm.feed_input(value);
                    outcome = vm.step();
                }
                match outcome {
                    Ok(StepOutcome::Output(value)) => {
                        vm.take_output();
                        println!("\n{}: {}", "Output".bright_cyan().bold(), value);
                    }
                    Ok(_) => {}
                    Err(e) if e.is_recoverable() => {
                        println!("{}: {}", "Waiting".bright_yellow().bold(), e);
                    }
                    Err(e) => return Err(e.into()),
                }
                debugger.print_state(vm);
            }
        }
    }

    Ok(())
}

fn run_network(args: NetworkArgs) -> Result<()> {
    let program = load_program(&args.file)?;

    let mut config = match &args.config {
        Some(path) => NetworkConfig::load(path)
            .with_context(|| format!("Error loading config '{}'", path.display()))?,
        None => NetworkConfig::default(),
    };
    if let Some(nodes) = args.nodes {
        config.nodes = nodes;
    }
    if let Some(monitor) = args.monitor {
        config.monitor_address = monitor;
    }
    if args.sequential {
        config.parallel = false;
    }

    let mut network = Network::new(&program, config);

    if args.nat {
        match network.run_with_nat(0)? {
            Some(packet) => println!(
                "{}: {}",
                "Repeated wake-up y".bright_green().bold(),
                packet.y
            ),
            None => println!("{}", "Monitor never received a packet".bright_yellow()),
        }
    } else {
        let report = network.run_until_idle()?;
        println!(
            "{} after {} rounds, {} packets routed",
            "Network idle".bright_green().bold(),
            report.rounds,
            report.packets
        );
    }

    for packet in network.monitor() {
        println!("  {} {}", "monitor".bright_cyan(), packet);
    }
    for packet in network.undeliverable() {
        println!("  {} {}", "dropped".bright_red(), packet);
    }

    Ok(())
}
