use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "icvm",
    about = "IntCode Virtual Machine - run IntCode programs and networks",
    long_about = "Runs comma separated IntCode program images, either as a single VM or as a\n\
                  network of NIC nodes that exchange (destination, x, y) packets.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable log output (RUST_LOG overrides the level)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single program
    Run(RunArgs),

    /// Run a network of NIC nodes
    Network(NetworkArgs),

    /// Print a linear disassembly of a program
    Disasm {
        /// Program image file
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Program image file
    pub file: PathBuf,

    /// Values for the input channel, in order
    #[arg(short = 'i', long = "input", allow_negative_numbers = true)]
    pub input: Vec<i64>,

    /// Text queued as ASCII input (\n, \t escapes are expanded)
    #[arg(long)]
    pub ascii_input: Option<String>,

    /// Value STORE reads when the input channel is empty
    #[arg(long, allow_negative_numbers = true)]
    pub fallback: Option<i64>,

    /// Node address delivered as the first input
    #[arg(long, allow_negative_numbers = true)]
    pub address: Option<i64>,

    /// Overwrite a memory cell before running (ADDR=VALUE)
    #[arg(short = 'p', long = "patch", value_parser = parse_patch)]
    pub patch: Vec<(usize, i64)>,

    /// Render output values as characters
    #[arg(short = 'a', long)]
    pub ascii: bool,

    /// Do not suspend after each OUTPUT
    #[arg(long)]
    pub no_suspend: bool,

    /// Trace every executed instruction
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Step through execution interactively
    #[arg(short = 's', long)]
    pub step: bool,

    /// JSON file with VM settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Program image file
    pub file: PathBuf,

    /// Number of nodes
    #[arg(short = 'n', long)]
    pub nodes: Option<usize>,

    /// Address whose packets are collected by the monitor
    #[arg(short = 'm', long)]
    pub monitor: Option<i64>,

    /// Re-send the last monitored packet to node 0 whenever the network idles
    #[arg(long)]
    pub nat: bool,

    /// Service nodes one after another instead of on the thread pool
    #[arg(long)]
    pub sequential: bool,

    /// JSON file with network settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse `ADDR=VALUE`
pub fn parse_patch(s: &str) -> Result<(usize, i64), String> {
    let (address, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid patch '{s}', expected ADDR=VALUE"))?;
    let address = address
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid patch address: {address}"))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid patch value: {value}"))?;
    Ok((address, value))
}

/// Expand the escapes a shell makes awkward to type
pub fn unescape(input: &str) -> String {
    input
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}
