use intcode_vm::{ConfigError, VmConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_NODES: usize = 50;
pub const DEFAULT_MONITOR_ADDRESS: i64 = 255;
pub const DEFAULT_IDLE_VALUE: i64 = -1;
pub const DEFAULT_MAX_ROUNDS: usize = 100_000;
pub const DEFAULT_SLICE_OUTPUT_LIMIT: usize = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Nodes get addresses `0..nodes`
    pub nodes: usize,

    /// Packets sent here are collected instead of delivered
    pub monitor_address: i64,

    /// Value a node with an empty inbox reads once per round
    pub idle_value: i64,

    /// Upper bound on rounds per `run_until_idle` call
    pub max_rounds: usize,

    /// Output values a node may emit in one service slice before it is
    /// preempted until the next round
    pub slice_output_limit: usize,

    /// Service nodes on the rayon pool
    pub parallel: bool,

    /// Per-node VM settings. Suspend-on-output is always forced on.
    pub vm: VmConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES,
            monitor_address: DEFAULT_MONITOR_ADDRESS,
            idle_value: DEFAULT_IDLE_VALUE,
            max_rounds: DEFAULT_MAX_ROUNDS,
            slice_output_limit: DEFAULT_SLICE_OUTPUT_LIMIT,
            parallel: true,
            vm: VmConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_monitor_address(mut self, address: i64) -> Self {
        self.monitor_address = address;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_slice_output_limit(mut self, limit: usize) -> Self {
        self.slice_output_limit = limit;
        self
    }
}
