use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::DEFAULT_MEMORY_HEADROOM;
use crate::error::ConfigError;

/// Execution mode flags for a single VM instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Return from `run` right after every OUTPUT
    pub suspend_on_output: bool,

    /// Render outputs as characters
    pub ascii_mode: bool,

    /// Send a trace event for every executed instruction
    pub debug: bool,

    /// Cells addressable beyond the end of the program image
    pub memory_headroom: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            suspend_on_output: true,
            ascii_mode: false,
            debug: false,
            memory_headroom: DEFAULT_MEMORY_HEADROOM,
        }
    }
}

impl VmConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn with_suspend_on_output(mut self, suspend: bool) -> Self {
        self.suspend_on_output = suspend;
        self
    }

    pub fn with_ascii_mode(mut self, ascii: bool) -> Self {
        self.ascii_mode = ascii;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_memory_headroom(mut self, headroom: usize) -> Self {
        self.memory_headroom = headroom;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = VmConfig::default();
        assert!(config.suspend_on_output);
        assert!(!config.ascii_mode);
        assert!(!config.debug);
        assert_eq!(config.memory_headroom, DEFAULT_MEMORY_HEADROOM);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ascii_mode": true, "suspend_on_output": false }}"#).unwrap();

        let config = VmConfig::load(file.path()).unwrap();
        assert!(config.ascii_mode);
        assert!(!config.suspend_on_output);
        assert_eq!(config.memory_headroom, DEFAULT_MEMORY_HEADROOM);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(VmConfig::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
