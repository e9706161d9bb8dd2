use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kernel::Config;
use serde::{Deserialize, Serialize};
use types::Addr;

/// Runtime machine parameters. Missing fields in a config file fall back to
/// the compiled-in [`Config`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub memory_size: usize,
    pub quantum: u64,
    pub max_processes: usize,
    pub allocation_rows: usize,
    /// Hard stop for the clock loop.
    pub max_cycles: u64,
    /// Physical addresses reported after the run.
    pub probes: Vec<Addr>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: Config::MEMORY_SIZE,
            quantum: Config::TIME_QUANTUM,
            max_processes: Config::MAX_PROCESSES,
            allocation_rows: Config::ALLOCATION_ROWS,
            max_cycles: 1_000_000,
            probes: vec![30, 150, 230],
        }
    }
}

impl MachineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid machine config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = MachineConfig::from_json(r#"{ "quantum": 3, "probes": [] }"#).unwrap();
        assert_eq!(cfg.quantum, 3);
        assert!(cfg.probes.is_empty());
        assert_eq!(cfg.memory_size, Config::MEMORY_SIZE);
    }

    #[test]
    fn unknown_shape_is_rejected() {
        assert!(MachineConfig::from_json(r#"{ "quantum": "fast" }"#).is_err());
    }
}
