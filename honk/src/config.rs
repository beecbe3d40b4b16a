//! Prover configuration: the trace structuring and the largest circuit the
//! compiler accepts.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

/// Environment variable selecting the [TraceStructure].
pub const TRACE_STRUCTURE_VAR: &str = "HONK_TRACE_STRUCTURE";
/// Environment variable overriding [ProverConfig::max_log_circuit_size].
pub const MAX_LOG_CIRCUIT_SIZE_VAR: &str = "HONK_MAX_LOG_CIRCUIT_SIZE";

pub const DEFAULT_MAX_LOG_CIRCUIT_SIZE: u32 = 28;

/// Row capacities of the blocks of a structured trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceBlockCapacities {
    pub ecc_op: usize,
    pub pub_inputs: usize,
    pub gates: usize,
}

impl TraceBlockCapacities {
    /// Rows used by all blocks, not counting the zero row.
    pub fn total(&self) -> usize {
        self.ecc_op + self.pub_inputs + self.gates
    }
}

/// Shape hint for the execution trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStructure {
    /// Blocks are packed one after the other.
    #[default]
    None,
    /// Blocks sit at fixed offsets with small capacities.
    SmallTest,
}

impl TraceStructure {
    pub fn capacities(&self) -> Option<TraceBlockCapacities> {
        match self {
            TraceStructure::None => None,
            TraceStructure::SmallTest => Some(TraceBlockCapacities {
                ecc_op: 1 << 8,
                pub_inputs: 1 << 6,
                gates: 1 << 9,
            }),
        }
    }
}

impl FromStr for TraceStructure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(TraceStructure::None),
            "small_test" => Ok(TraceStructure::SmallTest),
            _ => Err(ConfigError::InvalidVariable {
                name: TRACE_STRUCTURE_VAR,
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    pub trace_structure: TraceStructure,
    pub max_log_circuit_size: u32,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            trace_structure: TraceStructure::None,
            max_log_circuit_size: DEFAULT_MAX_LOG_CIRCUIT_SIZE,
        }
    }
}

impl ProverConfig {
    pub fn with_trace_structure(mut self, trace_structure: TraceStructure) -> Self {
        self.trace_structure = trace_structure;
        self
    }

    /// Reads the configuration from the environment, using the defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(value) = env::var(TRACE_STRUCTURE_VAR) {
            config.trace_structure = value.parse()?;
        }
        if let Ok(value) = env::var(MAX_LOG_CIRCUIT_SIZE_VAR) {
            config.max_log_circuit_size =
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidVariable {
                        name: MAX_LOG_CIRCUIT_SIZE_VAR,
                        value: value.clone(),
                    })?;
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
