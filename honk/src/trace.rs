//! Sizing of the execution trace.

use crate::{config::ProverConfig, error::SetupError};
use honk_utils::math;

/// Rows reserved at the top of the trace so that shifts are well defined.
pub const NUM_ZERO_ROWS: usize = 1;

/// Sizes of the trace of one circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceSizes {
    /// Rows filled by the circuit before concatenation.
    pub mini_circuit_size: usize,
    /// Rows of every column of the proving key.
    pub circuit_size: usize,
}

impl TraceSizes {
    pub fn log_circuit_size(&self) -> usize {
        math::ceil_log2(self.circuit_size)
    }
}

/// Where the public inputs sit in the trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceMetadata {
    pub num_public_inputs: usize,
    pub pub_inputs_offset: usize,
}

/// `next_power_of_two(max(num_gates, minimum))`.
pub fn compute_mini_circuit_dyadic_size(num_gates: usize, minimum: usize) -> usize {
    math::next_power_of_two_at_least(num_gates, minimum)
}

/// Size of a trace whose columns concatenate `group_size` mini-trace columns.
pub fn compute_concatenated_dyadic_size(num_gates: usize, minimum: usize, group_size: usize) -> usize {
    compute_mini_circuit_dyadic_size(num_gates, minimum) * group_size
}

/// Size of a trace holding a zero row followed by the larger of the lookup
/// tables and the other blocks.
pub fn compute_dyadic_size(
    tables_size: usize,
    num_public_inputs: usize,
    num_gates: usize,
    ecc_op_block_size: usize,
    minimum: usize,
) -> usize {
    let min_size_of_execution_trace = num_public_inputs + num_gates + ecc_op_block_size;
    let total_num_gates = NUM_ZERO_ROWS + tables_size.max(min_size_of_execution_trace);
    math::next_power_of_two_at_least(total_num_gates, minimum)
}

/// Rejects sizes the compiler cannot work with.
pub fn validate_dyadic_size(size: usize, minimum: usize) -> Result<(), SetupError> {
    if !size.is_power_of_two() {
        return Err(SetupError::NotPowerOfTwo(size));
    }
    if size < minimum {
        return Err(SetupError::TraceTooSmall { size, minimum });
    }
    Ok(())
}

/// Rejects circuits larger than the configuration allows.
pub fn check_maximum_size(sizes: &TraceSizes, config: &ProverConfig) -> Result<(), SetupError> {
    let log_size = sizes.log_circuit_size();
    if log_size > config.max_log_circuit_size as usize {
        return Err(SetupError::CircuitTooLarge {
            log_size,
            max_log_size: config.max_log_circuit_size,
        });
    }
    Ok(())
}
