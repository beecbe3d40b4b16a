//! This module implements the error types of the proving-key compiler and of
//! the op-queue merge accumulator.

use honk_poly_commitment::error::CommitmentError;
use honk_utils::field_helpers::FieldHelpersError;
use thiserror::Error;

/// Structural defects of an entity schema, detected when the schema of a
/// flavor is first built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("the column {0} is declared twice")]
    DuplicateColumn(String),

    #[error("the column {name} is declared at slot {position} but its accessor points to slot {accessor}")]
    LayoutMismatch {
        name: String,
        position: usize,
        accessor: usize,
    },

    #[error("the precomputed column {0} is declared after a witness column")]
    PrecomputedAfterWitness(String),

    #[error("shifted columns are derived and cannot be declared ({0})")]
    DeclaredShift(String),

    #[error("the schema declares {declared} {kind} entities but defines {actual}")]
    EntityCountMismatch {
        kind: &'static str,
        declared: usize,
        actual: usize,
    },
}

/// Errors that can arise when building a proving key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("the entity schema is malformed: {0}")]
    Schema(#[from] SchemaError),

    #[error("the trace size {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("the trace size {size} is below the minimum {minimum}")]
    TraceTooSmall { size: usize, minimum: usize },

    #[error("the range constraint numerator needs {required} rows but its column has {available}")]
    RangeNumeratorOverflow { required: usize, available: usize },

    #[error("the circuit needs 2^{log_size} rows but at most 2^{max_log_size} are allowed")]
    CircuitTooLarge { log_size: usize, max_log_size: u32 },

    #[error("the {block} block holds {required} rows but its capacity is {capacity}")]
    BlockOverflow {
        block: &'static str,
        required: usize,
        capacity: usize,
    },

    #[error("the {column} databus column has {len} entries but the trace has {circuit_size} rows")]
    DatabusTooLarge {
        column: &'static str,
        len: usize,
        circuit_size: usize,
    },

    #[error("the circuit has {got} wires (expected {expected})")]
    WireCountMismatch { expected: usize, got: usize },

    #[error("the wire {wire} has {len} rows but the trace has {available}")]
    WireTooLong {
        wire: &'static str,
        len: usize,
        available: usize,
    },

    #[error("the wire {0} is shifted, its first row must be zero")]
    NonZeroShiftedRow(&'static str),
}

impl SetupError {
    /// Whether the error means that the flavor schema and the compiler
    /// disagree, as opposed to a problem with the circuit handed in.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SetupError::Schema(_)
                | SetupError::NotPowerOfTwo(_)
                | SetupError::TraceTooSmall { .. }
                | SetupError::RangeNumeratorOverflow { .. }
        )
    }
}

/// Errors raised while building a circuit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("the variable {0} does not exist")]
    UnknownVariable(u32),

    #[error("the {column} databus column has no entry {index} (length {len})")]
    DatabusIndexOutOfRange {
        column: &'static str,
        index: usize,
        len: usize,
    },

    #[error("the lookup table {table} has no entry {index}")]
    TableEntryOutOfRange { table: usize, index: usize },

    #[error("the lookup table {0} does not exist")]
    UnknownTable(usize),

    #[error("the translator circuit has no wire {0}")]
    UnknownWire(usize),

    #[error("the point could not be split into limbs: {0}")]
    Decomposition(#[from] FieldHelpersError),
}

/// Errors that can arise when creating a verification key
#[derive(Error, Debug)]
pub enum VerifierKeyError {
    #[error("the column {column} could not be committed: {source}")]
    Commitment {
        column: &'static str,
        source: CommitmentError,
    },

    #[error("the schema of the flavor is malformed: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors that can arise when accumulating ECC operations or building a
/// merge proof. A rejected merge proof is not an error.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("the op queue segment could not be committed: {0}")]
    Commitment(#[from] CommitmentError),

    #[error("no circuit has been appended to the op queue yet")]
    EmptyQueue,

    #[error("the shared op queue was poisoned by a panicking writer")]
    Poisoned,
}

/// Errors that can arise when reading the prover configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("the variable {name} has the invalid value {value:?}")]
    InvalidVariable { name: &'static str, value: String },

    #[error("the configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}
