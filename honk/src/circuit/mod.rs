//! Circuits as seen by the trace compiler.

pub mod mega;
pub mod translator;

use std::borrow::Cow;

pub use mega::MegaCircuitBuilder;
pub use translator::TranslatorCircuitBuilder;

/// What the trace compiler reads from a finalized circuit.
pub trait Circuit<F: Clone> {
    /// Rows of the gate block.
    fn num_gates(&self) -> usize;

    fn num_wires(&self) -> usize;

    /// The values of wire `wire` on the rows of the gate block.
    fn wire_values(&self, wire: usize) -> Cow<'_, [F]>;

    fn public_inputs(&self) -> Cow<'_, [F]>;

    /// Rows taken by the lookup tables.
    fn tables_size(&self) -> usize {
        0
    }

    /// Rows taken by the ECC op block.
    fn ecc_op_block_size(&self) -> usize {
        0
    }
}
