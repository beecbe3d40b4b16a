use super::Circuit;
use crate::{error::CircuitError, flavor::TranslatorFlavor, op_queue::UltraOp};
use ark_ff::PrimeField;
use std::borrow::Cow;

/// Index of the `op` wire.
pub const OP: usize = 0;
/// Indices of the wires holding the limbs of the transcript, in the order
/// `x_lo_y_hi`, `x_hi_z_1`, `y_lo_z_2`.
pub const TRANSCRIPT_WIRES: [usize; 3] = [1, 2, 3];

/// The wires of a translator circuit, `op` first and then the
/// to-be-shifted wires in layout order. Every wire starts with the zero row.
#[derive(Clone, Debug)]
pub struct TranslatorCircuitBuilder<F, B> {
    /// Challenge batching the non-native accumulation.
    pub batching_challenge_v: B,
    /// Point at which the op transcript is evaluated.
    pub evaluation_input_x: B,
    wires: Vec<Vec<F>>,
}

impl<F: PrimeField, B: PrimeField> TranslatorCircuitBuilder<F, B> {
    pub fn new(batching_challenge_v: B, evaluation_input_x: B) -> Self {
        Self {
            batching_challenge_v,
            evaluation_input_x,
            wires: vec![vec![F::zero()]; TranslatorFlavor::NUM_WIRES],
        }
    }

    /// Lays out the transcript of `ops`, two rows per op, after the zero row:
    /// `op` on the first row of each pair and the limbs on both rows.
    pub fn from_ultra_ops(
        batching_challenge_v: B,
        evaluation_input_x: B,
        ops: &[UltraOp<F>],
    ) -> Self {
        let mut builder = Self::new(batching_challenge_v, evaluation_input_x);
        let rows = ops.iter().flat_map(|op| op.rows());
        for row in rows {
            builder.wires[OP].push(row[0]);
            for (wire, value) in TRANSCRIPT_WIRES.iter().zip(&row[1..]) {
                builder.wires[*wire].push(*value);
            }
        }
        let num_rows = builder.wires[OP].len();
        for wire in builder.wires.iter_mut() {
            wire.resize(num_rows, F::zero());
        }
        builder
    }

    /// Replaces the values of one wire, zero row included.
    pub fn set_wire_values(&mut self, wire: usize, values: Vec<F>) -> Result<(), CircuitError> {
        let slot = self.wires.get_mut(wire).ok_or(CircuitError::UnknownWire(wire))?;
        *slot = values;
        Ok(())
    }
}

impl<F: PrimeField, B> Circuit<F> for TranslatorCircuitBuilder<F, B> {
    /// The longest wire, zero row included.
    fn num_gates(&self) -> usize {
        self.wires.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn num_wires(&self) -> usize {
        self.wires.len()
    }

    fn wire_values(&self, wire: usize) -> Cow<'_, [F]> {
        Cow::Borrowed(&self.wires[wire])
    }

    fn public_inputs(&self) -> Cow<'_, [F]> {
        Cow::Borrowed(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op_queue::EccOpCode;
    use ark_bn254::{Fq, Fr, G1Affine};
    use ark_ec::AffineRepr;
    use ark_ff::Zero;

    #[test]
    fn test_transcript_layout() {
        let op = UltraOp::new(EccOpCode::MUL_ACCUM, &G1Affine::generator(), Fr::from(7u64)).unwrap();
        let builder =
            TranslatorCircuitBuilder::<Fr, Fq>::from_ultra_ops(Fq::zero(), Fq::zero(), &[op, UltraOp::no_op()]);
        assert_eq!(builder.num_gates(), 5);
        assert_eq!(builder.num_wires(), 81);
        assert_eq!(
            builder.wire_values(OP).as_ref(),
            &[Fr::zero(), Fr::from(4u64), Fr::zero(), Fr::zero(), Fr::zero()]
        );
        assert_eq!(builder.wire_values(1)[1], op.x_lo);
        assert_eq!(builder.wire_values(1)[2], op.y_hi);
        assert_eq!(builder.wire_values(3)[2], op.z_2);
        assert!(builder.wire_values(80).iter().all(Zero::is_zero));
    }

    #[test]
    fn test_unknown_wire() {
        let mut builder = TranslatorCircuitBuilder::<Fr, Fq>::new(Fq::zero(), Fq::zero());
        assert_eq!(
            builder.set_wire_values(81, vec![]),
            Err(CircuitError::UnknownWire(81))
        );
        builder.set_wire_values(80, vec![Fr::zero(); 10]).unwrap();
        assert_eq!(builder.num_gates(), 10);
    }
}
