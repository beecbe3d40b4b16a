//! Relations of the translator flavor.
//!
//! Only the opcode and delta-range relations are evaluated here; they read
//! nothing but the `op` wire, the ordered range-constraint columns and the
//! lagrange selectors. The others are known by their shape.

use super::{Relation, RelationDescriptor, RelationParameters};
use crate::flavor::{
    translator::{TranslatorOrderedRangeConstraint, TranslatorPrecomputed, TranslatorWireNonShifted},
    AllValues, TranslatorFlavor,
};
use ark_ff::PrimeField;
use strum::IntoEnumIterator;

/// `op` is one of the opcodes of the ECC op queue: `0`, `3`, `4` or `8`.
pub struct TranslatorOpcodeConstraintRelation;

impl Relation for TranslatorOpcodeConstraintRelation {
    const NAME: &'static str = "TranslatorOpcodeConstraintRelation";
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize] = &[5];

    fn accumulate<F: PrimeField>(
        evals: &mut [F],
        row: &AllValues<F>,
        _params: &RelationParameters<F>,
        scaling_factor: F,
    ) {
        let op = row[TranslatorWireNonShifted::Op];
        let tmp = op * (op - F::from(3u64)) * (op - F::from(4u64)) * (op - F::from(8u64));
        evals[0] += tmp * scaling_factor;
    }
}

/// Each ordered range-constraint column is non-decreasing by steps of at most
/// [TranslatorFlavor::SORT_STEP] and holds [TranslatorFlavor::MAX_VALUE] on
/// the last row.
pub struct TranslatorDeltaRangeConstraintRelation;

impl Relation for TranslatorDeltaRangeConstraintRelation {
    const NAME: &'static str = "TranslatorDeltaRangeConstraintRelation";
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize] = &[6, 6, 6, 6, 6, 3, 3, 3, 3, 3];

    fn accumulate<F: PrimeField>(
        evals: &mut [F],
        row: &AllValues<F>,
        _params: &RelationParameters<F>,
        scaling_factor: F,
    ) {
        let lagrange_last = row[TranslatorPrecomputed::LagrangeLast];
        let not_last = lagrange_last - F::one();
        let maximum = F::from(TranslatorFlavor::MAX_VALUE as u64);
        let num_ordered = TranslatorOrderedRangeConstraint::iter().count();

        for (i, column) in TranslatorOrderedRangeConstraint::iter().enumerate() {
            let current = row[column];
            let delta = *row.shifted(column) - current;
            let steps = (0..=TranslatorFlavor::SORT_STEP as u64)
                .fold(F::one(), |acc, step| acc * (delta - F::from(step)));
            evals[i] += steps * not_last * scaling_factor;
            evals[num_ordered + i] += (current - maximum) * lagrange_last * scaling_factor;
        }
    }
}

pub const TRANSLATOR_RELATIONS: [RelationDescriptor; 7] = [
    RelationDescriptor::new("TranslatorPermutationRelation", &[7, 3]),
    <TranslatorDeltaRangeConstraintRelation as Relation>::DESCRIPTOR,
    <TranslatorOpcodeConstraintRelation as Relation>::DESCRIPTOR,
    RelationDescriptor::new("TranslatorAccumulatorTransferRelation", &[3; 12]),
    RelationDescriptor::new("TranslatorDecompositionRelation", &[3; 48]),
    RelationDescriptor::new("TranslatorNonNativeFieldRelation", &[3, 3, 3]),
    RelationDescriptor::new("TranslatorZeroConstraintsRelation", &[3; 64]),
];
