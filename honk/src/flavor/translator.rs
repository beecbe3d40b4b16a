//! The translator flavor: it re-proves the ECC op transcript of a folded
//! circuit over the other field of the curve cycle.
//!
//! The circuit fills a mini-trace; range-constraint sub-columns of that
//! mini-trace are packed by groups of [TranslatorFlavor::CONCATENATION_GROUP_SIZE]
//! into concatenated columns, so the key is sized to
//! `mini_circuit_size * CONCATENATION_GROUP_SIZE` rows.

use super::{
    EntityGroup, EntitySchema, Flavor, ProverPolynomials, ScalarField, BaseField,
};
use crate::{
    circuit::translator::TranslatorCircuitBuilder,
    circuit::Circuit,
    config::ProverConfig,
    error::{SchemaError, SetupError},
    range_constraint::{fill_range_constraint_numerator, range_constraint_numerator_sequence},
    relations::{translator::TRANSLATOR_RELATIONS, RelationDescriptor},
    trace::{
        check_maximum_size, compute_mini_circuit_dyadic_size, validate_dyadic_size,
        TraceMetadata, TraceSizes,
    },
};
use ark_ff::{One, Zero};
use honk_utils::Polynomial;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use strum::{EnumCount, IntoEnumIterator};
use tracing::debug;

entity_group! {
    /// Columns fixed by the mini-circuit size only.
    pub enum TranslatorPrecomputed {
        role: Precomputed,
        offset: 0,
        columns: [
            OrderedExtraRangeConstraintsNumerator => "ordered_extra_range_constraints_numerator",
            LagrangeFirst => "lagrange_first",
            LagrangeLast => "lagrange_last",
            LagrangeOddInMinicircuit => "lagrange_odd_in_minicircuit",
            LagrangeEvenInMinicircuit => "lagrange_even_in_minicircuit",
            LagrangeSecond => "lagrange_second",
            LagrangeSecondToLastInMinicircuit => "lagrange_second_to_last_in_minicircuit",
        ]
    }
}

entity_group! {
    pub enum TranslatorWireNonShifted {
        role: Wire,
        offset: TranslatorPrecomputed::OFFSET + <TranslatorPrecomputed as EnumCount>::COUNT,
        columns: [Op => "op"]
    }
}

entity_group! {
    /// Transcript, limb and micro-limb wires. Every one of them is read at
    /// the next row as well.
    pub enum TranslatorWireToBeShifted {
        role: WireToBeShifted,
        offset: TranslatorWireNonShifted::OFFSET + <TranslatorWireNonShifted as EnumCount>::COUNT,
        columns: [
            XLoYHi => "x_lo_y_hi",
            XHiZ1 => "x_hi_z_1",
            YLoZ2 => "y_lo_z_2",
            PXLowLimbs => "p_x_low_limbs",
            PXLowLimbsRangeConstraint0 => "p_x_low_limbs_range_constraint_0",
            PXLowLimbsRangeConstraint1 => "p_x_low_limbs_range_constraint_1",
            PXLowLimbsRangeConstraint2 => "p_x_low_limbs_range_constraint_2",
            PXLowLimbsRangeConstraint3 => "p_x_low_limbs_range_constraint_3",
            PXLowLimbsRangeConstraint4 => "p_x_low_limbs_range_constraint_4",
            PXLowLimbsRangeConstraintTail => "p_x_low_limbs_range_constraint_tail",
            PXHighLimbs => "p_x_high_limbs",
            PXHighLimbsRangeConstraint0 => "p_x_high_limbs_range_constraint_0",
            PXHighLimbsRangeConstraint1 => "p_x_high_limbs_range_constraint_1",
            PXHighLimbsRangeConstraint2 => "p_x_high_limbs_range_constraint_2",
            PXHighLimbsRangeConstraint3 => "p_x_high_limbs_range_constraint_3",
            PXHighLimbsRangeConstraint4 => "p_x_high_limbs_range_constraint_4",
            PXHighLimbsRangeConstraintTail => "p_x_high_limbs_range_constraint_tail",
            PYLowLimbs => "p_y_low_limbs",
            PYLowLimbsRangeConstraint0 => "p_y_low_limbs_range_constraint_0",
            PYLowLimbsRangeConstraint1 => "p_y_low_limbs_range_constraint_1",
            PYLowLimbsRangeConstraint2 => "p_y_low_limbs_range_constraint_2",
            PYLowLimbsRangeConstraint3 => "p_y_low_limbs_range_constraint_3",
            PYLowLimbsRangeConstraint4 => "p_y_low_limbs_range_constraint_4",
            PYLowLimbsRangeConstraintTail => "p_y_low_limbs_range_constraint_tail",
            PYHighLimbs => "p_y_high_limbs",
            PYHighLimbsRangeConstraint0 => "p_y_high_limbs_range_constraint_0",
            PYHighLimbsRangeConstraint1 => "p_y_high_limbs_range_constraint_1",
            PYHighLimbsRangeConstraint2 => "p_y_high_limbs_range_constraint_2",
            PYHighLimbsRangeConstraint3 => "p_y_high_limbs_range_constraint_3",
            PYHighLimbsRangeConstraint4 => "p_y_high_limbs_range_constraint_4",
            PYHighLimbsRangeConstraintTail => "p_y_high_limbs_range_constraint_tail",
            ZLowLimbs => "z_low_limbs",
            ZLowLimbsRangeConstraint0 => "z_low_limbs_range_constraint_0",
            ZLowLimbsRangeConstraint1 => "z_low_limbs_range_constraint_1",
            ZLowLimbsRangeConstraint2 => "z_low_limbs_range_constraint_2",
            ZLowLimbsRangeConstraint3 => "z_low_limbs_range_constraint_3",
            ZLowLimbsRangeConstraint4 => "z_low_limbs_range_constraint_4",
            ZLowLimbsRangeConstraintTail => "z_low_limbs_range_constraint_tail",
            ZHighLimbs => "z_high_limbs",
            ZHighLimbsRangeConstraint0 => "z_high_limbs_range_constraint_0",
            ZHighLimbsRangeConstraint1 => "z_high_limbs_range_constraint_1",
            ZHighLimbsRangeConstraint2 => "z_high_limbs_range_constraint_2",
            ZHighLimbsRangeConstraint3 => "z_high_limbs_range_constraint_3",
            ZHighLimbsRangeConstraint4 => "z_high_limbs_range_constraint_4",
            ZHighLimbsRangeConstraintTail => "z_high_limbs_range_constraint_tail",
            AccumulatorsBinaryLimbs0 => "accumulators_binary_limbs_0",
            AccumulatorsBinaryLimbs1 => "accumulators_binary_limbs_1",
            AccumulatorsBinaryLimbs2 => "accumulators_binary_limbs_2",
            AccumulatorsBinaryLimbs3 => "accumulators_binary_limbs_3",
            AccumulatorLowLimbsRangeConstraint0 => "accumulator_low_limbs_range_constraint_0",
            AccumulatorLowLimbsRangeConstraint1 => "accumulator_low_limbs_range_constraint_1",
            AccumulatorLowLimbsRangeConstraint2 => "accumulator_low_limbs_range_constraint_2",
            AccumulatorLowLimbsRangeConstraint3 => "accumulator_low_limbs_range_constraint_3",
            AccumulatorLowLimbsRangeConstraint4 => "accumulator_low_limbs_range_constraint_4",
            AccumulatorLowLimbsRangeConstraintTail => "accumulator_low_limbs_range_constraint_tail",
            AccumulatorHighLimbsRangeConstraint0 => "accumulator_high_limbs_range_constraint_0",
            AccumulatorHighLimbsRangeConstraint1 => "accumulator_high_limbs_range_constraint_1",
            AccumulatorHighLimbsRangeConstraint2 => "accumulator_high_limbs_range_constraint_2",
            AccumulatorHighLimbsRangeConstraint3 => "accumulator_high_limbs_range_constraint_3",
            AccumulatorHighLimbsRangeConstraint4 => "accumulator_high_limbs_range_constraint_4",
            AccumulatorHighLimbsRangeConstraintTail => "accumulator_high_limbs_range_constraint_tail",
            QuotientLowBinaryLimbs => "quotient_low_binary_limbs",
            QuotientHighBinaryLimbs => "quotient_high_binary_limbs",
            QuotientLowLimbsRangeConstraint0 => "quotient_low_limbs_range_constraint_0",
            QuotientLowLimbsRangeConstraint1 => "quotient_low_limbs_range_constraint_1",
            QuotientLowLimbsRangeConstraint2 => "quotient_low_limbs_range_constraint_2",
            QuotientLowLimbsRangeConstraint3 => "quotient_low_limbs_range_constraint_3",
            QuotientLowLimbsRangeConstraint4 => "quotient_low_limbs_range_constraint_4",
            QuotientLowLimbsRangeConstraintTail => "quotient_low_limbs_range_constraint_tail",
            QuotientHighLimbsRangeConstraint0 => "quotient_high_limbs_range_constraint_0",
            QuotientHighLimbsRangeConstraint1 => "quotient_high_limbs_range_constraint_1",
            QuotientHighLimbsRangeConstraint2 => "quotient_high_limbs_range_constraint_2",
            QuotientHighLimbsRangeConstraint3 => "quotient_high_limbs_range_constraint_3",
            QuotientHighLimbsRangeConstraint4 => "quotient_high_limbs_range_constraint_4",
            QuotientHighLimbsRangeConstraintTail => "quotient_high_limbs_range_constraint_tail",
            RelationWideLimbs => "relation_wide_limbs",
            RelationWideLimbsRangeConstraint0 => "relation_wide_limbs_range_constraint_0",
            RelationWideLimbsRangeConstraint1 => "relation_wide_limbs_range_constraint_1",
            RelationWideLimbsRangeConstraint2 => "relation_wide_limbs_range_constraint_2",
            RelationWideLimbsRangeConstraint3 => "relation_wide_limbs_range_constraint_3",
        ]
    }
}

entity_group! {
    /// Sorted copies of the concatenated range-constraint columns and of the
    /// numerator steps.
    pub enum TranslatorOrderedRangeConstraint {
        role: OrderedRangeConstraint,
        offset: TranslatorWireToBeShifted::OFFSET + <TranslatorWireToBeShifted as EnumCount>::COUNT,
        columns: [
            OrderedRangeConstraints0 => "ordered_range_constraints_0",
            OrderedRangeConstraints1 => "ordered_range_constraints_1",
            OrderedRangeConstraints2 => "ordered_range_constraints_2",
            OrderedRangeConstraints3 => "ordered_range_constraints_3",
            OrderedRangeConstraints4 => "ordered_range_constraints_4",
        ]
    }
}

entity_group! {
    pub enum TranslatorDerivedWitness {
        role: DerivedWitness,
        offset: TranslatorOrderedRangeConstraint::OFFSET
            + <TranslatorOrderedRangeConstraint as EnumCount>::COUNT,
        columns: [ZPerm => "z_perm"]
    }
}

entity_group! {
    pub enum TranslatorConcatenated {
        role: Concatenated,
        offset: TranslatorDerivedWitness::OFFSET + <TranslatorDerivedWitness as EnumCount>::COUNT,
        columns: [
            ConcatenatedRangeConstraints0 => "concatenated_range_constraints_0",
            ConcatenatedRangeConstraints1 => "concatenated_range_constraints_1",
            ConcatenatedRangeConstraints2 => "concatenated_range_constraints_2",
            ConcatenatedRangeConstraints3 => "concatenated_range_constraints_3",
        ]
    }
}

static SCHEMA: Lazy<Result<EntitySchema, SchemaError>> = Lazy::new(|| {
    EntitySchema::builder(TranslatorFlavor::NAME)
        .group::<TranslatorPrecomputed>()
        .group::<TranslatorWireNonShifted>()
        .group::<TranslatorWireToBeShifted>()
        .group::<TranslatorOrderedRangeConstraint>()
        .group::<TranslatorDerivedWitness>()
        .group::<TranslatorConcatenated>()
        .build(TranslatorFlavor::entity_counts())
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslatorFlavor;

impl TranslatorFlavor {
    pub const NUM_CONCATENATED_WIRES: usize = 4;
    /// Largest difference between consecutive values of an ordered column.
    pub const SORT_STEP: usize = 3;
    pub const MICRO_LIMB_BITS: usize = 14;
    /// Values in the ordered columns lie in `[0, MAX_VALUE]`.
    pub const MAX_VALUE: usize = (1 << Self::MICRO_LIMB_BITS) - 1;
    /// `op` followed by the to-be-shifted wires.
    pub const NUM_WIRES: usize = <TranslatorWireNonShifted as EnumCount>::COUNT
        + <TranslatorWireToBeShifted as EnumCount>::COUNT;

    /// The range-constraint sub-columns, by group: group `j` is packed into
    /// `concatenated_range_constraints_j`.
    pub fn groups_to_be_concatenated() -> [[TranslatorWireToBeShifted; 16]; 4] {
        use TranslatorWireToBeShifted::*;
        [
            [
                PXLowLimbsRangeConstraint0,
                PXLowLimbsRangeConstraint1,
                PXLowLimbsRangeConstraint2,
                PXLowLimbsRangeConstraint3,
                PXLowLimbsRangeConstraint4,
                PXLowLimbsRangeConstraintTail,
                PXHighLimbsRangeConstraint0,
                PXHighLimbsRangeConstraint1,
                PXHighLimbsRangeConstraint2,
                PXHighLimbsRangeConstraint3,
                PXHighLimbsRangeConstraint4,
                PXHighLimbsRangeConstraintTail,
                PYLowLimbsRangeConstraint0,
                PYLowLimbsRangeConstraint1,
                PYLowLimbsRangeConstraint2,
                PYLowLimbsRangeConstraint3,
            ],
            [
                PYLowLimbsRangeConstraint4,
                PYLowLimbsRangeConstraintTail,
                PYHighLimbsRangeConstraint0,
                PYHighLimbsRangeConstraint1,
                PYHighLimbsRangeConstraint2,
                PYHighLimbsRangeConstraint3,
                PYHighLimbsRangeConstraint4,
                PYHighLimbsRangeConstraintTail,
                ZLowLimbsRangeConstraint0,
                ZLowLimbsRangeConstraint1,
                ZLowLimbsRangeConstraint2,
                ZLowLimbsRangeConstraint3,
                ZLowLimbsRangeConstraint4,
                ZLowLimbsRangeConstraintTail,
                ZHighLimbsRangeConstraint0,
                ZHighLimbsRangeConstraint1,
            ],
            [
                ZHighLimbsRangeConstraint2,
                ZHighLimbsRangeConstraint3,
                ZHighLimbsRangeConstraint4,
                ZHighLimbsRangeConstraintTail,
                AccumulatorLowLimbsRangeConstraint0,
                AccumulatorLowLimbsRangeConstraint1,
                AccumulatorLowLimbsRangeConstraint2,
                AccumulatorLowLimbsRangeConstraint3,
                AccumulatorLowLimbsRangeConstraint4,
                AccumulatorLowLimbsRangeConstraintTail,
                AccumulatorHighLimbsRangeConstraint0,
                AccumulatorHighLimbsRangeConstraint1,
                AccumulatorHighLimbsRangeConstraint2,
                AccumulatorHighLimbsRangeConstraint3,
                AccumulatorHighLimbsRangeConstraint4,
                AccumulatorHighLimbsRangeConstraintTail,
            ],
            [
                QuotientLowLimbsRangeConstraint0,
                QuotientLowLimbsRangeConstraint1,
                QuotientLowLimbsRangeConstraint2,
                QuotientLowLimbsRangeConstraint3,
                QuotientLowLimbsRangeConstraint4,
                QuotientLowLimbsRangeConstraintTail,
                QuotientHighLimbsRangeConstraint0,
                QuotientHighLimbsRangeConstraint1,
                QuotientHighLimbsRangeConstraint2,
                QuotientHighLimbsRangeConstraint3,
                QuotientHighLimbsRangeConstraint4,
                QuotientHighLimbsRangeConstraintTail,
                RelationWideLimbsRangeConstraint0,
                RelationWideLimbsRangeConstraint1,
                RelationWideLimbsRangeConstraint2,
                RelationWideLimbsRangeConstraint3,
            ],
        ]
    }

    /// Packs the mini-trace columns of each group end to end:
    /// `concatenated_j[k * mini_circuit_size + i] = group_j[k][i]`.
    pub fn compute_concatenated_polynomials(
        polynomials: &mut ProverPolynomials<ScalarField<Self>>,
        mini_circuit_size: usize,
    ) {
        let groups = Self::groups_to_be_concatenated();
        for (group, target) in groups.iter().zip(TranslatorConcatenated::iter()) {
            let mut concatenated = Polynomial::dense(polynomials.circuit_size());
            concatenated
                .coeffs_mut()
                .par_chunks_mut(mini_circuit_size)
                .zip(group.par_iter())
                .for_each(|(chunk, member)| {
                    let member = polynomials.get(*member);
                    for (row, value) in chunk.iter_mut().enumerate() {
                        *value = member.get(row);
                    }
                });
            polynomials[target] = concatenated;
        }
    }

    fn populate_wires(
        polynomials: &mut ProverPolynomials<ScalarField<Self>>,
        circuit: &TranslatorCircuitBuilder<ScalarField<Self>, BaseField<Self>>,
    ) -> Result<(), SetupError> {
        if circuit.num_wires() != Self::NUM_WIRES {
            return Err(SetupError::WireCountMismatch {
                expected: Self::NUM_WIRES,
                got: circuit.num_wires(),
            });
        }
        let schema = polynomials.schema();
        let wire_columns = TranslatorWireNonShifted::iter()
            .map(EntityGroup::column)
            .chain(TranslatorWireToBeShifted::iter().map(EntityGroup::column));

        for (wire, column) in wire_columns.enumerate() {
            let values = circuit.wire_values(wire);
            let name = schema.name(column);
            let poly = polynomials.get_mut(column);
            if values.len() > poly.virtual_size() {
                return Err(SetupError::WireTooLong {
                    wire: name,
                    len: values.len(),
                    available: poly.virtual_size(),
                });
            }
            let start = poly.start_index();
            if values.iter().take(start).any(|v| !v.is_zero()) {
                return Err(SetupError::NonZeroShiftedRow(name));
            }
            if values.len() > start {
                poly.coeffs_mut()[..values.len() - start].copy_from_slice(&values[start..]);
            }
        }
        Ok(())
    }

    fn populate_precomputed(
        kind: TranslatorPrecomputed,
        poly: &mut Polynomial<ScalarField<Self>>,
        sizes: &TraceSizes,
    ) -> Result<(), SetupError> {
        let one = ScalarField::<Self>::one();
        let mini = sizes.mini_circuit_size;
        match kind {
            TranslatorPrecomputed::OrderedExtraRangeConstraintsNumerator => {
                let sequence = range_constraint_numerator_sequence(Self::MAX_VALUE, Self::SORT_STEP);
                fill_range_constraint_numerator(poly, &sequence, Self::NUM_CONCATENATED_WIRES + 1)?;
            }
            TranslatorPrecomputed::LagrangeFirst => poly.set(0, one),
            TranslatorPrecomputed::LagrangeLast => poly.set(sizes.circuit_size - 1, one),
            TranslatorPrecomputed::LagrangeOddInMinicircuit => {
                for i in (1..mini - 1).step_by(2) {
                    poly.set(i, one);
                }
            }
            TranslatorPrecomputed::LagrangeEvenInMinicircuit => {
                for i in (1..mini - 1).step_by(2) {
                    poly.set(i + 1, one);
                }
            }
            TranslatorPrecomputed::LagrangeSecond => poly.set(1, one),
            TranslatorPrecomputed::LagrangeSecondToLastInMinicircuit => poly.set(mini - 2, one),
        }
        Ok(())
    }
}

impl Flavor for TranslatorFlavor {
    type Curve = ark_bn254::G1Affine;
    type CircuitBuilder = TranslatorCircuitBuilder<ScalarField<Self>, BaseField<Self>>;

    const NAME: &'static str = "translator";

    const NUM_PRECOMPUTED_ENTITIES: usize = 7;
    const NUM_WITNESS_ENTITIES: usize = 91;
    const NUM_ALL_ENTITIES: usize = 184;

    const MINIMUM_MINI_CIRCUIT_SIZE: usize = 2048;
    const CONCATENATION_GROUP_SIZE: usize = 16;

    const RELATIONS: &'static [RelationDescriptor] = &TRANSLATOR_RELATIONS;

    fn schema() -> Result<&'static EntitySchema, SchemaError> {
        SCHEMA.as_ref().map_err(Clone::clone)
    }

    fn compute_trace_sizes(
        circuit: &Self::CircuitBuilder,
        config: &ProverConfig,
    ) -> Result<TraceSizes, SetupError> {
        let mini_circuit_size =
            compute_mini_circuit_dyadic_size(circuit.num_gates(), Self::MINIMUM_MINI_CIRCUIT_SIZE);
        let circuit_size = mini_circuit_size * Self::CONCATENATION_GROUP_SIZE;
        validate_dyadic_size(mini_circuit_size, Self::MINIMUM_MINI_CIRCUIT_SIZE)?;
        validate_dyadic_size(
            circuit_size,
            Self::MINIMUM_MINI_CIRCUIT_SIZE * Self::CONCATENATION_GROUP_SIZE,
        )?;
        let sizes = TraceSizes {
            mini_circuit_size,
            circuit_size,
        };
        check_maximum_size(&sizes, config)?;
        Ok(sizes)
    }

    fn populate_polynomials(
        polynomials: &mut ProverPolynomials<ScalarField<Self>>,
        circuit: &Self::CircuitBuilder,
        sizes: &TraceSizes,
        _config: &ProverConfig,
    ) -> Result<TraceMetadata, SetupError> {
        Self::populate_wires(polynomials, circuit)?;

        let kinds: Vec<TranslatorPrecomputed> = TranslatorPrecomputed::iter().collect();
        polynomials
            .precomputed_mut()
            .par_iter_mut()
            .zip(kinds.into_par_iter())
            .try_for_each(|(poly, kind)| Self::populate_precomputed(kind, poly, sizes))?;

        debug!(
            mini_circuit_size = sizes.mini_circuit_size,
            circuit_size = sizes.circuit_size,
            "translator columns populated"
        );
        Ok(TraceMetadata::default())
    }

    fn key_challenges(circuit: &Self::CircuitBuilder) -> (BaseField<Self>, BaseField<Self>) {
        (circuit.batching_challenge_v, circuit.evaluation_input_x)
    }
}
