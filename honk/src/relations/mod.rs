//! The contract between the relations of a flavor and the engine summing
//! them over the trace.
//!
//! A relation evaluates a few subrelations on one row of the trace. Only the
//! lengths of the subrelations (degree + 1) matter to the rest of the crate:
//! the batching logic sizes its univariates from them.

pub mod mega;
pub mod translator;

use crate::flavor::AllValues;
use ark_ff::PrimeField;

/// The challenges relations are evaluated with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationParameters<F> {
    pub eta: F,
    pub eta_two: F,
    pub eta_three: F,
    pub beta: F,
    pub gamma: F,
    pub public_input_delta: F,
    pub lookup_grand_product_delta: F,
    pub accumulated_result: [F; 4],
    pub evaluation_input_x: [F; 5],
    pub batching_challenge_v: [[F; 5]; 4],
}

/// Declared shape of a relation: its name and the partial and total lengths
/// of each of its subrelations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub name: &'static str,
    pub subrelation_partial_lengths: &'static [usize],
    pub subrelation_total_lengths: &'static [usize],
}

const fn max_of(lengths: &[usize]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < lengths.len() {
        if lengths[i] > max {
            max = lengths[i];
        }
        i += 1;
    }
    max
}

impl RelationDescriptor {
    /// A relation whose total lengths equal its partial lengths.
    pub const fn new(name: &'static str, subrelation_partial_lengths: &'static [usize]) -> Self {
        Self {
            name,
            subrelation_partial_lengths,
            subrelation_total_lengths: subrelation_partial_lengths,
        }
    }

    pub const fn with_total_lengths(mut self, subrelation_total_lengths: &'static [usize]) -> Self {
        self.subrelation_total_lengths = subrelation_total_lengths;
        self
    }

    pub const fn num_subrelations(&self) -> usize {
        self.subrelation_partial_lengths.len()
    }

    pub const fn max_partial_length(&self) -> usize {
        max_of(self.subrelation_partial_lengths)
    }

    pub const fn max_total_length(&self) -> usize {
        max_of(self.subrelation_total_lengths)
    }
}

pub const fn max_partial_relation_length(relations: &[RelationDescriptor]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < relations.len() {
        let len = relations[i].max_partial_length();
        if len > max {
            max = len;
        }
        i += 1;
    }
    max
}

pub const fn max_total_relation_length(relations: &[RelationDescriptor]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < relations.len() {
        let len = relations[i].max_total_length();
        if len > max {
            max = len;
        }
        i += 1;
    }
    max
}

/// Length of the batched univariate: the relation is multiplied by one more
/// linear factor (the pow polynomial) when summed.
pub const fn batched_relation_partial_length(relations: &[RelationDescriptor]) -> usize {
    max_partial_relation_length(relations) + 1
}

pub const fn num_subrelations(relations: &[RelationDescriptor]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < relations.len() {
        total += relations[i].num_subrelations();
        i += 1;
    }
    total
}

/// A relation evaluated row by row.
pub trait Relation {
    const NAME: &'static str;
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize];
    const SUBRELATION_TOTAL_LENGTHS: &'static [usize] = Self::SUBRELATION_PARTIAL_LENGTHS;
    const DESCRIPTOR: RelationDescriptor = RelationDescriptor {
        name: Self::NAME,
        subrelation_partial_lengths: Self::SUBRELATION_PARTIAL_LENGTHS,
        subrelation_total_lengths: Self::SUBRELATION_TOTAL_LENGTHS,
    };

    /// Whether the contribution of `row` is known to be zero.
    fn skip<F: PrimeField>(_row: &AllValues<F>) -> bool {
        false
    }

    /// Adds `scaling_factor` times each subrelation evaluated at `row` to
    /// `evals`, which holds one entry per subrelation.
    fn accumulate<F: PrimeField>(
        evals: &mut [F],
        row: &AllValues<F>,
        params: &RelationParameters<F>,
        scaling_factor: F,
    );
}

/// A closed list of relations, dispatched statically.
pub trait RelationSet {
    const DESCRIPTORS: &'static [RelationDescriptor];

    /// Evaluates every relation of the set at `row`, one vector of
    /// subrelation values per relation.
    fn accumulate<F: PrimeField>(
        row: &AllValues<F>,
        params: &RelationParameters<F>,
        scaling_factor: F,
    ) -> Vec<Vec<F>>;
}

macro_rules! impl_relation_set {
    ($($r:ident),+) => {
        impl<$($r: Relation),+> RelationSet for ($($r,)+) {
            const DESCRIPTORS: &'static [RelationDescriptor] = &[$($r::DESCRIPTOR),+];

            fn accumulate<F: PrimeField>(
                row: &AllValues<F>,
                params: &RelationParameters<F>,
                scaling_factor: F,
            ) -> Vec<Vec<F>> {
                vec![$({
                    let mut evals = vec![F::zero(); $r::SUBRELATION_PARTIAL_LENGTHS.len()];
                    if !$r::skip(row) {
                        $r::accumulate(&mut evals, row, params, scaling_factor);
                    }
                    evals
                }),+]
            }
        }
    };
}

/// Evaluates the relations of `R` at `row`.
pub fn accumulate_relation_evaluations<R: RelationSet, F: PrimeField>(
    row: &AllValues<F>,
    params: &RelationParameters<F>,
    scaling_factor: F,
) -> Vec<Vec<F>> {
    R::accumulate(row, params, scaling_factor)
}

impl_relation_set!(A);
impl_relation_set!(A, B);
impl_relation_set!(A, B, C);
impl_relation_set!(A, B, C, D);
