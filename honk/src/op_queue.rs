//! The ECC op queue: the transcript of elliptic-curve operations that
//! successive circuits defer to the translator.
//!
//! Each circuit appends its own ops as one segment. The four columns of the
//! transcript are committed incrementally: only the new segment is committed,
//! at the row offset where it lands, and the result is added to the previous
//! commitments.

use crate::{
    error::MergeError,
    merge::{MergeProof, MergeProver},
};
use ark_ec::AffineRepr;
use ark_ff::{Field, PrimeField, Zero};
use honk_poly_commitment::{commitment::add_commitment_columns, CommitmentCurve, SRS};
use honk_utils::{
    field_helpers::{slice_bits, FieldHelpersError},
    serialization::SerdeAs,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::{
    array,
    sync::{Arc, Mutex},
};
use tracing::{debug, instrument};

/// Columns of the ultra-op table.
pub const NUM_ULTRA_OP_COLUMNS: usize = 4;
/// Rows of the ultra-op table taken by one op.
pub const ROWS_PER_OP: usize = 2;

/// Bit at which point coordinates are split into two limbs.
const COORDINATE_SPLIT_BITS: usize = 136;
/// Bit at which scalars are split into two limbs.
const SCALAR_SPLIT_BITS: usize = 128;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EccOpCode {
    pub add: bool,
    pub mul: bool,
    pub eq: bool,
    pub reset: bool,
}

impl EccOpCode {
    pub const NO_OP: Self = Self {
        add: false,
        mul: false,
        eq: false,
        reset: false,
    };
    pub const ADD_ACCUM: Self = Self {
        add: true,
        ..Self::NO_OP
    };
    pub const MUL_ACCUM: Self = Self {
        mul: true,
        ..Self::NO_OP
    };
    pub const EQ_AND_RESET: Self = Self {
        eq: true,
        reset: true,
        ..Self::NO_OP
    };

    /// `8 * add + 4 * mul + 2 * eq + reset`, the value written in the `op` column.
    pub fn value(&self) -> u64 {
        8 * self.add as u64 + 4 * self.mul as u64 + 2 * self.eq as u64 + self.reset as u64
    }
}

/// An op with its point and scalar split into limbs of the scalar field.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "F: ark_serialize::CanonicalSerialize + ark_serialize::CanonicalDeserialize")]
pub struct UltraOp<F> {
    pub op_code: EccOpCode,
    #[serde_as(as = "SerdeAs")]
    pub x_lo: F,
    #[serde_as(as = "SerdeAs")]
    pub x_hi: F,
    #[serde_as(as = "SerdeAs")]
    pub y_lo: F,
    #[serde_as(as = "SerdeAs")]
    pub y_hi: F,
    #[serde_as(as = "SerdeAs")]
    pub z_1: F,
    #[serde_as(as = "SerdeAs")]
    pub z_2: F,
}

impl<F: PrimeField> UltraOp<F> {
    /// Splits `point` and `scalar`. The point at infinity is encoded as
    /// `(0, 0)`.
    pub fn new<G>(op_code: EccOpCode, point: &G, scalar: F) -> Result<Self, FieldHelpersError>
    where
        G: CommitmentCurve<ScalarField = F>,
        G::BaseField: PrimeField,
    {
        let (x, y) = point
            .to_coordinates()
            .unwrap_or((G::BaseField::zero(), G::BaseField::zero()));
        let split = 2 * COORDINATE_SPLIT_BITS;
        Ok(Self {
            op_code,
            x_lo: slice_bits(&x, 0..COORDINATE_SPLIT_BITS)?,
            x_hi: slice_bits(&x, COORDINATE_SPLIT_BITS..split)?,
            y_lo: slice_bits(&y, 0..COORDINATE_SPLIT_BITS)?,
            y_hi: slice_bits(&y, COORDINATE_SPLIT_BITS..split)?,
            z_1: slice_bits(&scalar, 0..SCALAR_SPLIT_BITS)?,
            z_2: slice_bits(&scalar, SCALAR_SPLIT_BITS..2 * SCALAR_SPLIT_BITS)?,
        })
    }

    /// Recombines the coordinate limbs into the point of the op.
    pub fn point<G>(&self) -> Result<G, FieldHelpersError>
    where
        G: CommitmentCurve<ScalarField = F>,
        G::BaseField: PrimeField,
    {
        let shift = G::BaseField::from(2u64).pow([COORDINATE_SPLIT_BITS as u64]);
        let recombine = |lo: &F, hi: &F| -> Result<G::BaseField, FieldHelpersError> {
            let lo: G::BaseField = slice_bits(lo, 0..COORDINATE_SPLIT_BITS)?;
            let hi: G::BaseField = slice_bits(hi, 0..COORDINATE_SPLIT_BITS)?;
            Ok(lo + hi * shift)
        };
        let x = recombine(&self.x_lo, &self.x_hi)?;
        let y = recombine(&self.y_lo, &self.y_hi)?;
        if x.is_zero() && y.is_zero() {
            Ok(G::zero())
        } else {
            Ok(G::of_coordinates(x, y))
        }
    }

    pub fn no_op() -> Self {
        Self {
            op_code: EccOpCode::NO_OP,
            x_lo: F::zero(),
            x_hi: F::zero(),
            y_lo: F::zero(),
            y_hi: F::zero(),
            z_1: F::zero(),
            z_2: F::zero(),
        }
    }

    /// The two rows of the ultra-op table taken by the op.
    pub fn rows(&self) -> [[F; NUM_ULTRA_OP_COLUMNS]; ROWS_PER_OP] {
        [
            [F::from(self.op_code.value()), self.x_lo, self.x_hi, self.y_lo],
            [F::zero(), self.y_hi, self.z_1, self.z_2],
        ]
    }
}

/// The four columns of the ultra-op table of `ops`.
pub fn ultra_op_columns<F: PrimeField>(ops: &[UltraOp<F>]) -> [Vec<F>; NUM_ULTRA_OP_COLUMNS] {
    let mut columns: [Vec<F>; NUM_ULTRA_OP_COLUMNS] =
        array::from_fn(|_| Vec::with_capacity(ROWS_PER_OP * ops.len()));
    for row in ops.iter().flat_map(|op| op.rows()) {
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }
    columns
}

/// Commits the columns of `ops` placed at `row_offset`.
fn commit_segment<G: CommitmentCurve>(
    srs: &SRS<G>,
    ops: &[UltraOp<G::ScalarField>],
    row_offset: usize,
) -> Result<[G; NUM_ULTRA_OP_COLUMNS], MergeError> {
    let columns = ultra_op_columns(ops);
    let commitments = columns
        .par_iter()
        .map(|column| srs.commit_at_offset(column, row_offset))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(array::from_fn(|i| commitments[i]))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpQueueState {
    Empty,
    Accumulating,
}

/// What the queue records about one appended circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpQueueCheckpoint<G> {
    /// Ops in the queue before the circuit was appended.
    pub ops_before: usize,
    pub num_ops: usize,
    pub segment_commitments: [G; NUM_ULTRA_OP_COLUMNS],
    pub aggregate_commitments: [G; NUM_ULTRA_OP_COLUMNS],
}

pub struct EccOpQueue<G: CommitmentCurve> {
    srs: Arc<SRS<G>>,
    ultra_ops: Vec<UltraOp<G::ScalarField>>,
    checkpoints: Vec<OpQueueCheckpoint<G>>,
}

impl<G: CommitmentCurve> EccOpQueue<G> {
    pub fn new(srs: Arc<SRS<G>>) -> Self {
        Self {
            srs,
            ultra_ops: vec![],
            checkpoints: vec![],
        }
    }

    pub fn state(&self) -> OpQueueState {
        if self.checkpoints.is_empty() {
            OpQueueState::Empty
        } else {
            OpQueueState::Accumulating
        }
    }

    /// Number of ops in the aggregate transcript.
    pub fn current_size(&self) -> usize {
        self.ultra_ops.len()
    }

    pub fn num_rows(&self) -> usize {
        ROWS_PER_OP * self.ultra_ops.len()
    }

    pub fn srs(&self) -> &Arc<SRS<G>> {
        &self.srs
    }

    pub fn aggregate_transcript(&self) -> &[UltraOp<G::ScalarField>] {
        &self.ultra_ops
    }

    pub fn ultra_ops_table(&self) -> [Vec<G::ScalarField>; NUM_ULTRA_OP_COLUMNS] {
        ultra_op_columns(&self.ultra_ops)
    }

    pub fn checkpoints(&self) -> &[OpQueueCheckpoint<G>] {
        &self.checkpoints
    }

    pub fn latest_checkpoint(&self) -> Option<&OpQueueCheckpoint<G>> {
        self.checkpoints.last()
    }

    /// Commitments to the whole aggregate transcript.
    pub fn ultra_ops_commitments(&self) -> Option<&[G; NUM_ULTRA_OP_COLUMNS]> {
        self.checkpoints.last().map(|c| &c.aggregate_commitments)
    }

    /// Appends the ops of one circuit. Nothing is modified if the segment
    /// cannot be committed.
    #[instrument(skip_all, fields(num_ops = ops.len()), level = "debug")]
    pub fn append(
        &mut self,
        ops: &[UltraOp<G::ScalarField>],
    ) -> Result<OpQueueCheckpoint<G>, MergeError> {
        let ops_before = self.ultra_ops.len();
        let segment_commitments = commit_segment(&self.srs, ops, ROWS_PER_OP * ops_before)?;
        let prev = self
            .ultra_ops_commitments()
            .copied()
            .unwrap_or([G::zero(); NUM_ULTRA_OP_COLUMNS]);
        let checkpoint = OpQueueCheckpoint {
            ops_before,
            num_ops: ops.len(),
            segment_commitments,
            aggregate_commitments: add_commitment_columns(&prev, &segment_commitments),
        };

        self.ultra_ops.extend_from_slice(ops);
        self.checkpoints.push(checkpoint.clone());
        debug!(
            ops_before,
            total_ops = self.ultra_ops.len(),
            "op queue segment appended"
        );
        Ok(checkpoint)
    }

    /// Commits the first `num_ops` ops of the transcript from scratch.
    pub fn recompute_commitments(
        &self,
        num_ops: usize,
    ) -> Result<[G; NUM_ULTRA_OP_COLUMNS], MergeError> {
        let num_ops = num_ops.min(self.ultra_ops.len());
        commit_segment(&self.srs, &self.ultra_ops[..num_ops], 0)
    }

    pub fn snapshot(&self) -> OpQueueSnapshot<G> {
        OpQueueSnapshot {
            transcript: self.ultra_ops.clone(),
            checkpoints: self.checkpoints.clone(),
        }
    }
}

/// A copy of the state of a queue at some point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpQueueSnapshot<G: AffineRepr> {
    pub transcript: Vec<UltraOp<G::ScalarField>>,
    pub checkpoints: Vec<OpQueueCheckpoint<G>>,
}

impl<G: AffineRepr> OpQueueSnapshot<G> {
    pub fn current_size(&self) -> usize {
        self.transcript.len()
    }

    pub fn ultra_ops_commitments(&self) -> Option<&[G; NUM_ULTRA_OP_COLUMNS]> {
        self.checkpoints.last().map(|c| &c.aggregate_commitments)
    }
}

/// An op queue shared between the threads producing circuits.
pub struct SharedEccOpQueue<G: CommitmentCurve>(Arc<Mutex<EccOpQueue<G>>>);

impl<G: CommitmentCurve> Clone for SharedEccOpQueue<G> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<G: CommitmentCurve> SharedEccOpQueue<G> {
    pub fn new(queue: EccOpQueue<G>) -> Self {
        Self(Arc::new(Mutex::new(queue)))
    }

    /// Appends the ops of one circuit and proves the append, holding the
    /// queue for both.
    pub fn append_and_prove(
        &self,
        ops: &[UltraOp<G::ScalarField>],
    ) -> Result<MergeProof<G>, MergeError> {
        let mut queue = self.0.lock().map_err(|_| MergeError::Poisoned)?;
        queue.append(ops)?;
        MergeProver.construct_proof(&queue)
    }

    pub fn snapshot(&self) -> Result<OpQueueSnapshot<G>, MergeError> {
        let queue = self.0.lock().map_err(|_| MergeError::Poisoned)?;
        Ok(queue.snapshot())
    }
}
