//! Merge proofs: a succinct argument that the commitments to the aggregate
//! op transcript were updated by exactly the commitments to the segment of
//! the last appended circuit.
//!
//! Commitments are additively homomorphic and each segment is committed at
//! the rows it occupies in the aggregate table, so the update is checked
//! column-wise as `prev + segment == aggregate`.

use crate::{
    error::MergeError,
    op_queue::{EccOpQueue, NUM_ULTRA_OP_COLUMNS},
};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use honk_poly_commitment::{commitment::add_commitment_columns, CommitmentCurve};
use honk_utils::serialization::SerdeAs;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, instrument};

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: CanonicalSerialize + CanonicalDeserialize")]
pub struct MergeProof<G> {
    pub ops_before: usize,
    pub num_ops: usize,
    /// Aggregate commitments before the append.
    #[serde_as(as = "[SerdeAs; NUM_ULTRA_OP_COLUMNS]")]
    pub prev_commitments: [G; NUM_ULTRA_OP_COLUMNS],
    #[serde_as(as = "[SerdeAs; NUM_ULTRA_OP_COLUMNS]")]
    pub segment_commitments: [G; NUM_ULTRA_OP_COLUMNS],
    #[serde_as(as = "[SerdeAs; NUM_ULTRA_OP_COLUMNS]")]
    pub aggregate_commitments: [G; NUM_ULTRA_OP_COLUMNS],
}

/// Proves the latest append of a queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergeProver;

impl MergeProver {
    #[instrument(skip_all, level = "debug")]
    pub fn construct_proof<G: CommitmentCurve>(
        &self,
        queue: &EccOpQueue<G>,
    ) -> Result<MergeProof<G>, MergeError> {
        let checkpoints = queue.checkpoints();
        let latest = checkpoints.last().ok_or(MergeError::EmptyQueue)?;
        let prev_commitments = checkpoints
            .len()
            .checked_sub(2)
            .map(|i| checkpoints[i].aggregate_commitments)
            .unwrap_or([G::zero(); NUM_ULTRA_OP_COLUMNS]);

        debug!(
            ops_before = latest.ops_before,
            num_ops = latest.num_ops,
            "merge proof constructed"
        );
        Ok(MergeProof {
            ops_before: latest.ops_before,
            num_ops: latest.num_ops,
            prev_commitments,
            segment_commitments: latest.segment_commitments,
            aggregate_commitments: latest.aggregate_commitments,
        })
    }
}

/// Checks merge proofs, optionally against an aggregate the verifier
/// already trusts.
#[derive(Clone, Debug)]
pub struct MergeVerifier<G> {
    prior: Option<[G; NUM_ULTRA_OP_COLUMNS]>,
}

impl<G: AffineRepr> Default for MergeVerifier<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: AffineRepr> MergeVerifier<G> {
    pub fn new() -> Self {
        Self { prior: None }
    }

    /// A verifier that also requires the proof to start from `prior`.
    pub fn with_prior(prior: [G; NUM_ULTRA_OP_COLUMNS]) -> Self {
        Self { prior: Some(prior) }
    }

    #[instrument(skip_all, level = "debug")]
    pub fn verify_proof(&self, proof: &MergeProof<G>) -> bool {
        let prior_matches = self
            .prior
            .map_or(true, |prior| prior == proof.prev_commitments);
        let sum_matches = add_commitment_columns(&proof.prev_commitments, &proof.segment_commitments)
            == proof.aggregate_commitments;
        let verified = prior_matches && sum_matches;
        debug!(prior_matches, sum_matches, "merge proof checked");
        verified
    }
}
