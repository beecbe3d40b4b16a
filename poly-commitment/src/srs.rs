//! Monomial structured reference string `[1]G, [x]G, [x^2]G, ...` used as the
//! commitment key shared by the proving-key compiler and the op queue.

use crate::{commitment::CommitmentCurve, error::CommitmentError};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{One, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use blake2::{Blake2b512, Digest};
use honk_utils::{serialization::SerdeAs, Polynomial};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::{fs::File, io::BufReader, path::Path};
use tracing::debug;

/// Below this many terms a commitment is computed with a single MSM.
const PARALLEL_SPLIT_THRESHOLD: usize = 1 << 12;

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "G: CanonicalDeserialize + CanonicalSerialize")]
pub struct SRS<G> {
    /// The vector of group elements for committing to polynomials in
    /// coefficient form.
    #[serde_as(as = "Vec<SerdeAs>")]
    pub g: Vec<G>,
}

impl<G: CommitmentCurve> SRS<G> {
    /// This function creates a trusted-setup SRS instance for circuits with
    /// number of rows up to `depth`.
    ///
    /// # Safety
    ///
    /// This function is unsafe because it creates a trusted setup and the toxic
    /// waste is passed as a parameter.
    pub unsafe fn create_trusted_setup(x: G::ScalarField, depth: usize) -> Self {
        let mut x_pow = G::ScalarField::one();
        let powers: Vec<G::ScalarField> = (0..depth)
            .map(|_| {
                let res = x_pow;
                x_pow *= x;
                res
            })
            .collect();

        let generator = G::generator();
        let g: Vec<G::Group> = powers
            .par_iter()
            .map(|p| generator.mul_bigint(p.into_bigint()))
            .collect();

        Self {
            g: G::Group::normalize_batch(&g),
        }
    }

    /// Creates an SRS with up to `depth` rows from a fixed, publicly known
    /// toxic waste. Only suitable for tests and benchmarks.
    pub fn create(depth: usize) -> Self {
        let x = {
            let mut h = Blake2b512::new();
            h.update("srs_misc".as_bytes());
            G::ScalarField::from_le_bytes_mod_order(&h.finalize())
        };
        // SAFETY: the toxic waste is public, the resulting SRS is insecure.
        unsafe { Self::create_trusted_setup(x, depth) }
    }

    /// The maximum number of rows that can be committed to.
    pub fn max_poly_size(&self) -> usize {
        self.g.len()
    }

    /// Commits to `coeffs` placed at rows `[offset, offset + coeffs.len())`,
    /// i.e. computes `sum_i coeffs[i] * g[offset + i]`.
    pub fn commit_at_offset(
        &self,
        coeffs: &[G::ScalarField],
        offset: usize,
    ) -> Result<G, CommitmentError> {
        let end = offset + coeffs.len();
        if end > self.g.len() {
            return Err(CommitmentError::PolynomialTooLarge {
                end,
                srs_size: self.g.len(),
            });
        }
        if coeffs.is_empty() {
            return Ok(G::zero());
        }

        let bases = &self.g[offset..end];
        let msm = |bases: &[G], scalars: &[G::ScalarField]| {
            G::Group::msm(bases, scalars).map_err(|_| CommitmentError::MsmLengthMismatch {
                bases: bases.len(),
                scalars: scalars.len(),
            })
        };

        let res = if coeffs.len() < PARALLEL_SPLIT_THRESHOLD {
            msm(bases, coeffs)?
        } else {
            // split vertically in two threads
            let n = coeffs.len() / 2;
            let (r1, r2) = rayon::join(
                || msm(&bases[..n], &coeffs[..n]),
                || msm(&bases[n..], &coeffs[n..]),
            );
            r1? + r2?
        };
        Ok(res.into_affine())
    }

    /// Commits to a column, honouring its start index.
    pub fn commit(&self, poly: &Polynomial<G::ScalarField>) -> Result<G, CommitmentError> {
        self.commit_at_offset(poly.coeffs(), poly.start_index())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CommitmentError> {
        let mut file = File::create(path.as_ref())?;
        rmp_serde::encode::write(&mut file, self)?;
        debug!(path = ?path.as_ref(), size = self.g.len(), "SRS written");
        Ok(())
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CommitmentError> {
        let file = File::open(path.as_ref())?;
        let srs: Self = rmp_serde::from_read(BufReader::new(file))?;
        debug!(path = ?path.as_ref(), size = srs.g.len(), "SRS loaded");
        Ok(srs)
    }
}
