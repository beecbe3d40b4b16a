use ark_ec::{
    short_weierstrass::{Affine as SWJAffine, SWCurveConfig},
    AffineRepr, CurveGroup,
};
use ark_ff::PrimeField;
use std::array;

/// A curve whose affine points can be used as commitments and decomposed
/// into coordinates.
pub trait CommitmentCurve: AffineRepr {
    fn to_coordinates(&self) -> Option<(Self::BaseField, Self::BaseField)>;
    fn of_coordinates(x: Self::BaseField, y: Self::BaseField) -> Self;
}

impl<P: SWCurveConfig> CommitmentCurve for SWJAffine<P>
where
    P::BaseField: PrimeField,
{
    fn to_coordinates(&self) -> Option<(Self::BaseField, Self::BaseField)> {
        if self.infinity {
            None
        } else {
            Some((self.x, self.y))
        }
    }

    fn of_coordinates(x: P::BaseField, y: P::BaseField) -> SWJAffine<P> {
        SWJAffine::<P>::new_unchecked(x, y)
    }
}

/// Sums two commitments, using the additive homomorphism of the scheme.
pub fn add_commitments<G: AffineRepr>(left: &G, right: &G) -> G {
    (*left + *right).into_affine()
}

/// Column-wise sum of two families of commitments.
pub fn add_commitment_columns<G: AffineRepr, const N: usize>(
    left: &[G; N],
    right: &[G; N],
) -> [G; N] {
    array::from_fn(|i| add_commitments(&left[i], &right[i]))
}
