use ark_ff::{BigInteger, PrimeField};
use std::ops::Range;
use thiserror::Error;

// Field helpers error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldHelpersError {
    #[error("the bit slice {0:?} does not fit in the target field")]
    SliceOutOfField(Range<usize>),
}
pub type Result<T> = std::result::Result<T, FieldHelpersError>;

/// Interprets the bits `range` of the canonical representation of `x` as an
/// element of the (possibly different) prime field `Target`.
/// Bits beyond the width of the representation read as zero.
pub fn slice_bits<Source, Target>(x: &Source, range: Range<usize>) -> Result<Target>
where
    Source: PrimeField,
    Target: PrimeField,
{
    let bits = x.into_bigint().to_bits_le();
    let end = range.end.min(bits.len());
    let start = range.start.min(end);
    Target::from_bigint(<Target::BigInt as BigInteger>::from_bits_le(&bits[start..end]))
        .ok_or(FieldHelpersError::SliceOutOfField(range))
}
