//! The extra numerator of the range-constraint grand product.
//!
//! The ordered range-constraint columns hold the range-constrained values
//! together with every step `MAX, MAX - STEP, ..., 0`, one copy per
//! ordered column. The numerator holds the same steps once per lane, so
//! that they cancel in the grand product.

use crate::error::SetupError;
use ark_ff::PrimeField;
use honk_utils::{math, Polynomial};
use rayon::prelude::*;
use tracing::debug;

/// `max_value, max_value - step, ...` down to and including 0. When `step`
/// does not divide `max_value` the final step is shorter.
pub fn range_constraint_numerator_sequence(max_value: usize, step: usize) -> Vec<usize> {
    let count = math::ceil_div(max_value, step) + 1;
    (0..count)
        .map(|i| max_value.saturating_sub(i * step))
        .collect()
}

/// Writes `poly[lane + i * lanes] = sequence[i]` for every lane.
pub fn fill_range_constraint_numerator<F: PrimeField>(
    poly: &mut Polynomial<F>,
    sequence: &[usize],
    lanes: usize,
) -> Result<(), SetupError> {
    assert!(lanes > 0);
    assert_eq!(poly.start_index(), 0, "the numerator column is dense");
    let required = lanes * sequence.len();
    if required >= poly.size() {
        return Err(SetupError::RangeNumeratorOverflow {
            required,
            available: poly.size(),
        });
    }

    poly.coeffs_mut()[..required]
        .par_chunks_mut(lanes)
        .zip(sequence.par_iter())
        .for_each(|(row_group, value)| row_group.fill(F::from(*value as u64)));

    debug!(lanes, len = sequence.len(), "range constraint numerator filled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_ff::Zero;

    const MAX_VALUE: usize = (1 << 14) - 1;

    #[test]
    fn test_sequence_steps_down_to_zero() {
        let seq = range_constraint_numerator_sequence(MAX_VALUE, 3);
        assert_eq!(seq.len(), 5462);
        assert_eq!(seq[0], MAX_VALUE);
        assert_eq!(seq[1], MAX_VALUE - 3);
        assert_eq!(*seq.last().unwrap(), 0);
        assert!(seq.windows(2).all(|w| w[0] - w[1] == 3));
    }

    #[test]
    fn test_last_step_is_shorter() {
        assert_eq!(range_constraint_numerator_sequence(10, 3), vec![10, 7, 4, 1, 0]);
        assert_eq!(range_constraint_numerator_sequence(9, 3), vec![9, 6, 3, 0]);
        assert_eq!(range_constraint_numerator_sequence(0, 3), vec![0]);
    }

    #[test]
    fn test_lanes_are_identical() {
        let seq = range_constraint_numerator_sequence(MAX_VALUE, 3);
        let mut poly = Polynomial::<Fr>::dense(1 << 15);
        fill_range_constraint_numerator(&mut poly, &seq, 5).unwrap();
        for (i, value) in seq.iter().enumerate() {
            for lane in 0..5 {
                assert_eq!(poly.get(lane + i * 5), Fr::from(*value as u64));
            }
        }
        assert!(poly.coeffs()[5 * seq.len()..].iter().all(|c| c.is_zero()));
    }

    #[test]
    fn test_overflow_is_a_configuration_error() {
        let seq = range_constraint_numerator_sequence(MAX_VALUE, 3);
        let mut poly = Polynomial::<Fr>::dense(5 * seq.len());
        let err = fill_range_constraint_numerator(&mut poly, &seq, 5).unwrap_err();
        assert_eq!(
            err,
            SetupError::RangeNumeratorOverflow {
                required: 5 * 5462,
                available: 5 * 5462
            }
        );
        assert!(err.is_configuration_error());
    }
}
