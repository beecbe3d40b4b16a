//! A trace column stored as a window of backing memory inside a larger
//! virtual length.
//!
//! Rows outside `[start_index, start_index + size)` read as zero. Columns
//! whose shift is needed are allocated with `start_index = 1`, which makes
//! the shift a pure reindex of the same values.

use crate::serialization::SerdeAs;
use ark_ff::Field;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    bound = "F: CanonicalSerialize + CanonicalDeserialize",
    try_from = "RawPolynomial<F>"
)]
pub struct Polynomial<F> {
    #[serde_as(as = "Vec<SerdeAs>")]
    coefficients: Vec<F>,
    start_index: usize,
    virtual_size: usize,
}

/// Decoded form of a [Polynomial], checked before it becomes one.
#[serde_as]
#[derive(Deserialize)]
#[serde(bound = "F: CanonicalDeserialize")]
struct RawPolynomial<F> {
    #[serde_as(as = "Vec<SerdeAs>")]
    coefficients: Vec<F>,
    start_index: usize,
    virtual_size: usize,
}

impl<F> TryFrom<RawPolynomial<F>> for Polynomial<F> {
    type Error = String;

    fn try_from(raw: RawPolynomial<F>) -> Result<Self, Self::Error> {
        let fits = raw
            .start_index
            .checked_add(raw.coefficients.len())
            .is_some_and(|end| end <= raw.virtual_size);
        if !fits {
            return Err(format!(
                "backing memory of {} rows at {} exceeds virtual size {}",
                raw.coefficients.len(),
                raw.start_index,
                raw.virtual_size
            ));
        }
        Ok(Self {
            coefficients: raw.coefficients,
            start_index: raw.start_index,
            virtual_size: raw.virtual_size,
        })
    }
}

impl<F: Field> Polynomial<F> {
    /// Allocates `size` zero values starting at row `start_index` in a
    /// column of `virtual_size` rows.
    pub fn new(size: usize, virtual_size: usize, start_index: usize) -> Self {
        assert!(
            start_index + size <= virtual_size,
            "backing memory [{start_index}, {}) exceeds virtual size {virtual_size}",
            start_index + size
        );
        Self {
            coefficients: vec![F::zero(); size],
            start_index,
            virtual_size,
        }
    }

    /// A column backed over every row.
    pub fn dense(size: usize) -> Self {
        Self::new(size, size, 0)
    }

    /// A column whose row 0 is implicitly zero, so that its shift is a reindex.
    pub fn shiftable(size: usize) -> Self {
        assert!(size >= 1, "a shiftable column needs at least one row");
        Self::new(size - 1, size, 1)
    }

    pub fn from_coefficients(coefficients: Vec<F>, virtual_size: usize, start_index: usize) -> Self {
        assert!(start_index + coefficients.len() <= virtual_size);
        Self {
            coefficients,
            start_index,
            virtual_size,
        }
    }

    pub fn get(&self, row: usize) -> F {
        if row >= self.start_index && row < self.end_index() {
            self.coefficients[row - self.start_index]
        } else {
            F::zero()
        }
    }

    /// Mutable access to a row of the backing memory.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not backed by memory.
    pub fn at_mut(&mut self, row: usize) -> &mut F {
        assert!(
            row >= self.start_index && row < self.end_index(),
            "row {row} outside backing memory [{}, {})",
            self.start_index,
            self.end_index()
        );
        &mut self.coefficients[row - self.start_index]
    }

    pub fn set(&mut self, row: usize, value: F) {
        *self.at_mut(row) = value;
    }

    /// Returns the column `s` with `s[i] = self[i + 1]`.
    ///
    /// # Panics
    ///
    /// Panics if the column was not allocated with `start_index >= 1`.
    pub fn shifted(&self) -> Self {
        assert!(
            self.start_index >= 1,
            "shifting a column requires a zero first row"
        );
        Self {
            coefficients: self.coefficients.clone(),
            start_index: self.start_index - 1,
            virtual_size: self.virtual_size,
        }
    }

    /// Number of backed rows.
    pub fn size(&self) -> usize {
        self.coefficients.len()
    }

    pub fn virtual_size(&self) -> usize {
        self.virtual_size
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.start_index + self.coefficients.len()
    }

    /// The backed values, the first one sitting at row `start_index`.
    pub fn coeffs(&self) -> &[F] {
        &self.coefficients
    }

    pub fn coeffs_mut(&mut self) -> &mut [F] {
        &mut self.coefficients
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|c| c.is_zero())
    }

    /// Iterates over every row of the virtual range.
    pub fn rows(&self) -> impl Iterator<Item = F> + '_ {
        (0..self.virtual_size).map(move |row| self.get(row))
    }
}
