pub mod field_helpers;
pub mod math;
pub mod polynomial;
pub mod serialization;

pub use polynomial::Polynomial;
