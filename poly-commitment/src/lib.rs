pub mod commitment;
pub mod error;
pub mod srs;

pub use commitment::CommitmentCurve;
pub use error::CommitmentError;
pub use srs::SRS;
