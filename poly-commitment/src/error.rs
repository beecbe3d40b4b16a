use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommitmentError {
    #[error("the polynomial ends at row {end} but the SRS only supports {srs_size} rows")]
    PolynomialTooLarge { end: usize, srs_size: usize },
    #[error("the MSM received {bases} bases for {scalars} scalars")]
    MsmLengthMismatch { bases: usize, scalars: usize },
    #[error("could not access the SRS file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode the SRS: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("could not decode the SRS: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
