//! Compiles Honk circuits into proving and verification keys, and
//! accumulates the ECC operations of successive circuits into a shared op
//! queue whose growth is attested by merge proofs.

pub use honk_poly_commitment;
pub use honk_utils;

pub mod circuit;
pub mod config;
pub mod env;
pub mod error;
pub mod flavor;
pub mod merge;
pub mod op_queue;
pub mod proving_key;
pub mod range_constraint;
pub mod relations;
pub mod trace;
pub mod verification_key;

pub use config::{ProverConfig, TraceStructure};
pub use flavor::{Flavor, MegaFlavor, TranslatorFlavor};
pub use merge::{MergeProof, MergeProver, MergeVerifier};
pub use op_queue::{EccOpQueue, SharedEccOpQueue, UltraOp};
pub use proving_key::ProvingKey;
pub use verification_key::VerificationKey;
