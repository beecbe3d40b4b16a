//! The verification key: the trace metadata and one commitment per
//! precomputed column of the proving key.

use crate::{
    error::VerifierKeyError,
    flavor::{Column, Flavor},
    proving_key::ProvingKey,
};
use honk_poly_commitment::SRS;
use honk_utils::serialization::SerdeAs;
use rayon::prelude::*;
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeTuple,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_with::{de::DeserializeAsWrap, ser::SerializeAsWrap};
use std::{fmt, marker::PhantomData};
use tracing::{debug, instrument};

/// Fields written before the commitments.
const NUM_METADATA_FIELDS: usize = 4;

#[derive(Clone, Debug)]
pub struct VerificationKey<Fl: Flavor> {
    pub circuit_size: usize,
    pub log_circuit_size: usize,
    pub num_public_inputs: usize,
    pub pub_inputs_offset: usize,
    /// Commitments to the precomputed columns, in schema order.
    pub commitments: Vec<Fl::Curve>,
}

// Implemented by hand: the derive would require `Fl: PartialEq`.
impl<Fl: Flavor> PartialEq for VerificationKey<Fl> {
    fn eq(&self, other: &Self) -> bool {
        self.circuit_size == other.circuit_size
            && self.log_circuit_size == other.log_circuit_size
            && self.num_public_inputs == other.num_public_inputs
            && self.pub_inputs_offset == other.pub_inputs_offset
            && self.commitments == other.commitments
    }
}

impl<Fl: Flavor> Eq for VerificationKey<Fl> {}

impl<Fl: Flavor> VerificationKey<Fl> {
    #[instrument(skip_all, fields(flavor = Fl::NAME), level = "debug")]
    pub fn create(
        proving_key: &ProvingKey<Fl>,
        srs: &SRS<Fl::Curve>,
    ) -> Result<Self, VerifierKeyError> {
        let schema = proving_key.schema();
        let commitments = proving_key
            .polynomials
            .precomputed()
            .par_iter()
            .enumerate()
            .map(|(i, poly)| {
                srs.commit(poly).map_err(|source| VerifierKeyError::Commitment {
                    column: schema.name(Column::new(i)),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(num_commitments = commitments.len(), "precomputed columns committed");

        Ok(Self {
            circuit_size: proving_key.circuit_size,
            log_circuit_size: proving_key.log_circuit_size,
            num_public_inputs: proving_key.num_public_inputs,
            pub_inputs_offset: proving_key.pub_inputs_offset,
            commitments,
        })
    }

    /// The commitment to a precomputed column.
    pub fn commitment(&self, column: impl Into<Column>) -> Option<&Fl::Curve> {
        self.commitments.get(column.into().index())
    }

    /// Pairs each commitment with the label of its column.
    pub fn labelled_commitments(
        &self,
    ) -> Result<impl Iterator<Item = (String, &Fl::Curve)>, VerifierKeyError> {
        let schema = Fl::schema()?;
        Ok(schema
            .precomputed()
            .zip(&self.commitments)
            .map(move |(column, commitment)| (schema.name(column).to_uppercase(), commitment)))
    }

    /// Whether this key is the one derived from `proving_key`.
    pub fn is_consistent_with(
        &self,
        proving_key: &ProvingKey<Fl>,
        srs: &SRS<Fl::Curve>,
    ) -> Result<bool, VerifierKeyError> {
        Ok(*self == Self::create(proving_key, srs)?)
    }
}

impl<Fl: Flavor> Serialize for VerificationKey<Fl> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple =
            serializer.serialize_tuple(NUM_METADATA_FIELDS + self.commitments.len())?;
        tuple.serialize_element(&self.circuit_size)?;
        tuple.serialize_element(&self.log_circuit_size)?;
        tuple.serialize_element(&self.num_public_inputs)?;
        tuple.serialize_element(&self.pub_inputs_offset)?;
        for commitment in &self.commitments {
            tuple.serialize_element(&SerializeAsWrap::<_, SerdeAs>::new(commitment))?;
        }
        tuple.end()
    }
}

struct VerificationKeyVisitor<Fl>(PhantomData<Fl>);

impl<'de, Fl: Flavor> Visitor<'de> for VerificationKeyVisitor<Fl> {
    type Value = VerificationKey<Fl>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "a tuple of {} metadata fields and {} commitments",
            NUM_METADATA_FIELDS,
            Fl::NUM_PRECOMPUTED_ENTITIES
        )
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut next_usize = |i: usize| -> Result<usize, A::Error> {
            seq.next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))
        };
        let circuit_size = next_usize(0)?;
        let log_circuit_size = next_usize(1)?;
        let num_public_inputs = next_usize(2)?;
        let pub_inputs_offset = next_usize(3)?;

        let commitments = (0..Fl::NUM_PRECOMPUTED_ENTITIES)
            .map(|i| {
                seq.next_element::<DeserializeAsWrap<Fl::Curve, SerdeAs>>()?
                    .map(DeserializeAsWrap::into_inner)
                    .ok_or_else(|| de::Error::invalid_length(NUM_METADATA_FIELDS + i, &self))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VerificationKey {
            circuit_size,
            log_circuit_size,
            num_public_inputs,
            pub_inputs_offset,
            commitments,
        })
    }
}

impl<'de, Fl: Flavor> Deserialize<'de> for VerificationKey<Fl> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_tuple(
            NUM_METADATA_FIELDS + Fl::NUM_PRECOMPUTED_ENTITIES,
            VerificationKeyVisitor(PhantomData),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuit::MegaCircuitBuilder,
        config::ProverConfig,
        flavor::{mega::MegaPrecomputed, MegaFlavor},
    };
    use ark_bn254::{Fr, G1Affine};

    fn mega_key() -> ProvingKey<MegaFlavor> {
        let mut builder = MegaCircuitBuilder::<G1Affine>::new();
        let a = builder.add_variable(Fr::from(5u64));
        let b = builder.add_variable(Fr::from(6u64));
        let c = builder.add_variable(Fr::from(11u64));
        builder.create_add_gate(a, b, c).unwrap();
        ProvingKey::create(&builder, &ProverConfig::default()).unwrap()
    }

    #[test]
    fn test_one_commitment_per_precomputed_column() {
        let pk = mega_key();
        let srs = SRS::<G1Affine>::create(pk.circuit_size);
        let vk = VerificationKey::create(&pk, &srs).unwrap();
        assert_eq!(vk.commitments.len(), MegaFlavor::NUM_PRECOMPUTED_ENTITIES);
        assert_eq!(
            vk.commitment(MegaPrecomputed::QArith),
            Some(&srs.commit(&pk.polynomials[MegaPrecomputed::QArith]).unwrap())
        );
        let (label, _) = vk.labelled_commitments().unwrap().next().unwrap();
        assert_eq!(label, "Q_M");
    }

    #[test]
    fn test_srs_too_small() {
        let pk = mega_key();
        let srs = SRS::<G1Affine>::create(pk.circuit_size / 2);
        assert!(matches!(
            VerificationKey::create(&pk, &srs),
            Err(VerifierKeyError::Commitment { .. })
        ));
    }

    #[test]
    fn test_serialization() {
        let pk = mega_key();
        let srs = SRS::<G1Affine>::create(pk.circuit_size);
        let vk = VerificationKey::create(&pk, &srs).unwrap();

        let bytes = rmp_serde::to_vec(&vk).unwrap();
        let decoded: VerificationKey<MegaFlavor> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, vk);
        assert!(decoded.is_consistent_with(&pk, &srs).unwrap());

        let truncated = rmp_serde::to_vec(&(vk.circuit_size, vk.log_circuit_size)).unwrap();
        assert!(rmp_serde::from_slice::<VerificationKey<MegaFlavor>>(&truncated).is_err());
    }
}
