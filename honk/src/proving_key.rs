//! The proving key: every column of a flavor, filled from a circuit and
//! sized to a power of two, along with the metadata the prover needs to
//! locate the public inputs.

use crate::{
    config::ProverConfig,
    error::SetupError,
    flavor::{AllValues, BaseField, EntitySchema, Flavor, ProverPolynomials, ScalarField},
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use honk_utils::{math, serialization::SerdeAs, Polynomial};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_with::serde_as;
use std::borrow::Cow;
use tracing::{debug, info, instrument};

#[derive(Clone, Debug)]
pub struct ProvingKey<Fl: Flavor> {
    pub circuit_size: usize,
    pub log_circuit_size: usize,
    /// Rows of the trace before concatenation, equal to `circuit_size` for
    /// flavors without concatenated columns.
    pub mini_circuit_size: usize,
    pub num_public_inputs: usize,
    pub pub_inputs_offset: usize,
    pub batching_challenge_v: BaseField<Fl>,
    pub evaluation_input_x: BaseField<Fl>,
    pub polynomials: ProverPolynomials<ScalarField<Fl>>,
}

impl<Fl: Flavor> ProvingKey<Fl> {
    /// Compiles `circuit` into a proving key.
    #[instrument(skip_all, fields(flavor = Fl::NAME), level = "debug")]
    pub fn create(circuit: &Fl::CircuitBuilder, config: &ProverConfig) -> Result<Self, SetupError> {
        let schema = Fl::schema()?;
        let sizes = Fl::compute_trace_sizes(circuit, config)?;
        debug!(
            mini_circuit_size = sizes.mini_circuit_size,
            circuit_size = sizes.circuit_size,
            "trace sized"
        );

        let mut polynomials = ProverPolynomials::allocate(schema, sizes.circuit_size);
        let metadata = Fl::populate_polynomials(&mut polynomials, circuit, &sizes, config)?;
        polynomials.set_shifted();

        let (batching_challenge_v, evaluation_input_x) = Fl::key_challenges(circuit);
        info!(
            circuit_size = sizes.circuit_size,
            num_public_inputs = metadata.num_public_inputs,
            "proving key created"
        );
        Ok(Self {
            circuit_size: sizes.circuit_size,
            log_circuit_size: sizes.log_circuit_size(),
            mini_circuit_size: sizes.mini_circuit_size,
            num_public_inputs: metadata.num_public_inputs,
            pub_inputs_offset: metadata.pub_inputs_offset,
            batching_challenge_v,
            evaluation_input_x,
            polynomials,
        })
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.polynomials.schema()
    }

    /// The value of every column at `row`, shifts included.
    pub fn get_row(&self, row: usize) -> AllValues<ScalarField<Fl>> {
        self.polynomials.get_row(row)
    }
}

/// Wire form of a proving key. Shifted columns are not stored, they are
/// recomputed from their sources when the key is read back.
#[serde_as]
#[derive(Serialize, Deserialize)]
#[serde(bound = "B: CanonicalSerialize + CanonicalDeserialize, \
                 F: CanonicalSerialize + CanonicalDeserialize + Clone")]
struct SerializedProvingKey<'a, B, F: Clone> {
    circuit_size: usize,
    log_circuit_size: usize,
    mini_circuit_size: usize,
    num_public_inputs: usize,
    pub_inputs_offset: usize,
    #[serde_as(as = "SerdeAs")]
    batching_challenge_v: B,
    #[serde_as(as = "SerdeAs")]
    evaluation_input_x: B,
    unshifted: Cow<'a, [Polynomial<F>]>,
}

impl<Fl: Flavor> Serialize for ProvingKey<Fl> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SerializedProvingKey {
            circuit_size: self.circuit_size,
            log_circuit_size: self.log_circuit_size,
            mini_circuit_size: self.mini_circuit_size,
            num_public_inputs: self.num_public_inputs,
            pub_inputs_offset: self.pub_inputs_offset,
            batching_challenge_v: self.batching_challenge_v,
            evaluation_input_x: self.evaluation_input_x,
            unshifted: Cow::Borrowed(self.polynomials.unshifted()),
        }
        .serialize(serializer)
    }
}

impl<'de, Fl: Flavor> Deserialize<'de> for ProvingKey<Fl> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = SerializedProvingKey::<BaseField<Fl>, ScalarField<Fl>>::deserialize(deserializer)?;
        let schema = Fl::schema().map_err(D::Error::custom)?;

        let circuit_size = key.circuit_size;
        if !circuit_size.is_power_of_two() || math::ceil_log2(circuit_size) != key.log_circuit_size
        {
            return Err(D::Error::custom(format!(
                "inconsistent circuit size {circuit_size} (log {})",
                key.log_circuit_size
            )));
        }
        let mut entities = key.unshifted.into_owned();
        if entities.len() != schema.num_unshifted_entities() {
            return Err(D::Error::invalid_length(
                entities.len(),
                &"one polynomial per unshifted column",
            ));
        }
        for (poly, spec) in entities.iter().zip(schema.columns()) {
            if poly.virtual_size() != circuit_size {
                return Err(D::Error::custom(format!(
                    "the column {} has {} rows instead of {circuit_size}",
                    spec.name,
                    poly.virtual_size()
                )));
            }
            if spec.role.is_shiftable() && poly.start_index() == 0 {
                return Err(D::Error::custom(format!(
                    "the column {} is shifted but is backed from row 0",
                    spec.name
                )));
            }
        }

        entities.extend(schema.shifted_range().map(|_| Polynomial::new(0, circuit_size, 0)));
        let mut polynomials = ProverPolynomials::from_vec(schema, entities).map_err(D::Error::custom)?;
        polynomials.set_shifted();

        Ok(Self {
            circuit_size,
            log_circuit_size: key.log_circuit_size,
            mini_circuit_size: key.mini_circuit_size,
            num_public_inputs: key.num_public_inputs,
            pub_inputs_offset: key.pub_inputs_offset,
            batching_challenge_v: key.batching_challenge_v,
            evaluation_input_x: key.evaluation_input_x,
            polynomials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuit::MegaCircuitBuilder,
        flavor::{mega::MegaWireToBeShifted, MegaFlavor},
    };
    use ark_bn254::{Fr, G1Affine};
    use ark_ff::Zero;

    fn small_circuit() -> MegaCircuitBuilder<G1Affine> {
        let mut builder = MegaCircuitBuilder::new();
        let a = builder.add_public_variable(Fr::from(3u64));
        let b = builder.add_variable(Fr::from(4u64));
        let c = builder.add_variable(Fr::from(12u64));
        builder.create_mul_gate(a, b, c).unwrap();
        builder
    }

    #[test]
    fn test_shifts_are_consistent() {
        let pk = ProvingKey::<MegaFlavor>::create(&small_circuit(), &ProverConfig::default()).unwrap();
        for (shift, source) in pk.schema().shifted_columns() {
            for row in 0..pk.circuit_size - 1 {
                assert_eq!(
                    pk.polynomials[shift].get(row),
                    pk.polynomials[source].get(row + 1)
                );
            }
            assert!(pk.polynomials[source].get(0).is_zero());
        }
    }

    #[test]
    fn test_get_row_reads_every_column() {
        let pk = ProvingKey::<MegaFlavor>::create(&small_circuit(), &ProverConfig::default()).unwrap();
        let row = pk.get_row(1);
        assert_eq!(row.len(), MegaFlavor::NUM_ALL_ENTITIES);
        assert_eq!(row[MegaWireToBeShifted::WL], pk.polynomials[MegaWireToBeShifted::WL].get(1));
        assert_eq!(*row.shifted(MegaWireToBeShifted::WL), pk.polynomials[MegaWireToBeShifted::WL].get(2));
    }

    #[test]
    fn test_serialization_recomputes_shifts() {
        let pk = ProvingKey::<MegaFlavor>::create(&small_circuit(), &ProverConfig::default()).unwrap();
        let bytes = rmp_serde::to_vec(&pk).unwrap();
        let decoded: ProvingKey<MegaFlavor> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded.circuit_size, pk.circuit_size);
        assert_eq!(decoded.pub_inputs_offset, pk.pub_inputs_offset);
        for (left, right) in decoded.polynomials.zip(&pk.polynomials) {
            assert_eq!(left, right);
        }
    }
}
