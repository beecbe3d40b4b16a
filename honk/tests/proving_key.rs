use ark_bn254::{Fq, Fr, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, UniformRand, Zero};
use honk::{
    circuit::{mega::BusId, Circuit, MegaCircuitBuilder, TranslatorCircuitBuilder},
    config::{ProverConfig, TraceStructure},
    error::SetupError,
    flavor::{
        mega::{MegaPrecomputed, MegaWire, MegaWireToBeShifted},
        translator::{
            TranslatorConcatenated, TranslatorDerivedWitness, TranslatorOrderedRangeConstraint,
            TranslatorPrecomputed, TranslatorWireNonShifted, TranslatorWireToBeShifted,
        },
        EntityGroup, Flavor, MegaFlavor, ProverPolynomials, TranslatorFlavor,
    },
    op_queue::{EccOpCode, UltraOp},
    ProvingKey, VerificationKey,
};
use honk_poly_commitment::SRS;
use once_cell::sync::Lazy;
use strum::IntoEnumIterator;

static SRS: Lazy<SRS<G1Affine>> = Lazy::new(|| SRS::create(1 << 10));

fn mega_circuit(num_gates: usize) -> MegaCircuitBuilder<G1Affine> {
    let mut rng = ark_std::test_rng();
    let mut builder = MegaCircuitBuilder::new();
    let point = (G1Affine::generator() * Fr::rand(&mut rng)).into_affine();
    builder.queue_ecc_mul_accum(point, Fr::rand(&mut rng)).unwrap();
    builder.queue_ecc_eq().unwrap();

    let mut acc = builder.add_public_variable(Fr::one());
    for i in 0..num_gates {
        let b = builder.add_variable(Fr::from(i as u64));
        let sum = builder.get_variable(acc).unwrap() + Fr::from(i as u64);
        let c = builder.add_variable(sum);
        builder.create_add_gate(acc, b, c).unwrap();
        acc = c;
    }
    let table = builder.add_lookup_table(vec![[Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)]]);
    builder.read_from_table(table, 0).unwrap();
    builder.add_to_bus(BusId::Calldata, acc).unwrap();
    builder.read_bus(BusId::Calldata, 0).unwrap();
    builder
}

fn translator_wire(member: TranslatorWireToBeShifted) -> usize {
    member.column().index() - TranslatorWireNonShifted::Op.column().index()
}

#[test]
fn test_empty_circuits_use_the_minimum_size() {
    let config = ProverConfig::default();

    let mega = MegaCircuitBuilder::<G1Affine>::new();
    let sizes = MegaFlavor::compute_trace_sizes(&mega, &config).unwrap();
    assert_eq!(sizes.circuit_size, MegaFlavor::MINIMUM_MINI_CIRCUIT_SIZE);

    let translator = TranslatorCircuitBuilder::<Fr, Fq>::new(Fq::zero(), Fq::zero());
    let sizes = TranslatorFlavor::compute_trace_sizes(&translator, &config).unwrap();
    assert_eq!(sizes.mini_circuit_size, 2048);
    assert_eq!(sizes.circuit_size, 2048 * 16);
}

#[test]
fn test_sizes_just_above_a_power_of_two() {
    let config = ProverConfig::default();

    let mut translator = TranslatorCircuitBuilder::<Fr, Fq>::new(Fq::zero(), Fq::zero());
    translator
        .set_wire_values(translator_wire(TranslatorWireToBeShifted::XLoYHi), vec![Fr::zero(); 2049])
        .unwrap();
    let sizes = TranslatorFlavor::compute_trace_sizes(&translator, &config).unwrap();
    assert_eq!(sizes.mini_circuit_size, 4096);
    assert_eq!(sizes.circuit_size, 4096 * 16);

    // the zero row and the public input take a row each
    let mut mega = MegaCircuitBuilder::<G1Affine>::new();
    let x = mega.add_public_variable(Fr::zero());
    for _ in 0..62 {
        mega.create_add_gate(x, x, x).unwrap();
    }
    assert_eq!(MegaFlavor::compute_trace_sizes(&mega, &config).unwrap().circuit_size, 64);
    mega.create_add_gate(x, x, x).unwrap();
    assert_eq!(MegaFlavor::compute_trace_sizes(&mega, &config).unwrap().circuit_size, 128);
}

#[test]
fn test_key_construction_is_deterministic() {
    let config = ProverConfig::default();
    let circuit = mega_circuit(20);
    let first = ProvingKey::<MegaFlavor>::create(&circuit, &config).unwrap();
    let second = ProvingKey::<MegaFlavor>::create(&circuit, &config).unwrap();
    assert_eq!(first.circuit_size, 32);
    for (left, right) in first.polynomials.zip(&second.polynomials) {
        assert_eq!(left, right);
    }

    let vk_first = VerificationKey::create(&first, &SRS).unwrap();
    let vk_second = VerificationKey::create(&second, &SRS).unwrap();
    assert_eq!(vk_first, vk_second);
    assert!(vk_first.is_consistent_with(&second, &SRS).unwrap());
}

#[test]
fn test_verification_key_detects_a_different_circuit() {
    let config = ProverConfig::default();
    let pk = ProvingKey::<MegaFlavor>::create(&mega_circuit(20), &config).unwrap();
    let other = ProvingKey::<MegaFlavor>::create(&mega_circuit(21), &config).unwrap();
    let vk = VerificationKey::create(&pk, &SRS).unwrap();
    assert!(!vk.is_consistent_with(&other, &SRS).unwrap());
}

#[test]
fn test_databus_read_tags() {
    let pk = ProvingKey::<MegaFlavor>::create(&mega_circuit(3), &ProverConfig::default()).unwrap();
    let databus = [
        (MegaWire::CalldataReadCounts, MegaWire::CalldataReadTags),
        (MegaWire::SecondaryCalldataReadCounts, MegaWire::SecondaryCalldataReadTags),
        (MegaWire::ReturnDataReadCounts, MegaWire::ReturnDataReadTags),
    ];
    for i in 0..pk.circuit_size {
        for (counts, tags) in databus {
            let tagged = pk.polynomials[tags].get(i) == Fr::one();
            assert_eq!(tagged, !pk.polynomials[counts].get(i).is_zero());
        }
        assert_eq!(pk.polynomials[MegaPrecomputed::DatabusId].get(i), Fr::from(i as u64));
    }
}

#[test]
fn test_shifts_of_a_mega_key() {
    let pk = ProvingKey::<MegaFlavor>::create(&mega_circuit(9), &ProverConfig::default()).unwrap();
    let schema = pk.schema();
    assert_eq!(schema.to_be_shifted().count(), 5);
    for source in schema.to_be_shifted() {
        for i in 0..pk.circuit_size - 1 {
            assert_eq!(pk.polynomials.shifted(source).get(i), pk.polynomials[source].get(i + 1));
        }
    }
    assert_eq!(pk.get_row(pk.pub_inputs_offset)[MegaWireToBeShifted::WL], Fr::one());
}

#[test]
fn test_structured_trace_is_larger_but_equivalent() {
    let circuit = mega_circuit(4);
    let compact = ProvingKey::<MegaFlavor>::create(&circuit, &ProverConfig::default()).unwrap();
    let structured = ProvingKey::<MegaFlavor>::create(
        &circuit,
        &ProverConfig::default().with_trace_structure(TraceStructure::SmallTest),
    )
    .unwrap();
    assert_eq!(structured.circuit_size, 1024);
    assert_eq!(structured.pub_inputs_offset, 257);
    assert_eq!(structured.num_public_inputs, compact.num_public_inputs);
    assert_eq!(
        structured.get_row(structured.pub_inputs_offset)[MegaWireToBeShifted::WL],
        compact.get_row(compact.pub_inputs_offset)[MegaWireToBeShifted::WL]
    );
}

#[test]
fn test_circuit_too_large() {
    let config = ProverConfig {
        max_log_circuit_size: 4,
        ..ProverConfig::default()
    };
    let err = ProvingKey::<MegaFlavor>::create(&mega_circuit(20), &config).unwrap_err();
    assert_eq!(
        err,
        SetupError::CircuitTooLarge {
            log_size: 5,
            max_log_size: 4
        }
    );
    assert!(!err.is_configuration_error());
}

#[test]
fn test_translator_rejects_nonzero_shifted_row() {
    let mut circuit = TranslatorCircuitBuilder::<Fr, Fq>::new(Fq::zero(), Fq::zero());
    circuit
        .set_wire_values(translator_wire(TranslatorWireToBeShifted::XHiZ1), vec![Fr::one()])
        .unwrap();
    assert_eq!(
        ProvingKey::<TranslatorFlavor>::create(&circuit, &ProverConfig::default()).unwrap_err(),
        SetupError::NonZeroShiftedRow("x_hi_z_1")
    );
}

#[test]
fn test_translator_key() {
    let mut rng = ark_std::test_rng();
    let point = (G1Affine::generator() * Fr::rand(&mut rng)).into_affine();
    let ops = vec![
        UltraOp::new(EccOpCode::MUL_ACCUM, &point, Fr::rand(&mut rng)).unwrap(),
        UltraOp::new(EccOpCode::EQ_AND_RESET, &point, Fr::zero()).unwrap(),
    ];
    let v = Fq::from(11u64);
    let x = Fq::from(13u64);
    let mut circuit = TranslatorCircuitBuilder::<Fr, Fq>::from_ultra_ops(v, x, &ops);

    let groups = TranslatorFlavor::groups_to_be_concatenated();
    let member = groups[1][2];
    let mut values = vec![Fr::zero(); circuit.num_gates()];
    values[1] = Fr::from(5u64);
    circuit.set_wire_values(translator_wire(member), values).unwrap();

    let mut pk = ProvingKey::<TranslatorFlavor>::create(&circuit, &ProverConfig::default()).unwrap();
    let mini = pk.mini_circuit_size;
    assert_eq!((mini, pk.circuit_size, pk.log_circuit_size), (2048, 32768, 15));
    assert_eq!((pk.batching_challenge_v, pk.evaluation_input_x), (v, x));
    assert_eq!(pk.num_public_inputs, 0);

    assert_eq!(pk.polynomials[TranslatorWireNonShifted::Op].get(1), Fr::from(4u64));
    assert_eq!(pk.polynomials[TranslatorWireToBeShifted::XLoYHi].get(1), ops[0].x_lo);
    assert_eq!(pk.polynomials[TranslatorWireToBeShifted::YLoZ2].get(4), ops[1].z_2);

    let numerator = &pk.polynomials[TranslatorPrecomputed::OrderedExtraRangeConstraintsNumerator];
    let lanes = TranslatorFlavor::NUM_CONCATENATED_WIRES + 1;
    for lane in 0..lanes {
        assert_eq!(numerator.get(lane), Fr::from(TranslatorFlavor::MAX_VALUE as u64));
        assert_eq!(numerator.get(lanes + lane), Fr::from(16380u64));
        assert_eq!(numerator.get(5461 * lanes + lane), Fr::zero());
    }
    assert_eq!(numerator.get(5460 * lanes), Fr::from(3u64));

    let lagrange = |column: TranslatorPrecomputed, row: usize| pk.polynomials[column].get(row);
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeFirst, 0), Fr::one());
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeLast, 32767), Fr::one());
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeSecond, 1), Fr::one());
    assert_eq!(
        lagrange(TranslatorPrecomputed::LagrangeSecondToLastInMinicircuit, mini - 2),
        Fr::one()
    );
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeOddInMinicircuit, 1), Fr::one());
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeOddInMinicircuit, 2), Fr::zero());
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeEvenInMinicircuit, 2), Fr::one());
    assert_eq!(lagrange(TranslatorPrecomputed::LagrangeEvenInMinicircuit, mini - 1), Fr::zero());

    TranslatorFlavor::compute_concatenated_polynomials(&mut pk.polynomials, mini);
    let concatenated = &pk.polynomials[TranslatorConcatenated::ConcatenatedRangeConstraints1];
    assert_eq!(concatenated.get(2 * mini + 1), Fr::from(5u64));
    assert_eq!(concatenated.get(2 * mini), Fr::zero());
    assert_eq!(concatenated.get(mini + 1), Fr::zero());
}

/// Every shifted column reads its source one row ahead and ends with zero.
fn assert_shifts_hold(polynomials: &ProverPolynomials<Fr>) {
    let schema = polynomials.schema();
    let n = polynomials.circuit_size();
    for (shift, source) in schema.shifted_columns() {
        let (shift_poly, source_poly) = (&polynomials[shift], &polynomials[source]);
        assert!(!source_poly.is_zero(), "{} was left empty", schema.name(source));
        assert!(source_poly.get(0).is_zero());
        for row in 0..n - 1 {
            assert_eq!(
                shift_poly.get(row),
                source_poly.get(row + 1),
                "{} at row {row}",
                schema.name(shift)
            );
        }
        assert!(shift_poly.get(n - 1).is_zero());
    }
}

#[test]
fn test_translator_shifts_hold_for_every_column() {
    let mut rng = ark_std::test_rng();
    let mut circuit = TranslatorCircuitBuilder::<Fr, Fq>::new(Fq::one(), Fq::one());
    for member in TranslatorWireToBeShifted::iter() {
        let values = std::iter::once(Fr::zero())
            .chain((0..64).map(|_| Fr::rand(&mut rng)))
            .collect();
        circuit.set_wire_values(translator_wire(member), values).unwrap();
    }

    let mut pk = ProvingKey::<TranslatorFlavor>::create(&circuit, &ProverConfig::default()).unwrap();
    let n = pk.circuit_size;
    let wires = pk.schema().shifted_columns().filter(|(_, source)| {
        TranslatorWireToBeShifted::iter().any(|member| member.column() == *source)
    });
    assert_eq!(wires.count(), 80);

    // the sorted range constraints and the grand product are filled after
    // key construction, across the whole concatenated trace
    let late = TranslatorOrderedRangeConstraint::iter()
        .map(EntityGroup::column)
        .chain(TranslatorDerivedWitness::iter().map(EntityGroup::column));
    for column in late {
        let poly = &mut pk.polynomials[column];
        for row in (1..n).step_by(97).chain([n - 2, n - 1]) {
            poly.set(row, Fr::rand(&mut rng));
        }
    }
    pk.polynomials.set_shifted();
    assert_shifts_hold(&pk.polynomials);
}
