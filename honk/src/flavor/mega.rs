//! The mega flavor: arithmetic, lookup and databus gates, with an ECC op
//! block at the top of the trace feeding the op queue.
//!
//! Layout of the trace: the zero row, the ECC op block (two rows per op),
//! the public inputs (in `w_l` and `w_r`), then the gates. Lookup tables
//! sit on the last rows of the trace, the databus columns start at row 0.

use super::{EntitySchema, Flavor, ProverPolynomials, ScalarField};
use crate::{
    circuit::{
        mega::{BusId, MegaCircuitBuilder},
        Circuit,
    },
    config::{ProverConfig, TraceBlockCapacities},
    error::{SchemaError, SetupError},
    relations::{mega::MEGA_RELATIONS, RelationDescriptor},
    trace::{
        check_maximum_size, compute_dyadic_size, validate_dyadic_size, TraceMetadata, TraceSizes,
        NUM_ZERO_ROWS,
    },
};
use ark_ff::One;
use honk_utils::math;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use strum::EnumCount;
use tracing::debug;

/// Selector columns, the first precomputed columns of the layout.
pub const NUM_SELECTORS: usize = 14;

entity_group! {
    pub enum MegaPrecomputed {
        role: Precomputed,
        offset: 0,
        columns: [
            QM => "q_m",
            QC => "q_c",
            QL => "q_l",
            QR => "q_r",
            QO => "q_o",
            Q4 => "q_4",
            QBusread => "q_busread",
            QLookup => "q_lookup",
            QArith => "q_arith",
            QDeltaRange => "q_delta_range",
            QElliptic => "q_elliptic",
            QAux => "q_aux",
            QPoseidon2External => "q_poseidon2_external",
            QPoseidon2Internal => "q_poseidon2_internal",
            Sigma1 => "sigma_1",
            Sigma2 => "sigma_2",
            Sigma3 => "sigma_3",
            Sigma4 => "sigma_4",
            Id1 => "id_1",
            Id2 => "id_2",
            Id3 => "id_3",
            Id4 => "id_4",
            Table1 => "table_1",
            Table2 => "table_2",
            Table3 => "table_3",
            Table4 => "table_4",
            LagrangeFirst => "lagrange_first",
            LagrangeLast => "lagrange_last",
            LagrangeEccOp => "lagrange_ecc_op",
            DatabusId => "databus_id",
        ]
    }
}

entity_group! {
    pub enum MegaWireToBeShifted {
        role: WireToBeShifted,
        offset: MegaPrecomputed::OFFSET + <MegaPrecomputed as EnumCount>::COUNT,
        columns: [WL => "w_l", WR => "w_r", WO => "w_o", W4 => "w_4"]
    }
}

entity_group! {
    pub enum MegaDerivedWitness {
        role: DerivedWitness,
        offset: MegaWireToBeShifted::OFFSET + <MegaWireToBeShifted as EnumCount>::COUNT,
        columns: [ZPerm => "z_perm"]
    }
}

entity_group! {
    /// Witness columns never read shifted: lookup and databus multiplicities
    /// with their log-derivative inverses, and the copy of the ECC op block.
    pub enum MegaWire {
        role: Wire,
        offset: MegaDerivedWitness::OFFSET + <MegaDerivedWitness as EnumCount>::COUNT,
        columns: [
            LookupInverses => "lookup_inverses",
            LookupReadCounts => "lookup_read_counts",
            LookupReadTags => "lookup_read_tags",
            EccOpWire1 => "ecc_op_wire_1",
            EccOpWire2 => "ecc_op_wire_2",
            EccOpWire3 => "ecc_op_wire_3",
            EccOpWire4 => "ecc_op_wire_4",
            Calldata => "calldata",
            CalldataReadCounts => "calldata_read_counts",
            CalldataReadTags => "calldata_read_tags",
            CalldataInverses => "calldata_inverses",
            SecondaryCalldata => "secondary_calldata",
            SecondaryCalldataReadCounts => "secondary_calldata_read_counts",
            SecondaryCalldataReadTags => "secondary_calldata_read_tags",
            SecondaryCalldataInverses => "secondary_calldata_inverses",
            ReturnData => "return_data",
            ReturnDataReadCounts => "return_data_read_counts",
            ReturnDataReadTags => "return_data_read_tags",
            ReturnDataInverses => "return_data_inverses",
        ]
    }
}

const WIRES: [MegaWireToBeShifted; 4] = [
    MegaWireToBeShifted::WL,
    MegaWireToBeShifted::WR,
    MegaWireToBeShifted::WO,
    MegaWireToBeShifted::W4,
];
const ECC_OP_WIRES: [MegaWire; 4] = [
    MegaWire::EccOpWire1,
    MegaWire::EccOpWire2,
    MegaWire::EccOpWire3,
    MegaWire::EccOpWire4,
];
const SIGMAS: [MegaPrecomputed; 4] = [
    MegaPrecomputed::Sigma1,
    MegaPrecomputed::Sigma2,
    MegaPrecomputed::Sigma3,
    MegaPrecomputed::Sigma4,
];
const IDS: [MegaPrecomputed; 4] = [
    MegaPrecomputed::Id1,
    MegaPrecomputed::Id2,
    MegaPrecomputed::Id3,
    MegaPrecomputed::Id4,
];
const TABLES: [MegaPrecomputed; 4] = [
    MegaPrecomputed::Table1,
    MegaPrecomputed::Table2,
    MegaPrecomputed::Table3,
    MegaPrecomputed::Table4,
];

/// Value, read-count and read-tag columns of a databus column.
fn databus_columns(bus: BusId) -> [MegaWire; 3] {
    match bus {
        BusId::Calldata => [
            MegaWire::Calldata,
            MegaWire::CalldataReadCounts,
            MegaWire::CalldataReadTags,
        ],
        BusId::SecondaryCalldata => [
            MegaWire::SecondaryCalldata,
            MegaWire::SecondaryCalldataReadCounts,
            MegaWire::SecondaryCalldataReadTags,
        ],
        BusId::ReturnData => [
            MegaWire::ReturnData,
            MegaWire::ReturnDataReadCounts,
            MegaWire::ReturnDataReadTags,
        ],
    }
}

static SCHEMA: Lazy<Result<EntitySchema, SchemaError>> = Lazy::new(|| {
    EntitySchema::builder(MegaFlavor::NAME)
        .group::<MegaPrecomputed>()
        .group::<MegaWireToBeShifted>()
        .group::<MegaDerivedWitness>()
        .group::<MegaWire>()
        .build(MegaFlavor::entity_counts())
});

/// First row of each block of the execution trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockOffsets {
    pub ecc_op: usize,
    pub pub_inputs: usize,
    pub gates: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MegaFlavor;

type Builder = MegaCircuitBuilder<ark_bn254::G1Affine>;
type Fr = ScalarField<MegaFlavor>;

impl MegaFlavor {
    pub fn block_offsets(circuit: &Builder, config: &ProverConfig) -> BlockOffsets {
        let ecc_op = NUM_ZERO_ROWS;
        let (ecc_op_rows, pub_input_rows) = match config.trace_structure.capacities() {
            None => (circuit.ecc_op_block_size(), circuit.num_public_inputs()),
            Some(capacities) => (capacities.ecc_op, capacities.pub_inputs),
        };
        BlockOffsets {
            ecc_op,
            pub_inputs: ecc_op + ecc_op_rows,
            gates: ecc_op + ecc_op_rows + pub_input_rows,
        }
    }

    fn check_block_capacities(
        circuit: &Builder,
        capacities: &TraceBlockCapacities,
    ) -> Result<(), SetupError> {
        for (block, required, capacity) in [
            ("ecc_op", circuit.ecc_op_block_size(), capacities.ecc_op),
            ("pub_inputs", circuit.num_public_inputs(), capacities.pub_inputs),
            ("gates", circuit.num_gates(), capacities.gates),
        ] {
            if required > capacity {
                return Err(SetupError::BlockOverflow {
                    block,
                    required,
                    capacity,
                });
            }
        }
        Ok(())
    }

    fn populate_wires(
        polynomials: &mut ProverPolynomials<Fr>,
        circuit: &Builder,
        offsets: &BlockOffsets,
    ) {
        let one = Fr::one();
        let ecc_rows = circuit
            .ecc_op_transcript()
            .iter()
            .flat_map(|op| op.rows())
            .enumerate();
        for (i, row) in ecc_rows {
            let r = offsets.ecc_op + i;
            for (k, value) in row.into_iter().enumerate() {
                polynomials[WIRES[k]].set(r, value);
                polynomials[ECC_OP_WIRES[k]].set(r, value);
            }
            polynomials[MegaPrecomputed::LagrangeEccOp].set(r, one);
        }

        for (i, value) in circuit.public_inputs().iter().enumerate() {
            let r = offsets.pub_inputs + i;
            polynomials[MegaWireToBeShifted::WL].set(r, *value);
            polynomials[MegaWireToBeShifted::WR].set(r, *value);
        }

        for (k, wire) in WIRES.iter().enumerate() {
            let values = circuit.wire_values(k);
            let poly = &mut polynomials[*wire];
            for (i, value) in values.iter().enumerate() {
                poly.set(offsets.gates + i, *value);
            }
        }
    }

    fn populate_selectors(
        polynomials: &mut ProverPolynomials<Fr>,
        circuit: &Builder,
        offsets: &BlockOffsets,
    ) {
        let gates = circuit.gates();
        polynomials.precomputed_mut()[..NUM_SELECTORS]
            .par_iter_mut()
            .enumerate()
            .for_each(|(selector, poly)| {
                for (i, gate) in gates.iter().enumerate() {
                    poly.set(offsets.gates + i, gate.selectors[selector]);
                }
            });
    }

    /// Tables fill the last rows of the trace, one row per entry.
    fn populate_tables(polynomials: &mut ProverPolynomials<Fr>, circuit: &Builder, circuit_size: usize) {
        let mut row = circuit_size - circuit.tables_size();
        for (index, table) in circuit.lookup_tables().iter().enumerate() {
            for (entry, count) in table.entries().iter().zip(table.read_counts()) {
                for (column, value) in TABLES.iter().zip(entry) {
                    polynomials[*column].set(row, *value);
                }
                polynomials[MegaPrecomputed::Table4].set(row, Fr::from(index as u64));
                polynomials[MegaWire::LookupReadCounts].set(row, Fr::from(*count));
                if *count > 0 {
                    polynomials[MegaWire::LookupReadTags].set(row, Fr::one());
                }
                row += 1;
            }
        }
    }

    fn populate_databus(
        polynomials: &mut ProverPolynomials<Fr>,
        circuit: &Builder,
        circuit_size: usize,
    ) -> Result<(), SetupError> {
        for bus in [BusId::Calldata, BusId::SecondaryCalldata, BusId::ReturnData] {
            let values = circuit.databus_values(bus);
            if values.len() > circuit_size {
                return Err(SetupError::DatabusTooLarge {
                    column: bus.into(),
                    len: values.len(),
                    circuit_size,
                });
            }
            let [value_column, counts_column, tags_column] = databus_columns(bus);
            let read_counts = circuit.databus(bus).read_counts();
            for (i, (value, count)) in values.iter().zip(read_counts).enumerate() {
                polynomials[value_column].set(i, *value);
                polynomials[counts_column].set(i, Fr::from(*count));
                if *count > 0 {
                    polynomials[tags_column].set(i, Fr::one());
                }
            }
        }

        polynomials[MegaPrecomputed::DatabusId]
            .coeffs_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, value)| *value = Fr::from(i as u64));
        Ok(())
    }

    /// `id_j[i] = j * n + i`; `sigma_j` sends every cell to the next cell of
    /// its copy cycle, and cells outside any cycle to themselves.
    fn populate_permutation(
        polynomials: &mut ProverPolynomials<Fr>,
        circuit: &Builder,
        offsets: &BlockOffsets,
        circuit_size: usize,
    ) {
        let label = |column: usize, row: usize| Fr::from((column * circuit_size + row) as u64);

        for (column, (id, sigma)) in IDS.iter().zip(SIGMAS.iter()).enumerate() {
            for target in [*id, *sigma] {
                polynomials[target]
                    .coeffs_mut()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(row, value)| *value = label(column, row));
            }
        }

        let mut cycles: Vec<Vec<(usize, usize)>> = vec![vec![]; circuit.num_variables()];
        let real = circuit.real_variable_indices();
        for (i, variable) in circuit.public_input_indices().iter().enumerate() {
            let cycle = &mut cycles[real[*variable as usize] as usize];
            cycle.push((0, offsets.pub_inputs + i));
            cycle.push((1, offsets.pub_inputs + i));
        }
        for (i, gate) in circuit.gates().iter().enumerate() {
            for (column, variable) in gate.wires.iter().enumerate() {
                cycles[real[*variable as usize] as usize].push((column, offsets.gates + i));
            }
        }

        for cycle in cycles.iter().filter(|c| c.len() > 1) {
            for (k, (column, row)) in cycle.iter().enumerate() {
                let (next_column, next_row) = cycle[(k + 1) % cycle.len()];
                polynomials[SIGMAS[*column]].set(*row, label(next_column, next_row));
            }
        }
    }
}

impl Flavor for MegaFlavor {
    type Curve = ark_bn254::G1Affine;
    type CircuitBuilder = Builder;

    const NAME: &'static str = "mega";

    const NUM_PRECOMPUTED_ENTITIES: usize = 30;
    const NUM_WITNESS_ENTITIES: usize = 24;
    const NUM_ALL_ENTITIES: usize = 59;

    /// The zero row always has a successor.
    const MINIMUM_MINI_CIRCUIT_SIZE: usize = 2;
    const CONCATENATION_GROUP_SIZE: usize = 1;

    const RELATIONS: &'static [RelationDescriptor] = &MEGA_RELATIONS;

    fn schema() -> Result<&'static EntitySchema, SchemaError> {
        SCHEMA.as_ref().map_err(Clone::clone)
    }

    fn compute_trace_sizes(
        circuit: &Self::CircuitBuilder,
        config: &ProverConfig,
    ) -> Result<TraceSizes, SetupError> {
        let circuit_size = match config.trace_structure.capacities() {
            None => compute_dyadic_size(
                circuit.tables_size(),
                circuit.num_public_inputs(),
                circuit.num_gates(),
                circuit.ecc_op_block_size(),
                Self::MINIMUM_MINI_CIRCUIT_SIZE,
            ),
            Some(capacities) => {
                Self::check_block_capacities(circuit, &capacities)?;
                math::next_power_of_two_at_least(
                    NUM_ZERO_ROWS + capacities.total().max(circuit.tables_size()),
                    Self::MINIMUM_MINI_CIRCUIT_SIZE,
                )
            }
        };
        validate_dyadic_size(circuit_size, Self::MINIMUM_MINI_CIRCUIT_SIZE)?;
        let sizes = TraceSizes {
            mini_circuit_size: circuit_size,
            circuit_size,
        };
        check_maximum_size(&sizes, config)?;
        Ok(sizes)
    }

    fn populate_polynomials(
        polynomials: &mut ProverPolynomials<Fr>,
        circuit: &Self::CircuitBuilder,
        sizes: &TraceSizes,
        config: &ProverConfig,
    ) -> Result<TraceMetadata, SetupError> {
        let n = sizes.circuit_size;
        let offsets = Self::block_offsets(circuit, config);

        Self::populate_databus(polynomials, circuit, n)?;
        Self::populate_wires(polynomials, circuit, &offsets);
        Self::populate_selectors(polynomials, circuit, &offsets);
        Self::populate_tables(polynomials, circuit, n);
        Self::populate_permutation(polynomials, circuit, &offsets, n);
        polynomials[MegaPrecomputed::LagrangeFirst].set(0, Fr::one());
        polynomials[MegaPrecomputed::LagrangeLast].set(n - 1, Fr::one());

        debug!(
            circuit_size = n,
            ecc_op_rows = circuit.ecc_op_block_size(),
            num_gates = circuit.num_gates(),
            "mega columns populated"
        );
        Ok(TraceMetadata {
            num_public_inputs: circuit.num_public_inputs(),
            pub_inputs_offset: offsets.pub_inputs,
        })
    }
}
