//! A variable-based builder for mega circuits.
//!
//! Gates reference variables by index; two cells referencing variables of
//! the same copy class (see [MegaCircuitBuilder::assert_equal]) are
//! copy-constrained by the permutation argument.

use super::Circuit;
use crate::{
    error::CircuitError,
    flavor::mega::{MegaPrecomputed, NUM_SELECTORS},
    op_queue::{EccOpCode, UltraOp, ROWS_PER_OP},
};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, PrimeField, Zero};
use honk_poly_commitment::CommitmentCurve;
use std::borrow::Cow;
use strum::EnumCount;
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};

pub const NUM_WIRES: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MegaGate<F> {
    pub wires: [u32; NUM_WIRES],
    /// Selector values, in the order of the first precomputed columns.
    pub selectors: [F; NUM_SELECTORS],
}

impl<F: PrimeField> MegaGate<F> {
    fn new(wires: [u32; NUM_WIRES]) -> Self {
        Self {
            wires,
            selectors: [F::zero(); NUM_SELECTORS],
        }
    }

    fn with(mut self, selector: MegaPrecomputed, value: F) -> Self {
        self.selectors[selector as usize] = value;
        self
    }

    pub fn selector(&self, selector: MegaPrecomputed) -> F {
        self.selectors[selector as usize]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTable<F> {
    entries: Vec<[F; 3]>,
    read_counts: Vec<u32>,
}

impl<F> LookupTable<F> {
    pub fn entries(&self) -> &[[F; 3]] {
        &self.entries
    }

    pub fn read_counts(&self) -> &[u32] {
        &self.read_counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three columns of the databus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BusId {
    Calldata,
    SecondaryCalldata,
    ReturnData,
}

impl BusId {
    /// The selector flagging reads of this column on a `q_busread` gate.
    fn selector(self) -> MegaPrecomputed {
        match self {
            BusId::Calldata => MegaPrecomputed::QL,
            BusId::SecondaryCalldata => MegaPrecomputed::QR,
            BusId::ReturnData => MegaPrecomputed::QO,
        }
    }
}

/// The variables written to one databus column and how often each is read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusVector {
    entries: Vec<u32>,
    read_counts: Vec<u32>,
}

impl BusVector {
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    pub fn read_counts(&self) -> &[u32] {
        &self.read_counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, variable: u32) {
        self.entries.push(variable);
        self.read_counts.push(0);
    }

    fn read(&mut self, index: usize) -> Option<u32> {
        let variable = *self.entries.get(index)?;
        self.read_counts[index] += 1;
        Some(variable)
    }
}

#[derive(Clone, Debug)]
pub struct MegaCircuitBuilder<G: CommitmentCurve> {
    variables: Vec<G::ScalarField>,
    real_variable_index: Vec<u32>,
    public_inputs: Vec<u32>,
    gates: Vec<MegaGate<G::ScalarField>>,
    lookup_tables: Vec<LookupTable<G::ScalarField>>,
    databus: [BusVector; BusId::COUNT],
    ecc_op_transcript: Vec<UltraOp<G::ScalarField>>,
    op_accumulator: G::Group,
    zero_idx: u32,
}

impl<G: CommitmentCurve> Default for MegaCircuitBuilder<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: CommitmentCurve> MegaCircuitBuilder<G> {
    pub fn new() -> Self {
        let mut builder = Self {
            variables: vec![],
            real_variable_index: vec![],
            public_inputs: vec![],
            gates: vec![],
            lookup_tables: vec![],
            databus: Default::default(),
            ecc_op_transcript: vec![],
            op_accumulator: G::Group::zero(),
            zero_idx: 0,
        };
        builder.zero_idx = builder.add_variable(G::ScalarField::zero());
        builder
    }

    pub fn zero_idx(&self) -> u32 {
        self.zero_idx
    }

    pub fn add_variable(&mut self, value: G::ScalarField) -> u32 {
        let index = self.variables.len() as u32;
        self.variables.push(value);
        self.real_variable_index.push(index);
        index
    }

    pub fn add_public_variable(&mut self, value: G::ScalarField) -> u32 {
        let index = self.add_variable(value);
        self.public_inputs.push(index);
        index
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn get_variable(&self, index: u32) -> Result<G::ScalarField, CircuitError> {
        let real = self.real_index(index)?;
        Ok(self.variables[real as usize])
    }

    /// The representative of the copy class of `index`.
    pub fn real_index(&self, index: u32) -> Result<u32, CircuitError> {
        self.real_variable_index
            .get(index as usize)
            .copied()
            .ok_or(CircuitError::UnknownVariable(index))
    }

    /// Puts `a` and `b` in the same copy class, represented by `a`.
    pub fn assert_equal(&mut self, a: u32, b: u32) -> Result<(), CircuitError> {
        let real_a = self.real_index(a)?;
        let real_b = self.real_index(b)?;
        for real in self.real_variable_index.iter_mut() {
            if *real == real_b {
                *real = real_a;
            }
        }
        Ok(())
    }

    fn check_variables(&self, wires: &[u32]) -> Result<(), CircuitError> {
        wires.iter().try_for_each(|w| self.real_index(*w).map(|_| ()))
    }

    /// `q_m * w_l * w_r + q_l * w_l + q_r * w_r + q_o * w_o + q_4 * w_4 + q_c = 0`.
    pub fn create_arithmetic_gate(
        &mut self,
        wires: [u32; NUM_WIRES],
        q_m: G::ScalarField,
        scaling: [G::ScalarField; NUM_WIRES],
        q_c: G::ScalarField,
    ) -> Result<(), CircuitError> {
        self.check_variables(&wires)?;
        let [q_l, q_r, q_o, q_4] = scaling;
        self.gates.push(
            MegaGate::new(wires)
                .with(MegaPrecomputed::QArith, G::ScalarField::one())
                .with(MegaPrecomputed::QM, q_m)
                .with(MegaPrecomputed::QL, q_l)
                .with(MegaPrecomputed::QR, q_r)
                .with(MegaPrecomputed::QO, q_o)
                .with(MegaPrecomputed::Q4, q_4)
                .with(MegaPrecomputed::QC, q_c),
        );
        Ok(())
    }

    /// `a + b = c`.
    pub fn create_add_gate(&mut self, a: u32, b: u32, c: u32) -> Result<(), CircuitError> {
        let one = G::ScalarField::one();
        self.create_arithmetic_gate(
            [a, b, c, self.zero_idx],
            G::ScalarField::zero(),
            [one, one, -one, G::ScalarField::zero()],
            G::ScalarField::zero(),
        )
    }

    /// `a * b = c`.
    pub fn create_mul_gate(&mut self, a: u32, b: u32, c: u32) -> Result<(), CircuitError> {
        let zero = G::ScalarField::zero();
        self.create_arithmetic_gate(
            [a, b, c, self.zero_idx],
            G::ScalarField::one(),
            [zero, zero, -G::ScalarField::one(), zero],
            zero,
        )
    }

    pub fn add_lookup_table(&mut self, entries: Vec<[G::ScalarField; 3]>) -> usize {
        self.lookup_tables.push(LookupTable {
            read_counts: vec![0; entries.len()],
            entries,
        });
        self.lookup_tables.len() - 1
    }

    /// Reads entry `index` of table `table` into three new variables.
    pub fn read_from_table(&mut self, table: usize, index: usize) -> Result<[u32; 3], CircuitError> {
        let lookup_table = self
            .lookup_tables
            .get_mut(table)
            .ok_or(CircuitError::UnknownTable(table))?;
        let entry = *lookup_table
            .entries
            .get(index)
            .ok_or(CircuitError::TableEntryOutOfRange { table, index })?;
        lookup_table.read_counts[index] += 1;

        let wires = entry.map(|value| self.add_variable(value));
        self.gates.push(
            MegaGate::new([wires[0], wires[1], wires[2], self.zero_idx])
                .with(MegaPrecomputed::QLookup, G::ScalarField::one()),
        );
        Ok(wires)
    }

    pub fn add_to_bus(&mut self, bus: BusId, variable: u32) -> Result<(), CircuitError> {
        self.real_index(variable)?;
        self.databus[bus as usize].push(variable);
        Ok(())
    }

    /// Reads entry `index` of the column `bus` into a new variable, with a
    /// `q_busread` gate tying the read to the column.
    pub fn read_bus(&mut self, bus: BusId, index: usize) -> Result<u32, CircuitError> {
        let column = &mut self.databus[bus as usize];
        let len = column.len();
        let entry = column.read(index).ok_or(CircuitError::DatabusIndexOutOfRange {
            column: bus.into(),
            index,
            len,
        })?;
        let value = self.get_variable(entry)?;
        let result = self.add_variable(value);
        self.assert_equal(entry, result)?;
        let index_var = self.add_variable(G::ScalarField::from(index as u64));
        self.gates.push(
            MegaGate::new([result, index_var, self.zero_idx, self.zero_idx])
                .with(MegaPrecomputed::QBusread, G::ScalarField::one())
                .with(bus.selector(), G::ScalarField::one()),
        );
        Ok(result)
    }

    pub fn databus(&self, bus: BusId) -> &BusVector {
        &self.databus[bus as usize]
    }

    /// The values of the entries of the column `bus`.
    pub fn databus_values(&self, bus: BusId) -> Vec<G::ScalarField> {
        self.databus[bus as usize]
            .entries
            .iter()
            .map(|variable| self.variable_value(*variable))
            .collect()
    }

    /// The representative of the copy class of every variable.
    pub fn real_variable_indices(&self) -> &[u32] {
        &self.real_variable_index
    }

    /// Value of a variable known to exist.
    fn variable_value(&self, index: u32) -> G::ScalarField {
        let real = self.real_variable_index[index as usize];
        self.variables[real as usize]
    }

    pub fn gates(&self) -> &[MegaGate<G::ScalarField>] {
        &self.gates
    }

    pub fn public_input_indices(&self) -> &[u32] {
        &self.public_inputs
    }

    pub fn num_public_inputs(&self) -> usize {
        self.public_inputs.len()
    }

    pub fn lookup_tables(&self) -> &[LookupTable<G::ScalarField>] {
        &self.lookup_tables
    }

    /// The ops this circuit defers to the ECC op queue.
    pub fn ecc_op_transcript(&self) -> &[UltraOp<G::ScalarField>] {
        &self.ecc_op_transcript
    }
}

impl<G: CommitmentCurve> MegaCircuitBuilder<G>
where
    G::BaseField: PrimeField,
{
    fn push_ecc_op(
        &mut self,
        op: UltraOp<G::ScalarField>,
    ) -> Result<UltraOp<G::ScalarField>, CircuitError> {
        self.ecc_op_transcript.push(op);
        Ok(op)
    }

    pub fn queue_ecc_add_accum(
        &mut self,
        point: G,
    ) -> Result<UltraOp<G::ScalarField>, CircuitError> {
        let op = UltraOp::new(EccOpCode::ADD_ACCUM, &point, G::ScalarField::zero())?;
        self.op_accumulator += point.into_group();
        self.push_ecc_op(op)
    }

    pub fn queue_ecc_mul_accum(
        &mut self,
        point: G,
        scalar: G::ScalarField,
    ) -> Result<UltraOp<G::ScalarField>, CircuitError> {
        let op = UltraOp::new(EccOpCode::MUL_ACCUM, &point, scalar)?;
        self.op_accumulator += point * scalar;
        self.push_ecc_op(op)
    }

    /// Records the current value of the accumulator, resets it and returns
    /// the recorded value.
    pub fn queue_ecc_eq(&mut self) -> Result<G, CircuitError> {
        let result = self.op_accumulator.into_affine();
        let op = UltraOp::new(EccOpCode::EQ_AND_RESET, &result, G::ScalarField::zero())?;
        self.op_accumulator = G::Group::zero();
        self.push_ecc_op(op)?;
        Ok(result)
    }

    pub fn queue_ecc_no_op(&mut self) -> Result<UltraOp<G::ScalarField>, CircuitError> {
        self.push_ecc_op(UltraOp::no_op())
    }
}

impl<G: CommitmentCurve> Circuit<G::ScalarField> for MegaCircuitBuilder<G> {
    fn num_gates(&self) -> usize {
        self.gates.len()
    }

    fn num_wires(&self) -> usize {
        NUM_WIRES
    }

    fn wire_values(&self, wire: usize) -> Cow<'_, [G::ScalarField]> {
        Cow::Owned(
            self.gates
                .iter()
                .map(|gate| self.variable_value(gate.wires[wire]))
                .collect(),
        )
    }

    fn public_inputs(&self) -> Cow<'_, [G::ScalarField]> {
        Cow::Owned(
            self.public_inputs
                .iter()
                .map(|i| self.variable_value(*i))
                .collect(),
        )
    }

    fn tables_size(&self) -> usize {
        self.lookup_tables.iter().map(LookupTable::len).sum()
    }

    fn ecc_op_block_size(&self) -> usize {
        ROWS_PER_OP * self.ecc_op_transcript.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Affine, G1Projective};

    type Builder = MegaCircuitBuilder<G1Affine>;

    #[test]
    fn test_copy_classes() {
        let mut builder = Builder::new();
        let a = builder.add_variable(Fr::from(3u64));
        let b = builder.add_variable(Fr::from(4u64));
        let c = builder.add_variable(Fr::from(7u64));
        builder.create_add_gate(a, b, c).unwrap();
        let d = builder.add_variable(Fr::from(7u64));
        builder.assert_equal(c, d).unwrap();
        assert_eq!(builder.real_index(d), Ok(c));
        assert_eq!(builder.wire_values(2).as_ref(), &[Fr::from(7u64)]);
        assert_eq!(builder.assert_equal(a, 99), Err(CircuitError::UnknownVariable(99)));
    }

    #[test]
    fn test_lookup_reads_are_counted() {
        let mut builder = Builder::new();
        let table = builder.add_lookup_table(vec![
            [Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)],
            [Fr::from(4u64), Fr::from(5u64), Fr::from(6u64)],
        ]);
        builder.read_from_table(table, 1).unwrap();
        builder.read_from_table(table, 1).unwrap();
        assert_eq!(builder.lookup_tables()[table].read_counts(), &[0, 2]);
        assert_eq!(builder.tables_size(), 2);
        assert_eq!(builder.num_gates(), 2);
        assert_eq!(builder.gates()[0].selector(MegaPrecomputed::QLookup), Fr::one());
        assert_eq!(
            builder.read_from_table(table, 2),
            Err(CircuitError::TableEntryOutOfRange { table, index: 2 })
        );
        assert_eq!(builder.read_from_table(5, 0), Err(CircuitError::UnknownTable(5)));
    }

    #[test]
    fn test_databus_reads() {
        let mut builder = Builder::new();
        let value = builder.add_variable(Fr::from(42u64));
        builder.add_to_bus(BusId::ReturnData, value).unwrap();
        let read = builder.read_bus(BusId::ReturnData, 0).unwrap();
        assert_eq!(builder.get_variable(read), Ok(Fr::from(42u64)));
        assert_eq!(builder.databus(BusId::ReturnData).read_counts(), &[1]);
        assert_eq!(builder.gates()[0].selector(MegaPrecomputed::QO), Fr::one());
        assert_eq!(
            builder.read_bus(BusId::Calldata, 0),
            Err(CircuitError::DatabusIndexOutOfRange {
                column: "calldata",
                index: 0,
                len: 0
            })
        );
    }

    #[test]
    fn test_ecc_accumulator() {
        let mut builder = Builder::new();
        let g = G1Affine::generator();
        builder.queue_ecc_add_accum(g).unwrap();
        builder.queue_ecc_mul_accum(g, Fr::from(2u64)).unwrap();
        let result = builder.queue_ecc_eq().unwrap();
        assert_eq!(result, (G1Projective::from(g) * Fr::from(3u64)).into_affine());
        builder.queue_ecc_no_op().unwrap();

        let ops: Vec<_> = builder
            .ecc_op_transcript()
            .iter()
            .map(|op| op.op_code.value())
            .collect();
        assert_eq!(ops, vec![8, 4, 3, 0]);
        assert_eq!(builder.ecc_op_block_size(), 8);
        assert_eq!(builder.queue_ecc_eq().unwrap(), G1Affine::identity());
    }
}
