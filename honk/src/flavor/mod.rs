//! Flavors describe a protocol variant: the catalogue of columns it works
//! with, its relations, and how a circuit of that variant is laid out in the
//! trace.
//!
//! The columns of a flavor are declared as a sequence of named groups (one
//! Rust enum per group, see [entity_group]). The groups are concatenated
//! into a single flat [EntitySchema], and every container indexed by
//! columns ([AllEntities]) follows that flat order, so containers of
//! different types can be zipped positionally.

/// Declares a group of columns: an enum whose variants are the columns of
/// the group, with their labels, the role they play and the slot of the
/// first one in the flat layout.
macro_rules! entity_group {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            role: $role:ident,
            offset: $offset:expr,
            columns: [$($variant:ident => $label:literal),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            strum_macros::EnumCount,
            strum_macros::EnumIter,
            strum_macros::IntoStaticStr,
        )]
        $vis enum $name {
            $(
                #[strum(serialize = $label)]
                $variant,
            )*
        }

        impl $name {
            /// Slot of the first column of the group in the flat layout.
            pub const OFFSET: usize = $offset;
        }

        impl $crate::flavor::EntityGroup for $name {
            const ROLE: $crate::flavor::ColumnRole = $crate::flavor::ColumnRole::$role;

            fn column(self) -> $crate::flavor::Column {
                $crate::flavor::Column::new(Self::OFFSET + self as usize)
            }

            fn name(self) -> &'static str {
                self.into()
            }
        }

        impl From<$name> for $crate::flavor::Column {
            fn from(column: $name) -> Self {
                $crate::flavor::EntityGroup::column(column)
            }
        }
    };
}

pub mod mega;
pub mod translator;

use crate::{
    circuit::Circuit,
    config::ProverConfig,
    error::{SchemaError, SetupError},
    relations::{
        batched_relation_partial_length, max_partial_relation_length, max_total_relation_length,
        RelationDescriptor,
    },
    trace::{TraceMetadata, TraceSizes},
};
use ark_ec::AffineRepr;
use ark_ff::Zero;
use honk_poly_commitment::CommitmentCurve;
use honk_utils::Polynomial;
use std::{
    collections::HashMap,
    ops::{Index, IndexMut, Range},
    slice,
};
use strum::IntoEnumIterator;

pub use mega::MegaFlavor;
pub use translator::TranslatorFlavor;

pub type ScalarField<Fl> = <<Fl as Flavor>::Curve as AffineRepr>::ScalarField;
pub type BaseField<Fl> = <<Fl as Flavor>::Curve as AffineRepr>::BaseField;

/// A slot in the flat column layout of a flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(usize);

impl Column {
    pub const fn new(index: usize) -> Self {
        Column(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// The part a column plays in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Fixed by the circuit, committed in the verification key.
    Precomputed,
    /// Witness column that is never read shifted.
    Wire,
    /// Witness column that is also read at the next row.
    WireToBeShifted,
    /// Sorted copy of range-constrained values, read shifted.
    OrderedRangeConstraint,
    /// Witness computed from other columns (grand products), read shifted.
    DerivedWitness,
    /// Witness formed by packing several mini-trace columns end to end.
    Concatenated,
    /// `c[i + 1]` for a shiftable column `c`.
    Shifted,
}

impl ColumnRole {
    pub fn is_witness(self) -> bool {
        !matches!(self, ColumnRole::Precomputed | ColumnRole::Shifted)
    }

    /// Whether the column has a shifted counterpart.
    pub fn is_shiftable(self) -> bool {
        matches!(
            self,
            ColumnRole::WireToBeShifted
                | ColumnRole::OrderedRangeConstraint
                | ColumnRole::DerivedWitness
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub role: ColumnRole,
    /// For shifted columns, the column they are the shift of.
    pub shift_of: Option<Column>,
}

/// A group of columns declared with [entity_group].
pub trait EntityGroup: Copy + IntoEnumIterator + 'static {
    const ROLE: ColumnRole;

    fn column(self) -> Column;
    fn name(self) -> &'static str;
}

/// The entity counts a flavor declares for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityCounts {
    pub precomputed: usize,
    pub witness: usize,
    pub all: usize,
}

/// The flat column layout of a flavor: precomputed columns, then witness
/// columns, then the shifted columns in to-be-shifted order.
#[derive(Clone, Debug)]
pub struct EntitySchema {
    flavor: &'static str,
    columns: Vec<ColumnSpec>,
    num_precomputed: usize,
    num_witness: usize,
    shifts: Vec<Option<Column>>,
    by_name: HashMap<String, Column>,
}

impl EntitySchema {
    pub fn builder(flavor: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            flavor,
            columns: vec![],
            seen: HashMap::new(),
            error: None,
        }
    }

    pub fn flavor(&self) -> &'static str {
        self.flavor
    }

    pub fn num_precomputed_entities(&self) -> usize {
        self.num_precomputed
    }

    pub fn num_witness_entities(&self) -> usize {
        self.num_witness
    }

    pub fn num_shifted_entities(&self) -> usize {
        self.columns.len() - self.num_unshifted_entities()
    }

    pub fn num_unshifted_entities(&self) -> usize {
        self.num_precomputed + self.num_witness
    }

    pub fn num_all_entities(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn spec(&self, column: impl Into<Column>) -> &ColumnSpec {
        &self.columns[column.into().index()]
    }

    pub fn name(&self, column: impl Into<Column>) -> &str {
        &self.spec(column).name
    }

    pub fn role(&self, column: impl Into<Column>) -> ColumnRole {
        self.spec(column).role
    }

    pub fn find(&self, name: &str) -> Option<Column> {
        self.by_name.get(name).copied()
    }

    /// The shifted counterpart of `column`, if it has one.
    pub fn shifted(&self, column: impl Into<Column>) -> Option<Column> {
        self.shifts.get(column.into().index()).copied().flatten()
    }

    pub fn precomputed_range(&self) -> Range<usize> {
        0..self.num_precomputed
    }

    pub fn witness_range(&self) -> Range<usize> {
        self.num_precomputed..self.num_unshifted_entities()
    }

    pub fn shifted_range(&self) -> Range<usize> {
        self.num_unshifted_entities()..self.columns.len()
    }

    pub fn precomputed(&self) -> impl Iterator<Item = Column> {
        self.precomputed_range().map(Column::new)
    }

    pub fn witness(&self) -> impl Iterator<Item = Column> {
        self.witness_range().map(Column::new)
    }

    /// Columns with a shifted counterpart, in the order of their shifts.
    pub fn to_be_shifted(&self) -> impl Iterator<Item = Column> + '_ {
        self.shifted_range()
            .filter_map(move |i| self.columns[i].shift_of)
    }

    /// Pairs `(shifted column, source column)`.
    pub fn shifted_columns(&self) -> impl Iterator<Item = (Column, Column)> + '_ {
        self.shifted_range()
            .filter_map(move |i| self.columns[i].shift_of.map(|src| (Column::new(i), src)))
    }

    /// Commitment labels: the upper-cased column names.
    pub fn labels(&'static self) -> AllEntities<String> {
        AllEntities::from_fn(self, |_, spec| spec.name.to_uppercase())
    }
}

/// Builds an [EntitySchema] out of groups of columns, checking that the
/// layout agrees with the accessors of every group.
pub struct SchemaBuilder {
    flavor: &'static str,
    columns: Vec<ColumnSpec>,
    seen: HashMap<String, usize>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    /// Appends the columns of the group `G`.
    pub fn group<G: EntityGroup>(mut self) -> Self {
        for column in G::iter() {
            self.push(column.name(), G::ROLE, column.column());
        }
        self
    }

    fn push(&mut self, name: &'static str, role: ColumnRole, accessor: Column) {
        if self.error.is_some() {
            return;
        }
        let position = self.columns.len();
        self.error = if role == ColumnRole::Shifted {
            Some(SchemaError::DeclaredShift(name.to_string()))
        } else if role == ColumnRole::Precomputed
            && self.columns.iter().any(|c| c.role != ColumnRole::Precomputed)
        {
            Some(SchemaError::PrecomputedAfterWitness(name.to_string()))
        } else if self.seen.contains_key(name) {
            Some(SchemaError::DuplicateColumn(name.to_string()))
        } else if accessor.index() != position {
            Some(SchemaError::LayoutMismatch {
                name: name.to_string(),
                position,
                accessor: accessor.index(),
            })
        } else {
            None
        };
        self.seen.insert(name.to_string(), position);
        self.columns.push(ColumnSpec {
            name: name.to_string(),
            role,
            shift_of: None,
        });
    }

    /// Appends the shifted columns and checks the counts the flavor declares.
    pub fn build(self, declared: EntityCounts) -> Result<EntitySchema, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut columns = self.columns;
        let num_precomputed = columns
            .iter()
            .filter(|c| c.role == ColumnRole::Precomputed)
            .count();
        let num_witness = columns.len() - num_precomputed;

        let mut shifts = vec![None; columns.len()];
        let sources: Vec<(usize, String)> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role.is_shiftable())
            .map(|(i, c)| (i, c.name.clone()))
            .collect();
        for (source, name) in sources {
            shifts[source] = Some(Column::new(columns.len()));
            columns.push(ColumnSpec {
                name: format!("{name}_shift"),
                role: ColumnRole::Shifted,
                shift_of: Some(Column::new(source)),
            });
        }

        for (kind, declared, actual) in [
            ("precomputed", declared.precomputed, num_precomputed),
            ("witness", declared.witness, num_witness),
            ("total", declared.all, columns.len()),
        ] {
            if declared != actual {
                return Err(SchemaError::EntityCountMismatch {
                    kind,
                    declared,
                    actual,
                });
            }
        }

        let mut by_name = HashMap::with_capacity(columns.len());
        for (i, spec) in columns.iter().enumerate() {
            if by_name.insert(spec.name.clone(), Column::new(i)).is_some() {
                return Err(SchemaError::DuplicateColumn(spec.name.clone()));
            }
        }
        shifts.resize(columns.len(), None);

        Ok(EntitySchema {
            flavor: self.flavor,
            columns,
            num_precomputed,
            num_witness,
            shifts,
            by_name,
        })
    }
}

/// One value per column of a flavor, in the flat schema order.
#[derive(Clone, Debug)]
pub struct AllEntities<T> {
    schema: &'static EntitySchema,
    entities: Vec<T>,
}

/// A row of the trace: one field element per column.
pub type AllValues<F> = AllEntities<F>;

/// The polynomials of a proving key.
pub type ProverPolynomials<F> = AllEntities<Polynomial<F>>;

impl<T> AllEntities<T> {
    pub fn from_fn(
        schema: &'static EntitySchema,
        mut f: impl FnMut(Column, &ColumnSpec) -> T,
    ) -> Self {
        let entities = schema
            .columns
            .iter()
            .enumerate()
            .map(|(i, spec)| f(Column::new(i), spec))
            .collect();
        Self { schema, entities }
    }

    pub fn from_vec(schema: &'static EntitySchema, entities: Vec<T>) -> Result<Self, SchemaError> {
        if entities.len() != schema.num_all_entities() {
            return Err(SchemaError::EntityCountMismatch {
                kind: "total",
                declared: schema.num_all_entities(),
                actual: entities.len(),
            });
        }
        Ok(Self { schema, entities })
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, column: impl Into<Column>) -> &T {
        &self.entities[column.into().index()]
    }

    pub fn get_mut(&mut self, column: impl Into<Column>) -> &mut T {
        &mut self.entities[column.into().index()]
    }

    /// The value of the shifted counterpart of `column`.
    ///
    /// # Panics
    ///
    /// Panics if `column` is not shiftable.
    pub fn shifted(&self, column: impl Into<Column>) -> &T {
        let column = column.into();
        match self.schema.shifted(column) {
            Some(shift) => &self.entities[shift.index()],
            None => panic!(
                "the column {} of {} has no shift",
                self.schema.name(column),
                self.schema.flavor()
            ),
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.entities.iter_mut()
    }

    pub fn precomputed(&self) -> &[T] {
        &self.entities[self.schema.precomputed_range()]
    }

    pub fn precomputed_mut(&mut self) -> &mut [T] {
        let range = self.schema.precomputed_range();
        &mut self.entities[range]
    }

    pub fn witness(&self) -> &[T] {
        &self.entities[self.schema.witness_range()]
    }

    pub fn unshifted(&self) -> &[T] {
        &self.entities[..self.schema.num_unshifted_entities()]
    }

    pub fn shifted_entities(&self) -> &[T] {
        &self.entities[self.schema.shifted_range()]
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> AllEntities<U> {
        AllEntities {
            schema: self.schema,
            entities: self.entities.iter().map(f).collect(),
        }
    }

    /// Positional zip with another container of the same flavor.
    pub fn zip<'a, U>(&'a self, other: &'a AllEntities<U>) -> impl Iterator<Item = (&'a T, &'a U)> {
        assert!(
            std::ptr::eq(self.schema, other.schema),
            "zipping entities of different flavors"
        );
        self.entities.iter().zip(other.entities.iter())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.entities
    }
}

impl<T, C: Into<Column>> Index<C> for AllEntities<T> {
    type Output = T;

    fn index(&self, column: C) -> &T {
        self.get(column)
    }
}

impl<T, C: Into<Column>> IndexMut<C> for AllEntities<T> {
    fn index_mut(&mut self, column: C) -> &mut T {
        self.get_mut(column)
    }
}

impl<F: Zero> AllEntities<F> {
    pub fn zero(schema: &'static EntitySchema) -> Self {
        Self::from_fn(schema, |_, _| F::zero())
    }
}

impl<F: ark_ff::Field> AllEntities<Polynomial<F>> {
    /// Allocates zero columns for a trace of `circuit_size` rows.
    ///
    /// Shiftable columns get backing memory from row 1, so that their shift
    /// is a reindex; every other unshifted column is dense.
    pub fn allocate(schema: &'static EntitySchema, circuit_size: usize) -> Self {
        let mut polynomials = Self::from_fn(schema, |_, spec| {
            if spec.role.is_shiftable() {
                Polynomial::shiftable(circuit_size)
            } else if spec.role == ColumnRole::Shifted {
                Polynomial::new(0, circuit_size, 0)
            } else {
                Polynomial::dense(circuit_size)
            }
        });
        polynomials.set_shifted();
        polynomials
    }

    /// Recomputes every shifted column from its source.
    pub fn set_shifted(&mut self) {
        for (shift, source) in self.schema.shifted_columns() {
            self.entities[shift.index()] = self.entities[source.index()].shifted();
        }
    }

    /// The value of every column at `row`.
    pub fn get_row(&self, row: usize) -> AllValues<F> {
        self.map(|poly| poly.get(row))
    }

    pub fn circuit_size(&self) -> usize {
        self.entities.first().map_or(0, |p| p.virtual_size())
    }
}

/// A protocol variant.
pub trait Flavor: Sized + Send + Sync + 'static {
    type Curve: CommitmentCurve;
    type CircuitBuilder: Circuit<ScalarField<Self>>;

    const NAME: &'static str;

    const NUM_PRECOMPUTED_ENTITIES: usize;
    /// Witness columns, shifts excluded.
    const NUM_WITNESS_ENTITIES: usize;
    /// All columns, shifts included.
    const NUM_ALL_ENTITIES: usize;

    const MINIMUM_MINI_CIRCUIT_SIZE: usize;
    /// How many mini-trace columns are packed into a concatenated column,
    /// 1 for flavors without concatenation.
    const CONCATENATION_GROUP_SIZE: usize;

    /// The relations checked by the protocol.
    const RELATIONS: &'static [RelationDescriptor];
    const MAX_PARTIAL_RELATION_LENGTH: usize = max_partial_relation_length(Self::RELATIONS);
    const MAX_TOTAL_RELATION_LENGTH: usize = max_total_relation_length(Self::RELATIONS);
    const BATCHED_RELATION_PARTIAL_LENGTH: usize =
        batched_relation_partial_length(Self::RELATIONS);

    fn entity_counts() -> EntityCounts {
        EntityCounts {
            precomputed: Self::NUM_PRECOMPUTED_ENTITIES,
            witness: Self::NUM_WITNESS_ENTITIES,
            all: Self::NUM_ALL_ENTITIES,
        }
    }

    /// The column layout, built on first use.
    fn schema() -> Result<&'static EntitySchema, SchemaError>;

    fn compute_trace_sizes(
        circuit: &Self::CircuitBuilder,
        config: &ProverConfig,
    ) -> Result<TraceSizes, SetupError>;

    /// Fills the witness and precomputed columns from the circuit.
    fn populate_polynomials(
        polynomials: &mut ProverPolynomials<ScalarField<Self>>,
        circuit: &Self::CircuitBuilder,
        sizes: &TraceSizes,
        config: &ProverConfig,
    ) -> Result<TraceMetadata, SetupError>;

    /// The batching challenge `v` and the evaluation point `x` fixed when
    /// the key is built, zero for flavors without a non-native relation.
    fn key_challenges(_circuit: &Self::CircuitBuilder) -> (BaseField<Self>, BaseField<Self>) {
        (BaseField::<Self>::zero(), BaseField::<Self>::zero())
    }
}
