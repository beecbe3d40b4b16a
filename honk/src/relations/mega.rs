//! Shapes of the relations of the mega flavor.

use super::RelationDescriptor;

pub const MEGA_RELATIONS: [RelationDescriptor; 10] = [
    RelationDescriptor::new("UltraArithmeticRelation", &[6, 5]),
    RelationDescriptor::new("UltraPermutationRelation", &[6, 3]),
    RelationDescriptor::new("LogDerivLookupRelation", &[5, 5]),
    RelationDescriptor::new("DeltaRangeConstraintRelation", &[6; 4]),
    RelationDescriptor::new("EllipticRelation", &[6, 6]),
    RelationDescriptor::new("AuxiliaryRelation", &[6; 6]),
    RelationDescriptor::new("EccOpQueueRelation", &[3; 8]),
    RelationDescriptor::new("DatabusLookupRelation", &[5; 6]),
    RelationDescriptor::new("Poseidon2ExternalRelation", &[7; 4]),
    RelationDescriptor::new("Poseidon2InternalRelation", &[7; 4]),
];
