use ark_bn254::Fr;
use ark_ff::{UniformRand, Zero};
use honk_utils::{serialization::SerdeAs, Polynomial};
use proptest::prelude::*;
use serde_with::ser::SerializeAsWrap;

#[test]
fn test_shiftable_column_reads_zero_in_first_row() {
    let mut poly = Polynomial::<Fr>::shiftable(8);
    assert_eq!(poly.start_index(), 1);
    assert_eq!(poly.size(), 7);
    assert_eq!(poly.virtual_size(), 8);
    poly.set(1, Fr::from(3u64));
    poly.set(7, Fr::from(9u64));
    assert!(poly.get(0).is_zero());
    assert_eq!(poly.get(1), Fr::from(3u64));
    assert_eq!(poly.get(7), Fr::from(9u64));
}

#[test]
#[should_panic]
fn test_write_outside_backing_memory_panics() {
    let mut poly = Polynomial::<Fr>::shiftable(8);
    poly.set(0, Fr::from(1u64));
}

#[test]
#[should_panic]
fn test_shift_of_dense_column_panics() {
    let poly = Polynomial::<Fr>::dense(8);
    let _ = poly.shifted();
}

#[test]
fn test_shift_reads_next_row_and_zero_at_the_end() {
    let mut rng = ark_std::test_rng();
    let size = 16;
    let mut poly = Polynomial::<Fr>::shiftable(size);
    for row in 1..size {
        poly.set(row, Fr::rand(&mut rng));
    }
    let shifted = poly.shifted();
    assert_eq!(shifted.virtual_size(), size);
    for row in 0..size - 1 {
        assert_eq!(shifted.get(row), poly.get(row + 1));
    }
    assert!(shifted.get(size - 1).is_zero());
}

#[test]
fn test_serialization_keeps_layout() {
    let mut poly = Polynomial::<Fr>::shiftable(4);
    poly.set(2, Fr::from(42u64));
    let bytes = rmp_serde::to_vec(&poly).unwrap();
    let decoded: Polynomial<Fr> = rmp_serde::from_slice(&bytes).unwrap();
    assert_eq!(decoded, poly);
    assert_eq!(decoded.start_index(), 1);
}

#[test]
fn test_decoding_rejects_window_past_virtual_size() {
    let coefficients = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
    let encode = |start_index: usize, virtual_size: usize| {
        let wrapped = SerializeAsWrap::<_, Vec<SerdeAs>>::new(&coefficients);
        rmp_serde::to_vec(&(wrapped, start_index, virtual_size)).unwrap()
    };

    let decoded: Polynomial<Fr> = rmp_serde::from_slice(&encode(1, 4)).unwrap();
    assert_eq!(decoded.get(3), Fr::from(3u64));
    assert!(rmp_serde::from_slice::<Polynomial<Fr>>(&encode(2, 4)).is_err());
    assert!(rmp_serde::from_slice::<Polynomial<Fr>>(&encode(usize::MAX, 4)).is_err());
}

proptest! {
    #[test]
    fn test_shift_relation_holds_for_any_values(values in prop::collection::vec(any::<u64>(), 1..64)) {
        let size = values.len() + 1;
        let coefficients: Vec<Fr> = values.iter().map(|v| Fr::from(*v)).collect();
        let poly = Polynomial::from_coefficients(coefficients, size, 1);
        let shifted = poly.shifted();
        for row in 0..size - 1 {
            prop_assert_eq!(shifted.get(row), poly.get(row + 1));
        }
        prop_assert_eq!(poly.rows().count(), size);
    }
}
