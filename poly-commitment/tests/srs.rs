use ark_bn254::{Fr, G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, UniformRand, Zero};
use honk_poly_commitment::{
    commitment::{add_commitment_columns, add_commitments},
    CommitmentError, SRS,
};
use honk_utils::Polynomial;
use once_cell::sync::Lazy;
use proptest::prelude::*;

static SRS: Lazy<SRS<G1Affine>> = Lazy::new(|| SRS::create(1 << 8));

#[test]
fn test_trusted_setup_powers() {
    let x = Fr::from(7u64);
    let srs = unsafe { SRS::<G1Affine>::create_trusted_setup(x, 4) };
    let g = G1Affine::generator();
    assert_eq!(srs.g[0], g);
    assert_eq!(srs.g[1], (g * x).into_affine());
    assert_eq!(srs.g[3], (g * (x * x * x)).into_affine());
}

#[test]
fn test_offset_commitment_is_a_shifted_window() {
    let mut rng = ark_std::test_rng();
    let coeffs: Vec<Fr> = (0..10).map(|_| Fr::rand(&mut rng)).collect();
    let mut padded = vec![Fr::zero(); 5];
    padded.extend_from_slice(&coeffs);

    let at_offset = SRS.commit_at_offset(&coeffs, 5).unwrap();
    let dense = SRS.commit_at_offset(&padded, 0).unwrap();
    assert_eq!(at_offset, dense);
}

#[test]
fn test_commit_honours_start_index() {
    let mut poly = Polynomial::<Fr>::shiftable(16);
    poly.set(1, Fr::one());
    assert_eq!(SRS.commit(&poly).unwrap(), SRS.g[1]);
}

#[test]
fn test_commitments_add_up() {
    let mut rng = ark_std::test_rng();
    let first: Vec<Fr> = (0..6).map(|_| Fr::rand(&mut rng)).collect();
    let second: Vec<Fr> = (0..9).map(|_| Fr::rand(&mut rng)).collect();
    let mut both = first.clone();
    both.extend_from_slice(&second);

    let c_first = SRS.commit_at_offset(&first, 0).unwrap();
    let c_second = SRS.commit_at_offset(&second, first.len()).unwrap();
    let c_both = SRS.commit_at_offset(&both, 0).unwrap();
    assert_eq!(add_commitments(&c_first, &c_second), c_both);
    assert_eq!(
        add_commitment_columns(&[c_first, G1Affine::zero()], &[c_second, c_both]),
        [c_both, c_both]
    );
}

#[test]
fn test_large_commitment_matches_naive_sum() {
    let srs = SRS::<G1Affine>::create(1 << 13);
    let coeffs: Vec<Fr> = (0..(1u64 << 13)).map(Fr::from).collect();
    let expected = srs
        .g
        .iter()
        .zip(&coeffs)
        .fold(G1Projective::zero(), |acc, (g, c)| acc + *g * c)
        .into_affine();
    assert_eq!(srs.commit_at_offset(&coeffs, 0).unwrap(), expected);
}

#[test]
fn test_polynomial_too_large() {
    let coeffs = vec![Fr::one(); 4];
    let err = SRS.commit_at_offset(&coeffs, SRS.max_poly_size() - 2).unwrap_err();
    assert!(matches!(
        err,
        CommitmentError::PolynomialTooLarge { end, srs_size } if end == 258 && srs_size == 256
    ));
}

#[test]
fn test_empty_commitment_is_identity() {
    assert!(SRS.commit_at_offset(&[], 3).unwrap().is_zero());
}

#[test]
fn test_srs_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_bn254.srs");
    let srs = SRS::<G1Affine>::create(16);
    srs.write_to_file(&path).unwrap();
    let loaded = SRS::<G1Affine>::read_from_file(&path).unwrap();
    assert_eq!(srs, loaded);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn test_commitment_is_linear(a in any::<u64>(), b in any::<u64>(), offset in 0usize..64) {
        let left: Vec<Fr> = (0..32u64).map(|i| Fr::from(a.wrapping_add(i))).collect();
        let right: Vec<Fr> = (0..32u64).map(|i| Fr::from(b.wrapping_mul(i + 1))).collect();
        let sum: Vec<Fr> = left.iter().zip(&right).map(|(l, r)| *l + r).collect();
        let c_left = SRS.commit_at_offset(&left, offset).unwrap();
        let c_right = SRS.commit_at_offset(&right, offset).unwrap();
        prop_assert_eq!(add_commitments(&c_left, &c_right), SRS.commit_at_offset(&sum, offset).unwrap());
    }
}
