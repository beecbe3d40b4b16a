use honk_utils::math::*;
use proptest::prelude::*;

#[test]
fn test_log2() {
    let tests = [
        (1, 0),
        (2, 1),
        (3, 2),
        (9, 4),
        (15, 4),
        (15430, 14),
        (usize::MAX, 64),
    ];
    for (d, expected_res) in tests.iter() {
        let res = ceil_log2(*d);
        assert_eq!(res, *expected_res, "ceil(log2({d}))");
    }
}

#[test]
fn test_ceil_div() {
    assert_eq!(ceil_div(16383, 3), 5461);
    assert_eq!(ceil_div(16384, 3), 5462);
    assert_eq!(ceil_div(0, 7), 0);
    assert_eq!(ceil_div(14, 7), 2);
}

#[test]
fn test_next_power_of_two_at_least() {
    assert_eq!(next_power_of_two_at_least(0, 2048), 2048);
    assert_eq!(next_power_of_two_at_least(2049, 2048), 4096);
    assert_eq!(next_power_of_two_at_least(5, 1), 8);
}

proptest! {
    #[test]
    fn test_power_of_two_and_monotone(a in 0usize..1 << 20, b in 0usize..1 << 20, min_log in 0u32..12) {
        let minimum = 1usize << min_log;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let size_lo = next_power_of_two_at_least(lo, minimum);
        let size_hi = next_power_of_two_at_least(hi, minimum);
        prop_assert!(size_lo.is_power_of_two());
        prop_assert!(size_lo >= minimum);
        prop_assert!(size_lo <= size_hi);
    }
}
