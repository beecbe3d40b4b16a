/// Returns ceil(log2(d)) but panics if d = 0.
pub fn ceil_log2(d: usize) -> usize {
    assert!(d != 0);
    let mut pow2 = 1;
    let mut ceil_log2 = 0;
    while d > pow2 {
        ceil_log2 += 1;
        pow2 = match pow2.checked_mul(2) {
            Some(x) => x,
            None => break,
        }
    }
    ceil_log2
}

/// Integer division rounding up, panics if `b = 0`.
pub fn ceil_div(a: usize, b: usize) -> usize {
    assert!(b != 0);
    a / b + usize::from(a % b != 0)
}

/// Smallest power of two that is at least `max(n, minimum)`.
pub fn next_power_of_two_at_least(n: usize, minimum: usize) -> usize {
    n.max(minimum).next_power_of_two()
}
