//! Highest common factor and the coprimality test built on it.

/// Euclid's remainder algorithm: `hcf x 0 = x`, `hcf x y = hcf y (x mod y)`.
pub fn hcf(mut x: i64, mut y: i64) -> i64 {
    while y != 0 {
        let t = x % y;
        x = y;
        y = t;
    }
    x
}

#[inline]
pub fn relprime(x: i64, y: i64) -> bool {
    hcf(x, y) == 1
}
