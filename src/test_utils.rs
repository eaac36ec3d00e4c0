use crate::{Coeff, Poly};
use proptest::prelude::*;

// Keeps every intermediate Karatsuba sum far away from overflowing `Coeff`.
const COEFF_BOUND: Coeff = 1 << 20;

pub fn any_poly(range: std::ops::Range<usize>) -> impl Strategy<Value = Poly> {
    proptest::collection::vec(-COEFF_BOUND..COEFF_BOUND, range).prop_map(Poly::new)
}
pub fn nonempty_poly(range: std::ops::Range<usize>) -> impl Strategy<Value = Poly> {
    let start = std::cmp::max(range.start, 1);
    any_poly(start..std::cmp::max(range.end, start + 1))
}
/// Digit-like coefficients, the shape the driver generates.
pub fn small_poly(range: std::ops::Range<usize>) -> impl Strategy<Value = Poly> {
    proptest::collection::vec(0..10 as Coeff, range).prop_map(Poly::new)
}
