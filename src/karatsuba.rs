use crate::schoolbook_mul::schoolbook_mul_wide;
use crate::{Poly, WideCoeff, KARATSUBA_THRESHOLD};

/// Pads `p` with zeros to `n` coefficients and splits it at `n / 2` into `[low, high]`.
pub fn split_halves(p: &[WideCoeff], n: usize) -> [Vec<WideCoeff>; 2] {
    let mut low = p.to_vec();
    if low.len() < n {
        low.resize(n, 0);
    }
    let high = low.split_off(n / 2);
    [low, high]
}

pub fn add_halves(low: &[WideCoeff], high: &[WideCoeff]) -> Vec<WideCoeff> {
    let (long, short) = if low.len() >= high.len() {
        (low, high)
    } else {
        (high, low)
    };
    let mut sum = long.to_vec();
    add_assign_slice(&mut sum, short);
    sum
}

fn add_assign_slice(target: &mut [WideCoeff], other: &[WideCoeff]) {
    for (t, &o) in target.iter_mut().zip(other) {
        *t += o;
    }
}

fn sub_assign_slice(target: &mut [WideCoeff], other: &[WideCoeff]) {
    for (t, &o) in target.iter_mut().zip(other) {
        *t -= o;
    }
}

/// `z2 * x^(2 * split) + (z1 - z0 - z2) * x^split + z0`
pub fn recombine(
    z0: &[WideCoeff],
    z1: &[WideCoeff],
    z2: &[WideCoeff],
    split: usize,
) -> Vec<WideCoeff> {
    let len = [
        z0.len(),
        split + z0.len(),
        split + z1.len(),
        2 * split + z2.len(),
    ]
    .iter()
    .copied()
    .max()
    .unwrap_or(0);
    let mut coeffs = vec![0; len];
    add_assign_slice(&mut coeffs, z0);
    add_assign_slice(&mut coeffs[split..], z1);
    sub_assign_slice(&mut coeffs[split..], z0);
    sub_assign_slice(&mut coeffs[split..], z2);
    add_assign_slice(&mut coeffs[2 * split..], z2);
    coeffs
}

#[tracing::instrument(skip_all, name = "karatsuba_mul")]
pub fn karatsuba_mul(l: &Poly, r: &Poly) -> Poly {
    Poly::from_wide(karatsuba_mul_wide(&l.widened(), &r.widened()))
}

/// Sums of halves and the sub-products can outgrow `Coeff` even when the final product
/// doesn't, so everything below [`karatsuba_mul`] stays wide.
pub fn karatsuba_mul_wide(l: &[WideCoeff], r: &[WideCoeff]) -> Vec<WideCoeff> {
    if l.len() < KARATSUBA_THRESHOLD || r.len() < KARATSUBA_THRESHOLD {
        return schoolbook_mul_wide(l, r);
    }
    let n = std::cmp::max(l.len(), r.len());
    let split = n / 2;
    let [l0, l1] = split_halves(l, n);
    let [r0, r1] = split_halves(r, n);
    let prod0 = karatsuba_mul_wide(&l0, &r0);
    let prod2 = karatsuba_mul_wide(&l1, &r1);
    let prod1 = karatsuba_mul_wide(&add_halves(&l0, &l1), &add_halves(&r0, &r1));
    let mut coeffs = recombine(&prod0, &prod1, &prod2, split);
    // Padding to n only adds zero coefficients past the true degree.
    coeffs.truncate(l.len() + r.len() - 1);
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schoolbook_mul::schoolbook_mul;
    use crate::test_utils::*;
    use proptest::prelude::*;
    proptest! {
        #[test]
        fn test_karatsuba_mul(a in any_poly(0..300), b in any_poly(0..300)) {
            let expected = schoolbook_mul(&a, &b);
            let actual = karatsuba_mul(&a, &b);
            assert_eq!(expected, actual);
        }
    }
    proptest! {
        #[test]
        fn test_karatsuba_mul_lopsided(a in any_poly(64..80), b in any_poly(150..400)) {
            assert_eq!(schoolbook_mul(&a, &b), karatsuba_mul(&a, &b));
            assert_eq!(schoolbook_mul(&b, &a), karatsuba_mul(&b, &a));
        }
    }
    proptest! {
        #[test]
        fn test_split_halves(a in any_poly(0..50), extra in 0usize..50) {
            let n = a.len() + extra;
            let [low, high] = split_halves(&a.widened(), n);
            assert_eq!(low.len(), n / 2);
            assert_eq!(high.len(), n - n / 2);
            let rejoined: Vec<_> = low.into_iter().chain(high).collect();
            assert_eq!(rejoined, a.padded(n).widened());
        }
    }
    #[test]
    fn test_karatsuba_hardcoded() {
        let a = Poly::new(vec![1, 2, 3]);
        let b = Poly::new(vec![4, 5]);
        assert_eq!(karatsuba_mul(&a, &b), Poly::new(vec![4, 13, 22, 15]));
    }
    #[test]
    fn test_recombine_hardcoded() {
        // (1 + 2x + 3x^2 + 4x^3) * (5 + 6x), split at 2
        let z0 = [5, 16, 12];
        let z2 = [0, 0, 0];
        let z1 = [20, 54, 36];
        assert_eq!(
            recombine(&z0, &z1, &z2, 2),
            vec![5, 16, 27, 38, 24, 0, 0]
        );
    }
    #[test]
    fn test_karatsuba_across_threshold() {
        for &len in &[63, 64, 65, 127, 128, 129, 257] {
            let a = Poly::new((0..len as i64).map(|i| i % 7 - 3).collect());
            let b = Poly::new((0..len as i64).map(|i| (i * 5) % 11 - 5).collect());
            assert_eq!(karatsuba_mul(&a, &b), schoolbook_mul(&a, &b), "len {}", len);
        }
    }
    #[test]
    fn test_karatsuba_near_coefficient_limit() {
        // Every coefficient of the product fits in a Coeff, but (low + high)^2 does not.
        let a = Poly::new(vec![320_000_000; 64]);
        assert_eq!(karatsuba_mul(&a, &a), schoolbook_mul(&a, &a));
        let b = -Poly::new(vec![320_000_000; 100]);
        assert_eq!(karatsuba_mul(&a, &b), schoolbook_mul(&a, &b));
    }
    #[test]
    fn test_karatsuba_degenerate() {
        let a = Poly::new((1..=100).collect());
        assert_eq!(karatsuba_mul(&a, &Poly::zero(1)), Poly::zero(a.len()));
        assert_eq!(
            karatsuba_mul(&Poly::new(vec![3]), &Poly::new(vec![-4])),
            Poly::new(vec![-12])
        );
    }
}
