use crate::{narrow, Coeff, Poly, WideCoeff};

/// Coefficient `k` of `l * r`, summed directly from the operands.
///
/// Only the terms `l[i] * r[k - i]` with both indices in range contribute, so this never
/// reads outside either operand. `k` past the end of the product gives 0.
pub fn convolution_coeff(l: &Poly, r: &Poly, k: usize) -> Coeff {
    if l.is_empty() || r.is_empty() {
        return 0;
    }
    let start = (k + 1).saturating_sub(r.len());
    let end = std::cmp::min(k, l.len() - 1);
    if start > end {
        return 0;
    }
    let sum: WideCoeff = l.coeffs[start..=end]
        .iter()
        .zip(r.coeffs[k - end..=k - start].iter().rev())
        .map(|(&l_coeff, &r_coeff)| l_coeff as WideCoeff * r_coeff as WideCoeff)
        .sum();
    narrow(sum)
}

pub fn schoolbook_mul(l: &Poly, r: &Poly) -> Poly {
    Poly::from_wide(convolve(l.coeffs(), r.coeffs()))
}

/// Schoolbook on operands that are already wide; the product is left wide.
pub fn schoolbook_mul_wide(l: &[WideCoeff], r: &[WideCoeff]) -> Vec<WideCoeff> {
    convolve(l, r)
}

fn convolve<T: Copy>(l: &[T], r: &[T]) -> Vec<WideCoeff>
where
    WideCoeff: From<T>,
{
    if l.is_empty() || r.is_empty() {
        return Vec::new();
    }
    let mut acc: Vec<WideCoeff> = vec![0; l.len() + r.len() - 1];
    for (i, &l_coeff) in l.iter().enumerate() {
        let l_coeff = WideCoeff::from(l_coeff);
        for (&r_coeff, out) in r.iter().zip(acc[i..].iter_mut()) {
            *out += l_coeff * WideCoeff::from(r_coeff);
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mul_zero(a in nonempty_poly(1..20)) {
            let prod = schoolbook_mul(&Poly::zero(1), &a);
            assert_eq!(prod, Poly::zero(a.len()));
        }
    }
    proptest! {
        #[test]
        fn mul_identity(a in any_poly(0..20)) {
            let one = Poly::new(vec![1]);
            let prod = schoolbook_mul(&one, &a);
            assert_eq!(prod, a);
        }
    }
    proptest! {
        #[test]
        fn commutative(a in any_poly(0..20), b in any_poly(0..20)) {
            assert_eq!(schoolbook_mul(&a, &b), schoolbook_mul(&b, &a));
        }
    }
    proptest! {
        #[test]
        fn distributive(a in any_poly(0..20), b in any_poly(0..20), c in any_poly(0..20)) {
            let sum_last = schoolbook_mul(&a, &c) + schoolbook_mul(&b, &c);
            let sum_first = schoolbook_mul(&(a.clone() + b.clone()), &c);
            assert_eq!(sum_first, sum_last);
        }
    }
    proptest! {
        #[test]
        fn single_coefficients_match_full_product(a in nonempty_poly(1..20), b in nonempty_poly(1..20)) {
            let prod = schoolbook_mul(&a, &b);
            assert_eq!(prod.len(), a.len() + b.len() - 1);
            for k in 0..prod.len() {
                assert_eq!(convolution_coeff(&a, &b, k), prod.coeffs()[k]);
            }
            assert_eq!(convolution_coeff(&a, &b, prod.len()), 0);
        }
    }
    #[test]
    fn hardcoded() {
        let a = Poly::new(vec![1, 2, 3]);
        let b = Poly::new(vec![4, 5]);
        assert_eq!(schoolbook_mul(&a, &b), Poly::new(vec![4, 13, 22, 15]));
    }
    #[test]
    fn scalars() {
        let prod = schoolbook_mul(&Poly::new(vec![-7]), &Poly::new(vec![6]));
        assert_eq!(prod, Poly::new(vec![-42]));
    }
}
