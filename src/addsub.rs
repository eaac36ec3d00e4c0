use crate::{Coeff, Poly};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

fn add_assign_coeffs(target: &mut Vec<Coeff>, other: &[Coeff]) {
    if target.len() < other.len() {
        target.resize(other.len(), 0);
    }
    for (target_coeff, &other_coeff) in target.iter_mut().zip(other.iter()) {
        *target_coeff += other_coeff;
    }
}

fn sub_assign_coeffs(target: &mut Vec<Coeff>, other: &[Coeff]) {
    if target.len() < other.len() {
        target.resize(other.len(), 0);
    }
    for (target_coeff, &other_coeff) in target.iter_mut().zip(other.iter()) {
        *target_coeff -= other_coeff;
    }
}

impl Poly {
    /// `self * x^offset`. Shifting an empty polynomial gives an empty polynomial.
    pub fn shift(&self, offset: usize) -> Poly {
        if self.is_empty() {
            return Poly::empty();
        }
        let mut coeffs = vec![0; self.len() + offset];
        coeffs[offset..].copy_from_slice(&self.coeffs);
        Poly { coeffs }
    }
}

impl Add for Poly {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl<'a> Add<&'a Poly> for Poly {
    type Output = Self;

    fn add(mut self, other: &'a Self) -> Self {
        self += other;
        self
    }
}

impl<'a> Add<Poly> for &'a Poly {
    type Output = Poly;

    fn add(self, mut other: Poly) -> Poly {
        other += self;
        other
    }
}

impl<'a, 'b> Add<&'b Poly> for &'a Poly {
    type Output = Poly;

    fn add(self, other: &'b Poly) -> Poly {
        let (big, small) = if self.len() > other.len() {
            (self, other)
        } else {
            (other, self)
        };
        big.clone() + small
    }
}

impl AddAssign for Poly {
    fn add_assign(&mut self, mut other: Self) {
        if self.len() < other.len() {
            std::mem::swap(self, &mut other);
        }
        add_assign_coeffs(&mut self.coeffs, &other.coeffs);
    }
}

impl<'a> AddAssign<&'a Poly> for Poly {
    fn add_assign(&mut self, other: &'a Self) {
        add_assign_coeffs(&mut self.coeffs, &other.coeffs);
    }
}

impl Sub for Poly {
    type Output = Self;

    fn sub(mut self, other: Self) -> Self {
        self -= &other;
        self
    }
}

impl<'a> Sub<&'a Poly> for Poly {
    type Output = Self;

    fn sub(mut self, other: &'a Self) -> Self {
        self -= other;
        self
    }
}

impl<'a> Sub<Poly> for &'a Poly {
    type Output = Poly;

    fn sub(self, mut other: Poly) -> Poly {
        other -= self;
        -other
    }
}

impl<'a, 'b> Sub<&'b Poly> for &'a Poly {
    type Output = Poly;

    fn sub(self, other: &'b Poly) -> Poly {
        let mut out = self.clone();
        out -= other;
        out
    }
}

impl SubAssign for Poly {
    fn sub_assign(&mut self, other: Self) {
        *self -= &other;
    }
}

impl<'a> SubAssign<&'a Poly> for Poly {
    fn sub_assign(&mut self, other: &'a Self) {
        sub_assign_coeffs(&mut self.coeffs, &other.coeffs);
    }
}

impl Neg for Poly {
    type Output = Self;

    fn neg(mut self) -> Self {
        for coeff in self.coeffs.iter_mut() {
            *coeff = -*coeff;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use proptest::prelude::*;
    proptest! {
        #[test]
        fn test_addition_methods_match(a in any_poly(0..20), b in any_poly(0..20)) {
            let reference_sum = &a + &b;
            assert_eq!(reference_sum.len(), std::cmp::max(a.len(), b.len()));
            assert_eq!(reference_sum, &b + &a);
            assert_eq!(reference_sum, a.clone() + &b);
            assert_eq!(reference_sum, b.clone() + &a);
            assert_eq!(reference_sum, &a + b.clone());
            assert_eq!(reference_sum, &b + a.clone());
            assert_eq!(reference_sum, a.clone() + b.clone());
            assert_eq!(reference_sum, b.clone() + a.clone());
        }
    }
    proptest! {
        #[test]
        fn test_subtraction_methods_match(a in any_poly(0..20), b in any_poly(0..20)) {
            let reference_diff = &a - &b;
            assert_eq!(reference_diff.len(), std::cmp::max(a.len(), b.len()));
            assert_eq!(reference_diff, a.clone() - &b);
            assert_eq!(reference_diff, &a - b.clone());
            assert_eq!(reference_diff, a.clone() - b.clone());
        }
    }
    proptest! {
        #[test]
        fn test_additive_associativity(
            a in any_poly(0..20),
            b in any_poly(0..20),
            c in any_poly(0..20),
            ) {
            assert_eq!(&a + (&b + &c), (&a + &b) + &c);
        }
    }
    proptest! {
        #[test]
        fn test_additive_inverse(a in any_poly(0..20), b in any_poly(0..20)) {
            let c = &a + &b;
            assert_eq!(&b + (&c - &b), c);
            assert_eq!(&a + (&c - &a), c);
        }
    }
    proptest! {
        #[test]
        fn test_shift_composes(a in any_poly(0..20), m in 0usize..10, n in 0usize..10) {
            assert_eq!(a.shift(m).shift(n), a.shift(m + n));
        }
    }
    #[test]
    fn test_shift_hardcoded() {
        let a = Poly::new(vec![1, 2]);
        assert_eq!(a.shift(0), a);
        assert_eq!(a.shift(3), Poly::new(vec![0, 0, 0, 1, 2]));
        assert_eq!(Poly::empty().shift(5), Poly::empty());
    }
    #[test]
    fn test_add_uneven_lengths() {
        let a = Poly::new(vec![1, 2, 3]);
        let b = Poly::new(vec![10]);
        assert_eq!(&a + &b, Poly::new(vec![11, 2, 3]));
        assert_eq!(&b - &a, Poly::new(vec![9, -2, -3]));
    }
}
