use rand::Rng;
use std::fmt;
use std::ops::Mul;

pub mod addsub;
pub mod comm;
pub mod distributed;
pub mod error;
pub mod karatsuba;
pub mod partition;
pub mod schoolbook_mul;
#[cfg(test)]
mod test_utils;

pub use comm::{Communicator, LocalCluster, LocalComm, Tag};
pub use distributed::{distributed_karatsuba_mul, distributed_regular_mul};
pub use error::CommError;
pub use karatsuba::karatsuba_mul;
pub use schoolbook_mul::schoolbook_mul;

pub type Coeff = i64;
/// Accumulator for convolution sums, and the type Karatsuba's sums of halves and
/// sub-products live in. Products of two `Coeff`s fit, and so does the sum of any realistic
/// number of them.
pub type WideCoeff = i128;

/// Below this many coefficients (in either operand) Karatsuba hands off to schoolbook.
pub const KARATSUBA_THRESHOLD: usize = 64;

/// Dense polynomial, `coeffs[i]` is the coefficient of `x^i`.
///
/// Trailing zeros are allowed; `trim` strips them when a canonical form is wanted.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct Poly {
    coeffs: Vec<Coeff>,
}

impl fmt::Debug for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Poly").field(&self.coeffs).finish()
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_term = false;
        for (i, &c) in self.coeffs.iter().enumerate() {
            if c == 0 {
                continue;
            }
            if wrote_term {
                write!(f, "{}", if c < 0 { " - " } else { " + " })?;
            } else if c < 0 {
                write!(f, "-")?;
            }
            let abs = c.unsigned_abs();
            match i {
                0 => write!(f, "{}", abs)?,
                1 if abs == 1 => write!(f, "x")?,
                1 => write!(f, "{}x", abs)?,
                _ if abs == 1 => write!(f, "x^{}", i)?,
                _ => write!(f, "{}x^{}", abs, i)?,
            }
            wrote_term = true;
        }
        if !wrote_term {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl From<Vec<Coeff>> for Poly {
    fn from(coeffs: Vec<Coeff>) -> Self {
        Poly { coeffs }
    }
}

impl Poly {
    pub fn new(coeffs: Vec<Coeff>) -> Self {
        Poly { coeffs }
    }
    pub fn empty() -> Self {
        Poly { coeffs: Vec::new() }
    }
    /// `len` zero coefficients.
    pub fn zero(len: usize) -> Self {
        Poly {
            coeffs: vec![0; len],
        }
    }
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
    pub fn coeffs(&self) -> &[Coeff] {
        &self.coeffs
    }
    pub fn widened(&self) -> Vec<WideCoeff> {
        self.coeffs.iter().map(|&c| WideCoeff::from(c)).collect()
    }
    /// Narrows a finished product back to `Coeff`s.
    pub fn from_wide(coeffs: Vec<WideCoeff>) -> Self {
        Poly {
            coeffs: coeffs.into_iter().map(narrow).collect(),
        }
    }
    pub fn into_coeffs(self) -> Vec<Coeff> {
        self.coeffs
    }
    /// Coefficient of `x^i`, reading past the end as zero.
    pub fn get(&self, i: usize) -> Coeff {
        self.coeffs.get(i).copied().unwrap_or(0)
    }
    /// Index of the highest nonzero coefficient.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|&c| c != 0)
    }
    /// Drops trailing zeros, but never below a single coefficient.
    pub fn trim(&mut self) {
        while self.coeffs.len() > 1 && self.coeffs.last() == Some(&0) {
            self.coeffs.pop();
        }
    }
    pub fn trimmed(mut self) -> Self {
        self.trim();
        self
    }
    /// `degree + 1` coefficients drawn uniformly from `0..=max_coeff`.
    pub fn random<R: Rng>(rng: &mut R, degree: usize, max_coeff: Coeff) -> Self {
        Poly {
            coeffs: (0..=degree).map(|_| rng.gen_range(0..=max_coeff)).collect(),
        }
    }
    /// Copy extended with trailing zeros up to `len`. Longer polynomials are left alone.
    pub fn padded(&self, len: usize) -> Self {
        let mut coeffs = self.coeffs.clone();
        if coeffs.len() < len {
            coeffs.resize(len, 0);
        }
        Poly { coeffs }
    }
}

// A sum that doesn't fit back into `Coeff` means the operands were out of range for this
// crate; that's a bug in the caller, not something to recover from.
pub(crate) fn narrow(x: WideCoeff) -> Coeff {
    debug_assert!(
        Coeff::try_from(x).is_ok(),
        "coefficient {} overflows the coefficient type",
        x
    );
    x as Coeff
}

/// Something that can multiply two polynomials on its own, without talking to other roles.
/// Works on wide coefficients so a product can be passed on before anything is narrowed.
pub trait Multiplier {
    fn multiply(&self, l: &[WideCoeff], r: &[WideCoeff]) -> Vec<WideCoeff>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Schoolbook;

#[derive(Debug, Clone, Copy, Default)]
pub struct Karatsuba;

impl Multiplier for Schoolbook {
    fn multiply(&self, l: &[WideCoeff], r: &[WideCoeff]) -> Vec<WideCoeff> {
        schoolbook_mul::schoolbook_mul_wide(l, r)
    }
}

impl Multiplier for Karatsuba {
    fn multiply(&self, l: &[WideCoeff], r: &[WideCoeff]) -> Vec<WideCoeff> {
        karatsuba::karatsuba_mul_wide(l, r)
    }
}

impl<'a, 'b> Mul<&'b Poly> for &'a Poly {
    type Output = Poly;

    fn mul(self, other: &'b Poly) -> Poly {
        let min_len = std::cmp::min(self.len(), other.len());
        if min_len >= KARATSUBA_THRESHOLD {
            karatsuba_mul(self, other)
        } else {
            schoolbook_mul(self, other)
        }
    }
}
