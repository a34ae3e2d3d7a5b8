//! Evaluation domains and dense polynomials

use crate::{PlonkError, Result, Scalar};
use ff::{Field, PrimeField};

/// Multiplicative subgroup of order `2^k` used as the evaluation domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    size: usize,
    log_size: u32,
    omega: Scalar,
    omega_inv: Scalar,
    size_inv: Scalar,
}

impl Domain {
    /// Creates a new domain of the given size
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(PlonkError::Polynomial(format!(
                "domain size {} is not a power of two",
                size
            )));
        }

        let log_size = size.trailing_zeros();
        if log_size > Scalar::S {
            return Err(PlonkError::Polynomial(format!(
                "domain size 2^{} exceeds the two-adicity of the field",
                log_size
            )));
        }

        let exponent = 1u64 << (Scalar::S - log_size);
        let omega = Scalar::ROOT_OF_UNITY.pow_vartime(&[exponent, 0, 0, 0]);
        let omega_inv = invert(&omega)?;
        let size_inv = invert(&Scalar::from(size as u64))?;

        Ok(Self {
            size,
            log_size,
            omega,
            omega_inv,
            size_inv,
        })
    }

    /// Returns the size of the domain
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    /// Returns the generator of the domain
    pub fn generator(&self) -> Scalar {
        self.omega
    }

    /// `1 / n`
    pub fn size_inv(&self) -> Scalar {
        self.size_inv
    }

    /// `omega^i`
    pub fn element(&self, i: usize) -> Scalar {
        self.omega.pow_vartime(&[i as u64, 0, 0, 0])
    }

    /// All domain elements in order
    pub fn elements(&self) -> Vec<Scalar> {
        let mut elements = Vec::with_capacity(self.size);
        let mut current = Scalar::ONE;
        for _ in 0..self.size {
            elements.push(current);
            current *= self.omega;
        }
        elements
    }

    /// Evaluations over the domain of the polynomial with the given coefficients
    pub fn fft(&self, coeffs: &[Scalar]) -> Result<Vec<Scalar>> {
        if coeffs.len() > self.size {
            return Err(PlonkError::Polynomial(format!(
                "{} coefficients do not fit a domain of size {}",
                coeffs.len(),
                self.size
            )));
        }

        let mut values = coeffs.to_vec();
        values.resize(self.size, Scalar::ZERO);
        fft_in_place(&mut values, self.omega, self.log_size);
        Ok(values)
    }

    /// Coefficients of the polynomial with the given evaluations
    pub fn ifft(&self, evals: &[Scalar]) -> Result<Vec<Scalar>> {
        if evals.len() != self.size {
            return Err(PlonkError::Polynomial(format!(
                "expected {} evaluations, got {}",
                self.size,
                evals.len()
            )));
        }

        let mut values = evals.to_vec();
        fft_in_place(&mut values, self.omega_inv, self.log_size);
        for value in values.iter_mut() {
            *value *= self.size_inv;
        }
        Ok(values)
    }

    /// `z^n - 1`
    pub fn evaluate_vanishing(&self, z: &Scalar) -> Scalar {
        z.pow_vartime(&[self.size as u64, 0, 0, 0]) - Scalar::ONE
    }

    /// `L_i(z) = omega^i (z^n - 1) / (n (z - omega^i))`
    pub fn evaluate_lagrange(&self, i: usize, z: &Scalar) -> Result<Scalar> {
        let omega_i = self.element(i);
        let denominator = invert(&(Scalar::from(self.size as u64) * (*z - omega_i)))?;
        Ok(omega_i * self.evaluate_vanishing(z) * denominator)
    }
}

fn invert(value: &Scalar) -> Result<Scalar> {
    let inverse: Option<Scalar> = value.invert().into();
    inverse.ok_or_else(|| PlonkError::Polynomial("inversion of zero".to_string()))
}

fn bit_reverse(mut value: usize, bits: u32) -> usize {
    let mut result = 0;
    for _ in 0..bits {
        result = (result << 1) | (value & 1);
        value >>= 1;
    }
    result
}

/// Iterative radix-2 Cooley-Tukey transform
fn fft_in_place(values: &mut [Scalar], omega: Scalar, log_n: u32) {
    let n = values.len();
    for i in 0..n {
        let j = bit_reverse(i, log_n);
        if i < j {
            values.swap(i, j);
        }
    }

    let mut m = 1;
    for _ in 0..log_n {
        let w_m = omega.pow_vartime(&[(n / (2 * m)) as u64, 0, 0, 0]);
        for k in (0..n).step_by(2 * m) {
            let mut w = Scalar::ONE;
            for j in 0..m {
                let t = w * values[k + j + m];
                let u = values[k + j];
                values[k + j] = u + t;
                values[k + j + m] = u - t;
                w *= w_m;
            }
        }
        m *= 2;
    }
}

/// Dense univariate polynomial in coefficient form
#[derive(Debug, Clone, PartialEq)]
pub struct DensePolynomial {
    coeffs: Vec<Scalar>,
}

impl DensePolynomial {
    pub fn from_coefficients(coeffs: Vec<Scalar>) -> Self {
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// Constant polynomial
    pub fn constant(value: Scalar) -> Self {
        Self {
            coeffs: vec![value],
        }
    }

    /// Interpolate from evaluations over `domain`
    pub fn from_evaluations(domain: &Domain, evals: &[Scalar]) -> Result<Self> {
        Ok(Self::from_coefficients(domain.ifft(evals)?))
    }

    pub fn coeffs(&self) -> &[Scalar] {
        &self.coeffs
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Whether every coefficient is zero
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == Scalar::ZERO)
    }

    /// Drop trailing zero coefficients
    pub fn trim(mut self) -> Self {
        while self.coeffs.last() == Some(&Scalar::ZERO) {
            self.coeffs.pop();
        }
        self
    }

    /// Evaluates the polynomial with Horner's rule
    pub fn evaluate(&self, point: &Scalar) -> Scalar {
        self.coeffs
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, coeff| acc * point + coeff)
    }

    pub fn add(&self, other: &DensePolynomial) -> DensePolynomial {
        let mut coeffs = vec![Scalar::ZERO; self.len().max(other.len())];
        for (i, coeff) in self.coeffs.iter().enumerate() {
            coeffs[i] += coeff;
        }
        for (i, coeff) in other.coeffs.iter().enumerate() {
            coeffs[i] += coeff;
        }
        DensePolynomial { coeffs }
    }

    pub fn sub(&self, other: &DensePolynomial) -> DensePolynomial {
        let mut coeffs = vec![Scalar::ZERO; self.len().max(other.len())];
        for (i, coeff) in self.coeffs.iter().enumerate() {
            coeffs[i] += coeff;
        }
        for (i, coeff) in other.coeffs.iter().enumerate() {
            coeffs[i] -= coeff;
        }
        DensePolynomial { coeffs }
    }

    /// Multiply every coefficient by `factor`
    pub fn scale(&self, factor: &Scalar) -> DensePolynomial {
        DensePolynomial {
            coeffs: self.coeffs.iter().map(|c| *c * factor).collect(),
        }
    }

    /// `p(factor * X)`
    pub fn scale_argument(&self, factor: &Scalar) -> DensePolynomial {
        let mut power = Scalar::ONE;
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| {
                let scaled = *c * power;
                power *= factor;
                scaled
            })
            .collect();
        DensePolynomial { coeffs }
    }

    /// Product via FFT over a large enough domain
    pub fn mul(&self, other: &DensePolynomial) -> Result<DensePolynomial> {
        if self.is_empty() || other.is_empty() {
            return Ok(DensePolynomial::zero());
        }

        let result_len = self.len() + other.len() - 1;
        let domain = Domain::new(result_len.next_power_of_two())?;
        let lhs = domain.fft(&self.coeffs)?;
        let rhs = domain.fft(&other.coeffs)?;
        let product: Vec<Scalar> = lhs.iter().zip(rhs.iter()).map(|(a, b)| *a * b).collect();

        let mut coeffs = domain.ifft(&product)?;
        coeffs.truncate(result_len);
        Ok(DensePolynomial { coeffs })
    }

    /// Exact division by `X^n - 1`; fails if the remainder is non-zero
    pub fn divide_by_vanishing(&self, n: usize) -> Result<DensePolynomial> {
        let mut remainder = self.coeffs.clone();
        if remainder.len() <= n {
            if remainder.iter().all(|c| *c == Scalar::ZERO) {
                return Ok(DensePolynomial::zero());
            }
            return Err(PlonkError::Polynomial(
                "polynomial does not vanish on the domain".to_string(),
            ));
        }

        let mut quotient = vec![Scalar::ZERO; remainder.len() - n];
        for i in (n..remainder.len()).rev() {
            let coeff = remainder[i];
            quotient[i - n] = coeff;
            remainder[i - n] += coeff;
            remainder[i] = Scalar::ZERO;
        }

        if remainder[..n].iter().any(|c| *c != Scalar::ZERO) {
            return Err(PlonkError::Polynomial(
                "polynomial does not vanish on the domain".to_string(),
            ));
        }
        Ok(DensePolynomial { coeffs: quotient })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(values: &[u64]) -> DensePolynomial {
        DensePolynomial::from_coefficients(values.iter().map(|v| Scalar::from(*v)).collect())
    }

    #[test]
    fn test_domain_creation() {
        let domain = Domain::new(8).unwrap();
        assert_eq!(domain.size(), 8);
        assert_eq!(domain.log_size(), 3);
        assert_eq!(domain.element(8), Scalar::ONE);
        assert_ne!(domain.element(4), Scalar::ONE);
        assert!(Domain::new(7).is_err());
        assert!(Domain::new(0).is_err());
    }

    #[test]
    fn test_fft_roundtrip() {
        let domain = Domain::new(8).unwrap();
        let coeffs = poly(&[1, 2, 3, 4]);
        let evals = domain.fft(coeffs.coeffs()).unwrap();

        for (i, eval) in evals.iter().enumerate() {
            assert_eq!(*eval, coeffs.evaluate(&domain.element(i)));
        }

        let recovered = domain.ifft(&evals).unwrap();
        assert_eq!(&recovered[..4], coeffs.coeffs());
        assert!(recovered[4..].iter().all(|c| *c == Scalar::ZERO));
    }

    #[test]
    fn test_polynomial_multiplication() {
        // (2x + 1)(4x + 3) = 8x^2 + 10x + 3
        let product = poly(&[1, 2]).mul(&poly(&[3, 4])).unwrap();
        assert_eq!(product, poly(&[3, 10, 8]));
    }

    #[test]
    fn test_polynomial_addition_subtraction() {
        let a = poly(&[1, 2, 3]);
        let b = poly(&[4, 5]);
        assert_eq!(a.add(&b), poly(&[5, 7, 3]));
        assert_eq!(
            a.sub(&b).coeffs(),
            &[-Scalar::from(3u64), -Scalar::from(3u64), Scalar::from(3u64)]
        );
    }

    #[test]
    fn test_scale_argument() {
        let p = poly(&[1, 2, 3]);
        let x = Scalar::from(5u64);
        let c = Scalar::from(7u64);
        assert_eq!(p.scale_argument(&c).evaluate(&x), p.evaluate(&(c * x)));
    }

    #[test]
    fn test_divide_by_vanishing() {
        // (X^4 - 1)(X + 2)
        let vanishing = poly(&[0, 0, 0, 0, 1]).sub(&poly(&[1]));
        let dividend = vanishing.mul(&poly(&[2, 1])).unwrap();
        assert_eq!(dividend.divide_by_vanishing(4).unwrap(), poly(&[2, 1]));

        let not_divisible = dividend.add(&poly(&[1]));
        assert!(not_divisible.divide_by_vanishing(4).is_err());
    }

    #[test]
    fn test_lagrange_evaluation() {
        let domain = Domain::new(4).unwrap();
        let z = Scalar::from(11u64);
        let mut evals = vec![Scalar::ZERO; 4];
        evals[2] = Scalar::ONE;
        let l2 = DensePolynomial::from_evaluations(&domain, &evals).unwrap();
        assert_eq!(domain.evaluate_lagrange(2, &z).unwrap(), l2.evaluate(&z));
    }
}
