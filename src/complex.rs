//! Complex arithmetic with undefined results reported as errors instead of NaN.
//!
//! `log` and `pow` use the principal branch.

use num_complex::Complex64;

use crate::error::DomainError;

/// Integral real exponents up to this magnitude are computed by repeated multiplication.
const INTEGRAL_POW_LIMIT: f64 = 100.;

pub(crate) const ZERO: Complex64 = Complex64::new(0., 0.);
pub(crate) const ONE: Complex64 = Complex64::new(1., 0.);

fn is_zero(z: Complex64) -> bool {
    z.re == 0. && z.im == 0.
}

pub fn div(x: Complex64, y: Complex64) -> Result<Complex64, DomainError> {
    if is_zero(y) {
        return Err(DomainError::DivisionByZero);
    }
    Ok(x / y)
}

pub fn log(x: Complex64) -> Result<Complex64, DomainError> {
    if is_zero(x) {
        return Err(DomainError::LogOfZero);
    }
    Ok(x.ln())
}

pub fn pow(x: Complex64, y: Complex64) -> Result<Complex64, DomainError> {
    if is_zero(y) {
        return Ok(ONE);
    }
    if is_zero(x) {
        return if y.im != 0. || y.re < 0. {
            Err(DomainError::ZeroToNegativePower)
        } else {
            Ok(ZERO)
        };
    }
    if y.im == 0. && y.re == y.re.floor() && y.re.abs() <= INTEGRAL_POW_LIMIT {
        return Ok(x.powi(y.re as i32));
    }
    Ok((y * x.ln()).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.)
    }

    #[test]
    fn integral_powers_are_exact() {
        assert_eq!(pow(c(-1.), c(9.)), Ok(c(-1.)));
        assert_eq!(pow(c(-1.), c(10.)), Ok(c(1.)));
        assert_eq!(pow(c(2.), c(-2.)), Ok(c(0.25)));
        assert_eq!(pow(c(3.), c(0.)), Ok(c(1.)));
    }

    #[test]
    fn zero_base() {
        assert_eq!(pow(ZERO, ZERO), Ok(ONE));
        assert_eq!(pow(ZERO, c(2.5)), Ok(ZERO));
        assert_eq!(pow(ZERO, c(-1.)), Err(DomainError::ZeroToNegativePower));
        let complex_power = Complex64::new(1., 1.);
        assert_eq!(pow(ZERO, complex_power), Err(DomainError::ZeroToNegativePower));
    }

    #[test]
    fn principal_branch() {
        use std::f64::consts::FRAC_1_SQRT_2;

        let i = Complex64::new(0., 1.);
        let sqrt_i = pow(i, c(0.5)).unwrap();
        let expected = Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);
        assert!((sqrt_i - expected).norm() < 1e-15);

        let log_minus_one = log(c(-1.)).unwrap();
        assert!((log_minus_one - Complex64::new(0., std::f64::consts::PI)).norm() < 1e-15);
    }

    #[test]
    fn undefined_results() {
        assert_eq!(div(ONE, ZERO), Err(DomainError::DivisionByZero));
        assert_eq!(div(ONE, Complex64::new(-0., 0.)), Err(DomainError::DivisionByZero));
        assert_eq!(log(ZERO), Err(DomainError::LogOfZero));
        assert_eq!(div(c(1.), c(4.)), Ok(c(0.25)));
    }
}
