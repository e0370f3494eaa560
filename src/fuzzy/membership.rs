//! Membership functions
//!
//! Closed set of shapes mapping a crisp value to a degree in [0, 1].

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// A membership function shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MembershipFunction {
    /// Rises a->b, flat at 1 on [b, c], falls c->d
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
    /// Logistic curve; negative slope falls instead of rising
    Sigmoid { center: f64, slope: f64 },
    /// Bell curve around `mean`
    Gaussian { mean: f64, sigma: f64 },
}

impl MembershipFunction {
    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let mf = MembershipFunction::Trapezoid { a, b, c, d };
        mf.validate()?;
        Ok(mf)
    }

    /// Triangle peaking at `peak` (trapezoid with b == c)
    pub fn triangle(left: f64, peak: f64, right: f64) -> Result<Self> {
        Self::trapezoid(left, peak, peak, right)
    }

    pub fn sigmoid(center: f64, slope: f64) -> Result<Self> {
        let mf = MembershipFunction::Sigmoid { center, slope };
        mf.validate()?;
        Ok(mf)
    }

    pub fn gaussian(mean: f64, sigma: f64) -> Result<Self> {
        let mf = MembershipFunction::Gaussian { mean, sigma };
        mf.validate()?;
        Ok(mf)
    }

    /// Check shape parameters.
    ///
    /// Values built through the constructors are already valid; this exists
    /// for functions that arrive through deserialization.
    pub fn validate(&self) -> Result<()> {
        match *self {
            MembershipFunction::Trapezoid { a, b, c, d } => {
                if ![a, b, c, d].iter().all(|v| v.is_finite()) {
                    return Err(EngineError::InvalidShape(format!(
                        "trapezoid parameters must be finite: [{a}, {b}, {c}, {d}]"
                    )));
                }
                if a > b || b > c || c > d {
                    return Err(EngineError::InvalidShape(format!(
                        "trapezoid requires a <= b <= c <= d, got [{a}, {b}, {c}, {d}]"
                    )));
                }
            }
            MembershipFunction::Sigmoid { center, slope } => {
                if !center.is_finite() || !slope.is_finite() {
                    return Err(EngineError::InvalidShape(format!(
                        "sigmoid parameters must be finite: center={center}, slope={slope}"
                    )));
                }
            }
            MembershipFunction::Gaussian { mean, sigma } => {
                if !mean.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
                    return Err(EngineError::InvalidShape(format!(
                        "gaussian requires finite mean and sigma > 0: mean={mean}, sigma={sigma}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Degree of membership of `x`, always in [0, 1]. NaN maps to 0.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.0;
        }
        let degree = match *self {
            MembershipFunction::Trapezoid { a, b, c, d } => {
                if x >= b && x <= c {
                    1.0
                } else if x <= a || x >= d {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            }
            MembershipFunction::Sigmoid { center, slope } => {
                1.0 / (1.0 + (-slope * (x - center)).exp())
            }
            MembershipFunction::Gaussian { mean, sigma } => {
                (-((x - mean).powi(2)) / (2.0 * sigma * sigma)).exp()
            }
        };
        // 0 * inf in the sigmoid exponent can still yield NaN
        if degree.is_nan() { 0.0 } else { degree.clamp(0.0, 1.0) }
    }

    /// Interval where membership is exactly 1, if the shape has one
    pub fn core(&self) -> Option<(f64, f64)> {
        match *self {
            MembershipFunction::Trapezoid { b, c, .. } => Some((b, c)),
            MembershipFunction::Gaussian { mean, .. } => Some((mean, mean)),
            MembershipFunction::Sigmoid { .. } => None,
        }
    }
}
