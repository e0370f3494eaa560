//! Centroid defuzzification

use super::error::{EngineError, Result};

/// An output variable's combined fuzzy region, sampled over its universe
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedOutput {
    pub variable: String,
    pub universe: Vec<f64>,
    pub degrees: Vec<f64>,
}

impl AggregatedOutput {
    /// Zero-filled region (max with 0 is the identity)
    pub fn empty(variable: impl Into<String>, universe: Vec<f64>) -> Self {
        let degrees = vec![0.0; universe.len()];
        Self {
            variable: variable.into(),
            universe,
            degrees,
        }
    }

    /// Fold in one consequent curve clipped at `strength`
    pub fn absorb_clipped(&mut self, curve: &[f64], strength: f64) {
        if strength <= 0.0 {
            return;
        }
        for (acc, &mu) in self.degrees.iter_mut().zip(curve) {
            *acc = acc.max(mu.min(strength));
        }
    }

    pub fn area(&self) -> f64 {
        self.degrees.iter().sum()
    }

    pub fn peak(&self) -> f64 {
        self.degrees.iter().copied().fold(0.0, f64::max)
    }

    pub fn defuzzify(&self) -> Result<f64> {
        defuzzify(&self.variable, &self.degrees, &self.universe)
    }
}

/// Centroid of area: `sum(x * mu) / sum(mu)`.
///
/// A region with zero area has no centroid and fails with `EmptyAggregate`.
pub fn defuzzify(variable: &str, degrees: &[f64], universe: &[f64]) -> Result<f64> {
    let (weighted, area) = universe
        .iter()
        .zip(degrees)
        .fold((0.0, 0.0), |(w, a), (&x, &mu)| (w + x * mu, a + mu));
    if area <= 0.0 {
        return Err(EngineError::EmptyAggregate(variable.to_string()));
    }
    Ok(weighted / area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_region_centroid() {
        let universe = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let degrees = [0.2, 0.6, 1.0, 0.6, 0.2];
        assert!(defuzzify("steer", &degrees, &universe).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_single_spike() {
        let universe = [0.0, 1.0, 2.0, 3.0];
        let degrees = [0.0, 0.0, 0.4, 0.0];
        assert_eq!(defuzzify("gas", &degrees, &universe).unwrap(), 2.0);
    }

    #[test]
    fn test_zero_area_is_error() {
        let universe = [0.0, 1.0, 2.0];
        assert_eq!(
            defuzzify("brake", &[0.0, 0.0, 0.0], &universe),
            Err(EngineError::EmptyAggregate("brake".into()))
        );
    }

    #[test]
    fn test_absorb_clipped_uses_max() {
        let mut region = AggregatedOutput::empty("gas", vec![0.0, 1.0, 2.0]);
        let curve = [1.0, 0.5, 0.0];
        region.absorb_clipped(&curve, 0.3);
        region.absorb_clipped(&curve, 0.7);
        assert_eq!(region.degrees, vec![0.7, 0.5, 0.0]);
        region.absorb_clipped(&curve, 0.0);
        assert_eq!(region.degrees, vec![0.7, 0.5, 0.0]);
        assert_eq!(region.peak(), 0.7);
    }
}
