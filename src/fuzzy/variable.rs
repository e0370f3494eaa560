//! Linguistic variables
//!
//! A bounded universe of discourse partitioned into labeled terms.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};
use super::membership::MembershipFunction;

/// Whether a variable is read from sensors or produced by inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Antecedent,
    Consequent,
}

/// Closed interval [min, max] with min < max
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// `resolution` evenly spaced points, both ends included
    pub fn linspace(&self, resolution: usize) -> Vec<f64> {
        let n = resolution.max(2);
        let steps = (n - 1) as f64;
        (0..n)
            .map(|i| {
                // exact endpoint regardless of rounding
                if i + 1 == n {
                    self.max
                } else {
                    self.min + self.width() * i as f64 / steps
                }
            })
            .collect()
    }
}

/// A labeled fuzzy set within a variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub label: String,
    pub function: MembershipFunction,
}

/// A named domain with ordered, uniquely labeled terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticVariable {
    pub name: String,
    pub domain: Domain,
    pub role: Role,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, min: f64, max: f64, role: Role) -> Result<Self> {
        let name = name.into();
        // NaN fails the comparison too
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(EngineError::InvalidDomain { variable: name, min, max });
        }
        Ok(Self {
            name,
            domain: Domain { min, max },
            role,
            terms: Vec::new(),
        })
    }

    pub fn antecedent(name: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        Self::new(name, min, max, Role::Antecedent)
    }

    pub fn consequent(name: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        Self::new(name, min, max, Role::Consequent)
    }

    /// Register a term. Labels must be unique within the variable.
    pub fn add_term(&mut self, label: impl Into<String>, function: MembershipFunction) -> Result<()> {
        let label = label.into();
        if self.term(&label).is_some() {
            return Err(EngineError::DuplicateLabel {
                variable: self.name.clone(),
                label,
            });
        }
        function.validate()?;
        self.terms.push(Term { label, function });
        Ok(())
    }

    /// Builder form of [`add_term`](Self::add_term)
    pub fn with_term(mut self, label: impl Into<String>, function: MembershipFunction) -> Result<Self> {
        self.add_term(label, function)?;
        Ok(self)
    }

    pub fn term(&self, label: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.label == label)
    }

    pub fn has_term(&self, label: &str) -> bool {
        self.term(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.label.as_str())
    }

    /// Degree of `x` in term `label`. `x` is clamped into the domain first.
    pub fn membership_of(&self, label: &str, x: f64) -> Result<f64> {
        let term = self.term(label).ok_or_else(|| self.unknown(label))?;
        Ok(term.function.evaluate(self.domain.clamp(x)))
    }

    /// Degrees of `x` in every term, in declaration order
    pub fn fuzzify(&self, x: f64) -> Vec<(&str, f64)> {
        let x = self.domain.clamp(x);
        self.terms
            .iter()
            .map(|t| (t.label.as_str(), t.function.evaluate(x)))
            .collect()
    }

    pub fn universe(&self, resolution: usize) -> Vec<f64> {
        self.domain.linspace(resolution)
    }

    /// Term curve as `(x, degree)` pairs over the domain
    pub fn sample(&self, label: &str, resolution: usize) -> Result<Vec<(f64, f64)>> {
        if resolution < 2 {
            return Err(EngineError::InvalidResolution(resolution));
        }
        let term = self.term(label).ok_or_else(|| self.unknown(label))?;
        Ok(self
            .universe(resolution)
            .into_iter()
            .map(|x| (x, term.function.evaluate(x)))
            .collect())
    }

    /// Re-check invariants that deserialization cannot enforce
    pub(crate) fn validate(&self) -> Result<()> {
        let Domain { min, max } = self.domain;
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(EngineError::InvalidDomain {
                variable: self.name.clone(),
                min,
                max,
            });
        }
        for (i, term) in self.terms.iter().enumerate() {
            if self.terms[..i].iter().any(|t| t.label == term.label) {
                return Err(EngineError::DuplicateLabel {
                    variable: self.name.clone(),
                    label: term.label.clone(),
                });
            }
            term.function.validate()?;
        }
        Ok(())
    }

    fn unknown(&self, label: &str) -> EngineError {
        EngineError::UnknownLabel {
            variable: self.name.clone(),
            label: label.to_string(),
        }
    }
}
