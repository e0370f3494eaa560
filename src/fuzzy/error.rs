//! Engine error taxonomy
//!
//! Configuration errors stop a control system from being built. `MissingInput`
//! is a caller contract violation for one tick. `EmptyAggregate` is reported
//! per output and the tick carries on for the remaining outputs.

use thiserror::Error;

/// Errors raised while configuring or running a fuzzy control system
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid membership shape: {0}")]
    InvalidShape(String),

    #[error("duplicate term label '{label}' in variable '{variable}'")]
    DuplicateLabel { variable: String, label: String },

    #[error("duplicate variable '{0}'")]
    DuplicateVariable(String),

    #[error("invalid domain for '{variable}': [{min}, {max}]")]
    InvalidDomain { variable: String, min: f64, max: f64 },

    #[error("rule {rule} references unresolved term {variable}[{label}]")]
    UnresolvedTermReference {
        rule: usize,
        variable: String,
        label: String,
    },

    #[error("rule {rule} has consequent weight {weight} outside (0, 1]")]
    InvalidWeight { rule: usize, weight: f64 },

    #[error("rule {0} has no consequents")]
    EmptyRule(usize),

    #[error("sampling resolution must be at least 2, got {0}")]
    InvalidResolution(usize),

    #[error("unknown label '{label}' in variable '{variable}'")]
    UnknownLabel { variable: String, label: String },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("no input value set for '{0}'")]
    MissingInput(String),

    #[error("aggregated output '{0}' has zero area")]
    EmptyAggregate(String),
}

impl EngineError {
    /// True for errors that can only come out of `configure`
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidShape(_)
                | EngineError::DuplicateLabel { .. }
                | EngineError::DuplicateVariable(_)
                | EngineError::InvalidDomain { .. }
                | EngineError::UnresolvedTermReference { .. }
                | EngineError::InvalidWeight { .. }
                | EngineError::EmptyRule(_)
                | EngineError::InvalidResolution(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
