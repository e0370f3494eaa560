//! Control systems declared as data
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "resolution": 101,
//!   "variables": [
//!     { "name": "head", "role": "antecedent", "domain": { "min": 0, "max": 200 },
//!       "terms": [ { "label": "CLOSE",
//!                    "function": { "shape": "trapezoid", "a": 0, "b": 0, "c": 25, "d": 125 } } ] }
//!   ],
//!   "rules": [
//!     { "antecedent": { "leaf": { "variable": "head", "label": "CLOSE" } },
//!       "consequents": [ { "term": { "variable": "brake", "label": "HARD" } } ] }
//!   ]
//! }
//! ```
//!
//! Deserialization accepts anything well-formed; `build` runs the same
//! validation as [`ControlSystem::configure`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::rule::Rule;
use super::system::{ControlSystem, DEFAULT_RESOLUTION, InferenceOptions};
use super::variable::LinguisticVariable;

fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSystemConfig {
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    pub variables: Vec<LinguisticVariable>,
    pub rules: Vec<Rule>,
}

impl ControlSystemConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded control system from {} ({} variables, {} rules)",
            path.display(),
            config.variables.len(),
            config.rules.len()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Validate and turn into an immutable control system
    pub fn build(self) -> Result<ControlSystem> {
        ControlSystem::configure_with(
            self.variables,
            self.rules,
            InferenceOptions {
                resolution: self.resolution,
            },
        )
    }
}

impl From<&ControlSystem> for ControlSystemConfig {
    fn from(system: &ControlSystem) -> Self {
        Self {
            resolution: system.resolution(),
            variables: system.variables().to_vec(),
            rules: system.rules().to_vec(),
        }
    }
}
