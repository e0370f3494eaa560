//! Fuzzy inference engine
//!
//! Mamdani-style pipeline, run once per simulation tick:
//! - fuzzify crisp inputs through linguistic variables
//! - fire rules (AND = min, OR = max, NOT = 1 - x, weight scales strength)
//! - clip consequent curves at their rule strength, aggregate with max
//! - defuzzify each output by centroid of area
//!
//! Nothing here knows about vehicles or sensors.

pub mod config;
pub mod defuzz;
pub mod error;
pub mod membership;
pub mod presets;
pub mod rule;
pub mod system;
pub mod variable;

pub use config::ControlSystemConfig;
pub use defuzz::{AggregatedOutput, defuzzify};
pub use error::EngineError;
pub use membership::MembershipFunction;
pub use rule::{Consequent, Expr, Rule, TermRef};
pub use system::{
    ControlSystem, DEFAULT_RESOLUTION, InferenceOptions, RuleActivation, Session, TickReport,
};
pub use variable::{Domain, LinguisticVariable, Role, Term};
