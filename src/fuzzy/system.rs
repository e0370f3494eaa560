//! Control system and per-tick inference
//!
//! `ControlSystem` is the validated, immutable pairing of variables and
//! rules. `Session` holds the only mutable state: this tick's inputs and the
//! last derived outputs. One tick runs fuzzify -> fire rules -> clip ->
//! aggregate (max) -> centroid, with no suspension points.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use super::defuzz::AggregatedOutput;
use super::error::{EngineError, Result};
use super::rule::{Expr, Rule, TermRef};
use super::variable::{LinguisticVariable, Role};

/// Default number of sample points per output universe
pub const DEFAULT_RESOLUTION: usize = 201;

/// Inference tuning that is not part of any variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceOptions {
    /// Evenly spaced samples used to materialize consequent curves
    pub resolution: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// Per-tick mutable state owned by a single controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    current_inputs: BTreeMap<String, f64>,
    derived_outputs: BTreeMap<String, Option<f64>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, variable: impl Into<String>, value: f64) {
        self.current_inputs.insert(variable.into(), value);
    }

    pub fn input(&self, variable: &str) -> Option<f64> {
        self.current_inputs.get(variable).copied()
    }

    pub fn inputs(&self) -> &BTreeMap<String, f64> {
        &self.current_inputs
    }

    pub fn clear_inputs(&mut self) {
        self.current_inputs.clear();
    }

    /// Last computed value, `None` if unset or degenerate on the last tick
    pub fn output(&self, variable: &str) -> Option<f64> {
        self.derived_outputs.get(variable).copied().flatten()
    }

    pub fn outputs(&self) -> &BTreeMap<String, Option<f64>> {
        &self.derived_outputs
    }
}

/// Firing strength of one rule during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleActivation {
    /// Index into the system's rule list
    pub rule: usize,
    pub strength: f64,
}

/// Everything one tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Crisp values of outputs that had a non-empty aggregate
    pub outputs: BTreeMap<String, f64>,
    /// Outputs skipped this tick, each with its `EmptyAggregate` error
    pub degenerate: BTreeMap<String, EngineError>,
    /// Rule strengths in rule order
    pub activations: Vec<RuleActivation>,
}

impl TickReport {
    pub fn get(&self, output: &str) -> Option<f64> {
        self.outputs.get(output).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.degenerate.is_empty()
    }
}

/// A consequent variable with its term curves sampled once at configure time
#[derive(Debug, Clone)]
struct SampledOutput {
    variable: usize,
    universe: Vec<f64>,
    curves: Vec<Vec<f64>>,
}

/// A rule consequent resolved to indices
#[derive(Debug, Clone, Copy)]
struct Target {
    output: usize,
    term: usize,
    weight: f64,
}

/// Immutable fuzzy control system
#[derive(Debug, Clone)]
pub struct ControlSystem {
    variables: Vec<LinguisticVariable>,
    index: HashMap<String, usize>,
    rules: Vec<Rule>,
    targets: Vec<Vec<Target>>,
    outputs: Vec<SampledOutput>,
    required_inputs: Vec<String>,
    resolution: usize,
}

impl ControlSystem {
    /// Validate and build with default options
    pub fn configure(variables: Vec<LinguisticVariable>, rules: Vec<Rule>) -> Result<Self> {
        Self::configure_with(variables, rules, InferenceOptions::default())
    }

    pub fn configure_with(
        variables: Vec<LinguisticVariable>,
        rules: Vec<Rule>,
        options: InferenceOptions,
    ) -> Result<Self> {
        if options.resolution < 2 {
            return Err(EngineError::InvalidResolution(options.resolution));
        }

        let mut index = HashMap::with_capacity(variables.len());
        for (i, variable) in variables.iter().enumerate() {
            variable.validate()?;
            if index.insert(variable.name.clone(), i).is_some() {
                return Err(EngineError::DuplicateVariable(variable.name.clone()));
            }
        }

        let outputs: Vec<SampledOutput> = variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.role == Role::Consequent)
            .map(|(i, v)| {
                let universe = v.universe(options.resolution);
                let curves = v
                    .terms
                    .iter()
                    .map(|t| universe.iter().map(|&x| t.function.evaluate(x)).collect())
                    .collect();
                SampledOutput {
                    variable: i,
                    universe,
                    curves,
                }
            })
            .collect();

        let resolve = |rule: usize, term: &TermRef, role: Role| -> Result<(usize, usize)> {
            let unresolved = || EngineError::UnresolvedTermReference {
                rule,
                variable: term.variable.clone(),
                label: term.label.clone(),
            };
            let var_idx = *index.get(&term.variable).ok_or_else(unresolved)?;
            let variable = &variables[var_idx];
            if variable.role != role {
                return Err(unresolved());
            }
            let term_idx = variable
                .terms
                .iter()
                .position(|t| t.label == term.label)
                .ok_or_else(unresolved)?;
            Ok((var_idx, term_idx))
        };

        let mut referenced = vec![false; variables.len()];
        let mut targets = Vec::with_capacity(rules.len());
        for (r, rule) in rules.iter().enumerate() {
            for term in rule.antecedent.terms() {
                let (var_idx, _) = resolve(r, term, Role::Antecedent)?;
                referenced[var_idx] = true;
            }
            if rule.consequents.is_empty() {
                return Err(EngineError::EmptyRule(r));
            }
            let mut rule_targets = Vec::with_capacity(rule.consequents.len());
            for consequent in &rule.consequents {
                let weight = consequent.weight;
                // also rejects NaN
                if !(weight > 0.0 && weight <= 1.0) {
                    return Err(EngineError::InvalidWeight { rule: r, weight });
                }
                let (var_idx, term) = resolve(r, &consequent.term, Role::Consequent)?;
                let output = outputs
                    .iter()
                    .position(|o| o.variable == var_idx)
                    .ok_or_else(|| EngineError::UnknownVariable(consequent.term.variable.clone()))?;
                rule_targets.push(Target { output, term, weight });
            }
            targets.push(rule_targets);
        }

        let required_inputs = variables
            .iter()
            .zip(&referenced)
            .filter(|(_, used)| **used)
            .map(|(v, _)| v.name.clone())
            .collect();

        log::info!(
            "Configured control system: {} variables, {} rules, resolution {}",
            variables.len(),
            rules.len(),
            options.resolution
        );

        Ok(Self {
            variables,
            index,
            rules,
            targets,
            outputs,
            required_inputs,
            resolution: options.resolution,
        })
    }

    pub fn variables(&self) -> &[LinguisticVariable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&LinguisticVariable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Consequent variable names in declaration order
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs
            .iter()
            .map(|o| self.variables[o.variable].name.as_str())
    }

    /// Antecedent variables some rule reads; each must be set every tick
    pub fn required_inputs(&self) -> &[String] {
        &self.required_inputs
    }

    /// Fresh session with every output unset
    pub fn session(&self) -> Session {
        Session {
            current_inputs: BTreeMap::new(),
            derived_outputs: self.output_names().map(|n| (n.to_string(), None)).collect(),
        }
    }

    /// Degree to which `expr` holds for the session's current inputs
    pub fn fire_strength(&self, expr: &Expr, session: &Session) -> Result<f64> {
        match expr {
            Expr::Leaf(term) => {
                let variable = self
                    .variable(&term.variable)
                    .ok_or_else(|| EngineError::UnknownVariable(term.variable.clone()))?;
                let x = session
                    .input(&term.variable)
                    .ok_or_else(|| EngineError::MissingInput(term.variable.clone()))?;
                variable.membership_of(&term.label, x)
            }
            Expr::And(l, r) => Ok(self.fire_strength(l, session)?.min(self.fire_strength(r, session)?)),
            Expr::Or(l, r) => Ok(self.fire_strength(l, session)?.max(self.fire_strength(r, session)?)),
            Expr::Not(e) => Ok(1.0 - self.fire_strength(e, session)?),
        }
    }

    /// Aggregated fuzzy region of one output for the session's inputs
    pub fn aggregate(&self, output: &str, session: &Session) -> Result<AggregatedOutput> {
        let o = self
            .outputs
            .iter()
            .position(|o| self.variables[o.variable].name == output)
            .ok_or_else(|| EngineError::UnknownVariable(output.to_string()))?;
        self.check_inputs(session)?;
        let activations = self.activations(session)?;
        Ok(self.aggregate_output(o, &activations))
    }

    /// Overwrite the session's inputs with `inputs` and compute every output
    pub fn run_tick<K, I>(&self, session: &mut Session, inputs: I) -> Result<TickReport>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        session.clear_inputs();
        for (name, value) in inputs {
            session.set_input(name, value);
        }
        self.compute(session)
    }

    /// Compute every output from the inputs already in the session.
    ///
    /// Outputs with an empty aggregate are left unset in the session and
    /// listed in `TickReport::degenerate`; the rest of the tick proceeds.
    pub fn compute(&self, session: &mut Session) -> Result<TickReport> {
        self.check_inputs(session)?;
        let activations = self.activations(session)?;

        let mut report = TickReport::default();
        for o in 0..self.outputs.len() {
            let region = self.aggregate_output(o, &activations);
            let name = region.variable.clone();
            match region.defuzzify() {
                Ok(value) => {
                    session.derived_outputs.insert(name.clone(), Some(value));
                    report.outputs.insert(name, value);
                }
                Err(err) => {
                    log::warn!("Output '{}' skipped this tick: {}", name, err);
                    session.derived_outputs.insert(name.clone(), None);
                    report.degenerate.insert(name, err);
                }
            }
        }
        log::debug!("Tick outputs: {:?}", report.outputs);

        report.activations = activations;
        Ok(report)
    }

    /// Text dump of inputs, term degrees, rule strengths and outputs.
    ///
    /// Works on any session, including one whose last tick failed; rules
    /// that cannot be evaluated are shown as `n/a`.
    pub fn describe(&self, session: &Session) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Inputs");
        for name in &self.required_inputs {
            let Some(variable) = self.variable(name) else { continue };
            match session.input(name) {
                Some(x) => {
                    let degrees: Vec<String> = variable
                        .fuzzify(x)
                        .into_iter()
                        .map(|(label, mu)| format!("{label}={mu:.3}"))
                        .collect();
                    let _ = writeln!(out, "  {name} = {x:.3}: {}", degrees.join(" "));
                }
                None => {
                    let _ = writeln!(out, "  {name} = <unset>");
                }
            }
        }

        let _ = writeln!(out, "Rules");
        for (i, rule) in self.rules.iter().enumerate() {
            match self.fire_strength(&rule.antecedent, session) {
                Ok(strength) => {
                    let _ = writeln!(out, "  [{i:>2}] {strength:.3}  {rule}");
                }
                Err(_) => {
                    let _ = writeln!(out, "  [{i:>2}]   n/a  {rule}");
                }
            }
        }

        let _ = writeln!(out, "Outputs");
        for name in self.output_names() {
            match session.output(name) {
                Some(v) => {
                    let _ = writeln!(out, "  {name} = {v:.4}");
                }
                None => {
                    let _ = writeln!(out, "  {name} = <unset>");
                }
            }
        }
        out
    }

    fn check_inputs(&self, session: &Session) -> Result<()> {
        match self
            .required_inputs
            .iter()
            .find(|name| session.input(name).is_none())
        {
            Some(missing) => Err(EngineError::MissingInput(missing.clone())),
            None => Ok(()),
        }
    }

    fn activations(&self, session: &Session) -> Result<Vec<RuleActivation>> {
        self.rules
            .iter()
            .enumerate()
            .map(|(rule, r)| {
                Ok(RuleActivation {
                    rule,
                    strength: self.fire_strength(&r.antecedent, session)?,
                })
            })
            .collect()
    }

    fn aggregate_output(&self, o: usize, activations: &[RuleActivation]) -> AggregatedOutput {
        let sampled = &self.outputs[o];
        let mut region = AggregatedOutput::empty(
            self.variables[sampled.variable].name.clone(),
            sampled.universe.clone(),
        );
        for activation in activations {
            for target in self.targets[activation.rule].iter().filter(|t| t.output == o) {
                // weight scales the strength, it does not cap it
                region.absorb_clipped(&sampled.curves[target.term], activation.strength * target.weight);
            }
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::membership::MembershipFunction;
    use proptest::prelude::*;

    fn trap(a: f64, b: f64, c: f64, d: f64) -> MembershipFunction {
        MembershipFunction::trapezoid(a, b, c, d).unwrap()
    }

    /// Two inputs on [0, 10] with LOW/HIGH shoulders, one output on [0, 10]
    fn small_system(rules: Vec<Rule>) -> Result<ControlSystem> {
        let a = LinguisticVariable::antecedent("a", 0.0, 10.0)?
            .with_term("LOW", trap(0.0, 0.0, 0.0, 10.0))?
            .with_term("HIGH", trap(0.0, 10.0, 10.0, 10.0))?;
        let b = LinguisticVariable::antecedent("b", 0.0, 10.0)?
            .with_term("LOW", trap(0.0, 0.0, 0.0, 10.0))?
            .with_term("HIGH", trap(0.0, 10.0, 10.0, 10.0))?;
        let out = LinguisticVariable::consequent("out", 0.0, 10.0)?
            .with_term("LEFT", trap(0.0, 0.0, 2.0, 5.0))?
            .with_term("RIGHT", trap(5.0, 8.0, 10.0, 10.0))?;
        ControlSystem::configure_with(vec![a, b, out], rules, InferenceOptions { resolution: 101 })
    }

    fn session_with(system: &ControlSystem, a: f64, b: f64) -> Session {
        let mut session = system.session();
        session.set_input("a", a);
        session.set_input("b", b);
        session
    }

    proptest! {
        #[test]
        fn operators_follow_min_max_complement(a in 0.0f64..=10.0, b in 0.0f64..=10.0) {
            let system = small_system(vec![Rule::new(TermRef::new("a", "LOW"), [TermRef::new("out", "LEFT")])]).unwrap();
            let session = session_with(&system, a, b);
            let l1 = Expr::leaf("a", "HIGH");
            let l2 = Expr::leaf("b", "LOW");
            let s1 = system.fire_strength(&l1, &session).unwrap();
            let s2 = system.fire_strength(&l2, &session).unwrap();

            prop_assert_eq!(system.fire_strength(&(l1.clone() & l2.clone()), &session).unwrap(), s1.min(s2));
            prop_assert_eq!(system.fire_strength(&(l1.clone() | l2.clone()), &session).unwrap(), s1.max(s2));
            prop_assert_eq!(system.fire_strength(&!l1, &session).unwrap(), 1.0 - s1);
        }
    }

    #[test]
    fn test_missing_input_is_not_zero() {
        let system = small_system(vec![Rule::new(TermRef::new("a", "LOW"), [TermRef::new("out", "LEFT")])]).unwrap();
        let mut session = system.session();
        assert_eq!(
            system.fire_strength(&Expr::leaf("a", "LOW"), &session),
            Err(EngineError::MissingInput("a".into()))
        );
        session.set_input("a", 0.0);
        assert_eq!(system.fire_strength(&Expr::leaf("a", "LOW"), &session), Ok(1.0));
    }

    #[test]
    fn test_run_tick_rejects_missing_input() {
        let system = small_system(vec![Rule::new(
            TermRef::new("a", "LOW") & TermRef::new("b", "HIGH"),
            [TermRef::new("out", "LEFT")],
        )])
        .unwrap();
        let mut session = system.session();
        let err = system.run_tick(&mut session, [("a", 1.0)]).unwrap_err();
        assert_eq!(err, EngineError::MissingInput("b".into()));
    }

    #[test]
    fn test_weight_scales_strength() {
        let full = small_system(vec![Rule::new(TermRef::new("a", "HIGH"), [TermRef::new("out", "RIGHT")])]).unwrap();
        let weighted = small_system(vec![Rule::new(
            TermRef::new("a", "HIGH"),
            [TermRef::new("out", "RIGHT").weighted(0.5)],
        )])
        .unwrap();

        // a = 8 fires HIGH at 0.8; scaled weight gives 0.4, a cap would give 0.5
        let region = weighted.aggregate("out", &session_with(&weighted, 8.0, 0.0)).unwrap();
        assert!((region.peak() - 0.4).abs() < 1e-12);
        let region = full.aggregate("out", &session_with(&full, 8.0, 0.0)).unwrap();
        assert!((region.peak() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_unresolved_references() {
        let unknown_label = small_system(vec![Rule::new(TermRef::new("a", "MID"), [TermRef::new("out", "LEFT")])]);
        assert!(matches!(
            unknown_label,
            Err(EngineError::UnresolvedTermReference { rule: 0, .. })
        ));

        let unknown_var = small_system(vec![
            Rule::new(TermRef::new("a", "LOW"), [TermRef::new("out", "LEFT")]),
            Rule::new(TermRef::new("a", "LOW"), [TermRef::new("steer", "LEFT")]),
        ]);
        assert!(matches!(
            unknown_var,
            Err(EngineError::UnresolvedTermReference { rule: 1, .. })
        ));

        // outputs cannot appear in an antecedent
        let wrong_role = small_system(vec![Rule::new(TermRef::new("out", "LEFT"), [TermRef::new("out", "RIGHT")])]);
        assert!(matches!(wrong_role, Err(EngineError::UnresolvedTermReference { .. })));
    }

    #[test]
    fn test_configuration_errors() {
        let bad_weight = small_system(vec![Rule::new(
            TermRef::new("a", "LOW"),
            [TermRef::new("out", "LEFT").weighted(0.0)],
        )]);
        assert!(matches!(bad_weight, Err(EngineError::InvalidWeight { .. })));

        let empty = small_system(vec![Rule::new(TermRef::new("a", "LOW"), Vec::<TermRef>::new())]);
        assert_eq!(empty.unwrap_err(), EngineError::EmptyRule(0));

        let dup = ControlSystem::configure(
            vec![
                LinguisticVariable::antecedent("a", 0.0, 1.0).unwrap(),
                LinguisticVariable::consequent("a", 0.0, 1.0).unwrap(),
            ],
            vec![],
        );
        assert_eq!(dup.unwrap_err(), EngineError::DuplicateVariable("a".into()));

        let res = ControlSystem::configure_with(vec![], vec![], InferenceOptions { resolution: 1 });
        assert!(res.unwrap_err().is_configuration());
    }

    #[test]
    fn test_session_outputs_track_last_tick() {
        let system = small_system(vec![
            Rule::new(TermRef::new("a", "LOW"), [TermRef::new("out", "LEFT")]),
            Rule::new(TermRef::new("a", "HIGH"), [TermRef::new("out", "RIGHT")]),
        ])
        .unwrap();
        let mut session = system.session();
        assert_eq!(session.outputs().get("out"), Some(&None));

        let report = system.run_tick(&mut session, [("a", 0.0), ("b", 0.0)]).unwrap();
        assert!(report.is_complete());
        assert_eq!(session.output("out"), report.get("out"));
        assert!(report.get("out").unwrap() < 5.0);
        assert_eq!(report.activations.len(), 2);
        assert_eq!(report.activations[0].strength, 1.0);
        assert_eq!(report.activations[1].strength, 0.0);
    }

    #[test]
    fn test_describe_lists_rules_in_order() {
        let system = small_system(vec![
            Rule::new(TermRef::new("a", "LOW"), [TermRef::new("out", "LEFT")]),
            Rule::new(TermRef::new("a", "HIGH"), [TermRef::new("out", "RIGHT")]),
        ])
        .unwrap();
        let mut session = system.session();
        system.run_tick(&mut session, [("a", 2.5)]).unwrap();
        let text = system.describe(&session);
        let low = text.find("a[LOW]").unwrap();
        let high = text.find("a[HIGH]").unwrap();
        assert!(low < high);
        assert!(text.contains("a = 2.500"));
        assert!(text.contains("out = "));
    }

    #[test]
    fn test_describe_before_inputs_are_set() {
        let system = small_system(vec![Rule::new(
            TermRef::new("a", "LOW") & TermRef::new("b", "HIGH"),
            [TermRef::new("out", "LEFT")],
        )])
        .unwrap();
        let mut session = system.session();
        assert!(system.run_tick(&mut session, [("a", 1.0)]).is_err());

        let text = system.describe(&session);
        assert!(text.contains("a = 1.000"));
        assert!(text.contains("b = <unset>"));
        assert!(text.contains("n/a  IF (a[LOW] AND b[HIGH])"));
        assert!(text.contains("out = <unset>"));
    }
}
