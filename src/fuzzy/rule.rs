//! Fuzzy rules
//!
//! An antecedent expression over term references, and the weighted terms it
//! concludes. Expressions compose with `&`, `|` and `!`:
//!
//! ```
//! use fuzzy_racer::fuzzy::{Rule, TermRef};
//!
//! let centered = TermRef::new("balance", "CENTER") & TermRef::new("side", "CENTER");
//! let rule = Rule::new(centered, [TermRef::new("steer", "NONE").weighted(0.1)]);
//! assert_eq!(rule.consequents.len(), 1);
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

/// Identifies term `label` of variable `variable`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermRef {
    pub variable: String,
    pub label: String,
}

impl TermRef {
    pub fn new(variable: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            label: label.into(),
        }
    }

    /// Conclude this term with a confidence weight
    pub fn weighted(self, weight: f64) -> Consequent {
        Consequent { term: self, weight }
    }
}

impl fmt::Display for TermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.variable, self.label)
    }
}

/// Boolean expression tree over term references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Leaf(TermRef),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn leaf(variable: impl Into<String>, label: impl Into<String>) -> Self {
        Expr::Leaf(TermRef::new(variable, label))
    }

    /// Every term reference in the tree, left to right
    pub fn terms(&self) -> Vec<&TermRef> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a TermRef>) {
        match self {
            Expr::Leaf(term) => out.push(term),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_terms(out);
                r.collect_terms(out);
            }
            Expr::Not(e) => e.collect_terms(out),
        }
    }
}

impl From<TermRef> for Expr {
    fn from(term: TermRef) -> Self {
        Expr::Leaf(term)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(term) => write!(f, "{term}"),
            Expr::And(l, r) => write!(f, "({l} AND {r})"),
            Expr::Or(l, r) => write!(f, "({l} OR {r})"),
            Expr::Not(e) => write!(f, "NOT {e}"),
        }
    }
}

impl<R: Into<Expr>> BitAnd<R> for Expr {
    type Output = Expr;
    fn bitand(self, rhs: R) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs.into()))
    }
}

impl<R: Into<Expr>> BitOr<R> for Expr {
    type Output = Expr;
    fn bitor(self, rhs: R) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs.into()))
    }
}

impl Not for Expr {
    type Output = Expr;
    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl<R: Into<Expr>> BitAnd<R> for TermRef {
    type Output = Expr;
    fn bitand(self, rhs: R) -> Expr {
        Expr::from(self) & rhs
    }
}

impl<R: Into<Expr>> BitOr<R> for TermRef {
    type Output = Expr;
    fn bitor(self, rhs: R) -> Expr {
        Expr::from(self) | rhs
    }
}

impl Not for TermRef {
    type Output = Expr;
    fn not(self) -> Expr {
        !Expr::from(self)
    }
}

/// A concluded term and the factor its firing strength is scaled by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    pub term: TermRef,
    #[serde(default = "full_weight")]
    pub weight: f64,
}

fn full_weight() -> f64 {
    1.0
}

impl From<TermRef> for Consequent {
    fn from(term: TermRef) -> Self {
        Consequent { term, weight: 1.0 }
    }
}

/// IF antecedent THEN consequents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub antecedent: Expr,
    pub consequents: Vec<Consequent>,
}

impl Rule {
    pub fn new<C: Into<Consequent>>(
        antecedent: impl Into<Expr>,
        consequents: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            antecedent: antecedent.into(),
            consequents: consequents.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN ", self.antecedent)?;
        for (i, c) in self.consequents.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c.term)?;
            if c.weight != 1.0 {
                write!(f, " % {}", c.weight)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_build_tree() {
        let expr = TermRef::new("head", "AWAY") & !TermRef::new("balance", "CENTER");
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::leaf("head", "AWAY")),
                Box::new(Expr::Not(Box::new(Expr::leaf("balance", "CENTER"))))
            )
        );
        assert_eq!(expr.to_string(), "(head[AWAY] AND NOT balance[CENTER])");
    }

    #[test]
    fn test_terms_left_to_right() {
        let expr = (TermRef::new("a", "X") | TermRef::new("b", "Y")) & TermRef::new("c", "Z");
        let vars: Vec<_> = expr.terms().iter().map(|t| t.variable.as_str()).collect();
        assert_eq!(vars, ["a", "b", "c"]);
    }

    #[test]
    fn test_rule_display_and_default_weight() {
        let rule = Rule::new(
            TermRef::new("head", "CLOSE"),
            [
                TermRef::new("brake", "HARD").into(),
                TermRef::new("gas", "NONE").weighted(0.5),
            ],
        );
        assert_eq!(rule.consequents[0].weight, 1.0);
        assert_eq!(
            rule.to_string(),
            "IF head[CLOSE] THEN brake[HARD], gas[NONE] % 0.5"
        );
    }

    #[test]
    fn test_consequent_weight_defaults_in_json() {
        let c: Consequent =
            serde_json::from_str(r#"{"term":{"variable":"gas","label":"SOFT"}}"#).unwrap();
        assert_eq!(c.weight, 1.0);
    }
}
