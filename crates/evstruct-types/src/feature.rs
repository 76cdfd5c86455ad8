//! Feature formulas and the solver seam.
//!
//! Feature formulas annotate transitions (and, after derivation, events) in
//! variability-aware models. The core never interprets feature names. It
//! only conjoins, negates, and asks whether a formula is satisfiable, and
//! every one of those operations goes through an injected [`FeatureSolver`].
//!
//! An absent formula is a [`Guard`] of `None` and means "always enabled".
//! The provided `*_guards` methods on [`FeatureSolver`] handle that case
//! without calling into the solver, so plain (unannotated) models never
//! touch it.
//!
//! [`Proposition`] and [`TruthTableSolver`] are the built-in formula type
//! and solver. The truth-table check is exponential in the number of
//! distinct features, so it refuses formulas above a configured limit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An optional feature formula; `None` is the tautology.
pub type Guard<F> = Option<F>;

/// Errors reported by a feature solver.
///
/// The core propagates these unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// The formula mentions more features than the solver will enumerate.
    #[error("formula mentions {count} features, solver limit is {limit}")]
    TooManyVariables {
        /// Distinct features in the formula.
        count: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// An external solver backend failed.
    #[error("solver backend failure: {0}")]
    Backend(String),
}

/// Conjunction, negation, and satisfiability over an opaque formula type.
pub trait FeatureSolver {
    /// The formula representation this solver understands.
    type Formula: Clone + core::fmt::Debug;

    /// `left ∧ right`.
    fn conjoin(&self, left: &Self::Formula, right: &Self::Formula) -> Self::Formula;

    /// `¬formula`.
    fn negate(&self, formula: &Self::Formula) -> Self::Formula;

    /// Whether some feature assignment satisfies `formula`.
    fn is_satisfiable(&self, formula: &Self::Formula) -> Result<bool, SolverError>;

    /// `left ∨ right`, expressed through conjunction and negation.
    fn disjoin(&self, left: &Self::Formula, right: &Self::Formula) -> Self::Formula {
        self.negate(&self.conjoin(&self.negate(left), &self.negate(right)))
    }

    /// Whether every assignment satisfying `premise` satisfies `conclusion`.
    fn implies(
        &self,
        premise: &Self::Formula,
        conclusion: &Self::Formula,
    ) -> Result<bool, SolverError> {
        let counterexample = self.conjoin(premise, &self.negate(conclusion));
        Ok(!self.is_satisfiable(&counterexample)?)
    }

    /// Whether both formulas have the same models.
    fn equivalent(&self, left: &Self::Formula, right: &Self::Formula) -> Result<bool, SolverError> {
        Ok(self.implies(left, right)? && self.implies(right, left)?)
    }

    /// Conjunction of two guards.
    fn conjoin_guards(
        &self,
        left: Option<&Self::Formula>,
        right: Option<&Self::Formula>,
    ) -> Guard<Self::Formula> {
        match (left, right) {
            (Some(l), Some(r)) => Some(self.conjoin(l, r)),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }

    /// Disjunction of two guards. Absorbs into the tautology.
    fn disjoin_guards(
        &self,
        left: Option<&Self::Formula>,
        right: Option<&Self::Formula>,
    ) -> Guard<Self::Formula> {
        match (left, right) {
            (Some(l), Some(r)) => Some(self.disjoin(l, r)),
            _ => None,
        }
    }

    /// Satisfiability of a guard.
    fn guard_satisfiable(&self, guard: Option<&Self::Formula>) -> Result<bool, SolverError> {
        guard.map_or(Ok(true), |formula| self.is_satisfiable(formula))
    }

    /// Implication between guards.
    fn guard_implies(
        &self,
        premise: Option<&Self::Formula>,
        conclusion: Option<&Self::Formula>,
    ) -> Result<bool, SolverError> {
        match (premise, conclusion) {
            (_, None) => Ok(true),
            (Some(p), Some(c)) => self.implies(p, c),
            (None, Some(c)) => Ok(!self.is_satisfiable(&self.negate(c))?),
        }
    }

    /// Equivalence between guards.
    fn guard_equivalent(
        &self,
        left: Option<&Self::Formula>,
        right: Option<&Self::Formula>,
    ) -> Result<bool, SolverError> {
        Ok(self.guard_implies(left, right)? && self.guard_implies(right, left)?)
    }
}

/// A propositional formula over named features.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proposition {
    /// Always true.
    True,
    /// Always false.
    False,
    /// A feature is selected.
    Feature(String),
    /// Negation.
    Not(Box<Self>),
    /// Conjunction of all operands (true when empty).
    And(Vec<Self>),
    /// Disjunction of all operands (false when empty).
    Or(Vec<Self>),
}

impl Proposition {
    /// A single feature variable.
    pub fn feature(name: impl Into<String>) -> Self {
        Self::Feature(name.into())
    }

    /// Evaluate under the assignment that selects exactly `selected`.
    pub fn evaluate(&self, selected: &BTreeSet<String>) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Feature(name) => selected.contains(name),
            Self::Not(inner) => !inner.evaluate(selected),
            Self::And(operands) => operands.iter().all(|op| op.evaluate(selected)),
            Self::Or(operands) => operands.iter().any(|op| op.evaluate(selected)),
        }
    }

    /// Every feature name mentioned in the formula.
    pub fn features(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_features(&mut names);
        names
    }

    fn collect_features<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::True | Self::False => {}
            Self::Feature(name) => {
                names.insert(name.as_str());
            }
            Self::Not(inner) => inner.collect_features(names),
            Self::And(operands) | Self::Or(operands) => {
                for op in operands {
                    op.collect_features(names);
                }
            }
        }
    }
}

impl core::ops::BitAnd for Proposition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::True, other) | (other, Self::True) => other,
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (other, Self::And(mut right)) => {
                right.insert(0, other);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }
}

impl core::ops::BitOr for Proposition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::False, other) | (other, Self::False) => other,
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (other, Self::Or(mut right)) => {
                right.insert(0, other);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }
}

impl core::ops::Not for Proposition {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

impl core::fmt::Display for Proposition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Feature(name) => f.write_str(name),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::And(operands) => write_joined(f, operands, " & ", "true"),
            Self::Or(operands) => write_joined(f, operands, " | ", "false"),
        }
    }
}

fn write_joined(
    f: &mut core::fmt::Formatter<'_>,
    operands: &[Proposition],
    separator: &str,
    empty: &str,
) -> core::fmt::Result {
    if operands.is_empty() {
        return f.write_str(empty);
    }
    f.write_str("(")?;
    for (position, op) in operands.iter().enumerate() {
        if position > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{op}")?;
    }
    f.write_str(")")
}

/// Default number of distinct features the truth-table solver enumerates.
pub const DEFAULT_MAX_VARIABLES: usize = 20;

/// Exhaustive satisfiability check over all feature assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTableSolver {
    max_variables: usize,
}

impl TruthTableSolver {
    /// Create a solver that refuses formulas with more than `max_variables`
    /// distinct features.
    pub const fn new(max_variables: usize) -> Self {
        Self { max_variables }
    }

    /// The configured variable limit.
    pub const fn max_variables(&self) -> usize {
        self.max_variables
    }
}

impl Default for TruthTableSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VARIABLES)
    }
}

impl FeatureSolver for TruthTableSolver {
    type Formula = Proposition;

    fn conjoin(&self, left: &Proposition, right: &Proposition) -> Proposition {
        left.clone() & right.clone()
    }

    fn negate(&self, formula: &Proposition) -> Proposition {
        !formula.clone()
    }

    fn is_satisfiable(&self, formula: &Proposition) -> Result<bool, SolverError> {
        let features: Vec<&str> = formula.features().into_iter().collect();
        if features.len() > self.max_variables {
            return Err(SolverError::TooManyVariables {
                count: features.len(),
                limit: self.max_variables,
            });
        }
        let mut selected = BTreeSet::new();
        Ok(satisfiable_from(formula, &features, &mut selected))
    }
}

/// Try both values of the first remaining feature, then recurse.
fn satisfiable_from(
    formula: &Proposition,
    remaining: &[&str],
    selected: &mut BTreeSet<String>,
) -> bool {
    let Some((first, rest)) = remaining.split_first() else {
        return formula.evaluate(selected);
    };
    if satisfiable_from(formula, rest, selected) {
        return true;
    }
    selected.insert((*first).to_owned());
    let found = satisfiable_from(formula, rest, selected);
    selected.remove(*first);
    found
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn f(name: &str) -> Proposition {
        Proposition::feature(name)
    }

    #[test]
    fn evaluate_under_assignment() {
        let formula = f("a") & !f("b");
        let only_a: BTreeSet<String> = std::iter::once("a".to_owned()).collect();
        let both: BTreeSet<String> = ["a", "b"].into_iter().map(str::to_owned).collect();
        assert!(formula.evaluate(&only_a));
        assert!(!formula.evaluate(&both));
    }

    #[test]
    fn constant_folding() {
        assert_eq!(Proposition::True & f("x"), f("x"));
        assert_eq!(Proposition::False & f("x"), Proposition::False);
        assert_eq!(Proposition::False | f("x"), f("x"));
        assert_eq!(!!f("x"), f("x"));
    }

    #[test]
    fn satisfiability() {
        let solver = TruthTableSolver::default();
        assert_eq!(solver.is_satisfiable(&(f("a") & !f("b"))), Ok(true));
        assert_eq!(solver.is_satisfiable(&(f("a") & !f("a"))), Ok(false));
        assert_eq!(solver.is_satisfiable(&Proposition::True), Ok(true));
        assert_eq!(solver.is_satisfiable(&Proposition::Or(Vec::new())), Ok(false));
    }

    #[test]
    fn implication_and_equivalence() {
        let solver = TruthTableSolver::default();
        let a_and_b = f("a") & f("b");
        assert_eq!(solver.implies(&a_and_b, &f("a")), Ok(true));
        assert_eq!(solver.implies(&f("a"), &a_and_b), Ok(false));
        let de_morgan = !(!f("a") & !f("b"));
        assert_eq!(solver.equivalent(&de_morgan, &(f("a") | f("b"))), Ok(true));
        assert_eq!(solver.equivalent(&solver.disjoin(&f("a"), &f("b")), &de_morgan), Ok(true));
    }

    #[test]
    fn guards_treat_none_as_tautology() {
        let solver = TruthTableSolver::default();
        assert_eq!(solver.conjoin_guards(None, None), None);
        assert_eq!(solver.conjoin_guards(Some(&f("a")), None), Some(f("a")));
        assert_eq!(solver.disjoin_guards(Some(&f("a")), None), None);
        assert_eq!(solver.guard_satisfiable(None), Ok(true));
        assert_eq!(solver.guard_implies(Some(&f("a")), None), Ok(true));
        assert_eq!(solver.guard_implies(None, Some(&f("a"))), Ok(false));
        assert_eq!(
            solver.guard_implies(None, Some(&(f("a") | !f("a")))),
            Ok(true)
        );
        assert_eq!(solver.guard_equivalent(None, Some(&Proposition::True)), Ok(true));
    }

    #[test]
    fn variable_limit_is_enforced() {
        let solver = TruthTableSolver::new(2);
        let formula = f("a") & f("b") & f("c");
        assert_eq!(
            solver.is_satisfiable(&formula),
            Err(SolverError::TooManyVariables { count: 3, limit: 2 })
        );
    }

    #[test]
    fn display_is_readable() {
        let formula = (f("a") & !f("b")) | f("c");
        assert_eq!(formula.to_string(), "((a & !b) | c)");
    }

    #[test]
    fn serde_roundtrip() {
        let formula = f("a") & !f("b");
        let json = serde_json::to_string(&formula).unwrap();
        let back: Proposition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, formula);
    }
}
