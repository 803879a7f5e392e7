use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{RuleError, StateError};
use crate::formula::Formula;

pub type StepId = u32;

/// Names of the inference rules, plus `ASSUME` for steps the caller adds
/// directly (premises and conditional-proof assumptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleName {
    Mp,
    Ci,
    CeLeft,
    CeRight,
    Dn,
    DiLeft,
    DiRight,
    Ds,
    Ii,
    Assume,
}

impl RuleName {
    pub const ALL: [RuleName; 10] = [
        Self::Mp,
        Self::Ci,
        Self::CeLeft,
        Self::CeRight,
        Self::Dn,
        Self::DiLeft,
        Self::DiRight,
        Self::Ds,
        Self::Ii,
        Self::Assume,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp => "MP",
            Self::Ci => "CI",
            Self::CeLeft => "CE_LEFT",
            Self::CeRight => "CE_RIGHT",
            Self::Dn => "DN",
            Self::DiLeft => "DI_LEFT",
            Self::DiRight => "DI_RIGHT",
            Self::Ds => "DS",
            Self::Ii => "II",
            Self::Assume => "ASSUME",
        }
    }

    /// Number of selected steps the rule consumes, or `None` for `ASSUME`.
    pub const fn arity(self) -> Option<usize> {
        match self {
            Self::Mp | Self::Ci | Self::Ds | Self::Ii => Some(2),
            Self::CeLeft | Self::CeRight | Self::Dn | Self::DiLeft | Self::DiRight => Some(1),
            Self::Assume => None,
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RuleName {
    type Error = ParseRuleNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ParseRuleNameError {
                raw: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRuleNameError {
    raw: String,
}

impl fmt::Display for ParseRuleNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown rule: {} (available: MP, CI, CE_LEFT, CE_RIGHT, DN, DI_LEFT, DI_RIGHT, DS, II)",
            self.raw
        )
    }
}

impl Error for ParseRuleNameError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofStep {
    pub id: StepId,
    pub formula: Formula,
    pub rule: RuleName,
    pub justification: Vec<StepId>,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_discharged: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ProofStep {
    pub fn is_open_assumption(&self) -> bool {
        self.rule == RuleName::Assume && self.depth > 0 && !self.is_discharged
    }
}

/// A proof in progress.
///
/// Every transition produces a new value: `current_steps` only grows, and an
/// existing step is only ever replaced to set `is_discharged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofState {
    pub premises: Vec<ProofStep>,
    pub goal: Formula,
    pub current_steps: Vec<ProofStep>,
    pub next_id: StepId,
}

impl ProofState {
    /// Seeds a proof with premise steps numbered from 1.
    pub fn new(premises: Vec<Formula>, goal: Formula) -> Self {
        let premises = premises
            .into_iter()
            .zip(1..)
            .map(|(formula, id)| ProofStep {
                id,
                formula,
                rule: RuleName::Assume,
                justification: Vec::new(),
                depth: 0,
                is_discharged: false,
            })
            .collect::<Vec<_>>();
        let next_id = premises.last().map_or(1, |step| step.id + 1);

        Self {
            current_steps: premises.clone(),
            premises,
            goal,
            next_id,
        }
    }

    pub fn step(&self, id: StepId) -> Option<&ProofStep> {
        self.current_steps.iter().find(|step| step.id == id)
    }

    pub fn open_assumptions(&self) -> impl Iterator<Item = &ProofStep> {
        self.current_steps
            .iter()
            .filter(|step| step.is_open_assumption())
    }

    /// Opens a new assumption one level deeper than the deepest open one.
    pub fn assume(&self, formula: Formula) -> Result<ProofState, RuleError> {
        let depth = self
            .open_assumptions()
            .map(|step| step.depth)
            .max()
            .unwrap_or(0)
            + 1;
        tracing::debug!(%formula, depth, id = self.next_id, "opening assumption");
        self.append(formula, RuleName::Assume, Vec::new(), depth)
    }

    /// True once a step outside every assumption scope matches the goal.
    pub fn is_complete(&self) -> bool {
        self.current_steps
            .iter()
            .any(|step| step.depth == 0 && step.formula == self.goal)
    }

    /// Checks the numbering of a state that did not come from [`ProofState::new`].
    pub fn validate(&self) -> Result<(), StateError> {
        let max_id = self
            .premises
            .iter()
            .chain(&self.current_steps)
            .map(|step| step.id)
            .max();
        if let Some(max_id) = max_id.filter(|max_id| *max_id >= self.next_id) {
            return Err(StateError::StaleNextId {
                next_id: self.next_id,
                max_id,
            });
        }

        let mut seen = HashSet::new();
        for step in &self.current_steps {
            if !seen.insert(step.id) {
                return Err(StateError::DuplicateStepId { id: step.id });
            }
        }
        Ok(())
    }

    pub(crate) fn append(
        &self,
        formula: Formula,
        rule: RuleName,
        justification: Vec<StepId>,
        depth: u32,
    ) -> Result<ProofState, RuleError> {
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(RuleError::IdsExhausted {
                next_id: self.next_id,
            })?;
        let mut next = self.clone();
        next.current_steps.push(ProofStep {
            id: self.next_id,
            formula,
            rule,
            justification,
            depth,
            is_discharged: false,
        });
        next.next_id = next_id;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProofState, RuleName};
    use crate::core::StateError;
    use crate::formula::Formula;

    fn p() -> Formula {
        Formula::atom("P")
    }

    fn q() -> Formula {
        Formula::atom("Q")
    }

    #[test]
    fn seeds_premises_from_one() {
        let state = ProofState::new(vec![Formula::implies(p(), q()), p()], q());
        assert_eq!(state.next_id, 3);
        assert_eq!(state.premises, state.current_steps);
        assert_eq!(
            state
                .current_steps
                .iter()
                .map(|step| (step.id, step.rule, step.depth))
                .collect::<Vec<_>>(),
            vec![(1, RuleName::Assume, 0), (2, RuleName::Assume, 0)]
        );
        assert!(!state.is_complete());
    }

    #[test]
    fn empty_premises_start_at_one() {
        let state = ProofState::new(Vec::new(), p());
        assert_eq!(state.next_id, 1);
        assert!(state.current_steps.is_empty());
    }

    #[test]
    fn assumptions_nest_one_level_deeper() {
        let state = ProofState::new(vec![p()], q());
        let first = state.assume(q()).expect("assume should succeed");
        let second = first.assume(p()).expect("assume should succeed");

        assert_eq!(state.current_steps.len(), 1);
        assert_eq!(first.step(2).map(|step| step.depth), Some(1));
        assert_eq!(second.step(3).map(|step| step.depth), Some(2));
        assert_eq!(second.next_id, 4);
        assert_eq!(second.open_assumptions().count(), 2);
    }

    #[test]
    fn goal_inside_an_assumption_does_not_complete_the_proof() {
        let state = ProofState::new(vec![p()], q())
            .assume(q())
            .expect("assume should succeed");
        assert!(!state.is_complete());

        let premise_goal = ProofState::new(vec![p()], p());
        assert!(premise_goal.is_complete());
    }

    #[test]
    fn validates_step_numbering() {
        let state = ProofState::new(vec![p(), q()], q());
        assert_eq!(state.validate(), Ok(()));

        let mut stale = state.clone();
        stale.next_id = 2;
        assert_eq!(
            stale.validate(),
            Err(StateError::StaleNextId {
                next_id: 2,
                max_id: 2
            })
        );

        let mut duplicated = state.clone();
        duplicated.current_steps[1].id = 1;
        assert_eq!(
            duplicated.validate(),
            Err(StateError::DuplicateStepId { id: 1 })
        );
    }

    #[test]
    fn parses_rule_names_case_insensitively() {
        assert_eq!(RuleName::try_from("mp"), Ok(RuleName::Mp));
        assert_eq!(RuleName::try_from("CE-LEFT"), Ok(RuleName::CeLeft));
        assert_eq!(RuleName::try_from("di_right"), Ok(RuleName::DiRight));
        let err = RuleName::try_from("XX").expect_err("unknown rule should fail");
        assert!(err.to_string().contains("unknown rule: XX"));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let state = ProofState::new(vec![p()], q());
        let json = serde_json::to_value(&state).expect("state should serialize");
        assert_eq!(json["nextId"], 2);
        assert_eq!(json["currentSteps"][0]["rule"], "ASSUME");
        assert!(json["currentSteps"][0].get("isDischarged").is_none());

        let back: ProofState = serde_json::from_value(json).expect("state should deserialize");
        assert_eq!(back, state);
    }
}
