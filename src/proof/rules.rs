use crate::core::RuleError;
use crate::formula::Formula;

use super::state::{ProofState, ProofStep, RuleName, StepId};

/// Applies one inference rule to `state` and returns the extended state.
///
/// `selected` names the steps the rule consumes; `secondary` is the extra
/// disjunct required by `DI_LEFT`/`DI_RIGHT` and ignored by every other rule.
/// The input state is never modified, so a failed application leaves the
/// caller with the state it already had.
pub fn apply_rule(
    state: &ProofState,
    rule: RuleName,
    selected: &[StepId],
    secondary: Option<&Formula>,
) -> Result<ProofState, RuleError> {
    let result = apply_rule_impl(state, rule, selected, secondary);
    match &result {
        Ok(next) => tracing::debug!(
            %rule,
            ?selected,
            id = state.next_id,
            formula = %next.current_steps.last().map_or(&state.goal, |step| &step.formula),
            "applied rule"
        ),
        Err(err) => tracing::debug!(%rule, ?selected, %err, "rule rejected"),
    }
    result
}

fn apply_rule_impl(
    state: &ProofState,
    rule: RuleName,
    selected: &[StepId],
    secondary: Option<&Formula>,
) -> Result<ProofState, RuleError> {
    match rule {
        RuleName::Mp => {
            let [first, second] = select::<2>(state, rule, selected)?;
            let (implication, antecedent, consequent) = modus_ponens(first, second)
                .or_else(|| modus_ponens(second, first))
                .ok_or_else(|| {
                    mismatch(rule, premises_message("(A → B) and A", &[first, second]))
                })?;
            state.append(
                consequent.clone(),
                rule,
                vec![implication.id, antecedent.id],
                max_depth(&[first, second]),
            )
        }
        RuleName::Ci => {
            let [first, second] = select::<2>(state, rule, selected)?;
            state.append(
                Formula::and(first.formula.clone(), second.formula.clone()),
                rule,
                vec![first.id, second.id],
                max_depth(&[first, second]),
            )
        }
        RuleName::CeLeft | RuleName::CeRight => {
            let [premise] = select::<1>(state, rule, selected)?;
            let (left, right) = premise.formula.as_conjunction().ok_or_else(|| {
                mismatch(rule, premises_message("a conjunction A ∧ B", &[premise]))
            })?;
            let formula = if rule == RuleName::CeLeft { left } else { right };
            state.append(formula.clone(), rule, vec![premise.id], premise.depth)
        }
        RuleName::Dn => {
            let [premise] = select::<1>(state, rule, selected)?;
            let inner = premise
                .formula
                .as_negation()
                .and_then(Formula::as_negation)
                .ok_or_else(|| {
                    mismatch(rule, premises_message("a double negation ¬¬A", &[premise]))
                })?;
            state.append(inner.clone(), rule, vec![premise.id], premise.depth)
        }
        RuleName::DiLeft | RuleName::DiRight => {
            let [premise] = select::<1>(state, rule, selected)?;
            let secondary = secondary
                .cloned()
                .ok_or(RuleError::MissingSecondaryFormula { rule })?;
            let formula = if rule == RuleName::DiLeft {
                Formula::or(premise.formula.clone(), secondary)
            } else {
                Formula::or(secondary, premise.formula.clone())
            };
            state.append(formula, rule, vec![premise.id], premise.depth)
        }
        RuleName::Ds => {
            let [first, second] = select::<2>(state, rule, selected)?;
            let (disjunction, negation, remaining) = disjunctive_syllogism(first, second)
                .or_else(|| disjunctive_syllogism(second, first))
                .ok_or_else(|| {
                    mismatch(
                        rule,
                        premises_message("(A ∨ B) and ¬A or ¬B", &[first, second]),
                    )
                })?;
            state.append(
                remaining.clone(),
                rule,
                vec![disjunction.id, negation.id],
                max_depth(&[first, second]),
            )
        }
        RuleName::Ii => {
            let [first, second] = select::<2>(state, rule, selected)?;
            let (assumption, conclusion) = discharge_order(first, second);
            let formula = Formula::implies(assumption.formula.clone(), conclusion.formula.clone());
            let justification = vec![assumption.id, conclusion.id];

            let mut discharged = state.clone();
            for step in discharged
                .premises
                .iter_mut()
                .chain(discharged.current_steps.iter_mut())
                .filter(|step| step.id == assumption.id)
            {
                step.is_discharged = true;
            }
            discharged.append(formula, rule, justification, 0)
        }
        RuleName::Assume => Err(RuleError::NotAnInference { rule }),
    }
}

/// Resolves exactly `N` selected ids against the current steps.
fn select<'a, const N: usize>(
    state: &'a ProofState,
    rule: RuleName,
    selected: &[StepId],
) -> Result<[&'a ProofStep; N], RuleError> {
    if selected.len() != N {
        return Err(RuleError::ArityMismatch {
            rule,
            expected: N,
            actual: selected.len(),
        });
    }

    let steps = selected
        .iter()
        .map(|&id| state.step(id).ok_or(RuleError::StepNotFound { id }))
        .collect::<Result<Vec<_>, _>>()?;
    steps
        .try_into()
        .map_err(|steps: Vec<&ProofStep>| RuleError::ArityMismatch {
            rule,
            expected: N,
            actual: steps.len(),
        })
}

/// Matches `implication` against `A → B` and `antecedent` against `A`,
/// returning `B`.
fn modus_ponens<'a>(
    implication: &'a ProofStep,
    antecedent: &'a ProofStep,
) -> Option<(&'a ProofStep, &'a ProofStep, &'a Formula)> {
    let (premise, consequent) = implication.formula.as_implication()?;
    (*premise == antecedent.formula).then_some((implication, antecedent, consequent))
}

/// Matches `disjunction` against `A ∨ B` and `negation` against `¬A` or `¬B`,
/// returning the disjunct that survives.
fn disjunctive_syllogism<'a>(
    disjunction: &'a ProofStep,
    negation: &'a ProofStep,
) -> Option<(&'a ProofStep, &'a ProofStep, &'a Formula)> {
    let (left, right) = disjunction.formula.as_disjunction()?;
    let negated = negation.formula.as_negation()?;

    if negated == left {
        Some((disjunction, negation, right))
    } else if negated == right {
        Some((disjunction, negation, left))
    } else {
        None
    }
}

// An ASSUME step wins when exactly one of the pair has that rule; otherwise the
// earlier id is taken as the assumption. This does not check that the
// conclusion was actually derived inside the assumption's scope.
fn discharge_order<'a>(
    first: &'a ProofStep,
    second: &'a ProofStep,
) -> (&'a ProofStep, &'a ProofStep) {
    let first_assumed = first.rule == RuleName::Assume;
    let second_assumed = second.rule == RuleName::Assume;

    match (first_assumed, second_assumed) {
        (true, false) => (first, second),
        (false, true) => (second, first),
        _ if second.id < first.id => (second, first),
        _ => (first, second),
    }
}

fn max_depth(steps: &[&ProofStep]) -> u32 {
    steps.iter().map(|step| step.depth).max().unwrap_or(0)
}

fn mismatch(rule: RuleName, expected: String) -> RuleError {
    RuleError::PatternMismatch { rule, expected }
}

fn premises_message(expected: &str, actual: &[&ProofStep]) -> String {
    let noun = if actual.len() == 1 {
        "premise"
    } else {
        "premises"
    };
    let actual = actual
        .iter()
        .map(|step| format!("[{}] (step {})", step.formula, step.id))
        .collect::<Vec<_>>()
        .join(" and ");
    format!("{noun} must be {expected}, actual: {actual}")
}
