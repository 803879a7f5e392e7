mod rules;
mod script;
mod state;

pub use rules::apply_rule;
pub use script::{run_script, ScriptError, ScriptErrorKind, ScriptReport};
pub use state::{ParseRuleNameError, ProofState, ProofStep, RuleName, StepId};

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{apply_rule, ProofState, RuleName};
    use crate::formula::Formula;

    fn arb_atom() -> impl Strategy<Value = Formula> {
        prop::sample::select(vec!["P", "Q", "R"]).prop_map(|name| Formula::atom(name))
    }

    fn arb_formula() -> impl Strategy<Value = Formula> {
        arb_atom().prop_recursive(3, 12, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(Formula::not),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::and(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::or(l, r)),
                (inner.clone(), inner).prop_map(|(l, r)| Formula::implies(l, r)),
            ]
        })
    }

    fn arb_rule() -> impl Strategy<Value = RuleName> {
        prop::sample::select(RuleName::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn never_mutates_input_and_ids_advance_by_one(
            premises in prop::collection::vec(arb_formula(), 1..5),
            rule in arb_rule(),
            selected in prop::collection::vec(1u32..6, 0..3),
            secondary in prop::option::of(arb_formula()),
        ) {
            let state = ProofState::new(premises, Formula::atom("Q"));
            let before = state.clone();

            let result = apply_rule(&state, rule, &selected, secondary.as_ref());

            prop_assert_eq!(&state, &before);
            if let Ok(next) = result {
                prop_assert_eq!(next.next_id, state.next_id + 1);
                let appended = next.current_steps.last().expect("a step should be appended");
                prop_assert_eq!(appended.id, state.next_id);
                prop_assert_eq!(next.current_steps.len(), state.current_steps.len() + 1);
                for (old, new) in state.current_steps.iter().zip(&next.current_steps) {
                    prop_assert_eq!(old.id, new.id);
                    prop_assert_eq!(&old.formula, &new.formula);
                    prop_assert_eq!(&old.justification, &new.justification);
                }
                prop_assert!(appended.justification.iter().all(|id| *id < appended.id));
            }
        }

        #[test]
        fn conjunction_elimination_is_total_on_conjunctions(
            left in arb_formula(),
            right in arb_formula(),
        ) {
            let state = ProofState::new(
                vec![Formula::and(left.clone(), right.clone())],
                Formula::atom("P"),
            );
            let from_left = apply_rule(&state, RuleName::CeLeft, &[1], None)
                .expect("CE_LEFT should apply");
            let from_right = apply_rule(&state, RuleName::CeRight, &[1], None)
                .expect("CE_RIGHT should apply");
            prop_assert_eq!(&from_left.current_steps[1].formula, &left);
            prop_assert_eq!(&from_right.current_steps[1].formula, &right);
        }
    }
}
