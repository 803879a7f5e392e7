use std::fmt;

use thiserror::Error;

use crate::core::{FormulaError, RuleError};
use crate::formula::{parse_formula, Formula};

use super::rules::apply_rule;
use super::state::{ParseRuleNameError, ProofState, ProofStep, RuleName, StepId};

/// Failure while replaying a proof script, tagged with its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
    pub line: usize,
    pub kind: ScriptErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
    #[error("{0}")]
    Formula(#[from] FormulaError),
    #[error("{0}")]
    Rule(#[from] RuleError),
    #[error("{0}")]
    UnknownRule(#[from] ParseRuleNameError),
    #[error("invalid step id: {0}")]
    InvalidStepId(String),
    #[error("expected a formula after '{0}'")]
    MissingFormula(&'static str),
    #[error("premises must come before the goal")]
    MisplacedPremise,
    #[error("the goal is already set")]
    DuplicateGoal,
    #[error("missing 'goal <formula>' line")]
    MissingGoal,
}

/// The final state of a replayed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub state: ProofState,
}

impl fmt::Display for ScriptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.state.current_steps {
            writeln!(f, "{}", ListingLine(step))?;
        }
        let verdict = if self.state.is_complete() {
            "goal reached"
        } else {
            "goal not reached"
        };
        write!(f, "{verdict}: {}", self.state.goal)
    }
}

struct ListingLine<'a>(&'a ProofStep);

impl fmt::Display for ListingLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = self.0;
        let indent = "  ".repeat(step.depth as usize);
        write!(f, "{:>3}  {indent}{}  ", step.id, step.formula)?;
        match step.rule {
            RuleName::Assume if step.depth == 0 => write!(f, "premise")?,
            RuleName::Assume => write!(f, "assumption")?,
            rule => {
                let cited = step
                    .justification
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{rule} {cited}")?;
            }
        }
        if step.is_discharged {
            write!(f, " (discharged)")?;
        }
        Ok(())
    }
}

/// Replays a line-oriented proof script:
///
/// ```text
/// premise P -> Q
/// premise P
/// goal Q
/// MP 1 2
/// ```
///
/// Blank lines and `//` comments are skipped. Replay stops at the first
/// failing line.
pub fn run_script(source: &str) -> Result<ScriptReport, ScriptError> {
    let mut replay = Replay::default();
    let mut last_line = 1;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        last_line = line;
        let text = raw.split_once("//").map_or(raw, |(code, _)| code).trim();
        if text.is_empty() {
            continue;
        }
        replay
            .line(text)
            .map_err(|kind| ScriptError { line, kind })?;
    }

    match replay.state {
        Some(state) => Ok(ScriptReport { state }),
        None => Err(ScriptError {
            line: last_line,
            kind: ScriptErrorKind::MissingGoal,
        }),
    }
}

#[derive(Debug, Default)]
struct Replay {
    premises: Vec<Formula>,
    state: Option<ProofState>,
}

impl Replay {
    fn line(&mut self, text: &str) -> Result<(), ScriptErrorKind> {
        let (head, rest) = text
            .split_once(char::is_whitespace)
            .map_or((text, ""), |(head, rest)| (head, rest.trim()));

        match head {
            "premise" => {
                if self.state.is_some() {
                    return Err(ScriptErrorKind::MisplacedPremise);
                }
                self.premises.push(parse_required(rest, "premise")?);
            }
            "goal" => {
                if self.state.is_some() {
                    return Err(ScriptErrorKind::DuplicateGoal);
                }
                let goal = parse_required(rest, "goal")?;
                self.state = Some(ProofState::new(std::mem::take(&mut self.premises), goal));
            }
            "assume" => {
                let formula = parse_required(rest, "assume")?;
                let state = self.state.as_ref().ok_or(ScriptErrorKind::MissingGoal)?;
                self.state = Some(state.assume(formula)?);
            }
            rule => {
                let rule = RuleName::try_from(rule)?;
                let (selected, secondary) = parse_invocation(rest)?;
                let state = self.state.as_ref().ok_or(ScriptErrorKind::MissingGoal)?;
                self.state = Some(apply_rule(state, rule, &selected, secondary.as_ref())?);
            }
        }
        Ok(())
    }
}

fn parse_required(text: &str, keyword: &'static str) -> Result<Formula, ScriptErrorKind> {
    if text.is_empty() {
        return Err(ScriptErrorKind::MissingFormula(keyword));
    }
    Ok(parse_formula(text)?)
}

fn parse_invocation(text: &str) -> Result<(Vec<StepId>, Option<Formula>), ScriptErrorKind> {
    let (ids, secondary) = match text.split_once("with") {
        Some((ids, secondary)) => (ids, Some(parse_required(secondary.trim(), "with")?)),
        None => (text, None),
    };

    let selected = ids
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|word| !word.is_empty())
        .map(|word| {
            word.parse::<StepId>()
                .map_err(|_| ScriptErrorKind::InvalidStepId(word.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((selected, secondary))
}

#[cfg(test)]
mod tests {
    use super::{run_script, ScriptErrorKind};
    use crate::core::RuleError;
    use crate::formula::parse_formula;
    use crate::proof::RuleName;

    #[test]
    fn replays_modus_ponens_script() {
        let source = "\
// modus ponens
premise P -> Q
premise P

goal Q
MP 1 2
";
        let report = run_script(source).expect("script should replay");
        assert!(report.state.is_complete());
        assert_eq!(
            report.to_string(),
            "  1  P → Q  premise\n  2  P  premise\n  3  Q  MP 1, 2\ngoal reached: Q"
        );
    }

    #[test]
    fn replays_conditional_proof() {
        let source = "\
premise P -> Q
goal P -> Q ∨ R
assume P
MP 1, 2
DI_LEFT 3 with R
II 2 4
";
        let report = run_script(source).expect("script should replay");
        assert!(report.state.is_complete());
        assert_eq!(
            report.to_string(),
            "  1  P → Q  premise\n\
               \x20 2    P  assumption (discharged)\n\
               \x20 3    Q  MP 1, 2\n\
               \x20 4    Q ∨ R  DI_LEFT 3\n\
               \x20 5  P → Q ∨ R  II 2, 4\n\
             goal reached: P → Q ∨ R"
        );
    }

    #[test]
    fn reports_failing_line() {
        let source = "premise P ∨ Q\npremise ~R\ngoal Q\nDS 1 2\n";
        let err = run_script(source).expect_err("script should fail");
        assert_eq!(err.line, 4);
        assert!(matches!(
            err.kind,
            ScriptErrorKind::Rule(RuleError::PatternMismatch {
                rule: RuleName::Ds,
                ..
            })
        ));
        assert!(err.to_string().starts_with("line 4: DS does not apply"));
    }

    #[test]
    fn reports_formula_errors_with_line() {
        let err = run_script("premise P &\n").expect_err("script should fail");
        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, ScriptErrorKind::Formula(_)));
    }

    #[test]
    fn requires_goal_before_steps() {
        let err = run_script("premise P\nCE_LEFT 1\n").expect_err("script should fail");
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ScriptErrorKind::MissingGoal);

        let err = run_script("premise P\n").expect_err("script should fail");
        assert_eq!(err.kind, ScriptErrorKind::MissingGoal);
    }

    #[test]
    fn rejects_premise_after_goal_and_second_goal() {
        let err = run_script("goal P\npremise P\n").expect_err("script should fail");
        assert_eq!(err.kind, ScriptErrorKind::MisplacedPremise);

        let err = run_script("goal P\ngoal Q\n").expect_err("script should fail");
        assert_eq!(err.kind, ScriptErrorKind::DuplicateGoal);
    }

    #[test]
    fn rejects_unknown_rule_and_bad_ids() {
        let err = run_script("goal P\nXYZ 1\n").expect_err("script should fail");
        assert!(matches!(err.kind, ScriptErrorKind::UnknownRule(_)));

        let err = run_script("goal P\nMP 1 x\n").expect_err("script should fail");
        assert_eq!(err.kind, ScriptErrorKind::InvalidStepId("x".to_string()));

        let err = run_script("goal P\nDI_LEFT 1 with\n").expect_err("script should fail");
        assert_eq!(err.kind, ScriptErrorKind::MissingFormula("with"));
    }

    #[test]
    fn goal_can_be_stated_without_premises() {
        let report = run_script("goal P -> P\nassume P\nII 1 1\n").expect("script should replay");
        let goal = parse_formula("P -> P").expect("formula should parse");
        assert_eq!(report.state.goal, goal);
        assert!(report.state.is_complete());
    }
}
