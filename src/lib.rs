//! Interactive checker for propositional natural-deduction proofs.
//!
//! [`parse_formula`] turns text such as `"(P -> Q) ∧ ~R"` into a [`Formula`];
//! [`apply_rule`] validates one inference step against a [`ProofState`] and
//! returns the extended state.

pub mod cli;
pub mod core;
pub mod formula;
pub mod proof;

use std::fs::File;
use std::io::{self, Read, Write};

use clap::error::ErrorKind;
use serde::Serialize;
use thiserror::Error;

use cli::{Cli, Command, InputSource, OutputFormat};

pub use crate::core::{FormulaError, LexError, ParseError, RuleError, StateError};
pub use formula::{parse_formula, Connective, Formula};
pub use proof::{apply_rule, ProofState, ProofStep, RuleName, StepId};

#[cfg(test)]
const MAX_INPUT_BYTES: usize = 1024;
#[cfg(not(test))]
const MAX_INPUT_BYTES: usize = 8 * 1024 * 1024;

pub fn run<I, S>(
    args: I,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    _stderr: &mut dyn Write,
) -> Result<(), RunError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let cli = match Cli::from_args(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return write!(stdout, "{err}").map_err(|source| io_error(source, "stdout"));
        }
        Err(err) => return Err(RunError::Cli(err)),
    };
    execute(cli, stdin, stdout)
}

fn execute(cli: Cli, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<(), RunError> {
    match cli.command {
        Command::Parse(command) => {
            let formula = formula_arg(&command.formula)?;
            match command.format {
                OutputFormat::Text => print_line(stdout, &formula),
                OutputFormat::Json => print_json(stdout, &formula),
            }
        }
        Command::Start(command) => {
            let premises = command
                .premises
                .iter()
                .map(|text| formula_arg(text))
                .collect::<Result<Vec<_>, _>>()?;
            let goal = formula_arg(&command.goal)?;
            tracing::info!(premises = premises.len(), %goal, "starting proof");
            print_json(stdout, &ProofState::new(premises, goal))
        }
        Command::Assume(command) => {
            let formula = formula_arg(&command.formula)?;
            let state = read_state(&InputSource::from(command.state.as_ref()), stdin)?;
            print_json(stdout, &state.assume(formula)?)
        }
        Command::Apply(command) => {
            let secondary = command
                .secondary
                .as_deref()
                .map(formula_arg)
                .transpose()?;
            let state = read_state(&InputSource::from(command.state.as_ref()), stdin)?;
            let next = apply_rule(&state, command.rule, &command.steps, secondary.as_ref())?;
            print_json(stdout, &next)
        }
        Command::Check(command) => {
            let source = read_source(&InputSource::from(command.script.as_ref()), stdin)?;
            let report = proof::run_script(&source)?;
            tracing::info!(
                steps = report.state.current_steps.len(),
                complete = report.state.is_complete(),
                "replayed proof script"
            );
            match command.format {
                OutputFormat::Text => print_line(stdout, &report),
                OutputFormat::Json => print_json(stdout, &report.state),
            }
        }
    }
}

fn formula_arg(text: &str) -> Result<Formula, RunError> {
    parse_formula(text).map_err(|source| RunError::Formula {
        text: text.to_string(),
        source,
    })
}

fn read_state(input: &InputSource, stdin: &mut dyn Read) -> Result<ProofState, RunError> {
    let source = read_source(input, stdin)?;
    let state: ProofState = serde_json::from_str(&source).map_err(|source| RunError::Json {
        source,
        context: input.to_string(),
    })?;
    state.validate().map_err(|source| RunError::InvalidState {
        source,
        context: input.to_string(),
    })?;
    Ok(state)
}

fn print_line(stdout: &mut dyn Write, value: &dyn std::fmt::Display) -> Result<(), RunError> {
    writeln!(stdout, "{value}").map_err(|source| io_error(source, "stdout"))
}

fn print_json<T: Serialize>(stdout: &mut dyn Write, value: &T) -> Result<(), RunError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| RunError::Json {
        source,
        context: "stdout".to_string(),
    })?;
    writeln!(stdout, "{text}").map_err(|source| io_error(source, "stdout"))
}

fn io_error(source: io::Error, context: &str) -> RunError {
    RunError::Io {
        source,
        context: context.to_string(),
    }
}

fn read_source(input: &InputSource, stdin: &mut dyn Read) -> Result<String, RunError> {
    match input {
        InputSource::Stdin => read_limited_utf8(stdin, "stdin"),
        InputSource::File(path) => {
            let context = path.display().to_string();
            let mut file = File::open(path).map_err(|source| io_error(source, &context))?;
            read_limited_utf8(&mut file, &context)
        }
    }
}

fn read_limited_utf8(reader: &mut dyn Read, context: &str) -> Result<String, RunError> {
    let mut bytes = Vec::new();
    let mut limited_reader = reader.take((MAX_INPUT_BYTES + 1) as u64);
    limited_reader
        .read_to_end(&mut bytes)
        .map_err(|source| io_error(source, context))?;
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(RunError::InputTooLarge {
            context: context.to_string(),
            max_bytes: MAX_INPUT_BYTES,
        });
    }

    String::from_utf8(bytes).map_err(|_| RunError::InvalidUtf8 {
        context: context.to_string(),
    })
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Cli(clap::Error),
    #[error("I/O error ({context}): {source}")]
    Io { source: io::Error, context: String },
    #[error("input too large ({context}): limit is {max_bytes} bytes")]
    InputTooLarge { context: String, max_bytes: usize },
    #[error("input is not valid UTF-8 ({context})")]
    InvalidUtf8 { context: String },
    #[error("JSON error ({context}): {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },
    #[error("invalid proof state ({context}): {source}")]
    InvalidState { source: StateError, context: String },
    #[error("invalid formula '{text}': {source}")]
    Formula { text: String, source: FormulaError },
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Script(#[from] proof::ScriptError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Cli(_) => 2,
            Self::Io { .. } => 1,
            Self::InputTooLarge { .. } => 1,
            Self::InvalidUtf8 { .. } => 1,
            Self::Json { .. } => 1,
            Self::InvalidState { .. } => 1,
            Self::Formula { .. } => 1,
            Self::Rule(_) => 1,
            Self::Script(_) => 1,
        }
    }
}
