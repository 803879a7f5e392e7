use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::proof::{ParseRuleNameError, RuleName, StepId};

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "natded",
    version,
    about = "Check propositional natural-deduction proofs one rule at a time"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn from_args<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_parse_from(args.into_iter().map(Into::<String>::into))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Parse a formula and print it in canonical form.
    Parse(ParseCommand),
    /// Create a proof state from premises and a goal.
    Start(StartCommand),
    /// Open an assumption in a proof state.
    Assume(AssumeCommand),
    /// Apply an inference rule to a proof state.
    Apply(ApplyCommand),
    /// Replay a proof script and report whether the goal is reached.
    Check(CheckCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ParseCommand {
    pub formula: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct StartCommand {
    #[arg(long = "premise", value_name = "FORMULA")]
    pub premises: Vec<String>,
    #[arg(long, value_name = "FORMULA")]
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct AssumeCommand {
    pub formula: String,
    /// Proof state JSON; read from stdin when omitted.
    pub state: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ApplyCommand {
    #[arg(long, value_parser = parse_rule_name)]
    pub rule: RuleName,
    #[arg(long = "step", value_name = "ID", value_delimiter = ',')]
    pub steps: Vec<StepId>,
    /// Secondary formula for DI_LEFT / DI_RIGHT.
    #[arg(long = "with", value_name = "FORMULA")]
    pub secondary: Option<String>,
    /// Proof state JSON; read from stdin when omitted.
    pub state: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct CheckCommand {
    /// Proof script; read from stdin when omitted.
    pub script: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl From<Option<&PathBuf>> for InputSource {
    fn from(path: Option<&PathBuf>) -> Self {
        path.map_or(Self::Stdin, |path| Self::File(path.clone()))
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn parse_rule_name(value: &str) -> Result<RuleName, ParseRuleNameError> {
    RuleName::try_from(value)
}
