use std::path::PathBuf;

use thiserror::Error;

use crate::core::LexMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
}

impl Cli {
    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = args.into_iter().map(Into::into);
        let program = iter.next().unwrap_or_else(|| "nat-deriv".to_string());
        let Some(subcommand) = iter.next() else {
            return Err(CliError::missing_subcommand(program));
        };

        let rest: Vec<String> = iter.collect();
        match subcommand.as_str() {
            "prove" => parse_prove(program, rest),
            "repl" => parse_repl(program, rest),
            _ => Err(CliError::unknown_subcommand(program, subcommand)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prove(ProveCommand),
    Repl(ReplCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProveCommand {
    pub mode: LexMode,
    pub input: InputSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplCommand {
    pub mode: LexMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

fn parse_prove(program: String, args: Vec<String>) -> Result<Cli, CliError> {
    let mut mode = None;
    let mut input = None;
    let mut options_done = false;

    for (index, token) in args.iter().enumerate() {
        if !options_done && token.as_str() == "--" {
            options_done = true;
            continue;
        }
        if !options_done {
            if parse_mode_option(&program, &mut mode, token)? {
                continue;
            }
            if token.starts_with('-') {
                return Err(CliError::unexpected_option(program, token.clone()));
            }
        }
        if input.is_some() {
            return Err(CliError::too_many_inputs(program, args[index..].to_vec()));
        }
        input = Some(InputSource::File(PathBuf::from(token)));
    }

    Ok(Cli {
        command: Command::Prove(ProveCommand {
            mode: mode.unwrap_or_default(),
            input: input.unwrap_or(InputSource::Stdin),
        }),
    })
}

fn parse_repl(program: String, args: Vec<String>) -> Result<Cli, CliError> {
    let mut mode = None;

    for token in &args {
        if parse_mode_option(&program, &mut mode, token)? {
            continue;
        }
        return Err(CliError::unexpected_option(program, token.clone()));
    }

    Ok(Cli {
        command: Command::Repl(ReplCommand {
            mode: mode.unwrap_or_default(),
        }),
    })
}

/// `Ok(true)` when the token was one of the mode flags.
fn parse_mode_option(
    program: &str,
    mode: &mut Option<LexMode>,
    token: &str,
) -> Result<bool, CliError> {
    let parsed = match token {
        "--strict" => LexMode::Strict,
        "--lenient" => LexMode::Lenient,
        _ => return Ok(false),
    };
    if mode.is_some() {
        return Err(CliError::conflicting_modes(program.to_owned()));
    }
    *mode = Some(parsed);
    Ok(true)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}\n{usage}")]
pub struct CliError {
    kind: CliErrorKind,
    usage: String,
}

impl CliError {
    fn missing_subcommand(program: String) -> Self {
        Self {
            usage: usage_for(&program),
            kind: CliErrorKind::MissingSubcommand,
        }
    }

    fn unknown_subcommand(program: String, subcommand: String) -> Self {
        Self {
            usage: usage_for(&program),
            kind: CliErrorKind::UnknownSubcommand { subcommand },
        }
    }

    fn unexpected_option(program: String, option: String) -> Self {
        Self {
            usage: usage_for(&program),
            kind: CliErrorKind::UnexpectedOption { option },
        }
    }

    fn conflicting_modes(program: String) -> Self {
        Self {
            usage: usage_for(&program),
            kind: CliErrorKind::ConflictingModes,
        }
    }

    fn too_many_inputs(program: String, inputs: Vec<String>) -> Self {
        Self {
            usage: usage_for(&program),
            kind: CliErrorKind::TooManyInputs { inputs },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum CliErrorKind {
    #[error("missing subcommand")]
    MissingSubcommand,
    #[error("unknown subcommand: {subcommand}")]
    UnknownSubcommand { subcommand: String },
    #[error("unexpected option: {option}")]
    UnexpectedOption { option: String },
    #[error("--strict and --lenient may be given at most once")]
    ConflictingModes,
    #[error("too many input files: {}", inputs.join(" "))]
    TooManyInputs { inputs: Vec<String> },
}

fn usage_for(program: &str) -> String {
    format!(
        "Usage:\n  {program} prove [--strict | --lenient] [file]\n  {program} repl [--strict | --lenient]"
    )
}
