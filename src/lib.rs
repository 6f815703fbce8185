pub mod cli;
pub mod core;
pub mod derive;
pub mod repl;

use std::fs::File;
use std::io::{self, Read, Write};

use thiserror::Error;

use cli::{Cli, Command, InputSource};

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
    let cli = Cli::parse(args)?;
    execute(cli, stdin, stdout)
}

fn execute(cli: Cli, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<(), RunError> {
    match cli.command {
        Command::Prove(command) => {
            let source = read_source(&command.input, stdin)?;
            for line in source.lines().filter(|line| !line.trim().is_empty()) {
                let derivation = derive::derive(line, command.mode)?;
                writeln!(stdout, "{derivation}").map_err(|source| RunError::Io {
                    source,
                    context: "stdout".to_string(),
                })?;
            }
            Ok(())
        }
        Command::Repl(command) => Ok(repl::start(command.mode)?),
    }
}

fn read_source(input: &InputSource, stdin: &mut dyn Read) -> Result<String, RunError> {
    match input {
        InputSource::Stdin => read_limited_utf8(stdin, "stdin"),
        InputSource::File(path) => {
            let context = path.display().to_string();
            let mut file = File::open(path).map_err(|source| RunError::Io {
                source,
                context: context.clone(),
            })?;
            read_limited_utf8(&mut file, &context)
        }
    }
}

fn read_limited_utf8(reader: &mut dyn Read, context: &str) -> Result<String, RunError> {
    let mut bytes = Vec::new();
    let mut limited_reader = reader.take((MAX_INPUT_BYTES + 1) as u64);
    limited_reader
        .read_to_end(&mut bytes)
        .map_err(|source| RunError::Io {
            source,
            context: context.to_string(),
        })?;
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
    #[error(transparent)]
    Cli(#[from] cli::CliError),
    #[error("I/O error ({context}): {source}")]
    Io { source: io::Error, context: String },
    #[error("input too large ({context}): limit is {max_bytes} bytes")]
    InputTooLarge { context: String, max_bytes: usize },
    #[error("input is not valid UTF-8 ({context})")]
    InvalidUtf8 { context: String },
    #[error(transparent)]
    Derive(#[from] crate::core::DeriveError),
    #[error(transparent)]
    Repl(#[from] repl::ReplError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Cli(_) => 2,
            _ => 1,
        }
    }
}
