use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

use crate::core::LexMode;
use crate::derive;

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

/// Reads judgments line by line and prints their derivations. A failed
/// derivation is reported and the loop continues; Ctrl-C or Ctrl-D ends the
/// session.
pub fn start(mode: LexMode) -> Result<(), ReplError> {
    let mut editor = Editor::<()>::new();
    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str());
                match derive::derive(&line, mode) {
                    Ok(derivation) => println!("{derivation}"),
                    Err(err) => eprintln!("{err}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(err) => break Err(ReplError::Readline(err)),
        }
    }
}
