pub mod syntax;

mod lexer;
mod parser;
mod prover;
mod rules;

use crate::core::{DeriveError, LexMode};

use self::syntax::Derivation;

/// Derives one source line end to end: lex, parse, prove.
pub fn derive(source: &str, mode: LexMode) -> Result<Derivation, DeriveError> {
    let tokens = lexer::tokenize(source, mode)?;
    let (strategy, judgment, origin) = parser::parse_judgment(tokens)?;
    prover::prove(judgment, strategy, origin)
}
