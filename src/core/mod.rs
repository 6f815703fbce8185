use std::fmt;

use thiserror::Error;

/// How the lexer treats characters that match no token rule.
///
/// `Lenient` silently drops them, which tolerates stray punctuation in
/// hand-written input; `Strict` turns the same characters into positioned
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unexpected token '{text}' at {span}")]
    UnexpectedToken { text: String, span: SourceSpan },
    #[error("expected '{expected}' but found '{found}' at {span}")]
    ExpectedToken {
        expected: String,
        found: String,
        span: SourceSpan,
    },
    #[error("the input at {span} does not match any judgment form")]
    UnrecognizedJudgmentShape { span: SourceSpan },
    #[error("no inference rule applies to the judgment at {span}: {judgment}")]
    IllFormedRule { judgment: String, span: SourceSpan },
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedCharacter { ch: char, span: SourceSpan },
    #[error("nesting exceeds the depth limit of {limit} at {span}")]
    NestingTooDeep { limit: usize, span: SourceSpan },
    #[error("derivation exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl DeriveError {
    pub fn span(&self) -> Option<&SourceSpan> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::ExpectedToken { span, .. }
            | Self::UnrecognizedJudgmentShape { span }
            | Self::IllFormedRule { span, .. }
            | Self::UnexpectedCharacter { span, .. }
            | Self::NestingTooDeep { span, .. } => Some(span),
            _ => None,
        }
    }
}
