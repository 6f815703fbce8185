use crate::core::{DeriveError, LexMode, SourceSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Punct,
    Directive,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: SourceSpan,
}

const PUNCT_CHARS: &[char] = &['(', ')', '[', ']', '{', '}', ';', '+', '*'];

pub fn tokenize(source: &str, mode: LexMode) -> Result<Vec<Token>, DeriveError> {
    let mut lexer = Lexer::new(source, mode);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    mode: LexMode,
    index: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, mode: LexMode) -> Self {
        Self {
            source,
            mode,
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn next_token(&mut self) -> Result<Token, DeriveError> {
        loop {
            self.skip_whitespace();
            let span = self.current_span();

            let Some(ch) = self.peek_char() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span,
                });
            };

            if PUNCT_CHARS.contains(&ch) {
                self.bump_char(ch);
                return Ok(Token {
                    kind: TokenKind::Punct,
                    text: ch.to_string(),
                    span,
                });
            }
            if is_word_char(ch) {
                return Ok(self.lex_word(TokenKind::Word, span));
            }
            if ch == '#' {
                self.bump_char(ch);
                let token = self.lex_word(TokenKind::Directive, span);
                return Ok(Token {
                    text: format!("#{}", token.text),
                    ..token
                });
            }

            match self.mode {
                LexMode::Lenient => self.bump_char(ch),
                LexMode::Strict => return Err(DeriveError::UnexpectedCharacter { ch, span }),
            }
        }
    }

    fn lex_word(&mut self, kind: TokenKind, span: SourceSpan) -> Token {
        let start = self.index;
        while let Some(ch) = self.peek_char() {
            if is_word_char(ch) {
                self.bump_char(ch);
            } else {
                break;
            }
        }
        Token {
            kind,
            text: self.source[start..self.index].to_string(),
            span,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.bump_char(ch);
            } else {
                break;
            }
        }
    }

    fn current_span(&self) -> SourceSpan {
        SourceSpan {
            line: self.line,
            column: self.column,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn bump_char(&mut self, ch: char) {
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
