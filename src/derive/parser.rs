use crate::core::{DeriveError, SourceSpan};

use super::lexer::{Token, TokenKind};
use super::syntax::{Expr, Factor, Judgment, Nat, Strategy, Term};

/// Caps `S(`-nesting of numerals and parenthesis nesting of expressions.
/// Terms built from parsed input therefore stay shallow enough for the
/// recursive clone and drop of the tree types.
const MAX_NESTING: usize = 1024;

/// Parses one judgment, optionally preceded by a `#CompareNatN` directive.
/// Also returns the span of the judgment's first token.
///
/// The three judgment alternatives are tried in the fixed order nat
/// relation, inequality, evaluation, each from its own cursor snapshot.
/// Failures inside a committed alternative (a missing `)`, a missing `is`)
/// abort instead of falling through to the next alternative.
pub(super) fn parse_judgment(
    tokens: Vec<Token>,
) -> Result<(Option<Strategy>, Judgment, SourceSpan), DeriveError> {
    let mut parser = Parser::new(tokens);
    if parser.at_eof() {
        return Err(DeriveError::UnexpectedEndOfInput);
    }

    let strategy = parser.parse_directive()?;
    let origin = parser.peek().span.clone();
    let judgment = parser.parse_any_judgment(&origin)?;
    parser.expect_eof()?;
    Ok((strategy, judgment, origin))
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    paren_depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            paren_depth: 0,
        }
    }

    fn parse_directive(&mut self) -> Result<Option<Strategy>, DeriveError> {
        let token = self.peek();
        if token.kind != TokenKind::Directive {
            return Ok(None);
        }
        let Some(strategy) = Strategy::from_directive(&token.text) else {
            return Err(self.unexpected());
        };
        self.bump();
        Ok(Some(strategy))
    }

    fn parse_any_judgment(&mut self, origin: &SourceSpan) -> Result<Judgment, DeriveError> {
        if let Some(judgment) = self.parse_nat_relation_opt()? {
            return Ok(judgment);
        }
        if let Some(judgment) = self.parse_inequality_opt()? {
            return Ok(judgment);
        }
        if let Some(judgment) = self.parse_evaluation_opt()? {
            return Ok(judgment);
        }
        Err(DeriveError::UnrecognizedJudgmentShape {
            span: origin.clone(),
        })
    }

    // NatRelation := Nat ('plus' | 'times') Nat 'is' Nat
    fn parse_nat_relation_opt(&mut self) -> Result<Option<Judgment>, DeriveError> {
        let saved = self.save();
        let Some(left) = self.parse_nat_opt()? else {
            self.restore(saved);
            return Ok(None);
        };

        let is_plus = match self.peek().text.as_str() {
            "plus" => true,
            "times" => false,
            _ => {
                self.restore(saved);
                return Ok(None);
            }
        };
        self.bump();

        let right = self.parse_nat()?;
        self.expect_text("is")?;
        let result = self.parse_nat()?;

        Ok(Some(if is_plus {
            Judgment::PlusIs {
                left,
                right,
                result,
            }
        } else {
            Judgment::TimesIs {
                left,
                right,
                result,
            }
        }))
    }

    // Inequality := Nat 'is' 'less' 'than' Nat
    fn parse_inequality_opt(&mut self) -> Result<Option<Judgment>, DeriveError> {
        let saved = self.save();
        let Some(left) = self.parse_nat_opt()? else {
            self.restore(saved);
            return Ok(None);
        };
        if !self.consume_text("is") || !self.consume_text("less") {
            self.restore(saved);
            return Ok(None);
        }
        self.expect_text("than")?;
        let right = self.parse_nat()?;
        Ok(Some(Judgment::LessThan { left, right }))
    }

    // Evaluation := Expr 'evalto' Nat
    fn parse_evaluation_opt(&mut self) -> Result<Option<Judgment>, DeriveError> {
        let saved = self.save();
        let Some(expr) = self.parse_expr_opt()? else {
            self.restore(saved);
            return Ok(None);
        };
        if !self.consume_text("evalto") {
            self.restore(saved);
            return Ok(None);
        }
        let value = self.parse_nat()?;
        Ok(Some(Judgment::EvalTo { expr, value }))
    }

    // Expr := Term { '+' Term }
    fn parse_expr_opt(&mut self) -> Result<Option<Expr>, DeriveError> {
        let Some(term) = self.parse_term_opt()? else {
            return Ok(None);
        };
        let mut terms = vec![term];
        while self.consume_text("+") {
            let Some(term) = self.parse_term_opt()? else {
                return Err(self.unexpected());
            };
            terms.push(term);
        }
        Ok(Some(Expr { terms }))
    }

    // Term := Factor { '*' Factor }
    fn parse_term_opt(&mut self) -> Result<Option<Term>, DeriveError> {
        let Some(factor) = self.parse_factor_opt()? else {
            return Ok(None);
        };
        let mut factors = vec![factor];
        while self.consume_text("*") {
            let Some(factor) = self.parse_factor_opt()? else {
                return Err(self.unexpected());
            };
            factors.push(factor);
        }
        Ok(Some(Term { factors }))
    }

    // Factor := '(' Expr ')' | Nat
    fn parse_factor_opt(&mut self) -> Result<Option<Factor>, DeriveError> {
        let span = self.peek().span.clone();
        if self.consume_text("(") {
            self.paren_depth += 1;
            if self.paren_depth > MAX_NESTING {
                return Err(DeriveError::NestingTooDeep {
                    limit: MAX_NESTING,
                    span,
                });
            }
            let Some(expr) = self.parse_expr_opt()? else {
                return Err(self.unexpected());
            };
            self.expect_text(")")?;
            self.paren_depth -= 1;
            return Ok(Some(Factor::Paren(expr)));
        }
        Ok(self.parse_nat_opt()?.map(Factor::Nat))
    }

    // Nat := 'Z' | 'S' '(' Nat ')'
    //
    // The `S(` prefix is consumed by a loop rather than by recursion, so a
    // deep numeral costs no stack, and the nesting cap rejects it before
    // the value is built.
    fn parse_nat_opt(&mut self) -> Result<Option<Nat>, DeriveError> {
        if self.consume_text("Z") {
            return Ok(Some(Nat::Z));
        }
        let mut depth: u64 = 0;
        loop {
            let span = self.peek().span.clone();
            if !self.consume_text("S") {
                break;
            }
            self.expect_text("(")?;
            depth += 1;
            if depth as usize > MAX_NESTING {
                return Err(DeriveError::NestingTooDeep {
                    limit: MAX_NESTING,
                    span,
                });
            }
        }
        if depth == 0 {
            return Ok(None);
        }
        self.expect_text("Z")?;
        for _ in 0..depth {
            self.expect_text(")")?;
        }
        Ok(Some(Nat::from_value(depth)))
    }

    fn parse_nat(&mut self) -> Result<Nat, DeriveError> {
        match self.parse_nat_opt()? {
            Some(nat) => Ok(nat),
            None => Err(self.unexpected()),
        }
    }

    fn expect_text(&mut self, expected: &str) -> Result<(), DeriveError> {
        if self.at_eof() {
            return Err(DeriveError::UnexpectedEndOfInput);
        }
        let token = self.peek();
        if token.text != expected {
            return Err(DeriveError::ExpectedToken {
                expected: expected.to_string(),
                found: token.text.clone(),
                span: token.span.clone(),
            });
        }
        self.bump();
        Ok(())
    }

    fn expect_eof(&self) -> Result<(), DeriveError> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn consume_text(&mut self, text: &str) -> bool {
        if !self.at_eof() && self.peek().text == text {
            self.bump();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> DeriveError {
        if self.at_eof() {
            return DeriveError::UnexpectedEndOfInput;
        }
        let token = self.peek();
        DeriveError::UnexpectedToken {
            text: token.text.clone(),
            span: token.span.clone(),
        }
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn save(&self) -> usize {
        self.index
    }

    fn restore(&mut self, saved: usize) {
        self.index = saved;
    }

    fn bump(&mut self) {
        if !self.at_eof() {
            self.index += 1;
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::parse_judgment;
    use crate::core::{DeriveError, LexMode, SourceSpan};
    use crate::derive::lexer::tokenize;
    use crate::derive::syntax::{Judgment, Nat, Strategy};

    fn parse(source: &str) -> Result<(Option<Strategy>, Judgment), DeriveError> {
        parse_judgment(tokenize(source, LexMode::Lenient).expect("tokenize should succeed"))
            .map(|(strategy, judgment, _)| (strategy, judgment))
    }

    fn z() -> Nat {
        Nat::Z
    }

    fn s(inner: Nat) -> Nat {
        Nat::S(Box::new(inner))
    }

    #[test]
    fn parses_plus_judgment() {
        let (strategy, judgment) = parse("S(Z) plus Z is S(Z)").expect("judgment should parse");
        assert_eq!(strategy, None);
        assert_eq!(
            judgment,
            Judgment::PlusIs {
                left: s(z()),
                right: z(),
                result: s(z()),
            }
        );
    }

    #[test]
    fn parses_times_judgment() {
        let (_, judgment) = parse("Z times S(S(Z)) is Z").expect("judgment should parse");
        assert_eq!(
            judgment,
            Judgment::TimesIs {
                left: z(),
                right: s(s(z())),
                result: z(),
            }
        );
    }

    #[test]
    fn backtracks_from_nat_relation_to_inequality() {
        let (_, judgment) = parse("Z is less than S(Z)").expect("judgment should parse");
        assert_eq!(
            judgment,
            Judgment::LessThan {
                left: z(),
                right: s(z()),
            }
        );
    }

    #[test]
    fn parses_directive_before_inequality() {
        let (strategy, judgment) =
            parse("#CompareNat3 Z is less than S(Z)").expect("judgment should parse");
        assert_eq!(strategy, Some(Strategy::CompareNat3));
        assert!(matches!(judgment, Judgment::LessThan { .. }));
    }

    #[test]
    fn parses_evaluation_with_nested_expression() {
        let (_, judgment) =
            parse("Z * (S(Z) + Z) + S(Z) evalto S(Z)").expect("judgment should parse");
        let Judgment::EvalTo { expr, value } = judgment else {
            panic!("expected an evaluation judgment");
        };
        assert_eq!(expr.to_string(), "Z * (S(Z) + Z) + S(Z)");
        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.terms[0].factors.len(), 2);
        assert_eq!(value, s(z()));
    }

    #[test]
    fn rejects_unknown_directive() {
        let err = parse("#CompareNat9 Z is less than S(Z)").expect_err("parse should fail");
        assert!(matches!(err, DeriveError::UnexpectedToken { text, .. } if text == "#CompareNat9"));
    }

    #[test]
    fn rejects_missing_closing_paren() {
        let err = parse("S(Z plus Z is Z").expect_err("parse should fail");
        assert_eq!(
            err.to_string(),
            "expected ')' but found 'plus' at 1:5"
        );
    }

    #[test]
    fn rejects_truncated_input_with_end_of_input_error() {
        let err = parse("Z is less than").expect_err("parse should fail");
        assert_eq!(err, DeriveError::UnexpectedEndOfInput);
        assert_eq!(parse("").expect_err("parse should fail"), DeriveError::UnexpectedEndOfInput);
    }

    #[test]
    fn rejects_trailing_tokens_after_judgment() {
        let err = parse("Z plus Z is Z extra").expect_err("parse should fail");
        assert!(matches!(err, DeriveError::UnexpectedToken { text, .. } if text == "extra"));
    }

    #[test]
    fn rejects_bare_expression_as_unrecognized_shape() {
        let err = parse("Z + S(Z)").expect_err("parse should fail");
        assert_eq!(
            err,
            DeriveError::UnrecognizedJudgmentShape {
                span: SourceSpan { line: 1, column: 1 },
            }
        );
    }

    #[test]
    fn reports_the_judgment_start_even_after_a_directive() {
        let err = parse("#CompareNat1 what now").expect_err("parse should fail");
        assert_eq!(
            err,
            DeriveError::UnrecognizedJudgmentShape {
                span: SourceSpan {
                    line: 1,
                    column: 14,
                },
            }
        );
    }

    #[test]
    fn returns_the_span_of_the_judgment_first_token() {
        let tokens =
            tokenize("  S(Z) plus Z is S(Z)", LexMode::Lenient).expect("tokenize should succeed");
        let (_, _, origin) = parse_judgment(tokens).expect("judgment should parse");
        assert_eq!(origin, SourceSpan { line: 1, column: 3 });
    }

    #[test]
    fn parses_a_numeral_at_the_nesting_limit() {
        let big = format!("{}Z{}", "S(".repeat(1024), ")".repeat(1024));
        let (_, judgment) =
            parse(&format!("Z plus {big} is {big}")).expect("judgment should parse");
        let Judgment::PlusIs { right, .. } = judgment else {
            panic!("expected a plus judgment");
        };
        assert_eq!(right.value(), 1024);
    }

    #[test]
    fn rejects_a_numeral_nested_past_the_limit() {
        let big = format!("{}Z{}", "S(".repeat(1025), ")".repeat(1025));
        let err = parse(&format!("Z plus {big} is Z")).expect_err("parse should fail");
        assert!(matches!(err, DeriveError::NestingTooDeep { limit: 1024, .. }));
    }

    #[test]
    fn rejects_parentheses_nested_past_the_limit() {
        let source = format!("{}Z{} evalto Z", "(".repeat(1025), ")".repeat(1025));
        let err = parse(&source).expect_err("parse should fail");
        assert!(matches!(err, DeriveError::NestingTooDeep { limit: 1024, .. }));
    }
}
