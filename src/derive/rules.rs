use crate::core::{DeriveError, SourceSpan};

use super::syntax::{Expr, Factor, Judgment, Nat, Strategy, Term};

/// Order in which the inequality families are attempted when no directive
/// chose one. This order is part of the output contract.
const DEFAULT_STRATEGY_ORDER: [Strategy; 3] = [
    Strategy::CompareNat1,
    Strategy::CompareNat2,
    Strategy::CompareNat3,
];

/// One inference rule instance, holding exactly the operands its conclusion
/// and premises are built from. Successor operands are stored unwrapped, the
/// way each rule's premises consume them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Rule {
    /// Z plus n is n
    PZero { n: Nat },
    /// S(n1) plus n2 is S(n); stores n1, n2, n
    PSucc { left: Nat, right: Nat, result: Nat },
    /// Z times n is Z
    TZero { n: Nat },
    /// S(n1) times n2 is n4; stores n1, n2, n4
    TSucc { left: Nat, right: Nat, result: Nat },
    /// n is less than S(n)
    LSucc { n: Nat },
    /// n1 is less than n3 via n2 = S(n1)
    LTrans { left: Nat, right: Nat },
    /// Z is less than n
    LZero { right: Nat },
    /// S(n1) is less than S(n2); stores n1, n2
    LSuccSucc { left: Nat, right: Nat },
    /// n1 is less than S(n2); stores n1, n2
    LSuccR { left: Nat, right: Nat },
    /// n evalto n
    EConst { n: Nat },
    /// t1 + ... + tk evalto n, split as (t1 + ... + t(k-1)) and tk
    EPlus { expr: Expr, value: Nat },
    /// f1 * ... * fk evalto n, split as (f1 * ... * f(k-1)) and fk
    ETimes { term: Term, value: Nat },
}

impl Rule {
    /// Picks the rule concluding `judgment`, or fails with `IllFormedRule`
    /// positioned at `origin`, the source span the judgment came from.
    ///
    /// The operand values must actually satisfy the judgment before any rule
    /// is emitted; an arithmetically false judgment never selects.
    pub(super) fn select(
        judgment: &Judgment,
        strategy: Option<Strategy>,
        origin: &SourceSpan,
    ) -> Result<Self, DeriveError> {
        match judgment {
            Judgment::PlusIs {
                left,
                right,
                result,
            } => {
                if left.value() + right.value() != result.value() {
                    return Err(ill_formed(judgment, origin));
                }
                match left {
                    Nat::Z => Ok(Self::PZero { n: right.clone() }),
                    Nat::S(left_inner) => {
                        let Nat::S(result_inner) = result else {
                            return Err(ill_formed(judgment, origin));
                        };
                        Ok(Self::PSucc {
                            left: left_inner.as_ref().clone(),
                            right: right.clone(),
                            result: result_inner.as_ref().clone(),
                        })
                    }
                }
            }
            Judgment::TimesIs {
                left,
                right,
                result,
            } => {
                if left.value() * right.value() != result.value() {
                    return Err(ill_formed(judgment, origin));
                }
                match left {
                    Nat::Z => Ok(Self::TZero { n: right.clone() }),
                    Nat::S(left_inner) => Ok(Self::TSucc {
                        left: left_inner.as_ref().clone(),
                        right: right.clone(),
                        result: result.clone(),
                    }),
                }
            }
            Judgment::LessThan { left, right } => {
                if left.value() >= right.value() {
                    return Err(ill_formed(judgment, origin));
                }
                match strategy {
                    Some(strategy) => select_less_than(left, right, strategy)
                        .ok_or_else(|| ill_formed(judgment, origin)),
                    None => DEFAULT_STRATEGY_ORDER
                        .iter()
                        .find_map(|strategy| select_less_than(left, right, *strategy))
                        .ok_or_else(|| ill_formed(judgment, origin)),
                }
            }
            Judgment::EvalTo { expr, value } => {
                if expr.value() != value.value() {
                    return Err(ill_formed(judgment, origin));
                }
                if expr.split_last().is_some() {
                    return Ok(Self::EPlus {
                        expr: expr.clone(),
                        value: value.clone(),
                    });
                }
                let term = expr
                    .as_single_term()
                    .expect("a non-empty expression without a last split is a single term");
                if term.split_last().is_some() {
                    return Ok(Self::ETimes {
                        term: term.clone(),
                        value: value.clone(),
                    });
                }
                match &term.factors[0] {
                    Factor::Nat(n) => Ok(Self::EConst { n: n.clone() }),
                    // A lone parenthesized expression proves as the inner
                    // expression's own evaluation judgment.
                    Factor::Paren(inner) => Self::select(
                        &Judgment::EvalTo {
                            expr: inner.clone(),
                            value: value.clone(),
                        },
                        strategy,
                        origin,
                    ),
                }
            }
        }
    }

    pub(super) const fn label(&self) -> &'static str {
        match self {
            Self::PZero { .. } => "P-Zero",
            Self::PSucc { .. } => "P-Succ",
            Self::TZero { .. } => "T-Zero",
            Self::TSucc { .. } => "T-Succ",
            Self::LSucc { .. } => "L-Succ",
            Self::LTrans { .. } => "L-Trans",
            Self::LZero { .. } => "L-Zero",
            Self::LSuccSucc { .. } => "L-SuccSucc",
            Self::LSuccR { .. } => "L-SuccR",
            Self::EConst { .. } => "E-Const",
            Self::EPlus { .. } => "E-Plus",
            Self::ETimes { .. } => "E-Times",
        }
    }

    pub(super) fn conclusion(&self) -> Judgment {
        match self {
            Self::PZero { n } => Judgment::PlusIs {
                left: Nat::Z,
                right: n.clone(),
                result: n.clone(),
            },
            Self::PSucc {
                left,
                right,
                result,
            } => Judgment::PlusIs {
                left: left.clone().succ(),
                right: right.clone(),
                result: result.clone().succ(),
            },
            Self::TZero { n } => Judgment::TimesIs {
                left: Nat::Z,
                right: n.clone(),
                result: Nat::Z,
            },
            Self::TSucc {
                left,
                right,
                result,
            } => Judgment::TimesIs {
                left: left.clone().succ(),
                right: right.clone(),
                result: result.clone(),
            },
            Self::LSucc { n } => Judgment::LessThan {
                left: n.clone(),
                right: n.clone().succ(),
            },
            Self::LTrans { left, right } => Judgment::LessThan {
                left: left.clone(),
                right: right.clone(),
            },
            Self::LZero { right } => Judgment::LessThan {
                left: Nat::Z,
                right: right.clone(),
            },
            Self::LSuccSucc { left, right } => Judgment::LessThan {
                left: left.clone().succ(),
                right: right.clone().succ(),
            },
            Self::LSuccR { left, right } => Judgment::LessThan {
                left: left.clone(),
                right: right.clone().succ(),
            },
            Self::EConst { n } => Judgment::EvalTo {
                expr: Expr::single(Term::single(Factor::Nat(n.clone()))),
                value: n.clone(),
            },
            Self::EPlus { expr, value } => Judgment::EvalTo {
                expr: expr.clone(),
                value: value.clone(),
            },
            Self::ETimes { term, value } => Judgment::EvalTo {
                expr: Expr::single(term.clone()),
                value: value.clone(),
            },
        }
    }

    pub(super) fn premises(&self) -> Vec<Judgment> {
        match self {
            Self::PZero { .. }
            | Self::TZero { .. }
            | Self::LSucc { .. }
            | Self::LZero { .. }
            | Self::EConst { .. } => Vec::new(),
            Self::PSucc {
                left,
                right,
                result,
            } => vec![Judgment::PlusIs {
                left: left.clone(),
                right: right.clone(),
                result: result.clone(),
            }],
            Self::TSucc {
                left,
                right,
                result,
            } => {
                let middle = Nat::from_value(left.value() * right.value());
                vec![
                    Judgment::TimesIs {
                        left: left.clone(),
                        right: right.clone(),
                        result: middle.clone(),
                    },
                    Judgment::PlusIs {
                        left: right.clone(),
                        right: middle,
                        result: result.clone(),
                    },
                ]
            }
            Self::LTrans { left, right } => {
                let middle = left.clone().succ();
                vec![
                    Judgment::LessThan {
                        left: left.clone(),
                        right: middle.clone(),
                    },
                    Judgment::LessThan {
                        left: middle,
                        right: right.clone(),
                    },
                ]
            }
            Self::LSuccSucc { left, right } => vec![Judgment::LessThan {
                left: left.clone(),
                right: right.clone(),
            }],
            Self::LSuccR { left, right } => vec![Judgment::LessThan {
                left: left.clone(),
                right: right.clone(),
            }],
            Self::EPlus { expr, value } => {
                let (init, last) = expr
                    .split_last()
                    .expect("an E-Plus rule holds a sum of at least two terms");
                let first = Nat::from_value(init.value());
                let second = Nat::from_value(last.value());
                vec![
                    Judgment::EvalTo {
                        expr: init,
                        value: first.clone(),
                    },
                    Judgment::EvalTo {
                        expr: Expr::single(last),
                        value: second.clone(),
                    },
                    Judgment::PlusIs {
                        left: first,
                        right: second,
                        result: value.clone(),
                    },
                ]
            }
            Self::ETimes { term, value } => {
                let (init, last) = term
                    .split_last()
                    .expect("an E-Times rule holds a product of at least two factors");
                let first = Nat::from_value(init.value());
                let second = Nat::from_value(last.value());
                vec![
                    Judgment::EvalTo {
                        expr: Expr::single(init),
                        value: first.clone(),
                    },
                    Judgment::EvalTo {
                        expr: Expr::single(Term::single(last)),
                        value: second.clone(),
                    },
                    Judgment::TimesIs {
                        left: first,
                        right: second,
                        result: value.clone(),
                    },
                ]
            }
        }
    }
}

fn select_less_than(left: &Nat, right: &Nat, strategy: Strategy) -> Option<Rule> {
    match strategy {
        Strategy::CompareNat1 => {
            if left.value() + 1 == right.value() {
                Some(Rule::LSucc { n: left.clone() })
            } else {
                Some(Rule::LTrans {
                    left: left.clone(),
                    right: right.clone(),
                })
            }
        }
        Strategy::CompareNat2 => match (left, right) {
            (Nat::Z, Nat::S(_)) => Some(Rule::LZero {
                right: right.clone(),
            }),
            (Nat::S(left_inner), Nat::S(right_inner)) => Some(Rule::LSuccSucc {
                left: left_inner.as_ref().clone(),
                right: right_inner.as_ref().clone(),
            }),
            _ => None,
        },
        Strategy::CompareNat3 => {
            if left.value() + 1 == right.value() {
                return Some(Rule::LSucc { n: left.clone() });
            }
            match right {
                Nat::S(right_inner) => Some(Rule::LSuccR {
                    left: left.clone(),
                    right: right_inner.as_ref().clone(),
                }),
                Nat::Z => None,
            }
        }
    }
}

fn ill_formed(judgment: &Judgment, origin: &SourceSpan) -> DeriveError {
    DeriveError::IllFormedRule {
        judgment: judgment.to_string(),
        span: origin.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::Rule;
    use crate::core::{DeriveError, SourceSpan};
    use crate::derive::syntax::{Expr, Factor, Judgment, Nat, Strategy, Term};

    fn select(judgment: &Judgment, strategy: Option<Strategy>) -> Result<Rule, DeriveError> {
        Rule::select(judgment, strategy, &SourceSpan { line: 1, column: 1 })
    }

    fn z() -> Nat {
        Nat::Z
    }

    fn s(inner: Nat) -> Nat {
        Nat::S(Box::new(inner))
    }

    fn less_than(left: Nat, right: Nat) -> Judgment {
        Judgment::LessThan { left, right }
    }

    #[test]
    fn selects_p_zero_only_when_right_equals_result() {
        let rule = select(
            &Judgment::PlusIs {
                left: z(),
                right: s(z()),
                result: s(z()),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "P-Zero");
        assert!(rule.premises().is_empty());

        let err = select(
            &Judgment::PlusIs {
                left: z(),
                right: s(z()),
                result: z(),
            },
            None,
        )
        .expect_err("unsound judgment should be rejected");
        assert_eq!(
            err,
            DeriveError::IllFormedRule {
                judgment: "Z plus S(Z) is Z".to_string(),
                span: SourceSpan { line: 1, column: 1 },
            }
        );
    }

    #[test]
    fn p_succ_premise_strips_one_successor_from_both_sides() {
        let rule = select(
            &Judgment::PlusIs {
                left: s(s(z())),
                right: s(z()),
                result: s(s(s(z()))),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "P-Succ");
        assert_eq!(
            rule.premises(),
            vec![Judgment::PlusIs {
                left: s(z()),
                right: s(z()),
                result: s(s(z())),
            }]
        );
        assert_eq!(rule.conclusion().to_string(), "S(S(Z)) plus S(Z) is S(S(S(Z)))");
    }

    #[test]
    fn t_succ_synthesizes_the_intermediate_product() {
        let rule = select(
            &Judgment::TimesIs {
                left: s(s(z())),
                right: s(s(z())),
                result: s(s(s(s(z())))),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "T-Succ");
        let premises = rule.premises();
        assert_eq!(premises.len(), 2);
        assert_eq!(premises[0].to_string(), "S(Z) times S(S(Z)) is S(S(Z))");
        assert_eq!(
            premises[1].to_string(),
            "S(S(Z)) plus S(S(Z)) is S(S(S(S(Z))))"
        );
    }

    #[test]
    fn rejects_unsound_times_judgment() {
        let err = select(
            &Judgment::TimesIs {
                left: s(z()),
                right: s(z()),
                result: z(),
            },
            None,
        )
        .expect_err("unsound judgment should be rejected");
        assert!(matches!(err, DeriveError::IllFormedRule { .. }));
    }

    #[test]
    fn default_inequality_order_starts_with_the_transitive_family() {
        let rule = select(&less_than(z(), s(s(z()))), None).expect("rule should select");
        assert_eq!(rule.label(), "L-Trans");

        let rule = select(&less_than(z(), s(z())), None).expect("rule should select");
        assert_eq!(rule.label(), "L-Succ");
    }

    #[test]
    fn compare_nat2_distinguishes_zero_and_successor_left_sides() {
        let rule = select(&less_than(z(), s(s(z()))), Some(Strategy::CompareNat2))
            .expect("rule should select");
        assert_eq!(rule.label(), "L-Zero");
        assert!(rule.premises().is_empty());

        let rule = select(
            &less_than(s(z()), s(s(z()))),
            Some(Strategy::CompareNat2),
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "L-SuccSucc");
        assert_eq!(rule.premises(), vec![less_than(z(), s(z()))]);
    }

    #[test]
    fn compare_nat3_peels_the_right_side() {
        let rule = select(&less_than(z(), s(s(z()))), Some(Strategy::CompareNat3))
            .expect("rule should select");
        assert_eq!(rule.label(), "L-SuccR");
        assert_eq!(rule.premises(), vec![less_than(z(), s(z()))]);
    }

    #[test]
    fn rejects_inequality_whose_sides_are_not_increasing() {
        for (left, right) in [(z(), z()), (s(z()), z()), (s(z()), s(z()))] {
            let err = select(&less_than(left, right), None)
                .expect_err("unsound judgment should be rejected");
            assert!(matches!(err, DeriveError::IllFormedRule { .. }));
        }
    }

    #[test]
    fn eval_splits_off_the_last_term_of_a_sum() {
        let expr = Expr {
            terms: vec![
                Term::single(Factor::Nat(z())),
                Term::single(Factor::Nat(s(z()))),
                Term::single(Factor::Nat(s(z()))),
            ],
        };
        let rule = select(
            &Judgment::EvalTo {
                expr,
                value: s(s(z())),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "E-Plus");
        let premises = rule.premises();
        assert_eq!(premises[0].to_string(), "Z + S(Z) evalto S(Z)");
        assert_eq!(premises[1].to_string(), "S(Z) evalto S(Z)");
        assert_eq!(premises[2].to_string(), "S(Z) plus S(Z) is S(S(Z))");
    }

    #[test]
    fn eval_splits_off_the_last_factor_of_a_product() {
        let term = Term {
            factors: vec![
                Factor::Nat(s(s(z()))),
                Factor::Nat(s(z())),
            ],
        };
        let rule = select(
            &Judgment::EvalTo {
                expr: Expr::single(term),
                value: s(s(z())),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "E-Times");
        let premises = rule.premises();
        assert_eq!(premises[0].to_string(), "S(S(Z)) evalto S(S(Z))");
        assert_eq!(premises[1].to_string(), "S(Z) evalto S(Z)");
        assert_eq!(premises[2].to_string(), "S(S(Z)) times S(Z) is S(S(Z))");
    }

    #[test]
    fn eval_sees_through_a_lone_parenthesized_expression() {
        let inner = Expr {
            terms: vec![
                Term::single(Factor::Nat(z())),
                Term::single(Factor::Nat(s(z()))),
            ],
        };
        let rule = select(
            &Judgment::EvalTo {
                expr: Expr::single(Term::single(Factor::Paren(inner))),
                value: s(z()),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "E-Plus");
        assert_eq!(rule.conclusion().to_string(), "Z + S(Z) evalto S(Z)");
    }

    #[test]
    fn eval_const_restates_the_numeral() {
        let rule = select(
            &Judgment::EvalTo {
                expr: Expr::single(Term::single(Factor::Nat(s(z())))),
                value: s(z()),
            },
            None,
        )
        .expect("rule should select");
        assert_eq!(rule.label(), "E-Const");
        assert_eq!(rule.conclusion().to_string(), "S(Z) evalto S(Z)");
        assert!(rule.premises().is_empty());
    }

    #[test]
    fn rejects_unsound_evaluation() {
        let err = select(
            &Judgment::EvalTo {
                expr: Expr::single(Term::single(Factor::Nat(s(z())))),
                value: z(),
            },
            None,
        )
        .expect_err("unsound judgment should be rejected");
        assert!(matches!(err, DeriveError::IllFormedRule { .. }));
    }
}
