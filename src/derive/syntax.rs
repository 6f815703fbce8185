use std::fmt;

/// A Peano numeral. The value of a numeral is its `S`-nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nat {
    Z,
    S(Box<Nat>),
}

impl Nat {
    pub fn value(&self) -> u64 {
        let mut value = 0;
        let mut current = self;
        while let Self::S(inner) = current {
            value += 1;
            current = inner;
        }
        value
    }

    pub fn from_value(value: u64) -> Self {
        let mut nat = Self::Z;
        for _ in 0..value {
            nat = nat.succ();
        }
        nat
    }

    pub fn succ(self) -> Self {
        Self::S(Box::new(self))
    }
}

impl fmt::Display for Nat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Written as a loop so deep numerals cost no stack.
        let mut wrappers = 0u64;
        let mut current = self;
        while let Self::S(inner) = current {
            f.write_str("S(")?;
            wrappers += 1;
            current = inner;
        }
        f.write_str("Z")?;
        for _ in 0..wrappers {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// One multiplicand inside a term: a numeral or a parenthesized sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factor {
    Nat(Nat),
    Paren(Expr),
}

impl Factor {
    pub fn value(&self) -> u64 {
        match self {
            Self::Nat(nat) => nat.value(),
            Self::Paren(expr) => expr.value(),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nat(nat) => write!(f, "{nat}"),
            Self::Paren(expr) => write!(f, "({expr})"),
        }
    }
}

/// A non-empty product of factors. Kept as a flat sequence so the last
/// factor can be split off when decomposing into a binary `times` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub factors: Vec<Factor>,
}

impl Term {
    pub fn single(factor: Factor) -> Self {
        Self {
            factors: vec![factor],
        }
    }

    pub fn value(&self) -> u64 {
        self.factors.iter().map(Factor::value).product()
    }

    /// All factors but the last, and the last, when there are at least two.
    pub fn split_last(&self) -> Option<(Term, Factor)> {
        let (last, init) = self.factors.split_last()?;
        if init.is_empty() {
            return None;
        }
        Some((
            Term {
                factors: init.to_vec(),
            },
            last.clone(),
        ))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, factor) in self.factors.iter().enumerate() {
            if index > 0 {
                write!(f, " * ")?;
            }
            write!(f, "{factor}")?;
        }
        Ok(())
    }
}

/// A non-empty sum of terms, stored flat for the same reason as [`Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub terms: Vec<Term>,
}

impl Expr {
    pub fn single(term: Term) -> Self {
        Self { terms: vec![term] }
    }

    pub fn value(&self) -> u64 {
        self.terms.iter().map(Term::value).sum()
    }

    /// All terms but the last, and the last, when there are at least two.
    pub fn split_last(&self) -> Option<(Expr, Term)> {
        let (last, init) = self.terms.split_last()?;
        if init.is_empty() {
            return None;
        }
        Some((Expr { terms: init.to_vec() }, last.clone()))
    }

    pub fn as_single_term(&self) -> Option<&Term> {
        match self.terms.as_slice() {
            [term] => Some(term),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

/// Which family of inequality rules to derive with. Selected by a
/// `#CompareNatN` directive and threaded unchanged into every inequality
/// premise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CompareNat1,
    CompareNat2,
    CompareNat3,
}

impl Strategy {
    pub const fn directive(self) -> &'static str {
        match self {
            Self::CompareNat1 => "#CompareNat1",
            Self::CompareNat2 => "#CompareNat2",
            Self::CompareNat3 => "#CompareNat3",
        }
    }

    pub fn from_directive(text: &str) -> Option<Self> {
        match text {
            "#CompareNat1" => Some(Self::CompareNat1),
            "#CompareNat2" => Some(Self::CompareNat2),
            "#CompareNat3" => Some(Self::CompareNat3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgment {
    PlusIs {
        left: Nat,
        right: Nat,
        result: Nat,
    },
    TimesIs {
        left: Nat,
        right: Nat,
        result: Nat,
    },
    LessThan {
        left: Nat,
        right: Nat,
    },
    EvalTo {
        expr: Expr,
        value: Nat,
    },
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlusIs {
                left,
                right,
                result,
            } => write!(f, "{left} plus {right} is {result}"),
            Self::TimesIs {
                left,
                right,
                result,
            } => write!(f, "{left} times {right} is {result}"),
            Self::LessThan { left, right } => write!(f, "{left} is less than {right}"),
            Self::EvalTo { expr, value } => write!(f, "{expr} evalto {value}"),
        }
    }
}

/// A finished derivation: a judgment, the rule that concludes it, and the
/// derivations of that rule's premises in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub judgment: Judgment,
    pub rule_name: &'static str,
    pub premises: Vec<Derivation>,
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_derivation(self, f, 0)
    }
}

fn format_derivation(
    derivation: &Derivation,
    f: &mut fmt::Formatter<'_>,
    indent: usize,
) -> fmt::Result {
    f.write_str(&"    ".repeat(indent))?;
    write!(f, "{} by {}", derivation.judgment, derivation.rule_name)?;
    if derivation.premises.is_empty() {
        return write!(f, " {{}}");
    }

    writeln!(f, " {{")?;
    for (index, premise) in derivation.premises.iter().enumerate() {
        format_derivation(premise, f, indent + 1)?;
        if index + 1 < derivation.premises.len() {
            writeln!(f, ";")?;
        } else {
            writeln!(f)?;
        }
    }
    f.write_str(&"    ".repeat(indent))?;
    write!(f, "}}")
}
