//! Term → coefficient mapping over the top-level sum of an expression.

use crate::expr::core::Expr;
use crate::symbol::Symbol;
use std::collections::BTreeMap;
use std::fmt;

/// The non-numeric part of a term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermKey {
    /// Constant term.
    One,
    /// A single symbol to the first power.
    Symbol(Symbol),
    /// A product of symbol powers with total degree above one.
    Monomial(Vec<(Symbol, u32)>),
    /// Anything that is not a monomial before expansion, e.g. `(x + 1)*y`.
    Opaque(String),
}

impl TermKey {
    /// Build a key from symbol exponents, dropping zero powers.
    pub fn from_powers(powers: BTreeMap<Symbol, u32>) -> Self {
        let mut powers: Vec<(Symbol, u32)> = powers.into_iter().filter(|(_, e)| *e > 0).collect();
        if powers.is_empty() {
            TermKey::One
        } else if powers.len() == 1 && powers[0].1 == 1 {
            TermKey::Symbol(powers.swap_remove(0).0)
        } else {
            TermKey::Monomial(powers)
        }
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKey::One => f.write_str("1"),
            TermKey::Symbol(s) => write!(f, "{s}"),
            TermKey::Monomial(powers) => {
                for (idx, (s, e)) in powers.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("*")?;
                    }
                    if *e == 1 {
                        write!(f, "{s}")?;
                    } else {
                        write!(f, "{s}**{e}")?;
                    }
                }
                Ok(())
            }
            TermKey::Opaque(text) => f.write_str(text),
        }
    }
}

impl Expr {
    /// Coefficient of each top-level term, with like terms merged.
    ///
    /// Terms whose merged coefficient is zero are dropped. No expansion is
    /// performed: `2*(x + 1)` maps to a single opaque key.
    pub fn coefficient_terms(&self) -> BTreeMap<TermKey, f64> {
        let summands = match self {
            Expr::Add(terms) => terms.as_slice(),
            other => std::slice::from_ref(other),
        };

        let mut merged: BTreeMap<TermKey, f64> = BTreeMap::new();
        for term in summands {
            let (coeff, key) = split_term(term);
            *merged.entry(key).or_insert(0.0) += coeff;
        }
        merged.retain(|_, coeff| *coeff != 0.0);
        merged
    }
}

fn split_term(term: &Expr) -> (f64, TermKey) {
    match term {
        Expr::Const(c) => (*c, TermKey::One),
        Expr::Symbol(s) => (1.0, TermKey::Symbol(s.clone())),
        Expr::Mul(factors) => {
            let mut coeff = 1.0;
            let mut rest = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    Expr::Const(c) => coeff *= c,
                    other => rest.push(other),
                }
            }
            (coeff, product_key(&rest))
        }
        other => (1.0, product_key(&[other])),
    }
}

fn product_key(factors: &[&Expr]) -> TermKey {
    let mut powers: BTreeMap<Symbol, u32> = BTreeMap::new();
    for factor in factors {
        let (symbol, exp) = match factor {
            Expr::Symbol(s) => (s, 1),
            Expr::Pow(base, exp) => match base.as_ref() {
                Expr::Symbol(s) => (s, *exp),
                _ => return opaque_key(factors),
            },
            _ => return opaque_key(factors),
        };
        *powers.entry(symbol.clone()).or_insert(0) += exp;
    }
    TermKey::from_powers(powers)
}

fn opaque_key(factors: &[&Expr]) -> TermKey {
    let product = Expr::product(factors.iter().map(|factor| (*factor).clone()));
    TermKey::Opaque(product.to_string())
}
