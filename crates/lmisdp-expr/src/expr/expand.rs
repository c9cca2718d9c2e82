//! Algebraic expansion: distribute products and integer powers over sums.

use crate::expr::core::Expr;
use crate::symbol::Symbol;
use std::collections::BTreeMap;

type Monomial = BTreeMap<Symbol, u32>;

/// Sum of monomials with merged coefficients.
#[derive(Debug, Clone, Default)]
struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    fn constant(value: f64) -> Self {
        let mut poly = Self::default();
        poly.accumulate(Monomial::new(), value);
        poly
    }

    fn symbol(symbol: &Symbol) -> Self {
        let mut poly = Self::default();
        poly.accumulate(Monomial::from([(symbol.clone(), 1)]), 1.0);
        poly
    }

    fn accumulate(&mut self, monomial: Monomial, coeff: f64) {
        *self.terms.entry(monomial).or_insert(0.0) += coeff;
    }

    fn plus(mut self, other: Polynomial) -> Self {
        for (monomial, coeff) in other.terms {
            self.accumulate(monomial, coeff);
        }
        self
    }

    fn times(&self, other: &Polynomial) -> Self {
        let mut out = Self::default();
        for (left, a) in &self.terms {
            for (right, b) in &other.terms {
                let mut monomial = left.clone();
                for (symbol, exp) in right {
                    *monomial.entry(symbol.clone()).or_insert(0) += exp;
                }
                out.accumulate(monomial, a * b);
            }
        }
        out
    }

    fn pow(&self, exp: u32) -> Self {
        let mut out = Polynomial::constant(1.0);
        for _ in 0..exp {
            out = out.times(self);
        }
        out
    }

    fn into_expr(self) -> Expr {
        Expr::sum(
            self.terms
                .into_iter()
                .filter(|(_, coeff)| *coeff != 0.0)
                .map(|(monomial, coeff)| {
                    Expr::product(
                        std::iter::once(Expr::Const(coeff)).chain(
                            monomial
                                .into_iter()
                                .map(|(symbol, exp)| Expr::pow(Expr::Symbol(symbol), exp)),
                        ),
                    )
                }),
        )
    }
}

fn polynomial_of(expr: &Expr) -> Polynomial {
    match expr {
        Expr::Const(c) => Polynomial::constant(*c),
        Expr::Symbol(s) => Polynomial::symbol(s),
        Expr::Add(terms) => terms
            .iter()
            .fold(Polynomial::default(), |acc, term| acc.plus(polynomial_of(term))),
        Expr::Mul(factors) => factors
            .iter()
            .fold(Polynomial::constant(1.0), |acc, factor| {
                acc.times(&polynomial_of(factor))
            }),
        Expr::Pow(base, exp) => polynomial_of(base).pow(*exp),
    }
}

impl Expr {
    /// Fully expanded form: a sum of `coefficient * monomial` terms with like
    /// terms merged and zero terms removed.
    pub fn expand(&self) -> Expr {
        polynomial_of(self).into_expr()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::expr::{Expr, TermKey};
    use crate::symbol::Symbol;

    fn x() -> Symbol {
        Symbol::new("x")
    }

    fn y() -> Symbol {
        Symbol::new("y")
    }

    #[test]
    fn expand_distributes_scalar() {
        let e = (2.0 * (x() + 1.0)).expand();
        let terms = e.coefficient_terms();
        assert_eq!(terms.get(&TermKey::One), Some(&2.0));
        assert_eq!(terms.get(&TermKey::Symbol(x())), Some(&2.0));
    }

    #[test]
    fn expand_cancels_nonlinear_terms() {
        let e = (x() * (y() + 1.0) - x() * y()).expand();
        assert_eq!(e, Expr::Symbol(x()));
    }

    #[test]
    fn expand_square() {
        let e = Expr::pow(x() + 1.0, 2).expand();
        let terms = e.coefficient_terms();
        assert_eq!(terms.get(&TermKey::One), Some(&1.0));
        assert_eq!(terms.get(&TermKey::Symbol(x())), Some(&2.0));
        assert_eq!(terms.get(&TermKey::Monomial(vec![(x(), 2)])), Some(&1.0));
    }

    #[test]
    fn expand_of_zero_difference_is_zero() {
        let e = (3.0 * x() + y()) - (y() + 3.0 * x());
        assert!(!e.is_zero());
        assert!(e.expand().is_zero());
    }
}
