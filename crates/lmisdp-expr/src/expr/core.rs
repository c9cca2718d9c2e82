//! Core expression type: a small tree over `f64` constants and symbols.
//!
//! Constructors keep the tree in a light normal form:
//! - nested sums and products are flattened
//! - constants are folded (one leading constant per sum or product)
//! - additive zeros vanish and a zero factor collapses the product to `0`
//!
//! Nothing else is simplified; like terms are only merged by
//! [`Expr::coefficient_terms`] and [`Expr::expand`].

use crate::symbol::Symbol;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Symbol(Symbol),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, u32),
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// The literal zero.
    pub fn zero() -> Self {
        Expr::Const(0.0)
    }

    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    pub fn symbol(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }

    /// Sum of terms, flattened with constants folded.
    pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Self {
        let mut constant = 0.0;
        let mut rest = Vec::new();
        for term in terms {
            push_summand(term, &mut constant, &mut rest);
        }
        if constant != 0.0 {
            rest.insert(0, Expr::Const(constant));
        }
        match <[Expr; 1]>::try_from(rest) {
            Ok([only]) => only,
            Err(rest) if rest.is_empty() => Expr::zero(),
            Err(rest) => Expr::Add(rest),
        }
    }

    /// Product of factors, flattened with constants folded.
    pub fn product<I: IntoIterator<Item = Expr>>(factors: I) -> Self {
        let mut coeff = 1.0;
        let mut rest = Vec::new();
        for factor in factors {
            push_factor(factor, &mut coeff, &mut rest);
        }
        if coeff == 0.0 {
            return Expr::zero();
        }
        if coeff != 1.0 {
            rest.insert(0, Expr::Const(coeff));
        }
        match <[Expr; 1]>::try_from(rest) {
            Ok([only]) => only,
            Err(rest) if rest.is_empty() => Expr::Const(1.0),
            Err(rest) => Expr::Mul(rest),
        }
    }

    /// `base ** exp` for a non-negative integer exponent.
    pub fn pow(base: Expr, exp: u32) -> Self {
        match (base, exp) {
            (_, 0) => Expr::Const(1.0),
            (base, 1) => base,
            (Expr::Const(c), exp) => match i32::try_from(exp) {
                Ok(small) => Expr::Const(c.powi(small)),
                Err(_) => Expr::Pow(Box::new(Expr::Const(c)), exp),
            },
            (Expr::Pow(inner, inner_exp), exp) => match inner_exp.checked_mul(exp) {
                Some(merged) => Expr::Pow(inner, merged),
                None => Expr::Pow(Box::new(Expr::Pow(inner, inner_exp)), exp),
            },
            (base, exp) => Expr::Pow(Box::new(base), exp),
        }
    }

    // ── Queries ─────────────────────────────────────────────

    /// True only for the literal zero constant.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if *c == 0.0)
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Expr::Const(c) => Some(*c),
            _ => None,
        }
    }

    /// All symbols occurring in the expression.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    pub(crate) fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Const(_) => {}
            Expr::Symbol(s) => {
                out.insert(s.clone());
            }
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Pow(base, _) => base.collect_symbols(out),
        }
    }

    /// Multiply by -1.
    pub fn negate(&self) -> Self {
        Expr::product([Expr::Const(-1.0), self.clone()])
    }
}

fn push_summand(term: Expr, constant: &mut f64, out: &mut Vec<Expr>) {
    match term {
        Expr::Const(c) => *constant += c,
        Expr::Add(inner) => {
            for item in inner {
                push_summand(item, constant, out);
            }
        }
        other => out.push(other),
    }
}

fn push_factor(factor: Expr, coeff: &mut f64, out: &mut Vec<Expr>) {
    match factor {
        Expr::Const(c) => *coeff *= c,
        Expr::Mul(inner) => {
            for item in inner {
                push_factor(item, coeff, out);
            }
        }
        other => out.push(other),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::Add(terms) => {
                for (idx, term) in terms.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{term}")?;
                }
                Ok(())
            }
            Expr::Mul(factors) => {
                for (idx, factor) in factors.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("*")?;
                    }
                    match factor {
                        Expr::Add(_) => write!(f, "({factor})")?,
                        _ => write!(f, "{factor}")?,
                    }
                }
                Ok(())
            }
            Expr::Pow(base, exp) => match base.as_ref() {
                Expr::Symbol(_) => write!(f, "{base}**{exp}"),
                _ => write!(f, "({base})**{exp}"),
            },
        }
    }
}

// ── Conversions ─────────────────────────────────────────────

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Const(f64::from(value))
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Symbol(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

// ── Operator overloads ──────────────────────────────────────

macro_rules! impl_expr_ops {
    ($lhs:ty) => {
        impl<T: Into<Expr>> std::ops::Add<T> for $lhs {
            type Output = Expr;

            fn add(self, rhs: T) -> Self::Output {
                Expr::sum([Expr::from(self), rhs.into()])
            }
        }

        impl<T: Into<Expr>> std::ops::Sub<T> for $lhs {
            type Output = Expr;

            fn sub(self, rhs: T) -> Self::Output {
                Expr::sum([Expr::from(self), Into::<Expr>::into(rhs).negate()])
            }
        }

        impl<T: Into<Expr>> std::ops::Mul<T> for $lhs {
            type Output = Expr;

            fn mul(self, rhs: T) -> Self::Output {
                Expr::product([Expr::from(self), rhs.into()])
            }
        }

        impl std::ops::Neg for $lhs {
            type Output = Expr;

            fn neg(self) -> Self::Output {
                Expr::from(self).negate()
            }
        }
    };
}

impl_expr_ops!(Expr);
impl_expr_ops!(&Expr);
impl_expr_ops!(Symbol);
impl_expr_ops!(&Symbol);

macro_rules! impl_scalar_lhs_ops {
    ($rhs:ty) => {
        impl std::ops::Add<$rhs> for f64 {
            type Output = Expr;

            fn add(self, rhs: $rhs) -> Self::Output {
                Expr::sum([Expr::Const(self), Expr::from(rhs)])
            }
        }

        impl std::ops::Sub<$rhs> for f64 {
            type Output = Expr;

            fn sub(self, rhs: $rhs) -> Self::Output {
                Expr::sum([Expr::Const(self), Expr::from(rhs).negate()])
            }
        }

        impl std::ops::Mul<$rhs> for f64 {
            type Output = Expr;

            fn mul(self, rhs: $rhs) -> Self::Output {
                Expr::product([Expr::Const(self), Expr::from(rhs)])
            }
        }
    };
}

impl_scalar_lhs_ops!(Expr);
impl_scalar_lhs_ops!(&Expr);
impl_scalar_lhs_ops!(Symbol);
impl_scalar_lhs_ops!(&Symbol);

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::expr::Expr;
    use crate::symbol::Symbol;

    fn x() -> Symbol {
        Symbol::new("x")
    }

    fn y() -> Symbol {
        Symbol::new("y")
    }

    #[test]
    fn sum_folds_constants() {
        let e = 1.0 + x() + 2.5;
        assert_eq!(e, Expr::Add(vec![Expr::Const(3.5), Expr::Symbol(x())]));
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert!(Expr::sum([]).is_zero());
        assert!(Expr::sum([Expr::Const(2.0), Expr::Const(-2.0)]).is_zero());
    }

    #[test]
    fn zero_factor_collapses_product() {
        let e = 0.0 * x();
        assert!(e.is_zero());
        let e = x() * 0;
        assert!(e.is_zero());
    }

    #[test]
    fn pow_folds_and_merges_small_exponents() {
        assert_eq!(Expr::pow(Expr::Const(2.0), 3), Expr::Const(8.0));
        let squared = Expr::pow(Expr::Symbol(x()), 2);
        assert_eq!(
            Expr::pow(squared, 3),
            Expr::Pow(Box::new(Expr::Symbol(x())), 6)
        );
    }

    #[test]
    fn pow_keeps_exponents_that_do_not_fit() {
        let big = u32::MAX;
        assert_eq!(
            Expr::pow(Expr::Const(1.0), big),
            Expr::Pow(Box::new(Expr::Const(1.0)), big)
        );
        let squared = Expr::pow(Expr::Symbol(y()), 2);
        assert_eq!(
            Expr::pow(squared.clone(), big),
            Expr::Pow(Box::new(squared), big)
        );
    }

    #[test]
    fn unit_factor_is_dropped() {
        assert_eq!(1.0 * x(), Expr::Symbol(x()));
    }

    #[test]
    fn negate_constant_folds() {
        assert_eq!(-Expr::Const(2.0), Expr::Const(-2.0));
        assert!(Expr::zero().negate().is_zero());
    }

    #[test]
    fn nested_sums_are_flattened() {
        let e = (x() + 1.0) + (y() + 2.0);
        match e {
            Expr::Add(terms) => assert_eq!(terms.len(), 3),
            other => panic!("expected a sum, got {other:?}"),
        }
    }

    #[test]
    fn pow_edge_cases() {
        assert_eq!(Expr::pow(Expr::Symbol(x()), 0), Expr::Const(1.0));
        assert_eq!(Expr::pow(Expr::Symbol(x()), 1), Expr::Symbol(x()));
        assert_eq!(Expr::pow(Expr::Const(3.0), 2), Expr::Const(9.0));
        assert_eq!(
            Expr::pow(Expr::pow(Expr::Symbol(x()), 2), 3),
            Expr::Pow(Box::new(Expr::Symbol(x())), 6)
        );
    }

    #[test]
    fn free_symbols_are_collected() {
        let e = 1.2 + x() * y() + Expr::pow(Expr::Symbol(y()), 2);
        let names = e
            .free_symbols()
            .into_iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn display_renders_products_and_sums() {
        let e = 1.2 + 3.0 * x() - 4.5 * y();
        assert_eq!(e.to_string(), "1.2 + 3*x + -4.5*y");
        let e = 2.0 * (x() + 1.0);
        assert_eq!(e.to_string(), "2*(1 + x)");
    }
}
