//! Linear form extraction: `Σ cᵢ·xᵢ + c₀` from an expression.

use crate::error::LinearExprError;
use crate::expr::{Expr, TermKey};
use crate::symbol::Symbol;
use std::collections::{BTreeMap, HashSet};

/// Coefficients aligned with a variable list plus a constant term.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearForm {
    coefficients: Vec<f64>,
    constant: f64,
}

impl LinearForm {
    pub fn new(coefficients: Vec<f64>, constant: f64) -> Self {
        Self {
            coefficients,
            constant,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficient(&self, index: usize) -> Option<f64> {
        self.coefficients.get(index).copied()
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Consume and return (coefficients, constant).
    pub fn into_parts(self) -> (Vec<f64>, f64) {
        (self.coefficients, self.constant)
    }

    /// Multiply every coefficient and the constant by -1.
    pub fn negated(&self) -> Self {
        Self {
            coefficients: self.coefficients.iter().map(|c| -c).collect(),
            constant: -self.constant,
        }
    }
}

/// Extract the coefficient of every variable and the constant term.
///
/// Variables absent from the expression get a zero coefficient. When a term
/// is neither constant nor a single listed variable, the expression is
/// expanded once and checked again before giving up.
pub fn linear_form(expr: &Expr, variables: &[Symbol]) -> Result<LinearForm, LinearExprError> {
    // A fresh nonce term keeps single-term expressions in summed form.
    let nonce = Symbol::nonce();
    let shifted = Expr::sum([Expr::Symbol(nonce.clone()), expr.clone()]);
    let allowed: HashSet<&Symbol> = variables.iter().chain(std::iter::once(&nonce)).collect();

    let mut terms = shifted.coefficient_terms();
    if !is_affine(&terms, &allowed) {
        tracing::trace!(
            component = "linear",
            operation = "expand_retry",
            expr = %expr,
            "Retrying coefficient extraction on expanded expression"
        );
        terms = shifted.expand().coefficient_terms();
        if !is_affine(&terms, &allowed) {
            return Err(LinearExprError::NonLinearExpression {
                expr: expr.to_string(),
            });
        }
    }

    let constant = terms.get(&TermKey::One).copied().unwrap_or(0.0);
    let coefficients = variables
        .iter()
        .map(|var| {
            terms
                .get(&TermKey::Symbol(var.clone()))
                .copied()
                .unwrap_or(0.0)
        })
        .collect();

    Ok(LinearForm {
        coefficients,
        constant,
    })
}

fn is_affine(terms: &BTreeMap<TermKey, f64>, allowed: &HashSet<&Symbol>) -> bool {
    terms.keys().all(|key| match key {
        TermKey::One => true,
        TermKey::Symbol(symbol) => allowed.contains(symbol),
        TermKey::Monomial(_) | TermKey::Opaque(_) => false,
    })
}
