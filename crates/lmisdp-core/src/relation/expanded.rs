use super::lmi::LmiKind;
use super::operand::{MatrixExpr, Operand};
use crate::coeffs::extract_coefficients;
use crate::error::LmiError;
use lmisdp_expr::{Expr, SymMatrix, Symbol};
use nalgebra::DMatrix;
use std::fmt;

/// A matrix written as `Σ Cᵢ·xᵢ + C₀` with numeric coefficient matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearMatrix {
    terms: Vec<(Symbol, DMatrix<f64>)>,
    constant: Option<DMatrix<f64>>,
}

impl LinearMatrix {
    /// Decompose `matrix`; the constant term is dropped when it is all zeros.
    pub fn from_matrix(matrix: &SymMatrix, variables: &[Symbol]) -> Result<Self, LmiError> {
        let (coeffs, constant) =
            extract_coefficients::<DMatrix<f64>>(matrix, variables)?.into_parts();
        let terms = variables.iter().cloned().zip(coeffs).collect();
        let constant = constant.iter().any(|v| *v != 0.0).then_some(constant);
        Ok(Self { terms, constant })
    }

    pub fn terms(&self) -> &[(Symbol, DMatrix<f64>)] {
        &self.terms
    }

    pub fn constant(&self) -> Option<&DMatrix<f64>> {
        self.constant.as_ref()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.constant
            .as_ref()
            .or_else(|| self.terms.first().map(|(_, m)| m))
            .map_or((0, 0), |m| (m.nrows(), m.ncols()))
    }

    /// Collapse back to a single symbolic matrix.
    pub fn to_symbolic(&self) -> SymMatrix {
        let (rows, cols) = self.shape();
        SymMatrix::from_fn(rows, cols, |i, j| {
            let linear = self.terms.iter().map(|(x, c)| c[(i, j)] * x);
            let constant = self.constant.as_ref().map(|c| Expr::constant(c[(i, j)]));
            Expr::sum(linear.chain(constant))
        })
    }
}

fn write_numeric(f: &mut fmt::Formatter<'_>, m: &DMatrix<f64>) -> fmt::Result {
    f.write_str("Matrix([")?;
    for i in 0..m.nrows() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str("[")?;
        for j in 0..m.ncols() {
            if j > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", m[(i, j)])?;
        }
        f.write_str("]")?;
    }
    f.write_str("])")
}

impl fmt::Display for LinearMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (symbol, coeff) in &self.terms {
            if !first {
                f.write_str(" + ")?;
            }
            write_numeric(f, coeff)?;
            write!(f, "*{symbol}")?;
            first = false;
        }
        if let Some(constant) = &self.constant {
            if !first {
                f.write_str(" + ")?;
            }
            write_numeric(f, constant)?;
            first = false;
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

/// One side of an [`ExpandedLmi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExpandedOperand {
    Zero,
    /// Matrix side without any of the variables, kept as written.
    Symbolic(MatrixExpr),
    Linear(LinearMatrix),
}

impl ExpandedOperand {
    pub(crate) fn from_operand(operand: &Operand, variables: &[Symbol]) -> Result<Self, LmiError> {
        let Operand::Matrix(matrix) = operand else {
            return Ok(ExpandedOperand::Zero);
        };
        let involved = matrix
            .free_symbols()
            .iter()
            .any(|symbol| variables.contains(symbol));
        if !involved {
            return Ok(ExpandedOperand::Symbolic(matrix.clone()));
        }
        LinearMatrix::from_matrix(&matrix.to_dense(), variables).map(ExpandedOperand::Linear)
    }
}

impl fmt::Display for ExpandedOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandedOperand::Zero => f.write_str("0"),
            ExpandedOperand::Symbolic(m) => write!(f, "{m}"),
            ExpandedOperand::Linear(m) => write!(f, "{m}"),
        }
    }
}

/// An LMI whose matrix sides are written as sums of coefficient matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedLmi {
    lhs: ExpandedOperand,
    rhs: ExpandedOperand,
    kind: LmiKind,
}

impl ExpandedLmi {
    pub(crate) fn new(lhs: ExpandedOperand, rhs: ExpandedOperand, kind: LmiKind) -> Self {
        Self { lhs, rhs, kind }
    }

    pub fn lhs(&self) -> &ExpandedOperand {
        &self.lhs
    }

    pub fn rhs(&self) -> &ExpandedOperand {
        &self.rhs
    }

    pub fn kind(&self) -> LmiKind {
        self.kind
    }
}

impl fmt::Display for ExpandedLmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.kind.rel_op(), self.rhs)
    }
}
