use super::expanded::{ExpandedLmi, ExpandedOperand};
use super::latex::LatexLmi;
use super::operand::{MatrixExpr, Operand};
use crate::error::LmiError;
use lmisdp_expr::Symbol;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Definiteness asserted by an LMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LmiKind {
    /// `lhs - rhs` positive semi-definite (`>=`)
    Psd,
    /// `lhs - rhs` positive definite (`>`)
    Pd,
    /// `lhs - rhs` negative semi-definite (`<=`)
    Nsd,
    /// `lhs - rhs` negative definite (`<`)
    Nd,
}

impl LmiKind {
    pub fn is_strict(self) -> bool {
        matches!(self, LmiKind::Pd | LmiKind::Nd)
    }

    pub fn is_positive(self) -> bool {
        matches!(self, LmiKind::Psd | LmiKind::Pd)
    }

    /// Kind of the canonical `M ⪰ 0` / `M ≻ 0` form.
    pub fn canonical(self) -> LmiKind {
        if self.is_strict() {
            LmiKind::Pd
        } else {
            LmiKind::Psd
        }
    }

    pub fn rel_op(self) -> &'static str {
        match self {
            LmiKind::Psd => ">=",
            LmiKind::Pd => ">",
            LmiKind::Nsd => "<=",
            LmiKind::Nd => "<",
        }
    }

    pub fn latex_op(self) -> &'static str {
        match self {
            LmiKind::Psd => r"\succeq",
            LmiKind::Pd => r"\succ",
            LmiKind::Nsd => r"\preceq",
            LmiKind::Nd => r"\prec",
        }
    }
}

/// Side of a relation, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Lhs,
    Rhs,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Lhs => "lhs",
            Side::Rhs => "rhs",
        }
    }
}

/// A linear matrix inequality `lhs ⋈ rhs`.
///
/// At least one side is a matrix; two matrix sides have the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Lmi {
    lhs: Operand,
    rhs: Operand,
    kind: LmiKind,
}

impl Lmi {
    /// Build a relation, checking both matrix sides for symmetry.
    pub fn new(
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
        kind: LmiKind,
    ) -> Result<Self, LmiError> {
        Self::with_symmetry_check(lhs, rhs, kind, true)
    }

    pub fn with_symmetry_check(
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
        kind: LmiKind,
        assert_symmetry: bool,
    ) -> Result<Self, LmiError> {
        let lhs: Operand = lhs.into();
        let rhs: Operand = rhs.into();

        if assert_symmetry {
            for (side, operand) in [(Side::Lhs, &lhs), (Side::Rhs, &rhs)] {
                if let Operand::Matrix(m) = operand {
                    if !m.is_symmetric() {
                        return Err(LmiError::NonSymmetricMatrix { side });
                    }
                }
            }
        }

        match (&lhs, &rhs) {
            (Operand::Matrix(a), Operand::Matrix(b)) if a.shape() != b.shape() => {
                return Err(LmiError::Shape {
                    lhs: a.shape(),
                    rhs: b.shape(),
                });
            }
            (Operand::Zero, Operand::Zero) => return Err(LmiError::InvalidOperands),
            _ => {}
        }

        Ok(Self { lhs, rhs, kind })
    }

    pub fn psd(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Result<Self, LmiError> {
        Self::new(lhs, rhs, LmiKind::Psd)
    }

    pub fn pd(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Result<Self, LmiError> {
        Self::new(lhs, rhs, LmiKind::Pd)
    }

    pub fn nsd(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Result<Self, LmiError> {
        Self::new(lhs, rhs, LmiKind::Nsd)
    }

    pub fn nd(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Result<Self, LmiError> {
        Self::new(lhs, rhs, LmiKind::Nd)
    }

    /// `matrix ⪰ 0`
    pub fn from_matrix(matrix: impl Into<MatrixExpr>) -> Result<Self, LmiError> {
        let matrix: MatrixExpr = matrix.into();
        Self::psd(matrix, Operand::Zero)
    }

    pub fn lhs(&self) -> &Operand {
        &self.lhs
    }

    pub fn rhs(&self) -> &Operand {
        &self.rhs
    }

    pub fn kind(&self) -> LmiKind {
        self.kind
    }

    pub fn is_strict(&self) -> bool {
        self.kind.is_strict()
    }

    /// Greater side: `lhs` for PSD/PD, `rhs` for NSD/ND.
    pub fn gts(&self) -> &Operand {
        if self.kind.is_positive() {
            &self.lhs
        } else {
            &self.rhs
        }
    }

    /// Lesser side: `rhs` for PSD/PD, `lhs` for NSD/ND.
    pub fn lts(&self) -> &Operand {
        if self.kind.is_positive() {
            &self.rhs
        } else {
            &self.lhs
        }
    }

    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        for operand in [&self.lhs, &self.rhs] {
            if let Operand::Matrix(m) = operand {
                out.extend(m.free_symbols());
            }
        }
        out
    }

    /// Already of the form `M ⪰ 0` or `M ≻ 0`.
    pub fn is_canonical(&self) -> bool {
        self.kind.is_positive() && self.lhs.as_matrix().is_some() && self.rhs.is_zero()
    }

    /// The matrix asserted (semi-)definite by the canonical form, `gts - lts`.
    pub fn canonical_matrix(&self) -> MatrixExpr {
        match (self.gts(), self.lts()) {
            (Operand::Matrix(greater), Operand::Matrix(lesser)) => greater.difference(lesser),
            (Operand::Matrix(greater), Operand::Zero) => greater.clone(),
            (Operand::Zero, Operand::Matrix(lesser)) => lesser.negate(),
            (Operand::Zero, Operand::Zero) => {
                unreachable!("relations with two zero sides are rejected at construction")
            }
        }
    }

    /// Rewrite as `M ⪰ 0` (or `M ≻ 0` when strict).
    ///
    /// A relation already in canonical form is returned borrowed, unchanged.
    pub fn canonical(&self) -> Cow<'_, Lmi> {
        if self.is_canonical() {
            return Cow::Borrowed(self);
        }
        let matrix = self.canonical_matrix();
        tracing::debug!(
            component = "relation",
            operation = "canonical",
            status = "success",
            kind = ?self.kind,
            rows = matrix.shape().0,
            blocks = matrix.blocks().map_or(1, |blocks| blocks.len()),
            "Canonicalized LMI"
        );
        Cow::Owned(Lmi {
            lhs: Operand::Matrix(matrix),
            rhs: Operand::Zero,
            kind: self.kind.canonical(),
        })
    }

    pub fn into_canonical(self) -> Lmi {
        if self.is_canonical() {
            return self;
        }
        self.canonical().into_owned()
    }

    /// Rewrite every matrix side that involves `variables` as `Σ Cᵢ·xᵢ + C₀`.
    pub fn expanded(&self, variables: &[Symbol]) -> Result<ExpandedLmi, LmiError> {
        Ok(ExpandedLmi::new(
            ExpandedOperand::from_operand(&self.lhs, variables)?,
            ExpandedOperand::from_operand(&self.rhs, variables)?,
            self.kind,
        ))
    }

    pub fn latex(&self) -> LatexLmi<'_> {
        LatexLmi::new(self)
    }
}

impl fmt::Display for Lmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.kind.rel_op(), self.rhs)
    }
}
