//! Matrix coefficient extraction: `M(x) = C₀ + Σ xᵢ·Cᵢ`.

use crate::error::LmiError;
use crate::storage::{Backend, CoefficientStorage, LilMatrix};
use lmisdp_expr::{Expr, SymMatrix, Symbol, linear_form};
use nalgebra::DMatrix;
use std::time::Instant;

/// Numeric coefficient matrices of one symbolic matrix.
///
/// `coeffs[i]` multiplies `variables[i]`; `constant` is the variable-free part.
/// All matrices have the shape of the source matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientBundle<M> {
    coeffs: Vec<M>,
    constant: M,
}

impl<M: CoefficientStorage> CoefficientBundle<M> {
    pub fn new(coeffs: Vec<M>, constant: M) -> Self {
        Self { coeffs, constant }
    }

    pub fn coeffs(&self) -> &[M] {
        &self.coeffs
    }

    pub fn constant(&self) -> &M {
        &self.constant
    }

    pub fn into_parts(self) -> (Vec<M>, M) {
        (self.coeffs, self.constant)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.constant.shape()
    }

    pub fn num_variables(&self) -> usize {
        self.coeffs.len()
    }

    /// Rebuild `constant + Σ variables[i]·coeffs[i]` symbolically.
    pub fn to_symbolic(&self, variables: &[Symbol]) -> SymMatrix {
        let (rows, cols) = self.shape();
        SymMatrix::from_fn(rows, cols, |row, col| {
            let linear = self
                .coeffs
                .iter()
                .zip(variables)
                .map(|(coeff, variable)| coeff.get(row, col) * variable);
            Expr::sum(std::iter::once(Expr::constant(self.constant.get(row, col))).chain(linear))
        })
    }

    pub fn to_dense(&self) -> CoefficientBundle<DMatrix<f64>> {
        CoefficientBundle {
            coeffs: self.coeffs.iter().map(CoefficientStorage::to_dense).collect(),
            constant: self.constant.to_dense(),
        }
    }
}

/// Extract the coefficient matrices of `matrix` w.r.t. `variables`.
///
/// Literal-zero elements are skipped. An element that is not affine in the
/// variables fails the whole matrix.
pub fn extract_coefficients<M: CoefficientStorage>(
    matrix: &SymMatrix,
    variables: &[Symbol],
) -> Result<CoefficientBundle<M>, LmiError> {
    let started = Instant::now();
    let (rows, cols) = matrix.shape();
    let mut constant = M::zeros(rows, cols);
    let mut coeffs: Vec<M> = (0..variables.len()).map(|_| M::zeros(rows, cols)).collect();

    for ((row, col), entry) in matrix.iter_indexed() {
        if entry.is_zero() {
            continue;
        }
        let form = linear_form(entry, variables).map_err(|source| LmiError::NonLinearMatrix {
            matrix: matrix.to_string(),
            source,
        })?;
        let (entry_coeffs, entry_constant) = form.into_parts();
        if entry_constant != 0.0 {
            constant.set_fresh(row, col, entry_constant);
        }
        for (coeff, value) in coeffs.iter_mut().zip(entry_coeffs) {
            if value != 0.0 {
                coeff.set_fresh(row, col, value);
            }
        }
    }

    tracing::debug!(
        component = "coeffs",
        operation = "extract",
        status = "success",
        backend = M::BACKEND.as_str(),
        rows,
        cols,
        variables = variables.len(),
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Extracted coefficient matrices"
    );

    Ok(CoefficientBundle { coeffs, constant })
}

/// Coefficient bundle in whichever backend was requested at runtime.
#[derive(Debug, Clone)]
pub enum NumericBundle {
    Dense(CoefficientBundle<DMatrix<f64>>),
    SparseLil(CoefficientBundle<LilMatrix>),
    #[cfg(feature = "sparse")]
    SparseNative(CoefficientBundle<nalgebra_sparse::CooMatrix<f64>>),
}

impl NumericBundle {
    pub fn backend(&self) -> Backend {
        match self {
            NumericBundle::Dense(_) => Backend::Dense,
            NumericBundle::SparseLil(_) => Backend::SparseLil,
            #[cfg(feature = "sparse")]
            NumericBundle::SparseNative(_) => Backend::SparseNative,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            NumericBundle::Dense(bundle) => bundle.shape(),
            NumericBundle::SparseLil(bundle) => bundle.shape(),
            #[cfg(feature = "sparse")]
            NumericBundle::SparseNative(bundle) => bundle.shape(),
        }
    }

    pub fn to_dense(&self) -> CoefficientBundle<DMatrix<f64>> {
        match self {
            NumericBundle::Dense(bundle) => bundle.clone(),
            NumericBundle::SparseLil(bundle) => bundle.to_dense(),
            #[cfg(feature = "sparse")]
            NumericBundle::SparseNative(bundle) => bundle.to_dense(),
        }
    }
}

/// Extract coefficients into the backend chosen at runtime.
pub fn extract_with_backend(
    matrix: &SymMatrix,
    variables: &[Symbol],
    backend: Backend,
) -> Result<NumericBundle, LmiError> {
    match backend {
        Backend::Dense => extract_coefficients(matrix, variables).map(NumericBundle::Dense),
        Backend::SparseLil => extract_coefficients(matrix, variables).map(NumericBundle::SparseLil),
        #[cfg(feature = "sparse")]
        Backend::SparseNative => {
            extract_coefficients(matrix, variables).map(NumericBundle::SparseNative)
        }
        #[cfg(not(feature = "sparse"))]
        Backend::SparseNative => Err(LmiError::BackendNotAvailable { backend }),
    }
}
