//! `(c, Gs, hs)` triple for conic SDP solvers.
//!
//! Each block `b` constrains `Σ xᵢ·Gᵢ ⪯ h_b`, with column `i` of `G_b` holding
//! `-Cᵢ` flattened column-major.

use crate::{Export, ExportConfig, ExportError};
use lmisdp_core::{Lmi, SdpProblem};
use lmisdp_expr::{Expr, Symbol};
use nalgebra::{DMatrix, DVector};

/// Conic solver input: minimize `c·x` s.t. `Σ xᵢ·G_b[:, i] ⪯ h_b` per block.
#[derive(Debug, Clone, PartialEq)]
pub struct ConicProblem {
    pub c: DVector<f64>,
    /// One `(n_b², nvars)` matrix per block.
    pub gs: Vec<DMatrix<f64>>,
    /// One `(n_b, n_b)` matrix per block.
    pub hs: Vec<DMatrix<f64>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConicExporter;

#[cfg(feature = "conic")]
impl ConicProblem {
    fn from_numeric(problem: &lmisdp_core::NumericProblem<DMatrix<f64>>) -> Self {
        let c = DVector::from_column_slice(problem.objective());
        let mut gs = Vec::with_capacity(problem.blocks().len());
        let mut hs = Vec::with_capacity(problem.blocks().len());
        for block in problem.blocks() {
            let n = block.shape().0;
            let coeffs = block.coeffs();
            gs.push(DMatrix::from_fn(n * n, coeffs.len(), |r, i| {
                -coeffs[i][(r % n, r / n)]
            }));
            hs.push(block.constant().clone());
        }
        Self { c, gs, hs }
    }
}

impl Export for ConicExporter {
    type Output = ConicProblem;

    #[cfg(feature = "conic")]
    fn export(
        &self,
        problem: &SdpProblem,
        config: &ExportConfig,
    ) -> Result<ConicProblem, ExportError> {
        let numeric = problem.numeric::<DMatrix<f64>>(config.sense, config.split_blocks)?;
        let conic = ConicProblem::from_numeric(&numeric);
        tracing::debug!(
            component = "export",
            operation = "conic",
            status = "success",
            blocks = conic.gs.len(),
            variables = conic.c.len(),
            "Built conic problem"
        );
        Ok(conic)
    }

    #[cfg(not(feature = "conic"))]
    fn export(
        &self,
        _problem: &SdpProblem,
        _config: &ExportConfig,
    ) -> Result<ConicProblem, ExportError> {
        Err(ExportError::NotAvailable {
            operation: "to_conic",
        })
    }
}

/// Build the conic `(c, Gs, hs)` triple for objective and LMIs.
pub fn to_conic(
    objective: &Expr,
    lmis: &[Lmi],
    variables: &[Symbol],
    config: &ExportConfig,
) -> Result<ConicProblem, ExportError> {
    let problem = SdpProblem::new(objective.clone(), lmis.to_vec(), variables.to_vec())?;
    ConicExporter.export(&problem, config)
}

#[cfg(all(test, feature = "conic"))]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use lmisdp_core::{CoefficientBundle, NumericProblem};

    #[test]
    fn test_columns_are_negated_flattened_coefficients() {
        let block = CoefficientBundle::new(
            vec![
                DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 3.0]),
                DMatrix::from_row_slice(2, 2, &[0.0, -1.0, -1.0, 4.0]),
            ],
            DMatrix::from_row_slice(2, 2, &[5.0, 0.0, 0.0, 6.0]),
        );
        let problem = NumericProblem::new(vec![1.0, -1.0], vec![block]);
        let conic = ConicProblem::from_numeric(&problem);
        assert_eq!(conic.c, DVector::from_column_slice(&[1.0, -1.0]));
        assert_eq!(conic.gs[0].shape(), (4, 2));
        assert_eq!(conic.gs[0].column(0).iter().copied().collect::<Vec<_>>(), vec![-1.0, -2.0, -2.0, -3.0]);
        assert_eq!(conic.gs[0].column(1).iter().copied().collect::<Vec<_>>(), vec![-0.0, 1.0, 1.0, -4.0]);
        assert_eq!(conic.hs[0], DMatrix::from_row_slice(2, 2, &[5.0, 0.0, 0.0, 6.0]));
    }

    #[test]
    fn test_no_variables_gives_empty_columns() {
        let block = CoefficientBundle::new(Vec::new(), DMatrix::from_element(1, 1, 2.0));
        let conic = ConicProblem::from_numeric(&NumericProblem::new(Vec::new(), vec![block]));
        assert_eq!(conic.gs[0].shape(), (1, 0));
        assert_eq!(conic.c.len(), 0);
    }
}
