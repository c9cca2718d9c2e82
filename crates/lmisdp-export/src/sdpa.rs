//! SDPA text formats.
//!
//! Both formats describe `min c·x s.t. Σ xᵢ·Fᵢ - F₀ ⪰ 0`, so the constant
//! coefficient matrix of each block is written negated.

use crate::{Export, ExportConfig, ExportError};
use lmisdp_core::{
    Backend, CoefficientStorage, LilMatrix, Lmi, NumericProblem, SdpProblem,
};
use lmisdp_expr::{Expr, Symbol};
use nalgebra::DMatrix;
use std::fmt::Write;
use std::time::Instant;

/// SDPA sparse format: one `x b i j value` line per upper-triangle non-zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdpaSparse;

/// SDPA dense format: one `{ ... }` group per constant/variable matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdpaDense;

impl SdpaSparse {
    /// Render already-lowered numeric data.
    pub fn render<M: CoefficientStorage>(
        &self,
        problem: &NumericProblem<M>,
        comment: Option<&str>,
    ) -> Result<String, ExportError> {
        render_sparse(problem, comment)
    }
}

impl SdpaDense {
    /// Render already-lowered numeric data.
    pub fn render(
        &self,
        problem: &NumericProblem<DMatrix<f64>>,
        comment: Option<&str>,
    ) -> Result<String, ExportError> {
        render_dense(problem, comment)
    }
}

/// Shortest round-trip rendering with a mandatory decimal point.
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn write_header<M: CoefficientStorage>(
    out: &mut String,
    problem: &NumericProblem<M>,
    comment: Option<&str>,
) -> Result<(), ExportError> {
    if let Some(comment) = comment {
        writeln!(out, "\"{comment}\"")?;
    }
    writeln!(out, "{} = ndim", problem.num_variables())?;
    writeln!(out, "{} = nblocks", problem.blocks().len())?;
    for rows in problem.block_struct() {
        write!(out, "{rows} ")?;
    }
    out.push_str("= blockstruct\n");
    let objective: Vec<String> = problem.objective().iter().copied().map(format_float).collect();
    writeln!(out, "{} = objcoeffs", objective.join(", "))?;
    Ok(())
}

fn write_sparse_matrix<M: CoefficientStorage>(
    out: &mut String,
    variable: usize,
    block: usize,
    matrix: &M,
    sign: f64,
) -> Result<(), ExportError> {
    for (row, col, value) in matrix.nonzero_entries() {
        if col >= row {
            writeln!(
                out,
                "{} {} {} {} {}",
                variable,
                block,
                row + 1,
                col + 1,
                format_float(sign * value)
            )?;
        }
    }
    Ok(())
}

fn render_sparse<M: CoefficientStorage>(
    problem: &NumericProblem<M>,
    comment: Option<&str>,
) -> Result<String, ExportError> {
    let mut out = String::new();
    write_header(&mut out, problem, comment)?;
    for (block_idx, block) in problem.blocks().iter().enumerate() {
        write_sparse_matrix(&mut out, 0, block_idx + 1, block.constant(), -1.0)?;
    }
    for var_idx in 0..problem.num_variables() {
        for (block_idx, block) in problem.blocks().iter().enumerate() {
            write_sparse_matrix(&mut out, var_idx + 1, block_idx + 1, &block.coeffs()[var_idx], 1.0)?;
        }
    }
    Ok(out)
}

fn write_dense_matrix(out: &mut String, matrix: &DMatrix<f64>, sign: f64) -> Result<(), ExportError> {
    out.push_str("\n {");
    for row in 0..matrix.nrows() {
        let values: Vec<String> = (0..matrix.ncols())
            .map(|col| format_float(sign * matrix[(row, col)]))
            .collect();
        write!(out, "\n  {{ {} }},", values.join(", "))?;
    }
    if matrix.nrows() > 0 {
        // drop the separator after the last row
        out.pop();
    }
    out.push_str("\n }");
    Ok(())
}

fn render_dense(
    problem: &NumericProblem<DMatrix<f64>>,
    comment: Option<&str>,
) -> Result<String, ExportError> {
    let mut out = String::new();
    write_header(&mut out, problem, comment)?;
    out.push('{');
    for block in problem.blocks() {
        write_dense_matrix(&mut out, block.constant(), -1.0)?;
    }
    out.push_str("\n}\n");
    for var_idx in 0..problem.num_variables() {
        out.push('{');
        for block in problem.blocks() {
            write_dense_matrix(&mut out, &block.coeffs()[var_idx], 1.0)?;
        }
        out.push_str("\n}\n");
    }
    Ok(out)
}

impl Export for SdpaSparse {
    type Output = String;

    /// Extracts with the sparse list-of-lists backend unless configured otherwise.
    fn export(&self, problem: &SdpProblem, config: &ExportConfig) -> Result<String, ExportError> {
        let started = Instant::now();
        let comment = config.comment.as_deref();
        let (sense, split) = (config.sense, config.split_blocks);
        let backend = config.backend_or(Backend::SparseLil);
        let text = match backend {
            Backend::Dense => self.render(&problem.numeric::<DMatrix<f64>>(sense, split)?, comment)?,
            Backend::SparseLil => self.render(&problem.numeric::<LilMatrix>(sense, split)?, comment)?,
            #[cfg(feature = "sparse")]
            Backend::SparseNative => self.render(
                &problem.numeric::<nalgebra_sparse::CooMatrix<f64>>(sense, split)?,
                comment,
            )?,
            #[cfg(not(feature = "sparse"))]
            Backend::SparseNative => {
                return Err(lmisdp_core::LmiError::BackendNotAvailable { backend }.into());
            }
        };
        tracing::debug!(
            component = "export",
            operation = "sdpa_sparse",
            status = "success",
            backend = backend.as_str(),
            bytes = text.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Rendered SDPA sparse"
        );
        Ok(text)
    }
}

impl Export for SdpaDense {
    type Output = String;

    /// Always extracts dense coefficient matrices.
    fn export(&self, problem: &SdpProblem, config: &ExportConfig) -> Result<String, ExportError> {
        let started = Instant::now();
        let numeric = problem.numeric::<DMatrix<f64>>(config.sense, config.split_blocks)?;
        let text = self.render(&numeric, config.comment.as_deref())?;
        tracing::debug!(
            component = "export",
            operation = "sdpa_dense",
            status = "success",
            blocks = numeric.blocks().len(),
            bytes = text.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Rendered SDPA dense"
        );
        Ok(text)
    }
}

/// Render objective and LMIs in SDPA sparse format.
pub fn to_sdpa_sparse(
    objective: &Expr,
    lmis: &[Lmi],
    variables: &[Symbol],
    config: &ExportConfig,
) -> Result<String, ExportError> {
    let problem = SdpProblem::new(objective.clone(), lmis.to_vec(), variables.to_vec())?;
    SdpaSparse.export(&problem, config)
}

/// Render objective and LMIs in SDPA dense format.
pub fn to_sdpa_dense(
    objective: &Expr,
    lmis: &[Lmi],
    variables: &[Symbol],
    config: &ExportConfig,
) -> Result<String, ExportError> {
    let problem = SdpProblem::new(objective.clone(), lmis.to_vec(), variables.to_vec())?;
    SdpaDense.export(&problem, config)
}
