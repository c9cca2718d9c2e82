//! SDP problem assembly: objective plus LMI constraints lowered to numeric blocks.

use crate::blocks::split_diag_blocks;
use crate::coeffs::{CoefficientBundle, extract_coefficients};
use crate::error::LmiError;
use crate::objective::{ObjectiveSense, objective_to_coeffs};
use crate::relation::{Lmi, MatrixExpr};
use crate::storage::CoefficientStorage;
use lmisdp_expr::{Expr, SymMatrix, Symbol};
use std::collections::HashSet;
use std::time::Instant;

/// How canonical LMI matrices are cut into SDP blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitBlocks {
    /// One block per LMI.
    None,
    /// Carried block-diagonal blocks are kept as-is; dense matrices are decomposed.
    BlockDiag,
    /// Every block is decomposed into its finest diagonal blocks.
    Full,
}

/// Canonical matrices of `lmis`, cut into blocks as requested.
pub fn canonical_blocks(lmis: &[Lmi], split: SplitBlocks) -> Result<Vec<SymMatrix>, LmiError> {
    let mut blocks = Vec::new();
    for lmi in lmis {
        match (split, lmi.canonical_matrix()) {
            (SplitBlocks::None, matrix) => blocks.push(matrix.into_dense()),
            (SplitBlocks::BlockDiag, MatrixExpr::BlockDiag(parts)) => blocks.extend(parts),
            (SplitBlocks::Full, MatrixExpr::BlockDiag(parts)) => {
                for part in &parts {
                    blocks.extend(split_diag_blocks(part)?);
                }
            }
            (_, MatrixExpr::Dense(matrix)) => blocks.extend(split_diag_blocks(&matrix)?),
        }
    }
    Ok(blocks)
}

/// Coefficient bundles of every block of every LMI, in order.
pub fn lmi_to_coeffs<M: CoefficientStorage>(
    lmis: &[Lmi],
    variables: &[Symbol],
    split: SplitBlocks,
) -> Result<Vec<CoefficientBundle<M>>, LmiError> {
    canonical_blocks(lmis, split)?
        .iter()
        .map(|block| extract_coefficients(block, variables))
        .collect()
}

/// Free symbols of the objective and the LMIs, ordered by name.
pub fn discover_variables(objective: &Expr, lmis: &[Lmi]) -> Vec<Symbol> {
    let mut found = objective.free_symbols();
    for lmi in lmis {
        found.extend(lmi.free_symbols());
    }
    found.into_iter().filter(|symbol| !symbol.is_nonce()).collect()
}

/// A symbolic SDP: minimize or maximize a linear objective subject to LMIs.
#[derive(Debug, Clone)]
pub struct SdpProblem {
    objective: Expr,
    lmis: Vec<Lmi>,
    variables: Vec<Symbol>,
}

impl SdpProblem {
    /// Returns an error if a variable is listed twice.
    pub fn new(objective: Expr, lmis: Vec<Lmi>, variables: Vec<Symbol>) -> Result<Self, LmiError> {
        let mut seen = HashSet::with_capacity(variables.len());
        for variable in &variables {
            if !seen.insert(variable) {
                return Err(LmiError::DuplicateVariable {
                    name: variable.to_string(),
                });
            }
        }
        Ok(Self {
            objective,
            lmis,
            variables,
        })
    }

    /// Use every free symbol, in name order, as a decision variable.
    pub fn with_discovered_variables(objective: Expr, lmis: Vec<Lmi>) -> Self {
        let variables = discover_variables(&objective, &lmis);
        Self {
            objective,
            lmis,
            variables,
        }
    }

    pub fn objective(&self) -> &Expr {
        &self.objective
    }

    pub fn lmis(&self) -> &[Lmi] {
        &self.lmis
    }

    pub fn variables(&self) -> &[Symbol] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn objective_coeffs(&self, sense: ObjectiveSense) -> Result<Vec<f64>, LmiError> {
        objective_to_coeffs(&self.objective, &self.variables, sense)
    }

    /// Lower objective and constraints to numeric data.
    pub fn numeric<M: CoefficientStorage>(
        &self,
        sense: ObjectiveSense,
        split: SplitBlocks,
    ) -> Result<NumericProblem<M>, LmiError> {
        let started = Instant::now();
        let objective = self.objective_coeffs(sense)?;
        let blocks = lmi_to_coeffs(&self.lmis, &self.variables, split)?;
        tracing::debug!(
            component = "problem",
            operation = "numeric",
            status = "success",
            backend = M::BACKEND.as_str(),
            lmis = self.lmis.len(),
            blocks = blocks.len(),
            variables = self.variables.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Lowered SDP problem"
        );
        Ok(NumericProblem { objective, blocks })
    }
}

/// Numeric SDP data: minimize `c·x` s.t. `C₀ + Σ xᵢ·Cᵢ ⪰ 0` for every block.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericProblem<M> {
    objective: Vec<f64>,
    blocks: Vec<CoefficientBundle<M>>,
}

impl<M: CoefficientStorage> NumericProblem<M> {
    pub fn new(objective: Vec<f64>, blocks: Vec<CoefficientBundle<M>>) -> Self {
        Self { objective, blocks }
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn blocks(&self) -> &[CoefficientBundle<M>] {
        &self.blocks
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Row count of each block.
    pub fn block_struct(&self) -> Vec<usize> {
        self.blocks.iter().map(|block| block.shape().0).collect()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::relation::Operand;
    use crate::storage::LilMatrix;
    use lmisdp_expr::symbols;
    use nalgebra::DMatrix;

    #[test]
    fn test_discover_variables_sorted_by_name() {
        let v = symbols("b a c");
        let m = SymMatrix::from_diagonal([Expr::from(&v[2]), Expr::from(&v[0])]);
        let lmi = Lmi::from_matrix(m).expect("valid");
        let found = discover_variables(&Expr::from(&v[1]), &[lmi]);
        let names: Vec<&str> = found.iter().map(Symbol::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_variables_rejected() {
        let v = symbols("x x");
        let err = SdpProblem::new(Expr::zero(), Vec::new(), v).expect_err("duplicate");
        assert_eq!(
            err,
            LmiError::DuplicateVariable {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_split_modes() {
        let v = symbols("x");
        let diag = SymMatrix::from_diagonal([Expr::from(&v[0]), Expr::constant(1.0)]);
        let carried = MatrixExpr::block_diag([diag.clone(), SymMatrix::identity(1)]);
        let lmi = Lmi::from_matrix(carried).expect("valid");

        let blocks = canonical_blocks(std::slice::from_ref(&lmi), SplitBlocks::None).expect("split");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].shape(), (3, 3));

        let blocks =
            canonical_blocks(std::slice::from_ref(&lmi), SplitBlocks::BlockDiag).expect("split");
        assert_eq!(blocks.iter().map(SymMatrix::rows).collect::<Vec<_>>(), vec![2, 1]);

        let blocks = canonical_blocks(&[lmi], SplitBlocks::Full).expect("split");
        assert_eq!(blocks.iter().map(SymMatrix::rows).collect::<Vec<_>>(), vec![1, 1, 1]);

        // Dense matrices are decomposed in BlockDiag mode too.
        let dense = Lmi::from_matrix(diag).expect("valid");
        let blocks = canonical_blocks(&[dense], SplitBlocks::BlockDiag).expect("split");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_numeric_problem_block_struct() {
        let v = symbols("x y");
        let m = SymMatrix::from_rows([
            [Expr::from(&v[0]), Expr::zero()],
            [Expr::zero(), &v[1] + 1.0],
        ])
        .expect("square");
        let problem = SdpProblem::new(
            &v[0] + &v[1],
            vec![Lmi::nsd(Operand::Zero, m).expect("valid")],
            v.clone(),
        )
        .expect("distinct");

        let numeric: NumericProblem<LilMatrix> = problem
            .numeric(ObjectiveSense::Maximize, SplitBlocks::Full)
            .expect("linear");
        assert_eq!(numeric.objective(), &[-1.0, -1.0]);
        assert_eq!(numeric.block_struct(), vec![1, 1]);
        assert_eq!(numeric.num_variables(), 2);

        let dense: NumericProblem<DMatrix<f64>> = problem
            .numeric(ObjectiveSense::Minimize, SplitBlocks::None)
            .expect("linear");
        assert_eq!(dense.block_struct(), vec![2]);
        assert_eq!(dense.blocks()[0].constant()[(1, 1)], 1.0);
    }
}
