//! Deterministic block-diagonal LMI problems.
//!
//! Every case is a single LMI `M(x) ⪰ 0` whose matrix is block-diagonal with
//! `blocks` coupled blocks of `block_size` rows, so the split stage has real
//! work to do. The objective is the plain sum of all variables.

use lmisdp_core::{LmiError, Lmi, SdpProblem};
use lmisdp_expr::{Expr, SymMatrix, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticShape {
    pub blocks: usize,
    pub block_size: usize,
    pub variables: usize,
}

impl SyntheticShape {
    pub fn case_name(&self) -> String {
        format!("b{}_n{}_v{}", self.blocks, self.block_size, self.variables)
    }

    /// Row count of the full LMI matrix.
    pub fn dimension(&self) -> usize {
        self.blocks * self.block_size
    }
}

fn block_entry(variables: &[Symbol], block: usize, row: usize, col: usize, size: usize) -> Expr {
    // depends on row + col only, so each block is symmetric
    let linear = variables.iter().enumerate().filter_map(|(k, variable)| {
        let weight = ((row + col + k + block) % 5) as f64 - 2.0;
        (weight != 0.0).then(|| weight * variable)
    });
    let constant = if row == col {
        Expr::constant((size + 1) as f64)
    } else {
        Expr::zero()
    };
    Expr::sum(std::iter::once(constant).chain(linear))
}

pub fn synthetic_variables(count: usize) -> Vec<Symbol> {
    (0..count).map(|k| Symbol::new(format!("x{k}"))).collect()
}

pub fn synthetic_matrix(shape: SyntheticShape, variables: &[Symbol]) -> SymMatrix {
    let size = shape.block_size;
    let blocks: Vec<SymMatrix> = (0..shape.blocks)
        .map(|block| {
            SymMatrix::from_fn(size, size, |row, col| {
                block_entry(variables, block, row, col, size)
            })
        })
        .collect();
    SymMatrix::block_diagonal(&blocks)
}

pub fn synthetic_problem(shape: SyntheticShape) -> Result<SdpProblem, LmiError> {
    let variables = synthetic_variables(shape.variables);
    let lmi = Lmi::from_matrix(synthetic_matrix(shape, &variables))?;
    let objective = Expr::sum(variables.iter().map(Expr::from));
    SdpProblem::new(objective, vec![lmi], variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmisdp_core::{SplitBlocks, canonical_blocks};

    const SHAPE: SyntheticShape = SyntheticShape {
        blocks: 3,
        block_size: 2,
        variables: 2,
    };

    #[test]
    fn test_synthetic_matrix_is_symmetric() {
        let variables = synthetic_variables(SHAPE.variables);
        let matrix = synthetic_matrix(SHAPE, &variables);
        assert_eq!(matrix.shape(), (SHAPE.dimension(), SHAPE.dimension()));
        assert!(matrix.is_symmetric());
        assert!(matrix.get(0, 2).is_zero());
    }

    #[test]
    fn test_synthetic_problem_splits_into_blocks() {
        let problem = synthetic_problem(SHAPE).expect("distinct variables");
        assert_eq!(problem.num_variables(), 2);
        let blocks = canonical_blocks(problem.lmis(), SplitBlocks::Full).expect("square");
        assert_eq!(blocks.iter().map(SymMatrix::rows).collect::<Vec<_>>(), vec![2, 2, 2]);
    }

    #[test]
    fn test_case_name() {
        assert_eq!(SHAPE.case_name(), "b3_n2_v2");
    }
}
