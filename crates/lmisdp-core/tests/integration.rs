#![allow(clippy::float_cmp)]

use lmisdp_core::{
    CoefficientBundle, Expr, LilMatrix, Lmi, MatrixExpr, ObjectiveSense, Operand, SdpProblem,
    SplitBlocks, SymMatrix, Symbol, canonical_blocks, discover_variables, lmi_to_coeffs,
    objective_to_coeffs, symbols,
};
use nalgebra::DMatrix;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn dm(rows: usize, values: &[f64]) -> DMatrix<f64> {
    DMatrix::from_row_slice(rows, rows, values)
}

fn constant(rows: &[&[f64]]) -> SymMatrix {
    SymMatrix::from_rows(rows.iter().map(|row| row.iter().copied())).expect("rectangular")
}

/// `[[x, y], [y, z + 1]] >= [[0, 1], [1, 2]]` and `[[y, 0], [0, 2x]] <= [[30, 0], [0, 40]]`.
fn two_lmis(v: &[Symbol]) -> (SymMatrix, SymMatrix, SymMatrix, SymMatrix) {
    let m1 = SymMatrix::from_rows([
        [Expr::from(&v[0]), Expr::from(&v[1])],
        [Expr::from(&v[1]), &v[2] + 1.0],
    ])
    .expect("square");
    let c1 = constant(&[&[0.0, 1.0], &[1.0, 2.0]]);
    let m2 = SymMatrix::from_rows([
        [Expr::from(&v[1]), Expr::zero()],
        [Expr::zero(), 2.0 * &v[0]],
    ])
    .expect("square");
    let c2 = constant(&[&[30.0, 0.0], &[0.0, 40.0]]);
    (m1, c1, m2, c2)
}

fn assert_bundle(bundle: &CoefficientBundle<DMatrix<f64>>, coeffs: &[DMatrix<f64>], c0: &DMatrix<f64>) {
    assert_eq!(bundle.coeffs(), coeffs);
    assert_eq!(bundle.constant(), c0);
}

#[test]
fn test_lmi_to_coeffs_unsplit() {
    init_tracing();
    let v = symbols("x y z");
    let (m1, c1, m2, c2) = two_lmis(&v);
    let lmis = vec![
        Lmi::psd(m1.clone(), c1.clone()).expect("valid"),
        Lmi::nsd(m2.clone(), c2.clone()).expect("valid"),
    ];

    let bundles: Vec<CoefficientBundle<DMatrix<f64>>> =
        lmi_to_coeffs(&lmis, &v, SplitBlocks::None).expect("linear");
    assert_eq!(bundles.len(), 2);
    assert_bundle(
        &bundles[0],
        &[
            dm(2, &[1.0, 0.0, 0.0, 0.0]),
            dm(2, &[0.0, 1.0, 1.0, 0.0]),
            dm(2, &[0.0, 0.0, 0.0, 1.0]),
        ],
        &dm(2, &[0.0, -1.0, -1.0, -1.0]),
    );
    assert_bundle(
        &bundles[1],
        &[
            dm(2, &[0.0, 0.0, 0.0, -2.0]),
            dm(2, &[-1.0, 0.0, 0.0, 0.0]),
            dm(2, &[0.0, 0.0, 0.0, 0.0]),
        ],
        &dm(2, &[30.0, 0.0, 0.0, 40.0]),
    );

    // The same blocks carried by one block-diagonal LMI.
    let carried = MatrixExpr::block_diag([
        m1.try_sub(&c1).expect("same shape"),
        m2.negate().try_add(&c2).expect("same shape"),
    ]);
    let lmi = Lmi::from_matrix(carried).expect("valid");
    let carried_bundles: Vec<CoefficientBundle<DMatrix<f64>>> =
        lmi_to_coeffs(&[lmi], &v, SplitBlocks::BlockDiag).expect("linear");
    assert_eq!(carried_bundles, bundles);
}

#[test]
fn test_lmi_to_coeffs_full_split() {
    init_tracing();
    let v = symbols("x y z");
    let (m1, c1, m2, c2) = two_lmis(&v);
    let lmis = vec![
        Lmi::psd(m1.clone(), c1.clone()).expect("valid"),
        Lmi::nsd(m2.clone(), c2.clone()).expect("valid"),
    ];

    let bundles: Vec<CoefficientBundle<DMatrix<f64>>> =
        lmi_to_coeffs(&lmis, &v, SplitBlocks::Full).expect("linear");
    assert_eq!(bundles.len(), 3);
    assert_bundle(
        &bundles[1],
        &[dm(1, &[0.0]), dm(1, &[-1.0]), dm(1, &[0.0])],
        &dm(1, &[30.0]),
    );
    assert_bundle(
        &bundles[2],
        &[dm(1, &[-2.0]), dm(1, &[0.0]), dm(1, &[0.0])],
        &dm(1, &[40.0]),
    );

    let carried = MatrixExpr::block_diag([
        m1.try_sub(&c1).expect("same shape"),
        m2.negate().try_add(&c2).expect("same shape"),
    ]);
    let lmi = Lmi::from_matrix(carried).expect("valid");
    let carried_bundles: Vec<CoefficientBundle<DMatrix<f64>>> =
        lmi_to_coeffs(&[lmi], &v, SplitBlocks::Full).expect("linear");
    assert_eq!(carried_bundles, bundles);
}

#[test]
fn test_full_split_sees_through_cancelled_coupling() {
    init_tracing();
    let v = symbols("x y z");
    let m = SymMatrix::from_rows([
        [Expr::from(&v[0]), Expr::from(&v[1])],
        [Expr::from(&v[1]), Expr::from(&v[2])],
    ])
    .expect("square");
    let c = SymMatrix::from_rows([
        [Expr::zero(), Expr::from(&v[1])],
        [Expr::from(&v[1]), Expr::zero()],
    ])
    .expect("square");
    let lmi = Lmi::psd(m, c).expect("valid");

    let blocks = canonical_blocks(std::slice::from_ref(&lmi), SplitBlocks::Full).expect("split");
    let shapes: Vec<(usize, usize)> = blocks.iter().map(SymMatrix::shape).collect();
    assert_eq!(shapes, vec![(1, 1), (1, 1)]);

    let bundles: Vec<CoefficientBundle<DMatrix<f64>>> =
        lmi_to_coeffs(&[lmi], &v, SplitBlocks::Full).expect("linear");
    assert_bundle(
        &bundles[0],
        &[dm(1, &[1.0]), dm(1, &[0.0]), dm(1, &[0.0])],
        &dm(1, &[0.0]),
    );
    assert_bundle(
        &bundles[1],
        &[dm(1, &[0.0]), dm(1, &[0.0]), dm(1, &[1.0])],
        &dm(1, &[0.0]),
    );
}

#[test]
fn test_sparse_backend_agrees_with_dense() {
    let v = symbols("x y z");
    let (m1, c1, m2, c2) = two_lmis(&v);
    let lmis = vec![
        Lmi::psd(m1, c1).expect("valid"),
        Lmi::nsd(m2, c2).expect("valid"),
    ];
    let dense: Vec<CoefficientBundle<DMatrix<f64>>> =
        lmi_to_coeffs(&lmis, &v, SplitBlocks::Full).expect("linear");
    let sparse: Vec<CoefficientBundle<LilMatrix>> =
        lmi_to_coeffs(&lmis, &v, SplitBlocks::Full).expect("linear");
    let sparse_dense: Vec<_> = sparse.iter().map(CoefficientBundle::to_dense).collect();
    assert_eq!(sparse_dense, dense);
}

#[test]
fn test_objective_maximize_negates() {
    let v = symbols("x y z");
    let obj = 1.2 + (&v[0] - 3.4 * &v[1]);
    assert_eq!(
        objective_to_coeffs(&obj, &v, ObjectiveSense::Maximize).expect("linear"),
        vec![-1.0, 3.4, 0.0]
    );

    let bilinear = 1.2 + Expr::from(&v[0]) * &v[1];
    assert!(objective_to_coeffs(&bilinear, &v, ObjectiveSense::Minimize).is_err());
}

#[test]
fn test_discover_variables_from_objective_and_lmis() {
    let v = symbols("x1 x2 x3");
    let obj = 1.2 + std::f64::consts::PI * &v[2];
    let lmis = vec![
        Lmi::from_matrix(SymMatrix::from_diagonal([Expr::from(&v[1])])).expect("valid"),
        Lmi::from_matrix(SymMatrix::from_diagonal([1.4 * &v[1] + &v[0]])).expect("valid"),
    ];
    assert_eq!(discover_variables(&obj, &lmis), v);

    let problem = SdpProblem::with_discovered_variables(obj, lmis);
    assert_eq!(problem.variables(), v.as_slice());
}

#[test]
fn test_canonical_round_trip_through_problem() {
    let v = symbols("x y z");
    let (m1, c1, _, _) = two_lmis(&v);
    let lmi = Lmi::nd(Operand::Zero, m1.try_sub(&c1).expect("same shape")).expect("valid");
    let problem = SdpProblem::new(Expr::from(&v[0]), vec![lmi.clone()], v.clone()).expect("distinct");
    let numeric = problem
        .numeric::<LilMatrix>(ObjectiveSense::Minimize, SplitBlocks::None)
        .expect("linear");

    // C₀ + Σ xᵢ·Cᵢ reproduces the canonical matrix.
    let rebuilt = numeric.blocks()[0].to_symbolic(&v);
    let canonical = lmi.canonical_matrix().into_dense();
    let diff = rebuilt.try_sub(&canonical).expect("same shape");
    assert!(diff.entries().iter().all(|e| e.expand().is_zero()));
}
