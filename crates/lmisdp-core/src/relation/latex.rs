use super::lmi::Lmi;
use super::operand::Operand;
use lmisdp_expr::{Expr, SymMatrix};
use std::fmt::{self, Write};

/// LaTeX rendering of an [`Lmi`], e.g. `\begin{bmatrix}x\end{bmatrix} \succeq 0`.
#[derive(Debug, Clone, Copy)]
pub struct LatexLmi<'a> {
    lmi: &'a Lmi,
}

impl<'a> LatexLmi<'a> {
    pub(crate) fn new(lmi: &'a Lmi) -> Self {
        Self { lmi }
    }
}

impl fmt::Display for LatexLmi<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operand(f, self.lmi.lhs())?;
        write!(f, " {} ", self.lmi.kind().latex_op())?;
        write_operand(f, self.lmi.rhs())
    }
}

fn write_operand(out: &mut impl Write, operand: &Operand) -> fmt::Result {
    match operand {
        Operand::Zero => out.write_str("0"),
        Operand::Matrix(m) => write_matrix(out, &m.to_dense()),
    }
}

fn write_matrix(out: &mut impl Write, m: &SymMatrix) -> fmt::Result {
    out.write_str(r"\begin{bmatrix}")?;
    for i in 0..m.rows() {
        if i > 0 {
            out.write_str(r"\\")?;
        }
        for j in 0..m.cols() {
            if j > 0 {
                out.write_str(" & ")?;
            }
            write_expr(out, m.get(i, j))?;
        }
    }
    out.write_str(r"\end{bmatrix}")
}

fn write_expr(out: &mut impl Write, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Const(c) => write!(out, "{c}"),
        Expr::Symbol(s) => write!(out, "{s}"),
        Expr::Add(terms) => {
            for (idx, term) in terms.iter().enumerate() {
                if idx > 0 {
                    out.write_str(" + ")?;
                }
                write_expr(out, term)?;
            }
            Ok(())
        }
        Expr::Mul(factors) => {
            let mut rest = factors.as_slice();
            if let [Expr::Const(c), tail @ ..] = rest {
                if *c == -1.0 {
                    out.write_str("-")?;
                    rest = tail;
                }
            }
            for (idx, factor) in rest.iter().enumerate() {
                if idx > 0 {
                    out.write_str(" ")?;
                }
                if matches!(factor, Expr::Add(_)) {
                    out.write_str(r"\left(")?;
                    write_expr(out, factor)?;
                    out.write_str(r"\right)")?;
                } else {
                    write_expr(out, factor)?;
                }
            }
            Ok(())
        }
        Expr::Pow(base, exp) => {
            if matches!(base.as_ref(), Expr::Symbol(_)) {
                write_expr(out, base)?;
            } else {
                out.write_str(r"\left(")?;
                write_expr(out, base)?;
                out.write_str(r"\right)")?;
            }
            write!(out, "^{{{exp}}}")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::relation::{Lmi, Operand};
    use lmisdp_expr::{Expr, SymMatrix, symbols};

    #[test]
    fn test_latex_psd() {
        let v = symbols("x y z");
        let m = SymMatrix::from_rows([
            [Expr::from(&v[0]), Expr::from(&v[1])],
            [Expr::from(&v[1]), &v[2] + 1.0],
        ])
        .expect("square");
        let lmi = Lmi::from_matrix(m).expect("valid");
        assert_eq!(
            lmi.latex().to_string(),
            r"\begin{bmatrix}x & y\\y & 1 + z\end{bmatrix} \succeq 0"
        );
    }

    #[test]
    fn test_latex_operators() {
        let m = SymMatrix::from_rows([[2.0]]).expect("square");
        let strict = Lmi::nd(Operand::Zero, m.clone()).expect("valid");
        assert_eq!(strict.latex().to_string(), r"0 \prec \begin{bmatrix}2\end{bmatrix}");
        let lmi = Lmi::nsd(m.clone(), Operand::Zero).expect("valid");
        assert!(lmi.latex().to_string().contains(r"\preceq"));
        let lmi = Lmi::pd(m, Operand::Zero).expect("valid");
        assert!(lmi.latex().to_string().contains(r"\succ "));
    }

    #[test]
    fn test_latex_products_and_powers() {
        let v = symbols("x y");
        let e = -(Expr::from(&v[0]) * (&v[1] + 1.0));
        let m = SymMatrix::from_rows([[e]]).expect("square");
        let lmi = Lmi::with_symmetry_check(m, Operand::Zero, crate::relation::LmiKind::Psd, false)
            .expect("valid");
        let text = lmi.latex().to_string();
        assert!(text.contains(r"\left(1 + y\right)"), "{text}");

        let m = SymMatrix::from_rows([[Expr::pow(Expr::from(&v[0]), 2)]]).expect("square");
        let lmi = Lmi::from_matrix(m).expect("valid");
        assert!(lmi.latex().to_string().contains("x^{2}"));
    }
}
