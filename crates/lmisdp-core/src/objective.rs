//! Objective coefficient extraction.

use crate::error::LmiError;
use lmisdp_expr::{Expr, Symbol, linear_form};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Direction of optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectiveSense::Minimize => "minimize",
            ObjectiveSense::Maximize => "maximize",
        }
    }
}

impl fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectiveSense {
    type Err = LmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" | "minimize" => Ok(ObjectiveSense::Minimize),
            "max" | "maximize" => Ok(ObjectiveSense::Maximize),
            _ => Err(LmiError::InvalidObjectiveSense {
                value: s.to_string(),
            }),
        }
    }
}

/// Objective coefficients for a minimization problem.
///
/// A maximized objective is negated first, so the result always minimizes.
/// The constant part of the objective is discarded.
pub fn objective_to_coeffs(
    objective: &Expr,
    variables: &[Symbol],
    sense: ObjectiveSense,
) -> Result<Vec<f64>, LmiError> {
    let objective = match sense {
        ObjectiveSense::Minimize => Cow::Borrowed(objective),
        ObjectiveSense::Maximize => Cow::Owned(objective.negate()),
    };
    let (coeffs, _) = linear_form(&objective, variables)?.into_parts();
    tracing::debug!(
        component = "objective",
        operation = "extract",
        status = "success",
        sense = sense.as_str(),
        variables = variables.len(),
        "Extracted objective coefficients"
    );
    Ok(coeffs)
}
