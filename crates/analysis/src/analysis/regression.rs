//! Logit-link regression of scaled genetic distance on other distances.
//!
//! The outcome is a proportion in `[0, 1]`, so the fit maximizes the
//! Bernoulli quasi-likelihood with Newton–Raphson. The design matrix has no
//! intercept unless [`Intercept::Include`] is requested.

use crate::analysis::utils::{mean, two_sided_p_value};
use crate::errors::RegressionError;
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Halvings tried before a Newton step is accepted as is.
const MAX_STEP_HALVINGS: usize = 30;

/// Reciprocal condition number below which the Hessian counts as singular.
const HESSIAN_RCOND: f64 = 1e-12;

/// Whether a constant column is prepended to the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intercept {
    /// Regress through the origin
    #[default]
    Omit,
    /// Add a `const` coefficient
    Include,
}

/// Newton–Raphson stopping rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogitOptions {
    /// Maximum Newton iterations
    pub max_iter: usize,
    /// Convergence threshold on the largest parameter change
    pub tol: f64,
}

impl Default for LogitOptions {
    fn default() -> Self {
        Self {
            max_iter: 35,
            tol: 1e-8,
        }
    }
}

/// One fitted coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coefficient {
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
}

/// Result of a logit fit.
#[derive(Debug, Clone, Serialize)]
pub struct LogitResults {
    /// Coefficient names, `const` first when an intercept was fitted
    pub names: Vec<String>,
    pub params: Vec<f64>,
    /// Standard errors from the inverse Hessian
    pub bse: Vec<f64>,
    pub zvalues: Vec<f64>,
    /// Two-sided p-values of the z statistics
    pub pvalues: Vec<f64>,
    /// Log-likelihood at the estimate
    pub llf: f64,
    /// Log-likelihood of the constant-only model
    pub llnull: f64,
    /// McFadden pseudo-R², `1 - llf / llnull`
    pub prsquared: f64,
    pub n_obs: usize,
    pub iterations: usize,
    pub intercept: Intercept,
}

impl LogitResults {
    /// Look up a coefficient by name.
    pub fn coefficient(&self, name: &str) -> Option<Coefficient> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(Coefficient {
            estimate: self.params[idx],
            std_error: self.bse[idx],
            z_value: self.zvalues[idx],
            p_value: self.pvalues[idx],
        })
    }

    /// Predicted mean outcome for each row of regressor values.
    ///
    /// Rows list the regressors in fit order, without the constant.
    pub fn predict<R: AsRef<[f64]>>(&self, rows: &[R]) -> Result<Vec<f64>, RegressionError> {
        let offset = usize::from(self.intercept == Intercept::Include);
        let width = self.params.len() - offset;
        rows.iter()
            .map(|row| {
                let row = row.as_ref();
                if row.len() != width {
                    return Err(RegressionError::LengthMismatch {
                        endog: width,
                        exog: row.len(),
                    });
                }
                let constant = if offset == 1 { self.params[0] } else { 0.0 };
                let eta = constant
                    + row
                        .iter()
                        .zip(&self.params[offset..])
                        .map(|(x, b)| x * b)
                        .sum::<f64>();
                Ok(sigmoid(eta))
            })
            .collect()
    }
}

#[inline]
fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^x)` without overflow.
#[inline]
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

fn log_likelihood(y: &DVector<f64>, eta: &DVector<f64>) -> f64 {
    y.iter()
        .zip(eta.iter())
        .map(|(&y, &eta)| -y * softplus(-eta) - (1.0 - y) * softplus(eta))
        .sum()
}

/// Fit a logit regression.
///
/// # Arguments
///
/// * `endog` - Outcome values in `[0, 1]`
/// * `regressors` - Named regressor columns, each as long as `endog`
/// * `intercept` - Whether to add a constant column
/// * `options` - Iteration limit and tolerance
///
/// # Errors
///
/// * [`RegressionError::Empty`] / [`RegressionError::LengthMismatch`] for
///   malformed input
/// * [`RegressionError::ConstantOutcome`] when every outcome is equal
/// * [`RegressionError::Singular`] when the Hessian cannot be inverted
/// * [`RegressionError::NotConverged`] when the iteration limit is reached
///   or the estimate diverges
pub fn fit_logit(
    endog: &[f64],
    regressors: &[(&str, &[f64])],
    intercept: Intercept,
    options: &LogitOptions,
) -> Result<LogitResults, RegressionError> {
    let n = endog.len();
    if n == 0 {
        return Err(RegressionError::Empty);
    }
    for (_, column) in regressors {
        if column.len() != n {
            return Err(RegressionError::LengthMismatch {
                endog: n,
                exog: column.len(),
            });
        }
    }
    if let Some(index) = endog.iter().position(|v| !(0.0..=1.0).contains(v)) {
        return Err(RegressionError::OutcomeOutOfRange {
            index,
            value: endog[index],
        });
    }
    if endog.iter().all(|&v| v == endog[0]) {
        return Err(RegressionError::ConstantOutcome(endog[0]));
    }

    let mut names = Vec::with_capacity(regressors.len() + 1);
    if intercept == Intercept::Include {
        names.push("const".to_string());
    }
    names.extend(regressors.iter().map(|(name, _)| name.to_string()));
    let k = names.len();
    if k == 0 {
        return Err(RegressionError::Singular { iteration: 0 });
    }

    let offset = usize::from(intercept == Intercept::Include);
    let x = DMatrix::from_fn(n, k, |i, j| {
        if j < offset { 1.0 } else { regressors[j - offset].1[i] }
    });
    let y = DVector::from_column_slice(endog);

    let mut beta = DVector::zeros(k);
    let mut eta = &x * &beta;
    let mut llf = log_likelihood(&y, &eta);
    let mut converged = false;
    let mut last_step = f64::INFINITY;
    let mut iterations = 0;

    while iterations < options.max_iter {
        iterations += 1;
        let residual = DVector::from_fn(n, |i, _| {
            y[i] * sigmoid(-eta[i]) - (1.0 - y[i]) * sigmoid(eta[i])
        });
        let gradient = x.transpose() * residual;
        let chol = factorize(hessian(&x, &eta), iterations)?;
        let mut step = chol.solve(&gradient);

        let mut candidate = &beta + &step;
        let mut candidate_eta = &x * &candidate;
        let mut candidate_llf = log_likelihood(&y, &candidate_eta);
        let mut halvings = 0;
        while !(candidate_llf >= llf) && halvings < MAX_STEP_HALVINGS {
            step /= 2.0;
            candidate = &beta + &step;
            candidate_eta = &x * &candidate;
            candidate_llf = log_likelihood(&y, &candidate_eta);
            halvings += 1;
        }

        last_step = step.amax();
        beta = candidate;
        eta = candidate_eta;
        llf = candidate_llf;
        debug!(iteration = iterations, llf, step = last_step, halvings, "newton step");

        if !last_step.is_finite() || beta.iter().any(|b| !b.is_finite()) {
            break;
        }
        if last_step < options.tol {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(iterations, last_step, "logit fit did not converge");
        return Err(RegressionError::NotConverged {
            iterations,
            last_step,
        });
    }

    let covariance = factorize(hessian(&x, &eta), iterations)?.inverse();

    let params: Vec<f64> = beta.iter().copied().collect();
    let bse: Vec<f64> = (0..k).map(|j| covariance[(j, j)].sqrt()).collect();
    let zvalues: Vec<f64> = params.iter().zip(&bse).map(|(b, se)| b / se).collect();
    let pvalues = zvalues.iter().map(|&z| two_sided_p_value(z)).collect();

    let ybar = mean(endog);
    let llnull = endog
        .iter()
        .map(|&v| v * ybar.ln() + (1.0 - v) * (1.0 - ybar).ln())
        .sum::<f64>();
    let prsquared = 1.0 - llf / llnull;

    debug!(iterations, llf, llnull, prsquared, "logit fit converged");

    Ok(LogitResults {
        names,
        params,
        bse,
        zvalues,
        pvalues,
        llf,
        llnull,
        prsquared,
        n_obs: n,
        iterations,
        intercept,
    })
}

/// `XᵀWX` with `W = diag(p(1-p))`, evaluated from the linear predictor.
fn hessian(x: &DMatrix<f64>, eta: &DVector<f64>) -> DMatrix<f64> {
    let weights = eta.map(|eta| sigmoid(eta) * sigmoid(-eta));
    let mut weighted = x.clone();
    for (mut row, w) in weighted.row_iter_mut().zip(weights.iter()) {
        row *= *w;
    }
    x.transpose() * weighted
}

fn factorize(
    hessian: DMatrix<f64>,
    iteration: usize,
) -> Result<Cholesky<f64, Dyn>, RegressionError> {
    let sv = hessian.singular_values();
    if !(sv.min() > sv.max() * HESSIAN_RCOND) {
        return Err(RegressionError::Singular { iteration });
    }
    hessian
        .cholesky()
        .ok_or(RegressionError::Singular { iteration })
}
