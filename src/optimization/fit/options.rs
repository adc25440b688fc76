//! Configuration for a spectrum fit: what to score and how to search.
use std::time::Duration;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{LineSearcher, MLEOptions, Theta, Tolerances},
};

/// Default finite-difference step in log-parameter space.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Default gradient-norm tolerance for spectrum fits.
pub const DEFAULT_TOL_GRAD: f64 = 1e-5;

/// Options for [`optimize_log`](crate::optimization::fit::optimize_log).
///
/// Fields
/// ------
/// - `fold`: fold model and data before scoring.
/// - `multinom`: score with the multinomial likelihood (model rescaled to
///   the data's mass) instead of the Poisson likelihood.
/// - `verbose`: report progress every `k` evaluations; `None` or `Some(0)`
///   never reports.
/// - `flush_delay`: minimum time between observer flushes.
/// - `epsilon`: forward-difference step in log space; `None` switches to
///   adaptive central differences.
/// - `mle`: stopping rules, line search and L-BFGS memory. Its `fd_step`
///   is overwritten by `epsilon`.
/// - `full_output`: also compute the log-space Hessian at the optimum.
///
/// Default
/// -------
/// Unfolded, multinomial, silent, 0.5 s flush delay, `epsilon = 1e-4`,
/// `tol_grad = 1e-5`, at most 1000 iterations, More–Thuente line search,
/// no Hessian.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub fold: bool,
    pub multinom: bool,
    pub verbose: Option<u64>,
    pub flush_delay: Duration,
    pub epsilon: Option<f64>,
    pub mle: MLEOptions,
    pub full_output: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            fold: false,
            multinom: true,
            verbose: None,
            flush_delay: Duration::from_millis(500),
            epsilon: Some(DEFAULT_EPSILON),
            mle: MLEOptions {
                tols: Tolerances {
                    tol_grad: Some(DEFAULT_TOL_GRAD),
                    tol_cost: None,
                    max_iter: Some(1000),
                },
                line_searcher: LineSearcher::MoreThuente,
                verbose: false,
                lbfgs_mem: None,
                fd_step: None,
            },
            full_output: false,
        }
    }
}

impl FitOptions {
    /// Solver options with `fd_step` taken from `epsilon`.
    ///
    /// Errors
    /// ------
    /// - `OptError::InvalidFdStep` for a non-finite or non-positive
    ///   `epsilon`.
    pub fn solver_options(&self) -> OptResult<MLEOptions> {
        self.mle.clone().with_fd_step(self.epsilon)
    }
}

/// Box constraints on natural-space parameters.
///
/// Either side may be absent. Inside a present side, `±∞` leaves that
/// parameter unbounded. A point sitting exactly on a bound is inside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    lower: Option<Theta>,
    upper: Option<Theta>,
}

impl Bounds {
    pub fn new(lower: Option<Vec<f64>>, upper: Option<Vec<f64>>) -> Self {
        Self { lower: lower.map(Theta::from), upper: upper.map(Theta::from) }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn lower(&self) -> Option<&Theta> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Theta> {
        self.upper.as_ref()
    }

    /// Check the bounds against a parameter count.
    ///
    /// Errors
    /// ------
    /// - `OptError::BoundsLengthMismatch` when a side has the wrong length.
    /// - `OptError::InvalidBounds` for a NaN bound or `lower > upper`.
    pub fn validate(&self, dim: usize) -> OptResult<()> {
        for (which, side) in [("lower", &self.lower), ("upper", &self.upper)] {
            if let Some(side) = side {
                if side.len() != dim {
                    return Err(OptError::BoundsLengthMismatch {
                        which,
                        expected: dim,
                        found: side.len(),
                    });
                }
            }
        }
        for index in 0..dim {
            let lower = self.lower.as_ref().map_or(f64::NEG_INFINITY, |l| l[index]);
            let upper = self.upper.as_ref().map_or(f64::INFINITY, |u| u[index]);
            if lower.is_nan() || upper.is_nan() || lower > upper {
                return Err(OptError::InvalidBounds { index, lower, upper });
            }
        }
        Ok(())
    }

    /// `true` when every parameter lies within its bounds. NaN parameters
    /// are never inside.
    pub fn contains(&self, params: &Theta) -> bool {
        let above_lower = self
            .lower
            .as_ref()
            .map_or(true, |lower| params.iter().zip(lower.iter()).all(|(p, lo)| p >= lo));
        let below_upper = self
            .upper
            .as_ref()
            .map_or(true, |upper| params.iter().zip(upper.iter()).all(|(p, hi)| p <= hi));
        above_lower && below_upper && params.iter().all(|p| !p.is_nan())
    }
}
