//! The optimizer's public vocabulary.
//!
//! - [`LogLikelihood`]: what a model implements to be maximized.
//! - [`Tolerances`], [`LineSearcher`], [`MLEOptions`]: run configuration.
//! - [`OptimOutcome`]: the normalized result of a run.
//!
//! Everything here speaks in log-likelihood terms. The adapter turns
//! `ℓ(θ)` into the cost `−ℓ(θ)` that `argmin` minimizes and turns the best
//! cost back into `ℓ(θ̂)` afterwards.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{
            validate_theta_hat, validate_value, verify_fd_step, verify_tol_cost, verify_tol_grad,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// A log-likelihood over an optimizer-space parameter vector.
///
/// - `value` returns `ℓ(θ)`; failures are `OptError`s, never panics.
/// - `check` runs once on the starting point before the solver starts.
/// - `grad` returns `∇ℓ(θ)`. The default reports
///   `OptError::GradientNotImplemented`, which switches the adapter to
///   finite differences of the cost.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS.
///
/// Parses case-insensitively from `"MoreThuente"` or `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver configuration.
///
/// Fields
/// ------
/// - `tols`: stopping rules.
/// - `line_searcher`: line search paired with L-BFGS.
/// - `verbose`: attach the slog observer (only with the `obs_slog` feature).
/// - `lbfgs_mem`: history length; `None` means [`DEFAULT_LBFGS_MEM`].
/// - `fd_step`: fixed forward-difference step for numerical gradients;
///   `None` uses central differences with `finitediff`'s adaptive step.
///
/// [`DEFAULT_LBFGS_MEM`]: crate::optimization::loglik_optimizer::DEFAULT_LBFGS_MEM
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub fd_step: Option<f64>,
}

impl MLEOptions {
    /// Build options with adaptive finite differences.
    ///
    /// Errors
    /// ------
    /// - `OptError::InvalidLBFGSMem` when `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(0) = lbfgs_mem {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem, fd_step: None })
    }

    /// Replace the finite-difference step.
    ///
    /// Errors
    /// ------
    /// - `OptError::InvalidFdStep` for a non-finite or non-positive step.
    pub fn with_fd_step(mut self, fd_step: Option<f64>) -> OptResult<Self> {
        verify_fd_step(fd_step)?;
        self.fd_step = fd_step;
        Ok(self)
    }
}

impl Default for MLEOptions {
    /// `tol_grad = 1e-6`, `max_iter = 300`, More–Thuente, default memory,
    /// adaptive finite differences.
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
            fd_step: None,
        }
    }
}

/// Stopping rules. At least one must be set.
///
/// - `tol_grad`: stop once the cost gradient norm drops below this.
/// - `tol_cost`: stop once successive costs differ by less than this.
/// - `max_iter`: hard iteration cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Validated constructor.
    ///
    /// Errors
    /// ------
    /// - `OptError::NoTolerancesProvided` when all three are `None`.
    /// - `OptError::InvalidTolGrad` / `OptError::InvalidTolCost` for
    ///   non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` for `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if let Some(0) = max_iter {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of [`maximize`](crate::optimization::loglik_optimizer::maximize).
///
/// - `theta_hat`: best optimizer-space parameters.
/// - `value`: `ℓ(θ̂)`, not the cost.
/// - `converged`: `true` only when the solver met a tolerance or the target
///   cost. Iteration caps and line-search aborts leave it `false`.
/// - `status`: the termination status as `argmin` reported it.
/// - `iterations`, `fn_evals`: solver counters.
/// - `grad_norm`: L2 norm of the last cost gradient, when one was kept.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Assemble an outcome from raw solver state.
    ///
    /// Errors
    /// ------
    /// - `OptError::MissingThetaHat` / `OptError::InvalidThetaHat` for a
    ///   missing or non-finite best parameter.
    /// - `OptError::NonFiniteCost` for a non-finite `value`.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat)?;
        validate_value(value)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = match termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            other => format!("{other:?}"),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}
