//! `optimize_log`: fit a demographic model to a data spectrum by maximizing
//! the likelihood over log-parameters.
use std::cell::RefCell;

use argmin::core::Error;
use tracing::{debug, info, warn};

use crate::{
    optimization::{
        errors::OptResult,
        fit::{
            objective::{ModelFunc, SfsObjective},
            options::{Bounds, DEFAULT_EPSILON, FitOptions},
            session::{FitSession, ProgressObserver, TracingObserver},
        },
        loglik_optimizer::{
            Hessian, LogLikelihood, OptimOutcome, Theta, finite_diff::fixed_step_hessian,
            maximize,
        },
        numerical_stability::{from_log_params, to_log_params},
    },
    spectrum::Spectrum,
};

/// Result of a spectrum fit.
///
/// - `params`: best-fit parameters in natural space.
/// - `outcome`: solver diagnostics in log space (`theta_hat = ln params`,
///   `value` = best log-likelihood, convergence status, counters).
/// - `evaluations`: objective evaluations in this fit, penalized points and
///   Hessian evaluations included.
/// - `hessian`: Hessian of `−ℓ` with respect to log-parameters at the
///   optimum, from central second differences with step `epsilon`
///   (`DEFAULT_EPSILON` when `epsilon` is `None`); only with
///   `full_output`, and `None` when it could not be formed.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub params: Theta,
    pub outcome: OptimOutcome,
    pub evaluations: u64,
    pub hessian: Option<Hessian>,
}

/// Fit `model_func` to `data`, reporting progress through `tracing`.
///
/// See [`optimize_log_with_observer`].
pub fn optimize_log<M, R>(
    p0: &[f64], data: &Spectrum, model_func: &M, pts: &R, bounds: &Bounds, options: &FitOptions,
) -> OptResult<FitOutcome>
where
    M: ModelFunc<R>,
    R: ?Sized,
{
    optimize_log_with_observer(p0, data, model_func, pts, bounds, options, &TracingObserver)
}

/// Fit `model_func` to `data`, sending progress reports to `observer`.
///
/// Parameters
/// ----------
/// - `p0`: `&[f64]`
///   Starting parameters; non-empty, finite, strictly positive.
/// - `data`: `&Spectrum`
///   Observed spectrum. Its sample sizes are passed to the model.
/// - `model_func`: `&M`
///   Expected-spectrum model, called only at in-bounds points.
/// - `pts`: `&R`
///   Resolution handed to every model call unchanged.
/// - `bounds`: `&Bounds`
///   Natural-space box; out-of-bounds points score `−1e8`.
/// - `options`: `&FitOptions`
///   Scoring mode, progress cadence and solver settings.
/// - `observer`: `&dyn ProgressObserver`
///   Receives every `options.verbose`-th evaluation.
///
/// Returns
/// -------
/// `OptResult<FitOutcome>`
///   The best point found. A run that hits the iteration cap still
///   returns `Ok` with `outcome.converged` telling the caller.
///
/// Errors
/// ------
/// - `OptError::InvalidInitialParams` for a bad `p0`.
/// - `OptError::BoundsLengthMismatch` / `OptError::InvalidBounds`.
/// - `OptError::InvalidFdStep` and other option errors.
/// - `OptError::Spectrum` when the model's shape differs from the data's.
/// - Solver failures surfaced by `argmin`.
pub fn optimize_log_with_observer<M, R>(
    p0: &[f64], data: &Spectrum, model_func: &M, pts: &R, bounds: &Bounds, options: &FitOptions,
    observer: &dyn ProgressObserver,
) -> OptResult<FitOutcome>
where
    M: ModelFunc<R>,
    R: ?Sized,
{
    let theta0 = to_log_params(p0)?;
    bounds.validate(p0.len())?;
    let mle = options.solver_options()?;

    let session = FitSession::new(observer, options.verbose, options.flush_delay);
    let objective = SfsObjective::new(model_func, pts, bounds, options, session);
    debug!(
        n_params = p0.len(),
        sample_sizes = ?data.sample_sizes(),
        fold = options.fold,
        multinom = options.multinom,
        epsilon = ?options.epsilon,
        "starting log-space spectrum fit"
    );

    let outcome = maximize(&objective, theta0, data, &mle)?;
    let hessian = if options.full_output {
        let step = options.epsilon.unwrap_or(DEFAULT_EPSILON);
        log_space_hessian(&objective, data, &outcome.theta_hat, step)
    } else {
        None
    };
    let params = from_log_params(&outcome.theta_hat);
    let evaluations = objective.session().evaluations();
    info!(
        log_likelihood = outcome.value,
        converged = outcome.converged,
        status = %outcome.status,
        iterations = outcome.iterations,
        evaluations,
        params = ?params.to_vec(),
        "spectrum fit finished"
    );
    Ok(FitOutcome { params, outcome, evaluations, hessian })
}

// ---- Helper Methods ----

/// Second-difference Hessian of the cost `−ℓ` at `theta_hat` with step
/// `step`, or `None` with a warning when the curvature cannot be formed
/// (typically an optimum on a bound, where neighbouring points are
/// penalized).
fn log_space_hessian<M, R>(
    objective: &SfsObjective<'_, M, R>, data: &Spectrum, theta_hat: &Theta, step: f64,
) -> Option<Hessian>
where
    M: ModelFunc<R>,
    R: ?Sized,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost = |theta: &Theta| -> f64 {
        match objective.value(theta, data) {
            Ok(value) => -value,
            Err(err) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(err.into());
                }
                f64::NAN
            }
        }
    };
    match fixed_step_hessian(theta_hat, &cost, step, &closure_err) {
        Ok(hessian) => Some(hessian),
        Err(err) => {
            warn!(error = %err, "could not form the log-space Hessian at the optimum");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{errors::OptError, fit::session::WriterObserver};
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Input validation before any model call.
    // - A small Poisson scale fit with progress written to a buffer.
    //
    // Larger end-to-end fits live in `tests/fit_pipeline.rs`.
    // -------------------------------------------------------------------------

    fn data() -> Spectrum {
        Spectrum::from_shape_vec(&[5], vec![0.0, 12.0, 6.0, 3.0, 0.0], true).unwrap()
    }

    fn scaled_model(params: &Theta, ns: &[usize], _pts: &()) -> Spectrum {
        let base = [0.0, 4.0, 2.0, 1.0, 0.0];
        Spectrum::from_shape_vec(&[ns[0] + 1], base.iter().map(|b| b * params[0]).collect(), true)
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Bad starting points and bounds are rejected up front.
    //
    // Given
    // -----
    // - p0 = (0), p0 = (1) with two-entry bounds, a zero epsilon.
    //
    // Expect
    // ------
    // - `InvalidInitialParams`, `BoundsLengthMismatch`, `InvalidFdStep`.
    fn rejects_invalid_inputs() {
        // Arrange
        let data = data();
        let options = FitOptions::default();
        let wide = Bounds::new(Some(vec![0.1, 0.1]), None);
        let zero_eps = FitOptions { epsilon: Some(0.0), ..FitOptions::default() };
        let none = Bounds::unbounded();

        // Act
        let bad_p0 = optimize_log(&[0.0], &data, &scaled_model, &(), &none, &options);
        let bad_bounds = optimize_log(&[1.0], &data, &scaled_model, &(), &wide, &options);
        let bad_eps = optimize_log(&[1.0], &data, &scaled_model, &(), &none, &zero_eps);

        // Assert
        assert!(matches!(bad_p0, Err(OptError::InvalidInitialParams { .. })));
        assert!(matches!(bad_bounds, Err(OptError::BoundsLengthMismatch { .. })));
        assert!(matches!(bad_eps, Err(OptError::InvalidFdStep { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A one-parameter Poisson fit recovers the scale, reports progress and
    // returns the log-space Hessian.
    //
    // Given
    // -----
    // - data = 3 × base, p0 = 1, bounds [1e-3, 100], Poisson scoring,
    //   `verbose = 1`, `full_output`.
    //
    // Expect
    // ------
    // - params ≈ 3; one progress line per evaluation; Hessian ≈ 3·Σbase = 21.
    fn scale_fit_reports_progress_and_hessian() {
        // Arrange
        let data = data();
        let bounds = Bounds::new(Some(vec![1e-3]), Some(vec![100.0]));
        let options = FitOptions {
            multinom: false,
            verbose: Some(1),
            full_output: true,
            ..FitOptions::default()
        };
        let observer = WriterObserver::new(Vec::new());

        // Act
        let fit = optimize_log_with_observer(
            &[1.0],
            &data,
            &scaled_model,
            &(),
            &bounds,
            &options,
            &observer,
        )
        .unwrap();

        // Assert
        assert_relative_eq!(fit.params[0], 3.0, max_relative = 1e-3);
        assert_relative_eq!(fit.outcome.theta_hat[0].exp(), fit.params[0], max_relative = 1e-12);
        let lines = String::from_utf8(observer.into_inner()).unwrap().lines().count() as u64;
        assert_eq!(lines, fit.evaluations);
        let hessian = fit.hessian.expect("Hessian requested with full_output");
        assert_relative_eq!(hessian[[0, 0]], 21.0, max_relative = 1e-2);
    }
}
