//! Executor wiring shared by both line searches.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{Executor, State};
use tracing::debug;

/// Run a configured L-BFGS solver on `problem` from `theta0`.
///
/// Parameters
/// ----------
/// - `theta0`: `Theta`
///   Starting point, moved into the executor state.
/// - `opts`: `&MLEOptions`
///   Supplies `max_iter` and `verbose`.
/// - `problem`: `ArgMinAdapter<'a, F>`
///   Model and data, already carrying the finite-difference scheme.
/// - `solver`: `S`
///   Output of one of the `build_optimizer_*` builders.
///
/// Returns
/// -------
/// `OptResult<OptimOutcome>`
///   Best parameters, `ℓ(θ̂)`, termination status and counters.
///
/// Errors
/// ------
/// - Solver failures, including line-search failures and errors raised by
///   the model, via `From<argmin::core::Error>`.
/// - Validation errors from [`OptimOutcome::new`].
///
/// Notes
/// -----
/// - The model is not evaluated here; the first evaluation happens inside
///   the solver so evaluation counters stay exact.
/// - With the `obs_slog` feature and `opts.verbose`, `argmin`'s terminal
///   observer reports every iteration.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    debug!(dim = theta0.len(), max_iter = ?opts.tols.max_iter, "starting L-BFGS");
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
