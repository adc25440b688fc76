//! Integration tests for log-space demographic model fitting.
//!
//! Purpose
//! -------
//! - Fit small closed-form "demographic" models to spectra through the
//!   public `sfs_fit::optimization` surface and check that the known
//!   maximum-likelihood parameters are recovered.
//! - Cover both scoring modes: Poisson (absolute scale is a parameter) and
//!   multinomial (scale optimized out analytically).
//!
//! Coverage
//! --------
//! - `optimization::fit::optimize_log` and `optimize_log_with_observer`
//!   with default and customized `FitOptions`.
//! - `likelihood::optimal_sfs_scaling` on the fitted model.
//! - Error surfacing when the model returns the wrong shape.
//!
//! Exclusions
//! ----------
//! - Line-search and tolerance validation, finite-difference helpers and
//!   single-point objective outcomes; unit tests cover those.
use approx::assert_relative_eq;
use sfs_fit::{
    likelihood::{ll_multinom, optimal_sfs_scaling},
    optimization::prelude::*,
    spectrum::{fold, Spectrum, SpectrumError},
};

/// Route crate `tracing` events to the test harness output once.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 1-D power-law spectrum `scale · i^{-exponent}` for `i = 1..n-1`, corners
/// masked.
fn power_law(n: usize, scale: f64, exponent: f64) -> Spectrum {
    let values = (0..=n)
        .map(|i| if i == 0 || i == n { 0.0 } else { scale * (i as f64).powf(-exponent) })
        .collect();
    Spectrum::from_shape_vec(&[n + 1], values, true).unwrap()
}

/// Models here ignore the resolution argument.
const NO_PTS: &[usize] = &[];

/// Model with a shape parameter only: `i^{-a}`.
fn shape_model(params: &Theta, ns: &[usize], _pts: &[usize]) -> Spectrum {
    power_law(ns[0], 1.0, params[0])
}

/// Model with scale and shape: `A · i^{-a}`.
fn scale_shape_model(params: &Theta, ns: &[usize], _pts: &[usize]) -> Spectrum {
    power_law(ns[0], params[0], params[1])
}

#[test]
// Purpose
// -------
// A multinomial fit recovers the exponent of a power-law spectrum, and the
// optimal scaling recovers the amplitude afterwards.
//
// Given
// -----
// - data = 1000 · i^{-1.5}, n = 12.
// - Model i^{-a}, p0 = (1.0), bounds a ∈ [0.1, 5], default options.
//
// Expect
// ------
// - a ≈ 1.5; θ* ≈ 1000; converged; best log-likelihood equals
//   `ll_multinom` of the fitted model.
fn multinomial_fit_recovers_exponent() {
    init_tracing();

    // Arrange
    let data = power_law(12, 1000.0, 1.5);
    let bounds = Bounds::new(Some(vec![0.1]), Some(vec![5.0]));
    let options = FitOptions::default();
    let pts = [20usize, 30, 40];

    // Act
    let fit = optimize_log(&[1.0], &data, &shape_model, &pts[..], &bounds, &options).unwrap();

    // Assert
    assert_relative_eq!(fit.params[0], 1.5, max_relative = 1e-3);
    assert!(fit.outcome.converged, "status: {}", fit.outcome.status);
    assert!(fit.evaluations > 0);
    assert!(fit.hessian.is_none());

    let model = shape_model(&fit.params, &data.sample_sizes(), &pts);
    let theta_star = optimal_sfs_scaling(&model, &data).unwrap();
    assert_relative_eq!(theta_star, 1000.0, max_relative = 1e-2);
    assert_relative_eq!(
        fit.outcome.value,
        ll_multinom(&model, &data).unwrap(),
        max_relative = 1e-9
    );
}

#[test]
// Purpose
// -------
// A two-parameter Poisson fit recovers amplitude and exponent together.
//
// Given
// -----
// - data = 500 · i^{-1.2}, n = 10.
// - Model A · i^{-a}, p0 = (100, 1.0), bounds A ∈ [1, 1e4], a ∈ [0.1, 5].
// - Poisson scoring, central differences (`epsilon = None`), full output.
//
// Expect
// ------
// - A ≈ 500 and a ≈ 1.2 within 1%.
// - A 2×2 symmetric log-space Hessian with a positive diagonal.
fn poisson_fit_recovers_scale_and_shape() {
    init_tracing();

    // Arrange
    let data = power_law(10, 500.0, 1.2);
    let bounds = Bounds::new(Some(vec![1.0, 0.1]), Some(vec![1e4, 5.0]));
    let options = FitOptions {
        multinom: false,
        epsilon: None,
        full_output: true,
        ..FitOptions::default()
    };

    // Act
    let fit =
        optimize_log(&[100.0, 1.0], &data, &scale_shape_model, NO_PTS, &bounds, &options)
            .unwrap();

    // Assert
    assert_relative_eq!(fit.params[0], 500.0, max_relative = 1e-2);
    assert_relative_eq!(fit.params[1], 1.2, max_relative = 1e-2);

    let hessian = fit.hessian.expect("full_output requests the Hessian");
    assert_eq!(hessian.dim(), (2, 2));
    assert!(hessian[[0, 0]] > 0.0 && hessian[[1, 1]] > 0.0);
    assert_relative_eq!(hessian[[0, 1]], hessian[[1, 0]], epsilon = 1e-9);
}

#[test]
// Purpose
// -------
// Folding applies to both model and data, so a folded fit still finds the
// generating exponent, and every reported point is in natural space.
//
// Given
// -----
// - Unfolded data 1000 · i^{-1.5}, n = 12; `fold = true`, multinomial.
// - A `WriterObserver` receiving every 5th evaluation.
//
// Expect
// ------
// - a ≈ 1.5.
// - One progress line per 5 evaluations, each ending in a bracketed
//   positive parameter.
fn folded_fit_reports_natural_space_progress() {
    // Arrange
    let data = power_law(12, 1000.0, 1.5);
    let bounds = Bounds::new(Some(vec![0.1]), Some(vec![5.0]));
    let options = FitOptions { fold: true, verbose: Some(5), ..FitOptions::default() };
    let observer = WriterObserver::new(Vec::new());

    // Act
    let fit = optimize_log_with_observer(
        &[1.0],
        &data,
        &shape_model,
        NO_PTS,
        &bounds,
        &options,
        &observer,
    )
    .unwrap();

    // Assert
    assert_relative_eq!(fit.params[0], 1.5, max_relative = 1e-3);
    let folded_model = fold(&shape_model(&fit.params, &data.sample_sizes(), &[]));
    assert_eq!(folded_model.count_unmasked(), 6);

    let text = String::from_utf8(observer.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len() as u64, fit.evaluations / 5);
    for line in lines {
        let inside = line.rsplit('[').next().unwrap().trim_end_matches(']');
        let p: f64 = inside.trim().parse().unwrap();
        assert!(p > 0.0, "line {line:?}");
    }
}

#[test]
// Purpose
// -------
// A model whose output shape disagrees with the data aborts the fit with
// the underlying spectrum error instead of being penalized.
//
// Given
// -----
// - Data for n = 6 and a model that always returns n = 4.
//
// Expect
// ------
// - `OptError::Spectrum(SpectrumError::ShapeMismatch { .. })`.
fn wrong_model_shape_aborts_fit() {
    // Arrange
    let data = power_law(6, 100.0, 1.0);
    let wrong = |params: &Theta, _ns: &[usize], _pts: &[usize]| power_law(4, 1.0, params[0]);
    let bounds = Bounds::unbounded();

    // Act
    let result = optimize_log(&[1.0], &data, &wrong, NO_PTS, &bounds, &FitOptions::default());

    // Assert
    assert!(
        matches!(result, Err(OptError::Spectrum(SpectrumError::ShapeMismatch { .. }))),
        "got {result:?}"
    );
}
