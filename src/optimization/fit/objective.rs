//! The spectrum-fit objective: bounds check, model evaluation, optional
//! folding and the Poisson or multinomial likelihood, with a fixed penalty
//! standing in for points where the likelihood does not exist.
use crate::{
    likelihood::{ll, ll_multinom},
    optimization::{
        errors::{OptError, OptResult},
        fit::{
            options::{Bounds, FitOptions},
            session::FitSession,
        },
        loglik_optimizer::{LogLikelihood, Theta},
        numerical_stability::from_log_params,
    },
    spectrum::{Spectrum, fold},
};

/// Magnitude of the log-likelihood substituted for penalized points.
pub const OUT_OF_BOUNDS_PENALTY: f64 = 1e8;

/// Outcome of scoring one parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// The model was evaluated and its log-likelihood is finite.
    Evaluated(f64),
    /// A parameter was outside its bounds; the model was not called.
    OutOfBounds,
    /// The model was called but the likelihood is NaN or infinite, for
    /// example a zero or negative model cell under nonzero data.
    Undefined,
}

impl Evaluation {
    /// Value handed to the optimizer: the log-likelihood, or
    /// `−OUT_OF_BOUNDS_PENALTY` for penalized points.
    pub fn log_likelihood(&self) -> f64 {
        match self {
            Evaluation::Evaluated(ll) => *ll,
            Evaluation::OutOfBounds | Evaluation::Undefined => -OUT_OF_BOUNDS_PENALTY,
        }
    }

    pub fn is_penalized(&self) -> bool {
        !matches!(self, Evaluation::Evaluated(_))
    }
}

/// A demographic model: natural-space parameters, the data's sample sizes
/// and a numerical resolution (grid points, for instance) in; an expected
/// spectrum with the data's shape out.
///
/// Any `Fn(&Theta, &[usize], &R) -> Spectrum` is a model.
pub trait ModelFunc<R: ?Sized> {
    fn evaluate(&self, params: &Theta, sample_sizes: &[usize], pts: &R) -> Spectrum;
}

impl<F, R> ModelFunc<R> for F
where
    F: Fn(&Theta, &[usize], &R) -> Spectrum,
    R: ?Sized,
{
    fn evaluate(&self, params: &Theta, sample_sizes: &[usize], pts: &R) -> Spectrum {
        self(params, sample_sizes, pts)
    }
}

/// [`LogLikelihood`] over log-parameters for one fit.
///
/// `value` exponentiates `θ`, scores the point with [`evaluate`] and
/// returns the (possibly penalized) log-likelihood.
///
/// [`evaluate`]: SfsObjective::evaluate
pub struct SfsObjective<'a, M, R: ?Sized> {
    model_func: &'a M,
    pts: &'a R,
    bounds: &'a Bounds,
    fold: bool,
    multinom: bool,
    session: FitSession<'a>,
}

impl<'a, M, R> SfsObjective<'a, M, R>
where
    M: ModelFunc<R>,
    R: ?Sized,
{
    pub fn new(
        model_func: &'a M, pts: &'a R, bounds: &'a Bounds, options: &FitOptions,
        session: FitSession<'a>,
    ) -> Self {
        Self {
            model_func,
            pts,
            bounds,
            fold: options.fold,
            multinom: options.multinom,
            session,
        }
    }

    pub fn session(&self) -> &FitSession<'a> {
        &self.session
    }

    /// Score natural-space `params` against `data` and record the
    /// evaluation in the session.
    ///
    /// Errors
    /// ------
    /// - `OptError::Spectrum` when the model's shape differs from the data's.
    ///   This is a broken model, not a bad parameter, so it is not
    ///   penalized.
    pub fn evaluate(&self, params: &Theta, data: &Spectrum) -> OptResult<Evaluation> {
        let evaluation = self.score(params, data)?;
        self.session.record(evaluation.log_likelihood(), params);
        Ok(evaluation)
    }

    fn score(&self, params: &Theta, data: &Spectrum) -> OptResult<Evaluation> {
        if !self.bounds.contains(params) {
            return Ok(Evaluation::OutOfBounds);
        }
        let model = self.model_func.evaluate(params, &data.sample_sizes(), self.pts);
        let value = if self.fold {
            self.likelihood(&fold(&model), &fold(data))?
        } else {
            self.likelihood(&model, data)?
        };
        Ok(if value.is_finite() { Evaluation::Evaluated(value) } else { Evaluation::Undefined })
    }

    fn likelihood(&self, model: &Spectrum, data: &Spectrum) -> OptResult<f64> {
        let value = if self.multinom { ll_multinom(model, data)? } else { ll(model, data)? };
        Ok(value)
    }
}

impl<'a, M, R> LogLikelihood for SfsObjective<'a, M, R>
where
    M: ModelFunc<R>,
    R: ?Sized,
{
    type Data = Spectrum;

    fn value(&self, theta: &Theta, data: &Spectrum) -> OptResult<f64> {
        Ok(self.evaluate(&from_log_params(theta), data)?.log_likelihood())
    }

    fn check(&self, theta: &Theta, _data: &Spectrum) -> OptResult<()> {
        match theta.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::fit::session::TracingObserver;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::{cell::Cell, time::Duration};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Each `Evaluation` outcome and the penalty it maps to.
    // - That out-of-bounds points never reach the model.
    // - Folding and the multinomial switch.
    // - Shape mismatches failing instead of being penalized.
    // -------------------------------------------------------------------------

    fn data() -> Spectrum {
        Spectrum::from_shape_vec(&[5], vec![0.0, 8.0, 4.0, 2.0, 0.0], true).unwrap()
    }

    fn scaled_model(params: &Theta, ns: &[usize], _pts: &usize) -> Spectrum {
        let base = [0.0, 4.0, 2.0, 1.0, 0.0];
        Spectrum::from_shape_vec(&[ns[0] + 1], base.iter().map(|b| b * params[0]).collect(), true)
            .unwrap()
    }

    fn session(observer: &TracingObserver) -> FitSession<'_> {
        FitSession::new(observer, None, Duration::ZERO)
    }

    #[test]
    // Purpose
    // -------
    // In-bounds points are scored with the configured likelihood and
    // counted.
    //
    // Given
    // -----
    // - A scaled model at θ = ln 2 (data = 2 × base) with Poisson scoring.
    //
    // Expect
    // ------
    // - `Evaluated(ll(2·base, data))`; `value` returns the same number; two
    //   evaluations recorded.
    fn in_bounds_point_is_scored() {
        // Arrange
        let observer = TracingObserver;
        let bounds = Bounds::new(Some(vec![0.1]), Some(vec![10.0]));
        let options = FitOptions { multinom: false, ..FitOptions::default() };
        let objective =
            SfsObjective::new(&scaled_model, &40usize, &bounds, &options, session(&observer));
        let data = data();
        let expected = ll(&scaled_model(&array![2.0], &[4], &40), &data).unwrap();

        // Act
        let evaluation = objective.evaluate(&array![2.0], &data).unwrap();
        let value = objective.value(&array![2f64.ln()], &data).unwrap();

        // Assert
        assert_eq!(evaluation, Evaluation::Evaluated(expected));
        assert_relative_eq!(value, expected, epsilon = 1e-9);
        assert_eq!(objective.session().evaluations(), 2);
    }

    #[test]
    // Purpose
    // -------
    // Out-of-bounds points get the penalty without calling the model.
    //
    // Given
    // -----
    // - Bounds [0.1, 10] and a model that counts its calls; θ = 20.
    //
    // Expect
    // ------
    // - `OutOfBounds`, log-likelihood −1e8, zero model calls.
    fn out_of_bounds_skips_model() {
        // Arrange
        let calls = Cell::new(0);
        let counting = |p: &Theta, ns: &[usize], pts: &usize| {
            calls.set(calls.get() + 1);
            scaled_model(p, ns, pts)
        };
        let observer = TracingObserver;
        let bounds = Bounds::new(Some(vec![0.1]), Some(vec![10.0]));
        let options = FitOptions::default();
        let objective =
            SfsObjective::new(&counting, &40usize, &bounds, &options, session(&observer));

        // Act
        let evaluation = objective.evaluate(&array![20.0], &data()).unwrap();

        // Assert
        assert_eq!(evaluation, Evaluation::OutOfBounds);
        assert_eq!(evaluation.log_likelihood(), -OUT_OF_BOUNDS_PENALTY);
        assert_eq!(calls.get(), 0);
        assert_eq!(objective.session().evaluations(), 1);
    }

    #[test]
    // Purpose
    // -------
    // A model that makes the likelihood undefined is penalized.
    //
    // Given
    // -----
    // - A model with a zero cell where data is 8, and one with a negative
    //   cell.
    //
    // Expect
    // ------
    // - `Undefined` for both, mapped to −1e8.
    fn undefined_likelihood_is_penalized() {
        // Arrange
        let zero_cell = |_: &Theta, _: &[usize], _: &usize| {
            Spectrum::from_shape_vec(&[5], vec![0.0, 0.0, 2.0, 1.0, 0.0], true).unwrap()
        };
        let negative_cell = |_: &Theta, _: &[usize], _: &usize| {
            Spectrum::from_shape_vec(&[5], vec![0.0, 4.0, -2.0, 1.0, 0.0], true).unwrap()
        };
        let observer = TracingObserver;
        let bounds = Bounds::unbounded();
        let options = FitOptions { multinom: false, ..FitOptions::default() };
        let zero = SfsObjective::new(&zero_cell, &40usize, &bounds, &options, session(&observer));
        let negative =
            SfsObjective::new(&negative_cell, &40usize, &bounds, &options, session(&observer));

        // Act
        let a = zero.evaluate(&array![1.0], &data()).unwrap();
        let b = negative.evaluate(&array![1.0], &data()).unwrap();

        // Assert
        assert_eq!(a, Evaluation::Undefined);
        assert_eq!(b, Evaluation::Undefined);
        assert!(a.is_penalized());
        assert_eq!(b.log_likelihood(), -OUT_OF_BOUNDS_PENALTY);
    }

    #[test]
    // Purpose
    // -------
    // Folding and multinomial scoring are applied when configured.
    //
    // Given
    // -----
    // - The scaled model at θ = 5 with `fold` and `multinom` on.
    //
    // Expect
    // ------
    // - The multinomial likelihood of the folded pair, which does not depend
    //   on θ.
    fn folding_and_multinomial_are_applied() {
        // Arrange
        let observer = TracingObserver;
        let bounds = Bounds::unbounded();
        let options = FitOptions { fold: true, multinom: true, ..FitOptions::default() };
        let objective =
            SfsObjective::new(&scaled_model, &40usize, &bounds, &options, session(&observer));
        let data = data();
        let model = scaled_model(&array![5.0], &[4], &40);
        let expected = ll_multinom(&fold(&model), &fold(&data)).unwrap();

        // Act
        let at_five = objective.evaluate(&array![5.0], &data).unwrap();
        let at_half = objective.evaluate(&array![0.5], &data).unwrap();

        // Assert
        assert_eq!(at_five, Evaluation::Evaluated(expected));
        assert_relative_eq!(at_half.log_likelihood(), expected, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // A model of the wrong shape is an error, not a penalty; non-finite θ
    // fails `check`.
    //
    // Given
    // -----
    // - A model returning 4 cells against 5-cell data; θ = (NaN).
    //
    // Expect
    // ------
    // - `OptError::Spectrum`; `OptError::InvalidThetaInput`.
    fn wrong_shape_fails_and_check_rejects_nan() {
        // Arrange
        let short = |_: &Theta, _: &[usize], _: &usize| {
            Spectrum::from_shape_vec(&[4], vec![1.0; 4], true).unwrap()
        };
        let observer = TracingObserver;
        let bounds = Bounds::unbounded();
        let options = FitOptions::default();
        let objective = SfsObjective::new(&short, &40usize, &bounds, &options, session(&observer));

        // Act
        let err = objective.evaluate(&array![1.0], &data()).unwrap_err();
        let check = objective.check(&array![f64::NAN], &data());

        // Assert
        assert!(matches!(err, OptError::Spectrum(_)));
        assert!(matches!(check, Err(OptError::InvalidThetaInput { index: 0, .. })));
    }
}
