//! Bridge from a [`LogLikelihood`] to `argmin`'s `CostFunction` and
//! `Gradient`.
//!
//! The cost is `c(θ) = −ℓ(θ)`. An analytic `∇ℓ` is negated; without one the
//! cost itself is differenced, so no sign flip is needed on that path.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::{fixed_step_forward_diff, run_fd_diff},
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// `argmin` problem wrapping a log-likelihood and its data.
///
/// `fd_step` selects the numerical-gradient scheme used when `f.grad` is
/// not implemented: `Some(h)` is a forward difference with step `h`,
/// `None` is a central difference that falls back to an adaptive forward
/// difference when the central estimate is unusable.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub fd_step: Option<f64>,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data, fd_step: None }
    }

    pub fn with_fd_step(mut self, fd_step: Option<f64>) -> Self {
        self.fd_step = fd_step;
        self
    }

    fn numerical_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            self.cost(theta).unwrap_or_else(|e| {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            })
        };
        if let Some(step) = self.fd_step {
            return Ok(fixed_step_forward_diff(theta, &cost_func, step, &closure_err)?);
        }
        let central = theta.central_diff(&cost_func);
        if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `−ℓ(θ)`; a non-finite `ℓ` is `OptError::NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err(OptError::NonFiniteCost { value: output }.into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// `−∇ℓ(θ)` when the model supplies it, otherwise a finite-difference
    /// gradient of the cost.
    ///
    /// Errors
    /// ------
    /// - Model errors other than `GradientNotImplemented`.
    /// - Cost errors raised while differencing.
    /// - Validation errors for wrong length or non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.numerical_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}
