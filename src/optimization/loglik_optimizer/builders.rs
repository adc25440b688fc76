//! loglik_optimizer::builders — L-BFGS construction.
//!
//! Purpose
//! -------
//! Turn an [`MLEOptions`] into a ready `argmin` L-BFGS solver for either
//! line search.
//!
//! Conventions
//! -----------
//! - Builders only touch solver-level settings (memory, gradient and cost
//!   tolerances). The starting point and the iteration cap belong to the
//!   executor and are set in `run_lbfgs`.
//! - `argmin` rejects some tolerances itself; those rejections arrive as
//!   `OptError` through `From<argmin::core::Error>`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with the Hager–Zhang line search.
///
/// Errors
/// ------
/// - Tolerances `argmin` refuses, via `From<argmin::core::Error>`.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with the More–Thuente line search, the default for spectrum fits.
///
/// Errors
/// ------
/// - Tolerances `argmin` refuses, via `From<argmin::core::Error>`.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient and cost tolerances to any L-BFGS variant.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Both builders with default and explicit memory.
    // - Tolerance wiring with and without tolerances set.
    //
    // Full runs live in the fit driver's tests.
    // -------------------------------------------------------------------------

    fn options(searcher: LineSearcher, mem: Option<usize>) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-5), Some(1e-10), Some(100)).unwrap();
        MLEOptions::new(tols, searcher, false, mem).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Both builders accept default and explicit L-BFGS memory.
    //
    // Given
    // -----
    // - Each line search with `lbfgs_mem` of `None` and `Some(3)`.
    //
    // Expect
    // ------
    // - Every builder call succeeds.
    fn builders_accept_default_and_explicit_memory() {
        for mem in [None, Some(3)] {
            // Arrange
            let hz = options(LineSearcher::HagerZhang, mem);
            let mt = options(LineSearcher::MoreThuente, mem);

            // Act / Assert
            assert!(build_optimizer_hager_zhang(&hz).is_ok());
            assert!(build_optimizer_more_thuente(&mt).is_ok());
        }
    }

    #[test]
    // Purpose
    // -------
    // `configure_lbfgs` works whether or not tolerances are present.
    //
    // Given
    // -----
    // - Options with both tolerances and options with only `max_iter`.
    //
    // Expect
    // ------
    // - Both configurations succeed.
    fn configure_lbfgs_with_and_without_tolerances() {
        // Arrange
        let full = options(LineSearcher::MoreThuente, None);
        let iter_only = MLEOptions::new(
            Tolerances::new(None, None, Some(10)).unwrap(),
            LineSearcher::MoreThuente,
            false,
            None,
        )
        .unwrap();

        // Act
        let with_tols = configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), 5), &full);
        let bare = configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), 5), &iter_only);

        // Assert
        assert!(with_tols.is_ok());
        assert!(bare.is_ok());
    }
}
