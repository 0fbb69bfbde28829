//! Projected BFGS for box-constrained least squares.
//!
//! Each iteration freezes the variables whose bound the gradient pushes
//! against, takes a quasi-Newton direction in the remaining variables, and
//! searches along the projected path `P(x + t·d)` with Armijo backtracking.
//! The inverse Hessian approximation starts from the Gauss-Newton matrix
//! `(2JᵀJ)⁻¹`, which gives every parameter its own step scale, and is
//! rebuilt there whenever the search stalls or a shortened step makes
//! almost no progress.

use nalgebra::{DMatrix, DVector};

use super::bounds::Bounds;
use super::problem::{Evaluator, LeastSquaresProblem};
use super::{OptimizationConfig, OptimizationResult, TerminationReason};
use crate::error::{MathError, MathResult};

/// Sufficient decrease constant for the Armijo condition.
const ARMIJO: f64 = 1e-4;

/// Backtracking contraction factor.
const SHRINK: f64 = 0.5;

/// Maximum backtracking steps per line search.
const MAX_BACKTRACKS: usize = 60;

/// Consecutive full steps with a negligible reduction needed to stop on
/// the function tolerance.
const SMALL_REDUCTION_STREAK: u32 = 2;

/// Ridge added to the diagonal of `2JᵀJ`, relative to its largest entry.
const GAUSS_NEWTON_RIDGE: f64 = 1e-10;

enum LineSearch {
    Accepted {
        point: DVector<f64>,
        value: f64,
        backtracked: bool,
    },
    Stalled,
    Exhausted,
    OutOfBudget,
}

pub(crate) fn minimize<P>(
    problem: &P,
    start: DVector<f64>,
    bounds: &Bounds,
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult>
where
    P: LeastSquaresProblem + ?Sized,
{
    let n = start.len();
    let mut evaluator = Evaluator::new(problem);

    let mut x = start;
    let initial = evaluator.evaluate(&x);
    if !initial.value.is_finite() {
        return Err(MathError::non_finite_objective(initial.value));
    }
    if initial.gradient.iter().any(|g| !g.is_finite()) {
        return Err(MathError::non_finite_objective(f64::NAN));
    }

    let mut f = initial.value;
    let mut g = initial.gradient;
    let mut jacobian = initial.jacobian;
    let mut h = gauss_newton_inverse(&jacobian);
    let mut fresh = true;
    let mut small_reductions = 0_u32;
    let mut iterations = 0_u32;

    let termination = loop {
        let pg_norm = bounds.projected_gradient_norm(x.as_slice(), g.as_slice());
        if pg_norm <= config.gradient_tolerance {
            break TerminationReason::GradientTolerance;
        }
        if iterations >= config.max_iterations {
            break TerminationReason::MaxIterations;
        }
        if evaluator.count() >= config.max_evaluations {
            break TerminationReason::MaxEvaluations;
        }
        iterations += 1;

        let active: Vec<bool> = (0..n).map(|i| bounds.is_active(i, x[i], g[i])).collect();
        let mut g_free = g.clone();
        for (i, &is_active) in active.iter().enumerate() {
            if is_active {
                g_free[i] = 0.0;
            }
        }

        let mut d = -(&h * &g_free);
        for (i, &is_active) in active.iter().enumerate() {
            if is_active {
                d[i] = 0.0;
            }
        }
        if g.dot(&d) >= 0.0 {
            h = DMatrix::identity(n, n);
            fresh = true;
            d = -g_free;
        }

        // A rebuilt H has not seen the local curvature along d yet, so its
        // first step moves no coordinate by more than one unit.
        let first_step = if fresh {
            (1.0 / d.amax()).min(1.0)
        } else {
            1.0
        };

        let (x_new, f_new, backtracked) = match line_search(
            &mut evaluator,
            bounds,
            &x,
            f,
            &g,
            &d,
            first_step,
            config.max_evaluations,
        ) {
            LineSearch::Accepted {
                point,
                value,
                backtracked,
            } => (point, value, backtracked),
            LineSearch::Stalled | LineSearch::Exhausted if !fresh => {
                h = gauss_newton_inverse(&jacobian);
                fresh = true;
                small_reductions = 0;
                continue;
            }
            LineSearch::Stalled => break TerminationReason::StepTolerance,
            LineSearch::Exhausted => break TerminationReason::LineSearchFailed,
            LineSearch::OutOfBudget => break TerminationReason::MaxEvaluations,
        };

        let next = evaluator.evaluate(&x_new);
        if next.gradient.iter().any(|v| !v.is_finite()) {
            break TerminationReason::LineSearchFailed;
        }

        let s = &x_new - &x;
        let y = &next.gradient - &g;
        let reduction = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
        let full_step = !backtracked && first_step >= 1.0;

        x = x_new;
        f = next.value;
        g = next.gradient;
        jacobian = next.jacobian;

        tracing::trace!(
            iteration = iterations,
            objective = f,
            projected_gradient = pg_norm,
            backtracked,
            "bfgs step accepted"
        );

        if reduction <= config.tolerance {
            if !full_step {
                // A shortened step says nothing about optimality.
                small_reductions = 0;
                h = gauss_newton_inverse(&jacobian);
                fresh = true;
                continue;
            }
            small_reductions += 1;
            if small_reductions >= SMALL_REDUCTION_STREAK {
                break TerminationReason::FunctionTolerance;
            }
        } else {
            small_reductions = 0;
        }

        let sy = s.dot(&y);
        if sy > f64::EPSILON * s.norm() * y.norm() {
            let rho = 1.0 / sy;
            let left = DMatrix::identity(n, n) - rho * &s * y.transpose();
            h = &left * &h * left.transpose() + rho * &s * s.transpose();
        }
        fresh = false;
    };

    let gradient_norm = bounds.projected_gradient_norm(x.as_slice(), g.as_slice());
    Ok(OptimizationResult::new(
        &x,
        f,
        gradient_norm,
        iterations,
        evaluator.count(),
        termination,
    ))
}

/// Inverse of the Gauss-Newton Hessian `2JᵀJ`, ridged so that it stays
/// positive definite. Falls back to the identity for a zero or non-finite
/// Jacobian.
fn gauss_newton_inverse(jacobian: &DMatrix<f64>) -> DMatrix<f64> {
    let n = jacobian.ncols();
    let mut hessian = 2.0 * jacobian.transpose() * jacobian;
    let scale = hessian.diagonal().amax();
    if !scale.is_finite() || scale <= 0.0 {
        return DMatrix::identity(n, n);
    }

    for i in 0..n {
        hessian[(i, i)] += GAUSS_NEWTON_RIDGE * scale;
    }
    match hessian.cholesky() {
        Some(chol) => {
            let inverse = chol.inverse();
            if inverse.iter().all(|v| v.is_finite()) {
                inverse
            } else {
                DMatrix::identity(n, n)
            }
        }
        None => DMatrix::identity(n, n),
    }
}

#[allow(clippy::too_many_arguments)]
fn line_search<P>(
    evaluator: &mut Evaluator<'_, P>,
    bounds: &Bounds,
    x: &DVector<f64>,
    f: f64,
    g: &DVector<f64>,
    d: &DVector<f64>,
    first_step: f64,
    max_evaluations: u32,
) -> LineSearch
where
    P: LeastSquaresProblem + ?Sized,
{
    let negligible = f64::EPSILON * (1.0 + x.amax());
    let mut step = first_step;

    for attempt in 0..MAX_BACKTRACKS {
        if evaluator.count() >= max_evaluations {
            return LineSearch::OutOfBudget;
        }

        let mut trial = x + d * step;
        bounds.project(trial.as_mut_slice());

        let s = &trial - x;
        if s.amax() <= negligible {
            return LineSearch::Stalled;
        }

        let value = evaluator.value(&trial);
        if value.is_finite() && value < f && value <= f + ARMIJO * g.dot(&s) {
            return LineSearch::Accepted {
                point: trial,
                value,
                backtracked: attempt > 0,
            };
        }

        step *= SHRINK;
    }

    LineSearch::Exhausted
}
