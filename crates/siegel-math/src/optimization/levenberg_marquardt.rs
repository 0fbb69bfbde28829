//! Levenberg-Marquardt with box projection.
//!
//! The function tolerance only ends a run on a step taken with damping at
//! or below its initial level.

use nalgebra::{DMatrix, DVector};

use super::bounds::Bounds;
use super::problem::{Evaluator, LeastSquaresProblem};
use super::{OptimizationConfig, OptimizationResult, TerminationReason};
use crate::error::{MathError, MathResult};

const INITIAL_DAMPING: f64 = 1e-3;
const DAMPING_FACTOR: f64 = 10.0;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e12;

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
    let mut residuals = initial.residuals;
    let mut damping = INITIAL_DAMPING;
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

        let jt = jacobian.transpose();
        let jtj = &jt * &jacobian;
        let jtr = &jt * &residuals;

        let mut system = jtj.clone();
        let mut rhs = -jtr;
        for i in 0..n {
            let scale = if jtj[(i, i)] > 0.0 { jtj[(i, i)] } else { 1.0 };
            system[(i, i)] += damping * scale;

            if bounds.is_active(i, x[i], g[i]) {
                system.row_mut(i).fill(0.0);
                system.column_mut(i).fill(0.0);
                system[(i, i)] = 1.0;
                rhs[i] = 0.0;
            }
        }

        let Some(delta) = solve(system, &rhs) else {
            damping *= DAMPING_FACTOR;
            if damping > MAX_DAMPING {
                break TerminationReason::LineSearchFailed;
            }
            continue;
        };

        let mut trial = &x + &delta;
        bounds.project(trial.as_mut_slice());

        let step = &trial - &x;
        if step.amax() <= f64::EPSILON * (1.0 + x.amax()) {
            break TerminationReason::StepTolerance;
        }

        let value = evaluator.value(&trial);
        if value.is_finite() && value < f {
            let next = evaluator.evaluate(&trial);
            if next.gradient.iter().any(|v| !v.is_finite()) {
                break TerminationReason::LineSearchFailed;
            }

            let reduction = (f - value) / f.abs().max(value.abs()).max(1.0);
            // Heavily damped steps are short gradient steps; a small
            // reduction there is not evidence of a minimum.
            let undamped = damping <= INITIAL_DAMPING;

            x = trial;
            f = next.value;
            g = next.gradient;
            jacobian = next.jacobian;
            residuals = next.residuals;
            damping = (damping / DAMPING_FACTOR).max(MIN_DAMPING);

            tracing::trace!(
                iteration = iterations,
                objective = f,
                damping,
                "levenberg-marquardt step accepted"
            );

            if reduction <= config.tolerance && undamped {
                break TerminationReason::FunctionTolerance;
            }
        } else {
            damping *= DAMPING_FACTOR;
            if damping > MAX_DAMPING {
                break TerminationReason::LineSearchFailed;
            }
        }
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

/// Solves the damped normal equations, falling back to LU when the
/// Cholesky factorization fails.
fn solve(system: DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    let solution = match system.clone().cholesky() {
        Some(chol) => chol.solve(rhs),
        None => system.lu().solve(rhs)?,
    };

    solution.iter().all(|v| v.is_finite()).then_some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct SumToTwo;

    impl LeastSquaresProblem for SumToTwo {
        fn dimension(&self) -> usize {
            2
        }

        fn num_residuals(&self) -> usize {
            1
        }

        fn residuals(&self, x: &[f64]) -> Vec<f64> {
            vec![x[0] + x[1] - 2.0]
        }
    }

    #[test]
    fn test_rank_deficient_jacobian() {
        let result = minimize(
            &SumToTwo,
            DVector::from_vec(vec![0.0, 0.0]),
            &Bounds::unbounded(2),
            &OptimizationConfig::default(),
        )
        .unwrap();

        assert!(result.converged, "{:?}", result.termination);
        assert_relative_eq!(result.parameters[0] + result.parameters[1], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_solve_singular_system() {
        let system = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let rhs = DVector::from_vec(vec![1.0, 2.0]);
        assert!(solve(system, &rhs).is_none());
    }
}
