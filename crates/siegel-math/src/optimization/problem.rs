//! Least squares problem definition and evaluation bookkeeping.

use nalgebra::{DMatrix, DVector};

/// Default central-difference step for numerical Jacobians.
pub const DEFAULT_JACOBIAN_STEP: f64 = 1e-6;

/// A nonlinear least squares problem `min Σ r_i(x)²`.
///
/// Implementors supply the residual vector. The Jacobian defaults to
/// central finite differences; override [`LeastSquaresProblem::jacobian`]
/// when an analytic form is available.
pub trait LeastSquaresProblem {
    /// Number of parameters.
    fn dimension(&self) -> usize;

    /// Number of residuals.
    fn num_residuals(&self) -> usize;

    /// Evaluates the residual vector at `x`.
    fn residuals(&self, x: &[f64]) -> Vec<f64>;

    /// Evaluates the Jacobian `∂r_i/∂x_j` at `x` (rows are residuals).
    fn jacobian(&self, x: &[f64]) -> DMatrix<f64> {
        finite_difference_jacobian(self, x, DEFAULT_JACOBIAN_STEP)
    }
}

/// Computes the Jacobian of `problem` at `x` with central differences.
///
/// The step is scaled by `max(|x_j|, 1)` per parameter.
pub fn finite_difference_jacobian<P>(problem: &P, x: &[f64], step: f64) -> DMatrix<f64>
where
    P: LeastSquaresProblem + ?Sized,
{
    let m = problem.num_residuals();
    let n = x.len();
    let mut jacobian = DMatrix::zeros(m, n);

    for j in 0..n {
        let h = step * x[j].abs().max(1.0);

        let mut up = x.to_vec();
        up[j] += h;
        let mut down = x.to_vec();
        down[j] -= h;

        let r_up = problem.residuals(&up);
        let r_down = problem.residuals(&down);

        for i in 0..m {
            jacobian[(i, j)] = (r_up[i] - r_down[i]) / (2.0 * h);
        }
    }

    jacobian
}

/// Counts objective evaluations against a problem.
///
/// The objective is recomputed on every call; nothing is cached between
/// parameter vectors.
pub(crate) struct Evaluator<'a, P: ?Sized> {
    problem: &'a P,
    count: u32,
}

/// Objective value with its first-order information at one point.
pub(crate) struct Evaluation {
    pub value: f64,
    pub gradient: DVector<f64>,
    pub residuals: DVector<f64>,
    pub jacobian: DMatrix<f64>,
}

impl<'a, P> Evaluator<'a, P>
where
    P: LeastSquaresProblem + ?Sized,
{
    pub fn new(problem: &'a P) -> Self {
        Self { problem, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Sum of squared residuals at `x`.
    pub fn value(&mut self, x: &DVector<f64>) -> f64 {
        self.count += 1;
        sum_of_squares(&self.problem.residuals(x.as_slice()))
    }

    /// Value, gradient `2 Jᵀ r`, residuals and Jacobian at `x`.
    pub fn evaluate(&mut self, x: &DVector<f64>) -> Evaluation {
        self.count += 1;
        let residuals = DVector::from_vec(self.problem.residuals(x.as_slice()));
        let jacobian = self.problem.jacobian(x.as_slice());
        let gradient = 2.0 * jacobian.transpose() * &residuals;

        Evaluation {
            value: sum_of_squares(residuals.as_slice()),
            gradient,
            residuals,
            jacobian,
        }
    }
}

/// Sums squares in index order.
pub(crate) fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Exponential;

    impl LeastSquaresProblem for Exponential {
        fn dimension(&self) -> usize {
            2
        }

        fn num_residuals(&self) -> usize {
            2
        }

        fn residuals(&self, x: &[f64]) -> Vec<f64> {
            vec![x[0].exp() - 1.0, x[0] * x[1]]
        }
    }

    #[test]
    fn test_finite_difference_jacobian() {
        let jac = Exponential.jacobian(&[0.5, 2.0]);

        assert_relative_eq!(jac[(0, 0)], 0.5_f64.exp(), epsilon = 1e-8);
        assert_relative_eq!(jac[(0, 1)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 0)], 2.0, epsilon = 1e-8);
        assert_relative_eq!(jac[(1, 1)], 0.5, epsilon = 1e-8);
    }

    #[test]
    fn test_evaluator_counts_and_gradient() {
        let mut evaluator = Evaluator::new(&Exponential);
        let x = DVector::from_vec(vec![0.0, 3.0]);

        assert_eq!(evaluator.value(&x), 0.0);
        let eval = evaluator.evaluate(&x);
        assert_eq!(evaluator.count(), 2);

        // r = (0, 0) so the gradient vanishes.
        assert_relative_eq!(eval.gradient.norm(), 0.0, epsilon = 1e-12);
        assert_eq!(eval.residuals.len(), 2);
        assert_eq!(eval.jacobian.shape(), (2, 2));
    }
}
