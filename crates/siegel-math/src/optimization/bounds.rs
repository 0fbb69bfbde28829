//! Box constraints on parameter vectors.

use crate::error::{MathError, MathResult};

/// Lower and upper limits per parameter.
///
/// Infinite limits mean the parameter is unconstrained on that side.
///
/// # Example
///
/// ```rust
/// use siegel_math::optimization::Bounds;
///
/// let bounds = Bounds::new(
///     vec![f64::NEG_INFINITY, 1e-6],
///     vec![f64::INFINITY, f64::INFINITY],
/// )
/// .unwrap();
///
/// let mut x = [0.5, -2.0];
/// bounds.project(&mut x);
/// assert_eq!(x, [0.5, 1e-6]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from lower and upper limit vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors differ in length, contain NaN, or if
    /// any lower limit exceeds its upper limit.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> MathResult<Self> {
        if lower.len() != upper.len() {
            return Err(MathError::dimension_mismatch(lower.len(), upper.len()));
        }

        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi || lo == f64::INFINITY || hi == f64::NEG_INFINITY
            {
                return Err(MathError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }

        Ok(Self { lower, upper })
    }

    /// Creates bounds that constrain nothing.
    #[must_use]
    pub fn unbounded(dimension: usize) -> Self {
        Self {
            lower: vec![f64::NEG_INFINITY; dimension],
            upper: vec![f64::INFINITY; dimension],
        }
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Returns the lower limits.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Returns the upper limits.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Returns true if every component of `x` lies inside the box.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimension()
            && x.iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    /// Clamps `x` into the box in place.
    pub fn project(&self, x: &mut [f64]) {
        for (v, (&lo, &hi)) in x.iter_mut().zip(self.lower.iter().zip(&self.upper)) {
            *v = v.clamp(lo, hi);
        }
    }

    /// Returns true if parameter `i` sits on a bound that the gradient
    /// pushes against.
    pub(crate) fn is_active(&self, i: usize, x: f64, gradient: f64) -> bool {
        (x <= self.lower[i] && gradient > 0.0) || (x >= self.upper[i] && gradient < 0.0)
    }

    /// Infinity norm of the projected gradient `P(x - g) - x`.
    ///
    /// Zero exactly when `x` satisfies the first-order conditions of the
    /// box-constrained problem.
    pub(crate) fn projected_gradient_norm(&self, x: &[f64], gradient: &[f64]) -> f64 {
        x.iter()
            .zip(gradient)
            .enumerate()
            .map(|(i, (&xi, &gi))| ((xi - gi).clamp(self.lower[i], self.upper[i]) - xi).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = Bounds::new(vec![0.0, 2.0], vec![1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            MathError::InvalidBounds {
                index: 1,
                lower: 2.0,
                upper: 1.0
            }
        );
    }

    #[test]
    fn test_rejects_nan_and_length_mismatch() {
        assert!(Bounds::new(vec![f64::NAN], vec![1.0]).is_err());
        assert!(Bounds::new(vec![0.0], vec![1.0, 2.0]).is_err());
        assert!(Bounds::new(vec![f64::INFINITY], vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_contains_and_project() {
        let bounds = Bounds::new(vec![0.0, -1.0], vec![1.0, 1.0]).unwrap();
        assert!(bounds.contains(&[0.5, 0.0]));
        assert!(!bounds.contains(&[1.5, 0.0]));
        assert!(!bounds.contains(&[0.5]));

        let mut x = [1.5, -3.0];
        bounds.project(&mut x);
        assert_eq!(x, [1.0, -1.0]);
    }

    #[test]
    fn test_projected_gradient() {
        let bounds = Bounds::new(vec![0.0, f64::NEG_INFINITY], vec![f64::INFINITY; 2]).unwrap();

        // Gradient pushing x0 below its lower bound is cut off.
        let pg = bounds.projected_gradient_norm(&[0.0, 1.0], &[5.0, 0.25]);
        assert_eq!(pg, 0.25);
        assert!(bounds.is_active(0, 0.0, 5.0));
        assert!(!bounds.is_active(0, 0.0, -5.0));
        assert!(!bounds.is_active(1, 1.0, 0.25));
    }

    #[test]
    fn test_unbounded() {
        let bounds = Bounds::unbounded(3);
        assert_eq!(bounds.dimension(), 3);
        assert!(bounds.contains(&[1e300, -1e300, 0.0]));
    }
}
