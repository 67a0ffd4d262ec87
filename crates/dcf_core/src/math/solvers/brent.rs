//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// A root and the work it took to find it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root<T: Float> {
    /// Abscissa where the function vanishes
    pub value: T,
    /// Brent iterations spent (zero when a grid point was already a root)
    pub iterations: usize,
}

/// Brent's method root finder.
///
/// Combines bisection, secant and inverse quadratic interpolation. Converges
/// for any continuous function given a valid bracket; when the caller only
/// knows a search range, [`solve_in_range`](Self::solve_in_range) scans it
/// for a sign change first.
///
/// # Example
///
/// ```
/// use dcf_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root.value).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Scan `[lower, upper]` on `steps` equal sub-intervals and return the
    /// first one whose endpoints bracket a root.
    ///
    /// Grid points where `f` is not finite are skipped.
    ///
    /// # Errors
    ///
    /// `SolverError::NoBracket` when no sub-interval changes sign.
    pub fn find_bracket<F>(&self, f: &F, lower: T, upper: T, steps: usize) -> Result<(T, T), SolverError>
    where
        F: Fn(T) -> T,
    {
        let no_bracket = || SolverError::NoBracket {
            a: lower.to_f64().unwrap_or(f64::NAN),
            b: upper.to_f64().unwrap_or(f64::NAN),
        };
        let steps = steps.max(1);
        let width = (upper - lower) / T::from(steps).ok_or_else(no_bracket)?;

        let mut previous: Option<(T, T)> = None;
        for i in 0..=steps {
            let x = if i == steps {
                upper
            } else {
                lower + width * T::from(i).ok_or_else(no_bracket)?
            };
            let fx = f(x);
            if !fx.is_finite() {
                continue;
            }
            if fx == T::zero() {
                return Ok((x, x));
            }
            if let Some((px, pf)) = previous {
                if pf.signum() != fx.signum() {
                    return Ok((px, x));
                }
            }
            previous = Some((x, fx));
        }
        Err(no_bracket())
    }

    /// Locate a bracket inside `[lower, upper]` and refine it.
    ///
    /// # Errors
    ///
    /// - `SolverError::NoBracket` when the range holds no sign change
    /// - `SolverError::MaxIterationsExceeded` when refinement runs out of budget
    pub fn solve_in_range<F>(&self, f: F, lower: T, upper: T, steps: usize) -> Result<Root<T>, SolverError>
    where
        F: Fn(T) -> T,
    {
        let (a, b) = self.find_bracket(&f, lower, upper, steps)?;
        self.find_root(f, a, b)
    }

    /// Find a root of `f` in the bracket `[a, b]`.
    ///
    /// # Errors
    ///
    /// - `SolverError::NoBracket` when `f(a)` and `f(b)` share a sign
    /// - `SolverError::NumericalInstability` when `f` returns a non-finite value
    /// - `SolverError::MaxIterationsExceeded` when the budget runs out
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<Root<T>, SolverError>
    where
        F: Fn(T) -> T,
    {
        let tol = self.config.tolerance;
        let two = T::one() + T::one();
        let three = two + T::one();
        let as_f64 = |x: T| x.to_f64().unwrap_or(f64::NAN);
        let eval = |x: T| -> Result<T, SolverError> {
            let fx = f(x);
            if fx.is_finite() {
                Ok(fx)
            } else {
                Err(SolverError::NumericalInstability(format!(
                    "non-finite value at x = {}",
                    as_f64(x)
                )))
            }
        };

        // `best` is the current estimate, `prev` the previous one and
        // `contra` the point whose value has the opposite sign to `best`.
        let (mut prev, mut best) = (a, b);
        let (mut f_prev, mut f_best) = (eval(a)?, eval(b)?);
        if f_best == T::zero() {
            return Ok(Root { value: best, iterations: 0 });
        }
        if f_prev == T::zero() {
            return Ok(Root { value: prev, iterations: 0 });
        }
        if f_prev.signum() == f_best.signum() {
            return Err(SolverError::NoBracket {
                a: as_f64(a),
                b: as_f64(b),
            });
        }

        let (mut contra, mut f_contra) = (prev, f_prev);
        let mut step = best - prev;
        let mut last_step = step;

        for iteration in 1..=self.config.max_iterations {
            if f_best.signum() == f_contra.signum() {
                contra = prev;
                f_contra = f_prev;
                step = best - prev;
                last_step = step;
            }
            if f_contra.abs() < f_best.abs() {
                prev = best;
                best = contra;
                contra = prev;
                f_prev = f_best;
                f_best = f_contra;
                f_contra = f_prev;
            }

            let half = (contra - best) / two;
            if f_best.abs() < tol || half.abs() <= tol {
                return Ok(Root {
                    value: best,
                    iterations: iteration,
                });
            }

            let mut bisect = true;
            if last_step.abs() >= tol && f_prev.abs() > f_best.abs() {
                let s = f_best / f_prev;
                let (mut p, mut q) = if prev == contra {
                    (two * half * s, T::one() - s)
                } else {
                    let r_contra = f_prev / f_contra;
                    let r_best = f_best / f_contra;
                    (
                        s * (two * half * r_contra * (r_contra - r_best)
                            - (best - prev) * (r_best - T::one())),
                        (r_contra - T::one()) * (r_best - T::one()) * (s - T::one()),
                    )
                };
                if p > T::zero() {
                    q = -q;
                } else {
                    p = -p;
                }
                let limit = three * half * q - (tol * q).abs();
                if two * p < limit.min((last_step * q).abs()) {
                    last_step = step;
                    step = p / q;
                    bisect = false;
                }
            }
            if bisect {
                step = half;
                last_step = half;
            }

            prev = best;
            f_prev = f_best;
            best = if step.abs() > tol {
                best + step
            } else if half > T::zero() {
                best + tol
            } else {
                best - tol
            };
            f_best = eval(best)?;
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sqrt_2() {
        let solver = BrentSolver::new(SolverConfig::default());
        let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((root.value - std::f64::consts::SQRT_2).abs() < 1e-10);
        assert!(root.iterations > 0);
    }

    #[test]
    fn test_find_root_reversed_bracket() {
        let solver = BrentSolver::new(SolverConfig::default());
        let root = solver.find_root(|x: f64| x.exp() - 2.0, 1.0, 0.0).unwrap();
        assert!((root.value - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_find_sin_root() {
        let solver = BrentSolver::new(SolverConfig::default());
        let root = solver.find_root(|x: f64| x.sin(), 3.0, 4.0).unwrap();
        assert!((root.value - std::f64::consts::PI).abs() < 1e-10);
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = BrentSolver::new(SolverConfig::default());
        let root = solver.find_root(|x: f64| x - 1.0, 1.0, 3.0).unwrap();
        assert_eq!(root.value, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_no_bracket() {
        let solver = BrentSolver::new(SolverConfig::default());
        let result = solver.find_root(|x: f64| x * x + 1.0, -1.0, 1.0);
        assert!(matches!(result, Err(SolverError::NoBracket { .. })));
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let solver = BrentSolver::new(SolverConfig::new(1e-300, 3));
        let result = solver.find_root(|x: f64| x * x * x - 2.0, 0.0, 2.0);
        assert!(matches!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 3 })
        ));
    }

    #[test]
    fn test_non_finite_value_reported() {
        let solver = BrentSolver::new(SolverConfig::default());
        let result = solver.find_root(|x: f64| if x > 0.5 { f64::NAN } else { x - 1.0 }, 0.0, 2.0);
        assert!(matches!(result, Err(SolverError::NumericalInstability(_))));
    }

    #[test]
    fn test_find_bracket_scans_range() {
        let solver = BrentSolver::new(SolverConfig::default());
        let f = |x: f64| x - 3.3;
        let (a, b) = solver.find_bracket(&f, 0.0, 10.0, 100).unwrap();
        assert!(a <= 3.3 && 3.3 <= b);
        assert!(b - a <= 0.1 + 1e-12);
    }

    #[test]
    fn test_find_bracket_skips_non_finite_points() {
        let solver = BrentSolver::new(SolverConfig::default());
        let f = |x: f64| if x < 1.0 { f64::INFINITY } else { 2.0 - x };
        let (a, b) = solver.find_bracket(&f, 0.0, 4.0, 8).unwrap();
        assert!(a <= 2.0 && 2.0 <= b);
    }

    #[test]
    fn test_solve_in_range_without_sign_change() {
        let solver = BrentSolver::new(SolverConfig::default());
        let result = solver.solve_in_range(|x: f64| 1.0 + x * x, -0.99, 10.0, 50);
        assert!(matches!(result, Err(SolverError::NoBracket { .. })));
    }

    #[test]
    fn test_solve_in_range_irr_like() {
        let solver = BrentSolver::new(SolverConfig::default());
        let flows = [-1000.0, 300.0, 400.0, 500.0];
        let f = |r: f64| {
            flows
                .iter()
                .enumerate()
                .map(|(t, cf)| cf / (1.0 + r).powi(t as i32))
                .sum::<f64>()
        };
        let root = solver.solve_in_range(f, -0.99, 10.0, 200).unwrap();
        assert!(f(root.value).abs() < 1e-7);
        assert!(root.value > 0.08 && root.value < 0.10);
    }
}
