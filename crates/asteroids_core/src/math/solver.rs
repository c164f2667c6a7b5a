//! Damped-Newton root finding for systems of nonlinear equations
//!
//! Implements a Levenberg-Marquardt iteration over `DVector<f64>` residual
//! functions: at each step the damped normal equations
//! `(JᵀJ + λI) δ = -Jᵀf` are solved with an LU factorization, the damping
//! factor λ shrinking on success and growing on failure. The Jacobian is
//! approximated by forward differences, which also makes the iteration well
//! defined at points where the residual is not differentiable (the
//! fragmentation system starts from the zero vector, where the speed
//! constraints have no analytic gradient).
//!
//! The solver never panics on a hard system: it runs to its iteration
//! budget and reports the best iterate alongside a convergence flag, leaving
//! the caller to decide how much to trust the result.

use log::trace;
use nalgebra::{DMatrix, DVector};

/// Tuning parameters for [`solve_system`].
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Residual norm below which the iterate is accepted as a root.
    pub tolerance: f64,

    /// Upper bound on outer (Jacobian-building) iterations.
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 500,
        }
    }
}

/// Result of a [`solve_system`] call.
///
/// `x` is always the best iterate encountered, whether or not the iteration
/// converged.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Best iterate found.
    pub x: DVector<f64>,

    /// Euclidean norm of the residual at `x`.
    pub residual_norm: f64,

    /// Outer iterations consumed.
    pub iterations: usize,

    /// Whether `residual_norm` fell below the configured tolerance.
    pub converged: bool,
}

/// Attempts to drive `f` to zero starting from `x0`.
///
/// `f` maps an n-vector to an m-vector of residuals; the system is square
/// for fragmentation but nothing here requires m == n.
pub fn solve_system<F>(f: F, x0: DVector<f64>, options: &SolverOptions) -> Solution
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    // Damping-retry and saddle-escape budgets. The iteration is cheap at
    // the problem sizes fragmentation produces (a handful of unknowns), so
    // these are sized for robustness rather than speed.
    const MAX_DAMPING_STEPS: usize = 25;
    const MAX_NUDGES: usize = 6;
    const LAMBDA_MIN: f64 = 1e-12;
    const LAMBDA_MAX: f64 = 1e12;

    let n = x0.len();
    let mut x = x0;
    let mut residual = f(&x);
    let mut residual_norm = residual.norm();

    // Saddle-escape nudges can move the iterate uphill, so the best point
    // seen is tracked separately and is what gets returned.
    let mut best_x = x.clone();
    let mut best_norm = residual_norm;

    let mut lambda = 1e-3;
    let mut nudges_left = MAX_NUDGES;
    let mut stalled_iterations = 0_usize;
    let mut iterations = 0;

    while iterations < options.max_iterations && residual_norm > options.tolerance {
        iterations += 1;

        let jacobian = forward_difference_jacobian(&f, &x, &residual);
        let jacobian_t = jacobian.transpose();
        let gram = &jacobian_t * &jacobian;
        let gradient = &jacobian_t * &residual;

        let previous_norm = residual_norm;
        let mut improved = false;

        for _ in 0..MAX_DAMPING_STEPS {
            let damped = &gram + DMatrix::identity(n, n) * lambda;
            let step = match damped.lu().solve(&(-&gradient)) {
                Some(step) => step,
                None => {
                    lambda = (lambda * 10.0).min(LAMBDA_MAX);
                    continue;
                }
            };

            let candidate = &x + &step;
            let candidate_residual = f(&candidate);
            let candidate_norm = candidate_residual.norm();

            if candidate_norm < residual_norm {
                x = candidate;
                residual = candidate_residual;
                residual_norm = candidate_norm;
                if residual_norm < best_norm {
                    best_x.copy_from(&x);
                    best_norm = residual_norm;
                }
                lambda = (lambda * 0.25).max(LAMBDA_MIN);
                improved = true;
                break;
            }

            lambda *= 4.0;
            if lambda > LAMBDA_MAX {
                break;
            }
        }

        // Track stalls: iterations that improve the residual only
        // marginally behave like full failures for escape purposes.
        if improved && residual_norm < previous_norm * 0.999 {
            stalled_iterations = 0;
            continue;
        }
        stalled_iterations += 1;

        if !improved || stalled_iterations >= 3 {
            // The damped step preserves any symmetry shared by the residual
            // and the iterate, so symmetric starting points (the zero
            // vector among them) can ride an invariant manifold to a local
            // minimum that is not a root. A coordinate-skewed nudge breaks
            // the symmetry; descent then resumes off the manifold.
            if nudges_left == 0 {
                break;
            }
            nudges_left -= 1;
            stalled_iterations = 0;

            let scale = 1e-3 * residual_norm.max(1.0).min(1e3);
            for (j, value) in x.iter_mut().enumerate() {
                *value += scale * (j as f64 + 1.0) / (n as f64);
            }
            residual = f(&x);
            residual_norm = residual.norm();
            lambda = 1e-3;
        }
    }

    let converged = best_norm <= options.tolerance;
    if !converged {
        trace!(
            "nonlinear solve stopped after {} iterations with residual {:.3e}",
            iterations,
            best_norm
        );
    }

    Solution {
        x: best_x,
        residual_norm: best_norm,
        iterations,
        converged,
    }
}

/// Forward-difference Jacobian of `f` at `x`, reusing the residual already
/// evaluated there.
fn forward_difference_jacobian<F>(
    f: &F,
    x: &DVector<f64>,
    residual: &DVector<f64>,
) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let m = residual.len();
    let n = x.len();
    let mut jacobian = DMatrix::zeros(m, n);
    let mut probe = x.clone();

    for j in 0..n {
        let original = probe[j];
        let h = f64::EPSILON.sqrt() * original.abs().max(1.0);
        probe[j] = original + h;
        let column = (f(&probe) - residual) / h;
        jacobian.set_column(j, &column);
        probe[j] = original;
    }

    jacobian
}
