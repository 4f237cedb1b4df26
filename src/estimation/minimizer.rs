use super::objective::Cost;
use ndarray::Array1;
use ndarray::Array2;

/// Local refinement of a cost surface by BFGS quasi-Newton descent
/// with central finite-difference gradients and Armijo backtracking.
/// generic over anything Cost so tests can descend on closed forms.
pub struct Minimizer<'a, C: Cost> {
    cost: &'a C,
}

impl<'a, C: Cost> From<&'a C> for Minimizer<'a, C> {
    fn from(cost: &'a C) -> Self {
        Self { cost }
    }
}

/// where a descent stopped and how it got there.
#[derive(Debug, Clone)]
pub struct Minimum {
    point: Array1<f64>,
    value: f64,
    iterations: usize,
    converged: bool,
}

impl Minimum {
    pub fn point(&self) -> &Array1<f64> {
        &self.point
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl<C: Cost> Minimizer<'_, C> {
    /// hyperparameter that determines the gradient-flatness stop
    const fn tolerance(&self) -> f64 {
        1e-5
    }
    /// hyperparameter that determines the iteration budget per dimension
    const fn budget(&self) -> usize {
        200
    }
    /// hyperparameter that determines the Armijo sufficient-decrease fraction
    const fn decrease(&self) -> f64 {
        1e-4
    }
    /// hyperparameter that determines how often the line search halves
    const fn backtracks(&self) -> usize {
        32
    }

    /// descend from a seed until the gradient flattens below tolerance
    /// or the budget runs out. the curvature update is skipped whenever
    /// the step and gradient change lose positive alignment, keeping
    /// the inverse hessian approximation positive definite.
    pub fn descend(&self, seed: Array1<f64>) -> Minimum {
        let budget = self.budget() * seed.len().max(1);
        let mut x = seed;
        let mut fx = self.cost.cost(&x);
        let mut gx = self.gradient(&x);
        let mut hessian = Array2::<f64>::eye(x.len());
        for iteration in 0..budget {
            if self.flat(&gx) {
                log::trace!("flat gradient after {} iterations at {:.6}", iteration, fx);
                return Minimum {
                    point: x,
                    value: fx,
                    iterations: iteration,
                    converged: true,
                };
            }
            let direction = -hessian.dot(&gx);
            let (step, fnext) = self.backtrack(&x, fx, &gx, &direction);
            log::trace!("iteration {} cost {:.6} step {:.0e}", iteration, fnext, step);
            let s = &direction * step;
            let xnext = &x + &s;
            let gnext = self.gradient(&xnext);
            let y = &gnext - &gx;
            let sy = s.dot(&y);
            if sy > 1e-10 {
                hessian = self.update(&hessian, &s, &y, sy);
            }
            x = xnext;
            fx = fnext;
            gx = gnext;
        }
        let converged = self.flat(&gx);
        Minimum {
            point: x,
            value: fx,
            iterations: budget,
            converged,
        }
    }

    fn flat(&self, gradient: &Array1<f64>) -> bool {
        gradient.iter().fold(0.0f64, |worst, g| worst.max(g.abs())) < self.tolerance()
    }

    /// central finite differences, one probe pair per coordinate.
    fn gradient(&self, x: &Array1<f64>) -> Array1<f64> {
        let h = f64::EPSILON.cbrt();
        (0..x.len())
            .map(|i| {
                let mut lo = x.clone();
                let mut hi = x.clone();
                lo[i] -= h;
                hi[i] += h;
                (self.cost.cost(&hi) - self.cost.cost(&lo)) / (2.0 * h)
            })
            .collect()
    }

    /// halve a unit step until the decrease beats the linear model by
    /// the Armijo fraction; an exhausted search keeps its last, nearly
    /// stationary candidate and lets the curvature guard discard it.
    fn backtrack(
        &self,
        x: &Array1<f64>,
        fx: f64,
        gradient: &Array1<f64>,
        direction: &Array1<f64>,
    ) -> (f64, f64) {
        let slope = gradient.dot(direction);
        let mut step = 1.0;
        for _ in 0..self.backtracks() {
            let fnext = self.cost.cost(&(x + &(direction * step)));
            if fnext <= fx + self.decrease() * step * slope {
                return (step, fnext);
            }
            step *= 0.5;
        }
        (step, self.cost.cost(&(x + &(direction * step))))
    }

    /// standard BFGS inverse-hessian update with rho = 1 / (s dot y):
    /// conjugate the running approximation by (I - rho s y') on both
    /// sides and add rho s s'.
    fn update(
        &self,
        hessian: &Array2<f64>,
        s: &Array1<f64>,
        y: &Array1<f64>,
        sy: f64,
    ) -> Array2<f64> {
        let rho = 1.0 / sy;
        let identity = Array2::<f64>::eye(s.len());
        let left = &identity - &(&outer(s, y) * rho);
        let right = &identity - &(&outer(y, s) * rho);
        left.dot(hessian).dot(&right) + &(&outer(s, s) * rho)
    }
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    /// anisotropic bowl with its minimum at (0, 1, 2, ...).
    struct Paraboloid;

    impl Cost for Paraboloid {
        fn cost(&self, x: &Array1<f64>) -> f64 {
            x.iter()
                .enumerate()
                .map(|(i, v)| (i + 1) as f64 * (v - i as f64).powi(2))
                .sum()
        }
    }

    #[test]
    fn descends_to_the_bowl_bottom() {
        let cost = Paraboloid;
        let minimum = Minimizer::from(&cost).descend(arr1(&[5.0, -3.0, 11.0]));
        assert!(minimum.converged());
        assert!(minimum.value() < 1e-8);
        for (i, v) in minimum.point().iter().enumerate() {
            assert!((v - i as f64).abs() < 1e-3);
        }
    }

    #[test]
    fn stationary_seeds_stop_immediately() {
        let cost = Paraboloid;
        let minimum = Minimizer::from(&cost).descend(arr1(&[0.0, 1.0, 2.0]));
        assert!(minimum.converged());
        assert!(minimum.iterations() == 0);
    }

    #[test]
    fn empty_searches_are_trivially_converged() {
        let cost = Paraboloid;
        let minimum = Minimizer::from(&cost).descend(Array1::zeros(0));
        assert!(minimum.converged());
        assert!(minimum.value() == 0.0);
    }

    #[test]
    fn budget_caps_the_descent() {
        let cost = Paraboloid;
        let minimum = Minimizer::from(&cost).descend(arr1(&[1e9, 1e9]));
        assert!(minimum.iterations() <= 400);
    }
}
