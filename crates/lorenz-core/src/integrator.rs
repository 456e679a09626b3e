use crate::config::LorenzParams;
use crate::state::State;

/// Classical fourth-order Runge-Kutta on the Lorenz field with a fixed step.
///
/// Pure: the next state depends only on the input state, the coefficients
/// and Δt. Arithmetic only, so results are reproducible bit for bit under
/// IEEE-754 doubles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rk4Integrator {
    params: LorenzParams,
    dt: f64,
}

impl Rk4Integrator {
    pub fn new(params: LorenzParams, dt: f64) -> Self {
        Self { params, dt }
    }

    pub fn params(&self) -> LorenzParams {
        self.params
    }

    pub fn time_step(&self) -> f64 {
        self.dt
    }

    /// Lorenz vector field f(s) = (σ(y − x), x(ρ − z) − y, xy − βz).
    pub fn derivative(&self, s: State) -> State {
        let LorenzParams { sigma, rho, beta } = self.params;
        State {
            x: sigma * (s.y - s.x),
            y: s.x * (rho - s.z) - s.y,
            z: s.x * s.y - beta * s.z,
        }
    }

    /// One RK4 step of size Δt.
    pub fn step(&self, s: State) -> State {
        let dt = self.dt;
        let half = dt / 2.0;

        let k1 = self.derivative(s);
        let k2 = self.derivative(s.offset(k1, half));
        let k3 = self.derivative(s.offset(k2, half));
        let k4 = self.derivative(s.offset(k3, dt));

        // dt * (k1 + 2k2 + 2k3 + k4) / 6, grouped per component
        let blend = |a: f64, b: f64, c: f64, d: f64| dt * (a + 2.0 * b + 2.0 * c + d) / 6.0;
        State {
            x: s.x + blend(k1.x, k2.x, k3.x, k4.x),
            y: s.y + blend(k1.y, k2.y, k3.y, k4.y),
            z: s.z + blend(k1.z, k2.z, k3.z, k4.z),
        }
    }
}

impl Default for Rk4Integrator {
    fn default() -> Self {
        Self::new(LorenzParams::default(), crate::constants::TIME_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_derivative_at_initial_condition() {
        let rk = Rk4Integrator::default();
        let d = rk.derivative(State::new(0.1, 0.0, 0.0));
        assert_abs_diff_eq!(d.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.y, 2.8, epsilon = 1e-12);
        assert_abs_diff_eq!(d.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_origin_is_fixed_point() {
        let rk = Rk4Integrator::default();
        let origin = State::new(0.0, 0.0, 0.0);
        assert_eq!(rk.step(origin), origin);
    }

    #[test]
    fn test_nontrivial_fixed_point() {
        // C+ = (sqrt(β(ρ−1)), sqrt(β(ρ−1)), ρ−1) is an equilibrium of the field
        let rk = Rk4Integrator::default();
        let c = (8.0 / 3.0 * 27.0_f64).sqrt();
        let eq = State::new(c, c, 27.0);
        let d = rk.derivative(eq);
        assert_abs_diff_eq!(d.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.z, 0.0, epsilon = 1e-9);
        let next = rk.step(eq);
        assert_abs_diff_eq!(next.x, eq.x, epsilon = 1e-9);
        assert_abs_diff_eq!(next.z, eq.z, epsilon = 1e-9);
    }

    #[test]
    fn test_step_is_deterministic() {
        let rk = Rk4Integrator::default();
        let s = State::new(-3.2, 7.7, 21.0);
        let a = rk.step(s);
        let b = rk.step(s);
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.z.to_bits(), b.z.to_bits());
    }

    #[test]
    fn test_matches_exponential_decay() {
        // σ = 1, ρ = 0, β = 1 from (0, 0, 1): z' = -z, so z(t) = e^{-t}
        let rk = Rk4Integrator::new(
            LorenzParams {
                sigma: 1.0,
                rho: 0.0,
                beta: 1.0,
            },
            0.1,
        );
        let mut s = State::new(0.0, 0.0, 1.0);
        for _ in 0..10 {
            s = rk.step(s);
        }
        assert_abs_diff_eq!(s.z, (-1.0_f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_nan_propagates_without_guard() {
        let rk = Rk4Integrator::default();
        let next = rk.step(State::new(f64::NAN, 0.0, 0.0));
        assert!(!next.is_finite());
    }
}
