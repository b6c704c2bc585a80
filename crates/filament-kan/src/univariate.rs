//! Learnable univariate functions over a B-spline basis
//!
//! Each edge of the network carries one of these: a weighted sum of B-spline
//! basis functions whose control points are learned during training.

use rand::Rng;

use crate::bspline::BSpline;

/// Finite-difference step for `LearnableFunction::derivative`
const DERIVATIVE_STEP: f64 = 1e-6;

/// A learnable univariate function: control points over a clamped B-spline
///
/// The function is f(x) = Σ cᵢ · Bᵢ(x), where Bᵢ are the basis functions of
/// the owned [`BSpline`] and cᵢ the learnable control points. Created once
/// at network-build time; the control points are mutated only through
/// [`update_parameters`](Self::update_parameters) and never resized.
#[derive(Debug, Clone)]
pub struct LearnableFunction {
    /// Identifier, matching the owning edge
    pub id: String,
    /// Underlying B-spline basis
    pub spline: BSpline,
    /// Learnable control points (one per basis function)
    pub control_points: Vec<f64>,
}

impl LearnableFunction {
    /// Create a function with small random control points
    pub fn new(
        id: String,
        input_range: (f64, f64),
        grid_size: usize,
        degree: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let spline = BSpline::new(input_range, grid_size, degree);
        let control_points = (0..spline.num_basis)
            .map(|_| (rng.gen::<f64>() - 0.5) * 0.2)
            .collect();

        Self {
            id,
            spline,
            control_points,
        }
    }

    /// Evaluate the function at `x`
    ///
    /// The input is clamped into the spline's range, so the result is finite
    /// for any real `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.spline.de_boor(x, &self.control_points)
    }

    /// Approximate df/dx at `x` by symmetric finite differences
    ///
    /// Both sample points are clamped into the input range; returns 0 when
    /// the clamped interval collapses. Any `x` beyond the range lands on a
    /// collapsed interval, matching the flat clamped function there. This is
    /// the approximate path used for node-to-node gradient propagation.
    /// Control-point gradients use the exact basis functions instead, see
    /// [`control_point_gradients`](Self::control_point_gradients).
    pub fn derivative(&self, x: f64) -> f64 {
        let (min, max) = self.spline.input_range;
        let lo = (x - DERIVATIVE_STEP).max(min);
        let hi = (x + DERIVATIVE_STEP).min(max);
        if hi <= lo {
            return 0.0;
        }
        (self.evaluate(hi) - self.evaluate(lo)) / (hi - lo)
    }

    /// Exact gradient of `evaluate(x)` with respect to each control point
    ///
    /// Since f(x) = Σ cᵢ · Bᵢ(x), the gradient for cᵢ is simply Bᵢ(x): zero
    /// everywhere except the `degree + 1` entries of the active span, which
    /// sum to 1 (partition of unity).
    pub fn control_point_gradients(&self, x: f64) -> Vec<f64> {
        self.spline.basis(x)
    }

    /// Gradient-descent step on the control points
    ///
    /// No clamping of control-point magnitude.
    pub fn update_parameters(&mut self, gradients: &[f64], learning_rate: f64) {
        for (c, g) in self.control_points.iter_mut().zip(gradients) {
            *c -= learning_rate * g;
        }
    }
}
