//! B-spline basis machinery for KAN edge functions
//!
//! B-splines provide smooth, locally-supported basis functions that form the
//! foundation of the engine's learnable univariate functions. This module
//! owns the knot vector, the knot-span search, de Boor evaluation, and the
//! Cox-de Boor basis recurrence; the learnable control points live in
//! [`crate::univariate::LearnableFunction`].

/// Clamped B-spline basis over a fixed input range
///
/// Uses Cox-de Boor recursion for stable evaluation of B-spline basis
/// functions. The knot vector is clamped: the first and last `degree + 1`
/// entries repeat the range bounds so the spline interpolates its endpoint
/// control points. Evaluation inputs are clamped into `input_range`, so
/// every query point falls inside a valid knot span.
#[derive(Debug, Clone)]
pub struct BSpline {
    /// Knot vector (includes repeated boundary knots)
    pub knots: Vec<f64>,
    /// Polynomial degree, capped at `grid_size - 1`
    pub degree: usize,
    /// Number of basis functions (`grid_size + 1`)
    pub num_basis: usize,
    /// Evaluation domain; inputs outside it are clamped in
    pub input_range: (f64, f64),
}

impl BSpline {
    /// Create a clamped B-spline basis with uniformly spaced interior knots
    ///
    /// # Arguments
    /// * `input_range` - Domain of the spline, `(min, max)` with `min < max`
    /// * `grid_size` - Number of spline intervals; yields `grid_size + 1` basis functions
    /// * `degree` - Requested polynomial degree; clamped to `grid_size - 1`
    pub fn new(input_range: (f64, f64), grid_size: usize, degree: usize) -> Self {
        let degree = degree.min(grid_size.saturating_sub(1));
        let (min, max) = input_range;
        let num_basis = grid_size + 1;

        // Knot vector: grid_size + degree + 2 entries, clamped at both ends.
        let mut knots = Vec::with_capacity(grid_size + degree + 2);
        for _ in 0..=degree {
            knots.push(min);
        }
        let interior = grid_size - degree;
        let step = (max - min) / (interior + 1) as f64;
        for j in 1..=interior {
            knots.push(min + j as f64 * step);
        }
        for _ in 0..=degree {
            knots.push(max);
        }

        Self {
            knots,
            degree,
            num_basis,
            input_range,
        }
    }

    /// Clamp a query point into the spline's domain
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.input_range.0, self.input_range.1)
    }

    /// Index of the knot span containing `x`
    ///
    /// Boundary rule: `x >= knots[n + 1]` (n = last control point index)
    /// returns span `n`; `x <= knots[degree]` returns span `degree`;
    /// otherwise binary search for the unique `mid` with
    /// `knots[mid] <= x < knots[mid + 1]`.
    pub fn find_span(&self, x: f64) -> usize {
        let n = self.num_basis - 1;
        let p = self.degree;

        if x >= self.knots[n + 1] {
            return n;
        }
        if x <= self.knots[p] {
            return p;
        }

        let mut low = p;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while x < self.knots[mid] || x >= self.knots[mid + 1] {
            if x < self.knots[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }
        mid
    }

    /// Spline value at `x` for the given control points (de Boor's algorithm)
    ///
    /// Repeated linear blending over the `degree + 1` control points adjacent
    /// to the active span. Degree 0 degenerates to the nearest-left control
    /// point.
    pub fn de_boor(&self, x: f64, control_points: &[f64]) -> f64 {
        let x = self.clamp(x);
        let p = self.degree;
        let span = self.find_span(x);

        let mut d: Vec<f64> = (0..=p).map(|j| control_points[j + span - p]).collect();

        for r in 1..=p {
            for j in (r..=p).rev() {
                let left = self.knots[j + span - p];
                let right = self.knots[j + 1 + span - r];
                let alpha = if right != left {
                    (x - left) / (right - left)
                } else {
                    0.0
                };
                d[j] = (1.0 - alpha) * d[j - 1] + alpha * d[j];
            }
        }

        d[p]
    }

    /// All basis function values at `x`
    ///
    /// Returns a vector of length `num_basis`; only the `degree + 1` entries
    /// of the active span are nonzero. Computed with the triangular
    /// Cox-de Boor recurrence, so the values are exact (partition of unity
    /// holds to floating tolerance), not finite-difference approximations.
    pub fn basis(&self, x: f64) -> Vec<f64> {
        let x = self.clamp(x);
        let p = self.degree;
        let span = self.find_span(x);

        let mut n = vec![0.0; p + 1];
        n[0] = 1.0;

        for j in 1..=p {
            let mut saved = 0.0;
            for r in 0..j {
                let left = self.knots[span + 1 + r - j];
                let right = self.knots[span + 1 + r];
                let alpha = if right != left {
                    (x - left) / (right - left)
                } else {
                    0.0
                };

                let temp = n[r];
                n[r] = saved + (1.0 - alpha) * temp;
                saved = alpha * temp;
            }
            n[j] = saved;
        }

        let mut basis = vec![0.0; self.num_basis];
        for (i, value) in n.into_iter().enumerate() {
            basis[span - p + i] = value;
        }
        basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Textbook Cox-de Boor recursion, evaluated naively. Used as an
    /// independent reference for both `basis` and `de_boor`.
    fn naive_basis(knots: &[f64], i: usize, p: usize, x: f64) -> f64 {
        if p == 0 {
            return if knots[i] <= x && x < knots[i + 1] {
                1.0
            } else {
                0.0
            };
        }
        let mut value = 0.0;
        let left = knots[i + p] - knots[i];
        if left > 0.0 {
            value += (x - knots[i]) / left * naive_basis(knots, i, p - 1, x);
        }
        let right = knots[i + p + 1] - knots[i + 1];
        if right > 0.0 {
            value += (knots[i + p + 1] - x) / right * naive_basis(knots, i + 1, p - 1, x);
        }
        value
    }

    #[test]
    fn test_knot_vector_shape() {
        let spline = BSpline::new((-1.0, 1.0), 5, 3);

        assert_eq!(spline.degree, 3);
        assert_eq!(spline.num_basis, 6);
        assert_eq!(spline.knots.len(), 5 + 3 + 2);

        // Clamped ends
        for i in 0..=3 {
            assert_eq!(spline.knots[i], -1.0);
            assert_eq!(spline.knots[spline.knots.len() - 1 - i], 1.0);
        }

        // Non-decreasing
        for pair in spline.knots.windows(2) {
            assert!(pair[0] <= pair[1], "Knots must be non-decreasing: {:?}", pair);
        }
    }

    #[test]
    fn test_degree_capped_at_grid_size() {
        let spline = BSpline::new((0.0, 1.0), 4, 10);
        assert_eq!(spline.degree, 3);
        assert_eq!(spline.knots.len(), 4 + 3 + 2);
    }

    #[test]
    fn test_partition_of_unity() {
        let spline = BSpline::new((-1.0, 1.0), 8, 3);

        // B-splines form a partition of unity: sum of all basis functions = 1
        for i in 0..=100 {
            let x = -1.0 + 2.0 * i as f64 / 100.0;
            let sum: f64 = spline.basis(x).iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "Not partition of unity at x={}: sum={}",
                x,
                sum
            );
        }
    }

    #[test]
    fn test_basis_matches_naive_recursion() {
        let spline = BSpline::new((-1.0, 1.0), 6, 3);

        // Interior points only: the naive half-open degree-0 rule misfires
        // exactly at the right boundary, which find_span handles explicitly.
        for i in 1..40 {
            let x = -1.0 + 2.0 * i as f64 / 40.0 - 1e-9;
            let basis = spline.basis(x);
            for j in 0..spline.num_basis {
                let reference = naive_basis(&spline.knots, j, spline.degree, x);
                assert!(
                    (basis[j] - reference).abs() < 1e-10,
                    "Basis {} mismatch at x={}: {} vs {}",
                    j,
                    x,
                    basis[j],
                    reference
                );
            }
        }
    }

    #[test]
    fn test_de_boor_matches_reference_blend() {
        let spline = BSpline::new((-1.0, 1.0), 6, 3);
        let control_points: Vec<f64> = (0..spline.num_basis).map(|i| (i as f64).sin()).collect();

        for i in 1..40 {
            let x = -1.0 + 2.0 * i as f64 / 40.0 - 1e-9;
            let value = spline.de_boor(x, &control_points);
            let reference: f64 = (0..spline.num_basis)
                .map(|j| control_points[j] * naive_basis(&spline.knots, j, spline.degree, x))
                .sum();
            assert!(
                (value - reference).abs() < 1e-10,
                "de Boor mismatch at x={}: {} vs {}",
                x,
                value,
                reference
            );
        }
    }

    #[test]
    fn test_de_boor_interpolates_endpoints() {
        // Clamped splines pass through their endpoint control points
        let spline = BSpline::new((-1.0, 1.0), 5, 3);
        let control_points = vec![0.7, 0.1, -0.2, 0.4, 0.0, -0.9];

        assert!((spline.de_boor(-1.0, &control_points) - 0.7).abs() < 1e-12);
        assert!((spline.de_boor(1.0, &control_points) - (-0.9)).abs() < 1e-12);
    }

    #[test]
    fn test_degree_zero_nearest_left() {
        let spline = BSpline::new((0.0, 1.0), 4, 0);
        let control_points = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        // Step width is 1/5; each interval holds its left control point
        assert_eq!(spline.de_boor(0.1, &control_points), 1.0);
        assert_eq!(spline.de_boor(0.3, &control_points), 2.0);
        assert_eq!(spline.de_boor(0.5, &control_points), 3.0);
        assert_eq!(spline.de_boor(0.99, &control_points), 5.0);
    }

    #[test]
    fn test_find_span_boundaries() {
        let spline = BSpline::new((-1.0, 1.0), 5, 3);
        let n = spline.num_basis - 1;

        assert_eq!(spline.find_span(-1.0), spline.degree);
        assert_eq!(spline.find_span(1.0), n);
        // Above max still lands in the top span after clamping rules
        assert_eq!(spline.find_span(5.0), n);

        let span = spline.find_span(0.0);
        assert!(spline.knots[span] <= 0.0 && 0.0 < spline.knots[span + 1]);
    }
}
