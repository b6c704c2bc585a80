//! Network edges: one learnable function plus a gradient accumulator
//!
//! Each edge owns exactly one [`LearnableFunction`] and batches control-point
//! gradients across a mini-batch; the averaged gradients are applied on
//! [`KanEdge::update_parameters`].

use rand::Rng;

use crate::univariate::LearnableFunction;

/// An edge between two nodes, applying a learnable univariate function
///
/// Source and destination are indices into the network's node arena; the
/// edge itself lives in the edge arena and is referenced from both endpoint
/// nodes. The edge caches its most recent forward input so the backward pass
/// can evaluate gradients at the same point.
#[derive(Debug, Clone)]
pub struct KanEdge {
    /// Identifier, `"<sourceId>-<destId>"`
    pub id: String,
    /// Index of the source node
    pub source: usize,
    /// Index of the destination node
    pub dest: usize,
    /// The learnable function applied along this edge
    pub function: LearnableFunction,
    /// Most recent forward input
    pub last_input: f64,
    /// Accumulated control-point gradients for the current batch
    pub acc_gradients: Vec<f64>,
    /// How many examples have been accumulated since the last update
    pub num_accumulated: usize,
}

impl KanEdge {
    /// Create an edge with a freshly initialized learnable function
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: usize,
        dest: usize,
        source_id: &str,
        dest_id: &str,
        input_range: (f64, f64),
        grid_size: usize,
        degree: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let id = format!("{source_id}-{dest_id}");
        let function = LearnableFunction::new(id.clone(), input_range, grid_size, degree, rng);
        let num_control_points = function.control_points.len();

        Self {
            id,
            source,
            dest,
            function,
            last_input: 0.0,
            acc_gradients: vec![0.0; num_control_points],
            num_accumulated: 0,
        }
    }

    /// Apply the edge function, caching the input for the backward pass
    pub fn forward(&mut self, input: f64) -> f64 {
        self.last_input = input;
        self.function.evaluate(input)
    }

    /// Accumulate control-point gradients for the cached input
    ///
    /// Adds `output_gradient * Bᵢ(last_input)` into the accumulator. Must be
    /// called at most once per example per edge between updates for the
    /// averaging in [`update_parameters`](Self::update_parameters) to hold.
    pub fn accumulate_gradients(&mut self, output_gradient: f64) {
        let basis = self.function.control_point_gradients(self.last_input);
        for (acc, b) in self.acc_gradients.iter_mut().zip(&basis) {
            *acc += output_gradient * b;
        }
        self.num_accumulated += 1;
    }

    /// Apply the averaged accumulated gradients, then reset the accumulator
    ///
    /// No-op when nothing has been accumulated.
    pub fn update_parameters(&mut self, learning_rate: f64) {
        if self.num_accumulated == 0 {
            return;
        }

        let count = self.num_accumulated as f64;
        for g in self.acc_gradients.iter_mut() {
            *g /= count;
        }

        self.function
            .update_parameters(&self.acc_gradients, learning_rate);

        for g in self.acc_gradients.iter_mut() {
            *g = 0.0;
        }
        self.num_accumulated = 0;
    }
}
