//! Network driver: topology construction and the training passes
//!
//! Builds a fully-connected layered graph of nodes and edges, and drives the
//! per-example forward and backward passes plus the per-batch parameter
//! update. Nodes and edges live in two flat arenas indexed by `usize`; the
//! layer structure holds node indices, and each endpoint node references its
//! edges by index, so one edge is visible from both ends without shared
//! ownership.

use rand::Rng;
use tracing::{debug, trace};

use crate::edge::KanEdge;
use crate::node::KanNode;
use crate::{KanError, Result};

/// A layered Kolmogorov-Arnold network
///
/// Layer 0 is the input layer (one node per named input, no incoming edges);
/// the last layer contains exactly one node. Every node in layer L > 0 has
/// one incoming edge from every node in layer L - 1.
#[derive(Debug, Clone)]
pub struct Network {
    /// Node indices per layer, in forward order
    pub layers: Vec<Vec<usize>>,
    /// Node arena
    pub nodes: Vec<KanNode>,
    /// Edge arena, shared by the adjacent layers each edge connects
    pub edges: Vec<KanEdge>,
}

impl Network {
    /// Build a fully-connected layered network
    ///
    /// # Arguments
    /// * `shape` - Nodes per layer; the last entry must be 1
    /// * `input_ids` - Names for the input-layer nodes; length must equal `shape[0]`
    /// * `input_range` - Domain of every edge's B-spline
    /// * `grid_size` - Spline intervals per edge function
    /// * `degree` - B-spline degree (capped at `grid_size - 1`)
    /// * `use_bias` - Give non-input nodes a learnable bias (initialized to 0.1)
    /// * `rng` - Source for the initial control points; seed it for reproducible runs
    ///
    /// # Errors
    /// `InvalidConfig` when the last layer size is not 1 or the input id
    /// count does not match `shape[0]`. No partial network is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        shape: &[usize],
        input_ids: &[&str],
        input_range: (f64, f64),
        grid_size: usize,
        degree: usize,
        use_bias: bool,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if shape.last().copied() != Some(1) {
            return Err(KanError::InvalidConfig(
                "output layer must contain exactly one node".into(),
            ));
        }
        if input_ids.len() != shape[0] {
            return Err(KanError::InvalidConfig(format!(
                "expected {} input ids for the input layer, got {}",
                shape[0],
                input_ids.len()
            )));
        }

        let mut nodes: Vec<KanNode> = Vec::new();
        let mut edges: Vec<KanEdge> = Vec::new();
        let mut layers: Vec<Vec<usize>> = Vec::with_capacity(shape.len());

        // Input layer: named nodes, no bias, no incoming edges.
        let mut input_layer = Vec::with_capacity(shape[0]);
        for id in input_ids {
            input_layer.push(nodes.len());
            nodes.push(KanNode::new((*id).to_string(), 0.0));
        }
        layers.push(input_layer);

        // Hidden and output layers: numbered nodes, fully connected backwards.
        let mut next_id = 1usize;
        for layer_size in &shape[1..] {
            let mut layer = Vec::with_capacity(*layer_size);
            for _ in 0..*layer_size {
                let node_idx = nodes.len();
                let bias = if use_bias { 0.1 } else { 0.0 };
                nodes.push(KanNode::new(next_id.to_string(), bias));
                next_id += 1;

                let prev_layer = &layers[layers.len() - 1];
                for &source in prev_layer {
                    let edge_idx = edges.len();
                    let edge = KanEdge::new(
                        source,
                        node_idx,
                        &nodes[source].id,
                        &nodes[node_idx].id,
                        input_range,
                        grid_size,
                        degree,
                        rng,
                    );
                    edges.push(edge);
                    nodes[source].output_edges.push(edge_idx);
                    nodes[node_idx].input_edges.push(edge_idx);
                }
                layer.push(node_idx);
            }
            layers.push(layer);
        }

        debug!(
            layers = layers.len(),
            nodes = nodes.len(),
            edges = edges.len(),
            "built KAN topology"
        );

        Ok(Self {
            layers,
            nodes,
            edges,
        })
    }

    /// Run one example through the network, returning the output-node value
    ///
    /// Input-layer outputs are set directly (no edges involved), then layers
    /// are processed in increasing order.
    ///
    /// # Errors
    /// `DimensionMismatch` when `inputs` does not match the input-layer
    /// arity; the network is left untouched in that case.
    pub fn forward_prop(&mut self, inputs: &[f64]) -> Result<f64> {
        if inputs.len() != self.layers[0].len() {
            return Err(KanError::DimensionMismatch {
                expected: self.layers[0].len(),
                actual: inputs.len(),
            });
        }

        for (&node_idx, &x) in self.layers[0].iter().zip(inputs) {
            self.nodes[node_idx].output = x;
        }

        for layer_idx in 1..self.layers.len() {
            for i in 0..self.layers[layer_idx].len() {
                let node_idx = self.layers[layer_idx][i];
                self.forward_node(node_idx);
            }
        }

        Ok(self.nodes[self.output_index()].output)
    }

    /// Back-propagate the loss derivative for the most recent forward pass
    ///
    /// Seeds the output node's `output_der` with
    /// `error_der(predicted, target)`, then walks the layers in decreasing
    /// order. A layer's receiving predecessors have their `output_der`
    /// zeroed before contributions are summed into them; the input layer is
    /// skipped since its `output_der` is never read.
    pub fn backward_prop<F>(&mut self, target: f64, error_der: F)
    where
        F: Fn(f64, f64) -> f64,
    {
        let output_idx = self.output_index();
        let predicted = self.nodes[output_idx].output;
        self.nodes[output_idx].output_der = error_der(predicted, target);

        for layer_idx in (1..self.layers.len()).rev() {
            if layer_idx - 1 > 0 {
                for i in 0..self.layers[layer_idx - 1].len() {
                    let node_idx = self.layers[layer_idx - 1][i];
                    self.nodes[node_idx].output_der = 0.0;
                }
            }
            for i in 0..self.layers[layer_idx].len() {
                let node_idx = self.layers[layer_idx][i];
                self.backward_node(node_idx);
            }
        }
    }

    /// Apply one batch's worth of accumulated gradients
    ///
    /// Biases step by the *current* `output_der` (overwritten per example,
    /// not averaged); edges apply their averaged accumulators and reset.
    /// A zero learning rate changes nothing.
    pub fn update_weights(&mut self, learning_rate: f64) {
        for layer_idx in 1..self.layers.len() {
            for i in 0..self.layers[layer_idx].len() {
                let node_idx = self.layers[layer_idx][i];
                if self.nodes[node_idx].bias != 0.0 {
                    let der = self.nodes[node_idx].output_der;
                    self.nodes[node_idx].bias -= learning_rate * der;
                }
                for j in 0..self.nodes[node_idx].input_edges.len() {
                    let edge_idx = self.nodes[node_idx].input_edges[j];
                    self.edges[edge_idx].update_parameters(learning_rate);
                }
            }
        }
        trace!(lr = learning_rate, "applied parameter update");
    }

    /// Train on a batch: forward + backward per example, one update per batch
    ///
    /// Convenience wrapper over the three passes, preserving their contract
    /// exactly. Returns the per-example predictions; loss bookkeeping stays
    /// with the caller, which supplies only the loss derivative.
    pub fn train_batch<F>(
        &mut self,
        examples: &[(Vec<f64>, f64)],
        error_der: F,
        learning_rate: f64,
    ) -> Result<Vec<f64>>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut predictions = Vec::with_capacity(examples.len());
        for (inputs, target) in examples {
            let predicted = self.forward_prop(inputs)?;
            self.backward_prop(*target, &error_der);
            predictions.push(predicted);
        }
        self.update_weights(learning_rate);
        Ok(predictions)
    }

    /// Visit every node in layer order, read-only
    ///
    /// The visitor must not mutate network topology; it sees nodes for
    /// rendering and inspection only.
    pub fn for_each_node<F>(&self, ignore_input_layer: bool, mut visitor: F)
    where
        F: FnMut(&KanNode),
    {
        let start = if ignore_input_layer { 1 } else { 0 };
        for layer in &self.layers[start..] {
            for &node_idx in layer {
                visitor(&self.nodes[node_idx]);
            }
        }
    }

    /// The single node of the output layer
    pub fn output_node(&self) -> &KanNode {
        &self.nodes[self.output_index()]
    }

    /// Total learnable scalars: control points plus active biases
    pub fn parameter_count(&self) -> usize {
        let mut count = 0;
        for edge in &self.edges {
            count += edge.function.control_points.len();
        }
        for node in &self.nodes {
            if node.bias != 0.0 {
                count += 1;
            }
        }
        count
    }

    fn output_index(&self) -> usize {
        self.layers[self.layers.len() - 1][0]
    }

    /// Forward pass for one node: bias plus the sum of its input edges.
    /// Source outputs must already be current (layer ordering).
    fn forward_node(&mut self, node_idx: usize) {
        let mut sum = self.nodes[node_idx].bias;
        for i in 0..self.nodes[node_idx].input_edges.len() {
            let edge_idx = self.nodes[node_idx].input_edges[i];
            let source = self.edges[edge_idx].source;
            let source_output = self.nodes[source].output;
            sum += self.edges[edge_idx].forward(source_output);
        }
        self.nodes[node_idx].output = sum;
    }

    /// Backward pass for one node: accumulate edge gradients and push
    /// ∂Loss/∂source_output upstream. Requires this node's `output_der`
    /// already seeded and the source layer's `output_der` zeroed.
    fn backward_node(&mut self, node_idx: usize) {
        let output_der = self.nodes[node_idx].output_der;
        for i in 0..self.nodes[node_idx].input_edges.len() {
            let edge_idx = self.nodes[node_idx].input_edges[i];
            let edge = &mut self.edges[edge_idx];
            let input_grad = output_der * edge.function.derivative(edge.last_input);
            edge.accumulate_gradients(output_der);
            let source = edge.source;
            self.nodes[source].output_der += input_grad;
        }
    }
}
