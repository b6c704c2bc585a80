//! Summation nodes of the network graph
//!
//! A node sums the outputs of its incoming edges plus an optional bias. It
//! does not own its edges: both endpoint nodes reference the same edge in
//! the network's edge arena, so edge state is never duplicated.

/// A node in the layered KAN graph
///
/// `output` is recomputed by every forward pass; `output_der` holds
/// ∂Loss/∂output and is recomputed by every backward pass. After a forward
/// pass, `output == bias + Σ edge(source.output)` over the input edges.
#[derive(Debug, Clone)]
pub struct KanNode {
    /// Identifier: an input name for layer-0 nodes, a running number otherwise
    pub id: String,
    /// Indices of incoming edges in the network's edge arena
    pub input_edges: Vec<usize>,
    /// Indices of outgoing edges in the network's edge arena
    pub output_edges: Vec<usize>,
    /// Output of the last forward pass
    pub output: f64,
    /// ∂Loss/∂output from the last backward pass
    pub output_der: f64,
    /// Additive bias; stays 0 when the network is built without biases
    pub bias: f64,
}

impl KanNode {
    pub fn new(id: String, bias: f64) -> Self {
        Self {
            id,
            input_edges: Vec::new(),
            output_edges: Vec::new(),
            output: 0.0,
            output_der: 0.0,
            bias,
        }
    }
}
