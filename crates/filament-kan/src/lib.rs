//! Filament KAN - a Kolmogorov-Arnold network engine with B-spline edges
//!
//! This crate implements a small KAN training engine from first principles:
//! no external autodiff or linear-algebra library, just de Boor evaluation,
//! basis-function gradients, and mini-batch gradient accumulation over a
//! layered graph.
//!
//! # Architecture
//!
//! Unlike traditional MLPs:
//! - **MLPs**: Fixed activations on nodes, learnable scalar weights on edges
//! - **KANs**: Learnable B-spline functions on edges, nodes merely sum
//!
//! Each edge of the graph owns one [`LearnableFunction`]: a clamped B-spline
//! whose control points are the trainable parameters. Nodes add their input
//! edges' outputs (plus an optional bias); the output layer is a single node.
//!
//! # Training
//!
//! The engine exposes the four passes a training loop composes:
//! [`Network::build`], [`Network::forward_prop`], [`Network::backward_prop`]
//! (which accumulates edge gradients), and [`Network::update_weights`]
//! (which applies batch-averaged gradients). Call forward + backward once
//! per example and update once per batch; [`Network::train_batch`] wraps
//! exactly that sequence. The loss stays outside the engine: only its
//! derivative, a plain `(predicted, target) -> f64` closure, crosses the
//! interface.
//!
//! Everything is synchronous, single-threaded CPU code over `f64`.

pub mod bspline;
pub mod edge;
pub mod error;
pub mod kan;
pub mod node;
pub mod univariate;

// Re-exports
pub use bspline::BSpline;
pub use edge::KanEdge;
pub use error::{KanError, Result};
pub use kan::Network;
pub use node::KanNode;
pub use univariate::LearnableFunction;
