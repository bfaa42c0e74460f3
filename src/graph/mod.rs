//! The data model consumed by the layers, the models and the training loop.
//!
//! - [Graph] : one sample, a node feature matrix, a directed edge list (parallel edges allowed) and a label.
//! - [Batch] : a disjoint union of graphs with offset edges and a node to graph assignment.
//! - [GraphDataset] : an indexable, shuffleable collection of graphs.
//! - [DataLoader] : groups graphs into batches, possibly in a new random order at each epoch.

pub mod batch;
pub mod data;
pub mod dataset;
pub mod loader;
pub mod synthetic;

pub use batch::{Batch, EdgeIndex, GraphAssignment};
pub use data::Graph;
pub use dataset::GraphDataset;
pub use loader::DataLoader;
