//! Toy datasets with a trivially separable signal.
//!
//! Each graph is a directed cycle (so every node has an incoming edge) with one repeated edge
//! from the root. Nodes carry a single feature, positive for phishing graphs and negative for benign ones,
//! with a small random amplitude so that feature variance inside a batch is never 0.

use ndarray::Array2;
use rand::distributions::{Distribution, Uniform};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{GnnError, Result};
use crate::graph::data::{BENIGN, PHISHING};
use crate::graph::{Graph, GraphDataset};

/// generates one graph with nb_nodes nodes and the label's sign on its feature
pub fn toy_graph(nb_nodes: usize, label: usize, rng: &mut Xoshiro256PlusPlus) -> Result<Graph> {
    if nb_nodes == 0 {
        return Err(GnnError::InvalidGraph(String::from("toy graph needs a node")));
    }
    let amplitude = Uniform::<f32>::new(0., 0.25);
    let sign = if label == PHISHING { 1.0f32 } else { -1.0f32 };
    let features = Array2::<f32>::from_shape_fn((nb_nodes, 1), |_| sign * (1. + amplitude.sample(rng)));
    let mut edges: Vec<(usize, usize)> = (0..nb_nodes).map(|i| (i, (i + 1) % nb_nodes)).collect();
    if nb_nodes > 1 {
        edges.push((0, 1));
    }
    Graph::new(features, edges, label)
} // end of toy_graph

/// a balanced 2 classes dataset, labels alternate (phishing first), graphs have between 3 and 6 nodes.
pub fn toy_dataset(nb_graphs: usize, seed: u64) -> Result<GraphDataset> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let sizes = Uniform::<usize>::new_inclusive(3, 6);
    let mut graphs = Vec::<Graph>::with_capacity(nb_graphs);
    for i in 0..nb_graphs {
        let label = if i % 2 == 0 { PHISHING } else { BENIGN };
        let nb_nodes = sizes.sample(&mut rng);
        graphs.push(toy_graph(nb_nodes, label, &mut rng)?);
    }
    log::debug!("toy_dataset generated {} graphs", nb_graphs);
    GraphDataset::new(graphs, 2)
} // end of toy_dataset

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn toy_dataset_is_balanced_and_separable() {
        log_init_test();
        let dataset = toy_dataset(10, 113).unwrap();
        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.class_counts(), vec![5, 5]);
        for graph in dataset.get_graphs() {
            let positive = graph.get_features().iter().all(|v| *v > 0.);
            assert_eq!(positive, graph.is_phishing());
            // every node receives at least one edge
            let mut received = vec![false; graph.get_nb_nodes()];
            for (_, j) in graph.get_edges() {
                received[*j] = true;
            }
            assert!(received.iter().all(|r| *r));
        }
    }

    #[test]
    fn toy_dataset_is_reproducible() {
        log_init_test();
        let d1 = toy_dataset(6, 5).unwrap();
        let d2 = toy_dataset(6, 5).unwrap();
        for (g1, g2) in d1.get_graphs().iter().zip(d2.get_graphs()) {
            assert_eq!(g1.get_features(), g2.get_features());
            assert_eq!(g1.get_edges(), g2.get_edges());
        }
    }
} // end of mod tests
