//! An indexable collection of graphs, with the two scalar properties a model needs:
//! the node feature width and the number of classes.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{GnnError, Result};
use crate::graph::Graph;

#[derive(Debug, Clone)]
pub struct GraphDataset {
    graphs: Vec<Graph>,
    num_features: usize,
    num_classes: usize,
} // end of GraphDataset

impl GraphDataset {
    /// checks the dataset is not empty, all graphs share the same feature width and labels are in [0, num_classes)
    pub fn new(graphs: Vec<Graph>, num_classes: usize) -> Result<Self> {
        if graphs.is_empty() {
            return Err(GnnError::EmptyDataset(String::from("dataset has no graph")));
        }
        if num_classes < 2 {
            return Err(GnnError::InvalidConfig(format!("need at least 2 classes, got {}", num_classes)));
        }
        let num_features = graphs[0].get_nb_features();
        for (rank, graph) in graphs.iter().enumerate() {
            if graph.get_nb_features() != num_features {
                log::error!("graph {} has {} features, expected {}", rank, graph.get_nb_features(), num_features);
                return Err(GnnError::DimensionMismatch {
                    expected: num_features,
                    got: graph.get_nb_features(),
                });
            }
            if graph.get_label() >= num_classes {
                return Err(GnnError::InvalidGraph(format!(
                    "graph {} has label {} but there are {} classes",
                    rank,
                    graph.get_label(),
                    num_classes
                )));
            }
        }
        log::info!(
            "GraphDataset nb graphs : {}, nb features : {}, nb classes : {}",
            graphs.len(),
            num_features,
            num_classes
        );
        Ok(GraphDataset {
            graphs,
            num_features,
            num_classes,
        })
    } // end of new

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn get(&self, rank: usize) -> Option<&Graph> {
        self.graphs.get(rank)
    }

    pub fn get_graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn get_num_features(&self) -> usize {
        self.num_features
    }

    pub fn get_num_classes(&self) -> usize {
        self.num_classes
    }

    /// number of graphs of each class
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_classes];
        for graph in &self.graphs {
            counts[graph.get_label()] += 1;
        }
        counts
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.graphs.shuffle(rng);
    }

    /// contiguous split : the first int(len * train_fraction) graphs are the train part, the others the test part.
    /// Both parts must be non empty.
    pub fn split(&self, train_fraction: f64) -> Result<(Vec<Graph>, Vec<Graph>)> {
        if !(train_fraction > 0. && train_fraction < 1.) {
            return Err(GnnError::InvalidConfig(format!(
                "train fraction must be in ]0,1[, got {}",
                train_fraction
            )));
        }
        let nb_train = (self.graphs.len() as f64 * train_fraction) as usize;
        if nb_train == 0 || nb_train == self.graphs.len() {
            log::error!("split of {} graphs with fraction {} gives an empty part", self.graphs.len(), train_fraction);
            return Err(GnnError::EmptyDataset(format!(
                "split of {} graphs at {} leaves an empty train or test part",
                self.graphs.len(),
                train_fraction
            )));
        }
        let train = self.graphs[..nb_train].to_vec();
        let test = self.graphs[nb_train..].to_vec();
        log::info!("split train : {}, test : {}", train.len(), test.len());
        Ok((train, test))
    } // end of split
} // end of impl GraphDataset

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::Array2;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn graphs(nb: usize) -> Vec<Graph> {
        (0..nb)
            .map(|i| Graph::new(Array2::<f32>::from_elem((2, 3), i as f32), vec![(0, 1)], i % 2).unwrap())
            .collect()
    }

    #[test]
    fn split_is_contiguous() {
        log_init_test();
        let dataset = GraphDataset::new(graphs(10), 2).unwrap();
        assert_eq!(dataset.get_num_features(), 3);
        assert_eq!(dataset.class_counts(), vec![5, 5]);
        let (train, test) = dataset.split(0.8).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(test[0].get_features()[[0, 0]], 8.);
    }

    #[test]
    fn split_rejects_empty_parts() {
        log_init_test();
        let dataset = GraphDataset::new(graphs(2), 2).unwrap();
        assert!(dataset.split(0.4).is_err());
        assert!(dataset.split(1.0).is_err());
        assert!(GraphDataset::new(vec![], 2).is_err());
    }

    #[test]
    fn shuffle_keeps_graphs() {
        log_init_test();
        let mut dataset = GraphDataset::new(graphs(20), 2).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4664397);
        dataset.shuffle(&mut rng);
        let mut values: Vec<usize> = dataset.get_graphs().iter().map(|g| g.get_features()[[0, 0]] as usize).collect();
        values.sort_unstable();
        assert_eq!(values, (0..20).collect::<Vec<usize>>());
    }
} // end of mod tests
