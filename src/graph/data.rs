//! A single graph sample.
//!
//! Nodes are identified by their rank in the feature matrix. The edge list is directed, an edge (i,j)
//! means a message from i is received by j. Repeated edges are kept, they represent repeated navigation
//! between 2 pages.

use ndarray::Array2;

use crate::error::{GnnError, Result};

/// label of a phishing site
pub const PHISHING: usize = 1;

/// label of a benign site
pub const BENIGN: usize = 0;

#[derive(Debug, Clone)]
pub struct Graph {
    /// (nb_nodes, nb_features) node features
    features: Array2<f32>,
    /// directed edges (source, target)
    edges: Vec<(usize, usize)>,
    /// graph level label
    label: usize,
    /// optional url of each node, only used for visualization
    urls: Option<Vec<String>>,
} // end of Graph

impl Graph {
    /// checks there is at least one node and that every edge endpoint is a valid node rank
    pub fn new(features: Array2<f32>, edges: Vec<(usize, usize)>, label: usize) -> Result<Self> {
        let nb_nodes = features.nrows();
        if nb_nodes == 0 {
            return Err(GnnError::InvalidGraph(String::from("a graph must have at least one node")));
        }
        if let Some((i, j)) = edges.iter().find(|(i, j)| *i >= nb_nodes || *j >= nb_nodes) {
            log::error!("Graph::new edge ({}, {}) out of range, nb nodes : {}", i, j, nb_nodes);
            return Err(GnnError::InvalidGraph(format!(
                "edge ({}, {}) references a node outside [0, {})",
                i, j, nb_nodes
            )));
        }
        Ok(Graph {
            features,
            edges,
            label,
            urls: None,
        })
    } // end of new

    /// attach node urls. There must be one url by node.
    pub fn with_urls(mut self, urls: Vec<String>) -> Result<Self> {
        if urls.len() != self.get_nb_nodes() {
            return Err(GnnError::InvalidGraph(format!(
                "got {} urls for {} nodes",
                urls.len(),
                self.get_nb_nodes()
            )));
        }
        self.urls = Some(urls);
        Ok(self)
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.features.nrows()
    }

    pub fn get_nb_edges(&self) -> usize {
        self.edges.len()
    }

    /// width of node features
    pub fn get_nb_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn get_features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn get_edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn get_label(&self) -> usize {
        self.label
    }

    pub fn get_urls(&self) -> Option<&[String]> {
        self.urls.as_deref()
    }

    pub fn is_phishing(&self) -> bool {
        self.label == PHISHING
    }
} // end of impl Graph

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn graph_checks_edges() {
        log_init_test();
        let features = array![[1.0f32], [2.0], [3.0]];
        let graph = Graph::new(features.clone(), vec![(0, 1), (1, 2), (1, 2)], PHISHING).unwrap();
        assert_eq!(graph.get_nb_nodes(), 3);
        assert_eq!(graph.get_nb_edges(), 3);
        assert!(graph.is_phishing());
        //
        let res = Graph::new(features, vec![(0, 3)], BENIGN);
        assert!(matches!(res, Err(GnnError::InvalidGraph(_))));
    }

    #[test]
    fn graph_needs_a_node() {
        log_init_test();
        let features = Array2::<f32>::zeros((0, 4));
        assert!(Graph::new(features, vec![], BENIGN).is_err());
    }

    #[test]
    fn graph_urls_count() {
        log_init_test();
        let graph = Graph::new(array![[0.0f32], [1.0]], vec![(0, 1)], BENIGN).unwrap();
        assert!(graph.clone().with_urls(vec![String::from("http://a.com")]).is_err());
        let graph = graph
            .with_urls(vec![String::from("http://a.com"), String::from("http://a.com/b")])
            .unwrap();
        assert_eq!(graph.get_urls().unwrap().len(), 2);
    }
} // end of mod tests
