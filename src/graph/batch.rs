//! Collation of graphs into a batch.
//!
//! Node feature matrices are stacked, edge endpoints are shifted by the number of nodes of the graphs
//! placed before, and each node receives the rank of its graph in the batch. As graphs are concatenated in order
//! the assignment is non decreasing.
//!
//! Index tensors are kept on the device together with a host copy, the host copy is used for
//! the computations that need a loop over segments (max pooling, attention normalization).

use candle_core::{DType, Device, Tensor};

use crate::error::{GnnError, Result};
use crate::graph::Graph;

/// Edge list of a batch as 2 index tensors (source, target).
#[derive(Debug, Clone)]
pub struct EdgeIndex {
    /// sources as a (nb_edges) u32 tensor
    src: Tensor,
    /// targets as a (nb_edges) u32 tensor
    dst: Tensor,
    src_host: Vec<u32>,
    dst_host: Vec<u32>,
    /// number of nodes the indexes refer to
    nb_nodes: usize,
} // end of EdgeIndex

impl EdgeIndex {
    pub fn new(edges: &[(usize, usize)], nb_nodes: usize, device: &Device) -> Result<Self> {
        let mut src_host = Vec::<u32>::with_capacity(edges.len());
        let mut dst_host = Vec::<u32>::with_capacity(edges.len());
        for &(i, j) in edges {
            if i >= nb_nodes || j >= nb_nodes {
                return Err(GnnError::InvalidGraph(format!(
                    "edge ({}, {}) out of range, nb nodes {}",
                    i, j, nb_nodes
                )));
            }
            src_host.push(i as u32);
            dst_host.push(j as u32);
        }
        EdgeIndex::from_host(src_host, dst_host, nb_nodes, device)
    } // end of new

    fn from_host(src_host: Vec<u32>, dst_host: Vec<u32>, nb_nodes: usize, device: &Device) -> Result<Self> {
        let nb_edges = src_host.len();
        let src = Tensor::from_vec(src_host.clone(), nb_edges, device)?;
        let dst = Tensor::from_vec(dst_host.clone(), nb_edges, device)?;
        Ok(EdgeIndex {
            src,
            dst,
            src_host,
            dst_host,
            nb_nodes,
        })
    }

    /// returns a new edge index with one self loop (i,i) added for each node.
    pub fn with_self_loops(&self) -> Result<Self> {
        let mut src_host = self.src_host.clone();
        let mut dst_host = self.dst_host.clone();
        src_host.extend(0..self.nb_nodes as u32);
        dst_host.extend(0..self.nb_nodes as u32);
        EdgeIndex::from_host(src_host, dst_host, self.nb_nodes, self.src.device())
    }

    pub fn is_empty(&self) -> bool {
        self.src_host.is_empty()
    }

    pub fn get_nb_edges(&self) -> usize {
        self.src_host.len()
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.nb_nodes
    }

    pub fn src(&self) -> &Tensor {
        &self.src
    }

    pub fn dst(&self) -> &Tensor {
        &self.dst
    }

    pub fn get_src_host(&self) -> &[u32] {
        &self.src_host
    }

    pub fn get_dst_host(&self) -> &[u32] {
        &self.dst_host
    }

    /// number of incoming edges of each node, parallel edges counted with their multiplicity
    pub fn in_degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.nb_nodes];
        for &j in &self.dst_host {
            degrees[j as usize] += 1;
        }
        degrees
    }
} // end of impl EdgeIndex

/// node to graph assignment of a batch
#[derive(Debug, Clone)]
pub struct GraphAssignment {
    /// (nb_nodes) u32 tensor, values in [0, nb_graphs)
    index: Tensor,
    host: Vec<u32>,
    nb_graphs: usize,
} // end of GraphAssignment

impl GraphAssignment {
    pub fn new(host: Vec<u32>, nb_graphs: usize, device: &Device) -> Result<Self> {
        if let Some(g) = host.iter().find(|g| **g as usize >= nb_graphs) {
            return Err(GnnError::InvalidGraph(format!(
                "node assigned to graph {} in a batch of {} graphs",
                g, nb_graphs
            )));
        }
        let index = Tensor::from_vec(host.clone(), host.len(), device)?;
        Ok(GraphAssignment { index, host, nb_graphs })
    }

    pub fn index(&self) -> &Tensor {
        &self.index
    }

    pub fn get_host(&self) -> &[u32] {
        &self.host
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.nb_graphs
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.host.len()
    }

    /// number of nodes of each graph
    pub fn graph_sizes(&self) -> Vec<u32> {
        let mut sizes = vec![0u32; self.nb_graphs];
        for &g in &self.host {
            sizes[g as usize] += 1;
        }
        sizes
    }

    /// rank of the nodes of each graph
    pub fn graph_members(&self) -> Vec<Vec<u32>> {
        let mut members = vec![Vec::<u32>::new(); self.nb_graphs];
        for (node, &g) in self.host.iter().enumerate() {
            members[g as usize].push(node as u32);
        }
        members
    }
} // end of impl GraphAssignment

/// a disjoint union of graphs ready to be sent through a model
#[derive(Debug, Clone)]
pub struct Batch {
    /// (nb_nodes, nb_features) f32 tensor
    x: Tensor,
    edges: EdgeIndex,
    assignment: GraphAssignment,
    /// (nb_graphs) u32 labels
    labels: Tensor,
    labels_host: Vec<u32>,
} // end of Batch

impl Batch {
    /// concatenates graphs in the given order.
    pub fn from_graphs(graphs: &[&Graph], device: &Device) -> Result<Self> {
        if graphs.is_empty() {
            return Err(GnnError::EmptyDataset(String::from("cannot collate an empty batch")));
        }
        let nb_features = graphs[0].get_nb_features();
        let nb_nodes: usize = graphs.iter().map(|g| g.get_nb_nodes()).sum();
        let nb_edges: usize = graphs.iter().map(|g| g.get_nb_edges()).sum();
        //
        let mut features = Vec::<f32>::with_capacity(nb_nodes * nb_features);
        let mut edges = Vec::<(usize, usize)>::with_capacity(nb_edges);
        let mut assignment = Vec::<u32>::with_capacity(nb_nodes);
        let mut labels_host = Vec::<u32>::with_capacity(graphs.len());
        let mut offset = 0usize;
        for (rank, graph) in graphs.iter().enumerate() {
            if graph.get_nb_features() != nb_features {
                return Err(GnnError::DimensionMismatch {
                    expected: nb_features,
                    got: graph.get_nb_features(),
                });
            }
            // iter() walks in logical (row major) order whatever the memory layout
            features.extend(graph.get_features().iter());
            edges.extend(graph.get_edges().iter().map(|(i, j)| (i + offset, j + offset)));
            assignment.extend(std::iter::repeat(rank as u32).take(graph.get_nb_nodes()));
            labels_host.push(graph.get_label() as u32);
            offset += graph.get_nb_nodes();
        }
        log::trace!("Batch::from_graphs nb graphs : {}, nb nodes : {}, nb edges : {}", graphs.len(), nb_nodes, nb_edges);
        //
        let x = Tensor::from_vec(features, (nb_nodes, nb_features), device)?.to_dtype(DType::F32)?;
        let edges = EdgeIndex::new(&edges, nb_nodes, device)?;
        let assignment = GraphAssignment::new(assignment, graphs.len(), device)?;
        let labels = Tensor::from_vec(labels_host.clone(), labels_host.len(), device)?;
        Ok(Batch {
            x,
            edges,
            assignment,
            labels,
            labels_host,
        })
    } // end of from_graphs

    pub fn x(&self) -> &Tensor {
        &self.x
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn assignment(&self) -> &GraphAssignment {
        &self.assignment
    }

    pub fn labels(&self) -> &Tensor {
        &self.labels
    }

    pub fn get_labels_host(&self) -> &[u32] {
        &self.labels_host
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.assignment.get_nb_graphs()
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.assignment.get_nb_nodes()
    }
} // end of impl Batch

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn batch_offsets_edges() {
        log_init_test();
        let g1 = Graph::new(array![[1.0f32, 0.], [2., 0.]], vec![(0, 1)], 1).unwrap();
        let g2 = Graph::new(array![[3.0f32, 1.], [4., 1.], [5., 1.]], vec![(2, 0), (1, 2), (1, 2)], 0).unwrap();
        let batch = Batch::from_graphs(&[&g1, &g2], &Device::Cpu).unwrap();
        assert_eq!(batch.get_nb_graphs(), 2);
        assert_eq!(batch.get_nb_nodes(), 5);
        assert_eq!(batch.x().dims(), &[5, 2]);
        assert_eq!(batch.edges().get_src_host(), &[0, 4, 3, 3]);
        assert_eq!(batch.edges().get_dst_host(), &[1, 2, 4, 4]);
        assert_eq!(batch.assignment().get_host(), &[0, 0, 1, 1, 1]);
        assert_eq!(batch.get_labels_host(), &[1, 0]);
        assert_eq!(batch.edges().in_degrees(), vec![0, 1, 1, 0, 2]);
        assert_eq!(batch.assignment().graph_sizes(), vec![2, 3]);
        let x = batch.x().to_vec2::<f32>().unwrap();
        assert_eq!(x[2], vec![3.0, 1.0]);
    }

    #[test]
    fn batch_rejects_mixed_widths() {
        log_init_test();
        let g1 = Graph::new(array![[1.0f32, 0.]], vec![], 1).unwrap();
        let g2 = Graph::new(array![[1.0f32]], vec![], 1).unwrap();
        let res = Batch::from_graphs(&[&g1, &g2], &Device::Cpu);
        assert!(matches!(res, Err(GnnError::DimensionMismatch { expected: 2, got: 1 })));
        assert!(Batch::from_graphs(&[], &Device::Cpu).is_err());
    }

    #[test]
    fn self_loops_added_per_node() {
        log_init_test();
        let edges = EdgeIndex::new(&[(0, 1)], 3, &Device::Cpu).unwrap();
        let looped = edges.with_self_loops().unwrap();
        assert_eq!(looped.get_nb_edges(), 4);
        assert_eq!(looped.in_degrees(), vec![1, 2, 1]);
        assert!(EdgeIndex::new(&[], 2, &Device::Cpu).unwrap().is_empty());
    }
} // end of mod tests
