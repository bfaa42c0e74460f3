//! Message-passing layers.
//!
//! All layers follow the same contract, given node features (N x in) and the edge list of a batch,
//! they produce node features (N x out). Messages flow along edges, from source to target:
//!
//! ```text
//! h_i' = UPDATE(h_i, AGGREGATE({MESSAGE(h_j) : (j,i) in E}))
//! ```
//!
//! - [SageConv] : mean (or sum) aggregation, self and neighbour parts transformed separately.
//! - [GatConv] : attention weighted aggregation with several heads.
//! - [GinConv] : isomorphism style sum aggregation followed by a small MLP.
//! - [ClusterConv] : the mean aggregation layer used on cluster partitioned batches.
//!
//! A graph without edges is valid, the neighbour aggregate is then 0 for every node.

use candle_core::{DType, Tensor};

use crate::error::{GnnError, Result};
use crate::graph::EdgeIndex;

pub mod cluster;
pub mod gat;
pub mod gin;
pub mod sage;

pub use cluster::ClusterConv;
pub use gat::GatConv;
pub use gin::GinConv;
pub use sage::{Aggregation, SageConv};

/// The contract shared by message-passing layers.
pub trait MessagePassing {
    /// forward pass, train switches dropout and normalization to their stochastic form
    fn forward_t(&self, x: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Tensor>;

    /// evaluation mode forward pass
    fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        self.forward_t(x, edges, false)
    }

    fn in_channels(&self) -> usize;

    fn out_channels(&self) -> usize;
} // end of trait MessagePassing

/// checks x is (nb_nodes, expected) with nb_nodes the number of nodes edges refer to.
pub(crate) fn check_input(x: &Tensor, edges: &EdgeIndex, expected: usize) -> Result<()> {
    let (nb_nodes, width) = x.dims2()?;
    if width != expected {
        log::error!("layer expects {} input features, got {}", expected, width);
        return Err(GnnError::DimensionMismatch { expected, got: width });
    }
    if nb_nodes != edges.get_nb_nodes() {
        return Err(GnnError::DimensionMismatch {
            expected: edges.get_nb_nodes(),
            got: nb_nodes,
        });
    }
    Ok(())
}

/// sum of source features over the incoming edges of each node, parallel edges counted with multiplicity
pub(crate) fn neighbor_sum(x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
    if edges.is_empty() {
        return Ok(x.zeros_like()?);
    }
    let messages = x.index_select(edges.src(), 0)?;
    Ok(x.zeros_like()?.index_add(edges.dst(), &messages, 0)?)
}

/// mean of source features over the incoming edges, isolated nodes get 0
pub(crate) fn neighbor_mean(x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
    let sum = neighbor_sum(x, edges)?;
    let degrees: Vec<f32> = edges.in_degrees().iter().map(|d| (*d).max(1) as f32).collect();
    let degrees = Tensor::from_vec(degrees, (edges.get_nb_nodes(), 1), x.device())?.to_dtype(DType::F32)?;
    Ok(sum.broadcast_div(&degrees)?)
}

#[cfg(test)]
mod tests {

    use super::*;
    use candle_core::Device;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn aggregates_count_parallel_edges() {
        log_init_test();
        let device = Device::Cpu;
        let x = Tensor::new(&[[1.0f32], [2.0], [4.0]], &device).unwrap();
        let edges = EdgeIndex::new(&[(0, 2), (1, 2), (1, 2)], 3, &device).unwrap();
        let sum = neighbor_sum(&x, &edges).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(sum, vec![vec![0.], vec![0.], vec![5.]]);
        let mean = neighbor_mean(&x, &edges).unwrap().to_vec2::<f32>().unwrap();
        assert!((mean[2][0] - 5. / 3.).abs() < 1.0e-6);
        assert_eq!(mean[0][0], 0.);
    }

    #[test]
    fn aggregates_without_edges() {
        log_init_test();
        let device = Device::Cpu;
        let x = Tensor::new(&[[1.0f32, 3.0]], &device).unwrap();
        let edges = EdgeIndex::new(&[], 1, &device).unwrap();
        let mean = neighbor_mean(&x, &edges).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(mean, vec![vec![0., 0.]]);
    }
} // end of mod tests
