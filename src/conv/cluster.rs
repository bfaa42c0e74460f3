//! Cluster-GCN style layer.
//!
//! Same aggregation as [SageConv] with a mean reduction. The layer does not know how batches were formed,
//! cluster partitioning happens upstream, and the per mini-batch normalization statistics are held by the model.
//!
//! Chiang et al., "Cluster-GCN: An Efficient Algorithm for Training Deep and Large Graph Convolutional Networks", KDD 2019.

use candle_core::Tensor;
use candle_nn::VarBuilder;

use super::{Aggregation, MessagePassing, SageConv};
use crate::error::Result;
use crate::graph::EdgeIndex;

pub struct ClusterConv {
    inner: SageConv,
}

impl ClusterConv {
    pub fn new(in_channels: usize, out_channels: usize, vb: VarBuilder) -> Result<Self> {
        let inner = SageConv::new(in_channels, out_channels, Aggregation::Mean, vb)?;
        Ok(ClusterConv { inner })
    }
}

impl MessagePassing for ClusterConv {
    fn forward_t(&self, x: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Tensor> {
        self.inner.forward_t(x, edges, train)
    }

    fn in_channels(&self) -> usize {
        self.inner.in_channels()
    }

    fn out_channels(&self) -> usize {
        self.inner.out_channels()
    }
}
