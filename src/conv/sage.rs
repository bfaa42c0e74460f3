//! Mean aggregation layer (GraphSAGE).
//!
//! h_i' = W_n AGG({h_j : (j,i) in E}) + b + W_r h_i
//!
//! with AGG the mean (default) or the sum of incoming neighbour features.
//!
//! Hamilton et al., "Inductive Representation Learning on Large Graphs", NeurIPS 2017.

use candle_core::Tensor;
use candle_nn::{linear, linear_no_bias, Linear, Module, VarBuilder};

use super::{check_input, neighbor_mean, neighbor_sum, MessagePassing};
use crate::error::Result;
use crate::graph::EdgeIndex;

/// neighbour reduction of the mean aggregation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    Sum,
}

pub struct SageConv {
    /// transforms the neighbour aggregate, carries the bias
    lin_neighbor: Linear,
    /// transforms the node own features
    lin_root: Linear,
    aggregation: Aggregation,
    in_channels: usize,
    out_channels: usize,
} // end of SageConv

impl SageConv {
    pub fn new(in_channels: usize, out_channels: usize, aggregation: Aggregation, vb: VarBuilder) -> Result<Self> {
        let lin_neighbor = linear(in_channels, out_channels, vb.pp("lin_l"))?;
        let lin_root = linear_no_bias(in_channels, out_channels, vb.pp("lin_r"))?;
        Ok(SageConv {
            lin_neighbor,
            lin_root,
            aggregation,
            in_channels,
            out_channels,
        })
    }

    pub fn get_aggregation(&self) -> Aggregation {
        self.aggregation
    }
} // end of impl SageConv

impl MessagePassing for SageConv {
    fn forward_t(&self, x: &Tensor, edges: &EdgeIndex, _train: bool) -> Result<Tensor> {
        check_input(x, edges, self.in_channels)?;
        let aggregate = match self.aggregation {
            Aggregation::Mean => neighbor_mean(x, edges)?,
            Aggregation::Sum => neighbor_sum(x, edges)?,
        };
        let h_neighbor = self.lin_neighbor.forward(&aggregate)?;
        let h_root = self.lin_root.forward(x)?;
        Ok((h_neighbor + h_root)?)
    }

    fn in_channels(&self) -> usize {
        self.in_channels
    }

    fn out_channels(&self) -> usize {
        self.out_channels
    }
} // end of impl MessagePassing for SageConv

// end of mod tests
