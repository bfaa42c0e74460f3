//! Graph isomorphism layer.
//!
//! h_i' = MLP((1 + eps) h_i + sum_{(j,i) in E} h_j)
//!
//! with MLP : Linear -> BatchNorm -> ReLU -> Linear -> ReLU.
//! The sum keeps the multiplicity of neighbours (and of repeated edges) that a mean would normalize away.
//!
//! Xu et al., "How Powerful are Graph Neural Networks?", ICLR 2019.

use candle_core::Tensor;
use candle_nn::{batch_norm, linear, BatchNorm, BatchNormConfig, Linear, Module, ModuleT, VarBuilder};

use super::{check_input, neighbor_sum, MessagePassing};
use crate::error::Result;
use crate::graph::EdgeIndex;

pub struct GinConv {
    lin1: Linear,
    norm: BatchNorm,
    lin2: Linear,
    /// weight of the node own features is 1 + eps
    eps: f64,
    in_channels: usize,
    out_channels: usize,
} // end of GinConv

impl GinConv {
    pub fn new(in_channels: usize, out_channels: usize, vb: VarBuilder) -> Result<Self> {
        let lin1 = linear(in_channels, out_channels, vb.pp("nn.0"))?;
        let norm = batch_norm(out_channels, BatchNormConfig::default(), vb.pp("nn.1"))?;
        let lin2 = linear(out_channels, out_channels, vb.pp("nn.3"))?;
        Ok(GinConv {
            lin1,
            norm,
            lin2,
            eps: 0.,
            in_channels,
            out_channels,
        })
    }

    pub fn get_eps(&self) -> f64 {
        self.eps
    }
} // end of impl GinConv

impl MessagePassing for GinConv {
    fn forward_t(&self, x: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Tensor> {
        check_input(x, edges, self.in_channels)?;
        let combined = ((x * (1. + self.eps))? + neighbor_sum(x, edges)?)?;
        let h = self.lin1.forward(&combined)?;
        let h = self.norm.forward_t(&h, train)?.relu()?;
        Ok(self.lin2.forward(&h)?.relu()?)
    }

    fn in_channels(&self) -> usize {
        self.in_channels
    }

    fn out_channels(&self) -> usize {
        self.out_channels
    }
} // end of impl MessagePassing for GinConv

#[cfg(test)]
mod tests {

    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn gin_forward_shape() {
        log_init_test();
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let gin = GinConv::new(3, 8, vb).unwrap();
        let x = Tensor::randn(0f32, 1f32, (4, 3), &device).unwrap();
        let edges = EdgeIndex::new(&[(0, 1), (2, 3)], 4, &device).unwrap();
        assert_eq!(gin.forward_t(&x, &edges, true).unwrap().dims(), &[4, 8]);
        let out = gin.forward(&x, &edges).unwrap();
        assert_eq!(out.dims(), &[4, 8]);
        // output of a relu
        assert!(out.flatten_all().unwrap().to_vec1::<f32>().unwrap().iter().all(|v| *v >= 0.));
        // single node, no edge
        let x = Tensor::randn(0f32, 1f32, (1, 3), &device).unwrap();
        let edges = EdgeIndex::new(&[], 1, &device).unwrap();
        assert_eq!(gin.forward(&x, &edges).unwrap().dims(), &[1, 8]);
    }

    #[test]
    fn gin_distinguishes_multiplicity() {
        log_init_test();
        let device = Device::Cpu;
        // node 1 receives node 0 once or twice : sum aggregation differs, mean would not
        let x = Tensor::new(&[[1.0f32, 1.0], [0., 0.]], &device).unwrap();
        let once = EdgeIndex::new(&[(0, 1)], 2, &device).unwrap();
        let twice = EdgeIndex::new(&[(0, 1), (0, 1)], 2, &device).unwrap();
        let s1 = neighbor_sum(&x, &once).unwrap().to_vec2::<f32>().unwrap();
        let s2 = neighbor_sum(&x, &twice).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(s1[1], vec![1., 1.]);
        assert_eq!(s2[1], vec![2., 2.]);
    }
} // end of mod tests
