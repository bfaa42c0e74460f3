//! Graph attention layer.
//!
//! For each edge (j,i) and each head k :
//!
//! ```text
//! e_ji = LeakyReLU(a_src . W h_j + a_dst . W h_i)
//! alpha_ji = softmax over the incoming edges of i of e_ji
//! h_i' = sum_j alpha_ji W h_j
//! ```
//!
//! Heads are concatenated or averaged. A self loop is added to every node by default so each node
//! attends to itself, a node with no incoming edge at all gets only the bias.
//!
//! Velickovic et al., "Graph Attention Networks", ICLR 2018.

use candle_core::{DType, Tensor, D};
use candle_nn::{linear_no_bias, ops, Init, Linear, Module, VarBuilder};

use super::{check_input, MessagePassing};
use crate::error::{GnnError, Result};
use crate::graph::EdgeIndex;

pub struct GatConv {
    linear: Linear,
    /// (1, heads, out_per_head)
    att_src: Tensor,
    /// (1, heads, out_per_head)
    att_dst: Tensor,
    bias: Tensor,
    heads: usize,
    out_per_head: usize,
    concat: bool,
    negative_slope: f64,
    /// dropout probability on attention coefficients
    dropout: f32,
    add_self_loops: bool,
    in_channels: usize,
} // end of GatConv

impl GatConv {
    /// - out_per_head : width of each head
    /// - concat : heads are concatenated (out = heads * out_per_head) or averaged (out = out_per_head)
    pub fn new(
        in_channels: usize,
        out_per_head: usize,
        heads: usize,
        concat: bool,
        dropout: f32,
        vb: VarBuilder,
    ) -> Result<Self> {
        if heads == 0 {
            return Err(GnnError::InvalidConfig(String::from("GatConv needs at least one head")));
        }
        let linear = linear_no_bias(in_channels, heads * out_per_head, vb.pp("lin"))?;
        let bound = (6. / (1 + out_per_head) as f64).sqrt();
        let att_src = vb.get_with_hints((1, heads, out_per_head), "att_src", Init::Uniform { lo: -bound, up: bound })?;
        let att_dst = vb.get_with_hints((1, heads, out_per_head), "att_dst", Init::Uniform { lo: -bound, up: bound })?;
        let width = if concat { heads * out_per_head } else { out_per_head };
        let bias = vb.get_with_hints(width, "bias", Init::Const(0.))?;
        Ok(GatConv {
            linear,
            att_src,
            att_dst,
            bias,
            heads,
            out_per_head,
            concat,
            negative_slope: 0.2,
            dropout,
            add_self_loops: true,
            in_channels,
        })
    } // end of new

    /// disables the self loops added at each forward
    pub fn without_self_loops(mut self) -> Self {
        self.add_self_loops = false;
        self
    }

    pub fn get_heads(&self) -> usize {
        self.heads
    }

    fn leaky_relu(&self, x: &Tensor) -> Result<Tensor> {
        let negative = (x.neg()?.relu()? * self.negative_slope)?;
        Ok((x.relu()? - negative)?)
    }

    /// normalized attention (nb_edges, heads) of each edge over the incoming edges of its target
    fn attention(&self, scores: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Tensor> {
        let nb_nodes = edges.get_nb_nodes();
        // shift by the max score of each target, softmax is invariant to it
        let host = scores.to_vec2::<f32>()?;
        let mut max = vec![f32::NEG_INFINITY; nb_nodes * self.heads];
        for (edge, &target) in edges.get_dst_host().iter().enumerate() {
            for k in 0..self.heads {
                let slot = &mut max[target as usize * self.heads + k];
                *slot = slot.max(host[edge][k]);
            }
        }
        for value in max.iter_mut() {
            if !value.is_finite() {
                *value = 0.;
            }
        }
        let max = Tensor::from_vec(max, (nb_nodes, self.heads), scores.device())?;
        let shifted = scores.broadcast_sub(&max.index_select(edges.dst(), 0)?)?;
        let exp = shifted.exp()?;
        let denominator = Tensor::zeros((nb_nodes, self.heads), DType::F32, scores.device())?.index_add(edges.dst(), &exp, 0)?;
        let alpha = exp.broadcast_div(&denominator.index_select(edges.dst(), 0)?)?;
        if train && self.dropout > 0. {
            Ok(ops::dropout(&alpha, self.dropout)?)
        } else {
            Ok(alpha)
        }
    } // end of attention
} // end of impl GatConv

impl MessagePassing for GatConv {
    fn forward_t(&self, x: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Tensor> {
        check_input(x, edges, self.in_channels)?;
        let nb_nodes = x.dim(0)?;
        // (N, heads, out)
        let h = self.linear.forward(x)?.reshape((nb_nodes, self.heads, self.out_per_head))?;
        let looped;
        let edges = if self.add_self_loops {
            looped = edges.with_self_loops()?;
            &looped
        } else {
            edges
        };
        //
        let out = if edges.is_empty() {
            h.zeros_like()?
        } else {
            // (N, heads)
            let alpha_src = h.broadcast_mul(&self.att_src)?.sum(D::Minus1)?;
            let alpha_dst = h.broadcast_mul(&self.att_dst)?.sum(D::Minus1)?;
            let scores = (alpha_src.index_select(edges.src(), 0)? + alpha_dst.index_select(edges.dst(), 0)?)?;
            let scores = self.leaky_relu(&scores)?;
            let alpha = self.attention(&scores, edges, train)?;
            // (E, heads, out) messages weighted by their attention
            let messages = h.index_select(edges.src(), 0)?.broadcast_mul(&alpha.unsqueeze(2)?)?;
            h.zeros_like()?.index_add(edges.dst(), &messages, 0)?
        };
        let out = if self.concat {
            out.reshape((nb_nodes, self.heads * self.out_per_head))?
        } else {
            out.mean(1)?
        };
        Ok(out.broadcast_add(&self.bias)?)
    } // end of forward_t

    fn in_channels(&self) -> usize {
        self.in_channels
    }

    fn out_channels(&self) -> usize {
        if self.concat {
            self.heads * self.out_per_head
        } else {
            self.out_per_head
        }
    }
} // end of impl MessagePassing for GatConv

#[cfg(test)]
mod tests {

    use super::*;
    use candle_core::Device;
    use candle_nn::VarMap;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn gat_forward_shape_concat_and_mean() {
        log_init_test();
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let conv1 = GatConv::new(6, 4, 3, true, 0.6, vb.pp("conv1")).unwrap();
        let conv2 = GatConv::new(12, 2, 1, false, 0.6, vb.pp("conv2")).unwrap();
        assert_eq!(conv1.out_channels(), 12);
        let x = Tensor::randn(0f32, 1f32, (5, 6), &device).unwrap();
        let edges = EdgeIndex::new(&[(0, 1), (1, 2), (1, 2), (3, 4)], 5, &device).unwrap();
        let h = conv1.forward_t(&x, &edges, true).unwrap();
        assert_eq!(h.dims(), &[5, 12]);
        let out = conv2.forward(&h, &edges).unwrap();
        assert_eq!(out.dims(), &[5, 2]);
    }

    #[test]
    fn gat_without_edges() {
        log_init_test();
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let x = Tensor::randn(0f32, 1f32, (1, 3), &device).unwrap();
        let edges = EdgeIndex::new(&[], 1, &device).unwrap();
        let conv = GatConv::new(3, 2, 2, true, 0., vb.pp("a")).unwrap();
        assert_eq!(conv.forward(&x, &edges).unwrap().dims(), &[1, 4]);
        let conv = GatConv::new(3, 2, 2, false, 0., vb.pp("b")).unwrap().without_self_loops();
        let out = conv.forward(&x, &edges).unwrap().to_vec2::<f32>().unwrap();
        // no message at all, only the (zero initialized) bias
        assert_eq!(out, vec![vec![0., 0.]]);
    }

    #[test]
    fn attention_sums_to_one_per_target() {
        log_init_test();
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let conv = GatConv::new(2, 2, 2, true, 0.6, vb).unwrap();
        let edges = EdgeIndex::new(&[(0, 2), (1, 2), (1, 2), (2, 0)], 3, &device).unwrap();
        let scores = Tensor::new(&[[1.0f32, -3.], [0.5, 2.], [0.5, 2.], [40., 0.]], &device).unwrap();
        let alpha = conv.attention(&scores, &edges, false).unwrap().to_vec2::<f32>().unwrap();
        for k in 0..2 {
            let to_two = alpha[0][k] + alpha[1][k] + alpha[2][k];
            assert!((to_two - 1.).abs() < 1.0e-5);
            assert!((alpha[3][k] - 1.).abs() < 1.0e-5);
        }
        // repeated edges get the same weight
        assert_eq!(alpha[1], alpha[2]);
    }
} // end of mod tests
