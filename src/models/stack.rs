//! A stack of message passing layers, each followed by BatchNorm, ReLU and dropout.
//! Shared by the deep mean aggregation architectures.

use candle_core::Tensor;
use candle_nn::{batch_norm, BatchNorm, BatchNormConfig, Dropout, ModuleT, VarBuilder};

use crate::conv::MessagePassing;
use crate::error::Result;
use crate::graph::EdgeIndex;

pub(crate) struct NormalizedStack<C: MessagePassing> {
    convs: Vec<C>,
    norms: Vec<BatchNorm>,
    dropout: Dropout,
} // end of NormalizedStack

impl<C: MessagePassing> NormalizedStack<C> {
    /// nb_layers layers, the first maps in_channels to hidden_channels, the others hidden to hidden.
    /// make_conv(in, out, vb) builds one layer. Parameters are named convs.i and batch_norms.i
    pub(crate) fn new<F>(
        in_channels: usize,
        hidden_channels: usize,
        nb_layers: usize,
        dropout: f32,
        vb: &VarBuilder,
        make_conv: F,
    ) -> Result<Self>
    where
        F: Fn(usize, usize, VarBuilder) -> Result<C>,
    {
        let mut convs = Vec::<C>::with_capacity(nb_layers);
        let mut norms = Vec::<BatchNorm>::with_capacity(nb_layers);
        for i in 0..nb_layers {
            let layer_in = if i == 0 { in_channels } else { hidden_channels };
            convs.push(make_conv(layer_in, hidden_channels, vb.pp(format!("convs.{}", i)))?);
            norms.push(batch_norm(
                hidden_channels,
                BatchNormConfig::default(),
                vb.pp(format!("batch_norms.{}", i)),
            )?);
        }
        Ok(NormalizedStack {
            convs,
            norms,
            dropout: Dropout::new(dropout),
        })
    } // end of new

    pub(crate) fn get_nb_layers(&self) -> usize {
        self.convs.len()
    }

    /// output of every layer, after dropout
    pub(crate) fn forward_layers(&self, x: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Vec<Tensor>> {
        let mut outputs = Vec::<Tensor>::with_capacity(self.convs.len());
        let mut h = x.clone();
        for (conv, norm) in self.convs.iter().zip(self.norms.iter()) {
            h = conv.forward_t(&h, edges, train)?;
            h = norm.forward_t(&h, train)?;
            h = h.relu()?;
            h = self.dropout.forward(&h, train)?;
            outputs.push(h.clone());
        }
        Ok(outputs)
    }

    /// output of the last layer, x itself for an empty stack
    pub(crate) fn forward(&self, x: &Tensor, edges: &EdgeIndex, train: bool) -> Result<Tensor> {
        let outputs = self.forward_layers(x, edges, train)?;
        Ok(outputs.last().cloned().unwrap_or_else(|| x.clone()))
    }
} // end of impl NormalizedStack
