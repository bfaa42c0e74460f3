//! Shallow mean aggregation network with a linear head.
//!
//! 3 SageConv layers with ReLU, no normalization and no dropout, so training and evaluation
//! modes compute the same function. Pooling, then Linear(hidden, out).

use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module};

use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::conv::{Aggregation, MessagePassing, SageConv};
use crate::error::Result;
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

const NB_LAYERS: usize = 3;

pub struct Gcn {
    state: ModelState,
    in_channels: usize,
    convs: Vec<SageConv>,
    head: Linear,
    pooling: Pooling,
}

impl Gcn {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let mut convs = Vec::<SageConv>::with_capacity(NB_LAYERS);
        for i in 0..NB_LAYERS {
            let layer_in = if i == 0 { in_channels } else { hidden };
            convs.push(SageConv::new(layer_in, hidden, Aggregation::Mean, vb.pp(format!("conv{}", i + 1)))?);
        }
        let head = linear(hidden, out_channels, vb.pp("lin"))?;
        Ok(Gcn {
            state,
            in_channels,
            convs,
            head,
            pooling: config.get_pooling().unwrap_or(ModelKind::Gcn.default_pooling()),
        })
    }
}

impl GraphClassifier for Gcn {
    fn name(&self) -> &'static str {
        ModelKind::Gcn.name()
    }

    fn forward(&mut self, x: &Tensor, edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor> {
        check_features(x, self.in_channels)?;
        let mut h = x.clone();
        for conv in &self.convs {
            h = conv.forward_t(&h, edges, self.state.is_training())?.relu()?;
        }
        let pooled = self.pooling.apply(&h, assignment)?;
        self.state.set_embeddings(&pooled);
        Ok(self.head.forward(&pooled)?)
    }

    fn get_state(&self) -> &ModelState {
        &self.state
    }

    fn get_state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }
}
