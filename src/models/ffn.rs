//! Feed forward baseline.
//!
//! The node features are pooled first (mean by default), edges are not used.
//! Then Linear(in, hidden) -> Sigmoid -> Linear(hidden, out). The embedding is the pooled input.

use candle_core::{Device, Tensor};
use candle_nn::{linear, ops, Linear, Module};

use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::error::Result;
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

pub struct Ffn {
    state: ModelState,
    in_channels: usize,
    fc1: Linear,
    fc2: Linear,
    pooling: Pooling,
}

impl Ffn {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let fc1 = linear(in_channels, hidden, vb.pp("fc1"))?;
        let fc2 = linear(hidden, out_channels, vb.pp("fc2"))?;
        log::debug!("Ffn in : {}, hidden : {}, out : {}", in_channels, hidden, out_channels);
        Ok(Ffn {
            state,
            in_channels,
            fc1,
            fc2,
            pooling: config.get_pooling().unwrap_or(ModelKind::Ffn.default_pooling()),
        })
    } // end of new
} // end of impl Ffn

impl GraphClassifier for Ffn {
    fn name(&self) -> &'static str {
        ModelKind::Ffn.name()
    }

    fn forward(&mut self, x: &Tensor, _edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor> {
        check_features(x, self.in_channels)?;
        let pooled = self.pooling.apply(x, assignment)?;
        self.state.set_embeddings(&pooled);
        let h = ops::sigmoid(&self.fc1.forward(&pooled)?)?;
        Ok(self.fc2.forward(&h)?)
    }

    fn get_state(&self) -> &ModelState {
        &self.state
    }

    fn get_state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }
} // end of impl GraphClassifier for Ffn
