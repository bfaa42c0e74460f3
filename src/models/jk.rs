//! Jumping knowledge mean aggregation network.
//!
//! nb_layers - 1 normalized SageConv layers, the outputs of all of them are concatenated
//! (nb_nodes, (nb_layers - 1) * hidden) before pooling, then a linear head.
//!
//! Xu et al., "Representation Learning on Graphs with Jumping Knowledge Networks", ICML 2018.

use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module};

use super::stack::NormalizedStack;
use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::conv::{Aggregation, SageConv};
use crate::error::{GnnError, Result};
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

const DROPOUT: f32 = 0.2;

pub struct JkSage {
    state: ModelState,
    in_channels: usize,
    stack: NormalizedStack<SageConv>,
    head: Linear,
    pooling: Pooling,
}

impl JkSage {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let nb_layers = config.get_nb_layers();
        if nb_layers < 2 {
            return Err(GnnError::InvalidConfig(format!("JkSage needs at least 2 layers, got {}", nb_layers)));
        }
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let stack = NormalizedStack::new(in_channels, hidden, nb_layers - 1, DROPOUT, &vb, |i, o, vb| {
            SageConv::new(i, o, Aggregation::Mean, vb)
        })?;
        let head = linear(stack.get_nb_layers() * hidden, out_channels, vb.pp("lin"))?;
        Ok(JkSage {
            state,
            in_channels,
            stack,
            head,
            pooling: config.get_pooling().unwrap_or(ModelKind::JkSage.default_pooling()),
        })
    }
}

impl GraphClassifier for JkSage {
    fn name(&self) -> &'static str {
        ModelKind::JkSage.name()
    }

    fn forward(&mut self, x: &Tensor, edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor> {
        check_features(x, self.in_channels)?;
        let outputs = self.stack.forward_layers(x, edges, self.state.is_training())?;
        let h = Tensor::cat(&outputs, 1)?;
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
