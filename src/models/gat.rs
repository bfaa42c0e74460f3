//! Attention network.
//!
//! dropout(0.6) -> GatConv(in, hidden, heads = hidden, concat) -> ELU -> dropout(0.6)
//! -> GatConv(hidden * hidden, out, 1 head, averaged) -> pooling.
//! Attention coefficients also go through dropout(0.6) in training mode.

use candle_core::{Device, Tensor};
use candle_nn::{Dropout};

use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::conv::{GatConv, MessagePassing};
use crate::error::Result;
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

const DROPOUT: f32 = 0.6;

pub struct Gat {
    state: ModelState,
    in_channels: usize,
    conv1: GatConv,
    conv2: GatConv,
    dropout: Dropout,
    pooling: Pooling,
} // end of Gat

impl Gat {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let conv1 = GatConv::new(in_channels, hidden, hidden, true, DROPOUT, vb.pp("conv1"))?;
        let conv2 = GatConv::new(conv1.out_channels(), out_channels, 1, false, DROPOUT, vb.pp("conv2"))?;
        log::debug!("Gat in : {}, heads : {}, hidden : {}, out : {}", in_channels, hidden, hidden, out_channels);
        Ok(Gat {
            state,
            in_channels,
            conv1,
            conv2,
            dropout: Dropout::new(DROPOUT),
            pooling: config.get_pooling().unwrap_or(ModelKind::Gat.default_pooling()),
        })
    } // end of new
} // end of impl Gat

impl GraphClassifier for Gat {
    fn name(&self) -> &'static str {
        ModelKind::Gat.name()
    }

    fn forward(&mut self, x: &Tensor, edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor> {
        check_features(x, self.in_channels)?;
        let h = self.dropout.forward(x, self.state.is_training())?;
        let h = self.conv1.forward_t(&h, edges, self.state.is_training())?.elu(1.)?;
        let h = self.dropout.forward(&h, self.state.is_training())?;
        let h = self.conv2.forward_t(&h, edges, self.state.is_training())?;
        let pooled = self.pooling.apply(&h, assignment)?;
        self.state.set_embeddings(&pooled);
        Ok(pooled)
    }

    fn get_state(&self) -> &ModelState {
        &self.state
    }

    fn get_state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }
} // end of impl GraphClassifier for Gat
