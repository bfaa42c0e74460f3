//! Isomorphism network.
//!
//! 5 GinConv layers of width hidden, pooling (sum by default), then a two layer head
//! Linear -> ReLU -> dropout(0.5) -> Linear. There is no dropout between the message passing layers.

use candle_core::{Device, Tensor};
use candle_nn::{linear, Dropout, Linear, Module};

use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::conv::{GinConv, MessagePassing};
use crate::error::Result;
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

const NB_LAYERS: usize = 5;

const DROPOUT: f32 = 0.5;

pub struct Gin {
    state: ModelState,
    in_channels: usize,
    convs: Vec<GinConv>,
    lin1: Linear,
    lin2: Linear,
    dropout: Dropout,
    pooling: Pooling,
} // end of Gin

impl Gin {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let mut convs = Vec::<GinConv>::with_capacity(NB_LAYERS);
        for i in 0..NB_LAYERS {
            let layer_in = if i == 0 { in_channels } else { hidden };
            convs.push(GinConv::new(layer_in, hidden, vb.pp(format!("conv{}", i + 1)))?);
        }
        let lin1 = linear(hidden, hidden, vb.pp("lin1"))?;
        let lin2 = linear(hidden, out_channels, vb.pp("lin2"))?;
        Ok(Gin {
            state,
            in_channels,
            convs,
            lin1,
            lin2,
            dropout: Dropout::new(DROPOUT),
            pooling: config.get_pooling().unwrap_or(ModelKind::Gin.default_pooling()),
        })
    } // end of new
} // end of impl Gin

impl GraphClassifier for Gin {
    fn name(&self) -> &'static str {
        ModelKind::Gin.name()
    }

    fn forward(&mut self, x: &Tensor, edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor> {
        check_features(x, self.in_channels)?;
        let mut h = x.clone();
        for conv in &self.convs {
            h = conv.forward_t(&h, edges, self.state.is_training())?;
        }
        let pooled = self.pooling.apply(&h, assignment)?;
        self.state.set_embeddings(&pooled);
        //
        let h = self.lin1.forward(&pooled)?.relu()?;
        let h = self.dropout.forward(&h, self.state.is_training())?;
        Ok(self.lin2.forward(&h)?)
    }

    fn get_state(&self) -> &ModelState {
        &self.state
    }

    fn get_state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }
} // end of impl GraphClassifier for Gin
