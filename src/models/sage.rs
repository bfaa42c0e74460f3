//! Deep mean aggregation network.
//!
//! nb_layers - 1 layers SageConv -> BatchNorm -> ReLU -> dropout(0.2), then a last SageConv to the
//! number of classes without normalization, then pooling. The pooled output is both the embedding and the logits.

use candle_core::{Device, Tensor};

use super::stack::NormalizedStack;
use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::conv::{Aggregation, MessagePassing, SageConv};
use crate::error::{GnnError, Result};
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

const DROPOUT: f32 = 0.2;

pub struct GraphSage {
    state: ModelState,
    in_channels: usize,
    stack: NormalizedStack<SageConv>,
    last: SageConv,
    pooling: Pooling,
} // end of GraphSage

impl GraphSage {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let nb_layers = config.get_nb_layers();
        if nb_layers < 2 {
            return Err(GnnError::InvalidConfig(format!("GraphSage needs at least 2 layers, got {}", nb_layers)));
        }
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let stack = NormalizedStack::new(in_channels, hidden, nb_layers - 1, DROPOUT, &vb, |i, o, vb| {
            SageConv::new(i, o, Aggregation::Mean, vb)
        })?;
        let last = SageConv::new(hidden, out_channels, Aggregation::Mean, vb.pp(format!("convs.{}", nb_layers - 1)))?;
        log::debug!("GraphSage in : {}, hidden : {}, out : {}, nb layers : {}", in_channels, hidden, out_channels, nb_layers);
        Ok(GraphSage {
            state,
            in_channels,
            stack,
            last,
            pooling: config.get_pooling().unwrap_or(ModelKind::GraphSage.default_pooling()),
        })
    } // end of new
} // end of impl GraphSage

impl GraphClassifier for GraphSage {
    fn name(&self) -> &'static str {
        ModelKind::GraphSage.name()
    }

    fn forward(&mut self, x: &Tensor, edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor> {
        check_features(x, self.in_channels)?;
        let h = self.stack.forward(x, edges, self.state.is_training())?;
        let h = self.last.forward_t(&h, edges, self.state.is_training())?;
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
} // end of impl GraphClassifier for GraphSage
