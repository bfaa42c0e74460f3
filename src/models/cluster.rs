//! Cluster-GCN network, the GraphSage topology built on [ClusterConv] layers.
//! Meant to be fed with cluster partitioned batches, BatchNorm statistics are those of each mini-batch.

use candle_core::{Device, Tensor};

use super::stack::NormalizedStack;
use super::{check_features, GraphClassifier, ModelConfig, ModelKind, ModelState};
use crate::conv::{ClusterConv, MessagePassing};
use crate::error::{GnnError, Result};
use crate::graph::{EdgeIndex, GraphAssignment};
use crate::pool::Pooling;

const DROPOUT: f32 = 0.2;

pub struct ClusterGcn {
    state: ModelState,
    in_channels: usize,
    stack: NormalizedStack<ClusterConv>,
    last: ClusterConv,
    pooling: Pooling,
}

impl ClusterGcn {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let in_channels = config.get_in_channels()?;
        let out_channels = config.get_out_channels()?;
        let hidden = config.get_hidden_channels()?;
        let nb_layers = config.get_nb_layers();
        if nb_layers < 2 {
            return Err(GnnError::InvalidConfig(format!("ClusterGcn needs at least 2 layers, got {}", nb_layers)));
        }
        let state = ModelState::new(config);
        let vb = state.var_builder(device);
        let stack = NormalizedStack::new(in_channels, hidden, nb_layers - 1, DROPOUT, &vb, ClusterConv::new)?;
        let last = ClusterConv::new(hidden, out_channels, vb.pp(format!("convs.{}", nb_layers - 1)))?;
        Ok(ClusterGcn {
            state,
            in_channels,
            stack,
            last,
            pooling: config.get_pooling().unwrap_or(ModelKind::ClusterGcn.default_pooling()),
        })
    }
}

impl GraphClassifier for ClusterGcn {
    fn name(&self) -> &'static str {
        ModelKind::ClusterGcn.name()
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
}
