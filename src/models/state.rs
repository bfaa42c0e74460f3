//! What every classifier owns besides its layers : parameters, configuration, mode and
//! the embedding cache of the last forward pass.

use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};

use super::ModelConfig;

pub struct ModelState {
    varmap: VarMap,
    config: ModelConfig,
    training: bool,
    embeddings: Option<Tensor>,
} // end of ModelState

impl ModelState {
    /// a fresh parameter store, in training mode
    pub fn new(config: &ModelConfig) -> Self {
        ModelState {
            varmap: VarMap::new(),
            config: config.clone(),
            training: true,
            embeddings: None,
        }
    }

    /// builder registering f32 parameters in the store of this model
    pub fn var_builder(&self, device: &Device) -> VarBuilder<'static> {
        VarBuilder::from_varmap(&self.varmap, DType::F32, device)
    }

    pub fn get_config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    pub fn get_embeddings(&self) -> Option<&Tensor> {
        self.embeddings.as_ref()
    }

    /// keeps a copy of pooled detached from the autograd graph
    pub fn set_embeddings(&mut self, pooled: &Tensor) {
        self.embeddings = Some(pooled.detach());
    }

    pub fn parameters(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }
} // end of impl ModelState
