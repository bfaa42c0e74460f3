//! Graph classifiers.
//!
//! Every architecture is a [GraphClassifier] : a forward pass from a batch (node features, edges,
//! node to graph assignment) to one logit row per graph, an explicit training/evaluation mode and the
//! graph embedding computed by the last forward pass (after pooling, before any classification head).
//!
//! The sweep harness only manipulates `Box<dyn GraphClassifier>` obtained through [build_model].
//!
//! | kind | layers | head |
//! |------|--------|------|
//! | [ModelKind::GraphSage] | nb_layers mean aggregation layers, BatchNorm/ReLU/dropout(0.2) between | none |
//! | [ModelKind::Gat] | 2 attention layers, heads = hidden then 1, dropout(0.6) | none |
//! | [ModelKind::Gin] | 5 isomorphism layers | Linear/ReLU/dropout(0.5)/Linear |
//! | [ModelKind::ClusterGcn] | as GraphSage with cluster layers | none |
//! | [ModelKind::Gcn] | 3 mean aggregation layers with ReLU | Linear |
//! | [ModelKind::JkSage] | nb_layers - 1 normalized layers, concatenated | Linear |
//! | [ModelKind::Ffn] | none, pooling of the raw node features | Linear/Sigmoid/Linear |

use std::fmt;
use std::str::FromStr;

use candle_core::{Device, Tensor, Var};
use candle_nn::AdamW;

use crate::error::{GnnError, Result};
use crate::graph::{DataLoader, EdgeIndex, GraphAssignment};
use crate::pool::Pooling;
use crate::train::{self, LossFn};

pub mod cluster;
pub mod ffn;
pub mod gat;
pub mod gcn;
pub mod gin;
pub mod jk;
pub mod sage;
pub mod stack;
pub mod state;

pub use cluster::ClusterGcn;
pub use ffn::Ffn;
pub use gat::Gat;
pub use gcn::Gcn;
pub use gin::Gin;
pub use jk::JkSage;
pub use sage::GraphSage;
pub use state::ModelState;

/// The capability the training loop and the sweep harness depend on.
pub trait GraphClassifier {
    /// architecture name, as used in the result record
    fn name(&self) -> &'static str;

    /// returns (nb_graphs, out_channels) logits and refreshes [GraphClassifier::embeddings]
    fn forward(&mut self, x: &Tensor, edges: &EdgeIndex, assignment: &GraphAssignment) -> Result<Tensor>;

    /// parameters, configuration, mode and embedding cache of the model
    fn get_state(&self) -> &ModelState;

    fn get_state_mut(&mut self) -> &mut ModelState;

    fn set_training(&mut self, training: bool) {
        self.get_state_mut().set_training(training)
    }

    fn is_training(&self) -> bool {
        self.get_state().is_training()
    }

    /// switch to training mode : dropout active, normalization on batch statistics
    fn train(&mut self) {
        self.set_training(true)
    }

    /// switch to evaluation mode : no dropout, normalization on running statistics
    fn eval(&mut self) {
        self.set_training(false)
    }

    /// graph embedding of the last forward pass, detached from the autograd graph
    fn embeddings(&self) -> Option<&Tensor> {
        self.get_state().get_embeddings()
    }

    /// the learnable tensors owned by the model
    fn parameters(&self) -> Vec<Var> {
        self.get_state().parameters()
    }

    fn get_config(&self) -> &ModelConfig {
        self.get_state().get_config()
    }

    /// one training epoch, returns the loss averaged over graphs
    fn fit(&mut self, loader: &mut DataLoader, optimizer: &mut AdamW, loss_fn: LossFn) -> Result<f64> {
        train::fit(self, loader, optimizer, loss_fn)
    }

    /// fraction of graphs of the loader correctly classified
    fn evaluate(&mut self, loader: &mut DataLoader) -> Result<f64> {
        train::evaluate(self, loader)
    }
} // end of trait GraphClassifier

/// the architectures that can be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// deep mean aggregation network
    GraphSage,
    /// attention network
    Gat,
    /// isomorphism network
    Gin,
    /// cluster-gcn, same topology as GraphSage
    ClusterGcn,
    /// shallow mean aggregation network with a linear head
    Gcn,
    /// jumping knowledge mean aggregation network
    JkSage,
    /// feed forward baseline on pooled node features, ignores edges
    Ffn,
}

impl ModelKind {
    /// the architectures swept by default
    pub fn sweep_defaults() -> Vec<ModelKind> {
        vec![ModelKind::GraphSage, ModelKind::Gat, ModelKind::Gin, ModelKind::ClusterGcn]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::GraphSage => "graphsage",
            ModelKind::Gat => "gat",
            ModelKind::Gin => "gin",
            ModelKind::ClusterGcn => "cluster_gcn",
            ModelKind::Gcn => "gcn",
            ModelKind::JkSage => "jk_sage",
            ModelKind::Ffn => "ffn",
        }
    }

    /// pooling used when the configuration does not give one
    pub fn default_pooling(&self) -> Pooling {
        match self {
            ModelKind::Gin => Pooling::Sum,
            _ => Pooling::Mean,
        }
    }
} // end of impl ModelKind

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelKind {
    type Err = GnnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "graphsage" | "sage" => Ok(ModelKind::GraphSage),
            "gat" => Ok(ModelKind::Gat),
            "gin" => Ok(ModelKind::Gin),
            "cluster_gcn" | "clustergcn" => Ok(ModelKind::ClusterGcn),
            "gcn" => Ok(ModelKind::Gcn),
            "jk_sage" | "jksage" => Ok(ModelKind::JkSage),
            "ffn" | "mlp" => Ok(ModelKind::Ffn),
            other => Err(GnnError::InvalidConfig(format!("unknown architecture {:?}", other))),
        }
    }
}

/// Widths and structure of a model.
///
/// in_channels and out_channels have no default, building a model without them is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// node feature width
    in_channels: Option<usize>,
    hidden_channels: usize,
    /// number of classes
    out_channels: Option<usize>,
    /// None means the architecture default
    pooling: Option<Pooling>,
    /// number of message passing layers of the deep architectures
    nb_layers: usize,
} // end of ModelConfig

impl ModelConfig {
    pub fn new(in_channels: Option<usize>, hidden_channels: usize, out_channels: Option<usize>) -> Self {
        ModelConfig {
            in_channels,
            hidden_channels,
            out_channels,
            pooling: None,
            nb_layers: 6,
        }
    }

    pub fn with_pooling(mut self, pooling: Pooling) -> Self {
        self.pooling = Some(pooling);
        self
    }

    pub fn with_nb_layers(mut self, nb_layers: usize) -> Self {
        self.nb_layers = nb_layers;
        self
    }

    pub fn get_in_channels(&self) -> Result<usize> {
        match self.in_channels {
            Some(width) if width > 0 => Ok(width),
            _ => Err(GnnError::InvalidConfig(String::from("input feature width not given"))),
        }
    }

    pub fn get_out_channels(&self) -> Result<usize> {
        match self.out_channels {
            Some(width) if width > 0 => Ok(width),
            _ => Err(GnnError::InvalidConfig(String::from("output width (number of classes) not given"))),
        }
    }

    pub fn get_hidden_channels(&self) -> Result<usize> {
        if self.hidden_channels == 0 {
            return Err(GnnError::InvalidConfig(String::from("hidden width must be positive")));
        }
        Ok(self.hidden_channels)
    }

    pub fn get_pooling(&self) -> Option<Pooling> {
        self.pooling
    }

    pub fn get_nb_layers(&self) -> usize {
        self.nb_layers
    }
} // end of impl ModelConfig

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::new(None, 32, None)
    }
}

/// instantiates a fresh model, with its own parameters, on device
pub fn build_model(kind: ModelKind, config: &ModelConfig, device: &Device) -> Result<Box<dyn GraphClassifier>> {
    let model: Box<dyn GraphClassifier> = match kind {
        ModelKind::GraphSage => Box::new(GraphSage::new(config, device)?),
        ModelKind::Gat => Box::new(Gat::new(config, device)?),
        ModelKind::Gin => Box::new(Gin::new(config, device)?),
        ModelKind::ClusterGcn => Box::new(ClusterGcn::new(config, device)?),
        ModelKind::Gcn => Box::new(Gcn::new(config, device)?),
        ModelKind::JkSage => Box::new(JkSage::new(config, device)?),
        ModelKind::Ffn => Box::new(Ffn::new(config, device)?),
    };
    log::info!("built model {} with {} parameter tensors", model.name(), model.parameters().len());
    Ok(model)
} // end of build_model

/// checks the node features width before the first layer
pub(crate) fn check_features(x: &Tensor, expected: usize) -> Result<()> {
    let width = x.dim(1)?;
    if width != expected {
        log::error!("model expects {} node features, got {}", expected, width);
        return Err(GnnError::DimensionMismatch { expected, got: width });
    }
    Ok(())
}

// end of mod tests
