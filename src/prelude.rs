//! To ease access to most frequently used items

pub use crate::error::{GnnError, Result};

pub use crate::graph::{Batch, DataLoader, EdgeIndex, Graph, GraphAssignment, GraphDataset};

pub use crate::conv::MessagePassing;
pub use crate::pool::Pooling;

pub use crate::models::{build_model, GraphClassifier, ModelConfig, ModelKind};
pub use crate::train::{build_optimizer, cross_entropy, evaluate, fit, OptimizerParams};

pub use crate::sweep::{run_sweep, ResultRecord, SweepOutcome, SweepParams};

pub use crate::device::select_device;
pub use crate::io::load_dataset;
