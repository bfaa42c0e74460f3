//! Training and evaluation of one model instance.
//!
//! Every function takes the model, the loader, the optimizer and the loss explicitly,
//! nothing is read from an enclosing scope. The mode of the model is switched here, before
//! fitting and before evaluating.

use candle_core::Tensor;
use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use serde::{Deserialize, Serialize};

use crate::error::{GnnError, Result};
use crate::graph::DataLoader;
use crate::models::GraphClassifier;

/// loss between (nb_graphs, nb_classes) logits and (nb_graphs) u32 labels
pub type LossFn = fn(&Tensor, &Tensor) -> candle_core::Result<Tensor>;

/// the loss used by the sweep
pub fn cross_entropy(logits: &Tensor, labels: &Tensor) -> candle_core::Result<Tensor> {
    candle_nn::loss::cross_entropy(logits, labels)
}

/// Adam with decoupled weight decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerParams {
    learning_rate: f64,
    weight_decay: f64,
}

impl OptimizerParams {
    pub fn new(learning_rate: f64, weight_decay: f64) -> Self {
        OptimizerParams {
            learning_rate,
            weight_decay,
        }
    }

    pub fn get_learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn get_weight_decay(&self) -> f64 {
        self.weight_decay
    }
} // end of impl OptimizerParams

impl Default for OptimizerParams {
    fn default() -> Self {
        OptimizerParams::new(0.01, 4e-5)
    }
}

/// a fresh optimizer over the parameters of model
pub fn build_optimizer<M: GraphClassifier + ?Sized>(model: &M, params: &OptimizerParams) -> Result<AdamW> {
    if !(params.learning_rate > 0.) || params.weight_decay < 0. {
        return Err(GnnError::InvalidConfig(format!(
            "learning rate must be positive and weight decay non negative, got {:?}",
            params
        )));
    }
    let adam_params = ParamsAdamW {
        lr: params.learning_rate,
        weight_decay: params.weight_decay,
        ..Default::default()
    };
    Ok(AdamW::new(model.parameters(), adam_params)?)
} // end of build_optimizer

/// One epoch over the batches of loader, in training mode.
///
/// Returns the loss averaged over graphs, each batch weighted by its number of graphs.
/// A non finite loss is reported but not handled.
pub fn fit<M: GraphClassifier + ?Sized>(
    model: &mut M,
    loader: &mut DataLoader,
    optimizer: &mut AdamW,
    loss_fn: LossFn,
) -> Result<f64> {
    model.train();
    let batches = loader.batches()?;
    let mut total_loss = 0f64;
    let mut nb_graphs = 0usize;
    for (rank, batch) in batches.iter().enumerate() {
        let logits = model.forward(batch.x(), batch.edges(), batch.assignment())?;
        let loss = loss_fn(&logits, batch.labels())?;
        optimizer.backward_step(&loss)?;
        let loss_value = loss.to_scalar::<f32>()? as f64;
        if !loss_value.is_finite() {
            log::warn!("{} : non finite loss {} at batch {}", model.name(), loss_value, rank);
        }
        log::debug!("{} batch {} nb graphs : {}, loss : {:.4e}", model.name(), rank, batch.get_nb_graphs(), loss_value);
        total_loss += loss_value * batch.get_nb_graphs() as f64;
        nb_graphs += batch.get_nb_graphs();
    }
    if nb_graphs == 0 {
        return Err(GnnError::EmptyDataset(String::from("fit got no graph")));
    }
    Ok(total_loss / nb_graphs as f64)
} // end of fit

/// Fraction of graphs of loader whose predicted class equals their label, in evaluation mode.
pub fn evaluate<M: GraphClassifier + ?Sized>(model: &mut M, loader: &mut DataLoader) -> Result<f64> {
    model.eval();
    let batches = loader.batches()?;
    let mut nb_correct = 0usize;
    let mut nb_graphs = 0usize;
    for batch in &batches {
        let logits = model.forward(batch.x(), batch.edges(), batch.assignment())?.detach();
        let predicted = predict(&logits)?;
        nb_correct += predicted
            .iter()
            .zip(batch.get_labels_host().iter())
            .filter(|(p, l)| p == l)
            .count();
        nb_graphs += batch.get_nb_graphs();
    }
    if nb_graphs == 0 {
        return Err(GnnError::EmptyDataset(String::from("evaluate got no graph")));
    }
    Ok(nb_correct as f64 / nb_graphs as f64)
} // end of evaluate

/// class of highest logit for each row, ties go to the first index
pub fn predict(logits: &Tensor) -> Result<Vec<u32>> {
    let rows = logits.to_dtype(candle_core::DType::F32)?.to_vec2::<f32>()?;
    let predicted = rows
        .iter()
        .map(|row| {
            let mut best = 0usize;
            for (k, v) in row.iter().enumerate() {
                if *v > row[best] {
                    best = k;
                }
            }
            best as u32
        })
        .collect();
    Ok(predicted)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::graph::synthetic::toy_dataset;
    use crate::models::{build_model, ModelConfig, ModelKind};
    use candle_core::Device;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn predict_takes_first_maximum() {
        log_init_test();
        let logits = Tensor::new(&[[0.5f32, 0.5], [0.1, 0.9], [2., -1.], [1., 1.]], &Device::Cpu).unwrap();
        assert_eq!(predict(&logits).unwrap(), vec![0, 1, 0, 0]);
    }

    #[test]
    fn accuracy_is_a_fraction_of_graphs() {
        log_init_test();
        let device = Device::Cpu;
        let dataset = toy_dataset(7, 3).unwrap();
        let mut loader = DataLoader::new(dataset.get_graphs().to_vec(), 3, false, 0, &device).unwrap();
        let config = ModelConfig::new(Some(1), 8, Some(2));
        let mut model = build_model(ModelKind::Gcn, &config, &device).unwrap();
        let accuracy = model.evaluate(&mut loader).unwrap();
        assert!(!model.is_training());
        assert!((0. ..=1.).contains(&accuracy));
        // accuracy is k / 7 exactly
        let k = (accuracy * 7.).round();
        assert!((accuracy - k / 7.).abs() < 1e-12);
    }

    #[test]
    fn fit_returns_finite_loss_and_sets_training_mode() {
        log_init_test();
        let device = Device::Cpu;
        let dataset = toy_dataset(8, 5).unwrap();
        let mut loader = DataLoader::new(dataset.get_graphs().to_vec(), 3, true, 1, &device).unwrap();
        let config = ModelConfig::new(Some(1), 8, Some(2));
        for kind in [ModelKind::GraphSage, ModelKind::Gin, ModelKind::Gat] {
            let mut model = build_model(kind, &config, &device).unwrap();
            let mut optimizer = build_optimizer(&*model, &OptimizerParams::default()).unwrap();
            model.eval();
            let loss = model.fit(&mut loader, &mut optimizer, cross_entropy).unwrap();
            assert!(model.is_training());
            assert!(loss.is_finite() && loss >= 0., "{} loss {}", kind, loss);
        }
    }

    #[test]
    fn fit_learns_separable_toy_data() {
        log_init_test();
        let device = Device::Cpu;
        let dataset = toy_dataset(6, 11).unwrap();
        let mut train_loader = DataLoader::new(dataset.get_graphs().to_vec(), 6, true, 2, &device).unwrap();
        let mut eval_loader = DataLoader::new(dataset.get_graphs().to_vec(), 6, false, 0, &device).unwrap();
        let config = ModelConfig::new(Some(1), 16, Some(2));
        let mut model = build_model(ModelKind::Gcn, &config, &device).unwrap();
        let mut optimizer = build_optimizer(&*model, &OptimizerParams::default()).unwrap();
        let first = model.fit(&mut train_loader, &mut optimizer, cross_entropy).unwrap();
        let mut last = first;
        for _ in 0..60 {
            last = model.fit(&mut train_loader, &mut optimizer, cross_entropy).unwrap();
        }
        assert!(last < first);
        assert_eq!(model.evaluate(&mut eval_loader).unwrap(), 1.);
    }

    #[test]
    fn feed_forward_learns_pooled_features() {
        log_init_test();
        let device = Device::Cpu;
        let dataset = toy_dataset(6, 11).unwrap();
        let mut train_loader = DataLoader::new(dataset.get_graphs().to_vec(), 6, true, 2, &device).unwrap();
        let mut eval_loader = DataLoader::new(dataset.get_graphs().to_vec(), 6, false, 0, &device).unwrap();
        let config = ModelConfig::new(Some(1), 16, Some(2));
        let mut model = build_model(ModelKind::Ffn, &config, &device).unwrap();
        let mut optimizer = build_optimizer(&*model, &OptimizerParams::default()).unwrap();
        let first = model.fit(&mut train_loader, &mut optimizer, cross_entropy).unwrap();
        let mut last = first;
        for _ in 0..300 {
            last = model.fit(&mut train_loader, &mut optimizer, cross_entropy).unwrap();
        }
        assert!(last < first);
        assert_eq!(model.evaluate(&mut eval_loader).unwrap(), 1.);
        // the embedding is the mean of the node features, one column
        assert_eq!(model.embeddings().unwrap().dims(), &[6, 1]);
    }

    #[test]
    fn optimizer_params_are_checked() {
        log_init_test();
        let config = ModelConfig::new(Some(1), 4, Some(2));
        let model = build_model(ModelKind::Gcn, &config, &Device::Cpu).unwrap();
        assert!(build_optimizer(&*model, &OptimizerParams::new(0., 0.)).is_err());
        assert!(build_optimizer(&*model, &OptimizerParams::new(0.01, -1.)).is_err());
    }
} // end of mod tests
