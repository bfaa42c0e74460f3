//! Grid search over architectures, poolings and hidden sizes.
//!
//! Combinations run strictly in sequence, each with a fresh model and a fresh optimizer.
//! Each epoch is a fit on the training split followed by an evaluation of both splits.
//! Once a combination is complete its accuracy statistics go to the [ResultRecord], which is
//! persisted immediately. An interruption loses at most the combination in progress, a combination
//! is never recorded partially.

use std::time::SystemTime;

use candle_core::Device;
use cpu_time::ProcessTime;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{GnnError, Result};
use crate::graph::{DataLoader, Graph, GraphDataset};
use crate::models::{build_model, ModelConfig, ModelKind};
use crate::pool::Pooling;
use crate::train::{build_optimizer, cross_entropy, OptimizerParams};

pub mod params;
pub mod record;
pub mod stats;

pub use params::SweepParams;
pub use record::ResultRecord;
pub use stats::{mean_std, AccuracyStats, SplitStats};

/// what one combination went through, epoch by epoch
#[derive(Debug, Clone, Default)]
pub struct EpochHistory {
    pub losses: Vec<f64>,
    pub train_accuracies: Vec<f64>,
    pub test_accuracies: Vec<f64>,
}

impl EpochHistory {
    pub fn get_nb_epochs(&self) -> usize {
        self.losses.len()
    }

    /// mean and std of the train and test accuracy sequences
    pub fn stats(&self) -> Result<SplitStats> {
        Ok(SplitStats {
            train: mean_std(&self.train_accuracies)?,
            test: mean_std(&self.test_accuracies)?,
        })
    }
} // end of impl EpochHistory

/// a combination run during this sweep
#[derive(Debug, Clone)]
pub struct CombinationRun {
    pub kind: ModelKind,
    pub pooling: Pooling,
    pub hidden: usize,
    pub history: EpochHistory,
}

/// The record as persisted at the end of the sweep, and the combinations run by this call
/// (those skipped on resume are not in runs).
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub record: ResultRecord,
    pub runs: Vec<CombinationRun>,
}

/// Trains and evaluates one combination for nb_epochs epochs.
///
/// Console gets a header line and one line per epoch.
#[allow(clippy::too_many_arguments)]
pub fn run_combination(
    kind: ModelKind,
    config: &ModelConfig,
    train_graphs: &[Graph],
    test_graphs: &[Graph],
    nb_epochs: usize,
    batch_size: usize,
    optimizer_params: &OptimizerParams,
    seed: u64,
    device: &Device,
) -> Result<EpochHistory> {
    let mut model = build_model(kind, config, device)?;
    let mut optimizer = build_optimizer(&*model, optimizer_params)?;
    let mut train_loader = DataLoader::new(train_graphs.to_vec(), batch_size, true, seed, device)?;
    let mut train_eval_loader = DataLoader::new(train_graphs.to_vec(), batch_size, false, seed, device)?;
    let mut test_loader = DataLoader::new(test_graphs.to_vec(), batch_size, false, seed, device)?;
    //
    println!(
        "\n model : {}, pooling : {}, hidden : {}",
        model.name(),
        config.get_pooling().unwrap_or(kind.default_pooling()),
        config.get_hidden_channels()?
    );
    let mut history = EpochHistory::default();
    for epoch in 1..=nb_epochs {
        let loss = model.fit(&mut train_loader, &mut optimizer, cross_entropy)?;
        let train_acc = model.evaluate(&mut train_eval_loader)?;
        let test_acc = model.evaluate(&mut test_loader)?;
        println!(
            "Epoch: {:03}, Loss: {:.4}, Train Acc: {:.4}, Test Acc: {:.4}",
            epoch, loss, train_acc, test_acc
        );
        history.losses.push(loss);
        history.train_accuracies.push(train_acc);
        history.test_accuracies.push(test_acc);
    }
    Ok(history)
} // end of run_combination

/// Runs every combination of params over dataset.
///
/// The dataset is shuffled once (seeded by params) then split in a contiguous train prefix and test suffix.
/// With resume on, the existing result file is reloaded and the combinations it holds are skipped.
pub fn run_sweep(dataset: &GraphDataset, params: &SweepParams, device: &Device) -> Result<SweepOutcome> {
    params.check()?;
    let mut shuffled = dataset.clone();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.get_seed());
    shuffled.shuffle(&mut rng);
    let (train_graphs, test_graphs) = shuffled.split(params.get_train_fraction())?;
    log::info!(
        "sweep on {} graphs, train : {}, test : {}, nb features : {}, nb classes : {}",
        dataset.len(),
        train_graphs.len(),
        test_graphs.len(),
        dataset.get_num_features(),
        dataset.get_num_classes()
    );
    //
    let result_path = params.get_result_path();
    let mut record = if params.get_resume() && result_path.exists() {
        ResultRecord::load(result_path)?
    } else {
        ResultRecord::new()
    };
    let mut runs = Vec::<CombinationRun>::new();
    let grid = params.combinations();
    for (rank, (kind, pooling, hidden)) in grid.iter().enumerate() {
        if record.contains(*kind, *pooling, *hidden) {
            log::info!("combination {} {} {} already recorded, skipped", kind, pooling, hidden);
            continue;
        }
        log::info!("combination {}/{} : {} {} {}", rank + 1, grid.len(), kind, pooling, hidden);
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        //
        let config = ModelConfig::new(Some(dataset.get_num_features()), *hidden, Some(dataset.get_num_classes()))
            .with_pooling(*pooling);
        let history = run_combination(
            *kind,
            &config,
            &train_graphs,
            &test_graphs,
            params.get_nb_epochs(),
            params.get_batch_size(),
            params.get_optimizer(),
            params.get_seed(),
            device,
        )?;
        let stats = history.stats()?;
        if !record.insert(*kind, *pooling, *hidden, stats) {
            return Err(GnnError::Persistence(format!("{} {} {} recorded twice", kind, pooling, hidden)));
        }
        record.persist(result_path)?;
        log::info!(
            "combination {} {} {} train acc : {:.4} +- {:.4}, test acc : {:.4} +- {:.4}",
            kind,
            pooling,
            hidden,
            stats.train.mean,
            stats.train.std,
            stats.test.mean,
            stats.test.std
        );
        log::info!(
            " sys time(s) {:.2e} cpu time(s) {:.2e}",
            sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.),
            cpu_start.elapsed().as_secs_f64()
        );
        runs.push(CombinationRun {
            kind: *kind,
            pooling: *pooling,
            hidden: *hidden,
            history,
        });
    }
    Ok(SweepOutcome { record, runs })
} // end of run_sweep

// end of mod tests
