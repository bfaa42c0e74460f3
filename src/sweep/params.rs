//! Parameters of a sweep.

use std::path::{Path, PathBuf};

use crate::error::{GnnError, Result};
use crate::models::ModelKind;
use crate::pool::Pooling;
use crate::train::OptimizerParams;

/// default result file, relative to the working directory
pub const RESULT_PATH: &str = "sweep_results.json";

/// The grid (architectures x poolings x hidden sizes) and what each combination is run with.
#[derive(Debug, Clone)]
pub struct SweepParams {
    architectures: Vec<ModelKind>,
    poolings: Vec<Pooling>,
    hidden_sizes: Vec<usize>,
    /// number of epochs of each combination
    nb_epochs: usize,
    batch_size: usize,
    /// fraction of the (shuffled) dataset going to the training split
    train_fraction: f64,
    /// seeds the dataset shuffle and the batch orders
    seed: u64,
    optimizer: OptimizerParams,
    result_path: PathBuf,
    /// reload result_path and skip the combinations already recorded
    resume: bool,
} // end of SweepParams

impl SweepParams {
    pub fn new(architectures: Vec<ModelKind>, poolings: Vec<Pooling>, hidden_sizes: Vec<usize>, nb_epochs: usize) -> Self {
        SweepParams {
            architectures,
            poolings,
            hidden_sizes,
            nb_epochs,
            batch_size: 64,
            train_fraction: 0.8,
            seed: 4664397,
            optimizer: OptimizerParams::default(),
            result_path: PathBuf::from(RESULT_PATH),
            resume: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_train_fraction(mut self, train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerParams) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_result_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.result_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn get_architectures(&self) -> &[ModelKind] {
        &self.architectures
    }

    pub fn get_poolings(&self) -> &[Pooling] {
        &self.poolings
    }

    pub fn get_hidden_sizes(&self) -> &[usize] {
        &self.hidden_sizes
    }

    pub fn get_nb_epochs(&self) -> usize {
        self.nb_epochs
    }

    pub fn get_batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn get_train_fraction(&self) -> f64 {
        self.train_fraction
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn get_optimizer(&self) -> &OptimizerParams {
        &self.optimizer
    }

    pub fn get_result_path(&self) -> &Path {
        &self.result_path
    }

    pub fn get_resume(&self) -> bool {
        self.resume
    }

    /// number of combinations of the grid
    pub fn get_nb_combinations(&self) -> usize {
        self.architectures.len() * self.poolings.len() * self.hidden_sizes.len()
    }

    /// the grid in enumeration order : architecture, then pooling, then hidden size
    pub fn combinations(&self) -> Vec<(ModelKind, Pooling, usize)> {
        let mut grid = Vec::with_capacity(self.get_nb_combinations());
        for kind in &self.architectures {
            for pooling in &self.poolings {
                for hidden in &self.hidden_sizes {
                    grid.push((*kind, *pooling, *hidden));
                }
            }
        }
        grid
    }

    pub fn check(&self) -> Result<()> {
        if self.architectures.is_empty() || self.poolings.is_empty() || self.hidden_sizes.is_empty() {
            return Err(GnnError::InvalidConfig(String::from("sweep grid has an empty axis")));
        }
        if self.hidden_sizes.iter().any(|h| *h == 0) {
            return Err(GnnError::InvalidConfig(String::from("hidden sizes must be positive")));
        }
        if self.nb_epochs == 0 {
            return Err(GnnError::InvalidConfig(String::from("number of epochs must be positive")));
        }
        if self.batch_size == 0 {
            return Err(GnnError::InvalidConfig(String::from("batch size must be positive")));
        }
        if !(self.train_fraction > 0. && self.train_fraction < 1.) {
            return Err(GnnError::InvalidConfig(format!(
                "train fraction must be in ]0, 1[, got {}",
                self.train_fraction
            )));
        }
        Ok(())
    } // end of check
} // end of impl SweepParams

impl Default for SweepParams {
    fn default() -> Self {
        SweepParams::new(ModelKind::sweep_defaults(), Pooling::all(), vec![16, 32, 64], 50)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn default_grid() {
        log_init_test();
        let params = SweepParams::default();
        params.check().unwrap();
        assert_eq!(params.get_nb_combinations(), 4 * 3 * 3);
        assert_eq!(params.get_batch_size(), 64);
        assert_eq!(params.get_result_path(), Path::new(RESULT_PATH));
        let grid = params.combinations();
        assert_eq!(grid.len(), 36);
        assert_eq!(grid[0], (ModelKind::GraphSage, Pooling::Mean, 16));
        assert_eq!(grid[1], (ModelKind::GraphSage, Pooling::Mean, 32));
        assert_eq!(grid[3], (ModelKind::GraphSage, Pooling::Max, 16));
        assert_eq!(grid[35], (ModelKind::ClusterGcn, Pooling::Sum, 64));
    }

    #[test]
    fn bad_params_are_rejected() {
        log_init_test();
        assert!(SweepParams::new(vec![], Pooling::all(), vec![8], 1).check().is_err());
        assert!(SweepParams::new(vec![ModelKind::Gin], Pooling::all(), vec![0], 1).check().is_err());
        assert!(SweepParams::new(vec![ModelKind::Gin], Pooling::all(), vec![8], 0).check().is_err());
        let params = SweepParams::new(vec![ModelKind::Gin], Pooling::all(), vec![8], 1);
        assert!(params.clone().with_batch_size(0).check().is_err());
        assert!(params.clone().with_train_fraction(1.).check().is_err());
        assert!(params.with_train_fraction(0.5).check().is_ok());
    }
} // end of mod tests
