//! Reduction of a per-epoch accuracy sequence to (mean, standard deviation).

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{GnnError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub mean: f64,
    /// population standard deviation, 0 for a single value
    pub std: f64,
}

/// statistics of the train and test accuracies of one combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitStats {
    pub train: AccuracyStats,
    pub test: AccuracyStats,
}

/// Mean and (population) standard deviation of values.
///
/// Values are sorted before the reduction, so the result does not depend on their order at all,
/// not even in the last bit.
pub fn mean_std(values: &[f64]) -> Result<AccuracyStats> {
    if values.is_empty() {
        return Err(GnnError::EmptyDataset(String::from("no accuracy to reduce")));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let values = Array1::from(sorted);
    let mean = values
        .mean()
        .ok_or_else(|| GnnError::EmptyDataset(String::from("no accuracy to reduce")))?;
    let std = if values.len() == 1 { 0. } else { values.std(0.) };
    Ok(AccuracyStats { mean, std })
} // end of mean_std

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn single_value_has_no_spread() {
        log_init_test();
        let stats = mean_std(&[0.75]).unwrap();
        assert_eq!(stats.mean, 0.75);
        assert_eq!(stats.std, 0.);
    }

    #[test]
    fn mean_and_std_of_a_sequence() {
        log_init_test();
        let stats = mean_std(&[0.5, 1., 0.5, 1.]).unwrap();
        assert!((stats.mean - 0.75).abs() < 1e-12);
        assert!((stats.std - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reordering_does_not_change_anything() {
        log_init_test();
        let values = [0.1, 0.7, 0.3333333, 0.9, 0.25, 0.6];
        let reference = mean_std(&values).unwrap();
        let mut reversed = values.to_vec();
        reversed.reverse();
        assert_eq!(mean_std(&reversed).unwrap(), reference);
        let rotated: Vec<f64> = values.iter().cycle().skip(2).take(values.len()).cloned().collect();
        assert_eq!(mean_std(&rotated).unwrap(), reference);
    }

    #[test]
    fn empty_sequence_is_an_error() {
        log_init_test();
        assert!(mean_std(&[]).is_err());
    }
} // end of mod tests
