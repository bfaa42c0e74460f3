//! Dataset exchange files.

pub mod csv;

pub use self::csv::load_dataset;
