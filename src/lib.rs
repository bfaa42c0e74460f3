//! Graph neural network classifiers of web page link graphs (phishing or not),
//! and a sweep harness comparing architectures, poolings and hidden sizes.
//!
//! - [graph] : graphs, batches of graphs, datasets and loaders
//! - [conv] : message passing layers
//! - [pool] : readout of node embeddings into graph embeddings
//! - [models] : graph classifiers built on the layers
//! - [train] : fit and evaluate one model
//! - [sweep] : grid search and persistence of the results

use env_logger::Builder;

#[macro_use]
extern crate lazy_static;

lazy_static! {
    static ref LOG: u64 = init_log();
}

// install a logger facility
fn init_log() -> u64 {
    Builder::from_default_env().init();
    println!("\n ************** initializing logger *****************\n");
    1
}

/// initializes the logger once, from RUST_LOG
pub fn log_init() {
    lazy_static::initialize(&LOG);
}

pub mod error;

pub mod graph;

pub mod conv;

pub mod pool;

pub mod models;

pub mod train;

pub mod sweep;

pub mod io;

pub mod viz;

pub mod device;

pub mod prelude;

pub use error::{GnnError, Result};
