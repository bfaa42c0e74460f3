//! Groups graphs of a split into batches.
//!
//! With shuffling on, the graph order is drawn again at each call to [DataLoader::batches], i.e once per epoch,
//! and the batches are then processed in that fixed order.

use candle_core::Device;
use rand::seq::SliceRandom;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{GnnError, Result};
use crate::graph::{Batch, Graph};

pub struct DataLoader {
    graphs: Vec<Graph>,
    batch_size: usize,
    shuffle: bool,
    rng: Xoshiro256PlusPlus,
    device: Device,
} // end of DataLoader

impl DataLoader {
    pub fn new(graphs: Vec<Graph>, batch_size: usize, shuffle: bool, seed: u64, device: &Device) -> Result<Self> {
        if graphs.is_empty() {
            return Err(GnnError::EmptyDataset(String::from("DataLoader got no graph")));
        }
        if batch_size == 0 {
            return Err(GnnError::InvalidConfig(String::from("batch size must be positive")));
        }
        Ok(DataLoader {
            graphs,
            batch_size,
            shuffle,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            device: device.clone(),
        })
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.graphs.len()
    }

    pub fn get_batch_size(&self) -> usize {
        self.batch_size
    }

    /// number of batches of an epoch, the last one may be smaller
    pub fn get_nb_batches(&self) -> usize {
        (self.graphs.len() + self.batch_size - 1) / self.batch_size
    }

    pub fn get_device(&self) -> &Device {
        &self.device
    }

    /// the batches of one epoch
    pub fn batches(&mut self) -> Result<Vec<Batch>> {
        let mut order: Vec<usize> = (0..self.graphs.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        let mut batches = Vec::<Batch>::with_capacity(self.get_nb_batches());
        for chunk in order.chunks(self.batch_size) {
            let graphs: Vec<&Graph> = chunk.iter().map(|rank| &self.graphs[*rank]).collect();
            batches.push(Batch::from_graphs(&graphs, &self.device)?);
        }
        Ok(batches)
    } // end of batches
} // end of impl DataLoader

// end of mod tests
