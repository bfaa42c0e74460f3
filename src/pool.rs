//! Readout : reduction of node embeddings to one embedding per graph.
//!
//! Row g of the output only depends on the nodes assigned to graph g. Mean and sum differ
//! for graphs of different sizes, sum keeps the total activity of a graph, mean normalizes it away.

use std::fmt;
use std::str::FromStr;

use candle_core::{DType, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{GnnError, Result};
use crate::graph::GraphAssignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    Mean,
    Max,
    Sum,
}

impl Pooling {
    /// the poolings swept by default
    pub fn all() -> Vec<Pooling> {
        vec![Pooling::Mean, Pooling::Max, Pooling::Sum]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pooling::Mean => "mean",
            Pooling::Max => "max",
            Pooling::Sum => "sum",
        }
    }

    /// (nb_nodes, F) -> (nb_graphs, F)
    pub fn apply(&self, x: &Tensor, assignment: &GraphAssignment) -> Result<Tensor> {
        let (nb_nodes, width) = x.dims2()?;
        if nb_nodes != assignment.get_nb_nodes() {
            return Err(GnnError::DimensionMismatch {
                expected: assignment.get_nb_nodes(),
                got: nb_nodes,
            });
        }
        let nb_graphs = assignment.get_nb_graphs();
        match self {
            Pooling::Sum => Ok(segment_sum(x, assignment)?),
            Pooling::Mean => {
                let sizes: Vec<f32> = assignment.graph_sizes().iter().map(|s| (*s).max(1) as f32).collect();
                let sizes = Tensor::from_vec(sizes, (nb_graphs, 1), x.device())?;
                Ok(segment_sum(x, assignment)?.broadcast_div(&sizes)?)
            }
            Pooling::Max => {
                let mut rows = Vec::<Tensor>::with_capacity(nb_graphs);
                for members in assignment.graph_members() {
                    if members.is_empty() {
                        rows.push(Tensor::zeros(width, DType::F32, x.device())?);
                        continue;
                    }
                    let nb_members = members.len();
                    let ids = Tensor::from_vec(members, nb_members, x.device())?;
                    rows.push(x.index_select(&ids, 0)?.max(0)?);
                }
                Ok(Tensor::stack(&rows, 0)?)
            }
        }
    } // end of apply
} // end of impl Pooling

fn segment_sum(x: &Tensor, assignment: &GraphAssignment) -> Result<Tensor> {
    let width = x.dim(1)?;
    let zeros = Tensor::zeros((assignment.get_nb_graphs(), width), x.dtype(), x.device())?;
    Ok(zeros.index_add(assignment.index(), x, 0)?)
}

impl fmt::Display for Pooling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Pooling {
    type Err = GnnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "global_mean_pool" => Ok(Pooling::Mean),
            "max" | "global_max_pool" => Ok(Pooling::Max),
            "sum" | "add" | "global_add_pool" => Ok(Pooling::Sum),
            other => Err(GnnError::InvalidConfig(format!("unknown pooling {:?}", other))),
        }
    }
}

// end of mod tests
