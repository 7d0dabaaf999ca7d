//! Readout : summary of node embeddings of a subgraph into one vector.
//!
//! Only the slots flagged in a mask enter the summary. The weighted sum weights each slot by the
//! softmax of its dot product with a query slot (the anonymized target in a sampled subgraph).


use anyhow::{anyhow};
use serde::{Deserialize, Serialize};

use ndarray::{Array1, Array2, ArrayView1};


#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readout {
    /// mean of embeddings
    Avg,
    /// coordinatewise max
    Max,
    /// coordinatewise min
    Min,
    /// softmax weighted sum, weights given by similarity with the query slot
    WeightedSum,
}


impl std::str::FromStr for Readout {
    type Err = anyhow::Error;

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        match s {
            "avg" => Ok(Readout::Avg),
            "max" => Ok(Readout::Max),
            "min" => Ok(Readout::Min),
            "weighted_sum" => Ok(Readout::WeightedSum),
            _ => Err(anyhow!("unknown readout {}, expected avg, max, min or weighted_sum", s)),
        }
    }
} // end of impl FromStr for Readout


impl Default for Readout {
    fn default() -> Self {
        Readout::Avg
    }
}


/// what backward needs from the forward pass
#[derive(Clone, Debug)]
pub enum ReadoutCache {
    /// weight of each slot, 0. for masked slots
    Weights(Vec<f64>),
    /// slot selected for each coordinate
    Selected(Vec<usize>),
}



impl Readout {

    /// summary of the rows of h flagged in mask. At least one row must be flagged.
    pub fn forward(&self, h : &Array2<f64>, mask : &[bool], query_slot : usize) -> (Array1<f64>, ReadoutCache) {
        assert_eq!(h.nrows(), mask.len());
        let slots : Vec<usize> = (0..mask.len()).filter(|i| mask[*i]).collect();
        assert!(!slots.is_empty(), "readout needs at least one slot");
        match self {
            Readout::Avg => {
                let w = 1. / slots.len() as f64;
                let weights : Vec<f64> = mask.iter().map(|m| if *m { w } else { 0. }).collect();
                (weighted_rows(h, &weights), ReadoutCache::Weights(weights))
            },
            Readout::WeightedSum => {
                let query = h.row(query_slot);
                let mut weights = vec![0.; mask.len()];
                for i in &slots {
                    weights[*i] = h.row(*i).dot(&query);
                }
                let max = slots.iter().map(|i| weights[*i]).fold(f64::NEG_INFINITY, f64::max);
                let mut sum = 0.;
                for i in &slots {
                    weights[*i] = (weights[*i] - max).exp();
                    sum += weights[*i];
                }
                for i in &slots {
                    weights[*i] /= sum;
                }
                (weighted_rows(h, &weights), ReadoutCache::Weights(weights))
            },
            Readout::Max | Readout::Min => {
                let better = |a : f64, b : f64| if *self == Readout::Max { a > b } else { a < b };
                let mut selected = vec![slots[0]; h.ncols()];
                let mut summary = h.row(slots[0]).to_owned();
                for i in &slots[1..] {
                    for (j, v) in h.row(*i).iter().enumerate() {
                        if better(*v, summary[j]) {
                            summary[j] = *v;
                            selected[j] = *i;
                        }
                    }
                }
                (summary, ReadoutCache::Selected(selected))
            },
        }
    } // end of forward


    /// gradient with respect to h of d_summary . summary
    pub fn backward(&self, h : &Array2<f64>, query_slot : usize, cache : &ReadoutCache, d_summary : ArrayView1<f64>) -> Array2<f64> {
        let mut d_h = Array2::<f64>::zeros(h.dim());
        match cache {
            ReadoutCache::Selected(selected) => {
                for (j, i) in selected.iter().enumerate() {
                    d_h[[*i, j]] += d_summary[j];
                }
            },
            ReadoutCache::Weights(weights) => {
                for (i, w) in weights.iter().enumerate() {
                    if *w > 0. {
                        d_h.row_mut(i).scaled_add(*w, &d_summary);
                    }
                }
                if *self == Readout::WeightedSum {
                    // back through the softmax then the dot products with the query
                    let d_weights : Vec<f64> = h.rows().into_iter().map(|row| row.dot(&d_summary)).collect();
                    let mean : f64 = weights.iter().zip(d_weights.iter()).map(|(w, d)| w * d).sum();
                    let query = h.row(query_slot).to_owned();
                    let mut d_query = Array1::<f64>::zeros(h.ncols());
                    for (i, w) in weights.iter().enumerate() {
                        if *w > 0. {
                            let d_score = w * (d_weights[i] - mean);
                            d_h.row_mut(i).scaled_add(d_score, &query);
                            d_query.scaled_add(d_score, &h.row(i));
                        }
                    }
                    d_h.row_mut(query_slot).scaled_add(1., &d_query);
                }
            },
        }
        d_h
    } // end of backward

} // end of impl Readout


// sum of rows of h weighted by weights
fn weighted_rows(h : &Array2<f64>, weights : &[f64]) -> Array1<f64> {
    let mut summary = Array1::<f64>::zeros(h.ncols());
    for (row, w) in h.rows().into_iter().zip(weights.iter()) {
        if *w > 0. {
            summary.scaled_add(*w, &row);
        }
    }
    summary
}
