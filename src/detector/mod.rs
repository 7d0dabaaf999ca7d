//! The detector contract.
//!
//! A detector is fitted on an attributed graph and then gives one anomaly score per node, higher is more anomalous.
//! After fitting, the training scores are kept together with a threshold derived from the expected
//! proportion of outliers (contamination). New graphs can then be labelled with [predict] or given an outlier
//! probability with [predict_proba].
//!
//! Two detectors are implemented :
//! - [gae::Gae] a graph autoencoder scoring nodes by reconstruction error.
//! - [cola::Cola] a contrastive detector scoring nodes by how badly they match their sampled neighbourhood.


use anyhow::{anyhow};
use serde::{Deserialize, Serialize};

use ndarray::{Array1, Array2};

use crate::graph::AttributedGraph;

pub mod gae;
pub mod cola;


/// training parameters shared by detectors
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct DetectorParams {
    /// number of training epochs
    pub epochs : usize,
    /// learning rate of Adam
    pub lr : f64,
    /// L2 penalty added to gradients
    pub weight_decay : f64,
    /// expected proportion of outliers, in (0, 0.5]
    pub contamination : f64,
    /// seed of random generators (weights initialization and sampling)
    pub seed : u64,
} // end of DetectorParams


impl DetectorParams {

    pub fn new(epochs : usize, lr : f64, weight_decay : f64, contamination : f64, seed : u64) -> Self {
        DetectorParams{epochs, lr, weight_decay, contamination, seed}
    }

    ///
    pub fn get_epochs(&self) -> usize { self.epochs }

    ///
    pub fn get_lr(&self) -> f64 { self.lr }

    ///
    pub fn get_weight_decay(&self) -> f64 { self.weight_decay }

    ///
    pub fn get_contamination(&self) -> f64 { self.contamination }

    ///
    pub fn get_seed(&self) -> u64 { self.seed }

    /// checks ranges of parameters
    pub fn check(&self) -> Result<(), anyhow::Error> {
        if !(self.contamination > 0. && self.contamination <= 0.5) {
            log::error!("contamination must be in (0, 0.5], got {}", self.contamination);
            return Err(anyhow!("contamination must be in (0, 0.5]"));
        }
        if !(self.lr > 0.) {
            return Err(anyhow!("learning rate must be positive"));
        }
        if self.weight_decay < 0. {
            return Err(anyhow!("weight decay must be non negative"));
        }
        Ok(())
    } // end of check

} // end of impl DetectorParams


impl Default for DetectorParams {
    fn default() -> Self {
        DetectorParams{epochs : 100, lr : 0.004, weight_decay : 0., contamination : 0.1, seed : 4664397}
    }
}



/// Scores of training nodes and derived threshold and labels.
#[derive(Clone, Debug)]
pub struct FittedScores {
    /// anomaly score of each training node
    pub decision_scores : Array1<f64>,
    /// scores strictly above threshold are outliers
    pub threshold : f64,
    /// true for outliers
    pub labels : Vec<bool>,
}


impl FittedScores {

    /// the threshold is the percentile 100 * (1 - contamination) of scores
    pub fn new(decision_scores : Array1<f64>, contamination : f64) -> Self {
        let threshold = percentile(&decision_scores.to_vec(), 100. * (1. - contamination));
        let labels = decision_scores.iter().map(|s| *s > threshold).collect();
        FittedScores{decision_scores, threshold, labels}
    }

    /// number of nodes labelled as outliers
    pub fn get_nb_outliers(&self) -> usize {
        self.labels.iter().filter(|l| **l).count()
    }

    /// (min, max) of training scores
    pub fn get_range(&self) -> (f64, f64) {
        let min = self.decision_scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.decision_scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }
} // end of impl FittedScores



/// The trait satisfied by detectors
pub trait DetectorT {
    /// train the detector on a graph and compute training scores
    fn fit(&mut self, graph : &AttributedGraph) -> Result<(), anyhow::Error>;
    /// anomaly score of each node of a graph with a fitted model
    fn decision_function(&self, graph : &AttributedGraph) -> Result<Array1<f64>, anyhow::Error>;
    /// training scores, None before fit
    fn get_fitted(&self) -> Option<&FittedScores>;
    /// mean loss of each epoch
    fn get_loss_history(&self) -> &[f64];
} // end of trait DetectorT



/// label nodes of graph as outliers (true) using the threshold obtained at fit
pub fn predict(detector : &dyn DetectorT, graph : &AttributedGraph) -> Result<Vec<bool>, anyhow::Error> {
    let fitted = match detector.get_fitted() {
        Some(fitted) => fitted,
        None => { return Err(anyhow!("predict : detector not fitted")); },
    };
    let scores = detector.decision_function(graph)?;
    Ok(scores.iter().map(|s| *s > fitted.threshold).collect())
} // end of predict



/// outlier probability by linear rescaling of scores between min and max training scores.
/// Returns an array (nb_nodes, 2), column 0 is the probability of being an inlier, column 1 of being an outlier.
pub fn predict_proba(detector : &dyn DetectorT, graph : &AttributedGraph) -> Result<Array2<f64>, anyhow::Error> {
    let fitted = match detector.get_fitted() {
        Some(fitted) => fitted,
        None => { return Err(anyhow!("predict_proba : detector not fitted")); },
    };
    let (min, max) = fitted.get_range();
    let scores = detector.decision_function(graph)?;
    let mut proba = Array2::<f64>::zeros((scores.len(), 2));
    for (i, s) in scores.iter().enumerate() {
        let p = if max > min { ((s - min) / (max - min)).clamp(0., 1.) } else { 0. };
        proba[[i,0]] = 1. - p;
        proba[[i,1]] = p;
    }
    Ok(proba)
} // end of predict_proba



/// percentile q in [0,100] with linear interpolation between closest ranks
pub fn percentile(values : &[f64], q : f64) -> f64 {
    assert!(!values.is_empty());
    assert!(q >= 0. && q <= 100.);
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let pos = q / 100. * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
} // end of percentile



// common checks on a graph given to fit or decision_function
pub(crate) fn check_graph(graph : &AttributedGraph, expected_dim : Option<usize>) -> Result<(), anyhow::Error> {
    if graph.get_nb_nodes() < 2 {
        log::error!("detectors need at least 2 nodes, got {}", graph.get_nb_nodes());
        return Err(anyhow!("detectors need at least 2 nodes"));
    }
    if let Some(dim) = expected_dim {
        if dim != graph.get_nb_features() {
            log::error!("model fitted with feature dimension {}, graph has dimension {}", dim, graph.get_nb_features());
            return Err(anyhow!("feature dimension mismatch with fitted model"));
        }
    }
    if graph.get_features().iter().any(|v| !v.is_finite()) {
        return Err(anyhow!("features contain non finite values"));
    }
    Ok(())
} // end of check_graph
