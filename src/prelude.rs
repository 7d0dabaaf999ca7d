//! To ease access to most frequently items
//!


pub use crate::graph::AttributedGraph;

pub use crate::io::csv::*;

pub use crate::detector::{DetectorT, DetectorParams, FittedScores, predict, predict_proba};
pub use crate::detector::gae::{Gae, GaeParams};
pub use crate::detector::cola::{Cola, ColaParams};
pub use crate::nn::readout::Readout;
pub use crate::sampling::WalkParams;

pub use crate::generator::*;
pub use crate::metrics::*;
