//! lib target
//!
//! Detection of outlier nodes in attributed graphs, see [detector] for the detectors
//! and [generator] for injection of synthetic outliers.


pub mod graph;

pub mod tools;

pub mod nn;

pub mod sampling;

pub mod detector;

pub mod generator;

pub mod metrics;

pub mod io;

pub mod prelude;
