//! Reading graphs and labels from csv files, dumping scores.

pub mod csv;
