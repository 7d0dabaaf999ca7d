//! graph tools : adjacency normalization, propagation.

pub mod renormalize;
pub mod spmm;
