//! Generation of training data for the contrastive detector :
//! random walk with restart around each target, assembly of padded subgraph tensors,
//! minibatches and cyclic shift negative pairing.

pub mod batch;
pub mod randomwalk;
pub mod subgraph;

pub use batch::{minibatches, negative_shift};
pub use randomwalk::{WalkParams, rwr_context};
pub use subgraph::{Subgraph, SubgraphTensors, assemble, assemble_batch, sample_subgraphs};
