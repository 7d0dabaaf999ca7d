//! Sampled ego subgraphs and their assembly into fixed size dense tensors.
//!
//! For a subgraph size s, a subgraph is laid out on s + 1 slots :
//! - slots 0..s-1 : context nodes, zero padded when the walk found fewer than s - 1 nodes
//! - slot s-1 : the target with null features (anonymized) linked to its context by the induced edges
//! - slot s : an isolated copy of the target carrying its real features
//!
//! The readout (summary of the subgraph) runs over the real context slots and the anonymized target,
//! padding and the copy are masked out. The encoder output of the last slot is the target embedding.


use ndarray::{Array2};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use rayon::prelude::*;

use crate::graph::AttributedGraph;
use crate::tools::renormalize::dense_gcn_normalization;
use super::randomwalk::{WalkParams, rwr_context};


/// a target node and the distinct nodes sampled around it
#[derive(Clone, Debug)]
pub struct Subgraph {
    pub target : usize,
    pub context : Vec<usize>,
}


/// dense tensors of one subgraph, of size+1 rows.
#[derive(Clone, Debug)]
pub struct SubgraphTensors {
    /// normalized adjacency (size+1, size+1)
    pub adjacency : Array2<f64>,
    /// features (size+1, d)
    pub features : Array2<f64>,
    /// slots entering the readout
    pub readout_mask : Vec<bool>,
}

impl SubgraphTensors {

    /// number of slots
    pub fn get_nb_slots(&self) -> usize {
        self.adjacency.nrows()
    }

    /// slot holding the target features
    pub fn get_target_slot(&self) -> usize {
        self.get_nb_slots() - 1
    }

    /// slot of the target with null features, inside the subgraph
    pub fn get_anonymized_slot(&self) -> usize {
        self.get_nb_slots() - 2
    }
} // end of impl SubgraphTensors



/// sample one subgraph per target. One seed per target is drawn from rng so that
/// sampling can run in parallel and still be reproducible.
pub fn sample_subgraphs<R : Rng>(graph : &AttributedGraph, targets : &[usize], params : &WalkParams, rng : &mut R) -> Vec<Subgraph> {
    let seeds : Vec<u64> = targets.iter().map(|_| rng.gen::<u64>()).collect();
    targets.par_iter().zip(seeds.par_iter()).map(|(&target, &seed)| {
            let mut node_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let context = rwr_context(graph, target, params, &mut node_rng);
            Subgraph{target, context}
        }).collect()
} // end of sample_subgraphs



/// builds the dense tensors of a subgraph
pub fn assemble(graph : &AttributedGraph, subgraph : &Subgraph, size : usize) -> SubgraphTensors {
    assert!(size >= 2);
    assert!(subgraph.context.len() < size, "context larger than subgraph size");
    let nb_slots = size + 1;
    let anonymized = size - 1;
    let copy = size;
    // node occupying each slot, None for padding
    let mut slots : Vec<Option<usize>> = vec![None; nb_slots];
    for (i, &node) in subgraph.context.iter().enumerate() {
        slots[i] = Some(node);
    }
    slots[anonymized] = Some(subgraph.target);
    //
    let valid : Vec<bool> = (0..nb_slots).map(|i| i == copy || slots[i].is_some()).collect();
    let mut raw = Array2::<f64>::zeros((nb_slots, nb_slots));
    for i in 0..size {
        for j in (i+1)..size {
            if let (Some(a), Some(b)) = (slots[i], slots[j]) {
                if graph.has_edge(a, b) {
                    raw[[i,j]] = 1.;
                    raw[[j,i]] = 1.;
                }
            }
        }
    }
    let adjacency = dense_gcn_normalization(&raw, &valid);
    //
    let mut features = Array2::<f64>::zeros((nb_slots, graph.get_nb_features()));
    for (i, &node) in subgraph.context.iter().enumerate() {
        features.row_mut(i).assign(&graph.get_node_features(node));
    }
    features.row_mut(copy).assign(&graph.get_node_features(subgraph.target));
    //
    let mut readout_mask = valid;
    readout_mask[copy] = false;
    SubgraphTensors{adjacency, features, readout_mask}
} // end of assemble


/// assemble a batch of subgraphs in parallel
pub fn assemble_batch(graph : &AttributedGraph, subgraphs : &[Subgraph], size : usize) -> Vec<SubgraphTensors> {
    subgraphs.par_iter().map(|s| assemble(graph, s, size)).collect()
}



#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn triangle_plus_tail() -> AttributedGraph {
        // triangle 0 1 2, tail 2 - 3, node 4 isolated
        let features = ndarray::arr2(&[[1., 0.], [2., 0.], [3., 0.], [4., 0.], [5., 5.]]);
        AttributedGraph::from_edges(features, &[(0,1), (1,2), (0,2), (2,3)]).unwrap()
    }

    #[test]
    fn test_assemble_full_context() {
        log_init_test();
        //
        let graph = triangle_plus_tail();
        let subgraph = Subgraph{target : 2, context : vec![0, 1, 3]};
        let tensors = assemble(&graph, &subgraph, 4);
        assert_eq!(tensors.get_nb_slots(), 5);
        assert_eq!(tensors.features.dim(), (5, 2));
        // anonymized target
        assert_eq!(tensors.features.row(3).sum(), 0.);
        assert_eq!(tensors.features.row(4).to_vec(), vec![3., 0.]);
        assert_eq!(tensors.features.row(2).to_vec(), vec![4., 0.]);
        assert_eq!(tensors.readout_mask, vec![true, true, true, true, false]);
        // isolated copy only sees itself
        assert_eq!(tensors.adjacency[[4,4]], 1.);
        assert_eq!(tensors.adjacency.row(4).sum(), 1.);
        // 0 - 1 linked, 1 - 3 (node 1, node 3) not linked, slot 2 (node 3) linked to slot 3 (target)
        assert!(tensors.adjacency[[0,1]] > 0.);
        assert_eq!(tensors.adjacency[[1,2]], 0.);
        assert!(tensors.adjacency[[2,3]] > 0.);
        assert_eq!(tensors.adjacency, tensors.adjacency.t());
    } // end of test_assemble_full_context


    #[test]
    fn test_assemble_padding() {
        log_init_test();
        //
        let graph = triangle_plus_tail();
        let subgraph = Subgraph{target : 3, context : vec![2]};
        let tensors = assemble(&graph, &subgraph, 4);
        assert_eq!(tensors.readout_mask, vec![true, false, false, true, false]);
        for pad in [1, 2] {
            assert_eq!(tensors.features.row(pad).sum(), 0.);
            assert_eq!(tensors.adjacency.row(pad).sum(), 0.);
            assert_eq!(tensors.adjacency.column(pad).sum(), 0.);
        }
        // isolated target, only padding and the anonymized self
        let lonely = assemble(&graph, &Subgraph{target : 4, context : vec![]}, 3);
        assert_eq!(lonely.readout_mask, vec![false, false, true, false]);
        assert_eq!(lonely.adjacency[[2,2]], 1.);
        assert_eq!(lonely.adjacency.sum(), 2.);
        assert_eq!(lonely.features.row(3).to_vec(), vec![5., 5.]);
    } // end of test_assemble_padding


    #[test]
    fn test_sample_subgraphs_reproducible() {
        log_init_test();
        //
        let graph = triangle_plus_tail();
        let params = WalkParams::new(3, 1., 5);
        let targets : Vec<usize> = (0..5).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(77);
        let first = sample_subgraphs(&graph, &targets, &params, &mut rng);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(77);
        let second = sample_subgraphs(&graph, &targets, &params, &mut rng);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.target, b.target);
            assert_eq!(a.context, b.context);
            assert!(a.context.len() <= 2);
            assert!(!a.context.contains(&a.target));
        }
        assert!(first[4].context.is_empty());
        let batch = assemble_batch(&graph, &first, 3);
        assert_eq!(batch.len(), 5);
    } // end of test_sample_subgraphs_reproducible

} // end of mod tests
