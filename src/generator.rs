//! Injection of synthetic outliers in an attributed graph.
//!
//! - contextual outliers : a node gets the features of a node far away in feature space, its edges are unchanged.
//! - structural outliers : small groups of nodes are turned into cliques, features are unchanged.
//!
//! Both return the modified graph and the ground truth labels (true for injected nodes).


use anyhow::{anyhow};

use ndarray::{Array2};
use rand::Rng;
use rand::seq::index::sample;


use crate::graph::AttributedGraph;


/// Chooses m distinct nodes. For each, k candidate nodes are drawn and the node features are replaced
/// by the features of the candidate farthest (euclidean distance) from the node.
/// Candidates are drawn in the original graph so injected features are real features.
pub fn gen_contextual_outliers<R : Rng>(graph : &AttributedGraph, m : usize, k : usize, rng : &mut R) -> Result<(AttributedGraph, Vec<bool>), anyhow::Error> {
    let nb_nodes = graph.get_nb_nodes();
    if m > nb_nodes {
        log::error!("gen_contextual_outliers : asked {} outliers in a graph of {} nodes", m, nb_nodes);
        return Err(anyhow!("gen_contextual_outliers : more outliers than nodes"));
    }
    if k == 0 {
        return Err(anyhow!("gen_contextual_outliers : number of candidates must be positive"));
    }
    let original = graph.get_features();
    let mut features : Array2<f64> = original.clone();
    let mut labels = vec![false; nb_nodes];
    //
    for node in sample(rng, nb_nodes, m).into_iter() {
        let mut best_dist = -1.;
        let mut best = node;
        for _ in 0..k {
            let candidate = rng.gen_range(0..nb_nodes);
            let diff = &original.row(node) - &original.row(candidate);
            let dist = diff.dot(&diff);
            if dist > best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        log::trace!("contextual outlier {} takes features of {}, squared distance {:.3e}", node, best, best_dist);
        features.row_mut(node).assign(&original.row(best));
        labels[node] = true;
    }
    let outliers = graph.with_features(features)?;
    Ok((outliers, labels))
} // end of gen_contextual_outliers



/// Chooses m * n distinct nodes, splits them in m groups of n nodes and fully connects each group.
pub fn gen_structural_outliers<R : Rng>(graph : &AttributedGraph, m : usize, n : usize, rng : &mut R) -> Result<(AttributedGraph, Vec<bool>), anyhow::Error> {
    let nb_nodes = graph.get_nb_nodes();
    if n < 2 {
        log::error!("gen_structural_outliers : clique size must be at least 2, got {}", n);
        return Err(anyhow!("gen_structural_outliers : clique size must be at least 2"));
    }
    let nb_outliers = m * n;
    if nb_outliers > nb_nodes {
        log::error!("gen_structural_outliers : asked {} cliques of size {} in a graph of {} nodes", m, n, nb_nodes);
        return Err(anyhow!("gen_structural_outliers : more outliers than nodes"));
    }
    let chosen = sample(rng, nb_nodes, nb_outliers).into_vec();
    let mut labels = vec![false; nb_nodes];
    let mut edges = Vec::<(usize,usize)>::with_capacity(m * n * (n - 1) / 2);
    for clique in chosen.chunks(n) {
        for (i, a) in clique.iter().enumerate() {
            labels[*a] = true;
            for b in &clique[i+1..] {
                edges.push((*a, *b));
            }
        }
    }
    log::debug!("gen_structural_outliers : {} cliques, {} edges added or kept", m, edges.len());
    let outliers = graph.with_extra_edges(&edges)?;
    Ok((outliers, labels))
} // end of gen_structural_outliers
