//! Random walk with restart around a target node.
//!
//! The walk collects the distinct nodes it visits (target excluded) in first visit order.
//! With a restart probability of 1. every step starts again from the target, so the context
//! is made of direct neighbours. When that is not enough to fill the context we retry with a
//! smaller restart probability and a larger step budget, reaching nodes further away.
//! Retries stop as soon as the walk holds every node of the target's component.


use anyhow::{anyhow};
use indexmap::IndexSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::AttributedGraph;


/// restart probability used for retries
const RETRY_RESTART_PROBA : f64 = 0.9;

/// growth of the step budget at each retry
const RETRY_BUDGET_FACTOR : usize = 5;

/// budget never exceeds this many steps per context node asked for
const MAX_STEPS_PER_NODE : usize = 1000;


/// parameters of subgraph sampling
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct WalkParams {
    /// number of nodes of a sampled subgraph, target included. Must be >= 2
    pub subgraph_size : usize,
    /// probability to jump back to the target before each step
    pub restart_proba : f64,
    /// number of retries when the first walk did not find enough nodes
    pub max_retries : usize,
} // end of WalkParams


impl WalkParams {

    /// values are not checked here, see [check](Self::check)
    pub fn new(subgraph_size : usize, restart_proba : f64, max_retries : usize) -> Self {
        WalkParams{subgraph_size, restart_proba, max_retries}
    }

    /// subgraph_size must be at least 2 and restart_proba in [0., 1.]
    pub fn check(&self) -> Result<(), anyhow::Error> {
        if self.subgraph_size < 2 {
            log::error!("WalkParams : subgraph size must be at least 2, got {}", self.subgraph_size);
            return Err(anyhow!("subgraph size must be at least 2"));
        }
        if !(self.restart_proba >= 0. && self.restart_proba <= 1.) {
            log::error!("WalkParams : restart probability must be in [0., 1.], got {}", self.restart_proba);
            return Err(anyhow!("restart probability must be in [0., 1.]"));
        }
        Ok(())
    } // end of check

    ///
    pub fn get_subgraph_size(&self) -> usize { self.subgraph_size }

    ///
    pub fn get_restart_proba(&self) -> f64 { self.restart_proba }

    ///
    pub fn get_max_retries(&self) -> usize { self.max_retries }

} // end of impl WalkParams


impl Default for WalkParams {
    fn default() -> Self {
        WalkParams{subgraph_size : 4, restart_proba : 1., max_retries : 10}
    }
}



/// Returns at most subgraph_size - 1 distinct nodes around target, never target itself.
/// An isolated node gets an empty context.
pub fn rwr_context<R : Rng>(graph : &AttributedGraph, target : usize, params : &WalkParams, rng : &mut R) -> Vec<usize> {
    if graph.get_degree(target) == 0 {
        log::trace!("rwr_context node {} is isolated", target);
        return Vec::new();
    }
    // in a component too small no walk can do better than the whole component
    let wanted = reachable_count(graph, target, params.get_subgraph_size().saturating_sub(1));
    let max_budget = MAX_STEPS_PER_NODE * params.get_subgraph_size();
    let mut budget = 3 * params.get_subgraph_size();
    let mut restart = params.get_restart_proba();
    let mut best = IndexSet::<usize>::new();
    for retry in 0..=params.get_max_retries() {
        let visited = one_walk(graph, target, wanted, restart, budget, rng);
        if visited.len() > best.len() {
            best = visited;
        }
        if best.len() >= wanted {
            break;
        }
        log::trace!("rwr_context node {} retry {}, got {} nodes", target, retry, best.len());
        restart = restart.min(RETRY_RESTART_PROBA);
        budget = (budget * RETRY_BUDGET_FACTOR).min(max_budget);
    }
    best.into_iter().collect()
} // end of rwr_context



// number of nodes reachable from target (target excluded), explored breadth first up to bound
fn reachable_count(graph : &AttributedGraph, target : usize, bound : usize) -> usize {
    let mut seen = IndexSet::<usize>::with_capacity(bound + 1);
    seen.insert(target);
    let mut next = 0;
    while next < seen.len() && seen.len() <= bound {
        let node = seen[next];
        for neighbour in graph.get_neighbours(node) {
            seen.insert(*neighbour);
            if seen.len() > bound {
                break;
            }
        }
        next += 1;
    }
    (seen.len() - 1).min(bound)
} // end of reachable_count



// one walk from target, at most budget steps
fn one_walk<R : Rng>(graph : &AttributedGraph, target : usize, wanted : usize, restart : f64, budget : usize, rng : &mut R) -> IndexSet<usize> {
    let mut visited = IndexSet::<usize>::with_capacity(wanted);
    let mut current = target;
    for _ in 0..budget {
        if current != target && rng.gen::<f64>() < restart {
            current = target;
        }
        let neighbours = graph.get_neighbours(current);
        if neighbours.is_empty() {
            current = target;
            continue;
        }
        current = neighbours[rng.gen_range(0..neighbours.len())];
        if current != target {
            visited.insert(current);
            if visited.len() >= wanted {
                break;
            }
        }
    }
    visited
} // end of one_walk



// end of mod tests
