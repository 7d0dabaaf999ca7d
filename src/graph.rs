//! The attributed graph consumed by detectors.
//!
//! Nodes are identified by their rank (0..nb_nodes). Each node carries a row of the feature matrix,
//! the structure is stored as a binary symetric adjacency matrix in compressed row storage (crate sprs).
//!
//! Directed input is symetrized, edge multiplicities and weights are dropped and self loops removed:
//! detectors only see "is there a link between i and j".


use anyhow::{anyhow};

use ndarray::{Array2, ArrayView1};
use sprs::{TriMatI, CsMatI};


/// Nodes with feature vectors plus undirected edges.
#[derive(Clone, Debug)]
pub struct AttributedGraph {
    /// array (n,d), row i is the feature vector of node of rank i
    features : Array2<f64>,
    /// binary, symetric, no self loop. CSR storage
    adjacency : CsMatI<f64, usize>,
} // end of struct AttributedGraph



impl AttributedGraph {

    /// build a graph from features and a triplet matrix of size (n,n) where n is the number of rows of features.
    pub fn new(features : Array2<f64>, trimat : &TriMatI<f64, usize>) -> Result<Self, anyhow::Error> {
        let (nb_rows, nb_cols) = trimat.shape();
        if nb_rows != nb_cols || nb_rows != features.nrows() {
            log::error!("AttributedGraph::new adjacency shape ({},{}) incompatible with {} feature rows", nb_rows, nb_cols, features.nrows());
            return Err(anyhow!("AttributedGraph::new adjacency must be square with as many rows as features"));
        }
        let edges : Vec<(usize,usize)> = trimat.triplet_iter().map(|(_, (i,j))| (i,j)).collect();
        AttributedGraph::from_edges(features, &edges)
    } // end of new


    /// build a graph from features and a list of edges (i,j) between node ranks.
    pub fn from_edges(features : Array2<f64>, edges : &[(usize, usize)]) -> Result<Self, anyhow::Error> {
        let nb_nodes = features.nrows();
        if nb_nodes == 0 {
            return Err(anyhow!("AttributedGraph needs at least one node"));
        }
        let mut neighbours : Vec<Vec<usize>> = (0..nb_nodes).map(|_| Vec::<usize>::new()).collect();
        let mut nb_self_loops = 0usize;
        for &(i,j) in edges {
            if i >= nb_nodes || j >= nb_nodes {
                log::error!("AttributedGraph::from_edges edge ({},{}) out of range, nb nodes : {}", i, j, nb_nodes);
                return Err(anyhow!("edge references a node rank out of range"));
            }
            if i == j {
                nb_self_loops += 1;
                continue;
            }
            neighbours[i].push(j);
            neighbours[j].push(i);
        }
        if nb_self_loops > 0 {
            log::debug!("AttributedGraph::from_edges dropped {} self loops", nb_self_loops);
        }
        let adjacency = lists_to_csr(nb_nodes, neighbours);
        log::debug!("AttributedGraph nb nodes : {}, nb undirected edges : {}, dim features : {}", nb_nodes, adjacency.nnz() / 2, features.ncols());
        Ok(AttributedGraph{features, adjacency})
    } // end of from_edges


    /// get number of nodes
    pub fn get_nb_nodes(&self) -> usize {
        self.features.nrows()
    }

    /// dimension of feature vectors
    pub fn get_nb_features(&self) -> usize {
        self.features.ncols()
    }

    /// number of undirected edges
    pub fn get_nb_edges(&self) -> usize {
        self.adjacency.nnz() / 2
    }

    pub fn get_features(&self) -> &Array2<f64> {
        &self.features
    }

    /// feature vector of a node
    pub fn get_node_features(&self, node : usize) -> ArrayView1<f64> {
        self.features.row(node)
    }

    /// the binary symetric adjacency matrix
    pub fn get_adjacency(&self) -> &CsMatI<f64, usize> {
        &self.adjacency
    }

    /// sorted slice of neighbours of a node
    pub fn get_neighbours(&self, node : usize) -> &[usize] {
        let range = self.adjacency.indptr().outer_inds_sz(node);
        &self.adjacency.indices()[range]
    }

    pub fn get_degree(&self, node : usize) -> usize {
        self.adjacency.indptr().nnz_in_outer_sz(node)
    }

    /// true if there is an edge between i and j
    pub fn has_edge(&self, i : usize, j : usize) -> bool {
        self.get_neighbours(i).binary_search(&j).is_ok()
    }


    /// return adjacency as a full (n,n) array
    pub fn to_dense_adjacency(&self) -> Array2<f64> {
        let nb_nodes = self.get_nb_nodes();
        let mut dense = Array2::<f64>::zeros((nb_nodes, nb_nodes));
        for i in 0..nb_nodes {
            for &j in self.get_neighbours(i) {
                dense[[i,j]] = 1.;
            }
        }
        dense
    } // end of to_dense_adjacency


    /// returns a copy of the graph with the feature matrix replaced. Dimension of features can change but not the number of rows.
    pub fn with_features(&self, features : Array2<f64>) -> Result<Self, anyhow::Error> {
        if features.nrows() != self.get_nb_nodes() {
            return Err(anyhow!("with_features : got {} rows, expected {}", features.nrows(), self.get_nb_nodes()));
        }
        Ok(AttributedGraph{features, adjacency : self.adjacency.clone()})
    } // end of with_features


    /// returns a copy of the graph with some edges added
    pub fn with_extra_edges(&self, extra : &[(usize, usize)]) -> Result<Self, anyhow::Error> {
        let mut edges = Vec::<(usize,usize)>::with_capacity(self.adjacency.nnz() + extra.len());
        for i in 0..self.get_nb_nodes() {
            for &j in self.get_neighbours(i) {
                if i < j {
                    edges.push((i,j));
                }
            }
        }
        edges.extend_from_slice(extra);
        AttributedGraph::from_edges(self.features.clone(), &edges)
    } // end of with_extra_edges

} // end of impl AttributedGraph



// adjacency lists (possibly with repetitions) to a binary csr matrix
fn lists_to_csr(nb_nodes : usize, mut neighbours : Vec<Vec<usize>>) -> CsMatI<f64, usize> {
    let mut indptr = Vec::<usize>::with_capacity(nb_nodes + 1);
    let mut indices = Vec::<usize>::new();
    indptr.push(0);
    for list in neighbours.iter_mut() {
        list.sort_unstable();
        list.dedup();
        indices.extend_from_slice(list);
        indptr.push(indices.len());
    }
    let data = vec![1f64; indices.len()];
    CsMatI::<f64, usize>::new((nb_nodes, nb_nodes), indptr, indices, data)
} // end of lists_to_csr


//========================================================================================


#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }


    #[test]
    fn test_symetrization() {
        log_init_test();
        //
        let features = Array2::<f64>::zeros((4, 2));
        // directed, duplicated edge and self loop
        let edges = [(0,1), (1,0), (1,2), (2,2), (3,1), (0,1)];
        let graph = AttributedGraph::from_edges(features, &edges).unwrap();
        assert_eq!(graph.get_nb_nodes(), 4);
        assert_eq!(graph.get_nb_edges(), 3);
        assert_eq!(graph.get_neighbours(1), &[0,2,3]);
        assert!(graph.has_edge(2,1));
        assert!(!graph.has_edge(2,2));
        assert_eq!(graph.get_degree(0), 1);
        let dense = graph.to_dense_adjacency();
        assert_eq!(dense, dense.t());
        assert_eq!(dense.sum(), 6.);
    } // end of test_symetrization


    #[test]
    fn test_from_trimat() {
        log_init_test();
        //
        let mut trimat = TriMatI::<f64, usize>::new((3,3));
        trimat.add_triplet(0, 2, 5.);
        trimat.add_triplet(2, 1, 0.5);
        let graph = AttributedGraph::new(Array2::<f64>::ones((3,4)), &trimat).unwrap();
        // weights are dropped
        assert!(graph.get_adjacency().data().iter().all(|v| *v == 1.));
        assert_eq!(graph.get_neighbours(2), &[0,1]);
        assert_eq!(graph.get_nb_features(), 4);
        // shape mismatch
        assert!(AttributedGraph::new(Array2::<f64>::ones((2,4)), &trimat).is_err());
    } // end of test_from_trimat


    #[test]
    fn test_errors_and_copies() {
        log_init_test();
        //
        assert!(AttributedGraph::from_edges(Array2::<f64>::zeros((0,3)), &[]).is_err());
        assert!(AttributedGraph::from_edges(Array2::<f64>::zeros((2,3)), &[(0,2)]).is_err());
        // isolated nodes are fine
        let graph = AttributedGraph::from_edges(Array2::<f64>::zeros((3,3)), &[]).unwrap();
        assert_eq!(graph.get_nb_edges(), 0);
        assert!(graph.get_neighbours(1).is_empty());
        //
        let bigger = graph.with_extra_edges(&[(0,1), (1,2)]).unwrap();
        assert_eq!(bigger.get_nb_edges(), 2);
        assert_eq!(graph.get_nb_edges(), 0);
        assert!(bigger.with_features(Array2::<f64>::zeros((2,3))).is_err());
        let changed = bigger.with_features(Array2::<f64>::ones((3,5))).unwrap();
        assert_eq!(changed.get_nb_features(), 5);
        assert_eq!(changed.get_nb_edges(), 2);
    } // end of test_errors_and_copies

} // end of mod tests
