//! Propagation of node signals along a normalized adjacency.
//!
//! The normalized adjacency used by graph convolution is symetric, so the operator
//! computing Â X is also the one needed to backpropagate through it.


use ndarray::{Array2, Axis};
use sprs::{CsMatI, prod};

use rayon::prelude::*;


/// A normalized adjacency, sparse for the whole graph or dense for small sampled subgraphs.
#[derive(Copy, Clone)]
pub enum Propagator<'a> {
    Sparse(&'a CsMatI<f64, usize>),
    Dense(&'a Array2<f64>),
}


impl <'a> Propagator<'a> {

    /// number of nodes the operator acts on
    pub fn get_nb_nodes(&self) -> usize {
        match self {
            Propagator::Sparse(csmat) => csmat.rows(),
            Propagator::Dense(mat) => mat.nrows(),
        }
    }

    /// computes Â x
    pub fn propagate(&self, x : &Array2<f64>) -> Array2<f64> {
        assert_eq!(self.get_nb_nodes(), x.nrows());
        match self {
            Propagator::Sparse(csmat) => csr_dense_product(csmat, x),
            Propagator::Dense(mat) => mat.dot(x),
        }
    }
} // end of impl Propagator



/// rows of a block handed to one rayon task
const ROW_BLOCK : usize = 256;


/// product of a csr matrix by a dense matrix. Blocks of rows are computed in parallel,
/// each by the sprs csr x dense kernel on a row slice of csmat.
pub fn csr_dense_product(csmat : &CsMatI<f64, usize>, x : &Array2<f64>) -> Array2<f64> {
    assert!(csmat.is_csr());
    assert_eq!(csmat.cols(), x.nrows());
    //
    let mut res = Array2::<f64>::zeros((csmat.rows(), x.ncols()));
    if csmat.rows() <= ROW_BLOCK {
        prod::csr_mulacc_dense_rowmaj(csmat.view(), x.view(), res.view_mut());
        return res;
    }
    res.axis_chunks_iter_mut(Axis(0), ROW_BLOCK).into_par_iter().enumerate().for_each(|(b, mut block)| {
        let first = b * ROW_BLOCK;
        let last = first + block.nrows();
        prod::csr_mulacc_dense_rowmaj(csmat.slice_outer(first..last), x.view(), block.view_mut());
    });
    res
} // end of csr_dense_product
