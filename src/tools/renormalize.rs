//! normalization of adjacency matrices before graph convolution


use ndarray::{Array2};
use sprs::{CsMatI};



/// Computes the symetric normalization used in graph convolution : D^-1/2 (A + I) D^-1/2
/// where D is the (diagonal) degree matrix of A + I.
/// Existing diagonal terms of A are replaced by 1.
pub fn gcn_normalization(csr_mat : &CsMatI<f64, usize>) -> CsMatI<f64, usize> {
    //
    assert!(csr_mat.is_csr());
    let (nb_row, nb_col) = csr_mat.shape();
    assert_eq!(nb_row, nb_col);
    // self loop augmented rows, sorted column indices.
    let mut indptr = Vec::<usize>::with_capacity(nb_row + 1);
    let mut indices = Vec::<usize>::with_capacity(csr_mat.nnz() + nb_row);
    let mut data = Vec::<f64>::with_capacity(csr_mat.nnz() + nb_row);
    indptr.push(0);
    for i in 0..nb_row {
        let range_i = csr_mat.indptr().outer_inds_sz(i);
        let mut diag_done = false;
        for k in range_i {
            let j = csr_mat.indices()[k];
            if j == i {
                continue;
            }
            if j > i && !diag_done {
                indices.push(i);
                data.push(1.);
                diag_done = true;
            }
            indices.push(j);
            data.push(csr_mat.data()[k]);
        }
        if !diag_done {
            indices.push(i);
            data.push(1.);
        }
        indptr.push(indices.len());
    }
    // degrees of A + I
    let mut inv_sqrt_deg = vec![0f64; nb_row];
    for i in 0..nb_row {
        let deg : f64 = data[indptr[i]..indptr[i+1]].iter().sum();
        if deg > 0. {
            inv_sqrt_deg[i] = 1. / deg.sqrt();
        }
    }
    for i in 0..nb_row {
        for k in indptr[i]..indptr[i+1] {
            data[k] *= inv_sqrt_deg[i] * inv_sqrt_deg[indices[k]];
        }
    }
    CsMatI::<f64, usize>::new((nb_row, nb_col), indptr, indices, data)
} // end of gcn_normalization



/// Same as [gcn_normalization] for a small dense matrix where only some slots are valid.
/// Self loops are added on valid slots only. Invalid slots (padding) get null rows and columns.
pub fn dense_gcn_normalization(mat : &Array2<f64>, valid : &[bool]) -> Array2<f64> {
    let (nb_row, nb_col) = mat.dim();
    assert_eq!(nb_row, nb_col);
    assert_eq!(nb_row, valid.len());
    //
    let mut augmented = Array2::<f64>::zeros((nb_row, nb_col));
    for i in 0..nb_row {
        if !valid[i] {
            continue;
        }
        for j in 0..nb_col {
            if valid[j] {
                augmented[[i,j]] = if i == j { 1. } else { mat[[i,j]] };
            }
        }
    }
    let inv_sqrt_deg : Vec<f64> = augmented.rows().into_iter().map(|row| {
            let deg = row.sum();
            if deg > 0. { 1. / deg.sqrt() } else { 0. }
        }).collect();
    for ((i,j), v) in augmented.indexed_iter_mut() {
        *v *= inv_sqrt_deg[i] * inv_sqrt_deg[j];
    }
    augmented
} // end of dense_gcn_normalization


//===============================================================


// end of mod tests
