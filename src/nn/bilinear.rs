//! Bilinear discriminator : score(h, c) = h^T W c + b


use ndarray::{Array1, Array2, ArrayView1, ArrayViewD, ArrayViewMutD};
use rand::Rng;

use super::init::xavier_uniform;


#[derive(Clone, Debug)]
pub struct Bilinear {
    /// (dim, dim)
    pub weight : Array2<f64>,
    /// a single value
    pub bias : Array1<f64>,
}


/// gradient of a bilinear score
#[derive(Clone, Debug)]
pub struct BilinearGrad {
    pub weight : Array2<f64>,
    pub bias : Array1<f64>,
}

impl BilinearGrad {

    pub fn zeros(dim : usize) -> Self {
        BilinearGrad{weight : Array2::zeros((dim, dim)), bias : Array1::zeros(1)}
    }

    pub fn accumulate(&mut self, other : &BilinearGrad) {
        self.weight += &other.weight;
        self.bias += &other.bias;
    }

    /// views in the order of [Bilinear::params_mut]
    pub fn views(&self) -> Vec<ArrayViewD<f64>> {
        vec![self.weight.view().into_dyn(), self.bias.view().into_dyn()]
    }
} // end of impl BilinearGrad



impl Bilinear {

    pub fn new<R : Rng>(dim : usize, rng : &mut R) -> Self {
        Bilinear{weight : xavier_uniform(dim, dim, rng), bias : Array1::zeros(1)}
    }

    /// parameters as a list of mutable views for the optimizer
    pub fn params_mut(&mut self) -> Vec<ArrayViewMutD<f64>> {
        vec![self.weight.view_mut().into_dyn(), self.bias.view_mut().into_dyn()]
    }

    pub fn get_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn score(&self, h : ArrayView1<f64>, c : ArrayView1<f64>) -> f64 {
        h.dot(&self.weight.dot(&c)) + self.bias[0]
    }

    /// Accumulates into grad the gradient of d_score * score(h,c) with respect to parameters,
    /// returns gradients with respect to h and c.
    pub fn backward(&self, h : ArrayView1<f64>, c : ArrayView1<f64>, d_score : f64, grad : &mut BilinearGrad) -> (Array1<f64>, Array1<f64>) {
        let dim = self.get_dim();
        for i in 0..dim {
            for j in 0..dim {
                grad.weight[[i,j]] += d_score * h[i] * c[j];
            }
        }
        grad.bias[0] += d_score;
        let d_h = self.weight.dot(&c) * d_score;
        let d_c = self.weight.t().dot(&h) * d_score;
        (d_h, d_c)
    } // end of backward

} // end of impl Bilinear
