//! Graph convolution layer (Kipf & Welling, 2017) with its backward pass.
//!
//! forward : pre = Â X W + b  where Â is the symetric normalized adjacency D^-1/2 (A + I) D^-1/2.
//! The activation is applied by the caller so that layers can be stacked with or without it.


use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;

use crate::tools::spmm::Propagator;
use super::init::xavier_uniform;


/// Gradient of a layer with respect to its parameters
#[derive(Clone, Debug)]
pub struct LayerGrad {
    pub weight : Array2<f64>,
    pub bias : Array1<f64>,
}

impl LayerGrad {

    pub fn zeros(in_dim : usize, out_dim : usize) -> Self {
        LayerGrad{weight : Array2::zeros((in_dim, out_dim)), bias : Array1::zeros(out_dim)}
    }

    /// accumulate another gradient into self
    pub fn accumulate(&mut self, other : &LayerGrad) {
        self.weight += &other.weight;
        self.bias += &other.bias;
    }

    /// views in the order of [GcnLayer::params_mut]
    pub fn views(&self) -> Vec<ArrayViewD<f64>> {
        vec![self.weight.view().into_dyn(), self.bias.view().into_dyn()]
    }
} // end of impl LayerGrad


/// values computed in forward and needed by backward
pub struct GcnCache {
    /// Â X
    pub aggregated : Array2<f64>,
    /// Â X W + b
    pub pre : Array2<f64>,
}


#[derive(Clone, Debug)]
pub struct GcnLayer {
    /// (in_dim, out_dim)
    pub weight : Array2<f64>,
    /// out_dim
    pub bias : Array1<f64>,
}


impl GcnLayer {

    /// Xavier initialized weights, null bias
    pub fn new<R : Rng>(in_dim : usize, out_dim : usize, rng : &mut R) -> Self {
        GcnLayer{weight : xavier_uniform(in_dim, out_dim, rng), bias : Array1::zeros(out_dim)}
    }

    pub fn get_in_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn get_out_dim(&self) -> usize {
        self.weight.ncols()
    }

    /// parameters as a list of mutable views for the optimizer
    pub fn params_mut(&mut self) -> Vec<ArrayViewMutD<f64>> {
        vec![self.weight.view_mut().into_dyn(), self.bias.view_mut().into_dyn()]
    }

    pub fn forward(&self, prop : Propagator, x : &Array2<f64>) -> GcnCache {
        assert_eq!(x.ncols(), self.get_in_dim());
        let aggregated = prop.propagate(x);
        let pre = aggregated.dot(&self.weight) + &self.bias;
        GcnCache{aggregated, pre}
    } // end of forward


    /// given d_pre the gradient of loss with respect to pre-activation output, returns the gradient
    /// on parameters and the gradient with respect to the input x.
    pub fn backward(&self, prop : Propagator, cache : &GcnCache, d_pre : &Array2<f64>) -> (LayerGrad, Array2<f64>) {
        assert_eq!(d_pre.dim(), cache.pre.dim());
        let weight = cache.aggregated.t().dot(d_pre);
        let bias = d_pre.sum_axis(Axis(0));
        // Â is symetric
        let d_x = prop.propagate(&d_pre.dot(&self.weight.t()));
        (LayerGrad{weight, bias}, d_x)
    } // end of backward

} // end of impl GcnLayer



#[cfg(test)]
mod tests {

    use super::*;
    use crate::tools::renormalize::dense_gcn_normalization;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use rand_xoshiro::rand_core::SeedableRng;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // loss = sum of pre * coeffs, its gradient w.r.t pre is coeffs
    fn linear_loss(layer : &GcnLayer, prop : Propagator, x : &Array2<f64>, coeffs : &Array2<f64>) -> f64 {
        (layer.forward(prop, x).pre * coeffs).sum()
    }

    #[test]
    fn test_gcn_gradient_finite_difference() {
        log_init_test();
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1234);
        let mut adj = Array2::<f64>::zeros((3,3));
        adj[[0,1]] = 1.; adj[[1,0]] = 1.; adj[[1,2]] = 1.; adj[[2,1]] = 1.;
        let norm = dense_gcn_normalization(&adj, &[true; 3]);
        let prop = Propagator::Dense(&norm);
        let x = ndarray::arr2(&[[1., -2.], [0.5, 3.], [2., 1.]]);
        let coeffs = ndarray::arr2(&[[1., 0., -1.], [2., 1., 0.5], [-1., 1., 1.]]);
        let mut layer = GcnLayer::new(2, 3, &mut rng);
        layer.bias = ndarray::arr1(&[0.1, -0.2, 0.3]);
        //
        let cache = layer.forward(prop, &x);
        let (grad, d_x) = layer.backward(prop, &cache, &coeffs);
        let eps = 1.0E-6;
        // weights
        for i in 0..2 {
            for j in 0..3 {
                let mut shifted = layer.clone();
                shifted.weight[[i,j]] += eps;
                let fd = (linear_loss(&shifted, prop, &x, &coeffs) - linear_loss(&layer, prop, &x, &coeffs)) / eps;
                assert!((fd - grad.weight[[i,j]]).abs() < 1.0E-4, "weight ({},{}) fd {} grad {}", i, j, fd, grad.weight[[i,j]]);
            }
        }
        // bias
        assert_eq!(grad.bias.to_vec(), vec![2., 2., 0.5]);
        // input
        for i in 0..3 {
            for j in 0..2 {
                let mut x_shifted = x.clone();
                x_shifted[[i,j]] += eps;
                let fd = (linear_loss(&layer, prop, &x_shifted, &coeffs) - linear_loss(&layer, prop, &x, &coeffs)) / eps;
                assert!((fd - d_x[[i,j]]).abs() < 1.0E-4);
            }
        }
    } // end of test_gcn_gradient_finite_difference


    #[test]
    fn test_accumulate() {
        let mut g = LayerGrad::zeros(2, 2);
        let other = LayerGrad{weight : Array2::ones((2,2)), bias : Array1::ones(2)};
        g.accumulate(&other);
        g.accumulate(&other);
        assert_eq!(g.weight.sum(), 8.);
        assert_eq!(g.bias.sum(), 4.);
    }
}
