//! activations and their derivatives


use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Zip};


pub fn relu(pre : &Array2<f64>) -> Array2<f64> {
    pre.mapv(|v| v.max(0.))
}


/// gradient through relu : d_out where pre > 0, 0 elsewhere
pub fn relu_backward(pre : &Array2<f64>, d_out : &Array2<f64>) -> Array2<f64> {
    assert_eq!(pre.dim(), d_out.dim());
    let mut d_pre = d_out.clone();
    Zip::from(&mut d_pre).and(pre).for_each(|d, &p| if p <= 0. { *d = 0.; });
    d_pre
} // end of relu_backward


/// initial slope of [PRelu] on negative inputs
pub const PRELU_INIT_SLOPE : f64 = 0.25;


/// Parametric relu, x for x > 0 and slope * x elsewhere, with a single learnt slope shared by all units.
#[derive(Clone, Debug)]
pub struct PRelu {
    /// stored as an array of length 1 so that the optimizer sees it as any other parameter
    pub slope : Array1<f64>,
}


impl PRelu {

    pub fn new() -> Self {
        PRelu{slope : Array1::from_elem(1, PRELU_INIT_SLOPE)}
    }

    pub fn get_slope(&self) -> f64 {
        self.slope[0]
    }

    pub fn forward(&self, pre : &Array2<f64>) -> Array2<f64> {
        let slope = self.get_slope();
        pre.mapv(|v| if v > 0. { v } else { slope * v })
    }

    /// returns (gradient on pre-activation, gradient on slope)
    pub fn backward(&self, pre : &Array2<f64>, d_out : &Array2<f64>) -> (Array2<f64>, f64) {
        assert_eq!(pre.dim(), d_out.dim());
        let slope = self.get_slope();
        let mut d_pre = d_out.clone();
        let mut d_slope = 0.;
        Zip::from(&mut d_pre).and(pre).for_each(|d, &p| {
            if p <= 0. {
                d_slope += p * *d;
                *d *= slope;
            }
        });
        (d_pre, d_slope)
    } // end of backward

    pub fn params_mut(&mut self) -> Vec<ArrayViewMutD<f64>> {
        vec![self.slope.view_mut().into_dyn()]
    }

} // end of impl PRelu


impl Default for PRelu {
    fn default() -> Self {
        PRelu::new()
    }
}


/// gradient of a [PRelu] slope, kept as an array to be handed to the optimizer
#[derive(Clone, Debug)]
pub struct PReluGrad {
    pub slope : Array1<f64>,
}


impl PReluGrad {

    pub fn zeros() -> Self {
        PReluGrad{slope : Array1::zeros(1)}
    }

    pub fn add(&mut self, d_slope : f64) {
        self.slope[0] += d_slope;
    }

    pub fn accumulate(&mut self, other : &PReluGrad) {
        self.slope += &other.slope;
    }

    pub fn views(&self) -> Vec<ArrayViewD<f64>> {
        vec![self.slope.view().into_dyn()]
    }

} // end of impl PReluGrad



/// numerically stable logistic function
pub fn sigmoid(x : f64) -> f64 {
    if x >= 0. {
        1. / (1. + (-x).exp())
    }
    else {
        let e = x.exp();
        e / (1. + e)
    }
} // end of sigmoid



#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_relu() {
        let pre = ndarray::arr2(&[[-1., 2.], [0., 3.]]);
        assert_eq!(relu(&pre), ndarray::arr2(&[[0., 2.], [0., 3.]]));
        let d = relu_backward(&pre, &Array2::<f64>::ones((2,2)));
        assert_eq!(d, ndarray::arr2(&[[0., 1.], [0., 1.]]));
    }

    #[test]
    fn test_prelu() {
        let prelu = PRelu::new();
        let pre = ndarray::arr2(&[[-2., 2.], [0., 3.]]);
        assert_eq!(prelu.forward(&pre), ndarray::arr2(&[[-0.5, 2.], [0., 3.]]));
        let d_out = ndarray::arr2(&[[1., 1.], [2., -1.]]);
        let (d_pre, d_slope) = prelu.backward(&pre, &d_out);
        assert_eq!(d_pre, ndarray::arr2(&[[0.25, 1.], [0.5, -1.]]));
        assert_eq!(d_slope, -2.);
    }

    #[test]
    fn test_prelu_slope_finite_difference() {
        // loss = sum of w * prelu(pre)
        let pre = ndarray::arr2(&[[-1.5, 0.7], [-0.2, -3.], [0.4, 1.1]]);
        let w = ndarray::arr2(&[[0.3, -1.], [2., 0.5], [-0.7, 1.2]]);
        let loss = |p : &PRelu, x : &Array2<f64>| (&p.forward(x) * &w).sum();
        let mut prelu = PRelu::new();
        prelu.slope[0] = 0.1;
        let (d_pre, d_slope) = prelu.backward(&pre, &w);
        let eps = 1.0E-6;
        let mut shifted = prelu.clone();
        shifted.slope[0] += eps;
        let fd = (loss(&shifted, &pre) - loss(&prelu, &pre)) / eps;
        assert!((fd - d_slope).abs() < 1.0E-5);
        for (i, j) in [(0, 0), (1, 1), (2, 1)] {
            let mut x = pre.clone();
            x[[i,j]] += eps;
            let fd = (loss(&prelu, &x) - loss(&prelu, &pre)) / eps;
            assert!((fd - d_pre[[i,j]]).abs() < 1.0E-5);
        }
    } // end of test_prelu_slope_finite_difference

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.) - 0.5).abs() < 1.0E-15);
        assert!((sigmoid(2.) + sigmoid(-2.) - 1.).abs() < 1.0E-12);
        assert!(sigmoid(-800.) >= 0.);
        assert!(sigmoid(800.) <= 1.);
    }
}
