//! Adam optimizer (Kingma & Ba, 2015).
//!
//! Parameters and gradients are passed at each step as lists of array views,
//! moments are allocated at first step. The list order must not change between steps.


use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Zip};


#[derive(Debug)]
pub struct Adam {
    lr : f64,
    beta1 : f64,
    beta2 : f64,
    eps : f64,
    /// L2 regularization added to the gradient
    weight_decay : f64,
    /// First moment estimates
    m : Vec<ArrayD<f64>>,
    /// Second moment estimates
    v : Vec<ArrayD<f64>>,
    /// timestep for bias correction
    t : i32,
} // end of struct Adam


impl Adam {

    /// default β₁=0.9, β₂=0.999, ε=1e-8
    pub fn new(lr : f64, weight_decay : f64) -> Self {
        Adam{lr, beta1 : 0.9, beta2 : 0.999, eps : 1.0E-8, weight_decay, m : Vec::new(), v : Vec::new(), t : 0}
    }

    pub fn get_lr(&self) -> f64 {
        self.lr
    }

    /// number of steps done
    pub fn get_nb_steps(&self) -> usize {
        self.t as usize
    }

    pub fn step(&mut self, params : Vec<ArrayViewMutD<f64>>, grads : Vec<ArrayViewD<f64>>) {
        assert_eq!(params.len(), grads.len());
        if self.m.is_empty() {
            self.m = grads.iter().map(|g| ArrayD::<f64>::zeros(g.raw_dim())).collect();
            self.v = grads.iter().map(|g| ArrayD::<f64>::zeros(g.raw_dim())).collect();
        }
        assert_eq!(self.m.len(), params.len());
        self.t += 1;
        let bias_correction1 = 1. - self.beta1.powi(self.t);
        let bias_correction2 = 1. - self.beta2.powi(self.t);
        let (lr, beta1, beta2, eps, weight_decay) = (self.lr, self.beta1, self.beta2, self.eps, self.weight_decay);
        //
        for (idx, (mut param, grad)) in params.into_iter().zip(grads.into_iter()).enumerate() {
            assert_eq!(param.shape(), grad.shape());
            Zip::from(&mut param).and(&grad).and(&mut self.m[idx]).and(&mut self.v[idx]).for_each(|p, &g, m, v| {
                let g = g + weight_decay * *p;
                *m = beta1 * *m + (1. - beta1) * g;
                *v = beta2 * *v + (1. - beta2) * g * g;
                let m_hat = *m / bias_correction1;
                let v_hat = *v / bias_correction2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
        }
    } // end of step

} // end of impl Adam



#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    fn test_adam_first_step() {
        // first step moves each coordinate by lr against the sign of the gradient
        let mut adam = Adam::new(0.1, 0.);
        let mut w = Array2::<f64>::zeros((2,2));
        let mut b = Array1::<f64>::zeros(2);
        let gw = ndarray::arr2(&[[1., -2.], [0.5, -0.1]]);
        let gb = ndarray::arr1(&[3., -3.]);
        adam.step(vec![w.view_mut().into_dyn(), b.view_mut().into_dyn()], vec![gw.view().into_dyn(), gb.view().into_dyn()]);
        assert_eq!(adam.get_nb_steps(), 1);
        assert!((w[[0,0]] + 0.1).abs() < 1.0E-6);
        assert!((w[[0,1]] - 0.1).abs() < 1.0E-6);
        assert!((b[1] - 0.1).abs() < 1.0E-6);
    }

    #[test]
    fn test_adam_minimizes_quadratic() {
        // f(x) = sum (x - 3)^2
        let mut adam = Adam::new(0.1, 0.);
        let mut x = Array1::<f64>::zeros(3);
        for _ in 0..2000 {
            let g = x.mapv(|v| 2. * (v - 3.));
            adam.step(vec![x.view_mut().into_dyn()], vec![g.view().into_dyn()]);
        }
        assert!(x.iter().all(|v| (v - 3.).abs() < 0.1), "x = {:?}", x);
    }
}
