//! Weight initialization.
//!
//! - Xavier/Glorot (Glorot & Bengio, 2010).


use ndarray::{Array2};
use rand::distributions::{Uniform, Distribution};
use rand::Rng;


/// Xavier uniform initialization. Samples from U(-a, a) where a = sqrt(6 / (fan_in + fan_out)).
/// Returns an array of shape (fan_in, fan_out)
pub fn xavier_uniform<R : Rng>(fan_in : usize, fan_out : usize, rng : &mut R) -> Array2<f64> {
    assert!(fan_in + fan_out > 0);
    let a = (6.0 / (fan_in + fan_out) as f64).sqrt();
    let uniform = Uniform::<f64>::new_inclusive(-a, a);
    Array2::from_shape_simple_fn((fan_in, fan_out), || uniform.sample(rng))
} // end of xavier_uniform
