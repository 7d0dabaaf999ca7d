//! Neural network building blocks with hand written backward passes.
//!
//! Only what the detectors need : graph convolution, subgraph readouts, bilinear discriminator,
//! relu/prelu/sigmoid, weighted binary cross entropy, Xavier initialization and Adam.

pub mod activation;
pub mod adam;
pub mod bilinear;
pub mod gcn;
pub mod init;
pub mod loss;
pub mod readout;
