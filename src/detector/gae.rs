//! Graph autoencoder outlier detector.
//!
//! A stack of graph convolutions encodes the nodes into embeddings Z and a second stack decodes them.
//! With nb_layers convolutions in total, the encoder gets nb_layers / 2 of them and the decoder the others.
//! Every convolution is followed by a ReLU and dropout, except the last one of the encoder and the last one of the decoder.
//!
//! The decoder reconstructs either
//! - the node attributes (default) : the decoder output X̂ has one column per feature,
//! - or the structure : the decoder output H gives S = H H^t, or sigmoid(H H^t), compared to the adjacency.
//!
//! The anomaly score of a node is the mean squared error on its row of the reconstruction.
//! Training minimizes the mean score over all nodes, full batch, with Adam.
//! Memory is O(n²) when the structure is reconstructed.


use anyhow::{anyhow};
use serde::{Deserialize, Serialize};

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis, Zip};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use std::time::{SystemTime};
use cpu_time::ProcessTime;

use crate::graph::AttributedGraph;
use crate::nn::{activation::*, adam::Adam, gcn::*};
use crate::tools::renormalize::gcn_normalization;
use crate::tools::spmm::Propagator;
use super::{DetectorParams, DetectorT, FittedScores, check_graph};


/// architecture of the autoencoder
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct GaeParams {
    /// dimension of hidden layers and of the node embedding
    pub hidden_dim : usize,
    /// total number of graph convolutions, encoder and decoder. Must be >= 2
    pub nb_layers : usize,
    /// probability to zero a hidden unit during training, in [0, 1)
    pub dropout : f64,
    /// reconstruct the structure instead of the attributes
    pub recon_s : bool,
    /// apply a sigmoid to the reconstructed structure
    pub sigmoid_s : bool,
} // end of GaeParams


impl GaeParams {

    pub fn new(hidden_dim : usize, nb_layers : usize, dropout : f64, recon_s : bool, sigmoid_s : bool) -> Self {
        GaeParams{hidden_dim, nb_layers, dropout, recon_s, sigmoid_s}
    }

    ///
    pub fn get_hidden_dim(&self) -> usize { self.hidden_dim }

    ///
    pub fn get_nb_layers(&self) -> usize { self.nb_layers }

    /// nb_layers / 2, rounded down
    pub fn get_nb_encoder_layers(&self) -> usize { self.nb_layers / 2 }

    /// convolutions after the embedding. With structure reconstruction the last one is replaced by the dot product.
    pub fn get_nb_decoder_layers(&self) -> usize { self.nb_layers - self.nb_layers / 2 }

    ///
    pub fn get_dropout(&self) -> f64 { self.dropout }

    ///
    pub fn get_recon_s(&self) -> bool { self.recon_s }

    ///
    pub fn get_sigmoid_s(&self) -> bool { self.sigmoid_s }

    pub fn check(&self) -> Result<(), anyhow::Error> {
        if self.hidden_dim == 0 {
            return Err(anyhow!("GaeParams : hidden_dim must be positive"));
        }
        if self.nb_layers < 2 {
            log::error!("GaeParams : need at least 2 layers, one to encode and one to decode, got {}", self.nb_layers);
            return Err(anyhow!("GaeParams : nb_layers must be at least 2"));
        }
        if !(self.dropout >= 0. && self.dropout < 1.) {
            return Err(anyhow!("GaeParams : dropout must be in [0,1), got {}", self.dropout));
        }
        if self.sigmoid_s && !self.recon_s {
            log::warn!("GaeParams : sigmoid_s has no effect without structure reconstruction");
        }
        Ok(())
    } // end of check

} // end of impl GaeParams


impl Default for GaeParams {
    fn default() -> Self {
        GaeParams{hidden_dim : 64, nb_layers : 4, dropout : 0., recon_s : false, sigmoid_s : false}
    }
}

//==========================================================================================


#[derive(Clone, Debug)]
struct GaeModel {
    /// encoder then decoder convolutions
    layers : Vec<GcnLayer>,
    nb_encoder_layers : usize,
    recon_s : bool,
    sigmoid_s : bool,
}


// one convolution of a forward pass
struct LayerPass {
    cache : GcnCache,
    /// dropout mask applied after relu, entries 0 or 1/(1-p)
    mask : Option<Array2<f64>>,
}


// everything computed by a forward pass that backward needs
struct GaeForward {
    layers : Vec<LayerPass>,
    /// node embeddings, output of the last encoder layer
    z : Array2<f64>,
    /// output of the last decoder layer (z if there is none)
    output : Array2<f64>,
    /// reconstructed attributes or structure
    recon : Array2<f64>,
    /// recon - target
    diff : Array2<f64>,
    /// mean over each row of diff²
    errors : Array1<f64>,
}



impl GaeModel {

    fn new(nb_features : usize, params : &GaeParams, rng : &mut Xoshiro256PlusPlus) -> Self {
        let hidden = params.get_hidden_dim();
        let nb_encoder_layers = params.get_nb_encoder_layers();
        let nb_decoder_layers = if params.get_recon_s() { params.get_nb_decoder_layers() - 1 } else { params.get_nb_decoder_layers() };
        let nb_layers = nb_encoder_layers + nb_decoder_layers;
        let mut layers = Vec::<GcnLayer>::with_capacity(nb_layers);
        let mut in_dim = nb_features;
        for l in 0..nb_layers {
            let out_dim = if l == nb_layers - 1 && !params.get_recon_s() { nb_features } else { hidden };
            layers.push(GcnLayer::new(in_dim, out_dim, rng));
            in_dim = out_dim;
        }
        GaeModel{layers, nb_encoder_layers, recon_s : params.get_recon_s(), sigmoid_s : params.get_sigmoid_s()}
    } // end of new


    fn get_nb_features(&self) -> usize {
        self.layers[0].get_in_dim()
    }


    // last encoder and last decoder layers have linear outputs
    fn is_activated(&self, l : usize) -> bool {
        l + 1 != self.nb_encoder_layers && l + 1 != self.layers.len()
    }


    // target is the feature matrix, or the dense adjacency with structure reconstruction.
    // dropout is applied when given a probability and a generator for masks.
    fn forward(&self, prop : Propagator, x : &Array2<f64>, target : &Array2<f64>, mut dropout : Option<(f64, &mut Xoshiro256PlusPlus)>) -> GaeForward {
        let mut layers = Vec::<LayerPass>::with_capacity(self.layers.len());
        let mut h = x.clone();
        let mut z = None;
        for (l, layer) in self.layers.iter().enumerate() {
            let cache = layer.forward(prop, &h);
            let mut mask = None;
            if self.is_activated(l) {
                h = relu(&cache.pre);
                if let Some((p, rng)) = dropout.as_mut() {
                    if *p > 0. {
                        let keep = 1. / (1. - *p);
                        let m = Array2::<f64>::from_shape_fn(h.dim(), |_| if rng.gen::<f64>() < *p { 0. } else { keep });
                        h *= &m;
                        mask = Some(m);
                    }
                }
            }
            else {
                h = cache.pre.clone();
            }
            layers.push(LayerPass{cache, mask});
            if l + 1 == self.nb_encoder_layers {
                z = Some(h.clone());
            }
        }
        let output = h;
        let z = z.unwrap_or_else(|| output.clone());
        let recon = if self.recon_s {
            let product = output.dot(&output.t());
            if self.sigmoid_s { product.mapv(sigmoid) } else { product }
        }
        else {
            output.clone()
        };
        assert_eq!(recon.dim(), target.dim());
        let diff = &recon - target;
        let errors = diff.map_axis(Axis(1), |row| row.dot(&row) / row.len() as f64);
        GaeForward{layers, z, output, recon, diff, errors}
    } // end of forward


    // gradient of the mean error. Returns gradients in the order of params_mut
    fn backward(&self, prop : Propagator, pass : &GaeForward) -> Vec<LayerGrad> {
        let (nb_rows, nb_cols) = pass.diff.dim();
        let d_recon = &pass.diff * (2. / (nb_rows * nb_cols) as f64);
        let mut d_out = if self.recon_s {
            let mut d_product = d_recon;
            if self.sigmoid_s {
                Zip::from(&mut d_product).and(&pass.recon).for_each(|d, &s| *d *= s * (1. - s));
            }
            (&d_product + &d_product.t()).dot(&pass.output)
        }
        else {
            d_recon
        };
        // last layer first
        let mut grads = Vec::<LayerGrad>::with_capacity(self.layers.len());
        for (l, (layer, lpass)) in self.layers.iter().zip(pass.layers.iter()).enumerate().rev() {
            let d_pre = if self.is_activated(l) {
                if let Some(mask) = &lpass.mask {
                    d_out *= mask;
                }
                relu_backward(&lpass.cache.pre, &d_out)
            }
            else {
                d_out
            };
            let (grad, d_in) = layer.backward(prop, &lpass.cache, &d_pre);
            grads.push(grad);
            d_out = d_in;
        }
        grads.reverse();
        grads
    } // end of backward


    fn params_mut(&mut self) -> Vec<ArrayViewMutD<f64>> {
        let mut params = Vec::<ArrayViewMutD<f64>>::with_capacity(2 * self.layers.len());
        for layer in self.layers.iter_mut() {
            params.extend(layer.params_mut());
        }
        params
    }

} // end of impl GaeModel

//==========================================================================================


/// The graph autoencoder detector
pub struct Gae {
    params : DetectorParams,
    gae_params : GaeParams,
    model : Option<GaeModel>,
    fitted : Option<FittedScores>,
    loss_history : Vec<f64>,
} // end of struct Gae



impl Gae {

    pub fn new(params : DetectorParams, gae_params : GaeParams) -> Self {
        Gae{params, gae_params, model : None, fitted : None, loss_history : Vec::new()}
    }

    pub fn get_params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn get_gae_params(&self) -> &GaeParams {
        &self.gae_params
    }

    // fitted model after checking the graph matches it
    fn get_model(&self, graph : &AttributedGraph) -> Result<&GaeModel, anyhow::Error> {
        let model = match &self.model {
            Some(model) => model,
            None => { return Err(anyhow!("Gae model not fitted")); },
        };
        check_graph(graph, Some(model.get_nb_features()))?;
        Ok(model)
    }

    // what the decoder must reconstruct
    fn get_target(&self, graph : &AttributedGraph) -> Array2<f64> {
        if self.gae_params.get_recon_s() { graph.to_dense_adjacency() } else { graph.get_features().clone() }
    }

    /// node embeddings (n, hidden_dim) given by the encoder of a fitted model
    pub fn embed(&self, graph : &AttributedGraph) -> Result<Array2<f64>, anyhow::Error> {
        let model = self.get_model(graph)?;
        let norm_adj = gcn_normalization(graph.get_adjacency());
        let target = self.get_target(graph);
        let pass = model.forward(Propagator::Sparse(&norm_adj), graph.get_features(), &target, None);
        Ok(pass.z)
    } // end of embed

} // end of impl Gae



impl DetectorT for Gae {

    fn fit(&mut self, graph : &AttributedGraph) -> Result<(), anyhow::Error> {
        self.params.check()?;
        self.gae_params.check()?;
        check_graph(graph, None)?;
        //
        let cpu_start = ProcessTime::now();
        let sys_now = SystemTime::now();
        log::info!("Gae::fit nb nodes : {}, nb features : {}, params : {:?} {:?}", graph.get_nb_nodes(), graph.get_nb_features(), self.params, self.gae_params);
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.get_seed());
        let mut model = GaeModel::new(graph.get_nb_features(), &self.gae_params, &mut rng);
        let norm_adj = gcn_normalization(graph.get_adjacency());
        let prop = Propagator::Sparse(&norm_adj);
        let target = self.get_target(graph);
        let dropout = self.gae_params.get_dropout();
        let mut adam = Adam::new(self.params.get_lr(), self.params.get_weight_decay());
        //
        self.loss_history.clear();
        for epoch in 0..self.params.get_epochs() {
            let pass = model.forward(prop, graph.get_features(), &target, Some((dropout, &mut rng)));
            let loss = pass.errors.mean().unwrap_or(0.);
            if !loss.is_finite() {
                log::error!("Gae::fit loss not finite at epoch {}", epoch);
                return Err(anyhow!("Gae training diverged"));
            }
            let grads = model.backward(prop, &pass);
            let grad_views : Vec<ArrayViewD<f64>> = grads.iter().flat_map(|g| g.views()).collect();
            adam.step(model.params_mut(), grad_views);
            log::debug!("Gae epoch {} loss {:.5e}", epoch, loss);
            self.loss_history.push(loss);
        }
        self.model = Some(model);
        //
        let scores = self.decision_function(graph)?;
        let fitted = FittedScores::new(scores, self.params.get_contamination());
        log::info!("Gae::fit done, threshold : {:.5e}, nb outliers : {}", fitted.threshold, fitted.get_nb_outliers());
        log::info!("Gae::fit sys time(s) {:.2e} cpu time(s) {:.2e}", sys_now.elapsed().unwrap_or_default().as_secs_f64(), cpu_start.elapsed().as_secs_f64());
        self.fitted = Some(fitted);
        Ok(())
    } // end of fit


    /// per node mean squared reconstruction error, without dropout
    fn decision_function(&self, graph : &AttributedGraph) -> Result<Array1<f64>, anyhow::Error> {
        let model = self.get_model(graph)?;
        let norm_adj = gcn_normalization(graph.get_adjacency());
        let target = self.get_target(graph);
        let pass = model.forward(Propagator::Sparse(&norm_adj), graph.get_features(), &target, None);
        Ok(pass.errors)
    } // end of decision_function


    fn get_fitted(&self) -> Option<&FittedScores> {
        self.fitted.as_ref()
    }

    fn get_loss_history(&self) -> &[f64] {
        &self.loss_history
    }

} // end of impl DetectorT for Gae



// end of mod tests
