//! Contrastive self-supervised outlier detector.
//!
//! Based on the paper :
//!     *Anomaly Detection on Attributed Networks via Contrastive Self-Supervised Learning*
//!     Y. Liu, Z. Li, S. Pan, C. Gong, C. Zhou, G. Karypis. IEEE TNNLS 2021
//!
//! For each target node a small subgraph is sampled by random walk with restart and laid out as described
//! in [crate::sampling::subgraph]. A graph convolution followed by a PReLU encodes the subgraph, the readout
//! (see [Readout]) summarizes it and the embedding of the isolated copy of the target represents the node.
//! A bilinear discriminator learns to score high the pair (node, own readout) and low the pairs
//! (node, readout of another node of the minibatch), the other node being chosen by cyclic shift.
//! Positive pairs are weighted by the number of negatives in the binary cross entropy.
//!
//! A normal node agrees with its neighbourhood so its positive pair scores high and its negative pairs low.
//! The anomaly score, averaged on several sampling rounds, is mean_k sigmoid(neg_k) - sigmoid(pos).


use anyhow::{anyhow};
use serde::{Deserialize, Serialize};

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use rayon::prelude::*;

use std::time::{SystemTime};
use cpu_time::ProcessTime;

use crate::graph::AttributedGraph;
use crate::nn::{activation::*, adam::Adam, bilinear::*, gcn::*, loss::*, readout::*};
use crate::sampling::{WalkParams, SubgraphTensors, assemble_batch, minibatches, negative_shift, sample_subgraphs};
use crate::tools::spmm::Propagator;
use super::{DetectorParams, DetectorT, FittedScores, check_graph};


/// parameters of the contrastive detector
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ColaParams {
    /// dimension of node embedding
    pub hidden_dim : usize,
    /// number of target nodes in a minibatch, 0 for the whole graph. 1 is rejected, a node cannot be paired in its batch
    pub batch_size : usize,
    /// number of negative pairs for each positive pair
    pub negative_ratio : usize,
    /// number of sampling rounds averaged for scoring
    pub test_rounds : usize,
    /// subgraph sampling
    pub walk : WalkParams,
    /// summary of a subgraph
    pub readout : Readout,
} // end of ColaParams


impl ColaParams {

    /// parameters with an average readout, see [with_readout](Self::with_readout)
    pub fn new(hidden_dim : usize, batch_size : usize, negative_ratio : usize, test_rounds : usize, walk : WalkParams) -> Self {
        ColaParams{hidden_dim, batch_size, negative_ratio, test_rounds, walk, readout : Readout::Avg}
    }

    pub fn with_readout(self, readout : Readout) -> Self {
        ColaParams{readout, ..self}
    }

    ///
    pub fn get_hidden_dim(&self) -> usize { self.hidden_dim }

    ///
    pub fn get_batch_size(&self) -> usize { self.batch_size }

    ///
    pub fn get_negative_ratio(&self) -> usize { self.negative_ratio }

    ///
    pub fn get_test_rounds(&self) -> usize { self.test_rounds }

    ///
    pub fn get_walk_params(&self) -> &WalkParams { &self.walk }

    ///
    pub fn get_readout(&self) -> Readout { self.readout }

    pub fn check(&self) -> Result<(), anyhow::Error> {
        if self.hidden_dim == 0 {
            return Err(anyhow!("ColaParams : hidden_dim must be positive"));
        }
        if self.batch_size == 1 {
            log::error!("ColaParams : batch_size 1 leaves no node to build negative pairs, use 0 or at least 2");
            return Err(anyhow!("ColaParams : batch_size must be 0 or at least 2"));
        }
        if self.negative_ratio == 0 || self.test_rounds == 0 {
            return Err(anyhow!("ColaParams : negative_ratio and test_rounds must be positive"));
        }
        self.walk.check()
    } // end of check

} // end of impl ColaParams


impl Default for ColaParams {
    fn default() -> Self {
        ColaParams{hidden_dim : 64, batch_size : 0, negative_ratio : 1, test_rounds : 64, walk : WalkParams::default(), readout : Readout::Avg}
    }
}

//==========================================================================================


#[derive(Clone, Debug)]
struct ColaModel {
    encoder : GcnLayer,
    activation : PRelu,
    readout : Readout,
    discriminator : Bilinear,
}


// encoder pass on one subgraph
struct SubgraphForward {
    cache : GcnCache,
    /// activated encoder output
    h : Array2<f64>,
    readout_cache : ReadoutCache,
    readout : Array1<f64>,
    embedding : Array1<f64>,
}


// gradients in the order of ColaModel::params_mut
struct ColaGrad {
    encoder : LayerGrad,
    activation : PReluGrad,
    discriminator : BilinearGrad,
}

impl ColaGrad {
    fn views(&self) -> Vec<ArrayViewD<f64>> {
        let mut views = self.encoder.views();
        views.extend(self.activation.views());
        views.extend(self.discriminator.views());
        views
    }
}


// logits of a batch : positives first, then for each k in 1..=ratio the k-th negative of each element
struct BatchLogits {
    logits : Vec<f64>,
    labels : Vec<f64>,
    /// (element, element providing the readout)
    pairs : Vec<(usize, usize)>,
}


impl ColaModel {

    fn new(nb_features : usize, params : &ColaParams, rng : &mut Xoshiro256PlusPlus) -> Self {
        let encoder = GcnLayer::new(nb_features, params.get_hidden_dim(), rng);
        let discriminator = Bilinear::new(params.get_hidden_dim(), rng);
        ColaModel{encoder, activation : PRelu::new(), readout : params.get_readout(), discriminator}
    }


    fn forward_subgraph(&self, tensors : &SubgraphTensors) -> SubgraphForward {
        let cache = self.encoder.forward(Propagator::Dense(&tensors.adjacency), &tensors.features);
        let h = self.activation.forward(&cache.pre);
        // the anonymized target is always in the mask
        let (readout, readout_cache) = self.readout.forward(&h, &tensors.readout_mask, tensors.get_anonymized_slot());
        let embedding = h.row(tensors.get_target_slot()).to_owned();
        SubgraphForward{cache, h, readout_cache, readout, embedding}
    } // end of forward_subgraph


    fn batch_logits(&self, forwards : &[SubgraphForward], negative_ratio : usize) -> BatchLogits {
        let batch_len = forwards.len();
        let mut pairs = Vec::<(usize,usize)>::with_capacity(batch_len * (1 + negative_ratio));
        let mut labels = Vec::<f64>::with_capacity(batch_len * (1 + negative_ratio));
        for i in 0..batch_len {
            pairs.push((i, i));
            labels.push(1.);
        }
        for k in 1..=negative_ratio {
            let shift = negative_shift(batch_len, k);
            for i in 0..batch_len {
                pairs.push((i, (i + shift) % batch_len));
                labels.push(0.);
            }
        }
        let logits = pairs.iter().map(|&(i, j)| self.discriminator.score(forwards[i].embedding.view(), forwards[j].readout.view())).collect();
        BatchLogits{logits, labels, pairs}
    } // end of batch_logits


    // gradients of the loss given gradients on logits, in the order of params_mut
    fn backward(&self, tensors : &[SubgraphTensors], forwards : &[SubgraphForward], logits : &BatchLogits, d_logits : &[f64]) -> ColaGrad {
        let batch_len = forwards.len();
        let dim = self.discriminator.get_dim();
        let mut disc_grad = BilinearGrad::zeros(dim);
        let mut d_embedding = Array2::<f64>::zeros((batch_len, dim));
        let mut d_readout = Array2::<f64>::zeros((batch_len, dim));
        for (&(i, j), &d) in logits.pairs.iter().zip(d_logits.iter()) {
            let (d_h, d_c) = self.discriminator.backward(forwards[i].embedding.view(), forwards[j].readout.view(), d, &mut disc_grad);
            d_embedding.row_mut(i).scaled_add(1., &d_h);
            d_readout.row_mut(j).scaled_add(1., &d_c);
        }
        // back into each subgraph encoder pass
        let in_dim = self.encoder.get_in_dim();
        let (encoder_grad, activation_grad) = (0..batch_len).into_par_iter().map(|i| {
                let t = &tensors[i];
                let f = &forwards[i];
                let mut d_h = self.readout.backward(&f.h, t.get_anonymized_slot(), &f.readout_cache, d_readout.row(i));
                d_h.row_mut(t.get_target_slot()).scaled_add(1., &d_embedding.row(i));
                let (d_pre, d_slope) = self.activation.backward(&f.cache.pre, &d_h);
                let (grad, _) = self.encoder.backward(Propagator::Dense(&t.adjacency), &f.cache, &d_pre);
                let mut slope_grad = PReluGrad::zeros();
                slope_grad.add(d_slope);
                (grad, slope_grad)
            }).reduce(|| (LayerGrad::zeros(in_dim, dim), PReluGrad::zeros()),
                |(mut acc, mut acc_slope), (g, g_slope)| { acc.accumulate(&g); acc_slope.accumulate(&g_slope); (acc, acc_slope) });
        ColaGrad{encoder : encoder_grad, activation : activation_grad, discriminator : disc_grad}
    } // end of backward


    fn params_mut(&mut self) -> Vec<ArrayViewMutD<f64>> {
        let mut params = self.encoder.params_mut();
        params.extend(self.activation.params_mut());
        params.extend(self.discriminator.params_mut());
        params
    }


    // per element score of a batch : mean_k sigmoid(neg_k) - sigmoid(pos)
    fn batch_scores(&self, forwards : &[SubgraphForward], negative_ratio : usize) -> Vec<f64> {
        let batch_len = forwards.len();
        let logits = self.batch_logits(forwards, negative_ratio);
        (0..batch_len).map(|i| {
                let pos = sigmoid(logits.logits[i]);
                let neg : f64 = (1..=negative_ratio).map(|k| sigmoid(logits.logits[k * batch_len + i])).sum::<f64>() / negative_ratio as f64;
                neg - pos
            }).collect()
    } // end of batch_scores

} // end of impl ColaModel

//==========================================================================================


/// The contrastive detector
pub struct Cola {
    params : DetectorParams,
    cola_params : ColaParams,
    model : Option<ColaModel>,
    fitted : Option<FittedScores>,
    loss_history : Vec<f64>,
} // end of struct Cola


impl Cola {

    pub fn new(params : DetectorParams, cola_params : ColaParams) -> Self {
        Cola{params, cola_params, model : None, fitted : None, loss_history : Vec::new()}
    }

    pub fn get_params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn get_cola_params(&self) -> &ColaParams {
        &self.cola_params
    }

} // end of impl Cola



impl DetectorT for Cola {

    fn fit(&mut self, graph : &AttributedGraph) -> Result<(), anyhow::Error> {
        self.params.check()?;
        self.cola_params.check()?;
        check_graph(graph, None)?;
        //
        let cpu_start = ProcessTime::now();
        let sys_now = SystemTime::now();
        log::info!("Cola::fit nb nodes : {}, nb features : {}, params : {:?} {:?}", graph.get_nb_nodes(), graph.get_nb_features(), self.params, self.cola_params);
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.get_seed());
        let mut model = ColaModel::new(graph.get_nb_features(), &self.cola_params, &mut rng);
        let mut adam = Adam::new(self.params.get_lr(), self.params.get_weight_decay());
        let walk = self.cola_params.get_walk_params();
        let size = walk.get_subgraph_size();
        let ratio = self.cola_params.get_negative_ratio();
        let pos_weight = ratio as f64;
        //
        self.loss_history.clear();
        for epoch in 0..self.params.get_epochs() {
            let batches = minibatches(graph.get_nb_nodes(), self.cola_params.get_batch_size(), true, &mut rng);
            let mut epoch_loss = 0.;
            for batch in &batches {
                let subgraphs = sample_subgraphs(graph, batch, walk, &mut rng);
                let tensors = assemble_batch(graph, &subgraphs, size);
                let forwards : Vec<SubgraphForward> = tensors.par_iter().map(|t| model.forward_subgraph(t)).collect();
                let logits = model.batch_logits(&forwards, ratio);
                let loss = bce_with_logits(&logits.logits, &logits.labels, pos_weight);
                if !loss.is_finite() {
                    log::error!("Cola::fit loss not finite at epoch {}", epoch);
                    return Err(anyhow!("Cola training diverged"));
                }
                let d_logits = bce_with_logits_grad(&logits.logits, &logits.labels, pos_weight);
                let grad = model.backward(&tensors, &forwards, &logits, &d_logits);
                adam.step(model.params_mut(), grad.views());
                epoch_loss += loss * batch.len() as f64;
            }
            let epoch_loss = epoch_loss / graph.get_nb_nodes() as f64;
            log::debug!("Cola epoch {} loss {:.5e}", epoch, epoch_loss);
            self.loss_history.push(epoch_loss);
        }
        self.model = Some(model);
        //
        let scores = self.decision_function(graph)?;
        let fitted = FittedScores::new(scores, self.params.get_contamination());
        log::info!("Cola::fit done, threshold : {:.5e}, nb outliers : {}", fitted.threshold, fitted.get_nb_outliers());
        log::info!("Cola::fit sys time(s) {:.2e} cpu time(s) {:.2e}", sys_now.elapsed().unwrap_or_default().as_secs_f64(), cpu_start.elapsed().as_secs_f64());
        self.fitted = Some(fitted);
        Ok(())
    } // end of fit


    fn decision_function(&self, graph : &AttributedGraph) -> Result<Array1<f64>, anyhow::Error> {
        let model = match &self.model {
            Some(model) => model,
            None => { return Err(anyhow!("Cola::decision_function model not fitted")); },
        };
        check_graph(graph, Some(model.encoder.get_in_dim()))?;
        //
        // scoring stream is shifted away from the training stream
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.get_seed());
        rng.jump();
        let walk = self.cola_params.get_walk_params();
        let size = walk.get_subgraph_size();
        let ratio = self.cola_params.get_negative_ratio();
        let nb_rounds = self.cola_params.get_test_rounds();
        let mut scores = Array1::<f64>::zeros(graph.get_nb_nodes());
        for round in 0..nb_rounds {
            let batches = minibatches(graph.get_nb_nodes(), self.cola_params.get_batch_size(), true, &mut rng);
            for batch in &batches {
                let subgraphs = sample_subgraphs(graph, batch, walk, &mut rng);
                let tensors = assemble_batch(graph, &subgraphs, size);
                let forwards : Vec<SubgraphForward> = tensors.par_iter().map(|t| model.forward_subgraph(t)).collect();
                let batch_scores = model.batch_scores(&forwards, ratio);
                for (node, s) in batch.iter().zip(batch_scores.iter()) {
                    scores[*node] += s;
                }
            }
            log::trace!("Cola::decision_function round {} done", round);
        }
        scores /= nb_rounds as f64;
        Ok(scores)
    } // end of decision_function


    fn get_fitted(&self) -> Option<&FittedScores> {
        self.fitted.as_ref()
    }

    fn get_loss_history(&self) -> &[f64] {
        &self.loss_history
    }

} // end of impl DetectorT for Cola



#[cfg(test)]
mod tests {

    use super::*;
    use crate::detector::predict;
    use crate::generator::{gen_contextual_outliers, gen_structural_outliers};
    use crate::metrics::roc_auc;
    use crate::sampling::{Subgraph, assemble};
    use rand_distr::{Distribution, Normal};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // nb_blocks communities of size block_size, features concentrated around a community center
    fn community_graph(nb_blocks : usize, block_size : usize, dim : usize, rng : &mut Xoshiro256PlusPlus) -> AttributedGraph {
        let nb_nodes = nb_blocks * block_size;
        let normal = Normal::new(0., 0.1).unwrap();
        let mut features = Array2::<f64>::zeros((nb_nodes, dim));
        let mut edges = Vec::<(usize,usize)>::new();
        for b in 0..nb_blocks {
            for i in 0..block_size {
                let node = b * block_size + i;
                for j in 0..dim {
                    let center = if j % nb_blocks == b { 1. } else { 0. };
                    features[[node, j]] = center + normal.sample(rng);
                }
                edges.push((node, b * block_size + (i + 1) % block_size));
                edges.push((node, b * block_size + (i + 3) % block_size));
            }
        }
        AttributedGraph::from_edges(features, &edges).unwrap()
    } // end of community_graph


    #[test]
    fn test_cola_gradient_finite_difference() {
        log_init_test();
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(41);
        let graph = community_graph(2, 6, 4, &mut rng);
        // fixed subgraphs so that the loss is a deterministic function of parameters
        let subgraphs : Vec<Subgraph> = vec![
            Subgraph{target : 0, context : vec![1, 3, 5]},
            Subgraph{target : 4, context : vec![5]},
            Subgraph{target : 7, context : vec![6, 8]},
            Subgraph{target : 10, context : vec![11, 9, 1]},
        ];
        let tensors : Vec<SubgraphTensors> = subgraphs.iter().map(|s| assemble(&graph, s, 4)).collect();
        let pos_weight = 2.;
        let loss = |m : &ColaModel| {
            let forwards : Vec<SubgraphForward> = tensors.iter().map(|t| m.forward_subgraph(t)).collect();
            let logits = m.batch_logits(&forwards, 2);
            bce_with_logits(&logits.logits, &logits.labels, pos_weight)
        };
        let eps = 1.0E-6;
        for readout in [Readout::Avg, Readout::Max, Readout::Min, Readout::WeightedSum] {
            let cola_params = ColaParams::new(5, 0, 2, 1, WalkParams::new(4, 1., 5)).with_readout(readout);
            let mut model = ColaModel::new(4, &cola_params, &mut rng);
            // a slope away from the initial value, the gradient must not depend on it being 0.25
            model.activation.slope[0] = 0.1;
            let forwards : Vec<SubgraphForward> = tensors.iter().map(|t| model.forward_subgraph(t)).collect();
            let logits = model.batch_logits(&forwards, 2);
            assert_eq!(logits.logits.len(), 12);
            assert_eq!(logits.pairs[4], (0, 1));
            assert_eq!(logits.pairs[11], (3, 1));
            let d_logits = bce_with_logits_grad(&logits.logits, &logits.labels, pos_weight);
            let grad = model.backward(&tensors, &forwards, &logits, &d_logits);
            //
            let base = loss(&model);
            for (i, j) in [(0, 0), (1, 3), (3, 4), (2, 1)] {
                let mut shifted = model.clone();
                shifted.encoder.weight[[i,j]] += eps;
                let fd = (loss(&shifted) - base) / eps;
                log::debug!("{:?} encoder ({},{}) fd {:.6e} grad {:.6e}", readout, i, j, fd, grad.encoder.weight[[i,j]]);
                assert!((fd - grad.encoder.weight[[i,j]]).abs() < 1.0E-5);
            }
            let mut shifted = model.clone();
            shifted.activation.slope[0] += eps;
            let fd = (loss(&shifted) - base) / eps;
            log::debug!("{:?} slope fd {:.6e} grad {:.6e}", readout, fd, grad.activation.slope[0]);
            assert!((fd - grad.activation.slope[0]).abs() < 1.0E-5);
            for (i, j) in [(0, 0), (4, 2)] {
                let mut shifted = model.clone();
                shifted.discriminator.weight[[i,j]] += eps;
                let fd = (loss(&shifted) - base) / eps;
                assert!((fd - grad.discriminator.weight[[i,j]]).abs() < 1.0E-5);
            }
            let mut shifted = model.clone();
            shifted.discriminator.bias[0] += eps;
            let fd = (loss(&shifted) - base) / eps;
            assert!((fd - grad.discriminator.bias[0]).abs() < 1.0E-5);
        }
    } // end of test_cola_gradient_finite_difference


    #[test]
    fn test_cola_fit_detects_contextual_outliers() {
        log_init_test();
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let graph = community_graph(4, 15, 8, &mut rng);
        let (graph, labels) = gen_contextual_outliers(&graph, 6, 30, &mut rng).unwrap();
        //
        let params = DetectorParams::new(100, 0.01, 0., 0.1, 9);
        let cola_params = ColaParams::new(16, 20, 1, 32, WalkParams::default());
        let mut cola = Cola::new(params, cola_params);
        cola.fit(&graph).unwrap();
        let history = cola.get_loss_history();
        assert_eq!(history.len(), 100);
        let first : f64 = history[0..10].iter().sum();
        let last : f64 = history[90..100].iter().sum();
        log::info!("cola loss first epochs : {:.3e}, last epochs : {:.3e}", first / 10., last / 10.);
        assert!(last < first);
        let fitted = cola.get_fitted().unwrap();
        let auc = roc_auc(&labels, fitted.decision_scores.as_slice().unwrap()).unwrap();
        log::info!("cola auc : {:.3}", auc);
        assert!(auc > 0.7);
        // seeded scoring is reproducible
        assert_eq!(cola.decision_function(&graph).unwrap(), fitted.decision_scores);
        assert_eq!(predict(&cola, &graph).unwrap(), fitted.labels);
    } // end of test_cola_fit_detects_contextual_outliers


    #[test]
    fn test_cola_fit_detects_structural_outliers() {
        log_init_test();
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(43);
        let graph = community_graph(4, 20, 8, &mut rng);
        // cliques drawn across communities : outliers get neighbours with foreign features
        let (graph, labels) = gen_structural_outliers(&graph, 2, 6, &mut rng).unwrap();
        //
        let params = DetectorParams::new(100, 0.01, 0., 0.15, 10);
        let cola_params = ColaParams::new(16, 20, 1, 64, WalkParams::default());
        let mut cola = Cola::new(params, cola_params);
        cola.fit(&graph).unwrap();
        let fitted = cola.get_fitted().unwrap();
        let auc = roc_auc(&labels, fitted.decision_scores.as_slice().unwrap()).unwrap();
        log::info!("cola auc on structural outliers : {:.3}", auc);
        assert!(auc > 0.6);
    } // end of test_cola_fit_detects_structural_outliers


    #[test]
    fn test_cola_small_batches() {
        log_init_test();
        //
        // 7 nodes : batches of 2 leave a trailing singleton merged into the previous batch, batches of 3 too
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(44);
        let graph = community_graph(1, 7, 3, &mut rng);
        assert_eq!(minibatches(7, 2, false, &mut rng).last().map(|b| b.len()), Some(3));
        assert_eq!(minibatches(7, 3, false, &mut rng).last().map(|b| b.len()), Some(4));
        for batch_size in [2, 3] {
            for ratio in [1, 3] {
                let cola_params = ColaParams::new(4, batch_size, ratio, 3, WalkParams::default());
                let mut cola = Cola::new(DetectorParams::new(5, 0.01, 0., 0.2, 5), cola_params);
                cola.fit(&graph).unwrap();
                assert_eq!(cola.get_loss_history().len(), 5);
                let scores = &cola.get_fitted().unwrap().decision_scores;
                assert_eq!(scores.len(), 7);
                assert!(scores.iter().all(|s| s.is_finite() && *s >= -1. && *s <= 1.));
            }
        }
    } // end of test_cola_small_batches


    #[test]
    fn test_cola_readouts_fit() {
        log_init_test();
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(45);
        let graph = community_graph(2, 8, 4, &mut rng);
        for readout in [Readout::Avg, Readout::Max, Readout::Min, Readout::WeightedSum] {
            let cola_params = ColaParams::new(6, 0, 2, 4, WalkParams::new(5, 1., 3)).with_readout(readout);
            assert_eq!(cola_params.get_readout(), readout);
            let mut cola = Cola::new(DetectorParams::new(10, 0.01, 0., 0.1, 6), cola_params);
            cola.fit(&graph).unwrap();
            assert!(cola.get_loss_history().iter().all(|l| l.is_finite()));
            let scores = &cola.get_fitted().unwrap().decision_scores;
            assert!(scores.iter().all(|s| s.is_finite() && *s >= -1. && *s <= 1.));
        }
    } // end of test_cola_readouts_fit


    #[test]
    fn test_cola_isolated_nodes() {
        log_init_test();
        //
        // two nodes linked, one isolated : contexts are short or empty, padding must handle it
        let features = ndarray::arr2(&[[1., 0.], [0.9, 0.1], [0., 1.]]);
        let graph = AttributedGraph::from_edges(features, &[(0,1)]).unwrap();
        let mut cola = Cola::new(DetectorParams::new(5, 0.01, 0., 0.3, 3), ColaParams::new(4, 0, 3, 2, WalkParams::new(4, 1., 2)));
        cola.fit(&graph).unwrap();
        let scores = cola.decision_function(&graph).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| s.is_finite() && *s >= -1. && *s <= 1.));
    } // end of test_cola_isolated_nodes


    #[test]
    fn test_cola_params_check() {
        log_init_test();
        //
        assert!(ColaParams::default().check().is_ok());
        assert!(ColaParams::new(4, 2, 1, 2, WalkParams::default()).check().is_ok());
        // a batch of one node has no other readout to pair with
        assert!(ColaParams::new(4, 1, 1, 2, WalkParams::default()).check().is_err());
        assert!(ColaParams::new(4, 0, 1, 2, WalkParams::new(4, 1.5, 2)).check().is_err());
        assert!(ColaParams::new(4, 0, 1, 2, WalkParams::new(1, 1., 2)).check().is_err());
        // fit refuses instead of failing deep in negative pairing
        let graph = AttributedGraph::from_edges(Array2::<f64>::ones((4, 2)), &[(0,1), (1,2), (2,3)]).unwrap();
        let mut cola = Cola::new(DetectorParams::new(2, 0.01, 0., 0.25, 1), ColaParams::new(4, 1, 1, 2, WalkParams::default()));
        assert!(cola.fit(&graph).is_err());
        assert!(cola.get_fitted().is_none());
    } // end of test_cola_params_check


    #[test]
    fn test_cola_errors() {
        log_init_test();
        //
        let graph = AttributedGraph::from_edges(Array2::<f64>::ones((3, 2)), &[(0,1), (1,2)]).unwrap();
        let cola = Cola::new(DetectorParams::default(), ColaParams::default());
        assert!(cola.decision_function(&graph).is_err());
        assert!(predict(&cola, &graph).is_err());
        let mut cola = Cola::new(DetectorParams::default(), ColaParams::new(4, 0, 0, 1, WalkParams::default()));
        assert!(cola.fit(&graph).is_err());
    } // end of test_cola_errors

} // end of mod tests
