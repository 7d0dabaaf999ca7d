//! binary cross entropy on logits


use super::activation::sigmoid;


// ln(1 + exp(x)) without overflow
fn softplus(x : f64) -> f64 {
    x.max(0.) + (-x.abs()).exp().ln_1p()
}


/// mean binary cross entropy of logits against 0/1 labels, positive terms weighted by pos_weight :
/// pos_weight * y * softplus(-l) + (1 - y) * softplus(l).
/// With pos_weight = 1. this is the usual max(l,0) - l*y + ln(1 + exp(-|l|)).
pub fn bce_with_logits(logits : &[f64], labels : &[f64], pos_weight : f64) -> f64 {
    assert_eq!(logits.len(), labels.len());
    if logits.is_empty() {
        return 0.;
    }
    let sum : f64 = logits.iter().zip(labels.iter()).map(|(&l, &y)| {
            pos_weight * y * softplus(-l) + (1. - y) * softplus(l)
        }).sum();
    sum / logits.len() as f64
} // end of bce_with_logits


/// gradient of [bce_with_logits] with respect to each logit
pub fn bce_with_logits_grad(logits : &[f64], labels : &[f64], pos_weight : f64) -> Vec<f64> {
    assert_eq!(logits.len(), labels.len());
    let n = logits.len() as f64;
    logits.iter().zip(labels.iter()).map(|(&l, &y)| {
            let s = sigmoid(l);
            (pos_weight * y * (s - 1.) + (1. - y) * s) / n
        }).collect()
} // end of bce_with_logits_grad
