//! Evaluation of anomaly scores against ground truth labels (true for outliers).
//!
//! All functions expect higher scores for more anomalous nodes.


use anyhow::{anyhow};



// checks lengths and returns the number of positive labels
fn check_inputs(labels : &[bool], scores : &[f64]) -> Result<usize, anyhow::Error> {
    if labels.len() != scores.len() {
        log::error!("metrics : {} labels but {} scores", labels.len(), scores.len());
        return Err(anyhow!("metrics : labels and scores must have the same length"));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(anyhow!("metrics : NaN in scores"));
    }
    Ok(labels.iter().filter(|l| **l).count())
} // end of check_inputs


// indexes sorted by decreasing scores
fn decreasing_order(scores : &[f64]) -> Vec<usize> {
    let mut order : Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    order
}


/// Area under the ROC curve, computed from ranks (Mann-Whitney statistic). Tied scores get their average rank.
pub fn roc_auc(labels : &[bool], scores : &[f64]) -> Result<f64, anyhow::Error> {
    let nb_pos = check_inputs(labels, scores)?;
    let nb_neg = labels.len() - nb_pos;
    if nb_pos == 0 || nb_neg == 0 {
        log::error!("roc_auc : need both classes, got {} positives and {} negatives", nb_pos, nb_neg);
        return Err(anyhow!("roc_auc : need both positive and negative labels"));
    }
    let mut order : Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));
    // sum of ranks (1 based) of positives
    let mut rank_sum = 0.;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks start+1..=end share their mean
        let mean_rank = (start + 1 + end) as f64 / 2.;
        let nb_pos_tied = order[start..end].iter().filter(|i| labels[**i]).count();
        rank_sum += mean_rank * nb_pos_tied as f64;
        start = end;
    }
    let nb_pos = nb_pos as f64;
    let auc = (rank_sum - nb_pos * (nb_pos + 1.) / 2.) / (nb_pos * nb_neg as f64);
    Ok(auc)
} // end of roc_auc



/// Average precision : sum over distinct score thresholds of precision weighted by the increase of recall.
pub fn average_precision(labels : &[bool], scores : &[f64]) -> Result<f64, anyhow::Error> {
    let nb_pos = check_inputs(labels, scores)?;
    if nb_pos == 0 {
        return Err(anyhow!("average_precision : no positive label"));
    }
    let order = decreasing_order(scores);
    let mut ap = 0.;
    let mut true_pos = 0usize;
    let mut last_recall = 0.;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        true_pos += order[start..end].iter().filter(|i| labels[**i]).count();
        let precision = true_pos as f64 / end as f64;
        let recall = true_pos as f64 / nb_pos as f64;
        ap += (recall - last_recall) * precision;
        last_recall = recall;
        start = end;
    }
    Ok(ap)
} // end of average_precision



// number of positives among the k highest scores, k defaulting to the number of positives
fn hits_at_k(labels : &[bool], scores : &[f64], k : Option<usize>) -> Result<(usize, usize, usize), anyhow::Error> {
    let nb_pos = check_inputs(labels, scores)?;
    let k = k.unwrap_or(nb_pos);
    if k == 0 || k > labels.len() {
        log::error!("metrics : k = {} must be in 1..={}", k, labels.len());
        return Err(anyhow!("metrics : k out of range"));
    }
    let order = decreasing_order(scores);
    let hits = order[0..k].iter().filter(|i| labels[**i]).count();
    Ok((hits, k, nb_pos))
} // end of hits_at_k


/// proportion of outliers among the k nodes with highest scores
pub fn precision_at_k(labels : &[bool], scores : &[f64], k : Option<usize>) -> Result<f64, anyhow::Error> {
    let (hits, k, _) = hits_at_k(labels, scores, k)?;
    Ok(hits as f64 / k as f64)
}


/// proportion of outliers found among the k nodes with highest scores
pub fn recall_at_k(labels : &[bool], scores : &[f64], k : Option<usize>) -> Result<f64, anyhow::Error> {
    let (hits, _, nb_pos) = hits_at_k(labels, scores, k)?;
    if nb_pos == 0 {
        return Err(anyhow!("recall_at_k : no positive label"));
    }
    Ok(hits as f64 / nb_pos as f64)
}
