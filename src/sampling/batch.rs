//! Minibatch partition of nodes and negative pairing inside a batch.


use rand::Rng;
use rand::seq::SliceRandom;


/// Partition node ranks 0..nb_nodes in batches of batch_size (0 means a single batch).
/// Every batch can form negative pairs as soon as nb_nodes >= 2 : a batch_size of 1 is raised to 2
/// and a trailing batch of a single node is merged into the previous one.
pub fn minibatches<R : Rng>(nb_nodes : usize, batch_size : usize, shuffle : bool, rng : &mut R) -> Vec<Vec<usize>> {
    let mut nodes : Vec<usize> = (0..nb_nodes).collect();
    if shuffle {
        nodes.shuffle(rng);
    }
    if nodes.is_empty() {
        return Vec::new();
    }
    let batch_size = match batch_size {
        0 => nb_nodes,
        1 => 2,
        _ => batch_size,
    };
    let mut batches : Vec<Vec<usize>> = nodes.chunks(batch_size).map(|c| c.to_vec()).collect();
    if batches.len() >= 2 && batches[batches.len() - 1].len() == 1 {
        if let Some(last) = batches.pop() {
            let nb_batches = batches.len();
            batches[nb_batches - 1].extend(last);
        }
    }
    log::trace!("minibatches nb nodes : {}, nb batches : {}", nb_nodes, batches.len());
    batches
} // end of minibatches



/// The cyclic shift used for the k-th negative (k >= 1) in a batch of batch_len >= 2 elements :
/// element i is paired with the readout of element (i + shift) mod batch_len.
/// The shift is never 0 so a node is never paired with its own readout.
pub fn negative_shift(batch_len : usize, k : usize) -> usize {
    assert!(batch_len >= 2, "negative pairing needs at least 2 elements in a batch");
    assert!(k >= 1);
    1 + (k - 1) % (batch_len - 1)
} // end of negative_shift
