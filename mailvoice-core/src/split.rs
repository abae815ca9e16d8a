//! Train/validation splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Shuffle uniformly and cut at `floor(len * train_ratio)`.
///
/// Unseeded by default, so repeated runs on identical input produce
/// different splits; pass a seed for a reproducible cut. The two halves
/// partition the input: no element is shared and none is lost.
pub fn split_examples<T>(mut items: Vec<T>, train_ratio: f64, seed: Option<u64>) -> (Vec<T>, Vec<T>) {
    match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            items.shuffle(&mut rng);
        }
        None => {
            items.shuffle(&mut rand::thread_rng());
        }
    }

    let split_idx = ((items.len() as f64 * train_ratio).floor() as usize).min(items.len());
    let val = items.split_off(split_idx);
    (items, val)
}
