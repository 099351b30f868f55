// ============================================================
// Layer 4 — Train/Test Splitter and K-Fold Partitioner
// ============================================================
// Two ways of carving a dataset into index sets:
//
//   split_train_test: shuffle once with a seeded RNG and hold
//                      out ceil(n * test_fraction) rows for the
//                      final evaluation
//   k_fold          : contiguous, unshuffled folds for the
//                      cross-validated grid search; the first
//                      n % k folds are one row larger
//
// Both return indices instead of moving samples around, so the
// caller can select documents and labels together.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom on a
// StdRng seeded from the run configuration, so a fixed seed
// always gives the same split.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `0..n` and split it into (train, test) index lists.
///
/// # Arguments
/// * `n`             - Number of rows
/// * `test_fraction` - Share held out for testing, e.g. 0.2
/// * `seed`          - RNG seed
pub fn split_train_test(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(n);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let test = indices.split_off(n - n_test);

    tracing::debug!("Dataset split: {} training, {} test", indices.len(), test.len());
    (indices, test)
}

/// One cross-validation fold: rows to fit on and rows to score on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test:  Vec<usize>,
}

/// Contiguous folds over `0..n`. `k` is clamped to `1..=n`.
pub fn k_fold(n: usize, k: usize) -> Vec<Fold> {
    let k = k.clamp(1, n.max(1));
    let base  = n / k;
    let extra = n % k;

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for f in 0..k {
        let size = base + usize::from(f < extra);
        let stop = start + size;
        folds.push(Fold {
            train: (0..start).chain(stop..n).collect(),
            test:  (start..stop).collect(),
        });
        start = stop;
    }
    folds
}
