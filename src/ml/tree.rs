// ============================================================
// Layer 5 — CART Decision Tree (Gini)
// ============================================================
// A binary classification tree grown on sparse feature rows.
//
// Growth, per node:
//   1. Stop (leaf) if the node is pure, too small to split, or
//      at the depth limit
//   2. Draw candidate features in random order and evaluate
//      them until `max_features` non-constant ones were tried
//   3. For each, sort the node's values and sweep every
//      threshold between two distinct neighbours, scoring the
//      weighted Gini impurity of the two children
//   4. Keep the best split (first found on ties) and recurse
//
// Only features that are non-zero somewhere in the node can
// split it, so candidates are drawn from that set. A feature
// that is zero for every row in the node is constant there.
//
// Nodes live in one Vec and refer to children by index.
//
// Reference: Breiman et al. (1984) Classification and Regression Trees

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::ml::features::SparseVector;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Class frequencies of the training rows that reached this leaf.
    Leaf { distribution: Vec<f64> },
    /// Rows with `value <= threshold` go left.
    Split {
        feature:   u32,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Candidate {
    feature:   u32,
    threshold: f64,
    /// Σ c²/n over both children; larger means purer children.
    score:     f64,
}

struct Pending {
    node:    usize,
    samples: Vec<usize>,
    depth:   usize,
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `samples` (repeats allowed).
    ///
    /// `y[i]` is the class index of row `i`, below `n_classes`.
    pub fn fit(
        x:         &[SparseVector],
        y:         &[usize],
        n_classes: usize,
        samples:   Vec<usize>,
        params:    &TreeParams,
        rng:       &mut StdRng,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { distribution: Vec::new() }];
        let mut stack = vec![Pending { node: 0, samples, depth: 0 }];

        while let Some(Pending { node, samples, depth }) = stack.pop() {
            let counts = class_counts(y, &samples, n_classes);
            let pure   = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let depth_reached = params.max_depth.map_or(false, |d| depth >= d);

            let split = if pure || depth_reached || samples.len() < params.min_samples_split.max(2) {
                None
            } else {
                best_split(x, y, n_classes, &samples, &counts, params, rng)
            };

            match split {
                None => nodes[node] = leaf(&counts),
                Some(Candidate { feature, threshold, .. }) => {
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = samples
                        .into_iter()
                        .partition(|&s| x[s].get(feature) <= threshold);

                    let left  = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf { distribution: Vec::new() });
                    nodes.push(Node::Leaf { distribution: Vec::new() });
                    nodes[node] = Node::Split { feature, threshold, left, right };

                    stack.push(Pending { node: right, samples: right_rows, depth: depth + 1 });
                    stack.push(Pending { node: left, samples: left_rows, depth: depth + 1 });
                }
            }
        }

        Self { nodes }
    }

    /// Class distribution of the leaf `row` falls into.
    pub fn predict_distribution(&self, row: &SparseVector) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row.get(*feature) <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &s in samples {
        counts[y[s]] += 1;
    }
    counts
}

fn leaf(counts: &[usize]) -> Node {
    let total = counts.iter().sum::<usize>().max(1) as f64;
    Node::Leaf {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
    }
}

fn purity(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    counts.iter().map(|&c| (c * c) as f64).sum::<f64>() / n as f64
}

fn best_split(
    x:         &[SparseVector],
    y:         &[usize],
    n_classes: usize,
    samples:   &[usize],
    totals:    &[usize],
    params:    &TreeParams,
    rng:       &mut StdRng,
) -> Option<Candidate> {
    // Features that are non-zero for at least one row in the node
    let mut features: Vec<u32> = samples
        .iter()
        .flat_map(|&s| x[s].indices().iter().copied())
        .collect();
    features.sort_unstable();
    features.dedup();
    features.shuffle(rng);

    let n = samples.len();
    let min_leaf = params.min_samples_leaf.max(1);
    let mut best: Option<Candidate> = None;
    let mut tried = 0usize;

    let mut column: Vec<(f64, usize)> = Vec::with_capacity(n);
    let mut left = vec![0usize; n_classes];

    for feature in features {
        if tried >= params.max_features.max(1) {
            break;
        }

        column.clear();
        column.extend(samples.iter().map(|&s| (x[s].get(feature), y[s])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));
        if column[0].0 == column[n - 1].0 {
            continue;
        }
        tried += 1;

        left.iter_mut().for_each(|c| *c = 0);
        for i in 0..n - 1 {
            left[column[i].1] += 1;
            if column[i].0 == column[i + 1].0 {
                continue;
            }
            let n_left  = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let right_sq: f64 = totals
                .iter()
                .zip(&left)
                .map(|(t, l)| ((t - l) * (t - l)) as f64)
                .sum();
            let score = purity(&left, n_left) + right_sq / n_right as f64;

            if best.as_ref().map_or(true, |b| score > b.score) {
                let (lo, hi) = (column[i].0, column[i + 1].0);
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid < hi { mid } else { lo };
                best = Some(Candidate { feature, threshold, score });
            }
        }
    }

    best
}
