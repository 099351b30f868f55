// ============================================================
// Layer 5 — Random Forest Classifier
// ============================================================
// An ensemble of CART trees, each grown on a bootstrap sample
// of the training rows with a random subset of candidate
// features per split.
//
// Prediction averages the leaf class distributions of all trees
// and returns the most probable class (lowest class id on ties).
//
// Trees are grown in parallel with rayon. Every tree gets its
// own RNG seeded from the forest seed, so the result does not
// depend on thread scheduling.
//
// Reference: Breiman (2001) Random Forests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::ml::features::SparseVector;
use crate::ml::tree::{DecisionTree, TreeParams};

/// How many candidate features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt     => (n_features as f64).sqrt() as usize,
            MaxFeatures::All      => n_features,
            MaxFeatures::Fixed(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees:           usize,
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeatures,
    pub bootstrap:         bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees:           100,
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::Sqrt,
            bootstrap:         true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Sorted class ids seen in training; tree distributions index into it.
    classes: Vec<u8>,
    trees:   Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        config:     &ForestConfig,
        x:          &[SparseVector],
        n_features: usize,
        y:          &[u8],
        seed:       u64,
    ) -> Result<Self> {
        if config.n_trees == 0 {
            return Err(PipelineError::training(Stage::Train, "a forest needs at least one tree"));
        }
        if x.is_empty() {
            return Err(PipelineError::training(Stage::Train, "cannot fit a forest on zero rows"));
        }
        if x.len() != y.len() {
            return Err(PipelineError::training(
                Stage::Train,
                format!("{} feature rows but {} labels", x.len(), y.len()),
            ));
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let y_idx: Vec<usize> = y
            .iter()
            .map(|c| classes.binary_search(c).unwrap_or_default())
            .collect();

        let params = TreeParams {
            max_depth:         config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf:  config.min_samples_leaf,
            max_features:      config.max_features.resolve(n_features),
        };

        let mut seeder = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| seeder.gen()).collect();

        let n = x.len();
        let trees = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let samples: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, &y_idx, classes.len(), samples, &params, &mut rng)
            })
            .collect();

        Ok(Self { classes, trees })
    }

    #[cfg(test)]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean class distribution over all trees, aligned with `classes`.
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (p, d) in proba.iter_mut().zip(tree.predict_distribution(row)) {
                *p += d;
            }
        }
        let n = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    pub fn predict(&self, row: &SparseVector) -> u8 {
        let proba = self.predict_proba(row);
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        self.classes[best]
    }

    pub fn predict_batch(&self, rows: &[SparseVector]) -> Vec<u8> {
        rows.par_iter().map(|r| self.predict(r)).collect()
    }
}
