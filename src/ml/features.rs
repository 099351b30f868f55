// ============================================================
// Layer 5 — Feature Pipeline
// ============================================================
// Converts raw messages into fixed-length weighted vectors.
//
// The pipeline is an explicit ordered list of named stages:
//
//   "vectorizer"  text    → term counts   (CountVectorizer)
//   "tfidf"       counts  → weighted rows (TfidfTransformer)
//
// fit() runs each stage's fit on the output of the previous
// stage; transform() only reads learned state. Once fitted, the
// vocabulary and idf weights are frozen until the next fit.
//
// Vectors are sparse: a message touches a handful of terms out
// of a vocabulary of tens of thousands.
//
// Weighting (smoothed):
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//   row    = counts ⊙ idf, then scaled to unit L2 norm
//
// Reference: Salton & Buckley (1988) Term-weighting approaches
//            in automatic text retrieval

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::tokenizer::Tokenizer;
use crate::domain::error::{PipelineError, Result, Stage as ErrorStage};
use crate::domain::traits::Stage;

// ─── SparseVector ─────────────────────────────────────────────────────────────

/// A `dim`-length vector storing only non-zero entries, sorted by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim:     usize,
    indices: Vec<u32>,
    values:  Vec<f64>,
}

impl SparseVector {
    /// `entries` must be sorted by index with no repeats.
    pub fn from_sorted(dim: usize, entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let (indices, values): (Vec<u32>, Vec<f64>) =
            entries.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.last().map_or(true, |&i| (i as usize) < dim));
        Self { dim, indices, values }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn get(&self, feature: u32) -> f64 {
        match self.indices.binary_search(&feature) {
            Ok(pos) => self.values[pos],
            Err(_)  => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

// ─── CountVectorizer ──────────────────────────────────────────────────────────

/// Term counts against a vocabulary learned from the training corpus.
///
/// Vocabulary indices follow lexicographic token order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, u32>,
    #[serde(skip)]
    tokenizer:  Tokenizer,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn index_of(&self, token: &str) -> Option<u32> {
        self.vocabulary.get(token).copied()
    }

    fn count(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for token in self.tokenizer.tokenize(document) {
            if let Some(idx) = self.index_of(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        SparseVector::from_sorted(self.vocabulary_size(), counts)
    }
}

impl Stage for CountVectorizer {
    type Input  = String;
    type Output = SparseVector;

    fn name(&self) -> &'static str {
        "vectorizer"
    }

    fn fit(&mut self, data: &[String]) -> Result<()> {
        let tokenizer = self.tokenizer;
        let terms: BTreeSet<String> = data
            .par_iter()
            .map(|doc| tokenizer.tokenize(doc))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        if terms.is_empty() {
            return Err(PipelineError::training(
                ErrorStage::Features,
                "empty vocabulary: the training documents produced no tokens",
            ));
        }

        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i as u32))
            .collect();
        tracing::debug!("Vocabulary fitted: {} terms", self.vocabulary_size());
        Ok(())
    }

    fn transform(&self, data: &[String]) -> Result<Vec<SparseVector>> {
        if self.vocabulary.is_empty() {
            return Err(not_fitted(self.name()));
        }
        Ok(data.par_iter().map(|doc| self.count(doc)).collect())
    }
}

// ─── TfidfTransformer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Add one to document frequencies, as if an extra document
    /// contained every term once. Prevents zero divisions.
    pub smooth_idf:   bool,
    pub l2_normalize: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self { smooth_idf: true, l2_normalize: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfTransformer {
    config: TfidfConfig,
    idf:    Vec<f64>,
}

impl TfidfTransformer {
    pub fn new(config: TfidfConfig) -> Self {
        Self { config, idf: Vec::new() }
    }
}

impl Stage for TfidfTransformer {
    type Input  = SparseVector;
    type Output = SparseVector;

    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn fit(&mut self, data: &[SparseVector]) -> Result<()> {
        let dim = data.first().map(SparseVector::dim).ok_or_else(|| {
            PipelineError::training(ErrorStage::Features, "cannot fit idf weights on zero documents")
        })?;

        let mut df = vec![0usize; dim];
        for row in data {
            for &i in row.indices() {
                df[i as usize] += 1;
            }
        }

        let smooth = usize::from(self.config.smooth_idf) as f64;
        let n = data.len() as f64 + smooth;
        self.idf = df
            .into_iter()
            .map(|d| (n / (d as f64 + smooth)).ln() + 1.0)
            .collect();
        Ok(())
    }

    fn transform(&self, data: &[SparseVector]) -> Result<Vec<SparseVector>> {
        if self.idf.is_empty() {
            return Err(not_fitted(self.name()));
        }
        data.iter()
            .map(|row| {
                if row.dim() != self.idf.len() {
                    return Err(PipelineError::training(
                        ErrorStage::Features,
                        format!("tfidf expects {} features, got {}", self.idf.len(), row.dim()),
                    ));
                }
                let weighted: Vec<(u32, f64)> =
                    row.iter().map(|(i, v)| (i, v * self.idf[i as usize])).collect();
                let norm = if self.config.l2_normalize {
                    weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
                } else {
                    1.0
                };
                let scale = if norm > 0.0 { 1.0 / norm } else { 1.0 };
                Ok(SparseVector::from_sorted(
                    row.dim(),
                    weighted.into_iter().map(|(i, v)| (i, v * scale)),
                ))
            })
            .collect()
    }
}

fn not_fitted(stage: &str) -> PipelineError {
    PipelineError::training(ErrorStage::Features, format!("stage '{stage}' used before fit"))
}

// ─── FeaturePipeline ──────────────────────────────────────────────────────────

/// Data flowing between stages.
#[derive(Debug, Clone)]
pub enum StageData {
    Text(Vec<String>),
    Vectors(Vec<SparseVector>),
}

/// One concrete stage of the feature pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeatureStage {
    Vectorizer(CountVectorizer),
    Tfidf(TfidfTransformer),
}

impl FeatureStage {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureStage::Vectorizer(s) => s.name(),
            FeatureStage::Tfidf(s)      => s.name(),
        }
    }

    fn fit(&mut self, data: &StageData) -> Result<()> {
        match (self, data) {
            (FeatureStage::Vectorizer(s), StageData::Text(docs)) => s.fit(docs),
            (FeatureStage::Tfidf(s), StageData::Vectors(rows))   => s.fit(rows),
            (stage, _) => Err(wrong_input(stage.name())),
        }
    }

    fn transform(&self, data: &StageData) -> Result<StageData> {
        match (self, data) {
            (FeatureStage::Vectorizer(s), StageData::Text(docs)) => s.transform(docs).map(StageData::Vectors),
            (FeatureStage::Tfidf(s), StageData::Vectors(rows))   => s.transform(rows).map(StageData::Vectors),
            (stage, _) => Err(wrong_input(stage.name())),
        }
    }
}

fn wrong_input(stage: &str) -> PipelineError {
    PipelineError::training(ErrorStage::Features, format!("stage '{stage}' received the wrong kind of input"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub tfidf: TfidfConfig,
}

/// Ordered list of named fit/transform stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    stages:     Vec<FeatureStage>,
    n_features: usize,
}

impl FeaturePipeline {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            stages: vec![
                FeatureStage::Vectorizer(CountVectorizer::new()),
                FeatureStage::Tfidf(TfidfTransformer::new(config.tfidf)),
            ],
            n_features: 0,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fit every stage in order and return the training vectors.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        let mut data = StageData::Text(documents.to_vec());
        for stage in &mut self.stages {
            stage.fit(&data)?;
            data = stage.transform(&data)?;
            tracing::debug!("Stage '{}' fitted", stage.name());
        }
        let vectors = into_vectors(data)?;
        self.n_features = vectors.first().map_or(0, SparseVector::dim);
        Ok(vectors)
    }

    pub fn transform(&self, documents: &[String]) -> Result<Vec<SparseVector>> {
        let mut data = StageData::Text(documents.to_vec());
        for stage in &self.stages {
            data = stage.transform(&data)?;
        }
        into_vectors(data)
    }
}

fn into_vectors(data: StageData) -> Result<Vec<SparseVector>> {
    match data {
        StageData::Vectors(v) => Ok(v),
        StageData::Text(_)    => Err(wrong_input("output")),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_counts_repeat_tokens() {
        let mut v = CountVectorizer::new();
        v.fit(&docs(&["water water food", "tent"])).unwrap();
        assert_eq!(v.vocabulary_size(), 3);
        assert_eq!(v.index_of("food"), Some(0));
        assert_eq!(v.index_of("tent"), Some(1));
        assert_eq!(v.index_of("water"), Some(2));

        let rows = v.transform(&docs(&["water water food unknownword"])).unwrap();
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), vec![(0, 1.0), (2, 2.0)]);
        assert_eq!(rows[0].dim(), 3);
    }

    #[test]
    fn test_empty_vocabulary_is_training_error() {
        let mut v = CountVectorizer::new();
        let err = v.fit(&docs(&["!!!", "..."])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Training);
    }

    #[test]
    fn test_smoothed_idf_values() {
        let counts = vec![
            SparseVector::from_sorted(2, vec![(0, 1.0), (1, 1.0)]),
            SparseVector::from_sorted(2, vec![(0, 1.0)]),
        ];
        let mut t = TfidfTransformer::new(TfidfConfig::default());
        t.fit(&counts).unwrap();
        // df = [2, 1], n = 2
        assert!((t.idf[0] - 1.0).abs() < 1e-12);
        assert!((t.idf[1] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut p = FeaturePipeline::new(&FeatureConfig::default());
        let rows = p.fit_transform(&docs(&["flood water city", "need food water"])).unwrap();
        for row in &rows {
            let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        let names: Vec<&str> = p.stages.iter().map(FeatureStage::name).collect();
        assert_eq!(names, vec!["vectorizer", "tfidf"]);
        assert_eq!(p.n_features(), 5);
    }

    #[test]
    fn test_transform_is_pure_once_fitted() {
        let mut p = FeaturePipeline::new(&FeatureConfig::default());
        p.fit_transform(&docs(&["flood in city", "need water"])).unwrap();
        let query = docs(&["flood water"]);
        assert_eq!(p.transform(&query).unwrap(), p.transform(&query).unwrap());
    }

    #[test]
    fn test_refit_on_other_corpus_changes_vectors() {
        let mut p = FeaturePipeline::new(&FeatureConfig::default());
        let query = docs(&["flood water"]);

        p.fit_transform(&docs(&["flood in city", "need water"])).unwrap();
        let before = p.transform(&query).unwrap();

        p.fit_transform(&docs(&["earthquake shake", "tent food water"])).unwrap();
        let after = p.transform(&query).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_out_of_vocabulary_document_is_zero_vector() {
        let mut p = FeaturePipeline::new(&FeatureConfig::default());
        p.fit_transform(&docs(&["flood", "water"])).unwrap();
        let rows = p.transform(&docs(&["zzz qqq"])).unwrap();
        assert!(rows[0].indices().is_empty());
        assert_eq!(rows[0].dim(), 2);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let p = FeaturePipeline::new(&FeatureConfig::default());
        assert!(p.transform(&docs(&["flood"])).is_err());
    }
}
