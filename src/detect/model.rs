//! Lazily loaded model artifacts.
//!
//! The ML strategy reads a logistic-regression classifier and its feature
//! scaler; the semantic strategy reads a part-of-speech and entity lexicon.
//! Both live in the configured model directory and are loaded on first use
//! into a [`ModelSlot`]. A missing artifact is not an error: the slot
//! becomes [`ModelState::Unavailable`] and the strategy takes its fallback.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Classifier weights file name.
pub const CLASSIFIER_FILE: &str = "heading_classifier.json";

/// Feature scaler file name.
pub const SCALER_FILE: &str = "feature_scaler.json";

/// Semantic lexicon file name.
pub const LEXICON_FILE: &str = "semantic_lexicon.json";

/// Load state of a model artifact.
#[derive(Debug)]
pub enum ModelState<M> {
    /// Not yet requested
    Unloaded,
    /// Loaded and ready for inference
    Loaded(Arc<M>),
    /// Missing or failed to load; use the fallback path
    Unavailable,
}

/// A model loaded at most once and shared read-only afterwards.
#[derive(Debug)]
pub struct ModelSlot<M> {
    state: Mutex<ModelState<M>>,
}

impl<M> Default for ModelSlot<M> {
    fn default() -> Self {
        Self {
            state: Mutex::new(ModelState::Unloaded),
        }
    }
}

impl<M> ModelSlot<M> {
    /// Create an unloaded slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot holding an already loaded model.
    pub fn loaded(model: M) -> Self {
        Self {
            state: Mutex::new(ModelState::Loaded(Arc::new(model))),
        }
    }

    /// Return the model, running `load` on first access.
    ///
    /// `Ok(None)` from the loader means the artifact is absent; an error is
    /// logged. Either way the slot settles on `Unavailable`.
    pub fn get_or_load<F>(&self, load: F) -> Option<Arc<M>>
    where
        F: FnOnce() -> Result<Option<M>>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let ModelState::Unloaded = *state {
            *state = match load() {
                Ok(Some(model)) => ModelState::Loaded(Arc::new(model)),
                Ok(None) => ModelState::Unavailable,
                Err(e) => {
                    log::error!("Failed to load model: {}", e);
                    ModelState::Unavailable
                }
            };
        }
        match &*state {
            ModelState::Loaded(model) => Some(Arc::clone(model)),
            _ => None,
        }
    }

    /// Whether a model is loaded.
    pub fn is_loaded(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, ModelState::Loaded(_))
    }

    /// Whether loading was attempted and failed.
    pub fn is_unavailable(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, ModelState::Unavailable)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| Error::ModelLoad(format!("{}: {}", path.display(), e)))
}

/// Binary logistic-regression classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// One weight per feature
    pub weights: Vec<f64>,
    /// Intercept
    pub bias: f64,
}

impl LogisticModel {
    /// Probability of the positive class.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.weights.len() {
            return Err(Error::ModelInference(format!(
                "expected {} features, got {}",
                self.weights.len(),
                features.len()
            )));
        }
        let z: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

/// Per-feature standardization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    /// Feature means
    pub mean: Vec<f64>,
    /// Feature scales (standard deviations)
    pub scale: Vec<f64>,
}

impl FeatureScaler {
    /// Standardize one feature vector.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.mean.len() || features.len() != self.scale.len() {
            return Err(Error::ModelInference(format!(
                "scaler expects {} features, got {}",
                self.mean.len(),
                features.len()
            )));
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
            .collect())
    }
}

/// Classifier plus scaler, as stored in the model directory.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingClassifier {
    /// Classifier weights
    pub model: LogisticModel,
    /// Input scaler
    pub scaler: FeatureScaler,
}

impl HeadingClassifier {
    /// Load both artifacts from `dir`; `Ok(None)` if either is missing.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let model_path = dir.join(CLASSIFIER_FILE);
        let scaler_path = dir.join(SCALER_FILE);
        if !model_path.exists() || !scaler_path.exists() {
            log::warn!(
                "ML models not found in {}, using rule-based fallback",
                dir.display()
            );
            return Ok(None);
        }
        let classifier = Self {
            model: read_json(&model_path)?,
            scaler: read_json(&scaler_path)?,
        };
        log::info!("ML models loaded from {}", dir.display());
        Ok(Some(classifier))
    }

    /// Heading probability for a raw feature vector.
    pub fn probability(&self, features: &[f64]) -> Result<f64> {
        let scaled = self.scaler.transform(features)?;
        self.model.predict_proba(&scaled)
    }
}

/// Coarse part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    #[serde(rename = "NOUN")]
    Noun,
    #[serde(rename = "PROPN")]
    ProperNoun,
    #[serde(rename = "VERB")]
    Verb,
    #[serde(rename = "ADJ")]
    Adjective,
    #[serde(rename = "ADV")]
    Adverb,
    #[serde(rename = "DET")]
    Determiner,
    #[serde(rename = "ADP")]
    Adposition,
    #[serde(rename = "CCONJ", alias = "CONJ")]
    Conjunction,
    #[serde(rename = "PRON")]
    Pronoun,
    #[serde(rename = "AUX")]
    Auxiliary,
    #[serde(rename = "NUM")]
    Number,
    #[serde(rename = "PUNCT")]
    Punctuation,
    #[serde(rename = "X")]
    Other,
}

impl PosTag {
    /// Determiners, adpositions and conjunctions.
    pub fn is_function_word(self) -> bool {
        matches!(self, PosTag::Determiner | PosTag::Adposition | PosTag::Conjunction)
    }
}

/// Word tags and entity phrases for the semantic strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Lowercased word to tag
    #[serde(default)]
    pub words: HashMap<String, PosTag>,
    /// Lowercased phrase to entity label (`ORG`, `PRODUCT`, ...)
    #[serde(default)]
    pub entities: HashMap<String, String>,
}

impl Lexicon {
    /// Load from `dir`; `Ok(None)` if the file is missing.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(LEXICON_FILE);
        if !path.exists() {
            log::warn!(
                "Semantic lexicon not found at {}, semantic strategy disabled",
                path.display()
            );
            return Ok(None);
        }
        let lexicon: Lexicon = read_json(&path)?;
        log::info!(
            "Semantic lexicon loaded: {} words, {} entities",
            lexicon.words.len(),
            lexicon.entities.len()
        );
        Ok(Some(lexicon))
    }

    /// Add a word tag.
    pub fn with_word(mut self, word: &str, tag: PosTag) -> Self {
        self.words.insert(word.to_lowercase(), tag);
        self
    }

    /// Add an entity phrase.
    pub fn with_entity(mut self, phrase: &str, label: &str) -> Self {
        self.entities.insert(phrase.to_lowercase(), label.to_string());
        self
    }

    /// Tag for a known word.
    pub fn tag(&self, word: &str) -> Option<PosTag> {
        self.words.get(&word.to_lowercase()).copied()
    }
}
