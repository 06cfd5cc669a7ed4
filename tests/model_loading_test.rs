//! Integration tests for model artifact loading.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pdf_outline::detect::{
    FeatureScaler, HeadingStrategy, LogisticModel, MlStrategy, SemanticStrategy, CLASSIFIER_FILE,
    FEATURE_COUNT, LEXICON_FILE, SCALER_FILE,
};
use pdf_outline::{BoundingBox, DocumentProfile, HeadingLevel, Rules, TextBlock};

fn rules() -> Arc<Rules> {
    Arc::new(Rules::new().unwrap())
}

fn blocks() -> Vec<TextBlock> {
    vec![
        TextBlock::new(0, "Getting Around", 1, BoundingBox::new(72.0, 100.0, 200.0, 18.0), 16.0).bold(),
        TextBlock::new(
            1,
            "Buses run every ten minutes during the summer season.",
            1,
            BoundingBox::new(72.0, 130.0, 400.0, 13.0),
            11.0,
        ),
    ]
}

/// Write a classifier that fires on the bold feature only.
fn write_classifier(dir: &Path, features: usize) {
    let mut weights = vec![0.0; features];
    if features > 9 {
        weights[9] = 10.0;
    }
    let model = LogisticModel { weights, bias: -5.0 };
    let scaler = FeatureScaler {
        mean: vec![0.0; features],
        scale: vec![1.0; features],
    };
    fs::write(dir.join(CLASSIFIER_FILE), serde_json::to_string(&model).unwrap()).unwrap();
    fs::write(dir.join(SCALER_FILE), serde_json::to_string(&scaler).unwrap()).unwrap();
}

#[test]
fn test_ml_model_loaded_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_classifier(dir.path(), FEATURE_COUNT);

    let strategy = MlStrategy::new(rules(), dir.path());
    let predictions = strategy.detect(&blocks(), &DocumentProfile::default()).unwrap();

    assert!(strategy.has_model());
    assert_eq!(predictions.len(), 2);
    assert!(predictions[0].is_heading);
    assert!(predictions[0].confidence > 0.99);
    assert!(!predictions[1].is_heading);
    // rejected blocks keep the heading probability
    assert!(predictions[1].confidence > 0.0 && predictions[1].confidence < 0.01);
}

#[test]
fn test_ml_dimension_mismatch_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    write_classifier(dir.path(), 5);

    let strategy = MlStrategy::new(rules(), dir.path());
    let predictions = strategy.detect(&blocks(), &DocumentProfile::default()).unwrap();

    assert!(strategy.has_model());
    assert!(predictions[0].is_heading);
    assert_eq!(predictions[0].level, Some(HeadingLevel::H2));
    assert!((predictions[0].confidence - 0.7).abs() < 1e-9);
}

#[test]
fn test_ml_missing_scaler_uses_rules() {
    let dir = tempfile::tempdir().unwrap();
    write_classifier(dir.path(), FEATURE_COUNT);
    fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

    let strategy = MlStrategy::new(rules(), dir.path());
    let predictions = strategy.detect(&blocks(), &DocumentProfile::default()).unwrap();

    assert!(!strategy.has_model());
    assert!(predictions[0].is_heading);
}

#[test]
fn test_ml_corrupt_artifact_uses_rules() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(CLASSIFIER_FILE), "{ not json").unwrap();
    fs::write(dir.path().join(SCALER_FILE), "{}").unwrap();

    let strategy = MlStrategy::new(rules(), dir.path());
    let predictions = strategy.detect(&blocks(), &DocumentProfile::default()).unwrap();

    assert!(!strategy.has_model());
    assert_eq!(predictions.len(), 2);
    assert!(predictions[0].is_heading);
}

#[test]
fn test_semantic_lexicon_loaded_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(LEXICON_FILE),
        r#"{"words": {"market": "NOUN", "overview": "NOUN"}, "entities": {}}"#,
    )
    .unwrap();

    let strategy = SemanticStrategy::new(dir.path());
    let block = TextBlock::new(0, "Market Overview", 1, BoundingBox::new(72.0, 100.0, 200.0, 14.0), 12.0);
    let predictions = strategy.detect(&[block], &DocumentProfile::default()).unwrap();

    assert!(predictions[0].is_heading);
}

#[test]
fn test_semantic_without_lexicon_predicts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let strategy = SemanticStrategy::new(dir.path());
    let predictions = strategy.detect(&blocks(), &DocumentProfile::default()).unwrap();

    assert_eq!(predictions.len(), 2);
    assert!(predictions.iter().all(|p| !p.is_heading && p.confidence == 0.0));
}
