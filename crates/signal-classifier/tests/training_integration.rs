//! End-to-end tests for the classifier pipeline.
//!
//! 1. Build a synthetic training set with a known decision boundary
//! 2. Train, evaluate, persist and reload the parameters
//! 3. Verify scores and veto verdicts survive the round trip

use proptest::prelude::*;
use signal_classifier::{
    evaluate, load_active_parameters, resolve_active_parameters, train, train_with_holdout,
    ClassWeighting, JsonFileStore, LearningRateSchedule, ModelParameters, ModelSource,
    ParameterStore, Regularization, TrainingConfig, TrainingExample, VetoEngine, VetoPolicy,
    WeightInit,
};
use signal_core::FeatureVector;

/// label = 1 iff `insider_score` > 6, with an uninformative second feature.
fn threshold_examples(count: usize) -> Vec<TrainingExample> {
    (0..count)
        .map(|i| {
            let score = (i % 101) as f64 / 10.0;
            let noise = ((i * 7) % 11) as f64;
            let features = FeatureVector::new()
                .with("insider_score", score)
                .with("vix_level", noise);
            TrainingExample::new(features, u8::from(score > 6.0))
        })
        .collect()
}

#[test]
fn test_calibration_sanity() {
    let examples = threshold_examples(303);
    let config = TrainingConfig::default().with_learning_rate(0.1);

    let params = train(&examples, &config).unwrap();

    assert!(params.weights["insider_score"] > 0.0);
    assert!(params.metadata.validation_accuracy > 0.9);

    let metrics = evaluate(&examples, &params);
    assert_eq!(metrics.sample_count, 303);
    assert!(metrics.accuracy > 0.9);
    assert!(metrics.auc > 0.95);
    assert!(metrics.calibration_error >= 0.0 && metrics.calibration_error <= 1.0);
}

#[test]
fn test_holdout_validation_accuracy() {
    let examples = threshold_examples(202);
    let holdout = threshold_examples(101);
    let config = TrainingConfig::default().with_learning_rate(0.1);

    let params = train_with_holdout(&examples, &holdout, &config).unwrap();
    assert!(params.metadata.validation_accuracy > 0.9);
}

#[test]
fn test_serde_roundtrip_preserves_probability() {
    let config = TrainingConfig::default()
        .with_learning_rate(0.05)
        .with_weight_init(WeightInit::Xavier, 11)
        .with_regularization(Regularization::ElasticNet {
            lambda: 0.01,
            l1_ratio: 0.3,
        })
        .with_schedule(LearningRateSchedule::Cosine);
    let params = train(&threshold_examples(150), &config).unwrap();

    let json = serde_json::to_string(&params).unwrap();
    let restored: ModelParameters = serde_json::from_str(&json).unwrap();

    let probe = FeatureVector::new()
        .with("insider_score", 6.3)
        .with("vix_level", 3.0);
    assert_eq!(params.score(&probe), restored.score(&probe));
    assert_eq!(params, restored);
}

#[test]
fn test_store_and_veto_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("active.json"));

    // 저장된 스냅샷이 없으면 기본 모델
    let fallback = load_active_parameters(&store);
    assert_eq!(fallback.metadata.source, ModelSource::Baseline);

    let params = train(
        &threshold_examples(202),
        &TrainingConfig::default().with_learning_rate(0.1),
    )
    .unwrap();
    store.save(&params).unwrap();

    let engine = VetoEngine::from_store(&store, VetoPolicy::new(50.0)).unwrap();
    assert_eq!(engine.parameters().metadata.source, ModelSource::Trained);

    let weak = FeatureVector::new().with("insider_score", 1.0);
    let strong = FeatureVector::new().with("insider_score", 9.5);
    assert!(engine.evaluate(&weak).vetoed);
    assert!(!engine.evaluate(&strong).vetoed);
}

#[test]
fn test_empty_training_set_yields_baseline() {
    let params = train(&[], &TrainingConfig::default()).unwrap();
    assert_eq!(params, ModelParameters::baseline());
    assert_eq!(resolve_active_parameters(Some(params)).metadata.version, "baseline-v1");
}

#[test]
fn test_seeded_training_reproducible() {
    let config = TrainingConfig::default()
        .with_weight_init(WeightInit::Uniform, 99)
        .with_class_weighting(ClassWeighting::Balanced)
        .with_iterations(200);

    let a = train(&threshold_examples(120), &config).unwrap();
    let b = train(&threshold_examples(120), &config).unwrap();
    assert_eq!(a.weights, b.weights);
    assert_eq!(a.intercept, b.intercept);
}

proptest! {
    #[test]
    fn prop_score_within_bounds(
        insider in -1e6f64..1e6,
        vix in -1e6f64..1e6,
        crash in prop::bool::ANY,
    ) {
        let params = ModelParameters::baseline();
        let vector = FeatureVector::new()
            .with("insider_score", insider)
            .with("vix_percentile", vix)
            .with("regime_crash", if crash { 1.0 } else { 0.0 });

        let p = params.score(&vector);
        prop_assert!((0.0..=100.0).contains(&p));

        let verdict = VetoEngine::new(params, VetoPolicy::default())
            .unwrap()
            .evaluate(&vector);
        prop_assert!((0.0..=100.0).contains(&verdict.confidence));
    }
}
