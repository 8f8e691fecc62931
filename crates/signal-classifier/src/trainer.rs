//! 전체 배치 경사 하강 로지스틱 회귀 학습.

use crate::config::{TrainingConfig, WeightInit};
use crate::error::{MlError, MlResult};
use crate::metrics;
use crate::model::{sigmoid, ModelMetadata, ModelParameters, ModelSource};
use crate::normalizer::Normalizer;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use signal_core::FeatureVector;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 손실 로그 간격 (반복 수).
const LOG_EVERY: usize = 100;

/// log-loss 계산 시 확률 하한/상한.
const LOSS_EPSILON: f64 = 1e-15;

/// 학습 샘플: feature vector와 이진 레이블.
///
/// 레이블 1은 이후 거래가 1R 이상의 수익에 도달했음을 의미합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: u8,
}

impl TrainingExample {
    pub fn new(features: FeatureVector, label: u8) -> Self {
        Self { features, label }
    }

    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// 학습 세트로 모델을 학습합니다.
///
/// `validation_accuracy`에는 학습 세트 정확도가 기록됩니다.
/// 빈 세트는 기본 모델을 그대로 반환합니다.
pub fn train(examples: &[TrainingExample], config: &TrainingConfig) -> MlResult<ModelParameters> {
    config.validate()?;

    if examples.is_empty() {
        info!("Empty training set, returning baseline parameters");
        return Ok(ModelParameters::baseline());
    }

    let mut params = fit(examples, config)?;
    params.metadata.validation_accuracy = metrics::accuracy(examples, &params);

    info!(
        version = %params.metadata.version,
        samples = params.metadata.training_samples,
        features = params.weights.len(),
        accuracy = params.metadata.validation_accuracy,
        loss = params.metadata.final_loss,
        "Training completed"
    );

    Ok(params)
}

/// 학습 세트로 학습하고 홀드아웃 세트 정확도를 `validation_accuracy`로 기록합니다.
///
/// 홀드아웃이 비어 있으면 [`train`]과 같습니다.
pub fn train_with_holdout(
    examples: &[TrainingExample],
    holdout: &[TrainingExample],
    config: &TrainingConfig,
) -> MlResult<ModelParameters> {
    if holdout.is_empty() {
        return train(examples, config);
    }

    config.validate()?;
    check_labels(holdout)?;

    if examples.is_empty() {
        info!("Empty training set, returning baseline parameters");
        return Ok(ModelParameters::baseline());
    }

    let mut params = fit(examples, config)?;
    params.metadata.validation_accuracy = metrics::accuracy(holdout, &params);

    info!(
        version = %params.metadata.version,
        samples = params.metadata.training_samples,
        holdout = holdout.len(),
        features = params.weights.len(),
        accuracy = params.metadata.validation_accuracy,
        loss = params.metadata.final_loss,
        "Training completed with holdout"
    );

    Ok(params)
}

fn check_labels(examples: &[TrainingExample]) -> MlResult<()> {
    if let Some((idx, ex)) = examples.iter().enumerate().find(|(_, ex)| ex.label > 1) {
        return Err(MlError::InvalidInput(format!(
            "label must be 0 or 1, got {} at example {}",
            ex.label, idx
        )));
    }
    Ok(())
}

/// 초기 (절편, 가중치)를 생성합니다.
fn initial_weights(keys: &[String], config: &TrainingConfig) -> (f64, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let n = keys.len();

    match config.weight_init {
        WeightInit::Zero => (0.0, vec![0.0; n]),
        WeightInit::Baseline => {
            let base = ModelParameters::baseline();
            let weights = keys
                .iter()
                .map(|k| base.weights.get(k).copied().unwrap_or(0.0))
                .collect();
            (base.intercept, weights)
        }
        WeightInit::Uniform => (0.0, (0..n).map(|_| rng.gen_range(-1.0..=1.0)).collect()),
        WeightInit::Xavier => {
            let limit = (6.0 / (n as f64 + 1.0)).sqrt();
            (0.0, (0..n).map(|_| rng.gen_range(-limit..=limit)).collect())
        }
        WeightInit::SmallRandom => (0.0, (0..n).map(|_| rng.gen_range(-0.1..=0.1)).collect()),
    }
}

/// 가중 log-loss.
fn log_loss(predictions: &[f64], labels: &[f64], sample_weights: &[f64]) -> f64 {
    let total_weight: f64 = sample_weights.iter().sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let loss: f64 = predictions
        .iter()
        .zip(labels)
        .zip(sample_weights)
        .map(|((&p, &y), &w)| {
            let p = p.clamp(LOSS_EPSILON, 1.0 - LOSS_EPSILON);
            -w * (y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();

    loss / total_weight
}

fn fit(examples: &[TrainingExample], config: &TrainingConfig) -> MlResult<ModelParameters> {
    check_labels(examples)?;

    let vectors: Vec<&FeatureVector> = examples.iter().map(|ex| &ex.features).collect();
    let normalizer = Normalizer::fit(vectors.iter().copied());
    let keys = normalizer.keys();

    let rows: Vec<Vec<f64>> = vectors
        .iter()
        .map(|v| normalizer.transform(v, &keys))
        .collect();
    let labels: Vec<f64> = examples.iter().map(|ex| f64::from(ex.label)).collect();

    let positives = examples.iter().filter(|ex| ex.is_positive()).count();
    let negatives = examples.len() - positives;
    let (neg_weight, pos_weight) = config.class_weighting.resolve(negatives, positives);
    let sample_weights: Vec<f64> = examples
        .iter()
        .map(|ex| if ex.is_positive() { pos_weight } else { neg_weight })
        .collect();

    let n = examples.len() as f64;
    let n_features = keys.len();
    let (mut intercept, mut weights) = initial_weights(&keys, config);
    let mut velocity = vec![0.0; n_features];
    let mut intercept_velocity = 0.0;
    let mut predictions = vec![0.0; examples.len()];
    let mut final_loss = 0.0;

    debug!(
        samples = examples.len(),
        features = n_features,
        positives,
        negatives,
        "Starting gradient descent"
    );

    for iteration in 0..config.iterations {
        for (pred, row) in predictions.iter_mut().zip(&rows) {
            let z = intercept + row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>();
            *pred = sigmoid(z);
        }

        let mut grad_w = vec![0.0; n_features];
        let mut grad_b = 0.0;
        for ((row, pred), (label, sw)) in rows
            .iter()
            .zip(&predictions)
            .zip(labels.iter().zip(&sample_weights))
        {
            let error = (pred - label) * sw;
            grad_b += error;
            for (g, x) in grad_w.iter_mut().zip(row) {
                *g += error * x;
            }
        }
        grad_b /= n;
        for (g, w) in grad_w.iter_mut().zip(&weights) {
            *g = *g / n + config.regularization.gradient(*w);
        }

        let lr = config
            .schedule
            .rate(config.learning_rate, iteration, config.iterations);

        for ((w, v), g) in weights.iter_mut().zip(velocity.iter_mut()).zip(&grad_w) {
            *v = config.momentum * *v + lr * g;
            *w -= *v;
        }
        intercept_velocity = config.momentum * intercept_velocity + lr * grad_b;
        intercept -= intercept_velocity;

        let is_last = iteration + 1 == config.iterations;
        if iteration % LOG_EVERY == 0 || is_last {
            final_loss = log_loss(&predictions, &labels, &sample_weights);
            debug!(iteration, loss = final_loss, learning_rate = lr, "Training checkpoint");
        }
    }

    if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
        return Err(MlError::InvalidConfig(
            "training diverged; lower the learning rate".into(),
        ));
    }

    let trained_at = Utc::now();
    let weights: BTreeMap<String, f64> = keys.iter().cloned().zip(weights).collect();

    Ok(ModelParameters {
        intercept,
        weights,
        means: normalizer.means,
        stds: normalizer.stds,
        metadata: ModelMetadata {
            version: format!("v{}", trained_at.format("%Y%m%d%H%M%S")),
            training_samples: examples.len(),
            validation_accuracy: 0.0,
            trained_at: Some(trained_at),
            source: ModelSource::Trained,
            final_loss: Some(final_loss),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassWeighting, Regularization};

    fn example(x: f64, label: u8) -> TrainingExample {
        TrainingExample::new(FeatureVector::new().with("x", x), label)
    }

    fn threshold_set() -> Vec<TrainingExample> {
        (0..100)
            .map(|i| {
                let x = i as f64 * 0.1;
                example(x, u8::from(x > 5.0))
            })
            .collect()
    }

    #[test]
    fn test_empty_returns_baseline() {
        let params = train(&[], &TrainingConfig::default()).unwrap();
        assert_eq!(params, ModelParameters::baseline());
    }

    #[test]
    fn test_invalid_label_rejected() {
        let data = vec![example(1.0, 0), example(2.0, 2)];
        let err = train(&data, &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, MlError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainingConfig::default().with_iterations(0);
        assert!(matches!(
            train(&threshold_set(), &config),
            Err(MlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_learns_threshold() {
        let config = TrainingConfig::default().with_learning_rate(0.1);
        let params = train(&threshold_set(), &config).unwrap();

        assert!(params.weights["x"] > 0.0);
        assert!(params.metadata.validation_accuracy > 0.9);
        assert_eq!(params.metadata.training_samples, 100);
        assert_eq!(params.metadata.source, ModelSource::Trained);
        assert!(params.metadata.version.starts_with('v'));
        assert!(params.is_valid());
    }

    #[test]
    fn test_loss_decreases_with_more_iterations() {
        let short = TrainingConfig::default()
            .with_learning_rate(0.1)
            .with_iterations(10);
        let long = short.clone().with_iterations(500);

        let a = train(&threshold_set(), &short).unwrap();
        let b = train(&threshold_set(), &long).unwrap();
        assert!(b.metadata.final_loss.unwrap() < a.metadata.final_loss.unwrap());
    }

    #[test]
    fn test_regularization_shrinks_weight() {
        let plain = TrainingConfig::default()
            .with_learning_rate(0.1)
            .with_regularization(Regularization::None);
        let ridge = plain
            .clone()
            .with_regularization(Regularization::L2 { lambda: 1.0 });

        let a = train(&threshold_set(), &plain).unwrap();
        let b = train(&threshold_set(), &ridge).unwrap();
        assert!(b.weights["x"] > 0.0);
        assert!(b.weights["x"] < a.weights["x"]);
    }

    #[test]
    fn test_momentum_trains() {
        let config = TrainingConfig::default()
            .with_learning_rate(0.05)
            .with_momentum(0.9);
        let params = train(&threshold_set(), &config).unwrap();
        assert!(params.weights["x"] > 0.0);
        assert!(params.metadata.validation_accuracy > 0.9);
    }

    #[test]
    fn test_balanced_weights_raise_minority_recall() {
        // 양성 10%: x > 9
        let data: Vec<TrainingExample> = (0..100)
            .map(|i| {
                let x = i as f64 * 0.1;
                example(x, u8::from(x > 9.0))
            })
            .collect();

        let plain = TrainingConfig::default().with_iterations(200);
        let balanced = plain
            .clone()
            .with_class_weighting(ClassWeighting::Balanced);

        let a = train(&data, &plain).unwrap();
        let b = train(&data, &balanced).unwrap();
        assert!(b.intercept > a.intercept);
    }

    #[test]
    fn test_holdout_accuracy_recorded() {
        let data = threshold_set();
        let holdout = vec![example(9.5, 1), example(0.5, 0), example(9.0, 0)];
        let config = TrainingConfig::default().with_learning_rate(0.1);

        let params = train_with_holdout(&data, &holdout, &config).unwrap();
        assert!((params.metadata.validation_accuracy - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_init_reproducible() {
        let keys: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let config = TrainingConfig::default().with_weight_init(WeightInit::Xavier, 7);

        let (_, first) = initial_weights(&keys, &config);
        let (_, second) = initial_weights(&keys, &config);
        assert_eq!(first, second);

        let limit = (6.0f64 / 4.0).sqrt();
        assert!(first.iter().all(|w| w.abs() <= limit));

        let other = TrainingConfig::default().with_weight_init(WeightInit::Xavier, 8);
        let (_, third) = initial_weights(&keys, &other);
        assert_ne!(first, third);
    }

    #[test]
    fn test_baseline_init_uses_baseline_weights() {
        let keys = vec!["insider_score".to_string(), "unknown".to_string()];
        let config = TrainingConfig::default().with_weight_init(WeightInit::Baseline, 0);
        let (intercept, weights) = initial_weights(&keys, &config);

        assert_eq!(intercept, -0.20);
        assert_eq!(weights, vec![0.18, 0.0]);
    }
}
