//! 모델 학습 명령어.
//!
//! ```bash
//! signal train --examples data/examples.json --output models/active.json
//! signal train --examples train.json --holdout holdout.json --class-weight balanced
//! ```

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use signal_classifier::{
    train, train_with_holdout, ClassWeighting, JsonFileStore, ParameterStore, TrainingConfig,
    TrainingExample,
};
use std::path::PathBuf;
use tracing::info;

use super::read_json;

/// `--class-weight` 값.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClassWeightArg {
    #[default]
    None,
    Balanced,
}

impl From<ClassWeightArg> for ClassWeighting {
    fn from(arg: ClassWeightArg) -> Self {
        match arg {
            ClassWeightArg::None => ClassWeighting::None,
            ClassWeightArg::Balanced => ClassWeighting::Balanced,
        }
    }
}

/// 학습 명령 설정
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub examples_path: PathBuf,
    pub output_path: PathBuf,
    pub holdout_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub iterations: Option<usize>,
    pub learning_rate: Option<f64>,
    pub class_weight: ClassWeightArg,
}

impl TrainOptions {
    fn training_config(&self) -> TrainingConfig {
        let mut config = TrainingConfig::new().with_class_weighting(self.class_weight.into());
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(iterations) = self.iterations {
            config = config.with_iterations(iterations);
        }
        if let Some(learning_rate) = self.learning_rate {
            config = config.with_learning_rate(learning_rate);
        }
        config
    }
}

/// 학습 결과 요약
#[derive(Debug, Serialize)]
pub struct TrainReport {
    pub version: String,
    pub training_samples: usize,
    pub validation_accuracy: f64,
    pub final_loss: Option<f64>,
    pub output_path: String,
    pub top_features: Vec<(String, f64)>,
}

/// 예제 파일로 학습하고 파라미터 스냅샷을 저장합니다.
pub fn run_train(options: &TrainOptions) -> Result<TrainReport> {
    let examples: Vec<TrainingExample> = read_json(&options.examples_path)?;
    let config = options.training_config();

    let params = match &options.holdout_path {
        Some(path) => {
            let holdout: Vec<TrainingExample> = read_json(path)?;
            train_with_holdout(&examples, &holdout, &config)?
        }
        None => train(&examples, &config)?,
    };

    let store = JsonFileStore::new(&options.output_path);
    store
        .save(&params)
        .with_context(|| format!("Failed to save model to {}", options.output_path.display()))?;

    info!(
        version = %params.metadata.version,
        path = %options.output_path.display(),
        "Model snapshot saved"
    );

    Ok(TrainReport {
        version: params.metadata.version.clone(),
        training_samples: params.metadata.training_samples,
        validation_accuracy: params.metadata.validation_accuracy,
        final_loss: params.metadata.final_loss,
        output_path: options.output_path.display().to_string(),
        top_features: params.top_features(5),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_classifier::{ModelParameters, ModelSource};
    use signal_core::FeatureVector;
    use std::fs;

    fn write_examples(path: &std::path::Path, count: usize) {
        let examples: Vec<TrainingExample> = (0..count)
            .map(|i| {
                let score = (i % 11) as f64;
                let features = FeatureVector::new().with("insider_score", score);
                TrainingExample::new(features, u8::from(score > 5.0))
            })
            .collect();
        fs::write(path, serde_json::to_string(&examples).unwrap()).unwrap();
    }

    #[test]
    fn test_train_writes_loadable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let examples_path = dir.path().join("examples.json");
        let output_path = dir.path().join("models").join("active.json");
        write_examples(&examples_path, 110);

        let options = TrainOptions {
            examples_path,
            output_path: output_path.clone(),
            holdout_path: None,
            seed: Some(7),
            iterations: Some(300),
            learning_rate: Some(0.1),
            class_weight: ClassWeightArg::Balanced,
        };
        let report = run_train(&options).unwrap();

        assert_eq!(report.training_samples, 110);
        assert!(report.validation_accuracy > 0.8);
        assert_eq!(report.top_features[0].0, "insider_score");

        let saved: ModelParameters =
            serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(saved.metadata.source, ModelSource::Trained);
        assert_eq!(saved.metadata.version, report.version);
    }

    #[test]
    fn test_missing_examples_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = TrainOptions {
            examples_path: dir.path().join("nope.json"),
            output_path: dir.path().join("out.json"),
            holdout_path: None,
            seed: None,
            iterations: None,
            learning_rate: None,
            class_weight: ClassWeightArg::None,
        };
        assert!(run_train(&options).is_err());
    }
}
