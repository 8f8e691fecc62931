//! 모델 평가 명령어.

use anyhow::Result;
use serde::Serialize;
use signal_classifier::{evaluate, ClassificationMetrics, ModelSource, TrainingExample};
use signal_core::ModelSettings;
use std::path::PathBuf;

use super::{load_model, read_json};

#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    pub examples_path: PathBuf,
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub model_version: String,
    pub model_source: ModelSource,
    pub metrics: ClassificationMetrics,
}

/// 레이블이 있는 예제로 활성 모델을 평가합니다.
pub fn run_evaluate(options: &EvaluateOptions, settings: &ModelSettings) -> Result<EvaluationReport> {
    let examples: Vec<TrainingExample> = read_json(&options.examples_path)?;
    let params = load_model(options.model_path.as_deref(), settings);

    Ok(EvaluationReport {
        model_version: params.metadata.version.clone(),
        model_source: params.metadata.source,
        metrics: evaluate(&examples, &params),
    })
}
