//! 비토 판정 명령어.
//!
//! 입력 파일은 feature 객체 하나 또는 객체 배열입니다.
//!
//! ```bash
//! signal score --features signal.json --min-probability 50
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use signal_classifier::{ModelSource, VetoEngine, VetoPolicy, VetoVerdict};
use signal_core::{FeatureVector, ModelSettings};
use std::path::PathBuf;
use tracing::info;

use super::{load_model, read_json};

#[derive(Debug, Clone)]
pub struct ScoreOptions {
    pub features_path: PathBuf,
    pub model_path: Option<PathBuf>,
    pub min_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureInput {
    One(FeatureVector),
    Many(Vec<FeatureVector>),
}

impl FeatureInput {
    fn into_vec(self) -> Vec<FeatureVector> {
        match self {
            FeatureInput::One(vector) => vec![vector],
            FeatureInput::Many(vectors) => vectors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreReport {
    pub model_version: String,
    pub model_source: ModelSource,
    pub min_probability: f64,
    pub vetoed_count: usize,
    pub verdicts: Vec<VetoVerdict>,
}

pub fn run_score(options: &ScoreOptions, settings: &ModelSettings) -> Result<ScoreReport> {
    let vectors = read_json::<FeatureInput>(&options.features_path)?.into_vec();
    let params = load_model(options.model_path.as_deref(), settings);
    let policy = VetoPolicy::new(
        options
            .min_probability
            .unwrap_or(settings.veto_min_probability),
    );
    let engine = VetoEngine::new(params, policy)?;

    let verdicts = engine.evaluate_batch(&vectors);
    let vetoed_count = verdicts.iter().filter(|v| v.vetoed).count();
    info!(
        signals = verdicts.len(),
        vetoed = vetoed_count,
        model = %engine.parameters().metadata.version,
        "Scored signals"
    );

    Ok(ScoreReport {
        model_version: engine.parameters().metadata.version.clone(),
        model_source: engine.parameters().metadata.source,
        min_probability: engine.policy().min_probability,
        vetoed_count,
        verdicts,
    })
}
