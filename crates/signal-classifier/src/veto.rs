//! 진입 비토 엔진.
//!
//! 활성 모델로 성공 확률을 계산하고, 최소 확률 미만이면 진입을 거부합니다.

use crate::error::{MlError, MlResult};
use crate::model::{FeatureContribution, ModelParameters, ModelSource};
use crate::store::{load_active_parameters, ParameterStore};
use serde::{Deserialize, Serialize};
use signal_core::{FeatureVector, ModelSettings};
use tracing::debug;

/// 판정 근거로 보고하는 상위 기여 feature 수.
const DRIVER_COUNT: usize = 3;

/// 비토 정책.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VetoPolicy {
    /// 이 확률(0 ~ 100) 미만이면 비토 (기본값: 45)
    #[serde(default = "default_min_probability")]
    pub min_probability: f64,
}

fn default_min_probability() -> f64 {
    45.0
}

impl Default for VetoPolicy {
    fn default() -> Self {
        Self {
            min_probability: default_min_probability(),
        }
    }
}

impl VetoPolicy {
    pub fn new(min_probability: f64) -> Self {
        Self { min_probability }
    }

    pub fn validate(&self) -> MlResult<()> {
        if !(0.0..=100.0).contains(&self.min_probability) {
            return Err(MlError::InvalidConfig(format!(
                "min_probability must be in [0, 100], got {}",
                self.min_probability
            )));
        }
        Ok(())
    }
}

/// 비토 판정 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VetoVerdict {
    /// 성공 확률 (0 ~ 100)
    pub probability: f64,
    /// 50%에서 멀수록 높은 신뢰도 (0 ~ 100)
    pub confidence: f64,
    pub vetoed: bool,
    pub reason: String,
    pub model_version: String,
    pub model_source: ModelSource,
    /// logit 기여도 상위 feature
    pub drivers: Vec<FeatureContribution>,
}

/// 불변 모델 파라미터와 정책을 가진 비토 엔진.
///
/// 스코어링은 엔진을 변경하지 않으므로 여러 스레드에서 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct VetoEngine {
    params: ModelParameters,
    policy: VetoPolicy,
}

impl VetoEngine {
    pub fn new(params: ModelParameters, policy: VetoPolicy) -> MlResult<Self> {
        policy.validate()?;
        Ok(Self { params, policy })
    }

    /// 저장소에서 활성 파라미터를 결정해 엔진을 만듭니다.
    pub fn from_store(store: &dyn ParameterStore, policy: VetoPolicy) -> MlResult<Self> {
        Self::new(load_active_parameters(store), policy)
    }

    /// 설정 파일의 `model` 섹션으로 엔진을 만듭니다.
    pub fn from_settings(settings: &ModelSettings, params: ModelParameters) -> MlResult<Self> {
        Self::new(params, VetoPolicy::new(settings.veto_min_probability))
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    pub fn policy(&self) -> &VetoPolicy {
        &self.policy
    }

    /// 성공 확률 (0 ~ 100).
    pub fn score(&self, vector: &FeatureVector) -> f64 {
        self.params.score(vector)
    }

    /// 진입 여부를 판정합니다.
    pub fn evaluate(&self, vector: &FeatureVector) -> VetoVerdict {
        let probability = self.score(vector);
        let confidence = ((probability - 50.0).abs() * 2.0).clamp(0.0, 100.0);
        let vetoed = probability < self.policy.min_probability;

        let reason = if vetoed {
            format!(
                "success probability {:.1}% below minimum {:.1}%",
                probability, self.policy.min_probability
            )
        } else {
            format!(
                "success probability {:.1}% meets minimum {:.1}%",
                probability, self.policy.min_probability
            )
        };

        let mut drivers = self.params.contributions(vector);
        drivers.truncate(DRIVER_COUNT);

        debug!(
            probability,
            confidence,
            vetoed,
            model = %self.params.metadata.version,
            "Veto evaluated"
        );

        VetoVerdict {
            probability,
            confidence,
            vetoed,
            reason,
            model_version: self.params.metadata.version.clone(),
            model_source: self.params.metadata.source,
            drivers,
        }
    }

    /// 여러 벡터를 순서대로 판정합니다.
    pub fn evaluate_batch(&self, vectors: &[FeatureVector]) -> Vec<VetoVerdict> {
        vectors.iter().map(|v| self.evaluate(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::FeatureGroup;

    fn neutral() -> FeatureVector {
        FeatureGroup::CriteriaScores
            .names()
            .iter()
            .map(|n| (*n, 5.0))
            .collect()
    }

    fn engine(min_probability: f64) -> VetoEngine {
        VetoEngine::new(ModelParameters::baseline(), VetoPolicy::new(min_probability)).unwrap()
    }

    #[test]
    fn test_policy_validation() {
        assert!(VetoPolicy::default().validate().is_ok());
        assert_eq!(VetoPolicy::default().min_probability, 45.0);
        assert!(VetoPolicy::new(120.0).validate().is_err());
        assert!(VetoEngine::new(ModelParameters::baseline(), VetoPolicy::new(-1.0)).is_err());
    }

    #[test]
    fn test_crash_regime_vetoed() {
        let verdict = engine(45.0).evaluate(&neutral().with("regime_crash", 1.0));

        assert!(verdict.vetoed);
        assert!(verdict.probability < 45.0);
        assert!(verdict.reason.contains("below minimum"));
        assert_eq!(verdict.model_source, ModelSource::Baseline);
        assert_eq!(verdict.drivers.len(), 3);
        assert_eq!(verdict.drivers[0].name, "regime_crash");
    }

    #[test]
    fn test_strong_signal_passes() {
        let vector = neutral()
            .with("insider_score", 10.0)
            .with("regime_bullish", 1.0)
            .with("breakout_confirmed", 1.0);
        let verdict = engine(45.0).evaluate(&vector);

        assert!(!verdict.vetoed);
        assert!(verdict.probability > 50.0);
        let expected = (verdict.probability - 50.0) * 2.0;
        assert!((verdict.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bounds() {
        let e = engine(45.0);
        let extreme = neutral().with("price_vs_sma50", 1e6);
        let verdict = e.evaluate(&extreme);

        assert!(verdict.probability <= 100.0);
        assert!(verdict.confidence <= 100.0);
        assert!(verdict.confidence >= 0.0);
    }

    #[test]
    fn test_batch_preserves_order() {
        let e = engine(45.0);
        let vectors = vec![neutral().with("regime_crash", 1.0), neutral()];
        let verdicts = e.evaluate_batch(&vectors);

        assert_eq!(verdicts.len(), 2);
        assert!(verdicts[0].vetoed);
        assert!(verdicts[0].probability < verdicts[1].probability);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VetoEngine>();
    }
}
