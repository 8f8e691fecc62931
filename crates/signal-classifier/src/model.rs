//! 로지스틱 회귀 모델 파라미터와 스코어링.
//!
//! `logit = intercept + Σ w_i · (x_i - mean_i) / std_i`,
//! `probability = 100 · sigmoid(logit)`.

use crate::normalizer::standardize_with;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{FeatureGroup, FeatureVector};
use std::collections::BTreeMap;

/// 기본 모델 버전 태그.
pub const BASELINE_VERSION: &str = "baseline-v1";

/// 기본 모델 절편. 중립 입력에서 약 45%를 출력합니다.
const BASELINE_INTERCEPT: f64 = -0.20;

/// 기준 점수 feature의 중심값 (0~10 척도).
const CRITERIA_CENTER: f64 = 5.0;

/// 파라미터 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// 학습으로 생성됨
    #[default]
    Trained,
    /// 고정된 기본 가중치
    Baseline,
}

/// 모델 메타데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// 버전 태그
    pub version: String,
    /// 학습 샘플 수 (기본 모델은 0)
    pub training_samples: usize,
    /// 검증 정확도 (0.0 ~ 1.0)
    pub validation_accuracy: f64,
    /// 학습 시각 (UTC)
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    /// 파라미터 출처
    #[serde(default)]
    pub source: ModelSource,
    /// 마지막 반복의 학습 log-loss
    #[serde(default)]
    pub final_loss: Option<f64>,
}

/// 가중치 하나가 특정 입력에 기여한 값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// 원시 입력 값
    pub value: f64,
    pub weight: f64,
    /// `weight · standardized(value)`
    pub contribution: f64,
}

/// 학습되었거나 고정된, 불변 모델 파라미터 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub intercept: f64,
    pub weights: BTreeMap<String, f64>,
    pub means: BTreeMap<String, f64>,
    pub stds: BTreeMap<String, f64>,
    pub metadata: ModelMetadata,
}

impl ModelParameters {
    /// 수작업으로 설정한 기본 모델.
    ///
    /// 학습된 스냅샷이 없거나 유효하지 않을 때만 사용합니다.
    pub fn baseline() -> Self {
        let weights: BTreeMap<String, f64> = [
            // 기준별 점수
            ("insider_score", 0.18),
            ("congress_score", 0.12),
            ("analyst_score", 0.10),
            ("institutional_score", 0.08),
            ("earnings_score", 0.08),
            ("momentum_score", 0.12),
            ("quality_score", 0.06),
            ("sentiment_score", 0.05),
            ("catalyst_score", 0.06),
            ("signal_confluence_score", 0.15),
            // 레짐
            ("regime_bullish", 0.35),
            ("regime_crash", -0.60),
            ("vix_percentile", -0.40),
            ("spy_above_200ma", 0.25),
            // 기술 지표
            ("price_vs_sma50", 0.80),
            ("rsi_oversold", 0.15),
            ("rsi_overbought", -0.30),
            ("macd_cross_bullish", 0.20),
            // 거래량
            ("volume_ratio_20d", 0.10),
            ("obv_slope", 0.15),
            // 지지/저항
            ("near_support", 0.20),
            ("breakout_confirmed", 0.30),
            ("timeframe_alignment", 0.25),
            // 패턴
            ("bullish_divergence", 0.25),
            ("bearish_divergence", -0.30),
            ("double_bottom", 0.20),
            ("head_and_shoulders", -0.35),
            // 계절성
            ("is_earnings_season", -0.05),
            ("sell_in_may_window", -0.10),
            ("fomc_week", -0.10),
        ]
        .into_iter()
        .map(|(k, w)| (k.to_string(), w))
        .collect();

        let means = weights
            .keys()
            .map(|k| {
                let center = if FeatureGroup::of(k) == Some(FeatureGroup::CriteriaScores) {
                    CRITERIA_CENTER
                } else {
                    0.0
                };
                (k.clone(), center)
            })
            .collect();
        let stds = weights.keys().map(|k| (k.clone(), 1.0)).collect();

        Self {
            intercept: BASELINE_INTERCEPT,
            weights,
            means,
            stds,
            metadata: ModelMetadata {
                version: BASELINE_VERSION.to_string(),
                training_samples: 0,
                validation_accuracy: 0.0,
                trained_at: None,
                source: ModelSource::Baseline,
                final_loss: None,
            },
        }
    }

    /// 기본 모델인지 확인.
    pub fn is_baseline(&self) -> bool {
        self.metadata.source == ModelSource::Baseline
    }

    /// 추론에 사용할 수 있는 학습된 스냅샷인지 확인.
    ///
    /// 학습 샘플이 있어야 하고, 모든 수치가 유한하며 표준편차가 양수여야 합니다.
    pub fn is_valid(&self) -> bool {
        self.metadata.training_samples > 0
            && self.intercept.is_finite()
            && self.weights.values().all(|w| w.is_finite())
            && self.means.values().all(|m| m.is_finite())
            && self.stds.values().all(|s| s.is_finite() && *s > 0.0)
    }

    /// 저장된 통계로 표준화합니다. 통계가 없는 키는 평균 0, 표준편차 1입니다.
    fn standardized(&self, key: &str, value: f64) -> f64 {
        standardize_with(&self.means, &self.stds, key, value)
    }

    /// 선형 결합 값 (logit).
    ///
    /// 가중치가 없는 입력 키는 무시되고, 입력에 없는 키는 0으로 취급됩니다.
    pub fn logit(&self, vector: &FeatureVector) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .map(|(key, w)| w * self.standardized(key, vector.get(key)))
                .sum::<f64>()
    }

    /// 성공 확률 (0 ~ 100).
    pub fn score(&self, vector: &FeatureVector) -> f64 {
        probability_from_logit(self.logit(vector))
    }

    /// 절대 가중치 기준 상위 `n`개 feature.
    pub fn top_features(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .weights
            .iter()
            .map(|(k, w)| (k.clone(), *w))
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// 입력별 logit 기여도 (절대값 내림차순).
    pub fn contributions(&self, vector: &FeatureVector) -> Vec<FeatureContribution> {
        let mut items: Vec<FeatureContribution> = self
            .weights
            .iter()
            .map(|(name, weight)| {
                let value = vector.get(name);
                FeatureContribution {
                    name: name.clone(),
                    value,
                    weight: *weight,
                    contribution: weight * self.standardized(name, value),
                }
            })
            .collect();
        items.sort_by(|a, b| {
            b.contribution
                .abs()
                .total_cmp(&a.contribution.abs())
                .then_with(|| a.name.cmp(&b.name))
        });
        items
    }
}

/// 수치적으로 안정적인 sigmoid.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

/// logit을 [0, 100] 확률로 변환합니다. NaN은 50으로 처리합니다.
pub fn probability_from_logit(logit: f64) -> f64 {
    if logit.is_nan() {
        return 50.0;
    }
    (100.0 * sigmoid(logit)).clamp(0.0, 100.0)
}

/// `params`로 `vector`의 성공 확률(0 ~ 100)을 계산합니다.
pub fn score(vector: &FeatureVector, params: &ModelParameters) -> f64 {
    params.score(vector)
}
