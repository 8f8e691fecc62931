//! Feature 표준화.
//!
//! 학습 세트에서 feature별 평균과 모집단 표준편차를 계산하고, 추론 시
//! 같은 통계로 `(x - mean) / std`를 적용합니다.

use signal_core::FeatureVector;
use std::collections::{BTreeMap, BTreeSet};

/// 분산이 0인 feature에 사용하는 표준편차.
pub const ZERO_VARIANCE_STD: f64 = 1.0;

/// Feature별 표준화 통계.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalizer {
    pub means: BTreeMap<String, f64>,
    pub stds: BTreeMap<String, f64>,
}

impl Normalizer {
    /// 벡터 집합에서 통계를 계산합니다.
    ///
    /// 키 집합은 모든 벡터 키의 합집합이며, 어떤 벡터에 없는 키는 0으로 셉니다.
    pub fn fit<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureVector>,
        I::IntoIter: Clone,
    {
        let vectors = vectors.into_iter();

        let keys: BTreeSet<String> = vectors
            .clone()
            .flat_map(|v| v.keys().map(str::to_string).collect::<Vec<_>>())
            .collect();

        let n = vectors.clone().count();
        let mut means = BTreeMap::new();
        let mut stds = BTreeMap::new();

        if n == 0 {
            return Self { means, stds };
        }

        for key in keys {
            let mean = vectors.clone().map(|v| v.get(&key)).sum::<f64>() / n as f64;
            let variance = vectors
                .clone()
                .map(|v| (v.get(&key) - mean).powi(2))
                .sum::<f64>()
                / n as f64;
            let std = variance.sqrt();
            let std = if std > 0.0 && std.is_finite() {
                std
            } else {
                ZERO_VARIANCE_STD
            };

            means.insert(key.clone(), mean);
            stds.insert(key, std);
        }

        Self { means, stds }
    }

    /// 저장된 통계로 normalizer를 구성합니다.
    pub fn from_stats(means: BTreeMap<String, f64>, stds: BTreeMap<String, f64>) -> Self {
        Self { means, stds }
    }

    /// 단일 feature 값을 표준화합니다. 통계가 없는 키는 평균 0, 표준편차 1입니다.
    pub fn standardize(&self, key: &str, value: f64) -> f64 {
        standardize_with(&self.means, &self.stds, key, value)
    }

    /// `keys` 순서대로 표준화된 dense 행을 생성합니다.
    pub fn transform(&self, vector: &FeatureVector, keys: &[String]) -> Vec<f64> {
        keys.iter()
            .map(|key| self.standardize(key, vector.get(key)))
            .collect()
    }

    /// 통계가 있는 feature 키 (정렬됨).
    pub fn keys(&self) -> Vec<String> {
        self.means.keys().cloned().collect()
    }
}

/// 평균/표준편차 맵으로 `(value - mean) / std`를 계산합니다.
///
/// `Normalizer`와 저장된 `ModelParameters`가 같이 사용합니다.
/// 0 이하이거나 유한하지 않은 표준편차는 `ZERO_VARIANCE_STD`로 대체됩니다.
pub(crate) fn standardize_with(
    means: &BTreeMap<String, f64>,
    stds: &BTreeMap<String, f64>,
    key: &str,
    value: f64,
) -> f64 {
    let mean = means.get(key).copied().unwrap_or(0.0);
    let std = stds
        .get(key)
        .copied()
        .filter(|s| *s > 0.0 && s.is_finite())
        .unwrap_or(ZERO_VARIANCE_STD);
    (value - mean) / std
}
