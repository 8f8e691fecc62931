//! 분류 성능 지표.
//!
//! 50% 임계값 기준 정확도/정밀도/재현율/F1, ROC AUC, 10분위 보정 오차.
//! 빈 입력에서는 실패하지 않고 0 (AUC는 0.5)을 반환합니다.

use crate::model::ModelParameters;
use crate::trainer::TrainingExample;
use serde::{Deserialize, Serialize};

/// 양성 판정 임계값 (확률, 0 ~ 100).
pub const DECISION_THRESHOLD: f64 = 50.0;

/// 보정 오차 버킷 수.
const CALIBRATION_BUCKETS: usize = 10;

/// 이진 분류 혼동 행렬.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    /// (확률, 실제 레이블) 쌍에서 계산합니다.
    pub fn from_scored(scored: &[(f64, bool)]) -> Self {
        let mut cm = Self::default();
        for &(probability, actual) in scored {
            match (actual, probability >= DECISION_THRESHOLD) {
                (true, true) => cm.true_positive += 1,
                (false, false) => cm.true_negative += 1,
                (false, true) => cm.false_positive += 1,
                (true, false) => cm.false_negative += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        safe_div(
            (self.true_positive + self.true_negative) as f64,
            self.total() as f64,
        )
    }

    pub fn precision(&self) -> f64 {
        safe_div(
            self.true_positive as f64,
            (self.true_positive + self.false_positive) as f64,
        )
    }

    pub fn recall(&self) -> f64 {
        safe_div(
            self.true_positive as f64,
            (self.true_positive + self.false_negative) as f64,
        )
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        safe_div(2.0 * p * r, p + r)
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// 평가 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub sample_count: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// ROC 곡선 아래 면적 (0.0 ~ 1.0)
    pub auc: f64,
    /// 버킷 크기 가중 평균 |예측 확률 - 관측 양성 비율| (0.0 ~ 1.0)
    pub calibration_error: f64,
    pub confusion: ConfusionMatrix,
}

impl ClassificationMetrics {
    /// (확률 0~100, 실제 레이블) 쌍에서 지표를 계산합니다.
    pub fn from_scored(scored: &[(f64, bool)]) -> Self {
        let confusion = ConfusionMatrix::from_scored(scored);
        Self {
            sample_count: scored.len(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            auc: roc_auc(scored),
            calibration_error: calibration_error(scored),
            confusion,
        }
    }
}

/// 샘플 세트에서 모델을 평가합니다.
pub fn evaluate(examples: &[TrainingExample], params: &ModelParameters) -> ClassificationMetrics {
    ClassificationMetrics::from_scored(&score_examples(examples, params))
}

/// 50% 임계값 정확도. 빈 입력은 0입니다.
pub fn accuracy(examples: &[TrainingExample], params: &ModelParameters) -> f64 {
    ConfusionMatrix::from_scored(&score_examples(examples, params)).accuracy()
}

fn score_examples(examples: &[TrainingExample], params: &ModelParameters) -> Vec<(f64, bool)> {
    examples
        .iter()
        .map(|ex| (params.score(&ex.features), ex.is_positive()))
        .collect()
}

/// 순위 기반 사다리꼴 적분 ROC AUC.
///
/// 같은 점수는 하나의 ROC 점으로 묶습니다. NaN/무한대 점수는 제외하며,
/// 남은 샘플에 한 클래스만 있으면 0.5입니다.
pub fn roc_auc(scored: &[(f64, bool)]) -> f64 {
    let mut sorted = finite_scores(scored);
    let positives = sorted.iter().filter(|(_, y)| *y).count() as f64;
    let negatives = sorted.len() as f64 - positives;
    if positives == 0.0 || negatives == 0.0 {
        return 0.5;
    }

    sorted.sort_by(|a, b| b.0.total_cmp(&a.0));

    let (mut tp, mut fp) = (0.0, 0.0);
    let (mut prev_tpr, mut prev_fpr) = (0.0, 0.0);
    let mut auc = 0.0;

    let mut i = 0;
    while i < sorted.len() {
        let score = sorted[i].0;
        while i < sorted.len() && sorted[i].0 == score {
            if sorted[i].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }

        let tpr = tp / positives;
        let fpr = fp / negatives;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_tpr = tpr;
        prev_fpr = fpr;
    }

    auc
}

/// 10분위 보정 오차. NaN/무한대 점수는 제외합니다.
pub fn calibration_error(scored: &[(f64, bool)]) -> f64 {
    let scored = finite_scores(scored);
    if scored.is_empty() {
        return 0.0;
    }

    let mut sums = [0.0f64; CALIBRATION_BUCKETS];
    let mut hits = [0usize; CALIBRATION_BUCKETS];
    let mut counts = [0usize; CALIBRATION_BUCKETS];

    for &(probability, actual) in &scored {
        let p = probability.clamp(0.0, 100.0) / 100.0;
        let bucket = ((p * CALIBRATION_BUCKETS as f64) as usize).min(CALIBRATION_BUCKETS - 1);
        sums[bucket] += p;
        counts[bucket] += 1;
        if actual {
            hits[bucket] += 1;
        }
    }

    let total = scored.len() as f64;
    (0..CALIBRATION_BUCKETS)
        .filter(|&b| counts[b] > 0)
        .map(|b| {
            let n = counts[b] as f64;
            let gap = (sums[b] / n - hits[b] as f64 / n).abs();
            gap * n / total
        })
        .sum()
}

fn finite_scores(scored: &[(f64, bool)]) -> Vec<(f64, bool)> {
    scored.iter().copied().filter(|(p, _)| p.is_finite()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix() {
        let scored = [(80.0, true), (60.0, false), (40.0, true), (10.0, false), (50.0, true)];
        let cm = ConfusionMatrix::from_scored(&scored);

        assert_eq!(cm.true_positive, 2);
        assert_eq!(cm.false_positive, 1);
        assert_eq!(cm.false_negative, 1);
        assert_eq!(cm.true_negative, 1);
        assert!((cm.accuracy() - 0.6).abs() < 1e-12);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.f1() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let metrics = ClassificationMetrics::from_scored(&[]);

        assert_eq!(metrics.sample_count, 0);
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.auc, 0.5);
        assert_eq!(metrics.calibration_error, 0.0);
    }

    #[test]
    fn test_auc() {
        let perfect = [(90.0, true), (80.0, true), (20.0, false), (10.0, false)];
        assert!((roc_auc(&perfect) - 1.0).abs() < 1e-12);

        let inverted = [(90.0, false), (80.0, false), (20.0, true), (10.0, true)];
        assert!(roc_auc(&inverted).abs() < 1e-12);

        // 모두 같은 점수 → 대각선
        let tied = [(50.0, true), (50.0, false), (50.0, true), (50.0, false)];
        assert!((roc_auc(&tied) - 0.5).abs() < 1e-12);

        let single_class = [(90.0, true), (10.0, true)];
        assert_eq!(roc_auc(&single_class), 0.5);
    }

    #[test]
    fn test_non_finite_scores_are_skipped() {
        let scored = [
            (90.0, true),
            (f64::NAN, false),
            (80.0, true),
            (f64::INFINITY, false),
            (20.0, false),
            (f64::NAN, true),
            (10.0, false),
        ];
        assert!((roc_auc(&scored) - 1.0).abs() < 1e-12);

        let metrics = ClassificationMetrics::from_scored(&scored);
        assert_eq!(metrics.sample_count, 7);
        assert!(metrics.auc.is_finite());
        assert!(metrics.calibration_error.is_finite());

        assert_eq!(roc_auc(&[(f64::NAN, true), (f64::NAN, false)]), 0.5);
    }

    #[test]
    fn test_calibration_error() {
        // 95% 예측 두 건 중 한 건 양성 → |0.95 - 0.5| = 0.45
        // 5% 예측 두 건 모두 음성 → |0.05 - 0| = 0.05
        let scored = [(95.0, true), (95.0, false), (5.0, false), (5.0, false)];
        assert!((calibration_error(&scored) - 0.25).abs() < 1e-12);

        // 100은 마지막 버킷
        let top = [(100.0, true)];
        assert!(calibration_error(&top).abs() < 1e-12);
    }
}
