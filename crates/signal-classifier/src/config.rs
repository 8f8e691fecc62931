//! 학습 설정.
//!
//! 정규화, 가중치 초기화, 학습률 스케줄, 클래스 가중치 옵션을 하나의
//! 명시적 구조체로 묶습니다. `train` 진입 시 한 번 검증됩니다.

use crate::error::{MlError, MlResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 가중치 정규화 방식. 절편은 정규화하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Regularization {
    /// 정규화 없음
    None,
    /// L1 (Lasso): `λ·sign(w)`
    L1 { lambda: f64 },
    /// L2 (Ridge): `λ·w`
    L2 { lambda: f64 },
    /// Elastic Net: `λ·(ratio·sign(w) + (1-ratio)·w)`
    ElasticNet { lambda: f64, l1_ratio: f64 },
}

impl Default for Regularization {
    fn default() -> Self {
        Regularization::L2 { lambda: 0.01 }
    }
}

impl Regularization {
    /// 가중치 하나에 대한 정규화 gradient 항.
    pub fn gradient(&self, weight: f64) -> f64 {
        match *self {
            Regularization::None => 0.0,
            Regularization::L1 { lambda } => lambda * sign(weight),
            Regularization::L2 { lambda } => lambda * weight,
            Regularization::ElasticNet { lambda, l1_ratio } => {
                lambda * (l1_ratio * sign(weight) + (1.0 - l1_ratio) * weight)
            }
        }
    }
}

/// 0에서 0을 반환하는 부호 함수 (`f64::signum`은 +0.0에서 1.0을 반환).
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 가중치 초기화 전략.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// 기본 모델의 가중치와 절편을 재사용 (없는 feature는 0)
    Baseline,
    /// 모두 0
    #[default]
    Zero,
    /// [-1, 1] 균등 분포
    Uniform,
    /// Xavier 스케일 균등 분포: `±sqrt(6 / (n_features + 1))`
    Xavier,
    /// [-0.1, 0.1] 균등 분포
    SmallRandom,
}

/// 반복별 학습률 스케줄.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningRateSchedule {
    /// 고정 학습률
    #[default]
    Constant,
    /// `step_size` 반복마다 `gamma`배
    StepDecay { step_size: usize, gamma: f64 },
    /// `lr · exp(-decay_rate · t)`
    Exponential { decay_rate: f64 },
    /// 마지막 반복에서 0이 되는 코사인 감쇠
    Cosine,
}

impl LearningRateSchedule {
    /// `iteration`번째 반복(0부터)의 학습률.
    pub fn rate(&self, base: f64, iteration: usize, total: usize) -> f64 {
        match *self {
            LearningRateSchedule::Constant => base,
            LearningRateSchedule::StepDecay { step_size, gamma } => {
                let steps = (iteration / step_size.max(1)) as i32;
                base * gamma.powi(steps)
            }
            LearningRateSchedule::Exponential { decay_rate } => {
                base * (-decay_rate * iteration as f64).exp()
            }
            LearningRateSchedule::Cosine => {
                if total <= 1 {
                    return base;
                }
                let progress = iteration as f64 / (total - 1) as f64;
                base * 0.5 * (1.0 + (PI * progress).cos())
            }
        }
    }
}

/// 레이블 불균형 보정을 위한 클래스 가중치 정책.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassWeighting {
    /// 모든 샘플 가중치 1
    #[default]
    None,
    /// 클래스 빈도의 역수: `n / (2 · n_class)`
    Balanced,
    /// 클래스별 명시 가중치
    Explicit { negative: f64, positive: f64 },
}

impl ClassWeighting {
    /// (음성 클래스 가중치, 양성 클래스 가중치)를 계산합니다.
    ///
    /// 샘플이 없는 클래스의 가중치는 1입니다.
    pub fn resolve(&self, negatives: usize, positives: usize) -> (f64, f64) {
        match *self {
            ClassWeighting::None => (1.0, 1.0),
            ClassWeighting::Balanced => {
                let n = (negatives + positives) as f64;
                let weight = |count: usize| {
                    if count == 0 {
                        1.0
                    } else {
                        n / (2.0 * count as f64)
                    }
                };
                (weight(negatives), weight(positives))
            }
            ClassWeighting::Explicit { negative, positive } => (negative, positive),
        }
    }
}

/// 로지스틱 회귀 학습 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// 기본 학습률 (기본값: 0.01)
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// 전체 배치 경사 하강 반복 횟수 (기본값: 1000)
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// 정규화 방식 (기본값: L2, λ=0.01)
    #[serde(default)]
    pub regularization: Regularization,

    /// 가중치 초기화 전략 (기본값: Zero)
    #[serde(default)]
    pub weight_init: WeightInit,

    /// 난수 초기화 시드 (기본값: 42)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// 모멘텀 계수, 0이면 일반 경사 하강 (기본값: 0.0)
    #[serde(default)]
    pub momentum: f64,

    /// 학습률 스케줄 (기본값: Constant)
    #[serde(default)]
    pub schedule: LearningRateSchedule,

    /// 클래스 가중치 정책 (기본값: None)
    #[serde(default)]
    pub class_weighting: ClassWeighting,
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_iterations() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            iterations: default_iterations(),
            regularization: Regularization::default(),
            weight_init: WeightInit::default(),
            seed: default_seed(),
            momentum: 0.0,
            schedule: LearningRateSchedule::default(),
            class_weighting: ClassWeighting::default(),
        }
    }
}

impl TrainingConfig {
    /// 기본값으로 새 설정을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 학습률 설정.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// 반복 횟수 설정.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// 정규화 설정.
    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = regularization;
        self
    }

    /// 초기화 전략과 시드 설정.
    pub fn with_weight_init(mut self, weight_init: WeightInit, seed: u64) -> Self {
        self.weight_init = weight_init;
        self.seed = seed;
        self
    }

    /// 모멘텀 설정.
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// 학습률 스케줄 설정.
    pub fn with_schedule(mut self, schedule: LearningRateSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// 클래스 가중치 정책 설정.
    pub fn with_class_weighting(mut self, class_weighting: ClassWeighting) -> Self {
        self.class_weighting = class_weighting;
        self
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> MlResult<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(MlError::InvalidConfig(
                "learning_rate must be a positive finite number".into(),
            ));
        }

        if self.iterations == 0 {
            return Err(MlError::InvalidConfig(
                "iterations must be greater than 0".into(),
            ));
        }

        if !(0.0..1.0).contains(&self.momentum) {
            return Err(MlError::InvalidConfig(
                "momentum must be in [0, 1)".into(),
            ));
        }

        match self.regularization {
            Regularization::None => {}
            Regularization::L1 { lambda } | Regularization::L2 { lambda } => {
                check_lambda(lambda)?;
            }
            Regularization::ElasticNet { lambda, l1_ratio } => {
                check_lambda(lambda)?;
                if !(0.0..=1.0).contains(&l1_ratio) {
                    return Err(MlError::InvalidConfig(
                        "elastic net l1_ratio must be in [0, 1]".into(),
                    ));
                }
            }
        }

        match self.schedule {
            LearningRateSchedule::StepDecay { step_size, gamma } => {
                if step_size == 0 {
                    return Err(MlError::InvalidConfig(
                        "step decay step_size must be greater than 0".into(),
                    ));
                }
                if !(gamma > 0.0 && gamma <= 1.0) {
                    return Err(MlError::InvalidConfig(
                        "step decay gamma must be in (0, 1]".into(),
                    ));
                }
            }
            LearningRateSchedule::Exponential { decay_rate } => {
                if !(decay_rate >= 0.0 && decay_rate.is_finite()) {
                    return Err(MlError::InvalidConfig(
                        "exponential decay_rate must be non-negative".into(),
                    ));
                }
            }
            LearningRateSchedule::Constant | LearningRateSchedule::Cosine => {}
        }

        if let ClassWeighting::Explicit { negative, positive } = self.class_weighting {
            if !(negative > 0.0 && positive > 0.0) {
                return Err(MlError::InvalidConfig(
                    "explicit class weights must be positive".into(),
                ));
            }
        }

        Ok(())
    }
}

fn check_lambda(lambda: f64) -> MlResult<()> {
    if lambda >= 0.0 && lambda.is_finite() {
        Ok(())
    } else {
        Err(MlError::InvalidConfig(
            "regularization lambda must be non-negative".into(),
        ))
    }
}
