//! # Signal Classifier
//!
//! 소프트 시그널 진입의 성공 확률을 추정하는 정규화 로지스틱 회귀 분류기.
//!
//! ## 구성
//!
//! - [`normalizer`]: feature별 평균/표준편차 표준화
//! - [`config`]: 학습 설정 (정규화, 초기화, 학습률 스케줄, 클래스 가중치)
//! - [`trainer`]: 전체 배치 경사 하강 학습
//! - [`model`]: 모델 파라미터, 기본 모델, 스코어링
//! - [`metrics`]: 정확도/정밀도/재현율/F1, AUC, 보정 오차
//! - [`store`]: 파라미터 저장소와 기본 모델 폴백
//! - [`veto`]: 최소 확률 기반 진입 비토
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use signal_classifier::{train, TrainingConfig, VetoEngine, VetoPolicy};
//!
//! let params = train(&examples, &TrainingConfig::default())?;
//! let engine = VetoEngine::new(params, VetoPolicy::default())?;
//! let verdict = engine.evaluate(&features);
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod normalizer;
pub mod store;
pub mod trainer;
pub mod veto;

pub use config::{ClassWeighting, LearningRateSchedule, Regularization, TrainingConfig, WeightInit};
pub use error::{MlError, MlResult};
pub use metrics::{evaluate, ClassificationMetrics, ConfusionMatrix};
pub use model::{
    score, FeatureContribution, ModelMetadata, ModelParameters, ModelSource, BASELINE_VERSION,
};
pub use normalizer::Normalizer;
pub use store::{load_active_parameters, resolve_active_parameters, JsonFileStore, ParameterStore};
pub use trainer::{train, train_with_holdout, TrainingExample};
pub use veto::{VetoEngine, VetoPolicy, VetoVerdict};
