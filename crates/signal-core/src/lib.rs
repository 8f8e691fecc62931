//! # Signal Core
//!
//! 소프트 시그널(내부자 매수, 의원 거래, 애널리스트 상향 등) 의사결정 엔진의
//! 공통 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분류기, 시뮬레이터, 리스크 배분기가 공유하는 기본 타입을 제공합니다:
//! - 일봉 가격 데이터 (`PriceBar`, `PriceSeries`)
//! - 시장 레짐 분류 (`MarketRegime`)
//! - 섹터 식별자 (`Sector`)
//! - 이름 기반 feature vector 및 feature 카탈로그
//! - 설정 관리
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod features;
pub mod logging;
pub mod settings;
pub mod types;

pub use domain::*;
pub use error::*;
pub use features::{FeatureGroup, FeatureVector, FEATURE_NAMES};
pub use logging::*;
pub use settings::*;
pub use types::*;
