//! 의사결정 엔진의 공통 에러 타입.
//!
//! 정상적인 "데이터 부족" 상황은 에러가 아니라 `None`으로 표현됩니다.
//! 이 모듈의 에러는 입력 자체가 잘못된 경우에만 사용됩니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 가격 봉 불변식 위반 (high/low 범위)
    #[error("잘못된 가격 봉: {0}")]
    InvalidBar(String),

    /// 가격 시계열 정렬/중복 위반
    #[error("잘못된 가격 시계열: {0}")]
    InvalidSeries(String),

    /// 파싱 에러 (CSV, 날짜, 숫자)
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 입력 데이터를 고쳐서 재시도하면 되는 에러인지 확인합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidBar(_)
                | CoreError::InvalidSeries(_)
                | CoreError::Parse(_)
                | CoreError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
