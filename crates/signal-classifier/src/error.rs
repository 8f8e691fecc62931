//! 분류기 모듈 에러 타입.

use thiserror::Error;

/// 분류기 작업에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// 모델 파라미터 로드 에러
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// 모델 파라미터 저장 에러
    #[error("Model save error: {0}")]
    ModelSave(String),

    /// 학습/비토 설정 검증 실패
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// 분류기 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 입력이나 설정을 고쳐서 재시도할 수 있는 에러인지 확인.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MlError::InvalidConfig(_) | MlError::InvalidInput(_))
    }

    /// 기본 모델로 폴백해야 하는 에러인지 확인.
    pub fn requires_fallback(&self) -> bool {
        matches!(self, MlError::ModelLoad(_) | MlError::Serialization(_))
    }
}

impl From<serde_json::Error> for MlError {
    fn from(err: serde_json::Error) -> Self {
        MlError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MlError::ModelLoad("file not found".to_string());
        assert_eq!(err.to_string(), "Model load error: file not found");

        let err = MlError::InvalidConfig("learning_rate must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: learning_rate must be positive"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(MlError::InvalidInput("label 2".to_string()).is_recoverable());
        assert!(!MlError::ModelLoad("corrupted".to_string()).is_recoverable());

        assert!(MlError::ModelLoad("missing".to_string()).requires_fallback());
        assert!(MlError::Serialization("eof".to_string()).requires_fallback());
        assert!(!MlError::ModelSave("read-only".to_string()).requires_fallback());
    }
}
