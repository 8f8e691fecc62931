//! tracing 기반 로깅 초기화.
//!
//! 결과 JSON은 stdout, 진단 로그는 항상 stderr로 분리됩니다.
//! 필터 우선순위: `RUST_LOG` → 설정 파일의 `logging.level`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 여러 줄, 색상 (대화형 실행)
    #[default]
    Pretty,
    /// 한 줄 JSON, 이벤트 필드 평탄화 (배치 학습/시뮬레이션 수집용)
    Json,
    /// 한 줄 텍스트
    Compact,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(CoreError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "info,signal_classifier=debug")
    pub level: String,
    pub format: LogFormat,
    /// `decision_span!` 진입/종료 이벤트 출력
    pub span_events: bool,
    /// 모듈 경로 출력
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            span_events: false,
            show_target: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 의사결정 span의 시작/종료를 로그로 남깁니다 (종료 시 소요 시간 포함).
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.show_target = enabled;
        self
    }

    /// `RUST_LOG`, `LOG_FORMAT` 환경 변수로 설정을 만듭니다.
    ///
    /// 알 수 없는 `LOG_FORMAT` 값은 기본 형식으로 대체됩니다.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.format = format;
        }
        config
    }

    fn filter(&self) -> CoreResult<EnvFilter> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| CoreError::Config(format!("invalid log filter '{}': {e}", self.level)))
    }
}

/// 전역 subscriber를 설치합니다.
///
/// 프로세스당 한 번만 성공하며, 두 번째 호출은 `CoreError::Config`를 반환합니다.
///
/// ```no_run
/// use signal_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json))?;
/// # Ok::<(), signal_core::CoreError>(())
/// ```
pub fn init_logging(config: LogConfig) -> CoreResult<()> {
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target)
        .with_span_events(span_events);

    let output = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().flatten_event(true).boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(config.filter()?)
        .try_init()
        .map_err(|e| CoreError::Config(format!("logging already initialized: {e}")))?;

    tracing::debug!(format = ?config.format, filter = %config.level, "Logging initialized");
    Ok(())
}

/// 의사결정 한 건(시뮬레이션, 스코어링, 사이징)을 감싸는 `info` span.
///
/// ```ignore
/// let _guard = decision_span!("simulate", ticker, signal_date).entered();
/// ```
#[macro_export]
macro_rules! decision_span {
    ($name:expr, $ticker:expr) => {
        tracing::info_span!($name, ticker = %$ticker)
    };
    ($name:expr, $ticker:expr, $signal_date:expr) => {
        tracing::info_span!($name, ticker = %$ticker, signal_date = %$signal_date)
    };
}
