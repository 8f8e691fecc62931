//! 엔진 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`SIGNAL__SECTION__KEY`) 순으로 덮어씁니다.
//! 각 섹션은 하위 크레이트의 설정 타입(`TrainingConfig`, `SimulationConfig`,
//! `RiskBudget`)으로 변환되어 API 경계에서 한 번 검증됩니다.

use crate::error::{CoreError, CoreResult};
use crate::logging::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 엔진 전체 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineSettings {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingSettings,
    /// 분류기/비토 설정
    #[serde(default)]
    pub model: ModelSettings,
    /// 거래 결과 시뮬레이션 설정
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// 포트폴리오 리스크 설정
    #[serde(default)]
    pub risk: RiskSettings,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSettings {
    /// `LogConfig`로 변환합니다.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig::new(self.level.clone()).with_format(self.format)
    }
}

/// 분류기/비토 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSettings {
    /// 학습된 모델 파라미터 파일 경로 (없으면 기본 모델 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_path: Option<String>,
    /// 이 확률(%) 미만이면 시그널을 비토
    #[serde(default = "default_veto_min_probability")]
    pub veto_min_probability: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            parameters_path: None,
            veto_min_probability: default_veto_min_probability(),
        }
    }
}

/// 거래 결과 시뮬레이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// ATR 대비 손절 거리 배수
    #[serde(default = "default_stop_multiple")]
    pub stop_multiple: f64,
    /// 1차 목표 R 배수
    #[serde(default = "default_tp1_multiple")]
    pub tp1_multiple: f64,
    /// 2차 목표 R 배수
    #[serde(default = "default_tp2_multiple")]
    pub tp2_multiple: f64,
    /// 3차 목표 R 배수
    #[serde(default = "default_tp3_multiple")]
    pub tp3_multiple: f64,
    /// 최대 보유 거래일
    #[serde(default = "default_max_holding_days")]
    pub max_holding_days: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            stop_multiple: default_stop_multiple(),
            tp1_multiple: default_tp1_multiple(),
            tp2_multiple: default_tp2_multiple(),
            tp3_multiple: default_tp3_multiple(),
            max_holding_days: default_max_holding_days(),
        }
    }
}

/// 포트폴리오 리스크 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskSettings {
    /// 리스크 프리셋 (conservative, default, aggressive)
    #[serde(default = "default_risk_preset")]
    pub preset: String,
    /// 거래당 최대 리스크 비율 재정의
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_risk_per_trade: Option<f64>,
    /// 포트폴리오 총 리스크 비율 재정의
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_risk: Option<f64>,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            preset: default_risk_preset(),
            max_risk_per_trade: None,
            max_total_risk: None,
        }
    }
}

// 기본값 함수들
fn default_log_level() -> String {
    "info".to_string()
}

fn default_veto_min_probability() -> f64 {
    45.0
}

fn default_stop_multiple() -> f64 {
    2.0
}

fn default_tp1_multiple() -> f64 {
    2.0
}

fn default_tp2_multiple() -> f64 {
    3.0
}

fn default_tp3_multiple() -> f64 {
    4.0
}

fn default_max_holding_days() -> usize {
    45
}

fn default_risk_preset() -> String {
    "default".to_string()
}

impl EngineSettings {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SIGNAL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 설정 파일 없이 기본값과 환경 변수만으로 설정을 로드합니다.
    pub fn from_env() -> CoreResult<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("SIGNAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// 현재 설정(환경 변수 적용 후)을 TOML 문자열로 내보냅니다.
    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}
