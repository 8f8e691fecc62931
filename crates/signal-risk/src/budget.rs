//! 리스크 예산과 프리셋.
//!
//! 모든 한도는 자산(equity) 대비 비율(0.0 ~ 1.0)입니다.

use serde::{Deserialize, Serialize};
use signal_core::{MarketRegime, RiskSettings};
use std::fmt;
use std::str::FromStr;

/// 레짐별 포트폴리오 총 리스크 상한.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeRiskLimits {
    pub bullish: f64,
    pub choppy: f64,
    pub crash_like: f64,
}

impl RegimeRiskLimits {
    /// 레짐의 총 리스크 상한.
    pub fn for_regime(&self, regime: MarketRegime) -> f64 {
        match regime {
            MarketRegime::Bullish => self.bullish,
            MarketRegime::Choppy => self.choppy,
            MarketRegime::CrashLike => self.crash_like,
        }
    }
}

/// 이름 있는 리스크 프리셋.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPreset {
    Conservative,
    #[default]
    Default,
    Aggressive,
}

impl fmt::Display for RiskPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskPreset::Conservative => write!(f, "conservative"),
            RiskPreset::Default => write!(f, "default"),
            RiskPreset::Aggressive => write!(f, "aggressive"),
        }
    }
}

impl FromStr for RiskPreset {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskPreset::Conservative),
            "default" | "moderate" => Ok(RiskPreset::Default),
            "aggressive" => Ok(RiskPreset::Aggressive),
            other => Err(ConfigValidationError::UnknownPreset(other.to_string())),
        }
    }
}

/// 포트폴리오 리스크 예산.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBudget {
    /// 거래당 최대 리스크 비율
    pub max_risk_per_trade: f64,
    /// 포트폴리오 총 최대 리스크 비율
    pub max_total_risk: f64,
    /// 섹터별 최대 리스크 비율
    pub max_sector_risk: f64,
    /// 섹터별 최대 포지션 수
    pub max_positions_per_sector: usize,
    /// 상관 그룹별 최대 리스크 비율 (경고 기준)
    pub max_correlated_risk: f64,
    /// 레짐별 총 리스크 상한
    pub regime_limits: RegimeRiskLimits,
}

impl Default for RiskBudget {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 0.01,
            max_total_risk: 0.06,
            max_sector_risk: 0.025,
            max_positions_per_sector: 3,
            max_correlated_risk: 0.04,
            regime_limits: RegimeRiskLimits {
                bullish: 0.06,
                choppy: 0.04,
                crash_like: 0.02,
            },
        }
    }
}

impl RiskBudget {
    /// 보수적인 예산 (낮은 한도).
    pub fn conservative() -> Self {
        Self {
            max_risk_per_trade: 0.005,
            max_total_risk: 0.04,
            max_sector_risk: 0.015,
            max_positions_per_sector: 2,
            max_correlated_risk: 0.02,
            regime_limits: RegimeRiskLimits {
                bullish: 0.04,
                choppy: 0.025,
                crash_like: 0.01,
            },
        }
    }

    /// 공격적인 예산 (높은 한도).
    pub fn aggressive() -> Self {
        Self {
            max_risk_per_trade: 0.02,
            max_total_risk: 0.10,
            max_sector_risk: 0.04,
            max_positions_per_sector: 4,
            max_correlated_risk: 0.06,
            regime_limits: RegimeRiskLimits {
                bullish: 0.10,
                choppy: 0.06,
                crash_like: 0.03,
            },
        }
    }

    /// 프리셋 예산.
    pub fn preset(preset: RiskPreset) -> Self {
        match preset {
            RiskPreset::Conservative => Self::conservative(),
            RiskPreset::Default => Self::default(),
            RiskPreset::Aggressive => Self::aggressive(),
        }
    }

    /// 설정 파일의 `risk` 섹션으로 예산을 만들고 검증합니다.
    pub fn from_settings(settings: &RiskSettings) -> Result<Self, ConfigValidationError> {
        let mut budget = Self::preset(settings.preset.parse()?);
        if let Some(per_trade) = settings.max_risk_per_trade {
            budget.max_risk_per_trade = per_trade;
        }
        if let Some(total) = settings.max_total_risk {
            budget.max_total_risk = total;
        }
        budget.validate()?;
        Ok(budget)
    }

    /// 현재 레짐의 총 리스크 상한.
    pub fn regime_ceiling(&self, regime: MarketRegime) -> f64 {
        self.regime_limits.for_regime(regime)
    }

    /// 예산을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let fractions = [
            ("max_risk_per_trade", self.max_risk_per_trade),
            ("max_total_risk", self.max_total_risk),
            ("max_sector_risk", self.max_sector_risk),
            ("max_correlated_risk", self.max_correlated_risk),
            ("regime_limits.bullish", self.regime_limits.bullish),
            ("regime_limits.choppy", self.regime_limits.choppy),
            ("regime_limits.crash_like", self.regime_limits.crash_like),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        if self.max_risk_per_trade > self.max_total_risk {
            return Err(ConfigValidationError::InvalidValue(
                "max_risk_per_trade must not exceed max_total_risk".into(),
            ));
        }

        if self.max_positions_per_sector == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "max_positions_per_sector must be greater than 0".into(),
            ));
        }

        let limits = &self.regime_limits;
        if !(limits.bullish >= limits.choppy && limits.choppy >= limits.crash_like) {
            return Err(ConfigValidationError::InvalidValue(
                "regime limits must be ordered bullish >= choppy >= crash_like".into(),
            ));
        }

        Ok(())
    }
}

/// 설정 검증 오류.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Unknown risk preset: {0}")]
    UnknownPreset(String),
}
