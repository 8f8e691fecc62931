//! 시뮬레이션 설정.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use signal_core::{from_f64, SimulationSettings};

/// ATR 기반 손절/목표와 분할 청산 설정.
///
/// 목표 배수는 손절 거리(`ATR × stop_multiple`) 단위입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// ATR 대비 손절 거리 배수 (기본값: 2.0)
    #[serde(default = "default_stop_multiple")]
    pub stop_multiple: Decimal,

    /// 1차 목표 배수 (기본값: 2.0)
    #[serde(default = "default_tp1_multiple")]
    pub tp1_multiple: Decimal,

    /// 2차 목표 배수 (기본값: 3.0)
    #[serde(default = "default_tp2_multiple")]
    pub tp2_multiple: Decimal,

    /// 3차 목표 배수 (기본값: 4.0)
    #[serde(default = "default_tp3_multiple")]
    pub tp3_multiple: Decimal,

    /// 1차 목표에서 청산하는 포지션 비율 (기본값: 0.33)
    #[serde(default = "default_partial_fraction")]
    pub tp1_fraction: Decimal,

    /// 2차 목표에서 청산하는 포지션 비율 (기본값: 0.33)
    #[serde(default = "default_partial_fraction")]
    pub tp2_fraction: Decimal,

    /// ATR 기간 (기본값: 14)
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// 최소 봉 개수 (기본값: 20)
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,

    /// 최대 보유 거래일 (기본값: 45)
    #[serde(default = "default_max_holding_days")]
    pub max_holding_days: usize,
}

fn default_stop_multiple() -> Decimal {
    dec!(2.0)
}

fn default_tp1_multiple() -> Decimal {
    dec!(2.0)
}

fn default_tp2_multiple() -> Decimal {
    dec!(3.0)
}

fn default_tp3_multiple() -> Decimal {
    dec!(4.0)
}

fn default_partial_fraction() -> Decimal {
    dec!(0.33)
}

fn default_atr_period() -> usize {
    14
}

fn default_min_bars() -> usize {
    20
}

fn default_max_holding_days() -> usize {
    45
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stop_multiple: default_stop_multiple(),
            tp1_multiple: default_tp1_multiple(),
            tp2_multiple: default_tp2_multiple(),
            tp3_multiple: default_tp3_multiple(),
            tp1_fraction: default_partial_fraction(),
            tp2_fraction: default_partial_fraction(),
            atr_period: default_atr_period(),
            min_bars: default_min_bars(),
            max_holding_days: default_max_holding_days(),
        }
    }
}

impl SimulationConfig {
    /// 설정 파일의 `simulation` 섹션에서 생성합니다.
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            stop_multiple: from_f64(settings.stop_multiple),
            tp1_multiple: from_f64(settings.tp1_multiple),
            tp2_multiple: from_f64(settings.tp2_multiple),
            tp3_multiple: from_f64(settings.tp3_multiple),
            max_holding_days: settings.max_holding_days,
            ..Default::default()
        }
    }

    /// 손절 배수 설정.
    pub fn with_stop_multiple(mut self, multiple: Decimal) -> Self {
        self.stop_multiple = multiple;
        self
    }

    /// 목표 배수 설정.
    pub fn with_targets(mut self, tp1: Decimal, tp2: Decimal, tp3: Decimal) -> Self {
        self.tp1_multiple = tp1;
        self.tp2_multiple = tp2;
        self.tp3_multiple = tp3;
        self
    }

    /// 최대 보유 거래일 설정.
    pub fn with_max_holding_days(mut self, days: usize) -> Self {
        self.max_holding_days = days;
        self
    }

    /// 3차 목표에서 청산되는 잔여 비율.
    pub fn tp3_fraction(&self) -> Decimal {
        Decimal::ONE - self.tp1_fraction - self.tp2_fraction
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        if self.stop_multiple <= Decimal::ZERO {
            return Err(SimulationConfigError::InvalidValue(
                "stop_multiple must be greater than 0".into(),
            ));
        }

        if self.tp1_multiple <= Decimal::ZERO
            || self.tp2_multiple <= self.tp1_multiple
            || self.tp3_multiple <= self.tp2_multiple
        {
            return Err(SimulationConfigError::InvalidValue(
                "target multiples must be positive and strictly ascending".into(),
            ));
        }

        if self.tp1_fraction <= Decimal::ZERO
            || self.tp2_fraction <= Decimal::ZERO
            || self.tp3_fraction() <= Decimal::ZERO
        {
            return Err(SimulationConfigError::InvalidValue(
                "partial fractions must be positive and leave a remainder for the final target"
                    .into(),
            ));
        }

        if self.atr_period == 0 {
            return Err(SimulationConfigError::InvalidValue(
                "atr_period must be greater than 0".into(),
            ));
        }

        if self.min_bars <= self.atr_period {
            return Err(SimulationConfigError::InvalidValue(
                "min_bars must exceed atr_period".into(),
            ));
        }

        if self.max_holding_days == 0 {
            return Err(SimulationConfigError::InvalidValue(
                "max_holding_days must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

/// 시뮬레이션 설정 검증 오류.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimulationConfigError {
    #[error("Invalid simulation configuration: {0}")]
    InvalidValue(String),
}
