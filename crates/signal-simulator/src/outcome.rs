//! 거래 결과와 배치 요약.

use crate::exit::ExitFill;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_core::Price;
use std::fmt;

/// 포지션이 완전히 청산된 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    #[serde(rename = "TP3")]
    Tp3,
    TimeExit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "STOP_LOSS"),
            ExitReason::Tp3 => write!(f, "TP3"),
            ExitReason::TimeExit => write!(f, "TIME_EXIT"),
        }
    }
}

/// 시그널 하나의 시뮬레이션 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub ticker: String,
    pub signal_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub entry_price: Price,
    /// 마지막 청산 체결일
    pub exit_date: NaiveDate,
    /// 마지막 청산 체결 가격
    pub exit_price: Price,
    /// 청산 비율 가중 평균 가격
    pub blended_exit_price: Price,
    pub exit_reason: ExitReason,
    /// 청산 조각별 R 기여의 합
    pub realized_r: f64,
    /// 가중 평균 청산 가격 기준 수익률 (%)
    pub pct_return: f64,
    /// 진입 후 진행한 거래일 수 (최대 보유일 이하)
    pub holding_days: usize,
    /// `realized_r >= 1.0`
    pub win: bool,
    pub atr: Decimal,
    pub stop_loss: Price,
    pub targets: [Price; 3],
    pub fills: Vec<ExitFill>,
}

/// 여러 결과의 요약 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub count: usize,
    pub wins: usize,
    /// 승률 (0.0 ~ 1.0)
    pub win_rate: f64,
    pub total_r: f64,
    pub average_r: f64,
    /// R >= 1 거래의 평균 R
    pub average_win_r: f64,
    /// R < 0 거래의 평균 R
    pub average_loss_r: f64,
    /// 승률 × 평균 승리 R + 손실률 × 평균 손실 R
    pub expectancy: f64,
    pub average_holding_days: f64,
    pub stop_loss_count: usize,
    pub tp3_count: usize,
    pub time_exit_count: usize,
}

impl OutcomeSummary {
    pub fn from_outcomes(outcomes: &[TradeOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::default();
        }

        let count = outcomes.len();
        let n = count as f64;
        let wins: Vec<f64> = outcomes.iter().filter(|o| o.win).map(|o| o.realized_r).collect();
        let losses: Vec<f64> = outcomes
            .iter()
            .map(|o| o.realized_r)
            .filter(|r| *r < 0.0)
            .collect();

        let mean = |values: &[f64]| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        let total_r: f64 = outcomes.iter().map(|o| o.realized_r).sum();
        let win_rate = wins.len() as f64 / n;
        let loss_rate = losses.len() as f64 / n;
        let average_win_r = mean(&wins);
        let average_loss_r = mean(&losses);
        let reasons = |reason: ExitReason| outcomes.iter().filter(|o| o.exit_reason == reason).count();

        Self {
            count,
            wins: wins.len(),
            win_rate,
            total_r,
            average_r: total_r / n,
            average_win_r,
            average_loss_r,
            expectancy: win_rate * average_win_r + loss_rate * average_loss_r,
            average_holding_days: outcomes.iter().map(|o| o.holding_days as f64).sum::<f64>() / n,
            stop_loss_count: reasons(ExitReason::StopLoss),
            tp3_count: reasons(ExitReason::Tp3),
            time_exit_count: reasons(ExitReason::TimeExit),
        }
    }
}
