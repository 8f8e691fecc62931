//! 분할 청산 상태 머신.
//!
//! 상태: `Open → Partial33 → Partial66 → Closed`.
//! 한 봉 안에서의 평가 순서는 손절 → 1차 목표 → 2차 목표 → 3차 목표이며,
//! 각 목표는 최대 한 번만 체결됩니다.

use crate::config::SimulationConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_core::{Price, PriceBar};

/// 진입 가격과 ATR에서 계산한 손절/목표 가격.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry: Price,
    /// 1R에 해당하는 가격 거리 (`ATR × stop_multiple`)
    pub stop_distance: Decimal,
    pub stop_loss: Price,
    pub targets: [Price; 3],
    pub target_multiples: [Decimal; 3],
    /// 각 목표에서 청산되는 비율 (합계 1)
    pub target_fractions: [Decimal; 3],
}

impl TradeLevels {
    pub fn new(entry: Price, atr: Decimal, config: &SimulationConfig) -> Self {
        let stop_distance = atr * config.stop_multiple;
        let multiples = [config.tp1_multiple, config.tp2_multiple, config.tp3_multiple];

        Self {
            entry,
            stop_distance,
            stop_loss: entry - stop_distance,
            targets: multiples.map(|m| entry + stop_distance * m),
            target_multiples: multiples,
            target_fractions: [config.tp1_fraction, config.tp2_fraction, config.tp3_fraction()],
        }
    }

    /// 가격 하나의 R 배수: `(price - entry) / stop_distance`.
    pub fn r_multiple(&self, price: Price) -> Decimal {
        if self.stop_distance.is_zero() {
            return Decimal::ZERO;
        }
        (price - self.entry) / self.stop_distance
    }
}

/// 청산 체결 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitKind {
    StopLoss,
    Target1,
    Target2,
    Target3,
    /// 보유 기간 만료 또는 데이터 종료
    TimeExit,
}

/// 포지션 일부의 청산 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitFill {
    pub kind: ExitKind,
    pub date: NaiveDate,
    pub price: Price,
    /// 청산된 원래 포지션 대비 비율
    pub fraction: Decimal,
    /// 이 조각이 기여한 R (`fraction × 조각 R 배수`)
    pub r_contribution: Decimal,
}

/// 분할 청산 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitState {
    Open,
    /// 1차 목표 체결 후
    Partial33,
    /// 2차 목표 체결 후
    Partial66,
    Closed,
}

/// 한 봉 처리 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ExitState,
    pub fills: Vec<ExitFill>,
}

impl ExitState {
    pub fn is_closed(self) -> bool {
        self == ExitState::Closed
    }

    /// 현재 상태에서 남아 있는 포지션 비율.
    pub fn remaining_fraction(self, levels: &TradeLevels) -> Decimal {
        let [f1, f2, f3] = levels.target_fractions;
        match self {
            ExitState::Open => f1 + f2 + f3,
            ExitState::Partial33 => f2 + f3,
            ExitState::Partial66 => f3,
            ExitState::Closed => Decimal::ZERO,
        }
    }

    /// 한 봉을 처리해 다음 상태와 체결 목록을 반환합니다.
    pub fn on_bar(self, bar: &PriceBar, levels: &TradeLevels) -> Transition {
        if self.is_closed() {
            return Transition {
                state: self,
                fills: Vec::new(),
            };
        }

        if bar.low <= levels.stop_loss {
            let price = bar.open.min(levels.stop_loss);
            let fraction = self.remaining_fraction(levels);
            return Transition {
                state: ExitState::Closed,
                fills: vec![ExitFill {
                    kind: ExitKind::StopLoss,
                    date: bar.date,
                    price,
                    fraction,
                    r_contribution: fraction * levels.r_multiple(price),
                }],
            };
        }

        let mut state = self;
        let mut fills = Vec::new();
        while let Some((next, kind, idx)) = state.next_target() {
            if bar.high < levels.targets[idx] {
                break;
            }
            let fraction = if next.is_closed() {
                state.remaining_fraction(levels)
            } else {
                levels.target_fractions[idx]
            };
            fills.push(ExitFill {
                kind,
                date: bar.date,
                price: levels.targets[idx],
                fraction,
                r_contribution: fraction * levels.target_multiples[idx],
            });
            state = next;
        }

        Transition { state, fills }
    }

    /// 남은 포지션을 봉의 종가로 청산합니다.
    pub fn close_at(self, bar: &PriceBar, levels: &TradeLevels) -> Transition {
        if self.is_closed() {
            return Transition {
                state: self,
                fills: Vec::new(),
            };
        }

        let fraction = self.remaining_fraction(levels);
        Transition {
            state: ExitState::Closed,
            fills: vec![ExitFill {
                kind: ExitKind::TimeExit,
                date: bar.date,
                price: bar.close,
                fraction,
                r_contribution: fraction * levels.r_multiple(bar.close),
            }],
        }
    }

    fn next_target(self) -> Option<(ExitState, ExitKind, usize)> {
        match self {
            ExitState::Open => Some((ExitState::Partial33, ExitKind::Target1, 0)),
            ExitState::Partial33 => Some((ExitState::Partial66, ExitKind::Target2, 1)),
            ExitState::Partial66 => Some((ExitState::Closed, ExitKind::Target3, 2)),
            ExitState::Closed => None,
        }
    }
}
