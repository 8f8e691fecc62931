//! 거래 결과 시뮬레이터.
//!
//! 시그널 날짜 이후 첫 봉의 시가에 진입하고, 다음 날부터 일봉을 따라가며
//! 손절/분할 목표/시간 청산을 적용해 실현 R을 계산합니다.
//! 같은 입력은 항상 같은 결과를 냅니다.

use crate::atr::average_true_range;
use crate::config::{SimulationConfig, SimulationConfigError};
use crate::exit::{ExitFill, ExitKind, ExitState, TradeLevels};
use crate::outcome::{ExitReason, TradeOutcome};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_core::{to_f64, PriceSeries};
use tracing::{debug, warn};

/// 시뮬레이션할 시그널.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRequest {
    pub ticker: String,
    pub signal_date: NaiveDate,
}

impl SignalRequest {
    pub fn new(ticker: impl Into<String>, signal_date: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            signal_date,
        }
    }
}

/// 검증된 설정을 가진 시뮬레이터.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 시그널 하나를 시뮬레이션합니다.
    ///
    /// 데이터가 부족하거나 ATR이 0 이하이면 `None`.
    pub fn simulate(
        &self,
        ticker: &str,
        signal_date: NaiveDate,
        series: &PriceSeries,
    ) -> Option<TradeOutcome> {
        let config = &self.config;

        if series.len() < config.min_bars {
            debug!(ticker, bars = series.len(), "Insufficient bars for simulation");
            return None;
        }
        if series.count_before(signal_date) < config.atr_period {
            debug!(ticker, %signal_date, "Insufficient history before signal date");
            return None;
        }

        let signal_idx = series.index_on_or_before(signal_date)?;
        let atr = average_true_range(series, signal_idx, config.atr_period)?;
        if atr <= Decimal::ZERO {
            debug!(ticker, %signal_date, "Non-positive ATR, skipping");
            return None;
        }

        let entry_idx = match series.first_index_after(signal_date) {
            Some(idx) => idx,
            None => {
                debug!(ticker, %signal_date, "No bar after signal date");
                return None;
            }
        };

        let bars = series.bars();
        let entry_bar = &bars[entry_idx];
        let levels = TradeLevels::new(entry_bar.open, atr, config);

        let mut state = ExitState::Open;
        let mut fills: Vec<ExitFill> = Vec::new();
        let mut holding_days = 0;

        let last_day = (bars.len() - 1 - entry_idx).min(config.max_holding_days);
        for day in 1..=last_day {
            let bar = &bars[entry_idx + day];
            holding_days = day;

            let transition = state.on_bar(bar, &levels);
            state = transition.state;
            fills.extend(transition.fills);
            if state.is_closed() {
                break;
            }

            if day == config.max_holding_days {
                let transition = state.close_at(bar, &levels);
                state = transition.state;
                fills.extend(transition.fills);
            }
        }

        if !state.is_closed() {
            // 최대 보유일 전에 데이터가 끝남: 마지막 봉 종가로 청산
            let last_bar = &bars[entry_idx + holding_days];
            fills.extend(state.close_at(last_bar, &levels).fills);
        }

        let outcome = build_outcome(ticker, signal_date, entry_bar.date, atr, &levels, fills, holding_days)?;

        debug!(
            ticker,
            %signal_date,
            reason = %outcome.exit_reason,
            r = outcome.realized_r,
            days = outcome.holding_days,
            "Trade simulated"
        );

        Some(outcome)
    }

    /// 여러 시그널을 순서대로 시뮬레이션합니다.
    ///
    /// 가격 시계열이 없거나 데이터가 부족한 시그널은 결과에서 빠집니다.
    pub fn simulate_batch<'a, F>(&self, signals: &[SignalRequest], series_lookup: F) -> Vec<TradeOutcome>
    where
        F: Fn(&str) -> Option<&'a PriceSeries>,
    {
        signals
            .iter()
            .filter_map(|signal| {
                let series = series_lookup(&signal.ticker);
                if series.is_none() {
                    debug!(ticker = %signal.ticker, "No price series for signal");
                }
                self.simulate(&signal.ticker, signal.signal_date, series?)
            })
            .collect()
    }
}

fn build_outcome(
    ticker: &str,
    signal_date: NaiveDate,
    entry_date: NaiveDate,
    atr: Decimal,
    levels: &TradeLevels,
    fills: Vec<ExitFill>,
    holding_days: usize,
) -> Option<TradeOutcome> {
    let last = fills.last()?;

    let exit_reason = match last.kind {
        ExitKind::StopLoss => ExitReason::StopLoss,
        ExitKind::Target3 => ExitReason::Tp3,
        _ => ExitReason::TimeExit,
    };
    let exit_date = last.date;
    let exit_price = last.price;

    let realized: Decimal = fills.iter().map(|f| f.r_contribution).sum();
    let blended: Decimal = fills.iter().map(|f| f.fraction * f.price).sum();
    let pct_return = if levels.entry > Decimal::ZERO {
        to_f64((blended - levels.entry) / levels.entry * Decimal::ONE_HUNDRED)
    } else {
        0.0
    };
    let realized_r = to_f64(realized);

    Some(TradeOutcome {
        ticker: ticker.to_string(),
        signal_date,
        entry_date,
        entry_price: levels.entry,
        exit_date,
        exit_price,
        blended_exit_price: blended,
        exit_reason,
        realized_r,
        pct_return,
        holding_days,
        win: realized_r >= 1.0,
        atr,
        stop_loss: levels.stop_loss,
        targets: levels.targets,
        fills,
    })
}

/// 주어진 설정으로 시그널 하나를 시뮬레이션합니다.
///
/// 설정이 유효하지 않으면 경고를 남기고 `None`을 반환합니다.
pub fn simulate(
    ticker: &str,
    signal_date: NaiveDate,
    series: &PriceSeries,
    config: &SimulationConfig,
) -> Option<TradeOutcome> {
    match Simulator::new(config.clone()) {
        Ok(simulator) => simulator.simulate(ticker, signal_date, series),
        Err(e) => {
            warn!(error = %e, "Rejected simulation configuration");
            None
        }
    }
}
