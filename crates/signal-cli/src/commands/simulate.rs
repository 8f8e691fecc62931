//! 거래 결과 시뮬레이션 명령어.
//!
//! ```bash
//! signal simulate --ticker AAPL --signal-date 2024-03-15 --bars data/AAPL.csv
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use signal_core::{decision_span, PriceSeries, SimulationSettings};
use signal_simulator::{SimulationConfig, Simulator, TradeOutcome};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub ticker: String,
    pub signal_date: NaiveDate,
    pub bars_path: PathBuf,
    pub max_holding_days: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub ticker: String,
    pub signal_date: NaiveDate,
    pub bars: usize,
    /// 가격 이력이 부족하면 `None`
    pub outcome: Option<TradeOutcome>,
}

pub fn run_simulate(options: &SimulateOptions, settings: &SimulationSettings) -> Result<SimulationReport> {
    let _span = decision_span!("simulate", options.ticker, options.signal_date).entered();

    let content = fs::read_to_string(&options.bars_path)
        .with_context(|| format!("Failed to read {}", options.bars_path.display()))?;
    let series = PriceSeries::from_csv_str(&options.ticker, &content)
        .with_context(|| format!("Invalid price data in {}", options.bars_path.display()))?;

    let mut config = SimulationConfig::from_settings(settings);
    if let Some(days) = options.max_holding_days {
        config = config.with_max_holding_days(days);
    }
    let simulator = Simulator::new(config)?;

    let outcome = simulator.simulate(&options.ticker, options.signal_date, &series);
    match &outcome {
        Some(outcome) => info!(
            exit_reason = %outcome.exit_reason,
            realized_r = outcome.realized_r,
            "Simulation finished"
        ),
        None => info!(bars = series.len(), "Insufficient price history for simulation"),
    }

    Ok(SimulationReport {
        ticker: options.ticker.clone(),
        signal_date: options.signal_date,
        bars: series.len(),
        outcome,
    })
}
