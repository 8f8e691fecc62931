//! 포지션 크기 결정 명령어.
//!
//! ```bash
//! signal size --entry 50 --stop 48 --sector Technology \
//!     --positions book.json --equity 100000 --regime choppy --preset conservative
//! ```

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use signal_core::{MarketRegime, Price, RiskSettings, Sector};
use signal_risk::{
    OpenPosition, PortfolioExposure, PositionAdjustment, RiskAllocator, SizingDecision,
    SizingRequest,
};
use std::path::PathBuf;

use super::read_json;

#[derive(Debug, Clone)]
pub struct SizeOptions {
    pub entry: Price,
    pub stop: Price,
    pub sector: Sector,
    pub correlation_group: Option<String>,
    pub positions_path: Option<PathBuf>,
    pub equity: Decimal,
    pub regime: MarketRegime,
    pub preset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SizeReport {
    pub decision: SizingDecision,
    pub exposure: PortfolioExposure,
    pub adjustments: Vec<PositionAdjustment>,
}

pub fn run_size(options: &SizeOptions, settings: &RiskSettings) -> Result<SizeReport> {
    let mut risk = settings.clone();
    if let Some(preset) = &options.preset {
        risk.preset = preset.clone();
    }
    let allocator = RiskAllocator::from_settings(&risk)?;

    let positions: Vec<OpenPosition> = match &options.positions_path {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let exposure = allocator.exposure(&positions, options.equity, options.regime);
    let mut request = SizingRequest::new(options.entry, options.stop, options.sector.clone());
    if let Some(group) = &options.correlation_group {
        request = request.with_correlation_group(group.clone());
    }

    Ok(SizeReport {
        decision: allocator.size(&request, &exposure),
        adjustments: allocator.suggest(&positions, &exposure),
        exposure,
    })
}
