//! 포트폴리오 리스크 노출.
//!
//! 포지션 리스크 = `|현재가 - 손절가| × 수량`. 노출은 저장하지 않고
//! (포지션, 자산, 예산, 현재 레짐)에서 매번 다시 계산합니다.

use crate::budget::RiskBudget;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_core::{ratio_of, MarketRegime, Price, Quantity, Sector};
use std::collections::BTreeMap;

/// 보유 중인 포지션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub ticker: String,
    pub sector: Sector,
    pub quantity: Quantity,
    pub entry_price: Price,
    pub current_price: Price,
    pub stop_loss: Price,
    /// 진입 시점의 시장 레짐
    #[serde(default)]
    pub regime_at_entry: MarketRegime,
    /// 상관 그룹 (예: 같은 테마의 종목들)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_group: Option<String>,
}

impl OpenPosition {
    /// 주당 리스크: `|현재가 - 손절가|`.
    pub fn risk_per_share(&self) -> Decimal {
        (self.current_price - self.stop_loss).abs()
    }

    /// 포지션 리스크 금액.
    pub fn risk_amount(&self) -> Decimal {
        self.risk_per_share() * self.quantity
    }

    /// 현재가가 손절가에 도달했는지 확인.
    pub fn is_stopped_out(&self) -> bool {
        self.current_price <= self.stop_loss
    }
}

/// 포지션 하나의 리스크.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRisk {
    pub ticker: String,
    pub risk_amount: Decimal,
    pub risk_fraction: f64,
}

/// 현재 포트폴리오의 리스크 노출.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioExposure {
    pub equity: Decimal,
    pub regime: MarketRegime,
    pub total_risk: Decimal,
    pub total_risk_fraction: f64,
    pub sector_risk: BTreeMap<Sector, f64>,
    pub sector_positions: BTreeMap<Sector, usize>,
    /// 진입 시점 레짐별 리스크
    pub regime_risk: BTreeMap<MarketRegime, f64>,
    pub correlation_risk: BTreeMap<String, f64>,
    /// 리스크 내림차순
    pub positions: Vec<PositionRisk>,
    /// min(총 예산 여유, 현재 레짐 상한 여유), 0 이상
    pub available_risk_budget: f64,
}

impl PortfolioExposure {
    /// 섹터의 현재 리스크 비율.
    pub fn sector_risk_of(&self, sector: &Sector) -> f64 {
        self.sector_risk.get(sector).copied().unwrap_or(0.0)
    }

    /// 섹터의 현재 포지션 수.
    pub fn sector_count_of(&self, sector: &Sector) -> usize {
        self.sector_positions.get(sector).copied().unwrap_or(0)
    }

    /// 상관 그룹의 현재 리스크 비율.
    pub fn correlation_risk_of(&self, group: &str) -> f64 {
        self.correlation_risk.get(group).copied().unwrap_or(0.0)
    }
}

/// 보유 포지션에서 리스크 노출을 계산합니다.
pub fn compute_exposure(
    positions: &[OpenPosition],
    equity: Decimal,
    regime: MarketRegime,
    budget: &RiskBudget,
) -> PortfolioExposure {
    let mut sector_amount: BTreeMap<Sector, Decimal> = BTreeMap::new();
    let mut sector_positions: BTreeMap<Sector, usize> = BTreeMap::new();
    let mut regime_amount: BTreeMap<MarketRegime, Decimal> = BTreeMap::new();
    let mut correlation_amount: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut position_risks = Vec::with_capacity(positions.len());
    let mut total_risk = Decimal::ZERO;

    for position in positions {
        let risk = position.risk_amount();
        total_risk += risk;

        *sector_amount.entry(position.sector.clone()).or_default() += risk;
        *sector_positions.entry(position.sector.clone()).or_default() += 1;
        *regime_amount.entry(position.regime_at_entry).or_default() += risk;
        if let Some(group) = &position.correlation_group {
            *correlation_amount.entry(group.clone()).or_default() += risk;
        }

        position_risks.push(PositionRisk {
            ticker: position.ticker.clone(),
            risk_amount: risk,
            risk_fraction: ratio_of(risk, equity),
        });
    }

    position_risks.sort_by(|a, b| b.risk_amount.cmp(&a.risk_amount));

    let total_risk_fraction = ratio_of(total_risk, equity);
    let total_headroom = budget.max_total_risk - total_risk_fraction;
    let regime_headroom = budget.regime_ceiling(regime) - total_risk_fraction;
    let available_risk_budget = if equity > Decimal::ZERO {
        total_headroom.min(regime_headroom).max(0.0)
    } else {
        0.0
    };

    PortfolioExposure {
        equity,
        regime,
        total_risk,
        total_risk_fraction,
        sector_risk: to_fractions(sector_amount, equity),
        sector_positions,
        regime_risk: to_fractions(regime_amount, equity),
        correlation_risk: to_fractions(correlation_amount, equity),
        positions: position_risks,
        available_risk_budget,
    }
}

fn to_fractions<K: Ord>(amounts: BTreeMap<K, Decimal>, equity: Decimal) -> BTreeMap<K, f64> {
    amounts
        .into_iter()
        .map(|(k, v)| (k, ratio_of(v, equity)))
        .collect()
}
