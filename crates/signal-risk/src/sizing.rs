//! 포지션 크기 계산.
//!
//! 거래당 최대 달러 리스크에서 시작해 레짐 → 섹터 → 포트폴리오 순서로
//! 축소 계수(0.0 ~ 1.0)를 곱하고, 주당 리스크로 나눈 값을 내림해 주식 수를 정합니다.

use crate::budget::RiskBudget;
use crate::exposure::PortfolioExposure;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_core::{fraction_of, ratio_of, Price, Quantity, Sector};
use std::fmt;
use tracing::{info, warn};

/// 포지션 노셔널이 자산의 이 비율을 넘으면 경고합니다.
pub const MAX_NOTIONAL_FRACTION: f64 = 0.25;

/// 크기 계산 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub entry: Price,
    pub stop: Price,
    pub sector: Sector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_group: Option<String>,
}

impl SizingRequest {
    pub fn new(entry: Price, stop: Price, sector: impl Into<Sector>) -> Self {
        Self {
            entry,
            stop,
            sector: sector.into(),
            correlation_group: None,
        }
    }

    pub fn with_correlation_group(mut self, group: impl Into<String>) -> Self {
        self.correlation_group = Some(group.into());
        self
    }
}

/// 거부 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// 손절가가 진입가 이상
    InvalidGeometry,
    /// 섹터 리스크 상한 도달
    SectorRiskExhausted,
    /// 섹터 포지션 수 상한 도달
    SectorPositionLimit,
    /// 포트폴리오/레짐 리스크 여유 없음
    PortfolioBudgetExhausted,
    /// 조정 후 주식 수가 0
    ZeroSize,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectionReason::InvalidGeometry => "INVALID_GEOMETRY",
            RejectionReason::SectorRiskExhausted => "SECTOR_RISK_EXHAUSTED",
            RejectionReason::SectorPositionLimit => "SECTOR_POSITION_LIMIT",
            RejectionReason::PortfolioBudgetExhausted => "PORTFOLIO_BUDGET_EXHAUSTED",
            RejectionReason::ZeroSize => "ZERO_SIZE",
        };
        write!(f, "{s}")
    }
}

/// 크기 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingDecision {
    pub approved: bool,
    pub shares: Quantity,
    /// `shares × |entry - stop|`
    pub dollar_risk: Decimal,
    /// 자산 대비 리스크 비율
    pub risk_fraction: f64,
    pub notional: Decimal,
    pub regime_factor: f64,
    pub sector_factor: f64,
    pub portfolio_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionReason>,
    /// 거부 또는 승인 사유
    pub reason: String,
    pub warnings: Vec<String>,
}

impl SizingDecision {
    fn rejected(
        rejection: RejectionReason,
        reason: impl Into<String>,
        factors: (f64, f64, f64),
        warnings: Vec<String>,
    ) -> Self {
        Self {
            approved: false,
            shares: Decimal::ZERO,
            dollar_risk: Decimal::ZERO,
            risk_fraction: 0.0,
            notional: Decimal::ZERO,
            regime_factor: factors.0,
            sector_factor: factors.1,
            portfolio_factor: factors.2,
            rejection: Some(rejection),
            reason: reason.into(),
            warnings,
        }
    }

    /// 곱해진 전체 축소 계수.
    pub fn combined_factor(&self) -> f64 {
        self.regime_factor * self.sector_factor * self.portfolio_factor
    }
}

/// 여유 비율 대비 요청 비율의 축소 계수.
fn headroom_factor(headroom: f64, requested: f64) -> f64 {
    if requested <= 0.0 {
        return 0.0;
    }
    (headroom / requested).clamp(0.0, 1.0)
}

/// 현재 노출과 예산으로 진입 크기를 계산합니다.
pub fn size_position(
    request: &SizingRequest,
    budget: &RiskBudget,
    exposure: &PortfolioExposure,
) -> SizingDecision {
    let decision = decide(request, budget, exposure);

    if decision.approved {
        info!(
            sector = %request.sector,
            shares = %decision.shares,
            dollar_risk = %decision.dollar_risk,
            risk_fraction = decision.risk_fraction,
            warnings = decision.warnings.len(),
            "Position size approved"
        );
    } else {
        warn!(
            sector = %request.sector,
            rejection = ?decision.rejection,
            reason = %decision.reason,
            "Position size rejected"
        );
    }

    decision
}

fn decide(request: &SizingRequest, budget: &RiskBudget, exposure: &PortfolioExposure) -> SizingDecision {
    let mut warnings = Vec::new();
    let per_trade = budget.max_risk_per_trade;
    let equity = exposure.equity;

    if request.entry <= request.stop {
        return SizingDecision::rejected(
            RejectionReason::InvalidGeometry,
            format!(
                "stop {} must be below entry {}",
                request.stop, request.entry
            ),
            (0.0, 0.0, 0.0),
            warnings,
        );
    }

    // (a) 레짐 상한
    let regime_headroom = budget.regime_ceiling(exposure.regime) - exposure.total_risk_fraction;
    let regime_factor = headroom_factor(regime_headroom, per_trade);
    if regime_factor < 1.0 {
        warnings.push(format!(
            "regime limits reducing size ({} ceiling {:.2}%)",
            exposure.regime,
            budget.regime_ceiling(exposure.regime) * 100.0
        ));
    }

    // (b) 섹터 상한
    let sector_risk = exposure.sector_risk_of(&request.sector);
    let sector_count = exposure.sector_count_of(&request.sector);
    if sector_risk >= budget.max_sector_risk {
        return SizingDecision::rejected(
            RejectionReason::SectorRiskExhausted,
            format!(
                "sector {} risk {:.2}% at ceiling {:.2}%",
                request.sector,
                sector_risk * 100.0,
                budget.max_sector_risk * 100.0
            ),
            (regime_factor, 0.0, 0.0),
            warnings,
        );
    }
    if sector_count >= budget.max_positions_per_sector {
        return SizingDecision::rejected(
            RejectionReason::SectorPositionLimit,
            format!(
                "sector {} already holds {} positions (limit {})",
                request.sector, sector_count, budget.max_positions_per_sector
            ),
            (regime_factor, 0.0, 0.0),
            warnings,
        );
    }
    let sector_factor = headroom_factor(budget.max_sector_risk - sector_risk, per_trade);
    if sector_factor < 1.0 {
        warnings.push(format!("sector {} budget reducing size", request.sector));
    }

    // (c) 포트폴리오 총 예산
    if exposure.available_risk_budget <= 0.0 {
        return SizingDecision::rejected(
            RejectionReason::PortfolioBudgetExhausted,
            format!(
                "no risk budget remaining (portfolio risk {:.2}%)",
                exposure.total_risk_fraction * 100.0
            ),
            (regime_factor, sector_factor, 0.0),
            warnings,
        );
    }
    let portfolio_factor =
        headroom_factor(budget.max_total_risk - exposure.total_risk_fraction, per_trade);
    if portfolio_factor < 1.0 {
        warnings.push("portfolio budget reducing size".to_string());
    }

    let factors = (regime_factor, sector_factor, portfolio_factor);
    let max_dollar_risk = fraction_of(equity, per_trade);
    let adjusted = fraction_of(max_dollar_risk, regime_factor * sector_factor * portfolio_factor);
    let per_share_risk = request.entry - request.stop;
    let mut shares = (adjusted / per_share_risk).floor();
    // 나눗셈 반올림으로 몫이 정수로 올라간 경우
    if shares * per_share_risk > adjusted {
        shares -= Decimal::ONE;
    }

    if shares <= Decimal::ZERO {
        return SizingDecision::rejected(
            RejectionReason::ZeroSize,
            format!(
                "adjusted risk {} is below one share of risk {}",
                adjusted.round_dp(2),
                per_share_risk
            ),
            factors,
            warnings,
        );
    }

    let dollar_risk = shares * per_share_risk;
    let risk_fraction = ratio_of(dollar_risk, equity);
    let notional = shares * request.entry;

    if ratio_of(notional, equity) > MAX_NOTIONAL_FRACTION {
        warnings.push(format!(
            "position notional {} exceeds {:.0}% of equity",
            notional.round_dp(2),
            MAX_NOTIONAL_FRACTION * 100.0
        ));
    }

    if let Some(group) = &request.correlation_group {
        let group_risk = exposure.correlation_risk_of(group) + risk_fraction;
        if group_risk > budget.max_correlated_risk {
            warnings.push(format!(
                "correlated group {} risk {:.2}% would exceed {:.2}%",
                group,
                group_risk * 100.0,
                budget.max_correlated_risk * 100.0
            ));
        }
    }

    SizingDecision {
        approved: true,
        shares,
        dollar_risk,
        risk_fraction,
        notional,
        regime_factor,
        sector_factor,
        portfolio_factor,
        rejection: None,
        reason: format!(
            "{} shares risking {} ({:.2}% of equity)",
            shares,
            dollar_risk.round_dp(2),
            risk_fraction * 100.0
        ),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::{compute_exposure, OpenPosition};
    use rust_decimal_macros::dec;
    use signal_core::MarketRegime;

    fn holding(ticker: &str, sector: &str, quantity: Decimal, current: Decimal, stop: Decimal) -> OpenPosition {
        OpenPosition {
            ticker: ticker.to_string(),
            sector: Sector::new(sector),
            quantity,
            entry_price: current,
            current_price: current,
            stop_loss: stop,
            regime_at_entry: MarketRegime::Bullish,
            correlation_group: None,
        }
    }

    fn exposure(positions: &[OpenPosition], regime: MarketRegime) -> PortfolioExposure {
        compute_exposure(positions, dec!(100000), regime, &RiskBudget::default())
    }

    #[test]
    fn test_full_size_on_empty_portfolio() {
        let budget = RiskBudget::default();
        let request = SizingRequest::new(dec!(50), dec!(48), "tech");
        let decision = size_position(&request, &budget, &exposure(&[], MarketRegime::Bullish));

        // 100000 × 1% / 2 = 500주
        assert!(decision.approved);
        assert_eq!(decision.shares, dec!(500));
        assert_eq!(decision.dollar_risk, dec!(1000));
        assert!((decision.risk_fraction - 0.01).abs() < 1e-12);
        assert_eq!(decision.notional, dec!(25000));
        assert_eq!(decision.combined_factor(), 1.0);
        assert!(decision.warnings.is_empty());
    }

    #[test]
    fn test_invalid_geometry() {
        let budget = RiskBudget::default();
        let ex = exposure(&[], MarketRegime::Bullish);

        for stop in [dec!(50), dec!(51)] {
            let decision = size_position(&SizingRequest::new(dec!(50), stop, "tech"), &budget, &ex);
            assert!(!decision.approved);
            assert_eq!(decision.rejection, Some(RejectionReason::InvalidGeometry));
            assert_eq!(decision.shares, Decimal::ZERO);
            assert!(!decision.reason.is_empty());
        }
    }

    #[test]
    fn test_regime_scales_down() {
        // 위기 레짐 상한 2%, 현재 1.5% → 여유 0.5% / 요청 1% = 0.5
        let positions = [holding("A", "energy", dec!(1500), dec!(20), dec!(19))];
        let budget = RiskBudget::default();
        let decision = size_position(
            &SizingRequest::new(dec!(50), dec!(48), "tech"),
            &budget,
            &exposure(&positions, MarketRegime::CrashLike),
        );

        assert!(decision.approved);
        assert!((decision.regime_factor - 0.5).abs() < 1e-9);
        assert_eq!(decision.shares, dec!(250));
        assert!(decision.warnings.iter().any(|w| w.contains("regime limits")));
    }

    #[test]
    fn test_sector_limits() {
        let budget = RiskBudget::default();

        // 섹터 리스크 2.5% 도달
        let heavy = [holding("A", "tech", dec!(2500), dec!(20), dec!(19))];
        let decision = size_position(
            &SizingRequest::new(dec!(50), dec!(48), "TECH"),
            &budget,
            &exposure(&heavy, MarketRegime::Bullish),
        );
        assert_eq!(decision.rejection, Some(RejectionReason::SectorRiskExhausted));

        // 섹터 포지션 3개
        let many: Vec<OpenPosition> = (0..3)
            .map(|i| holding(&format!("T{i}"), "tech", dec!(10), dec!(20), dec!(19)))
            .collect();
        let decision = size_position(
            &SizingRequest::new(dec!(50), dec!(48), "tech"),
            &budget,
            &exposure(&many, MarketRegime::Bullish),
        );
        assert_eq!(decision.rejection, Some(RejectionReason::SectorPositionLimit));

        // 섹터 여유 0.5% → 절반
        let partial = [holding("A", "tech", dec!(2000), dec!(20), dec!(19))];
        let decision = size_position(
            &SizingRequest::new(dec!(50), dec!(48), "tech"),
            &budget,
            &exposure(&partial, MarketRegime::Bullish),
        );
        assert!(decision.approved);
        assert!((decision.sector_factor - 0.5).abs() < 1e-9);
        assert_eq!(decision.shares, dec!(250));
    }

    #[test]
    fn test_portfolio_exhausted() {
        let budget = RiskBudget::default();
        let positions: Vec<OpenPosition> = ["a", "b", "c"]
            .iter()
            .map(|s| holding(s, s, dec!(2000), dec!(20), dec!(19)))
            .collect();
        // 총 6% = 총 예산 상한
        let decision = size_position(
            &SizingRequest::new(dec!(50), dec!(48), "tech"),
            &budget,
            &exposure(&positions, MarketRegime::Bullish),
        );
        assert_eq!(decision.rejection, Some(RejectionReason::PortfolioBudgetExhausted));
    }

    #[test]
    fn test_zero_size() {
        let budget = RiskBudget::default();
        // 최대 리스크 1000 < 주당 리스크 1500
        let decision = size_position(
            &SizingRequest::new(dec!(2000), dec!(500), "tech"),
            &budget,
            &exposure(&[], MarketRegime::Bullish),
        );
        assert_eq!(decision.rejection, Some(RejectionReason::ZeroSize));
    }

    #[test]
    fn test_notional_warning_not_rejection() {
        let budget = RiskBudget::default();
        // 1000주 × 100 = 100000 > 25%
        let decision = size_position(
            &SizingRequest::new(dec!(100), dec!(99), "tech"),
            &budget,
            &exposure(&[], MarketRegime::Bullish),
        );
        assert!(decision.approved);
        assert_eq!(decision.shares, dec!(1000));
        assert!(decision.warnings.iter().any(|w| w.contains("notional")));
    }

    #[test]
    fn test_correlation_warning_only() {
        let budget = RiskBudget::default();
        let mut semi = holding("NVDA", "tech", dec!(3500), dec!(20), dec!(19));
        semi.correlation_group = Some("ai".to_string());
        let ex = exposure(&[semi], MarketRegime::Bullish);

        let request = SizingRequest::new(dec!(50), dec!(48), "industrials").with_correlation_group("ai");
        let decision = size_position(&request, &budget, &ex);

        assert!(decision.approved);
        assert_eq!(decision.shares, dec!(500));
        assert!(decision.warnings.iter().any(|w| w.contains("correlated group ai")));
    }

    #[test]
    fn test_unrounded_per_trade_fraction_stays_under_cap() {
        let budget = RiskBudget {
            max_risk_per_trade: 0.0099999996,
            ..RiskBudget::default()
        };
        assert!(budget.validate().is_ok());
        let ex = compute_exposure(&[], dec!(1000000), MarketRegime::Bullish, &budget);

        let decision = size_position(&SizingRequest::new(dec!(10), dec!(9), "tech"), &budget, &ex);

        // 1000000 × 0.0099999996 = 9999.9996 → 9999주
        assert!(decision.approved);
        assert_eq!(decision.shares, dec!(9999));
        assert!(decision.dollar_risk <= dec!(9999.9996));
    }

    #[test]
    fn test_rejection_reason_display() {
        assert_eq!(RejectionReason::ZeroSize.to_string(), "ZERO_SIZE");
        assert_eq!(
            serde_json::to_string(&RejectionReason::SectorPositionLimit).unwrap(),
            "\"SECTOR_POSITION_LIMIT\""
        );
    }
}
