//! 검증된 예산을 보유하는 리스크 배분기.

use crate::adjustments::{suggest_adjustments, PositionAdjustment};
use crate::budget::{ConfigValidationError, RiskBudget, RiskPreset};
use crate::exposure::{compute_exposure, OpenPosition, PortfolioExposure};
use crate::sizing::{size_position, SizingDecision, SizingRequest};
use rust_decimal::Decimal;
use signal_core::{MarketRegime, RiskSettings};

/// 포트폴리오 리스크 배분기.
///
/// 상태 없이 예산만 보유하므로 여러 스레드에서 공유해도 안전합니다.
#[derive(Debug, Clone)]
pub struct RiskAllocator {
    budget: RiskBudget,
}

impl RiskAllocator {
    /// 예산을 검증하고 배분기를 생성합니다.
    pub fn new(budget: RiskBudget) -> Result<Self, ConfigValidationError> {
        budget.validate()?;
        Ok(Self { budget })
    }

    pub fn with_preset(preset: RiskPreset) -> Result<Self, ConfigValidationError> {
        Self::new(RiskBudget::preset(preset))
    }

    pub fn from_settings(settings: &RiskSettings) -> Result<Self, ConfigValidationError> {
        Ok(Self {
            budget: RiskBudget::from_settings(settings)?,
        })
    }

    pub fn budget(&self) -> &RiskBudget {
        &self.budget
    }

    pub fn exposure(
        &self,
        positions: &[OpenPosition],
        equity: Decimal,
        regime: MarketRegime,
    ) -> PortfolioExposure {
        compute_exposure(positions, equity, regime, &self.budget)
    }

    pub fn size(&self, request: &SizingRequest, exposure: &PortfolioExposure) -> SizingDecision {
        size_position(request, &self.budget, exposure)
    }

    /// 보유 포지션에서 노출을 계산한 뒤 바로 크기를 정합니다.
    pub fn size_against(
        &self,
        request: &SizingRequest,
        positions: &[OpenPosition],
        equity: Decimal,
        regime: MarketRegime,
    ) -> SizingDecision {
        let exposure = self.exposure(positions, equity, regime);
        self.size(request, &exposure)
    }

    pub fn suggest(
        &self,
        positions: &[OpenPosition],
        exposure: &PortfolioExposure,
    ) -> Vec<PositionAdjustment> {
        suggest_adjustments(positions, exposure, &self.budget)
    }
}
