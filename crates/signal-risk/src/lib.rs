//! # Signal Risk
//!
//! 포트폴리오 리스크 예산, 노출 계산, 포지션 크기 결정을 제공합니다.
//!
//! 크기 결정은 거래당 최대 달러 리스크에서 시작해 세 가지 축소 계수를
//! 순서대로 곱합니다:
//! 1. 레짐 상한 (현재 시장 레짐의 총 리스크 한도)
//! 2. 섹터 한도 (리스크 비율, 포지션 수)
//! 3. 포트폴리오 총 예산
//!
//! ```rust,ignore
//! use signal_risk::{RiskAllocator, RiskPreset, SizingRequest};
//!
//! let allocator = RiskAllocator::with_preset(RiskPreset::Default)?;
//! let exposure = allocator.exposure(&positions, equity, MarketRegime::Choppy);
//! let decision = allocator.size(&SizingRequest::new(entry, stop, "Technology"), &exposure);
//! ```

pub mod adjustments;
pub mod allocator;
pub mod budget;
pub mod exposure;
pub mod sizing;

pub use adjustments::{suggest_adjustments, PositionAdjustment, MAX_TRIM_FRACTION};
pub use allocator::RiskAllocator;
pub use budget::{ConfigValidationError, RegimeRiskLimits, RiskBudget, RiskPreset};
pub use exposure::{compute_exposure, OpenPosition, PortfolioExposure, PositionRisk};
pub use sizing::{
    size_position, RejectionReason, SizingDecision, SizingRequest, MAX_NOTIONAL_FRACTION,
};
