//! 레짐 상한 초과 시 포지션 조정 제안.

use crate::budget::RiskBudget;
use crate::exposure::{OpenPosition, PortfolioExposure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_core::{fraction_of, Price, Quantity};
use tracing::{debug, warn};

/// 한 번에 축소할 수 있는 최대 수량 비율.
pub const MAX_TRIM_FRACTION: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// 포지션 조정 제안.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PositionAdjustment {
    /// 수량 일부 축소
    Trim {
        ticker: String,
        quantity: Quantity,
        risk_released: Decimal,
    },
    /// 손절가 도달, 청산 후보
    Close {
        ticker: String,
        current_price: Price,
        stop_loss: Price,
    },
}

impl PositionAdjustment {
    pub fn ticker(&self) -> &str {
        match self {
            PositionAdjustment::Trim { ticker, .. } | PositionAdjustment::Close { ticker, .. } => ticker,
        }
    }
}

/// 레짐 상한을 넘는 리스크를 줄이기 위한 축소/청산 제안을 만듭니다.
///
/// 축소는 리스크가 큰 포지션부터 진행하며 포지션당 수량의 50%를 넘지 않습니다.
/// 상한 아래로 내리지 못하면 남은 초과분은 그대로 둡니다.
/// 손절가에 도달한 포지션은 축소와 별개로 `Close` 후보가 됩니다.
pub fn suggest_adjustments(
    positions: &[OpenPosition],
    exposure: &PortfolioExposure,
    budget: &RiskBudget,
) -> Vec<PositionAdjustment> {
    let mut adjustments = Vec::new();

    let ceiling = fraction_of(exposure.equity, budget.regime_ceiling(exposure.regime));
    let mut excess = exposure.total_risk - ceiling;

    if excess > Decimal::ZERO {
        let mut ranked: Vec<&OpenPosition> = positions.iter().collect();
        ranked.sort_by(|a, b| {
            b.risk_amount()
                .cmp(&a.risk_amount())
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        for position in ranked {
            if excess <= Decimal::ZERO {
                break;
            }
            let per_share = position.risk_per_share();
            if per_share <= Decimal::ZERO {
                continue;
            }

            let needed = (excess / per_share).ceil();
            let cap = (position.quantity * MAX_TRIM_FRACTION).floor();
            let quantity = needed.min(cap);
            if quantity <= Decimal::ZERO {
                continue;
            }

            let released = quantity * per_share;
            excess -= released;
            debug!(ticker = %position.ticker, %quantity, %released, "Trim suggested");
            adjustments.push(PositionAdjustment::Trim {
                ticker: position.ticker.clone(),
                quantity,
                risk_released: released,
            });
        }

        if excess > Decimal::ZERO {
            warn!(
                regime = %exposure.regime,
                remaining_excess = %excess,
                "Trims capped at half of each position; portfolio remains above regime ceiling"
            );
        }
    }

    for position in positions.iter().filter(|p| p.is_stopped_out()) {
        adjustments.push(PositionAdjustment::Close {
            ticker: position.ticker.clone(),
            current_price: position.current_price,
            stop_loss: position.stop_loss,
        });
    }

    adjustments
}
