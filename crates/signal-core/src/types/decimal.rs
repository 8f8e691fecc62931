//! 정밀한 금액 계산을 위한 Decimal 유틸리티.
//!
//! 가격, 자산, 달러 리스크, 주식 수는 `Decimal`로 표현하고
//! 비율(fraction), 확률, R 배수는 `f64`로 표현합니다.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주식 수량 타입.
pub type Quantity = Decimal;

/// 소수점 이하 자릿수 (`fraction_of` 결과).
const FRACTION_SCALE: u32 = 8;

/// 비율을 금액으로 변환합니다.
///
/// `f64`의 이진 값을 그대로 `Decimal`로 옮겨 곱한 뒤 소수점 8자리에서
/// 0 방향으로 버리므로 결과는 `amount × fraction`을 넘지 않습니다.
/// NaN/무한대 비율은 0입니다.
///
/// 예시: `fraction_of(10000, 0.01) = 100` (10000의 1%)
pub fn fraction_of(amount: Decimal, fraction: f64) -> Decimal {
    let Some(exact) = Decimal::from_f64_retain(fraction) else {
        return Decimal::ZERO;
    };
    (amount * exact)
        .round_dp_with_strategy(FRACTION_SCALE, RoundingStrategy::ToZero)
        .normalize()
}

/// 금액이 기준 금액에서 차지하는 비율을 계산합니다.
///
/// 기준 금액이 0 이하이면 0을 반환합니다.
pub fn ratio_of(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    (part / whole).to_f64().unwrap_or(0.0)
}

/// `Decimal`을 `f64`로 변환합니다 (표현 불가 시 0).
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// `f64`를 `Decimal`로 변환합니다 (NaN/무한대는 0).
pub fn from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}
