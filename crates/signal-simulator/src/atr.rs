//! ATR (Average True Range, 평균 실제 범위).
//!
//! True Range = max(고가 - 저가, |고가 - 직전 종가|, |저가 - 직전 종가|)
//! ATR = 기간 내 True Range의 단순 평균

use rust_decimal::Decimal;
use signal_core::PriceSeries;

/// `end` 인덱스 봉까지 `period`개 봉의 단순 평균 ATR.
///
/// 창이 시계열 범위를 벗어나면 `None`. 창 첫 봉에 직전 봉이 있으면 그 종가를 사용합니다.
pub fn average_true_range(series: &PriceSeries, end: usize, period: usize) -> Option<Decimal> {
    if period == 0 || end >= series.len() || end + 1 < period {
        return None;
    }

    let bars = series.bars();
    let start = end + 1 - period;

    let sum: Decimal = (start..=end)
        .map(|i| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            bars[i].true_range(prev_close)
        })
        .sum();

    Some(sum / Decimal::from(period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use signal_core::PriceBar;

    fn bar(day: u32, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open,
            high,
            low,
            close,
            dec!(1000),
        )
        .unwrap()
    }

    #[test]
    fn test_atr_uses_previous_close() {
        let series = PriceSeries::new(
            "TEST",
            vec![
                bar(1, dec!(100), dec!(101), dec!(99), dec!(100)),
                // 갭 상승: TR = max(2, |108-100|, |106-100|) = 8
                bar(2, dec!(107), dec!(108), dec!(106), dec!(107)),
                // TR = max(4, |109-107|, |105-107|) = 4
                bar(3, dec!(107), dec!(109), dec!(105), dec!(106)),
            ],
        )
        .unwrap();

        assert_eq!(average_true_range(&series, 2, 2), Some(dec!(6)));
        // 첫 봉은 직전 종가 없이 범위만 사용
        assert_eq!(average_true_range(&series, 2, 3), Some(dec!(14) / dec!(3)));
    }

    #[test]
    fn test_atr_window_out_of_range() {
        let series = PriceSeries::new(
            "TEST",
            vec![bar(1, dec!(10), dec!(11), dec!(9), dec!(10))],
        )
        .unwrap();

        assert_eq!(average_true_range(&series, 0, 2), None);
        assert_eq!(average_true_range(&series, 1, 1), None);
        assert_eq!(average_true_range(&series, 0, 0), None);
        assert_eq!(average_true_range(&series, 0, 1), Some(dec!(2)));
    }
}
