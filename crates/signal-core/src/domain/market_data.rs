//! 일봉 가격 데이터 타입.
//!
//! 이 모듈은 시뮬레이터가 소비하는 가격 데이터를 정의합니다:
//! - `PriceBar` - 하루 세션의 OHLCV
//! - `PriceSeries` - 한 종목의 날짜 오름차순 `PriceBar` 목록

use crate::error::{CoreError, CoreResult};
use crate::types::{Price, Quantity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하루 거래 세션의 OHLCV 데이터.
///
/// 역직렬화도 `PriceBar::new`의 불변식 검증을 거칩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BarRecord")]
pub struct PriceBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
}

impl PriceBar {
    /// 새 가격 봉을 생성합니다.
    ///
    /// `high >= max(open, close, low)`, `low <= min(open, close, high)`를 검증합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> CoreResult<Self> {
        let bar = Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        bar.validate()?;
        Ok(bar)
    }

    /// 봉의 가격 불변식을 검증합니다.
    pub fn validate(&self) -> CoreResult<()> {
        if self.high < self.open.max(self.close).max(self.low) {
            return Err(CoreError::InvalidBar(format!(
                "{}: high {} is below open/close/low",
                self.date, self.high
            )));
        }
        if self.low > self.open.min(self.close).min(self.high) {
            return Err(CoreError::InvalidBar(format!(
                "{}: low {} is above open/close/high",
                self.date, self.low
            )));
        }
        if self.volume < Decimal::ZERO {
            return Err(CoreError::InvalidBar(format!(
                "{}: negative volume {}",
                self.date, self.volume
            )));
        }
        Ok(())
    }

    /// 봉 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 직전 종가를 반영한 True Range를 반환합니다.
    ///
    /// `max(high - low, |high - prev_close|, |low - prev_close|)`.
    /// 직전 종가가 없으면 당일 범위를 사용합니다.
    pub fn true_range(&self, prev_close: Option<Price>) -> Decimal {
        let hl = self.range();
        match prev_close {
            Some(pc) => {
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => hl,
        }
    }
}

/// 검증 전 봉 레코드 (CSV 행, JSON 객체 공용).
#[derive(Debug, Deserialize)]
struct BarRecord {
    date: NaiveDate,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: Quantity,
}

impl TryFrom<BarRecord> for PriceBar {
    type Error = CoreError;

    fn try_from(r: BarRecord) -> CoreResult<Self> {
        PriceBar::new(r.date, r.open, r.high, r.low, r.close, r.volume)
    }
}

/// 한 종목의 날짜 오름차순 가격 시계열 (중복 날짜 없음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRecord")]
pub struct PriceSeries {
    /// 종목 티커
    pub ticker: String,
    bars: Vec<PriceBar>,
}

#[derive(Deserialize)]
struct SeriesRecord {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl TryFrom<SeriesRecord> for PriceSeries {
    type Error = CoreError;

    fn try_from(r: SeriesRecord) -> CoreResult<Self> {
        PriceSeries::new(r.ticker, r.bars)
    }
}

impl PriceSeries {
    /// 새 가격 시계열을 생성합니다.
    ///
    /// 각 봉의 불변식과 날짜의 엄격한 오름차순을 검증합니다.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> CoreResult<Self> {
        for bar in &bars {
            bar.validate()?;
        }
        for pair in bars.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(CoreError::InvalidSeries(format!(
                    "duplicate date {}",
                    pair[1].date
                )));
            }
            if pair[1].date < pair[0].date {
                return Err(CoreError::InvalidSeries(format!(
                    "dates not ascending: {} after {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    /// 봉 슬라이스를 반환합니다.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// 봉 개수를 반환합니다.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 시계열이 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 인덱스로 봉을 조회합니다.
    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    /// 마지막 봉을 반환합니다.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// `date`보다 엄격히 이전인 봉의 개수.
    pub fn count_before(&self, date: NaiveDate) -> usize {
        self.bars.partition_point(|b| b.date < date)
    }

    /// `date` 당일 또는 그 이전의 마지막 봉 인덱스.
    pub fn index_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        let n = self.bars.partition_point(|b| b.date <= date);
        n.checked_sub(1)
    }

    /// `date`보다 엄격히 이후인 첫 봉 인덱스.
    pub fn first_index_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.date <= date);
        (idx < self.bars.len()).then_some(idx)
    }

    /// 날짜 범위 `[from, to]`에 해당하는 부분 시계열을 반환합니다.
    pub fn slice_dates(&self, from: NaiveDate, to: NaiveDate) -> PriceSeries {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= from && b.date <= to)
            .cloned()
            .collect();
        PriceSeries {
            ticker: self.ticker.clone(),
            bars,
        }
    }

    /// CSV 텍스트에서 가격 시계열을 파싱합니다.
    ///
    /// 헤더 행이 필요하며 `date,open,high,low,close,volume` 열을 이름으로 찾습니다
    /// (대소문자 무시, 열 순서 무관, 나머지 열은 무시). 날짜는 `YYYY-MM-DD`.
    /// 필드 앞뒤 공백과 따옴표는 제거됩니다.
    pub fn from_csv_str(ticker: impl Into<String>, content: &str) -> CoreResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: csv::StringRecord = reader
            .headers()?
            .iter()
            .map(str::to_lowercase)
            .collect();

        let mut bars = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: BarRecord = record.deserialize(Some(&headers))?;
            bars.push(PriceBar::try_from(row)?);
        }

        Self::new(ticker, bars)
    }
}
