//! 이름 기반 feature vector와 feature 카탈로그.
//!
//! 분류기는 이름으로 feature를 찾습니다. 학습과 추론에서 같은 키 집합을
//! 사용해야 하며, 누락된 키는 0으로, 모르는 키는 무시됩니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// 순서가 고정된 feature 이름 목록.
///
/// 그룹 경계는 [`FeatureGroup::range`]와 일치해야 합니다.
/// 이름 변경은 저장된 모델과의 호환성을 깨뜨립니다.
pub const FEATURE_NAMES: &[&str] = &[
    // 기준별 점수 (0~10)
    "insider_score",
    "congress_score",
    "analyst_score",
    "institutional_score",
    "short_interest_score",
    "earnings_score",
    "valuation_score",
    "momentum_score",
    "quality_score",
    "sentiment_score",
    "catalyst_score",
    "signal_confluence_score",
    // 레짐/VIX 컨텍스트
    "regime_bullish",
    "regime_choppy",
    "regime_crash",
    "vix_level",
    "vix_percentile",
    "vix_change_5d",
    "spy_above_200ma",
    "spy_above_50ma",
    "market_breadth",
    "sector_relative_strength",
    // 이동평균/RSI 기술 지표
    "price_vs_sma20",
    "price_vs_sma50",
    "price_vs_sma200",
    "sma20_slope",
    "sma50_slope",
    "sma50_vs_sma200",
    "ema_cross_bullish",
    "rsi_14",
    "rsi_oversold",
    "rsi_overbought",
    "macd_histogram",
    "macd_cross_bullish",
    "atr_pct",
    "bollinger_pct_b",
    "distance_from_52w_high",
    "distance_from_52w_low",
    // 거래량
    "volume_ratio_20d",
    "volume_trend_5d",
    "obv_slope",
    "accumulation_distribution",
    "up_down_volume_ratio",
    "relative_volume",
    "dollar_volume_log",
    "volume_spike",
    "vwap_distance",
    "float_turnover",
    // 지지/저항 및 멀티 타임프레임
    "distance_to_support",
    "distance_to_resistance",
    "support_strength",
    "resistance_strength",
    "near_support",
    "breakout_confirmed",
    "daily_trend_score",
    "weekly_trend_score",
    "monthly_trend_score",
    "timeframe_alignment",
    "weekly_rsi",
    "higher_highs_count",
    "higher_lows_count",
    "pivot_position",
    // 다이버전스/패턴 플래그
    "bullish_divergence",
    "bearish_divergence",
    "hidden_bullish_divergence",
    "hammer",
    "bullish_engulfing",
    "morning_star",
    "doji",
    "gap_up",
    "gap_down",
    "inside_day",
    "cup_and_handle",
    "double_bottom",
    "bull_flag",
    "head_and_shoulders",
    // 계절성/매크로
    "month_of_year",
    "day_of_week",
    "is_january",
    "is_earnings_season",
    "days_to_earnings",
    "days_since_signal",
    "sell_in_may_window",
    "santa_rally_window",
    "pre_holiday",
    "fomc_week",
    "ten_year_yield_change",
    "dollar_index_change",
    "credit_spread_change",
    "yield_curve_slope",
];

/// feature 카탈로그의 그룹.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// 기준별 점수 (0~10)
    CriteriaScores,
    /// 레짐/VIX 컨텍스트
    RegimeContext,
    /// 이동평균/RSI 기술 지표
    Technicals,
    /// 거래량 지표
    Volume,
    /// 지지/저항 및 멀티 타임프레임 점수
    SupportResistance,
    /// 다이버전스/패턴 플래그
    Patterns,
    /// 계절성/매크로 컨텍스트
    SeasonalMacro,
}

impl FeatureGroup {
    /// 모든 그룹 (카탈로그 순서).
    pub const ALL: [FeatureGroup; 7] = [
        Self::CriteriaScores,
        Self::RegimeContext,
        Self::Technicals,
        Self::Volume,
        Self::SupportResistance,
        Self::Patterns,
        Self::SeasonalMacro,
    ];

    /// [`FEATURE_NAMES`]에서 이 그룹이 차지하는 인덱스 범위.
    pub fn range(self) -> Range<usize> {
        match self {
            Self::CriteriaScores => 0..12,
            Self::RegimeContext => 12..22,
            Self::Technicals => 22..38,
            Self::Volume => 38..48,
            Self::SupportResistance => 48..62,
            Self::Patterns => 62..76,
            Self::SeasonalMacro => 76..90,
        }
    }

    /// 그룹에 속한 feature 이름.
    pub fn names(self) -> &'static [&'static str] {
        &FEATURE_NAMES[self.range()]
    }

    /// feature 이름이 속한 그룹을 찾습니다.
    pub fn of(name: &str) -> Option<FeatureGroup> {
        let idx = FEATURE_NAMES.iter().position(|n| *n == name)?;
        Self::ALL.into_iter().find(|g| g.range().contains(&idx))
    }
}

/// 이름 → 유한 실수 값의 feature vector.
///
/// 키 순서가 정렬되어 있어 반복 순서가 결정적입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    /// 빈 feature vector를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// feature 값을 설정합니다.
    ///
    /// NaN/무한대는 저장하지 않고 `false`를 반환합니다 (누락 = 0으로 취급).
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> bool {
        let name = name.into();
        if !value.is_finite() {
            tracing::debug!(feature = %name, "Dropping non-finite feature value");
            self.values.remove(&name);
            return false;
        }
        self.values.insert(name, value);
        true
    }

    /// 빌더 형태로 feature 값을 설정합니다.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// feature 값을 조회합니다. 누락된 키는 0입니다.
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    /// 키가 존재하는지 확인합니다.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// feature 개수.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (이름, 값) 쌍을 정렬된 순서로 반복합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// feature 이름을 정렬된 순서로 반복합니다.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 카탈로그에 없는 키 목록 (진단용).
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.keys().filter(|k| !FEATURE_NAMES.contains(k)).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut vector = FeatureVector::new();
        for (k, v) in iter {
            vector.insert(k, v);
        }
        vector
    }
}
