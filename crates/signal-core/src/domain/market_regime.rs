//! MarketRegime - 리스크 예산 스케일링용 시장 레짐 분류.
//!
//! 레짐 판정 자체는 호출자가 수행하고, 엔진은 레짐별 리스크 한도를 적용합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시장 상태를 나타내는 3단계 레짐.
///
/// - **Bullish**: 상승장, 리스크 예산 최대
/// - **Choppy**: 방향성 없는 횡보/변동 장세
/// - **CrashLike**: 급락/공포 장세, 리스크 예산 최소
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum MarketRegime {
    /// 상승장
    Bullish,
    /// 횡보/변동 장세
    #[default]
    Choppy,
    /// 급락 장세
    CrashLike,
}

impl MarketRegime {
    /// 모든 레짐 (리스크 선호도 내림차순).
    pub const ALL: [MarketRegime; 3] = [Self::Bullish, Self::Choppy, Self::CrashLike];

    /// 리스크 축소가 필요한 레짐인지 확인합니다.
    pub fn is_risk_off(self) -> bool {
        matches!(self, Self::CrashLike)
    }

    /// 설명 문자열
    pub fn description(self) -> &'static str {
        match self {
            Self::Bullish => "상승장",
            Self::Choppy => "횡보/변동 장세",
            Self::CrashLike => "급락 장세",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bullish => "BULLISH",
            Self::Choppy => "CHOPPY",
            Self::CrashLike => "CRASH_LIKE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MarketRegime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "bullish" | "bull" => Ok(Self::Bullish),
            "choppy" | "sideways" | "neutral" => Ok(Self::Choppy),
            "crash_like" | "crashlike" | "crash" | "bearish" => Ok(Self::CrashLike),
            _ => Err(format!("Unknown market regime: {}", s)),
        }
    }
}
