//! 섹터 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 종목이 속한 섹터 (예: "Technology", "Healthcare").
///
/// 비교는 대소문자를 구분하지 않도록 생성 시 공백을 제거하고 대문자로 정규화합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Sector(String);

impl Sector {
    /// 새 섹터를 생성합니다.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_uppercase())
    }

    /// 섹터 정보가 없는 종목에 사용하는 섹터.
    pub fn unknown() -> Self {
        Self("UNKNOWN".to_string())
    }

    /// 정규화된 섹터 이름을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Sector {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Sector {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Sector> for String {
    fn from(sector: Sector) -> Self {
        sector.0
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
