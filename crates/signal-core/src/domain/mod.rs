//! 의사결정 엔진을 위한 도메인 모델.

mod market_data;
mod market_regime;

pub use market_data::*;
pub use market_regime::*;
