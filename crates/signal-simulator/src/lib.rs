//! # Signal Simulator
//!
//! 과거 일봉으로 소프트 시그널 진입을 재생해 실현 R 결과를 계산합니다.
//!
//! - 진입: 시그널 날짜 이후 첫 봉의 시가
//! - 손절: `entry - ATR × stop_multiple`
//! - 목표: 손절 거리의 2/3/4배, 33%/33%/잔여 분할 청산
//! - 시간 청산: 최대 보유일의 종가
//!
//! ```rust,ignore
//! use signal_simulator::{SimulationConfig, Simulator};
//!
//! let simulator = Simulator::new(SimulationConfig::default())?;
//! if let Some(outcome) = simulator.simulate("AAPL", signal_date, &series) {
//!     println!("{} {:.2}R", outcome.exit_reason, outcome.realized_r);
//! }
//! ```

pub mod atr;
pub mod config;
pub mod exit;
pub mod outcome;
pub mod simulator;

pub use atr::average_true_range;
pub use config::{SimulationConfig, SimulationConfigError};
pub use exit::{ExitFill, ExitKind, ExitState, TradeLevels, Transition};
pub use outcome::{ExitReason, OutcomeSummary, TradeOutcome};
pub use simulator::{simulate, SignalRequest, Simulator};
