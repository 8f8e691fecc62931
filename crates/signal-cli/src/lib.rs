//! 소프트 시그널 의사결정 엔진 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 모델 학습 및 평가
//! - 비토 판정
//! - 거래 결과 시뮬레이션
//! - 포지션 크기 결정

pub mod commands;
