//! 소프트 시그널 의사결정 엔진 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 레이블된 예제로 모델 학습
//! signal train --examples data/examples.json --output models/active.json
//!
//! # 시그널 비토 판정
//! signal score --features signal.json --model models/active.json
//!
//! # 과거 일봉으로 거래 결과 재생
//! signal simulate --ticker AAPL --signal-date 2024-03-15 --bars data/AAPL.csv
//!
//! # 현재 포트폴리오 기준 포지션 크기
//! signal size --entry 50 --stop 48 --sector Technology --equity 100000 --regime choppy
//!
//! # 환경 변수까지 적용된 설정 확인
//! SIGNAL__RISK__PRESET=aggressive signal settings
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use signal_core::{init_logging, EngineSettings, MarketRegime, Sector};
use std::path::{Path, PathBuf};
use tracing::debug;

use signal_cli::commands::evaluate::{run_evaluate, EvaluateOptions};
use signal_cli::commands::score::{run_score, ScoreOptions};
use signal_cli::commands::simulate::{run_simulate, SimulateOptions};
use signal_cli::commands::size::{run_size, SizeOptions};
use signal_cli::commands::train::{run_train, ClassWeightArg, TrainOptions};

#[derive(Parser)]
#[command(name = "signal")]
#[command(about = "Soft-signal trade decision engine", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값 사용)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 레이블된 예제로 로지스틱 회귀 모델 학습
    Train {
        /// 학습 예제 JSON 파일
        #[arg(short, long)]
        examples: PathBuf,

        /// 파라미터 스냅샷 저장 경로
        #[arg(short, long)]
        output: PathBuf,

        /// 홀드아웃 예제 JSON 파일
        #[arg(long)]
        holdout: Option<PathBuf>,

        /// 난수 시드
        #[arg(long)]
        seed: Option<u64>,

        /// 반복 횟수
        #[arg(long)]
        iterations: Option<usize>,

        /// 학습률
        #[arg(long)]
        learning_rate: Option<f64>,

        /// 클래스 가중치
        #[arg(long, value_enum, default_value_t = ClassWeightArg::None)]
        class_weight: ClassWeightArg,
    },

    /// 레이블된 예제로 모델 평가
    Evaluate {
        #[arg(short, long)]
        examples: PathBuf,

        /// 모델 파라미터 파일 (기본: 설정 또는 기본 모델)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// feature vector 성공 확률 및 비토 판정
    Score {
        /// feature JSON 파일 (객체 또는 배열)
        #[arg(short, long)]
        features: PathBuf,

        #[arg(short, long)]
        model: Option<PathBuf>,

        /// 최소 성공 확률 (%)
        #[arg(long)]
        min_probability: Option<f64>,
    },

    /// 과거 일봉으로 시그널 진입 결과 시뮬레이션
    Simulate {
        #[arg(short, long)]
        ticker: String,

        /// 시그널 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        signal_date: NaiveDate,

        /// 일봉 CSV 파일 (date,open,high,low,close,volume)
        #[arg(short, long)]
        bars: PathBuf,

        /// 최대 보유일 재정의
        #[arg(long)]
        max_holding_days: Option<usize>,
    },

    /// 현재 노출 기준 포지션 크기 결정
    Size {
        #[arg(long)]
        entry: Decimal,

        #[arg(long)]
        stop: Decimal,

        #[arg(long)]
        sector: String,

        /// 상관 그룹
        #[arg(long)]
        group: Option<String>,

        /// 보유 포지션 JSON 파일
        #[arg(short, long)]
        positions: Option<PathBuf>,

        #[arg(long)]
        equity: Decimal,

        /// 시장 레짐 (bullish, choppy, crash_like)
        #[arg(short, long, default_value = "choppy")]
        regime: MarketRegime,

        /// 리스크 프리셋 (conservative, default, aggressive)
        #[arg(long)]
        preset: Option<String>,
    },

    /// 적용된 설정(파일 + 환경 변수)을 TOML로 출력
    Settings,
}

fn load_settings(path: &Path) -> Result<EngineSettings> {
    if path.exists() {
        EngineSettings::load(path).with_context(|| format!("Failed to load {}", path.display()))
    } else {
        EngineSettings::from_env().context("Failed to load settings from environment")
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    // .env 파일은 선택 사항
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;

    if let Err(e) = init_logging(settings.logging.to_log_config()) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!(config = %cli.config.display(), "Settings loaded");

    match cli.command {
        Commands::Train {
            examples,
            output,
            holdout,
            seed,
            iterations,
            learning_rate,
            class_weight,
        } => {
            let options = TrainOptions {
                examples_path: examples,
                output_path: output,
                holdout_path: holdout,
                seed,
                iterations,
                learning_rate,
                class_weight,
            };
            print_json(&run_train(&options)?)
        }

        Commands::Evaluate { examples, model } => {
            let options = EvaluateOptions {
                examples_path: examples,
                model_path: model,
            };
            print_json(&run_evaluate(&options, &settings.model)?)
        }

        Commands::Score {
            features,
            model,
            min_probability,
        } => {
            let options = ScoreOptions {
                features_path: features,
                model_path: model,
                min_probability,
            };
            print_json(&run_score(&options, &settings.model)?)
        }

        Commands::Simulate {
            ticker,
            signal_date,
            bars,
            max_holding_days,
        } => {
            let options = SimulateOptions {
                ticker: ticker.to_uppercase(),
                signal_date,
                bars_path: bars,
                max_holding_days,
            };
            print_json(&run_simulate(&options, &settings.simulation)?)
        }

        Commands::Size {
            entry,
            stop,
            sector,
            group,
            positions,
            equity,
            regime,
            preset,
        } => {
            let options = SizeOptions {
                entry,
                stop,
                sector: Sector::new(sector),
                correlation_group: group,
                positions_path: positions,
                equity,
                regime,
                preset,
            };
            print_json(&run_size(&options, &settings.risk)?)
        }

        Commands::Settings => {
            print!("{}", settings.to_toml_string()?);
            Ok(())
        }
    }
}
