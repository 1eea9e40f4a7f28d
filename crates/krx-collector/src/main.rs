//! KRX 순매수 수집기 CLI.

use anyhow::{anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use krx_collector::{modules, CliOverrides, CollectorConfig, DailyRoutineService, RunRequest};
use krx_core::{init_logging, KrxDataPort, Market, StoragePort};
use krx_data::{build_storage, GoogleDriveAdapter, KrxHttpAdapter, LocalStorageAdapter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "krx-collector")]
#[command(about = "KRX 투자자별 순매수 수집기", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 순매수 데이터 수집 및 리포트 생성
    Crawl {
        /// 기준일 (YYYY-MM-DD 또는 YYYYMMDD, 기본: 오늘)
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// 수집 시작일 (기준일까지 평일 전체 수집)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Google Drive에도 저장 (로컬 → Drive)
        #[arg(long)]
        drive: bool,

        /// Google Drive를 먼저 사용 (Drive → 로컬)
        #[arg(long)]
        drive_first: bool,

        /// 수집 시장 (반복 지정 가능, 예: --market KOSPI)
        #[arg(long = "market")]
        markets: Vec<Market>,
    },

    /// Google Drive의 산출물을 로컬로 복사
    Download {
        /// 기준일 (기본: 오늘)
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// 설정된 저장소 응답 확인
    Healthcheck {
        /// Google Drive도 점검
        #[arg(long)]
        drive: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
        ..Default::default()
    };
    match &cli.command {
        Commands::Crawl {
            drive,
            drive_first,
            markets,
            ..
        } => {
            overrides.storage_order = CliOverrides::storage_order_from_flags(*drive, *drive_first);
            overrides.markets = markets.clone();
        }
        Commands::Healthcheck { drive } => {
            overrides.storage_order = CliOverrides::storage_order_from_flags(*drive, false);
        }
        Commands::Download { .. } => {}
    }

    let config = CollectorConfig::load(&cli.config, &overrides)?;
    init_logging(config.log_config()).map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    tracing::info!("KRX Collector 시작");

    match cli.command {
        Commands::Crawl { date, from, .. } => crawl(&config, date, from).await?,
        Commands::Download { date } => download(&config, date).await?,
        Commands::Healthcheck { .. } => healthcheck(&config).await?,
    }

    tracing::info!("KRX Collector 종료");
    Ok(())
}

async fn crawl(
    config: &CollectorConfig,
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let run_date = date.unwrap_or_else(today_in_seoul);
    let request = match from {
        Some(from) => RunRequest::range(from, run_date)?,
        None => RunRequest::single(run_date),
    };

    let app = &config.app;
    let storage = Arc::new(build_storage(&app.storage, config.storage_order())?);
    let port: Arc<dyn KrxDataPort> = Arc::new(KrxHttpAdapter::new(&app.krx)?);
    let service = DailyRoutineService::new(port, storage, app.routine.clone());

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("종료 신호 수신, 현재 단계 이후 중단");
            signal_token.cancel();
        }
    });

    let summary = match service.run(&request, &cancel).await {
        Ok(summary) => summary,
        Err(failure) => {
            failure.summary.log_summary();
            return Err(failure.into());
        }
    };
    summary.log_summary();

    let failed = summary.failed_artifacts();
    if !failed.is_empty() {
        bail!("저장하지 못한 산출물: {}", failed.join(", "));
    }
    Ok(())
}

async fn download(config: &CollectorConfig, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let date = date.unwrap_or_else(today_in_seoul);
    let app = &config.app;

    let source = GoogleDriveAdapter::new(&app.storage.drive)?;
    let target = LocalStorageAdapter::new(&app.storage.local_base_path);

    let stats = modules::download_artifacts(&source, &target, date, &app.routine.markets).await;
    stats.log_summary("산출물 다운로드");

    if stats.errors > 0 {
        bail!("{}건 다운로드 실패", stats.errors);
    }
    if stats.success == 0 {
        tracing::warn!(%date, "내려받을 산출물이 없습니다");
    }
    Ok(())
}

async fn healthcheck(config: &CollectorConfig) -> anyhow::Result<()> {
    let storage = build_storage(&config.app.storage, config.storage_order())?;

    let results = modules::check_backends(storage.backends()).await;
    let unhealthy: Vec<&str> = results
        .iter()
        .filter(|r| !r.is_healthy())
        .map(|r| r.backend.as_str())
        .collect();

    tracing::info!(
        storage = storage.name(),
        healthy = results.len() - unhealthy.len(),
        unhealthy = unhealthy.len(),
        "저장소 점검 완료"
    );

    if !unhealthy.is_empty() {
        bail!("응답하지 않는 저장소: {}", unhealthy.join(", "));
    }
    Ok(())
}

/// 한국 시간 기준 오늘.
fn today_in_seoul() -> NaiveDate {
    chrono::Utc::now()
        .with_timezone(&chrono_tz::Asia::Seoul)
        .date_naive()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| format!("날짜 형식이 올바르지 않습니다 (YYYY-MM-DD 또는 YYYYMMDD): {}", s))
}
