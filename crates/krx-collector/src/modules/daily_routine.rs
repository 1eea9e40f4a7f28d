//! 일일 수집 루틴.
//!
//! 수집 → 집계 → 리포트 생성 → 저장 순서로 진행하는 상태 머신입니다.
//!
//! - 수집: (날짜, 시장)별로 동시에 수집하며 실패한 대상만 제외합니다.
//! - 누적 구간에 필요하지만 이번에 요청하지 않은 날짜는 저장소에서 원본을 다시 읽습니다.
//! - 생성: 산출물별로 직렬화하며, 실패한 산출물만 저장에서 제외합니다.
//! - 저장: 산출물마다 저장소별 결과를 기록하며, 한 저장소의 실패로 실행이 중단되지 않습니다.
//! - 취소 토큰은 단계 사이에서 확인합니다. 이미 기록한 산출물은 되돌리지 않습니다.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use krx_analytics::{
    parse_raw_json, render_raw_json, render_report_json, render_watchlist_csv, DailyPivot,
    RankingAggregator, RenderError, ReportBuilder,
};
use krx_core::{
    business_days, sort_records, AggregationError, AggregationWindow, ArtifactKey, FetchError,
    KrxData, KrxDataPort, Market, Rankings, ReportMetadata, RoutineConfig, RunAbortedError,
    StorageArtifact, StoragePort,
};
use krx_data::FallbackStorageAdapter;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use crate::error::{RoutineError, RoutineFailure};
use crate::summary::{
    ArtifactOutcome, FetchOutcome, FetchStatus, HistoryOutcome, HistoryStatus, RenderFailure,
    RunState, RunSummary,
};

/// (날짜, 시장) 하나당 최대 수집 시도 횟수.
pub const MAX_FETCH_ATTEMPTS: u32 = 2;

/// 실행 요청: 기준일과 수집 범위 시작일.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    run_date: NaiveDate,
    range_start: NaiveDate,
}

impl RunRequest {
    /// 하루만 수집합니다.
    pub fn single(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            range_start: run_date,
        }
    }

    /// `from`부터 `run_date`까지 수집합니다.
    pub fn range(from: NaiveDate, run_date: NaiveDate) -> Result<Self, AggregationError> {
        if from > run_date {
            return Err(AggregationError::InvalidWindow {
                start: from,
                end: run_date,
            });
        }
        Ok(Self {
            run_date,
            range_start: from,
        })
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn range_start(&self) -> NaiveDate {
        self.range_start
    }

    /// 수집할 거래일 (주말 제외).
    pub fn dates(&self) -> Vec<NaiveDate> {
        business_days(self.range_start, self.run_date)
    }
}

/// 일일 수집 루틴 서비스.
pub struct DailyRoutineService {
    port: Arc<dyn KrxDataPort>,
    storage: Arc<FallbackStorageAdapter>,
    aggregator: RankingAggregator,
    report_builder: ReportBuilder,
    config: RoutineConfig,
}

impl DailyRoutineService {
    pub fn new(
        port: Arc<dyn KrxDataPort>,
        storage: Arc<FallbackStorageAdapter>,
        config: RoutineConfig,
    ) -> Self {
        Self {
            port,
            storage,
            aggregator: RankingAggregator::new(),
            report_builder: ReportBuilder::new(config.top_k),
            config,
        }
    }

    /// 루틴을 실행합니다.
    ///
    /// `Done`으로 끝나면 실행 요약을, `Failed`로 끝나면 에러와 그 시점까지의 요약을 반환합니다.
    pub async fn run(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, RoutineFailure> {
        let run_date = request.run_date();
        let span = krx_core::collect_span!("daily_routine", run_date);
        self.run_inner(request, cancel).instrument(span).await
    }

    async fn run_inner(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, RoutineFailure> {
        let started = Instant::now();
        let mut summary = RunSummary::new(request.run_date());

        info!(
            run_id = %summary.run_id,
            range_start = %request.range_start(),
            markets = ?self.config.markets,
            storage = self.storage.name(),
            "일일 루틴 시작"
        );

        let result = self.execute(request, cancel, &mut summary).await;
        summary.elapsed = started.elapsed();

        match result {
            Ok(()) => {
                summary.transition(RunState::Done);
                info!(run_id = %summary.run_id, "일일 루틴 완료");
                Ok(summary)
            }
            Err(error) => {
                error!(run_id = %summary.run_id, stage = %summary.state, error = %error, "일일 루틴 실패");
                summary.transition(RunState::Failed);
                Err(RoutineFailure {
                    error,
                    summary: Box::new(summary),
                })
            }
        }
    }

    async fn execute(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
        summary: &mut RunSummary,
    ) -> Result<(), RoutineError> {
        // 1. 수집
        check_cancelled(cancel, summary.state)?;
        let dates = request.dates();
        let fetched = self.fetch_all(&dates, summary).await;

        if fetched.is_empty() {
            return Err(abort_reason(summary).into());
        }

        let cumulative = AggregationWindow::cumulative(
            self.config
                .cumulative_anchor
                .start_for(request.run_date(), request.range_start()),
            request.run_date(),
        )?;
        let history = self.load_history(cumulative, &dates, summary).await;

        // 2. 집계
        check_cancelled(cancel, summary.state)?;
        summary.transition(RunState::Aggregating);

        let mut records: Vec<KrxData> = fetched.values().flatten().cloned().collect();
        records.extend(history);
        sort_records(&mut records);

        let fetched_dates: BTreeSet<NaiveDate> = fetched.keys().map(|(date, _)| *date).collect();
        let mut windows: Vec<AggregationWindow> = fetched_dates
            .iter()
            .map(|&date| AggregationWindow::daily(date))
            .collect();
        windows.push(cumulative);

        let rankings = self.aggregator.aggregate(&records, &windows)?;
        let pivot = DailyPivot::from_records(&records, cumulative)?;
        info!(
            records = records.len(),
            windows = windows.len(),
            rankings = rankings.len(),
            "집계 완료"
        );

        // 3. 리포트 생성
        check_cancelled(cancel, summary.state)?;
        summary.transition(RunState::Building);
        let rendered = self.build(request.run_date(), &rankings, &pivot, &fetched);

        let mut artifacts = Vec::with_capacity(rendered.len());
        for (key, content) in rendered {
            match content {
                Ok(content) => artifacts.push(StorageArtifact::new(key, content)),
                Err(e) => {
                    error!(key = %key.path(), error = %e, "산출물 생성 실패, 저장 제외");
                    summary.render_failures.push(RenderFailure {
                        key: key.path(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // 4. 저장
        check_cancelled(cancel, summary.state)?;
        summary.transition(RunState::Persisting);
        for artifact in &artifacts {
            summary.artifacts.push(self.persist(artifact).await);
        }

        Ok(())
    }

    /// 요청한 (날짜, 시장)을 동시에 수집합니다.
    ///
    /// 레코드가 있는 대상만 `(날짜, 시장)` 순으로 반환하고, 모든 결과는 요약에 기록합니다.
    async fn fetch_all(
        &self,
        dates: &[NaiveDate],
        summary: &mut RunSummary,
    ) -> BTreeMap<(NaiveDate, Market), Vec<KrxData>> {
        let targets: Vec<(NaiveDate, Market)> = dates
            .iter()
            .flat_map(|&date| self.config.markets.iter().map(move |&market| (date, market)))
            .collect();

        info!(
            targets = targets.len(),
            concurrency = self.config.max_concurrent_fetches,
            "수집 시작"
        );

        let mut results: Vec<(NaiveDate, Market, u32, Result<Vec<KrxData>, FetchError>)> =
            stream::iter(targets)
                .map(|(date, market)| async move {
                    let (attempts, result) = self.fetch_one(date, market).await;
                    (date, market, attempts, result)
                })
                .buffer_unordered(self.config.max_concurrent_fetches.max(1))
                .collect()
                .await;
        results.sort_by_key(|(date, market, _, _)| (*date, *market));

        let mut fetched = BTreeMap::new();
        for (date, market, attempts, result) in results {
            let status = match result {
                Ok(records) if records.is_empty() => {
                    info!(%date, %market, "데이터 없음 (휴장일 가능)");
                    FetchStatus::Empty
                }
                Ok(mut records) => {
                    sort_records(&mut records);
                    let count = records.len();
                    fetched.insert((date, market), records);
                    FetchStatus::Ok { records: count }
                }
                Err(e) => {
                    warn!(%date, %market, attempts, error = %e, "수집 실패, 대상 제외");
                    FetchStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            summary.fetches.push(FetchOutcome {
                date,
                market,
                status,
                attempts,
            });
        }
        fetched
    }

    /// 타임아웃을 적용하여 수집하고, 재시도 가능한 에러는 한 번 더 시도합니다.
    async fn fetch_one(
        &self,
        date: NaiveDate,
        market: Market,
    ) -> (u32, Result<Vec<KrxData>, FetchError>) {
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let result = match tokio::time::timeout(timeout, self.port.fetch(date, market)).await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(format!(
                    "{} {} 수집이 {}초를 초과했습니다",
                    date, market, self.config.fetch_timeout_secs
                ))),
            };

            match result {
                Err(e) if e.is_retryable() && attempts < MAX_FETCH_ATTEMPTS => {
                    warn!(%date, %market, attempts, error = %e, "수집 실패, 재시도");
                }
                other => return (attempts, other),
            }
        }
    }

    /// 누적 구간에 포함되지만 이번에 요청하지 않은 날짜의 원본을 저장소에서 읽습니다.
    ///
    /// 없거나 읽지 못한 날짜는 0으로 취급하고 요약에 기록합니다.
    async fn load_history(
        &self,
        cumulative: AggregationWindow,
        requested: &[NaiveDate],
        summary: &mut RunSummary,
    ) -> Vec<KrxData> {
        let mut records = Vec::new();

        for date in cumulative.business_days() {
            if requested.contains(&date) {
                continue;
            }
            for &market in &self.config.markets {
                let key = ArtifactKey::Raw { market, date }.path();
                let status = match self.storage.read(&key).await {
                    Ok(Some(bytes)) => match parse_raw_json(&bytes) {
                        Ok(history) => {
                            let count = history.len();
                            records.extend(history);
                            HistoryStatus::Loaded { records: count }
                        }
                        Err(e) => {
                            warn!(%key, error = %e, "과거 원본 파싱 실패");
                            HistoryStatus::Failed {
                                error: e.to_string(),
                            }
                        }
                    },
                    Ok(None) => {
                        debug!(%key, "과거 원본 없음");
                        HistoryStatus::Missing
                    }
                    Err(e) => {
                        warn!(%key, error = %e, "과거 원본 읽기 실패");
                        HistoryStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                summary.history.push(HistoryOutcome {
                    date,
                    market,
                    status,
                });
            }
        }

        if !summary.history.is_empty() {
            info!(
                dates = summary.history.len(),
                records = records.len(),
                "과거 원본 로드 완료"
            );
        }
        records
    }

    /// 원본, 리포트, 관심종목 산출물을 만듭니다.
    ///
    /// 직렬화 결과는 산출물마다 따로 반환하여 하나가 실패해도 나머지는 저장합니다.
    fn build(
        &self,
        run_date: NaiveDate,
        rankings: &Rankings,
        pivot: &DailyPivot,
        fetched: &BTreeMap<(NaiveDate, Market), Vec<KrxData>>,
    ) -> Vec<(ArtifactKey, Result<Vec<u8>, RenderError>)> {
        let mut rendered = Vec::with_capacity(fetched.len() + 3);

        for (&(date, market), records) in fetched {
            rendered.push((ArtifactKey::Raw { market, date }, render_raw_json(records)));
        }

        let document = self.report_builder.build_with_pivot(
            rankings,
            pivot,
            ReportMetadata {
                run_date,
                markets: self.config.markets.clone(),
            },
        );
        rendered.push((
            ArtifactKey::Report { date: run_date },
            render_report_json(&document),
        ));

        let top_n = self.report_builder.top_k();
        rendered.push((
            ArtifactKey::DailyWatchlist { date: run_date },
            render_watchlist_csv(
                rankings,
                AggregationWindow::daily(run_date),
                &self.config.markets,
                top_n,
            ),
        ));
        rendered.push((
            ArtifactKey::CumulativeWatchlist { date: run_date },
            render_watchlist_csv(rankings, pivot.window(), &self.config.markets, top_n),
        ));

        info!(
            sheets = document.sheets.len(),
            artifacts = rendered.len(),
            "리포트 생성 완료"
        );
        rendered
    }

    async fn persist(&self, artifact: &StorageArtifact) -> ArtifactOutcome {
        let key = artifact.key.path();
        let report = self.storage.write_all(&key, &artifact.content).await;

        if !report.is_success() {
            error!(%key, failed = ?report.failed(), "모든 저장소에 저장 실패");
        }

        ArtifactOutcome {
            key,
            checksum: artifact.checksum(),
            size: artifact.content.len(),
            report,
        }
    }
}

fn abort_reason(summary: &RunSummary) -> RunAbortedError {
    let stats = summary.fetch_stats();
    RunAbortedError {
        requested: stats.total,
        failed: stats.errors,
        empty: stats.empty,
    }
}

fn check_cancelled(cancel: &CancellationToken, stage: RunState) -> Result<(), RoutineError> {
    if cancel.is_cancelled() {
        warn!(%stage, "취소 요청 확인");
        return Err(RoutineError::Cancelled { stage });
    }
    Ok(())
}
