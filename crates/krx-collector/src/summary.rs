//! 일일 루틴 실행 상태와 실행 요약.

use chrono::NaiveDate;
use krx_core::Market;
use krx_data::WriteReport;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::stats::CollectionStats;

/// 일일 루틴 단계.
///
/// `Fetching → Aggregating → Building → Persisting → Done` 순서로 진행하며,
/// 종료되지 않은 어느 단계에서든 `Failed`로 끝날 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Fetching,
    Aggregating,
    Building,
    Persisting,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Fetching => "FETCHING",
            RunState::Aggregating => "AGGREGATING",
            RunState::Building => "BUILDING",
            RunState::Persisting => "PERSISTING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// 다음 단계로의 전이가 허용되는지 확인합니다.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (RunState::Fetching, RunState::Aggregating)
            | (RunState::Aggregating, RunState::Building)
            | (RunState::Building, RunState::Persisting)
            | (RunState::Persisting, RunState::Done) => true,
            (current, RunState::Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (날짜, 시장) 하나의 수집 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// 레코드 수집 성공
    Ok { records: usize },
    /// 조회는 성공했으나 데이터 없음 (휴장일 등)
    Empty,
    /// 수집 실패
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub date: NaiveDate,
    pub market: Market,
    pub status: FetchStatus,
    /// 시도 횟수 (재시도 포함)
    pub attempts: u32,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, FetchStatus::Ok { .. })
    }
}

/// 저장소에서 다시 읽은 과거 원본 데이터의 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    Loaded { records: usize },
    Missing,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOutcome {
    pub date: NaiveDate,
    pub market: Market,
    pub status: HistoryStatus,
}

/// 산출물 하나의 저장 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub key: String,
    /// 내용의 SHA-256
    pub checksum: String,
    pub size: usize,
    /// 저장소별 결과
    pub report: WriteReport,
}

impl ArtifactOutcome {
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}

/// 직렬화하지 못해 저장하지 않은 산출물.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub key: String,
    pub error: String,
}

/// 한 번의 일일 루틴 실행 요약.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub run_date: NaiveDate,
    /// 현재 상태
    pub state: RunState,
    /// 거쳐 간 상태 (시작 상태 포함)
    pub transitions: Vec<RunState>,
    pub fetches: Vec<FetchOutcome>,
    pub history: Vec<HistoryOutcome>,
    pub artifacts: Vec<ArtifactOutcome>,
    pub render_failures: Vec<RenderFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            run_date,
            state: RunState::Fetching,
            transitions: vec![RunState::Fetching],
            fetches: Vec::new(),
            history: Vec::new(),
            artifacts: Vec::new(),
            render_failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// 상태를 전이합니다. 허용되지 않는 전이는 무시하고 `false`를 반환합니다.
    pub fn transition(&mut self, next: RunState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = %self.state, to = %next, "허용되지 않는 상태 전이");
            return false;
        }
        tracing::info!(from = %self.state, to = %next, "상태 전이");
        self.state = next;
        self.transitions.push(next);
        true
    }

    pub fn fetch_outcome(&self, date: NaiveDate, market: Market) -> Option<&FetchOutcome> {
        self.fetches
            .iter()
            .find(|f| f.date == date && f.market == market)
    }

    pub fn artifact(&self, key: &str) -> Option<&ArtifactOutcome> {
        self.artifacts.iter().find(|a| a.key == key)
    }

    /// 직렬화에 실패했거나 모든 저장소에 기록하지 못한 산출물 키.
    pub fn failed_artifacts(&self) -> Vec<&str> {
        self.render_failures
            .iter()
            .map(|f| f.key.as_str())
            .chain(
                self.artifacts
                    .iter()
                    .filter(|a| !a.is_success())
                    .map(|a| a.key.as_str()),
            )
            .collect()
    }

    /// 수집 결과를 통계로 변환합니다.
    pub fn fetch_stats(&self) -> CollectionStats {
        let mut stats = CollectionStats::new();
        for fetch in &self.fetches {
            stats.total += 1;
            match fetch.status {
                FetchStatus::Ok { .. } => stats.success += 1,
                FetchStatus::Empty => stats.empty += 1,
                FetchStatus::Failed { .. } => stats.errors += 1,
            }
        }
        stats.elapsed = self.elapsed;
        stats
    }

    /// 실행 요약을 로그로 출력합니다.
    pub fn log_summary(&self) {
        for fetch in &self.fetches {
            match &fetch.status {
                FetchStatus::Ok { records } => tracing::info!(
                    date = %fetch.date, market = %fetch.market, records, attempts = fetch.attempts,
                    "수집 성공"
                ),
                FetchStatus::Empty => tracing::info!(
                    date = %fetch.date, market = %fetch.market, "데이터 없음"
                ),
                FetchStatus::Failed { error } => tracing::warn!(
                    date = %fetch.date, market = %fetch.market, attempts = fetch.attempts, error = %error,
                    "수집 실패"
                ),
            }
        }

        for artifact in &self.artifacts {
            tracing::info!(
                key = %artifact.key,
                checksum = %artifact.checksum,
                size = artifact.size,
                succeeded = ?artifact.report.succeeded(),
                failed = ?artifact.report.failed(),
                "산출물 저장 결과"
            );
        }

        for failure in &self.render_failures {
            tracing::warn!(key = %failure.key, error = %failure.error, "산출물 생성 실패");
        }

        let transitions: Vec<&str> = self.transitions.iter().map(RunState::as_str).collect();
        tracing::info!(
            run_id = %self.run_id,
            run_date = %self.run_date,
            state = %self.state,
            transitions = %transitions.join(" -> "),
            history = self.history.len(),
            artifacts = self.artifacts.len(),
            render_failures = self.render_failures.len(),
            "일일 루틴 요약"
        );
        self.fetch_stats().log_summary("일일 루틴 수집");
    }
}
