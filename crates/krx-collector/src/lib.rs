//! KRX 투자자별 순매수 일일 수집기.
//!
//! 이 crate는 다음을 제공합니다:
//! - 일일 루틴 (수집 → 집계 → 리포트 → 저장) 상태 머신과 실행 요약
//! - 원격 저장소 산출물 다운로드
//! - 저장소 상태 점검
//! - CLI 바이너리 `krx-collector`

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;
pub mod summary;

pub use config::{CliOverrides, CollectorConfig};
pub use error::{CollectorError, Result, RoutineError, RoutineFailure};
pub use modules::{DailyRoutineService, RunRequest};
pub use stats::CollectionStats;
pub use summary::{
    ArtifactOutcome, FetchOutcome, FetchStatus, HistoryOutcome, HistoryStatus, RenderFailure,
    RunState, RunSummary,
};
