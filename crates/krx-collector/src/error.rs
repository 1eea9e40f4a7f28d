//! 에러 타입 정의.

use krx_core::{AggregationError, PersistenceError, RunAbortedError};
use krx_data::DataError;
use thiserror::Error;

use crate::summary::{RunState, RunSummary};

/// 일일 루틴을 중단시키는 에러.
///
/// 날짜/시장 단위 수집 실패, 산출물 단위 직렬화 실패, 저장소 단위 실패는 실행 요약에만 기록되고
/// 이 타입으로 올라오지 않습니다.
#[derive(Debug, Error)]
pub enum RoutineError {
    /// 사용 가능한 데이터 없음
    #[error(transparent)]
    Aborted(#[from] RunAbortedError),

    /// 집계 실패
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// 실행 취소
    #[error("{stage} 단계에서 실행이 취소되었습니다")]
    Cancelled { stage: RunState },
}

/// `Failed`로 끝난 실행. 실패 시점까지의 실행 요약을 함께 보관합니다.
#[derive(Debug, Error)]
#[error("일일 루틴 실패: {error}")]
pub struct RoutineFailure {
    #[source]
    pub error: RoutineError,
    pub summary: Box<RunSummary>,
}

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 어댑터 생성 에러
    #[error(transparent)]
    Data(#[from] DataError),

    /// 일일 루틴 실패
    #[error(transparent)]
    Routine(#[from] RoutineFailure),

    /// 저장소 에러
    #[error(transparent)]
    Storage(#[from] PersistenceError),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
