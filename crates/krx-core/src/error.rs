//! 수집 파이프라인의 에러 타입.
//!
//! 단계별로 복구 가능 여부가 다릅니다:
//! - `FetchError`: 특정 날짜/시장 하나만 제외되고 실행은 계속됩니다.
//! - `PersistenceError`: 특정 저장소 하나만 실패하고 나머지 저장소로 계속됩니다.
//! - `AggregationError`, `RunAbortedError`: 해당 실행 전체를 중단합니다.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{InvestorCategory, Market};

/// 데이터 수집 에러 (날짜/시장 단위로 복구 가능).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// OTP 발급 실패
    #[error("OTP 발급 실패: {0}")]
    Otp(String),

    /// 응답 파싱 실패
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 요청 타임아웃
    #[error("요청 타임아웃: {0}")]
    Timeout(String),

    /// 지원하지 않는 요청
    #[error("지원하지 않는 요청: {0}")]
    Unsupported(String),
}

impl FetchError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }
}

/// 집계 에러.
///
/// 정상적인 수집 결과에서는 발생하지 않아야 하며, 발생 시 실행 전체가 실패합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// 구조적으로 잘못된 레코드
    #[error("잘못된 레코드 ({date} {market} {category}): {reason}")]
    MalformedRecord {
        date: NaiveDate,
        market: Market,
        category: InvestorCategory,
        reason: String,
    },

    /// 금액 합산 오버플로우
    #[error("금액 합산 오버플로우: {ticker} ({window})")]
    Overflow { ticker: String, window: String },

    /// 시작일이 종료일보다 늦은 구간
    #[error("잘못된 집계 구간: {start} > {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

/// 저장소 에러 (저장소 단위로 복구 가능).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// 파일 시스템 에러
    #[error("I/O 에러: {0}")]
    Io(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 인증 실패
    #[error("인증 실패: {0}")]
    Auth(String),

    /// 원격 API 에러
    #[error("API 에러: {0}")]
    Api(String),

    /// 허용되지 않는 키
    #[error("잘못된 키: {0}")]
    InvalidKey(String),

    /// 설정된 모든 저장소가 실패
    #[error("모든 저장소 실패 ({attempted}개 시도): {key}")]
    AllBackendsFailed { key: String, attempted: usize },
}

/// 사용 가능한 데이터가 하나도 없어 실행이 중단됨.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("수집된 데이터가 없어 실행을 중단합니다 (요청 {requested}건, 실패 {failed}건, 빈 데이터 {empty}건)")]
pub struct RunAbortedError {
    /// 요청한 (날짜, 시장) 수
    pub requested: usize,
    /// 수집 실패 수
    pub failed: usize,
    /// 빈 응답 수 (휴장일 등)
    pub empty: usize,
}
