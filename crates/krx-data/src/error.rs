//! 데이터 모듈 오류 타입.

use krx_core::{FetchError, PersistenceError};
use thiserror::Error;

/// 어댑터 생성 관련 오류.
///
/// 수집/저장 중의 오류는 포트 에러(`FetchError`, `PersistenceError`)로 반환합니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 클라이언트 생성 실패
    #[error("HTTP client error: {0}")]
    ClientError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::ClientError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

/// reqwest 에러를 수집 에러로 분류합니다.
pub(crate) fn fetch_error(context: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(format!("{}: {}", context, err))
    } else {
        FetchError::Network(format!("{}: {}", context, err))
    }
}

/// reqwest 에러를 저장소 에러로 분류합니다.
pub(crate) fn persistence_error(context: &str, err: reqwest::Error) -> PersistenceError {
    PersistenceError::Network(format!("{}: {}", context, err))
}

/// HTTP 상태 코드를 저장소 에러로 분류합니다.
pub(crate) fn status_error(context: &str, status: reqwest::StatusCode, body: &str) -> PersistenceError {
    let detail = format!(
        "{}: HTTP {} - {}",
        context,
        status,
        truncate(body, 200)
    );
    match status.as_u16() {
        401 | 403 => PersistenceError::Auth(detail),
        _ => PersistenceError::Api(detail),
    }
}

/// 로그/에러 메시지용으로 앞부분만 잘라냅니다 (문자 경계 기준).
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
