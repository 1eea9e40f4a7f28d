//! 순매수 데이터 수집 포트.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{KrxData, Market};
use crate::error::FetchError;

// =============================================================================
// KrxDataPort Trait
// =============================================================================

/// 일별 투자자별 순매수 데이터 제공자 trait.
///
/// 세션/OTP 처리 등 수집 방식은 구현체가 감춥니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct CsvFileSource {
///     dir: PathBuf,
/// }
///
/// #[async_trait]
/// impl KrxDataPort for CsvFileSource {
///     async fn fetch(&self, date: NaiveDate, market: Market) -> Result<Vec<KrxData>, FetchError> {
///         // 파일 읽기 및 변환
///     }
/// }
/// ```
#[async_trait]
pub trait KrxDataPort: Send + Sync {
    /// 하루, 한 시장의 모든 투자자 구분 레코드를 조회합니다.
    ///
    /// 휴장일처럼 데이터가 없는 날은 빈 벡터를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `FetchError::Network`: 네트워크 연결 실패
    /// - `FetchError::Otp`: OTP 발급 실패
    /// - `FetchError::Parse`: 응답 형식 오류
    async fn fetch(&self, date: NaiveDate, market: Market) -> Result<Vec<KrxData>, FetchError>;
}
