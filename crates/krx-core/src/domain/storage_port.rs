//! 산출물 저장소 포트.

use async_trait::async_trait;

use crate::error::PersistenceError;

/// 논리 키 기반 저장소 trait.
///
/// 키는 `/`로 구분된 상대 경로입니다 (예: `report/20251201.json`).
/// 같은 키로 다시 쓰면 기존 내용을 덮어씁니다.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// 로그 및 실행 요약에 표시할 저장소 이름.
    fn name(&self) -> &str;

    /// 내용을 기록합니다.
    async fn write(&self, key: &str, content: &[u8]) -> Result<(), PersistenceError>;

    /// 내용을 읽습니다. 키가 없으면 `Ok(None)`.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;
}
